//! API credentials passed explicitly per call.

use std::fmt;

/// An API key or bearer token.
///
/// The secret never appears in `Debug` or `Display` output, so it cannot
/// leak into logs or error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for the transport layer only.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_redacted() {
        let credential = Credential::new("sk-live-123");
        assert!(!format!("{credential:?}").contains("sk-live"));
        assert!(!credential.to_string().contains("sk-live"));
        assert_eq!(credential.expose(), "sk-live-123");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Credential::new("   ").is_blank());
        assert!(!Credential::from("key").is_blank());
    }
}
