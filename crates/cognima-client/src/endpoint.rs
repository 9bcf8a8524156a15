//! Endpoint descriptors.
//!
//! A descriptor is immutable `'static` metadata describing how to call one
//! remote operation and how to read its answer. The transport engine and the
//! normalizer are driven entirely by these values, so adding a provider means
//! adding descriptors, not code paths.

use cognima_core::{RetrievalError, RetrievalResult};
use serde_json::{Map, Value};
use url::Url;

use crate::config::ApiHost;
use crate::normalize::{DocumentRule, LinkRule, MediaRule, QueryRule};
use crate::params::{ParamValue, Params};

/// HTTP method of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// How an endpoint expects the credential to be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// Public endpoint.
    None,
    /// Raw key in the named header (`apikey`, `X-API-Key`).
    Header(&'static str),
    /// `Authorization: Bearer <key>`.
    Bearer,
}

impl AuthStyle {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Accepted value type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Non-blank text.
    Text,
    /// Absolute `http`/`https` URL.
    Url,
    /// Whole number within an inclusive range.
    Integer { min: i64, max: i64 },
    Boolean,
    /// One of a fixed set of lowercase values.
    Choice(&'static [&'static str]),
    /// Arbitrary JSON, sent as-is in the body.
    Json,
}

/// Where a parameter goes in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Query,
    Body,
    /// Substituted into a `{name}` placeholder of the path template.
    Path,
}

/// Schema entry for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub location: ParamLocation,
}

impl ParamSpec {
    pub const fn query(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            location: ParamLocation::Query,
        }
    }

    pub const fn body(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            location: ParamLocation::Body,
        }
    }

    pub const fn path(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            location: ParamLocation::Path,
        }
    }

    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// JSON form of an already checked value. Numeric and boolean text is
    /// sent typed, so `"100"` for an integer parameter becomes `100`.
    fn body_value(&self, value: &ParamValue) -> Value {
        match (self.kind, value) {
            (ParamKind::Integer { .. }, ParamValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map_or_else(|_| value.to_json(), Value::from),
            (ParamKind::Boolean, ParamValue::Text(s)) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => value.to_json(),
            },
            _ => value.to_json(),
        }
    }

    fn check(&self, endpoint: &str, value: &ParamValue) -> RetrievalResult<()> {
        let invalid = |message: String| {
            Err(RetrievalError::validation(self.name, format!("{endpoint}: {message}")))
        };

        match (self.kind, value) {
            (ParamKind::Json, _) => Ok(()),
            (ParamKind::Text, ParamValue::Text(s)) if !s.trim().is_empty() => Ok(()),
            (ParamKind::Text, ParamValue::Text(_)) => invalid("must not be blank".to_string()),
            (ParamKind::Url, ParamValue::Text(s)) => match Url::parse(s.trim()) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
                Ok(url) => invalid(format!("unsupported URL scheme '{}'", url.scheme())),
                Err(e) => invalid(format!("not a valid URL ({e})")),
            },
            (ParamKind::Integer { min, max }, value) => {
                let number = match value {
                    ParamValue::Integer(n) => Some(*n),
                    ParamValue::Text(s) => s.trim().parse().ok(),
                    _ => None,
                };
                match number {
                    Some(n) if (min..=max).contains(&n) => Ok(()),
                    Some(n) => invalid(format!("{n} is outside {min}..={max}")),
                    None => invalid("expected an integer".to_string()),
                }
            }
            (ParamKind::Boolean, ParamValue::Bool(_)) => Ok(()),
            (ParamKind::Boolean, ParamValue::Text(s)) if matches!(s.as_str(), "true" | "false") => {
                Ok(())
            }
            (ParamKind::Choice(allowed), ParamValue::Text(s)) if allowed.contains(&s.as_str()) => {
                Ok(())
            }
            (ParamKind::Choice(allowed), _) => {
                invalid(format!("expected one of {}", allowed.join(", ")))
            }
            (kind, _) => invalid(format!("expected {kind:?}")),
        }
    }
}

/// Top-level shape of a successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Object,
    List,
    /// Raw bytes, consumed through the streaming downloader.
    Binary,
}

/// Which normalization table applies to an endpoint's payload.
#[derive(Debug, Clone, Copy)]
pub enum Profile {
    Media(&'static MediaRule),
    Query(&'static QueryRule),
    Link(&'static LinkRule),
    Document(&'static DocumentRule),
    /// Binary body, not normalized.
    Stream,
}

/// Static metadata for one remote operation.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDescriptor {
    /// Logical operation name, e.g. `spotify.searchOne`.
    pub name: &'static str,
    /// Provider family, e.g. `spotify`.
    pub provider: &'static str,
    pub host: ApiHost,
    pub method: HttpMethod,
    /// Path below the host's base URL, with `{param}` placeholders.
    pub path: &'static str,
    pub auth: AuthStyle,
    pub params: &'static [ParamSpec],
    pub shape: ResponseShape,
    pub profile: Profile,
}

impl EndpointDescriptor {
    /// Unauthenticated `GET` endpoint answering with a JSON object. The
    /// builders below change the method, auth and shape.
    pub const fn new(
        name: &'static str,
        provider: &'static str,
        host: ApiHost,
        path: &'static str,
        params: &'static [ParamSpec],
        profile: Profile,
    ) -> Self {
        Self {
            name,
            provider,
            host,
            method: HttpMethod::Get,
            path,
            auth: AuthStyle::None,
            params,
            shape: ResponseShape::Object,
            profile,
        }
    }

    #[must_use]
    pub const fn post(mut self) -> Self {
        self.method = HttpMethod::Post;
        self
    }

    #[must_use]
    pub const fn with_auth(mut self, auth: AuthStyle) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub const fn with_shape(mut self, shape: ResponseShape) -> Self {
        self.shape = shape;
        self
    }

    /// Schema entry for `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|spec| spec.name == name)
    }

    /// Check `params` against the schema. Runs before any I/O.
    pub fn validate(&self, params: &Params) -> RetrievalResult<()> {
        for (name, _) in params.iter() {
            if self.param(name).is_none() {
                return Err(RetrievalError::validation(
                    name,
                    format!("{}: unknown parameter", self.name),
                ));
            }
        }

        for spec in self.params {
            match params.get(spec.name) {
                Some(value) => spec.check(self.name, value)?,
                None if spec.required => {
                    return Err(RetrievalError::validation(
                        spec.name,
                        format!("{}: required parameter missing", self.name),
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Resolve the full request URL: path placeholders plus query string.
    pub fn build_url(&self, base_url: &str, params: &Params) -> RetrievalResult<Url> {
        let mut path = self.path.to_string();
        for spec in self.params_at(ParamLocation::Path) {
            let placeholder = format!("{{{}}}", spec.name);
            let value = params
                .get(spec.name)
                .map(ParamValue::to_query_string)
                .ok_or_else(|| {
                    RetrievalError::validation(
                        spec.name,
                        format!("{}: required path parameter missing", self.name),
                    )
                })?;
            path = path.replace(&placeholder, &urlencoding::encode(value.trim()));
        }

        let mut url = Url::parse(&format!("{}{path}", base_url.trim_end_matches('/')))
            .map_err(|e| RetrievalError::configuration("base_url", e.to_string()))?;

        let query: Vec<(&str, String)> = self
            .params_at(ParamLocation::Query)
            .filter_map(|spec| {
                params
                    .get(spec.name)
                    .map(|value| (spec.name, value.to_query_string()))
            })
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// JSON body from body-located parameters, or `None` when there are none.
    #[must_use]
    pub fn build_body(&self, params: &Params) -> Option<Value> {
        let body: Map<String, Value> = self
            .params_at(ParamLocation::Body)
            .filter_map(|spec| {
                params
                    .get(spec.name)
                    .map(|value| (spec.name.to_string(), spec.body_value(value)))
            })
            .collect();

        match (self.method, body.is_empty()) {
            (HttpMethod::Get, _) => None,
            (HttpMethod::Post, true) => Some(Value::Object(Map::new())),
            (HttpMethod::Post, false) => Some(Value::Object(body)),
        }
    }

    fn params_at(&self, location: ParamLocation) -> impl Iterator<Item = &ParamSpec> {
        self.params
            .iter()
            .filter(move |spec| spec.location == location)
    }
}
