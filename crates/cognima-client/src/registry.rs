//! Static endpoint registry.
//!
//! Every supported remote operation is one
//! [`EndpointDescriptor`](crate::endpoint::EndpointDescriptor) in [`ENDPOINTS`].
//! The table is read-only and shared by every call site.

use std::collections::HashMap;
use std::sync::LazyLock;

use cognima_core::{RetrievalError, RetrievalResult};

use crate::config::ApiHost::{Lookup, Primary, Secondary, Site};
use crate::endpoint::{
    AuthStyle, EndpointDescriptor as E, ParamKind, ParamSpec, Profile, ResponseShape,
};
use crate::normalize::{
    ALLDL, APPS_SEARCH, APPSTORE, AUDIO_FORMATS, CATALOGUE, COMPLETION, CONSULTA, CONVERSION,
    DATA, DATA_DOWNLOAD, FACEBOOK_HD, FACEBOOK_VIDEOS, GENERATED_IMAGE, IMAGE_RESULT, INFO,
    LYRICS, MIXED_URLS, PINTEREST_SEARCH, PLAYSTORE, POST_MEDIA, SEARCH_DOWNLOAD,
    SOUNDCLOUD_ONE, SOUNDCLOUD_SEARCH, SPOTIFY_ONE, SPOTIFY_SEARCH, TIKTOK_SEARCH, TWEET_MEDIA,
    VIDEO_FORMATS, VIDEO_URLS, WEB_SEARCH, WHOLE, YOUTUBE_SEARCH,
};

const API_KEY: AuthStyle = AuthStyle::Header("X-API-Key");
const APIKEY: AuthStyle = AuthStyle::Header("apikey");
const BEARER: AuthStyle = AuthStyle::Bearer;

const LIMIT: ParamKind = ParamKind::Integer { min: 1, max: 50 };
const MEDIA_TYPES: &[&str] = &["video", "audio", "image"];
const STORES: &[&str] = &["playstore", "appstore"];

const URL_QUERY: &[ParamSpec] = &[ParamSpec::query("url", ParamKind::Url)];
const URL_BODY: &[ParamSpec] = &[ParamSpec::body("url", ParamKind::Url)];
const QUERY_BODY: &[ParamSpec] = &[ParamSpec::body("query", ParamKind::Text)];
const Q: &[ParamSpec] = &[ParamSpec::query("q", ParamKind::Text)];
const Q_LIMIT: &[ParamSpec] = &[
    ParamSpec::query("q", ParamKind::Text),
    ParamSpec::query("limit", LIMIT).optional(),
];
const Q_MAX: &[ParamSpec] = &[
    ParamSpec::query("q", ParamKind::Text),
    ParamSpec::query("max", LIMIT).optional(),
];
const APP_QUERY: &[ParamSpec] = &[
    ParamSpec::query("q", ParamKind::Text),
    ParamSpec::query("num", LIMIT).optional(),
    ParamSpec::query("country", ParamKind::Text).optional(),
    ParamSpec::query("lang", ParamKind::Text).optional(),
];
const APP_ID: &[ParamSpec] = &[
    ParamSpec::query("appId", ParamKind::Text),
    ParamSpec::query("store", ParamKind::Choice(STORES)).optional(),
    ParamSpec::query("country", ParamKind::Text).optional(),
    ParamSpec::query("num", LIMIT).optional(),
];
const NONE: &[ParamSpec] = &[];
const TYPED_URL: &[ParamSpec] = &[
    ParamSpec::query("url", ParamKind::Url),
    ParamSpec::query("type", ParamKind::Choice(MEDIA_TYPES)),
];
const MP4: &[ParamSpec] = &[
    ParamSpec::body("url", ParamKind::Url),
    ParamSpec::body("quality", ParamKind::Text).optional(),
];
const LOOKUP: &[ParamSpec] = &[
    ParamSpec::query("type", ParamKind::Text),
    ParamSpec::query("dados", ParamKind::Text),
];
const CATEGORY: &[ParamSpec] = &[ParamSpec::query("category_id", ParamKind::Text).optional()];
const TITLE_QUERY: &[ParamSpec] = &[ParamSpec::query("query", ParamKind::Text)];
const ID: &[ParamSpec] = &[ParamSpec::path("id", ParamKind::Text)];
const EPISODE: &[ParamSpec] = &[
    ParamSpec::path("id", ParamKind::Text),
    ParamSpec::path("episode", ParamKind::Text),
];
const COMPLETION_PARAMS: &[ParamSpec] = &[
    ParamSpec::body("model", ParamKind::Text),
    ParamSpec::body("messages", ParamKind::Json),
    ParamSpec::body("max_tokens", ParamKind::Integer { min: 1, max: 32_768 }).optional(),
    ParamSpec::body("temperature", ParamKind::Json).optional(),
];
const CUSTOM_MODEL: &[ParamSpec] = &[
    ParamSpec::body("name", ParamKind::Text),
    ParamSpec::body("display_name", ParamKind::Text).optional(),
    ParamSpec::body("description", ParamKind::Text).optional(),
    ParamSpec::body("personality_summary", ParamKind::Text).optional(),
    ParamSpec::body("base_model", ParamKind::Text),
];
const GENERATE: &[ParamSpec] = &[
    ParamSpec::body("prompt", ParamKind::Text),
    ParamSpec::body("model", ParamKind::Text).optional(),
    ParamSpec::body("size", ParamKind::Text).optional(),
    ParamSpec::body("quality", ParamKind::Text).optional(),
];
const UPSCALE: &[ParamSpec] = &[
    ParamSpec::body("url", ParamKind::Url),
    ParamSpec::body("scale", ParamKind::Integer { min: 2, max: 4 }).optional(),
];
const DAYS: &[ParamSpec] =
    &[ParamSpec::query("days", ParamKind::Integer { min: 1, max: 90 }).optional()];

/// `download` / `formats` / `info` triple shared by the generic video hosts.
macro_rules! video_host {
    ($provider:literal, $formats:expr) => {
        [
            E::new(
                concat!($provider, ".download"),
                $provider,
                Primary,
                concat!("/", $provider, "/download"),
                URL_QUERY,
                Profile::Link(&DATA_DOWNLOAD),
            ),
            E::new(
                concat!($provider, ".formats"),
                $provider,
                Primary,
                concat!("/", $provider, "/formats"),
                URL_QUERY,
                Profile::Media($formats),
            )
            .with_shape(ResponseShape::List),
            E::new(
                concat!($provider, ".info"),
                $provider,
                Primary,
                concat!("/", $provider, "/info"),
                URL_QUERY,
                Profile::Document(&INFO),
            ),
        ]
    };
}

/// `search` / `searchOne` / `download` / `searchDownload` of the music hosts.
macro_rules! music_host {
    ($provider:literal, $auth:expr, $search:expr, $one:expr) => {
        [
            E::new(
                concat!($provider, ".search"),
                $provider,
                Primary,
                concat!("/", $provider, "/search"),
                Q_LIMIT,
                Profile::Query($search),
            )
            .with_auth($auth)
            .with_shape(ResponseShape::List),
            E::new(
                concat!($provider, ".searchOne"),
                $provider,
                Primary,
                concat!("/", $provider, "/search-one"),
                Q,
                Profile::Query($one),
            )
            .with_auth($auth),
            E::new(
                concat!($provider, ".download"),
                $provider,
                Primary,
                concat!("/", $provider, "/download"),
                URL_QUERY,
                Profile::Link(&DATA_DOWNLOAD),
            )
            .with_auth($auth),
            E::new(
                concat!($provider, ".searchDownload"),
                $provider,
                Primary,
                concat!("/", $provider, "/search-download"),
                Q,
                Profile::Link(&SEARCH_DOWNLOAD),
            )
            .with_auth($auth),
        ]
    };
}

/// `info` / `download` of the file hosts.
macro_rules! file_host {
    ($provider:literal, $host:expr) => {
        [
            E::new(
                concat!($provider, ".info"),
                $provider,
                $host,
                concat!("/", $provider, "/info"),
                URL_QUERY,
                Profile::Document(&DATA),
            )
            .with_auth(BEARER),
            E::new(
                concat!($provider, ".download"),
                $provider,
                $host,
                concat!("/", $provider, "/download"),
                URL_QUERY,
                Profile::Link(&DATA_DOWNLOAD),
            )
            .with_auth(BEARER),
        ]
    };
}

static MEDIA: [E; 4] = [
    E::new(
        "alldl",
        "alldl",
        Primary,
        "/alldl",
        URL_QUERY,
        Profile::Media(&ALLDL),
    ),
    E::new(
        "alldl.type",
        "alldl",
        Primary,
        "/alldl/type",
        TYPED_URL,
        Profile::Media(&ALLDL),
    ),
    E::new(
        "facebook.download",
        "facebook",
        Primary,
        "/facebook/download",
        URL_QUERY,
        Profile::Media(&FACEBOOK_VIDEOS),
    )
    .with_auth(APIKEY),
    E::new(
        "facebook.downloadHd",
        "facebook",
        Primary,
        "/facebook/download-hd",
        URL_QUERY,
        Profile::Media(&FACEBOOK_HD),
    )
    .with_auth(APIKEY),
];

static TWITCH: [E; 3] = video_host!("twitch", &VIDEO_FORMATS);
static VIMEO: [E; 3] = video_host!("vimeo", &VIDEO_FORMATS);
static DAILYMOTION: [E; 3] = video_host!("dailymotion", &VIDEO_FORMATS);
static STREAMABLE: [E; 3] = video_host!("streamable", &VIDEO_FORMATS);
static BANDCAMP: [E; 3] = video_host!("bandcamp", &AUDIO_FORMATS);

static SHORT_VIDEO: [E; 4] = [
    E::new(
        "reddit.download",
        "reddit",
        Primary,
        "/reddit/download",
        URL_QUERY,
        Profile::Link(&DATA_DOWNLOAD),
    ),
    E::new(
        "reddit.info",
        "reddit",
        Primary,
        "/reddit/info",
        URL_QUERY,
        Profile::Document(&INFO),
    ),
    E::new(
        "likee.download",
        "likee",
        Primary,
        "/likee/download",
        URL_QUERY,
        Profile::Link(&DATA_DOWNLOAD),
    ),
    E::new(
        "likee.info",
        "likee",
        Primary,
        "/likee/info",
        URL_QUERY,
        Profile::Document(&INFO),
    ),
];

static SOCIAL: [E; 10] = [
    E::new(
        "youtube.search",
        "youtube",
        Secondary,
        "/youtube/search",
        QUERY_BODY,
        Profile::Query(&YOUTUBE_SEARCH),
    )
    .post()
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "youtube.mp3",
        "youtube",
        Secondary,
        "/youtube/mp3",
        URL_BODY,
        Profile::Link(&CONVERSION),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "youtube.mp4",
        "youtube",
        Secondary,
        "/youtube/mp4",
        MP4,
        Profile::Link(&CONVERSION),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "tiktok.download",
        "tiktok",
        Secondary,
        "/tiktok/download",
        URL_BODY,
        Profile::Media(&VIDEO_URLS),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "tiktok.search",
        "tiktok",
        Secondary,
        "/tiktok/search",
        QUERY_BODY,
        Profile::Query(&TIKTOK_SEARCH),
    )
    .post()
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "instagram.download",
        "instagram",
        Secondary,
        "/instagram/download",
        URL_BODY,
        Profile::Media(&POST_MEDIA),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "pinterest.search",
        "pinterest",
        Secondary,
        "/pinterest/search",
        QUERY_BODY,
        Profile::Query(&PINTEREST_SEARCH),
    )
    .post()
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "pinterest.download",
        "pinterest",
        Secondary,
        "/pinterest/download",
        URL_BODY,
        Profile::Media(&MIXED_URLS),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "twitter.info",
        "twitter",
        Primary,
        "/twitter/info",
        URL_QUERY,
        Profile::Document(&DATA),
    )
    .with_auth(BEARER),
    E::new(
        "twitter.download",
        "twitter",
        Primary,
        "/twitter/download",
        URL_QUERY,
        Profile::Media(&TWEET_MEDIA),
    )
    .with_auth(BEARER),
];

static SPOTIFY: [E; 4] = music_host!("spotify", AuthStyle::None, &SPOTIFY_SEARCH, &SPOTIFY_ONE);
static SOUNDCLOUD: [E; 4] = music_host!("soundcloud", APIKEY, &SOUNDCLOUD_SEARCH, &SOUNDCLOUD_ONE);

static MEDIAFIRE: [E; 2] = file_host!("mediafire", Secondary);
static GDRIVE: [E; 2] = file_host!("gdrive", Primary);

static LOOKUPS: [E; 11] = [
    E::new(
        "apps.search",
        "apps",
        Secondary,
        "/apps/search",
        APP_QUERY,
        Profile::Query(&APPS_SEARCH),
    )
    .with_auth(BEARER),
    E::new(
        "apps.playstore",
        "apps",
        Secondary,
        "/apps/playstore",
        APP_QUERY,
        Profile::Query(&PLAYSTORE),
    )
    .with_auth(BEARER)
    .with_shape(ResponseShape::List),
    E::new(
        "apps.appstore",
        "apps",
        Secondary,
        "/apps/appstore",
        APP_QUERY,
        Profile::Query(&APPSTORE),
    )
    .with_auth(BEARER)
    .with_shape(ResponseShape::List),
    E::new(
        "apps.details",
        "apps",
        Secondary,
        "/apps/details",
        APP_ID,
        Profile::Document(&DATA),
    )
    .with_auth(BEARER),
    E::new(
        "apps.similar",
        "apps",
        Secondary,
        "/apps/similar",
        APP_ID,
        Profile::Query(&PLAYSTORE),
    )
    .with_auth(BEARER)
    .with_shape(ResponseShape::List),
    E::new(
        "search.web",
        "search",
        Primary,
        "/search",
        Q_MAX,
        Profile::Query(&WEB_SEARCH),
    )
    .with_auth(BEARER)
    .with_shape(ResponseShape::List),
    E::new(
        "search.news",
        "search",
        Primary,
        "/search/news",
        Q_MAX,
        Profile::Query(&WEB_SEARCH),
    )
    .with_auth(BEARER)
    .with_shape(ResponseShape::List),
    E::new(
        "lyrics.search",
        "lyrics",
        Secondary,
        "/lyrics/search",
        QUERY_BODY,
        Profile::Query(&LYRICS),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "consulta.status",
        "consulta",
        Lookup,
        "/consulta/status",
        NONE,
        Profile::Document(&WHOLE),
    )
    .with_auth(API_KEY),
    E::new(
        "consulta.query",
        "consulta",
        Lookup,
        "/consulta",
        LOOKUP,
        Profile::Query(&CONSULTA),
    )
    .with_auth(API_KEY),
    E::new(
        "status",
        "account",
        Secondary,
        "/status",
        NONE,
        Profile::Document(&WHOLE),
    )
    .with_auth(API_KEY),
];

static CATALOGUE_ENDPOINTS: [E; 9] = [
    E::new(
        "filmes.categories",
        "filmes",
        Primary,
        "/filmes/categorias",
        NONE,
        Profile::Document(&DATA),
    )
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "filmes.list",
        "filmes",
        Primary,
        "/filmes",
        CATEGORY,
        Profile::Query(&CATALOGUE),
    )
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "filmes.search",
        "filmes",
        Primary,
        "/filmes/buscar",
        TITLE_QUERY,
        Profile::Query(&CATALOGUE),
    )
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "filmes.details",
        "filmes",
        Primary,
        "/filmes/{id}",
        ID,
        Profile::Document(&DATA),
    )
    .with_auth(API_KEY),
    E::new(
        "series.categories",
        "series",
        Primary,
        "/series/categorias",
        NONE,
        Profile::Document(&DATA),
    )
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "series.search",
        "series",
        Primary,
        "/series/buscar",
        TITLE_QUERY,
        Profile::Query(&CATALOGUE),
    )
    .with_auth(API_KEY)
    .with_shape(ResponseShape::List),
    E::new(
        "series.details",
        "series",
        Primary,
        "/series/{id}",
        ID,
        Profile::Document(&DATA),
    )
    .with_auth(API_KEY),
    E::new(
        "filmes.watch",
        "filmes",
        Site,
        "/watch/{id}",
        ID,
        Profile::Stream,
    )
    .with_shape(ResponseShape::Binary),
    E::new(
        "series.watch",
        "series",
        Site,
        "/watch/series/{id}/{episode}",
        EPISODE,
        Profile::Stream,
    )
    .with_shape(ResponseShape::Binary),
];

static AI: [E; 6] = [
    E::new(
        "ai.completion",
        "ai",
        Primary,
        "/completion",
        COMPLETION_PARAMS,
        Profile::Document(&COMPLETION),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "ai.customModel",
        "ai",
        Primary,
        "/custom",
        CUSTOM_MODEL,
        Profile::Document(&DATA),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "ai.generateImage",
        "ai",
        Secondary,
        "/generate",
        GENERATE,
        Profile::Link(&GENERATED_IMAGE),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "image.removeBg",
        "image",
        Primary,
        "/image/remove-bg",
        URL_BODY,
        Profile::Link(&IMAGE_RESULT),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "image.upscale",
        "image",
        Primary,
        "/image/upscale",
        UPSCALE,
        Profile::Link(&IMAGE_RESULT),
    )
    .post()
    .with_auth(API_KEY),
    E::new(
        "status.models",
        "account",
        Secondary,
        "/status/models",
        DAYS,
        Profile::Document(&WHOLE),
    )
    .with_auth(API_KEY),
];

/// Every registered descriptor, grouped by provider family.
pub static ENDPOINTS: [&[E]; 15] = [
    &MEDIA,
    &TWITCH,
    &VIMEO,
    &DAILYMOTION,
    &STREAMABLE,
    &BANDCAMP,
    &SHORT_VIDEO,
    &SOCIAL,
    &SPOTIFY,
    &SOUNDCLOUD,
    &MEDIAFIRE,
    &GDRIVE,
    &LOOKUPS,
    &CATALOGUE_ENDPOINTS,
    &AI,
];

/// Alternative names resolving to a registered operation.
const ALIASES: &[(&str, &str)] = &[("video.download", "facebook.download")];

static INDEX: LazyLock<HashMap<&'static str, &'static E>> = LazyLock::new(|| {
    let mut index: HashMap<&'static str, &'static E> =
        all().map(|descriptor| (descriptor.name, descriptor)).collect();
    for (alias, target) in ALIASES {
        if let Some(descriptor) = index.get(target).copied() {
            index.insert(*alias, descriptor);
        }
    }
    index
});

/// Every registered descriptor, in registration order. Aliases are not repeated.
pub fn all() -> impl Iterator<Item = &'static E> {
    ENDPOINTS.iter().flat_map(|group| group.iter())
}

/// Resolve an operation name or alias.
pub fn lookup(name: &str) -> RetrievalResult<&'static E> {
    INDEX.get(name).copied().ok_or_else(|| {
        RetrievalError::validation("endpoint", format!("unknown operation '{name}'"))
    })
}
