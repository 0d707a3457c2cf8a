use std::env;

use actix_cors::Cors;
use actix_web::http::header;

use crate::extractors::player::{PLAYER_ID_HEADER, PLAYER_NAME_HEADER};

/// CORS for browser-based transports (e.g. a Telegram Mini App shell).
///
/// Origins come from the comma-separated `CORS_ALLOWED_ORIGINS`; entries that
/// are empty, `null`, or not http(s) are ignored. With nothing valid
/// configured only localhost is allowed.
pub fn cors_middleware() -> Cors {
    let allowed_raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let mut origins: Vec<String> = allowed_raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        origins = vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ];
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::IF_MATCH,
            header::IF_NONE_MATCH,
            header::HeaderName::from_static(PLAYER_ID_HEADER),
            header::HeaderName::from_static(PLAYER_NAME_HEADER),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
            header::ETAG,
        ])
        .max_age(3600);

    for origin in origins {
        cors = cors.allowed_origin(&origin);
    }

    cors
}
