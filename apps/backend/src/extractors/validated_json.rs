//! JSON body extractor whose failures render as problem+json 400s.
//!
//! Request bodies here are tiny (a stake, a token index, a chat input), so
//! anything over `MAX_BODY_BYTES` is refused before parsing. A declared
//! content type other than JSON is refused; a missing one is tolerated since
//! some chat transports omit it.

use std::ops::Deref;

use actix_web::dev::Payload;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::web::BytesMut;
use actix_web::{FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::debug;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn check_content_type(req: &HttpRequest) -> Result<(), AppError> {
    let Some(value) = req.headers().get(CONTENT_TYPE) else {
        return Ok(());
    };
    let essence = value
        .to_str()
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if essence == "application/json" || essence.ends_with("+json") {
        Ok(())
    } else {
        Err(AppError::bad_request(
            ErrorCode::BadRequest,
            format!("Expected a JSON body, got content type {essence:?}"),
        ))
    }
}

/// Deserialize `body`, turning serde errors into a client-safe detail. Field
/// names may appear in the detail; submitted values never do.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::bad_request(
            ErrorCode::BadRequest,
            "Request body is empty",
        ));
    }
    serde_json::from_slice::<T>(body).map_err(|e| {
        debug!(
            trace_id = %trace_ctx::trace_id(),
            error = %Redacted(&e.to_string()),
            body_size = body.len(),
            "JSON body rejected"
        );
        let detail = match e.classify() {
            Category::Syntax => format!("Malformed JSON at line {} column {}", e.line(), e.column()),
            Category::Eof => "Malformed JSON: body ended early".to_string(),
            Category::Data => data_error_detail(&e.to_string()),
            Category::Io => "Could not read request body".to_string(),
        };
        AppError::bad_request(ErrorCode::BadRequest, detail)
    })
}

/// Keep serde's "missing field `x`" / "unknown variant `y`" wording, drop the
/// "invalid value: string \"...\"" forms that would echo input back.
fn data_error_detail(message: &str) -> String {
    let head = message.split(" at line ").next().unwrap_or(message);
    if head.starts_with("missing field") || head.starts_with("unknown variant") {
        format!("Invalid request body: {head}")
    } else {
        "Invalid request body: wrong type or value for a field".to_string()
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let content_type = check_content_type(req);
        let mut payload = payload.take();

        Box::pin(async move {
            content_type?;

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|_| {
                    AppError::bad_request(ErrorCode::BadRequest, "Could not read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            parse_body(&body).map(ValidatedJson)
        })
    }
}
