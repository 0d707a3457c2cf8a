use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::IF_MATCH;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::http::etag::GameTag;

/// Optional `If-Match` precondition on a game mutation.
///
/// Absent (or `*`) means "apply to whatever the current version is"; a game
/// ETag pins the version and a stale one answers 409. An ETag naming a
/// different game than the `{game_id}` path segment is a 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpectedVersion(pub Option<i32>);

fn parse(req: &HttpRequest) -> Result<ExpectedVersion, AppError> {
    let Some(value) = req.headers().get(IF_MATCH) else {
        return Ok(ExpectedVersion(None));
    };
    let value = value.to_str().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidHeader, "If-Match must be ASCII")
    })?;
    if value.trim() == "*" {
        return Ok(ExpectedVersion(None));
    }
    let tag = value.parse::<GameTag>()?;
    let path_game = req
        .match_info()
        .get("game_id")
        .and_then(|raw| raw.parse::<i64>().ok());
    if path_game.is_some_and(|id| id != tag.game_id) {
        return Err(AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("If-Match names game {} but the request targets another game", tag.game_id),
        ));
    }
    Ok(ExpectedVersion(Some(tag.version)))
}

impl FromRequest for ExpectedVersion {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req))
    }
}
