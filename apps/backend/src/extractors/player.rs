//! Caller identity as asserted by the messaging transport.
//!
//! The bot/mini-app gateway in front of this service authenticates users and
//! forwards their stable numeric id and display name in headers.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::domain::state::PlayerId;
use crate::error::AppError;
use crate::errors::ErrorCode;

pub const PLAYER_ID_HEADER: &str = "x-player-id";
pub const PLAYER_NAME_HEADER: &str = "x-player-name";

const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub player_id: PlayerId,
    pub username: String,
}

fn parse(req: &HttpRequest) -> Result<PlayerIdentity, AppError> {
    let raw = req
        .headers()
        .get(PLAYER_ID_HEADER)
        .ok_or_else(|| AppError::unauthorized(format!("Missing {PLAYER_ID_HEADER} header")))?
        .to_str()
        .map_err(|_| {
            AppError::bad_request(ErrorCode::InvalidPlayerId, "Player id must be ASCII")
        })?;

    let player_id = raw.trim().parse::<PlayerId>().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidPlayerId, format!("Invalid player id: {raw}"))
    })?;
    if player_id <= 0 {
        return Err(AppError::bad_request(
            ErrorCode::InvalidPlayerId,
            format!("Player id must be positive, got: {player_id}"),
        ));
    }

    let username = req
        .headers()
        .get(PLAYER_NAME_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.chars().take(MAX_USERNAME_LEN).collect())
        .unwrap_or_else(|| format!("player{player_id}"));

    Ok(PlayerIdentity {
        player_id,
        username,
    })
}

impl FromRequest for PlayerIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn reads_id_and_name() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "42"))
            .insert_header((PLAYER_NAME_HEADER, "  abebe "))
            .to_http_request();
        assert_eq!(
            parse(&req).unwrap(),
            PlayerIdentity {
                player_id: 42,
                username: "abebe".into()
            }
        );
    }

    #[test]
    fn name_falls_back_to_id() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "7"))
            .to_http_request();
        assert_eq!(parse(&req).unwrap().username, "player7");
    }

    #[test]
    fn missing_id_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(parse(&req).unwrap_err().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn bad_ids_are_rejected() {
        for raw in ["abc", "0", "-3"] {
            let req = TestRequest::default()
                .insert_header((PLAYER_ID_HEADER, raw))
                .to_http_request();
            assert_eq!(parse(&req).unwrap_err().code(), ErrorCode::InvalidPlayerId);
        }
    }
}
