//! Game ETags: `"game-{id}-v{version}"`.
//!
//! The version is the store's compare-and-swap version, so an ETag doubles
//! as the `If-Match` precondition for the next mutation of the same game.

use std::fmt;
use std::str::FromStr;

use crate::domain::state::GameId;
use crate::error::AppError;
use crate::errors::ErrorCode;

/// A parsed game ETag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTag {
    pub game_id: GameId,
    pub version: i32,
}

impl fmt::Display for GameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"game-{}-v{}\"", self.game_id, self.version)
    }
}

fn invalid(raw: &str, why: &str) -> AppError {
    AppError::bad_request(
        ErrorCode::InvalidHeader,
        format!("Invalid ETag {raw:?}: {why}; expected \"game-{{id}}-v{{version}}\""),
    )
}

impl FromStr for GameTag {
    type Err = AppError;

    /// Accepts the strong or weak (`W/`) form, with or without quotes.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let bare = raw.trim().trim_start_matches("W/").trim_matches('"');
        let rest = bare
            .strip_prefix("game-")
            .ok_or_else(|| invalid(raw, "missing game prefix"))?;
        let (id, version) = rest
            .rsplit_once("-v")
            .ok_or_else(|| invalid(raw, "missing version marker"))?;
        let game_id = id
            .parse::<GameId>()
            .map_err(|_| invalid(raw, "game id is not an integer"))?;
        let version = version
            .parse::<i32>()
            .map_err(|_| invalid(raw, "version is not an integer"))?;
        Ok(GameTag { game_id, version })
    }
}

/// Quoted ETag for a game at `version`.
///
/// ```
/// # use ludo_backend::http::etag::game_etag;
/// assert_eq!(game_etag(123, 5), r#""game-123-v5""#);
/// ```
pub fn game_etag(game_id: GameId, version: i32) -> String {
    GameTag { game_id, version }.to_string()
}

/// Whether an `If-None-Match` value matches `current`: `*`, or any listed
/// tag compared weakly. Unparseable entries never match.
pub fn if_none_match_hits(header_value: &str, current: GameTag) -> bool {
    let header_value = header_value.trim();
    if header_value == "*" {
        return true;
    }
    header_value
        .split(',')
        .filter_map(|tag| tag.parse::<GameTag>().ok())
        .any(|tag| tag == current)
}
