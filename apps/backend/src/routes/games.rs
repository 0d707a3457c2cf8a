//! Game routes: create, join, roll, move and read.
//!
//! Every successful response carries the game's ETag. Mutations honour an
//! optional `If-Match` and re-arm (or clear) the game's inactivity timer.

use actix_web::http::header::{ETAG, IF_NONE_MATCH, LOCATION};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::dice::RollOutcome;
use crate::domain::game_transition::GameTransition;
use crate::domain::money::Money;
use crate::domain::moves::MoveOutcome;
use crate::domain::snapshot::GameSnapshot;
use crate::domain::state::WinCondition;
use crate::error::AppError;
use crate::extractors::{ExpectedVersion, GameIdParam, PlayerIdentity, ValidatedJson};
use crate::http::etag::{game_etag, if_none_match_hits, GameTag};
use crate::services::GameUpdate;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct CreateGameRequest {
    stake: Money,
    win_condition: WinCondition,
}

#[derive(Debug, Deserialize)]
struct MoveRequest {
    token_index: usize,
}

#[derive(Debug, Serialize)]
struct GameResponse<E: Serialize> {
    game: GameSnapshot,
    transitions: Vec<GameTransition>,
    #[serde(flatten)]
    extra: E,
}

#[derive(Debug, Serialize)]
struct NoExtra {}

#[derive(Debug, Serialize)]
struct RollExtra {
    roll: RollOutcome,
}

#[derive(Debug, Serialize)]
struct MoveExtra {
    #[serde(rename = "move")]
    outcome: MoveOutcome,
}

fn respond<E: Serialize>(status: StatusCode, update: GameUpdate, extra: E) -> HttpResponse {
    let etag = game_etag(update.game_id(), update.version);
    let body = GameResponse {
        game: update.snapshot(),
        transitions: update.transitions,
        extra,
    };
    HttpResponse::build(status)
        .insert_header((ETAG, etag))
        .json(body)
}

/// POST /api/games
async fn create_game(
    player: PlayerIdentity,
    body: ValidatedJson<CreateGameRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let update = app_state
        .flow
        .create_game(
            player.player_id,
            &player.username,
            body.stake,
            body.win_condition,
        )
        .await?;

    let location = format!("/api/games/{}", update.game_id());
    let mut response = respond(StatusCode::CREATED, update, NoExtra {});
    if let Ok(value) = location.parse() {
        response.headers_mut().insert(LOCATION, value);
    }
    Ok(response)
}

/// POST /api/games/{game_id}/join
async fn join_game(
    game_id: GameIdParam,
    player: PlayerIdentity,
    expected: ExpectedVersion,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let update = app_state
        .flow
        .join_game(game_id.0, player.player_id, &player.username, expected.0)
        .await?;
    app_state.timeouts.observe(&update);
    Ok(respond(StatusCode::OK, update, NoExtra {}))
}

/// POST /api/games/{game_id}/roll
async fn roll_dice(
    game_id: GameIdParam,
    player: PlayerIdentity,
    expected: ExpectedVersion,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (update, roll) = app_state
        .flow
        .roll_dice(game_id.0, player.player_id, expected.0)
        .await?;
    app_state.timeouts.observe(&update);
    Ok(respond(StatusCode::OK, update, RollExtra { roll }))
}

/// POST /api/games/{game_id}/moves
async fn move_token(
    game_id: GameIdParam,
    player: PlayerIdentity,
    expected: ExpectedVersion,
    body: ValidatedJson<MoveRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (update, outcome) = app_state
        .flow
        .move_token(game_id.0, player.player_id, body.token_index, expected.0)
        .await?;
    app_state.timeouts.observe(&update);
    Ok(respond(StatusCode::OK, update, MoveExtra { outcome }))
}

/// GET /api/games/{game_id}
///
/// Supports `If-None-Match`: a current ETag answers `304 Not Modified`.
async fn get_game(
    http_req: HttpRequest,
    game_id: GameIdParam,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.flow.view(game_id.0).await?;
    let current = GameTag {
        game_id: snapshot.game_id,
        version: snapshot.version,
    };
    let etag = current.to_string();

    let not_modified = http_req
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| if_none_match_hits(v, current));
    if not_modified {
        return Ok(HttpResponse::build(StatusCode::NOT_MODIFIED)
            .insert_header((ETAG, etag))
            .finish());
    }

    Ok(HttpResponse::Ok().insert_header((ETAG, etag)).json(snapshot))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(create_game)))
        .service(web::resource("/{game_id}").route(web::get().to(get_game)))
        .service(web::resource("/{game_id}/join").route(web::post().to(join_game)))
        .service(web::resource("/{game_id}/roll").route(web::post().to(roll_dice)))
        .service(web::resource("/{game_id}/moves").route(web::post().to(move_token)));
}
