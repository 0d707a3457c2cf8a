use actix_web::{web, HttpResponse};

use crate::domain::conversation::ConversationInput;
use crate::error::AppError;
use crate::extractors::{PlayerIdentity, ValidatedJson};
use crate::state::app_state::AppState;

/// POST /api/conversation
///
/// One chat input (button press or free text). Answers with the user's new
/// step and what to show them.
async fn converse(
    player: PlayerIdentity,
    body: ValidatedJson<ConversationInput>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let turn = app_state
        .conversations
        .handle(player.player_id, &player.username, body.into_inner())
        .await?;
    if let Some(update) = &turn.game_update {
        app_state.timeouts.observe(update);
    }
    Ok(HttpResponse::Ok().json(turn))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::post().to(converse)));
}
