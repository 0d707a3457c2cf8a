use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::domain::money::Money;
use crate::domain::state::PlayerId;
use crate::error::AppError;
use crate::extractors::PlayerIdentity;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct AccountResponse {
    owner_id: PlayerId,
    username: String,
    balance: Money,
}

/// GET /api/accounts/me
///
/// First contact opens the account at zero.
async fn me(
    player: PlayerIdentity,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let account = app_state
        .ledger
        .open_account(player.player_id, &player.username)
        .await?;
    Ok(HttpResponse::Ok().json(AccountResponse {
        owner_id: account.owner_id,
        username: account.username,
        balance: account.balance,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/me").route(web::get().to(me)));
}
