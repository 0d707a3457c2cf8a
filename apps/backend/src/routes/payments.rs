//! Deposit, withdrawal and gateway-callback routes.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::money::Money;
use crate::error::AppError;
use crate::extractors::{PlayerIdentity, ValidatedJson};
use crate::services::DepositResolution;
use crate::state::app_state::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize)]
struct DepositRequest {
    amount: Money,
}

#[derive(Debug, Deserialize)]
struct WithdrawalBody {
    amount: Money,
    account_details: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GatewayStatus {
    Success,
    Failed,
}

#[derive(Debug, Deserialize)]
struct WebhookRequest {
    tx_ref: String,
    status: GatewayStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum WebhookResponse {
    Credited { balance: Money },
    MarkedFailed,
    AlreadyResolved,
}

/// POST /api/deposits
async fn initiate_deposit(
    player: PlayerIdentity,
    body: ValidatedJson<DepositRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let deposit = app_state
        .payments
        .initiate_deposit(player.player_id, &player.username, body.amount)
        .await?;
    Ok(HttpResponse::Created().json(deposit))
}

/// POST /api/withdrawals
async fn request_withdrawal(
    player: PlayerIdentity,
    body: ValidatedJson<WithdrawalBody>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = app_state
        .payments
        .request_withdrawal(player.player_id, body.amount, &body.account_details)
        .await?;
    Ok(HttpResponse::Accepted().json(request))
}

fn verify_gateway(req: &HttpRequest, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let presented = req
        .headers()
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        Ok(())
    } else {
        warn!(event = "PAYMENT_WEBHOOK_REJECTED", "Webhook secret mismatch");
        Err(AppError::unauthorized("Webhook secret missing or wrong"))
    }
}

/// POST /api/payments/webhook
///
/// Called by the payment gateway once it has verified a transaction.
/// Repeated callbacks for one `tx_ref` are acknowledged without effect.
async fn payment_webhook(
    req: HttpRequest,
    body: ValidatedJson<WebhookRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    verify_gateway(&req, app_state.webhook_secret.as_deref())?;

    let succeeded = matches!(body.status, GatewayStatus::Success);
    let resolution = app_state
        .payments
        .confirm_deposit(&body.tx_ref, succeeded)
        .await?;

    let response = match resolution {
        DepositResolution::Credited { balance } => WebhookResponse::Credited { balance },
        DepositResolution::MarkedFailed => WebhookResponse::MarkedFailed,
        DepositResolution::AlreadyResolved => WebhookResponse::AlreadyResolved,
    };
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/deposits").route(web::post().to(initiate_deposit)))
        .service(web::resource("/withdrawals").route(web::post().to(request_withdrawal)))
        .service(web::resource("/payments/webhook").route(web::post().to(payment_webhook)));
}
