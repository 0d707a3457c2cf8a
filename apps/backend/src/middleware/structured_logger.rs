//! One `request_completed` event per request.
//!
//! Level follows the outcome: 5xx is an error, rejected input (400, 401, 404,
//! 422) is a warning. Game-rule refusals (409 such as "not your turn") and
//! 402 for an underfunded stake are part of normal play, so they log at info
//! alongside successes with the problem `code` attached.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::middleware::trace_span::game_id_from_path;

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

fn is_expected_refusal(status: StatusCode) -> bool {
    matches!(status, StatusCode::CONFLICT | StatusCode::PAYMENT_REQUIRED)
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let game_id = game_id_from_path(&path);
        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, code) = match &result {
                Ok(res) => {
                    let code = res
                        .response()
                        .error()
                        .and_then(|e| e.as_error::<AppError>())
                        .map(|e| e.code().as_str());
                    (res.status(), code)
                }
                Err(err) => (
                    err.as_response_error().status_code(),
                    err.as_error::<AppError>().map(|e| e.code().as_str()),
                ),
            };
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
            let status_code = status.as_u16();
            let code = code.unwrap_or("-");

            if status.is_server_error() {
                error!(http.method = %method, url.path = %path, game_id, http.status_code = status_code, code, duration_ms, trace_id = %trace_id, "request_completed");
            } else if status.is_client_error() && !is_expected_refusal(status) {
                warn!(http.method = %method, url.path = %path, game_id, http.status_code = status_code, code, duration_ms, trace_id = %trace_id, "request_completed");
            } else {
                info!(http.method = %method, url.path = %path, game_id, http.status_code = status_code, code, duration_ms, trace_id = %trace_id, "request_completed");
            }

            result
        })
    }
}
