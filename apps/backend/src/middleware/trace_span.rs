//! Per-request `request` span.
//!
//! Fields: `trace_id` (from `RequestTrace`), `method`, `path`, the calling
//! `player_id` and, for game routes, the `game_id` taken from the path. Every
//! event logged inside a handler inherits them, so one game's history can be
//! filtered out of the stream by `game_id` alone.
//!
//! Must sit inside `RequestTrace` (registered before it with `.wrap`) so the
//! trace id is already in the request extensions.

use std::future::{ready, Ready};

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{info_span, Instrument};

use crate::domain::state::GameId;
use crate::extractors::player::PLAYER_ID_HEADER;

const GAMES_PREFIX: &str = "/api/games/";

/// Game id addressed by a `/api/games/{id}[/...]` path.
pub(crate) fn game_id_from_path(path: &str) -> Option<GameId> {
    let rest = path.strip_prefix(GAMES_PREFIX)?;
    let segment = rest.split('/').next()?;
    segment.parse::<GameId>().ok().filter(|id| *id > 0)
}

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "missing-trace-id".to_string());
        let player_id = req
            .headers()
            .get(PLAYER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let game_id = game_id_from_path(req.path());

        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path(),
            player_id = player_id.as_deref().unwrap_or("-"),
            game_id = tracing::field::Empty,
        );
        if let Some(game_id) = game_id {
            span.record("game_id", game_id);
        }

        Box::pin(self.service.call(req).instrument(span))
    }
}
