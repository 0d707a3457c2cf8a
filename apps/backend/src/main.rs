use actix_web::{web, App, HttpServer};
use ludo_backend::config::db::DbProfile;
use ludo_backend::config::game::GameConfig;
use ludo_backend::infra::state::build_state;
use ludo_backend::middleware::{cors_middleware, RequestTrace, StructuredLogger, TraceSpan};
use ludo_backend::routes;
use tracing::{error, info};

mod telemetry;

fn fail(message: &str) -> ! {
    error!("{message}");
    eprintln!("❌ {message}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: env_file in docker-compose or docker run --env-file
    // - Local dev: source an env file (set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| fail("BACKEND_PORT must be a valid port number"));

    let profile = DbProfile::from_env().unwrap_or_else(|e| fail(&e.to_string()));
    let config = GameConfig::from_env().unwrap_or_else(|e| fail(&e.to_string()));

    let mut builder = build_state().with_db(profile).with_config(config);
    if let Ok(secret) = std::env::var("PAYMENT_WEBHOOK_SECRET") {
        builder = builder.with_webhook_secret(secret);
    }
    let app_state = match builder.build().await {
        Ok(state) => state,
        Err(e) => fail(&format!("Failed to build application state: {e}")),
    };

    if let Err(e) = app_state.timeouts.resume_active().await {
        fail(&format!("Failed to resume game timeouts: {e}"));
    }

    info!(
        host = %host,
        port,
        profile = ?profile,
        stakes = ?app_state.config.stake_options,
        commission_bps = app_state.config.commission_rate.bps(),
        timeout_secs = app_state.config.game_timeout.as_secs(),
        "Starting Ludo escrow backend"
    );

    let timeouts = app_state.timeouts.clone();
    let data = web::Data::new(app_state);

    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    timeouts.shutdown();
    result
}
