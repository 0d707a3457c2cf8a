use actix_web::web;

pub mod accounts;
pub mod conversation;
pub mod games;
pub mod health;
pub mod payments;

/// Register every route. `main.rs` wraps the result in the logging, trace
/// and CORS middleware; tests mount it bare.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes));
    cfg.service(web::scope("/api/games").configure(games::configure_routes));
    cfg.service(web::scope("/api/accounts").configure(accounts::configure_routes));
    cfg.service(web::scope("/api/conversation").configure(conversation::configure_routes));
    cfg.service(web::scope("/api").configure(payments::configure_routes));
}
