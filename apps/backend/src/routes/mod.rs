use actix_web::web;

pub mod health;
pub mod matches;
pub mod players;

/// Register every route. `main` wraps the app in middleware; tests call this
/// directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/health").configure(health::configure_routes))
        .service(web::scope("/api/matches").configure(matches::configure_routes))
        .service(web::scope("/api/players").configure(players::configure_routes));
}
