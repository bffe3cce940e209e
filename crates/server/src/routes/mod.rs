use actix_web::web;

pub mod search;
pub mod system;

/// Register every route on an app or scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(search::search_stats)
        .service(search::search)
        .service(system::health);
}
