//! HTTP routes over [`ExchangeService`](crate::service::ExchangeService).

use actix_web::web;

pub mod dto;
mod error;
mod handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health)).service(
        web::scope("/currencies")
            .route("", web::get().to(handlers::list_currencies))
            .route("/rates", web::put().to(handlers::update_rates))
            .route("/last-updated", web::get().to(handlers::last_updated))
            .route("/convert", web::post().to(handlers::convert))
            .route("/{code}", web::get().to(handlers::get_currency)),
    );
}
