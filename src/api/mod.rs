// ============================================================================
// HTTP API
// ============================================================================
//
//   GET        /order/{id}    fetch
//   POST       /order         create
//   PUT|PATCH  /order/{id}    modify
//   DELETE     /order/{id}    cancel
//   PUT|PATCH  /payment/{id}  pay (auto-prepares)
//   DELETE     /receipt/{id}  complete
//   GET        /health, /metrics   (no auth)
//
// App data expected: web::Data<OrderService>, web::Data<Credentials>,
// web::Data<Arc<Metrics>>.
//
// ============================================================================

mod auth;
mod errors;
mod handlers;
mod views;

use actix_web::web;

use crate::metrics::{health_handler, metrics_handler};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/order").route(web::post().to(handlers::create_order)))
        .service(
            web::resource("/order/{id}")
                .route(web::get().to(handlers::get_order))
                .route(web::put().to(handlers::update_order))
                .route(web::patch().to(handlers::update_order))
                .route(web::delete().to(handlers::cancel_order)),
        )
        .service(
            web::resource("/payment/{id}")
                .route(web::put().to(handlers::pay_order))
                .route(web::patch().to(handlers::pay_order)),
        )
        .service(web::resource("/receipt/{id}").route(web::delete().to(handlers::complete_order)))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler));
}

// ============================================================================
// HTTP Tests
// ============================================================================
