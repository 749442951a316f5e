pub mod devices;
pub mod live;
pub mod payments;
pub mod support;

use actix_middleware::{serve_metrics, JwtAuthConfig, JwtAuthMiddleware, MetricsMiddleware};
use actix_web::{web, HttpResponse};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Register every route of the service
pub fn configure(cfg: &mut web::ServiceConfig, jwt: JwtAuthConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(serve_metrics))
        .service(
            web::scope("/webhooks")
                .wrap(MetricsMiddleware)
                .route("/payments", web::post().to(payments::payment_webhook)),
        )
        .service(
            web::scope("/internal")
                .wrap(MetricsMiddleware)
                .route("/push", web::post().to(devices::dispatch)),
        )
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(jwt))
                .wrap(MetricsMiddleware)
                .route("/checkout/sessions", web::post().to(payments::create_checkout))
                .route("/wallet", web::get().to(payments::wallet))
                .route("/subscriptions/me", web::get().to(payments::my_subscription))
                .route("/devices", web::post().to(devices::register))
                .route("/devices/{token}", web::delete().to(devices::unregister))
                .route("/support", web::post().to(support::submit))
                .service(
                    web::scope("/live/streams")
                        .route("", web::post().to(live::create_stream))
                        .route("/{id}/end", web::post().to(live::end_stream))
                        .route("/{id}/access", web::get().to(live::access))
                        .route("/{id}/gifts", web::post().to(live::buy_join_gift))
                        .route("/{id}/token", web::post().to(live::token)),
                ),
        );
}
