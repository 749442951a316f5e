pub mod admin;
pub mod likes;
pub mod queue;
pub mod sessions;

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
            web::scope("/internal")
                .wrap(MetricsMiddleware)
                .route("/random-call/cleanup", web::post().to(admin::cleanup)),
        )
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(jwt))
                .wrap(MetricsMiddleware)
                .service(
                    web::scope("/random-call")
                        .service(
                            web::resource("/queue")
                                .route(web::get().to(queue::queue_status))
                                .route(web::post().to(queue::join_queue))
                                .route(web::delete().to(queue::leave_queue)),
                        )
                        .route("/queue/heartbeat", web::post().to(queue::heartbeat))
                        .route("/sessions/current", web::get().to(sessions::current_session))
                        .route("/sessions/{id}", web::get().to(sessions::get_session))
                        .route("/sessions/{id}/join", web::post().to(sessions::join_session))
                        .route("/sessions/{id}/end-call", web::post().to(sessions::end_call))
                        .route("/sessions/{id}/decision", web::post().to(sessions::submit_decision))
                        .route("/sessions/{id}/leave", web::post().to(sessions::leave_session))
                        .route("/sessions/{id}/token", web::post().to(sessions::room_token)),
                )
                .route("/likes/{user_id}", web::post().to(likes::like_user))
                .route("/matches", web::get().to(likes::list_matches)),
        );
}
