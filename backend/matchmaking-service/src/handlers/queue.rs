use actix_middleware::UserId;
use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/random-call/queue
pub async fn join_queue(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let queue_state = state.matchmaker.join(user.0).await?;
    Ok(HttpResponse::Ok().json(queue_state))
}

/// POST /api/v1/random-call/queue/heartbeat
pub async fn heartbeat(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let queue_state = state.matchmaker.heartbeat(user.0).await?;
    Ok(HttpResponse::Ok().json(queue_state))
}

/// GET /api/v1/random-call/queue
pub async fn queue_status(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let queue_state = state.matchmaker.status(user.0).await?;
    Ok(HttpResponse::Ok().json(queue_state))
}

/// DELETE /api/v1/random-call/queue
pub async fn leave_queue(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let queue_state = state.matchmaker.leave(user.0).await?;
    Ok(HttpResponse::Ok().json(queue_state))
}
