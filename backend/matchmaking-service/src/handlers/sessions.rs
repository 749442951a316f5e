use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Decision;
use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

pub async fn current_session(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let view = state.sessions.current(user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn get_session(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.sessions.get(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn join_session(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.sessions.join(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn end_call(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.sessions.end_call(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn submit_decision(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<DecisionRequest>,
) -> AppResult<HttpResponse> {
    let view = state
        .sessions
        .decide(path.into_inner(), user.0, body.decision)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn leave_session(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let view = state.sessions.leave(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn room_token(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let access = state.sessions.room_token(path.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(access))
}
