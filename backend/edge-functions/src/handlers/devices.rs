use actix_middleware::{require_admin, UserId};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::Platform;
use crate::services::PushRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterDevice {
    pub token: String,
    pub platform: Platform,
}

/// POST /api/v1/devices
pub async fn register(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<RegisterDevice>,
) -> AppResult<HttpResponse> {
    let body = body.into_inner();
    state.push.register_device(user.0, &body.token, body.platform).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/v1/devices/{token}
pub async fn unregister(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    state.push.unregister_device(user.0, &path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /internal/push
pub async fn dispatch(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PushRequest>,
) -> actix_web::Result<HttpResponse> {
    require_admin(&req, state.admin_token.as_deref())?;
    let report = state.push.dispatch(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
