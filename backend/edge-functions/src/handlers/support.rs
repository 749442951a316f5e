use actix_middleware::UserId;
use actix_web::{web, HttpResponse};

use crate::error::AppResult;
use crate::services::SupportRequest;
use crate::state::AppState;

/// POST /api/v1/support
pub async fn submit(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<SupportRequest>,
) -> AppResult<HttpResponse> {
    let receipt = state.support.submit(user.0, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(receipt))
}
