use actix_middleware::UserId;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::services::signature::SIGNATURE_HEADER;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub product: String,
}

/// POST /api/v1/checkout/sessions
pub async fn create_checkout(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<CheckoutBody>,
) -> AppResult<HttpResponse> {
    let session = state.payments.create_checkout(user.0, &body.product).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /webhooks/payments
///
/// Takes the raw body; the signature covers the exact bytes sent.
pub async fn payment_webhook(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .map(|v| v.to_str())
        .transpose()
        .map_err(|_| AppError::InvalidSignature("signature header is not ASCII".to_string()))?;

    let outcome = state.payments.handle_webhook(signature, &body).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true, "outcome": outcome })))
}

/// GET /api/v1/wallet
pub async fn wallet(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let wallet = state.payments.wallet(user.0).await?;
    Ok(HttpResponse::Ok().json(wallet))
}

/// GET /api/v1/subscriptions/me
pub async fn my_subscription(state: web::Data<AppState>, user: UserId) -> AppResult<HttpResponse> {
    let subscription = state.payments.subscription(user.0).await?;
    let active = subscription.as_ref().is_some_and(|s| s.is_active());
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "active": active,
        "subscription": subscription,
    })))
}
