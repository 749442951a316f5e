use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateStream {
    pub title: String,
    pub join_gift_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BuyGift {
    pub gift_id: Uuid,
}

pub async fn create_stream(
    state: web::Data<AppState>,
    user: UserId,
    body: web::Json<CreateStream>,
) -> AppResult<HttpResponse> {
    let stream = state
        .live
        .create_stream(user.0, &body.title, body.join_gift_id)
        .await?;
    Ok(HttpResponse::Created().json(stream))
}

pub async fn end_stream(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let stream = state.live.end_stream(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stream))
}

pub async fn access(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let access = state.live.access(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(access))
}

pub async fn buy_join_gift(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
    body: web::Json<BuyGift>,
) -> AppResult<HttpResponse> {
    let purchase = state
        .live
        .purchase_join_gift(user.0, path.into_inner(), body.gift_id)
        .await?;
    Ok(HttpResponse::Ok().json(purchase))
}

pub async fn token(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let token = state.live.token(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(token))
}
