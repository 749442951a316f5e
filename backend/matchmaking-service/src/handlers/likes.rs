use actix_middleware::UserId;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    fn bounds(&self) -> (i64, i64) {
        (
            self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE),
            self.offset.unwrap_or(0).max(0),
        )
    }
}

pub async fn like_user(
    state: web::Data<AppState>,
    user: UserId,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let outcome = state.likes.like(user.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn list_matches(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let (limit, offset) = query.bounds();
    let matches = state.likes.matches(user.0, limit, offset).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "matches": matches })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        let q = PageQuery { limit: None, offset: None };
        assert_eq!(q.bounds(), (50, 0));
        let q = PageQuery { limit: Some(1000), offset: Some(-3) };
        assert_eq!(q.bounds(), (100, 0));
        let q = PageQuery { limit: Some(0), offset: Some(20) };
        assert_eq!(q.bounds(), (1, 20));
    }
}
