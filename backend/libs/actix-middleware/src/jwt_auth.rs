use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    Error, HttpMessage, HttpResponse,
};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

const MIN_SECRET_LEN: usize = 32;

/// User ID extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

/// Claims carried by access tokens from the auth backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum JwtConfigError {
    #[error("JWT secret too short: {0} bytes, need at least {MIN_SECRET_LEN}")]
    SecretTooShort(usize),
}

/// Shared verification settings
#[derive(Clone)]
pub struct JwtAuthConfig {
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl JwtAuthConfig {
    pub fn new(secret: &str, audience: Option<&str>) -> Result<Self, JwtConfigError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(JwtConfigError::SecretTooShort(secret.len()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(validation),
        })
    }

    /// Validate a raw token and return the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<(UserId, Claims), String> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| format!("Invalid token: {}", e))?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| "Invalid token: malformed subject".to_string())?;

        Ok((UserId(user_id), data.claims))
    }
}

fn unauthorized_response(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse::new(
        "Unauthorized",
        message,
        401,
        kinds::AUTHENTICATION_ERROR,
        error_codes::INVALID_CREDENTIALS,
    ))
}

fn unauthorized(message: &str) -> Error {
    InternalError::from_response(message.to_string(), unauthorized_response(message)).into()
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, &'static str> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or("Missing Authorization header")?;

    header
        .strip_prefix("Bearer ")
        .ok_or("Authorization must use Bearer scheme")
}

/// JWT Authentication Middleware
pub struct JwtAuthMiddleware {
    config: JwtAuthConfig,
}

impl JwtAuthMiddleware {
    pub fn new(config: JwtAuthConfig) -> Self {
        Self { config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
            config: self.config.clone(),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
    config: JwtAuthConfig,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let verified = bearer_token(&req)
                .map_err(str::to_string)
                .and_then(|token| config.verify(token));

            match verified {
                Ok((user_id, claims)) => {
                    req.extensions_mut().insert(user_id);
                    req.extensions_mut().insert(claims);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(message) => {
                    tracing::debug!("JWT validation failed: {}", message);
                    Ok(req
                        .into_response(unauthorized_response(&message))
                        .map_into_right_body())
                }
            }
        })
    }
}

impl actix_web::FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<UserId>() {
            Some(user_id) => ready(Ok(*user_id)),
            None => ready(Err(unauthorized("User not authenticated"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-test-secret-test-secret";

    fn token_for(sub: &str, expires_in_seconds: i64, secret: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            exp: (now + expires_in_seconds) as usize,
            iat: Some(now as usize),
            email: None,
            role: Some("authenticated".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    async fn whoami(user: UserId) -> HttpResponse {
        HttpResponse::Ok().body(user.0.to_string())
    }

    fn config() -> JwtAuthConfig {
        JwtAuthConfig::new(SECRET, None).unwrap()
    }

    #[::core::prelude::v1::test]
    fn test_rejects_short_secret() {
        assert!(matches!(
            JwtAuthConfig::new("short", None),
            Err(JwtConfigError::SecretTooShort(5))
        ));
    }

    #[actix_rt::test]
    async fn test_valid_token_exposes_user_id() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(config()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let user = Uuid::new_v4();
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((
                "Authorization",
                format!("Bearer {}", token_for(&user.to_string(), 3600, SECRET)),
            ))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body = test::read_body(resp).await;
        assert_eq!(body, user.to_string().as_bytes());
    }

    #[actix_rt::test]
    async fn test_expired_token_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(config()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((
                "Authorization",
                format!(
                    "Bearer {}",
                    token_for(&Uuid::new_v4().to_string(), -3600, SECRET)
                ),
            ))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_rt::test]
    async fn test_wrong_secret_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(config()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let other = "another-secret-another-secret-another";
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((
                "Authorization",
                format!("Bearer {}", token_for(&Uuid::new_v4().to_string(), 3600, other)),
            ))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_rt::test]
    async fn test_non_uuid_subject_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(config()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header((
                "Authorization",
                format!("Bearer {}", token_for("user-123", 3600, SECRET)),
            ))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_rt::test]
    async fn test_missing_header_rejected_with_json_body() {
        let app = test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(config()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "INVALID_CREDENTIALS");
    }
}
