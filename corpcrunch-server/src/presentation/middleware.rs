use crate::domain::DomainError;
use crate::infrastructure::jwt::{AdminId, JwtService};
use crate::infrastructure::rate_limiter::{RateLimitDecision, RateLimiter};
use crate::presentation::http_handlers::error_to_response;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::error::InternalError;
use actix_web::{web, Error, HttpMessage, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::net::SocketAddr;
use std::sync::Arc;

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

fn unauthorized(req: ServiceRequest, message: &str) -> (Error, ServiceRequest) {
    let response = error_to_response(DomainError::Unauthorized(message.to_string()));
    (InternalError::from_response(message.to_string(), response).into(), req)
}

/// Bearer validator for the admin scope. The credentials are optional so a
/// missing header is answered with the same JSON error as a bad token.
pub async fn jwt_middleware(
    req: ServiceRequest,
    credentials: Option<BearerAuth>,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(credentials) = credentials else {
        return Err(unauthorized(req, "Missing bearer token"));
    };

    let jwt_service = match req.app_data::<web::Data<Arc<JwtService>>>() {
        Some(service) => service.get_ref().clone(),
        None => {
            let response = error_to_response(DomainError::InternalError(
                "JWT service not configured".to_string(),
            ));
            return Err((
                InternalError::from_response("JWT service not configured", response).into(),
                req,
            ));
        }
    };

    match jwt_service.verify_token(credentials.token()) {
        Ok(admin_id) => {
            req.extensions_mut().insert(AdminId(admin_id));
            Ok(req)
        }
        Err(err) => {
            tracing::debug!("Rejected bearer token: {}", err);
            Err(unauthorized(req, "Invalid or expired token"))
        }
    }
}

/// Key used for per-client throttling: first `x-forwarded-for` hop, then
/// `x-real-ip`, then the socket peer.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn retry_after_secs(decision: &RateLimitDecision) -> u64 {
    let millis = decision.reset_after.as_millis() as u64;
    millis.div_ceil(1000).max(1)
}

fn apply_rate_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(
        HeaderName::from_static("x-ratelimit-limit"),
        HeaderValue::from(decision.limit),
    );
    headers.insert(
        HeaderName::from_static("x-ratelimit-remaining"),
        HeaderValue::from(decision.remaining),
    );
}

pub fn rate_limited_response(decision: &RateLimitDecision) -> HttpResponse {
    let retry_after = retry_after_secs(decision);
    let mut response = error_to_response(DomainError::RateLimited(retry_after));
    apply_rate_headers(response.headers_mut(), decision);
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    response
}

/// Checks `limiter` for the request's client, returning the 429 response to
/// send when the client is over its budget.
pub fn enforce_limit(
    limiter: &RateLimiter,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> Result<RateLimitDecision, HttpResponse> {
    let decision = limiter.check(&client_key(headers, peer));
    if decision.allowed {
        Ok(decision)
    } else {
        Err(rate_limited_response(&decision))
    }
}

/// Per-client request throttling for a scope.
pub struct RateLimit {
    limiter: Arc<RateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: S,
    limiter: Arc<RateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = match enforce_limit(&self.limiter, req.headers(), req.peer_addr()) {
            Ok(decision) => decision,
            Err(response) => {
                return Box::pin(async move {
                    Ok(req.into_response(response).map_into_right_body())
                });
            }
        };

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            apply_rate_headers(res.headers_mut(), &decision);
            Ok(res.map_into_left_body())
        })
    }
}

/// Checks the shared secret sent by the external sweep timer. Either
/// `x-cron-secret: <secret>` or `Authorization: Bearer <secret>` is accepted.
/// With no secret configured every caller passes.
pub fn verify_cron_secret(headers: &HeaderMap, expected: Option<&str>) -> Result<(), DomainError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        });

    match provided {
        Some(secret) if constant_time_eq(secret.as_bytes(), expected.as_bytes()) => Ok(()),
        Some(_) => Err(DomainError::Unauthorized("Invalid cron secret".to_string())),
        None => Err(DomainError::Unauthorized("Missing cron secret".to_string())),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
