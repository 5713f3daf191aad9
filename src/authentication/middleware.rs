use crate::utils::build_error_response;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::middleware::Next;
use actix_web::web;
use secrecy::{ExposeSecret, Secret};

/// Shared secret the cron scheduler presents as a bearer token. `None`
/// leaves the cron routes open.
#[derive(Clone)]
pub struct CronSecret(pub Option<Secret<String>>);

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

pub async fn reject_unauthorized_cron_calls(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let cron_secret = req.app_data::<web::Data<CronSecret>>().cloned();

    let authorized = match cron_secret.as_ref().and_then(|s| s.0.as_ref()) {
        None => true,
        Some(expected) => bearer_token(&req) == Some(expected.expose_secret().as_str()),
    };

    if !authorized {
        let msg = "Unauthorized";
        let response = build_error_response(StatusCode::UNAUTHORIZED, msg.to_string());
        return Err(InternalError::from_response(anyhow::anyhow!(msg), response).into());
    }

    next.call(req).await
}
