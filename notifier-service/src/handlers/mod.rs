//! HTTP handlers for notifier-service.

pub mod announcement;
pub mod health;
pub mod stock_alert;

pub use announcement::{notify_announcement, send_announcement};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use stock_alert::{notify_stock_alert, trigger_stock_alert};

use axum::{extract::rejection::JsonRejection, http::HeaderMap, Json};
use uuid::Uuid;
use validator::Validate;

use crate::error::NotifierError;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Unwrap a JSON body and run its field validation.
fn parse_body<T: Validate>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, NotifierError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}

/// Caller-supplied idempotency key, if it is a UUID.
fn idempotency_key(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(IDEMPOTENCY_KEY_HEADER)?.to_str().ok()?.trim();
    match Uuid::parse_str(raw) {
        Ok(key) => Some(key),
        Err(_) => {
            tracing::warn!(value = %raw, "Ignoring non-UUID Idempotency-Key header");
            None
        }
    }
}
