use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};
use chrono::Utc;
use uuid::Uuid;

use super::{idempotency_key, parse_body};
use crate::error::NotifierError;
use crate::models::{Announcement, NotifyResponse};
use crate::services::{record_notification, AnnouncementUpdate, DataStore, PushProvider};
use crate::startup::AppState;

/// `POST /send_announcement`
#[tracing::instrument(skip_all)]
pub async fn send_announcement(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Announcement>, JsonRejection>,
) -> Result<Json<NotifyResponse>, NotifierError> {
    let result = match parse_body(payload) {
        Ok(announcement) => {
            notify_announcement(
                state.store.as_ref(),
                state.push_provider.as_ref(),
                &announcement,
                idempotency_key(&headers),
            )
            .await
        }
        Err(e) => Err(e),
    };

    match &result {
        Ok(_) => record_notification("announcement", "sent"),
        Err(e) => {
            record_notification("announcement", "failed");
            tracing::error!(error = %e, "Error sending announcement");
        }
    }

    result.map(Json)
}

/// Resolve recipients, push the announcement, then stamp the row as sent.
///
/// Without an explicit key the vendor idempotency key derives from the
/// announcement id, so replays of the same announcement collapse.
#[tracing::instrument(
    skip_all,
    fields(announcement_id = %announcement.announcement_id, provider = provider.name())
)]
pub async fn notify_announcement(
    store: &dyn DataStore,
    provider: &dyn PushProvider,
    announcement: &Announcement,
    idempotency_key: Option<Uuid>,
) -> Result<NotifyResponse, NotifierError> {
    let recipients = store
        .recipient_ids(&announcement.recipient_filter())
        .await
        .map_err(NotifierError::RecipientQuery)?;

    if recipients.is_empty() {
        tracing::warn!(target_role = ?announcement.target_role, "Announcement has no recipients");
    }

    let key = idempotency_key.unwrap_or_else(|| announcement.idempotency_key());
    let notification = announcement.to_notification(recipients, key);

    let receipt = provider
        .send(&notification)
        .await
        .map_err(NotifierError::NotificationDispatch)?;

    if receipt.simulated {
        tracing::warn!(
            provider = provider.name(),
            "Push delivery is simulated; announcement left unsent"
        );
        return Ok(NotifyResponse::sent(receipt.notification_id));
    }

    let update = store
        .mark_announcement_sent(
            &announcement.announcement_id,
            Utc::now(),
            receipt.notification_id.as_deref(),
        )
        .await
        .map_err(NotifierError::Persistence)?;

    match update {
        AnnouncementUpdate::Recorded => tracing::info!(
            notification_id = ?receipt.notification_id,
            "Announcement sent"
        ),
        AnnouncementUpdate::Skipped => tracing::warn!(
            notification_id = ?receipt.notification_id,
            "Announcement was already marked as sent; row left unchanged"
        ),
    }

    Ok(NotifyResponse::sent(receipt.notification_id))
}
