use axum::{extract::rejection::JsonRejection, extract::State, http::HeaderMap, Json};
use uuid::Uuid;

use super::{idempotency_key, parse_body};
use crate::error::NotifierError;
use crate::models::{NotifyResponse, StockAlert};
use crate::services::{record_notification, DataStore, PushProvider};
use crate::startup::AppState;

/// `POST /trigger_stock_alert`
#[tracing::instrument(skip_all)]
pub async fn trigger_stock_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<StockAlert>, JsonRejection>,
) -> Result<Json<NotifyResponse>, NotifierError> {
    let result = match parse_body(payload) {
        Ok(alert) => {
            notify_stock_alert(
                state.store.as_ref(),
                state.push_provider.as_ref(),
                &alert,
                idempotency_key(&headers),
            )
            .await
        }
        Err(e) => Err(e),
    };

    match &result {
        Ok(_) => record_notification("stock_alert", "sent"),
        Err(e) => {
            record_notification("stock_alert", "failed");
            tracing::error!(error = %e, "Error sending stock alert");
        }
    }

    result.map(Json)
}

/// Alert the business owner and their staff about a product's stock level.
///
/// Stock alerts are not persisted; each call without a caller-supplied key
/// gets a fresh idempotency key.
#[tracing::instrument(
    skip_all,
    fields(user_id = %alert.user_id, level = alert.level.as_str(), provider = provider.name())
)]
pub async fn notify_stock_alert(
    store: &dyn DataStore,
    provider: &dyn PushProvider,
    alert: &StockAlert,
    idempotency_key: Option<Uuid>,
) -> Result<NotifyResponse, NotifierError> {
    let recipients = store
        .recipient_ids(&alert.recipient_filter())
        .await
        .map_err(NotifierError::RecipientQuery)?;

    let notification =
        alert.to_notification(recipients, idempotency_key.unwrap_or_else(Uuid::new_v4));

    let receipt = provider
        .send(&notification)
        .await
        .map_err(NotifierError::NotificationDispatch)?;

    tracing::info!(
        notification_id = ?receipt.notification_id,
        product_name = %alert.product_name,
        "Stock alert sent"
    );

    Ok(NotifyResponse::sent(receipt.notification_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::FakeStore;
    use crate::models::RecipientFilter;
    use crate::services::MockPushProvider;
    use serde_json::json;

    fn alert(level: &str, user_id: &str) -> StockAlert {
        serde_json::from_value(json!({
            "product_id": "prod-7",
            "product_name": "Rice 5kg",
            "quantity": 3,
            "level": level,
            "min_stock_level": 10,
            "user_id": user_id,
        }))
        .unwrap()
    }

    fn business() -> FakeStore {
        FakeStore::with_profiles(&[
            ("owner-1", "owner", None),
            ("staff-1", "staff", Some("owner-1")),
            ("staff-2", "staff", Some("owner-1")),
            ("owner-2", "owner", None),
            ("staff-3", "staff", Some("owner-2")),
        ])
    }

    #[tokio::test]
    async fn owner_alert_reaches_owner_and_staff() {
        let store = business();
        let provider = MockPushProvider::new(true);

        let response = notify_stock_alert(&store, &provider, &alert("out", "owner-1"), None)
            .await
            .unwrap();

        assert_eq!(response.notification_id.as_deref(), Some("mock-push-1"));
        assert_eq!(
            store.queries(),
            vec![RecipientFilter::Business {
                user_id: "owner-1".into()
            }]
        );

        let sent = provider.sent();
        assert_eq!(
            sent[0].external_user_ids,
            vec!["owner-1", "staff-1", "staff-2"]
        );
        assert_eq!(sent[0].priority, Some(10));
        assert!(sent[0].heading.starts_with("⚠️ OUT OF STOCK:"));
    }

    #[tokio::test]
    async fn staff_alert_reaches_only_the_staff_member() {
        let store = business();
        let provider = MockPushProvider::new(true);

        notify_stock_alert(&store, &provider, &alert("low", "staff-3"), None)
            .await
            .unwrap();

        let sent = provider.sent();
        assert_eq!(sent[0].external_user_ids, vec!["staff-3"]);
        assert_eq!(sent[0].priority, Some(5));
        assert!(sent[0].heading.starts_with("📦 Low Stock:"));
    }

    #[tokio::test]
    async fn query_failure_skips_dispatch() {
        let store = FakeStore::failing();
        let provider = MockPushProvider::new(true);

        let err = notify_stock_alert(&store, &provider, &alert("out", "owner-1"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, NotifierError::RecipientQuery(_)));
        assert_eq!(provider.send_count(), 0);
    }

    #[tokio::test]
    async fn stock_alerts_are_not_persisted() {
        let store = business();
        let provider = MockPushProvider::new(true);

        notify_stock_alert(&store, &provider, &alert("low", "owner-1"), None)
            .await
            .unwrap();

        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn each_alert_gets_its_own_key() {
        let store = business();
        let provider = MockPushProvider::new(true);
        let alert = alert("low", "owner-1");

        notify_stock_alert(&store, &provider, &alert, None).await.unwrap();
        notify_stock_alert(&store, &provider, &alert, None).await.unwrap();

        let sent = provider.sent();
        assert!(sent[0].idempotency_key.is_some());
        assert_ne!(sent[0].idempotency_key, sent[1].idempotency_key);
    }
}
