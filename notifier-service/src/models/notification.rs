use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Priority the vendor gives to urgent alerts.
pub const PRIORITY_HIGH: u8 = 10;
/// Priority for routine alerts.
pub const PRIORITY_NORMAL: u8 = 5;

/// Vendor-neutral push notification addressed to external user ids.
#[derive(Debug, Clone, PartialEq)]
pub struct PushNotification {
    pub external_user_ids: Vec<String>,
    pub heading: String,
    pub content: String,
    pub priority: Option<u8>,
    /// Custom payload delivered alongside the notification.
    pub data: Value,
    /// Lets the vendor drop a repeated dispatch of the same notification.
    pub idempotency_key: Option<Uuid>,
}

/// What the vendor reported back for a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PushReceipt {
    #[serde(rename = "id")]
    pub notification_id: Option<String>,
    #[serde(default)]
    pub recipients: Option<u64>,
    /// Vendor-side warnings (e.g. unsubscribed users) reported with a 2xx.
    #[serde(default)]
    pub errors: Option<Value>,
    /// Set when nothing was actually delivered (dry-run provider).
    #[serde(skip)]
    pub simulated: bool,
}

/// Success body returned by both notifier endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
}

impl NotifyResponse {
    pub fn sent(notification_id: Option<String>) -> Self {
        Self {
            success: true,
            notification_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn receipt_reads_vendor_id() {
        let receipt: PushReceipt =
            serde_json::from_value(json!({ "id": "abc123", "recipients": 2 })).unwrap();
        assert_eq!(receipt.notification_id.as_deref(), Some("abc123"));
        assert_eq!(receipt.recipients, Some(2));
        assert!(receipt.errors.is_none());
    }

    #[test]
    fn receipt_tolerates_missing_id() {
        let receipt: PushReceipt =
            serde_json::from_value(json!({ "errors": ["All included players are not subscribed"] }))
                .unwrap();
        assert!(receipt.notification_id.is_none());
        assert!(receipt.errors.is_some());
        assert!(!receipt.simulated);
    }

    #[test]
    fn response_omits_missing_notification_id() {
        let body = serde_json::to_value(NotifyResponse::sent(None)).unwrap();
        assert_eq!(body, json!({ "success": true }));

        let body = serde_json::to_value(NotifyResponse::sent(Some("n1".into()))).unwrap();
        assert_eq!(body, json!({ "success": true, "notification_id": "n1" }));
    }
}
