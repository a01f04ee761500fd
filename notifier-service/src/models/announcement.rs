use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::{PushNotification, RecipientFilter};

/// A broadcast request for an existing `announcements` row.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Announcement {
    #[validate(length(min = 1, message = "announcement_id cannot be empty"))]
    pub announcement_id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub target_role: Option<String>,
}

impl Announcement {
    pub fn recipient_filter(&self) -> RecipientFilter {
        RecipientFilter::for_role(self.target_role.as_deref())
    }

    /// Stable key for this announcement, so a retried broadcast of the same
    /// row is recognised as a duplicate by the vendor.
    pub fn idempotency_key(&self) -> Uuid {
        Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("announcement:{}", self.announcement_id).as_bytes(),
        )
    }

    pub fn to_notification(
        &self,
        external_user_ids: Vec<String>,
        idempotency_key: Uuid,
    ) -> PushNotification {
        PushNotification {
            external_user_ids,
            heading: self.title.clone(),
            content: self.body.clone(),
            priority: None,
            data: json!({
                "type": "announcement",
                "announcement_id": self.announcement_id,
            }),
            idempotency_key: Some(idempotency_key),
        }
    }
}
