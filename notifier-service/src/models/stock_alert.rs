use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use super::{PushNotification, RecipientFilter, PRIORITY_HIGH, PRIORITY_NORMAL};

/// Stock severity reported by the inventory client.
///
/// Only `out` is special; every other value is treated as a low-stock warning
/// and echoed back verbatim in the notification data. A missing level reads
/// as `low`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StockLevel {
    Out,
    #[default]
    Low,
    Other(String),
}

impl StockLevel {
    pub fn as_str(&self) -> &str {
        match self {
            StockLevel::Out => "out",
            StockLevel::Low => "low",
            StockLevel::Other(level) => level,
        }
    }

    pub fn is_out(&self) -> bool {
        matches!(self, StockLevel::Out)
    }

    pub fn priority(&self) -> u8 {
        if self.is_out() {
            PRIORITY_HIGH
        } else {
            PRIORITY_NORMAL
        }
    }
}

impl From<String> for StockLevel {
    fn from(level: String) -> Self {
        match level.as_str() {
            "out" => StockLevel::Out,
            "low" => StockLevel::Low,
            _ => StockLevel::Other(level),
        }
    }
}

impl From<StockLevel> for String {
    fn from(level: StockLevel) -> Self {
        level.as_str().to_string()
    }
}

/// A stock-level event for one product, raised on behalf of `user_id`.
///
/// Identifiers and quantities are kept as raw JSON so the notification data
/// echoes exactly what the client sent.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockAlert {
    #[serde(default)]
    pub product_id: Value,
    pub product_name: String,
    #[serde(default)]
    pub quantity: Value,
    #[serde(default)]
    pub level: StockLevel,
    #[serde(default)]
    pub min_stock_level: Value,
    #[validate(length(min = 1, message = "user_id cannot be empty"))]
    pub user_id: String,
}

impl StockAlert {
    pub fn recipient_filter(&self) -> RecipientFilter {
        RecipientFilter::for_business(&self.user_id)
    }

    pub fn heading(&self) -> String {
        if self.level.is_out() {
            format!("⚠️ OUT OF STOCK: {}", self.product_name)
        } else {
            format!("📦 Low Stock: {}", self.product_name)
        }
    }

    pub fn content(&self) -> String {
        if self.level.is_out() {
            format!(
                "{} is completely out of stock. Restock immediately!",
                self.product_name
            )
        } else {
            format!(
                "{} is running low ({} left, threshold: {})",
                self.product_name,
                display_value(&self.quantity),
                display_value(&self.min_stock_level)
            )
        }
    }

    /// Everything the client sent except the acting user.
    pub fn data(&self) -> Value {
        json!({
            "type": "stock_alert",
            "product_id": self.product_id,
            "product_name": self.product_name,
            "quantity": self.quantity,
            "level": self.level,
            "min_stock_level": self.min_stock_level,
        })
    }

    pub fn to_notification(
        &self,
        external_user_ids: Vec<String>,
        idempotency_key: Uuid,
    ) -> PushNotification {
        PushNotification {
            external_user_ids,
            heading: self.heading(),
            content: self.content(),
            priority: Some(self.level.priority()),
            data: self.data(),
            idempotency_key: Some(idempotency_key),
        }
    }
}

/// Render a JSON scalar the way it reads in a sentence: strings unquoted.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
