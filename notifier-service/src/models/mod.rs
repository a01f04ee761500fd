pub mod announcement;
pub mod notification;
pub mod recipient;
pub mod stock_alert;

pub use announcement::Announcement;
pub use notification::{
    NotifyResponse, PushNotification, PushReceipt, PRIORITY_HIGH, PRIORITY_NORMAL,
};
pub use recipient::{external_user_ids, ProfileRow, RecipientFilter};
pub use stock_alert::{StockAlert, StockLevel};
