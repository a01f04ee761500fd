pub mod mock;
pub mod onesignal;

use crate::models::{PushNotification, PushReceipt};
use async_trait::async_trait;
use thiserror::Error;

pub use mock::MockPushProvider;
pub use onesignal::OneSignalProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider rejected notification ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Dispatch once; callers decide whether a failure is retried.
    async fn send(&self, notification: &PushNotification) -> Result<PushReceipt, ProviderError>;

    /// Short label used in logs and metrics.
    fn name(&self) -> &'static str;
}
