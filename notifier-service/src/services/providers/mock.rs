use super::{ProviderError, PushProvider};
use crate::models::{PushNotification, PushReceipt};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Mock push provider for local runs and tests.
///
/// Keeps every dispatched notification so callers can inspect the payload.
/// A dry-run mock marks its receipts as simulated so nothing downstream
/// records them as real deliveries.
pub struct MockPushProvider {
    enabled: bool,
    dry_run: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<PushNotification>>,
}

impl MockPushProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            dry_run: false,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Stand-in for the vendor when push delivery is switched off.
    pub fn dry_run(self) -> Self {
        Self {
            dry_run: true,
            ..self
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Notifications accepted so far, oldest first.
    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    async fn send(&self, notification: &PushNotification) -> Result<PushReceipt, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock push provider is not enabled".to_string(),
            ));
        }

        let count = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }

        tracing::info!(
            recipients = notification.external_user_ids.len(),
            heading = %notification.heading,
            "[MOCK] Push notification would be sent"
        );

        Ok(PushReceipt {
            notification_id: Some(format!("mock-push-{}", count)),
            recipients: Some(notification.external_user_ids.len() as u64),
            errors: None,
            simulated: self.dry_run,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
