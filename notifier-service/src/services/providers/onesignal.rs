use super::{ProviderError, PushProvider};
use crate::config::OneSignalConfig;
use crate::models::{PushNotification, PushReceipt};
use crate::services::metrics::record_provider_call;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use service_core::observability::TracedClientExt;
use uuid::Uuid;

const PROVIDER: &str = "onesignal";

pub struct OneSignalProvider {
    config: OneSignalConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct Localized<'a> {
    en: &'a str,
}

#[derive(Debug, Serialize)]
struct OneSignalRequest<'a> {
    app_id: &'a str,
    include_external_user_ids: &'a [String],
    contents: Localized<'a>,
    headings: Localized<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<u8>,
    data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    idempotency_key: Option<Uuid>,
}

impl<'a> OneSignalRequest<'a> {
    fn new(app_id: &'a str, notification: &'a PushNotification) -> Self {
        Self {
            app_id,
            include_external_user_ids: &notification.external_user_ids,
            contents: Localized {
                en: &notification.content,
            },
            headings: Localized {
                en: &notification.heading,
            },
            priority: notification.priority,
            data: &notification.data,
            idempotency_key: notification.idempotency_key,
        }
    }
}

impl OneSignalProvider {
    pub fn new(config: OneSignalConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn notifications_url(&self) -> String {
        format!("{}/notifications", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PushProvider for OneSignalProvider {
    async fn send(&self, notification: &PushNotification) -> Result<PushReceipt, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "OneSignal push provider is not enabled".to_string(),
            ));
        }

        let request = OneSignalRequest::new(&self.config.app_id, notification);

        let response = self
            .client
            .traced_post(&self.notifications_url())
            .header(
                "Authorization",
                &format!("Basic {}", self.config.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                record_provider_call(PROVIDER, "error");
                ProviderError::Connection(format!("Failed to connect to OneSignal: {}", e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            record_provider_call(PROVIDER, "error");
            ProviderError::Connection(format!("Failed to read OneSignal response: {}", e))
        })?;

        if !status.is_success() {
            record_provider_call(PROVIDER, "rejected");
            tracing::error!(status = %status, body = %body, "OneSignal rejected notification");
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: PushReceipt = serde_json::from_str(&body).map_err(|e| {
            record_provider_call(PROVIDER, "invalid_response");
            ProviderError::InvalidResponse(format!("Failed to parse OneSignal response: {}", e))
        })?;

        // OneSignal answers 200 with an `errors` list for partial failures
        // such as unsubscribed users; the dispatch itself still happened.
        if let Some(errors) = &receipt.errors {
            tracing::warn!(errors = %errors, "OneSignal reported delivery warnings");
        }

        record_provider_call(PROVIDER, "success");
        tracing::info!(
            notification_id = ?receipt.notification_id,
            recipients = ?receipt.recipients,
            targeted = notification.external_user_ids.len(),
            "Push notification sent via OneSignal"
        );

        Ok(receipt)
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }
}
