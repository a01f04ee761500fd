//! Data store access over the Supabase REST (PostgREST) interface.
//!
//! The notifier only reads `profiles.id` and stamps delivery metadata onto a
//! single `announcements` row; schema and access rules live in the database.

use crate::config::SupabaseConfig;
use crate::models::{external_user_ids, ProfileRow, RecipientFilter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use service_core::observability::{TracedClientExt, TracedRequest};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("data store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("data store returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected data store response: {0}")]
    Decode(String),
}

/// Outcome of stamping an announcement as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementUpdate {
    /// The row was unsent and now carries `sent_at` / `notification_id`.
    Recorded,
    /// No unsent row matched: already stamped by an earlier run, or unknown id.
    Skipped,
}

#[async_trait]
pub trait DataStore: Send + Sync {
    /// Resolve the external user ids selected by `filter`.
    async fn recipient_ids(&self, filter: &RecipientFilter) -> Result<Vec<String>, StoreError>;

    /// Record delivery on an announcement that has not been sent yet.
    async fn mark_announcement_sent(
        &self,
        announcement_id: &str,
        sent_at: DateTime<Utc>,
        notification_id: Option<&str>,
    ) -> Result<AnnouncementUpdate, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize)]
struct AnnouncementSent<'a> {
    sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notification_id: Option<&'a str>,
}

#[derive(Clone)]
pub struct PostgrestStore {
    client: Client,
    rest_url: String,
    service_key: Secret<String>,
}

impl PostgrestStore {
    pub fn new(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", config.url.trim_end_matches('/')),
            service_key: config.service_role_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn authorized(&self, request: TracedRequest) -> TracedRequest {
        let key = self.service_key.expose_secret();
        request
            .header("apikey", key)
            .header("Authorization", &format!("Bearer {}", key))
    }

    async fn checked(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status, body })
    }

    async fn select_profiles(
        &self,
        params: &[(&'static str, String)],
    ) -> Result<Vec<ProfileRow>, StoreError> {
        let response = self
            .authorized(self.client.traced_get(&self.table_url("profiles")))
            .query(params)
            .send()
            .await?;

        Self::checked(response)
            .await?
            .json::<Vec<ProfileRow>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DataStore for PostgrestStore {
    async fn recipient_ids(&self, filter: &RecipientFilter) -> Result<Vec<String>, StoreError> {
        let rows = self.select_profiles(&filter.query_params()).await?;
        let ids = external_user_ids(rows);

        tracing::debug!(filter = ?filter, recipients = ids.len(), "Resolved recipients");
        Ok(ids)
    }

    async fn mark_announcement_sent(
        &self,
        announcement_id: &str,
        sent_at: DateTime<Utc>,
        notification_id: Option<&str>,
    ) -> Result<AnnouncementUpdate, StoreError> {
        let filter = [
            ("id", format!("eq.{}", announcement_id)),
            ("sent_at", "is.null".to_string()),
        ];

        let response = self
            .authorized(self.client.traced_patch(&self.table_url("announcements")))
            .query(&filter)
            .header("Prefer", "return=representation")
            .json(&AnnouncementSent {
                sent_at,
                notification_id,
            })
            .send()
            .await?;

        let updated: Vec<serde_json::Value> = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        if updated.is_empty() {
            Ok(AnnouncementUpdate::Skipped)
        } else {
            Ok(AnnouncementUpdate::Recorded)
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.select_profiles(&[("select", "id".to_string()), ("limit", "1".to_string())])
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::error!("Data store health check failed: {}", e);
                e
            })
    }
}
