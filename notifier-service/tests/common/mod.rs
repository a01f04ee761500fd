#![allow(dead_code)]

use notifier_service::config::{
    HttpClientConfig, NotifierConfig, OneSignalConfig, SupabaseConfig,
};
use notifier_service::startup::Application;
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use wiremock::MockServer;

pub const TEST_APP_ID: &str = "test-app-id";
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_SERVICE_KEY: &str = "test-service-role-key";

/// A running notifier wired to stand-in data store and vendor servers.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub store: MockServer,
    pub vendor: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_push(true).await
    }

    /// Spawn with OneSignal switched on or off.
    pub async fn spawn_with_push(push_enabled: bool) -> Self {
        let store = MockServer::start().await;
        let vendor = MockServer::start().await;

        // Use random port for testing (port 0)
        let config = NotifierConfig {
            common: CoreConfig { port: 0 },
            supabase: SupabaseConfig {
                url: store.uri(),
                service_role_key: Secret::new(TEST_SERVICE_KEY.to_string()),
            },
            onesignal: OneSignalConfig {
                app_id: TEST_APP_ID.to_string(),
                api_key: Secret::new(TEST_API_KEY.to_string()),
                api_url: vendor.uri(),
                enabled: push_enabled,
            },
            http: HttpClientConfig {
                timeout_secs: Some(5),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            store,
            vendor,
            client,
        }
    }

    pub async fn post(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/{}", self.address, route))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// JSON bodies of the requests the vendor received, in order.
    pub async fn vendor_payloads(&self) -> Vec<Value> {
        json_bodies(&self.vendor, "/notifications").await
    }

    /// JSON bodies of the requests the data store received on `path`.
    pub async fn store_payloads(&self, path: &str) -> Vec<Value> {
        json_bodies(&self.store, path).await
    }

    /// Query strings of the requests the data store received on `path`.
    pub async fn store_queries(&self, path: &str) -> Vec<Vec<(String, String)>> {
        self.store
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .map(|request| {
                request
                    .url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .collect()
    }
}

async fn json_bodies(server: &MockServer, path: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == path)
        .map(|request| serde_json::from_slice(&request.body).expect("request body is JSON"))
        .collect()
}
