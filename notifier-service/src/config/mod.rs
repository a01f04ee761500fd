use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

pub const DEFAULT_ONESIGNAL_API_URL: &str = "https://onesignal.com/api/v1";

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub supabase: SupabaseConfig,
    pub onesignal: OneSignalConfig,
    pub http: HttpClientConfig,
}

/// Data store connection (Supabase / PostgREST).
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_role_key: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OneSignalConfig {
    pub app_id: String,
    pub api_key: Secret<String>,
    pub api_url: String,
    pub enabled: bool,
}

/// Outbound HTTP client settings shared by the store and the push provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpClientConfig {
    /// No timeout is applied when unset.
    pub timeout_secs: Option<u64>,
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl NotifierConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let onesignal = OneSignalConfig {
            app_id: get_env("ONESIGNAL_APP_ID", Some(""), is_prod)?,
            api_key: Secret::new(get_env("ONESIGNAL_API_KEY", Some(""), is_prod)?),
            api_url: get_env("ONESIGNAL_API_URL", Some(DEFAULT_ONESIGNAL_API_URL), is_prod)?,
            enabled: parse_flag(
                "ONESIGNAL_ENABLED",
                &get_env("ONESIGNAL_ENABLED", Some("false"), is_prod)?,
            )?,
        };
        require_live_provider(&onesignal, is_prod)?;

        Ok(NotifierConfig {
            common: common_config,
            supabase: SupabaseConfig {
                url: get_env("SUPABASE_URL", None, is_prod)?,
                service_role_key: Secret::new(get_env("SUPABASE_SERVICE_ROLE_KEY", None, is_prod)?),
            },
            onesignal,
            http: HttpClientConfig {
                timeout_secs: parse_timeout(
                    "HTTP_TIMEOUT_SECS",
                    env::var("HTTP_TIMEOUT_SECS").ok().as_deref(),
                )?,
            },
        })
    }
}

/// Production never falls back to the mock provider.
fn require_live_provider(onesignal: &OneSignalConfig, is_prod: bool) -> Result<(), AppError> {
    if is_prod && !onesignal.enabled {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "ONESIGNAL_ENABLED must be true in production"
        )));
    }
    Ok(())
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be a boolean, got '{}'",
            key,
            raw
        ))),
    }
}

fn parse_timeout(key: &str, raw: Option<&str>) -> Result<Option<u64>, AppError> {
    raw.map(|value| {
        value.trim().parse::<u64>().map_err(|_| {
            AppError::ConfigError(anyhow::anyhow!(
                "{} must be a whole number of seconds, got '{}'",
                key,
                value
            ))
        })
    })
    .transpose()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
