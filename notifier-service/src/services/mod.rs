pub mod metrics;
pub mod providers;
pub mod store;

pub use metrics::{get_metrics, init_metrics, record_notification, record_provider_call};
pub use providers::{MockPushProvider, OneSignalProvider, ProviderError, PushProvider};
pub use store::{AnnouncementUpdate, DataStore, PostgrestStore, StoreError};
