// Push pipeline components: payload model, classification, icon handling,
// notification construction and the dispatch state machine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod analytics;
pub mod builder;
pub mod config;
pub mod dedup;
pub mod dispatcher;
pub mod event_source;
pub mod icon;
pub mod intent;
pub mod keys;
pub mod payload;
pub mod platform;
pub mod token;

pub use analytics::{AnalyticsClient, AnalyticsEvent, SessionClient};
pub use builder::{
    BuildTier, BuiltNotification, NotificationBuilderLadder, NotificationChannel,
    NotificationContent, NotificationPriority, NotificationStyle, TierError,
};
pub use config::PushConfig;
pub use dedup::{RequestIdGenerator, java_string_hash};
pub use dispatcher::{MAX_RETAINED_RENDER_FAILURES, PushDispatcher};
pub use event_source::EventSource;
pub use icon::{
    Bitmap, BoundedFetcher, IconSelection, IconSpec, ImageFetcher, SmallIcon, grey, select_icons,
};
pub use intent::{Activation, OpenIntentArgs, PlatformIntent, ProviderAdapter};
pub use payload::{AdmIntent, ChannelType, HandlerRef, NormalizedPush, PayloadNormalizer, RawPush};
pub use platform::{
    ActionLauncher, AppStateProbe, Collaborators, IconTier, NotificationService, OptOutProvider,
    PlatformCapabilities, PreferencesStore, ResourceResolver,
};
pub use token::{DeviceTokenRegisteredHandler, DeviceTokenRegistry, HandlerId};

/// Terminal result of one dispatch. Exactly one is produced per inbound push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushOutcome {
    /// Payload carries no recognizable event source id
    NotHandled,
    /// A local notification was handed to the background renderer
    PostedNotification,
    /// App is in the foreground and foreground posting is disabled
    AppInForeground,
    /// Notifications are disabled, or the push cannot be rendered
    OptedOut,
    /// The push is a tap on a previously posted notification
    NotificationOpened,
    /// Silent (data-only) push; analytics recorded, nothing shown
    Silent,
}

impl PushOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            PushOutcome::NotHandled => "NOT_HANDLED",
            PushOutcome::PostedNotification => "POSTED_NOTIFICATION",
            PushOutcome::AppInForeground => "APP_IN_FOREGROUND",
            PushOutcome::OptedOut => "OPTED_OUT",
            PushOutcome::NotificationOpened => "NOTIFICATION_OPENED",
            PushOutcome::Silent => "SILENT",
        }
    }
}

impl std::fmt::Display for PushOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error types for the push pipeline
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// Caller supplied a payload that does not match its provider
    #[error("Validation error in {field}: {message}")]
    Validation { field: String, message: String },
    /// Icon, image or resource could not be obtained
    #[error("Resource error with {resource_type} '{resource_id}': {message}")]
    Resource {
        resource_type: String,
        resource_id: String,
        message: String,
    },
    /// Host notification service failure
    #[error("Platform error: {message}")]
    Platform { message: String },
    #[error("Timeout error in {operation} after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },
    #[error("Image decode error: {0}")]
    ImageDecode(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Several background renders failed; `errors` holds the most recent
    #[error("{count} background renders failed")]
    Renders { count: usize, errors: Vec<PushError> },
}

impl PushError {
    pub fn resource(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        PushError::Resource {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            message: message.into(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        PushError::Platform {
            message: message.into(),
        }
    }
}

/// Type alias for pipeline results
pub type PushResult<T> = Result<T, PushError>;
