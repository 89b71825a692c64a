// Host platform seams: capability tiers resolved once from the OS release,
// and the collaborator traits the pipeline calls into.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::analytics::{AnalyticsClient, SessionClient};
use super::builder::{BuiltNotification, NotificationChannel};
use super::icon::{Bitmap, ImageFetcher};
use super::PushResult;

/// First release with large notification icons
pub const LARGE_ICON_MIN_API_LEVEL: u32 = 11;
/// First release with rich notification styles
pub const STYLES_MIN_API_LEVEL: u32 = 16;
/// First release with bitmap small icons
pub const BITMAP_SMALL_ICON_MIN_API_LEVEL: u32 = 23;
/// First release with notification channels
pub const CHANNELS_MIN_API_LEVEL: u32 = 26;

/// Ranked icon feature level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IconTier {
    /// Resource small icon only, no large icon
    Low,
    /// Large icons supported; small icon stays a resource because of a
    /// status-bar rendering defect on these releases
    Mid,
    /// Bitmap small icons supported
    High,
}

/// Capability descriptor, resolved once and shared by reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub api_level: u32,
    pub icon_tier: IconTier,
    pub supports_styles: bool,
    pub supports_channels: bool,
}

impl PlatformCapabilities {
    pub fn for_api_level(api_level: u32) -> Self {
        let icon_tier = if api_level >= BITMAP_SMALL_ICON_MIN_API_LEVEL {
            IconTier::High
        } else if api_level >= LARGE_ICON_MIN_API_LEVEL {
            IconTier::Mid
        } else {
            IconTier::Low
        };

        Self {
            api_level,
            icon_tier,
            supports_styles: api_level >= STYLES_MIN_API_LEVEL,
            supports_channels: api_level >= CHANNELS_MIN_API_LEVEL,
        }
    }

    pub fn supports_bitmap_small_icons(&self) -> bool {
        self.icon_tier == IconTier::High
    }
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self::for_api_level(CHANNELS_MIN_API_LEVEL)
    }
}

/// Host notification rendering service
pub trait NotificationService: Send + Sync {
    /// Post (or replace) the notification in slot `request_id`
    fn notify(&self, request_id: i32, notification: &BuiltNotification) -> PushResult<()>;

    fn channel_exists(&self, channel_id: &str) -> bool;

    fn create_channel(&self, channel: &NotificationChannel) -> PushResult<()>;

    /// Platform-level permission state. `None` means it could not be
    /// determined.
    fn are_notifications_enabled(&self) -> Option<bool>;
}

pub trait AppStateProbe: Send + Sync {
    fn is_app_in_foreground(&self) -> bool;
}

/// Application-supplied opt-out override
pub trait OptOutProvider: Send + Sync {
    fn is_opted_out(&self) -> bool;
}

/// Package resource lookup
pub trait ResourceResolver: Send + Sync {
    fn app_icon_resource_id(&self) -> PushResult<i32>;

    fn resource_id_for_name(&self, name: &str) -> Option<i32>;

    fn bitmap_for_resource(&self, resource_id: i32) -> Option<Bitmap>;
}

/// Key-value persistence
pub trait PreferencesStore: Send + Sync {
    fn get_string(&self, key: &str, default: &str) -> String;

    fn put_string(&self, key: &str, value: &str);
}

/// Actions performed when the user opens a notification
pub trait ActionLauncher: Send + Sync {
    fn open_url(&self, url: &Url);

    fn open_deep_link(&self, link: &str);

    fn open_app(&self);
}

/// External collaborators the pipeline depends on
#[derive(Clone)]
pub struct Collaborators {
    pub analytics: Arc<dyn AnalyticsClient>,
    pub session: Arc<dyn SessionClient>,
    pub notifications: Arc<dyn NotificationService>,
    pub app_state: Arc<dyn AppStateProbe>,
    pub opt_out: Option<Arc<dyn OptOutProvider>>,
    pub resources: Arc<dyn ResourceResolver>,
    pub launcher: Arc<dyn ActionLauncher>,
    pub images: Arc<dyn ImageFetcher>,
    pub preferences: Arc<dyn PreferencesStore>,
}

impl Collaborators {
    /// Both the app override and the platform permission must allow posting.
    /// An undeterminable platform state counts as enabled.
    pub fn are_app_notifications_enabled(&self) -> bool {
        let opted_out = self
            .opt_out
            .as_ref()
            .is_some_and(|provider| provider.is_opted_out());
        if opted_out {
            return false;
        }

        match self.notifications.are_notifications_enabled() {
            Some(enabled) => enabled,
            None => {
                tracing::debug!("Notification permission state unavailable, assuming enabled");
                true
            },
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("opt_out", &self.opt_out.is_some())
            .finish_non_exhaustive()
    }
}

/// Feature names mapped to their support, for diagnostics
pub fn describe_capabilities(capabilities: &PlatformCapabilities) -> HashMap<&'static str, bool> {
    let mut features = HashMap::new();
    features.insert("large_icon", capabilities.icon_tier >= IconTier::Mid);
    features.insert("bitmap_small_icon", capabilities.supports_bitmap_small_icons());
    features.insert("styles", capabilities.supports_styles);
    features.insert("channels", capabilities.supports_channels);
    features
}
