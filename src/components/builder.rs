// Notification construction as an ordered ladder of capability tiers.
//
// Each tier either produces a notification or reports why it could not;
// the ladder walks down until one succeeds. Legacy construction is
// infallible, so the ladder always terminates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::PushConfig;
use super::icon::{Bitmap, IconSelection, SmallIcon};
use super::intent::PlatformIntent;
use super::platform::{NotificationService, PlatformCapabilities};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildTier {
    /// Styled notification posted to a notification channel
    StyledChannelled,
    /// Styled notification without a channel
    Styled,
    /// Icon, title, body and intent only
    Legacy,
}

impl BuildTier {
    /// Tiers the platform can attempt, best first. Always ends in `Legacy`.
    pub fn ladder_for(capabilities: &PlatformCapabilities) -> Vec<BuildTier> {
        let mut tiers = Vec::with_capacity(3);
        if capabilities.supports_styles {
            if capabilities.supports_channels {
                tiers.push(BuildTier::StyledChannelled);
            }
            tiers.push(BuildTier::Styled);
        }
        tiers.push(BuildTier::Legacy);
        tiers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationPriority {
    Default,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationStyle {
    None,
    BigText(String),
    BigPicture(Bitmap),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
}

/// Everything needed to build one notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub open_intent: PlatformIntent,
    /// Resource icon used by the legacy tier
    pub small_icon_resource_id: i32,
    pub icons: IconSelection,
    /// Big-picture image, when one was downloaded
    pub image: Option<Bitmap>,
    pub color: Option<u32>,
    pub channel_id: Option<String>,
}

/// Notification ready for the host service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltNotification {
    pub tier: BuildTier,
    pub title: String,
    pub body: String,
    pub open_intent: PlatformIntent,
    pub small_icon: SmallIcon,
    pub large_icon: Option<Bitmap>,
    pub style: NotificationStyle,
    pub priority: NotificationPriority,
    pub default_sound: bool,
    pub color: Option<u32>,
    pub channel_id: Option<String>,
}

/// Why a tier declined to build
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TierError {
    #[error("notification channel '{0}' unavailable")]
    ChannelUnavailable(String),
    #[error("malformed {0} bitmap")]
    InvalidBitmap(&'static str),
    #[error("bitmap small icons are not supported on API level {0}")]
    UnsupportedSmallIcon(u32),
}

pub struct NotificationBuilderLadder {
    capabilities: Arc<PlatformCapabilities>,
    notifications: Arc<dyn NotificationService>,
    default_channel: NotificationChannel,
}

impl NotificationBuilderLadder {
    pub fn new(
        capabilities: Arc<PlatformCapabilities>,
        notifications: Arc<dyn NotificationService>,
        config: &PushConfig,
    ) -> Self {
        Self {
            capabilities,
            notifications,
            default_channel: NotificationChannel {
                id: config.default_channel_id.clone(),
                name: config.default_channel_name.clone(),
            },
        }
    }

    /// Build with the best tier that succeeds
    pub fn build(&self, content: &NotificationContent) -> BuiltNotification {
        for tier in BuildTier::ladder_for(&self.capabilities) {
            let attempt = match tier {
                BuildTier::StyledChannelled => self.build_channelled(content),
                BuildTier::Styled => self.build_styled(content, None),
                BuildTier::Legacy => return build_legacy(content),
            };
            match attempt {
                Ok(notification) => return notification,
                Err(e) => {
                    tracing::debug!(tier = ?tier, reason = %e, "Notification tier unavailable, falling back");
                },
            }
        }
        build_legacy(content)
    }

    fn build_channelled(&self, content: &NotificationContent) -> Result<BuiltNotification, TierError> {
        let channel_id = self.resolve_channel(content.channel_id.as_deref())?;
        let mut notification = self.build_styled(content, Some(channel_id))?;
        notification.tier = BuildTier::StyledChannelled;
        Ok(notification)
    }

    /// Target channel if it exists, else the default channel (registered on
    /// demand)
    fn resolve_channel(&self, requested: Option<&str>) -> Result<String, TierError> {
        if let Some(id) = requested
            && self.notifications.channel_exists(id)
        {
            return Ok(id.to_string());
        }

        let default_id = &self.default_channel.id;
        if self.notifications.channel_exists(default_id) {
            return Ok(default_id.clone());
        }

        match self.notifications.create_channel(&self.default_channel) {
            Ok(()) => {
                tracing::debug!(channel = %default_id, "Registered default notification channel");
                Ok(default_id.clone())
            },
            Err(e) => {
                tracing::debug!(channel = %default_id, error = %e, "Default channel registration failed");
                Err(TierError::ChannelUnavailable(default_id.clone()))
            },
        }
    }

    fn build_styled(
        &self,
        content: &NotificationContent,
        channel_id: Option<String>,
    ) -> Result<BuiltNotification, TierError> {
        if let SmallIcon::Bitmap(bitmap) = &content.icons.small_icon {
            if !self.capabilities.supports_bitmap_small_icons() {
                return Err(TierError::UnsupportedSmallIcon(self.capabilities.api_level));
            }
            if !bitmap.is_valid() {
                return Err(TierError::InvalidBitmap("small icon"));
            }
        }
        if let Some(large) = &content.icons.large_icon
            && !large.is_valid()
        {
            return Err(TierError::InvalidBitmap("large icon"));
        }

        let style = match &content.image {
            Some(image) if image.is_valid() => NotificationStyle::BigPicture(image.clone()),
            Some(_) => return Err(TierError::InvalidBitmap("big picture")),
            None => NotificationStyle::BigText(content.body.clone()),
        };

        Ok(BuiltNotification {
            tier: BuildTier::Styled,
            title: content.title.clone(),
            body: content.body.clone(),
            open_intent: content.open_intent.clone(),
            small_icon: content.icons.small_icon.clone(),
            large_icon: content.icons.large_icon.clone(),
            style,
            priority: NotificationPriority::High,
            default_sound: true,
            color: content.color,
            channel_id,
        })
    }
}

fn build_legacy(content: &NotificationContent) -> BuiltNotification {
    BuiltNotification {
        tier: BuildTier::Legacy,
        title: content.title.clone(),
        body: content.body.clone(),
        open_intent: content.open_intent.clone(),
        small_icon: SmallIcon::Resource(content.small_icon_resource_id),
        large_icon: None,
        style: NotificationStyle::None,
        priority: NotificationPriority::Default,
        default_sound: false,
        color: None,
        channel_id: None,
    }
}
