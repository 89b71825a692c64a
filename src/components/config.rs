// Pipeline configuration with serde defaults and environment overlay

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::PushResult;

const ENV_PREFIX: &str = "PINPOINT_PUSH_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Post notifications even while the app is in the foreground
    pub post_in_foreground: bool,
    /// Channel registered when a push targets a channel that does not exist
    pub default_channel_id: String,
    pub default_channel_name: String,
    /// Upper bound on a single icon or image download
    pub image_download_timeout_secs: u64,
    pub image_cache_ttl_secs: u64,
    pub max_image_bytes: u64,
    /// Preferences key holding the device token
    pub device_token_key: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            post_in_foreground: false,
            default_channel_id: "PINPOINT.NOTIFICATION".to_string(),
            default_channel_name: "Notifications".to_string(),
            image_download_timeout_secs: 10,
            image_cache_ttl_secs: 3600,
            max_image_bytes: 10 * 1024 * 1024,
            device_token_key: "AWSPINPOINT.GCMTOKEN".to_string(),
        }
    }
}

impl PushConfig {
    pub fn from_json_str(json: &str) -> PushResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overlaid with `PINPOINT_PUSH_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|name| std::env::var(format!("{}{}", ENV_PREFIX, name)).ok())
    }

    /// Apply overrides from `lookup`; unparseable values are ignored
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup("POST_IN_FOREGROUND") {
            match value.parse() {
                Ok(flag) => self.post_in_foreground = flag,
                Err(_) => warn_ignored("POST_IN_FOREGROUND", &value),
            }
        }
        if let Some(value) = lookup("DEFAULT_CHANNEL_ID") {
            self.default_channel_id = value;
        }
        if let Some(value) = lookup("DEFAULT_CHANNEL_NAME") {
            self.default_channel_name = value;
        }
        if let Some(value) = lookup("IMAGE_DOWNLOAD_TIMEOUT_SECS") {
            match value.parse() {
                Ok(secs) => self.image_download_timeout_secs = secs,
                Err(_) => warn_ignored("IMAGE_DOWNLOAD_TIMEOUT_SECS", &value),
            }
        }
        if let Some(value) = lookup("IMAGE_CACHE_TTL_SECS") {
            match value.parse() {
                Ok(secs) => self.image_cache_ttl_secs = secs,
                Err(_) => warn_ignored("IMAGE_CACHE_TTL_SECS", &value),
            }
        }
        if let Some(value) = lookup("MAX_IMAGE_BYTES") {
            match value.parse() {
                Ok(bytes) => self.max_image_bytes = bytes,
                Err(_) => warn_ignored("MAX_IMAGE_BYTES", &value),
            }
        }
        if let Some(value) = lookup("DEVICE_TOKEN_KEY") {
            self.device_token_key = value;
        }
        self
    }

    pub fn image_download_timeout(&self) -> Duration {
        Duration::from_secs(self.image_download_timeout_secs)
    }

    pub fn image_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.image_cache_ttl_secs)
    }
}

fn warn_ignored(name: &str, value: &str) {
    tracing::warn!(variable = %format!("{}{}", ENV_PREFIX, name), value = %value, "Ignoring unparseable configuration value");
}
