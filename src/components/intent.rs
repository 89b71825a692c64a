// Open intents and the provider hook that builds them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::payload::{ChannelType, HandlerRef};

/// How the host activates the handler when the notification is tapped.
///
/// Service activation keeps the process alive long enough to finish; a
/// broadcast may be cut short on constrained platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    Service,
    Broadcast,
}

/// Platform intent fired when the user opens a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIntent {
    pub target: HandlerRef,
    pub action: String,
    pub activation: Activation,
    pub request_id: i32,
    pub extras: BTreeMap<String, String>,
}

impl PlatformIntent {
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

/// Arguments shared by every provider's open-intent construction
#[derive(Debug, Clone, Copy)]
pub struct OpenIntentArgs<'a> {
    pub push_data: &'a std::collections::HashMap<String, String>,
    pub target_handler: &'a HandlerRef,
    pub opened_marker: &'a str,
    pub request_id: i32,
    pub intent_action: &'a str,
}

/// Provider-specific open-intent construction
pub trait ProviderAdapter: Send + Sync {
    fn channel_type(&self) -> ChannelType;

    /// Build the open intent, or `None` when `intent_action` belongs to a
    /// different provider
    fn build_open_intent(&self, args: &OpenIntentArgs<'_>) -> Option<PlatformIntent>;
}
