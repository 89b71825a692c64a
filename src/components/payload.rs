// Provider payload shapes and their normalization into one canonical push

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event_source::primitive_to_string;
use super::keys::{
    ADM_INTENT_ACTION, BAIDU_INTENT_ACTION, FCM_INTENT_ACTION, FROM_KEY, GCM_INTENT_ACTION,
    RELAY_HANDLER,
};
use super::{PushError, PushResult};

/// Cloud messaging transport that delivered a push
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelType {
    /// Google Cloud Messaging (legacy)
    Gcm,
    /// Firebase Cloud Messaging
    Fcm,
    /// Amazon Device Messaging
    Adm,
    /// Baidu Cloud Push
    Baidu,
}

impl ChannelType {
    pub fn name(&self) -> &'static str {
        match self {
            ChannelType::Gcm => "GCM",
            ChannelType::Fcm => "FCM",
            ChannelType::Adm => "ADM",
            ChannelType::Baidu => "BAIDU",
        }
    }

    /// Intent action that tags this provider's traffic
    pub fn intent_action(&self) -> &'static str {
        match self {
            ChannelType::Gcm => GCM_INTENT_ACTION,
            ChannelType::Fcm => FCM_INTENT_ACTION,
            ChannelType::Adm => ADM_INTENT_ACTION,
            ChannelType::Baidu => BAIDU_INTENT_ACTION,
        }
    }

    pub fn from_intent_action(action: &str) -> Option<Self> {
        match action {
            GCM_INTENT_ACTION => Some(ChannelType::Gcm),
            FCM_INTENT_ACTION => Some(ChannelType::Fcm),
            ADM_INTENT_ACTION => Some(ChannelType::Adm),
            BAIDU_INTENT_ACTION => Some(ChannelType::Baidu),
            _ => None,
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Component that receives the open intent when the user taps a notification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerRef {
    /// Caller-supplied service or receiver
    Named(String),
    /// The pipeline's own relay receiver
    Relay,
}

impl HandlerRef {
    pub fn name(&self) -> &str {
        match self {
            HandlerRef::Named(name) => name,
            HandlerRef::Relay => RELAY_HANDLER,
        }
    }
}

/// Opaque ADM intent container. Its payload may be missing entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmIntent {
    pub extras: Option<HashMap<String, String>>,
}

impl AdmIntent {
    pub fn new(extras: HashMap<String, String>) -> Self {
        Self {
            extras: Some(extras),
        }
    }
}

/// Provider-tagged payload as it arrives at the transport boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPush {
    Gcm {
        from: String,
        data: HashMap<String, String>,
        handler: String,
    },
    Fcm {
        from: String,
        data: HashMap<String, String>,
    },
    Adm {
        intent: Option<AdmIntent>,
        handler: String,
    },
    Baidu {
        /// JSON-encoded message body
        message: String,
    },
}

impl RawPush {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            RawPush::Gcm { .. } => ChannelType::Gcm,
            RawPush::Fcm { .. } => ChannelType::Fcm,
            RawPush::Adm { .. } => ChannelType::Adm,
            RawPush::Baidu { .. } => ChannelType::Baidu,
        }
    }
}

/// Canonical push shared by every provider.
///
/// `bundle` is `None` when the provider payload could not be read; such a
/// push is never handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPush {
    pub from: Option<String>,
    pub bundle: Option<HashMap<String, String>>,
    pub target_handler: HandlerRef,
    pub intent_action: String,
    pub notification_channel_id: Option<String>,
}

impl NormalizedPush {
    pub fn with_notification_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.notification_channel_id = Some(channel_id.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.bundle
            .as_ref()
            .and_then(|bundle| bundle.get(key))
            .map(String::as_str)
    }
}

/// Maps each provider's wire shape into a [`NormalizedPush`].
///
/// The four construction rules share no code path; each provider's shape is
/// structurally different.
pub struct PayloadNormalizer;

impl PayloadNormalizer {
    /// Normalize a raw push. The rule is selected by `intent_action` alone and
    /// the raw payload must be of the matching provider shape.
    pub fn normalize(intent_action: &str, raw: RawPush) -> PushResult<NormalizedPush> {
        let channel =
            ChannelType::from_intent_action(intent_action).ok_or_else(|| PushError::Validation {
                field: "intent_action".to_string(),
                message: format!("Unknown intent action '{}'", intent_action),
            })?;

        match (channel, raw) {
            (ChannelType::Gcm, RawPush::Gcm { from, data, handler }) => {
                Ok(Self::gcm(from, data, handler))
            },
            (ChannelType::Fcm, RawPush::Fcm { from, data }) => Ok(Self::fcm(from, data)),
            (ChannelType::Adm, RawPush::Adm { intent, handler }) => {
                Ok(Self::adm(intent.as_ref(), handler))
            },
            (ChannelType::Baidu, RawPush::Baidu { message }) => Ok(Self::baidu(&message)),
            (channel, raw) => Err(PushError::Validation {
                field: "raw_push".to_string(),
                message: format!(
                    "{} payload supplied with {} intent action",
                    raw.channel_type(),
                    channel
                ),
            }),
        }
    }

    /// GCM: explicit sender, key-value bundle and caller-supplied handler
    pub fn gcm(
        from: impl Into<String>,
        data: HashMap<String, String>,
        handler: impl Into<String>,
    ) -> NormalizedPush {
        NormalizedPush {
            from: Some(from.into()),
            bundle: Some(data),
            target_handler: HandlerRef::Named(handler.into()),
            intent_action: GCM_INTENT_ACTION.to_string(),
            notification_channel_id: None,
        }
    }

    /// FCM: sender plus flat data map, routed through the relay receiver
    pub fn fcm(from: impl Into<String>, data: HashMap<String, String>) -> NormalizedPush {
        NormalizedPush {
            from: Some(from.into()),
            bundle: Some(data),
            target_handler: HandlerRef::Relay,
            intent_action: FCM_INTENT_ACTION.to_string(),
            notification_channel_id: None,
        }
    }

    /// ADM: sender is read from the intent payload's own `from` field
    pub fn adm(intent: Option<&AdmIntent>, handler: impl Into<String>) -> NormalizedPush {
        let extras = intent.and_then(|intent| intent.extras.clone());
        if extras.is_none() {
            tracing::debug!("ADM intent carries no payload");
        }
        let from = extras
            .as_ref()
            .and_then(|extras| extras.get(FROM_KEY))
            .cloned();

        NormalizedPush {
            from,
            bundle: extras,
            target_handler: HandlerRef::Named(handler.into()),
            intent_action: ADM_INTENT_ACTION.to_string(),
            notification_channel_id: None,
        }
    }

    /// Baidu: the whole message is a JSON object flattened into the bundle
    pub fn baidu(message: &str) -> NormalizedPush {
        let bundle = match parse_baidu_message(message) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                tracing::debug!(error = %e, "Unable to parse Baidu push message");
                None
            },
        };
        let from = bundle
            .as_ref()
            .and_then(|bundle| bundle.get(FROM_KEY))
            .cloned();

        NormalizedPush {
            from,
            bundle,
            target_handler: HandlerRef::Relay,
            intent_action: BAIDU_INTENT_ACTION.to_string(),
            notification_channel_id: None,
        }
    }
}

fn parse_baidu_message(message: &str) -> PushResult<HashMap<String, String>> {
    let parsed: Value = serde_json::from_str(message)?;
    let Value::Object(object) = parsed else {
        return Err(PushError::Validation {
            field: "message".to_string(),
            message: "Baidu message is not a JSON object".to_string(),
        });
    };

    // Nested values keep their JSON text so the journey envelope survives.
    Ok(object
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match &value {
                Value::Null => None,
                Value::Object(_) | Value::Array(_) => Some(value.to_string()),
                primitive => primitive_to_string(primitive),
            };
            text.map(|text| (key, text))
        })
        .collect())
}
