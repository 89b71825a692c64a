// Campaign vs. journey classification and attribute extraction

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::{CAMPAIGN_ATTRIBUTE_PREFIX, CAMPAIGN_ID_KEY, JOURNEY_KEY, PINPOINT_KEY};

/// Origin of a server-sent push.
///
/// Both variants are static descriptors: they carry the attribute keys and
/// analytics event types of their source, and the strategy used to pull the
/// source attributes out of a raw payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// Marketing campaign; attributes are flattened under `pinpoint.campaign.`
    Campaign,
    /// Multi-step journey; attributes are nested JSON under `pinpoint.journey`
    Journey,
}

impl EventSource {
    /// Campaign when the flattened campaign id key is present, journey otherwise
    pub fn classify(attributes: &HashMap<String, String>) -> Self {
        if attributes.contains_key(CAMPAIGN_ID_KEY) {
            EventSource::Campaign
        } else {
            EventSource::Journey
        }
    }

    pub fn id_attribute_key(&self) -> &'static str {
        match self {
            EventSource::Campaign => "campaign_id",
            EventSource::Journey => "journey_id",
        }
    }

    pub fn activity_id_attribute_key(&self) -> &'static str {
        match self {
            EventSource::Campaign => "campaign_activity_id",
            EventSource::Journey => "journey_activity_id",
        }
    }

    pub fn opened_event_type(&self) -> &'static str {
        match self {
            EventSource::Campaign => "_campaign.opened_notification",
            EventSource::Journey => "_journey.opened_notification",
        }
    }

    pub fn received_foreground_event_type(&self) -> &'static str {
        match self {
            EventSource::Campaign => "_campaign.received_foreground",
            EventSource::Journey => "_journey.received_foreground",
        }
    }

    pub fn received_background_event_type(&self) -> &'static str {
        match self {
            EventSource::Campaign => "_campaign.received_background",
            EventSource::Journey => "_journey.received_background",
        }
    }

    /// Extract this source's attributes from a raw payload.
    ///
    /// Returns `None` when the payload carries no data for this source. An
    /// empty map is never returned for campaigns; `None` and "no entries"
    /// are the same answer there.
    pub fn extract_attributes(
        &self,
        raw: &HashMap<String, String>,
    ) -> Option<HashMap<String, String>> {
        match self {
            EventSource::Campaign => extract_campaign_attributes(raw),
            EventSource::Journey => extract_journey_attributes(raw),
        }
    }
}

fn extract_campaign_attributes(raw: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    let attributes: HashMap<String, String> = raw
        .iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(CAMPAIGN_ATTRIBUTE_PREFIX)
                .map(|stripped| (stripped.to_string(), value.clone()))
        })
        .collect();

    if attributes.is_empty() {
        None
    } else {
        Some(attributes)
    }
}

fn extract_journey_attributes(raw: &HashMap<String, String>) -> Option<HashMap<String, String>> {
    let envelope = raw.get(PINPOINT_KEY)?;

    let parsed: Value = match serde_json::from_str(envelope) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Unable to parse journey attributes from push payload");
            return None;
        },
    };

    let journey = parsed.get(JOURNEY_KEY)?.as_object()?;

    let attributes = journey
        .iter()
        .filter_map(|(key, value)| primitive_to_string(value).map(|v| (key.clone(), v)))
        .collect();

    Some(attributes)
}

/// Strings pass through unquoted; numbers and booleans use their JSON text.
/// Nested objects, arrays and nulls are not attributes.
pub(crate) fn primitive_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
