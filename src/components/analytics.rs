// Analytics and session collaborators, plus the event value they exchange

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Analytics event recorded for a push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub attributes: BTreeMap<String, String>,
}

impl AnalyticsEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn with_attributes(mut self, attributes: &HashMap<String, String>) -> Self {
        self.attributes
            .extend(attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Event recording and submission. Treated as opaque by the pipeline.
pub trait AnalyticsClient: Send + Sync {
    fn create_event(&self, event_type: &str) -> AnalyticsEvent {
        AnalyticsEvent::new(event_type)
    }

    fn record_event(&self, event: AnalyticsEvent);

    fn submit_events(&self);

    fn add_global_attribute(&self, key: &str, value: &str);

    fn set_campaign_attributes(&self, attributes: HashMap<String, String>);
}

pub trait SessionClient: Send + Sync {
    fn stop_session(&self);
}
