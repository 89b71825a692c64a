//! Tests for components/event_source.rs

use std::collections::HashMap;

use pinpoint_push::EventSource;
use pinpoint_push::components::keys::{CAMPAIGN_TREATMENT_ID_KEY, PINPOINT_KEY};

use crate::common::{campaign_bundle, journey_bundle};

#[test]
fn test_classification() {
    assert_eq!(
        EventSource::classify(&campaign_bundle("c1", None)),
        EventSource::Campaign
    );
    assert_eq!(
        EventSource::classify(&journey_bundle("j1", "a1")),
        EventSource::Journey
    );
    assert_eq!(EventSource::classify(&HashMap::new()), EventSource::Journey);
}

#[test]
fn test_campaign_attributes_strip_prefix() {
    let mut bundle = campaign_bundle("c1", Some("act-1"));
    bundle.insert(CAMPAIGN_TREATMENT_ID_KEY.to_string(), "t0".to_string());
    bundle.insert("pinpoint.notification.title".to_string(), "Hi".to_string());

    let attributes = EventSource::Campaign.extract_attributes(&bundle).unwrap();
    assert_eq!(attributes.len(), 3);
    assert_eq!(attributes["campaign_id"], "c1");
    assert_eq!(attributes["campaign_activity_id"], "act-1");
    assert_eq!(attributes["treatment_id"], "t0");
}

#[test]
fn test_campaign_without_matches_is_none() {
    let mut bundle = HashMap::new();
    bundle.insert("unrelated".to_string(), "x".to_string());
    assert!(EventSource::Campaign.extract_attributes(&bundle).is_none());
}

#[test]
fn test_journey_attributes_keep_primitives() {
    let mut bundle = HashMap::new();
    bundle.insert(
        PINPOINT_KEY.to_string(),
        r#"{"journey":{"journey_id":"j1","attempt":2,"final":false,"nested":{"a":1},"list":[1]}}"#
            .to_string(),
    );

    let attributes = EventSource::Journey.extract_attributes(&bundle).unwrap();
    assert_eq!(attributes["journey_id"], "j1");
    assert_eq!(attributes["attempt"], "2");
    assert_eq!(attributes["final"], "false");
    assert!(!attributes.contains_key("nested"));
    assert!(!attributes.contains_key("list"));
}

#[test]
fn test_journey_malformed_or_missing_is_none() {
    let mut bundle = HashMap::new();
    assert!(EventSource::Journey.extract_attributes(&bundle).is_none());

    bundle.insert(PINPOINT_KEY.to_string(), "not json".to_string());
    assert!(EventSource::Journey.extract_attributes(&bundle).is_none());

    bundle.insert(PINPOINT_KEY.to_string(), r#"{"campaign":{}}"#.to_string());
    assert!(EventSource::Journey.extract_attributes(&bundle).is_none());
}

#[test]
fn test_event_types_and_keys() {
    assert_eq!(EventSource::Campaign.id_attribute_key(), "campaign_id");
    assert_eq!(EventSource::Journey.id_attribute_key(), "journey_id");
    assert_eq!(
        EventSource::Campaign.activity_id_attribute_key(),
        "campaign_activity_id"
    );
    assert_eq!(
        EventSource::Journey.opened_event_type(),
        "_journey.opened_notification"
    );
    assert_eq!(
        EventSource::Campaign.received_foreground_event_type(),
        "_campaign.received_foreground"
    );
    assert_eq!(
        EventSource::Campaign.received_background_event_type(),
        "_campaign.received_background"
    );
}
