//! Tests for components/payload.rs

use std::collections::HashMap;

use pinpoint_push::components::keys::{
    ADM_INTENT_ACTION, BAIDU_INTENT_ACTION, FCM_INTENT_ACTION, GCM_INTENT_ACTION, RELAY_HANDLER,
};
use pinpoint_push::{
    AdmIntent, ChannelType, HandlerRef, PayloadNormalizer, PushError, RawPush,
};

fn data(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_gcm_keeps_sender_and_handler() {
    let push = PayloadNormalizer::normalize(
        GCM_INTENT_ACTION,
        RawPush::Gcm {
            from: "sender-1".to_string(),
            data: data(&[("k", "v")]),
            handler: "com.example.PushService".to_string(),
        },
    )
    .unwrap();

    assert_eq!(push.from.as_deref(), Some("sender-1"));
    assert_eq!(push.get("k"), Some("v"));
    assert_eq!(
        push.target_handler,
        HandlerRef::Named("com.example.PushService".to_string())
    );
    assert_eq!(push.intent_action, GCM_INTENT_ACTION);
    assert_eq!(push.notification_channel_id, None);
}

#[test]
fn test_fcm_routes_through_relay() {
    let push = PayloadNormalizer::normalize(
        FCM_INTENT_ACTION,
        RawPush::Fcm {
            from: "fcm-sender".to_string(),
            data: data(&[("a", "1"), ("b", "2")]),
        },
    )
    .unwrap();

    assert_eq!(push.target_handler, HandlerRef::Relay);
    assert_eq!(push.target_handler.name(), RELAY_HANDLER);
    assert_eq!(push.bundle.as_ref().map(HashMap::len), Some(2));
    assert_eq!(push.from.as_deref(), Some("fcm-sender"));
}

#[test]
fn test_adm_reads_from_out_of_payload() {
    let push = PayloadNormalizer::normalize(
        ADM_INTENT_ACTION,
        RawPush::Adm {
            intent: Some(AdmIntent::new(data(&[("from", "adm-sender"), ("x", "y")]))),
            handler: "com.example.AdmReceiver".to_string(),
        },
    )
    .unwrap();

    assert_eq!(push.from.as_deref(), Some("adm-sender"));
    assert_eq!(push.get("x"), Some("y"));
}

#[test]
fn test_adm_without_payload_has_no_bundle() {
    let push = PayloadNormalizer::normalize(
        ADM_INTENT_ACTION,
        RawPush::Adm {
            intent: None,
            handler: "com.example.AdmReceiver".to_string(),
        },
    )
    .unwrap();
    assert!(push.bundle.is_none());
    assert!(push.from.is_none());

    let empty = PayloadNormalizer::adm(Some(&AdmIntent::default()), "handler");
    assert!(empty.bundle.is_none());
    assert_eq!(empty.get("from"), None);
}

#[test]
fn test_baidu_message_round_trip() {
    let push = PayloadNormalizer::normalize(
        BAIDU_INTENT_ACTION,
        RawPush::Baidu {
            message: r#"{"from":"X","k":"v"}"#.to_string(),
        },
    )
    .unwrap();

    assert_eq!(push.get("k"), Some("v"));
    assert_eq!(push.get("from"), Some("X"));
    assert_eq!(push.from.as_deref(), Some("X"));
    assert_eq!(push.target_handler, HandlerRef::Relay);
}

#[test]
fn test_baidu_flattens_scalars_and_keeps_nested_json() {
    let push = PayloadNormalizer::baidu(
        r#"{"count":3,"flag":true,"gone":null,"pinpoint":{"journey":{"journey_id":"j1"}}}"#,
    );

    assert_eq!(push.get("count"), Some("3"));
    assert_eq!(push.get("flag"), Some("true"));
    assert_eq!(push.get("gone"), None);

    let nested: serde_json::Value = serde_json::from_str(push.get("pinpoint").unwrap()).unwrap();
    assert_eq!(nested["journey"]["journey_id"], "j1");
}

#[test]
fn test_baidu_malformed_message_is_not_an_error() {
    let push = PayloadNormalizer::normalize(
        BAIDU_INTENT_ACTION,
        RawPush::Baidu {
            message: "{not json".to_string(),
        },
    )
    .unwrap();
    assert!(push.bundle.is_none());

    assert!(PayloadNormalizer::baidu("[1,2,3]").bundle.is_none());
}

#[test]
fn test_unknown_action_is_rejected() {
    let result = PayloadNormalizer::normalize(
        "com.example.SOMETHING_ELSE",
        RawPush::Fcm {
            from: "s".to_string(),
            data: HashMap::new(),
        },
    );
    assert!(matches!(result, Err(PushError::Validation { .. })));
}

#[test]
fn test_mismatched_shape_is_rejected() {
    let result = PayloadNormalizer::normalize(
        GCM_INTENT_ACTION,
        RawPush::Baidu {
            message: "{}".to_string(),
        },
    );
    match result {
        Err(PushError::Validation { field, .. }) => assert_eq!(field, "raw_push"),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_channel_type_intent_actions() {
    for channel in [ChannelType::Gcm, ChannelType::Fcm, ChannelType::Adm, ChannelType::Baidu] {
        assert_eq!(ChannelType::from_intent_action(channel.intent_action()), Some(channel));
    }
    assert_eq!(ChannelType::Baidu.to_string(), "BAIDU");
}

#[test]
fn test_channel_id_override() {
    let push = PayloadNormalizer::fcm("s", HashMap::new()).with_notification_channel_id("promos");
    assert_eq!(push.notification_channel_id.as_deref(), Some("promos"));
}
