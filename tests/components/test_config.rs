//! Tests for components/config.rs

use std::collections::HashMap;
use std::time::Duration;

use pinpoint_push::{PushConfig, PushError};

#[test]
fn test_defaults() {
    let config = PushConfig::default();
    assert!(!config.post_in_foreground);
    assert_eq!(config.default_channel_id, "PINPOINT.NOTIFICATION");
    assert_eq!(config.image_download_timeout(), Duration::from_secs(10));
    assert_eq!(config.image_cache_ttl(), Duration::from_secs(3600));
}

#[test]
fn test_json_fills_missing_fields() {
    let config = PushConfig::from_json_str(r#"{"post_in_foreground": true}"#).unwrap();
    assert!(config.post_in_foreground);
    assert_eq!(config.default_channel_name, "Notifications");

    assert!(matches!(
        PushConfig::from_json_str("{broken"),
        Err(PushError::Json(_))
    ));
}

#[test]
fn test_overlay_applies_and_skips_bad_values() {
    let mut env = HashMap::new();
    env.insert("POST_IN_FOREGROUND", "true");
    env.insert("IMAGE_DOWNLOAD_TIMEOUT_SECS", "soon");
    env.insert("DEFAULT_CHANNEL_ID", "promos");
    env.insert("MAX_IMAGE_BYTES", "2048");

    let config =
        PushConfig::default().overlay(|name| env.get(name).map(|value| value.to_string()));

    assert!(config.post_in_foreground);
    assert_eq!(config.image_download_timeout_secs, 10);
    assert_eq!(config.default_channel_id, "promos");
    assert_eq!(config.max_image_bytes, 2048);
}
