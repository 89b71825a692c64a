//! Tests for components/dedup.rs

use std::collections::HashSet;
use std::sync::Arc;

use pinpoint_push::{RequestIdGenerator, java_string_hash};

#[test]
fn test_campaign_request_id_is_deterministic() {
    let generator = RequestIdGenerator::new();
    let first = generator.compute_request_id("c1", Some("a1"));
    let second = generator.compute_request_id("c1", Some("a1"));
    assert_eq!(first, second);
    assert_eq!(first, java_string_hash("c1:a1"));

    // A second generator agrees; nothing is process-seeded.
    assert_eq!(RequestIdGenerator::new().compute_request_id("c1", Some("a1")), first);
}

#[test]
fn test_missing_activity_hashes_as_null() {
    let generator = RequestIdGenerator::new();
    assert_eq!(
        generator.compute_request_id("c1", None),
        java_string_hash("c1:null")
    );
}

#[test]
fn test_direct_send_with_activity_is_deterministic() {
    let generator = RequestIdGenerator::new();
    assert_eq!(
        generator.compute_request_id("_DIRECT", Some("a1")),
        generator.compute_request_id("_DIRECT", Some("a1"))
    );
}

#[test]
fn test_direct_send_without_activity_is_random() {
    let generator = RequestIdGenerator::new();
    let ids: HashSet<i32> = (0..1000)
        .map(|_| generator.compute_request_id("_DIRECT", None))
        .collect();
    // 1000 draws from 2^32 values; a handful of collisions at most.
    assert!(ids.len() >= 995, "only {} distinct ids", ids.len());
}

#[test]
fn test_generator_is_shareable_across_threads() {
    let generator = Arc::new(RequestIdGenerator::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            std::thread::spawn(move || {
                (0..250)
                    .map(|_| generator.compute_request_id("_DIRECT", None))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let ids: HashSet<i32> = handles
        .into_iter()
        .flat_map(|handle| handle.join().unwrap())
        .collect();
    assert!(ids.len() >= 995);
}

#[test]
fn test_hash_matches_utf16_semantics() {
    assert_eq!(java_string_hash("Aa"), java_string_hash("BB"));
    // U+1F600 is a surrogate pair: two code units.
    let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
    assert_eq!(java_string_hash("\u{1F600}"), expected);
}
