//! Component tests for the push pipeline

#[path = "../common/mod.rs"]
mod common;

mod test_config;
mod test_dedup;
mod test_event_source;
mod test_icon;
mod test_payload;
