// Provider adapters - one per cloud messaging transport
// Each adapter builds the open intent using its provider's activation mechanism

pub mod adm;
pub mod baidu;
pub mod fcm;
pub mod gcm;
pub mod image_utils;

use std::collections::BTreeMap;

use crate::components::intent::{OpenIntentArgs, ProviderAdapter};
use crate::components::keys::{FROM_KEY, REQUEST_ID_KEY};
use crate::components::payload::ChannelType;

/// Factory for provider-specific adapters
pub struct ProviderAdapterFactory;

impl ProviderAdapterFactory {
    /// Create the adapter for a channel type
    pub fn create_adapter(channel_type: ChannelType) -> Box<dyn ProviderAdapter> {
        match channel_type {
            ChannelType::Gcm => Box::new(gcm::GcmAdapter),
            ChannelType::Fcm => Box::new(fcm::FcmAdapter),
            ChannelType::Adm => Box::new(adm::AdmAdapter),
            ChannelType::Baidu => Box::new(baidu::BaiduAdapter),
        }
    }

    /// Adapter whose intent action matches `intent_action`, if any
    pub fn for_intent_action(intent_action: &str) -> Option<Box<dyn ProviderAdapter>> {
        ChannelType::from_intent_action(intent_action).map(Self::create_adapter)
    }
}

/// Extras every provider stamps on its open intent: the push payload with its
/// source keys untouched, the request id and the opened marker in `from`.
/// A replayed intent classifies as the same event source.
pub(crate) fn base_extras(args: &OpenIntentArgs<'_>) -> BTreeMap<String, String> {
    let mut extras: BTreeMap<String, String> = args
        .push_data
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    extras.insert(REQUEST_ID_KEY.to_string(), args.request_id.to_string());
    extras.insert(FROM_KEY.to_string(), args.opened_marker.to_string());
    extras
}
