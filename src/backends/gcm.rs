// GCM open intents are delivered to the caller's service

use crate::components::intent::{Activation, OpenIntentArgs, PlatformIntent, ProviderAdapter};
use crate::components::payload::ChannelType;

use super::base_extras;

pub struct GcmAdapter;

impl ProviderAdapter for GcmAdapter {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Gcm
    }

    fn build_open_intent(&self, args: &OpenIntentArgs<'_>) -> Option<PlatformIntent> {
        if args.intent_action != ChannelType::Gcm.intent_action() {
            return None;
        }

        Some(PlatformIntent {
            target: args.target_handler.clone(),
            action: args.intent_action.to_string(),
            activation: Activation::Service,
            request_id: args.request_id,
            extras: base_extras(args),
        })
    }
}
