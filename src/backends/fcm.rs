// Firebase Cloud Messaging adapter

use crate::components::intent::{Activation, OpenIntentArgs, PlatformIntent, ProviderAdapter};
use crate::components::payload::ChannelType;

use super::base_extras;

/// FCM taps come back through the relay receiver as a broadcast
pub struct FcmAdapter;

impl ProviderAdapter for FcmAdapter {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Fcm
    }

    fn build_open_intent(&self, args: &OpenIntentArgs<'_>) -> Option<PlatformIntent> {
        if args.intent_action != ChannelType::Fcm.intent_action() {
            return None;
        }

        Some(PlatformIntent {
            target: args.target_handler.clone(),
            action: args.intent_action.to_string(),
            activation: Activation::Broadcast,
            request_id: args.request_id,
            extras: base_extras(args),
        })
    }
}
