// Baidu Cloud Push adapter

use crate::components::intent::{Activation, OpenIntentArgs, PlatformIntent, ProviderAdapter};
use crate::components::payload::ChannelType;

use super::base_extras;

pub struct BaiduAdapter;

impl ProviderAdapter for BaiduAdapter {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Baidu
    }

    fn build_open_intent(&self, args: &OpenIntentArgs<'_>) -> Option<PlatformIntent> {
        if args.intent_action != ChannelType::Baidu.intent_action() {
            tracing::debug!(action = %args.intent_action, "Intent action is not Baidu traffic");
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
