// Amazon Device Messaging adapter

use crate::components::intent::{Activation, OpenIntentArgs, PlatformIntent, ProviderAdapter};
use crate::components::payload::ChannelType;

use super::base_extras;

/// ADM taps start the caller's handler as a service, which keeps the
/// process alive on Fire OS until the open is processed
pub struct AdmAdapter;

impl ProviderAdapter for AdmAdapter {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Adm
    }

    fn build_open_intent(&self, args: &OpenIntentArgs<'_>) -> Option<PlatformIntent> {
        if args.intent_action != ChannelType::Adm.intent_action() {
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
