// Wire-level attribute keys and intent-action constants.
// These strings travel inside provider payloads and must stay bit-exact.

/// Prefix shared by every flattened campaign attribute
pub const CAMPAIGN_ATTRIBUTE_PREFIX: &str = "pinpoint.campaign.";

pub const CAMPAIGN_ID_KEY: &str = "pinpoint.campaign.campaign_id";
pub const CAMPAIGN_ACTIVITY_ID_KEY: &str = "pinpoint.campaign.campaign_activity_id";
pub const CAMPAIGN_TREATMENT_ID_KEY: &str = "pinpoint.campaign.treatment_id";

/// Key holding the JSON-encoded journey envelope
pub const PINPOINT_KEY: &str = "pinpoint";
/// Child object of the envelope that carries journey attributes
pub const JOURNEY_KEY: &str = "journey";

pub const SILENT_PUSH_KEY: &str = "pinpoint.notification.silentPush";
pub const TITLE_KEY: &str = "pinpoint.notification.title";
pub const BODY_KEY: &str = "pinpoint.notification.body";
pub const COLOR_KEY: &str = "pinpoint.notification.color";
pub const ICON_KEY: &str = "pinpoint.notification.icon";
pub const IMAGE_URL_KEY: &str = "pinpoint.notification.imageUrl";
pub const IMAGE_ICON_URL_KEY: &str = "pinpoint.notification.imageIconUrl";
pub const IMAGE_SMALL_ICON_URL_KEY: &str = "pinpoint.notification.imageSmallIconUrl";

pub const URL_KEY: &str = "pinpoint.url";
pub const DEEP_LINK_KEY: &str = "pinpoint.deeplink";
pub const OPEN_APP_KEY: &str = "pinpoint.openApp";

/// Extra stamped on open intents so the tap can be matched to its slot
pub const REQUEST_ID_KEY: &str = "pinpoint.requestId";
/// Payload field naming the sender; carries the opened marker on re-entry
pub const FROM_KEY: &str = "from";

/// Sentinel campaign id used by direct (non-campaign) sends
pub const DIRECT_CAMPAIGN_ID: &str = "_DIRECT";

pub const GCM_INTENT_ACTION: &str = "com.amazonaws.intent.gcm.NOTIFICATION_OPEN";
pub const FCM_INTENT_ACTION: &str = "com.amazonaws.intent.fcm.NOTIFICATION_OPEN";
pub const ADM_INTENT_ACTION: &str = "com.amazonaws.intent.adm.NOTIFICATION_OPEN";
pub const BAIDU_INTENT_ACTION: &str = "com.amazonaws.intent.baidu.NOTIFICATION_OPEN";

/// Receiver that relays FCM and Baidu traffic back into the pipeline
pub const RELAY_HANDLER: &str = "com.amazonaws.pinpoint.push.PinpointNotificationReceiver";

pub const IS_APP_IN_FOREGROUND_ATTRIBUTE: &str = "isAppInForeground";
pub const IS_OPTED_OUT_ATTRIBUTE: &str = "isOptedOut";
