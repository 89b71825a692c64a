// Push dispatch state machine.
//
// Start -> classify -> (opened? -> open handling) -> foreground gate ->
// silent gate -> opt-out gate -> prepare render -> analytics -> render.
// Classification and analytics run on the caller's task; downloads and
// notification construction run on a spawned background task.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use regex::Regex;
use tokio::task::JoinHandle;
use url::Url;

use super::builder::{NotificationBuilderLadder, NotificationContent};
use super::config::PushConfig;
use super::dedup::RequestIdGenerator;
use super::event_source::EventSource;
use super::icon::{BoundedFetcher, IconSpec, ImageFetcher, select_icons};
use super::intent::{OpenIntentArgs, PlatformIntent};
use super::keys::{
    BODY_KEY, COLOR_KEY, DEEP_LINK_KEY, ICON_KEY, IMAGE_ICON_URL_KEY, IMAGE_SMALL_ICON_URL_KEY,
    IMAGE_URL_KEY, IS_APP_IN_FOREGROUND_ATTRIBUTE, IS_OPTED_OUT_ATTRIBUTE, OPEN_APP_KEY,
    SILENT_PUSH_KEY, TITLE_KEY, URL_KEY,
};
use super::payload::NormalizedPush;
use super::platform::{Collaborators, PlatformCapabilities};
use super::{PushError, PushOutcome, PushResult};
use crate::backends::ProviderAdapterFactory;

static COLOR_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^#([0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").ok());

/// Inputs for one background render, gathered on the dispatch path
#[derive(Debug, Clone)]
struct RenderJob {
    request_id: i32,
    title: String,
    body: String,
    open_intent: PlatformIntent,
    small_icon_resource_id: i32,
    icon_spec: IconSpec,
    image_url: Option<String>,
    color: Option<u32>,
    channel_id: Option<String>,
}

/// Render failures kept between calls to `wait_for_renders`
pub const MAX_RETAINED_RENDER_FAILURES: usize = 32;

/// Failures from background renders. Only the most recent
/// [`MAX_RETAINED_RENDER_FAILURES`] are kept; `total` counts every one.
#[derive(Debug, Default)]
struct RenderFailures {
    retained: VecDeque<PushError>,
    total: usize,
}

impl RenderFailures {
    fn push(&mut self, error: PushError) {
        if self.retained.len() == MAX_RETAINED_RENDER_FAILURES {
            self.retained.pop_front();
        }
        self.retained.push_back(error);
        self.total += 1;
    }

    fn take(&mut self) -> PushResult<()> {
        let count = std::mem::take(&mut self.total);
        let mut errors: Vec<PushError> = std::mem::take(&mut self.retained).into();
        if count == 0 {
            return Ok(());
        }
        if count == 1
            && let Some(error) = errors.pop()
        {
            return Err(error);
        }
        Err(PushError::Renders { count, errors })
    }
}

pub struct PushDispatcher {
    config: Arc<PushConfig>,
    capabilities: Arc<PlatformCapabilities>,
    collaborators: Collaborators,
    request_ids: Arc<RequestIdGenerator>,
    ladder: Arc<NotificationBuilderLadder>,
    pending_renders: Mutex<Vec<JoinHandle<()>>>,
    render_failures: Arc<Mutex<RenderFailures>>,
}

impl PushDispatcher {
    pub fn new(
        config: Arc<PushConfig>,
        capabilities: Arc<PlatformCapabilities>,
        collaborators: Collaborators,
        request_ids: Arc<RequestIdGenerator>,
    ) -> Self {
        let ladder = Arc::new(NotificationBuilderLadder::new(
            Arc::clone(&capabilities),
            Arc::clone(&collaborators.notifications),
            &config,
        ));
        Self {
            config,
            capabilities,
            collaborators,
            request_ids,
            ladder,
            pending_renders: Mutex::new(Vec::new()),
            render_failures: Arc::new(Mutex::new(RenderFailures::default())),
        }
    }

    pub fn are_app_notifications_enabled(&self) -> bool {
        self.collaborators.are_app_notifications_enabled()
    }

    /// Classify an inbound push and decide what to do with it.
    ///
    /// Must be called from within a tokio runtime; rendering is spawned onto
    /// it and this call never waits for the network.
    #[tracing::instrument(skip_all, fields(from = push.from.as_deref().unwrap_or(""), action = %push.intent_action))]
    pub async fn handle_campaign_push(&self, push: &NormalizedPush) -> PushOutcome {
        let Some(bundle) = push.bundle.as_ref() else {
            tracing::debug!("Push carries no payload, not handled");
            return PushOutcome::NotHandled;
        };

        let source = EventSource::classify(bundle);
        let Some(attributes) = source.extract_attributes(bundle) else {
            tracing::debug!(source = ?source, "No event source attributes in push, not handled");
            return PushOutcome::NotHandled;
        };
        let Some(source_id) = attributes.get(source.id_attribute_key()).cloned() else {
            tracing::debug!(source = ?source, "Push has no event source id, not handled");
            return PushOutcome::NotHandled;
        };

        if push
            .from
            .as_deref()
            .is_some_and(|from| from.contains(source.opened_event_type()))
        {
            self.handle_notification_open(source, &attributes, bundle);
            return PushOutcome::NotificationOpened;
        }

        let in_foreground = self.collaborators.app_state.is_app_in_foreground();
        let notifications_enabled = self.collaborators.are_app_notifications_enabled();

        let mut job = None;
        let outcome = if in_foreground && !self.config.post_in_foreground {
            PushOutcome::AppInForeground
        } else if is_silent(bundle) {
            PushOutcome::Silent
        } else if !notifications_enabled {
            tracing::debug!(source_id = %source_id, "App notifications disabled");
            PushOutcome::OptedOut
        } else {
            job = self.prepare_render(push, source, &attributes, &source_id);
            if job.is_some() {
                PushOutcome::PostedNotification
            } else {
                PushOutcome::OptedOut
            }
        };

        // A push that cannot be rendered is reported as opted out
        let opted_out = !notifications_enabled || outcome == PushOutcome::OptedOut;
        self.record_received(source, &attributes, in_foreground, opted_out);

        if let Some(job) = job {
            self.spawn_render(job);
        }
        outcome
    }

    /// Handle a tap on a posted notification: stop the session, record the
    /// opened event and perform the payload's open action
    pub fn handle_notification_open(
        &self,
        source: EventSource,
        attributes: &HashMap<String, String>,
        bundle: &HashMap<String, String>,
    ) {
        let analytics = &self.collaborators.analytics;
        self.collaborators.session.stop_session();

        match source {
            EventSource::Campaign => analytics.set_campaign_attributes(attributes.clone()),
            EventSource::Journey => {
                for (key, value) in attributes {
                    analytics.add_global_attribute(key, value);
                }
            },
        }

        let event = analytics
            .create_event(source.opened_event_type())
            .with_attributes(attributes);
        analytics.record_event(event);
        analytics.submit_events();

        self.perform_open_action(bundle);
    }

    /// Await every in-flight render and drain the failures recorded since the
    /// last call. A single failure is returned as is; several are reported
    /// together as [`PushError::Renders`].
    pub async fn wait_for_renders(&self) -> PushResult<()> {
        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.pending_renders.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                self.render_failures
                    .lock()
                    .push(PushError::platform(format!("render task failed: {}", e)));
            }
        }

        self.render_failures.lock().take()
    }

    fn record_received(
        &self,
        source: EventSource,
        attributes: &HashMap<String, String>,
        in_foreground: bool,
        opted_out: bool,
    ) {
        let analytics = &self.collaborators.analytics;
        let event_type = if in_foreground {
            source.received_foreground_event_type()
        } else {
            source.received_background_event_type()
        };

        let mut event = analytics.create_event(event_type).with_attributes(attributes);
        event.add_attribute(IS_APP_IN_FOREGROUND_ATTRIBUTE, in_foreground.to_string());
        event.add_attribute(IS_OPTED_OUT_ATTRIBUTE, opted_out.to_string());
        analytics.record_event(event);
        analytics.submit_events();
    }

    fn perform_open_action(&self, bundle: &HashMap<String, String>) {
        let launcher = &self.collaborators.launcher;

        if let Some(raw_url) = bundle.get(URL_KEY) {
            match Url::parse(raw_url) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => launcher.open_url(&url),
                Ok(url) => {
                    tracing::warn!(scheme = %url.scheme(), "Refusing to open non-web URL from push");
                },
                Err(e) => tracing::warn!(url = %raw_url, error = %e, "Invalid URL in push"),
            }
            return;
        }

        if let Some(link) = bundle.get(DEEP_LINK_KEY) {
            launcher.open_deep_link(link);
            return;
        }

        if bundle.contains_key(OPEN_APP_KEY) {
            launcher.open_app();
        }
    }

    /// Resolve everything the renderer needs. `None` means the push cannot be
    /// rendered.
    fn prepare_render(
        &self,
        push: &NormalizedPush,
        source: EventSource,
        attributes: &HashMap<String, String>,
        source_id: &str,
    ) -> Option<RenderJob> {
        let bundle = push.bundle.as_ref()?;
        let resources = &self.collaborators.resources;

        let named_icon = push
            .get(ICON_KEY)
            .and_then(|name| resources.resource_id_for_name(name));
        let icon_resource_id = match named_icon {
            Some(id) => id,
            None => match resources.app_icon_resource_id() {
                Ok(id) => id,
                Err(e) => {
                    tracing::error!(error = %e, "Unable to resolve notification icon, cannot render");
                    return None;
                },
            },
        };

        let activity_id = attributes
            .get(source.activity_id_attribute_key())
            .map(String::as_str);
        let request_id = self.request_ids.compute_request_id(source_id, activity_id);

        let Some(adapter) = ProviderAdapterFactory::for_intent_action(&push.intent_action) else {
            tracing::error!(action = %push.intent_action, "No provider adapter for intent action");
            return None;
        };
        let open_intent = adapter.build_open_intent(&OpenIntentArgs {
            push_data: bundle,
            target_handler: &push.target_handler,
            opened_marker: source.opened_event_type(),
            request_id,
            intent_action: &push.intent_action,
        })?;

        Some(RenderJob {
            request_id,
            title: push.get(TITLE_KEY).unwrap_or_default().to_string(),
            body: push.get(BODY_KEY).unwrap_or_default().to_string(),
            open_intent,
            small_icon_resource_id: icon_resource_id,
            icon_spec: IconSpec {
                base_icon_resource_id: icon_resource_id,
                large_icon_url: push.get(IMAGE_ICON_URL_KEY).map(str::to_string),
                small_icon_url: push.get(IMAGE_SMALL_ICON_URL_KEY).map(str::to_string),
            },
            image_url: push.get(IMAGE_URL_KEY).map(str::to_string),
            color: push.get(COLOR_KEY).and_then(parse_color),
            channel_id: push.notification_channel_id.clone(),
        })
    }

    fn spawn_render(&self, job: RenderJob) {
        let collaborators = self.collaborators.clone();
        let capabilities = Arc::clone(&self.capabilities);
        let ladder = Arc::clone(&self.ladder);
        let config = Arc::clone(&self.config);
        let failures = Arc::clone(&self.render_failures);

        let handle = tokio::spawn(async move {
            let request_id = job.request_id;
            if let Err(e) = render(job, &collaborators, &capabilities, &ladder, &config).await {
                tracing::error!(request_id, error = %e, "Failed to post notification");
                failures.lock().push(e);
            }
        });

        let mut pending = self.pending_renders.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}

async fn render(
    job: RenderJob,
    collaborators: &Collaborators,
    capabilities: &PlatformCapabilities,
    ladder: &NotificationBuilderLadder,
    config: &PushConfig,
) -> PushResult<()> {
    let fetcher = BoundedFetcher::new(collaborators.images.as_ref(), config.image_download_timeout());

    let image = match &job.image_url {
        Some(url) => match fetcher.fetch(url).await {
            Ok(bitmap) => Some(bitmap),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Notification image unavailable, using text style");
                None
            },
        },
        None => None,
    };

    let icons = select_icons(
        capabilities,
        &job.icon_spec,
        &fetcher,
        collaborators.resources.as_ref(),
    )
    .await;

    let content = NotificationContent {
        title: job.title,
        body: job.body,
        open_intent: job.open_intent,
        small_icon_resource_id: job.small_icon_resource_id,
        icons,
        image,
        color: job.color,
        channel_id: job.channel_id,
    };

    let notification = ladder.build(&content);
    collaborators.notifications.notify(job.request_id, &notification)?;
    tracing::info!(request_id = job.request_id, tier = ?notification.tier, "Posted notification");
    Ok(())
}

fn is_silent(bundle: &HashMap<String, String>) -> bool {
    bundle
        .get(SILENT_PUSH_KEY)
        .is_some_and(|value| value.eq_ignore_ascii_case("1"))
}

/// `#RRGGBB` (opaque) or `#AARRGGBB` to ARGB
pub(crate) fn parse_color(value: &str) -> Option<u32> {
    let valid = COLOR_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value));
    if !valid {
        tracing::debug!(color = %value, "Ignoring invalid notification color");
        return None;
    }

    let hex = &value[1..];
    let parsed = u32::from_str_radix(hex, 16).ok()?;
    if hex.len() == 6 {
        Some(0xFF00_0000 | parsed)
    } else {
        Some(parsed)
    }
}
