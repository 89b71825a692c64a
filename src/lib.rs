//! Push notification normalization and presentation pipeline
//!
//! Ingests campaign and journey pushes from ADM, Baidu, GCM and FCM,
//! normalizes them into one canonical shape and decides per push whether to
//! record analytics only, suppress, or render a local notification.
//! Rendering degrades across platform capability tiers down to a minimal
//! legacy notification.

use std::sync::Arc;

pub mod backends;
pub mod components;

pub use backends::*;
pub use components::*;

/// Entry point owned by the host application
pub struct NotificationClient {
    channel_type: ChannelType,
    dispatcher: PushDispatcher,
    tokens: DeviceTokenRegistry,
}

impl NotificationClient {
    pub fn builder(channel_type: ChannelType) -> NotificationClientBuilder {
        NotificationClientBuilder::new(channel_type)
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    /// Normalize a provider payload and dispatch it
    pub async fn handle_push(&self, intent_action: &str, raw: RawPush) -> PushResult<PushOutcome> {
        let push = PayloadNormalizer::normalize(intent_action, raw)?;
        Ok(self.dispatcher.handle_campaign_push(&push).await)
    }

    pub async fn handle_campaign_push(&self, push: &NormalizedPush) -> PushOutcome {
        self.dispatcher.handle_campaign_push(push).await
    }

    pub fn are_app_notifications_enabled(&self) -> bool {
        self.dispatcher.are_app_notifications_enabled()
    }

    pub fn device_token(&self) -> String {
        self.tokens.device_token()
    }

    pub fn register_device_token(&self, token: &str) {
        self.tokens.register_device_token(token);
    }

    pub fn add_device_token_handler(&self, handler: Arc<dyn DeviceTokenRegisteredHandler>) -> HandlerId {
        self.tokens.add_handler(handler)
    }

    pub fn remove_device_token_handler(&self, id: HandlerId) -> bool {
        self.tokens.remove_handler(id)
    }

    /// Wait for background renders; surfaces notification service failures
    pub async fn wait_for_renders(&self) -> PushResult<()> {
        self.dispatcher.wait_for_renders().await
    }

    pub fn dispatcher(&self) -> &PushDispatcher {
        &self.dispatcher
    }
}

/// Builder for [`NotificationClient`] with fluent API
pub struct NotificationClientBuilder {
    channel_type: ChannelType,
    config: PushConfig,
    capabilities: Option<PlatformCapabilities>,
    analytics: Option<Arc<dyn AnalyticsClient>>,
    session: Option<Arc<dyn SessionClient>>,
    notifications: Option<Arc<dyn NotificationService>>,
    app_state: Option<Arc<dyn AppStateProbe>>,
    opt_out: Option<Arc<dyn OptOutProvider>>,
    resources: Option<Arc<dyn ResourceResolver>>,
    launcher: Option<Arc<dyn ActionLauncher>>,
    images: Option<Arc<dyn ImageFetcher>>,
    preferences: Option<Arc<dyn PreferencesStore>>,
    request_ids: Option<Arc<RequestIdGenerator>>,
}

impl NotificationClientBuilder {
    pub fn new(channel_type: ChannelType) -> Self {
        Self {
            channel_type,
            config: PushConfig::default(),
            capabilities: None,
            analytics: None,
            session: None,
            notifications: None,
            app_state: None,
            opt_out: None,
            resources: None,
            launcher: None,
            images: None,
            preferences: None,
            request_ids: None,
        }
    }

    pub fn with_config(mut self, config: PushConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_capabilities(mut self, capabilities: PlatformCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsClient>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn with_session(mut self, session: Arc<dyn SessionClient>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_notification_service(mut self, notifications: Arc<dyn NotificationService>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn with_app_state(mut self, app_state: Arc<dyn AppStateProbe>) -> Self {
        self.app_state = Some(app_state);
        self
    }

    pub fn with_opt_out(mut self, opt_out: Arc<dyn OptOutProvider>) -> Self {
        self.opt_out = Some(opt_out);
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_launcher(mut self, launcher: Arc<dyn ActionLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Defaults to [`backends::image_utils::HttpImageFetcher`]
    pub fn with_image_fetcher(mut self, images: Arc<dyn ImageFetcher>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferencesStore>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Share one request id source between several clients
    pub fn with_request_ids(mut self, request_ids: Arc<RequestIdGenerator>) -> Self {
        self.request_ids = Some(request_ids);
        self
    }

    pub fn build(self) -> PushResult<NotificationClient> {
        let images: Arc<dyn ImageFetcher> = match self.images {
            Some(images) => images,
            None => Arc::new(backends::image_utils::HttpImageFetcher::new(&self.config)?),
        };

        let collaborators = Collaborators {
            analytics: required(self.analytics, "analytics")?,
            session: required(self.session, "session")?,
            notifications: required(self.notifications, "notification_service")?,
            app_state: required(self.app_state, "app_state")?,
            opt_out: self.opt_out,
            resources: required(self.resources, "resources")?,
            launcher: required(self.launcher, "launcher")?,
            images,
            preferences: required(self.preferences, "preferences")?,
        };

        let capabilities = self.capabilities.unwrap_or_default();
        tracing::debug!(
            channel = %self.channel_type,
            api_level = capabilities.api_level,
            features = ?platform::describe_capabilities(&capabilities),
            "Building notification client"
        );

        let tokens = DeviceTokenRegistry::new(
            Arc::clone(&collaborators.preferences),
            self.config.device_token_key.clone(),
        );
        let dispatcher = PushDispatcher::new(
            Arc::new(self.config),
            Arc::new(capabilities),
            collaborators,
            self.request_ids.unwrap_or_default(),
        );

        Ok(NotificationClient {
            channel_type: self.channel_type,
            dispatcher,
            tokens,
        })
    }
}

fn required<T: ?Sized>(value: Option<Arc<T>>, field: &str) -> PushResult<Arc<T>> {
    value.ok_or_else(|| PushError::Validation {
        field: field.to_string(),
        message: "required collaborator not provided".to_string(),
    })
}
