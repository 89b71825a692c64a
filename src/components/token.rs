// Device token persistence and registration callbacks

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use super::platform::PreferencesStore;

/// Called after a new device token has been stored
pub trait DeviceTokenRegisteredHandler: Send + Sync {
    fn token_registered(&self, device_token: &str);
}

/// Registration handle returned by [`DeviceTokenRegistry::add_handler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(Uuid);

impl HandlerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Device token store with a handler list that tolerates add/remove while a
/// notification pass is running: handlers are invoked from a snapshot.
pub struct DeviceTokenRegistry {
    preferences: Arc<dyn PreferencesStore>,
    token_key: String,
    handlers: RwLock<Vec<(HandlerId, Arc<dyn DeviceTokenRegisteredHandler>)>>,
}

impl DeviceTokenRegistry {
    pub fn new(preferences: Arc<dyn PreferencesStore>, token_key: impl Into<String>) -> Self {
        Self {
            preferences,
            token_key: token_key.into(),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Stored token, empty when none has been registered
    pub fn device_token(&self) -> String {
        self.preferences.get_string(&self.token_key, "")
    }

    /// Store `token` and notify every registered handler.
    ///
    /// Concurrent registrations are last-writer-wins.
    pub fn register_device_token(&self, token: &str) {
        self.preferences.put_string(&self.token_key, token);
        tracing::debug!(handlers = self.handler_count(), "Device token registered");

        let snapshot: Vec<Arc<dyn DeviceTokenRegisteredHandler>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            handler.token_registered(token);
        }
    }

    pub fn add_handler(&self, handler: Arc<dyn DeviceTokenRegisteredHandler>) -> HandlerId {
        let id = HandlerId::generate();
        self.handlers.write().push((id, handler));
        id
    }

    /// Returns false when `id` was not registered
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }
}
