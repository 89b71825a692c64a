// Request identity for posted notifications.
//
// Campaign/activity pairs hash to a stable slot so a repeated delivery
// replaces the earlier notification. Direct sends draw from a random source
// so unrelated direct pushes never share a slot.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::keys::DIRECT_CAMPAIGN_ID;

/// Thread-safe request id source, shared by reference across dispatches
#[derive(Debug, Default)]
pub struct RequestIdGenerator {
    rng: Mutex<Option<StdRng>>,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(None),
        }
    }

    /// Notification slot for a campaign (or journey) activity.
    ///
    /// Deterministic for every input except a direct send without an
    /// activity id, which gets a fresh random value per call.
    pub fn compute_request_id(&self, campaign_id: &str, activity_id: Option<&str>) -> i32 {
        if campaign_id == DIRECT_CAMPAIGN_ID && activity_id.is_none() {
            return self.next_random();
        }

        // An absent activity id concatenates as the literal "null".
        let key = format!("{}:{}", campaign_id, activity_id.unwrap_or("null"));
        java_string_hash(&key)
    }

    fn next_random(&self) -> i32 {
        let mut guard = self.rng.lock();
        guard.get_or_insert_with(StdRng::from_os_rng).random()
    }
}

/// 32-bit polynomial string hash over UTF-16 code units (`h = 31*h + c`,
/// wrapping). Stable across processes and platforms.
pub fn java_string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
