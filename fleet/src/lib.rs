//! Presence tracking for the War Room: who is currently in the room.
//!
//! Transport-level subscribe/unsubscribe delivery is unreliable, so the
//! roster is eventually consistent: unsubscribes only schedule an expiry,
//! and a periodic [`FleetTracker::prune`] pass is the authoritative
//! reconciliation. Counts are best-effort by design.

use std::time::Duration;

pub use tracker::*;

mod tracker;

/// Tuning for the tracker, shared by every handler holding the tracker.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// How long a departing entry lingers before a prune removes it. Covers
    /// the reconnect blip of a page reload, where an unsubscribe arrives
    /// moments before the resubscribe.
    pub departure_grace: Duration,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            departure_grace: Duration::from_secs(2),
        }
    }
}
