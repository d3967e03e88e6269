use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::FleetConfig;

/// What an add/remove call did to the roster, so the caller knows whether
/// a roster broadcast is worth sending.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterUpdate {
    /// New token, or an expired one coming back: the count changed.
    Joined,
    /// Known live token; expiry cleared, join time kept.
    Refreshed,
    /// Unsubscribe seen; the entry expires after the grace period.
    Departing,
    NoChange,
}

impl RosterUpdate {
    /// Whether the visible roster size changed right now. `Departing` does
    /// not count, the change lands when a prune removes the entry.
    pub const fn is_roster_change(self) -> bool {
        matches!(self, Self::Joined)
    }
}

#[derive(Copy, Clone, Debug)]
struct Entry {
    joined_at: Instant,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Shared roster of connected users, keyed by an opaque token.
///
/// A service object rather than a global: handlers share it behind an
/// `Arc`, and every access is serialized by the interior mutex. Entries
/// for users deleted elsewhere look like any other expired entry and
/// vanish silently on the next prune.
#[derive(Debug, Default)]
pub struct FleetTracker {
    config: FleetConfig,
    roster: Mutex<HashMap<String, Entry>>,
}

impl FleetTracker {
    pub fn new(config: FleetConfig) -> Self {
        Self {
            config,
            roster: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe signal. Idempotent per token: a live token is refreshed,
    /// not duplicated.
    pub fn add(&self, token: &str) -> RosterUpdate {
        let now = Instant::now();
        let mut roster = self.lock_roster();

        match roster.get_mut(token) {
            None => {
                roster.insert(
                    token.to_owned(),
                    Entry {
                        joined_at: now,
                        expires_at: None,
                    },
                );
                log::debug!("fleet: {token} joined");
                RosterUpdate::Joined
            }
            Some(entry) if entry.is_expired(now) => {
                // expired but not yet pruned: treat as a fresh join
                entry.joined_at = now;
                entry.expires_at = None;
                log::debug!("fleet: {token} rejoined before prune");
                RosterUpdate::Joined
            }
            Some(entry) => {
                entry.expires_at = None;
                RosterUpdate::Refreshed
            }
        }
    }

    /// Unsubscribe signal. Only schedules expiry: unsubscribes are not
    /// trusted on their own, the prune sweep makes the removal real.
    pub fn remove(&self, token: &str) -> RosterUpdate {
        let now = Instant::now();
        let mut roster = self.lock_roster();

        match roster.get_mut(token) {
            Some(entry) if !entry.is_expired(now) && entry.expires_at.is_none() => {
                entry.expires_at = Some(now + self.config.departure_grace);
                log::debug!("fleet: {token} departing");
                RosterUpdate::Departing
            }
            _ => RosterUpdate::NoChange,
        }
    }

    /// Number of unexpired entries. Best-effort: a departing entry still
    /// counts until its grace runs out.
    pub fn count(&self) -> usize {
        let now = Instant::now();
        self.lock_roster()
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    /// Unexpired tokens in join order (token order on ties).
    pub fn entries(&self) -> Vec<String> {
        let now = Instant::now();
        let roster = self.lock_roster();

        let mut entries: Vec<(&String, &Entry)> = roster
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .collect();
        entries.sort_by(|(a_token, a), (b_token, b)| {
            a.joined_at.cmp(&b.joined_at).then(a_token.cmp(b_token))
        });
        entries.into_iter().map(|(token, _)| token.clone()).collect()
    }

    /// Reconciliation sweep: drop exactly the expired entries and return
    /// their tokens, for a corrective roster broadcast.
    pub fn prune(&self) -> Vec<String> {
        let now = Instant::now();
        let mut roster = self.lock_roster();

        let mut removed: Vec<String> = roster
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(token, _)| token.clone())
            .collect();
        for token in &removed {
            roster.remove(token);
        }
        removed.sort_unstable();

        if !removed.is_empty() {
            log::debug!("fleet: pruned {} entries, {} remain", removed.len(), roster.len());
        }
        removed
    }

    fn lock_roster(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.roster.lock().expect("fleet roster lock poisoned")
    }
}
