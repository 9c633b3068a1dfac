//! Crack tracking session state.

use bevy_ecs::prelude::*;
use tracing::info;

use crate::counters::CrackCounters;
use crate::store::CrackStore;

/// Process-wide crack state between two `init` calls.
///
/// Held as an ECS resource so the event observers can reach it. Only the
/// observers write records; everything else reads, apart from the
/// `selected` working flags and the radius multiplier.
#[derive(Resource, Debug)]
pub struct CrackSession {
    store: CrackStore,
    start_time: f64,
    radius_multiplier: f64,
}

impl Default for CrackSession {
    fn default() -> Self {
        Self {
            store: CrackStore::new(),
            start_time: 0.0,
            radius_multiplier: 1.0,
        }
    }
}

impl CrackSession {
    pub fn new(start_time: f64) -> Self {
        Self {
            start_time,
            ..Default::default()
        }
    }

    /// Start a fresh session at simulation time `now`. Safe to repeat.
    pub fn reset(&mut self, now: f64) {
        self.store.clear();
        self.start_time = now;
        self.radius_multiplier = 1.0;
        info!(start_time = now, "crack session reset");
    }

    pub fn store(&self) -> &CrackStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut CrackStore {
        &mut self.store
    }

    pub fn counters(&self) -> &CrackCounters {
        self.store.counters()
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Time elapsed since the session started.
    pub fn elapsed(&self, now: f64) -> f64 {
        now - self.start_time
    }

    pub fn radius_multiplier(&self) -> f64 {
        self.radius_multiplier
    }

    pub fn set_radius_multiplier(&mut self, multiplier: f64) {
        self.radius_multiplier = multiplier;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::FailureKind;

    #[test]
    fn test_reset_twice_matches_reset_once() {
        let mut session = CrackSession::new(0.0);
        session.set_radius_multiplier(3.0);
        session
            .store_mut()
            .insert(Entity::from_raw(1), Entity::from_raw(2), FailureKind::ContactShear, 1.0, 5);

        session.reset(4.0);
        session.reset(4.0);

        assert!(session.store().is_empty());
        assert_eq!(*session.counters(), CrackCounters::default());
        assert_eq!(session.radius_multiplier(), 1.0);
        assert_eq!(session.start_time(), 4.0);
        assert_eq!(session.elapsed(6.5), 2.5);
    }
}
