//! Host simulation clock.

use bevy_ecs::prelude::*;

/// Elapsed simulation time and step counter, owned by the host.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    /// Elapsed simulation time in seconds.
    pub time: f64,
    /// Number of completed simulation cycles.
    pub step: u64,
}

impl SimClock {
    /// Complete one cycle of length `dt`.
    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
        self.step = self.step.wrapping_add(1);
    }
}
