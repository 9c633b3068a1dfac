//! Serializable view of the crack session.
//!
//! A `CrackSnapshot` carries every live record together with its derived
//! geometry, ready to hand to a presentation layer as JSON. It is an export,
//! not a persistence format: a session is rebuilt by re-running `init` and
//! letting events repopulate it.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::clock::SimClock;
use crate::counters::CrackCounters;
use crate::error::CrackResult;
use crate::geometry::{derive, CrackGeometry, ParticleState};
use crate::session::CrackSession;

/// Snapshot of a single crack record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackRecordSnapshot {
    pub id: u32,
    pub generation: u32,
    /// `Entity::to_bits` of the first particle.
    pub particle_a: u64,
    pub particle_b: u64,
    pub kind: String,
    pub formation_time: f64,
    pub formation_cycle: u64,
    pub selected: bool,
    /// `None` when the centers coincide or a particle is missing.
    pub geometry: Option<CrackGeometry>,
}

/// Complete crack state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrackSnapshot {
    /// Current simulation time.
    pub time: f64,
    /// Current simulation cycle.
    pub step: u64,
    pub session_start_time: f64,
    pub radius_multiplier: f64,
    pub counters: CrackCounters,
    /// Live records in store order.
    pub cracks: Vec<CrackRecordSnapshot>,
}

impl CrackSnapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &World) -> Self {
        let clock = world.get_resource::<SimClock>().copied().unwrap_or_default();
        let Some(session) = world.get_resource::<CrackSession>() else {
            return Self {
                time: clock.time,
                step: clock.step,
                radius_multiplier: 1.0,
                ..Default::default()
            };
        };

        let multiplier = session.radius_multiplier();
        let cracks = session
            .store()
            .iter()
            .map(|(id, record)| {
                let geometry = match (
                    ParticleState::from_world(world, record.particle_a),
                    ParticleState::from_world(world, record.particle_b),
                ) {
                    (Some(a), Some(b)) => derive(&a, &b, multiplier).ok(),
                    _ => None,
                };
                CrackRecordSnapshot {
                    id: id.index(),
                    generation: id.generation(),
                    particle_a: record.particle_a.to_bits(),
                    particle_b: record.particle_b.to_bits(),
                    kind: record.kind.name().to_string(),
                    formation_time: record.formation_time,
                    formation_cycle: record.formation_cycle,
                    selected: record.selected,
                    geometry,
                }
            })
            .collect();

        Self {
            time: clock.time,
            step: clock.step,
            session_start_time: session.start_time(),
            radius_multiplier: multiplier,
            counters: *session.counters(),
            cracks,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> CrackResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> CrackResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(data: &str) -> CrackResult<Self> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{point, FailureKind, ParticleBundle};

    #[test]
    fn test_snapshot_carries_geometry_and_counters() {
        let mut world = World::new();
        world.insert_resource(SimClock { time: 3.0, step: 7 });
        world.insert_resource(CrackSession::new(1.0));
        let a = world.spawn(ParticleBundle::new(point(0.0, 0.0, 0.0), 1.0)).id();
        let b = world.spawn(ParticleBundle::new(point(3.0, 0.0, 0.0), 1.0)).id();
        let c = world.spawn(ParticleBundle::new(point(0.0, 0.0, 0.0), 1.0)).id();
        {
            let mut session = world.resource_mut::<CrackSession>();
            session
                .store_mut()
                .insert(a, b, FailureKind::ContactNormal, 2.0, 7);
            session
                .store_mut()
                .insert(a, c, FailureKind::ParallelNormal, 2.0, 7);
        }

        let snapshot = CrackSnapshot::from_world(&world);

        assert_eq!(snapshot.step, 7);
        assert_eq!(snapshot.session_start_time, 1.0);
        assert_eq!(snapshot.counters.total_formed, 2);
        assert_eq!(snapshot.cracks.len(), 2);
        assert_eq!(snapshot.cracks[0].kind, "ContactNormal");
        let geometry = snapshot.cracks[0].geometry.unwrap();
        assert!((geometry.aperture - 1.0).abs() < 1e-9);
        assert!(snapshot.cracks[1].geometry.is_none());
    }

    #[test]
    fn test_snapshot_json_restores() {
        let mut world = World::new();
        world.insert_resource(CrackSession::new(0.0));
        let a = world.spawn(ParticleBundle::new(point(0.0, 0.0, 0.0), 0.5)).id();
        let b = world.spawn(ParticleBundle::new(point(0.0, 2.0, 0.0), 0.5)).id();
        world
            .resource_mut::<CrackSession>()
            .store_mut()
            .insert(a, b, FailureKind::ContactShear, 0.25, 3);

        let snapshot = CrackSnapshot::from_world(&world);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("ContactShear"));

        let restored = CrackSnapshot::from_json_str(&json).unwrap();
        assert_eq!(restored.cracks.len(), 1);
        assert_eq!(restored.cracks[0].particle_a, a.to_bits());
        assert_eq!(restored.counters, snapshot.counters);
    }
}
