//! Event bridge between the host simulation and the crack store.
//!
//! The host reports two kinds of events, both delivered synchronously as ECS
//! observers:
//!
//! - `BondBroken`, triggered by the host while the bond entity still exists.
//! - Particle deletion, observed as the `OnRemove` trigger of the `Particle`
//!   component, which fires when a particle entity is despawned.
//!
//! These two observers are the only code paths that create or delete crack
//! records. `CrackBridge` owns the observer entities so a session never ends
//! up with more than one handler per event kind.

use bevy_ecs::prelude::*;
use tracing::{info, warn};

use crate::clock::SimClock;
use crate::components::{BondEnds, BondFamily, FailureKind, FailureMode, Particle};
use crate::session::CrackSession;

/// A bond failed. Trigger this before despawning the bond entity.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondBroken {
    pub bond: Entity,
    pub mode: FailureMode,
    pub family: BondFamily,
}

/// Observer: record a crack for a failed bond.
pub fn on_bond_broken(
    trigger: Trigger<BondBroken>,
    bonds: Query<&BondEnds>,
    particles: Query<(), With<Particle>>,
    clock: Option<Res<SimClock>>,
    session: Option<ResMut<CrackSession>>,
) {
    let Some(mut session) = session else {
        return;
    };
    let event = trigger.event();

    let Ok(ends) = bonds.get(event.bond) else {
        warn!(bond = ?event.bond, "broken bond has no parent particles; skipped");
        return;
    };
    if ends.a == ends.b {
        warn!(bond = ?event.bond, "broken bond joins a particle to itself; skipped");
        return;
    }
    if !particles.contains(ends.a) || !particles.contains(ends.b) {
        warn!(bond = ?event.bond, "broken bond references a deleted particle; skipped");
        return;
    }

    let (now, cycle) = clock.map(|c| (c.time, c.step)).unwrap_or((0.0, 0));
    let time = session.elapsed(now);
    let kind = FailureKind::classify(event.family, event.mode);
    session.store_mut().insert(ends.a, ends.b, kind, time, cycle);
}

/// Observer: drop the cracks of a deleted particle.
pub fn on_particle_removed(
    trigger: Trigger<OnRemove, Particle>,
    session: Option<ResMut<CrackSession>>,
) {
    if let Some(mut session) = session {
        session.store_mut().remove_by_particle(trigger.entity());
    }
}

/// Registration handle for the crack observers.
#[derive(Debug, Default)]
pub struct CrackBridge {
    observers: Option<[Entity; 2]>,
}

impl CrackBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.observers.is_some()
    }

    /// Register the observers, replacing any earlier registration.
    pub fn arm(&mut self, world: &mut World) {
        self.disarm(world);
        let bond = world.add_observer(on_bond_broken).id();
        let particle = world.add_observer(on_particle_removed).id();
        self.observers = Some([bond, particle]);
        info!("crack observers armed");
    }

    /// Unregister the observers. No-op when not armed.
    pub fn disarm(&mut self, world: &mut World) {
        if let Some(observers) = self.observers.take() {
            for observer in observers {
                world.despawn(observer);
            }
            info!("crack observers disarmed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{point, BondBundle, ParticleBundle};

    struct Fixture {
        world: World,
        bridge: CrackBridge,
        a: Entity,
        b: Entity,
        bond: Entity,
    }

    fn fixture() -> Fixture {
        let mut world = World::new();
        world.insert_resource(SimClock { time: 5.0, step: 42 });
        world.insert_resource(CrackSession::new(1.0));

        let a = world.spawn(ParticleBundle::new(point(0.0, 0.0, 0.0), 1.0)).id();
        let b = world.spawn(ParticleBundle::new(point(3.0, 0.0, 0.0), 1.0)).id();
        let bond = world.spawn(BondBundle::new(a, b, BondFamily::Parallel)).id();

        let mut bridge = CrackBridge::new();
        bridge.arm(&mut world);

        Fixture {
            world,
            bridge,
            a,
            b,
            bond,
        }
    }

    fn break_bond(world: &mut World, bond: Entity, mode: FailureMode) {
        world.trigger(BondBroken {
            bond,
            mode,
            family: BondFamily::Parallel,
        });
    }

    #[test]
    fn test_bond_break_records_crack() {
        let mut f = fixture();
        break_bond(&mut f.world, f.bond, FailureMode::Shear);

        let session = f.world.resource::<CrackSession>();
        let (_, record) = session.store().iter().next().unwrap();
        assert_eq!(record.kind, FailureKind::ParallelShear);
        assert_eq!((record.particle_a, record.particle_b), (f.a, f.b));
        assert_eq!(record.formation_cycle, 42);
        assert!((record.formation_time - 4.0).abs() < 1e-12);
        assert_eq!(session.counters().parallel_shear, 1);
    }

    #[test]
    fn test_particle_despawn_removes_crack() {
        let mut f = fixture();
        break_bond(&mut f.world, f.bond, FailureMode::Normal);
        f.world.despawn(f.a);

        let session = f.world.resource::<CrackSession>();
        assert!(session.store().is_empty());
        assert_eq!(session.counters().live, 0);
        assert_eq!(session.counters().total_formed, 1);
    }

    #[test]
    fn test_rearm_does_not_duplicate_handlers() {
        let mut f = fixture();
        f.bridge.arm(&mut f.world);
        f.bridge.arm(&mut f.world);
        break_bond(&mut f.world, f.bond, FailureMode::Normal);

        assert_eq!(f.world.resource::<CrackSession>().counters().total_formed, 1);
    }

    #[test]
    fn test_disarmed_bridge_ignores_events() {
        let mut f = fixture();
        f.bridge.disarm(&mut f.world);
        assert!(!f.bridge.is_armed());
        break_bond(&mut f.world, f.bond, FailureMode::Normal);

        assert!(f.world.resource::<CrackSession>().store().is_empty());
    }

    #[test]
    fn test_unresolvable_bond_is_skipped() {
        let mut f = fixture();
        f.world.despawn(f.b);
        break_bond(&mut f.world, f.bond, FailureMode::Normal);
        let stray = f.world.spawn_empty().id();
        break_bond(&mut f.world, stray, FailureMode::Normal);

        assert_eq!(f.world.resource::<CrackSession>().counters().total_formed, 0);
    }

    #[test]
    fn test_self_bond_break_is_skipped() {
        let mut f = fixture();
        let loop_bond = f
            .world
            .spawn(BondBundle::new(f.a, f.a, BondFamily::Contact))
            .id();
        break_bond(&mut f.world, loop_bond, FailureMode::Normal);

        let session = f.world.resource::<CrackSession>();
        assert!(session.store().is_empty());
        assert_eq!(session.counters().total_formed, 0);
    }
}
