//! Public API for crack tracking.
//!
//! `CrackWorld` wraps the ECS world holding the host particles and bonds, the
//! simulation clock and the crack session, and owns the event subscription.
//!
//! ## Lifecycle
//!
//! `init` starts a fresh session at the current clock time and (re-)arms the
//! observers; repeated calls never stack handlers. After that, every bond
//! broken through `break_bond` adds a crack and every particle removed through
//! `delete_particle` (or any other despawn) drops the cracks touching it.
//!
//! ## Ordering
//!
//! Events apply in call order. A bond that breaks in the same cycle its
//! particle is deleted first yields a crack, then loses it again.

use bevy_ecs::prelude::*;
use tracing::debug;

use crate::bridge::{BondBroken, CrackBridge};
use crate::clock::SimClock;
use crate::components::*;
use crate::config::CrackViewConfig;
use crate::counters::CrackCounters;
use crate::error::{CrackError, CrackResult};
use crate::filter;
use crate::geometry::{derive, CrackGeometry, ParticleState};
use crate::render::{render_cracks, CrackRenderer, RenderSummary};
use crate::session::CrackSession;
use crate::snapshot::CrackSnapshot;
use crate::store::{CrackId, TimeBounds};

/// The crack tracking world container.
///
/// Holds the ECS world and the observer registration, providing a clean API
/// for:
/// - Building the host particle/bond model
/// - Reporting bond failures and particle deletions
/// - Filtering, querying and rendering cracks
pub struct CrackWorld {
    world: World,
    bridge: CrackBridge,
}

impl CrackWorld {
    /// Create a world with an initialized, armed crack session.
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(SimClock::default());
        world.insert_resource(CrackSession::default());

        let mut sim = Self {
            world,
            bridge: CrackBridge::new(),
        };
        sim.init();
        sim
    }

    /// Start a fresh crack session at the current simulation time.
    ///
    /// Discards all cracks, zeroes counters, resets the radius multiplier and
    /// re-arms the event observers. Always safe to call.
    pub fn init(&mut self) {
        let now = self.current_time();
        self.world.resource_mut::<CrackSession>().reset(now);
        self.bridge.arm(&mut self.world);
    }

    /// Stop receiving events. Existing cracks are kept.
    pub fn shutdown(&mut self) {
        self.bridge.disarm(&mut self.world);
    }

    pub fn is_tracking(&self) -> bool {
        self.bridge.is_armed()
    }

    /// Complete one simulation cycle of length `dt`.
    pub fn step(&mut self, dt: f64) {
        self.world.resource_mut::<SimClock>().advance(dt);
    }

    /// Get the current cycle number.
    pub fn current_step(&self) -> u64 {
        self.world.resource::<SimClock>().step
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f64 {
        self.world.resource::<SimClock>().time
    }

    // ------------------------------------------------------------------
    // Host model
    // ------------------------------------------------------------------

    /// Spawn a particle.
    pub fn spawn_particle(&mut self, position: Point, radius: f64) -> Entity {
        self.world.spawn(ParticleBundle::new(position, radius)).id()
    }

    /// Spawn a bond between two live particles.
    pub fn spawn_bond(&mut self, a: Entity, b: Entity, family: BondFamily) -> CrackResult<Entity> {
        if a == b {
            return Err(CrackError::SelfBond(a));
        }
        for particle in [a, b] {
            if self.world.get::<Particle>(particle).is_none() {
                return Err(CrackError::UnknownParticle(particle));
            }
        }
        Ok(self.world.spawn(BondBundle::new(a, b, family)).id())
    }

    /// Spawn a `cols` x `rows` grid of touching particles bonded to their
    /// right and upper neighbors. Returns (particles, bonds), row-major.
    pub fn spawn_lattice(
        &mut self,
        cols: usize,
        rows: usize,
        radius: f64,
        family: BondFamily,
    ) -> (Vec<Entity>, Vec<Entity>) {
        let spacing = 2.0 * radius;
        let mut particles = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                let position = point(col as f64 * spacing, row as f64 * spacing, 0.0);
                particles.push(self.spawn_particle(position, radius));
            }
        }

        let mut bonds = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                let here = particles[row * cols + col];
                if col + 1 < cols {
                    let right = particles[row * cols + col + 1];
                    bonds.push(self.world.spawn(BondBundle::new(here, right, family)).id());
                }
                if row + 1 < rows {
                    let up = particles[(row + 1) * cols + col];
                    bonds.push(self.world.spawn(BondBundle::new(here, up, family)).id());
                }
            }
        }
        (particles, bonds)
    }

    /// Move a particle. Returns false if it does not exist.
    pub fn move_particle(&mut self, particle: Entity, position: Point) -> bool {
        match self.world.get_mut::<ParticlePosition>(particle) {
            Some(mut pos) => {
                pos.0 = position;
                true
            }
            None => false,
        }
    }

    /// Break a bond: report the failure, then remove the bond.
    pub fn break_bond(&mut self, bond: Entity, mode: FailureMode) -> CrackResult<()> {
        let family = *self
            .world
            .get::<BondFamily>(bond)
            .ok_or(CrackError::UnknownBond(bond))?;

        self.world.trigger(BondBroken { bond, mode, family });
        self.world.despawn(bond);
        Ok(())
    }

    /// Break a bond using the host's raw failure code (0 normal, 1 shear).
    pub fn break_bond_code(&mut self, bond: Entity, code: i32) -> CrackResult<()> {
        let mode = FailureMode::from_code(code)?;
        self.break_bond(bond, mode)
    }

    /// Delete a particle and the bonds attached to it.
    ///
    /// Bonds removed this way did not fail and leave no crack. Returns false
    /// if the particle does not exist.
    pub fn delete_particle(&mut self, particle: Entity) -> bool {
        if self.world.get::<Particle>(particle).is_none() {
            return false;
        }

        let mut query = self.world.query::<(Entity, &BondEnds)>();
        let attached: Vec<Entity> = query
            .iter(&self.world)
            .filter(|(_, ends)| ends.a == particle || ends.b == particle)
            .map(|(bond, _)| bond)
            .collect();
        for bond in &attached {
            self.world.despawn(*bond);
        }
        debug!(?particle, bonds = attached.len(), "particle deleted");

        self.world.despawn(particle)
    }

    /// Get the number of live bonds.
    pub fn bond_count(&mut self) -> usize {
        let mut query = self.world.query::<&BondEnds>();
        query.iter(&self.world).count()
    }

    // ------------------------------------------------------------------
    // Crack queries
    // ------------------------------------------------------------------

    pub fn session(&self) -> &CrackSession {
        self.world.resource::<CrackSession>()
    }

    pub fn counters(&self) -> CrackCounters {
        *self.session().counters()
    }

    pub fn crack_count(&self) -> usize {
        self.session().store().len()
    }

    pub fn find_crack(&self, p1: Entity, p2: Entity) -> Option<CrackId> {
        self.session().store().find_by_particle_pair(p1, p2)
    }

    /// Derive the current geometry of a crack. `Ok(None)` if no such crack.
    pub fn geometry(&self, id: CrackId) -> CrackResult<Option<CrackGeometry>> {
        let session = self.session();
        let Some(record) = session.store().get(id) else {
            return Ok(None);
        };
        let a = ParticleState::from_world(&self.world, record.particle_a)
            .ok_or(CrackError::UnknownParticle(record.particle_a))?;
        let b = ParticleState::from_world(&self.world, record.particle_b)
            .ok_or(CrackError::UnknownParticle(record.particle_b))?;
        derive(&a, &b, session.radius_multiplier()).map(Some)
    }

    /// Formation-time range of the selected cracks.
    pub fn time_bounds(&self) -> TimeBounds {
        self.session().store().selected_time_bounds()
    }

    pub fn set_radius_multiplier(&mut self, multiplier: f64) {
        self.world
            .resource_mut::<CrackSession>()
            .set_radius_multiplier(multiplier);
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    pub fn select_none(&mut self) {
        filter::select_none(self.world.resource_mut::<CrackSession>().store_mut());
    }

    pub fn select_all(&mut self) {
        filter::select_all(self.world.resource_mut::<CrackSession>().store_mut());
    }

    pub fn select_by_cycle_range(&mut self, min_cycle: u64, max_cycle: u64) {
        filter::select_by_cycle_range(
            self.world.resource_mut::<CrackSession>().store_mut(),
            min_cycle,
            max_cycle,
        );
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Apply a view configuration and draw the selected cracks.
    pub fn render<R>(&mut self, config: &CrackViewConfig, renderer: &mut R) -> CrackResult<RenderSummary>
    where
        R: CrackRenderer + ?Sized,
    {
        render_cracks(&mut self.world, config, renderer)
    }

    /// Get a snapshot of the current crack state.
    pub fn snapshot(&self) -> CrackSnapshot {
        CrackSnapshot::from_world(&self.world)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> String {
        self.snapshot()
            .to_json()
            .unwrap_or_else(|_| "{}".to_string())
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    ///
    /// The `SimClock` and `CrackSession` resources must stay in place.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for CrackWorld {
    fn default() -> Self {
        Self::new()
    }
}
