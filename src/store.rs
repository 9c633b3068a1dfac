//! Crack record storage.
//!
//! Records live in a generational arena. A `CrackId` names a slot and the
//! generation it was issued for, so an id held past its record's removal can
//! never resolve to a newer record that reused the slot. A separate insertion
//! order list drives iteration; removal keeps the survivors' relative order.

use bevy_ecs::prelude::Entity;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::components::FailureKind;
use crate::counters::CrackCounters;

/// Stable identity of a crack record for the record's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrackId {
    index: u32,
    generation: u32,
}

impl CrackId {
    /// Arena slot of this record.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// One bond-failure event.
#[derive(Debug, Clone, PartialEq)]
pub struct CrackRecord {
    pub particle_a: Entity,
    pub particle_b: Entity,
    pub kind: FailureKind,
    /// Simulation time since the session started.
    pub formation_time: f64,
    pub formation_cycle: u64,
    /// Working flag for filters; not part of the event itself.
    pub selected: bool,
}

impl CrackRecord {
    pub fn involves(&self, particle: Entity) -> bool {
        self.particle_a == particle || self.particle_b == particle
    }

    /// True if the record joins `p1` and `p2`, in either order.
    pub fn joins(&self, p1: Entity, p2: Entity) -> bool {
        (self.particle_a == p1 && self.particle_b == p2)
            || (self.particle_a == p2 && self.particle_b == p1)
    }
}

/// Formation-time range of a set of records.
///
/// When nothing matched, this is `TimeBounds::EMPTY` (min = +inf, max = 0);
/// check `is_empty` before trusting the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub min: f64,
    pub max: f64,
    pub matched: usize,
}

impl TimeBounds {
    pub const EMPTY: TimeBounds = TimeBounds {
        min: f64::INFINITY,
        max: 0.0,
        matched: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }

    pub fn span(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    record: Option<CrackRecord>,
}

/// The session's crack log.
#[derive(Debug, Default)]
pub struct CrackStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<CrackId>,
    counters: CrackCounters,
}

impl CrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard every record and zero the counters.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.order.clear();
        self.counters = CrackCounters::default();
    }

    /// Append a new record and count it.
    pub fn insert(
        &mut self,
        particle_a: Entity,
        particle_b: Entity,
        kind: FailureKind,
        formation_time: f64,
        formation_cycle: u64,
    ) -> CrackId {
        let record = CrackRecord {
            particle_a,
            particle_b,
            kind,
            formation_time,
            formation_cycle,
            selected: false,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.record = Some(record);
                CrackId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                CrackId {
                    index,
                    generation: 0,
                }
            }
        };

        self.order.push(id);
        self.counters.record_formed(kind);
        debug!(
            crack = id.index,
            ?particle_a,
            ?particle_b,
            kind = kind.name(),
            formation_cycle,
            "crack formed"
        );
        id
    }

    /// Remove every record with `particle` as an endpoint.
    ///
    /// Returns the number removed; an unknown particle is a no-op.
    pub fn remove_by_particle(&mut self, particle: Entity) -> usize {
        let Self {
            slots,
            free,
            order,
            counters,
        } = self;

        let mut removed = 0;
        order.retain(|id| {
            let slot = &mut slots[id.index as usize];
            let hit = slot
                .record
                .as_ref()
                .is_some_and(|record| record.involves(particle));
            if hit {
                slot.record = None;
                slot.generation = slot.generation.wrapping_add(1);
                free.push(id.index);
                counters.record_removed();
                removed += 1;
            }
            !hit
        });

        if removed > 0 {
            debug!(?particle, removed, "cracks removed with particle");
        }
        removed
    }

    /// Look up a live record.
    pub fn get(&self, id: CrackId) -> Option<&CrackRecord> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    /// Find a record joining the two particles, in either order.
    pub fn find_by_particle_pair(&self, p1: Entity, p2: Entity) -> Option<CrackId> {
        self.iter()
            .find(|(_, record)| record.joins(p1, p2))
            .map(|(id, _)| id)
    }

    /// Records in insertion order. Each call starts from the beginning.
    pub fn iter(&self) -> impl Iterator<Item = (CrackId, &CrackRecord)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.get(*id).map(|record| (*id, record)))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut CrackRecord> + '_ {
        self.slots.iter_mut().filter_map(|slot| slot.record.as_mut())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn counters(&self) -> &CrackCounters {
        &self.counters
    }

    /// Formation-time range over the records matching `predicate`.
    pub fn time_bounds<F>(&self, predicate: F) -> TimeBounds
    where
        F: Fn(&CrackRecord) -> bool,
    {
        let start = TimeBounds {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            matched: 0,
        };
        let bounds = self
            .iter()
            .map(|(_, record)| record)
            .filter(|record| predicate(record))
            .fold(start, |acc, record| TimeBounds {
                min: acc.min.min(record.formation_time),
                max: acc.max.max(record.formation_time),
                matched: acc.matched + 1,
            });

        if bounds.matched == 0 {
            info!("time bounds requested over an empty crack set");
            return TimeBounds::EMPTY;
        }
        bounds
    }

    /// Formation-time range over the selected records.
    pub fn selected_time_bounds(&self) -> TimeBounds {
        self.time_bounds(|record| record.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.iter().filter(|(_, record)| record.selected).count()
    }
}
