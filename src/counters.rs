//! Aggregate crack statistics, maintained incrementally by the store.

use serde::{Deserialize, Serialize};

use crate::components::FailureKind;

/// Session-wide crack counts.
///
/// `total_formed` and the per-kind counts record historical events and only
/// ever grow within a session. `live` tracks records still in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrackCounters {
    pub total_formed: u64,
    pub contact_normal: u64,
    pub contact_shear: u64,
    pub parallel_normal: u64,
    pub parallel_shear: u64,
    pub live: u64,
}

impl CrackCounters {
    pub(crate) fn record_formed(&mut self, kind: FailureKind) {
        self.total_formed += 1;
        *self.failures_mut(kind) += 1;
        self.live += 1;
    }

    pub(crate) fn record_removed(&mut self) {
        self.live = self.live.saturating_sub(1);
    }

    /// Number of failures of the given kind this session.
    pub fn failures(&self, kind: FailureKind) -> u64 {
        match kind {
            FailureKind::ContactNormal => self.contact_normal,
            FailureKind::ContactShear => self.contact_shear,
            FailureKind::ParallelNormal => self.parallel_normal,
            FailureKind::ParallelShear => self.parallel_shear,
        }
    }

    fn failures_mut(&mut self, kind: FailureKind) -> &mut u64 {
        match kind {
            FailureKind::ContactNormal => &mut self.contact_normal,
            FailureKind::ContactShear => &mut self.contact_shear,
            FailureKind::ParallelNormal => &mut self.parallel_normal,
            FailureKind::ParallelShear => &mut self.parallel_shear,
        }
    }

    /// Cracks formed and later removed with a deleted particle.
    pub fn removed(&self) -> u64 {
        self.total_formed - self.live
    }
}
