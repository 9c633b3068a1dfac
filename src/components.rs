//! ECS components for the bonded-particle host model.
//!
//! Particles and bonds are plain entities. Crack records refer to particles by
//! `Entity` only, which is generational and therefore never keeps a particle
//! alive or aliases a recycled slot.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{CrackError, CrackResult};

// ============================================================================
// DIMENSIONALITY
// ============================================================================

/// Number of spatial components per point, fixed at build time.
#[cfg(not(feature = "dim2"))]
pub const DIM: usize = 3;

/// Number of spatial components per point, fixed at build time.
#[cfg(feature = "dim2")]
pub const DIM: usize = 2;

/// A position or direction in simulation space.
pub type Point = [f64; DIM];

/// Build a point from three coordinates. `z` is ignored in 2-D builds.
#[cfg(not(feature = "dim2"))]
pub fn point(x: f64, y: f64, z: f64) -> Point {
    [x, y, z]
}

/// Build a point from three coordinates. `z` is ignored in 2-D builds.
#[cfg(feature = "dim2")]
pub fn point(x: f64, y: f64, _z: f64) -> Point {
    [x, y]
}

// ============================================================================
// PARTICLE COMPONENTS
// ============================================================================

/// Marker for particle entities. Its removal is what the crack tracker
/// observes as a particle deletion.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Particle;

/// Particle center.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticlePosition(pub Point);

impl Default for ParticlePosition {
    fn default() -> Self {
        Self([0.0; DIM])
    }
}

/// Particle radius.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRadius(pub f64);

impl Default for ParticleRadius {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Bundle for spawning a particle entity.
#[derive(Bundle, Default)]
pub struct ParticleBundle {
    pub marker: Particle,
    pub position: ParticlePosition,
    pub radius: ParticleRadius,
}

impl ParticleBundle {
    pub fn new(position: Point, radius: f64) -> Self {
        Self {
            marker: Particle,
            position: ParticlePosition(position),
            radius: ParticleRadius(radius),
        }
    }
}

// ============================================================================
// BOND COMPONENTS
// ============================================================================

/// The two parent particles of a bond.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondEnds {
    pub a: Entity,
    pub b: Entity,
}

/// Bond family. A bonded pair carries exactly one of these.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondFamily {
    Contact,
    Parallel,
}

/// Loading mode under which a bond failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Tension or compression (code 0).
    Normal,
    /// Shear (code 1).
    Shear,
}

impl FailureMode {
    /// Map the host's raw failure code.
    pub fn from_code(code: i32) -> CrackResult<Self> {
        match code {
            0 => Ok(FailureMode::Normal),
            1 => Ok(FailureMode::Shear),
            other => Err(CrackError::UnknownFailureMode(other)),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            FailureMode::Normal => 0,
            FailureMode::Shear => 1,
        }
    }
}

/// Bundle for spawning a bond entity.
#[derive(Bundle)]
pub struct BondBundle {
    pub ends: BondEnds,
    pub family: BondFamily,
}

impl BondBundle {
    pub fn new(a: Entity, b: Entity, family: BondFamily) -> Self {
        Self {
            ends: BondEnds { a, b },
            family,
        }
    }
}

// ============================================================================
// CRACK CLASSIFICATION
// ============================================================================

/// Bond family and failure mode of a crack, folded into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    ContactNormal,
    ContactShear,
    ParallelNormal,
    ParallelShear,
}

impl FailureKind {
    pub const ALL: [FailureKind; 4] = [
        FailureKind::ContactNormal,
        FailureKind::ContactShear,
        FailureKind::ParallelNormal,
        FailureKind::ParallelShear,
    ];

    pub fn classify(family: BondFamily, mode: FailureMode) -> Self {
        match (family, mode) {
            (BondFamily::Contact, FailureMode::Normal) => FailureKind::ContactNormal,
            (BondFamily::Contact, FailureMode::Shear) => FailureKind::ContactShear,
            (BondFamily::Parallel, FailureMode::Normal) => FailureKind::ParallelNormal,
            (BondFamily::Parallel, FailureMode::Shear) => FailureKind::ParallelShear,
        }
    }

    /// Stable bucket index (0..4), also used as the color class.
    pub fn index(&self) -> usize {
        match self {
            FailureKind::ContactNormal => 0,
            FailureKind::ContactShear => 1,
            FailureKind::ParallelNormal => 2,
            FailureKind::ParallelShear => 3,
        }
    }

    pub fn family(&self) -> BondFamily {
        match self {
            FailureKind::ContactNormal | FailureKind::ContactShear => BondFamily::Contact,
            FailureKind::ParallelNormal | FailureKind::ParallelShear => BondFamily::Parallel,
        }
    }

    pub fn mode(&self) -> FailureMode {
        match self {
            FailureKind::ContactNormal | FailureKind::ParallelNormal => FailureMode::Normal,
            FailureKind::ContactShear | FailureKind::ParallelShear => FailureMode::Shear,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::ContactNormal => "ContactNormal",
            FailureKind::ContactShear => "ContactShear",
            FailureKind::ParallelNormal => "ParallelNormal",
            FailureKind::ParallelShear => "ParallelShear",
        }
    }
}
