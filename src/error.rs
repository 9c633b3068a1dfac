//! Error types for crack tracking.
//!
//! Only genuine failures live here. Lookups that routinely miss
//! return `Option`, and an empty time range is a sentinel value
//! (`TimeBounds::EMPTY`), not an error.

use bevy_ecs::prelude::Entity;

/// Errors raised by crack tracking operations.
#[derive(Debug, thiserror::Error)]
pub enum CrackError {
    /// The two particle centers coincide, so no crack plane exists.
    #[error("degenerate crack geometry: particle centers coincide")]
    DegenerateGeometry,

    /// A particle handle no longer resolves to a live particle.
    #[error("unknown particle: {0:?}")]
    UnknownParticle(Entity),

    /// A bond handle no longer resolves to a live bond.
    #[error("unknown bond: {0:?}")]
    UnknownBond(Entity),

    /// A bond was requested between a particle and itself.
    #[error("bond endpoints must be distinct particles: {0:?}")]
    SelfBond(Entity),

    /// Failure mode code other than 0 (normal) or 1 (shear).
    #[error("unknown failure mode code: {0}")]
    UnknownFailureMode(i32),

    /// A view configuration value is out of range.
    #[error("invalid crack view configuration: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CrackResult<T> = Result<T, CrackError>;
