//! Crack Simulation - Crack Event Tracking Core
//!
//! Records bond failures between particles of a bonded-particle simulation as
//! they happen, keeps the record set consistent as particles are deleted, and
//! derives each crack's centroid, normal, aperture and radius on demand.
//! Uses `bevy_ecs` for the host particle/bond model and event delivery.

pub mod api;
pub mod bridge;
pub mod clock;
pub mod components;
pub mod config;
pub mod counters;
pub mod error;
pub mod filter;
pub mod geometry;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod store;

pub use api::CrackWorld;
pub use bridge::{BondBroken, CrackBridge};
pub use clock::SimClock;
pub use components::*;
pub use config::{ColorMode, CrackViewConfig, IconStyle};
pub use counters::CrackCounters;
pub use error::{CrackError, CrackResult};
pub use filter::{CrackFilter, CycleRange};
pub use geometry::{CrackGeometry, ParticleState};
pub use render::{CrackPrimitive, CrackRenderer, DrawStatus, RenderSummary};
pub use session::CrackSession;
pub use snapshot::CrackSnapshot;
pub use store::{CrackId, CrackRecord, CrackStore, TimeBounds};
