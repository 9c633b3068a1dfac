//! Crack geometry derived from the two particles of a failed bond.
//!
//! Nothing here is cached: geometry is recomputed from live particle state
//! each time it is asked for, so it always reflects current positions.
//!
//! Given particles A and B with `v = posB - posA` and `d = |v|`:
//!
//! ```text
//! normal   = v / d
//! aperture = d - rA - rB            (negative when the particles overlap)
//! mult     = rA + aperture / 2
//! centroid = posA + mult * normal   (bisects the gap)
//! radius   = k * (rA + (rB - rA) * mult / d)
//! ```
//!
//! where `k` is the session radius multiplier. The result is symmetric in A
//! and B apart from the sign of the normal.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{ParticlePosition, ParticleRadius, Point, DIM};
use crate::error::{CrackError, CrackResult};

/// Distances at or below this are treated as coincident centers.
const DEGENERATE_DISTANCE: f64 = 1e-12;

/// Position and radius of one particle, as read from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Point,
    pub radius: f64,
}

impl ParticleState {
    pub fn new(position: Point, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Read a particle's state from the world. `None` if it is gone.
    pub fn from_world(world: &World, particle: Entity) -> Option<Self> {
        let position = world.get::<ParticlePosition>(particle)?;
        let radius = world.get::<ParticleRadius>(particle)?;
        Some(Self::new(position.0, radius.0))
    }
}

/// Derived description of a crack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrackGeometry {
    pub centroid: Point,
    /// Unit vector pointing from particle A to particle B.
    pub normal: Point,
    pub aperture: f64,
    pub radius: f64,
}

/// Derive crack geometry for the pair (A, B).
pub fn derive(
    a: &ParticleState,
    b: &ParticleState,
    radius_multiplier: f64,
) -> CrackResult<CrackGeometry> {
    let v = sub(&b.position, &a.position);
    let distance = norm(&v);
    if distance <= DEGENERATE_DISTANCE {
        return Err(CrackError::DegenerateGeometry);
    }

    let normal = scale(&v, 1.0 / distance);
    let aperture = distance - a.radius - b.radius;
    let mult = a.radius + aperture / 2.0;
    let centroid = add(&a.position, &scale(&normal, mult));
    let radius = radius_multiplier * (a.radius + (b.radius - a.radius) * (mult / distance));

    Ok(CrackGeometry {
        centroid,
        normal,
        aperture,
        radius,
    })
}

impl CrackGeometry {
    /// Two unit vectors spanning the crack plane, orthogonal to the normal.
    #[cfg(not(feature = "dim2"))]
    pub fn plane_axes(&self) -> (Point, Point) {
        let n = self.normal;
        // Any axis not parallel to the normal works as a seed.
        let seed = if n[0].abs() < 0.9 {
            [1.0, 0.0, 0.0]
        } else {
            [0.0, 1.0, 0.0]
        };
        let u = cross(&n, &seed);
        let u = scale(&u, 1.0 / norm(&u));
        let v = cross(&n, &u);
        (u, v)
    }

    /// Unit vector along the crack trace, orthogonal to the normal.
    #[cfg(feature = "dim2")]
    pub fn trace_direction(&self) -> Point {
        [-self.normal[1], self.normal[0]]
    }
}

// ============================================================================
// VECTOR HELPERS
// ============================================================================

#[inline]
pub(crate) fn sub(a: &Point, b: &Point) -> Point {
    let mut out = [0.0; DIM];
    for i in 0..DIM {
        out[i] = a[i] - b[i];
    }
    out
}

#[inline]
pub(crate) fn add(a: &Point, b: &Point) -> Point {
    let mut out = [0.0; DIM];
    for i in 0..DIM {
        out[i] = a[i] + b[i];
    }
    out
}

#[inline]
pub(crate) fn scale(a: &Point, k: f64) -> Point {
    let mut out = *a;
    for c in out.iter_mut() {
        *c *= k;
    }
    out
}

#[inline]
pub(crate) fn norm(a: &Point) -> f64 {
    a.iter().map(|c| c * c).sum::<f64>().sqrt()
}

#[cfg(not(feature = "dim2"))]
#[inline]
fn cross(a: &Point, b: &Point) -> Point {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}
