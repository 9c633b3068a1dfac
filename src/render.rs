//! Rendering contract for crack views.
//!
//! Rendering runs in two phases:
//!
//! 1. **Gather** - snapshot the selected records and their particles, then
//!    derive geometry for each. Derivation is pure, so with `--features
//!    parallel` this phase uses rayon.
//! 2. **Draw** - hand primitives to the `CrackRenderer` one at a time, in
//!    store order, until it asks to stop.
//!
//! The color scheme and icon shape are resolved once per render, not per
//! record.

use bevy_ecs::prelude::*;
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::components::{FailureKind, Point};
use crate::config::{ColorMode, CrackViewConfig, IconStyle};
use crate::error::{CrackError, CrackResult};
use crate::filter::CrackFilter;
use crate::geometry::{derive, CrackGeometry, ParticleState};
use crate::session::CrackSession;
use crate::store::{CrackId, TimeBounds};

/// Vertices in a 3-D crack disk outline.
pub const RING_SEGMENTS: usize = 16;

/// Renderer reply after each primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawStatus {
    Continue,
    /// Stop iterating; no further primitives are delivered.
    Stop,
}

/// One crack ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CrackPrimitive {
    pub id: CrackId,
    pub kind: FailureKind,
    pub formation_time: f64,
    pub geometry: CrackGeometry,
    pub color_class: usize,
    pub style: IconStyle,
    /// Segment endpoints in 2-D, disk outline in 3-D.
    pub vertices: Vec<Point>,
}

/// Consumer of crack primitives.
pub trait CrackRenderer {
    fn draw(&mut self, primitive: &CrackPrimitive) -> DrawStatus;
}

impl<F> CrackRenderer for F
where
    F: FnMut(&CrackPrimitive) -> DrawStatus,
{
    fn draw(&mut self, primitive: &CrackPrimitive) -> DrawStatus {
        self(primitive)
    }
}

/// Color classification resolved for one render pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorScheme {
    ByFailureKind,
    ByFormationTime { min: f64, max: f64, buckets: usize },
}

impl ColorScheme {
    pub fn resolve(mode: ColorMode, bounds: &TimeBounds, buckets: usize) -> Self {
        match mode {
            ColorMode::ByFailureKind => ColorScheme::ByFailureKind,
            ColorMode::ByFormationTime => ColorScheme::ByFormationTime {
                min: bounds.min,
                max: bounds.max,
                buckets: buckets.max(1),
            },
        }
    }

    pub fn class_count(&self) -> usize {
        match self {
            ColorScheme::ByFailureKind => FailureKind::ALL.len(),
            ColorScheme::ByFormationTime { buckets, .. } => *buckets,
        }
    }

    pub fn classify(&self, kind: FailureKind, formation_time: f64) -> usize {
        match *self {
            ColorScheme::ByFailureKind => kind.index(),
            ColorScheme::ByFormationTime { min, max, buckets } => {
                let span = max - min;
                if !span.is_finite() || span <= 0.0 {
                    return 0;
                }
                let t = ((formation_time - min) / span).clamp(0.0, 1.0);
                ((t * buckets as f64).floor() as usize).min(buckets - 1)
            }
        }
    }
}

/// Outline vertices of a crack icon.
#[cfg(feature = "dim2")]
pub fn icon_vertices(geometry: &CrackGeometry) -> Vec<Point> {
    let t = geometry.trace_direction();
    let c = geometry.centroid;
    let r = geometry.radius;
    vec![
        [c[0] - r * t[0], c[1] - r * t[1]],
        [c[0] + r * t[0], c[1] + r * t[1]],
    ]
}

/// Outline vertices of a crack icon.
#[cfg(not(feature = "dim2"))]
pub fn icon_vertices(geometry: &CrackGeometry) -> Vec<Point> {
    let (u, v) = geometry.plane_axes();
    let c = geometry.centroid;
    let r = geometry.radius;
    (0..RING_SEGMENTS)
        .map(|i| {
            let angle = i as f64 / RING_SEGMENTS as f64 * std::f64::consts::TAU;
            let (s, k) = angle.sin_cos();
            [
                c[0] + r * (k * u[0] + s * v[0]),
                c[1] + r * (k * u[1] + s * v[1]),
                c[2] + r * (k * u[2] + s * v[2]),
            ]
        })
        .collect()
}

/// Outcome of a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub selected: usize,
    pub drawn: usize,
    pub skipped_degenerate: usize,
    pub skipped_missing: usize,
    pub stopped_early: bool,
}

/// A selected record with its particles read from the world.
#[derive(Debug, Clone, Copy)]
struct CrackSource {
    id: CrackId,
    kind: FailureKind,
    formation_time: f64,
    a: ParticleState,
    b: ParticleState,
}

/// Draw every selected crack under `config`.
///
/// The current selection is drawn as is. A configured cycle window replaces
/// it first (select none, then the window). The icon size multiplier scales
/// radii on top of the session multiplier without changing it.
pub fn render_cracks<R>(
    world: &mut World,
    config: &CrackViewConfig,
    renderer: &mut R,
) -> CrackResult<RenderSummary>
where
    R: CrackRenderer + ?Sized,
{
    config.validate()?;
    let mut summary = RenderSummary::default();

    let (selected, bounds, multiplier) = {
        let Some(mut session) = world.get_resource_mut::<CrackSession>() else {
            return Ok(summary);
        };
        if let Some(range) = config.cycle_range {
            let store = session.store_mut();
            CrackFilter::None.apply(store);
            CrackFilter::Cycles(range).apply(store);
        }

        let multiplier = session.radius_multiplier() * config.effective_size_multiplier();
        let store = session.store();
        let selected: Vec<_> = store
            .iter()
            .filter(|(_, record)| record.selected)
            .map(|(id, record)| (id, record.clone()))
            .collect();
        (selected, store.selected_time_bounds(), multiplier)
    };

    summary.selected = selected.len();
    if bounds.is_empty() {
        info!("no cracks selected for rendering");
        return Ok(summary);
    }
    let scheme = ColorScheme::resolve(config.color_mode, &bounds, config.time_buckets);

    // Gather
    let mut sources = Vec::with_capacity(selected.len());
    for (id, record) in &selected {
        let a = ParticleState::from_world(world, record.particle_a);
        let b = ParticleState::from_world(world, record.particle_b);
        match (a, b) {
            (Some(a), Some(b)) => sources.push(CrackSource {
                id: *id,
                kind: record.kind,
                formation_time: record.formation_time,
                a,
                b,
            }),
            _ => {
                warn!(crack = id.index(), "crack particle missing from world; skipped");
                summary.skipped_missing += 1;
            }
        }
    }

    let build = |source: &CrackSource| -> CrackResult<CrackPrimitive> {
        let geometry = derive(&source.a, &source.b, multiplier)?;
        Ok(CrackPrimitive {
            id: source.id,
            kind: source.kind,
            formation_time: source.formation_time,
            geometry,
            color_class: scheme.classify(source.kind, source.formation_time),
            style: config.icon_style,
            vertices: icon_vertices(&geometry),
        })
    };

    #[cfg(feature = "parallel")]
    let primitives: Vec<_> = sources.par_iter().map(build).collect();
    #[cfg(not(feature = "parallel"))]
    let primitives: Vec<_> = sources.iter().map(build).collect();

    // Draw
    for (source, primitive) in sources.iter().zip(primitives) {
        match primitive {
            Ok(primitive) => {
                summary.drawn += 1;
                if renderer.draw(&primitive) == DrawStatus::Stop {
                    summary.stopped_early = true;
                    break;
                }
            }
            Err(CrackError::DegenerateGeometry) => {
                warn!(crack = source.id.index(), "degenerate crack geometry; skipped");
                summary.skipped_degenerate += 1;
            }
            Err(other) => return Err(other),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{point, FailureKind, ParticleBundle};

    fn world_with_cracks(times: &[(f64, u64)]) -> World {
        let mut world = World::new();
        world.insert_resource(CrackSession::new(0.0));
        let mut pairs = Vec::new();
        for (i, _) in times.iter().enumerate() {
            let x = 10.0 * i as f64;
            let a = world.spawn(ParticleBundle::new(point(x, 0.0, 0.0), 1.0)).id();
            let b = world.spawn(ParticleBundle::new(point(x + 3.0, 0.0, 0.0), 1.0)).id();
            pairs.push((a, b));
        }
        let mut session = world.resource_mut::<CrackSession>();
        for ((a, b), &(time, cycle)) in pairs.into_iter().zip(times) {
            session
                .store_mut()
                .insert(a, b, FailureKind::ContactShear, time, cycle);
        }
        crate::filter::select_all(session.store_mut());
        world
    }

    #[test]
    fn test_time_scheme_buckets() {
        let bounds = TimeBounds {
            min: 0.0,
            max: 10.0,
            matched: 3,
        };
        let scheme = ColorScheme::resolve(ColorMode::ByFormationTime, &bounds, 16);
        assert_eq!(scheme.class_count(), 16);
        assert_eq!(scheme.classify(FailureKind::ContactNormal, 0.0), 0);
        assert_eq!(scheme.classify(FailureKind::ContactNormal, 5.0), 8);
        assert_eq!(scheme.classify(FailureKind::ContactNormal, 10.0), 15);

        let flat = TimeBounds {
            min: 3.0,
            max: 3.0,
            matched: 1,
        };
        let scheme = ColorScheme::resolve(ColorMode::ByFormationTime, &flat, 16);
        assert_eq!(scheme.classify(FailureKind::ContactNormal, 3.0), 0);
    }

    #[test]
    fn test_kind_scheme_uses_kind_index() {
        let scheme = ColorScheme::resolve(ColorMode::ByFailureKind, &TimeBounds::EMPTY, 16);
        for kind in FailureKind::ALL {
            assert_eq!(scheme.classify(kind, 99.0), kind.index());
        }
    }

    #[test]
    fn test_render_draws_every_crack() {
        let mut world = world_with_cracks(&[(1.0, 10), (2.0, 20), (3.0, 30)]);
        let config = CrackViewConfig {
            color_mode: ColorMode::ByFormationTime,
            time_buckets: 4,
            ..Default::default()
        };
        let mut drawn = Vec::new();
        let summary = render_cracks(&mut world, &config, &mut |p: &CrackPrimitive| {
            drawn.push((p.color_class, p.vertices.len()));
            DrawStatus::Continue
        })
        .unwrap();

        assert_eq!(summary.drawn, 3);
        assert!(!summary.stopped_early);
        let classes: Vec<_> = drawn.iter().map(|(c, _)| *c).collect();
        assert_eq!(classes, vec![0, 2, 3]);
        let expected_vertices = if cfg!(feature = "dim2") { 2 } else { RING_SEGMENTS };
        assert!(drawn.iter().all(|(_, n)| *n == expected_vertices));
    }

    #[test]
    fn test_renderer_can_stop_early() {
        let mut world = world_with_cracks(&[(1.0, 10), (2.0, 20), (3.0, 30)]);
        let mut calls = 0;
        let summary = render_cracks(
            &mut world,
            &CrackViewConfig::default(),
            &mut |_: &CrackPrimitive| {
                calls += 1;
                DrawStatus::Stop
            },
        )
        .unwrap();

        assert_eq!(calls, 1);
        assert!(summary.stopped_early);
    }

    #[test]
    fn test_cycle_window_and_size_multiplier() {
        let mut world = world_with_cracks(&[(1.0, 10), (2.0, 100), (3.0, 200)]);
        let config = CrackViewConfig {
            cycle_range: Some(crate::filter::CycleRange::new(50, 150)),
            icon_size_multiplier: 2.0,
            ..Default::default()
        };
        let mut radii = Vec::new();
        let summary = render_cracks(&mut world, &config, &mut |p: &CrackPrimitive| {
            radii.push(p.geometry.radius);
            DrawStatus::Continue
        })
        .unwrap();

        assert_eq!(summary.selected, 1);
        assert_eq!(radii.len(), 1);
        assert!((radii[0] - 2.0).abs() < 1e-9);
        assert_eq!(world.resource::<CrackSession>().radius_multiplier(), 1.0);
    }

    #[test]
    fn test_render_keeps_caller_selection_and_multiplier() {
        let mut world = world_with_cracks(&[(1.0, 10), (2.0, 100), (3.0, 200)]);
        {
            let mut session = world.resource_mut::<CrackSession>();
            session.set_radius_multiplier(3.0);
            crate::filter::select_none(session.store_mut());
            crate::filter::select_by_cycle_range(session.store_mut(), 50, 150);
        }

        let mut radii = Vec::new();
        let summary = render_cracks(
            &mut world,
            &CrackViewConfig::default(),
            &mut |p: &CrackPrimitive| {
                radii.push(p.geometry.radius);
                DrawStatus::Continue
            },
        )
        .unwrap();

        assert_eq!(summary.drawn, 1);
        assert!((radii[0] - 3.0).abs() < 1e-9);
        let session = world.resource::<CrackSession>();
        assert_eq!(session.store().selected_count(), 1);
        assert_eq!(session.radius_multiplier(), 3.0);
    }

    #[test]
    fn test_degenerate_crack_is_skipped() {
        let mut world = world_with_cracks(&[(1.0, 10)]);
        let a = world.spawn(ParticleBundle::new(point(50.0, 0.0, 0.0), 1.0)).id();
        let b = world.spawn(ParticleBundle::new(point(50.0, 0.0, 0.0), 1.0)).id();
        world
            .resource_mut::<CrackSession>()
            .store_mut()
            .insert(a, b, FailureKind::ContactNormal, 2.0, 20);
        crate::filter::select_all(world.resource_mut::<CrackSession>().store_mut());

        let summary = render_cracks(
            &mut world,
            &CrackViewConfig::default(),
            &mut |_: &CrackPrimitive| DrawStatus::Continue,
        )
        .unwrap();

        assert_eq!(summary.drawn, 1);
        assert_eq!(summary.skipped_degenerate, 1);
    }

    #[test]
    fn test_empty_selection_draws_nothing() {
        let mut world = world_with_cracks(&[]);
        let summary = render_cracks(
            &mut world,
            &CrackViewConfig::default(),
            &mut |_: &CrackPrimitive| DrawStatus::Continue,
        )
        .unwrap();
        assert_eq!(summary, RenderSummary::default());
    }
}
