//! Polygon offsetting.
//!
//! Closed polygons are offset with `cavalier_contours::parallel_offset`, one
//! loop at a time: outer loops and holes are offset in opposite directions
//! and recombined with a boolean difference. Arc segments (bulge vertices)
//! in the engine output are flattened back to line segments before the
//! result re-enters the integer path model.
//!
//! Open paths with round ends are buffered directly: every segment becomes a
//! capsule (rectangle plus two semicircular caps) and the capsules are
//! unioned in a single overlay. A single-point path buffers to a disc,
//! which is how the tool footprint and the helix clearance are built.

use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};
use i_overlay::core::overlay_rule::OverlayRule;
use kerf_geom::{Path, Paths, Point, Vec2, NTOL};
use std::panic;

use crate::{overlay_float, signed_area};

/// Corner style for closed-polygon offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Convex corners become arcs.
    Round,
    /// Convex corners are beveled.
    Square,
}

/// Endpoint treatment for offsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndKind {
    /// Paths are closed polygons; positive delta grows the region.
    ClosedPolygon,
    /// Paths are open strokes buffered by the delta with round caps.
    OpenRound,
}

/// Maximum chord deviation when flattening arcs, in scaled units.
const ARC_SAGITTA: f64 = 0.5;

/// Offset a path set.
///
/// For [`EndKind::ClosedPolygon`] the set follows the region convention
/// (counterclockwise outers, clockwise holes) and `delta > 0` grows the
/// region. For [`EndKind::OpenRound`] each path is treated as an open
/// stroke and buffered by `delta` (which must be positive) with round caps.
///
/// The join kind is advisory: the offset engine produces round joins, which
/// the adaptive loop's tolerances absorb for the square-join call sites.
pub fn offset_paths(paths: &Paths, _join: JoinKind, end: EndKind, delta: f64) -> Paths {
    match end {
        EndKind::ClosedPolygon => offset_closed(paths, delta),
        EndKind::OpenRound => offset_open_round(paths, delta),
    }
}

fn offset_closed(paths: &Paths, delta: f64) -> Paths {
    let mut outers: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut holes: Vec<Vec<[f64; 2]>> = Vec::new();
    for path in paths {
        if path.len() < 3 {
            continue;
        }
        let area = signed_area(path);
        if area.abs() < NTOL {
            continue;
        }
        let is_hole = area < 0.0;
        let mut ring = path.clone();
        if is_hole {
            ring.reverse();
        }
        let pline = to_pline(&ring);
        if pline.vertex_count() < 3 {
            continue;
        }
        // The engine offsets a counterclockwise loop inward for positive
        // deltas, so growing the region means negating: outer loops move by
        // -delta, hole loops (now counterclockwise) by +delta.
        let engine_delta = if is_hole { delta } else { -delta };
        let results = panic::catch_unwind(panic::AssertUnwindSafe(|| {
            pline.parallel_offset(engine_delta)
        }))
        .unwrap_or_else(|_| {
            log::warn!("parallel offset failed for a loop, dropping it");
            Vec::new()
        });
        let bucket = if is_hole { &mut holes } else { &mut outers };
        for result in &results {
            let flat = flatten_pline(result);
            if flat.len() >= 3 {
                bucket.push(flat);
            }
        }
    }
    overlay_float(outers, holes, OverlayRule::Difference)
}

fn offset_open_round(paths: &Paths, delta: f64) -> Paths {
    if delta <= 0.0 {
        return Paths::new();
    }
    let mut shapes: Vec<Vec<[f64; 2]>> = Vec::new();
    for path in paths {
        let mut pts: Path = path.clone();
        pts.dedup();
        if pts.is_empty() {
            continue;
        }
        if pts.len() == 1 {
            shapes.push(circle_contour(pts[0].to_vec2(), delta));
            continue;
        }
        for w in pts.windows(2) {
            shapes.push(capsule_contour(w[0].to_vec2(), w[1].to_vec2(), delta));
        }
    }
    overlay_float(shapes, Vec::new(), OverlayRule::Difference)
}

fn to_pline(ring: &[Point]) -> Polyline<f64> {
    let mut pline = Polyline::new();
    for p in ring {
        pline.add_vertex(PlineVertex::new(p.x as f64, p.y as f64, 0.0));
    }
    pline.set_is_closed(true);
    pline.remove_repeat_pos(1e-5);
    if pline.vertex_count() > 1 {
        let first = pline.at(0);
        let last = pline.at(pline.vertex_count() - 1);
        if (first.x - last.x).abs() < 1e-5 && (first.y - last.y).abs() < 1e-5 {
            pline.remove(pline.vertex_count() - 1);
        }
    }
    pline
}

/// Number of line segments approximating an arc of the given sweep so the
/// chord deviation stays below [`ARC_SAGITTA`].
fn arc_steps(radius: f64, sweep: f64) -> usize {
    if radius <= ARC_SAGITTA {
        return 1;
    }
    let max_step = 2.0 * (1.0 - ARC_SAGITTA / radius).acos();
    ((sweep.abs() / max_step).ceil() as usize).clamp(1, 90)
}

/// Expand bulge (arc) vertices of an offset result into line segments.
fn flatten_pline(pline: &Polyline<f64>) -> Vec<[f64; 2]> {
    let count = pline.vertex_count();
    if count < 2 {
        return Vec::new();
    }
    let closed = pline.is_closed();
    let last_segment = if closed { count } else { count - 1 };
    let mut points = Vec::with_capacity(count);
    for i in 0..last_segment {
        let v1 = pline.at(i);
        let v2 = pline.at((i + 1) % count);
        points.push([v1.x, v1.y]);
        if v1.bulge.abs() > 1e-5 {
            let theta = 4.0 * v1.bulge.atan();
            let chord = ((v2.x - v1.x).powi(2) + (v2.y - v1.y).powi(2)).sqrt();
            if chord < 1e-5 {
                continue;
            }
            let radius = (chord / (2.0 * (theta / 2.0).sin())).abs();
            let dist_to_center = radius * (theta.abs() / 2.0).cos();
            let mx = (v1.x + v2.x) / 2.0;
            let my = (v1.y + v2.y) / 2.0;
            let nx = -(v2.y - v1.y) / chord;
            let ny = (v2.x - v1.x) / chord;
            let sign = if v1.bulge > 0.0 { 1.0 } else { -1.0 };
            let cx = mx + nx * dist_to_center * sign;
            let cy = my + ny * dist_to_center * sign;
            let start_angle = (v1.y - cy).atan2(v1.x - cx);
            let mut end_angle = (v2.y - cy).atan2(v2.x - cx);
            if v1.bulge > 0.0 {
                if end_angle <= start_angle {
                    end_angle += 2.0 * std::f64::consts::PI;
                }
            } else if end_angle >= start_angle {
                end_angle -= 2.0 * std::f64::consts::PI;
            }
            let segments = arc_steps(radius, end_angle - start_angle);
            for j in 1..segments {
                let t = j as f64 / segments as f64;
                let angle = start_angle + (end_angle - start_angle) * t;
                points.push([cx + radius * angle.cos(), cy + radius * angle.sin()]);
            }
        }
    }
    if !closed {
        let v = pline.at(count - 1);
        points.push([v.x, v.y]);
    }
    points
}

/// Counterclockwise polygonized circle.
fn circle_contour(center: Vec2, radius: f64) -> Vec<[f64; 2]> {
    let steps = arc_steps(radius, 2.0 * std::f64::consts::PI).max(8);
    (0..steps)
        .map(|i| {
            let a = 2.0 * std::f64::consts::PI * i as f64 / steps as f64;
            [center.x + radius * a.cos(), center.y + radius * a.sin()]
        })
        .collect()
}

/// Counterclockwise capsule around the segment `a -> b`.
fn capsule_contour(a: Vec2, b: Vec2, radius: f64) -> Vec<[f64; 2]> {
    let d = b - a;
    let len = d.norm();
    if len < NTOL {
        return circle_contour(a, radius);
    }
    let u = d / len;
    let n = Vec2::new(-u.y, u.x);
    let mut points = Vec::new();
    points.push([a.x - n.x * radius, a.y - n.y * radius]);
    points.push([b.x - n.x * radius, b.y - n.y * radius]);
    append_arc(&mut points, b, radius, (-n.y).atan2(-n.x), radius_steps(radius));
    points.push([b.x + n.x * radius, b.y + n.y * radius]);
    points.push([a.x + n.x * radius, a.y + n.y * radius]);
    append_arc(&mut points, a, radius, n.y.atan2(n.x), radius_steps(radius));
    points
}

fn radius_steps(radius: f64) -> usize {
    arc_steps(radius, std::f64::consts::PI).max(4)
}

/// Append the interior points of a counterclockwise half-circle starting at
/// `start_angle` (start and end points are pushed by the caller).
fn append_arc(points: &mut Vec<[f64; 2]>, center: Vec2, radius: f64, start_angle: f64, steps: usize) {
    for j in 1..steps {
        let a = start_angle + std::f64::consts::PI * j as f64 / steps as f64;
        points.push([center.x + radius * a.cos(), center.y + radius * a.sin()]);
    }
}
