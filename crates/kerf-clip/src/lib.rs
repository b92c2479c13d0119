#![warn(missing_docs)]

//! Typed facade over the external polygon engines.
//!
//! The adaptive engine needs a handful of polygon primitives: offsetting
//! (closed polygons and round-capped open strokes), boolean union and
//! difference, outer/hole hierarchy resolution, and a few queries (signed
//! area, point-in-polygon, vertex cleaning). This crate adapts two engines
//! to the scaled-integer [`Path`](kerf_geom::Path) model:
//!
//! - [`cavalier_contours`] performs parallel offsets of closed polygons;
//!   arc (bulge) results are flattened back to line segments,
//! - [`i_overlay`] performs the boolean overlays with non-zero filling.
//!
//! Conventions: outer contours are counterclockwise (positive signed area),
//! holes clockwise. Every boolean result is normalized back to that
//! convention regardless of what the engine emits.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use kerf_geom::{clean_path, Path, Paths, Point};

mod offset;
mod tree;

pub use offset::{offset_paths, EndKind, JoinKind};
pub use tree::{offset_poly_tree, PolyNode, PolyTree};

// Re-exported so the facade covers the full engine contract.
pub use kerf_geom::{point_in_polygon, PointInPolygon};

/// Vertex-merge tolerance applied by [`clean_polygons`], in scaled units.
const POLYGON_CLEAN_DISTANCE: f64 = 1.415;

/// Signed area of a closed path: positive for counterclockwise loops.
pub fn signed_area(path: &[Point]) -> f64 {
    let n = path.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = path[i];
        let q = path[(i + 1) % n];
        sum += (p.x as f64) * (q.y as f64) - (q.x as f64) * (p.y as f64);
    }
    sum / 2.0
}

/// Union of two path sets.
pub fn union_paths(subject: &Paths, clip: &Paths) -> Paths {
    overlay(subject, clip, OverlayRule::Union)
}

/// Difference `subject \ clip`.
pub fn difference_paths(subject: &Paths, clip: &Paths) -> Paths {
    overlay(subject, clip, OverlayRule::Difference)
}

/// Resolve self-intersections and inconsistent winding in a path set,
/// returning clean outer/hole loops.
pub fn simplify_polygons(paths: &Paths) -> Paths {
    union_paths(paths, paths)
}

/// Merge near-collinear vertices in place and drop collapsed loops.
pub fn clean_polygons(paths: &mut Paths) {
    for path in paths.iter_mut() {
        *path = clean_path(path, POLYGON_CLEAN_DISTANCE);
    }
    paths.retain(|p| p.len() >= 3);
}

/// Total unsigned area of a path set, holes subtracted via loop orientation.
pub fn paths_area(paths: &Paths) -> f64 {
    paths.iter().map(|p| signed_area(p)).sum::<f64>().abs()
}

fn to_float_contour(path: &[Point]) -> Vec<[f64; 2]> {
    path.iter().map(|p| [p.x as f64, p.y as f64]).collect()
}

fn to_float_contours(paths: &Paths) -> Vec<Vec<[f64; 2]>> {
    paths
        .iter()
        .filter(|p| p.len() >= 3)
        .map(|p| to_float_contour(p))
        .collect()
}

fn overlay(subject: &Paths, clip: &Paths, rule: OverlayRule) -> Paths {
    overlay_float(to_float_contours(subject), to_float_contours(clip), rule)
}

/// Run one boolean overlay on float contours and convert the result back to
/// grid paths with the outer-CCW/hole-CW convention.
pub(crate) fn overlay_float(
    subject: Vec<Vec<[f64; 2]>>,
    clip: Vec<Vec<[f64; 2]>>,
    rule: OverlayRule,
) -> Paths {
    if subject.is_empty() && clip.is_empty() {
        return Paths::new();
    }
    let shapes = subject.overlay(&clip, rule, FillRule::NonZero);
    let mut out = Paths::new();
    for shape in shapes {
        let mut loops = Paths::new();
        for (index, contour) in shape.iter().enumerate() {
            let mut path: Path = contour
                .iter()
                .map(|c| Point::new(c[0].round() as i64, c[1].round() as i64))
                .collect();
            path.dedup();
            if path.len() > 1 && path[0] == path[path.len() - 1] {
                path.pop();
            }
            if path.len() < 3 {
                if index == 0 {
                    // outer collapsed, its holes are meaningless
                    loops.clear();
                    break;
                }
                continue;
            }
            let ccw = signed_area(&path) > 0.0;
            if (index == 0) != ccw {
                path.reverse();
            }
            loops.push(path);
        }
        out.append(&mut loops);
    }
    out
}
