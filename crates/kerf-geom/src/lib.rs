#![warn(missing_docs)]

//! Fixed-point 2D geometry for kerf toolpath generation.
//!
//! All machining geometry lives on a scaled integer grid: model-unit doubles
//! are multiplied by a scale factor on the way in and divided back on the way
//! out, so the polygon engine always sees exact integer coordinates. This
//! crate provides the integer point/path types plus the circle and segment
//! intersection primitives the adaptive engine is built from, and thin
//! double-precision helpers (directions, rotation, averaging) on top of
//! nalgebra.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

pub mod interp;

pub use interp::Interpolation;

/// Numeric tolerance for degenerate-geometry tests.
pub const NTOL: f64 = 1.0e-7;

/// A point on the scaled integer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate in scaled units.
    pub x: i64,
    /// Y coordinate in scaled units.
    pub y: i64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Convert to a double-precision vector.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f64, self.y as f64)
    }

    /// Round a double-precision vector back onto the grid.
    pub fn from_vec2(v: Vec2) -> Self {
        Self {
            x: v.x.round() as i64,
            y: v.y.round() as i64,
        }
    }
}

/// A sequence of grid points, treated as a closed polygon unless noted open.
pub type Path = Vec<Point>;

/// A list of paths; when describing a region, index 0 is the outer contour
/// and the remaining paths are holes.
pub type Paths = Vec<Path>;

/// A double-precision 2D vector (directions, offsets).
pub type Vec2 = Vector2<f64>;

/// Squared distance between two grid points.
pub fn distance_sqrd(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx * dx + dy * dy
}

/// Distance between two grid points.
pub fn distance(a: Point, b: Point) -> f64 {
    distance_sqrd(a, b).sqrt()
}

/// Rescale the segment `p1 -> p2` to the given length, keeping `p1` fixed.
///
/// Returns `None` for a zero-length segment.
pub fn set_segment_length(p1: Point, p2: Point, new_length: f64) -> Option<Point> {
    let dx = (p2.x - p1.x) as f64;
    let dy = (p2.y - p1.y) as f64;
    let l = (dx * dx + dy * dy).sqrt();
    if l > 0.0 {
        Some(Point::new(
            (p1.x as f64 + new_length * dx / l).round() as i64,
            (p1.y as f64 + new_length * dy / l).round() as i64,
        ))
    } else {
        None
    }
}

/// Squared distance from `pt` to the segment `p1 -> p2`, and the closest
/// point on it. With `clamp` the parameter is restricted to the segment,
/// otherwise the full carrier line is used.
pub fn point_to_segment_distance_sqrd(
    p1: Point,
    p2: Point,
    pt: Point,
    clamp: bool,
) -> (f64, Point) {
    let d21x = (p2.x - p1.x) as f64;
    let d21y = (p2.y - p1.y) as f64;
    let dp1x = (pt.x - p1.x) as f64;
    let dp1y = (pt.y - p1.y) as f64;
    let seg_len_sqrd = d21x * d21x + d21y * d21y;
    if seg_len_sqrd == 0.0 {
        // zero length segment, point to point distance
        return (dp1x * dp1x + dp1y * dp1y, p1);
    }
    let mut parameter = dp1x * d21x + dp1y * d21y;
    if clamp {
        parameter = parameter.clamp(0.0, seg_len_sqrd);
    }
    let closest = Point::new(
        (p1.x as f64 + parameter * d21x / seg_len_sqrd).round() as i64,
        (p1.y as f64 + parameter * d21y / seg_len_sqrd).round() as i64,
    );
    let dx = (pt.x - closest.x) as f64;
    let dy = (pt.y - closest.y) as f64;
    (dx * dx + dy * dy, closest)
}

/// Intersection of segment `s1p1 -> s1p2` with segment `s2p1 -> s2p2`.
///
/// Determinant based; near-parallel segments (|det| < NTOL) and candidates
/// outside either segment yield `None`. Colinear endpoint touches are not
/// treated specially; callers must pre-reject degenerate overlap.
pub fn segment_intersection(s1p1: Point, s1p2: Point, s2p1: Point, s2p2: Point) -> Option<Point> {
    let s1dx = (s1p2.x - s1p1.x) as f64;
    let s1dy = (s1p2.y - s1p1.y) as f64;
    let s2dx = (s2p2.x - s2p1.x) as f64;
    let s2dy = (s2p2.y - s2p1.y) as f64;
    let d = s1dy * s2dx - s2dy * s1dx;
    if d.abs() < NTOL {
        return None; // lines are parallel
    }
    let lpdx = (s1p1.x - s2p1.x) as f64;
    let lpdy = (s1p1.y - s2p1.y) as f64;
    let p1d = s2dy * lpdx - s2dx * lpdy;
    let p2d = s1dy * lpdx - s1dx * lpdy;
    if d < 0.0 && (p1d < d || p1d > 0.0 || p2d < d || p2d > 0.0) {
        return None;
    }
    if d > 0.0 && (p1d < 0.0 || p1d > d || p2d < 0.0 || p2d > d) {
        return None;
    }
    let t = p1d / d;
    Some(Point::new(
        (s1p1.x as f64 + s1dx * t).round() as i64,
        (s1p1.y as f64 + s1dy * t).round() as i64,
    ))
}

/// Intersections of the segment `p1 -> p2` with the circle at `c`.
///
/// Results are ordered along `p1 -> p2` (entry first). With `clamp` only
/// parameters inside `[0, 1]` are kept; without it both carrier-line
/// solutions are returned. Empty when the discriminant is negative or the
/// segment is degenerate.
pub fn line_circle_intersect(
    c: Point,
    radius: f64,
    p1: Point,
    p2: Point,
    clamp: bool,
) -> Vec<Vec2> {
    let dx = (p2.x - p1.x) as f64;
    let dy = (p2.y - p1.y) as f64;
    let lcx = (p1.x - c.x) as f64;
    let lcy = (p1.y - c.y) as f64;
    let a = dx * dx + dy * dy;
    if a < NTOL {
        return Vec::new();
    }
    let b = 2.0 * dx * lcx + 2.0 * dy * lcy;
    let cc = lcx * lcx + lcy * lcy - radius * radius;
    let sq = b * b - 4.0 * a * cc;
    if sq < 0.0 {
        return Vec::new(); // no solution
    }
    let sq = sq.sqrt();
    let t1 = (-b - sq) / (2.0 * a);
    let t2 = (-b + sq) / (2.0 * a);
    let at = |t: f64| Vec2::new(p1.x as f64 + t * dx, p1.y as f64 + t * dy);
    let mut result = Vec::new();
    if clamp {
        if (0.0..=1.0).contains(&t1) {
            result.push(at(t1));
        }
        if (0.0..=1.0).contains(&t2) {
            result.push(at(t2));
        }
    } else {
        result.push(at(t1));
        result.push(at(t2));
    }
    result
}

/// Intersections of two equal-radius circles.
///
/// `None` when the centers coincide (within NTOL) or are too far apart for
/// the discs to overlap.
pub fn circle_circle_intersect(c1: Point, c2: Point, radius: f64) -> Option<(Vec2, Vec2)> {
    let dx = (c2.x - c1.x) as f64;
    let dy = (c2.y - c1.y) as f64;
    let d = (dx * dx + dy * dy).sqrt();
    if d < NTOL {
        return None; // same center
    }
    if d >= 2.0 * radius {
        return None; // do not intersect
    }
    let a_2 = (4.0 * radius * radius - d * d).sqrt() / 2.0;
    let mx = 0.5 * ((c1.x + c2.x) as f64);
    let my = 0.5 * ((c1.y + c2.y) as f64);
    Some((
        Vec2::new(mx - dy * a_2 / d, my + dx * a_2 / d),
        Vec2::new(mx + dy * a_2 / d, my - dx * a_2 / d),
    ))
}

/// Signed cross product locating `pt` relative to the directed line
/// `p1 -> p2`: positive on the left, negative on the right.
pub fn point_side_of_line(p1: Point, p2: Point, pt: Point) -> f64 {
    ((pt.x - p1.x) as f64) * ((p2.y - p1.y) as f64)
        - ((pt.y - p1.y) as f64) * ((p2.x - p1.x) as f64)
}

/// Unsigned angle at `p2` formed by `p1 -> p2 -> p3`, in `[0, pi]`.
pub fn angle_3(p1: Vec2, p2: Vec2, p3: Vec2) -> f64 {
    let t1 = (p1.y - p2.y).atan2(p1.x - p2.x);
    let t2 = (p3.y - p2.y).atan2(p3.x - p2.x);
    let a = (t2 - t1).abs();
    a.min(2.0 * std::f64::consts::PI - a)
}

/// Centroid of a closed polygon by the signed-area formula.
///
/// `None` for degenerate polygons (|signed area| < NTOL).
pub fn polygon_centroid(vertices: &[Point]) -> Option<Point> {
    let size = vertices.len();
    if size < 3 {
        return None;
    }
    let mut signed_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..size {
        let x0 = vertices[i].x as f64;
        let y0 = vertices[i].y as f64;
        let x1 = vertices[(i + 1) % size].x as f64;
        let y1 = vertices[(i + 1) % size].y as f64;
        let a = x0 * y1 - x1 * y0;
        signed_area += a;
        cx += (x0 + x1) * a;
        cy += (y0 + y1) * a;
    }
    signed_area *= 0.5;
    if signed_area.abs() < NTOL {
        return None;
    }
    Some(Point::new(
        (cx / (6.0 * signed_area)).round() as i64,
        (cy / (6.0 * signed_area)).round() as i64,
    ))
}

/// Location of a point relative to a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointInPolygon {
    /// Strictly outside.
    Outside,
    /// On the polygon boundary.
    OnEdge,
    /// Strictly inside.
    Inside,
}

/// Classify `pt` against the closed polygon `path`.
pub fn point_in_polygon(pt: Point, path: &[Point]) -> PointInPolygon {
    let n = path.len();
    if n < 3 {
        return PointInPolygon::Outside;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = path[i];
        let pj = path[j];
        let cross = (pt.x - pi.x) * (pj.y - pi.y) - (pt.y - pi.y) * (pj.x - pi.x);
        if cross == 0
            && pt.x >= pi.x.min(pj.x)
            && pt.x <= pi.x.max(pj.x)
            && pt.y >= pi.y.min(pj.y)
            && pt.y <= pi.y.max(pj.y)
        {
            return PointInPolygon::OnEdge;
        }
        if (pi.y > pt.y) != (pj.y > pt.y) {
            let x_int =
                pi.x as f64 + (pt.y - pi.y) as f64 * (pj.x - pi.x) as f64 / (pj.y - pi.y) as f64;
            if (pt.x as f64) < x_int {
                inside = !inside;
            }
        }
        j = i;
    }
    if inside {
        PointInPolygon::Inside
    } else {
        PointInPolygon::Outside
    }
}

/// True iff `pt` is inside the first path (the boundary) and outside every
/// following path (the holes).
pub fn point_within_cut_region(region: &Paths, pt: Point) -> bool {
    for (i, path) in region.iter().enumerate() {
        let pip = point_in_polygon(pt, path);
        if i == 0 && pip == PointInPolygon::Outside {
            return false; // outside boundary
        }
        if i > 0 && pip != PointInPolygon::Outside {
            return false; // inside a hole
        }
    }
    true
}

/// Minimum squared distance from `pt` to any segment of `paths`, and the
/// closest boundary point.
pub fn distance_point_to_paths_sqrd(paths: &Paths, pt: Point) -> (f64, Point) {
    let mut min_dist_sq = f64::MAX;
    let mut closest = pt;
    for path in paths {
        let size = path.len();
        for j in 0..size {
            let p1 = path[if j > 0 { j - 1 } else { size - 1 }];
            let p2 = path[j];
            let (dist_sq, clp) = point_to_segment_distance_sqrd(p1, p2, pt, true);
            if dist_sq < min_dist_sq {
                min_dist_sq = dist_sq;
                closest = clp;
            }
        }
    }
    (min_dist_sq, closest)
}

/// First intersection of the segment `p1 -> p2` with any segment of `paths`.
pub fn path_segment_intersection(paths: &Paths, p1: Point, p2: Point) -> Option<Point> {
    for path in paths {
        let size = path.len();
        if size < 2 {
            continue;
        }
        for j in 0..size {
            let pp1 = path[if j > 0 { j - 1 } else { size - 1 }];
            let pp2 = path[j];
            if let Some(pt) = segment_intersection(p1, p2, pp1, pp2) {
                return Some(pt);
            }
        }
    }
    None
}

/// Rotate a vector by `rad` radians counterclockwise.
pub fn rotate(v: Vec2, rad: f64) -> Vec2 {
    let (s, c) = rad.sin_cos();
    Vec2::new(c * v.x - s * v.y, s * v.x + c * v.y)
}

/// Normalized sum of a set of unit vectors; falls back to +X when the sum is
/// degenerate.
pub fn average_direction(unit_vectors: &[Vec2]) -> Vec2 {
    let sum: Vec2 = unit_vectors.iter().fold(Vec2::zeros(), |acc, v| acc + v);
    let magnitude = sum.norm();
    if magnitude < NTOL {
        Vec2::new(1.0, 0.0)
    } else {
        sum / magnitude
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Merge near-collinear and near-coincident vertices within `tolerance`.
///
/// Walking the input, a retained vertex is replaced by the incoming one when
/// the incoming vertex stays within `tolerance` of the carrier line of the
/// last retained segment, so runs of almost-collinear points collapse to
/// their endpoints.
pub fn clean_path(input: &[Point], tolerance: f64) -> Path {
    let mut out: Path = Vec::with_capacity(input.len());
    for &pt in input {
        if out.is_empty() {
            out.push(pt);
        } else if out.len() > 2 {
            let (dist_sqrd, _) =
                point_to_segment_distance_sqrd(out[out.len() - 2], out[out.len() - 1], pt, false);
            if dist_sqrd.sqrt() < tolerance {
                out.pop();
                out.push(pt);
            } else {
                out.push(pt);
            }
        } else if distance_sqrd(out[out.len() - 1], pt).sqrt() < tolerance {
            out.pop();
            out.push(pt);
        } else {
            out.push(pt);
        }
    }
    out
}

/// Total length of a path, including the closing segment when `closed`.
pub fn path_length(path: &[Point], closed: bool) -> f64 {
    let mut len = 0.0;
    for w in path.windows(2) {
        len += distance(w[0], w[1]);
    }
    if closed && path.len() > 1 {
        len += distance(path[path.len() - 1], path[0]);
    }
    len
}

/// Translate every point of a path by `delta`.
pub fn translate_path(path: &[Point], delta: Point) -> Path {
    path.iter()
        .map(|p| Point::new(p.x + delta.x, p.y + delta.y))
        .collect()
}

/// True when at least one path holds at least one point.
pub fn has_any_path(paths: &Paths) -> bool {
    paths.iter().any(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn square(half: i64) -> Path {
        vec![
            Point::new(-half, -half),
            Point::new(half, -half),
            Point::new(half, half),
            Point::new(-half, half),
        ]
    }

    #[test]
    fn test_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((distance_sqrd(a, b) - 25.0).abs() < 1e-9);
        assert!((distance(a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_segment_length() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        let c = set_segment_length(a, b, 25.0).unwrap();
        assert_eq!(c, Point::new(25, 0));
        assert!(set_segment_length(a, a, 5.0).is_none());
    }

    #[test]
    fn test_point_to_segment_distance() {
        let (d2, foot) =
            point_to_segment_distance_sqrd(Point::new(0, 0), Point::new(10, 0), Point::new(5, 7), true);
        assert!((d2 - 49.0).abs() < 1e-9);
        assert_eq!(foot, Point::new(5, 0));

        // clamped to the nearest endpoint
        let (d2, foot) =
            point_to_segment_distance_sqrd(Point::new(0, 0), Point::new(10, 0), Point::new(14, 3), true);
        assert_eq!(foot, Point::new(10, 0));
        assert!((d2 - 25.0).abs() < 1e-9);

        // unclamped uses the carrier line
        let (d2, _) =
            point_to_segment_distance_sqrd(Point::new(0, 0), Point::new(10, 0), Point::new(14, 3), false);
        assert!((d2 - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_intersection() {
        let hit = segment_intersection(
            Point::new(0, 0),
            Point::new(10, 10),
            Point::new(0, 10),
            Point::new(10, 0),
        );
        assert_eq!(hit, Some(Point::new(5, 5)));

        // parallel
        assert!(segment_intersection(
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(0, 5),
            Point::new(10, 5),
        )
        .is_none());

        // carrier lines cross outside the segments
        assert!(segment_intersection(
            Point::new(0, 0),
            Point::new(1, 1),
            Point::new(10, 0),
            Point::new(10, 20),
        )
        .is_none());
    }

    #[test]
    fn test_line_circle_intersect() {
        let c = Point::new(0, 0);
        let hits = line_circle_intersect(c, 5.0, Point::new(-10, 0), Point::new(10, 0), true);
        assert_eq!(hits.len(), 2);
        // ordered along the segment: entry first
        assert!(hits[0].x < hits[1].x);
        for h in &hits {
            let r = (h.x * h.x + h.y * h.y).sqrt();
            assert!((r - 5.0).abs() < 1e-9);
        }

        // no solution
        assert!(line_circle_intersect(c, 5.0, Point::new(-10, 8), Point::new(10, 8), true).is_empty());

        // unclamped returns both carrier-line solutions even off-segment
        let hits = line_circle_intersect(c, 5.0, Point::new(-100, 0), Point::new(-90, 0), false);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].x + 5.0).abs() < 1e-9);
        assert!((hits[1].x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_circle_intersect() {
        let (a, b) = circle_circle_intersect(Point::new(0, 0), Point::new(10, 0), 10.0).unwrap();
        for p in [a, b] {
            let r1 = (p.x * p.x + p.y * p.y).sqrt();
            let r2 = ((p.x - 10.0).powi(2) + p.y * p.y).sqrt();
            assert!((r1 - 10.0).abs() < 1e-9);
            assert!((r2 - 10.0).abs() < 1e-9);
        }
        assert!(circle_circle_intersect(Point::new(0, 0), Point::new(0, 0), 10.0).is_none());
        assert!(circle_circle_intersect(Point::new(0, 0), Point::new(50, 0), 10.0).is_none());
    }

    #[test]
    fn test_point_side_of_line() {
        let a = Point::new(0, 0);
        let b = Point::new(10, 0);
        assert!(point_side_of_line(a, b, Point::new(5, 5)) > 0.0);
        assert!(point_side_of_line(a, b, Point::new(5, -5)) < 0.0);
        assert_eq!(point_side_of_line(a, b, Point::new(5, 0)), 0.0);
    }

    #[test]
    fn test_angle_3() {
        let a = angle_3(Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0));
        assert!((a - PI / 2.0).abs() < 1e-9);
        let a = angle_3(Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0), Vec2::new(-1.0, 0.0));
        assert!((a - PI).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_centroid() {
        let c = polygon_centroid(&square(100)).unwrap();
        assert_eq!(c, Point::new(0, 0));

        // regular polygon centered away from origin
        let n = 16;
        let path: Path = (0..n)
            .map(|i| {
                let a = 2.0 * PI * i as f64 / n as f64;
                Point::new(
                    (500.0 + 200.0 * a.cos()).round() as i64,
                    (-300.0 + 200.0 * a.sin()).round() as i64,
                )
            })
            .collect();
        let c = polygon_centroid(&path).unwrap();
        assert!((c.x - 500).abs() <= 1);
        assert!((c.y + 300).abs() <= 1);

        // degenerate
        assert!(polygon_centroid(&[Point::new(0, 0), Point::new(10, 0), Point::new(20, 0)]).is_none());
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(10);
        assert_eq!(point_in_polygon(Point::new(0, 0), &sq), PointInPolygon::Inside);
        assert_eq!(point_in_polygon(Point::new(20, 0), &sq), PointInPolygon::Outside);
        assert_eq!(point_in_polygon(Point::new(10, 0), &sq), PointInPolygon::OnEdge);
        assert_eq!(point_in_polygon(Point::new(10, 10), &sq), PointInPolygon::OnEdge);
    }

    #[test]
    fn test_point_within_cut_region() {
        let region: Paths = vec![square(100), square(20)];
        assert!(point_within_cut_region(&region, Point::new(50, 50)));
        assert!(!point_within_cut_region(&region, Point::new(0, 0))); // in hole
        assert!(!point_within_cut_region(&region, Point::new(200, 0))); // outside
    }

    #[test]
    fn test_distance_point_to_paths() {
        let paths: Paths = vec![square(10)];
        let (d2, closest) = distance_point_to_paths_sqrd(&paths, Point::new(0, 0));
        assert!((d2 - 100.0).abs() < 1e-9);
        assert!(closest.x.abs() == 10 || closest.y.abs() == 10);
    }

    #[test]
    fn test_path_segment_intersection() {
        let paths: Paths = vec![square(10)];
        let hit = path_segment_intersection(&paths, Point::new(0, 0), Point::new(20, 0));
        assert_eq!(hit, Some(Point::new(10, 0)));
        assert!(path_segment_intersection(&paths, Point::new(0, 0), Point::new(5, 0)).is_none());
    }

    #[test]
    fn test_rotate() {
        let v = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_direction() {
        let dirs = [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let avg = average_direction(&dirs);
        assert!((avg.norm() - 1.0).abs() < 1e-9);
        assert!((avg.x - avg.y).abs() < 1e-9);

        // degenerate sum falls back to +X
        let dirs = [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0)];
        assert_eq!(average_direction(&dirs), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_clean_path_merges_collinear() {
        let path = vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(20, 0),
            Point::new(30, 0),
            Point::new(30, 10),
        ];
        let cleaned = clean_path(&path, 1.0);
        assert!(cleaned.len() < path.len());
        assert_eq!(cleaned[0], Point::new(0, 0));
        assert_eq!(*cleaned.last().unwrap(), Point::new(30, 10));
    }

    #[test]
    fn test_clean_path_idempotent() {
        let path = vec![
            Point::new(0, 0),
            Point::new(100, 3),
            Point::new(200, 0),
            Point::new(200, 200),
            Point::new(0, 200),
        ];
        let once = clean_path(&path, 2.0);
        let twice = clean_path(&once, 2.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_path_length() {
        let path = square(10);
        assert!((path_length(&path, true) - 80.0).abs() < 1e-9);
        assert!((path_length(&path, false) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_serde_round_trip() {
        let p = Point::new(42, -7);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
