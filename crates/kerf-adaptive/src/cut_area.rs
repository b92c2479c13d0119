//! Analytic cut-area estimation.
//!
//! Moving the tool disc from one center to the next sweeps a crescent; the
//! part of that crescent lying in uncut material is the chip load of the
//! step. Computing it with polygon booleans per probe would dominate the
//! whole run, so the estimator works with closed-form circle geometry
//! instead: it walks the cleared-region boundary, extracts the subpaths that
//! dip inside the new tool disc, and for each one integrates the area
//! between the boundary, the two disc circles and the disc center using a
//! fan of radial scan rays.

use kerf_geom::{
    distance, distance_sqrd, line_circle_intersect, point_to_segment_distance_sqrd, Path, Paths,
    Point, Vec2, NTOL,
};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::RESOLUTION_FACTOR;

/// Estimates the uncut area swept per step for a fixed tool radius.
///
/// The engage walker receives this as a capability so it can qualify
/// re-entry positions with the same arithmetic the pass engine uses.
#[derive(Debug, Clone, Copy)]
pub struct CutAreaEstimator {
    /// Tool radius in scaled units.
    pub tool_radius: f64,
}

impl CutAreaEstimator {
    /// Create an estimator for a tool radius in scaled units.
    pub fn new(tool_radius: f64) -> Self {
        Self { tool_radius }
    }

    /// Estimated area inside the disc at `c2`, outside the disc at `c1` and
    /// outside the cleared region, i.e. the material newly removed by the
    /// step `c1 -> c2`.
    pub fn estimate(&self, c1: Point, c2: Point, cleared: &Paths) -> f64 {
        if distance_sqrd(c1, c2) < NTOL {
            return 0.0;
        }
        let r = self.tool_radius;
        let rsqrd = r * r;
        let mut area = 0.0;

        for path in cleared {
            let size = path.len();
            if size < 2 {
                continue;
            }
            // find a starting vertex outside the new disc; a path fully
            // inside contributes no boundary arc
            let mut cur = 0usize;
            let mut found = false;
            for _ in 0..size {
                if distance_sqrd(path[cur], c2) > rsqrd {
                    found = true;
                    break;
                }
                cur += 1;
                if cur >= size {
                    cur = 0;
                }
            }
            if !found {
                continue;
            }

            // walk the loop, collecting the subpaths inside the disc
            let mut inner: Path = Vec::new();
            let mut prev_inside = false;
            let mut process = false;
            let mut p1 = path[cur];
            for _ in 0..size {
                cur += 1;
                if cur >= size {
                    cur = 0;
                }
                let p2 = path[cur];
                if !prev_inside {
                    // outside: does this segment reach into the disc?
                    let (seg_dist, _) = point_to_segment_distance_sqrd(p1, p2, c2, true);
                    if seg_dist <= rsqrd {
                        prev_inside = true;
                        inner.clear();
                        let inters = line_circle_intersect(c2, r, p1, p2, true);
                        if let Some(first) = inters.first() {
                            inner.push(Point::from_vec2(*first));
                            if inters.len() > 1 {
                                // the segment crosses straight through
                                inner.push(Point::from_vec2(inters[1]));
                                process = true;
                                prev_inside = false;
                            } else {
                                inner.push(p2);
                            }
                        } else {
                            // grazing contact, treat the endpoint as inside
                            inner.push(p2);
                        }
                    }
                } else if distance_sqrd(c2, p2) <= rsqrd {
                    inner.push(p2);
                } else {
                    // leaving the disc, close the subpath at the exit
                    let inters = line_circle_intersect(c2, r, p1, p2, true);
                    if let Some(last) = inters.last() {
                        inner.push(Point::from_vec2(*last));
                    }
                    process = true;
                    prev_inside = false;
                }

                if process {
                    process = false;
                    area += self.subpath_contribution(&inner, c1, c2);
                }
                p1 = p2;
            }
        }
        area
    }

    /// Area contribution of one cleared-boundary subpath inside disc(c2).
    ///
    /// The sector spanned by the subpath endpoints (seen from `c2`) minus
    /// the polygon bounded by the scan-ray hits gives the uncut part; the
    /// sign flips when the subpath runs against the cutting direction,
    /// which puts the sector on the trailing side of the tool.
    fn subpath_contribution(&self, inner: &Path, c1: Point, c2: Point) -> f64 {
        let size = inner.len();
        if size < 2 {
            return 0.0;
        }
        let r = self.tool_radius;
        let first = inner[0];
        let last = inner[size - 1];
        let mut inner_len = 0.0;
        for j in 1..size {
            inner_len += distance(inner[j - 1], inner[j]);
        }
        if inner_len < NTOL {
            return 0.0;
        }

        // compare the subpath's general direction with the cut direction
        let fdir = ((last.y - first.y) as f64).atan2((last.x - first.x) as f64);
        let cut_dir = ((c2.y - c1.y) as f64).atan2((c2.x - c1.x) as f64);
        let mut diff = (cut_dir - fdir).abs();
        diff = diff.min(2.0 * PI - diff);
        let reverse = diff > FRAC_PI_2;

        let fi1 = ((first.y - c2.y) as f64).atan2((first.x - c2.x) as f64);
        let fi2 = ((last.y - c2.y) as f64).atan2((last.x - c2.x) as f64);
        let (min_fi, mut max_fi) = if reverse { (fi2, fi1) } else { (fi1, fi2) };
        if max_fi < min_fi {
            max_fi += 2.0 * PI;
        }

        let scan_distance = 2.5 * r;
        let step_distance = RESOLUTION_FACTOR + 1.0;
        let mut boundary: Vec<Vec2> = vec![first.to_vec2()];
        let mut prev_pt = inner[0];
        let mut dist_along = 0.0;

        for j in 1..size {
            let cpt = inner[j];
            let seg_len = distance(cpt, prev_pt);
            if seg_len < NTOL {
                continue;
            }
            let dx = (cpt.x - prev_pt.x) as f64;
            let dy = (cpt.y - prev_pt.y) as f64;
            let mut pos_unclamped = 0.0;
            while pos_unclamped < seg_len + step_distance {
                let mut pos = pos_unclamped;
                if pos > seg_len {
                    dist_along += step_distance - (pos - seg_len);
                    pos = seg_len; // land exactly on the segment end
                } else {
                    dist_along += step_distance;
                }
                let seg_point = Point::new(
                    (prev_pt.x as f64 + dx * pos / seg_len).round() as i64,
                    (prev_pt.y as f64 + dy * pos / seg_len).round() as i64,
                );
                let scan_angle = min_fi + dist_along * (max_fi - min_fi) / inner_len;
                let scan_point = Point::new(
                    (c2.x as f64 + scan_distance * scan_angle.cos()).round() as i64,
                    (c2.y as f64 + scan_distance * scan_angle.sin()).round() as i64,
                );

                let mut inters_c2 = seg_point.to_vec2();
                let hits = line_circle_intersect(c2, r, seg_point, scan_point, true);
                if let Some(hit) = hits.last() {
                    inters_c2 = *hit;
                } else {
                    boundary.push(seg_point.to_vec2());
                }

                let hits = line_circle_intersect(c1, r, seg_point, scan_point, true);
                if let Some(hit) = hits.last() {
                    let inters_c1 = *hit;
                    let d2 = (seg_point.to_vec2() - inters_c2).norm_squared();
                    let d1 = (seg_point.to_vec2() - inters_c1).norm_squared();
                    boundary.push(if d2 < d1 { inters_c2 } else { inters_c1 });
                } else {
                    boundary.push(seg_point.to_vec2());
                }
                pos_unclamped += step_distance;
            }
            prev_pt = cpt;
        }

        boundary.push(last.to_vec2());
        boundary.push(c2.to_vec2());

        let sector = (max_fi - min_fi) * r * r / 2.0;
        let bounded = shoelace(&boundary).abs();
        if reverse {
            -(sector - bounded)
        } else {
            sector - bounded
        }
    }
}

fn shoelace(points: &[Vec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        sum += p.x * q.y - q.x * p.y;
    }
    sum / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use kerf_clip::{offset_paths, EndKind, JoinKind};

    fn disc(center: Point, radius: f64) -> Paths {
        offset_paths(
            &vec![vec![center]],
            JoinKind::Round,
            EndKind::OpenRound,
            radius,
        )
    }

    /// Ground truth by grid integration: area inside disc(c2), outside
    /// disc(c1), outside the cleared disc at the origin.
    fn grid_area(c1: Point, c2: Point, r: f64, cleared_radius: f64) -> f64 {
        let step = 2.0;
        let mut count = 0u64;
        let (cx, cy) = (c2.x as f64, c2.y as f64);
        let mut y = cy - r;
        while y <= cy + r {
            let mut x = cx - r;
            while x <= cx + r {
                let in_c2 = (x - cx).powi(2) + (y - cy).powi(2) <= r * r;
                let in_c1 =
                    (x - c1.x as f64).powi(2) + (y - c1.y as f64).powi(2) <= r * r;
                let in_cleared = x * x + y * y <= cleared_radius * cleared_radius;
                if in_c2 && !in_c1 && !in_cleared {
                    count += 1;
                }
                x += step;
            }
            y += step;
        }
        count as f64 * step * step
    }

    #[test]
    fn test_zero_step_is_zero_area() {
        let est = CutAreaEstimator::new(200.0);
        let cleared = disc(Point::zero(), 200.0);
        assert_eq!(est.estimate(Point::zero(), Point::zero(), &cleared), 0.0);
    }

    #[test]
    fn test_estimate_matches_grid_integration() {
        // tool discs at the edge of a cleared disc, stepping at an angle to
        // the boundary as the pass engine does
        let r = 200.0;
        let est = CutAreaEstimator::new(r);
        let cleared = disc(Point::zero(), r);
        let cases = [
            (Point::new(100, 0), Point::new(100, 100)),
            (Point::new(0, -100), Point::new(80, -60)),
            (Point::new(-100, 0), Point::new(-100, -100)),
        ];
        for (c1, c2) in cases {
            let area = est.estimate(c1, c2, &cleared);
            let expected = grid_area(c1, c2, r, r);
            let err = (area - expected).abs() / expected.max(1.0);
            assert!(
                err < 0.2,
                "{c1:?} -> {c2:?}: estimated {area}, grid {expected} (err {err:.3})"
            );
        }
    }

    #[test]
    fn test_step_inside_cleared_is_zero() {
        // both discs deep inside a big cleared region
        let r = 200.0;
        let est = CutAreaEstimator::new(r);
        let cleared = disc(Point::zero(), 2000.0);
        let area = est.estimate(Point::zero(), Point::new(80, 0), &cleared);
        assert!(area.abs() < 1.0, "expected no uncut material, got {area}");
    }

    #[test]
    fn test_disjoint_cleared_is_zero() {
        // the cleared region is nowhere near the tool
        let r = 200.0;
        let est = CutAreaEstimator::new(r);
        let cleared = disc(Point::new(5000, 5000), 300.0);
        let area = est.estimate(Point::zero(), Point::new(80, 0), &cleared);
        assert_eq!(area, 0.0);
    }

    #[test]
    fn test_larger_step_cuts_more() {
        let r = 200.0;
        let est = CutAreaEstimator::new(r);
        let cleared = disc(Point::zero(), r);
        let c1 = Point::new(100, 0);
        let a1 = est.estimate(c1, Point::new(100, 60), &cleared);
        let a2 = est.estimate(c1, Point::new(100, 120), &cleared);
        assert!(a1 > 0.0);
        assert!(a2 > a1);
    }
}
