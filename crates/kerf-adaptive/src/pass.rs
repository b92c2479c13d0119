//! The inner loop emitting one cutting pass.
//!
//! Each step recomputes the smoothed tool direction, sizes the step from
//! the boundary distance and the last deflection angle, then searches for
//! the deflection angle whose swept area per distance matches the target
//! chip load. The search probes at most a fixed number of angles, feeding
//! every probe into the interpolation table so later probes can invert it.

use rand::rngs::StdRng;
use std::f64::consts::FRAC_PI_4;

use kerf_geom::{
    average, average_direction, distance, distance_point_to_paths_sqrd, path_segment_intersection,
    point_within_cut_region, rotate, Interpolation, Path, Point, Vec2,
};

use crate::progress::ProgressSink;
use crate::region::RegionDriver;
use crate::{
    ANGLE_HISTORY_POINTS, AREA_ERROR_FACTOR, DIRECTION_SMOOTHING_BUFLEN, MAX_ITERATIONS,
    POINTS_PER_PASS_LIMIT, RESOLUTION_FACTOR,
};

/// What one pass produced.
pub(crate) struct PassOutcome {
    /// Tool-center polyline of the pass (empty when nothing was cut).
    pub path: Path,
    /// Last tool position attempted, accepted or not.
    pub last_attempt: Point,
    /// Total material removed by the pass.
    pub cumulative_cut_area: f64,
    /// Final step size, scaled units.
    pub step: f64,
}

impl RegionDriver<'_> {
    /// Run one cutting pass from `start_pos` heading `start_dir`. The start
    /// position doubles as the engage point the step sizing keys off.
    pub(crate) fn run_pass(
        &mut self,
        start_pos: Point,
        start_dir: Vec2,
        first_engage: bool,
        rng: &mut StdRng,
        progress: &mut ProgressSink<'_>,
    ) -> PassOutcome {
        let r = self.cfg.tool_radius;
        let optimal = self.cfg.optimal_cut_area_pd;
        let engage_point = start_pos;

        let mut tool_pos = start_pos;
        let mut new_tool_pos = start_pos;
        let mut pass_tool_path = Path::new();
        let mut to_clear_path = Path::new();
        let mut angle_history: Vec<f64> = Vec::new();
        let mut interp = Interpolation::new();
        let mut gyro: Vec<Vec2> = vec![start_dir; DIRECTION_SMOOTHING_BUFLEN];
        let mut angle = FRAC_PI_4; // initial pass angle
        let mut cumulative_cut_area = 0.0;
        let mut step_scaled = RESOLUTION_FACTOR * 2.0;
        let mut reached_boundary = false;

        for _point in 0..POINTS_PER_PASS_LIMIT {
            self.counters.points += 1;
            let tool_dir = average_direction(&gyro);

            let (bound_dist_sqrd, _) = distance_point_to_paths_sqrd(&self.tool_bound, tool_pos);
            let distance_to_boundary = bound_dist_sqrd.sqrt();
            let distance_to_engage = distance(tool_pos, engage_point);
            let rel_dist_to_boundary = 2.0 * distance_to_boundary / r;

            // taper the target chip load when closing in on the boundary
            let mut target_area_pd = optimal;
            if rel_dist_to_boundary < 1.0 && distance_to_engage > r {
                target_area_pd = rel_dist_to_boundary * (optimal - self.cfg.min_cut_area_pd)
                    + self.cfg.min_cut_area_pd;
            }

            // step size: finesse near the boundary or the engage point,
            // otherwise smaller steps while turning harder
            step_scaled = if distance_to_boundary < r || distance_to_engage < r {
                RESOLUTION_FACTOR * 2.0
            } else if angle.abs() > 1e-5 {
                RESOLUTION_FACTOR / angle.abs()
            } else {
                RESOLUTION_FACTOR * 4.0
            };
            step_scaled = step_scaled.max(RESOLUTION_FACTOR * 2.0).min(r / 2.0);

            let predicted_angle = average(&angle_history);
            let max_error = AREA_ERROR_FACTOR / step_scaled + 2.0;
            let mut area = 0.0;
            let mut area_pd = 0.0;
            let mut new_tool_dir = tool_dir;
            interp.clear();

            for iteration in 0..MAX_ITERATIONS {
                self.counters.probe_iterations += 1;
                angle = if iteration == 0 {
                    predicted_angle
                } else if iteration == 1 {
                    Interpolation::MIN_ANGLE
                } else if iteration == 3 {
                    Interpolation::MAX_ANGLE
                } else if interp.point_count() < 2 || iteration == 5 || iteration == 9 {
                    interp.random_angle(rng)
                } else {
                    interp.interpolate_angle(target_area_pd)
                };
                angle = interp.clamp_angle(angle);

                new_tool_dir = rotate(tool_dir, angle);
                new_tool_pos = Point::new(
                    (tool_pos.x as f64 + new_tool_dir.x * step_scaled).round() as i64,
                    (tool_pos.y as f64 + new_tool_dir.y * step_scaled).round() as i64,
                );
                area = self.estimator.estimate(tool_pos, new_tool_pos, &self.cleared);
                area_pd = area / step_scaled;
                interp.add_point(area_pd, angle);

                if (area_pd - target_area_pd).abs() < max_error {
                    angle_history.push(angle);
                    if angle_history.len() > ANGLE_HISTORY_POINTS {
                        angle_history.remove(0);
                    }
                    break;
                }
                if iteration == MAX_ITERATIONS - 1 {
                    self.counters.probes_exhausted += 1;
                }
            }

            // boundary stop: clip the step onto the machining boundary
            if distance_to_boundary < r && !point_within_cut_region(&self.tool_bound, new_tool_pos)
            {
                reached_boundary = true;
                if let Some(boundary_point) =
                    path_segment_intersection(&self.tool_bound, tool_pos, new_tool_pos)
                {
                    new_tool_pos = boundary_point;
                    area = self.estimator.estimate(tool_pos, new_tool_pos, &self.cleared);
                    area_pd = area / step_scaled;
                } else {
                    new_tool_pos = tool_pos;
                    area = 0.0;
                    area_pd = 0.0;
                }
            }

            if area > 3.0 * optimal + 10.0 && area_pd > 2.0 * optimal + 10.0 {
                log::debug!("pass break: over cut");
                break;
            }

            if to_clear_path.is_empty() {
                to_clear_path.push(tool_pos);
            }
            to_clear_path.push(new_tool_pos);
            if first_engage && to_clear_path.len() > 10 {
                // the initial spiral needs the cleared region kept current
                // in smaller intervals
                self.expand_cleared(&mut to_clear_path);
            }

            if area > 0.0 {
                cumulative_cut_area += area;
                if pass_tool_path.is_empty() {
                    pass_tool_path.push(tool_pos);
                }
                pass_tool_path.push(new_tool_pos);
                self.counters.cut_length += step_scaled / self.cfg.scale_factor;
                tool_pos = new_tool_pos;

                progress.push_point(self.to_model(new_tool_pos));
                gyro.push(new_tool_dir);
                gyro.remove(0);
                progress.maybe_report();
                if progress.stopped() {
                    break;
                }
            } else {
                break;
            }
            if reached_boundary {
                break;
            }
        }

        if !to_clear_path.is_empty() {
            self.expand_cleared(&mut to_clear_path);
        }

        PassOutcome {
            path: pass_tool_path,
            last_attempt: new_tool_pos,
            cumulative_cut_area,
            step: step_scaled,
        }
    }
}
