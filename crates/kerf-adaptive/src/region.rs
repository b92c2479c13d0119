//! Per-region driving: entry selection, helix clearance, pass progression,
//! finishing pass and output assembly.
//!
//! One driver owns the cleared region, the engage cursor and the counters
//! for the lifetime of a single connected machining region; nothing is
//! shared between regions.

use rand::rngs::StdRng;

use kerf_clip as clip;
use kerf_geom::{clean_path, has_any_path, polygon_centroid, Path, Paths, Point, Vec2, NTOL};

use crate::cut_area::CutAreaEstimator;
use crate::engage::EngageWalker;
use crate::progress::ProgressSink;
use crate::{
    Counters, MotionKind, ModelPoint, RegionOutput, TaggedPath, CLEAN_PATH_TOLERANCE,
    ENGAGE_AREA_THR_FACTOR, ENGAGE_SCAN_DISTANCE_FACTOR, FINISHING_CLEAN_PATH_TOLERANCE,
    MIN_CUT_AREA_FACTOR, PASSES_LIMIT, RESOLUTION_FACTOR,
};

/// Engine configuration reduced to scaled units.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScaledConfig {
    pub scale_factor: f64,
    pub tool_radius: f64,
    pub helix_radius: f64,
    pub finish_offset: f64,
    pub step_over_factor: f64,
    pub reference_cut_area: f64,
    pub optimal_cut_area_pd: f64,
    pub min_cut_area_pd: f64,
}

/// Residual area accepted when classifying a link, soaking up grid-rounding
/// slivers from the polygon engine.
const CROSSING_AREA_SLACK: f64 = 1.0;

/// Residual area accepted by the helix fit check. Profiling bands are sized
/// so the helix fits exactly, which makes the check sensitive to rounding.
const HELIX_FIT_SLACK: f64 = 16.0;

pub(crate) struct RegionDriver<'a> {
    pub(crate) cfg: &'a ScaledConfig,
    /// Region grown back outward: the legal area for finishing.
    pub(crate) bound: Paths,
    /// Machining boundary: the legal loci for the tool center.
    pub(crate) tool_bound: Paths,
    pub(crate) cleared: Paths,
    pub(crate) estimator: CutAreaEstimator,
    pub(crate) counters: Counters,
}

impl<'a> RegionDriver<'a> {
    pub fn new(cfg: &'a ScaledConfig, bound: Paths, tool_bound: Paths) -> Self {
        Self {
            cfg,
            bound,
            tool_bound,
            cleared: Paths::new(),
            estimator: CutAreaEstimator::new(cfg.tool_radius),
            counters: Counters::default(),
        }
    }

    /// Clear one region. `None` skips the region (no entry point, or the
    /// helix does not fit); the caller proceeds with the other regions.
    pub fn run(&mut self, rng: &mut StdRng, progress: &mut ProgressSink<'_>) -> Option<RegionOutput> {
        let entry = self.find_entry_point()?;
        log::debug!("entry point at ({}, {})", entry.x, entry.y);

        // the helical ramp clears the initial disc
        self.cleared = clip::offset_paths(
            &vec![vec![entry]],
            clip::JoinKind::Round,
            clip::EndKind::OpenRound,
            self.cfg.helix_radius + self.cfg.tool_radius,
        );
        clip::clean_polygons(&mut self.cleared);
        let crossing = clip::difference_paths(&self.cleared, &self.bound);
        if clip::paths_area(&crossing) > HELIX_FIT_SLACK {
            log::warn!(
                "helix does not fit the cutting area, limit the helix diameter to a smaller value"
            );
            return None;
        }

        let mut output = RegionOutput {
            helix_center: self.to_model(entry),
            start_point: self.to_model(entry),
            paths: Vec::new(),
            return_motion: MotionKind::LinkNotClear,
            counters: Counters::default(),
        };

        let mut engage = EngageWalker::new(self.tool_bound.clone());
        let mut tool_pos = Point::new(entry.x, entry.y - self.cfg.helix_radius as i64);
        let mut tool_dir = Vec2::new(1.0, 0.0);
        let mut first_engage = true;

        for _pass in 0..PASSES_LIMIT {
            progress.begin_pass();
            let outcome = self.run_pass(tool_pos, tool_dir, first_engage, rng, progress);

            let keep_threshold = MIN_CUT_AREA_FACTOR
                * outcome.step
                * self.cfg.step_over_factor
                * self.cfg.reference_cut_area;
            if outcome.cumulative_cut_area > keep_threshold {
                let cleaned = clean_path(&outcome.path, CLEAN_PATH_TOLERANCE);
                self.counters.output_points += cleaned.len() as u64;
                self.append_tool_path(&mut output, &cleaned, false);
                progress.maybe_report();
            }
            if progress.stopped() {
                break;
            }

            if first_engage {
                engage.move_to_closest_point(outcome.last_attempt, outcome.step + 1.0);
                first_engage = false;
            } else {
                let move_distance = ENGAGE_SCAN_DISTANCE_FACTOR
                    * self.cfg.step_over_factor
                    * self.cfg.tool_radius
                    + 1.0;
                if !engage.next_engage_point(
                    &self.estimator,
                    &self.cleared,
                    move_distance,
                    ENGAGE_AREA_THR_FACTOR * self.cfg.optimal_cut_area_pd * move_distance,
                    2.0 * self.cfg.optimal_cut_area_pd * move_distance,
                ) {
                    break;
                }
            }
            tool_pos = engage.current_point();
            tool_dir = engage.current_dir();
        }

        if !progress.stopped() {
            self.finishing_pass(&mut output, entry);
        }
        progress.maybe_report();

        log::debug!(
            "region done: points={} output_points={} iterations={} iter_per_point={:.2} exceeded={}",
            self.counters.points,
            self.counters.output_points,
            self.counters.probe_iterations,
            self.counters.probe_iterations as f64 / (self.counters.points as f64 + 0.001),
            self.counters.probes_exhausted,
        );
        output.counters = self.counters;
        Some(output)
    }

    /// Shrink the bound paths inward step by step; the centroid of the last
    /// surviving loop is the deepest place to start the helix.
    fn find_entry_point(&self) -> Option<Point> {
        let mut last_valid = Paths::new();
        let mut delta = -1.0;
        loop {
            let off = clip::offset_paths(
                &self.bound,
                clip::JoinKind::Square,
                clip::EndKind::ClosedPolygon,
                delta,
            );
            if !has_any_path(&off) {
                break;
            }
            last_valid = off;
            delta -= RESOLUTION_FACTOR;
        }
        for path in &last_valid {
            if let Some(centroid) = polygon_centroid(path) {
                return Some(centroid);
            }
        }
        log::warn!("entry point not found");
        None
    }

    /// Offset the bound inward by the tool radius and emit each loop as a
    /// closed cutting pass removing the finish allowance.
    fn finishing_pass(&mut self, output: &mut RegionOutput, entry: Point) {
        let finishing = clip::offset_paths(
            &self.bound,
            clip::JoinKind::Round,
            clip::EndKind::ClosedPolygon,
            -self.cfg.tool_radius,
        );
        let mut last_point = entry;
        for path in &finishing {
            let cleaned = clean_path(path, FINISHING_CLEAN_PATH_TOLERANCE);
            self.append_tool_path(output, &cleaned, true);
            if let Some(p) = path.last() {
                last_point = *p;
            }
        }

        // the finishing sweep removes material too; account for it before
        // classifying the return move
        if !finishing.is_empty() {
            let mut sweeps: Paths = Paths::new();
            for path in &finishing {
                let mut looped = path.clone();
                if let Some(first) = path.first() {
                    looped.push(*first);
                }
                sweeps.push(looped);
            }
            let cover = clip::offset_paths(
                &sweeps,
                clip::JoinKind::Round,
                clip::EndKind::OpenRound,
                self.cfg.tool_radius + 1.0,
            );
            self.cleared = clip::union_paths(&self.cleared, &cover);
            clip::clean_polygons(&mut self.cleared);
        }

        output.return_motion = if self.check_collision(last_point, entry) {
            MotionKind::LinkClear
        } else {
            MotionKind::LinkNotClear
        };
    }

    /// True when the straight move between the points stays over cleared
    /// material for the full (slightly reduced) tool width.
    pub(crate) fn check_collision(&self, last_point: Point, next_point: Point) -> bool {
        let link: Paths = vec![vec![last_point, next_point]];
        let tool_shape = clip::offset_paths(
            &link,
            clip::JoinKind::Round,
            clip::EndKind::OpenRound,
            self.cfg.tool_radius - 2.0,
        );
        let crossing = clip::difference_paths(&tool_shape, &self.cleared);
        clip::paths_area(&crossing) <= NTOL + CROSSING_AREA_SLACK
    }

    /// Append a cutting polyline, inserting a classified link move when the
    /// output does not already end where the new path begins.
    pub(crate) fn append_tool_path(
        &mut self,
        output: &mut RegionOutput,
        pass_tool_path: &Path,
        close: bool,
    ) {
        if pass_tool_path.is_empty() {
            return;
        }
        let next_point = pass_tool_path[0];
        let has_cut_before = output.paths.iter().any(|p| p.motion == MotionKind::Cutting);
        let link_from = output.paths.last().and_then(|p| p.points.last().copied());
        if let Some(last_model) = link_from {
            let last_point = Point::new(
                (last_model.0 * self.cfg.scale_factor).round() as i64,
                (last_model.1 * self.cfg.scale_factor).round() as i64,
            );
            let clear = self.check_collision(last_point, next_point);
            output.paths.push(TaggedPath {
                motion: if clear {
                    MotionKind::LinkClear
                } else {
                    MotionKind::LinkNotClear
                },
                points: vec![last_model, self.to_model(next_point)],
            });
        }
        let mut points: Vec<ModelPoint> =
            pass_tool_path.iter().map(|p| self.to_model(*p)).collect();
        if close {
            points.push(self.to_model(pass_tool_path[0]));
        }
        if !has_cut_before {
            output.start_point = points[0];
        }
        output.paths.push(TaggedPath {
            motion: MotionKind::Cutting,
            points,
        });
    }

    /// Union the disc sweep of the pending tool-center polyline into the
    /// cleared region.
    pub(crate) fn expand_cleared(&mut self, to_clear_path: &mut Path) {
        let cover = clip::offset_paths(
            &vec![to_clear_path.clone()],
            clip::JoinKind::Round,
            clip::EndKind::OpenRound,
            self.cfg.tool_radius + 1.0,
        );
        self.cleared = clip::union_paths(&self.cleared, &cover);
        clip::clean_polygons(&mut self.cleared);
        to_clear_path.clear();
    }

    pub(crate) fn to_model(&self, p: Point) -> ModelPoint {
        (
            p.x as f64 / self.cfg.scale_factor,
            p.y as f64 / self.cfg.scale_factor,
        )
    }
}
