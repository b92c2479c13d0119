#![warn(missing_docs)]

//! Adaptive pocket-clearing toolpath generation for 2.5D machining.
//!
//! Given closed 2D loops describing a region to machine, a cutter diameter
//! and a target radial engagement, the engine produces cutter-center
//! trajectories that remove the material progressively while holding the
//! instantaneous chip load close to the target: a helical plunge center for
//! entry, a sequence of cutting passes, link moves classified as clear or
//! not clear, and a finishing contour pass.
//!
//! At each step the cutter advances by a small distance in a direction
//! chosen so that the area swept into previously uncut material matches a
//! target. The direction search runs on an analytic cut-area estimator
//! (circle/segment geometry along the cleared-region boundary) instead of
//! per-step polygon booleans, which is what makes the inner loop fast.
//!
//! # Example
//!
//! ```no_run
//! use kerf_adaptive::{Adaptive2d, AdaptiveParams};
//!
//! // a 20x20 mm pocket, 5 mm end mill, 20% step-over
//! let pocket = vec![vec![
//!     (-10.0, -10.0),
//!     (10.0, -10.0),
//!     (10.0, 10.0),
//!     (-10.0, 10.0),
//! ]];
//!
//! let params = AdaptiveParams::new()
//!     .with_tool_diameter(5.0)
//!     .with_step_over_factor(0.2);
//! let engine = Adaptive2d::new(params).unwrap();
//! let regions = engine.execute(&pocket, |_partial| false);
//! for region in &regions {
//!     println!("helix at {:?}, {} paths", region.helix_center, region.paths.len());
//! }
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use kerf_clip as clip;
use kerf_geom::{translate_path, Path, Paths, Point};

pub mod cut_area;
pub mod engage;
mod error;
mod pass;
mod progress;
mod region;

pub use error::{AdaptiveError, Result};

// ---------------------------------------------------------------------------
// Tuning constants
// ---------------------------------------------------------------------------

/// Scaled units per tolerance unit; the integer grid pitch is
/// `tolerance / RESOLUTION_FACTOR` model units.
pub(crate) const RESOLUTION_FACTOR: f64 = 8.0;
/// Probe budget of the per-step angle search.
pub(crate) const MAX_ITERATIONS: usize = 16;
/// How precisely the cut area must match the target (0.05 = 5%).
pub(crate) const AREA_ERROR_FACTOR: f64 = 0.05;
/// Accepted angles remembered for prediction.
pub(crate) const ANGLE_HISTORY_POINTS: usize = 3;
/// Direction vectors averaged for smoothing.
pub(crate) const DIRECTION_SMOOTHING_BUFLEN: usize = 3;
/// Minimal engage area as a factor of the optimal cut area.
pub(crate) const ENGAGE_AREA_THR_FACTOR: f64 = 0.2;
/// Engage scan step as a factor of the step-over distance.
pub(crate) const ENGAGE_SCAN_DISTANCE_FACTOR: f64 = 0.2;
/// Vertex-merge tolerance for cutting passes, scaled units.
pub(crate) const CLEAN_PATH_TOLERANCE: f64 = 1.0;
/// Vertex-merge tolerance for finishing passes, scaled units.
pub(crate) const FINISHING_CLEAN_PATH_TOLERANCE: f64 = 0.5;
/// Passes with cumulative cut area below this factor are dropped.
pub(crate) const MIN_CUT_AREA_FACTOR: f64 = 0.02;
/// Pass-count ceiling.
pub(crate) const PASSES_LIMIT: usize = usize::MAX;
/// Point-count ceiling within one pass.
pub(crate) const POINTS_PER_PASS_LIMIT: usize = usize::MAX;
/// Minimum interval between progress reports.
pub(crate) const PROGRESS_TICKS: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A point in model units.
pub type ModelPoint = (f64, f64);

/// What kind of material removal the operation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    /// Clear the interior of the input loops.
    Clearing,
    /// Clear a band inside the input contour (inside profiling).
    ProfilingInside,
    /// Clear a band outside the input contour (outside profiling).
    ProfilingOutside,
}

/// Classification of an output polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Cutting move through material.
    Cutting,
    /// Link move entirely over already-cleared material.
    LinkClear,
    /// Link move that crosses uncut stock.
    LinkNotClear,
}

impl MotionKind {
    /// Stable wire value: 0 = cutting, 1 = clear link, 2 = not-clear link.
    pub fn wire_value(self) -> i32 {
        match self {
            MotionKind::Cutting => 0,
            MotionKind::LinkClear => 1,
            MotionKind::LinkNotClear => 2,
        }
    }
}

/// A polyline of the output trajectory with its motion classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedPath {
    /// Motion classification.
    pub motion: MotionKind,
    /// Polyline vertices in model units.
    pub points: Vec<ModelPoint>,
}

/// Per-region diagnostic counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Counters {
    /// Steps attempted by the pass engine.
    pub points: u64,
    /// Angle-search probes across all steps.
    pub probe_iterations: u64,
    /// Steps where the probe budget ran out before convergence.
    pub probes_exhausted: u64,
    /// Vertices emitted after path cleaning.
    pub output_points: u64,
    /// Cutting distance in model units.
    pub cut_length: f64,
}

/// The trajectory generated for one connected machining region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionOutput {
    /// Center of the helical entry plunge, model units.
    pub helix_center: ModelPoint,
    /// First cutter position of the first cutting pass.
    pub start_point: ModelPoint,
    /// Ordered trajectory polylines.
    pub paths: Vec<TaggedPath>,
    /// Classification of the final return move to the helix center.
    pub return_motion: MotionKind,
    /// Diagnostics for this region.
    pub counters: Counters,
}

/// Configuration of the adaptive engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveParams {
    /// Cutter diameter in model units.
    pub tool_diameter: f64,
    /// Helical ramp diameter; 0 or above the tool diameter falls back to
    /// the tool radius.
    pub helix_ramp_diameter: f64,
    /// Target radial engagement as a fraction of the tool diameter, (0, 1].
    pub step_over_factor: f64,
    /// Geometric tolerance in model units.
    pub tolerance: f64,
    /// Skip regions nested this deep or deeper (0 = unlimited).
    pub poly_tree_nesting_limit: usize,
    /// Clearing or profiling preprocessing.
    pub operation: OperationKind,
    /// Whether holes of a region join the machining boundary.
    pub process_holes: bool,
    /// Seed for the probe-escape randomness; `None` draws from entropy.
    pub rng_seed: Option<u64>,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        Self {
            tool_diameter: 5.0,
            helix_ramp_diameter: 0.0,
            step_over_factor: 0.2,
            tolerance: 0.1,
            poly_tree_nesting_limit: 0,
            operation: OperationKind::Clearing,
            process_holes: true,
            rng_seed: None,
        }
    }
}

impl AdaptiveParams {
    /// Create default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tool diameter.
    pub fn with_tool_diameter(mut self, diameter: f64) -> Self {
        self.tool_diameter = diameter;
        self
    }

    /// Set the helical ramp diameter.
    pub fn with_helix_ramp_diameter(mut self, diameter: f64) -> Self {
        self.helix_ramp_diameter = diameter;
        self
    }

    /// Set the step-over factor.
    pub fn with_step_over_factor(mut self, factor: f64) -> Self {
        self.step_over_factor = factor;
        self
    }

    /// Set the tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the operation kind.
    pub fn with_operation(mut self, operation: OperationKind) -> Self {
        self.operation = operation;
        self
    }

    /// Set the rng seed for reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.tool_diameter <= 0.0 {
            return Err(AdaptiveError::InvalidToolDiameter(self.tool_diameter));
        }
        if self.step_over_factor <= 0.0 || self.step_over_factor > 1.0 {
            return Err(AdaptiveError::InvalidStepOver(self.step_over_factor));
        }
        if self.tolerance <= 0.0 {
            return Err(AdaptiveError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The adaptive clearing engine.
///
/// Construction validates the configuration; [`execute`](Self::execute) then
/// turns input loops into per-region trajectories. Regions are processed
/// sequentially and independently, so no state is shared between them.
#[derive(Debug, Clone)]
pub struct Adaptive2d {
    params: AdaptiveParams,
}

impl Adaptive2d {
    /// Create an engine from validated parameters.
    pub fn new(params: AdaptiveParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// The engine configuration.
    pub fn params(&self) -> &AdaptiveParams {
        &self.params
    }

    /// Generate trajectories for the given closed loops (model units,
    /// counterclockwise outers, clockwise holes).
    ///
    /// `progress` receives the partial trajectory at most every 50 ms and
    /// may return `true` to stop: the current region is wound down without
    /// a finishing pass and no further regions are processed.
    pub fn execute<F>(&self, paths: &[Vec<ModelPoint>], mut progress: F) -> Vec<RegionOutput>
    where
        F: FnMut(&[TaggedPath]) -> bool,
    {
        let p = &self.params;
        let scale_factor = RESOLUTION_FACTOR / p.tolerance;
        let tool_radius = (p.tool_diameter * scale_factor / 2.0).round();
        let helix_radius = if p.helix_ramp_diameter <= 1e-9 || p.helix_ramp_diameter > p.tool_diameter
        {
            tool_radius
        } else {
            (p.helix_ramp_diameter * scale_factor / 2.0).round()
        };
        let finish_offset = (p.tolerance * scale_factor / 2.0).round();

        // reference cut area: the crescent left when the tool disc advances
        // by half its radius through a full slot
        let tool_geometry = clip::offset_paths(
            &vec![vec![Point::zero()]],
            clip::JoinKind::Round,
            clip::EndKind::OpenRound,
            tool_radius,
        );
        let Some(tool_disc) = tool_geometry.first() else {
            log::warn!("tool footprint construction failed");
            return Vec::new();
        };
        let slot_cut = translate_path(tool_disc, Point::new((tool_radius / 2.0) as i64, 0));
        let crossing = clip::difference_paths(&vec![tool_disc.clone()], &vec![slot_cut]);
        let reference_cut_area = clip::paths_area(&crossing);
        let optimal_cut_area_pd = 2.0 * p.step_over_factor * reference_cut_area / tool_radius;
        let cfg = region::ScaledConfig {
            scale_factor,
            tool_radius,
            helix_radius,
            finish_offset,
            step_over_factor: p.step_over_factor,
            reference_cut_area,
            optimal_cut_area_pd,
            // influences the taper of the target cut area near the boundary
            min_cut_area_pd: optimal_cut_area_pd / 3.0 + 1.0,
        };

        // scale the input onto the integer grid and resolve self-touching
        // or inconsistently wound loops
        let scaled: Paths = paths
            .iter()
            .map(|path| {
                path.iter()
                    .map(|&(x, y)| {
                        Point::new(
                            (x * scale_factor).round() as i64,
                            (y * scale_factor).round() as i64,
                        )
                    })
                    .collect::<Path>()
            })
            .collect();
        let mut input = clip::simplify_polygons(&scaled);

        input = match p.operation {
            OperationKind::Clearing => input,
            OperationKind::ProfilingInside => {
                let off = clip::offset_paths(
                    &input,
                    clip::JoinKind::Square,
                    clip::EndKind::ClosedPolygon,
                    -2.0 * (helix_radius + tool_radius),
                );
                clip::difference_paths(&input, &off)
            }
            OperationKind::ProfilingOutside => {
                let off = clip::offset_paths(
                    &input,
                    clip::JoinKind::Square,
                    clip::EndKind::ClosedPolygon,
                    2.0 * (helix_radius + tool_radius),
                );
                clip::difference_paths(&off, &input)
            }
        };

        let tree = clip::offset_poly_tree(
            &input,
            clip::JoinKind::Round,
            -tool_radius - finish_offset,
        );

        let mut rng = match p.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut sink = progress::ProgressSink::new(&mut progress);
        let mut results = Vec::new();
        for node in &tree.nodes {
            if p.poly_tree_nesting_limit > 0 && node.nesting >= p.poly_tree_nesting_limit {
                continue;
            }
            let mut tool_bound: Paths = vec![node.contour.clone()];
            if p.process_holes {
                tool_bound.extend(node.holes.iter().cloned());
            }
            let bound = clip::offset_paths(
                &tool_bound,
                clip::JoinKind::Round,
                clip::EndKind::ClosedPolygon,
                tool_radius + finish_offset,
            );
            let mut driver = region::RegionDriver::new(&cfg, bound, tool_bound);
            if let Some(output) = driver.run(&mut rng, &mut sink) {
                results.push(output);
            }
            if sink.stopped() {
                break;
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_valid() {
        assert!(AdaptiveParams::default().validate().is_ok());
    }

    #[test]
    fn test_params_rejected() {
        assert!(matches!(
            Adaptive2d::new(AdaptiveParams::new().with_tool_diameter(0.0)),
            Err(AdaptiveError::InvalidToolDiameter(_))
        ));
        assert!(matches!(
            Adaptive2d::new(AdaptiveParams::new().with_step_over_factor(1.5)),
            Err(AdaptiveError::InvalidStepOver(_))
        ));
        assert!(matches!(
            Adaptive2d::new(AdaptiveParams::new().with_tolerance(-0.1)),
            Err(AdaptiveError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn test_params_serde_round_trip() {
        let params = AdaptiveParams::new()
            .with_tool_diameter(6.0)
            .with_step_over_factor(0.35)
            .with_rng_seed(7);
        let json = serde_json::to_string(&params).unwrap();
        let back: AdaptiveParams = serde_json::from_str(&json).unwrap();
        assert!((back.tool_diameter - 6.0).abs() < 1e-12);
        assert!((back.step_over_factor - 0.35).abs() < 1e-12);
        assert_eq!(back.rng_seed, Some(7));
    }

    #[test]
    fn test_motion_wire_values() {
        assert_eq!(MotionKind::Cutting.wire_value(), 0);
        assert_eq!(MotionKind::LinkClear.wire_value(), 1);
        assert_eq!(MotionKind::LinkNotClear.wire_value(), 2);
    }
}
