//! Piecewise-linear interpolation between cut area and deflection angle.
//!
//! During a single step of the adaptive loop the engine probes several
//! candidate deflection angles and records the cut area each would produce.
//! The table keeps the samples ordered by area so the inverse lookup (target
//! area to angle) can linearly blend the bracketing probes. Chip load is not
//! globally monotonic in angle, but storing every probe lets the lookup
//! exploit the monotone portion around the optimum.

use rand::Rng;

/// Ordered (area, angle) samples with inverse lookup, valid for one step.
#[derive(Debug, Default)]
pub struct Interpolation {
    areas: Vec<f64>,
    angles: Vec<f64>,
}

impl Interpolation {
    /// Widest-engagement deflection angle.
    pub const MIN_ANGLE: f64 = -std::f64::consts::FRAC_PI_4;
    /// Narrowest-engagement deflection angle.
    pub const MAX_ANGLE: f64 = std::f64::consts::FRAC_PI_4;

    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all samples (called between steps).
    pub fn clear(&mut self) {
        self.areas.clear();
        self.angles.clear();
    }

    /// Insert a sample, keeping areas in non-decreasing order. A tie is
    /// placed before the existing sample.
    pub fn add_point(&mut self, area: f64, angle: f64) {
        match self.areas.iter().position(|&a| area <= a) {
            Some(i) => {
                self.areas.insert(i, area);
                self.angles.insert(i, angle);
            }
            None => {
                self.areas.push(area);
                self.angles.push(angle);
            }
        }
    }

    /// Inverse lookup: the angle expected to produce `target_area`.
    ///
    /// Out-of-range targets saturate: above the largest sample (or with
    /// fewer than two samples) the widest engagement angle is returned,
    /// below the smallest sample the narrowest.
    pub fn interpolate_angle(&self, target_area: f64) -> f64 {
        let size = self.areas.len();
        if size < 2 || target_area > self.areas[size - 1] {
            return Self::MIN_ANGLE;
        }
        if target_area < self.areas[0] {
            return Self::MAX_ANGLE;
        }
        for i in 1..size {
            if self.areas[i - 1] <= target_area && self.areas[i] > target_area {
                let af = (target_area - self.areas[i - 1]) / (self.areas[i] - self.areas[i - 1]);
                return self.angles[i - 1] + af * (self.angles[i] - self.angles[i - 1]);
            }
        }
        Self::MIN_ANGLE
    }

    /// Clamp an angle into the search range.
    pub fn clamp_angle(&self, angle: f64) -> f64 {
        angle.clamp(Self::MIN_ANGLE, Self::MAX_ANGLE)
    }

    /// Uniform random angle in the search range, used to escape flat spots
    /// while probing.
    pub fn random_angle<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(Self::MIN_ANGLE..Self::MAX_ANGLE)
    }

    /// Number of stored samples.
    pub fn point_count(&self) -> usize {
        self.areas.len()
    }
}
