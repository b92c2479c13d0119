//! Engage-point selection along the machining boundary.
//!
//! After a pass runs dry the tool must re-enter material somewhere on the
//! machining boundary. The walker keeps a cursor (path, segment, position on
//! segment) into the boundary paths and sweeps it forward until the cut-area
//! estimator reports enough, but not too much, uncut material at the
//! candidate position. The cursor persists across passes within one region,
//! so successive engage points progress around the boundary instead of
//! rescanning it.

use kerf_geom::{distance, distance_sqrd, Paths, Point, Vec2, NTOL};

use crate::cut_area::CutAreaEstimator;

/// Stateful cursor over the machining-boundary paths.
#[derive(Debug)]
pub struct EngageWalker {
    bound: Paths,
    path_index: usize,
    segment_index: usize,
    segment_pos: f64,
    total_distance: f64,
    current_path_length: f64,
    passes: u32,
}

impl EngageWalker {
    /// Create a walker over the given boundary paths.
    pub fn new(bound: Paths) -> Self {
        let mut walker = Self {
            bound,
            path_index: 0,
            segment_index: 0,
            segment_pos: 0.0,
            total_distance: 0.0,
            current_path_length: 0.0,
            passes: 0,
        };
        walker.recalculate_path_length();
        walker
    }

    /// The cursor position on the boundary.
    pub fn current_point(&self) -> Point {
        let (p1, p2) = self.current_segment();
        let seg_length = distance(p1, p2);
        if seg_length < NTOL {
            return p1;
        }
        Point::new(
            (p1.x as f64 + self.segment_pos * ((p2.x - p1.x) as f64) / seg_length).round() as i64,
            (p1.y as f64 + self.segment_pos * ((p2.y - p1.y) as f64) / seg_length).round() as i64,
        )
    }

    /// Unit direction of the segment under the cursor.
    pub fn current_dir(&self) -> Vec2 {
        let (p1, p2) = self.current_segment();
        let seg_length = distance(p1, p2);
        if seg_length < NTOL {
            return Vec2::new(1.0, 0.0);
        }
        Vec2::new(
            ((p2.x - p1.x) as f64) / seg_length,
            ((p2.y - p1.y) as f64) / seg_length,
        )
    }

    /// Advance the cursor by `dist` along the current path, looping across
    /// its closure. Returns `false` once the walk has overrun the path
    /// length (with a small tolerance to close the loop), or when the
    /// cursor cannot advance at all.
    pub fn move_forward(&mut self, dist: f64) -> bool {
        if dist < NTOL || self.current_path_length < NTOL {
            return false; // cannot advance
        }
        let path_len = self.bound[self.path_index].len();
        self.total_distance += dist;
        let mut remaining = dist;
        let mut segment_length = self.current_segment_length();
        while self.segment_pos + remaining > segment_length {
            self.segment_index += 1;
            if self.segment_index >= path_len {
                self.segment_index = 0;
            }
            remaining -= segment_length - self.segment_pos;
            self.segment_pos = 0.0;
            segment_length = self.current_segment_length();
        }
        self.segment_pos += remaining;
        self.total_distance <= self.current_path_length + 10.0
    }

    /// Move the cursor to the start of the next boundary path. Returns
    /// `false` when it wraps back to the first path, signaling a completed
    /// sweep over all boundaries.
    pub fn next_path(&mut self) -> bool {
        self.path_index += 1;
        self.segment_index = 0;
        self.segment_pos = 0.0;
        self.total_distance = 0.0;
        if self.path_index >= self.bound.len() {
            self.path_index = 0;
            self.recalculate_path_length();
            return false;
        }
        self.recalculate_path_length();
        true
    }

    /// Position the cursor at the boundary point closest to `pt`, scanning
    /// all paths at `step` granularity.
    pub fn move_to_closest_point(&mut self, pt: Point, step: f64) {
        let mut min_dist_sq = f64::MAX;
        let mut min_path_index = self.path_index;
        let mut min_segment_index = self.segment_index;
        let mut min_segment_pos = self.segment_pos;
        self.total_distance = 0.0;
        loop {
            while self.move_forward(step) {
                let dist_sqrd = distance_sqrd(pt, self.current_point());
                if dist_sqrd < min_dist_sq {
                    min_dist_sq = dist_sqrd;
                    min_path_index = self.path_index;
                    min_segment_index = self.segment_index;
                    min_segment_pos = self.segment_pos;
                }
            }
            if !self.next_path() {
                break;
            }
        }
        self.path_index = min_path_index;
        self.segment_index = min_segment_index;
        self.segment_pos = min_segment_pos;
        self.recalculate_path_length();
        self.passes = 0;
    }

    /// Sweep forward until a position with an uncut area inside
    /// `(min_cut_area, max_cut_area)` is found. Returns `false` after the
    /// second full sweep over all boundaries finds nothing more to cut.
    pub fn next_engage_point(
        &mut self,
        estimator: &CutAreaEstimator,
        cleared: &Paths,
        step: f64,
        min_cut_area: f64,
        max_cut_area: f64,
    ) -> bool {
        if step < NTOL || self.bound.is_empty() {
            return false;
        }
        let initial_point = self.current_point();
        loop {
            if !self.move_forward(step) {
                if !self.next_path() {
                    self.passes += 1;
                    if self.passes > 1 {
                        return false; // nothing more to cut
                    }
                }
            }
            let candidate = self.current_point();
            let area = estimator.estimate(initial_point, candidate, cleared);
            if area > min_cut_area && area < max_cut_area {
                return true;
            }
        }
    }

    fn current_segment(&self) -> (Point, Point) {
        let path = match self.bound.get(self.path_index) {
            Some(path) if !path.is_empty() => path,
            _ => return (Point::zero(), Point::zero()),
        };
        let size = path.len();
        let p1 = path[if self.segment_index > 0 {
            self.segment_index - 1
        } else {
            size - 1
        }];
        let p2 = path[self.segment_index];
        (p1, p2)
    }

    fn current_segment_length(&self) -> f64 {
        let (p1, p2) = self.current_segment();
        distance(p1, p2)
    }

    fn recalculate_path_length(&mut self) {
        self.current_path_length = 0.0;
        let path = match self.bound.get(self.path_index) {
            Some(path) => path,
            None => return,
        };
        let size = path.len();
        for i in 0..size {
            let p1 = path[if i > 0 { i - 1 } else { size - 1 }];
            let p2 = path[i];
            self.current_path_length += distance(p1, p2);
        }
    }
}
