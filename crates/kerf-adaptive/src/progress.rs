//! Rate-limited progress reporting.
//!
//! The engine accumulates the partial trajectory and hands it to the caller
//! at most once per [`PROGRESS_TICKS`](crate::PROGRESS_TICKS). After a
//! delivery the buffer is trimmed down to the last point so the next report
//! only carries fresh motion. A callback returning `true` raises the stop
//! flag; the engine then winds the current region down without a finishing
//! pass.

use std::time::Instant;

use crate::{MotionKind, ModelPoint, TaggedPath, PROGRESS_TICKS};

pub(crate) struct ProgressSink<'a> {
    callback: &'a mut dyn FnMut(&[TaggedPath]) -> bool,
    paths: Vec<TaggedPath>,
    last_report: Instant,
    stop: bool,
}

impl<'a> ProgressSink<'a> {
    pub fn new(callback: &'a mut dyn FnMut(&[TaggedPath]) -> bool) -> Self {
        Self {
            callback,
            paths: Vec::new(),
            last_report: Instant::now(),
            stop: false,
        }
    }

    /// Open a fresh trajectory segment unless the current one is empty.
    pub fn begin_pass(&mut self) {
        match self.paths.last() {
            Some(last) if last.points.is_empty() => {}
            _ => self.paths.push(TaggedPath {
                motion: MotionKind::Cutting,
                points: Vec::new(),
            }),
        }
    }

    /// Record a trajectory point in model units.
    pub fn push_point(&mut self, pt: ModelPoint) {
        if self.paths.is_empty() {
            self.paths.push(TaggedPath {
                motion: MotionKind::Cutting,
                points: Vec::new(),
            });
        }
        if let Some(last) = self.paths.last_mut() {
            last.points.push(pt);
        }
    }

    /// Deliver the partial trajectory if the report interval has elapsed.
    /// No further deliveries happen once the callback asked to stop.
    pub fn maybe_report(&mut self) {
        if self.stop || self.last_report.elapsed() < PROGRESS_TICKS {
            return;
        }
        self.last_report = Instant::now();
        let last_point = match self.paths.last().and_then(|p| p.points.last()) {
            Some(pt) => *pt,
            None => return,
        };
        if (self.callback)(&self.paths) {
            self.stop = true;
        }
        // trim, keeping only the last point as the seed of the next report
        self.paths.truncate(1);
        if let Some(first) = self.paths.first_mut() {
            first.points.clear();
            first.points.push(last_point);
        }
    }

    /// True once a callback asked the engine to stop.
    pub fn stopped(&self) -> bool {
        self.stop
    }
}
