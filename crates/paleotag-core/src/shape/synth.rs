//! Ramp-and-flatten synthesis shared by fitting and reconstruction.

/// Builds an idealized value array segment by segment.
///
/// Every sample starts at the baseline. Each [`Synthesizer::ramp_to`] fills
/// `[pointer, end)` with a straight line from the running value towards the
/// target; [`Synthesizer::finish`] holds the final value over the tail.
pub(crate) struct Synthesizer {
    values: Vec<f64>,
    pointer: usize,
    running: f64,
}

impl Synthesizer {
    pub(crate) fn new(len: usize, start: usize, baseline: f64) -> Self {
        Self {
            values: vec![baseline; len],
            pointer: start,
            running: baseline,
        }
    }

    pub(crate) fn pointer(&self) -> usize {
        self.pointer
    }

    /// Ramp over `end - pointer` steps. `end` must be past the pointer;
    /// samples beyond the array are dropped.
    pub(crate) fn ramp_to(&mut self, end: usize, target: f64) {
        debug_assert!(end > self.pointer);
        let duration = (end - self.pointer) as f64;
        let slope = (target - self.running) / duration;
        let stop = end.min(self.values.len());
        for (k, i) in (self.pointer..stop).enumerate() {
            self.values[i] = self.running + k as f64 * slope;
        }
        self.running = target;
        self.pointer = end;
    }

    pub(crate) fn finish(mut self) -> Vec<f64> {
        if self.pointer < self.values.len() {
            let tail = self.running;
            self.values[self.pointer..].fill(tail);
        }
        self.values
    }
}
