//! Floating point stepping for depth passes and scanlines.

/// Iterates `start, start + step, start + 2*step, ...` while the value is
/// strictly short of `stop`, then optionally yields `stop` itself.
///
/// The direction is taken from `start` and `stop`. A `step` of zero, a
/// non-finite step, or one pointing away from `stop` yields no intermediate
/// values, so the iterator always terminates.
#[derive(Debug, Clone)]
pub struct FloatRange {
    start: f64,
    stop: f64,
    step: f64,
    include_stop: bool,
    index: u64,
    stepping: bool,
    finished: bool,
}

impl FloatRange {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        let ascending = start < stop;
        let stepping = step.is_finite()
            && start.is_finite()
            && stop.is_finite()
            && if ascending { step > 0.0 } else { step < 0.0 };
        Self {
            start,
            stop,
            step,
            include_stop: false,
            index: 0,
            stepping,
            finished: false,
        }
    }

    /// Also yield `stop` once the stepping is done.
    pub fn inclusive(mut self) -> Self {
        self.include_stop = true;
        self
    }

    fn short_of_stop(&self, value: f64) -> bool {
        if self.start < self.stop {
            value < self.stop
        } else {
            value > self.stop
        }
    }
}

impl Iterator for FloatRange {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.finished {
            return None;
        }
        if self.stepping {
            let value = self.start + self.index as f64 * self.step;
            if self.short_of_stop(value) {
                self.index += 1;
                return Some(value);
            }
            self.stepping = false;
        }
        self.finished = true;
        if self.include_stop {
            Some(self.stop)
        } else {
            None
        }
    }
}
