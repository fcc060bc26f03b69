//! Threshold crossing detection.
//!
//! An [`EdgeDetector`] remembers which side of its threshold the signal is
//! on and reports only the sample that changes sides.  A value exactly on
//! the threshold never causes a crossing in either direction.

/// Direction of a threshold crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// The signal rose above the threshold.
    Rising,
    /// The signal fell below the threshold.
    Falling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeDetector {
    threshold: i32,
    above: bool,
}

impl EdgeDetector {
    /// Start below the threshold.
    pub const fn new(threshold: i32) -> Self {
        Self {
            threshold,
            above: false,
        }
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn is_above(&self) -> bool {
        self.above
    }

    /// Feed one sample.  Returns the crossing it causes, if any.
    pub fn update(&mut self, value: i32) -> Option<Crossing> {
        if !self.above && value > self.threshold {
            self.above = true;
            Some(Crossing::Rising)
        } else if self.above && value < self.threshold {
            self.above = false;
            Some(Crossing::Falling)
        } else {
            None
        }
    }
}
