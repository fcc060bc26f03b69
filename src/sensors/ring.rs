//! Rolling average over the most recent samples.
//!
//! A fixed ring of `N` slots, zero-initialised, overwritten oldest first.
//! The mean always divides by `N`, so until the ring has been filled the
//! untouched zero slots pull the average down.

/// Ring of the last `N` samples.
#[derive(Debug, Clone)]
pub struct RollingAverage<const N: usize> {
    ring: [i16; N],
    head: usize,
    total: u32,
}

impl<const N: usize> RollingAverage<N> {
    pub const fn new() -> Self {
        Self {
            ring: [0; N],
            head: 0,
            total: 0,
        }
    }

    /// Overwrite the oldest slot.
    pub fn push(&mut self, sample: i16) {
        self.ring[self.head] = sample;
        self.head = (self.head + 1) % N;
        self.total = self.total.saturating_add(1);
    }

    /// Integer mean over all `N` slots, truncated toward zero.
    pub fn mean(&self) -> i16 {
        let sum: i32 = self.ring.iter().map(|&s| i32::from(s)).sum();
        (sum / N as i32) as i16
    }

    /// Samples pushed since creation.
    pub fn total_samples(&self) -> u32 {
        self.total
    }

    #[cfg(test)]
    fn is_filled(&self) -> bool {
        self.total as usize >= N
    }

    pub fn samples(&self) -> &[i16; N] {
        &self.ring
    }
}

impl<const N: usize> Default for RollingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}
