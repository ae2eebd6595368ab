//! Gray-level histogram over a neighborhood window.

/// Multiset of gray samples with O(1) insert/remove.
///
/// Order statistics walk the 256-bin histogram, so they cost at most 256
/// steps regardless of window size.
#[derive(Clone, Debug)]
pub struct GrayWindow {
    bins: [u32; 256],
    count: u32,
    sum: u64,
}

impl Default for GrayWindow {
    fn default() -> Self {
        Self {
            bins: [0; 256],
            count: 0,
            sum: 0,
        }
    }
}

impl GrayWindow {
    /// Empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every sample.
    pub fn clear(&mut self) {
        self.bins = [0; 256];
        self.count = 0;
        self.sum = 0;
    }

    /// Add one sample.
    #[inline]
    pub fn insert(&mut self, v: u8) {
        self.bins[v as usize] += 1;
        self.count += 1;
        self.sum += v as u64;
    }

    /// Remove one sample previously inserted.
    #[inline]
    pub fn remove(&mut self, v: u8) {
        debug_assert!(self.bins[v as usize] > 0, "removing absent sample {v}");
        self.bins[v as usize] -= 1;
        self.count -= 1;
        self.sum -= v as u64;
    }

    /// Number of samples.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Sum of all samples.
    #[inline]
    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Smallest sample, or 0 when empty.
    pub fn min(&self) -> u8 {
        self.bins.iter().position(|&n| n > 0).unwrap_or(0) as u8
    }

    /// Largest sample, or 0 when empty.
    pub fn max(&self) -> u8 {
        self.bins.iter().rposition(|&n| n > 0).unwrap_or(0) as u8
    }

    /// Integer mean, or 0 when empty.
    pub fn mean(&self) -> u8 {
        if self.count == 0 {
            return 0;
        }
        (self.sum / self.count as u64) as u8
    }

    /// Element at index `count / 2` of the sorted samples, or 0 when empty.
    pub fn median(&self) -> u8 {
        let target = self.count / 2;
        let mut seen = 0;
        for (v, &n) in self.bins.iter().enumerate() {
            seen += n;
            if seen > target {
                return v as u8;
            }
        }
        0
    }
}
