//! Exponential moving average with running variance.

/// Exponential moving average over roughly the last `n` samples, tracking
/// an exponentially weighted variance alongside the mean.
///
/// The first sample initializes the value directly; variance starts at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    initialized: bool,
    value: f64,
    variance: f64,
    standard_deviation: f64,
}

impl ExponentialMovingAverage {
    /// Creates an average with smoothing factor `2 / (n + 1)`.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            alpha: 2.0 / (n as f64 + 1.0),
            initialized: false,
            value: 0.0,
            variance: 0.0,
            standard_deviation: 0.0,
        }
    }

    /// Adds a sample.
    pub fn add(&mut self, sample: f64) {
        if !self.initialized {
            self.value = sample;
            self.initialized = true;
            return;
        }
        let delta = sample - self.value;
        self.value += self.alpha * delta;
        self.variance = (1.0 - self.alpha) * (self.variance + self.alpha * delta * delta);
        self.standard_deviation = self.variance.sqrt();
    }

    /// Returns the smoothing factor.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the current average, or 0 before the first sample.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub const fn variance(&self) -> f64 {
        self.variance
    }

    #[must_use]
    pub const fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    /// Returns `true` once a sample has been added.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Forgets all samples, keeping the smoothing factor.
    pub fn reset(&mut self) {
        self.initialized = false;
        self.value = 0.0;
        self.variance = 0.0;
        self.standard_deviation = 0.0;
    }
}
