//! Timeline tuning.

/// Invalid timeline configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The send rate must be at least 1 Hz.
    #[error("send rate must be positive")]
    ZeroSendRate,

    /// The buffer must hold at least two snapshots to interpolate.
    #[error("buffer limit {limit} is too small, need at least 2")]
    BufferTooSmall { limit: usize },

    /// A value that must be finite and positive was not.
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    /// A value that must be finite and non-negative was not.
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    /// The slowdown threshold lies above the catchup threshold.
    #[error("catchup thresholds inverted: negative {negative} > positive {positive}")]
    InvertedThresholds { negative: f64, positive: f64 },
}

/// Interpolation clock settings.
///
/// Thresholds are in multiples of the send interval. Durations are in
/// seconds and are converted to EMA sample counts using the send rate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimelineConfig {
    /// Snapshots per second sent by the remote.
    pub send_rate: u32,
    /// Buffer time in send intervals. Overwritten at runtime when
    /// `dynamic_adjustment` is on.
    pub buffer_time_multiplier: f64,
    /// Maximum buffered snapshots.
    pub buffer_limit: usize,
    /// Drift below this many send intervals slows the clock down.
    pub catchup_negative_threshold: f64,
    /// Drift above this many send intervals speeds the clock up.
    pub catchup_positive_threshold: f64,
    /// Rate bonus while catching up, e.g. 0.02 for 2% faster.
    pub catchup_speed: f64,
    /// Rate penalty while slowing down, e.g. 0.04 for 4% slower.
    pub slowdown_speed: f64,
    /// Window of the drift average, in seconds.
    pub drift_ema_duration: f64,
    /// Derive the buffer multiplier from measured delivery jitter.
    pub dynamic_adjustment: bool,
    /// Extra send intervals of buffer on top of the jitter estimate.
    pub dynamic_adjustment_tolerance: f64,
    /// Window of the delivery interval average, in seconds.
    pub delivery_time_ema_duration: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            send_rate: 30,
            buffer_time_multiplier: 2.0,
            buffer_limit: 32,
            catchup_negative_threshold: -1.0,
            catchup_positive_threshold: 1.0,
            catchup_speed: 0.02,
            slowdown_speed: 0.04,
            drift_ema_duration: 1.0,
            dynamic_adjustment: true,
            dynamic_adjustment_tolerance: 1.0,
            delivery_time_ema_duration: 2.0,
        }
    }
}

impl TimelineConfig {
    /// Seconds between two remote sends.
    #[must_use]
    pub fn send_interval(&self) -> f64 {
        1.0 / f64::from(self.send_rate)
    }

    /// Buffer time for the configured multiplier.
    #[must_use]
    pub fn buffer_time(&self) -> f64 {
        self.send_interval() * self.buffer_time_multiplier
    }

    /// Sample count of the drift average.
    #[must_use]
    pub fn drift_ema_samples(&self) -> usize {
        self.samples(self.drift_ema_duration)
    }

    /// Sample count of the delivery interval average.
    #[must_use]
    pub fn delivery_ema_samples(&self) -> usize {
        self.samples(self.delivery_time_ema_duration)
    }

    fn samples(&self, duration: f64) -> usize {
        (f64::from(self.send_rate) * duration).round().max(1.0) as usize
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_rate == 0 {
            return Err(ConfigError::ZeroSendRate);
        }
        if self.buffer_limit < 2 {
            return Err(ConfigError::BufferTooSmall {
                limit: self.buffer_limit,
            });
        }
        for (field, value) in [
            ("buffer_time_multiplier", self.buffer_time_multiplier),
            ("drift_ema_duration", self.drift_ema_duration),
            ("delivery_time_ema_duration", self.delivery_time_ema_duration),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        for (field, value) in [
            ("catchup_speed", self.catchup_speed),
            ("slowdown_speed", self.slowdown_speed),
            ("dynamic_adjustment_tolerance", self.dynamic_adjustment_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        let (negative, positive) = (
            self.catchup_negative_threshold,
            self.catchup_positive_threshold,
        );
        if !negative.is_finite() || !positive.is_finite() || negative > positive {
            return Err(ConfigError::InvertedThresholds { negative, positive });
        }
        Ok(())
    }
}
