//! Stateful interpolation clock over a snapshot buffer.

use log::{debug, trace};

use crate::config::{ConfigError, TimelineConfig};
use crate::ema::ExponentialMovingAverage;
use crate::interpolation::{self, AdjustParams};
use crate::snapshot::{Snapshot, SnapshotBuffer};

/// Two snapshots to blend and the factor between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a, T> {
    pub from: &'a T,
    pub to: &'a T,
    /// Blend factor in `[0, 1]`.
    pub t: f64,
    /// The clock was outside the buffered range, so `from` and `to` are the
    /// same snapshot.
    pub clamped: bool,
}

/// Buffers remote snapshots and runs a local clock a little behind them.
///
/// Every insert measures how far the clock trails the newest snapshot and
/// nudges its rate toward the target buffer time. With dynamic adjustment
/// on, the buffer time follows the measured delivery jitter.
///
/// The clock does not move while the buffer is empty.
#[derive(Debug, Clone)]
pub struct SnapshotTimeline<T> {
    config: TimelineConfig,
    buffer: SnapshotBuffer<T>,
    position: f64,
    rate: f64,
    buffer_time_multiplier: f64,
    drift_ema: ExponentialMovingAverage,
    delivery_ema: ExponentialMovingAverage,
}

impl<T: Snapshot> SnapshotTimeline<T> {
    /// Creates an empty timeline.
    pub fn new(config: TimelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            buffer: SnapshotBuffer::new(config.buffer_limit),
            position: 0.0,
            rate: 1.0,
            buffer_time_multiplier: config.buffer_time_multiplier,
            drift_ema: ExponentialMovingAverage::new(config.drift_ema_samples()),
            delivery_ema: ExponentialMovingAverage::new(config.delivery_ema_samples()),
            config,
        })
    }

    /// Buffers `snapshot` and re-tunes the clock.
    ///
    /// Returns `false` if the buffer was full or already held this remote
    /// time.
    pub fn insert(&mut self, snapshot: T) -> bool {
        let send_interval = self.config.send_interval();
        if self.config.dynamic_adjustment {
            self.buffer_time_multiplier = interpolation::dynamic_adjustment(
                send_interval,
                self.delivery_ema.standard_deviation(),
                self.config.dynamic_adjustment_tolerance,
            );
        }

        let params = AdjustParams {
            send_interval,
            buffer_time: self.buffer_time(),
            catchup_speed: self.config.catchup_speed,
            slowdown_speed: self.config.slowdown_speed,
            catchup_negative_threshold: self.config.catchup_negative_threshold,
            catchup_positive_threshold: self.config.catchup_positive_threshold,
        };
        let remote_time = snapshot.remote_time();
        let previous_rate = self.rate;
        let inserted = interpolation::insert_and_adjust(
            &mut self.buffer,
            snapshot,
            &mut self.position,
            &mut self.rate,
            &params,
            &mut self.drift_ema,
            &mut self.delivery_ema,
        );

        if !inserted {
            trace!(
                "snapshot at {remote_time} not buffered ({} of {})",
                self.buffer.len(),
                self.buffer.limit()
            );
        } else if (self.rate - previous_rate).abs() > f64::EPSILON {
            debug!(
                "timeline rate {previous_rate} -> {} (drift {:.4}s, buffer {:.4}s)",
                self.rate,
                self.drift(),
                params.buffer_time
            );
        }
        inserted
    }

    /// Moves the clock forward by `delta_time` seconds at the current rate.
    pub fn advance(&mut self, delta_time: f64) {
        if self.buffer.is_empty() {
            return;
        }
        interpolation::step_time(delta_time, &mut self.position, self.rate);
    }

    /// Returns the snapshots around the clock, evicting older ones.
    pub fn sample(&mut self) -> Option<Sample<'_, T>> {
        let bracket = interpolation::sample(&self.buffer, self.position)?;
        self.buffer.remove_before(bracket.from);
        let to = bracket.to - bracket.from;
        Some(Sample {
            from: self.buffer.get(0)?,
            to: self.buffer.get(to)?,
            t: bracket.t,
            clamped: bracket.is_clamped(),
        })
    }

    /// Advances the clock and samples at the new position.
    pub fn step(&mut self, delta_time: f64) -> Option<Sample<'_, T>> {
        self.advance(delta_time);
        self.sample()
    }

    /// Forgets all snapshots and measurements.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.position = 0.0;
        self.rate = 1.0;
        self.buffer_time_multiplier = self.config.buffer_time_multiplier;
        self.drift_ema.reset();
        self.delivery_ema.reset();
    }
}

impl<T> SnapshotTimeline<T> {
    /// Current clock position on the remote timeline.
    #[must_use]
    pub const fn position(&self) -> f64 {
        self.position
    }

    /// Current clock rate; 1 is real time.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    #[must_use]
    pub const fn buffer_time_multiplier(&self) -> f64 {
        self.buffer_time_multiplier
    }

    /// Target distance behind the newest snapshot, in seconds.
    #[must_use]
    pub fn buffer_time(&self) -> f64 {
        self.config.send_interval() * self.buffer_time_multiplier
    }

    /// Averaged distance behind the newest snapshot minus the buffer time.
    ///
    /// Positive when the clock lags too far, negative when it runs too
    /// close.
    #[must_use]
    pub fn drift(&self) -> f64 {
        self.drift_ema.value() - self.buffer_time()
    }

    /// Standard deviation of the gap between snapshot arrivals, in seconds.
    #[must_use]
    pub const fn delivery_jitter(&self) -> f64 {
        self.delivery_ema.standard_deviation()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub const fn config(&self) -> &TimelineConfig {
        &self.config
    }

    #[must_use]
    pub const fn buffer(&self) -> &SnapshotBuffer<T> {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TimeSnapshot;

    fn fixed_config() -> TimelineConfig {
        TimelineConfig {
            send_rate: 20,
            dynamic_adjustment: false,
            ..TimelineConfig::default()
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = TimelineConfig {
            send_rate: 0,
            ..TimelineConfig::default()
        };
        assert!(SnapshotTimeline::<TimeSnapshot>::new(config).is_err());
    }

    #[test]
    fn empty_timeline_is_frozen() {
        let mut timeline = SnapshotTimeline::<TimeSnapshot>::new(fixed_config()).unwrap();
        timeline.advance(1.0);
        assert_eq!(timeline.position(), 0.0);
        assert!(timeline.sample().is_none());
        assert!(timeline.step(1.0).is_none());
    }

    #[test]
    fn first_insert_places_clock_behind() {
        let mut timeline = SnapshotTimeline::new(fixed_config()).unwrap();
        assert!(timeline.insert(TimeSnapshot::new(1.0, 0.0)));
        // 2 intervals of 50ms
        assert!((timeline.buffer_time() - 0.1).abs() < 1e-12);
        assert!((timeline.position() - 0.9).abs() < 1e-12);
        assert_eq!(timeline.rate(), 1.0);
        assert!(timeline.drift().abs() < 1e-12);
    }

    #[test]
    fn sample_evicts_and_borrows() {
        let mut timeline = SnapshotTimeline::new(fixed_config()).unwrap();
        for i in 0..4 {
            let t = f64::from(i) * 0.05;
            timeline.insert(TimeSnapshot::new(t, t));
        }
        // the last insert clamps the clock to 0.15 - 2 * 0.1
        assert!((timeline.position() + 0.05).abs() < 1e-9);
        let sample = timeline.step(0.125).unwrap();
        assert_eq!(sample.from.remote_time, 0.05);
        assert_eq!(sample.to.remote_time, 0.1);
        assert!((sample.t - 0.5).abs() < 1e-9);
        assert!(!sample.clamped);
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn clamped_past_newest() {
        let mut timeline = SnapshotTimeline::new(fixed_config()).unwrap();
        timeline.insert(TimeSnapshot::new(0.0, 0.0));
        timeline.insert(TimeSnapshot::new(0.05, 0.05));
        timeline.advance(10.0);
        let sample = timeline.sample().unwrap();
        assert!(sample.clamped);
        assert_eq!(sample.from.remote_time, 0.05);
        assert_eq!(sample.t, 0.0);
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn dynamic_multiplier_tracks_jitter() {
        let config = TimelineConfig {
            send_rate: 20,
            ..TimelineConfig::default()
        };
        let mut timeline = SnapshotTimeline::new(config).unwrap();
        timeline.insert(TimeSnapshot::new(0.0, 0.0));
        // no jitter measured yet: (si + 0) / si + tolerance
        assert!((timeline.buffer_time_multiplier() - 2.0).abs() < 1e-12);

        let arrivals = [0.0, 0.02, 0.15, 0.16, 0.30, 0.31];
        for (i, local) in arrivals.into_iter().enumerate().skip(1) {
            timeline.insert(TimeSnapshot::new(i as f64 * 0.05, local));
        }
        assert!(timeline.delivery_jitter() > 0.0);
        assert!(timeline.buffer_time_multiplier() > 2.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut timeline = SnapshotTimeline::new(TimelineConfig::default()).unwrap();
        timeline.insert(TimeSnapshot::new(3.0, 0.0));
        timeline.insert(TimeSnapshot::new(3.1, 0.5));
        timeline.reset();
        assert!(timeline.is_empty());
        assert_eq!(timeline.position(), 0.0);
        assert_eq!(timeline.rate(), 1.0);
        assert_eq!(timeline.buffer_time_multiplier(), 2.0);
        assert_eq!(timeline.delivery_jitter(), 0.0);
    }
}
