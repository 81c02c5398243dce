//! The interpolation control loop as pure functions over a buffer.
//!
//! [`SnapshotTimeline`](crate::SnapshotTimeline) wraps these with its own
//! state; they are public so callers can drive a buffer they own.

use crate::ema::ExponentialMovingAverage;
use crate::snapshot::{Snapshot, SnapshotBuffer};

/// Per-insert parameters of [`insert_and_adjust`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustParams {
    /// Seconds between two remote sends.
    pub send_interval: f64,
    /// Target distance of the clock behind the newest snapshot, in seconds.
    pub buffer_time: f64,
    pub catchup_speed: f64,
    pub slowdown_speed: f64,
    /// In send intervals.
    pub catchup_negative_threshold: f64,
    /// In send intervals.
    pub catchup_positive_threshold: f64,
}

/// Two buffered snapshots around a clock position.
///
/// `from == to` when the position lies outside the buffered range; `t` is
/// 0 in that case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub from: usize,
    pub to: usize,
    pub t: f64,
}

impl Bracket {
    /// Returns `true` if the position was outside the buffered range.
    #[must_use]
    pub const fn is_clamped(&self) -> bool {
        self.from == self.to
    }
}

/// Keeps the clock within two buffer times behind `latest_remote_time`
/// and never ahead of it.
#[must_use]
pub fn timeline_clamp(position: f64, buffer_time: f64, latest_remote_time: f64) -> f64 {
    let lower = latest_remote_time - buffer_time * 2.0;
    position.max(lower).min(latest_remote_time)
}

/// Picks the clock rate for a drift, with thresholds in seconds.
#[must_use]
pub fn timescale(
    drift: f64,
    catchup_speed: f64,
    slowdown_speed: f64,
    absolute_negative_threshold: f64,
    absolute_positive_threshold: f64,
) -> f64 {
    if drift > absolute_positive_threshold {
        1.0 + catchup_speed
    } else if drift < absolute_negative_threshold {
        1.0 - slowdown_speed
    } else {
        1.0
    }
}

/// Buffer multiplier that covers the measured delivery jitter plus
/// `tolerance` send intervals.
#[must_use]
pub fn dynamic_adjustment(send_interval: f64, jitter_standard_deviation: f64, tolerance: f64) -> f64 {
    (send_interval + jitter_standard_deviation) / send_interval + tolerance
}

/// Position of `value` between `a` and `b`, clamped to `[0, 1]`. Returns 0
/// when `a == b`.
#[must_use]
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        0.0
    } else {
        ((value - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Inserts a snapshot and re-tunes the clock.
///
/// An empty buffer first seeds the clock one buffer time behind the
/// snapshot. When the snapshot is new, the delivery average takes the
/// receipt gap of the two newest entries, the clock is clamped around the
/// snapshot's remote time, and the drift average and rate are updated.
///
/// Returns `false` if the buffer was full or the remote time was already
/// buffered; the clock is left alone then.
#[allow(clippy::too_many_arguments)]
pub fn insert_and_adjust<T: Snapshot>(
    buffer: &mut SnapshotBuffer<T>,
    snapshot: T,
    position: &mut f64,
    rate: &mut f64,
    params: &AdjustParams,
    drift_ema: &mut ExponentialMovingAverage,
    delivery_ema: &mut ExponentialMovingAverage,
) -> bool {
    let remote_time = snapshot.remote_time();
    if buffer.is_empty() {
        *position = remote_time - params.buffer_time;
    }

    if !buffer.insert_if_not_exists(snapshot) {
        return false;
    }

    let len = buffer.len();
    if len >= 2 {
        if let (Some(previous), Some(latest)) = (buffer.get(len - 2), buffer.get(len - 1)) {
            delivery_ema.add(latest.local_time() - previous.local_time());
        }
    }

    *position = timeline_clamp(*position, params.buffer_time, remote_time);
    drift_ema.add(remote_time - *position);

    let drift = drift_ema.value() - params.buffer_time;
    *rate = timescale(
        drift,
        params.catchup_speed,
        params.slowdown_speed,
        params.send_interval * params.catchup_negative_threshold,
        params.send_interval * params.catchup_positive_threshold,
    );
    true
}

/// Finds the snapshots around `position`.
///
/// Before the first snapshot this is `(0, 0, 0)`, after the last it is
/// `(last, last, 0)`. Returns `None` for an empty buffer.
#[must_use]
pub fn sample<T: Snapshot>(buffer: &SnapshotBuffer<T>, position: f64) -> Option<Bracket> {
    let items = buffer.as_slice();
    let first = items.first()?;

    for (from, pair) in items.windows(2).enumerate() {
        let (lower, upper) = (pair[0].remote_time(), pair[1].remote_time());
        if position >= lower && position <= upper {
            return Some(Bracket {
                from,
                to: from + 1,
                t: inverse_lerp(lower, upper, position),
            });
        }
    }

    let edge = if position < first.remote_time() {
        0
    } else {
        items.len() - 1
    };
    Some(Bracket {
        from: edge,
        to: edge,
        t: 0.0,
    })
}

/// Moves the clock forward by `delta_time` at `rate`.
pub fn step_time(delta_time: f64, position: &mut f64, rate: f64) {
    *position += delta_time * rate;
}

/// Samples at `position` and evicts every snapshot before the lower
/// bracket.
///
/// Returns copies of the bracketing snapshots and the factor between them.
pub fn step_interpolation<T: Snapshot + Clone>(
    buffer: &mut SnapshotBuffer<T>,
    position: f64,
) -> Option<(T, T, f64)> {
    let bracket = sample(buffer, position)?;
    let from = buffer.get(bracket.from)?.clone();
    let to = buffer.get(bracket.to)?.clone();
    buffer.remove_before(bracket.from);
    Some((from, to, bracket.t))
}
