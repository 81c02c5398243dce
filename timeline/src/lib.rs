//! Snapshot buffering and a drift-corrected interpolation clock.
//!
//! Remote peers send timestamped snapshots at a fixed rate; they arrive late
//! and unevenly. [`SnapshotTimeline`] buffers them in remote-time order and
//! runs a local clock a short buffer time behind the newest one, speeding it
//! up or slowing it down so the distance stays near the target. Sampling the
//! timeline yields the two snapshots around the clock and a blend factor.
//!
//! The control loop is also exposed as free functions in
//! [`interpolation`] for callers that keep their own state.
//!
//! # Design Principles
//!
//! - **Time is `f64` seconds** - Remote and local clocks are plain numbers
//!   supplied by the caller; this crate never reads a system clock.
//! - **Capacity is backpressure** - A full buffer rejects inserts instead of
//!   growing or failing.
//! - **No byte layer** - Snapshots are decoded elsewhere; only their two
//!   timestamps matter here.
//!
//! # Example
//!
//! ```
//! use timeline::{SnapshotTimeline, TimeSnapshot, TimelineConfig};
//!
//! let config = TimelineConfig {
//!     send_rate: 20,
//!     dynamic_adjustment: false,
//!     ..TimelineConfig::default()
//! };
//! let mut timeline = SnapshotTimeline::new(config).unwrap();
//! timeline.insert(TimeSnapshot::new(0.0, 0.0));
//! timeline.insert(TimeSnapshot::new(0.05, 0.05));
//!
//! let sample = timeline.step(0.125).unwrap();
//! assert_eq!(sample.from.remote_time, 0.0);
//! assert_eq!(sample.to.remote_time, 0.05);
//! ```

mod config;
mod ema;
pub mod interpolation;
mod snapshot;
mod timeline;
mod transform;

pub use config::{ConfigError, TimelineConfig};
pub use ema::ExponentialMovingAverage;
pub use interpolation::{
    dynamic_adjustment, insert_and_adjust, inverse_lerp, sample, step_interpolation, step_time,
    timeline_clamp, timescale, AdjustParams, Bracket,
};
pub use snapshot::{Snapshot, SnapshotBuffer, TimeSnapshot};
pub use timeline::{Sample, SnapshotTimeline};
pub use transform::{Interpolate, TransformSnapshot};
