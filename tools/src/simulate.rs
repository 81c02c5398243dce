//! Offline timeline simulation over a jittery, lossy link.

use std::fmt::Write as _;

use anyhow::{ensure, Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use timeline::{SnapshotTimeline, TimeSnapshot, TimelineConfig};

/// Link and render settings for [`simulate_timeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Seconds of remote sends.
    pub duration: f64,
    /// Fixed one-way delay in milliseconds.
    pub latency_ms: f64,
    /// Upper bound of the uniform extra delay in milliseconds.
    pub jitter_ms: f64,
    /// Probability in `[0, 1]` that a snapshot never arrives.
    pub loss: f64,
    pub seed: u64,
    /// Local render rate in Hz.
    pub frame_rate: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            duration: 30.0,
            latency_ms: 50.0,
            jitter_ms: 20.0,
            loss: 0.0,
            seed: 0,
            frame_rate: 60,
        }
    }
}

/// Rendered frames by clock rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateHistogram {
    pub slowdown: usize,
    pub normal: usize,
    pub catchup: usize,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub frames: usize,
    pub sent: usize,
    pub dropped: usize,
    pub inserted: usize,
    /// Arrivals the buffer refused (full or duplicate).
    pub rejected: usize,
    /// Frames where the clock had snapshots to sample.
    pub sampled_frames: usize,
    /// Sampled frames where the clock was outside the buffered range.
    pub clamped_frames: usize,
    pub rate_histogram: RateHistogram,
    /// Average drift over sampled frames, in seconds.
    pub mean_drift: f64,
    pub final_rate: f64,
    pub final_buffer_time_multiplier: f64,
    pub final_buffer_time: f64,
    pub delivery_jitter: f64,
}

/// Sends snapshots at the configured rate over a simulated link and renders
/// them at `params.frame_rate`, counting how the clock behaved.
///
/// Runs until every delivered snapshot has arrived.
pub fn simulate_timeline(
    config: TimelineConfig,
    params: &SimulationParams,
) -> Result<SimulationReport> {
    ensure!(
        params.duration.is_finite() && params.duration > 0.0,
        "duration must be positive, got {}",
        params.duration
    );
    ensure!(
        (0.0..=1.0).contains(&params.loss),
        "loss must be within 0..=1, got {}",
        params.loss
    );
    ensure!(
        params.latency_ms.is_finite() && params.latency_ms >= 0.0,
        "latency must be finite and non-negative, got {}",
        params.latency_ms
    );
    ensure!(
        params.jitter_ms.is_finite() && params.jitter_ms >= 0.0,
        "jitter must be finite and non-negative, got {}",
        params.jitter_ms
    );
    ensure!(params.frame_rate > 0, "frame rate must be positive");

    let send_interval = config.send_interval();
    let mut timeline = SnapshotTimeline::new(config).context("invalid timeline config")?;
    let mut rng = StdRng::seed_from_u64(params.seed);

    let latency = params.latency_ms / 1000.0;
    let jitter = params.jitter_ms / 1000.0;
    let sent = (params.duration / send_interval).floor() as usize + 1;
    let mut dropped = 0;
    let mut arrivals = Vec::with_capacity(sent);
    for index in 0..sent {
        if rng.gen_bool(params.loss) {
            dropped += 1;
            continue;
        }
        let remote_time = index as f64 * send_interval;
        let delay = if jitter > 0.0 {
            latency + rng.gen_range(0.0..jitter)
        } else {
            latency
        };
        arrivals.push(TimeSnapshot::new(remote_time, remote_time + delay));
    }
    arrivals.sort_by(|a, b| a.local_time.total_cmp(&b.local_time));
    debug!("{sent} snapshots sent, {dropped} lost");

    let frame_time = 1.0 / f64::from(params.frame_rate);
    let mut report = SimulationReport {
        frames: 0,
        sent,
        dropped,
        inserted: 0,
        rejected: 0,
        sampled_frames: 0,
        clamped_frames: 0,
        rate_histogram: RateHistogram::default(),
        mean_drift: 0.0,
        final_rate: 1.0,
        final_buffer_time_multiplier: 0.0,
        final_buffer_time: 0.0,
        delivery_jitter: 0.0,
    };
    let mut drift_sum = 0.0;
    let mut pending = arrivals.into_iter().peekable();

    loop {
        let now = report.frames as f64 * frame_time;
        while let Some(snapshot) = pending.next_if(|s| s.local_time <= now) {
            if timeline.insert(snapshot) {
                report.inserted += 1;
            } else {
                report.rejected += 1;
            }
        }

        if let Some(clamped) = timeline.step(frame_time).map(|sample| sample.clamped) {
            report.sampled_frames += 1;
            if clamped {
                report.clamped_frames += 1;
            }
            drift_sum += timeline.drift();

            let rate = timeline.rate();
            if rate > 1.0 {
                report.rate_histogram.catchup += 1;
            } else if rate < 1.0 {
                report.rate_histogram.slowdown += 1;
            } else {
                report.rate_histogram.normal += 1;
            }
        }

        report.frames += 1;
        if now >= params.duration && pending.peek().is_none() {
            break;
        }
    }

    if report.sampled_frames > 0 {
        report.mean_drift = drift_sum / report.sampled_frames as f64;
    }
    report.final_rate = timeline.rate();
    report.final_buffer_time_multiplier = timeline.buffer_time_multiplier();
    report.final_buffer_time = timeline.buffer_time();
    report.delivery_jitter = timeline.delivery_jitter();
    info!(
        "simulated {} frames: {} clamped, mean drift {:.4}s",
        report.frames, report.clamped_frames, report.mean_drift
    );
    Ok(report)
}

/// Renders a report for a terminal.
pub fn format_simulation_pretty(report: &SimulationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "snapshots: {} sent, {} dropped, {} inserted, {} rejected",
        report.sent, report.dropped, report.inserted, report.rejected
    );
    let _ = writeln!(
        out,
        "frames: {} total, {} sampled, {} clamped",
        report.frames, report.sampled_frames, report.clamped_frames
    );
    let histogram = report.rate_histogram;
    let _ = writeln!(
        out,
        "rate: slowdown {} / normal {} / catchup {}",
        histogram.slowdown, histogram.normal, histogram.catchup
    );
    let _ = writeln!(out, "mean drift: {:.2} ms", report.mean_drift * 1000.0);
    let _ = write!(
        out,
        "buffer: x{:.3} = {:.2} ms, delivery jitter {:.2} ms",
        report.final_buffer_time_multiplier,
        report.final_buffer_time * 1000.0,
        report.delivery_jitter * 1000.0
    );
    out
}
