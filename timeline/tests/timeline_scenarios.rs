//! Timeline behavior under realistic delivery patterns.

use proptest::prelude::*;
use timeline::{
    insert_and_adjust, sample, AdjustParams, ExponentialMovingAverage, SnapshotBuffer,
    SnapshotTimeline, TimeSnapshot, TimelineConfig, TransformSnapshot,
};

const EPSILON: f64 = 1e-9;

const PARAMS: AdjustParams = AdjustParams {
    send_interval: 0.05,
    buffer_time: 0.1,
    catchup_speed: 0.02,
    slowdown_speed: 0.04,
    catchup_negative_threshold: -1.0,
    catchup_positive_threshold: 1.0,
};

struct Loop {
    buffer: SnapshotBuffer<TimeSnapshot>,
    position: f64,
    rate: f64,
    drift: ExponentialMovingAverage,
    delivery: ExponentialMovingAverage,
}

impl Loop {
    fn new() -> Self {
        Self {
            buffer: SnapshotBuffer::new(32),
            position: 0.0,
            rate: 1.0,
            drift: ExponentialMovingAverage::new(20),
            delivery: ExponentialMovingAverage::new(40),
        }
    }

    fn insert(&mut self, remote_time: f64, local_time: f64) -> bool {
        insert_and_adjust(
            &mut self.buffer,
            TimeSnapshot::new(remote_time, local_time),
            &mut self.position,
            &mut self.rate,
            &PARAMS,
            &mut self.drift,
            &mut self.delivery,
        )
    }
}

#[test]
fn ema_converges_to_constant() {
    let mut ema = ExponentialMovingAverage::new(10);
    ema.add(0.0);
    for _ in 0..500 {
        ema.add(3.5);
    }
    assert!((ema.value() - 3.5).abs() < EPSILON);
    assert!(ema.variance() < EPSILON);
    assert!(ema.standard_deviation() < 1e-4);
}

#[test]
fn end_to_end_three_snapshots() {
    let start = 12.0;
    let mut control = Loop::new();
    for (i, remote) in [0.0, 0.05, 0.10].into_iter().enumerate() {
        assert!(control.insert(remote, start + i as f64 * 0.05));
    }

    assert!(control.position >= 0.10 - 0.2 - EPSILON);
    assert!(control.position <= 0.10);

    let bracket = sample(&control.buffer, 0.0).unwrap();
    assert_eq!((bracket.from, bracket.to), (0, 1));
    assert!((0.0..=1.0).contains(&bracket.t));

    assert!(control.insert(0.15, start + 0.15));
    assert!(control.position >= 0.15 - 0.2 - EPSILON);
    assert!(control.position <= 0.15);
    assert!((control.delivery.value() - 0.05).abs() < 1e-6);
}

#[test]
fn steady_stream_advances_monotonically() {
    let config = TimelineConfig {
        send_rate: 20,
        dynamic_adjustment: false,
        ..TimelineConfig::default()
    };
    let interval = config.send_interval();
    let buffer_time = config.buffer_time();
    let mut timeline = SnapshotTimeline::new(config).unwrap();

    let frame = 0.01;
    let mut previous = f64::NEG_INFINITY;
    let mut latest_remote = 0.0;
    for tick in 0..1000u32 {
        let now = f64::from(tick) * frame;
        if tick % 5 == 0 {
            latest_remote = now;
            assert!(timeline.insert(TimeSnapshot::new(now, now)));
        }
        timeline.advance(frame);
        let _ = timeline.sample();

        let position = timeline.position();
        assert!(position > previous, "tick {tick}: {position} <= {previous}");
        assert!(
            (position - (latest_remote - buffer_time)).abs() <= interval + EPSILON,
            "tick {tick}: position {position}, latest {latest_remote}"
        );
        previous = position;
    }
    assert!((timeline.rate() - 1.0).abs() < EPSILON);
}

#[test]
fn starved_timeline_freezes_after_eviction() {
    let mut timeline = SnapshotTimeline::new(TimelineConfig::default()).unwrap();
    timeline.insert(TimeSnapshot::new(1.0, 1.0));
    timeline.advance(5.0);
    let sample = timeline.sample().unwrap();
    assert!(sample.clamped);
    assert_eq!(sample.from.remote_time, 1.0);
    assert_eq!(timeline.len(), 1);
}

#[test]
fn transforms_blend_along_timeline() {
    use glam::{Quat, Vec3};

    let config = TimelineConfig {
        send_rate: 20,
        dynamic_adjustment: false,
        ..TimelineConfig::default()
    };
    let mut timeline = SnapshotTimeline::new(config).unwrap();
    for i in 0..3u8 {
        let t = f64::from(i) * 0.05;
        timeline.insert(TransformSnapshot::new(
            t,
            t,
            Vec3::new(f32::from(i), 0.0, 0.0),
            Quat::IDENTITY,
            Vec3::ONE,
        ));
    }
    // clock starts at -0.1; move to the middle of the first gap
    let blended = timeline.step(0.125).unwrap().interpolate();
    assert!((blended.position.x - 0.5).abs() < 1e-4);
    assert!(blended.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));
}

proptest! {
    #[test]
    fn clock_stays_within_two_buffer_times(
        times in prop::collection::vec(0u16..2000, 1..40),
        start in -5.0f64..5.0,
    ) {
        let mut control = Loop::new();
        control.position = start;
        for (i, &ms) in times.iter().enumerate() {
            let remote = f64::from(ms) / 1000.0;
            if control.insert(remote, i as f64 * 0.05) {
                prop_assert!(control.position <= remote);
                prop_assert!(control.position >= remote - 2.0 * PARAMS.buffer_time - EPSILON);
            }
        }
        let remotes: Vec<f64> = control.buffer.iter().map(|s| s.remote_time).collect();
        prop_assert!(remotes.windows(2).all(|w| w[0] < w[1]));
    }
}
