//! Blending between two snapshots.

use glam::{Quat, Vec3};

use crate::snapshot::{Snapshot, TimeSnapshot};
use crate::timeline::Sample;

/// A snapshot that can be blended with another of its kind.
pub trait Interpolate: Sized {
    /// Blends `from` toward `to` by `t` in `[0, 1]`.
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self;
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Interpolate for TimeSnapshot {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        Self::new(
            lerp(from.remote_time, to.remote_time, t),
            lerp(from.local_time, to.local_time, t),
        )
    }
}

/// Position, rotation and scale of a remote object at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub remote_time: f64,
    pub local_time: f64,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformSnapshot {
    #[must_use]
    pub const fn new(
        remote_time: f64,
        local_time: f64,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> Self {
        Self {
            remote_time,
            local_time,
            position,
            rotation,
            scale,
        }
    }
}

impl Snapshot for TransformSnapshot {
    fn remote_time(&self) -> f64 {
        self.remote_time
    }

    fn local_time(&self) -> f64 {
        self.local_time
    }
}

impl Interpolate for TransformSnapshot {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        let factor = t as f32;
        Self {
            remote_time: lerp(from.remote_time, to.remote_time, t),
            local_time: lerp(from.local_time, to.local_time, t),
            position: from.position.lerp(to.position, factor),
            rotation: from.rotation.slerp(to.rotation, factor),
            scale: from.scale.lerp(to.scale, factor),
        }
    }
}

impl<T: Interpolate> Sample<'_, T> {
    /// Blends the two sampled snapshots.
    #[must_use]
    pub fn interpolate(&self) -> T {
        T::interpolate(self.from, self.to, self.t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(time: f64, x: f32, angle: f32) -> TransformSnapshot {
        TransformSnapshot::new(
            time,
            time,
            Vec3::new(x, 0.0, 0.0),
            Quat::from_rotation_y(angle),
            Vec3::ONE,
        )
    }

    #[test]
    fn halfway_blend() {
        let from = at(0.0, 0.0, 0.0);
        let to = at(1.0, 10.0, 1.0);
        let mid = TransformSnapshot::interpolate(&from, &to, 0.5);
        assert!((mid.remote_time - 0.5).abs() < 1e-12);
        assert!((mid.position.x - 5.0).abs() < 1e-5);
        assert!(mid.rotation.angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
        assert!(mid.scale.abs_diff_eq(Vec3::ONE, 1e-6));
    }

    #[test]
    fn endpoints() {
        let from = at(0.0, 1.0, 0.2);
        let to = at(1.0, 3.0, 0.4);
        assert_eq!(TransformSnapshot::interpolate(&from, &to, 0.0).position, from.position);
        let end = TransformSnapshot::interpolate(&from, &to, 1.0);
        assert!(end.position.abs_diff_eq(to.position, 1e-6));
    }

    #[test]
    fn sample_blends() {
        let from = TimeSnapshot::new(1.0, 2.0);
        let to = TimeSnapshot::new(2.0, 4.0);
        let sample = Sample {
            from: &from,
            to: &to,
            t: 0.25,
            clamped: false,
        };
        let blended = sample.interpolate();
        assert!((blended.remote_time - 1.25).abs() < 1e-12);
        assert!((blended.local_time - 2.5).abs() < 1e-12);
    }
}
