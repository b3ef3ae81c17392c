//! Interpolation.
//!
//! The simulation advances in whole frames; a renderer drawing between two
//! frames blends the last two poses.

use std::collections::VecDeque;

use drive_shared::{math::Vec2, vehicle::Vehicle};
use serde::Serialize;

/// Where the vehicle was at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    pub tick: u64,
    pub position: Vec2,
    /// Facing in degrees.
    pub angle: f32,
}

impl Pose {
    pub fn of(vehicle: &Vehicle) -> Self {
        Self {
            tick: vehicle.ticks(),
            position: vehicle.position(),
            angle: vehicle.object.angle,
        }
    }
}

/// Bounded pose history.
#[derive(Default)]
pub struct PoseBuffer {
    history: VecDeque<Pose>,
    max: usize,
}

impl PoseBuffer {
    pub fn new(max: usize) -> Self {
        Self {
            history: VecDeque::new(),
            max: max.max(2),
        }
    }

    pub fn push(&mut self, pose: Pose) {
        self.history.push_back(pose);
        while self.history.len() > self.max {
            self.history.pop_front();
        }
    }

    /// Returns the number of buffered poses.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Returns true if no poses are buffered.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Blends the last two poses.
    ///
    /// `alpha` should be in $[0,1]$ where 0 = previous tick, 1 = latest.
    pub fn interp(&self, alpha: f32) -> Option<Pose> {
        let n = self.history.len();
        if n < 2 {
            return self.history.back().copied();
        }
        let a = self.history[n - 2];
        let b = self.history[n - 1];
        let t = alpha.clamp(0.0, 1.0);
        Some(Pose {
            tick: if t < 1.0 { a.tick } else { b.tick },
            position: a.position.lerp(b.position, t),
            angle: a.angle + (b.angle - a.angle) * t,
        })
    }

    pub fn last(&self) -> Option<&Pose> {
        self.history.back()
    }

    /// Distance covered across the buffered history.
    pub fn path_length(&self) -> f32 {
        self.history
            .iter()
            .zip(self.history.iter().skip(1))
            .map(|(a, b)| Vec2::new(b.position.x - a.position.x, b.position.y - a.position.y).length())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(tick: u64, x: f32, angle: f32) -> Pose {
        Pose {
            tick,
            position: Vec2::new(x, 0.0),
            angle,
        }
    }

    #[test]
    fn interp_blends_last_two() {
        let mut buf = PoseBuffer::new(4);
        buf.push(pose(1, 0.0, 0.0));
        buf.push(pose(2, 2.0, 10.0));
        let mid = buf.interp(0.5).unwrap();
        assert_eq!(mid.position, Vec2::new(1.0, 0.0));
        assert_eq!(mid.angle, 5.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut buf = PoseBuffer::new(3);
        for i in 0..10 {
            buf.push(pose(i, i as f32, 0.0));
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.last().unwrap().tick, 9);
        assert_eq!(buf.path_length(), 2.0);
    }

    #[test]
    fn single_pose_is_returned_as_is() {
        let mut buf = PoseBuffer::new(3);
        assert!(buf.interp(0.5).is_none());
        buf.push(pose(1, 4.0, 0.0));
        assert_eq!(buf.interp(0.5), Some(pose(1, 4.0, 0.0)));
    }
}
