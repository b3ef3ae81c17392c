//! Base movable object.
//!
//! Holds a world position, a facing angle and a per-tick motion vector. The
//! renderer and camera read from here; nothing here knows how it is drawn.

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GameObject {
    pub world_pos: Vec2,
    /// Facing in degrees, clockwise from "up".
    pub angle: f32,
    /// Displacement applied on the next `tick`.
    pub motion_vector: Vec2,
}

impl GameObject {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            world_pos: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.world_pos += Vec2::new(dx, dy);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.world_pos = Vec2::new(x, y);
    }

    pub fn tick(&mut self) {
        let m = self.motion_vector;
        self.move_by(m.x, m.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_applies_motion_vector() {
        let mut obj = GameObject::at(10.0, 10.0);
        obj.motion_vector = Vec2::new(1.5, -2.0);
        obj.tick();
        obj.tick();
        assert_eq!(obj.world_pos, Vec2::new(13.0, 6.0));
    }

    #[test]
    fn move_to_overrides_position() {
        let mut obj = GameObject::default();
        obj.move_by(4.0, 4.0);
        obj.move_to(-1.0, 2.0);
        assert_eq!(obj.world_pos, Vec2::new(-1.0, 2.0));
    }
}
