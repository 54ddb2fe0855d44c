//! Movement abstraction and a straight-line kinematic mover

use crate::core::types::Vec2;

/// What behavior states need from whatever moves an agent
pub trait Locomotion: std::fmt::Debug {
    fn position(&self) -> Vec2;
    fn set_destination(&mut self, point: Vec2);
    fn destination(&self) -> Option<Vec2>;
    /// Halt without forgetting the destination
    fn stop(&mut self);
    fn resume(&mut self);
    fn is_stopped(&self) -> bool;
    fn remaining_distance(&self) -> f32;
    fn has_arrived(&self) -> bool;
    fn speed(&self) -> f32;
    fn set_speed(&mut self, speed: f32);
    fn stopping_distance(&self) -> f32;
    /// Advance by `dt` seconds
    fn step(&mut self, dt: f32);
}

/// Moves straight toward its destination at constant speed
#[derive(Debug, Clone)]
pub struct SimpleLocomotion {
    position: Vec2,
    destination: Option<Vec2>,
    speed: f32,
    stopping_distance: f32,
    stopped: bool,
}

impl SimpleLocomotion {
    pub fn new(position: Vec2, speed: f32, stopping_distance: f32) -> Self {
        Self {
            position,
            destination: None,
            speed,
            stopping_distance,
            stopped: false,
        }
    }
}

impl Locomotion for SimpleLocomotion {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_destination(&mut self, point: Vec2) {
        self.destination = Some(point);
        self.stopped = false;
    }

    fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn resume(&mut self) {
        self.stopped = false;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map(|d| self.position.distance(&d))
            .unwrap_or(0.0)
    }

    fn has_arrived(&self) -> bool {
        self.remaining_distance() <= self.stopping_distance
    }

    fn speed(&self) -> f32 {
        self.speed
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn step(&mut self, dt: f32) {
        if self.stopped {
            return;
        }
        let Some(dest) = self.destination else { return };

        let to_dest = dest - self.position;
        let dist = to_dest.length();
        if dist <= self.stopping_distance {
            return;
        }

        let travel = self.speed * dt;
        if travel >= dist {
            self.position = dest;
        } else {
            self.position = self.position + to_dest.normalize() * travel;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_toward_destination() {
        let mut mover = SimpleLocomotion::new(Vec2::ZERO, 2.0, 0.1);
        mover.set_destination(Vec2::new(10.0, 0.0));
        mover.step(1.0);
        assert!((mover.position().x - 2.0).abs() < 1e-5);
        assert!((mover.remaining_distance() - 8.0).abs() < 1e-5);
        assert!(!mover.has_arrived());
    }

    #[test]
    fn test_does_not_overshoot() {
        let mut mover = SimpleLocomotion::new(Vec2::ZERO, 100.0, 0.1);
        mover.set_destination(Vec2::new(3.0, 4.0));
        mover.step(1.0);
        assert_eq!(mover.position(), Vec2::new(3.0, 4.0));
        assert!(mover.has_arrived());
    }

    #[test]
    fn test_stop_keeps_destination() {
        let mut mover = SimpleLocomotion::new(Vec2::ZERO, 1.0, 0.1);
        mover.set_destination(Vec2::new(5.0, 0.0));
        mover.stop();
        mover.step(1.0);
        assert_eq!(mover.position(), Vec2::ZERO);
        assert_eq!(mover.destination(), Some(Vec2::new(5.0, 0.0)));

        mover.resume();
        mover.step(1.0);
        assert!(mover.position().x > 0.0);
    }

    #[test]
    fn test_no_destination_counts_as_arrived() {
        let mover = SimpleLocomotion::new(Vec2::new(1.0, 1.0), 1.0, 0.5);
        assert_eq!(mover.remaining_distance(), 0.0);
        assert!(mover.has_arrived());
    }
}
