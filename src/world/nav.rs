//! Navigable area: a bounded rectangle with circular obstacles

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::{SimRng, Vec2};

/// Attempts made before a point sample gives up
const SAMPLE_ATTEMPTS: usize = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavBounds {
    pub min: Vec2,
    pub max: Vec2,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

impl NavBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max, obstacles: Vec::new() }
    }

    pub fn with_obstacle(mut self, center: Vec2, radius: f32) -> Self {
        self.obstacles.push(Obstacle { center, radius });
        self
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn is_navigable(&self, point: Vec2) -> bool {
        self.contains(point) && !self.obstacles.iter().any(|o| o.center.distance(&point) < o.radius)
    }

    /// Uniform sample inside the disk around `center`; `None` when every attempt
    /// lands off the navigable area
    pub fn sample_point(&self, center: Vec2, radius: f32, rng: &mut SimRng) -> Option<Vec2> {
        if radius <= 0.0 {
            return self.is_navigable(center).then_some(center);
        }
        for _ in 0..SAMPLE_ATTEMPTS {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let r = radius * rng.gen::<f32>().sqrt();
            let candidate = center + Vec2::new(angle.cos(), angle.sin()) * r;
            if self.is_navigable(candidate) {
                return Some(candidate);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_obstacles_block_navigation() {
        let nav = NavBounds::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0))
            .with_obstacle(Vec2::ZERO, 2.0);
        assert!(!nav.is_navigable(Vec2::new(1.0, 0.0)));
        assert!(nav.is_navigable(Vec2::new(5.0, 0.0)));
        assert!(!nav.is_navigable(Vec2::new(11.0, 0.0)));
    }

    #[test]
    fn test_samples_stay_in_radius_and_bounds() {
        let nav = NavBounds::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0));
        let mut rng = SimRng::seed_from_u64(11);
        for _ in 0..50 {
            let center = Vec2::new(8.0, 8.0);
            if let Some(p) = nav.sample_point(center, 5.0, &mut rng) {
                assert!(p.distance(&center) <= 5.0 + 1e-4);
                assert!(nav.is_navigable(p));
            }
        }
    }

    #[test]
    fn test_unreachable_sample_is_none() {
        let nav = NavBounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let mut rng = SimRng::seed_from_u64(2);
        assert!(nav.sample_point(Vec2::new(100.0, 100.0), 3.0, &mut rng).is_none());
    }
}
