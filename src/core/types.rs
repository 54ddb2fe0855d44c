//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for living agents (pets and elementals)
///
/// Ids are handed out sequentially by the world so that seeded runs are
/// reproducible and iteration order never depends on hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

/// Unique identifier for world objects (structures, plants, pools, pellets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

/// Unique identifier for points of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoiId(pub u32);

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// The one RNG type every seeded system draws from
pub type SimRng = rand_chacha::ChaCha8Rng;

/// Monotonic id source shared by a world
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_agent: u32,
    next_object: u32,
    next_poi: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&mut self) -> AgentId {
        self.next_agent += 1;
        AgentId(self.next_agent)
    }

    pub fn object(&mut self) -> ObjectId {
        self.next_object += 1;
        ObjectId(self.next_object)
    }

    pub fn poi(&mut self) -> PoiId {
        self.next_poi += 1;
        PoiId(self.next_poi)
    }
}

/// 2D position on the ground plane
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    /// Component-wise rounding, used to bucket positions
    pub fn round(&self) -> Self {
        Self { x: self.x.round(), y: self.y.round() }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Inclusive numeric range used by data assets, written `[min, max]` in TOML
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct StatRange {
    pub min: f32,
    pub max: f32,
}

impl StatRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn fixed(value: f32) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Draw a value uniformly from the range
    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

impl From<[f32; 2]> for StatRange {
    fn from(pair: [f32; 2]) -> Self {
        Self { min: pair[0], max: pair[1] }
    }
}

impl From<StatRange> for [f32; 2] {
    fn from(range: StatRange) -> Self {
        [range.min, range.max]
    }
}
