//! Elements and the data assets elementals are rolled from

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::StatRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum ElementType {
    Fire,
    Water,
    Nature,
}

impl ElementType {
    pub const ALL: [ElementType; 3] = [ElementType::Fire, ElementType::Water, ElementType::Nature];
}

/// Stat ranges for one kind of elemental, loaded from `data/elementals.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementalData {
    pub name: String,
    pub element: ElementType,
    pub hp: StatRange,
    /// HP per second while resting
    pub hp_recovery: StatRange,
    pub stamina: StatRange,
    pub stamina_recovery: StatRange,
    /// Stamina spent per second at multiplier 1
    pub stamina_drain: StatRange,
    pub speed: StatRange,
    pub damage: StatRange,
    pub roam_range: StatRange,
    pub detection_range: StatRange,
    pub attack_range: StatRange,
    /// Seconds between attacks
    pub attack_interval: StatRange,
    pub carry_capacity: StatRange,
    /// Resources moved per interaction
    pub gather_rate: StatRange,
    /// Per-stat multiplier drawn on every upgrade
    #[serde(default = "default_upgrade_factor")]
    pub upgrade_factor: StatRange,
}

fn default_upgrade_factor() -> StatRange {
    StatRange::new(1.1, 1.3)
}

impl ElementalData {
    /// Reasonable defaults per element, used when no data file is given
    pub fn standard(element: ElementType) -> Self {
        let (name, hp, damage, speed) = match element {
            ElementType::Fire => ("Fire Elemental", StatRange::new(80.0, 110.0), StatRange::new(12.0, 18.0), StatRange::new(4.0, 5.0)),
            ElementType::Water => ("Water Elemental", StatRange::new(100.0, 130.0), StatRange::new(8.0, 12.0), StatRange::new(3.5, 4.5)),
            ElementType::Nature => ("Nature Elemental", StatRange::new(110.0, 150.0), StatRange::new(6.0, 10.0), StatRange::new(3.0, 4.0)),
        };
        Self {
            name: name.to_string(),
            element,
            hp,
            hp_recovery: StatRange::new(4.0, 6.0),
            stamina: StatRange::new(80.0, 100.0),
            stamina_recovery: StatRange::new(4.0, 6.0),
            stamina_drain: StatRange::new(3.0, 5.0),
            speed,
            damage,
            roam_range: StatRange::new(10.0, 15.0),
            detection_range: StatRange::new(12.0, 16.0),
            attack_range: StatRange::new(1.5, 2.0),
            attack_interval: StatRange::new(1.0, 1.5),
            carry_capacity: StatRange::new(10.0, 15.0),
            gather_rate: StatRange::new(2.0, 4.0),
            upgrade_factor: default_upgrade_factor(),
        }
    }

    /// Returns a list of problems; empty when the asset is usable
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let ranges = [
            ("hp", self.hp),
            ("hp_recovery", self.hp_recovery),
            ("stamina", self.stamina),
            ("stamina_recovery", self.stamina_recovery),
            ("stamina_drain", self.stamina_drain),
            ("speed", self.speed),
            ("damage", self.damage),
            ("roam_range", self.roam_range),
            ("detection_range", self.detection_range),
            ("attack_range", self.attack_range),
            ("attack_interval", self.attack_interval),
            ("carry_capacity", self.carry_capacity),
            ("gather_rate", self.gather_rate),
            ("upgrade_factor", self.upgrade_factor),
        ];
        for (field, range) in ranges {
            if !range.is_ordered() {
                errors.push(format!("{}: {} range has min > max", self.name, field));
            }
            if range.min < 0.0 {
                errors.push(format!("{}: {} must not be negative", self.name, field));
            }
        }

        let positive = [
            ("hp", self.hp),
            ("hp_recovery", self.hp_recovery),
            ("stamina", self.stamina),
            ("stamina_recovery", self.stamina_recovery),
            ("stamina_drain", self.stamina_drain),
            ("attack_interval", self.attack_interval),
        ];
        for (field, range) in positive {
            if range.min <= 0.0 {
                errors.push(format!("{}: {} must be positive", self.name, field));
            }
        }

        errors
    }
}
