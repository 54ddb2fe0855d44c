//! Simulation configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Every section deserializes from a
//! partial TOML table; missing keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::core::types::{StatRange, Vec2};

/// Configuration for the simulation systems
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === WORLD ===
    /// Seed for the world RNG. Two runs with the same seed, data and
    /// commands produce identical event streams.
    pub seed: u64,

    /// Seconds of simulated time per tick
    pub tick_seconds: f32,

    /// Lower corner of the navigable rectangle
    pub world_min: Vec2,

    /// Upper corner of the navigable rectangle
    pub world_max: Vec2,

    /// Size of each cell in the spatial hash grid (world units)
    ///
    /// Should be roughly a third of the typical detection range so radius
    /// queries touch a handful of cells.
    pub grid_cell_size: f32,

    pub pets: PetTuning,
    pub elementals: ElementalTuning,
    pub structures: StructureTuning,
    pub plants: PlantTuning,
    pub pools: PoolTuning,
    pub doomsday: DoomsdayTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_seconds: 0.1,
            world_min: Vec2::new(-50.0, -50.0),
            world_max: Vec2::new(50.0, 50.0),
            grid_cell_size: 5.0,
            pets: PetTuning::default(),
            elementals: ElementalTuning::default(),
            structures: StructureTuning::default(),
            plants: PlantTuning::default(),
            pools: PoolTuning::default(),
            doomsday: DoomsdayTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_seconds <= 0.0 {
            return Err(format!("tick_seconds ({}) must be positive", self.tick_seconds));
        }

        if self.world_min.x >= self.world_max.x || self.world_min.y >= self.world_max.y {
            return Err("world_min must be strictly below world_max on both axes".into());
        }

        if self.grid_cell_size <= 0.0 {
            return Err("grid_cell_size must be positive".into());
        }

        self.pets.validate()?;
        self.elementals.validate()?;

        if self.structures.max_level == 0 {
            return Err("structures.max_level must be at least 1".into());
        }
        if self.structures.base_resources_held <= 0.0 || self.structures.base_resources_needed <= 0.0 {
            return Err("structure base resource amounts must be positive".into());
        }

        if self.plants.base_growth_time <= 0.0 || self.plants.burn_time <= 0.0 {
            return Err("plant growth and burn times must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.plants.fire_spread_chance) {
            return Err(format!(
                "plants.fire_spread_chance ({}) must be within [0, 1]",
                self.plants.fire_spread_chance
            ));
        }

        if self.pools.growth_multiplier <= 0.0 {
            return Err("pools.growth_multiplier must be positive".into());
        }

        Ok(())
    }
}

/// Pet needs and activity tuning
///
/// Activity rates are modifiers relative to doing nothing: a rate of +5 on
/// a need decaying at 2/s nets +7/s while the activity runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PetTuning {
    /// Starting value for every need unless a pet profile overrides it
    pub default_need_value: f32,
    /// Decay per second for every need unless a pet profile overrides it
    pub default_decay_rate: f32,

    /// Seconds a pet may stay in one state before a forced re-evaluation
    pub max_time_in_one_state: f32,
    /// Needs below this are urgent enough to drive the timeout fallback
    pub urgent_need_threshold: f32,
    /// Feeding, sleeping and playing end once their need reaches this
    pub satiated_threshold: f32,
    /// Radius used when a rule requires a point of interest nearby
    pub poi_search_radius: f32,

    pub move_speed: f32,
    pub stopping_distance: f32,

    pub idle_duration: StatRange,
    pub wander_duration: StatRange,
    pub wander_radius: f32,
    pub clean_duration: f32,
    pub interact_duration: f32,

    pub idle_energy: f32,
    pub idle_happiness: f32,
    pub wander_energy: f32,
    pub wander_happiness: f32,
    pub eat_hunger: f32,
    pub eat_energy: f32,
    pub eat_happiness: f32,
    pub eat_cleanliness: f32,
    /// Energy rate when sleeping at a bed; sleeping in place gets half
    pub sleep_energy: f32,
    pub sleep_happiness: f32,
    pub clean_cleanliness: f32,
    pub clean_happiness: f32,
    pub play_happiness: f32,
    pub play_cleanliness: f32,
    pub play_energy: f32,
    pub interact_happiness: f32,
    pub obey_happiness: f32,
}

impl Default for PetTuning {
    fn default() -> Self {
        Self {
            default_need_value: 100.0,
            default_decay_rate: 2.0,
            max_time_in_one_state: 60.0,
            urgent_need_threshold: 30.0,
            satiated_threshold: 90.0,
            poi_search_radius: 50.0,
            move_speed: 3.5,
            stopping_distance: 0.5,
            idle_duration: StatRange::new(2.0, 5.0),
            wander_duration: StatRange::new(5.0, 10.0),
            wander_radius: 20.0,
            clean_duration: 5.0,
            interact_duration: 3.0,
            idle_energy: 0.5,
            idle_happiness: -2.0,
            wander_energy: -2.0,
            wander_happiness: 1.0,
            eat_hunger: 5.0,
            eat_energy: 1.0,
            eat_happiness: 1.0,
            eat_cleanliness: -1.0,
            sleep_energy: 4.0,
            sleep_happiness: 1.0,
            clean_cleanliness: 3.0,
            clean_happiness: 0.5,
            play_happiness: 4.0,
            play_cleanliness: -1.5,
            play_energy: -1.0,
            interact_happiness: 3.0,
            obey_happiness: 0.5,
        }
    }
}

impl PetTuning {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.default_need_value) {
            return Err("pets.default_need_value must be within [0, 100]".into());
        }
        if self.default_decay_rate < 0.0 {
            return Err("pets.default_decay_rate must not be negative".into());
        }
        if self.max_time_in_one_state <= 0.0 {
            return Err("pets.max_time_in_one_state must be positive".into());
        }
        if !self.idle_duration.is_ordered() || !self.wander_duration.is_ordered() {
            return Err("pet duration ranges must have min <= max".into());
        }
        Ok(())
    }
}

/// Elemental behavior tuning shared by every archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalTuning {
    pub stopping_distance: f32,

    pub idle_duration: StatRange,
    /// Seconds between interactable scans while idle
    pub idle_scan_interval: f32,
    /// Stamina restore multiplier while idle
    pub idle_stamina_rate: f32,
    /// Per-tick probability of an interactable scan while roaming
    pub roam_scan_chance: f32,

    /// Exponent m in the sleep probability `1 - hp_pct^m`
    pub sleep_chance_exponent: f32,
    /// Sleep duration jitter, drawn uniformly from [-jitter, jitter]
    pub sleep_jitter: f32,
    pub sleep_stamina_rate: f32,

    pub pursue_stamina_rate: f32,

    /// Speed and stamina multiplier while fleeing
    pub flee_multiplier: f32,
    /// How far past the agent the flee point is projected
    pub flee_distance: f32,
    /// Random offset radius added to the flee point
    pub flee_jitter: f32,
    /// Fleeing ends once the threat is beyond detection range times this
    pub flee_escape_factor: f32,
    /// Attackers flee when struck at or below this HP fraction
    pub flee_hp_threshold: f32,
    /// A third party hitting harder than own damage times this forces a flee
    pub harder_hitter_ratio: f32,

    /// Baseline fight roll: a uniform draw above this means fight
    pub brave_threshold: f32,
    /// Agents at or below this stamina fraction always fight
    pub low_stamina_threshold: f32,

    /// Seconds between interaction attempts once at the target
    pub interact_interval: f32,

    // === STRUCTURE DESIRE ===
    pub desire_rate: f32,
    pub desire_low_hp_bonus: f32,
    pub desire_full_bonus: f32,
    pub desire_threshold: f32,
    pub place_chance: f32,
    /// Desire is multiplied by this after a failed placement roll
    pub desire_decay: f32,
    /// Minimum distance between two structures
    pub structure_spacing: f32,
}

impl Default for ElementalTuning {
    fn default() -> Self {
        Self {
            stopping_distance: 1.0,
            idle_duration: StatRange::new(3.0, 8.0),
            idle_scan_interval: 1.0,
            idle_stamina_rate: 0.5,
            roam_scan_chance: 0.1,
            sleep_chance_exponent: 3.0,
            sleep_jitter: 5.0,
            sleep_stamina_rate: 2.0,
            pursue_stamina_rate: 1.0,
            flee_multiplier: 1.5,
            flee_distance: 10.0,
            flee_jitter: 3.0,
            flee_escape_factor: 1.5,
            flee_hp_threshold: 0.45,
            harder_hitter_ratio: 1.5,
            brave_threshold: 0.4,
            low_stamina_threshold: 0.3,
            interact_interval: 1.0,
            desire_rate: 0.1,
            desire_low_hp_bonus: 0.1,
            desire_full_bonus: 0.2,
            desire_threshold: 1.0,
            place_chance: 0.3,
            desire_decay: 0.8,
            structure_spacing: 5.0,
        }
    }
}

impl ElementalTuning {
    fn validate(&self) -> Result<(), String> {
        if !self.idle_duration.is_ordered() {
            return Err("elementals.idle_duration must have min <= max".into());
        }
        if self.flee_multiplier <= 0.0 {
            return Err("elementals.flee_multiplier must be positive".into());
        }
        if self.interact_interval <= 0.0 || self.idle_scan_interval <= 0.0 {
            return Err("elemental scan and interaction intervals must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.desire_decay) {
            return Err("elementals.desire_decay must be within [0, 1]".into());
        }
        Ok(())
    }
}

/// Elemental structure economy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureTuning {
    /// Resources a level-1 structure holds for collection
    pub base_resources_held: f32,
    /// Resources a level-1 structure needs to reach level 2
    pub base_resources_needed: f32,
    /// Growth of held resources per level
    pub held_multiplier: f32,
    /// Growth of needed resources per level
    pub needed_multiplier: f32,
    pub max_level: u8,
    /// Seconds a depleted structure lingers before it despawns
    pub despawn_delay: f32,
}

impl Default for StructureTuning {
    fn default() -> Self {
        Self {
            base_resources_held: 20.0,
            base_resources_needed: 15.0,
            held_multiplier: 1.5,
            needed_multiplier: 1.3,
            max_level: 3,
            despawn_delay: 30.0,
        }
    }
}

/// Plant growth and combustion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantTuning {
    /// Seconds to full maturity at growth rate 1
    pub base_growth_time: f32,
    /// Growth fraction at which a seedling becomes growing
    pub growing_threshold: f32,
    /// Growth rate multiplier while a watering boost is active
    pub water_growth_boost: f32,
    pub water_boost_duration: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Seconds of burning until the plant is burned down
    pub burn_time: f32,
    /// Burn fraction past which extinguishing still leaves a burned plant
    pub burned_threshold: f32,
    pub extinguish_duration: f32,
    pub fire_spread_radius: f32,
    pub fire_spread_interval: f32,
    pub fire_spread_chance: f32,
    pub lifetime: f32,
    /// Lifetime fraction under which nature elementals refresh a plant
    pub revive_lifetime_fraction: f32,
    /// Seconds a plant must stay mature before its spawn roll
    pub mature_spawn_time: f32,
    pub spawn_chance: f32,
}

impl Default for PlantTuning {
    fn default() -> Self {
        Self {
            base_growth_time: 30.0,
            growing_threshold: 0.3,
            water_growth_boost: 2.0,
            water_boost_duration: 5.0,
            min_scale: 0.2,
            max_scale: 1.5,
            burn_time: 10.0,
            burned_threshold: 0.7,
            extinguish_duration: 2.0,
            fire_spread_radius: 3.0,
            fire_spread_interval: 2.0,
            fire_spread_chance: 0.3,
            lifetime: 60.0,
            revive_lifetime_fraction: 0.2,
            mature_spawn_time: 20.0,
            spawn_chance: 0.5,
        }
    }
}

/// Water pools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTuning {
    pub heal_radius: f32,
    /// HP per second restored to water elementals in range of a full pool
    pub heal_rate: f32,
    pub boost_radius: f32,
    /// Multiplier applied once to the growth rate of each plant in range
    pub growth_multiplier: f32,
    /// Seconds a pool takes to fill or dry
    pub water_change_time: f32,
    pub lifetime: f32,
    pub refresh_lifetime_fraction: f32,
    /// Seconds a pool must stay full before its spawn roll
    pub spawn_time: f32,
    pub spawn_chance: f32,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            heal_radius: 5.0,
            heal_rate: 20.0,
            boost_radius: 5.0,
            growth_multiplier: 1.5,
            water_change_time: 10.0,
            lifetime: 60.0,
            refresh_lifetime_fraction: 0.2,
            spawn_time: 30.0,
            spawn_chance: 0.5,
        }
    }
}

/// Population watch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoomsdayTuning {
    pub enabled: bool,
    /// Seconds an element may stay extinct before the world ends
    pub countdown: f32,
    /// Whether the most populated spot gets a one-shot calamity
    pub calamity: bool,
}

impl Default for DoomsdayTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            countdown: 60.0,
            calamity: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = SimulationConfig::new();
        config.world_min = Vec2::new(10.0, 0.0);
        config.world_max = Vec2::new(0.0, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_duration_range() {
        let mut config = SimulationConfig::new();
        config.pets.idle_duration = StatRange::new(5.0, 2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            seed = 7
            [pets]
            max_time_in_one_state = 12.0
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.pets.max_time_in_one_state, 12.0);
        assert_eq!(config.pets.default_decay_rate, 2.0);
        assert_eq!(config.structures.max_level, 3);
    }
}
