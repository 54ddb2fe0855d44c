//! Load simulation data from TOML files
//!
//! Every file is optional: a missing file keeps the built-in defaults, a
//! present one must parse and validate.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::behavior::elemental::PolicyTable;
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Vec2;
use crate::ecs::world::World;
use crate::entity::element::{ElementType, ElementalData};
use crate::entity::pet::PetProfile;
use crate::interact::PoolState;
use crate::rules::transition::RuleTable;

pub const SIMULATION_FILE: &str = "simulation.toml";
pub const PET_RULES_FILE: &str = "pet_rules.toml";
pub const PETS_FILE: &str = "pets.toml";
pub const ELEMENTALS_FILE: &str = "elementals.toml";

/// A point of interest as written in `pets.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoiSpec {
    pub tag: String,
    pub position: Vec2,
    #[serde(default = "default_poi_radius")]
    pub radius: f32,
}

fn default_poi_radius() -> f32 {
    1.5
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PetsFile {
    pub pets: Vec<PetProfile>,
    pub pois: Vec<PoiSpec>,
}

/// An elemental placed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnSpec {
    pub element: ElementType,
    pub position: Vec2,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

/// A world object placed at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ObjectSpec {
    Structure { element: ElementType, position: Vec2 },
    Plant { position: Vec2 },
    Pool { position: Vec2, #[serde(default = "default_pool_state")] state: PoolState },
    Pellet { element: ElementType, position: Vec2, amount: f32 },
}

fn default_pool_state() -> PoolState {
    PoolState::Full
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalsFile {
    pub elementals: Vec<ElementalData>,
    pub policies: PolicyTable,
    pub spawns: Vec<SpawnSpec>,
    pub objects: Vec<ObjectSpec>,
}

/// Everything under one data directory
#[derive(Debug, Clone, Default)]
pub struct DataSet {
    pub config: SimulationConfig,
    pub rules: RuleTable,
    pub pets: PetsFile,
    pub elementals: ElementalsFile,
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let value = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded data file");
    Ok(value)
}

pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let config: SimulationConfig = read_toml(path)?;
    config.validate().map_err(SimError::InvalidConfig)?;
    Ok(config)
}

pub fn load_rules(path: &Path) -> Result<RuleTable> {
    let rules: RuleTable = read_toml(path)?;
    rules.validate().map_err(|errors| SimError::InvalidRule {
        rule: path.display().to_string(),
        reason: errors.join("; "),
    })?;
    Ok(rules)
}

pub fn load_pets(path: &Path) -> Result<PetsFile> {
    let pets: PetsFile = read_toml(path)?;
    for poi in &pets.pois {
        if poi.radius <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "POI '{}' needs a positive radius",
                poi.tag
            )));
        }
    }
    Ok(pets)
}

impl ElementalsFile {
    pub fn validate(&self) -> Vec<String> {
        let mut errors: Vec<String> = self.elementals.iter().flat_map(|d| d.validate()).collect();
        errors.extend(self.policies.validate());
        for object in &self.objects {
            if let ObjectSpec::Pellet { amount, .. } = object {
                if *amount <= 0.0 {
                    errors.push(format!("pellet amount {} must be positive", amount));
                }
            }
        }
        errors
    }
}

pub fn load_elementals(path: &Path) -> Result<ElementalsFile> {
    let file: ElementalsFile = read_toml(path)?;
    let errors = file.validate();
    if !errors.is_empty() {
        return Err(SimError::InvalidConfig(errors.join("; ")));
    }
    Ok(file)
}

/// Load whichever of the four data files exist under `dir`
pub fn load_data_dir(dir: &Path) -> Result<DataSet> {
    let mut data = DataSet {
        rules: RuleTable::standard(),
        ..DataSet::default()
    };

    let path = dir.join(SIMULATION_FILE);
    if path.exists() {
        data.config = load_config(&path)?;
    }
    let path = dir.join(PET_RULES_FILE);
    if path.exists() {
        data.rules = load_rules(&path)?;
    }
    let path = dir.join(PETS_FILE);
    if path.exists() {
        data.pets = load_pets(&path)?;
    }
    let path = dir.join(ELEMENTALS_FILE);
    if path.exists() {
        data.elementals = load_elementals(&path)?;
    }

    info!(
        dir = %dir.display(),
        pets = data.pets.pets.len(),
        spawns = data.elementals.spawns.len(),
        objects = data.elementals.objects.len(),
        "data loaded"
    );
    Ok(data)
}

impl DataSet {
    /// Build a world and place the initial population
    pub fn into_world(self) -> Result<World> {
        let mut world = World::new(self.config)
            .with_rules(self.rules)
            .with_policies(self.elementals.policies)
            .with_elementals(self.elementals.elementals);

        for poi in &self.pets.pois {
            world.add_poi(&poi.tag, poi.position, poi.radius);
        }
        for profile in &self.pets.pets {
            world.spawn_pet(profile);
        }
        for spawn in &self.elementals.spawns {
            for _ in 0..spawn.count {
                world.spawn_elemental(spawn.element, spawn.position)?;
            }
        }
        for object in &self.elementals.objects {
            match *object {
                ObjectSpec::Structure { element, position } => {
                    world.add_structure(element, position, None);
                }
                ObjectSpec::Plant { position } => {
                    world.add_plant(position);
                }
                ObjectSpec::Pool { position, state } => {
                    world.add_pool(position, state);
                }
                ObjectSpec::Pellet { element, position, amount } => {
                    world.add_pellet(element, position, amount);
                }
            }
        }
        Ok(world)
    }
}
