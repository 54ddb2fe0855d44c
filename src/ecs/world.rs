//! World state: every agent, object and registry one simulation owns

use ahash::AHashMap;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::behavior::elemental::{ElementalStateKind, PolicyTable};
use crate::behavior::pet::{PetContext, PlayerCommand};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{AgentId, IdAllocator, ObjectId, PoiId, SimRng, Tick, Vec2};
use crate::entity::element::{ElementType, ElementalData};
use crate::entity::elemental::{ElementalArchetype, ElementalSnapshot};
use crate::entity::needs::NeedSet;
use crate::entity::pet::{PetArchetype, PetProfile, PetSnapshot};
use crate::entity::stats::{ElementalStats, ResourceLedger};
use crate::interact::{ElementalStructure, Plant, PoolState, ResourcePellet, WaterPool};
use crate::rules::transition::RuleTable;
use crate::simulation::events::SimulationEvent;
use crate::simulation::population::{GameOutcome, PopulationTracker};
use crate::world::locomotion::SimpleLocomotion;
use crate::world::nav::NavBounds;
use crate::world::objects::{WorldObject, WorldObjects};
use crate::world::poi::{PoiRegistry, PointOfInterest};
use crate::world::sensor::SpatialSensor;

/// Everything the presentation layer pulls after a tick
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: Tick,
    pub pets: Vec<PetSnapshot>,
    pub elementals: Vec<ElementalSnapshot>,
    pub objects: usize,
    pub population: [usize; 3],
    pub doom_active: bool,
    pub doom_remaining: f32,
    pub outcome: GameOutcome,
}

pub struct World {
    pub current_tick: Tick,
    pub config: SimulationConfig,
    pub rng: SimRng,
    pub ids: IdAllocator,
    pub nav: NavBounds,
    pub pets: PetArchetype,
    pub elementals: ElementalArchetype,
    pub objects: WorldObjects,
    pub pois: PoiRegistry,
    pub population: PopulationTracker,
    pub catalog: AHashMap<ElementType, ElementalData>,
    pub pet_rules: RuleTable,
    pub policies: PolicyTable,
    /// Events raised between ticks, handed out with the next tick's events
    pub(crate) pending: Vec<SimulationEvent>,
}

impl World {
    /// Stock rules, policies and elemental data; the RNG is seeded from `config.seed`
    pub fn new(config: SimulationConfig) -> Self {
        let catalog = ElementType::ALL
            .into_iter()
            .map(|e| (e, ElementalData::standard(e)))
            .collect();
        Self {
            current_tick: 0,
            rng: SimRng::seed_from_u64(config.seed),
            ids: IdAllocator::new(),
            nav: NavBounds::new(config.world_min, config.world_max),
            pets: PetArchetype::new(),
            elementals: ElementalArchetype::new(),
            objects: WorldObjects::new(),
            pois: PoiRegistry::new(),
            population: PopulationTracker::new(config.doomsday.clone()),
            catalog,
            pet_rules: RuleTable::standard(),
            policies: PolicyTable::default(),
            pending: Vec::new(),
            config,
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.pet_rules = rules;
        self
    }

    pub fn with_policies(mut self, policies: PolicyTable) -> Self {
        self.policies = policies;
        self
    }

    /// Later entries for the same element replace earlier ones
    pub fn with_elementals(mut self, data: impl IntoIterator<Item = ElementalData>) -> Self {
        for d in data {
            self.catalog.insert(d.element, d);
        }
        self
    }

    pub fn with_nav(mut self, nav: NavBounds) -> Self {
        self.nav = nav;
        self
    }

    /// Read-only view of where everything stands right now
    pub fn sensor_snapshot(&self) -> SpatialSensor {
        let mut sensor = SpatialSensor::new(self.nav.clone(), self.config.grid_cell_size);
        for i in 0..self.pets.len() {
            sensor.insert_pet(self.pets.ids[i], self.pets.position(i));
        }
        for i in 0..self.elementals.len() {
            if self.elementals.alive[i] {
                sensor.insert_elemental(self.elementals.view(i));
            }
        }
        for object in self.objects.iter() {
            sensor.insert_object(object.id(), object.position());
        }
        sensor
    }

    pub fn spawn_pet(&mut self, profile: &PetProfile) -> AgentId {
        let tuning = &self.config.pets;
        let needs = NeedSet::with_overrides(tuning.default_need_value, tuning.default_decay_rate, &profile.needs);
        let motor = SimpleLocomotion::new(profile.position, tuning.move_speed, tuning.stopping_distance);

        let id = self.ids.agent();
        self.pets.spawn(id, profile.name.clone(), needs, Box::new(motor));
        info!(pet = id.0, name = %profile.name, "pet spawned");
        id
    }

    /// Roll a fresh elemental from the catalog entry for `element`
    pub fn spawn_elemental(&mut self, element: ElementType, position: Vec2) -> Result<AgentId> {
        let data = self
            .catalog
            .get(&element)
            .ok_or_else(|| SimError::UnknownElemental(element.to_string()))?;

        let stats = ElementalStats::roll(data, &mut self.rng);
        let ledger = ResourceLedger::new(
            element,
            data.carry_capacity.sample(&mut self.rng),
            data.gather_rate.sample(&mut self.rng),
        );
        let motor = SimpleLocomotion::new(position, stats.speed, self.config.elementals.stopping_distance);
        let name = data.name.clone();

        let id = self.ids.agent();
        self.elementals.spawn(id, name, element, stats, ledger, Box::new(motor));
        info!(agent = id.0, %element, x = position.x, y = position.y, "elemental spawned");
        Ok(id)
    }

    pub fn add_poi(&mut self, tag: &str, position: Vec2, interaction_radius: f32) -> PoiId {
        let id = self.ids.poi();
        self.pois.add(PointOfInterest {
            id,
            tag: tag.to_string(),
            position,
            interaction_radius,
            active: true,
        });
        id
    }

    pub fn add_structure(&mut self, element: ElementType, position: Vec2, owner: Option<AgentId>) -> ObjectId {
        let id = self.ids.object();
        let tuning = self.config.structures.clone();
        self.objects
            .add(WorldObject::Structure(ElementalStructure::new(id, element, position, owner, tuning)));
        id
    }

    pub fn add_plant(&mut self, position: Vec2) -> ObjectId {
        let id = self.ids.object();
        let tuning = self.config.plants.clone();
        self.objects.add(WorldObject::Plant(Plant::new(id, position, tuning)));
        id
    }

    pub fn add_pool(&mut self, position: Vec2, state: PoolState) -> ObjectId {
        let id = self.ids.object();
        let tuning = self.config.pools.clone();
        self.objects.add(WorldObject::Pool(WaterPool::new(id, position, state, tuning)));
        id
    }

    pub fn add_pellet(&mut self, element: ElementType, position: Vec2, amount: f32) -> ObjectId {
        let id = self.ids.object();
        self.objects
            .add(WorldObject::Pellet(ResourcePellet::new(id, element, position, amount)));
        id
    }

    /// Send a pet to `destination`, optionally to use the POI tagged `target_tag` there
    pub fn issue_command(&mut self, pet: AgentId, destination: Vec2, target_tag: Option<&str>) -> Result<()> {
        let index = self.pets.index_of(pet).ok_or(SimError::AgentNotFound(pet))?;
        let sensor = self.sensor_snapshot();
        let command = PlayerCommand {
            destination,
            target_tag: target_tag.map(str::to_string),
        };

        let (mut agent, machine) = self.pets.agent_mut(index);
        let mut ctx = PetContext {
            dt: self.config.tick_seconds,
            pois: &self.pois,
            sensor: &sensor,
            rules: &self.pet_rules,
            tuning: &self.config.pets,
            rng: &mut self.rng,
            events: &mut self.pending,
        };
        machine.issue_command(command, &mut agent, &mut ctx);
        Ok(())
    }

    pub fn snapshots(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.current_tick,
            pets: (0..self.pets.len()).map(|i| self.pets.snapshot(i)).collect(),
            elementals: (0..self.elementals.len())
                .filter(|&i| self.elementals.alive[i])
                .map(|i| self.elementals.snapshot(i))
                .collect(),
            objects: self.objects.len(),
            population: self.population.counts,
            doom_active: self.population.doom_active,
            doom_remaining: self.population.doom_remaining,
            outcome: self.population.outcome,
        }
    }

    pub fn elemental_state(&self, id: AgentId) -> Option<ElementalStateKind> {
        self.elementals.index_of(id).map(|i| self.elementals.machines[i].kind())
    }

    pub fn is_over(&self) -> bool {
        self.population.is_over()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
