//! World objects storage, queries and per-tick upkeep

use ahash::AHashMap;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::core::config::SimulationConfig;
use crate::core::types::{ObjectId, SimRng, Vec2};
use crate::interact::{ElementalStructure, Interactable, Plant, ResourcePellet, WaterPool};
use crate::entity::element::ElementType;
use crate::simulation::events::{SimulationEvent, WorldEffect};
use crate::world::sensor::{EntityRef, QueryFilter, WorldSensor};

/// Anything elementals can walk up to and use
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum WorldObject {
    Structure(ElementalStructure),
    Plant(Plant),
    Pool(WaterPool),
    Pellet(ResourcePellet),
}

impl WorldObject {
    pub fn id(&self) -> ObjectId {
        match self {
            WorldObject::Structure(s) => s.id,
            WorldObject::Plant(p) => p.id,
            WorldObject::Pool(p) => p.id,
            WorldObject::Pellet(p) => p.id,
        }
    }

    pub fn interactable(&self) -> &dyn Interactable {
        match self {
            WorldObject::Structure(s) => s,
            WorldObject::Plant(p) => p,
            WorldObject::Pool(p) => p,
            WorldObject::Pellet(p) => p,
        }
    }

    pub fn interactable_mut(&mut self) -> &mut dyn Interactable {
        match self {
            WorldObject::Structure(s) => s,
            WorldObject::Plant(p) => p,
            WorldObject::Pool(p) => p,
            WorldObject::Pellet(p) => p,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.interactable().position()
    }
}

/// Outlets the object upkeep writes into
pub struct ObjectTickContext<'a> {
    pub dt: f32,
    pub config: &'a SimulationConfig,
    pub sensor: &'a dyn WorldSensor,
    pub rng: &'a mut SimRng,
    pub events: &'a mut Vec<SimulationEvent>,
    pub effects: &'a mut Vec<WorldEffect>,
}

/// Storage for all world objects (structures, plants, pools, pellets)
#[derive(Debug, Default)]
pub struct WorldObjects {
    /// All objects by ID
    objects: AHashMap<ObjectId, WorldObject>,
    /// Insertion order, for deterministic iteration
    order: Vec<ObjectId>,
}

impl WorldObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a world object
    pub fn add(&mut self, object: WorldObject) {
        let id = object.id();
        if self.objects.insert(id, object).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&WorldObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut WorldObject> {
        self.objects.get_mut(&id)
    }

    /// Remove an object; pools hand their plant boosts back first
    pub fn remove(&mut self, id: ObjectId) -> Option<WorldObject> {
        let removed = self.objects.remove(&id)?;
        self.order.retain(|o| *o != id);
        if let WorldObject::Pool(pool) = &removed {
            for plant_id in pool.boosted_plants() {
                if let Some(WorldObject::Plant(plant)) = self.objects.get_mut(&plant_id) {
                    pool.restore_boost(plant);
                }
            }
        }
        Some(removed)
    }

    /// All objects within radius of a point, in insertion order
    pub fn get_in_radius(&self, center: Vec2, radius: f32) -> Vec<&WorldObject> {
        self.iter()
            .filter(|obj| obj.position().distance(&center) <= radius)
            .collect()
    }

    pub fn any_structure_within(&self, center: Vec2, radius: f32) -> bool {
        self.get_in_radius(center, radius)
            .iter()
            .any(|obj| matches!(obj, WorldObject::Structure(_)))
    }

    /// Iterate over all objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &WorldObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Advance every object, spread fire, apply pool upkeep, then despawn
    pub fn tick(&mut self, ctx: &mut ObjectTickContext<'_>) {
        let mut burning = Vec::new();
        let mut nourishing = Vec::new();
        let mut expired = Vec::new();

        for id in self.order.clone() {
            let Some(object) = self.objects.get_mut(&id) else {
                continue;
            };
            match object {
                WorldObject::Structure(s) => {
                    if s.tick(ctx.dt) {
                        expired.push(id);
                    }
                }
                WorldObject::Plant(p) => {
                    let outcome = p.tick(ctx.dt, ctx.rng, ctx.events, ctx.effects);
                    if outcome.spread_fire {
                        burning.push(id);
                    }
                    if outcome.expired {
                        expired.push(id);
                    }
                }
                WorldObject::Pool(p) => {
                    let outcome = p.tick(ctx.dt, ctx.rng, ctx.events, ctx.effects);
                    if outcome.nourishing {
                        nourishing.push(id);
                    }
                    if outcome.expired {
                        expired.push(id);
                    }
                }
                WorldObject::Pellet(p) => {
                    if p.consumed {
                        expired.push(id);
                    }
                }
            }
        }

        for id in burning {
            self.spread_fire(id, ctx);
        }
        for id in nourishing {
            self.nourish(id, ctx);
        }
        for id in expired {
            if self.remove(id).is_some() {
                debug!(object = id.0, "object despawned");
                ctx.events.push(SimulationEvent::ObjectDespawned { object: id });
            }
        }
    }

    fn spread_fire(&mut self, source: ObjectId, ctx: &mut ObjectTickContext<'_>) {
        let Some(origin) = self.get(source).map(WorldObject::position) else {
            return;
        };
        let (radius, chance) = (ctx.config.plants.fire_spread_radius, ctx.config.plants.fire_spread_chance);
        let neighbors: Vec<ObjectId> = self
            .get_in_radius(origin, radius)
            .into_iter()
            .filter_map(|obj| match obj {
                WorldObject::Plant(p) if p.id != source && p.is_burnable() => Some(p.id),
                _ => None,
            })
            .collect();

        for id in neighbors {
            if ctx.rng.gen::<f32>() >= chance {
                continue;
            }
            if let Some(WorldObject::Plant(plant)) = self.objects.get_mut(&id) {
                plant.ignite(ctx.events);
            }
        }
    }

    fn nourish(&mut self, pool_id: ObjectId, ctx: &mut ObjectTickContext<'_>) {
        let Some(WorldObject::Pool(pool)) = self.objects.get(&pool_id) else {
            return;
        };
        let (position, heal_radius, boost_radius) = (pool.position, pool.heal_radius(), pool.boost_radius());
        let amount = pool.heal_amount(ctx.dt);

        for entity in ctx.sensor.query_nearby(position, heal_radius, QueryFilter::Elementals) {
            let EntityRef::Elemental(agent) = entity else {
                continue;
            };
            let Some(view) = ctx.sensor.elemental(agent) else {
                continue;
            };
            if view.element == ElementType::Water && view.hp < view.max_hp {
                ctx.effects.push(WorldEffect::Heal { agent, amount });
            }
        }

        let plants: Vec<ObjectId> = self
            .get_in_radius(position, boost_radius)
            .into_iter()
            .filter_map(|obj| match obj {
                WorldObject::Plant(p) if !pool.has_boosted(p.id) => Some(p.id),
                _ => None,
            })
            .collect();

        for plant_id in plants {
            let multiplier = match self.objects.get_mut(&pool_id) {
                Some(WorldObject::Pool(pool)) => pool.boost(plant_id),
                _ => None,
            };
            if let (Some(multiplier), Some(WorldObject::Plant(plant))) = (multiplier, self.objects.get_mut(&plant_id)) {
                plant.growth_rate *= multiplier;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{PlantTuning, PoolTuning, StructureTuning};
    use crate::core::types::AgentId;
    use crate::interact::PoolState;
    use crate::world::nav::NavBounds;
    use crate::world::sensor::{AgentView, SpatialSensor};
    use rand::SeedableRng;

    fn sensor() -> SpatialSensor {
        SpatialSensor::new(NavBounds::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0)), 5.0)
    }

    fn plant(id: u32, at: Vec2) -> WorldObject {
        WorldObject::Plant(Plant::new(ObjectId(id), at, PlantTuning::default()))
    }

    fn run_tick(objects: &mut WorldObjects, config: &SimulationConfig, sensor: &SpatialSensor, rng: &mut SimRng) -> (Vec<SimulationEvent>, Vec<WorldEffect>) {
        let mut events = Vec::new();
        let mut effects = Vec::new();
        let mut ctx = ObjectTickContext {
            dt: 0.1,
            config,
            sensor,
            rng,
            events: &mut events,
            effects: &mut effects,
        };
        objects.tick(&mut ctx);
        (events, effects)
    }

    #[test]
    fn test_add_get_and_remove() {
        let mut objects = WorldObjects::new();
        objects.add(plant(1, Vec2::new(10.0, 20.0)));
        objects.add(WorldObject::Structure(ElementalStructure::new(
            ObjectId(2),
            ElementType::Fire,
            Vec2::ZERO,
            Some(AgentId(1)),
            StructureTuning::default(),
        )));
        assert_eq!(objects.len(), 2);
        assert!(matches!(objects.get(ObjectId(1)), Some(WorldObject::Plant(_))));

        objects.remove(ObjectId(1));
        assert!(objects.get(ObjectId(1)).is_none());
        assert_eq!(objects.iter().count(), 1);
    }

    #[test]
    fn test_get_in_radius_keeps_insertion_order() {
        let mut objects = WorldObjects::new();
        objects.add(plant(3, Vec2::new(1.0, 0.0)));
        objects.add(plant(1, Vec2::new(0.5, 0.0)));
        objects.add(plant(2, Vec2::new(40.0, 0.0)));

        let ids: Vec<ObjectId> = objects.get_in_radius(Vec2::ZERO, 5.0).iter().map(|o| o.id()).collect();
        assert_eq!(ids, vec![ObjectId(3), ObjectId(1)]);
        assert!(!objects.any_structure_within(Vec2::ZERO, 5.0));
    }

    #[test]
    fn test_fire_spreads_to_close_plants_only() {
        let mut config = SimulationConfig::default();
        config.plants.fire_spread_chance = 1.0;
        let mut objects = WorldObjects::new();
        objects.add(plant(1, Vec2::ZERO));
        objects.add(plant(2, Vec2::new(2.0, 0.0)));
        objects.add(plant(3, Vec2::new(20.0, 0.0)));
        let mut events = Vec::new();
        if let Some(WorldObject::Plant(p)) = objects.get_mut(ObjectId(1)) {
            p.ignite(&mut events);
        }

        let mut rng = SimRng::seed_from_u64(3);
        let sensor = sensor();
        run_tick(&mut objects, &config, &sensor, &mut rng);

        let on_fire = |objects: &WorldObjects, id| match objects.get(ObjectId(id)) {
            Some(WorldObject::Plant(p)) => p.on_fire,
            _ => false,
        };
        assert!(on_fire(&objects, 2));
        assert!(!on_fire(&objects, 3));
    }

    #[test]
    fn test_full_pool_heals_water_and_boosts_plants_once() {
        let config = SimulationConfig::default();
        let mut objects = WorldObjects::new();
        objects.add(WorldObject::Pool(WaterPool::new(ObjectId(1), Vec2::ZERO, PoolState::Full, PoolTuning::default())));
        objects.add(plant(2, Vec2::new(2.0, 0.0)));

        let mut sensor = sensor();
        for (id, element) in [(10, ElementType::Water), (11, ElementType::Fire)] {
            sensor.insert_elemental(AgentView {
                id: AgentId(id),
                element,
                position: Vec2::new(1.0, 1.0),
                hp: 50.0,
                max_hp: 100.0,
                damage: 5.0,
                stamina_pct: 1.0,
            });
        }

        let mut rng = SimRng::seed_from_u64(3);
        let (_, effects) = run_tick(&mut objects, &config, &sensor, &mut rng);
        assert_eq!(effects, vec![WorldEffect::Heal { agent: AgentId(10), amount: 2.0 }]);
        run_tick(&mut objects, &config, &sensor, &mut rng);

        let rate = |objects: &WorldObjects| match objects.get(ObjectId(2)) {
            Some(WorldObject::Plant(p)) => p.growth_rate,
            _ => 0.0,
        };
        assert!((rate(&objects) - 1.5).abs() < 1e-6);

        objects.remove(ObjectId(1));
        assert!((rate(&objects) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_consumed_pellet_is_despawned() {
        let config = SimulationConfig::default();
        let mut objects = WorldObjects::new();
        let mut pellet = ResourcePellet::new(ObjectId(5), ElementType::Water, Vec2::ZERO, 3.0);
        pellet.consumed = true;
        objects.add(WorldObject::Pellet(pellet));

        let mut rng = SimRng::seed_from_u64(3);
        let sensor = sensor();
        let (events, _) = run_tick(&mut objects, &config, &sensor, &mut rng);
        assert!(objects.is_empty());
        assert_eq!(events, vec![SimulationEvent::ObjectDespawned { object: ObjectId(5) }]);
    }
}
