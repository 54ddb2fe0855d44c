//! Water pools: filled by Water, dried by Nature, heal and water their surroundings

use ahash::AHashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::PoolTuning;
use crate::core::types::{ObjectId, SimRng, Vec2};
use crate::entity::element::ElementType;
use crate::interact::plant::Plant;
use crate::interact::{Interactable, InteractionContext, InteractionType, Interactor, InteractorGuard, Lifetime};
use crate::simulation::events::{SimulationEvent, SpawnCause, WorldEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolState {
    Dry,
    Drying,
    Filling,
    Full,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolTick {
    /// Full this tick: heal Water elementals and boost plants in range
    pub nourishing: bool,
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaterPool {
    pub id: ObjectId,
    pub position: Vec2,
    pub state: PoolState,
    /// Fill level in [0, 1]
    pub water_level: f32,
    change_progress: f32,
    spawn_timer: f32,
    spawn_rolled: bool,
    #[serde(skip)]
    boosted: AHashSet<ObjectId>,
    pub lifetime: Lifetime,
    guard: InteractorGuard,
    #[serde(skip)]
    tuning: PoolTuning,
}

impl WaterPool {
    pub fn new(id: ObjectId, position: Vec2, state: PoolState, tuning: PoolTuning) -> Self {
        let water_level = if state == PoolState::Full { 1.0 } else { 0.0 };
        Self {
            id,
            position,
            state,
            water_level,
            change_progress: 0.0,
            spawn_timer: 0.0,
            spawn_rolled: false,
            boosted: AHashSet::new(),
            lifetime: Lifetime::new(tuning.lifetime),
            guard: InteractorGuard::default(),
            tuning,
        }
    }

    pub fn heal_radius(&self) -> f32 {
        self.tuning.heal_radius
    }

    pub fn boost_radius(&self) -> f32 {
        self.tuning.boost_radius
    }

    /// Hit points restored to each Water elemental in range this tick
    pub fn heal_amount(&self, dt: f32) -> f32 {
        self.tuning.heal_rate * dt
    }

    pub fn has_boosted(&self, plant: ObjectId) -> bool {
        self.boosted.contains(&plant)
    }

    pub fn growth_multiplier(&self) -> f32 {
        self.tuning.growth_multiplier
    }

    /// Record a boost for `plant`; the multiplier to apply, once per plant
    pub fn boost(&mut self, plant: ObjectId) -> Option<f32> {
        self.boosted.insert(plant).then_some(self.tuning.growth_multiplier)
    }

    /// Undo every boost still applied to a surviving plant
    pub fn restore_boost(&self, plant: &mut Plant) {
        if self.boosted.contains(&plant.id) {
            plant.growth_rate /= self.tuning.growth_multiplier;
        }
    }

    pub fn boosted_plants(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.boosted.iter().copied()
    }

    pub fn tick(
        &mut self,
        dt: f32,
        rng: &mut SimRng,
        events: &mut Vec<SimulationEvent>,
        effects: &mut Vec<WorldEffect>,
    ) -> PoolTick {
        let mut outcome = PoolTick::default();
        match self.state {
            PoolState::Filling => {
                self.change_progress += dt;
                self.water_level = (self.change_progress / self.tuning.water_change_time).clamp(0.0, 1.0);
                if self.water_level >= 1.0 {
                    self.state = PoolState::Full;
                    self.change_progress = 0.0;
                    debug!(pool = self.id.0, "pool filled");
                    events.push(SimulationEvent::PoolFilled { object: self.id });
                }
            }
            PoolState::Drying => {
                self.change_progress += dt;
                self.water_level = 1.0 - (self.change_progress / self.tuning.water_change_time).clamp(0.0, 1.0);
                if self.change_progress >= self.tuning.water_change_time {
                    self.state = PoolState::Dry;
                    self.change_progress = 0.0;
                    self.water_level = 0.0;
                    self.spawn_rolled = false;
                    self.spawn_timer = 0.0;
                    debug!(pool = self.id.0, "pool dried");
                    events.push(SimulationEvent::PoolDried { object: self.id });
                }
            }
            PoolState::Full => {
                outcome.nourishing = true;
                self.spawn_timer += dt;
                if !self.spawn_rolled && self.spawn_timer >= self.tuning.spawn_time {
                    self.spawn_rolled = true;
                    if rng.gen::<f32>() < self.tuning.spawn_chance {
                        effects.push(WorldEffect::Spawn {
                            element: ElementType::Water,
                            position: self.position,
                            cause: SpawnCause::Pool,
                        });
                    }
                }
            }
            PoolState::Dry => {}
        }
        outcome.expired = self.lifetime.tick(dt);
        outcome
    }
}

impl Interactable for WaterPool {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn element(&self) -> ElementType {
        ElementType::Water
    }

    fn is_active(&self) -> bool {
        true
    }

    fn guard(&self) -> &InteractorGuard {
        &self.guard
    }

    fn guard_mut(&mut self) -> &mut InteractorGuard {
        &mut self.guard
    }

    fn can_interact(&self, agent: &Interactor<'_>, intent: InteractionType) -> bool {
        if intent != InteractionType::Contribute || !self.guard.is_free_for(agent.id) {
            return false;
        }
        match (self.state, agent.element) {
            (PoolState::Dry, ElementType::Water) => true,
            (PoolState::Full, ElementType::Water) => {
                self.lifetime.fraction_left() < self.tuning.refresh_lifetime_fraction
            }
            (PoolState::Full, ElementType::Nature) => true,
            _ => false,
        }
    }

    fn interact(
        &mut self,
        agent: &mut Interactor<'_>,
        _intent: InteractionType,
        _ctx: &mut InteractionContext<'_>,
    ) -> bool {
        match agent.element {
            ElementType::Water => {
                self.lifetime.refresh();
                if self.state == PoolState::Dry {
                    self.state = PoolState::Filling;
                    self.change_progress = 0.0;
                }
            }
            ElementType::Nature => {
                if self.state == PoolState::Full {
                    self.state = PoolState::Drying;
                    self.change_progress = 0.0;
                }
            }
            ElementType::Fire => {}
        }
        true
    }

    fn discovery_intent(&self, agent: &Interactor<'_>) -> Option<InteractionType> {
        (agent.tends_objects && self.can_interact(agent, InteractionType::Contribute))
            .then_some(InteractionType::Contribute)
    }
}
