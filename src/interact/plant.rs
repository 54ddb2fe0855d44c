//! Plants: grow, burn, get watered, get cleared and replanted

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::core::config::PlantTuning;
use crate::core::types::{ObjectId, SimRng, Vec2};
use crate::entity::element::ElementType;
use crate::interact::{Interactable, InteractionContext, InteractionType, Interactor, InteractorGuard, Lifetime};
use crate::simulation::events::{SimulationEvent, SpawnCause, WorldEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlantState {
    Seedling,
    Growing,
    Mature,
    Burning,
    Burned,
}

/// What the registry has to act on after a plant's tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlantTick {
    /// Time to try spreading fire to neighbors
    pub spread_fire: bool,
    pub expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plant {
    pub id: ObjectId,
    pub position: Vec2,
    pub state: PlantState,
    pub growth_progress: f32,
    /// Shared multiplier; water pools scale it up and restore it on despawn
    pub growth_rate: f32,
    pub fire_progress: f32,
    pub scale: f32,
    pub on_fire: bool,
    pub watered: bool,
    /// Fire particle intensity, ramps down while extinguishing
    pub fire_emission: f32,
    water_boost_left: f32,
    extinguish_elapsed: Option<f32>,
    spread_timer: f32,
    time_mature: f32,
    spawn_rolled: bool,
    pub lifetime: Lifetime,
    guard: InteractorGuard,
    #[serde(skip)]
    tuning: PlantTuning,
}

impl Plant {
    pub fn new(id: ObjectId, position: Vec2, tuning: PlantTuning) -> Self {
        Self {
            id,
            position,
            state: PlantState::Seedling,
            growth_progress: 0.0,
            growth_rate: 1.0,
            fire_progress: 0.0,
            scale: tuning.min_scale,
            on_fire: false,
            watered: false,
            fire_emission: 0.0,
            water_boost_left: 0.0,
            extinguish_elapsed: None,
            spread_timer: 0.0,
            time_mature: 0.0,
            spawn_rolled: false,
            lifetime: Lifetime::new(tuning.lifetime),
            guard: InteractorGuard::default(),
            tuning,
        }
    }

    pub fn growth_fraction(&self) -> f32 {
        (self.growth_progress / self.tuning.base_growth_time).clamp(0.0, 1.0)
    }

    pub fn is_extinguishing(&self) -> bool {
        self.extinguish_elapsed.is_some()
    }

    pub fn is_burnable(&self) -> bool {
        !self.on_fire && self.state != PlantState::Burned
    }

    fn effective_growth_rate(&self) -> f32 {
        if self.water_boost_left > 0.0 {
            self.growth_rate * self.tuning.water_growth_boost
        } else {
            self.growth_rate
        }
    }

    /// Set the plant alight; false when it already burns or has burned down
    pub fn ignite(&mut self, events: &mut Vec<SimulationEvent>) -> bool {
        if !self.is_burnable() {
            return false;
        }
        self.on_fire = true;
        self.state = PlantState::Burning;
        self.fire_emission = 1.0;
        self.spread_timer = 0.0;
        self.water_boost_left = 0.0;
        debug!(plant = self.id.0, "plant ignited");
        events.push(SimulationEvent::PlantIgnited { object: self.id });
        true
    }

    fn start_extinguish(&mut self) {
        if self.extinguish_elapsed.is_none() {
            self.extinguish_elapsed = Some(0.0);
        }
    }

    fn finish_extinguish(&mut self, events: &mut Vec<SimulationEvent>) {
        self.extinguish_elapsed = None;
        self.on_fire = false;
        self.fire_emission = 0.0;
        if self.fire_progress >= self.tuning.burned_threshold * self.tuning.burn_time {
            self.burn_down(events);
        } else {
            self.state = if self.growth_progress >= self.tuning.base_growth_time {
                PlantState::Mature
            } else {
                PlantState::Growing
            };
            events.push(SimulationEvent::PlantExtinguished { object: self.id });
        }
    }

    fn burn_down(&mut self, events: &mut Vec<SimulationEvent>) {
        self.on_fire = false;
        self.fire_emission = 0.0;
        self.state = PlantState::Burned;
        self.scale = self.tuning.min_scale;
        debug!(plant = self.id.0, "plant burned down");
        events.push(SimulationEvent::PlantBurned { object: self.id });
    }

    fn replant(&mut self, events: &mut Vec<SimulationEvent>) {
        self.state = PlantState::Seedling;
        self.growth_progress = 0.0;
        self.fire_progress = 0.0;
        self.scale = self.tuning.min_scale;
        self.on_fire = false;
        self.watered = false;
        self.fire_emission = 0.0;
        self.water_boost_left = 0.0;
        self.extinguish_elapsed = None;
        self.time_mature = 0.0;
        self.spawn_rolled = false;
        self.lifetime.refresh();
        events.push(SimulationEvent::PlantRevived { object: self.id });
    }

    fn grow(&mut self, dt: f32) {
        self.growth_progress += dt * self.effective_growth_rate();
        let fraction = self.growth_fraction();

        if self.state == PlantState::Seedling && fraction >= self.tuning.growing_threshold {
            self.state = PlantState::Growing;
            self.watered = false;
        }
        if self.state == PlantState::Growing && fraction >= 1.0 {
            self.state = PlantState::Mature;
            self.watered = false;
            self.time_mature = 0.0;
        }
        self.scale = lerp(self.tuning.min_scale, self.tuning.max_scale, fraction);
    }

    pub fn tick(
        &mut self,
        dt: f32,
        rng: &mut SimRng,
        events: &mut Vec<SimulationEvent>,
        effects: &mut Vec<WorldEffect>,
    ) -> PlantTick {
        let mut outcome = PlantTick::default();

        if self.water_boost_left > 0.0 {
            self.water_boost_left = (self.water_boost_left - dt).max(0.0);
        }

        if let Some(elapsed) = self.extinguish_elapsed.as_mut() {
            *elapsed += dt;
            let t = (*elapsed / self.tuning.extinguish_duration).clamp(0.0, 1.0);
            self.fire_emission = lerp(1.0, 0.0, t);
            if t >= 1.0 {
                self.finish_extinguish(events);
            }
        } else if self.on_fire {
            self.fire_progress += dt;
            let t = (self.fire_progress / self.tuning.burn_time).clamp(0.0, 1.0);
            let grown = lerp(self.tuning.min_scale, self.tuning.max_scale, self.growth_fraction());
            self.scale = lerp(grown, self.tuning.min_scale, t);

            self.spread_timer -= dt;
            if self.spread_timer <= 0.0 {
                self.spread_timer = self.tuning.fire_spread_interval;
                outcome.spread_fire = true;
            }

            if self.fire_progress >= self.tuning.burn_time {
                self.burn_down(events);
            }
        } else {
            match self.state {
                PlantState::Seedling | PlantState::Growing => self.grow(dt),
                PlantState::Mature => {
                    self.time_mature += dt;
                    if !self.spawn_rolled && self.time_mature >= self.tuning.mature_spawn_time {
                        self.spawn_rolled = true;
                        if rng.gen::<f32>() < self.tuning.spawn_chance {
                            effects.push(WorldEffect::Spawn {
                                element: ElementType::Nature,
                                position: self.position,
                                cause: SpawnCause::Plant,
                            });
                        }
                    }
                }
                PlantState::Burning | PlantState::Burned => {}
            }
        }

        outcome.expired = self.lifetime.tick(dt);
        outcome
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Interactable for Plant {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn element(&self) -> ElementType {
        ElementType::Nature
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
        match self.state {
            PlantState::Seedling | PlantState::Growing | PlantState::Mature => match agent.element {
                ElementType::Water => !self.watered,
                ElementType::Fire => !self.on_fire,
                ElementType::Nature => self.lifetime.fraction_left() < self.tuning.revive_lifetime_fraction,
            },
            PlantState::Burning => agent.element == ElementType::Water && !self.is_extinguishing(),
            PlantState::Burned => agent.element == ElementType::Nature,
        }
    }

    fn interact(
        &mut self,
        agent: &mut Interactor<'_>,
        _intent: InteractionType,
        ctx: &mut InteractionContext<'_>,
    ) -> bool {
        match agent.element {
            ElementType::Water => {
                if self.on_fire {
                    self.start_extinguish();
                } else {
                    self.water_boost_left = self.tuning.water_boost_duration;
                    self.watered = true;
                }
            }
            ElementType::Fire => {
                self.ignite(ctx.events);
            }
            ElementType::Nature => {
                if self.state == PlantState::Burned {
                    self.replant(ctx.events);
                } else {
                    self.lifetime.refresh();
                }
            }
        }
        true
    }

    fn discovery_intent(&self, agent: &Interactor<'_>) -> Option<InteractionType> {
        (agent.tends_objects && self.can_interact(agent, InteractionType::Contribute))
            .then_some(InteractionType::Contribute)
    }
}
