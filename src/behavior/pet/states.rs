//! Pet states and their per-tick activity

use serde::{Deserialize, Serialize};

use crate::behavior::pet::{PetAgent, PetContext, PetStateKind};
use crate::core::types::{PoiId, Vec2};
use crate::entity::needs::NeedKind;
use crate::world::poi::{self, PointOfInterest};

/// A player's order: walk here, then maybe use what is there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub destination: Vec2,
    /// Tag of the POI at the destination, if any
    pub target_tag: Option<String>,
}

/// What happens when a state finished and no random rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Start the same state over with fresh progress
    Reenter,
    Switch(PetStateKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOutcome {
    Continue,
    Change(PetStateKind),
    /// Primary activity done; ask the random tier
    Done(Fallback),
}

#[derive(Debug, Clone, Default)]
pub struct IdleState {
    pub duration: f32,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct WanderState {
    pub duration: f32,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct SeekFoodState {
    pub food: Option<PoiId>,
}

#[derive(Debug, Clone, Default)]
pub struct SleepState {
    pub bed: Option<PoiId>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanState {
    pub elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PlayState {
    pub toy: Option<PoiId>,
}

#[derive(Debug, Clone, Default)]
pub struct InteractState {
    pub elapsed: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ObeyingState {
    pub command: Option<PlayerCommand>,
}

#[derive(Debug, Clone)]
pub enum PetState {
    Idle(IdleState),
    Wander(WanderState),
    SeekFood(SeekFoodState),
    Sleep(SleepState),
    Clean(CleanState),
    Play(PlayState),
    Interact(InteractState),
    Obeying(ObeyingState),
}

fn active_poi<'a>(ctx: &'a PetContext<'_>, id: Option<PoiId>) -> Option<&'a PointOfInterest> {
    id.and_then(|id| ctx.pois.get(id)).filter(|p| p.active)
}

/// Head for the nearest POI with `tag`; `None` when there is none
fn walk_to_nearest(pet: &mut PetAgent<'_>, ctx: &PetContext<'_>, tag: &str) -> Option<PoiId> {
    let poi = ctx.pois.nearest(tag, pet.motor.position())?;
    pet.motor.set_destination(poi.position);
    Some(poi.id)
}

fn reached(pet: &PetAgent<'_>, poi: &PointOfInterest) -> bool {
    poi.in_reach(pet.motor.position()) || pet.motor.has_arrived()
}

impl PetState {
    /// Fresh, not yet entered state of `kind`
    pub fn new(kind: PetStateKind) -> Self {
        match kind {
            PetStateKind::Idle => PetState::Idle(IdleState::default()),
            PetStateKind::Wander => PetState::Wander(WanderState::default()),
            PetStateKind::SeekFood => PetState::SeekFood(SeekFoodState::default()),
            PetStateKind::Sleep => PetState::Sleep(SleepState::default()),
            PetStateKind::Clean => PetState::Clean(CleanState::default()),
            PetStateKind::Play => PetState::Play(PlayState::default()),
            PetStateKind::Interact => PetState::Interact(InteractState::default()),
            PetStateKind::Obeying => PetState::Obeying(ObeyingState::default()),
        }
    }

    pub fn kind(&self) -> PetStateKind {
        match self {
            PetState::Idle(_) => PetStateKind::Idle,
            PetState::Wander(_) => PetStateKind::Wander,
            PetState::SeekFood(_) => PetStateKind::SeekFood,
            PetState::Sleep(_) => PetStateKind::Sleep,
            PetState::Clean(_) => PetStateKind::Clean,
            PetState::Play(_) => PetStateKind::Play,
            PetState::Interact(_) => PetStateKind::Interact,
            PetState::Obeying(_) => PetStateKind::Obeying,
        }
    }

    /// Returns a redirect when the state cannot start here
    pub fn enter(&mut self, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) -> Option<PetStateKind> {
        let tuning = ctx.tuning;
        match self {
            PetState::Idle(s) => {
                pet.motor.stop();
                s.elapsed = 0.0;
                s.duration = tuning.idle_duration.sample(ctx.rng);
                None
            }
            PetState::Wander(s) => {
                s.elapsed = 0.0;
                s.duration = tuning.wander_duration.sample(ctx.rng);
                let here = pet.motor.position();
                let target = ctx
                    .sensor
                    .sample_navigable_point(here, tuning.wander_radius, ctx.rng)
                    .unwrap_or(here);
                pet.motor.set_destination(target);
                None
            }
            PetState::SeekFood(s) => {
                s.food = walk_to_nearest(pet, ctx, poi::FOOD);
                s.food.is_none().then_some(PetStateKind::Idle)
            }
            PetState::Sleep(s) => {
                s.bed = walk_to_nearest(pet, ctx, poi::BED);
                if s.bed.is_none() {
                    pet.motor.stop();
                }
                None
            }
            PetState::Clean(s) => {
                pet.motor.stop();
                s.elapsed = 0.0;
                None
            }
            PetState::Play(s) => {
                s.toy = walk_to_nearest(pet, ctx, poi::TOY);
                s.toy.is_none().then_some(PetStateKind::Idle)
            }
            PetState::Interact(s) => {
                pet.motor.stop();
                s.elapsed = 0.0;
                None
            }
            PetState::Obeying(s) => {
                if s.command.is_none() {
                    pet.motor.stop();
                }
                None
            }
        }
    }

    pub fn update(&mut self, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) -> StateOutcome {
        let t = ctx.tuning;
        let dt = ctx.dt;
        match self {
            PetState::Idle(s) => {
                pet.needs.replenish(NeedKind::Energy, t.idle_energy, dt);
                pet.needs.replenish(NeedKind::Happiness, t.idle_happiness, dt);
                s.elapsed += dt;
                if s.elapsed >= s.duration {
                    StateOutcome::Done(Fallback::Reenter)
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Wander(s) => {
                pet.needs.replenish(NeedKind::Energy, t.wander_energy, dt);
                pet.needs.replenish(NeedKind::Happiness, t.wander_happiness, dt);
                s.elapsed += dt;
                if pet.motor.has_arrived() || s.elapsed >= s.duration {
                    StateOutcome::Done(Fallback::Reenter)
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::SeekFood(s) => {
                let Some(food) = active_poi(ctx, s.food) else {
                    return StateOutcome::Change(PetStateKind::Idle);
                };
                if !reached(pet, food) {
                    return StateOutcome::Continue;
                }
                pet.motor.stop();
                pet.needs.replenish(NeedKind::Hunger, t.eat_hunger, dt);
                pet.needs.replenish(NeedKind::Energy, t.eat_energy, dt);
                pet.needs.replenish(NeedKind::Happiness, t.eat_happiness, dt);
                pet.needs.replenish(NeedKind::Cleanliness, t.eat_cleanliness, dt);
                if pet.needs.get(NeedKind::Hunger) >= t.satiated_threshold {
                    StateOutcome::Done(Fallback::Switch(PetStateKind::Idle))
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Sleep(s) => {
                let energy_rate = match s.bed {
                    Some(_) => match active_poi(ctx, s.bed) {
                        Some(bed) if reached(pet, bed) => {
                            pet.motor.stop();
                            Some(t.sleep_energy)
                        }
                        Some(_) => None,
                        None => {
                            // bed went away; sleep where we stand
                            s.bed = None;
                            pet.motor.stop();
                            Some(t.sleep_energy * 0.5)
                        }
                    },
                    None => Some(t.sleep_energy * 0.5),
                };
                let Some(rate) = energy_rate else {
                    return StateOutcome::Continue;
                };
                pet.needs.replenish(NeedKind::Energy, rate, dt);
                pet.needs.replenish(NeedKind::Happiness, t.sleep_happiness, dt);
                if pet.needs.get(NeedKind::Energy) >= t.satiated_threshold {
                    StateOutcome::Done(Fallback::Switch(PetStateKind::Idle))
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Clean(s) => {
                pet.needs.replenish(NeedKind::Cleanliness, t.clean_cleanliness, dt);
                pet.needs.replenish(NeedKind::Happiness, t.clean_happiness, dt);
                s.elapsed += dt;
                if s.elapsed >= t.clean_duration {
                    StateOutcome::Done(Fallback::Switch(PetStateKind::Idle))
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Play(s) => {
                let Some(toy) = active_poi(ctx, s.toy) else {
                    return StateOutcome::Change(PetStateKind::Idle);
                };
                if !reached(pet, toy) {
                    return StateOutcome::Continue;
                }
                pet.motor.stop();
                pet.needs.replenish(NeedKind::Happiness, t.play_happiness, dt);
                pet.needs.replenish(NeedKind::Cleanliness, t.play_cleanliness, dt);
                pet.needs.replenish(NeedKind::Energy, t.play_energy, dt);
                if pet.needs.get(NeedKind::Happiness) >= t.satiated_threshold {
                    StateOutcome::Done(Fallback::Switch(PetStateKind::Idle))
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Interact(s) => {
                pet.needs.replenish(NeedKind::Happiness, t.interact_happiness, dt);
                s.elapsed += dt;
                if s.elapsed >= t.interact_duration {
                    StateOutcome::Done(Fallback::Switch(PetStateKind::Idle))
                } else {
                    StateOutcome::Continue
                }
            }
            PetState::Obeying(s) => {
                let Some(command) = &s.command else {
                    return StateOutcome::Change(PetStateKind::Idle);
                };
                if !pet.motor.has_arrived() {
                    pet.needs.replenish(NeedKind::Happiness, t.obey_happiness, dt);
                    return StateOutcome::Continue;
                }
                StateOutcome::Change(dispatch_on_arrival(command.target_tag.as_deref()))
            }
        }
    }

    pub fn exit(&mut self, pet: &mut PetAgent<'_>, _ctx: &mut PetContext<'_>) {
        match self {
            PetState::Idle(_) | PetState::Clean(_) | PetState::Interact(_) => pet.motor.resume(),
            PetState::Obeying(s) => s.command = None,
            _ => {}
        }
    }
}

/// Where an obeying pet goes once it reaches the commanded spot
pub fn dispatch_on_arrival(target_tag: Option<&str>) -> PetStateKind {
    match target_tag {
        Some(poi::BED) => PetStateKind::Sleep,
        Some(poi::FOOD) => PetStateKind::SeekFood,
        Some(poi::TOY) => PetStateKind::Play,
        Some(poi::BATH) => PetStateKind::Clean,
        _ => PetStateKind::Idle,
    }
}
