//! Tick system - advances the world one step
//!
//! sensor snapshot -> pets -> elementals (strikes land right after each
//! attacker) -> deaths -> deferred effects -> objects -> locomotion ->
//! population watch
//!
//! Agents run strictly in insertion order so a seed fully determines a run.

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info, warn};

use crate::behavior::elemental::{ElementalContext, ElementalStateKind};
use crate::behavior::pet::PetContext;
use crate::core::types::{AgentId, Vec2};
use crate::ecs::world::World;
use crate::entity::element::ElementType;
use crate::simulation::events::{SimulationEvent, WorldEffect};
use crate::world::objects::ObjectTickContext;
use crate::world::sensor::SpatialSensor;

/// Scratch state shared by the phases of one tick
struct TickPhase<'a> {
    sensor: &'a SpatialSensor,
    dt: f32,
    /// Killed this tick; the sensor snapshot still lists them
    fallen: AHashSet<AgentId>,
    killers: AHashMap<AgentId, AgentId>,
    effects: Vec<WorldEffect>,
}

/// Run one simulation tick, returning everything that happened in it
pub fn run_simulation_tick(world: &mut World) -> Vec<SimulationEvent> {
    let mut events = std::mem::take(&mut world.pending);
    let sensor = world.sensor_snapshot();
    let mut phase = TickPhase {
        sensor: &sensor,
        dt: world.config.tick_seconds,
        fallen: AHashSet::new(),
        killers: AHashMap::new(),
        effects: Vec::new(),
    };

    tick_pets(world, &phase, &mut events);
    tick_elementals(world, &mut phase, &mut events);
    bury_fallen(world, &mut phase, &mut events);

    let effects = std::mem::take(&mut phase.effects);
    apply_effects(world, effects, &mut events);

    tick_objects(world, &mut phase, &mut events);
    let effects = std::mem::take(&mut phase.effects);
    apply_effects(world, effects, &mut events);

    step_motors(world, phase.dt);
    watch_population(world, phase.dt, &mut events);

    world.current_tick += 1;
    events
}

fn tick_pets(world: &mut World, phase: &TickPhase<'_>, events: &mut Vec<SimulationEvent>) {
    for index in 0..world.pets.len() {
        let (mut pet, machine) = world.pets.agent_mut(index);
        let mut ctx = PetContext {
            dt: phase.dt,
            pois: &world.pois,
            sensor: phase.sensor,
            rules: &world.pet_rules,
            tuning: &world.config.pets,
            rng: &mut world.rng,
            events: &mut *events,
        };
        machine.tick(&mut pet, &mut ctx);
    }
}

fn tick_elementals(world: &mut World, phase: &mut TickPhase<'_>, events: &mut Vec<SimulationEvent>) {
    for index in 0..world.elementals.len() {
        if !world.elementals.alive[index] {
            continue;
        }
        let element = world.elementals.elements[index];
        {
            let (mut agent, machine) = world.elementals.agent_mut(index);
            let mut ctx = ElementalContext {
                dt: phase.dt,
                sensor: phase.sensor,
                fallen: &phase.fallen,
                objects: &mut world.objects,
                policy: world.policies.get(element),
                tuning: &world.config.elementals,
                structures: &world.config.structures,
                ids: &mut world.ids,
                rng: &mut world.rng,
                events: &mut *events,
                effects: &mut phase.effects,
            };
            machine.tick(&mut agent, &mut ctx);
        }
        resolve_strikes(world, phase, events);
    }
}

/// Land every pending strike; reactions may queue further strikes
fn resolve_strikes(world: &mut World, phase: &mut TickPhase<'_>, events: &mut Vec<SimulationEvent>) {
    while let Some(pos) = phase
        .effects
        .iter()
        .position(|e| matches!(e, WorldEffect::Strike { .. }))
    {
        if let WorldEffect::Strike { attacker, target, damage } = phase.effects.remove(pos) {
            apply_strike(world, phase, events, attacker, target, damage);
        }
    }
}

fn apply_strike(
    world: &mut World,
    phase: &mut TickPhase<'_>,
    events: &mut Vec<SimulationEvent>,
    attacker: AgentId,
    target: AgentId,
    damage: f32,
) {
    let Some(index) = living_index(world, target) else {
        return;
    };
    events.push(SimulationEvent::Attacked { attacker, target, damage });

    if world.elementals.stats[index].take_damage(damage) {
        world.elementals.alive[index] = false;
        phase.fallen.insert(target);
        phase.killers.insert(target, attacker);
        return;
    }

    let element = world.elementals.elements[index];
    let (mut agent, machine) = world.elementals.agent_mut(index);
    let mut ctx = ElementalContext {
        dt: phase.dt,
        sensor: phase.sensor,
        fallen: &phase.fallen,
        objects: &mut world.objects,
        policy: world.policies.get(element),
        tuning: &world.config.elementals,
        structures: &world.config.structures,
        ids: &mut world.ids,
        rng: &mut world.rng,
        events: &mut *events,
        effects: &mut phase.effects,
    };
    machine.on_damage_taken(attacker, damage, &mut agent, &mut ctx);
}

/// Release whatever the dead were holding, then drop them
fn bury_fallen(world: &mut World, phase: &mut TickPhase<'_>, events: &mut Vec<SimulationEvent>) {
    if phase.fallen.is_empty() {
        return;
    }

    let mut dead: Vec<(AgentId, ElementType)> = Vec::new();
    for index in 0..world.elementals.len() {
        if world.elementals.alive[index] {
            continue;
        }
        let element = world.elementals.elements[index];
        dead.push((world.elementals.ids[index], element));

        let (mut agent, machine) = world.elementals.agent_mut(index);
        let mut ctx = ElementalContext {
            dt: phase.dt,
            sensor: phase.sensor,
            fallen: &phase.fallen,
            objects: &mut world.objects,
            policy: world.policies.get(element),
            tuning: &world.config.elementals,
            structures: &world.config.structures,
            ids: &mut world.ids,
            rng: &mut world.rng,
            events: &mut *events,
            effects: &mut phase.effects,
        };
        machine.shutdown(&mut agent, &mut ctx);
    }

    world.elementals.remove_dead();
    for (agent, element) in dead {
        let killer = phase.killers.get(&agent).copied();
        info!(agent = agent.0, %element, killer = ?killer.map(|k| k.0), "elemental died");
        events.push(SimulationEvent::ElementalDied { agent, element, killer });
    }
}

fn apply_effects(world: &mut World, effects: Vec<WorldEffect>, events: &mut Vec<SimulationEvent>) {
    for effect in effects {
        match effect {
            WorldEffect::Spawn { element, position, cause } => match world.spawn_elemental(element, position) {
                Ok(agent) => events.push(SimulationEvent::ElementalSpawned {
                    agent,
                    element,
                    position,
                    cause,
                }),
                Err(err) => warn!(%element, error = %err, "spawn skipped"),
            },
            WorldEffect::UpgradeOwner { owner } => upgrade_elemental(world, owner, events),
            WorldEffect::Heal { agent, amount } => {
                if let Some(index) = living_index(world, agent) {
                    world.elementals.stats[index].heal(amount);
                }
            }
            WorldEffect::Strike { attacker, target, .. } => {
                debug!(attacker = attacker.0, target = target.0, "late strike dropped");
            }
        }
    }
}

fn upgrade_elemental(world: &mut World, owner: AgentId, events: &mut Vec<SimulationEvent>) {
    let Some(index) = living_index(world, owner) else {
        return;
    };
    let element = world.elementals.elements[index];
    let Some(data) = world.catalog.get(&element) else {
        return;
    };

    world.elementals.stats[index].upgrade(data, &mut world.rng);
    world.elementals.ledgers[index].upgrade(data, &mut world.rng);

    let mut speed = world.elementals.stats[index].speed;
    if world.elementals.machines[index].kind() == ElementalStateKind::Flee {
        speed *= world.config.elementals.flee_multiplier;
    }
    world.elementals.motors[index].set_speed(speed);

    info!(agent = owner.0, %element, "elemental upgraded");
    events.push(SimulationEvent::ElementalUpgraded { agent: owner });
}

fn tick_objects(world: &mut World, phase: &mut TickPhase<'_>, events: &mut Vec<SimulationEvent>) {
    let mut ctx = ObjectTickContext {
        dt: phase.dt,
        config: &world.config,
        sensor: phase.sensor,
        rng: &mut world.rng,
        events,
        effects: &mut phase.effects,
    };
    world.objects.tick(&mut ctx);
}

fn step_motors(world: &mut World, dt: f32) {
    for motor in world.pets.motors.iter_mut() {
        motor.step(dt);
    }
    for motor in world.elementals.motors.iter_mut() {
        motor.step(dt);
    }
}

fn watch_population(world: &mut World, dt: f32, events: &mut Vec<SimulationEvent>) {
    let counts = ElementType::ALL.map(|e| (e, world.elementals.count(e)));
    let positions: Vec<Vec2> = (0..world.elementals.len())
        .filter(|&i| world.elementals.alive[i])
        .map(|i| world.elementals.position(i))
        .collect();

    world.population.update(counts, &positions, events);
    world.population.advance(dt, world.current_tick, events);
}

fn living_index(world: &World, id: AgentId) -> Option<usize> {
    world
        .elementals
        .index_of(id)
        .filter(|&i| world.elementals.alive[i])
}
