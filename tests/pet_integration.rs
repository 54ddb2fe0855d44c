//! Integration tests for pet needs, rules and player commands

use std::path::Path;

use elemental_harmony::behavior::pet::PetStateKind;
use elemental_harmony::core::config::SimulationConfig;
use elemental_harmony::core::types::Vec2;
use elemental_harmony::ecs::world::World;
use elemental_harmony::entity::needs::{NeedKind, NeedOverride};
use elemental_harmony::entity::pet::PetProfile;
use elemental_harmony::rules::loader::load_data_dir;
use elemental_harmony::simulation::events::SimulationEvent;
use elemental_harmony::simulation::tick::run_simulation_tick;
use elemental_harmony::world::poi;

fn quiet_world() -> World {
    let mut config = SimulationConfig::default();
    config.doomsday.enabled = false;
    World::new(config)
}

fn pet(name: &str, position: Vec2, needs: Vec<NeedOverride>) -> PetProfile {
    PetProfile {
        name: name.to_string(),
        position,
        needs,
    }
}

fn hunger(value: f32) -> NeedOverride {
    NeedOverride {
        need: NeedKind::Hunger,
        value: Some(value),
        decay_rate: None,
    }
}

#[test]
fn test_critical_hunger_wins_from_idle() {
    let mut world = quiet_world();
    world.add_poi(poi::FOOD, Vec2::new(10.0, 0.0), 1.5);
    world.spawn_pet(&pet("starving", Vec2::ZERO, vec![hunger(10.0)]));

    run_simulation_tick(&mut world);
    assert_eq!(world.pets.machines[0].kind(), PetStateKind::SeekFood);
}

#[test]
fn test_pet_eats_until_satiated() {
    let mut world = quiet_world();
    world.add_poi(poi::FOOD, Vec2::new(2.0, 0.0), 1.5);
    world.spawn_pet(&pet("hungry", Vec2::ZERO, vec![hunger(20.0)]));

    let mut best = 0.0f32;
    for _ in 0..400 {
        run_simulation_tick(&mut world);
        best = best.max(world.pets.needs[0].get(NeedKind::Hunger));
    }
    assert!(best >= world.config.pets.satiated_threshold, "hunger peaked at {}", best);
}

#[test]
fn test_no_food_falls_back_to_idle() {
    let mut world = quiet_world();
    world.spawn_pet(&pet("stray", Vec2::ZERO, vec![hunger(10.0)]));

    run_simulation_tick(&mut world);
    assert_ne!(world.pets.machines[0].kind(), PetStateKind::SeekFood);
}

#[test]
fn test_command_to_bed_dispatches_sleep() {
    let mut world = quiet_world();
    world.add_poi(poi::BED, Vec2::new(5.0, 0.0), 1.5);
    let id = world.spawn_pet(&pet("obedient", Vec2::ZERO, Vec::new()));

    world.issue_command(id, Vec2::new(5.0, 0.0), Some(poi::BED)).unwrap();
    assert_eq!(world.pets.machines[0].kind(), PetStateKind::Obeying);

    let mut slept = false;
    for _ in 0..100 {
        let events = run_simulation_tick(&mut world);
        slept |= events.iter().any(|e| {
            matches!(e, SimulationEvent::StateChanged { agent, to, .. } if *agent == id && to == "Sleep")
        });
    }
    assert!(slept);
}

#[test]
fn test_pets_never_overstay_a_state() {
    let data = load_data_dir(Path::new("data")).unwrap();
    let mut world = data.into_world().unwrap();
    let limit = world.config.pets.max_time_in_one_state + world.config.tick_seconds;

    for _ in 0..2000 {
        run_simulation_tick(&mut world);
        for (i, machine) in world.pets.machines.iter().enumerate() {
            assert!(machine.time_in_state() <= limit, "pet {} stuck in {}", i, machine.kind());
            for (_, value) in world.pets.needs[i].iter() {
                assert!((0.0..=100.0).contains(&value));
            }
        }
    }
    assert!(world.pets.machines.iter().all(|m| m.transition_count() > 0));
}
