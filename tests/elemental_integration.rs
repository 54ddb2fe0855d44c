//! Integration tests for elemental combat and long-running behavior

use std::path::Path;

use ahash::AHashMap;
use elemental_harmony::behavior::elemental::ElementalStateKind;
use elemental_harmony::core::config::SimulationConfig;
use elemental_harmony::core::types::{AgentId, Vec2};
use elemental_harmony::ecs::world::World;
use elemental_harmony::entity::element::ElementType;
use elemental_harmony::interact::Interactable;
use elemental_harmony::rules::loader::load_data_dir;
use elemental_harmony::simulation::events::SimulationEvent;
use elemental_harmony::simulation::tick::run_simulation_tick;

fn quiet_config() -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.doomsday.enabled = false;
    config
}

fn set_combat(world: &mut World, id: AgentId, hp: f32, damage: f32) {
    let i = world.elementals.index_of(id).unwrap();
    let stats = &mut world.elementals.stats[i];
    stats.max_hp = hp;
    stats.hp = hp;
    stats.damage = damage;
}

#[test]
fn test_divergent_fight_and_flee_persist() {
    let mut config = quiet_config();
    // no lucky rolls: only the stat comparison decides
    config.elementals.brave_threshold = 1.0;
    let mut world = World::new(config);

    let strong = world.spawn_elemental(ElementType::Fire, Vec2::ZERO).unwrap();
    let weak = world.spawn_elemental(ElementType::Water, Vec2::new(5.0, 0.0)).unwrap();
    set_combat(&mut world, strong, 300.0, 30.0);
    set_combat(&mut world, weak, 20.0, 1.0);

    run_simulation_tick(&mut world);
    assert_eq!(world.elemental_state(strong), Some(ElementalStateKind::Pursue));
    assert_eq!(world.elemental_state(weak), Some(ElementalStateKind::Flee));

    for _ in 0..50 {
        run_simulation_tick(&mut world);
        assert_ne!(world.elemental_state(strong), Some(ElementalStateKind::Flee));
        if let Some(state) = world.elemental_state(weak) {
            assert!(
                !matches!(state, ElementalStateKind::Pursue | ElementalStateKind::Attack),
                "weak elemental turned on its pursuer"
            );
        }
    }
}

#[test]
fn test_fight_to_the_death() {
    let mut config = quiet_config();
    config.elementals.brave_threshold = 1.0;
    let mut world = World::new(config);

    let killer = world.spawn_elemental(ElementType::Nature, Vec2::ZERO).unwrap();
    let victim = world.spawn_elemental(ElementType::Fire, Vec2::new(1.0, 0.0)).unwrap();
    set_combat(&mut world, killer, 500.0, 50.0);
    set_combat(&mut world, victim, 40.0, 60.0);

    let mut died = None;
    for _ in 0..300 {
        for event in run_simulation_tick(&mut world) {
            if let SimulationEvent::ElementalDied { agent, killer, .. } = event {
                died = Some((agent, killer));
            }
        }
        if died.is_some() {
            break;
        }
    }

    assert_eq!(died, Some((victim, Some(killer))));
    assert!(world.elementals.index_of(victim).is_none());
    assert_eq!(world.elementals.count(ElementType::Fire), 0);
}

#[test]
fn test_no_elemental_gets_stuck() {
    let data = load_data_dir(Path::new("data")).unwrap();
    let mut world = data.into_world().unwrap();

    let mut last_change: AHashMap<AgentId, u64> = AHashMap::new();
    for &id in &world.elementals.ids {
        last_change.insert(id, 0);
    }

    for _ in 0..3000 {
        let tick = world.current_tick;
        for event in run_simulation_tick(&mut world) {
            match event {
                SimulationEvent::StateChanged { agent, .. } => {
                    last_change.insert(agent, tick);
                }
                SimulationEvent::ElementalSpawned { agent, .. } => {
                    last_change.insert(agent, tick);
                }
                _ => {}
            }
        }

        for i in 0..world.elementals.len() {
            let id = world.elementals.ids[i];
            let since = tick - last_change.get(&id).copied().unwrap_or(tick);
            assert!(
                since <= 1500,
                "elemental {} stuck in {} for {} ticks",
                id.0,
                world.elementals.machines[i].kind(),
                since
            );
            let stats = &world.elementals.stats[i];
            assert!(stats.hp >= 0.0 && stats.hp <= stats.max_hp + 1e-3);
            assert!(stats.stamina >= 0.0 && stats.stamina <= stats.max_stamina + 1e-3);
        }
    }
}

#[test]
fn test_guards_released_after_run() {
    let data = load_data_dir(Path::new("data")).unwrap();
    let mut world = data.into_world().unwrap();
    for _ in 0..1000 {
        run_simulation_tick(&mut world);
    }

    for object in world.objects.iter() {
        let Some(holder) = object.interactable().guard().holder() else {
            continue;
        };
        let i = world
            .elementals
            .index_of(holder)
            .unwrap_or_else(|| panic!("object {:?} held by a dead elemental", object.id()));
        assert_eq!(world.elementals.machines[i].kind(), ElementalStateKind::Interact);
    }
}
