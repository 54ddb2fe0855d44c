//! Elemental state machine

use tracing::debug;

use crate::behavior::elemental::states::ElementalState;
use crate::behavior::elemental::{ElementalAgent, ElementalContext, ElementalStateKind, Transition};
use crate::core::types::AgentId;
use crate::simulation::events::SimulationEvent;

/// Bound on enter-time redirects within a single switch
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone)]
pub struct ElementalStateMachine {
    current: ElementalState,
    started: bool,
    transitions: u64,
}

impl Default for ElementalStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementalStateMachine {
    pub fn new() -> Self {
        Self {
            current: ElementalState::new(Transition::Idle),
            started: false,
            transitions: 0,
        }
    }

    pub fn current(&self) -> &ElementalState {
        &self.current
    }

    pub fn kind(&self) -> ElementalStateKind {
        self.current.kind()
    }

    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Enter Idle; later calls do nothing
    pub fn start(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        if self.started {
            return;
        }
        self.started = true;
        if let Some(redirect) = self.current.enter(agent, ctx) {
            self.switch_to(redirect, agent, ctx);
        }
    }

    /// Cooldown, update, then the state's own transition checks
    pub fn tick(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        self.start(agent, ctx);
        *agent.cooldown = (*agent.cooldown - ctx.dt).max(0.0);

        if let Some(next) = self.current.update(agent, ctx) {
            self.change_state(next, agent, ctx);
            return;
        }
        if let Some(next) = self.current.check_transitions(agent, ctx) {
            self.change_state(next, agent, ctx);
        }
    }

    pub fn on_damage_taken(
        &mut self,
        attacker: AgentId,
        damage: f32,
        agent: &mut ElementalAgent<'_>,
        ctx: &mut ElementalContext<'_>,
    ) {
        self.start(agent, ctx);
        if let Some(next) = self.current.on_damage_taken(attacker, damage, agent, ctx) {
            self.change_state(next, agent, ctx);
        }
    }

    /// Exit the current state and enter the requested one; no-op when already there
    pub fn change_state(&mut self, next: Transition, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        if next == self.current.transition() {
            return;
        }
        self.switch_to(next, agent, ctx);
    }

    /// Leave the current state for good, releasing whatever it holds
    pub fn shutdown(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        self.current.exit(agent, ctx);
    }

    fn switch_to(&mut self, target: Transition, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        let mut next = target;
        for _ in 0..MAX_REDIRECTS {
            self.current.exit(agent, ctx);
            let from = self.current.kind();
            self.current = ElementalState::new(next);
            self.transitions += 1;

            debug!(agent = agent.id.0, %from, to = %next.kind(), "elemental state change");
            ctx.events.push(SimulationEvent::StateChanged {
                agent: agent.id,
                from: from.to_string(),
                to: next.kind().to_string(),
            });

            match self.current.enter(agent, ctx) {
                Some(redirect) if redirect != next => next = redirect,
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::elemental::policy::{ElementalPolicy, Matchup};
    use crate::behavior::elemental::states::{sleep_chance, sleep_time};
    use crate::core::config::{ElementalTuning, StructureTuning};
    use crate::core::types::{IdAllocator, ObjectId, SimRng, StatRange, Vec2};
    use crate::entity::element::{ElementType, ElementalData};
    use crate::entity::stats::{ElementalStats, ResourceLedger};
    use crate::interact::{ElementalStructure, InteractionType, ResourcePellet};
    use crate::simulation::events::WorldEffect;
    use crate::world::locomotion::{Locomotion, SimpleLocomotion};
    use crate::world::nav::NavBounds;
    use crate::world::objects::{WorldObject, WorldObjects};
    use crate::world::sensor::{AgentView, SpatialSensor};
    use ahash::AHashSet;
    use rand::SeedableRng;

    struct Body {
        id: AgentId,
        element: ElementType,
        stats: ElementalStats,
        ledger: ResourceLedger,
        cooldown: f32,
        motor: Box<dyn Locomotion>,
        home: Option<ObjectId>,
        desire: f32,
    }

    impl Body {
        fn new(id: u32, element: ElementType, at: Vec2) -> Self {
            let mut rng = SimRng::seed_from_u64(id as u64);
            let stats = ElementalStats::roll(&ElementalData::standard(element), &mut rng);
            Self {
                id: AgentId(id),
                element,
                motor: Box::new(SimpleLocomotion::new(at, stats.speed, 1.0)),
                stats,
                ledger: ResourceLedger::new(element, 10.0, 2.0),
                cooldown: 0.0,
                home: None,
                desire: 0.0,
            }
        }

        fn view(&self) -> AgentView {
            AgentView {
                id: self.id,
                element: self.element,
                position: self.motor.position(),
                hp: self.stats.hp,
                max_hp: self.stats.max_hp,
                damage: self.stats.damage,
                stamina_pct: self.stats.stamina_pct(),
            }
        }
    }

    struct Harness {
        sensor: SpatialSensor,
        fallen: AHashSet<AgentId>,
        objects: WorldObjects,
        policy: ElementalPolicy,
        tuning: ElementalTuning,
        structures: StructureTuning,
        ids: IdAllocator,
        rng: SimRng,
        events: Vec<SimulationEvent>,
        effects: Vec<WorldEffect>,
    }

    impl Harness {
        fn new() -> Self {
            let mut tuning = ElementalTuning::default();
            // keep idle spells long so tests control every exit
            tuning.idle_duration = StatRange::fixed(100.0);
            Self {
                sensor: SpatialSensor::new(NavBounds::new(Vec2::new(-50.0, -50.0), Vec2::new(50.0, 50.0)), 5.0),
                fallen: AHashSet::new(),
                objects: WorldObjects::new(),
                policy: ElementalPolicy { builds_structures: false, ..ElementalPolicy::default() },
                tuning,
                structures: StructureTuning::default(),
                ids: IdAllocator::new(),
                rng: SimRng::seed_from_u64(11),
                events: Vec::new(),
                effects: Vec::new(),
            }
        }

        fn run<F: FnOnce(&mut ElementalAgent<'_>, &mut ElementalContext<'_>)>(&mut self, body: &mut Body, f: F) {
            let mut agent = ElementalAgent {
                id: body.id,
                element: body.element,
                stats: &mut body.stats,
                ledger: &mut body.ledger,
                cooldown: &mut body.cooldown,
                motor: &mut body.motor,
                home: &mut body.home,
                desire: &mut body.desire,
            };
            let mut ctx = ElementalContext {
                dt: 0.1,
                sensor: &self.sensor,
                fallen: &self.fallen,
                objects: &mut self.objects,
                policy: &self.policy,
                tuning: &self.tuning,
                structures: &self.structures,
                ids: &mut self.ids,
                rng: &mut self.rng,
                events: &mut self.events,
                effects: &mut self.effects,
            };
            f(&mut agent, &mut ctx);
        }
    }

    #[test]
    fn test_starts_idle_once() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.tick(agent, ctx);
            machine.tick(agent, ctx);
        });
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn test_exhausted_pursuer_gives_up() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        let prey = Body::new(2, ElementType::Water, Vec2::new(8.0, 0.0));
        h.sensor.insert_elemental(prey.view());
        body.stats.stamina = 0.0;

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Pursue(AgentId(2)), agent, ctx);
            machine.tick(agent, ctx);
        });
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
    }

    #[test]
    fn test_pursuer_drained_in_range_goes_idle_not_attack() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        let prey = Body::new(2, ElementType::Water, Vec2::new(0.5, 0.0));
        h.sensor.insert_elemental(prey.view());
        // exactly one tick of pursuit left
        body.stats.stamina = body.stats.stamina_drain * h.tuning.pursue_stamina_rate * 0.1;

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Pursue(AgentId(2)), agent, ctx);
            machine.tick(agent, ctx);
        });
        assert_eq!(body.stats.stamina, 0.0);
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
        assert!(h.effects.is_empty());
    }

    #[test]
    fn test_pursuer_closes_to_attack_and_strikes() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        let prey = Body::new(2, ElementType::Water, Vec2::new(0.5, 0.0));
        h.sensor.insert_elemental(prey.view());

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Pursue(AgentId(2)), agent, ctx);
            machine.tick(agent, ctx);
            assert_eq!(machine.kind(), ElementalStateKind::Attack);
            machine.tick(agent, ctx);
        });
        assert!(matches!(
            h.effects.as_slice(),
            [WorldEffect::Strike { attacker: AgentId(1), target: AgentId(2), .. }]
        ));
    }

    #[test]
    fn test_idle_spots_threat() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Nature, Vec2::ZERO);
        let other = Body::new(2, ElementType::Fire, Vec2::new(3.0, 0.0));
        h.sensor.insert_elemental(other.view());

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| machine.tick(agent, ctx));
        assert!(matches!(machine.kind(), ElementalStateKind::Pursue | ElementalStateKind::Flee));
    }

    #[test]
    fn test_same_element_is_no_threat() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Nature, Vec2::ZERO);
        let friend = Body::new(2, ElementType::Nature, Vec2::new(3.0, 0.0));
        h.sensor.insert_elemental(friend.view());

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| machine.tick(agent, ctx));
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
    }

    #[test]
    fn test_favored_matchup_always_fights() {
        let mut h = Harness::new();
        h.policy.fight_matchups.push(Matchup { against: ElementType::Nature, hp_ratio: 0.1 });
        h.tuning.brave_threshold = 1.0;
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        body.stats.damage = 0.0;
        body.stats.hp = 10.0;
        let mut other = Body::new(2, ElementType::Nature, Vec2::new(3.0, 0.0));
        other.stats.hp = 50.0;
        h.sensor.insert_elemental(other.view());

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| machine.tick(agent, ctx));
        assert_eq!(machine.kind(), ElementalStateKind::Pursue);
    }

    #[test]
    fn test_desperate_attacker_flees() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        let prey = Body::new(2, ElementType::Water, Vec2::new(0.5, 0.0));
        h.sensor.insert_elemental(prey.view());
        body.stats.hp = body.stats.max_hp * 0.3;
        let base_speed = body.stats.speed;

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Attack(AgentId(2)), agent, ctx);
            machine.on_damage_taken(AgentId(2), 1.0, agent, ctx);
            assert_eq!(machine.kind(), ElementalStateKind::Flee);
            assert!((agent.motor.speed() - base_speed * 1.5).abs() < 1e-4);
            machine.change_state(Transition::Idle, agent, ctx);
            assert!((agent.motor.speed() - base_speed).abs() < 1e-4);
        });
    }

    #[test]
    fn test_sleep_ignores_threats_and_damage() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Water, Vec2::ZERO);
        body.stats.hp = body.stats.max_hp * 0.2;
        let other = Body::new(2, ElementType::Fire, Vec2::new(1.0, 0.0));
        h.sensor.insert_elemental(other.view());

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Sleep, agent, ctx);
            machine.on_damage_taken(AgentId(2), 50.0, agent, ctx);
            machine.tick(agent, ctx);
        });
        assert_eq!(machine.kind(), ElementalStateKind::Sleep);
    }

    #[test]
    fn test_interact_refused_goes_idle() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        h.objects.add(WorldObject::Pellet(ResourcePellet::new(ObjectId(5), ElementType::Water, Vec2::new(1.0, 0.0), 3.0)));

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.start(agent, ctx);
            machine.change_state(Transition::Interact(ObjectId(5), InteractionType::Collect), agent, ctx);
        });
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
        assert!(h.events.contains(&SimulationEvent::InteractionRefused { agent: AgentId(1), object: ObjectId(5) }));
    }

    #[test]
    fn test_collects_from_nearby_structure_and_releases() {
        let mut h = Harness::new();
        let mut body = Body::new(1, ElementType::Fire, Vec2::ZERO);
        h.objects.add(WorldObject::Structure(ElementalStructure::new(
            ObjectId(7),
            ElementType::Fire,
            Vec2::new(0.5, 0.0),
            None,
            StructureTuning::default(),
        )));
        h.sensor.insert_object(ObjectId(7), Vec2::new(0.5, 0.0));

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| {
            machine.tick(agent, ctx);
            assert_eq!(machine.kind(), ElementalStateKind::Interact);
            for _ in 0..80 {
                machine.tick(agent, ctx);
                if machine.kind() != ElementalStateKind::Interact {
                    break;
                }
            }
        });
        assert_eq!(machine.kind(), ElementalStateKind::Idle);
        assert!(body.ledger.is_full());
        let guard_free = match h.objects.get(ObjectId(7)) {
            Some(object) => object.interactable().guard().holder().is_none(),
            None => false,
        };
        assert!(guard_free);
    }

    #[test]
    fn test_homeless_builder_places_structure() {
        let mut h = Harness::new();
        h.policy.builds_structures = true;
        h.tuning.desire_threshold = 0.0;
        h.tuning.place_chance = 1.0;
        let mut body = Body::new(1, ElementType::Nature, Vec2::ZERO);

        let mut machine = ElementalStateMachine::new();
        h.run(&mut body, |agent, ctx| machine.start(agent, ctx));
        assert!(body.home.is_some());
        assert_eq!(body.desire, 0.0);
        assert_eq!(h.objects.len(), 1);
    }

    #[test]
    fn test_sleep_math() {
        assert_eq!(sleep_chance(1.0, 3.0), 0.0);
        assert!((sleep_chance(0.5, 3.0) - 0.875).abs() < 1e-6);
        let mut rng = SimRng::seed_from_u64(0);
        assert_eq!(sleep_time(0.0, 2.0, 0.0, &mut rng), 0.0);
        assert!((sleep_time(10.0, 2.0, 0.0, &mut rng) - 5.0).abs() < 1e-6);
        assert_eq!(sleep_time(10.0, 0.0, 5.0, &mut rng), 0.0);
    }
}
