//! Elemental states; each one owns its exits

use rand::Rng;
use tracing::{debug, trace};

use crate::behavior::elemental::desire::update_structure_desire;
use crate::behavior::elemental::sensing::{check_for_interactables, check_for_threats, confront};
use crate::behavior::elemental::{ElementalAgent, ElementalContext, ElementalStateKind, Transition};
use crate::core::types::{AgentId, ObjectId, Vec2};
use crate::interact::{InteractionContext, InteractionType};
use crate::simulation::events::{SimulationEvent, WorldEffect};

#[derive(Debug, Clone, Default)]
pub struct IdleState {
    pub timer: f32,
    pub scan_timer: f32,
}

#[derive(Debug, Clone, Default)]
pub struct RoamState {
    pub destination: Vec2,
}

#[derive(Debug, Clone, Default)]
pub struct SleepState {
    pub timer: f32,
}

#[derive(Debug, Clone)]
pub struct FleeState {
    pub threat: AgentId,
}

#[derive(Debug, Clone)]
pub struct InteractState {
    pub target: ObjectId,
    pub intent: InteractionType,
    pub interacting: bool,
    pub timer: f32,
}

#[derive(Debug, Clone)]
pub enum ElementalState {
    Idle(IdleState),
    Roam(RoamState),
    Sleep(SleepState),
    Pursue(AgentId),
    Attack(AgentId),
    Flee(FleeState),
    Interact(InteractState),
}

/// Chance of choosing sleep over roaming when an idle spell ends
pub fn sleep_chance(hp_pct: f32, exponent: f32) -> f32 {
    1.0 - hp_pct.clamp(0.0, 1.0).powf(exponent)
}

/// Seconds needed to heal up, give or take `jitter`
pub fn sleep_time(missing_hp: f32, recovery_rate: f32, jitter: f32, rng: &mut impl Rng) -> f32 {
    if recovery_rate <= 0.0 {
        return 0.0;
    }
    let offset = if jitter > 0.0 { rng.gen_range(-jitter..jitter) } else { 0.0 };
    (missing_hp / recovery_rate + offset).max(0.0)
}

/// Full and housed: take the haul home, if home still wants it
fn carry_home(agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> Option<Transition> {
    if !agent.ledger.is_full() {
        return None;
    }
    let home = (*agent.home)?;
    let object = ctx.objects.get(home)?;
    let tends = ctx.policy.tends_objects;
    object
        .interactable()
        .can_interact(&agent.interactor(tends), InteractionType::Contribute)
        .then_some(Transition::Interact(home, InteractionType::Contribute))
}

impl ElementalState {
    /// Fresh, not yet entered state for `transition`
    pub fn new(transition: Transition) -> Self {
        match transition {
            Transition::Idle => ElementalState::Idle(IdleState::default()),
            Transition::Roam => ElementalState::Roam(RoamState::default()),
            Transition::Sleep => ElementalState::Sleep(SleepState::default()),
            Transition::Pursue(target) => ElementalState::Pursue(target),
            Transition::Attack(target) => ElementalState::Attack(target),
            Transition::Flee(threat) => ElementalState::Flee(FleeState { threat }),
            Transition::Interact(target, intent) => ElementalState::Interact(InteractState {
                target,
                intent,
                interacting: false,
                timer: 0.0,
            }),
        }
    }

    pub fn kind(&self) -> ElementalStateKind {
        self.transition().kind()
    }

    /// The transition that would lead to this state as it stands now
    pub fn transition(&self) -> Transition {
        match self {
            ElementalState::Idle(_) => Transition::Idle,
            ElementalState::Roam(_) => Transition::Roam,
            ElementalState::Sleep(_) => Transition::Sleep,
            ElementalState::Pursue(target) => Transition::Pursue(*target),
            ElementalState::Attack(target) => Transition::Attack(*target),
            ElementalState::Flee(s) => Transition::Flee(s.threat),
            ElementalState::Interact(s) => Transition::Interact(s.target, s.intent),
        }
    }

    /// Returns a redirect when the state cannot start here
    pub fn enter(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> Option<Transition> {
        let tuning = ctx.tuning;
        match self {
            ElementalState::Idle(s) => {
                agent.motor.stop();
                s.timer = tuning.idle_duration.sample(ctx.rng);
                s.scan_timer = 0.0;
                update_structure_desire(agent, ctx);
                None
            }
            ElementalState::Roam(s) => {
                let here = agent.position();
                s.destination = ctx
                    .sensor
                    .sample_navigable_point(here, agent.stats.roam_range, ctx.rng)
                    .unwrap_or(here);
                agent.motor.set_destination(s.destination);
                None
            }
            ElementalState::Sleep(s) => {
                agent.motor.stop();
                s.timer = sleep_time(agent.stats.missing_hp(), agent.stats.hp_recovery, tuning.sleep_jitter, ctx.rng);
                debug!(agent = agent.id.0, seconds = s.timer, "elemental sleeping");
                None
            }
            ElementalState::Pursue(_) => {
                agent.motor.resume();
                None
            }
            ElementalState::Attack(_) => {
                agent.motor.stop();
                None
            }
            ElementalState::Flee(_) => {
                agent.motor.set_speed(agent.stats.speed * tuning.flee_multiplier);
                agent.motor.resume();
                None
            }
            ElementalState::Interact(s) => {
                let tends = ctx.policy.tends_objects;
                let Some(object) = ctx.objects.get(s.target) else {
                    return Some(Transition::Idle);
                };
                let object = object.interactable();
                if !object.can_interact(&agent.interactor(tends), s.intent) {
                    debug!(agent = agent.id.0, object = s.target.0, intent = %s.intent, "interaction refused");
                    ctx.events.push(SimulationEvent::InteractionRefused { agent: agent.id, object: s.target });
                    return Some(Transition::Idle);
                }
                s.interacting = false;
                s.timer = 0.0;
                agent.motor.set_destination(object.position());
                None
            }
        }
    }

    /// Per-tick activity; a returned transition skips `check_transitions`
    pub fn update(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> Option<Transition> {
        let tuning = ctx.tuning;
        let dt = ctx.dt;
        match self {
            ElementalState::Idle(s) => {
                s.timer -= dt;
                agent.stats.restore_stamina(tuning.idle_stamina_rate, dt);
                s.scan_timer -= dt;
                if s.scan_timer <= 0.0 {
                    s.scan_timer = tuning.idle_scan_interval;
                    return check_for_interactables(agent, ctx);
                }
                None
            }
            ElementalState::Roam(_) => {
                if ctx.rng.gen::<f32>() < tuning.roam_scan_chance {
                    return check_for_interactables(agent, ctx);
                }
                None
            }
            ElementalState::Sleep(s) => {
                s.timer -= dt;
                agent.stats.restore_hp(1.0, dt);
                agent.stats.restore_stamina(tuning.sleep_stamina_rate, dt);
                None
            }
            ElementalState::Pursue(target) => {
                let Some(position) = ctx.other(*target).map(|v| v.position) else {
                    return Some(Transition::Idle);
                };
                if !agent.stats.decrease_stamina(tuning.pursue_stamina_rate, dt) {
                    debug!(agent = agent.id.0, "too tired to pursue");
                    return Some(Transition::Idle);
                }
                agent.motor.set_destination(position);
                None
            }
            ElementalState::Attack(target) => {
                if ctx.other(*target).is_none() {
                    return Some(Transition::Idle);
                }
                if *agent.cooldown <= 0.0 {
                    *agent.cooldown = agent.stats.attack_interval;
                    ctx.effects.push(WorldEffect::Strike {
                        attacker: agent.id,
                        target: *target,
                        damage: agent.stats.damage,
                    });
                }
                None
            }
            ElementalState::Flee(s) => {
                let Some(threat) = ctx.other(s.threat).map(|v| v.position) else {
                    return Some(Transition::Idle);
                };
                if !agent.stats.decrease_stamina(tuning.flee_multiplier, dt) {
                    return Some(Transition::Idle);
                }
                let here = agent.position();
                let away = here + (here - threat).normalize() * tuning.flee_distance;
                let target = ctx
                    .sensor
                    .sample_navigable_point(away, tuning.flee_jitter, ctx.rng)
                    .or_else(|| ctx.sensor.sample_navigable_point(away, tuning.flee_distance, ctx.rng));
                if let Some(target) = target {
                    agent.motor.set_destination(target);
                }
                None
            }
            ElementalState::Interact(s) => {
                let tends = ctx.policy.tends_objects;
                let Some(object) = ctx.objects.get_mut(s.target) else {
                    return Some(Transition::Idle);
                };
                let object = object.interactable_mut();

                if !s.interacting {
                    if !agent.motor.has_arrived() {
                        return None;
                    }
                    if !object.claim(agent.id) {
                        ctx.events.push(SimulationEvent::InteractionRefused { agent: agent.id, object: s.target });
                        return Some(Transition::Idle);
                    }
                    agent.motor.stop();
                    s.interacting = true;
                }

                s.timer += dt;
                if s.timer < tuning.interact_interval {
                    return None;
                }
                s.timer = 0.0;

                if !object.can_interact(&agent.interactor(tends), s.intent) {
                    ctx.events.push(SimulationEvent::InteractionRefused { agent: agent.id, object: s.target });
                    return Some(Transition::Idle);
                }
                let mut interaction = InteractionContext {
                    rng: &mut *ctx.rng,
                    events: &mut *ctx.events,
                    effects: &mut *ctx.effects,
                };
                if object.interact(&mut agent.interactor(tends), s.intent, &mut interaction) {
                    debug!(agent = agent.id.0, object = s.target.0, intent = %s.intent, "interaction complete");
                    ctx.events.push(SimulationEvent::InteractionCompleted {
                        agent: agent.id,
                        object: s.target,
                        intent: s.intent,
                    });
                    return Some(Transition::Idle);
                }
                None
            }
        }
    }

    pub fn check_transitions(
        &mut self,
        agent: &mut ElementalAgent<'_>,
        ctx: &mut ElementalContext<'_>,
    ) -> Option<Transition> {
        let tuning = ctx.tuning;
        match self {
            ElementalState::Idle(s) => {
                if let Some(t) = check_for_threats(agent, ctx) {
                    return Some(t);
                }
                if let Some(t) = carry_home(agent, ctx) {
                    return Some(t);
                }
                if s.timer <= 0.0 {
                    let chance = sleep_chance(agent.stats.hp_pct(), tuning.sleep_chance_exponent);
                    return if ctx.rng.gen::<f32>() < chance {
                        Some(Transition::Sleep)
                    } else {
                        Some(Transition::Roam)
                    };
                }
                None
            }
            ElementalState::Roam(_) => {
                if let Some(t) = check_for_threats(agent, ctx) {
                    return Some(t);
                }
                if let Some(t) = carry_home(agent, ctx) {
                    return Some(t);
                }
                agent.motor.has_arrived().then_some(Transition::Idle)
            }
            // asleep: threats go unnoticed
            ElementalState::Sleep(s) => (s.timer <= 0.0).then_some(Transition::Idle),
            ElementalState::Pursue(target) => {
                let view = ctx.other(*target)?;
                let distance = view.position.distance(&agent.position());
                if distance > agent.stats.detection_range {
                    Some(Transition::Idle)
                } else if distance <= agent.stats.attack_range {
                    Some(Transition::Attack(*target))
                } else {
                    None
                }
            }
            ElementalState::Attack(target) => {
                let view = ctx.other(*target)?;
                (view.position.distance(&agent.position()) > agent.stats.attack_range)
                    .then_some(Transition::Pursue(*target))
            }
            ElementalState::Flee(s) => {
                let Some(view) = ctx.other(s.threat) else {
                    return Some(Transition::Idle);
                };
                let escape = agent.stats.detection_range * tuning.flee_escape_factor;
                (view.position.distance(&agent.position()) > escape).then_some(Transition::Idle)
            }
            ElementalState::Interact(_) => check_for_threats(agent, ctx),
        }
    }

    pub fn exit(&mut self, agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
        match self {
            ElementalState::Flee(_) => agent.motor.set_speed(agent.stats.speed),
            ElementalState::Interact(s) => {
                if let Some(object) = ctx.objects.get_mut(s.target) {
                    object.interactable_mut().release(agent.id);
                }
            }
            _ => {}
        }
    }

    /// React to a hit from `attacker`, which deals `damage` per strike
    pub fn on_damage_taken(
        &mut self,
        attacker: AgentId,
        damage: f32,
        agent: &mut ElementalAgent<'_>,
        ctx: &mut ElementalContext<'_>,
    ) -> Option<Transition> {
        let tuning = ctx.tuning;
        let overpowered = damage > agent.stats.damage * tuning.harder_hitter_ratio;
        match self {
            ElementalState::Idle(_) | ElementalState::Roam(_) => {
                let view = ctx.other(attacker)?.clone();
                Some(confront(agent, &view, ctx))
            }
            ElementalState::Sleep(_) => {
                trace!(agent = agent.id.0, "struck while asleep");
                None
            }
            ElementalState::Pursue(target) => {
                (attacker != *target && overpowered).then_some(Transition::Flee(attacker))
            }
            ElementalState::Attack(target) => {
                let desperate = agent.stats.hp_pct() <= tuning.flee_hp_threshold;
                (desperate || (attacker != *target && overpowered)).then_some(Transition::Flee(attacker))
            }
            ElementalState::Flee(s) => {
                if attacker != s.threat {
                    let current = ctx.other(s.threat).map_or(0.0, |v| v.damage);
                    if damage > current {
                        s.threat = attacker;
                    }
                }
                None
            }
            ElementalState::Interact(_) => None,
        }
    }
}
