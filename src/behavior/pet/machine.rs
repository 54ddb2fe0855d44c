//! Pet state machine: one active state, rule-driven transitions

use tracing::debug;

use crate::behavior::pet::states::{Fallback, PetState, PlayerCommand, StateOutcome};
use crate::behavior::pet::{PetAgent, PetContext, PetStateKind, PetSubject};
use crate::rules::transition::RuleTier;
use crate::simulation::events::SimulationEvent;

/// Bound on enter-time redirects within a single switch
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone)]
pub struct PetStateMachine {
    current: PetState,
    started: bool,
    time_in_state: f32,
    transitions: u64,
}

impl Default for PetStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PetStateMachine {
    pub fn new() -> Self {
        Self {
            current: PetState::new(PetStateKind::Idle),
            started: false,
            time_in_state: 0.0,
            transitions: 0,
        }
    }

    pub fn current(&self) -> &PetState {
        &self.current
    }

    pub fn kind(&self) -> PetStateKind {
        self.current.kind()
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Number of exit/enter switches performed so far
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    /// Enter the initial state; later calls do nothing
    pub fn start(&mut self, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        if self.started {
            return;
        }
        self.started = true;
        self.time_in_state = 0.0;
        if let Some(redirect) = self.current.enter(pet, ctx) {
            self.switch_to(redirect, pet, ctx);
        }
    }

    /// Decay, global rules, need rules, update, then the timeout guard
    ///
    /// A state that finishes only reaches the random tier when neither the
    /// global nor the need tier fired this tick.
    pub fn tick(&mut self, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        self.start(pet, ctx);

        pet.needs.decay(ctx.dt);
        self.time_in_state += ctx.dt;

        if let Some(kind) = self.select(RuleTier::Global, pet, ctx) {
            self.change_state(kind, pet, ctx);
            return;
        }
        if let Some(kind) = self.select(RuleTier::Need, pet, ctx) {
            self.change_state(kind, pet, ctx);
            return;
        }

        match self.current.update(pet, ctx) {
            StateOutcome::Continue => {}
            StateOutcome::Change(kind) => {
                self.change_state(kind, pet, ctx);
                return;
            }
            StateOutcome::Done(fallback) => {
                self.finish(fallback, pet, ctx);
                return;
            }
        }

        if self.time_in_state >= ctx.tuning.max_time_in_one_state {
            let forced = pet
                .needs
                .most_urgent(ctx.tuning.urgent_need_threshold)
                .map(PetStateKind::for_need)
                .unwrap_or(PetStateKind::Idle);
            debug!(pet = pet.id.0, from = %self.kind(), to = %forced, "state timeout");
            self.time_in_state = 0.0;
            self.change_state(forced, pet, ctx);
        }
    }

    /// Exit the current state and enter `target`; no-op when already there
    pub fn change_state(&mut self, target: PetStateKind, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        if target == self.current.kind() {
            return;
        }
        self.switch_to(target, pet, ctx);
    }

    /// Walk to `destination`, then act on whatever `target_tag` names there
    pub fn issue_command(&mut self, command: PlayerCommand, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        self.start(pet, ctx);
        self.change_state(PetStateKind::Obeying, pet, ctx);
        if let PetState::Obeying(s) = &mut self.current {
            pet.motor.set_destination(command.destination);
            s.command = Some(command);
        }
    }

    fn select(&self, tier: RuleTier, pet: &PetAgent<'_>, ctx: &mut PetContext<'_>) -> Option<PetStateKind> {
        let subject = PetSubject {
            needs: &*pet.needs,
            position: pet.motor.position(),
            pois: ctx.pois,
            radius: ctx.tuning.poi_search_radius,
        };
        ctx.rules.select_transition(tier, self.current.kind(), &subject, ctx.rng)
    }

    fn finish(&mut self, fallback: Fallback, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        if let Some(kind) = self.select(RuleTier::Random, pet, ctx) {
            self.change_state(kind, pet, ctx);
            return;
        }
        match fallback {
            Fallback::Reenter => {
                let kind = self.current.kind();
                self.switch_to(kind, pet, ctx);
            }
            Fallback::Switch(kind) => self.change_state(kind, pet, ctx),
        }
    }

    fn switch_to(&mut self, target: PetStateKind, pet: &mut PetAgent<'_>, ctx: &mut PetContext<'_>) {
        let mut next = target;
        for _ in 0..MAX_REDIRECTS {
            self.current.exit(pet, ctx);
            let from = self.current.kind();
            self.current = PetState::new(next);
            self.time_in_state = 0.0;
            self.transitions += 1;

            debug!(pet = pet.id.0, %from, to = %next, "pet state change");
            ctx.events.push(SimulationEvent::StateChanged {
                agent: pet.id,
                from: from.to_string(),
                to: next.to_string(),
            });

            match self.current.enter(pet, ctx) {
                Some(redirect) if redirect != next => next = redirect,
                _ => return,
            }
        }
    }
}
