//! Elemental structures: homes that store resources and level up when fed

use serde::Serialize;
use tracing::{debug, info};

use crate::core::config::StructureTuning;
use crate::core::types::{AgentId, ObjectId, Vec2};
use crate::entity::element::ElementType;
use crate::interact::{Interactable, InteractionContext, InteractionType, Interactor, InteractorGuard};
use crate::simulation::events::{SimulationEvent, SpawnCause, WorldEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StructureState {
    Growing,
    Mature,
    Depleting,
    Depleted,
}

#[derive(Debug, Clone, Serialize)]
pub struct ElementalStructure {
    pub id: ObjectId,
    pub element: ElementType,
    pub position: Vec2,
    pub level: u8,
    pub resources_held: f32,
    pub resources_needed: f32,
    pub state: StructureState,
    /// Weak: the owner may be gone by the time it is looked up
    pub owner: Option<AgentId>,
    guard: InteractorGuard,
    spawned_first: bool,
    upgraded_owner: bool,
    spawned_second: bool,
    despawn_timer: Option<f32>,
    #[serde(skip)]
    tuning: StructureTuning,
}

impl ElementalStructure {
    pub fn new(id: ObjectId, element: ElementType, position: Vec2, owner: Option<AgentId>, tuning: StructureTuning) -> Self {
        let mut structure = Self {
            id,
            element,
            position,
            level: 1,
            resources_held: 0.0,
            resources_needed: 0.0,
            state: StructureState::Growing,
            owner,
            guard: InteractorGuard::default(),
            spawned_first: false,
            upgraded_owner: false,
            spawned_second: false,
            despawn_timer: None,
            tuning,
        };
        structure.update_resource_amounts();
        structure
    }

    pub fn is_despawning(&self) -> bool {
        self.despawn_timer.is_some()
    }

    fn update_resource_amounts(&mut self) {
        let exponent = i32::from(self.level) - 1;
        self.resources_held = self.tuning.base_resources_held * self.tuning.held_multiplier.powi(exponent);
        self.resources_needed = self.tuning.base_resources_needed * self.tuning.needed_multiplier.powi(exponent);
    }

    /// Take up to `amount` out of storage; returns what was handed over
    pub fn deplete_resources(&mut self, amount: f32, events: &mut Vec<SimulationEvent>) -> f32 {
        if self.state == StructureState::Depleted {
            return 0.0;
        }
        self.state = StructureState::Depleting;

        let available = amount.max(0.0).min(self.resources_held);
        self.resources_held -= available;

        if self.resources_held <= 0.0 {
            self.resources_held = 0.0;
            self.become_depleted(events);
        }
        available
    }

    fn become_depleted(&mut self, events: &mut Vec<SimulationEvent>) {
        self.state = StructureState::Depleted;
        if self.despawn_timer.is_none() {
            self.level = 0;
            self.update_resource_amounts();
            self.despawn_timer = Some(self.tuning.despawn_delay);
            info!(structure = self.id.0, element = %self.element, "structure depleted");
            events.push(SimulationEvent::StructureDepleted { object: self.id });
        }
    }

    /// Feed the structure; returns how much it absorbed
    ///
    /// Surplus past a level-up goes toward the next level. Nothing is
    /// absorbed while someone is draining it or once it is fully grown.
    pub fn take_in_resources(&mut self, amount: f32, ctx: &mut InteractionContext<'_>) -> f32 {
        if self.state == StructureState::Depleting {
            return 0.0;
        }

        let mut remaining = amount.max(0.0);
        let mut absorbed = 0.0;
        while remaining > 0.0 && self.level < self.tuning.max_level {
            let used = remaining.min(self.resources_needed);
            self.resources_needed -= used;
            remaining -= used;
            absorbed += used;

            if self.resources_needed > 0.0 {
                break;
            }
            self.resources_needed = 0.0;
            self.upgrade(ctx);
        }
        absorbed
    }

    pub fn upgrade(&mut self, ctx: &mut InteractionContext<'_>) {
        if self.level >= self.tuning.max_level {
            return;
        }
        self.despawn_timer = None;
        self.level += 1;
        self.update_resource_amounts();
        self.state = StructureState::Growing;

        match self.level {
            1 if !self.spawned_first => {
                self.spawned_first = true;
                ctx.effects.push(self.companion_spawn());
            }
            2 if !self.upgraded_owner => {
                self.upgraded_owner = true;
                if let Some(owner) = self.owner {
                    ctx.effects.push(WorldEffect::UpgradeOwner { owner });
                }
            }
            _ => {}
        }

        if self.level >= self.tuning.max_level {
            self.state = StructureState::Mature;
            self.resources_needed = 0.0;
            if !self.spawned_second {
                self.spawned_second = true;
                ctx.effects.push(self.companion_spawn());
            }
        }

        info!(structure = self.id.0, level = self.level, "structure upgraded");
        ctx.events.push(SimulationEvent::StructureUpgraded { object: self.id, level: self.level });
    }

    fn companion_spawn(&self) -> WorldEffect {
        WorldEffect::Spawn {
            element: self.element,
            position: self.position,
            cause: SpawnCause::Structure,
        }
    }

    /// Back to the resting state for the current level
    pub fn return_to_default_state(&mut self) {
        self.state = match self.level {
            0 => StructureState::Depleted,
            l if l >= self.tuning.max_level => StructureState::Mature,
            _ => StructureState::Growing,
        };
    }

    /// Advance the despawn countdown; true once the structure should go
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.despawn_timer.as_mut() else {
            return false;
        };
        *remaining -= dt;
        if *remaining > 0.0 {
            return false;
        }
        self.despawn_timer = None;
        self.state == StructureState::Depleted
    }
}

impl Interactable for ElementalStructure {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn element(&self) -> ElementType {
        self.element
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

    fn release(&mut self, agent: AgentId) {
        if self.guard.holder() == Some(agent) {
            self.guard.release(agent);
            if self.state == StructureState::Depleting {
                self.return_to_default_state();
            }
        }
    }

    fn can_interact(&self, agent: &Interactor<'_>, intent: InteractionType) -> bool {
        if agent.element != self.element || !self.guard.is_free_for(agent.id) {
            return false;
        }
        match intent {
            InteractionType::Collect => {
                self.state != StructureState::Depleted && self.resources_held > 0.0 && !agent.ledger.is_full()
            }
            InteractionType::Contribute => {
                self.state != StructureState::Depleting
                    && self.level < self.tuning.max_level
                    && !agent.ledger.is_empty()
            }
        }
    }

    fn interact(
        &mut self,
        agent: &mut Interactor<'_>,
        intent: InteractionType,
        ctx: &mut InteractionContext<'_>,
    ) -> bool {
        match intent {
            InteractionType::Collect => {
                let want = agent.ledger.gather_rate.min(agent.ledger.spare());
                let got = self.deplete_resources(want, ctx.events);
                agent.ledger.deposit(got);
                debug!(structure = self.id.0, agent = agent.id.0, got, "collected");
                agent.ledger.is_full() || self.state == StructureState::Depleted || got <= 0.0
            }
            InteractionType::Contribute => {
                let offered = agent.ledger.withdraw(agent.ledger.gather_rate);
                let absorbed = self.take_in_resources(offered, ctx);
                agent.ledger.deposit(offered - absorbed);
                debug!(structure = self.id.0, agent = agent.id.0, absorbed, "contributed");
                agent.ledger.is_empty() || absorbed <= 0.0 || self.level >= self.tuning.max_level
            }
        }
    }
}
