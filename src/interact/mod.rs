//! The interactable contract: how objects are discovered, validated and used
//!
//! Structures and pellets trade resources (`Collect` / `Contribute`). Plants
//! and pools are tended: the agent's element decides what a `Contribute`
//! does to them (water, ignite, clear, dry).

pub mod pellet;
pub mod plant;
pub mod pool;
pub mod structure;

pub use pellet::ResourcePellet;
pub use plant::{Plant, PlantState};
pub use pool::{PoolState, WaterPool};
pub use structure::{ElementalStructure, StructureState};

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentId, SimRng, Vec2};
use crate::entity::element::ElementType;
use crate::entity::stats::ResourceLedger;
use crate::simulation::events::{SimulationEvent, WorldEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum InteractionType {
    Collect,
    Contribute,
}

/// The acting elemental, as an object sees it
pub struct Interactor<'a> {
    pub id: AgentId,
    pub element: ElementType,
    pub ledger: &'a mut ResourceLedger,
    /// Whether this archetype tends plants and pools at all
    pub tends_objects: bool,
}

/// World-side outlets available while an interaction runs
pub struct InteractionContext<'a> {
    pub rng: &'a mut SimRng,
    pub events: &'a mut Vec<SimulationEvent>,
    pub effects: &'a mut Vec<WorldEffect>,
}

/// At most one agent may be interacting with an object at a time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InteractorGuard {
    holder: Option<AgentId>,
}

impl InteractorGuard {
    pub fn claim(&mut self, agent: AgentId) -> bool {
        match self.holder {
            Some(holder) if holder != agent => false,
            _ => {
                self.holder = Some(agent);
                true
            }
        }
    }

    /// Only the holder can release
    pub fn release(&mut self, agent: AgentId) {
        if self.holder == Some(agent) {
            self.holder = None;
        }
    }

    pub fn holder(&self) -> Option<AgentId> {
        self.holder
    }

    pub fn is_free_for(&self, agent: AgentId) -> bool {
        self.holder.map_or(true, |h| h == agent)
    }
}

/// Countdown after which an object despawns unless refreshed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Lifetime {
    pub total: f32,
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(total: f32) -> Self {
        Self { total, remaining: total }
    }

    /// Returns true once the lifetime has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt).max(0.0);
        self.remaining <= 0.0
    }

    pub fn refresh(&mut self) {
        self.remaining = self.total;
    }

    pub fn fraction_left(&self) -> f32 {
        if self.total > 0.0 { self.remaining / self.total } else { 0.0 }
    }
}

pub trait Interactable {
    fn position(&self) -> Vec2;

    fn element(&self) -> ElementType;

    /// Inactive objects are skipped by discovery and refuse interaction
    fn is_active(&self) -> bool;

    fn guard(&self) -> &InteractorGuard;

    fn guard_mut(&mut self) -> &mut InteractorGuard;

    fn claim(&mut self, agent: AgentId) -> bool {
        self.is_active() && self.guard_mut().claim(agent)
    }

    fn release(&mut self, agent: AgentId) {
        self.guard_mut().release(agent);
    }

    fn can_interact(&self, agent: &Interactor<'_>, intent: InteractionType) -> bool;

    /// One interaction step; true when the interaction is complete
    fn interact(
        &mut self,
        agent: &mut Interactor<'_>,
        intent: InteractionType,
        ctx: &mut InteractionContext<'_>,
    ) -> bool;

    /// What an agent would come here to do, if anything
    ///
    /// Contribute wins when the agent carries matching resources the object
    /// accepts; otherwise Collect when the agent has room.
    fn discovery_intent(&self, agent: &Interactor<'_>) -> Option<InteractionType> {
        if agent.element != self.element() || agent.ledger.resource != self.element() {
            return None;
        }
        if !agent.ledger.is_empty() && self.can_interact(agent, InteractionType::Contribute) {
            return Some(InteractionType::Contribute);
        }
        if !agent.ledger.is_full() && self.can_interact(agent, InteractionType::Collect) {
            return Some(InteractionType::Collect);
        }
        None
    }
}
