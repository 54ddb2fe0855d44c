//! Elemental behavior: self-directed states for combat, rest and upkeep
//!
//! Unlike pets, every elemental state decides its own exits. Threats and
//! interactables are discovered through the tick's sensor snapshot; objects
//! are always re-read from the registry by id.

pub mod desire;
pub mod machine;
pub mod policy;
pub mod sensing;
pub mod states;

pub use machine::ElementalStateMachine;
pub use policy::{ElementalPolicy, Matchup, PolicyTable};
pub use states::ElementalState;

use ahash::AHashSet;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::config::{ElementalTuning, StructureTuning};
use crate::core::types::{AgentId, IdAllocator, ObjectId, SimRng, Vec2};
use crate::entity::element::ElementType;
use crate::entity::stats::{ElementalStats, ResourceLedger};
use crate::interact::{InteractionType, Interactor};
use crate::simulation::events::{SimulationEvent, WorldEffect};
use crate::world::locomotion::Locomotion;
use crate::world::objects::WorldObjects;
use crate::world::sensor::{AgentView, WorldSensor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ElementalStateKind {
    Idle,
    Roam,
    Sleep,
    Pursue,
    Attack,
    Flee,
    Interact,
}

/// A requested state change, with whatever the next state is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Idle,
    Roam,
    Sleep,
    Pursue(AgentId),
    Attack(AgentId),
    Flee(AgentId),
    Interact(ObjectId, InteractionType),
}

impl Transition {
    pub fn kind(&self) -> ElementalStateKind {
        match self {
            Transition::Idle => ElementalStateKind::Idle,
            Transition::Roam => ElementalStateKind::Roam,
            Transition::Sleep => ElementalStateKind::Sleep,
            Transition::Pursue(_) => ElementalStateKind::Pursue,
            Transition::Attack(_) => ElementalStateKind::Attack,
            Transition::Flee(_) => ElementalStateKind::Flee,
            Transition::Interact(..) => ElementalStateKind::Interact,
        }
    }
}

/// The parts of one elemental that its states may touch
pub struct ElementalAgent<'a> {
    pub id: AgentId,
    pub element: ElementType,
    pub stats: &'a mut ElementalStats,
    pub ledger: &'a mut ResourceLedger,
    pub cooldown: &'a mut f32,
    pub motor: &'a mut Box<dyn Locomotion>,
    pub home: &'a mut Option<ObjectId>,
    pub desire: &'a mut f32,
}

impl ElementalAgent<'_> {
    pub fn position(&self) -> Vec2 {
        self.motor.position()
    }

    pub fn interactor(&mut self, tends_objects: bool) -> Interactor<'_> {
        Interactor {
            id: self.id,
            element: self.element,
            ledger: &mut *self.ledger,
            tends_objects,
        }
    }
}

/// Everything outside the elemental that its states read or write
pub struct ElementalContext<'a> {
    pub dt: f32,
    pub sensor: &'a dyn WorldSensor,
    /// Elementals killed earlier this tick; the snapshot still lists them
    pub fallen: &'a AHashSet<AgentId>,
    pub objects: &'a mut WorldObjects,
    pub policy: &'a ElementalPolicy,
    pub tuning: &'a ElementalTuning,
    pub structures: &'a StructureTuning,
    pub ids: &'a mut IdAllocator,
    pub rng: &'a mut SimRng,
    pub events: &'a mut Vec<SimulationEvent>,
    pub effects: &'a mut Vec<WorldEffect>,
}

impl ElementalContext<'_> {
    /// Another elemental as of this tick's snapshot, unless it has fallen since
    pub fn other(&self, id: AgentId) -> Option<&AgentView> {
        if self.fallen.contains(&id) {
            return None;
        }
        self.sensor.elemental(id)
    }
}
