//! Events reported by a tick and effects deferred to the end of it

use serde::Serialize;

use crate::core::types::{AgentId, ObjectId, Vec2};
use crate::entity::element::ElementType;
use crate::interact::InteractionType;

/// Why an elemental came into the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpawnCause {
    Initial,
    Structure,
    Plant,
    Pool,
}

/// Events generated during a simulation tick
///
/// These are returned by `run_simulation_tick` for logs and presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum SimulationEvent {
    StateChanged {
        agent: AgentId,
        from: String,
        to: String,
    },
    ElementalSpawned {
        agent: AgentId,
        element: ElementType,
        position: Vec2,
        cause: SpawnCause,
    },
    ElementalUpgraded {
        agent: AgentId,
    },
    Attacked {
        attacker: AgentId,
        target: AgentId,
        damage: f32,
    },
    ElementalDied {
        agent: AgentId,
        element: ElementType,
        killer: Option<AgentId>,
    },
    InteractionCompleted {
        agent: AgentId,
        object: ObjectId,
        intent: InteractionType,
    },
    InteractionRefused {
        agent: AgentId,
        object: ObjectId,
    },
    StructurePlaced {
        object: ObjectId,
        owner: AgentId,
        element: ElementType,
    },
    StructureUpgraded {
        object: ObjectId,
        level: u8,
    },
    StructureDepleted {
        object: ObjectId,
    },
    PlantIgnited {
        object: ObjectId,
    },
    PlantExtinguished {
        object: ObjectId,
    },
    PlantBurned {
        object: ObjectId,
    },
    PlantRevived {
        object: ObjectId,
    },
    PoolFilled {
        object: ObjectId,
    },
    PoolDried {
        object: ObjectId,
    },
    ObjectDespawned {
        object: ObjectId,
    },
    DoomsdayStarted {
        element: ElementType,
    },
    DoomsdayAverted,
    Calamity {
        position: Vec2,
    },
    GameOver {
        tick: u64,
    },
}

/// Changes requested mid-tick that touch agents other than the one acting
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEffect {
    Spawn {
        element: ElementType,
        position: Vec2,
        cause: SpawnCause,
    },
    UpgradeOwner {
        owner: AgentId,
    },
    Heal {
        agent: AgentId,
        amount: f32,
    },
    Strike {
        attacker: AgentId,
        target: AgentId,
        damage: f32,
    },
}
