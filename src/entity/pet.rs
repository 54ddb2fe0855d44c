//! Pet archetype using Structure of Arrays layout

use serde::{Deserialize, Serialize};

use crate::behavior::pet::{PetAgent, PetStateMachine};
use crate::core::types::{AgentId, Vec2};
use crate::entity::needs::{NeedKind, NeedOverride, NeedSet};
use crate::world::locomotion::Locomotion;

/// A pet as written in `data/pets.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetProfile {
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub needs: Vec<NeedOverride>,
}

/// Serializable view of one pet
#[derive(Debug, Clone, Serialize)]
pub struct PetSnapshot {
    pub id: AgentId,
    pub name: String,
    pub state: String,
    pub position: Vec2,
    pub needs: Vec<(NeedKind, f32)>,
}

#[derive(Debug, Default)]
pub struct PetArchetype {
    pub ids: Vec<AgentId>,
    pub names: Vec<String>,
    pub needs: Vec<NeedSet>,
    pub motors: Vec<Box<dyn Locomotion>>,
    pub machines: Vec<PetStateMachine>,
}

impl PetArchetype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, id: AgentId, name: String, needs: NeedSet, motor: Box<dyn Locomotion>) -> usize {
        self.ids.push(id);
        self.names.push(name);
        self.needs.push(needs);
        self.motors.push(motor);
        self.machines.push(PetStateMachine::new());
        self.ids.len() - 1
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.ids.iter().position(|&pid| pid == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec2 {
        self.motors[index].position()
    }

    pub fn snapshot(&self, index: usize) -> PetSnapshot {
        PetSnapshot {
            id: self.ids[index],
            name: self.names[index].clone(),
            state: self.machines[index].kind().to_string(),
            position: self.motors[index].position(),
            needs: self.needs[index].iter().collect(),
        }
    }

    /// Split borrow of one pet's components and its state machine
    pub fn agent_mut(&mut self, index: usize) -> (PetAgent<'_>, &mut PetStateMachine) {
        (
            PetAgent {
                id: self.ids[index],
                needs: &mut self.needs[index],
                motor: &mut self.motors[index],
            },
            &mut self.machines[index],
        )
    }
}
