//! Elemental archetype using Structure of Arrays layout

use serde::Serialize;

use crate::behavior::elemental::{ElementalAgent, ElementalStateMachine};
use crate::core::types::{AgentId, ObjectId, Vec2};
use crate::entity::element::ElementType;
use crate::entity::stats::{ElementalStats, ResourceLedger};
use crate::world::locomotion::Locomotion;
use crate::world::sensor::AgentView;

#[derive(Debug, Default)]
pub struct ElementalArchetype {
    pub ids: Vec<AgentId>,
    pub names: Vec<String>,
    pub elements: Vec<ElementType>,
    pub stats: Vec<ElementalStats>,
    pub ledgers: Vec<ResourceLedger>,
    /// Seconds until the next attack is allowed
    pub cooldowns: Vec<f32>,
    pub motors: Vec<Box<dyn Locomotion>>,
    pub homes: Vec<Option<ObjectId>>,
    pub desires: Vec<f32>,
    pub alive: Vec<bool>,
    pub machines: Vec<ElementalStateMachine>,
}

/// Serializable view of one elemental
#[derive(Debug, Clone, Serialize)]
pub struct ElementalSnapshot {
    pub id: AgentId,
    pub name: String,
    pub element: ElementType,
    pub state: String,
    pub position: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub stamina: f32,
    pub carrying: f32,
    pub home: Option<ObjectId>,
}

impl ElementalArchetype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        id: AgentId,
        name: String,
        element: ElementType,
        stats: ElementalStats,
        ledger: ResourceLedger,
        motor: Box<dyn Locomotion>,
    ) -> usize {
        self.ids.push(id);
        self.names.push(name);
        self.elements.push(element);
        self.stats.push(stats);
        self.ledgers.push(ledger);
        self.cooldowns.push(0.0);
        self.motors.push(motor);
        self.homes.push(None);
        self.desires.push(0.0);
        self.alive.push(true);
        self.machines.push(ElementalStateMachine::new());
        self.ids.len() - 1
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.ids.iter().position(|&eid| eid == id)
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

    pub fn view(&self, index: usize) -> AgentView {
        AgentView {
            id: self.ids[index],
            element: self.elements[index],
            position: self.motors[index].position(),
            hp: self.stats[index].hp,
            max_hp: self.stats[index].max_hp,
            damage: self.stats[index].damage,
            stamina_pct: self.stats[index].stamina_pct(),
        }
    }

    pub fn snapshot(&self, index: usize) -> ElementalSnapshot {
        ElementalSnapshot {
            id: self.ids[index],
            name: self.names[index].clone(),
            element: self.elements[index],
            state: self.machines[index].kind().to_string(),
            position: self.motors[index].position(),
            hp: self.stats[index].hp,
            max_hp: self.stats[index].max_hp,
            stamina: self.stats[index].stamina,
            carrying: self.ledgers[index].current,
            home: self.homes[index],
        }
    }

    /// Living elementals of one element
    pub fn count(&self, element: ElementType) -> usize {
        self.elements
            .iter()
            .zip(&self.alive)
            .filter(|(e, alive)| **e == element && **alive)
            .count()
    }

    /// Split borrow of one elemental's components and its state machine
    pub fn agent_mut(&mut self, index: usize) -> (ElementalAgent<'_>, &mut ElementalStateMachine) {
        (
            ElementalAgent {
                id: self.ids[index],
                element: self.elements[index],
                stats: &mut self.stats[index],
                ledger: &mut self.ledgers[index],
                cooldown: &mut self.cooldowns[index],
                motor: &mut self.motors[index],
                home: &mut self.homes[index],
                desire: &mut self.desires[index],
            },
            &mut self.machines[index],
        )
    }

    /// Drop dead elementals, returning their ids
    pub fn remove_dead(&mut self) -> Vec<AgentId> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.ids.len() {
            if self.alive[i] {
                i += 1;
                continue;
            }
            removed.push(self.ids.remove(i));
            self.names.remove(i);
            self.elements.remove(i);
            self.stats.remove(i);
            self.ledgers.remove(i);
            self.cooldowns.remove(i);
            self.motors.remove(i);
            self.homes.remove(i);
            self.desires.remove(i);
            self.alive.remove(i);
            self.machines.remove(i);
        }
        removed
    }
}
