//! Pet behavior: need-driven states selected by transition rules

pub mod machine;
pub mod states;

pub use machine::PetStateMachine;
pub use states::{PetState, PlayerCommand};

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::core::config::PetTuning;
use crate::core::types::{AgentId, SimRng, Vec2};
use crate::entity::needs::{NeedKind, NeedSet};
use crate::rules::transition::{RuleSubject, RuleTable};
use crate::simulation::events::SimulationEvent;
use crate::world::locomotion::Locomotion;
use crate::world::poi::PoiRegistry;
use crate::world::sensor::WorldSensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PetStateKind {
    Idle,
    Wander,
    SeekFood,
    Sleep,
    Clean,
    Play,
    Interact,
    Obeying,
}

impl PetStateKind {
    /// The state that tends a need
    pub fn for_need(need: NeedKind) -> Self {
        match need {
            NeedKind::Hunger => PetStateKind::SeekFood,
            NeedKind::Energy => PetStateKind::Sleep,
            NeedKind::Cleanliness => PetStateKind::Clean,
            NeedKind::Happiness => PetStateKind::Play,
        }
    }
}

/// The parts of one pet that its states may touch
pub struct PetAgent<'a> {
    pub id: AgentId,
    pub needs: &'a mut NeedSet,
    pub motor: &'a mut Box<dyn Locomotion>,
}

/// Everything outside the pet that its states read or draw from
pub struct PetContext<'a> {
    pub dt: f32,
    pub pois: &'a PoiRegistry,
    pub sensor: &'a dyn WorldSensor,
    pub rules: &'a RuleTable,
    pub tuning: &'a PetTuning,
    pub rng: &'a mut SimRng,
    pub events: &'a mut Vec<SimulationEvent>,
}

/// Rule evaluation view of a pet
pub(crate) struct PetSubject<'a> {
    pub needs: &'a NeedSet,
    pub position: Vec2,
    pub pois: &'a PoiRegistry,
    pub radius: f32,
}

impl RuleSubject for PetSubject<'_> {
    fn need(&self, kind: NeedKind) -> f32 {
        self.needs.get(kind)
    }

    fn poi_available(&self, tag: &str) -> bool {
        self.pois.nearest_within(tag, self.position, self.radius).is_some()
    }
}
