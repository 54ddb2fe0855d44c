//! Loose resource pellets: collected once, then gone

use serde::Serialize;

use crate::core::types::{ObjectId, Vec2};
use crate::entity::element::ElementType;
use crate::interact::{Interactable, InteractionContext, InteractionType, Interactor, InteractorGuard};

#[derive(Debug, Clone, Serialize)]
pub struct ResourcePellet {
    pub id: ObjectId,
    pub element: ElementType,
    pub position: Vec2,
    pub amount: f32,
    pub consumed: bool,
    guard: InteractorGuard,
}

impl ResourcePellet {
    pub fn new(id: ObjectId, element: ElementType, position: Vec2, amount: f32) -> Self {
        Self {
            id,
            element,
            position,
            amount,
            consumed: false,
            guard: InteractorGuard::default(),
        }
    }
}

impl Interactable for ResourcePellet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn element(&self) -> ElementType {
        self.element
    }

    fn is_active(&self) -> bool {
        !self.consumed
    }

    fn guard(&self) -> &InteractorGuard {
        &self.guard
    }

    fn guard_mut(&mut self) -> &mut InteractorGuard {
        &mut self.guard
    }

    fn can_interact(&self, agent: &Interactor<'_>, intent: InteractionType) -> bool {
        intent == InteractionType::Collect
            && !self.consumed
            && agent.element == self.element
            && agent.ledger.resource == self.element
            && !agent.ledger.is_full()
            && self.guard.is_free_for(agent.id)
    }

    fn interact(
        &mut self,
        agent: &mut Interactor<'_>,
        _intent: InteractionType,
        _ctx: &mut InteractionContext<'_>,
    ) -> bool {
        // whatever does not fit is lost with the pellet
        agent.ledger.deposit(self.amount);
        self.amount = 0.0;
        self.consumed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AgentId, SimRng};
    use crate::entity::stats::ResourceLedger;
    use rand::SeedableRng;

    #[test]
    fn test_collect_once() {
        let mut rng = SimRng::seed_from_u64(0);
        let mut events = Vec::new();
        let mut effects = Vec::new();
        let mut pellet = ResourcePellet::new(ObjectId(4), ElementType::Fire, Vec2::ZERO, 8.0);
        let mut ledger = ResourceLedger::new(ElementType::Fire, 5.0, 1.0);
        let mut agent = Interactor { id: AgentId(1), element: ElementType::Fire, ledger: &mut ledger, tends_objects: false };

        assert_eq!(pellet.discovery_intent(&agent), Some(InteractionType::Collect));
        let mut ctx = InteractionContext { rng: &mut rng, events: &mut events, effects: &mut effects };
        assert!(pellet.interact(&mut agent, InteractionType::Collect, &mut ctx));
        assert_eq!(agent.ledger.current, 5.0);
        assert!(!pellet.is_active());
        assert!(!pellet.claim(AgentId(2)));
    }

    #[test]
    fn test_wrong_element_ignores_pellet() {
        let pellet = ResourcePellet::new(ObjectId(4), ElementType::Water, Vec2::ZERO, 8.0);
        let mut ledger = ResourceLedger::new(ElementType::Fire, 5.0, 1.0);
        let agent = Interactor { id: AgentId(1), element: ElementType::Fire, ledger: &mut ledger, tends_objects: false };
        assert_eq!(pellet.discovery_intent(&agent), None);
    }
}
