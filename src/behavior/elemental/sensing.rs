//! Threat and interactable discovery, and the fight-or-flee decision

use rand::Rng;

use crate::behavior::elemental::{ElementalAgent, ElementalContext, Transition};
use crate::world::sensor::{AgentView, EntityRef, QueryFilter};

/// Stand and fight `other`, or run from it
pub fn should_fight(agent: &ElementalAgent<'_>, other: &AgentView, ctx: &mut ElementalContext<'_>) -> bool {
    let favored = ctx
        .policy
        .fight_matchups
        .iter()
        .any(|m| m.against == other.element && agent.stats.hp > other.hp * m.hp_ratio);
    if favored {
        return true;
    }

    ctx.rng.gen::<f32>() > ctx.tuning.brave_threshold
        || agent.stats.hp > other.hp
        || agent.stats.damage > other.damage
        || agent.stats.stamina_pct() <= ctx.tuning.low_stamina_threshold
}

/// React to an elemental that is not of our kind
pub fn confront(agent: &ElementalAgent<'_>, other: &AgentView, ctx: &mut ElementalContext<'_>) -> Transition {
    if should_fight(agent, other, ctx) {
        Transition::Pursue(other.id)
    } else {
        Transition::Flee(other.id)
    }
}

/// Nearest elemental of another element within detection range
pub fn check_for_threats(agent: &ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> Option<Transition> {
    let nearby = ctx
        .sensor
        .query_nearby(agent.position(), agent.stats.detection_range, QueryFilter::Elementals);

    let threat = nearby.into_iter().find_map(|entity| match entity {
        EntityRef::Elemental(id) if id != agent.id => ctx.other(id).filter(|v| v.element != agent.element).cloned(),
        _ => None,
    })?;

    Some(confront(agent, &threat, ctx))
}

/// Nearest object within detection range this elemental has a use for
pub fn check_for_interactables(agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> Option<Transition> {
    let nearby = ctx
        .sensor
        .query_nearby(agent.position(), agent.stats.detection_range, QueryFilter::Objects);
    let tends_objects = ctx.policy.tends_objects;

    for entity in nearby {
        let EntityRef::Object(id) = entity else {
            continue;
        };
        let Some(object) = ctx.objects.get(id) else {
            continue;
        };
        let object = object.interactable();
        if !object.is_active() || !object.guard().is_free_for(agent.id) {
            continue;
        }
        if let Some(intent) = object.discovery_intent(&agent.interactor(tends_objects)) {
            return Some(Transition::Interact(id, intent));
        }
    }
    None
}
