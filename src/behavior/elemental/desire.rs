//! Structure desire: homeless elementals eventually settle down

use rand::Rng;
use tracing::info;

use crate::behavior::elemental::{ElementalAgent, ElementalContext};
use crate::interact::ElementalStructure;
use crate::simulation::events::SimulationEvent;
use crate::world::objects::WorldObject;

/// Grow desire and maybe place a home; called when a homeless elemental idles
pub fn update_structure_desire(agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) {
    if let Some(home) = *agent.home {
        if ctx.objects.get(home).is_some() {
            return;
        }
        *agent.home = None;
    }
    if !ctx.policy.builds_structures {
        return;
    }

    let tuning = ctx.tuning;
    *agent.desire += tuning.desire_rate;
    if agent.stats.hp_pct() < 0.5 {
        *agent.desire += tuning.desire_low_hp_bonus;
    }
    if agent.ledger.is_full() {
        *agent.desire += tuning.desire_full_bonus;
    }

    if *agent.desire <= tuning.desire_threshold || ctx.rng.gen::<f32>() >= tuning.place_chance {
        return;
    }

    if place_structure(agent, ctx) {
        *agent.desire = 0.0;
    } else {
        *agent.desire *= tuning.desire_decay;
    }
}

fn can_place_structure(agent: &ElementalAgent<'_>, ctx: &ElementalContext<'_>) -> bool {
    let position = agent.position();
    ctx.sensor.is_navigable(position) && !ctx.objects.any_structure_within(position, ctx.tuning.structure_spacing)
}

fn place_structure(agent: &mut ElementalAgent<'_>, ctx: &mut ElementalContext<'_>) -> bool {
    if agent.home.is_some() || !can_place_structure(agent, ctx) {
        return false;
    }

    let id = ctx.ids.object();
    let position = agent.position();
    let structure = ElementalStructure::new(id, agent.element, position, Some(agent.id), ctx.structures.clone());
    ctx.objects.add(WorldObject::Structure(structure));
    *agent.home = Some(id);

    info!(agent = agent.id.0, structure = id.0, element = %agent.element, "structure placed");
    ctx.events.push(SimulationEvent::StructurePlaced {
        object: id,
        owner: agent.id,
        element: agent.element,
    });
    true
}
