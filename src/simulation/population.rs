//! Population watch: per-element counts and the doomsday countdown
//!
//! An element dying out starts the countdown; every element being present
//! again stops and resets it. Running out ends the game.

use ahash::AHashMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::DoomsdayTuning;
use crate::core::types::{Tick, Vec2};
use crate::entity::element::ElementType;
use crate::simulation::events::SimulationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameOutcome {
    InProgress,
    /// An element stayed extinct until the countdown ran out
    Doomsday,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopulationTracker {
    pub counts: [usize; 3],
    pub doom_active: bool,
    pub doom_remaining: f32,
    pub calamity_spawned: bool,
    pub outcome: GameOutcome,
    #[serde(skip)]
    tuning: DoomsdayTuning,
}

fn slot(element: ElementType) -> usize {
    match element {
        ElementType::Fire => 0,
        ElementType::Water => 1,
        ElementType::Nature => 2,
    }
}

/// Rounded spot holding the most elementals; earliest spot wins ties
pub fn most_populated(positions: &[Vec2]) -> Option<Vec2> {
    let mut buckets: AHashMap<(i64, i64), (usize, usize)> = AHashMap::new();
    for (i, p) in positions.iter().enumerate() {
        let r = p.round();
        let entry = buckets.entry((r.x as i64, r.y as i64)).or_insert((0, i));
        entry.0 += 1;
    }
    buckets
        .into_iter()
        .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
        .map(|((x, y), _)| Vec2::new(x as f32, y as f32))
}

impl PopulationTracker {
    pub fn new(tuning: DoomsdayTuning) -> Self {
        Self {
            counts: [0; 3],
            doom_active: false,
            doom_remaining: tuning.countdown,
            calamity_spawned: false,
            outcome: GameOutcome::InProgress,
            tuning,
        }
    }

    pub fn count(&self, element: ElementType) -> usize {
        self.counts[slot(element)]
    }

    pub fn is_over(&self) -> bool {
        self.outcome != GameOutcome::InProgress
    }

    /// Take in the living population after spawns and deaths
    pub fn update(
        &mut self,
        counts: impl IntoIterator<Item = (ElementType, usize)>,
        positions: &[Vec2],
        events: &mut Vec<SimulationEvent>,
    ) {
        for (element, count) in counts {
            self.counts[slot(element)] = count;
        }
        if !self.tuning.enabled || self.is_over() {
            return;
        }

        let extinct = ElementType::ALL.into_iter().find(|e| self.count(*e) == 0);
        match (self.doom_active, extinct) {
            (false, Some(element)) => {
                warn!(%element, "element extinct, doomsday countdown started");
                self.doom_active = true;
                self.doom_remaining = self.tuning.countdown;
                events.push(SimulationEvent::DoomsdayStarted { element });
            }
            (false, None) => {
                let crowded = self.counts.iter().any(|&c| c > 1);
                if self.tuning.calamity && !self.calamity_spawned && crowded {
                    if let Some(position) = most_populated(positions) {
                        info!(x = position.x, y = position.y, "calamity strikes");
                        self.calamity_spawned = true;
                        events.push(SimulationEvent::Calamity { position });
                    }
                }
            }
            (true, None) => {
                info!("every element present again, doomsday averted");
                self.doom_active = false;
                self.doom_remaining = self.tuning.countdown;
                events.push(SimulationEvent::DoomsdayAverted);
            }
            (true, Some(_)) => {}
        }
    }

    /// Run the countdown down; returns true on the tick the game ends
    pub fn advance(&mut self, dt: f32, tick: Tick, events: &mut Vec<SimulationEvent>) -> bool {
        if !self.doom_active || self.is_over() {
            return false;
        }
        self.doom_remaining -= dt;
        if self.doom_remaining > 0.0 {
            return false;
        }
        warn!(tick, "doomsday");
        self.outcome = GameOutcome::Doomsday;
        events.push(SimulationEvent::GameOver { tick });
        true
    }
}
