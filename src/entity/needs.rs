//! Decaying needs that drive pet behavior

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Upper bound of every need value
pub const NEED_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum NeedKind {
    Hunger,
    Energy,
    Cleanliness,
    Happiness,
}

impl NeedKind {
    pub const ALL: [NeedKind; 4] = [
        NeedKind::Hunger,
        NeedKind::Energy,
        NeedKind::Cleanliness,
        NeedKind::Happiness,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// One need: 100 = fully satisfied, 0 = desperate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Need {
    pub value: f32,
    pub decay_rate: f32,
}

impl Need {
    pub fn new(value: f32, decay_rate: f32) -> Self {
        Self {
            value: value.clamp(0.0, NEED_MAX),
            decay_rate,
        }
    }
}

/// Per-pet override of a single need, as written in pet profiles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NeedOverride {
    pub need: NeedKind,
    #[serde(default)]
    pub value: Option<f32>,
    #[serde(default)]
    pub decay_rate: Option<f32>,
}

/// Every need kind is always present; values stay within [0, 100]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedSet {
    needs: [Need; 4],
}

impl Default for NeedSet {
    fn default() -> Self {
        Self::uniform(NEED_MAX, 2.0)
    }
}

impl NeedSet {
    /// All needs start at `value` and decay at `decay_rate` per second
    pub fn uniform(value: f32, decay_rate: f32) -> Self {
        Self {
            needs: [Need::new(value, decay_rate); 4],
        }
    }

    /// Defaults for every need, then the profile's overrides on top
    pub fn with_overrides(value: f32, decay_rate: f32, overrides: &[NeedOverride]) -> Self {
        let mut set = Self::uniform(value, decay_rate);
        for o in overrides {
            let need = &mut set.needs[o.need.index()];
            if let Some(v) = o.value {
                need.value = v.clamp(0.0, NEED_MAX);
            }
            if let Some(rate) = o.decay_rate {
                need.decay_rate = rate;
            }
        }
        set
    }

    pub fn get(&self, kind: NeedKind) -> f32 {
        self.needs[kind.index()].value
    }

    pub fn need(&self, kind: NeedKind) -> &Need {
        &self.needs[kind.index()]
    }

    pub fn set(&mut self, kind: NeedKind, value: f32) {
        self.needs[kind.index()].value = value.clamp(0.0, NEED_MAX);
    }

    pub fn set_decay_rate(&mut self, kind: NeedKind, rate: f32) {
        self.needs[kind.index()].decay_rate = rate;
    }

    /// Decay every need by its rate (called each tick)
    pub fn decay(&mut self, dt: f32) {
        for need in &mut self.needs {
            need.value = (need.value - need.decay_rate * dt).clamp(0.0, NEED_MAX);
        }
    }

    /// Activity-driven change, expressed relative to doing nothing
    ///
    /// The need's own decay rate is added back first, so a modifier of 0
    /// holds the value steady against this tick's decay.
    pub fn replenish(&mut self, kind: NeedKind, modifier: f32, dt: f32) {
        let need = &mut self.needs[kind.index()];
        need.value = (need.value + (need.decay_rate + modifier) * dt).clamp(0.0, NEED_MAX);
    }

    /// Instant clamp-add
    pub fn inject(&mut self, kind: NeedKind, amount: f32) {
        let need = &mut self.needs[kind.index()];
        need.value = (need.value + amount).clamp(0.0, NEED_MAX);
    }

    /// Lowest need strictly below `threshold`, first declared on ties
    pub fn most_urgent(&self, threshold: f32) -> Option<NeedKind> {
        let mut best: Option<(NeedKind, f32)> = None;
        for kind in NeedKind::ALL {
            let value = self.get(kind);
            if value >= threshold {
                continue;
            }
            match best {
                Some((_, lowest)) if lowest <= value => {}
                _ => best = Some((kind, value)),
            }
        }
        best.map(|(kind, _)| kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NeedKind, f32)> + '_ {
        NeedKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }
}
