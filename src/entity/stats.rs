//! Elemental combat stats and the resource ledger

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entity::element::{ElementType, ElementalData};

/// Rolled once at spawn; only `upgrade` changes the maxima afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementalStats {
    pub max_hp: f32,
    pub hp: f32,
    pub hp_recovery: f32,
    pub max_stamina: f32,
    pub stamina: f32,
    pub stamina_recovery: f32,
    pub stamina_drain: f32,
    pub speed: f32,
    pub damage: f32,
    pub roam_range: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    pub attack_interval: f32,
}

impl ElementalStats {
    pub fn roll(data: &ElementalData, rng: &mut impl Rng) -> Self {
        let max_hp = data.hp.sample(rng);
        let max_stamina = data.stamina.sample(rng);
        Self {
            max_hp,
            hp: max_hp,
            hp_recovery: data.hp_recovery.sample(rng),
            max_stamina,
            stamina: max_stamina,
            stamina_recovery: data.stamina_recovery.sample(rng),
            stamina_drain: data.stamina_drain.sample(rng),
            speed: data.speed.sample(rng),
            damage: data.damage.sample(rng),
            roam_range: data.roam_range.sample(rng),
            detection_range: data.detection_range.sample(rng),
            attack_range: data.attack_range.sample(rng),
            attack_interval: data.attack_interval.sample(rng),
        }
    }

    pub fn hp_pct(&self) -> f32 {
        if self.max_hp > 0.0 { self.hp / self.max_hp } else { 0.0 }
    }

    pub fn stamina_pct(&self) -> f32 {
        if self.max_stamina > 0.0 { self.stamina / self.max_stamina } else { 0.0 }
    }

    pub fn missing_hp(&self) -> f32 {
        (self.max_hp - self.hp).max(0.0)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Spend stamina; returns whether any is left
    pub fn decrease_stamina(&mut self, multiplier: f32, dt: f32) -> bool {
        self.stamina = (self.stamina - self.stamina_drain * multiplier * dt).max(0.0);
        self.stamina > 0.0
    }

    pub fn restore_stamina(&mut self, multiplier: f32, dt: f32) {
        self.stamina = (self.stamina + self.stamina_recovery * multiplier * dt).min(self.max_stamina);
    }

    pub fn restore_hp(&mut self, multiplier: f32, dt: f32) {
        self.heal(self.hp_recovery * multiplier * dt);
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Returns true when the hit was lethal
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.hp = (self.hp - amount).max(0.0);
        self.hp <= 0.0
    }

    /// Multiply the maxima by independent factors drawn from `data`, then refill
    pub fn upgrade(&mut self, data: &ElementalData, rng: &mut impl Rng) {
        self.max_hp *= data.upgrade_factor.sample(rng);
        self.hp = self.max_hp;

        self.max_stamina *= data.upgrade_factor.sample(rng);
        self.stamina = self.max_stamina;

        self.speed *= data.upgrade_factor.sample(rng);
        self.damage *= data.upgrade_factor.sample(rng);
    }
}

/// What an elemental is carrying
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub resource: ElementType,
    pub current: f32,
    pub capacity: f32,
    pub gather_rate: f32,
}

impl ResourceLedger {
    pub fn new(resource: ElementType, capacity: f32, gather_rate: f32) -> Self {
        Self {
            resource,
            current: 0.0,
            capacity,
            gather_rate,
        }
    }

    pub fn spare(&self) -> f32 {
        (self.capacity - self.current).max(0.0)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    /// Store up to `amount`; returns how much was accepted
    pub fn deposit(&mut self, amount: f32) -> f32 {
        let accepted = amount.max(0.0).min(self.spare());
        self.current += accepted;
        accepted
    }

    /// Remove up to `amount`; returns how much was taken
    pub fn withdraw(&mut self, amount: f32) -> f32 {
        let taken = amount.max(0.0).min(self.current);
        self.current -= taken;
        taken
    }

    pub fn upgrade(&mut self, data: &ElementalData, rng: &mut impl Rng) {
        self.capacity *= data.upgrade_factor.sample(rng);
    }
}
