//! Prioritized transition rules for pets
//!
//! Rules live in three tiers. The global tier is asked first and
//! short-circuits; the need tier follows. The random tier is only asked by
//! states that finished what they were doing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::behavior::pet::PetStateKind;
use crate::entity::needs::NeedKind;
use crate::world::poi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleTier {
    Global,
    Need,
    Random,
}

/// What a rule can observe about the pet it is evaluated for
pub trait RuleSubject {
    fn need(&self, kind: NeedKind) -> f32;
    /// Whether an active POI with `tag` is close enough to matter
    fn poi_available(&self, tag: &str) -> bool;
}

/// `invert ? value > threshold : value < threshold`; a zero threshold always passes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeedCondition {
    pub need: NeedKind,
    pub threshold: f32,
    #[serde(default)]
    pub invert: bool,
}

impl NeedCondition {
    pub fn below(need: NeedKind, threshold: f32) -> Self {
        Self { need, threshold, invert: false }
    }

    pub fn above(need: NeedKind, threshold: f32) -> Self {
        Self { need, threshold, invert: true }
    }

    pub fn is_met(&self, value: f32) -> bool {
        if self.threshold == 0.0 {
            return true;
        }
        if self.invert {
            value > self.threshold
        } else {
            value < self.threshold
        }
    }
}

fn default_require_all() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRule {
    pub name: String,
    /// Applies regardless of the current state
    #[serde(default)]
    pub any_state: bool,
    /// Applies only from this state; exclusive with `any_state`
    #[serde(default)]
    pub from: Option<PetStateKind>,
    pub to: PetStateKind,
    #[serde(default)]
    pub priority: i32,
    /// ALL conditions when true, ANY when false
    #[serde(default = "default_require_all")]
    pub require_all: bool,
    #[serde(default)]
    pub conditions: Vec<NeedCondition>,
    /// Percent chance in [0, 100]; 0 disables the roll
    #[serde(default)]
    pub random_chance: f32,
    #[serde(default)]
    pub requires_poi: Option<String>,
}

impl TransitionRule {
    pub fn new(name: &str, to: PetStateKind) -> Self {
        Self {
            name: name.to_string(),
            any_state: true,
            from: None,
            to,
            priority: 0,
            require_all: true,
            conditions: Vec::new(),
            random_chance: 0.0,
            requires_poi: None,
        }
    }

    pub fn from_state(mut self, from: PetStateKind) -> Self {
        self.any_state = false;
        self.from = Some(from);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn when(mut self, condition: NeedCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn any_of(mut self) -> Self {
        self.require_all = false;
        self
    }

    pub fn chance(mut self, percent: f32) -> Self {
        self.random_chance = percent;
        self
    }

    pub fn near(mut self, tag: &str) -> Self {
        self.requires_poi = Some(tag.to_string());
        self
    }

    pub fn applies_to(&self, current: PetStateKind) -> bool {
        self.any_state || self.from == Some(current)
    }

    pub fn evaluate<S: RuleSubject + ?Sized, R: Rng + ?Sized>(&self, subject: &S, rng: &mut R) -> bool {
        let needs_met = if self.conditions.is_empty() {
            true
        } else if self.require_all {
            self.conditions.iter().all(|c| c.is_met(subject.need(c.need)))
        } else {
            self.conditions.iter().any(|c| c.is_met(subject.need(c.need)))
        };
        if !needs_met {
            return false;
        }

        if self.random_chance > 0.0 && rng.gen_range(0.0..100.0) >= self.random_chance {
            return false;
        }

        match &self.requires_poi {
            Some(tag) => subject.poi_available(tag),
            None => true,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match (self.any_state, self.from) {
            (true, Some(from)) => errors.push(format!(
                "{}: any_state rule must not also name from = {:?}",
                self.name, from
            )),
            (false, None) => errors.push(format!("{}: needs either any_state or from", self.name)),
            _ => {}
        }
        if !(0.0..=100.0).contains(&self.random_chance) {
            errors.push(format!(
                "{}: random_chance {} outside [0, 100]",
                self.name, self.random_chance
            ));
        }
        for c in &self.conditions {
            if !(0.0..=100.0).contains(&c.threshold) {
                errors.push(format!(
                    "{}: threshold {} for {} outside [0, 100]",
                    self.name, c.threshold, c.need
                ));
            }
        }
        errors
    }
}

/// All pet transition rules, grouped by tier in declaration order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub global: Vec<TransitionRule>,
    #[serde(default)]
    pub need: Vec<TransitionRule>,
    #[serde(default)]
    pub random: Vec<TransitionRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self, tier: RuleTier) -> &[TransitionRule] {
        match tier {
            RuleTier::Global => &self.global,
            RuleTier::Need => &self.need,
            RuleTier::Random => &self.random,
        }
    }

    pub fn push(&mut self, tier: RuleTier, rule: TransitionRule) {
        match tier {
            RuleTier::Global => self.global.push(rule),
            RuleTier::Need => self.need.push(rule),
            RuleTier::Random => self.random.push(rule),
        }
    }

    /// Highest-priority passing rule in `tier`, first declared on ties
    ///
    /// Returns `None` when nothing passes or the winner targets the state
    /// the pet is already in.
    pub fn select_transition<S: RuleSubject + ?Sized, R: Rng + ?Sized>(
        &self,
        tier: RuleTier,
        current: PetStateKind,
        subject: &S,
        rng: &mut R,
    ) -> Option<PetStateKind> {
        let mut best: Option<&TransitionRule> = None;
        for rule in self.tier(tier).iter().filter(|r| r.applies_to(current)) {
            if !rule.evaluate(subject, rng) {
                continue;
            }
            match best {
                Some(b) if b.priority >= rule.priority => {}
                _ => best = Some(rule),
            }
        }

        let winner = best?;
        if winner.to == current {
            return None;
        }
        tracing::trace!(rule = %winner.name, from = %current, to = %winner.to, "transition rule fired");
        Some(winner.to)
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = [&self.global, &self.need, &self.random]
            .into_iter()
            .flatten()
            .flat_map(|r| r.validate())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The stock behavior set shipped in `data/pet_rules.toml`
    pub fn standard() -> Self {
        use NeedKind::*;
        use PetStateKind::*;

        let mut table = Self::new();

        table.push(RuleTier::Global, TransitionRule::new("Critical Hunger", SeekFood)
            .priority(100)
            .when(NeedCondition::below(Hunger, 15.0)));
        table.push(RuleTier::Global, TransitionRule::new("Critical Energy", Sleep)
            .priority(100)
            .when(NeedCondition::below(Energy, 15.0)));
        table.push(RuleTier::Global, TransitionRule::new("Exhausted And Miserable", Sleep)
            .priority(90)
            .when(NeedCondition::below(Energy, 20.0))
            .when(NeedCondition::below(Happiness, 30.0)));

        table.push(RuleTier::Need, TransitionRule::new("Hungry", SeekFood)
            .from_state(Idle)
            .priority(80)
            .when(NeedCondition::below(Hunger, 30.0)));
        table.push(RuleTier::Need, TransitionRule::new("Tired", Sleep)
            .from_state(Idle)
            .priority(80)
            .when(NeedCondition::below(Energy, 30.0)));
        table.push(RuleTier::Need, TransitionRule::new("Dirty", Clean)
            .from_state(Idle)
            .priority(70)
            .when(NeedCondition::below(Cleanliness, 30.0)));
        table.push(RuleTier::Need, TransitionRule::new("Hungry While Wandering", SeekFood)
            .from_state(Wander)
            .priority(80)
            .when(NeedCondition::below(Hunger, 30.0)));
        table.push(RuleTier::Need, TransitionRule::new("Tired While Wandering", Sleep)
            .from_state(Wander)
            .priority(80)
            .when(NeedCondition::below(Energy, 30.0)));
        table.push(RuleTier::Need, TransitionRule::new("Bored Near Toy", Play)
            .from_state(Idle)
            .priority(30)
            .when(NeedCondition::below(Happiness, 50.0))
            .near(poi::TOY));

        table.push(RuleTier::Random, TransitionRule::new("Restless", Wander)
            .from_state(Idle)
            .priority(50)
            .chance(30.0));
        table.push(RuleTier::Random, TransitionRule::new("Settle Down", Idle)
            .from_state(Wander)
            .priority(50)
            .chance(20.0));
        table.push(RuleTier::Random, TransitionRule::new("Playful", Play)
            .any_of()
            .priority(20)
            .when(NeedCondition::above(Energy, 60.0))
            .when(NeedCondition::above(Happiness, 90.0))
            .chance(10.0)
            .near(poi::TOY));
        table.push(RuleTier::Random, TransitionRule::new("Stretch Legs", Wander)
            .priority(10)
            .chance(25.0));

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::needs::NeedSet;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Subject {
        needs: NeedSet,
        toy_nearby: bool,
    }

    impl RuleSubject for Subject {
        fn need(&self, kind: NeedKind) -> f32 {
            self.needs.get(kind)
        }

        fn poi_available(&self, tag: &str) -> bool {
            tag == poi::TOY && self.toy_nearby
        }
    }

    fn subject() -> Subject {
        Subject { needs: NeedSet::default(), toy_nearby: false }
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_condition_semantics() {
        assert!(NeedCondition::below(NeedKind::Hunger, 30.0).is_met(10.0));
        assert!(!NeedCondition::below(NeedKind::Hunger, 30.0).is_met(30.0));
        assert!(NeedCondition::above(NeedKind::Hunger, 30.0).is_met(31.0));
        // zero threshold is "ignore"
        assert!(NeedCondition::below(NeedKind::Hunger, 0.0).is_met(100.0));
        assert!(NeedCondition::above(NeedKind::Hunger, 0.0).is_met(0.0));
    }

    #[test]
    fn test_highest_priority_wins() {
        let mut table = RuleTable::new();
        table.push(RuleTier::Need, TransitionRule::new("low", PetStateKind::Wander).priority(1));
        table.push(RuleTier::Need, TransitionRule::new("high", PetStateKind::Sleep).priority(5));
        let choice = table.select_transition(RuleTier::Need, PetStateKind::Idle, &subject(), &mut rng());
        assert_eq!(choice, Some(PetStateKind::Sleep));
    }

    #[test]
    fn test_ties_resolve_to_first_declared() {
        let mut table = RuleTable::new();
        table.push(RuleTier::Need, TransitionRule::new("a", PetStateKind::Play).priority(3));
        table.push(RuleTier::Need, TransitionRule::new("b", PetStateKind::Clean).priority(3));
        let choice = table.select_transition(RuleTier::Need, PetStateKind::Idle, &subject(), &mut rng());
        assert_eq!(choice, Some(PetStateKind::Play));
    }

    #[test]
    fn test_target_equal_to_current_yields_none() {
        let mut table = RuleTable::new();
        table.push(RuleTier::Global, TransitionRule::new("stay", PetStateKind::Idle).priority(10));
        let choice = table.select_transition(RuleTier::Global, PetStateKind::Idle, &subject(), &mut rng());
        assert_eq!(choice, None);
    }

    #[test]
    fn test_from_state_filters_applicability() {
        let mut table = RuleTable::new();
        table.push(RuleTier::Need, TransitionRule::new("only idle", PetStateKind::Wander).from_state(PetStateKind::Idle));
        assert_eq!(
            table.select_transition(RuleTier::Need, PetStateKind::Sleep, &subject(), &mut rng()),
            None
        );
        assert_eq!(
            table.select_transition(RuleTier::Need, PetStateKind::Idle, &subject(), &mut rng()),
            Some(PetStateKind::Wander)
        );
    }

    #[test]
    fn test_any_combinator() {
        let rule = TransitionRule::new("either", PetStateKind::Sleep)
            .any_of()
            .when(NeedCondition::below(NeedKind::Energy, 20.0))
            .when(NeedCondition::below(NeedKind::Hunger, 20.0));
        let mut s = subject();
        assert!(!rule.evaluate(&s, &mut rng()));
        s.needs.set(NeedKind::Hunger, 5.0);
        assert!(rule.evaluate(&s, &mut rng()));
    }

    #[test]
    fn test_random_chance_bounds() {
        let always = TransitionRule::new("always", PetStateKind::Wander).chance(100.0);
        let mut r = rng();
        for _ in 0..50 {
            assert!(always.evaluate(&subject(), &mut r));
        }
    }

    #[test]
    fn test_poi_requirement() {
        let rule = TransitionRule::new("toy", PetStateKind::Play).near(poi::TOY);
        let mut s = subject();
        assert!(!rule.evaluate(&s, &mut rng()));
        s.toy_nearby = true;
        assert!(rule.evaluate(&s, &mut rng()));
    }

    #[test]
    fn test_selection_deterministic_for_seed() {
        let table = RuleTable::standard();
        let s = subject();
        let run = |seed: u64| {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            (0..20)
                .map(|_| table.select_transition(RuleTier::Random, PetStateKind::Idle, &s, &mut r))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_critical_hunger_from_idle() {
        let table = RuleTable::standard();
        let mut s = subject();
        s.needs.set(NeedKind::Hunger, 10.0);
        assert_eq!(
            table.select_transition(RuleTier::Global, PetStateKind::Idle, &s, &mut rng()),
            Some(PetStateKind::SeekFood)
        );
    }

    #[test]
    fn test_validation() {
        assert!(RuleTable::standard().validate().is_ok());

        let mut bad = TransitionRule::new("bad", PetStateKind::Idle).chance(150.0);
        bad.any_state = false;
        let errors = bad.validate();
        assert_eq!(errors.len(), 2);
    }
}
