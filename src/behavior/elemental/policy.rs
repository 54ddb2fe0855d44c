//! Per-element behavior switches

use serde::{Deserialize, Serialize};

use crate::entity::element::ElementType;

/// Fight anyone of `against` whose HP is below ours divided by `hp_ratio`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub against: ElementType,
    pub hp_ratio: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalPolicy {
    /// Checked before the generic fight-or-flee roll
    pub fight_matchups: Vec<Matchup>,
    /// Homeless elementals accumulate desire and place a structure
    pub builds_structures: bool,
    /// Plants and pools are worth a visit
    pub tends_objects: bool,
}

impl Default for ElementalPolicy {
    fn default() -> Self {
        Self {
            fight_matchups: Vec::new(),
            builds_structures: true,
            tends_objects: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyTable {
    pub fire: ElementalPolicy,
    pub water: ElementalPolicy,
    pub nature: ElementalPolicy,
}

impl PolicyTable {
    pub fn get(&self, element: ElementType) -> &ElementalPolicy {
        match element {
            ElementType::Fire => &self.fire,
            ElementType::Water => &self.water,
            ElementType::Nature => &self.nature,
        }
    }

    pub fn get_mut(&mut self, element: ElementType) -> &mut ElementalPolicy {
        match element {
            ElementType::Fire => &mut self.fire,
            ElementType::Water => &mut self.water,
            ElementType::Nature => &mut self.nature,
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for element in ElementType::ALL {
            for matchup in &self.get(element).fight_matchups {
                if matchup.hp_ratio <= 0.0 {
                    errors.push(format!(
                        "{} matchup against {}: hp_ratio must be positive",
                        element, matchup.against
                    ));
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let table: PolicyTable = toml::from_str(
            r#"
            [water]
            tends_objects = false

            [[fire.fight_matchups]]
            against = "Nature"
            hp_ratio = 0.8
            "#,
        )
        .unwrap();
        assert!(!table.get(ElementType::Water).tends_objects);
        assert!(table.get(ElementType::Water).builds_structures);
        assert_eq!(table.get(ElementType::Fire).fight_matchups.len(), 1);
        assert!(table.validate().is_empty());
    }

    #[test]
    fn test_rejects_non_positive_ratio() {
        let mut table = PolicyTable::default();
        table.get_mut(ElementType::Nature).fight_matchups.push(Matchup {
            against: ElementType::Fire,
            hp_ratio: 0.0,
        });
        assert_eq!(table.validate().len(), 1);
    }
}
