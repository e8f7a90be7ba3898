//! Named points formulas: built-in presets plus user-defined ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a formula scores single tournaments or season standings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaCategory {
    #[default]
    Tournament,
    Season,
}

/// A registered formula. `dependencies` run first, in order, in the same
/// variable environment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaSpec {
    pub key: String,
    pub formula: String,
    pub dependencies: Vec<String>,
    pub description: String,
    pub category: FormulaCategory,
}

/// A formula definition as written in configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomFormula {
    pub formula: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: FormulaCategory,
}

/// Key of the named default formula.
pub const DEFAULT_KEY: &str = "tournament_points";

#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    specs: BTreeMap<String, FormulaSpec>,
}

impl FormulaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        FormulaRegistry::default()
    }

    /// Registry holding the built-in presets.
    pub fn builtin() -> Self {
        let mut reg = FormulaRegistry::new();
        let presets: [(&str, &str, &[&str], &str, FormulaCategory); 6] = [
            (
                DEFAULT_KEY,
                "round(temp + numberofHits, 2)",
                &[r#"assign("temp", 10 * sqrt(n) / sqrt(r))"#],
                "Square-root field strength over finish, plus one point per hit",
                FormulaCategory::Tournament,
            ),
            (
                "simple_rank",
                "max(1, n - r + 1)",
                &[],
                "One point per player outlasted, minimum 1",
                FormulaCategory::Tournament,
            ),
            (
                "hits_bonus",
                "max(1, n - r + 1) + 2 * numberofHits",
                &[],
                "Rank points plus two points per hit",
                FormulaCategory::Tournament,
            ),
            (
                "money_weighted",
                "round(max(1, n - r + 1) * avgBC / max(1, buyinAmount), 2) + numberofHits",
                &[],
                "Rank points scaled by average contribution per buy-in",
                FormulaCategory::Tournament,
            ),
            (
                "season_total",
                "max(1, n - r + 1) + if(winnings > 0, 5, 0)",
                &[],
                "Season standings: rank points with a bonus for cashing",
                FormulaCategory::Season,
            ),
            (
                "season_with_hits",
                "max(1, n - r + 1) + if(winnings > 0, 5, 0) + numberofHits",
                &[],
                "Season standings with hits counted",
                FormulaCategory::Season,
            ),
        ];
        for (key, formula, deps, description, category) in presets {
            reg.insert(FormulaSpec {
                key: key.to_string(),
                formula: formula.to_string(),
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                description: description.to_string(),
                category,
            });
        }
        reg
    }

    /// Built-ins plus custom formulas; a custom key replaces a built-in.
    pub fn with_custom(custom: &BTreeMap<String, CustomFormula>) -> Self {
        let mut reg = FormulaRegistry::builtin();
        for (key, def) in custom {
            reg.insert(FormulaSpec {
                key: key.clone(),
                formula: def.formula.clone(),
                dependencies: def.dependencies.clone(),
                description: def.description.clone(),
                category: def.category,
            });
        }
        reg
    }

    pub fn insert(&mut self, spec: FormulaSpec) {
        if self.specs.contains_key(&spec.key) {
            log::debug!("formula '{}' replaced", spec.key);
        }
        self.specs.insert(spec.key.clone(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&FormulaSpec> {
        self.specs.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormulaSpec> {
        self.specs.values()
    }

    pub fn by_category(&self, category: FormulaCategory) -> impl Iterator<Item = &FormulaSpec> {
        self.specs.values().filter(move |s| s.category == category)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_both_categories() {
        let reg = FormulaRegistry::builtin();
        assert_eq!(reg.len(), 6);
        assert!(reg.get(DEFAULT_KEY).is_some());
        assert_eq!(reg.by_category(FormulaCategory::Season).count(), 2);
    }

    #[test]
    fn custom_overrides_builtin() {
        let mut custom = BTreeMap::new();
        custom.insert(
            "simple_rank".to_string(),
            CustomFormula {
                formula: "1".into(),
                dependencies: vec![],
                description: String::new(),
                category: FormulaCategory::Tournament,
            },
        );
        custom.insert(
            "league_special".to_string(),
            CustomFormula {
                formula: "2 * r".into(),
                dependencies: vec![],
                description: "doubled".into(),
                category: FormulaCategory::Season,
            },
        );
        let reg = FormulaRegistry::with_custom(&custom);
        assert_eq!(reg.len(), 7);
        assert_eq!(reg.get("simple_rank").map(|s| s.formula.as_str()), Some("1"));
        assert_eq!(
            reg.get("league_special").map(|s| s.category),
            Some(FormulaCategory::Season)
        );
    }
}
