//! `tdt.toml` configuration and CLI error type.
//!
//! # Example
//!
//! ```toml
//! [hits]
//! mode = "unique_victims"
//!
//! [formulas]
//! tournament = "tournament_points"
//! season = "season_total"
//! override = "simple_rank"
//!
//! [formulas.custom.league_special]
//! formula = "max(1, n - r + 1) * 2"
//! description = "Double rank points"
//! ```
//!
//! Every section is optional. Command-line flags win over the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use tdt_analyze::HitCountingMode;
use tdt_core::TdtError;
use tdt_eval::{CustomFormula, FormulaRegistry, FormulaSettings};

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Tdt(#[from] TdtError),
    #[error("could not serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// JSON form for `--output json`.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            CliError::Tdt(e) => serde_json::json!({ "error": e.to_json_value() }),
            other => serde_json::json!({ "error": other.to_string() }),
        }
    }
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub hits: HitsConfig,
    pub formulas: FormulasConfig,
}

/// `[hits]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitsConfig {
    pub mode: HitCountingMode,
}

/// `[formulas]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FormulasConfig {
    #[serde(flatten)]
    pub settings: FormulaSettings,
    pub custom: BTreeMap<String, CustomFormula>,
}

/// Options given on the command line for one import.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub hit_mode: Option<HitCountingMode>,
    pub formula: Option<String>,
}

impl Config {
    pub fn registry(&self) -> FormulaRegistry {
        FormulaRegistry::with_custom(&self.formulas.custom)
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Config {
        if let Some(mode) = overrides.hit_mode {
            self.hits.mode = mode;
        }
        if let Some(key) = &overrides.formula {
            self.formulas.settings.override_key = Some(key.clone());
        }
        self
    }
}

// ── Functions ─────────────────────────────────────────────────────────────────

pub fn parse_config(content: &str, path: &Path) -> Result<Config, CliError> {
    toml::from_str(content).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Read `path`, or return the defaults when no config was given.
pub fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content, path)?;
    log::debug!(
        "loaded config {}: hit mode {}, {} custom formula(s)",
        path.display(),
        config.hits.mode,
        config.formulas.custom.len()
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tdt_eval::FormulaCategory;

    fn parse(src: &str) -> Result<Config, CliError> {
        parse_config(src, Path::new("tdt.toml"))
    }

    #[test]
    fn empty_file_is_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.hits.mode, HitCountingMode::Auto);
        assert_eq!(config.formulas.settings, FormulaSettings::default());
        assert!(config.formulas.custom.is_empty());
    }

    #[test]
    fn full_file() {
        let config = parse(
            r#"
[hits]
mode = "unique_victims"

[formulas]
tournament = "hits_bonus"
season = "season_total"
override = "simple_rank"

[formulas.custom.league_special]
formula = "max(1, n - r + 1) * 2"
category = "season"
"#,
        )
        .unwrap();
        assert_eq!(config.hits.mode, HitCountingMode::UniqueVictims);
        assert_eq!(config.formulas.settings.tournament.as_deref(), Some("hits_bonus"));
        assert_eq!(config.formulas.settings.override_key.as_deref(), Some("simple_rank"));
        let custom = &config.formulas.custom["league_special"];
        assert_eq!(custom.category, FormulaCategory::Season);
        assert!(custom.dependencies.is_empty());
        assert!(config.registry().get("league_special").is_some());
    }

    #[test]
    fn bad_mode_is_an_error() {
        let err = parse("[hits]\nmode = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(err.to_string().contains("tdt.toml"));
    }

    #[test]
    fn flags_beat_file() {
        let config = parse("[hits]\nmode = \"full_credit\"\n[formulas]\noverride = \"a\"\n")
            .unwrap()
            .with_overrides(&Overrides {
                hit_mode: Some(HitCountingMode::UniqueVictims),
                formula: Some("b".into()),
            });
        assert_eq!(config.hits.mode, HitCountingMode::UniqueVictims);
        assert_eq!(config.formulas.settings.override_key.as_deref(), Some("b"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/tdt.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
