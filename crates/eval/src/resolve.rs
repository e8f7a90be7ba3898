//! Which formula scores an import.
//!
//! Highest priority first: the per-import override key, the formula embedded
//! in the file, the active tournament formula setting, the named default,
//! and finally the built-in reference formula. Keys missing from the
//! registry are skipped with a diagnostic.

use serde::{Deserialize, Serialize};
use std::fmt;

use tdt_core::{DiagnosticKind, Diagnostics};

use crate::registry::{FormulaRegistry, FormulaSpec, DEFAULT_KEY};

/// Last-resort formula used when nothing else resolves.
pub const REFERENCE_FORMULA: &str = "if(r <= T33, temp * 2, if(r <= T80, temp, 1)) + numberofHits";

/// Statements run before [`REFERENCE_FORMULA`].
pub const REFERENCE_DEPENDENCIES: &[&str] = &[
    r#"assign("T33", round(n / 3))"#,
    r#"assign("T80", round(n * 0.8))"#,
    r#"assign("temp", 10 * sqrt(n) / sqrt(r))"#,
];

/// Formula selection settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormulaSettings {
    /// Active key for tournament scoring.
    pub tournament: Option<String>,
    /// Active key for season standings.
    pub season: Option<String>,
    /// Per-import override; beats everything else.
    #[serde(rename = "override")]
    pub override_key: Option<String>,
}

/// Where the chosen formula came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "key", rename_all = "snake_case")]
pub enum FormulaSource {
    Override(String),
    Embedded,
    Active(String),
    NamedDefault,
    Hardcoded,
}

impl fmt::Display for FormulaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaSource::Override(key) => write!(f, "override '{}'", key),
            FormulaSource::Embedded => f.write_str("embedded in file"),
            FormulaSource::Active(key) => write!(f, "active setting '{}'", key),
            FormulaSource::NamedDefault => write!(f, "default '{}'", DEFAULT_KEY),
            FormulaSource::Hardcoded => f.write_str("reference formula"),
        }
    }
}

/// The formula chosen for an import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFormula {
    pub source: FormulaSource,
    pub formula: String,
    pub dependencies: Vec<String>,
}

impl ResolvedFormula {
    fn from_spec(source: FormulaSource, spec: &FormulaSpec) -> Self {
        ResolvedFormula {
            source,
            formula: spec.formula.clone(),
            dependencies: spec.dependencies.clone(),
        }
    }

    pub fn reference() -> Self {
        ResolvedFormula {
            source: FormulaSource::Hardcoded,
            formula: REFERENCE_FORMULA.to_string(),
            dependencies: REFERENCE_DEPENDENCIES.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Dependencies and formula as one `; `-joined text.
    pub fn expanded(&self) -> String {
        self.dependencies
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.formula.as_str()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn resolve(
    settings: &FormulaSettings,
    embedded: Option<&str>,
    registry: &FormulaRegistry,
    diags: &mut Diagnostics,
) -> ResolvedFormula {
    if let Some(key) = settings.override_key.as_deref() {
        match registry.get(key) {
            Some(spec) => {
                return ResolvedFormula::from_spec(FormulaSource::Override(key.to_string()), spec)
            }
            None => diags.warn(
                DiagnosticKind::Config,
                format!("override formula '{}' is not registered; ignored", key),
            ),
        }
    }

    if let Some(text) = embedded.map(str::trim).filter(|t| !t.is_empty()) {
        return ResolvedFormula {
            source: FormulaSource::Embedded,
            formula: text.to_string(),
            dependencies: Vec::new(),
        };
    }

    if let Some(key) = settings.tournament.as_deref() {
        match registry.get(key) {
            Some(spec) => {
                return ResolvedFormula::from_spec(FormulaSource::Active(key.to_string()), spec)
            }
            None => diags.warn(
                DiagnosticKind::Config,
                format!("active formula '{}' is not registered; ignored", key),
            ),
        }
    }

    match registry.get(DEFAULT_KEY) {
        Some(spec) => ResolvedFormula::from_spec(FormulaSource::NamedDefault, spec),
        None => ResolvedFormula::reference(),
    }
}
