//! Full import: read, reconcile, resolve the points formula, score.

use std::path::Path;

use serde::Serialize;

use tdt_analyze::{reconcile, ReconcileReport};
use tdt_core::{read_tournament, Diagnostics, TournamentData};
use tdt_eval::{apply_points, resolve, PointsSummary};

use crate::config::{CliError, Config};

/// Everything one import produces.
#[derive(Debug, Serialize)]
pub struct ImportOutcome {
    pub tournament: TournamentData,
    pub reconcile: ReconcileReport,
    pub points: PointsSummary,
    pub diagnostics: Diagnostics,
}

pub fn import_source(src: &str, config: &Config) -> Result<ImportOutcome, CliError> {
    let mut diags = Diagnostics::new();
    let mut data = read_tournament(src, &mut diags)?;
    log::debug!(
        "read '{}': {} player(s), {} history event(s)",
        data.metadata.title,
        data.players.len(),
        data.game_history.len()
    );

    let report = reconcile(&mut data, config.hits.mode, &mut diags);

    let registry = config.registry();
    let resolved = resolve(
        &config.formulas.settings,
        data.metadata.points_formula.as_deref(),
        &registry,
        &mut diags,
    );
    log::debug!("points formula from {}: {}", resolved.source, resolved.formula);
    let points = apply_points(&mut data, &resolved, &mut diags);

    Ok(ImportOutcome {
        tournament: data,
        reconcile: report,
        points,
        diagnostics: diags,
    })
}

pub fn import_file(path: &Path, config: &Config) -> Result<ImportOutcome, CliError> {
    let src = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_source(&src, config)
}
