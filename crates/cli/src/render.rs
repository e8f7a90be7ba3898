//! Text rendering for `tdt` results. JSON output serializes the result
//! types directly and never passes through here.

use std::fmt::Write as _;

use rust_decimal::Decimal;

use tdt_core::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
use tdt_eval::{FormulaCategory, FormulaRegistry};

use crate::pipeline::ImportOutcome;

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn kind_label(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::Lexer => "lexer",
        DiagnosticKind::Mapping => "mapping",
        DiagnosticKind::Ranking => "ranking",
        DiagnosticKind::Elimination => "elimination",
        DiagnosticKind::Prize => "prize",
        DiagnosticKind::Formula => "formula",
        DiagnosticKind::Config => "config",
    }
}

fn category_label(category: FormulaCategory) -> &'static str {
    match category {
        FormulaCategory::Tournament => "tournament",
        FormulaCategory::Season => "season",
    }
}

/// Two decimal places, for money columns.
fn money(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn format_diagnostic(d: &Diagnostic) -> String {
    let mut line = format!(
        "{}[{}]: {}",
        severity_label(d.severity),
        kind_label(d.kind),
        d.message
    );
    if let Some(player) = &d.player {
        let _ = write!(line, " (player {})", player);
    }
    line
}

/// Diagnostics at or above `min`, one per line, to stderr.
pub fn print_diagnostics(diags: &Diagnostics, min: Severity) {
    for d in diags.iter().filter(|d| d.severity >= min) {
        eprintln!("{}", format_diagnostic(d));
    }
}

/// Standings table plus a short summary block.
pub fn format_import(outcome: &ImportOutcome) -> String {
    let data = &outcome.tournament;
    let mut out = String::new();

    let title = if data.metadata.title.is_empty() {
        "(untitled tournament)"
    } else {
        data.metadata.title.as_str()
    };
    let _ = writeln!(
        out,
        "{}: {} player(s), prize pool {}",
        title,
        data.players.len(),
        money(data.financial.prize_pool)
    );
    let _ = writeln!(out);

    let width = data
        .players
        .values()
        .map(|p| p.nickname.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());
    let _ = writeln!(
        out,
        "{:>4}  {:<width$}  {:>4}  {:>10}  {:>8}",
        "Pos",
        "Player",
        "Hits",
        "Winnings",
        "Points",
        width = width
    );
    for uuid in &outcome.reconcile.ranking.ordered {
        let Some(p) = data.players.get(uuid) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{:>4}  {:<width$}  {:>4}  {:>10}  {:>8}",
            p.finish_position,
            p.nickname,
            p.hits,
            money(p.winnings),
            p.points.normalize().to_string(),
            width = width
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "hit counting: {}", outcome.reconcile.hits.mode);
    let _ = writeln!(out, "points formula: {}", outcome.points.source);
    if outcome.points.fallbacks > 0 {
        let _ = writeln!(
            out,
            "rank fallback used for {} player(s)",
            outcome.points.fallbacks
        );
    }
    let prizes = &outcome.reconcile.prizes;
    let _ = writeln!(
        out,
        "prizes: {} validated, {} discrepancies (bubble position {})",
        prizes.validated_count,
        prizes.discrepancies.len(),
        prizes.bubble_position
    );
    if outcome.reconcile.needs_review() {
        let _ = writeln!(out, "needs review: see warnings");
    }
    out
}

pub fn format_registry(registry: &FormulaRegistry) -> String {
    let width = registry
        .iter()
        .map(|s| s.key.len())
        .max()
        .unwrap_or(0)
        .max("Key".len());
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:<10}  Description",
        "Key",
        "Category",
        width = width
    );
    for spec in registry.iter() {
        let _ = writeln!(
            out,
            "{:<width$}  {:<10}  {}",
            spec.key,
            category_label(spec.category),
            spec.description,
            width = width
        );
    }
    out
}
