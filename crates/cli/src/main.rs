mod config;
mod pipeline;
mod render;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use tdt_analyze::HitCountingMode;
use tdt_core::{parse_source, Diagnostics, Severity};
use tdt_eval::{default_variables, evaluate, Env};

use config::{load_config, CliError, Overrides};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Tournament Director import toolchain.
#[derive(Parser)]
#[command(name = "tdt", version, about = "Tournament Director import toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Debug logging and info-level diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a .tdt file: rank, reconcile hits, validate prizes, score points
    Import {
        /// Path to the .tdt file
        file: PathBuf,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Hit counting mode (full_credit, unique_victims, auto)
        #[arg(long)]
        hit_mode: Option<HitCountingMode>,
        /// Registered formula key; overrides the formula embedded in the file
        #[arg(long)]
        formula: Option<String>,
    },

    /// Lex and parse a .tdt file and print its syntax tree as JSON
    Parse {
        /// Path to the .tdt file
        file: PathBuf,
    },

    /// List registered points formulas
    Formulas {
        /// TOML configuration file with custom formulas
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a points formula against the default variables
    Eval {
        /// Formula text, e.g. "max(1, n - r + 1)"
        formula: String,
        /// Variable assignment NAME=VALUE (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
        /// Dependency statement run before the formula (repeatable)
        #[arg(long = "dep")]
        dependencies: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(level));

    match cli.command {
        Commands::Import {
            file,
            config,
            hit_mode,
            formula,
        } => {
            let overrides = Overrides { hit_mode, formula };
            cmd_import(
                &file,
                config.as_deref(),
                &overrides,
                cli.output,
                cli.quiet,
                cli.verbose,
            );
        }
        Commands::Parse { file } => {
            cmd_parse(&file, cli.output, cli.quiet);
        }
        Commands::Formulas { config } => {
            cmd_formulas(config.as_deref(), cli.output, cli.quiet);
        }
        Commands::Eval {
            formula,
            vars,
            dependencies,
        } => {
            cmd_eval(&formula, &vars, &dependencies, cli.output, cli.quiet);
        }
    }
}

// ──────────────────────────────────────────────
// Subcommands
// ──────────────────────────────────────────────

fn cmd_import(
    file: &Path,
    config_path: Option<&Path>,
    overrides: &Overrides,
    output: OutputFormat,
    quiet: bool,
    verbose: bool,
) {
    let config = match load_config(config_path) {
        Ok(c) => c.with_overrides(overrides),
        Err(e) => fail(&e, output, quiet),
    };
    let outcome = match pipeline::import_file(file, &config) {
        Ok(o) => o,
        Err(e) => fail(&e, output, quiet),
    };

    match output {
        OutputFormat::Json => print_json(&outcome, output, quiet),
        OutputFormat::Text => {
            if !quiet {
                let min = if verbose {
                    Severity::Info
                } else {
                    Severity::Warning
                };
                render::print_diagnostics(&outcome.diagnostics, min);
            }
            print!("{}", render::format_import(&outcome));
        }
    }
}

fn cmd_parse(file: &Path, output: OutputFormat, quiet: bool) {
    let src = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(source) => fail(
            &CliError::Io {
                path: file.to_path_buf(),
                source,
            },
            output,
            quiet,
        ),
    };
    let mut diags = Diagnostics::new();
    let root = match parse_source(&src, &mut diags) {
        Ok(r) => r,
        Err(e) => fail(&CliError::from(e), output, quiet),
    };
    if !quiet {
        render::print_diagnostics(&diags, Severity::Warning);
    }
    print_json(&root, output, quiet);
}

fn cmd_formulas(config_path: Option<&Path>, output: OutputFormat, quiet: bool) {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => fail(&e, output, quiet),
    };
    let registry = config.registry();
    match output {
        OutputFormat::Json => {
            let specs: Vec<_> = registry.iter().collect();
            print_json(&specs, output, quiet);
        }
        OutputFormat::Text => print!("{}", render::format_registry(&registry)),
    }
}

fn cmd_eval(
    formula: &str,
    assignments: &[String],
    dependencies: &[String],
    output: OutputFormat,
    quiet: bool,
) {
    let overrides = match parse_assignments(assignments) {
        Ok(v) => v,
        Err(e) => fail(&e, output, quiet),
    };
    let n = overrides
        .iter()
        .find(|(name, _)| name == "n")
        .map(|(_, v)| v.max(0.0).round() as usize)
        .unwrap_or(0);
    let mut vars: Env = default_variables(n);
    vars.extend(overrides);

    match evaluate(formula, dependencies, &vars) {
        Ok(value) => match output {
            OutputFormat::Json => print_json(
                &serde_json::json!({ "formula": formula, "value": value }),
                output,
                quiet,
            ),
            OutputFormat::Text => println!("{}", value),
        },
        Err(e) => {
            if !quiet {
                match output {
                    OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": e })),
                    OutputFormat::Text => eprintln!("error: {}", e),
                }
            }
            process::exit(1);
        }
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Parse repeated `NAME=VALUE` arguments.
fn parse_assignments(args: &[String]) -> Result<Vec<(String, f64)>, CliError> {
    args.iter()
        .map(|arg| {
            let (name, value) = arg
                .split_once('=')
                .ok_or_else(|| CliError::Usage(format!("expected NAME=VALUE, got '{}'", arg)))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(CliError::Usage(format!("empty variable name in '{}'", arg)));
            }
            let value: f64 = value.trim().parse().map_err(|_| {
                CliError::Usage(format!("'{}' is not a number (in '{}')", value.trim(), arg))
            })?;
            Ok((name.to_string(), value))
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T, output: OutputFormat, quiet: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => fail(&CliError::from(e), output, quiet),
    }
}

/// Report a fatal error and exit with status 1.
fn fail(err: &CliError, output: OutputFormat, quiet: bool) -> ! {
    log::debug!("fatal: {:?}", err);
    match output {
        OutputFormat::Json if !quiet => eprintln!("{}", err.to_json_value()),
        _ => report_error(&format!("error: {}", err), output, quiet),
    }
    process::exit(1);
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_parse() {
        let parsed =
            parse_assignments(&["n=9".to_string(), " r = 2.5 ".to_string()]).unwrap();
        assert_eq!(parsed, vec![("n".to_string(), 9.0), ("r".to_string(), 2.5)]);
    }

    #[test]
    fn malformed_assignments_fail() {
        for bad in ["n", "=3", "n=three"] {
            assert!(
                matches!(parse_assignments(&[bad.to_string()]), Err(CliError::Usage(_))),
                "{} accepted",
                bad
            );
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
