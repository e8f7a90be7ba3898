//! tdt-eval: points formulas for Tournament Director imports.
//!
//! Formulas are small arithmetic programs: `assign("name", expr)` statements
//! separated by `;`, ending in the expression that yields the points. They
//! are parsed into a typed AST and interpreted over an explicit variable
//! environment; nothing is ever evaluated as host code.
//!
//! - [`evaluate()`] runs one formula with its dependencies
//! - [`registry`] holds the built-in and configured formulas
//! - [`resolve`] picks the formula for an import
//! - [`points`] scores every player, with a rank-based fallback

pub mod error;
pub mod formula;
pub mod points;
pub mod registry;
pub mod resolve;
pub mod variables;

pub use error::EvalError;
pub use formula::Env;
pub use points::{apply_points, fallback_points, PointsSummary};
pub use registry::{CustomFormula, FormulaCategory, FormulaRegistry, FormulaSpec, DEFAULT_KEY};
pub use resolve::{resolve, FormulaSettings, FormulaSource, ResolvedFormula};
pub use variables::{default_variables, player_variables, VARIABLE_NAMES};

use formula::ast::Stmt;
use formula::{interpreter, parse_program};

/// Evaluate `formula` after running `dependencies` in order.
///
/// All statements share one copy of `vars`, so a dependency's `assign` is
/// visible to later dependencies and to the formula. The result is the
/// formula's last bare expression; a formula without one yields the value it
/// assigned to `points`.
pub fn evaluate<S: AsRef<str>>(
    formula: &str,
    dependencies: &[S],
    vars: &Env,
) -> Result<f64, EvalError> {
    let mut env = vars.clone();
    for dep in dependencies {
        let program = parse_program(dep.as_ref())?;
        interpreter::run(&program, &mut env)?;
    }
    let program = parse_program(formula)?;
    if let Some(v) = interpreter::run(&program, &mut env)? {
        return Ok(v);
    }
    let assigns_points = program
        .statements
        .iter()
        .any(|s| matches!(s, Stmt::Assign { name, .. } if name == "points"));
    if assigns_points {
        env.get("points").copied().ok_or(EvalError::NoResult)
    } else {
        Err(EvalError::NoResult)
    }
}
