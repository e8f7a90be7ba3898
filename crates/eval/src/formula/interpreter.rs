//! Formula interpreter over an explicit variable environment.
//!
//! Statements run in order and `assign` mutates the environment seen by
//! every later statement, including those of a following formula that
//! shares the environment. Every arithmetic step coerces NaN and infinities
//! to 0.

use std::collections::{BTreeMap, BTreeSet};

use super::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::error::EvalError;

/// Variable name -> current value.
pub type Env = BTreeMap<String, f64>;

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn truth(v: bool) -> f64 {
    if v {
        1.0
    } else {
        0.0
    }
}

/// Reject calls to unknown functions, bad arities, and reads of names that
/// are neither in `env` nor assigned by an earlier statement. Covers every
/// branch, including ones evaluation would skip.
pub fn validate(program: &Program, env: &Env) -> Result<(), EvalError> {
    let mut assigned: BTreeSet<&str> = BTreeSet::new();
    for stmt in &program.statements {
        match stmt {
            Stmt::Assign { name, expr } => {
                check_expr(expr, env, &assigned)?;
                assigned.insert(name.as_str());
            }
            Stmt::Expr(expr) => check_expr(expr, env, &assigned)?,
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr, env: &Env, assigned: &BTreeSet<&str>) -> Result<(), EvalError> {
    match expr {
        Expr::Num(_) => Ok(()),
        Expr::Var(name) => {
            if env.contains_key(name) || assigned.contains(name.as_str()) {
                Ok(())
            } else {
                Err(EvalError::UnknownVariable { name: name.clone() })
            }
        }
        Expr::Unary { expr, .. } => check_expr(expr, env, assigned),
        Expr::Binary { lhs, rhs, .. } => {
            check_expr(lhs, env, assigned)?;
            check_expr(rhs, env, assigned)
        }
        Expr::Call { name, args } => {
            check_call(name, args.len())?;
            args.iter().try_for_each(|a| check_expr(a, env, assigned))
        }
    }
}

/// Accepted argument counts: `(min, max)`, `None` for variadic.
fn signature(name: &str) -> Option<(usize, Option<usize>)> {
    let sig = match name {
        "abs" | "sqrt" | "log" | "log10" | "floor" | "ceil" | "not" => (1, Some(1)),
        "pow" => (2, Some(2)),
        "round" => (1, Some(2)),
        "if" => (3, Some(3)),
        "min" | "max" | "and" | "or" => (1, None),
        _ => return None,
    };
    Some(sig)
}

fn check_call(name: &str, got: usize) -> Result<(), EvalError> {
    let (min, max) = signature(name).ok_or_else(|| EvalError::UnknownFunction {
        name: name.to_string(),
    })?;
    if got >= min && max.map_or(true, |m| got <= m) {
        return Ok(());
    }
    let expected = match max {
        Some(m) if m == min => min.to_string(),
        Some(m) => format!("{} to {}", min, m),
        None => format!("at least {}", min),
    };
    Err(EvalError::Arity {
        name: name.to_string(),
        expected,
        got,
    })
}

/// Validate, then run a program. Returns the value of the last bare
/// expression, if any.
pub fn run(program: &Program, env: &mut Env) -> Result<Option<f64>, EvalError> {
    validate(program, env)?;
    let mut last = None;
    for stmt in &program.statements {
        match stmt {
            Stmt::Assign { name, expr } => {
                let v = eval(expr, env)?;
                env.insert(name.clone(), v);
            }
            Stmt::Expr(expr) => last = Some(eval(expr, env)?),
        }
    }
    Ok(last)
}

pub fn eval(expr: &Expr, env: &Env) -> Result<f64, EvalError> {
    match expr {
        Expr::Num(n) => Ok(finite(*n)),
        Expr::Var(name) => env
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() }),
        Expr::Unary { op, expr } => {
            let v = eval(expr, env)?;
            Ok(match op {
                UnaryOp::Neg => finite(-v),
                UnaryOp::Not => truth(v == 0.0),
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval(lhs, env)?;
            // && and || short-circuit
            match op {
                BinaryOp::And if l == 0.0 => return Ok(0.0),
                BinaryOp::Or if l != 0.0 => return Ok(1.0),
                _ => {}
            }
            let r = eval(rhs, env)?;
            Ok(match op {
                BinaryOp::Add => finite(l + r),
                BinaryOp::Sub => finite(l - r),
                BinaryOp::Mul => finite(l * r),
                BinaryOp::Div => finite(l / r),
                BinaryOp::Lt => truth(l < r),
                BinaryOp::Le => truth(l <= r),
                BinaryOp::Gt => truth(l > r),
                BinaryOp::Ge => truth(l >= r),
                BinaryOp::Eq => truth(l == r),
                BinaryOp::Ne => truth(l != r),
                BinaryOp::And | BinaryOp::Or => truth(r != 0.0),
            })
        }
        Expr::Call { name, args } => call(name, args, env),
    }
}

fn call(name: &str, args: &[Expr], env: &Env) -> Result<f64, EvalError> {
    check_call(name, args.len())?;
    let unary = |f: fn(f64) -> f64| -> Result<f64, EvalError> {
        Ok(finite(f(eval(&args[0], env)?)))
    };
    match name {
        "abs" => unary(f64::abs),
        "sqrt" => unary(f64::sqrt),
        "log" => unary(f64::ln),
        "log10" => unary(f64::log10),
        "floor" => unary(f64::floor),
        "ceil" => unary(f64::ceil),
        "not" => Ok(truth(eval(&args[0], env)? == 0.0)),
        "pow" => {
            let base = eval(&args[0], env)?;
            let exp = eval(&args[1], env)?;
            Ok(finite(base.powf(exp)))
        }
        "round" => {
            let x = eval(&args[0], env)?;
            if args.len() == 2 {
                let digits = eval(&args[1], env)?.round().clamp(0.0, 12.0);
                let scale = 10f64.powi(digits as i32);
                Ok(finite((x * scale).round() / scale))
            } else {
                Ok(finite(x.round()))
            }
        }
        "min" | "max" => {
            let mut acc = eval(&args[0], env)?;
            for a in &args[1..] {
                let v = eval(a, env)?;
                acc = if name == "min" { acc.min(v) } else { acc.max(v) };
            }
            Ok(acc)
        }
        // lazy: only the taken branch runs
        "if" => {
            if eval(&args[0], env)? != 0.0 {
                eval(&args[1], env)
            } else {
                eval(&args[2], env)
            }
        }
        "and" => {
            for a in args {
                if eval(a, env)? == 0.0 {
                    return Ok(0.0);
                }
            }
            Ok(1.0)
        }
        "or" => {
            for a in args {
                if eval(a, env)? != 0.0 {
                    return Ok(1.0);
                }
            }
            Ok(0.0)
        }
        _ => Err(EvalError::UnknownFunction {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_program;
    use super::*;

    fn eval_str(src: &str, vars: &[(&str, f64)]) -> Result<Option<f64>, EvalError> {
        let mut env: Env = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        run(&parse_program(src)?, &mut env)
    }

    fn value(src: &str, vars: &[(&str, f64)]) -> f64 {
        eval_str(src, vars).unwrap().unwrap()
    }

    #[test]
    fn arithmetic_and_comparison() {
        assert_eq!(value("1 + 2 * 3", &[]), 7.0);
        assert_eq!(value("(1 + 2) * 3", &[]), 9.0);
        assert_eq!(value("n - r + 1", &[("n", 10.0), ("r", 3.0)]), 8.0);
        assert_eq!(value("2 < 3 && 3 <= 3", &[]), 1.0);
        assert_eq!(value("!(1 == 1) || 0", &[]), 0.0);
    }

    #[test]
    fn division_by_zero_is_zero() {
        assert_eq!(value("5 / 0", &[]), 0.0);
        assert_eq!(value("sqrt(0 - 4)", &[]), 0.0);
        assert_eq!(value("log(0) + 1", &[]), 1.0);
    }

    #[test]
    fn assign_is_sequential() {
        let src = r#"assign("a", n * 2); assign("b", a + 1); b * 10"#;
        assert_eq!(value(src, &[("n", 3.0)]), 70.0);
    }

    #[test]
    fn builtin_functions() {
        assert_eq!(value("round(2.5)", &[]), 3.0);
        assert_eq!(value("round(1.23456, 2)", &[]), 1.23);
        assert_eq!(value("pow(2, 10)", &[]), 1024.0);
        assert_eq!(value("min(4, 2, 9)", &[]), 2.0);
        assert_eq!(value("max(1, 10 - 12 + 1)", &[]), 1.0);
        assert_eq!(value("if(r <= 3, 10, 1)", &[("r", 2.0)]), 10.0);
        assert_eq!(value("and(1, 0)", &[]), 0.0);
        assert_eq!(value("or(0, 2)", &[]), 1.0);
        assert_eq!(value("not(0)", &[]), 1.0);
        assert_eq!(value("abs(-3) + floor(2.7) + ceil(0.2)", &[]), 6.0);
        assert!((value("log10(1000)", &[]) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn untaken_branches_are_still_checked() {
        assert_eq!(
            eval_str("if(1, 5, foo(1))", &[]),
            Err(EvalError::UnknownFunction { name: "foo".into() })
        );
        assert_eq!(
            eval_str("0 && mystery", &[]),
            Err(EvalError::UnknownVariable {
                name: "mystery".into()
            })
        );
        assert_eq!(
            eval_str("if(r > 100, mystery, 5)", &[("r", 1.0)]),
            Err(EvalError::UnknownVariable {
                name: "mystery".into()
            })
        );
        assert!(matches!(
            eval_str("or(1, pow(2))", &[]),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn assigned_names_are_known_to_later_statements_only() {
        assert_eq!(value(r#"assign("t", 2); if(0, t, 1)"#, &[]), 1.0);
        assert_eq!(
            eval_str(r#"if(0, t, 1); assign("t", 2)"#, &[]),
            Err(EvalError::UnknownVariable { name: "t".into() })
        );
    }

    #[test]
    fn arity_messages() {
        let err = eval_str("round(1, 2, 3)", &[]).unwrap_err();
        assert_eq!(err.to_string(), "round() takes 1 to 2 argument(s), got 3");
        let err = eval_str("max()", &[]).unwrap_err();
        assert_eq!(err.to_string(), "max() takes at least 1 argument(s), got 0");
    }

    #[test]
    fn unknown_names_fail() {
        assert_eq!(
            eval_str("foo(1)", &[]),
            Err(EvalError::UnknownFunction { name: "foo".into() })
        );
        assert_eq!(
            eval_str("n + mystery", &[("n", 1.0)]),
            Err(EvalError::UnknownVariable {
                name: "mystery".into()
            })
        );
        assert!(matches!(
            eval_str("sqrt(1, 2)", &[]),
            Err(EvalError::Arity { .. })
        ));
    }
}
