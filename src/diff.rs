//! Symbolic differentiation.
//!
//! Builds a derivative tree from standard calculus identities over a
//! small, fixed subset of operators: negation, `sin`, `cos`, `ln`,
//! `exp`, the four arithmetic operators, and `pow`. Everything else
//! (bitwise, comparison, logical, factorial, min/max, host functions,
//! closures) has no symbolic rule and reports
//! [`ExprError::Differentiation`].

use std::rc::Rc;

use crate::builtins;
use crate::builtins::BuiltinFn;
use crate::error::{ExprError, Result};
use crate::optimize::optimize;
use crate::types::{Expr, VarRef};

/// Returns the partial derivative of `expr` with respect to the
/// variable behind `var`, constant-folded before return.
///
/// Variable identity is the cell itself, not a name: the handle
/// passed here must be a clone of the one registered in the bindings
/// the expression was compiled with.
///
/// # Examples
///
/// ```
/// use fexpr::{compile, differentiate, variable, Bindings};
///
/// let x = variable(0.5);
/// let mut bindings = Bindings::new();
/// bindings.register_variable("x", &x);
///
/// let expr = compile("(sin(pi*x))**2", &bindings).unwrap();
/// let dexpr = differentiate(&expr, &x).unwrap();
///
/// // d/dx sin^2(pi x) = pi sin(2 pi x), which is 0 at x = 1/2.
/// assert!(dexpr.eval().abs() < 1e-12);
/// ```
pub fn differentiate(expr: &Expr, var: &VarRef) -> Result<Expr> {
    let mut result = derive(expr, var)?;
    optimize(&mut result);
    Ok(result)
}

fn constant(value: f64) -> Expr {
    Expr::Constant(value)
}

fn call1(fun: &'static BuiltinFn, a: Expr) -> Expr {
    Expr::call1(fun, a)
}

fn call2(fun: &'static BuiltinFn, a: Expr, b: Expr) -> Expr {
    Expr::call2(fun, a, b)
}

/// Chain rule for a one-argument function: `outer(u) * u'`.
fn chain(outer: &'static BuiltinFn, u: &Expr, du: Expr) -> Expr {
    call2(&builtins::MUL, call1(outer, u.clone()), du)
}

fn derive(expr: &Expr, var: &VarRef) -> Result<Expr> {
    match expr {
        Expr::Constant(_) => Ok(constant(0.0)),

        Expr::Variable(cell) => {
            Ok(constant(if Rc::ptr_eq(cell, var) { 1.0 } else { 0.0 }))
        }

        // Nullary calls are constants for differentiation purposes,
        // closures included.
        Expr::Function { args, .. } if args.is_empty() => Ok(constant(0.0)),
        Expr::Closure { args, .. } if args.is_empty() => Ok(constant(0.0)),

        Expr::Function { fun, args } => match (fun.name(), args.len()) {
            ("neg", 1) => {
                let du = derive(&args[0], var)?;
                Ok(call1(&builtins::NEG, du))
            }
            ("sin", 1) => {
                let du = derive(&args[0], var)?;
                Ok(chain(&builtins::COS, &args[0], du))
            }
            ("cos", 1) => {
                let du = derive(&args[0], var)?;
                Ok(call1(&builtins::NEG, chain(&builtins::SIN, &args[0], du)))
            }
            ("exp", 1) => {
                let du = derive(&args[0], var)?;
                Ok(chain(&builtins::EXP, &args[0], du))
            }
            (name, 1) if is_natural_log(name) => {
                let du = derive(&args[0], var)?;
                Ok(call2(&builtins::DIV, du, args[0].clone()))
            }
            ("+", 2) => {
                let du = derive(&args[0], var)?;
                let dv = derive(&args[1], var)?;
                Ok(call2(&builtins::ADD, du, dv))
            }
            ("-", 2) => {
                let du = derive(&args[0], var)?;
                let dv = derive(&args[1], var)?;
                Ok(call2(&builtins::SUB, du, dv))
            }
            ("*", 2) => {
                let (u, v) = (&args[0], &args[1]);
                let du = derive(u, var)?;
                let dv = derive(v, var)?;
                Ok(call2(
                    &builtins::ADD,
                    call2(&builtins::MUL, du, v.clone()),
                    call2(&builtins::MUL, dv, u.clone()),
                ))
            }
            ("/", 2) => {
                let (u, v) = (&args[0], &args[1]);
                let du = derive(u, var)?;
                let dv = derive(v, var)?;
                let numerator = call2(
                    &builtins::SUB,
                    call2(&builtins::MUL, du, v.clone()),
                    call2(&builtins::MUL, dv, u.clone()),
                );
                let denominator = call2(&builtins::POW, v.clone(), constant(2.0));
                Ok(call2(&builtins::DIV, numerator, denominator))
            }
            ("pow", 2) => {
                // (u^v)' = u^v * (u'*v/u + v'*ln u)
                let (u, v) = (&args[0], &args[1]);
                let du = derive(u, var)?;
                let dv = derive(v, var)?;
                let left = call2(
                    &builtins::DIV,
                    call2(&builtins::MUL, du, v.clone()),
                    u.clone(),
                );
                let right = call2(&builtins::MUL, dv, call1(&builtins::LN, u.clone()));
                Ok(call2(
                    &builtins::MUL,
                    expr.clone(),
                    call2(&builtins::ADD, left, right),
                ))
            }
            (name, _) => Err(ExprError::Differentiation { operator: name.to_string() }),
        },

        Expr::Closure { fun, .. } => {
            Err(ExprError::Differentiation { operator: fun.name.clone() })
        }
    }
}

/// `ln` always differentiates as the natural log; `log` does too when
/// the `nat-log` feature rebinds it.
fn is_natural_log(name: &str) -> bool {
    name == "ln" || (cfg!(feature = "nat-log") && name == "log")
}
