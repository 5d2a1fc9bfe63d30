//! Tree-walk evaluation.
//!
//! Evaluation never fails. Division by zero, logarithms of
//! non-positive values, and similar situations follow IEEE-754
//! semantics and produce infinities or NaN.

use crate::types::{Expr, FuncDef, MAX_ARITY};
use crate::Real;

impl FuncDef {
    pub(crate) fn call(&self, args: &[Real]) -> Real {
        match self {
            FuncDef::Builtin(builtin) => builtin.fun.call(args),
            FuncDef::Native(native) => (native.fun)(args),
        }
    }
}

impl Expr {
    /// Evaluates the tree.
    ///
    /// Arguments evaluate strictly left to right; `&&`, `||`, and
    /// `^^` booleanize after both operands have been computed, so
    /// there is no short-circuiting. Comma lists evaluate every
    /// element and yield the last.
    pub fn eval(&self) -> Real {
        match self {
            Expr::Constant(value) => *value,
            Expr::Variable(cell) => cell.get(),
            Expr::Function { fun, args } => {
                let mut values = [0.0; MAX_ARITY];
                for (slot, arg) in values.iter_mut().zip(args.iter()) {
                    *slot = arg.eval();
                }
                fun.call(&values[..args.len()])
            }
            Expr::Closure { fun, context, args } => {
                let mut values = [0.0; MAX_ARITY];
                for (slot, arg) in values.iter_mut().zip(args.iter()) {
                    *slot = arg.eval();
                }
                (fun.fun)(context.as_ref(), &values[..args.len()])
            }
        }
    }
}
