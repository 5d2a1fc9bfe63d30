#![doc = r#"
# fexpr

A compact math expression compiler and evaluator for Rust.

fexpr parses textual infix formulae over IEEE-754 doubles into a small
expression tree that can be evaluated immediately or kept around and
re-evaluated cheaply whenever bound variables change. It was inspired
by [TinyExpr](https://github.com/codeplea/tinyexpr) and follows its
grammar closely, extended with comparison, bitwise, and logical
operator layers, and a symbolic differentiation pass.

Key features:
- One-shot evaluation with [`interp`] or compile-once/evaluate-many
  with [`compile`] and [`Expr::eval`]
- Host bindings: scalar variables, functions of arity 0..=7, and
  closures carrying opaque host context
- Purity-aware constant folding at compile time
- Symbolic differentiation with respect to a bound variable
- Configurable `**` associativity and `log` base via cargo features

## Quick Start

```rust
use fexpr::interp;

let value = interp("sqrt(3**2 + 4**2)").unwrap();
assert_eq!(value, 5.0);

// Comparison, logical, and bitwise layers are all available.
assert_eq!(interp("1 < 2 && 2 < 3").unwrap(), 1.0);
```

## Variables

Variables are shared cells: the host keeps one handle, the compiled
expression keeps another. Updating the cell changes what subsequent
evaluations see, with no recompilation.

```rust
use fexpr::{compile, variable, Bindings};

let x = variable(3.0);
let mut bindings = Bindings::new();
bindings.register_variable("x", &x);

let expr = compile("x**2 + 1", &bindings).unwrap();
assert_eq!(expr.eval(), 10.0);

x.set(5.0);
assert_eq!(expr.eval(), 26.0);
```

## Custom Functions

```rust
use fexpr::{compile, Bindings};

let mut bindings = Bindings::new();
bindings.register_function("mean", 2, |args| (args[0] + args[1]) / 2.0);

let expr = compile("mean(10, 20)", &bindings).unwrap();
assert_eq!(expr.eval(), 15.0);
```

## Closures

A closure is a function that receives an opaque host-owned context as
its first argument. The context stays shared with the host, so state
changes are visible to an already-compiled expression.

```rust
use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use fexpr::{compile, Bindings, ClosureCtx};

let extra = Rc::new(Cell::new(0.0));
let ctx: ClosureCtx = extra.clone();

let mut bindings = Bindings::new();
bindings.register_closure("c2", 2, ctx, |ctx: &dyn Any, args| {
    let extra = ctx.downcast_ref::<Cell<f64>>().unwrap();
    extra.get() + args[0] + args[1]
});

let expr = compile("c2(10, 20)", &bindings).unwrap();
assert_eq!(expr.eval(), 30.0);

extra.set(10.0);
assert_eq!(expr.eval(), 40.0);
```

## Differentiation

```rust
use fexpr::{compile, differentiate, variable, Bindings};

let x = variable(2.0);
let mut bindings = Bindings::new();
bindings.register_variable("x", &x);

let expr = compile("x**3", &bindings).unwrap();
let dexpr = differentiate(&expr, &x).unwrap();
assert!((dexpr.eval() - 12.0).abs() < 1e-9);
```

## Errors

Compilation reports where it stopped: [`ExprError::position`] is the
1-based character offset of the offending input, following the
TinyExpr error-index convention.

```rust
use fexpr::interp;

let err = interp("1+").unwrap_err();
assert_eq!(err.position(), 2);
```

## Grammar

From lowest to highest precedence, all layers left-associative unless
noted:

| Operators                          | Notes                          |
|------------------------------------|--------------------------------|
| `,`                                | value of a list is the last    |
| `&&` `\|\|` `^^`                   | logical, booleanize to 0/1     |
| `&` `\|` `^`                       | bitwise on converted integers  |
| `>` `>=` `<` `<=` `==` `!=` `<>`   | comparison, result 0/1         |
| `<<` `>>`                          | shifts on converted integers   |
| `+` `-`                            |                                |
| `*` `/` `%`                        |                                |
| `**`                               | associativity per feature flag |
| unary `+` `-` `!` `~`              | folded into a single node      |

Function calls take a parenthesized argument list; arity-1 calls may
omit the parentheses (`sin x`), and nullary calls may be written bare
(`pi`) or with empty parentheses (`pi()`).

## Feature Flags

- `pow-from-right` (default): `a**b**c` is `a**(b**c)` and `-a**b` is
  `-(a**b)`. Disable for left-associative `**` with `(-a)**b`.
- `nat-log`: `log` resolves to the natural logarithm instead of the
  base-10 logarithm. `ln` and `log10` are always available.
"#]

pub mod builtins;
pub mod context;
pub mod diff;
pub mod engine;
pub mod error;
mod eval;
mod lexer;
pub mod optimize;
pub mod types;

pub use context::Bindings;
pub use diff::differentiate;
pub use engine::{compile, interp};
pub use error::{ExprError, Result};
pub use optimize::optimize;
pub use types::{variable, ClosureCtx, ClosureFunction, Expr, NativeFunction, VarRef};

/// The scalar type every expression evaluates to.
pub type Real = f64;

pub mod constants {
    use super::Real;

    pub const PI: Real = core::f64::consts::PI;
    pub const E: Real = core::f64::consts::E;
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Asserts that two floating point values are approximately equal,
/// treating NaN == NaN and same-signed infinities as equal. Used
/// throughout the test suite.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $fmt:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $fmt);
        }
    }};
    ($left:expr, $right:expr, $epsilon:expr, $fmt:expr, $($arg:tt)+) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!((left_val - right_val).abs() < eps, $fmt, $($arg)+);
        }
    }};
}
