//! Builtin functions, named constants, and operator implementations.
//!
//! The named registry ([`BUILTINS`]) is a sorted table binary-searched
//! by the lexer after host bindings have been consulted. Operators are
//! separate static entries referenced directly by the parser; they
//! share the same [`BuiltinFn`] shape so the evaluator and printer can
//! treat every non-leaf node uniformly. Everything in this module is
//! pure.
//!
//! Math goes through `f64` inherent methods except `gamma`, which
//! stable `std` does not provide; that one comes from the `libm`
//! crate.

use crate::Real;

/// Bitwise results are masked to the 53-bit mantissa window so they
/// stay exactly representable as doubles. The mask means `~~x` is
/// `x & MASK_53`, not `x`, so nested bitwise-nots are never cancelled.
pub(crate) const MASK_53: i64 = 0x1F_FFFF_FFFF_FFFF;

/// A function implementation, one variant per arity.
#[derive(Clone, Copy)]
pub enum FnImpl {
    F0(fn() -> Real),
    F1(fn(Real) -> Real),
    F2(fn(Real, Real) -> Real),
    F3(fn(Real, Real, Real) -> Real),
    F4(fn(Real, Real, Real, Real) -> Real),
    F5(fn(Real, Real, Real, Real, Real) -> Real),
    F6(fn(Real, Real, Real, Real, Real, Real) -> Real),
    F7(fn(Real, Real, Real, Real, Real, Real, Real) -> Real),
}

impl FnImpl {
    pub fn arity(&self) -> usize {
        match self {
            FnImpl::F0(_) => 0,
            FnImpl::F1(_) => 1,
            FnImpl::F2(_) => 2,
            FnImpl::F3(_) => 3,
            FnImpl::F4(_) => 4,
            FnImpl::F5(_) => 5,
            FnImpl::F6(_) => 6,
            FnImpl::F7(_) => 7,
        }
    }

    /// Applies the function to an argument slice of the matching
    /// length. A length mismatch answers NaN rather than panicking.
    pub fn call(&self, args: &[Real]) -> Real {
        match (self, args) {
            (FnImpl::F0(f), []) => f(),
            (FnImpl::F1(f), &[a]) => f(a),
            (FnImpl::F2(f), &[a, b]) => f(a, b),
            (FnImpl::F3(f), &[a, b, c]) => f(a, b, c),
            (FnImpl::F4(f), &[a, b, c, d]) => f(a, b, c, d),
            (FnImpl::F5(f), &[a, b, c, d, e]) => f(a, b, c, d, e),
            (FnImpl::F6(f), &[a, b, c, d, e, g]) => f(a, b, c, d, e, g),
            (FnImpl::F7(f), &[a, b, c, d, e, g, h]) => f(a, b, c, d, e, g, h),
            _ => Real::NAN,
        }
    }
}

/// A named builtin: a registry entry or an operator.
pub struct BuiltinFn {
    pub name: &'static str,
    pub fun: FnImpl,
}

/// The named registry. Must stay sorted by name: lookup is a binary
/// search on the full identifier lexeme.
pub static BUILTINS: &[BuiltinFn] = &[
    BuiltinFn { name: "abs", fun: FnImpl::F1(Real::abs) },
    BuiltinFn { name: "acos", fun: FnImpl::F1(Real::acos) },
    BuiltinFn { name: "asin", fun: FnImpl::F1(Real::asin) },
    BuiltinFn { name: "atan", fun: FnImpl::F1(Real::atan) },
    BuiltinFn { name: "atan2", fun: FnImpl::F2(Real::atan2) },
    BuiltinFn { name: "cbrt", fun: FnImpl::F1(Real::cbrt) },
    BuiltinFn { name: "ceil", fun: FnImpl::F1(Real::ceil) },
    BuiltinFn { name: "cos", fun: FnImpl::F1(Real::cos) },
    BuiltinFn { name: "cosh", fun: FnImpl::F1(Real::cosh) },
    BuiltinFn { name: "e", fun: FnImpl::F0(euler) },
    BuiltinFn { name: "exp", fun: FnImpl::F1(Real::exp) },
    BuiltinFn { name: "fac", fun: FnImpl::F1(fac) },
    BuiltinFn { name: "floor", fun: FnImpl::F1(Real::floor) },
    BuiltinFn { name: "gamma", fun: FnImpl::F1(libm::tgamma) },
    BuiltinFn { name: "gcd", fun: FnImpl::F2(gcd) },
    BuiltinFn { name: "ln", fun: FnImpl::F1(Real::ln) },
    BuiltinFn { name: "log", fun: FnImpl::F1(log) },
    BuiltinFn { name: "log10", fun: FnImpl::F1(Real::log10) },
    BuiltinFn { name: "log2", fun: FnImpl::F1(Real::log2) },
    BuiltinFn { name: "max", fun: FnImpl::F2(Real::max) },
    BuiltinFn { name: "min", fun: FnImpl::F2(Real::min) },
    BuiltinFn { name: "mod", fun: FnImpl::F2(rem) },
    BuiltinFn { name: "ncr", fun: FnImpl::F2(ncr) },
    BuiltinFn { name: "npr", fun: FnImpl::F2(npr) },
    BuiltinFn { name: "pi", fun: FnImpl::F0(pi) },
    BuiltinFn { name: "pow", fun: FnImpl::F2(Real::powf) },
    BuiltinFn { name: "sin", fun: FnImpl::F1(Real::sin) },
    BuiltinFn { name: "sinh", fun: FnImpl::F1(Real::sinh) },
    BuiltinFn { name: "sqrt", fun: FnImpl::F1(Real::sqrt) },
    BuiltinFn { name: "tan", fun: FnImpl::F1(Real::tan) },
    BuiltinFn { name: "tanh", fun: FnImpl::F1(Real::tanh) },
];

/// Exact full-name lookup in the sorted registry.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinFn> {
    BUILTINS
        .binary_search_by(|entry| entry.name.cmp(name))
        .ok()
        .map(|index| &BUILTINS[index])
}

// Operator entries. The parser references these directly; they never
// participate in name lookup. The differentiator recognizes nodes by
// the names recorded here.

pub(crate) static ADD: BuiltinFn = BuiltinFn { name: "+", fun: FnImpl::F2(add) };
pub(crate) static SUB: BuiltinFn = BuiltinFn { name: "-", fun: FnImpl::F2(sub) };
pub(crate) static MUL: BuiltinFn = BuiltinFn { name: "*", fun: FnImpl::F2(mul) };
pub(crate) static DIV: BuiltinFn = BuiltinFn { name: "/", fun: FnImpl::F2(div) };
pub(crate) static REM: BuiltinFn = BuiltinFn { name: "%", fun: FnImpl::F2(rem) };
pub(crate) static POW: BuiltinFn = BuiltinFn { name: "pow", fun: FnImpl::F2(Real::powf) };
pub(crate) static COMMA: BuiltinFn = BuiltinFn { name: ",", fun: FnImpl::F2(comma) };

pub(crate) static LESS: BuiltinFn = BuiltinFn { name: "<", fun: FnImpl::F2(less) };
pub(crate) static LESS_EQ: BuiltinFn = BuiltinFn { name: "<=", fun: FnImpl::F2(less_eq) };
pub(crate) static GREATER: BuiltinFn = BuiltinFn { name: ">", fun: FnImpl::F2(greater) };
pub(crate) static GREATER_EQ: BuiltinFn = BuiltinFn { name: ">=", fun: FnImpl::F2(greater_eq) };
pub(crate) static EQUAL: BuiltinFn = BuiltinFn { name: "==", fun: FnImpl::F2(equal) };
pub(crate) static NOT_EQUAL: BuiltinFn = BuiltinFn { name: "!=", fun: FnImpl::F2(not_equal) };

pub(crate) static SHL: BuiltinFn = BuiltinFn { name: "<<", fun: FnImpl::F2(shift_left) };
pub(crate) static SHR: BuiltinFn = BuiltinFn { name: ">>", fun: FnImpl::F2(shift_right) };
pub(crate) static BIT_AND: BuiltinFn = BuiltinFn { name: "&", fun: FnImpl::F2(bit_and) };
pub(crate) static BIT_OR: BuiltinFn = BuiltinFn { name: "|", fun: FnImpl::F2(bit_or) };
pub(crate) static BIT_XOR: BuiltinFn = BuiltinFn { name: "^", fun: FnImpl::F2(bit_xor) };

pub(crate) static LOG_AND: BuiltinFn = BuiltinFn { name: "&&", fun: FnImpl::F2(log_and) };
pub(crate) static LOG_OR: BuiltinFn = BuiltinFn { name: "||", fun: FnImpl::F2(log_or) };
pub(crate) static LOG_XOR: BuiltinFn = BuiltinFn { name: "^^", fun: FnImpl::F2(log_xor) };

// Folded unary prefixes, one entry per encoding the parser can emit.

pub(crate) static NEG: BuiltinFn = BuiltinFn { name: "neg", fun: FnImpl::F1(neg) };
pub(crate) static LOG_NOT: BuiltinFn = BuiltinFn { name: "!", fun: FnImpl::F1(log_not) };
pub(crate) static LOG_NOT_NOT: BuiltinFn = BuiltinFn { name: "!!", fun: FnImpl::F1(log_not_not) };
pub(crate) static NEG_LOG_NOT: BuiltinFn = BuiltinFn { name: "-!", fun: FnImpl::F1(neg_log_not) };
pub(crate) static NEG_LOG_NOT_NOT: BuiltinFn =
    BuiltinFn { name: "-!!", fun: FnImpl::F1(neg_log_not_not) };
pub(crate) static BIT_NOT: BuiltinFn = BuiltinFn { name: "~", fun: FnImpl::F1(bit_not) };
pub(crate) static BIT_NOT_NOT: BuiltinFn = BuiltinFn { name: "~~", fun: FnImpl::F1(bit_not_not) };

// Entries the differentiator needs for constructing derivative trees.
// They share names with their registry counterparts, so printed and
// re-differentiated trees are indistinguishable from parsed ones.

pub(crate) static SIN: BuiltinFn = BuiltinFn { name: "sin", fun: FnImpl::F1(Real::sin) };
pub(crate) static COS: BuiltinFn = BuiltinFn { name: "cos", fun: FnImpl::F1(Real::cos) };
pub(crate) static EXP: BuiltinFn = BuiltinFn { name: "exp", fun: FnImpl::F1(Real::exp) };
pub(crate) static LN: BuiltinFn = BuiltinFn { name: "ln", fun: FnImpl::F1(Real::ln) };

/// `log` defaults to base 10; the `nat-log` feature rebinds it to the
/// natural logarithm. `ln` and `log10` are unaffected.
#[cfg(not(feature = "nat-log"))]
fn log(a: Real) -> Real {
    a.log10()
}

#[cfg(feature = "nat-log")]
fn log(a: Real) -> Real {
    a.ln()
}

fn pi() -> Real {
    crate::constants::PI
}

fn euler() -> Real {
    crate::constants::E
}

fn add(a: Real, b: Real) -> Real {
    a + b
}

fn sub(a: Real, b: Real) -> Real {
    a - b
}

fn mul(a: Real, b: Real) -> Real {
    a * b
}

fn div(a: Real, b: Real) -> Real {
    a / b
}

fn rem(a: Real, b: Real) -> Real {
    a % b
}

/// Comma lists evaluate every element left to right; the value is the
/// last one.
fn comma(_a: Real, b: Real) -> Real {
    b
}

fn neg(a: Real) -> Real {
    -a
}

fn bool_real(cond: bool) -> Real {
    if cond {
        1.0
    } else {
        0.0
    }
}

fn less(a: Real, b: Real) -> Real {
    bool_real(a < b)
}

fn less_eq(a: Real, b: Real) -> Real {
    bool_real(a <= b)
}

fn greater(a: Real, b: Real) -> Real {
    bool_real(a > b)
}

fn greater_eq(a: Real, b: Real) -> Real {
    bool_real(a >= b)
}

fn equal(a: Real, b: Real) -> Real {
    bool_real(a == b)
}

fn not_equal(a: Real, b: Real) -> Real {
    bool_real(a != b)
}

fn log_and(a: Real, b: Real) -> Real {
    bool_real(a != 0.0 && b != 0.0)
}

fn log_or(a: Real, b: Real) -> Real {
    bool_real(a != 0.0 || b != 0.0)
}

fn log_xor(a: Real, b: Real) -> Real {
    bool_real((a != 0.0) != (b != 0.0))
}

fn log_not(a: Real) -> Real {
    bool_real(a == 0.0)
}

fn log_not_not(a: Real) -> Real {
    bool_real(a != 0.0)
}

fn neg_log_not(a: Real) -> Real {
    -log_not(a)
}

fn neg_log_not_not(a: Real) -> Real {
    -log_not_not(a)
}

/// Round-to-nearest-even conversion used by every bitwise operator,
/// the Rust rendering of C's `llrint`. Out-of-range values saturate
/// and NaN converts to 0.
fn to_long(a: Real) -> i64 {
    a.round_ties_even() as i64
}

fn shift_left(a: Real, b: Real) -> Real {
    to_long(a).wrapping_shl(to_long(b) as u32) as Real
}

fn shift_right(a: Real, b: Real) -> Real {
    to_long(a).wrapping_shr(to_long(b) as u32) as Real
}

fn bit_and(a: Real, b: Real) -> Real {
    (to_long(a) & to_long(b)) as Real
}

fn bit_or(a: Real, b: Real) -> Real {
    (to_long(a) | to_long(b)) as Real
}

fn bit_xor(a: Real, b: Real) -> Real {
    (to_long(a) ^ to_long(b)) as Real
}

fn bit_not(a: Real) -> Real {
    (!to_long(a) & MASK_53) as Real
}

/// A folded `~~` prefix. Equals two successive masked complements,
/// which is a 53-bit mask, not the identity.
fn bit_not_not(a: Real) -> Real {
    (to_long(a) & MASK_53) as Real
}

/// `fac(a)` is Γ(a+1): NaN for negative or NaN input, 1 at zero, +∞
/// on overflow.
fn fac(a: Real) -> Real {
    if a.is_nan() || a < 0.0 {
        return Real::NAN;
    }
    if a == 0.0 {
        return 1.0;
    }
    libm::tgamma(a + 1.0)
}

/// Binomial coefficient by the symmetric product/divide loop. NaN for
/// negative operands or n < r, +∞ for operands past 2^32-1 or on
/// intermediate 64-bit overflow.
fn ncr(n: Real, r: Real) -> Real {
    if n.is_nan() || r.is_nan() || n < 0.0 || r < 0.0 || n < r {
        return Real::NAN;
    }
    if n > u32::MAX as Real || r > u32::MAX as Real {
        return Real::INFINITY;
    }

    let un = n as u64;
    let mut ur = r as u64;
    if ur > un / 2 {
        ur = un - ur;
    }

    let mut result: u64 = 1;
    for i in 1..=ur {
        if result > u64::MAX / (un - ur + i) {
            return Real::INFINITY;
        }
        result *= un - ur + i;
        result /= i;
    }
    result as Real
}

fn npr(n: Real, r: Real) -> Real {
    ncr(n, r) * fac(r)
}

/// Euclid on the truncated-to-unsigned operands. The conversion
/// saturates, so negative and NaN inputs behave as 0.
fn gcd(x: Real, y: Real) -> Real {
    let (mut a, mut b) = (x as u64, y as u64);
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a as Real
}
