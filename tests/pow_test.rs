//! Exponentiation associativity. The active mode is a compile-time
//! choice: right-associative by default, left-associative when the
//! `pow-from-right` feature is disabled.

use fexpr::{assert_approx_eq, compile, variable, Bindings};

/// Each pair must evaluate identically under the active mode.
fn check_equivalences(cases: &[(&str, &str)]) {
    let a = variable(2.0);
    let b = variable(3.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("a", &a);
    bindings.register_variable("b", &b);

    for &(left, right) in cases {
        let lhs = compile(left, &bindings).unwrap_or_else(|e| panic!("{}: {}", left, e));
        let rhs = compile(right, &bindings).unwrap_or_else(|e| panic!("{}: {}", right, e));
        assert_approx_eq!(lhs.eval(), rhs.eval(), 1e-9, "[{}] <> [{}]", left, right);
    }
}

#[cfg(feature = "pow-from-right")]
#[test]
fn chains_nest_to_the_right() {
    check_equivalences(&[
        ("2**3**4", "2**(3**4)"),
        ("2**1.1**1.2**1.3", "2**(1.1**(1.2**1.3))"),
        ("-2**2", "-(2**2)"),
        ("-2**2", "-4"),
        ("--2**2", "(2**2)"),
        ("---2**2", "-(2**2)"),
        ("-(2*1)**2", "-(2**2)"),
        ("-(2)**2", "-(2**2)"),
        ("-a**b", "-(a**b)"),
        ("-a**-b", "-(a**-b)"),
        ("1**0", "1"),
        ("(1)**0", "1"),
        ("-2**-3**-4", "-(2**(-(3**(-4))))"),
    ]);
}

#[cfg(not(feature = "pow-from-right"))]
#[test]
fn chains_nest_to_the_left() {
    check_equivalences(&[
        ("2**3**4", "(2**3)**4"),
        ("2**3**4", "4096"),
        ("2**1.1**1.2**1.3", "((2**1.1)**1.2)**1.3"),
        ("-2**2", "(-2)**2"),
        ("-2**2", "4"),
        ("--2**2", "2**2"),
        ("---2**2", "(-2)**2"),
        ("-a**b", "(-a)**b"),
        ("-a**-b", "(-a)**(-b)"),
        ("1**0", "1"),
        ("(1)**0", "1"),
        ("-2**-3**-4", "((-2)**(-3))**(-4)"),
    ]);
}

/// A negation written in parentheses belongs to the operand in both
/// modes; only the bare unary prefix interacts with the chain.
#[test]
fn parenthesized_negation_is_never_hoisted() {
    check_equivalences(&[("(-2)**2", "4"), ("(-1)**0", "1"), ("(-5)**0", "1")]);
}

#[cfg(feature = "pow-from-right")]
#[test]
fn exponent_chain_values() {
    let bindings = Bindings::new();
    let expr = compile("2 ** 3 ** 4", &bindings).unwrap();
    assert_eq!(expr.eval(), (2.0f64).powf(81.0));
    assert_eq!(fexpr::interp("2**-2").unwrap(), 0.25);
}

#[cfg(not(feature = "pow-from-right"))]
#[test]
fn exponent_chain_values() {
    let bindings = Bindings::new();
    let expr = compile("2 ** 3 ** 4", &bindings).unwrap();
    assert_approx_eq!(expr.eval(), 4096.0, 1e-9);
    assert_eq!(fexpr::interp("2**-2").unwrap(), 0.25);
}
