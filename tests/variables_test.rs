//! Host variable bindings: resolution, rebinding without
//! recompilation, and cross-checks of every arity-1 builtin against
//! its std counterpart.

use fexpr::{assert_approx_eq, compile, interp, variable, Bindings, ExprError, Real};

#[test]
fn bound_names_resolve_exactly() {
    let x = variable(1.0);
    let y = variable(2.0);
    let a = variable(3.0);
    let underscored = variable(4.0);
    let capital = variable(5.0);
    let mixed = variable(6.0);

    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);
    bindings.register_variable("y", &y);
    bindings.register_variable("a", &a);
    bindings.register_variable("_a_", &underscored);
    bindings.register_variable("A", &capital);
    bindings.register_variable("Aa", &mixed);

    let cases: &[(&str, Real)] = &[
        ("x+5", 6.0),
        ("y+5", 7.0),
        ("a+5", 8.0),
        ("_a_+5", 9.0),
        ("A+5", 10.0),
        ("Aa+5", 11.0),
        ("x+y+a+_a_+A+Aa", 21.0),
    ];
    for &(text, expected) in cases {
        let expr = compile(text, &bindings).unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_eq!(expr.eval(), expected, "{}", text);
    }
}

#[test]
fn near_miss_names_do_not_resolve() {
    let x = variable(1.0);
    let y = variable(2.0);
    let test = variable(3.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);
    bindings.register_variable("y", &y);
    bindings.register_variable("te_st", &test);

    assert!(compile("te_st+5", &bindings).is_ok());
    for text in ["xx*y**3", "tes", "sinn x", "si x"] {
        assert!(
            matches!(compile(text, &bindings).unwrap_err(), ExprError::UnknownName { .. }),
            "{} should not resolve",
            text
        );
    }
}

#[test]
fn compiled_expressions_track_variable_updates() {
    let x = variable(0.0);
    let y = variable(0.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);
    bindings.register_variable("y", &y);

    let expr1 = compile("cos x + sin y", &bindings).unwrap();
    let expr2 = compile("x+x+x-y", &bindings).unwrap();
    let expr3 = compile("x*y**3", &bindings).unwrap();

    let mut yv = 2.0;
    while yv < 3.0 {
        y.set(yv);
        let mut xv = 0.0;
        while xv < 5.0 {
            x.set(xv);
            assert_approx_eq!(expr1.eval(), xv.cos() + yv.sin(), 1e-9, "cos x + sin y");
            assert_approx_eq!(expr2.eval(), xv + xv + xv - yv, 1e-9, "x+x+x-y");
            assert_approx_eq!(expr3.eval(), xv * yv * yv * yv, 1e-9, "x*y**3");
            xv += 1.0;
        }
        yv += 1.0;
    }
}

#[test]
fn every_unary_builtin_cross_checks() {
    let x = variable(0.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);

    let cases: &[(&str, fn(Real) -> Real)] = &[
        ("abs x", Real::abs),
        ("acos x", Real::acos),
        ("asin x", Real::asin),
        ("atan x", Real::atan),
        ("cbrt x", Real::cbrt),
        ("ceil x", Real::ceil),
        ("cos x", Real::cos),
        ("cosh x", Real::cosh),
        ("exp x", Real::exp),
        ("floor x", Real::floor),
        ("ln x", Real::ln),
        ("log10 x", Real::log10),
        ("log2 x", Real::log2),
        ("sin x", Real::sin),
        ("sinh x", Real::sinh),
        ("sqrt x", Real::sqrt),
        ("tan x", Real::tan),
        ("tanh x", Real::tanh),
    ];

    for &(text, reference) in cases {
        let expr = compile(text, &bindings).unwrap_or_else(|e| panic!("{}: {}", text, e));
        let mut value = -5.0;
        while value < 5.0 {
            x.set(value);
            assert_approx_eq!(expr.eval(), reference(value), 1e-9, "{}", text);
            value += 0.2;
        }
    }
}

#[test]
fn binary_builtins_cross_check() {
    let x = variable(0.0);
    let y = variable(0.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);
    bindings.register_variable("y", &y);

    let atan2 = compile("atan2(x,y)", &bindings).unwrap();
    let pow = compile("pow(x,y)", &bindings).unwrap();
    let fmod = compile("mod(x,y)", &bindings).unwrap();

    let mut xv = -5.0;
    while xv < 5.0 {
        let mut yv = -2.0;
        while yv < 2.0 {
            x.set(xv);
            y.set(yv);
            assert_approx_eq!(atan2.eval(), xv.atan2(yv), 1e-9, "atan2({},{})", xv, yv);
            assert_approx_eq!(pow.eval(), xv.powf(yv), 1e-9, "pow({},{})", xv, yv);
            assert_approx_eq!(fmod.eval(), xv % yv, 1e-9, "mod({},{})", xv, yv);
            yv += 0.4;
        }
        xv += 0.4;
    }
}

#[test]
fn variables_are_not_rebound_at_eval_time() {
    // Compiling against one binding and registering another with the
    // same name later does not affect the compiled tree.
    let first = variable(1.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("v", &first);
    let expr = compile("v * 10", &bindings).unwrap();

    let second = variable(99.0);
    bindings.register_variable("v", &second);

    assert_eq!(expr.eval(), 10.0);
    first.set(2.0);
    assert_eq!(expr.eval(), 20.0);
}

#[test]
fn interp_has_no_bindings() {
    assert!(matches!(interp("x + 1"), Err(ExprError::UnknownName { .. })));
}
