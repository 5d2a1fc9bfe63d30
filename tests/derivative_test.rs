//! End-to-end differentiation scenarios against numeric expectations.

use fexpr::{assert_approx_eq, compile, differentiate, variable, Bindings};

#[test]
fn derivative_of_sin_squared_vanishes_at_half() {
    let x = variable(0.5);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);

    let expr = compile("(sin(pi*x))**2", &bindings).unwrap();
    assert_approx_eq!(expr.eval(), 1.0);
    // Depends on x, so optimization must not collapse it.
    assert!(expr.as_constant().is_none());

    // d/dx sin^2(pi x) = pi sin(2 pi x): zero at x = 1/2, pi at 1/4.
    let dexpr = differentiate(&expr, &x).unwrap();
    assert!(dexpr.eval().abs() < 1e-12);

    x.set(0.25);
    assert_approx_eq!(dexpr.eval(), fexpr::constants::PI, 1e-9);
}

#[test]
fn derivative_matches_finite_differences() {
    let x = variable(0.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);

    let cases = [
        "x*x + 3*x + 1",
        "sin(x) * cos(x)",
        "exp(x) / (x + 2)",
        "ln(x + 3)",
        "(x + 1)**3",
        "exp(sin(x))",
    ];

    for text in cases {
        let expr = compile(text, &bindings).unwrap();
        let dexpr = differentiate(&expr, &x).unwrap();

        // The symbolic power rule is singular where its base is zero,
        // so the sample points avoid x = -1 for (x + 1)**3.
        let mut point = -0.9;
        while point < 1.0 {
            let h = 1e-6;
            x.set(point + h);
            let high = expr.eval();
            x.set(point - h);
            let low = expr.eval();
            x.set(point);
            assert_approx_eq!(
                dexpr.eval(),
                (high - low) / (2.0 * h),
                1e-4,
                "d/dx {} at {}",
                text,
                point
            );
            point += 0.25;
        }
    }
}

#[test]
fn differentiation_does_not_disturb_the_original() {
    let x = variable(2.0);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);

    let expr = compile("x**2 + x", &bindings).unwrap();
    let before = expr.eval();
    let _ = differentiate(&expr, &x).unwrap();
    assert_eq!(expr.eval(), before);
}

#[test]
fn second_derivatives_compose() {
    let x = variable(1.5);
    let mut bindings = Bindings::new();
    bindings.register_variable("x", &x);

    let expr = compile("x**3", &bindings).unwrap();
    let first = differentiate(&expr, &x).unwrap();
    let second = differentiate(&first, &x).unwrap();

    // d2/dx2 x^3 = 6x
    assert_approx_eq!(second.eval(), 9.0, 1e-9);
}
