//! Closures: functions carrying an opaque host-owned context that is
//! passed back as their first argument. Context changes must be
//! visible to already-compiled expressions.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use fexpr::{compile, Bindings, ClosureCtx, Real};

fn extra_cell(ctx: &dyn Any) -> Real {
    ctx.downcast_ref::<Cell<Real>>().map(Cell::get).unwrap_or(Real::NAN)
}

fn closure_bindings(extra: &Rc<Cell<Real>>, cells: &Rc<Vec<Real>>) -> Bindings {
    let mut bindings = Bindings::new();
    bindings.register_closure("c0", 0, extra.clone(), |ctx, _| extra_cell(ctx) + 6.0);
    bindings.register_closure("c1", 1, extra.clone(), |ctx, args| {
        extra_cell(ctx) + args[0] * 2.0
    });
    bindings.register_closure("c2", 2, extra.clone(), |ctx, args| {
        extra_cell(ctx) + args[0] + args[1]
    });
    let table: ClosureCtx = cells.clone();
    bindings.register_closure("cell", 1, table, |ctx, args| {
        let cells = ctx.downcast_ref::<Vec<Real>>().expect("cell context");
        cells[args[0] as usize]
    });
    bindings
}

#[test]
fn context_updates_are_seen_without_recompiling() {
    let extra = Rc::new(Cell::new(0.0));
    let cells = Rc::new(vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    let bindings = closure_bindings(&extra, &cells);

    let cases: &[(&str, Real)] = &[("c0", 6.0), ("c1 4", 8.0), ("c2 (10, 20)", 30.0)];

    for &(text, base) in cases {
        let expr = compile(text, &bindings).unwrap_or_else(|e| panic!("{}: {}", text, e));

        extra.set(0.0);
        assert_eq!(expr.eval(), base, "{} with extra=0", text);

        extra.set(10.0);
        assert_eq!(expr.eval(), base + 10.0, "{} with extra=10", text);
    }
}

#[test]
fn closures_index_into_context_tables() {
    let extra = Rc::new(Cell::new(0.0));
    let cells = Rc::new(vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    let bindings = closure_bindings(&extra, &cells);

    let cases: &[(&str, Real)] = &[
        ("cell 0", 5.0),
        ("cell 1", 6.0),
        ("cell 0 + cell 1", 11.0),
        ("cell 1 * cell 3 + cell 4", 57.0),
    ];

    for &(text, expected) in cases {
        let expr = compile(text, &bindings).unwrap_or_else(|e| panic!("{}: {}", text, e));
        assert_eq!(expr.eval(), expected, "{}", text);
    }
}

#[test]
fn impure_closures_never_fold() {
    let extra = Rc::new(Cell::new(1.0));
    let cells = Rc::new(Vec::new());
    let bindings = closure_bindings(&extra, &cells);

    // All-constant arguments, but the closure context may change, so
    // the call must survive optimization.
    let expr = compile("c2 (10, 20)", &bindings).unwrap();
    assert!(expr.as_constant().is_none());
    assert_eq!(expr.eval(), 31.0);
}

#[test]
fn pure_closures_fold_over_constant_arguments() {
    let weights: ClosureCtx = Rc::new(vec![2.0, 3.0]);
    let mut bindings = Bindings::new();
    bindings.register_pure_closure("dot", 2, weights, |ctx, args| {
        let w = ctx.downcast_ref::<Vec<Real>>().expect("weights");
        w[0] * args[0] + w[1] * args[1]
    });

    let expr = compile("dot(10, 100)", &bindings).unwrap();
    assert_eq!(expr.as_constant(), Some(320.0));
}

#[test]
fn cloned_trees_share_the_context() {
    let extra = Rc::new(Cell::new(0.0));
    let cells = Rc::new(Vec::new());
    let bindings = closure_bindings(&extra, &cells);

    let expr = compile("c1 4", &bindings).unwrap();
    let copy = expr.clone();

    extra.set(3.0);
    assert_eq!(expr.eval(), 11.0);
    assert_eq!(copy.eval(), 11.0);
}
