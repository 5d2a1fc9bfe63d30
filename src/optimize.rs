//! Constant folding.

use crate::types::Expr;

/// Folds the tree in place: post-order, every pure call whose
/// children have all become constants is evaluated once and replaced
/// by a constant node. Variables and impure calls are never
/// rewritten, so anything depending on host state keeps its
/// structure.
pub fn optimize(expr: &mut Expr) {
    let foldable = match expr {
        Expr::Constant(_) | Expr::Variable(_) => return,
        Expr::Function { fun, args } => {
            for arg in args.iter_mut() {
                optimize(arg);
            }
            fun.is_pure() && args.iter().all(Expr::is_constant)
        }
        Expr::Closure { fun, args, .. } => {
            for arg in args.iter_mut() {
                optimize(arg);
            }
            fun.pure && args.iter().all(Expr::is_constant)
        }
    };
    if foldable {
        *expr = Expr::Constant(expr.eval());
    }
}
