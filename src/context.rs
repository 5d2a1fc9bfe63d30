//! The binding table: host-provided names consulted during lexing.
//!
//! A [`Bindings`] value is an ordered list of `{name, payload}`
//! entries. The lexer resolves identifiers against it with a linear
//! scan in registration order (first match wins) before falling back
//! to the builtin registry, so a host binding can shadow a builtin of
//! the same name. The table is only borrowed during compilation; the
//! compiled tree retains the scalar cells, function objects, and
//! closure contexts it needs, never the table itself.

use std::any::Any;
use std::rc::Rc;

use crate::types::{ClosureCtx, ClosureFunction, NativeFunction, VarRef, MAX_ARITY};
use crate::Real;

#[derive(Clone)]
pub(crate) enum Binding {
    Variable(VarRef),
    Function(Rc<NativeFunction>),
    Closure(Rc<ClosureFunction>, ClosureCtx),
}

#[derive(Clone)]
struct Entry {
    name: String,
    binding: Binding,
}

/// Host-provided bindings for compilation.
///
/// # Examples
///
/// ```
/// use fexpr::{compile, variable, Bindings};
///
/// let x = variable(0.5);
/// let mut bindings = Bindings::new();
/// bindings.register_variable("x", &x);
/// bindings.register_function("triple", 1, |args| args[0] * 3.0);
///
/// let expr = compile("triple(x)", &bindings).unwrap();
/// assert_eq!(expr.eval(), 1.5);
/// ```
#[derive(Clone, Default)]
pub struct Bindings {
    entries: Vec<Entry>,
}

impl Bindings {
    /// Creates an empty binding table. Builtins are always available
    /// and need no registration.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Binds a name to a shared scalar cell.
    ///
    /// The table stores a clone of the handle; the host keeps its own
    /// and may update the value between evaluations with
    /// [`std::cell::Cell::set`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fexpr::{compile, variable, Bindings};
    ///
    /// let x = variable(42.0);
    /// let mut bindings = Bindings::new();
    /// bindings.register_variable("x", &x);
    ///
    /// let expr = compile("x * 2", &bindings).unwrap();
    /// assert_eq!(expr.eval(), 84.0);
    /// ```
    pub fn register_variable(&mut self, name: &str, var: &VarRef) {
        self.entries.push(Entry {
            name: name.to_string(),
            binding: Binding::Variable(Rc::clone(var)),
        });
    }

    /// Registers a host function. The function is treated as impure:
    /// calls to it are never constant-folded.
    ///
    /// # Panics
    ///
    /// Panics if `arity` exceeds [`MAX_ARITY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use fexpr::{compile, Bindings};
    ///
    /// let mut bindings = Bindings::new();
    /// bindings.register_function("sum3", 3, |args| args.iter().sum());
    ///
    /// let expr = compile("sum3(1, 2, 3)", &bindings).unwrap();
    /// assert_eq!(expr.eval(), 6.0);
    /// ```
    pub fn register_function<F>(&mut self, name: &str, arity: usize, fun: F)
    where
        F: Fn(&[Real]) -> Real + 'static,
    {
        self.register_native(name, arity, false, Rc::new(fun));
    }

    /// Registers a host function whose result depends only on its
    /// arguments, making it eligible for constant folding.
    pub fn register_pure_function<F>(&mut self, name: &str, arity: usize, fun: F)
    where
        F: Fn(&[Real]) -> Real + 'static,
    {
        self.register_native(name, arity, true, Rc::new(fun));
    }

    /// Registers a closure: a function receiving an opaque host
    /// context as its first argument. The context handle is stored in
    /// every call node compiled from this binding, so host-side state
    /// changes are visible without recompilation. Impure by default.
    ///
    /// # Panics
    ///
    /// Panics if `arity` exceeds [`MAX_ARITY`].
    pub fn register_closure<F>(&mut self, name: &str, arity: usize, context: ClosureCtx, fun: F)
    where
        F: Fn(&dyn Any, &[Real]) -> Real + 'static,
    {
        self.register_boxed_closure(name, arity, false, context, Rc::new(fun));
    }

    /// Registers a pure closure. Only meaningful when the context is
    /// immutable for the life of the compiled expression.
    pub fn register_pure_closure<F>(
        &mut self,
        name: &str,
        arity: usize,
        context: ClosureCtx,
        fun: F,
    ) where
        F: Fn(&dyn Any, &[Real]) -> Real + 'static,
    {
        self.register_boxed_closure(name, arity, true, context, Rc::new(fun));
    }

    fn register_native(
        &mut self,
        name: &str,
        arity: usize,
        pure: bool,
        fun: Rc<dyn Fn(&[Real]) -> Real>,
    ) {
        assert!(arity <= MAX_ARITY, "function arity is limited to {}", MAX_ARITY);
        self.entries.push(Entry {
            name: name.to_string(),
            binding: Binding::Function(Rc::new(NativeFunction {
                name: name.to_string(),
                arity,
                pure,
                fun,
            })),
        });
    }

    fn register_boxed_closure(
        &mut self,
        name: &str,
        arity: usize,
        pure: bool,
        context: ClosureCtx,
        fun: Rc<dyn Fn(&dyn Any, &[Real]) -> Real>,
    ) {
        assert!(arity <= MAX_ARITY, "closure arity is limited to {}", MAX_ARITY);
        self.entries.push(Entry {
            name: name.to_string(),
            binding: Binding::Closure(
                Rc::new(ClosureFunction { name: name.to_string(), arity, pure, fun }),
                context,
            ),
        });
    }

    /// Exact full-name lookup, first match wins.
    pub(crate) fn lookup(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.binding)
    }
}
