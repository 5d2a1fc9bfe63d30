//! Expression compilation: the recursive-descent parser and the
//! public `compile`/`interp` entry points.
//!
//! The grammar is a fixed precedence ladder, lowest to highest:
//!
//! ```text
//! list   := expr { "," expr }
//! expr   := bitw  { ("&&" | "||" | "^^") bitw }
//! bitw   := test  { ("&" | "|" | "^") test }
//! test   := shift { (">" | ">=" | "<" | "<=" | "==" | "!=" | "<>") shift }
//! shift  := sum   { ("<<" | ">>") sum }
//! sum    := term  { ("+" | "-") term }
//! term   := factor { ("*" | "/" | "%") factor }
//! factor := power { "**" power }
//! power  := { "+" | "-" | "!" | "~" } base
//! base   := Number | Variable | Fn0 [ "(" ")" ] | Fn1 power
//!         | FnN "(" expr { "," expr } ")" | "(" list ")"
//! ```
//!
//! Each layer is one method. A leading run of unary operators is
//! folded into a single node where the combination allows it (see
//! `unary_prefix`); `**` associativity follows the `pow-from-right`
//! feature.

use crate::builtins;
use crate::builtins::BuiltinFn;
use crate::context::Bindings;
use crate::error::{ExprError, Result};
use crate::lexer::{Lexer, Operator, Token, TokenKind};
use crate::optimize::optimize;
use crate::types::Expr;
use crate::Real;

/// Parses, optimizes, and evaluates an expression in one step.
///
/// Only builtins are in scope; use [`compile`] to evaluate against
/// host bindings.
///
/// # Examples
///
/// ```
/// use fexpr::interp;
///
/// assert_eq!(interp("sqrt(5**2 * 2 + 7**2 + 11**2 + (8 - 2)**2)").unwrap(), 16.0);
/// assert!(interp("0/0").unwrap().is_nan());
/// assert!(interp("cos5").is_err());
/// ```
pub fn interp(text: &str) -> Result<Real> {
    let bindings = Bindings::new();
    compile(text, &bindings).map(|expr| expr.eval())
}

/// Compiles an expression against a table of host bindings.
///
/// The returned tree is already constant-folded. It holds the scalar
/// cells, function objects, and closure contexts it references; the
/// binding table itself is only borrowed for the duration of this
/// call.
pub fn compile(text: &str, bindings: &Bindings) -> Result<Expr> {
    let mut parser = Parser::new(text, bindings);
    let mut root = parser.list()?;
    parser.finish()?;
    optimize(&mut root);
    Ok(root)
}

/// The folded form of a leading unary-operator run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Folded {
    Identity,
    Negate,
    LogicalNot,
    LogicalNotNot,
    NegateLogicalNot,
    NegateLogicalNotNot,
    BitwiseNot,
    BitwiseNotNot,
}

/// A scanned unary prefix. `complex` means the scan stopped at a
/// unary operator the fold cannot absorb; the caller parses the
/// remainder as a nested `power`.
struct UnaryRun {
    fold: Folded,
    complex: bool,
}

/// What kind of operators the unary scan is currently absorbing.
#[derive(Clone, Copy)]
enum UnaryMode {
    Sign,
    Logical,
    Bitwise,
}

static LOGIC_OPS: [(Operator, &BuiltinFn); 3] = [
    (Operator::And, &builtins::LOG_AND),
    (Operator::Or, &builtins::LOG_OR),
    (Operator::LogXor, &builtins::LOG_XOR),
];

static BIT_OPS: [(Operator, &BuiltinFn); 3] = [
    (Operator::BitAnd, &builtins::BIT_AND),
    (Operator::BitOr, &builtins::BIT_OR),
    (Operator::BitXor, &builtins::BIT_XOR),
];

static CMP_OPS: [(Operator, &BuiltinFn); 6] = [
    (Operator::Greater, &builtins::GREATER),
    (Operator::GreaterEq, &builtins::GREATER_EQ),
    (Operator::Less, &builtins::LESS),
    (Operator::LessEq, &builtins::LESS_EQ),
    (Operator::Equal, &builtins::EQUAL),
    (Operator::NotEqual, &builtins::NOT_EQUAL),
];

static SHIFT_OPS: [(Operator, &BuiltinFn); 2] = [
    (Operator::ShiftLeft, &builtins::SHL),
    (Operator::ShiftRight, &builtins::SHR),
];

static SUM_OPS: [(Operator, &BuiltinFn); 2] =
    [(Operator::Add, &builtins::ADD), (Operator::Sub, &builtins::SUB)];

static TERM_OPS: [(Operator, &BuiltinFn); 3] = [
    (Operator::Mul, &builtins::MUL),
    (Operator::Div, &builtins::DIV),
    (Operator::Rem, &builtins::REM),
];

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, bindings: &'a Bindings) -> Self {
        let mut lexer = Lexer::new(text, bindings);
        let current = lexer.next_token();
        Self { lexer, current }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// 1-based error index: just past the current token, clamped so a
    /// failure at the first character reports 1.
    fn error_index(&self) -> usize {
        self.current.end.max(1)
    }

    fn current_text(&self) -> &str {
        &self.lexer.source()[self.current.start..self.current.end]
    }

    fn syntax_error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Syntax { position: self.error_index(), message: message.into() }
    }

    /// Surfaces error-kind tokens wherever the grammar is about to
    /// consume or inspect one.
    fn check_bad_token(&self) -> Result<()> {
        match self.current.kind {
            TokenKind::BadChar => Err(ExprError::Lex {
                position: self.error_index(),
                found: self.current_text().to_string(),
            }),
            TokenKind::BadNumber => Err(ExprError::Lex {
                position: self.error_index(),
                found: self.current_text().to_string(),
            }),
            TokenKind::UnknownName => Err(ExprError::UnknownName {
                position: self.error_index(),
                name: self.current_text().to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.check_bad_token()?;
        if matches!(self.current.kind, TokenKind::End) {
            Ok(())
        } else {
            Err(self.syntax_error(format!(
                "unexpected '{}' after a complete expression",
                self.current_text()
            )))
        }
    }

    fn list(&mut self) -> Result<Expr> {
        let mut ret = self.expr()?;
        while matches!(self.current.kind, TokenKind::Sep) {
            self.advance();
            let next = self.expr()?;
            ret = Expr::call2(&builtins::COMMA, ret, next);
        }
        Ok(ret)
    }

    fn expr(&mut self) -> Result<Expr> {
        self.binary_layer(&LOGIC_OPS, Self::bitw)
    }

    fn bitw(&mut self) -> Result<Expr> {
        self.binary_layer(&BIT_OPS, Self::test)
    }

    fn test(&mut self) -> Result<Expr> {
        self.binary_layer(&CMP_OPS, Self::shift)
    }

    fn shift(&mut self) -> Result<Expr> {
        self.binary_layer(&SHIFT_OPS, Self::sum)
    }

    fn sum(&mut self) -> Result<Expr> {
        self.binary_layer(&SUM_OPS, Self::term)
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_layer(&TERM_OPS, Self::factor)
    }

    /// One left-associative binary layer: `next { op next }`.
    fn binary_layer(
        &mut self,
        ops: &[(Operator, &'static BuiltinFn)],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut lhs = next(self)?;
        loop {
            let entry = match &self.current.kind {
                TokenKind::Infix(op) => {
                    ops.iter().find(|(candidate, _)| candidate == op).map(|(_, entry)| *entry)
                }
                _ => None,
            };
            let Some(entry) = entry else {
                return Ok(lhs);
            };
            self.advance();
            let rhs = next(self)?;
            lhs = Expr::call2(entry, lhs, rhs);
        }
    }

    /// `factor := power { "**" power }`, right-associative: the chain
    /// nests to the right, and the folded unary prefix of each
    /// operand binds looser than the chain to its right, so
    /// `-2**-3**-4` is `-(2**(-(3**(-4))))`. A negation coming from
    /// parentheses is not hoisted: `(-2)**2` is `4`.
    #[cfg(feature = "pow-from-right")]
    fn factor(&mut self) -> Result<Expr> {
        let (unary, operand) = self.power_parts()?;
        let chain = if matches!(self.current.kind, TokenKind::Infix(Operator::Pow)) {
            self.advance();
            let rhs = self.factor()?;
            Expr::call2(&builtins::POW, operand, rhs)
        } else {
            operand
        };
        Ok(apply_unary(unary, chain))
    }

    /// `factor := power { "**" power }`, left-associative: unary
    /// binds tighter than `**`, so `-2**2` is `(-2)**2`.
    #[cfg(not(feature = "pow-from-right"))]
    fn factor(&mut self) -> Result<Expr> {
        let mut lhs = self.power()?;
        while matches!(self.current.kind, TokenKind::Infix(Operator::Pow)) {
            self.advance();
            let rhs = self.power()?;
            lhs = Expr::call2(&builtins::POW, lhs, rhs);
        }
        Ok(lhs)
    }

    fn power(&mut self) -> Result<Expr> {
        let (unary, operand) = self.power_parts()?;
        Ok(apply_unary(unary, operand))
    }

    fn power_parts(&mut self) -> Result<(Folded, Expr)> {
        let run = self.unary_prefix();
        let operand = if run.complex { self.power()? } else { self.base()? };
        Ok((run.fold, operand))
    }

    /// Scans a leading run of `+ - ! ~` and folds it into one of the
    /// eight [`Folded`] encodings:
    ///
    /// - `+` is the identity everywhere;
    /// - `-` flips the running sign until a `!` or `~` appears, and is
    ///   absorbed inside a `!` run (a sign cannot change zero-ness);
    /// - `!` runs keep their parity, with `!!` preserved as bool-ify
    ///   rather than cancelled;
    /// - `~` runs keep their parity, with `~~` preserved as the 53-bit
    ///   mask rather than cancelled.
    ///
    /// A combination with no single-node encoding (`-~`, `~-`, `!~`,
    /// `~!`) stops the scan with `complex` set; the caller emits the
    /// node folded so far and recurses for the rest.
    fn unary_prefix(&mut self) -> UnaryRun {
        let mut negative = false;
        let mut mode = UnaryMode::Sign;
        let mut odd = false;

        loop {
            let op = match &self.current.kind {
                TokenKind::Infix(
                    op @ (Operator::Add | Operator::Sub | Operator::Not | Operator::BitNot),
                ) => *op,
                _ => break,
            };
            match (mode, op) {
                (_, Operator::Add) => {}
                (UnaryMode::Sign, Operator::Sub) => negative = !negative,
                (UnaryMode::Logical, Operator::Sub) => {}
                (UnaryMode::Sign, Operator::Not) => {
                    mode = UnaryMode::Logical;
                    odd = true;
                }
                (UnaryMode::Logical, Operator::Not) => odd = !odd,
                (UnaryMode::Sign, Operator::BitNot) if !negative => {
                    mode = UnaryMode::Bitwise;
                    odd = true;
                }
                (UnaryMode::Bitwise, Operator::BitNot) => odd = !odd,
                _ => {
                    return UnaryRun { fold: folded(negative, mode, odd), complex: true };
                }
            }
            self.advance();
        }
        UnaryRun { fold: folded(negative, mode, odd), complex: false }
    }

    fn base(&mut self) -> Result<Expr> {
        self.check_bad_token()?;
        match self.current.kind.clone() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Expr::Constant(value))
            }
            TokenKind::Variable(var) => {
                self.advance();
                Ok(Expr::Variable(var))
            }
            TokenKind::Function(fun) => {
                let args = self.call_args(fun.name(), fun.arity())?;
                Ok(Expr::Function { fun, args: args.into_boxed_slice() })
            }
            TokenKind::Closure(fun, context) => {
                let args = self.call_args(&fun.name, fun.arity)?;
                Ok(Expr::Closure { fun, context, args: args.into_boxed_slice() })
            }
            TokenKind::Open => {
                self.advance();
                let inner = self.list()?;
                self.check_bad_token()?;
                if !matches!(self.current.kind, TokenKind::Close) {
                    return Err(self.syntax_error("expected ')'"));
                }
                self.advance();
                Ok(inner)
            }
            _ => Err(self.syntax_error(format!(
                "expected an expression, found '{}'",
                self.current_text()
            ))),
        }
    }

    /// Parses the argument shape for a call of the given arity, with
    /// the function token still current on entry.
    ///
    /// Nullary calls take optional empty parentheses, arity-1 calls
    /// take a bare `power` operand (so `sin x` works without
    /// parentheses), and higher arities require a parenthesized list
    /// with exactly `arity` comma-separated arguments.
    fn call_args(&mut self, name: &str, arity: usize) -> Result<Vec<Expr>> {
        self.advance();
        match arity {
            0 => {
                if matches!(self.current.kind, TokenKind::Open) {
                    self.advance();
                    self.check_bad_token()?;
                    if !matches!(self.current.kind, TokenKind::Close) {
                        return Err(
                            self.syntax_error(format!("expected ')' in call to '{}'", name))
                        );
                    }
                    self.advance();
                }
                Ok(Vec::new())
            }
            1 => Ok(vec![self.power()?]),
            _ => {
                self.check_bad_token()?;
                if !matches!(self.current.kind, TokenKind::Open) {
                    return Err(self.syntax_error(format!("expected '(' after '{}'", name)));
                }
                self.advance();

                let mut args = Vec::with_capacity(arity);
                loop {
                    args.push(self.expr()?);
                    if args.len() == arity {
                        break;
                    }
                    self.check_bad_token()?;
                    if !matches!(self.current.kind, TokenKind::Sep) {
                        return Err(self.syntax_error(format!(
                            "'{}' expects {} arguments",
                            name, arity
                        )));
                    }
                    self.advance();
                }

                self.check_bad_token()?;
                if !matches!(self.current.kind, TokenKind::Close) {
                    return Err(self.syntax_error(format!(
                        "expected ')' after arguments to '{}'",
                        name
                    )));
                }
                self.advance();
                Ok(args)
            }
        }
    }
}

fn folded(negative: bool, mode: UnaryMode, odd: bool) -> Folded {
    match mode {
        UnaryMode::Sign => {
            if negative {
                Folded::Negate
            } else {
                Folded::Identity
            }
        }
        UnaryMode::Logical => match (negative, odd) {
            (false, true) => Folded::LogicalNot,
            (false, false) => Folded::LogicalNotNot,
            (true, true) => Folded::NegateLogicalNot,
            (true, false) => Folded::NegateLogicalNotNot,
        },
        UnaryMode::Bitwise => {
            if odd {
                Folded::BitwiseNot
            } else {
                Folded::BitwiseNotNot
            }
        }
    }
}

fn apply_unary(fold: Folded, operand: Expr) -> Expr {
    let entry: &'static BuiltinFn = match fold {
        Folded::Identity => return operand,
        Folded::Negate => &builtins::NEG,
        Folded::LogicalNot => &builtins::LOG_NOT,
        Folded::LogicalNotNot => &builtins::LOG_NOT_NOT,
        Folded::NegateLogicalNot => &builtins::NEG_LOG_NOT,
        Folded::NegateLogicalNotNot => &builtins::NEG_LOG_NOT_NOT,
        Folded::BitwiseNot => &builtins::BIT_NOT,
        Folded::BitwiseNotNot => &builtins::BIT_NOT_NOT,
    };
    Expr::call1(entry, operand)
}
