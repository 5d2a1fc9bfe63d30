//! Error types for expression compilation and differentiation.
//!
//! Compilation errors carry the 1-based character offset at which the
//! parse stopped, following the TinyExpr error-index convention: the
//! offset just past the offending token, clamped so that a failure at
//! the very first character (including empty input) reports 1.

use core::fmt;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, ExprError>;

/// Error type for expression compilation and differentiation.
///
/// Evaluation itself never fails: malformed runtime situations follow
/// IEEE semantics and produce NaN or infinities instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The lexer hit input it cannot tokenize: an unrecognized
    /// character, a lone `=`, or a malformed numeric literal.
    Lex {
        /// 1-based offset just past the offending input.
        position: usize,
        /// The text that could not be tokenized.
        found: String,
    },

    /// An identifier matched neither a host binding nor a builtin.
    ///
    /// Names are matched exactly and case-sensitively against the
    /// whole identifier: `cos5` is an unknown name, not `cos(5)`.
    UnknownName {
        /// 1-based offset just past the identifier.
        position: usize,
        /// The unresolved identifier.
        name: String,
    },

    /// The token stream does not match the grammar: a missing
    /// parenthesis, a wrong argument count, an operator with no
    /// operand, or trailing input after a complete expression.
    Syntax {
        /// 1-based offset just past the token where parsing stopped.
        position: usize,
        /// Human-readable description of what was expected.
        message: String,
    },

    /// Symbolic differentiation reached an operator it has no rule
    /// for (bitwise, comparison, logical, factorial, host functions,
    /// closures, ...).
    Differentiation {
        /// Name of the unsupported operator or function.
        operator: String,
    },
}

impl ExprError {
    /// The 1-based character offset where compilation stopped.
    ///
    /// Returns 0 for [`ExprError::Differentiation`], which carries no
    /// source location.
    pub fn position(&self) -> usize {
        match self {
            ExprError::Lex { position, .. }
            | ExprError::UnknownName { position, .. }
            | ExprError::Syntax { position, .. } => *position,
            ExprError::Differentiation { .. } => 0,
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprError::Lex { position, found } => {
                write!(f, "Lex error at position {}: '{}'", position, found)
            }
            ExprError::UnknownName { position, name } => {
                write!(f, "Unknown name '{}' at position {}", name, position)
            }
            ExprError::Syntax { position, message } => {
                write!(f, "Syntax error at position {}: {}", position, message)
            }
            ExprError::Differentiation { operator } => {
                write!(f, "Cannot differentiate '{}'", operator)
            }
        }
    }
}

impl std::error::Error for ExprError {}
