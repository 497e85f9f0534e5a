//! # gridcalc-formula
//!
//! Expression language for gridcalc.
//!
//! This crate provides:
//! - Lexing and parsing (text → [`Expr`]), with a canonical pretty-printer
//! - A closed typed value model ([`Value`], [`ValueKind`]) and its operator table
//! - A per-grid [`FunctionRegistry`] for conversions and user functions
//! - Evaluation against a [`Scope`] that resolves identifiers
//!
//! Nothing here knows about grids; cell references are delegated to the scope.
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_formula::{evaluate, parse, EmptyScope, FunctionRegistry, Value};
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register("Square", |x: i64| x * x).unwrap();
//!
//! let expr = parse("Square(3) + int64(2.9)").unwrap();
//! let value = evaluate(&expr, &registry, &mut EmptyScope).unwrap();
//! assert_eq!(value, Value::Int64(11));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod value;

pub use ast::{BinaryOperator, Expr, LiteralKind, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EmptyScope, Scope, CELL_FUNCTION};
pub use functions::{
    CallContext, Callee, FunctionDef, FunctionRegistry, IntoCallResult, IntoContextFunction,
    IntoFunction, ScalarType,
};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse, parse_tokens, MAX_DEPTH};
pub use value::{Value, ValueKind};
