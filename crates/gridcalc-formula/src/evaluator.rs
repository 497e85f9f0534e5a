//! Expression evaluator
//!
//! Walks a tree against the operator table and a [`FunctionRegistry`],
//! resolving identifiers through a [`Scope`]. The evaluator itself never
//! touches a grid.

use crate::ast::{BinaryOperator, Expr};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{CallContext, Callee, FunctionRegistry};
use crate::ops;
use crate::value::{Value, ValueKind};
use gridcalc_core::{Axis, CellAddress};

/// Built-in call form that addresses a cell by computed coordinates
pub const CELL_FUNCTION: &str = "cell";

/// Identifier resolution used during evaluation
pub trait Scope {
    /// Resolve a bare identifier (coordinate, keyword or free variable)
    fn resolve(&mut self, name: &str) -> FormulaResult<Value>;

    /// Resolve a cell by coordinates, as produced by `cell(column, row)`
    fn resolve_cell(&mut self, address: CellAddress) -> FormulaResult<Value>;

    /// Context handed to functions that ask for it
    fn context(&self) -> CallContext;
}

/// A scope with nothing in it
///
/// Every identifier is unknown; useful for evaluating standalone expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn resolve(&mut self, name: &str) -> FormulaResult<Value> {
        Err(FormulaError::UnknownIdentifier(name.to_string()))
    }

    fn resolve_cell(&mut self, address: CellAddress) -> FormulaResult<Value> {
        Err(FormulaError::UnknownIdentifier(address.to_string()))
    }

    fn context(&self) -> CallContext {
        CallContext::default()
    }
}

/// Remaining stack below which evaluation moves onto a fresh segment
///
/// A cell reference evaluates the referenced cell inside the current call, so
/// recursion depth follows the length of reference chains as well as the
/// height of the tree.
pub const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each stack segment allocated once the red zone is reached
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Evaluate an expression
///
/// # Example
/// ```rust
/// use gridcalc_formula::{evaluate, parse, EmptyScope, FunctionRegistry, Value};
///
/// let registry = FunctionRegistry::new();
/// let expr = parse("(1 + 2) * 7").unwrap();
/// assert_eq!(evaluate(&expr, &registry, &mut EmptyScope).unwrap(), Value::Int64(21));
/// ```
pub fn evaluate(
    expr: &Expr,
    registry: &FunctionRegistry,
    scope: &mut dyn Scope,
) -> FormulaResult<Value> {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
        evaluate_expr(expr, registry, scope)
    })
}

fn evaluate_expr(
    expr: &Expr,
    registry: &FunctionRegistry,
    scope: &mut dyn Scope,
) -> FormulaResult<Value> {
    match expr {
        Expr::Literal { kind, raw } => Value::from_literal(*kind, raw),
        Expr::Identifier(name) => scope.resolve(name),
        Expr::Paren(inner) => evaluate(inner, registry, scope),
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, registry, scope)?;
            ops::unary(*op, value)
        }
        Expr::Binary { op, left, right } => match op {
            BinaryOperator::And | BinaryOperator::Or => {
                evaluate_logical(*op, left, right, registry, scope)
            }
            _ => {
                let left = evaluate(left, registry, scope)?;
                let right = evaluate(right, registry, scope)?;
                ops::binary(*op, left, right)
            }
        },
        Expr::Call { callee, args } => evaluate_call(callee, args, registry, scope),
    }
}

/// `&&` and `||`: the right operand is only evaluated when the left one does
/// not settle the result
fn evaluate_logical(
    op: BinaryOperator,
    left: &Expr,
    right: &Expr,
    registry: &FunctionRegistry,
    scope: &mut dyn Scope,
) -> FormulaResult<Value> {
    let lhs = evaluate(left, registry, scope)?;
    let settled = match (op, lhs.as_bool()) {
        (_, None) => {
            return Err(FormulaError::InvalidOperation {
                op: op.symbol(),
                kind: lhs.kind(),
            })
        }
        (BinaryOperator::And, Some(false)) => Some(false),
        (BinaryOperator::Or, Some(true)) => Some(true),
        _ => None,
    };
    if let Some(result) = settled {
        return Ok(Value::Bool(result));
    }

    let rhs = evaluate(right, registry, scope)?;
    ops::binary(op, lhs, rhs)
}

fn evaluate_call(
    callee: &str,
    args: &[Expr],
    registry: &FunctionRegistry,
    scope: &mut dyn Scope,
) -> FormulaResult<Value> {
    if callee == CELL_FUNCTION {
        return evaluate_cell_call(args, registry, scope);
    }

    let Some(target) = registry.get(callee) else {
        return Err(FormulaError::UnknownFunction(callee.to_string()));
    };

    match target {
        Callee::Conversion(kind) => {
            check_arity(callee, 1, args.len())?;
            evaluate(&args[0], registry, scope)?.convert(kind)
        }
        Callee::Function(def) => {
            check_arity(callee, def.params().len(), args.len())?;

            let mut values = Vec::with_capacity(args.len());
            for (i, (arg, &expected)) in args.iter().zip(def.params()).enumerate() {
                let value = evaluate(arg, registry, scope)?;
                let actual = value.kind();
                let value = value.convert(expected).map_err(|_| FormulaError::Argument {
                    function: callee.to_string(),
                    position: i + 1,
                    expected,
                    actual,
                })?;
                values.push(value);
            }

            def.invoke(&scope.context(), values)
        }
    }
}

/// `cell(column, row)`: both arguments must be non-negative integers
fn evaluate_cell_call(
    args: &[Expr],
    registry: &FunctionRegistry,
    scope: &mut dyn Scope,
) -> FormulaResult<Value> {
    check_arity(CELL_FUNCTION, 2, args.len())?;

    let column = coordinate_index(Axis::Column, evaluate(&args[0], registry, scope)?)?;
    let row = coordinate_index(Axis::Row, evaluate(&args[1], registry, scope)?)?;
    scope.resolve_cell(CellAddress::new(column, row))
}

fn coordinate_index(axis: Axis, value: Value) -> FormulaResult<u32> {
    let position = match axis {
        Axis::Column => 1,
        Axis::Row => 2,
    };
    let index = value.as_i128().ok_or_else(|| FormulaError::Argument {
        function: CELL_FUNCTION.to_string(),
        position,
        expected: ValueKind::UInt32,
        actual: value.kind(),
    })?;
    u32::try_from(index).map_err(|_| FormulaError::InvalidCoordinate {
        axis,
        value: index.to_string(),
    })
}

fn check_arity(function: &str, expected: usize, actual: usize) -> FormulaResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(FormulaError::ArgumentCount {
            function: function.to_string(),
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use ahash::AHashMap;
    use num_complex::Complex;
    use pretty_assertions::assert_eq;

    /// Scope over a fixed set of variables that records every lookup
    #[derive(Default)]
    struct MapScope {
        vars: AHashMap<String, Value>,
        cells: AHashMap<CellAddress, Value>,
        resolved: Vec<String>,
        context: CallContext,
    }

    impl MapScope {
        fn with(vars: &[(&str, Value)]) -> Self {
            Self {
                vars: vars
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl Scope for MapScope {
        fn resolve(&mut self, name: &str) -> FormulaResult<Value> {
            self.resolved.push(name.to_string());
            self.vars
                .get(name)
                .cloned()
                .ok_or_else(|| FormulaError::UnknownIdentifier(name.to_string()))
        }

        fn resolve_cell(&mut self, address: CellAddress) -> FormulaResult<Value> {
            self.resolved.push(address.to_string());
            Ok(self.cells.get(&address).cloned().unwrap_or_default())
        }

        fn context(&self) -> CallContext {
            self.context
        }
    }

    fn eval(source: &str) -> FormulaResult<Value> {
        eval_with(source, &FunctionRegistry::new(), &mut EmptyScope)
    }

    fn eval_with(
        source: &str,
        registry: &FunctionRegistry,
        scope: &mut dyn Scope,
    ) -> FormulaResult<Value> {
        evaluate(&parse(source).unwrap(), registry, scope)
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Int64(7));
        assert_eq!(eval("1 * 2 + 3").unwrap(), Value::Int64(5));
        assert_eq!(eval("(1 + 2) * (3 + 4)").unwrap(), Value::Int64(21));
        assert_eq!(eval("100 - 6 / 3").unwrap(), Value::Int64(98));
        assert_eq!(eval("2 ** 3 ** 2").unwrap(), Value::Int64(512));
        assert_eq!(eval("1 << 2 + 1").unwrap(), Value::Int64(8));
        assert_eq!(eval("6 & 3 == 2").unwrap(), Value::Bool(true));
        assert_eq!(eval("10 - 4 - 3").unwrap(), Value::Int64(3));
    }

    #[test]
    fn test_unary_and_factorial() {
        assert_eq!(eval("-3!").unwrap(), Value::Int64(-6));
        assert_eq!(eval("2 * 3!").unwrap(), Value::Int64(12));
        assert_eq!(eval("^0").unwrap(), Value::Int64(-1));
        assert_eq!(eval("!(1 < 2)").unwrap(), Value::Bool(false));
        assert_eq!(eval("-2.5").unwrap(), Value::Float64(-2.5));
    }

    #[test]
    fn test_literal_kinds() {
        assert_eq!(eval("'a' + 1").unwrap_err().to_string(), "mismatched kinds for +: int32 and int64");
        assert_eq!(eval("'a' + int32(1)").unwrap(), Value::Int32(98));
        assert_eq!(eval(r#""ab" + "c""#).unwrap(), Value::String("abc".into()));
        assert_eq!(
            eval("1i * 1i").unwrap(),
            Value::Complex128(Complex::new(-1.0, 0.0))
        );
        assert_eq!(eval("true && !false").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_short_circuit_skips_right_operand() {
        let mut scope = MapScope::with(&[("wealthy", Value::Bool(false))]);
        let registry = FunctionRegistry::new();

        assert_eq!(
            eval_with("wealthy && happy", &registry, &mut scope).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(scope.resolved, vec!["wealthy".to_string()]);

        scope.vars.insert("wealthy".into(), Value::Bool(true));
        assert_eq!(
            eval_with("wealthy || happy", &registry, &mut scope).unwrap(),
            Value::Bool(true)
        );
        assert!(eval_with("wealthy && happy", &registry, &mut scope).is_err());
    }

    #[test]
    fn test_logical_operand_must_be_bool() {
        assert_eq!(
            eval("1 && true").unwrap_err(),
            FormulaError::InvalidOperation {
                op: "&&",
                kind: ValueKind::Int64
            }
        );
        assert!(eval("true || 1").is_ok());
        assert!(eval("false || 1").is_err());
    }

    #[test]
    fn test_conversion_calls() {
        assert_eq!(eval("uint8(300)").unwrap(), Value::UInt8(44));
        assert_eq!(eval("float32(1) / float32(4)").unwrap(), Value::Float32(0.25));
        assert_eq!(eval("string(72) + string(105)").unwrap(), Value::String("Hi".into()));
        assert_eq!(
            eval("int64(1, 2)").unwrap_err(),
            FormulaError::ArgumentCount {
                function: "int64".into(),
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(
            eval("float64(1i)").unwrap_err().to_string(),
            "cannot convert complex128 to float64"
        );
    }

    #[test]
    fn test_function_calls() {
        let mut registry = FunctionRegistry::new();
        registry.register("Half", |x: f64| x / 2.0).unwrap();
        registry
            .register("Pick", |flag: bool, a: String, b: String| if flag { a } else { b })
            .unwrap();
        registry
            .register_with_context("Where", |ctx: &CallContext, scale: u32| {
                ctx.column * scale + ctx.row
            })
            .unwrap();

        let mut scope = MapScope::default();
        scope.context = CallContext {
            column: 2,
            row: 5,
            columns: 10,
            rows: 10,
        };

        // int64 argument coerced to the declared float64 parameter
        assert_eq!(
            eval_with("Half(5)", &registry, &mut scope).unwrap(),
            Value::Float64(2.5)
        );
        assert_eq!(
            eval_with(r#"Pick(1 > 2, "a", "b")"#, &registry, &mut scope).unwrap(),
            Value::String("b".into())
        );
        assert_eq!(
            eval_with("Where(10)", &registry, &mut scope).unwrap(),
            Value::UInt32(25)
        );
    }

    #[test]
    fn test_function_call_errors() {
        let mut registry = FunctionRegistry::new();
        registry.register("Half", |x: f64| x / 2.0).unwrap();
        registry
            .register("Fails", |_x: i64| -> Result<i64, String> { Err("nope".into()) })
            .unwrap();

        let mut scope = EmptyScope;
        assert_eq!(
            eval_with(r#"Half("x")"#, &registry, &mut scope).unwrap_err(),
            FormulaError::Argument {
                function: "Half".into(),
                position: 1,
                expected: ValueKind::Float64,
                actual: ValueKind::String
            }
        );
        assert_eq!(
            eval_with("Half()", &registry, &mut scope).unwrap_err(),
            FormulaError::ArgumentCount {
                function: "Half".into(),
                expected: 1,
                actual: 0
            }
        );
        assert_eq!(
            eval_with("Fails(1)", &registry, &mut scope)
                .unwrap_err()
                .to_string(),
            "Fails: nope"
        );
        assert_eq!(
            eval_with("Nope(1)", &registry, &mut scope).unwrap_err(),
            FormulaError::UnknownFunction("Nope".into())
        );
    }

    #[test]
    fn test_arguments_evaluate_left_to_right() {
        let mut registry = FunctionRegistry::new();
        registry.register("Second", |_a: i64, b: i64| b).unwrap();
        let mut scope = MapScope::with(&[("x", Value::Int64(1)), ("y", Value::Int64(2))]);

        assert_eq!(
            eval_with("Second(x, y)", &registry, &mut scope).unwrap(),
            Value::Int64(2)
        );
        assert_eq!(scope.resolved, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_cell_call() {
        let registry = FunctionRegistry::new();
        let mut scope = MapScope::default();
        scope.cells.insert(CellAddress::new(1, 3), Value::Int64(9));

        assert_eq!(
            eval_with("cell(1, 1 + 2)", &registry, &mut scope).unwrap(),
            Value::Int64(9)
        );
        assert_eq!(scope.resolved, vec!["B3".to_string()]);

        assert_eq!(
            eval_with("cell(uint8(0), 0)", &registry, &mut scope).unwrap(),
            Value::Int64(0)
        );
        assert!(matches!(
            eval_with("cell(-1, 0)", &registry, &mut scope),
            Err(FormulaError::InvalidCoordinate {
                axis: Axis::Column,
                ..
            })
        ));
        assert!(matches!(
            eval_with("cell(0, 1.5)", &registry, &mut scope),
            Err(FormulaError::Argument { position: 2, .. })
        ));
        assert!(matches!(
            eval_with("cell(0)", &registry, &mut scope),
            Err(FormulaError::ArgumentCount { .. })
        ));
    }

    #[test]
    fn test_errors_name_operator_and_kind() {
        assert_eq!(
            eval("1 / 0").unwrap_err(),
            FormulaError::DivisionByZero { op: "/" }
        );
        assert_eq!(
            eval(r#""a" - "b""#).unwrap_err().to_string(),
            "operator - is not defined for string"
        );
        assert_eq!(
            eval("x + 1").unwrap_err(),
            FormulaError::UnknownIdentifier("x".into())
        );
    }
}
