//! Operator table
//!
//! Binary operators require both operands to have the same kind, shifts
//! excepted. Integer `+ - *` wrap at the kind's width. Division and remainder
//! by zero are errors for every numeric kind.

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::value::{Value, ValueKind};
use num_complex::Complex;
use std::cmp::Ordering;

/// Fixed-width integer behaviour shared by the eight integer kinds
trait Int:
    Copy
    + Ord
    + std::ops::BitAnd<Output = Self>
    + std::ops::BitOr<Output = Self>
    + std::ops::BitXor<Output = Self>
    + std::ops::Not<Output = Self>
{
    const ZERO: Self;
    const BITS: u32;
    const KIND: ValueKind;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_div(self, rhs: Self) -> Self;
    fn wrapping_rem(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
    fn wrapping_shl(self, n: u32) -> Self;
    fn wrapping_shr(self, n: u32) -> Self;
    fn checked_pow(self, exp: u32) -> Option<Self>;
    fn to_i128(self) -> i128;
    fn from_i128(v: i128) -> Option<Self>;
    fn into_value(self) -> Value;
}

macro_rules! impl_int {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Int for $ty {
                const ZERO: Self = 0;
                const BITS: u32 = <$ty>::BITS;
                const KIND: ValueKind = ValueKind::$variant;

                fn wrapping_add(self, rhs: Self) -> Self { <$ty>::wrapping_add(self, rhs) }
                fn wrapping_sub(self, rhs: Self) -> Self { <$ty>::wrapping_sub(self, rhs) }
                fn wrapping_mul(self, rhs: Self) -> Self { <$ty>::wrapping_mul(self, rhs) }
                fn wrapping_div(self, rhs: Self) -> Self { <$ty>::wrapping_div(self, rhs) }
                fn wrapping_rem(self, rhs: Self) -> Self { <$ty>::wrapping_rem(self, rhs) }
                fn wrapping_neg(self) -> Self { <$ty>::wrapping_neg(self) }
                fn wrapping_shl(self, n: u32) -> Self { <$ty>::wrapping_shl(self, n) }
                fn wrapping_shr(self, n: u32) -> Self { <$ty>::wrapping_shr(self, n) }
                fn checked_pow(self, exp: u32) -> Option<Self> { <$ty>::checked_pow(self, exp) }
                fn to_i128(self) -> i128 { self as i128 }
                fn from_i128(v: i128) -> Option<Self> { <$ty>::try_from(v).ok() }
                fn into_value(self) -> Value { Value::$variant(self) }
            }
        )*
    };
}

impl_int!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
);

/// Floating-point behaviour shared by `float32` and `float64`
trait Real: Copy + PartialOrd {
    const ZERO: Self;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn div(self, rhs: Self) -> Self;
    fn powf(self, rhs: Self) -> Self;
    fn into_value(self) -> Value;
}

macro_rules! impl_real {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Real for $ty {
                const ZERO: Self = 0.0;

                fn add(self, rhs: Self) -> Self { self + rhs }
                fn sub(self, rhs: Self) -> Self { self - rhs }
                fn mul(self, rhs: Self) -> Self { self * rhs }
                fn div(self, rhs: Self) -> Self { self / rhs }
                fn powf(self, rhs: Self) -> Self { <$ty>::powf(self, rhs) }
                fn into_value(self) -> Value { Value::$variant(self) }
            }
        )*
    };
}

impl_real!(f32 => Float32, f64 => Float64);

/// Apply a unary operator
pub fn unary(op: UnaryOperator, value: Value) -> FormulaResult<Value> {
    let invalid = |kind| FormulaError::InvalidOperation {
        op: op.symbol(),
        kind,
    };
    let kind = value.kind();

    match op {
        UnaryOperator::Plus if kind.is_numeric() => Ok(value),
        UnaryOperator::Negate => match value {
            Value::Int8(v) => Ok(Value::Int8(v.wrapping_neg())),
            Value::Int16(v) => Ok(Value::Int16(v.wrapping_neg())),
            Value::Int32(v) => Ok(Value::Int32(v.wrapping_neg())),
            Value::Int64(v) => Ok(Value::Int64(v.wrapping_neg())),
            Value::UInt8(v) => Ok(Value::UInt8(v.wrapping_neg())),
            Value::UInt16(v) => Ok(Value::UInt16(v.wrapping_neg())),
            Value::UInt32(v) => Ok(Value::UInt32(v.wrapping_neg())),
            Value::UInt64(v) => Ok(Value::UInt64(v.wrapping_neg())),
            Value::Float32(v) => Ok(Value::Float32(-v)),
            Value::Float64(v) => Ok(Value::Float64(-v)),
            Value::Complex64(c) => Ok(Value::Complex64(-c)),
            Value::Complex128(c) => Ok(Value::Complex128(-c)),
            _ => Err(invalid(kind)),
        },
        UnaryOperator::Complement => match value {
            Value::Int8(v) => Ok(Value::Int8(!v)),
            Value::Int16(v) => Ok(Value::Int16(!v)),
            Value::Int32(v) => Ok(Value::Int32(!v)),
            Value::Int64(v) => Ok(Value::Int64(!v)),
            Value::UInt8(v) => Ok(Value::UInt8(!v)),
            Value::UInt16(v) => Ok(Value::UInt16(!v)),
            Value::UInt32(v) => Ok(Value::UInt32(!v)),
            Value::UInt64(v) => Ok(Value::UInt64(!v)),
            _ => Err(invalid(kind)),
        },
        UnaryOperator::Not => match value {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            _ => Err(invalid(kind)),
        },
        UnaryOperator::Factorial => match value {
            Value::Int8(v) => factorial(v),
            Value::Int16(v) => factorial(v),
            Value::Int32(v) => factorial(v),
            Value::Int64(v) => factorial(v),
            Value::UInt8(v) => factorial(v),
            Value::UInt16(v) => factorial(v),
            Value::UInt32(v) => factorial(v),
            Value::UInt64(v) => factorial(v),
            _ => Err(invalid(kind)),
        },
        UnaryOperator::Plus => Err(invalid(kind)),
    }
}

fn factorial<T: Int>(n: T) -> FormulaResult<Value> {
    if n < T::ZERO {
        return Err(FormulaError::Arithmetic(format!(
            "factorial of negative number {}",
            n.to_i128()
        )));
    }

    let mut acc: i128 = 1;
    let mut i: i128 = 2;
    while i <= n.to_i128() {
        acc = acc
            .checked_mul(i)
            .filter(|v| T::from_i128(*v).is_some())
            .ok_or_else(|| {
                FormulaError::Arithmetic(format!(
                    "factorial of {} overflows {}",
                    n.to_i128(),
                    T::KIND
                ))
            })?;
        i += 1;
    }

    T::from_i128(acc)
        .map(T::into_value)
        .ok_or_else(|| FormulaError::Arithmetic(format!("factorial overflows {}", T::KIND)))
}

/// Apply a binary operator to two already evaluated operands
///
/// `&&` and `||` are accepted here for completeness; the evaluator
/// short-circuits them before the right operand is evaluated.
pub fn binary(op: BinaryOperator, left: Value, right: Value) -> FormulaResult<Value> {
    if matches!(op, BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight) {
        return shift(op, left, right);
    }

    if left.kind() != right.kind() {
        return Err(FormulaError::KindMismatch {
            op: op.symbol(),
            left: left.kind(),
            right: right.kind(),
        });
    }

    match (left, right) {
        (Value::Int8(a), Value::Int8(b)) => int_binary(op, a, b),
        (Value::Int16(a), Value::Int16(b)) => int_binary(op, a, b),
        (Value::Int32(a), Value::Int32(b)) => int_binary(op, a, b),
        (Value::Int64(a), Value::Int64(b)) => int_binary(op, a, b),
        (Value::UInt8(a), Value::UInt8(b)) => int_binary(op, a, b),
        (Value::UInt16(a), Value::UInt16(b)) => int_binary(op, a, b),
        (Value::UInt32(a), Value::UInt32(b)) => int_binary(op, a, b),
        (Value::UInt64(a), Value::UInt64(b)) => int_binary(op, a, b),
        (Value::Float32(a), Value::Float32(b)) => real_binary(op, a, b, ValueKind::Float32),
        (Value::Float64(a), Value::Float64(b)) => real_binary(op, a, b, ValueKind::Float64),
        (Value::Complex64(a), Value::Complex64(b)) => complex64_binary(op, a, b),
        (Value::Complex128(a), Value::Complex128(b)) => complex128_binary(op, a, b),
        (Value::String(a), Value::String(b)) => string_binary(op, a, b),
        (Value::Bool(a), Value::Bool(b)) => bool_binary(op, a, b),
        (left, _) => Err(FormulaError::InvalidOperation {
            op: op.symbol(),
            kind: left.kind(),
        }),
    }
}

/// Comparison operators shared by every ordered kind
fn compare(op: BinaryOperator, ordering: Option<Ordering>) -> Option<bool> {
    use BinaryOperator::*;
    let result = match op {
        Equal => ordering == Some(Ordering::Equal),
        NotEqual => ordering != Some(Ordering::Equal),
        LessThan => ordering == Some(Ordering::Less),
        LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        GreaterThan => ordering == Some(Ordering::Greater),
        GreaterEqual => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return None,
    };
    Some(result)
}

fn int_binary<T: Int>(op: BinaryOperator, a: T, b: T) -> FormulaResult<Value> {
    use BinaryOperator::*;

    if let Some(result) = compare(op, Some(a.cmp(&b))) {
        return Ok(Value::Bool(result));
    }

    let value = match op {
        Add => a.wrapping_add(b),
        Subtract => a.wrapping_sub(b),
        Multiply => a.wrapping_mul(b),
        Divide | Remainder if b == T::ZERO => {
            return Err(FormulaError::DivisionByZero { op: op.symbol() })
        }
        Divide => a.wrapping_div(b),
        Remainder => a.wrapping_rem(b),
        BitAnd => a & b,
        BitOr => a | b,
        BitXor => a ^ b,
        AndNot => a & !b,
        Power => {
            if b < T::ZERO {
                return Err(FormulaError::Arithmetic(format!(
                    "negative exponent {} for {}",
                    b.to_i128(),
                    T::KIND
                )));
            }
            let exp = b.to_i128();
            let exp = match u32::try_from(exp) {
                Ok(exp) => exp,
                // Only 0, 1 and -1 stay in range; keep the parity of the exponent
                Err(_) if a.to_i128().abs() <= 1 => 2 + (exp % 2) as u32,
                Err(_) => {
                    return Err(FormulaError::Arithmetic(format!(
                        "exponent {exp} too large for {}",
                        T::KIND
                    )))
                }
            };
            a.checked_pow(exp).ok_or_else(|| {
                FormulaError::Arithmetic(format!("** overflows {}", T::KIND))
            })?
        }
        _ => {
            return Err(FormulaError::InvalidOperation {
                op: op.symbol(),
                kind: T::KIND,
            })
        }
    };

    Ok(value.into_value())
}

fn real_binary<T: Real>(op: BinaryOperator, a: T, b: T, kind: ValueKind) -> FormulaResult<Value> {
    use BinaryOperator::*;

    if let Some(result) = compare(op, a.partial_cmp(&b)) {
        return Ok(Value::Bool(result));
    }

    let value = match op {
        Add => a.add(b),
        Subtract => a.sub(b),
        Multiply => a.mul(b),
        Divide if b == T::ZERO => return Err(FormulaError::DivisionByZero { op: op.symbol() }),
        Divide => a.div(b),
        Power => a.powf(b),
        _ => {
            return Err(FormulaError::InvalidOperation {
                op: op.symbol(),
                kind,
            })
        }
    };

    Ok(value.into_value())
}

macro_rules! complex_binary_fn {
    ($name:ident, $ty:ty, $variant:ident) => {
        fn $name(op: BinaryOperator, a: Complex<$ty>, b: Complex<$ty>) -> FormulaResult<Value> {
            use BinaryOperator::*;

            let value = match op {
                Equal => return Ok(Value::Bool(a == b)),
                NotEqual => return Ok(Value::Bool(a != b)),
                Add => a + b,
                Subtract => a - b,
                Multiply => a * b,
                Divide if b == Complex::new(0.0, 0.0) => {
                    return Err(FormulaError::DivisionByZero { op: op.symbol() })
                }
                Divide => a / b,
                Power => a.powc(b),
                _ => {
                    return Err(FormulaError::InvalidOperation {
                        op: op.symbol(),
                        kind: ValueKind::$variant,
                    })
                }
            };

            Ok(Value::$variant(value))
        }
    };
}

complex_binary_fn!(complex64_binary, f32, Complex64);
complex_binary_fn!(complex128_binary, f64, Complex128);

fn string_binary(op: BinaryOperator, a: String, b: String) -> FormulaResult<Value> {
    if let Some(result) = compare(op, Some(a.as_bytes().cmp(b.as_bytes()))) {
        return Ok(Value::Bool(result));
    }
    match op {
        BinaryOperator::Add => Ok(Value::String(a + &b)),
        _ => Err(FormulaError::InvalidOperation {
            op: op.symbol(),
            kind: ValueKind::String,
        }),
    }
}

fn bool_binary(op: BinaryOperator, a: bool, b: bool) -> FormulaResult<Value> {
    match op {
        BinaryOperator::And => Ok(Value::Bool(a && b)),
        BinaryOperator::Or => Ok(Value::Bool(a || b)),
        BinaryOperator::Equal => Ok(Value::Bool(a == b)),
        BinaryOperator::NotEqual => Ok(Value::Bool(a != b)),
        _ => Err(FormulaError::InvalidOperation {
            op: op.symbol(),
            kind: ValueKind::Bool,
        }),
    }
}

/// Shifts take any integer on the left and an unsigned (or non-negative
/// signed) count on the right
fn shift(op: BinaryOperator, left: Value, right: Value) -> FormulaResult<Value> {
    let count = match right.as_i128() {
        Some(n) if n < 0 => {
            return Err(FormulaError::Arithmetic(format!(
                "negative shift count {n}"
            )))
        }
        Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
        None => {
            return Err(FormulaError::Arithmetic(format!(
                "shift count must be an integer, got {}",
                right.kind()
            )))
        }
    };

    match left {
        Value::Int8(v) => Ok(shift_int(op, v, count)),
        Value::Int16(v) => Ok(shift_int(op, v, count)),
        Value::Int32(v) => Ok(shift_int(op, v, count)),
        Value::Int64(v) => Ok(shift_int(op, v, count)),
        Value::UInt8(v) => Ok(shift_int(op, v, count)),
        Value::UInt16(v) => Ok(shift_int(op, v, count)),
        Value::UInt32(v) => Ok(shift_int(op, v, count)),
        Value::UInt64(v) => Ok(shift_int(op, v, count)),
        other => Err(FormulaError::InvalidOperation {
            op: op.symbol(),
            kind: other.kind(),
        }),
    }
}

fn shift_int<T: Int>(op: BinaryOperator, v: T, count: u32) -> Value {
    let shifted = if count < T::BITS {
        match op {
            BinaryOperator::ShiftLeft => v.wrapping_shl(count),
            _ => v.wrapping_shr(count),
        }
    } else if op == BinaryOperator::ShiftRight && v < T::ZERO {
        !T::ZERO
    } else {
        T::ZERO
    };
    shifted.into_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bin(op: BinaryOperator, a: Value, b: Value) -> FormulaResult<Value> {
        binary(op, a, b)
    }

    #[test]
    fn test_integer_arithmetic_wraps() {
        assert_eq!(
            bin(BinaryOperator::Add, Value::Int8(127), Value::Int8(1)).unwrap(),
            Value::Int8(-128)
        );
        assert_eq!(
            bin(BinaryOperator::Subtract, Value::UInt8(0), Value::UInt8(1)).unwrap(),
            Value::UInt8(255)
        );
        assert_eq!(
            bin(BinaryOperator::Divide, Value::Int32(i32::MIN), Value::Int32(-1)).unwrap(),
            Value::Int32(i32::MIN)
        );
        assert_eq!(
            bin(BinaryOperator::Remainder, Value::Int64(-7), Value::Int64(3)).unwrap(),
            Value::Int64(-1)
        );
    }

    #[test]
    fn test_division_by_zero() {
        for op in [BinaryOperator::Divide, BinaryOperator::Remainder] {
            assert_eq!(
                bin(op, Value::Int64(1), Value::Int64(0)).unwrap_err(),
                FormulaError::DivisionByZero { op: op.symbol() }
            );
        }
        assert!(bin(BinaryOperator::Divide, Value::Float64(1.0), Value::Float64(0.0)).is_err());
        assert!(bin(
            BinaryOperator::Divide,
            Value::Complex128(Complex::new(1.0, 1.0)),
            Value::Complex128(Complex::new(0.0, 0.0))
        )
        .is_err());
    }

    #[test]
    fn test_kind_mismatch() {
        let err = bin(BinaryOperator::Add, Value::Int64(1), Value::Int32(1)).unwrap_err();
        assert_eq!(err.to_string(), "mismatched kinds for +: int64 and int32");
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(
            bin(BinaryOperator::AndNot, Value::UInt8(0b1110), Value::UInt8(0b0110)).unwrap(),
            Value::UInt8(0b1000)
        );
        assert_eq!(
            bin(BinaryOperator::BitXor, Value::Int64(6), Value::Int64(3)).unwrap(),
            Value::Int64(5)
        );
        assert_eq!(
            unary(UnaryOperator::Complement, Value::UInt8(0)).unwrap(),
            Value::UInt8(255)
        );
        assert_eq!(
            bin(BinaryOperator::BitOr, Value::Float64(1.0), Value::Float64(2.0))
                .unwrap_err()
                .to_string(),
            "operator | is not defined for float64"
        );
    }

    #[test]
    fn test_shifts() {
        assert_eq!(
            bin(BinaryOperator::ShiftLeft, Value::Int64(1), Value::UInt8(4)).unwrap(),
            Value::Int64(16)
        );
        assert_eq!(
            bin(BinaryOperator::ShiftRight, Value::Int8(-8), Value::Int64(1)).unwrap(),
            Value::Int8(-4)
        );
        assert_eq!(
            bin(BinaryOperator::ShiftLeft, Value::UInt8(1), Value::UInt64(8)).unwrap(),
            Value::UInt8(0)
        );
        assert_eq!(
            bin(BinaryOperator::ShiftRight, Value::Int16(-5), Value::UInt32(99)).unwrap(),
            Value::Int16(-1)
        );
        assert!(bin(BinaryOperator::ShiftLeft, Value::Int64(1), Value::Int64(-1)).is_err());
        assert!(bin(BinaryOperator::ShiftLeft, Value::Int64(1), Value::Float64(1.0)).is_err());
        assert!(bin(BinaryOperator::ShiftLeft, Value::Float64(1.0), Value::UInt8(1)).is_err());
    }

    #[test]
    fn test_power() {
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(2), Value::Int64(10)).unwrap(),
            Value::Int64(1024)
        );
        assert!(bin(BinaryOperator::Power, Value::Int8(2), Value::Int8(7)).is_err());
        assert!(bin(BinaryOperator::Power, Value::Int64(2), Value::Int64(-1)).is_err());

        let huge = 5_000_000_000;
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(1), Value::Int64(huge)).unwrap(),
            Value::Int64(1)
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(0), Value::Int64(huge)).unwrap(),
            Value::Int64(0)
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(-1), Value::Int64(huge)).unwrap(),
            Value::Int64(1)
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(-1), Value::Int64(huge + 1)).unwrap(),
            Value::Int64(-1)
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::UInt64(1), Value::UInt64(u64::MAX)).unwrap(),
            Value::UInt64(1)
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int64(2), Value::Int64(huge)).unwrap_err(),
            FormulaError::Arithmetic("exponent 5000000000 too large for int64".into())
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Int8(2), Value::Int8(7)).unwrap_err(),
            FormulaError::Arithmetic("** overflows int8".into())
        );
        assert_eq!(
            bin(BinaryOperator::Power, Value::Float64(2.0), Value::Float64(3.0)).unwrap(),
            Value::Float64(8.0)
        );
    }

    #[test]
    fn test_factorial() {
        assert_eq!(
            unary(UnaryOperator::Factorial, Value::Int64(5)).unwrap(),
            Value::Int64(120)
        );
        assert_eq!(
            unary(UnaryOperator::Factorial, Value::UInt8(0)).unwrap(),
            Value::UInt8(1)
        );
        assert_eq!(
            unary(UnaryOperator::Factorial, Value::UInt8(5)).unwrap(),
            Value::UInt8(120)
        );
        assert!(unary(UnaryOperator::Factorial, Value::UInt8(6)).is_err());
        assert!(unary(UnaryOperator::Factorial, Value::Int64(-1)).is_err());
        assert!(unary(UnaryOperator::Factorial, Value::UInt64(u64::MAX)).is_err());
        assert!(unary(UnaryOperator::Factorial, Value::Float64(3.0)).is_err());
    }

    #[test]
    fn test_unary_kinds() {
        assert_eq!(
            unary(UnaryOperator::Negate, Value::Float32(1.5)).unwrap(),
            Value::Float32(-1.5)
        );
        assert_eq!(
            unary(UnaryOperator::Plus, Value::UInt16(3)).unwrap(),
            Value::UInt16(3)
        );
        assert_eq!(
            unary(UnaryOperator::Not, Value::Int64(1))
                .unwrap_err()
                .to_string(),
            "operator ! is not defined for int64"
        );
        assert!(unary(UnaryOperator::Negate, Value::String("x".into())).is_err());
        assert!(unary(UnaryOperator::Plus, Value::Bool(true)).is_err());
    }

    #[test]
    fn test_strings_and_bools() {
        assert_eq!(
            bin(
                BinaryOperator::Add,
                Value::String("ab".into()),
                Value::String("cd".into())
            )
            .unwrap(),
            Value::String("abcd".into())
        );
        assert_eq!(
            bin(
                BinaryOperator::LessThan,
                Value::String("Z".into()),
                Value::String("a".into())
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert!(bin(
            BinaryOperator::Multiply,
            Value::String("a".into()),
            Value::String("b".into())
        )
        .is_err());
        assert_eq!(
            bin(BinaryOperator::NotEqual, Value::Bool(true), Value::Bool(false)).unwrap(),
            Value::Bool(true)
        );
        assert!(bin(BinaryOperator::LessThan, Value::Bool(true), Value::Bool(false)).is_err());
    }

    #[test]
    fn test_complex() {
        let i = Value::Complex128(Complex::new(0.0, 1.0));
        assert_eq!(
            bin(BinaryOperator::Multiply, i.clone(), i.clone()).unwrap(),
            Value::Complex128(Complex::new(-1.0, 0.0))
        );
        assert_eq!(
            bin(BinaryOperator::Equal, i.clone(), i.clone()).unwrap(),
            Value::Bool(true)
        );
        assert!(bin(BinaryOperator::LessThan, i.clone(), i).is_err());
    }
}
