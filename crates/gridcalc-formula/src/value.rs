//! Runtime values
//!
//! [`Value`] is a closed set of scalar kinds. Every operator dispatches on the
//! kind pair explicitly (see [`crate::ops`]); nothing is coerced implicitly.

use crate::ast::LiteralKind;
use crate::error::{FormulaError, FormulaResult};
use num_complex::Complex;
use std::fmt;

/// The kind of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKind {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Bool,
}

impl ValueKind {
    pub const ALL: [ValueKind; 14] = [
        ValueKind::Int8,
        ValueKind::Int16,
        ValueKind::Int32,
        ValueKind::Int64,
        ValueKind::UInt8,
        ValueKind::UInt16,
        ValueKind::UInt32,
        ValueKind::UInt64,
        ValueKind::Float32,
        ValueKind::Float64,
        ValueKind::Complex64,
        ValueKind::Complex128,
        ValueKind::String,
        ValueKind::Bool,
    ];

    /// Canonical name, also the callee name of the conversion to this kind
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Int8 => "int8",
            ValueKind::Int16 => "int16",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
            ValueKind::UInt8 => "uint8",
            ValueKind::UInt16 => "uint16",
            ValueKind::UInt32 => "uint32",
            ValueKind::UInt64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
            ValueKind::Complex64 => "complex64",
            ValueKind::Complex128 => "complex128",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ValueKind::Int8 | ValueKind::Int16 | ValueKind::Int32 | ValueKind::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ValueKind::UInt8 | ValueKind::UInt16 | ValueKind::UInt32 | ValueKind::UInt64
        )
    }

    pub fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub fn is_float(self) -> bool {
        matches!(self, ValueKind::Float32 | ValueKind::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, ValueKind::Complex64 | ValueKind::Complex128)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float() || self.is_complex()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A computed value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    String(String),
    Bool(bool),
}

impl Default for Value {
    /// The value of a cell without an expression
    fn default() -> Self {
        Value::Int64(0)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int8(_) => ValueKind::Int8,
            Value::Int16(_) => ValueKind::Int16,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
            Value::UInt8(_) => ValueKind::UInt8,
            Value::UInt16(_) => ValueKind::UInt16,
            Value::UInt32(_) => ValueKind::UInt32,
            Value::UInt64(_) => ValueKind::UInt64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float64(_) => ValueKind::Float64,
            Value::Complex64(_) => ValueKind::Complex64,
            Value::Complex128(_) => ValueKind::Complex128,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Widen any integer kind, `None` for everything else
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Int8(v) => Some(v as i128),
            Value::Int16(v) => Some(v as i128),
            Value::Int32(v) => Some(v as i128),
            Value::Int64(v) => Some(v as i128),
            Value::UInt8(v) => Some(v as i128),
            Value::UInt16(v) => Some(v as i128),
            Value::UInt32(v) => Some(v as i128),
            Value::UInt64(v) => Some(v as i128),
            _ => None,
        }
    }

    /// Widen any real kind (integer or float), `None` for everything else
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float32(v) => Some(v as f64),
            Value::Float64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Decode a literal from its raw source text
    ///
    /// Integers become `int64`, floats `float64`, imaginary numbers
    /// `complex128` and character literals the `int32` code point.
    pub fn from_literal(kind: LiteralKind, raw: &str) -> FormulaResult<Value> {
        match kind {
            LiteralKind::Int => raw
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| FormulaError::literal(raw, "integer overflows int64")),
            LiteralKind::Float => raw
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|e| FormulaError::literal(raw, e.to_string())),
            LiteralKind::Imaginary => raw
                .strip_suffix('i')
                .and_then(|digits| digits.parse::<f64>().ok())
                .map(|im| Value::Complex128(Complex::new(0.0, im)))
                .ok_or_else(|| FormulaError::literal(raw, "malformed imaginary number")),
            LiteralKind::Char => {
                let text = unquote(raw, '\'')?;
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Int32(c as i32)),
                    _ => Err(FormulaError::literal(
                        raw,
                        "character literal must hold exactly one character",
                    )),
                }
            }
            LiteralKind::String => unquote(raw, '"').map(Value::String),
            LiteralKind::Bool => match raw {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(FormulaError::literal(raw, "not a boolean")),
            },
        }
    }

    /// Convert to another kind following the conversion rules shared by
    /// conversion calls and argument coercion
    ///
    /// # Example
    /// ```rust
    /// use gridcalc_formula::{Value, ValueKind};
    ///
    /// assert_eq!(Value::Float64(2.9).convert(ValueKind::Int8).unwrap(), Value::Int8(2));
    /// assert_eq!(Value::Int32(65).convert(ValueKind::String).unwrap(), Value::String("A".into()));
    /// assert!(Value::Bool(true).convert(ValueKind::Int64).is_err());
    /// ```
    pub fn convert(&self, to: ValueKind) -> FormulaResult<Value> {
        let from = self.kind();
        if from == to {
            return Ok(self.clone());
        }
        let fail = || FormulaError::Conversion { from, to };

        match self {
            Value::String(_) | Value::Bool(_) => Err(fail()),
            Value::Complex64(c) => {
                complex_to(Complex::new(c.re as f64, c.im as f64), to).ok_or_else(fail)
            }
            Value::Complex128(c) => complex_to(*c, to).ok_or_else(fail),
            Value::Float32(_) | Value::Float64(_) => {
                let v = self.as_f64().ok_or_else(fail)?;
                match to {
                    _ if to.is_integer() => Ok(int_to(to, v as i128)),
                    _ => real_to(v, to).ok_or_else(fail),
                }
            }
            _ => {
                let v = self.as_i128().ok_or_else(fail)?;
                match to {
                    _ if to.is_integer() => Ok(int_to(to, v)),
                    ValueKind::String => {
                        let c = u32::try_from(v)
                            .ok()
                            .and_then(char::from_u32)
                            .unwrap_or(char::REPLACEMENT_CHARACTER);
                        Ok(Value::String(c.to_string()))
                    }
                    _ => real_to(v as f64, to).ok_or_else(fail),
                }
            }
        }
    }
}

/// Wrap an integer into `kind`, truncating to its width
pub(crate) fn int_to(kind: ValueKind, v: i128) -> Value {
    match kind {
        ValueKind::Int8 => Value::Int8(v as i8),
        ValueKind::Int16 => Value::Int16(v as i16),
        ValueKind::Int32 => Value::Int32(v as i32),
        ValueKind::UInt8 => Value::UInt8(v as u8),
        ValueKind::UInt16 => Value::UInt16(v as u16),
        ValueKind::UInt32 => Value::UInt32(v as u32),
        ValueKind::UInt64 => Value::UInt64(v as u64),
        _ => Value::Int64(v as i64),
    }
}

fn real_to(v: f64, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Float32 => Some(Value::Float32(v as f32)),
        ValueKind::Float64 => Some(Value::Float64(v)),
        ValueKind::Complex64 => Some(Value::Complex64(Complex::new(v as f32, 0.0))),
        ValueKind::Complex128 => Some(Value::Complex128(Complex::new(v, 0.0))),
        _ => None,
    }
}

fn complex_to(c: Complex<f64>, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::Complex64 => Some(Value::Complex64(Complex::new(c.re as f32, c.im as f32))),
        ValueKind::Complex128 => Some(Value::Complex128(c)),
        _ => None,
    }
}

/// Strip the quotes from a char or string literal and process its escapes
fn unquote(raw: &str, quote: char) -> FormulaResult<String> {
    let body = raw
        .strip_prefix(quote)
        .and_then(|s| s.strip_suffix(quote))
        .ok_or_else(|| FormulaError::literal(raw, "missing quotes"))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('a') => '\u{07}',
            Some('b') => '\u{08}',
            Some('f') => '\u{0C}',
            Some('v') => '\u{0B}',
            Some('\\') => '\\',
            Some('\'') => '\'',
            Some('"') => '"',
            Some('x') => hex_escape(raw, &mut chars, 2)?,
            Some('u') => hex_escape(raw, &mut chars, 4)?,
            Some('U') => hex_escape(raw, &mut chars, 8)?,
            Some(other) => {
                return Err(FormulaError::literal(
                    raw,
                    format!("unknown escape sequence \\{other}"),
                ))
            }
            None => return Err(FormulaError::literal(raw, "dangling backslash")),
        };
        out.push(escaped);
    }
    Ok(out)
}

fn hex_escape(raw: &str, chars: &mut std::str::Chars<'_>, digits: usize) -> FormulaResult<char> {
    let hex: String = chars.take(digits).collect();
    if hex.len() != digits {
        return Err(FormulaError::literal(raw, "truncated escape sequence"));
    }
    u32::from_str_radix(&hex, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| FormulaError::literal(raw, format!("invalid escape value {hex}")))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::UInt8(v) => write!(f, "{v}"),
            Value::UInt16(v) => write!(f, "{v}"),
            Value::UInt32(v) => write!(f, "{v}"),
            Value::UInt64(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Complex64(c) => write!(f, "({}{:+}i)", c.re, c.im),
            Value::Complex128(c) => write!(f, "({}{:+}i)", c.re, c.im),
            Value::String(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}
