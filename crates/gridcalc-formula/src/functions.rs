//! Function registry
//!
//! Callees come in two shapes. Conversions are the fourteen value kinds,
//! pre-registered under their canonical names (`int8`, `float64`, ...).
//! Functions are typed Rust closures registered under an exported-style name:
//!
//! ```rust
//! use gridcalc_formula::{CallContext, FunctionRegistry};
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register("Double", |x: i64| x * 2).unwrap();
//! registry
//!     .register("Safe", |a: f64, b: f64| {
//!         if b == 0.0 { Err("zero divisor") } else { Ok(a / b) }
//!     })
//!     .unwrap();
//! registry
//!     .register_with_context("Here", |ctx: &CallContext| ctx.row as i64)
//!     .unwrap();
//! assert!(registry.register("Double", |x: i64| x).is_err());
//! ```

use crate::error::{FormulaError, FormulaResult};
use crate::value::{Value, ValueKind};
use ahash::AHashMap;
use num_complex::Complex;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Where a call is being evaluated
///
/// Handed as the implicit first argument to functions registered with
/// [`FunctionRegistry::register_with_context`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Column of the evaluating cell
    pub column: u32,
    /// Row of the evaluating cell
    pub row: u32,
    /// Column count of the grid
    pub columns: u32,
    /// Row count of the grid
    pub rows: u32,
}

/// A Rust type that mirrors one value kind
pub trait ScalarType: Sized + 'static {
    const KIND: ValueKind;

    fn from_value(value: Value) -> Option<Self>;
    fn into_value(self) -> Value;
}

/// What a registered closure may return: a scalar, or a scalar with an error
pub trait IntoCallResult {
    fn into_call_result(self) -> Result<Value, String>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ScalarType for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }

            impl IntoCallResult for $ty {
                fn into_call_result(self) -> Result<Value, String> {
                    Ok(self.into_value())
                }
            }
        )*
    };
}

impl_scalar!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    String => String,
    bool => Bool,
);

impl<T: ScalarType, E: fmt::Display> IntoCallResult for Result<T, E> {
    fn into_call_result(self) -> Result<Value, String> {
        self.map(ScalarType::into_value).map_err(|e| e.to_string())
    }
}

type Callable = Arc<dyn Fn(&CallContext, Vec<Value>) -> Result<Value, String> + Send + Sync>;

/// A closure that can be registered as a plain function
///
/// Implemented for `Fn(A, B, ..) -> R` with up to four [`ScalarType`]
/// parameters. `Args` only exists to keep the impls apart.
pub trait IntoFunction<Args> {
    fn params() -> Vec<ValueKind>;
    fn into_callable(self) -> Callable;
}

/// A closure taking `&CallContext` before its value parameters
pub trait IntoContextFunction<Args> {
    fn params() -> Vec<ValueKind>;
    fn into_callable(self) -> Callable;
}

const ARGUMENT_KIND_MISMATCH: &str = "argument kind does not match the declared parameter";

macro_rules! impl_into_function {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> IntoFunction<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoCallResult,
            $($arg: ScalarType,)*
        {
            fn params() -> Vec<ValueKind> {
                vec![$(<$arg as ScalarType>::KIND),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_callable(self) -> Callable {
                Arc::new(move |_ctx: &CallContext, args: Vec<Value>| {
                    let mut args = args.into_iter();
                    $(
                        let $arg = args
                            .next()
                            .and_then(<$arg as ScalarType>::from_value)
                            .ok_or_else(|| ARGUMENT_KIND_MISMATCH.to_string())?;
                    )*
                    (self)($($arg),*).into_call_result()
                })
            }
        }

        impl<Func, Ret, $($arg,)*> IntoContextFunction<($($arg,)*)> for Func
        where
            Func: Fn(&CallContext, $($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoCallResult,
            $($arg: ScalarType,)*
        {
            fn params() -> Vec<ValueKind> {
                vec![$(<$arg as ScalarType>::KIND),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_callable(self) -> Callable {
                Arc::new(move |ctx: &CallContext, args: Vec<Value>| {
                    let mut args = args.into_iter();
                    $(
                        let $arg = args
                            .next()
                            .and_then(<$arg as ScalarType>::from_value)
                            .ok_or_else(|| ARGUMENT_KIND_MISMATCH.to_string())?;
                    )*
                    (self)(ctx, $($arg),*).into_call_result()
                })
            }
        }
    };
}

impl_into_function!();
impl_into_function!(A);
impl_into_function!(A, B);
impl_into_function!(A, B, C);
impl_into_function!(A, B, C, D);

/// A registered function
#[derive(Clone)]
pub struct FunctionDef {
    name: String,
    params: Vec<ValueKind>,
    wants_context: bool,
    call: Callable,
}

impl FunctionDef {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter kinds, excluding the implicit context
    pub fn params(&self) -> &[ValueKind] {
        &self.params
    }

    pub fn wants_context(&self) -> bool {
        self.wants_context
    }

    /// Invoke with arguments already coerced to [`FunctionDef::params`]
    ///
    /// Errors returned by the closure and panics raised inside it both come
    /// back as [`FormulaError::Callee`].
    pub fn invoke(&self, ctx: &CallContext, args: Vec<Value>) -> FormulaResult<Value> {
        if args.len() != self.params.len() {
            return Err(FormulaError::ArgumentCount {
                function: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.call)(ctx, args)));
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(FormulaError::Callee {
                function: self.name.clone(),
                message,
            }),
            Err(payload) => {
                tracing::warn!(function = %self.name, "registered function panicked");
                Err(FormulaError::Callee {
                    function: self.name.clone(),
                    message: format!("panic during call: {}", panic_message(payload.as_ref())),
                })
            }
        }
    }
}

impl fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("wants_context", &self.wants_context)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}

/// A resolved callee name
#[derive(Debug, Clone, Copy)]
pub enum Callee<'r> {
    /// Conversion to a value kind
    Conversion(ValueKind),
    Function(&'r FunctionDef),
}

/// Function registry
///
/// Each grid owns one; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a registry holding only the conversions
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a callee, conversions first
    pub fn get(&self, name: &str) -> Option<Callee<'_>> {
        if let Some(kind) = ValueKind::from_name(name) {
            return Some(Callee::Conversion(kind));
        }
        self.functions.get(name).map(Callee::Function)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of the registered functions, sorted
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a plain function
    pub fn register<Args, F>(&mut self, name: &str, func: F) -> FormulaResult<()>
    where
        F: IntoFunction<Args>,
    {
        self.insert(name, F::params(), false, func.into_callable())
    }

    /// Register a function that receives the [`CallContext`] as its first
    /// parameter
    pub fn register_with_context<Args, F>(&mut self, name: &str, func: F) -> FormulaResult<()>
    where
        F: IntoContextFunction<Args>,
    {
        self.insert(name, F::params(), true, func.into_callable())
    }

    fn insert(
        &mut self,
        name: &str,
        params: Vec<ValueKind>,
        wants_context: bool,
        call: Callable,
    ) -> FormulaResult<()> {
        let reject = |reason: &str| FormulaError::Registration {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if !lazy_regex::regex_is_match!(r"^[A-Z][A-Za-z0-9_]*$", name) {
            return Err(reject(
                "name must start with an uppercase letter followed by letters, digits or '_'",
            ));
        }
        if self.contains(name) {
            return Err(reject("name is already registered"));
        }

        tracing::debug!(name, ?params, wants_context, "registering function");
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                name: name.to_string(),
                params,
                wants_context,
                call,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn function<'r>(registry: &'r FunctionRegistry, name: &str) -> &'r FunctionDef {
        match registry.get(name) {
            Some(Callee::Function(def)) => def,
            other => panic!("expected function {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_conversions_are_preregistered() {
        let registry = FunctionRegistry::new();
        for kind in ValueKind::ALL {
            assert!(matches!(
                registry.get(kind.name()),
                Some(Callee::Conversion(k)) if k == kind
            ));
        }
        assert!(registry.get("Missing").is_none());
        assert!(registry.function_names().is_empty());
    }

    #[test]
    fn test_register_and_invoke() {
        let mut registry = FunctionRegistry::new();
        registry
            .register("Add", |a: i64, b: i64| a.wrapping_add(b))
            .unwrap();
        registry
            .register("Greet", |name: String| format!("hi {name}"))
            .unwrap();
        registry.register("Answer", || 42u8).unwrap();

        let add = function(&registry, "Add");
        assert_eq!(add.params(), &[ValueKind::Int64, ValueKind::Int64]);
        assert!(!add.wants_context());
        assert_eq!(
            add.invoke(&CallContext::default(), vec![Value::Int64(2), Value::Int64(3)])
                .unwrap(),
            Value::Int64(5)
        );

        let greet = function(&registry, "Greet");
        assert_eq!(
            greet
                .invoke(&CallContext::default(), vec![Value::String("bob".into())])
                .unwrap(),
            Value::String("hi bob".into())
        );

        let answer = function(&registry, "Answer");
        assert_eq!(
            answer.invoke(&CallContext::default(), vec![]).unwrap(),
            Value::UInt8(42)
        );
        assert_eq!(registry.function_names(), vec!["Add", "Answer", "Greet"]);
    }

    #[test]
    fn test_context_is_passed_first() {
        let mut registry = FunctionRegistry::new();
        registry
            .register_with_context("Offset", |ctx: &CallContext, by: i64| ctx.row as i64 + by)
            .unwrap();

        let offset = function(&registry, "Offset");
        assert!(offset.wants_context());
        assert_eq!(offset.params(), &[ValueKind::Int64]);

        let ctx = CallContext {
            column: 1,
            row: 7,
            columns: 10,
            rows: 10,
        };
        assert_eq!(
            offset.invoke(&ctx, vec![Value::Int64(3)]).unwrap(),
            Value::Int64(10)
        );
    }

    #[test]
    fn test_returned_errors_and_panics_become_callee_errors() {
        let mut registry = FunctionRegistry::new();
        registry
            .register("Checked", |x: i64| {
                if x < 0 {
                    Err(format!("{x} is negative"))
                } else {
                    Ok(x)
                }
            })
            .unwrap();
        registry
            .register("Boom", |_x: bool| -> bool { panic!("kaboom") })
            .unwrap();

        let checked = function(&registry, "Checked");
        assert_eq!(
            checked
                .invoke(&CallContext::default(), vec![Value::Int64(-2)])
                .unwrap_err(),
            FormulaError::Callee {
                function: "Checked".into(),
                message: "-2 is negative".into()
            }
        );

        let boom = function(&registry, "Boom");
        let err = boom
            .invoke(&CallContext::default(), vec![Value::Bool(true)])
            .unwrap_err();
        assert_eq!(err.to_string(), "Boom: panic during call: kaboom");
    }

    #[test]
    fn test_invalid_registrations() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.register("lower", || 1i64).is_err());
        assert!(registry.register("_Hidden", || 1i64).is_err());
        assert!(registry.register("Has-Dash", || 1i64).is_err());
        assert!(registry.register("", || 1i64).is_err());

        registry.register("Once", || 1i64).unwrap();
        let err = registry.register("Once", || 2i64).unwrap_err();
        assert_eq!(
            err,
            FormulaError::Registration {
                name: "Once".into(),
                reason: "name is already registered".into()
            }
        );
    }

    #[test]
    fn test_registries_are_independent() {
        let mut first = FunctionRegistry::new();
        let second = FunctionRegistry::new();
        first.register("Only", || true).unwrap();
        assert!(first.contains("Only"));
        assert!(!second.contains("Only"));
    }
}
