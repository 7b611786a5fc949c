//! Host member model.
//!
//! A [`HostMember`] is the resolved, immutable description of one host
//! function or method: its name, the type it is declared in, declared
//! parameter and return tags, whether it is static, and the body that runs
//! it. It is built once at registration and shared as `Arc<HostMember>`;
//! the `Arc` pointer is the member's identity.
//!
//! # Building members
//!
//! Untyped bodies go through the builder:
//!
//! ```
//! use hostcall_core::{CallContext, HostMember, HostType};
//!
//! let split = HostMember::builder("split")
//!     .declared_in("Text")
//!     .with_return_values()
//!     .param(HostType::String)
//!     .native(|ctx: &mut CallContext| {
//!         let text: String = ctx.arg(0)?;
//!         for part in text.split(',') {
//!             ctx.push_return(part)?;
//!         }
//!         Ok(())
//!     });
//! assert_eq!(split.params().len(), 2);
//! ```
//!
//! Plain Rust functions and closures can be lifted directly:
//!
//! ```
//! use hostcall_core::{HostMember, HostType};
//!
//! let add = HostMember::from_fn("add", |a: i64, b: i64| a + b);
//! assert_eq!(add.params(), &[HostType::Int, HostType::Int]);
//! assert_eq!(add.return_type(), &HostType::Int);
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::convert::{FromDynamic, IntoDynamic};
use crate::error::NativeError;
use crate::host_type::{HostType, HostTyped};
use crate::runtime::{CallContext, NativeFn, short_type_name};

/// An exposed host function or method.
#[derive(Debug)]
pub struct HostMember {
    name: String,
    declaring_type: Option<String>,
    params: Vec<HostType>,
    return_type: HostType,
    is_static: bool,
    body: NativeFn,
}

impl HostMember {
    /// Start building a member. Members are static unless
    /// [`instance`](HostMemberBuilder::instance) is called.
    pub fn builder(name: impl Into<String>) -> HostMemberBuilder {
        HostMemberBuilder {
            name: name.into(),
            declaring_type: None,
            params: Vec::new(),
            return_type: HostType::Void,
            is_static: true,
        }
    }

    /// Lift a static function `Fn(A1, .., An) -> R` (n ≤ 6).
    pub fn from_fn<F, Marker>(name: impl Into<String>, f: F) -> Arc<HostMember>
    where
        F: HostFn<Marker>,
    {
        Arc::new(HostMember {
            name: name.into(),
            declaring_type: None,
            params: F::param_types(),
            return_type: F::return_type(),
            is_static: true,
            body: f.into_native(),
        })
    }

    /// Lift an instance method `Fn(&T, A1, .., An) -> R` (n ≤ 6).
    ///
    /// The declaring type is the name of `T` without its module path.
    pub fn from_method<T, F, Marker>(name: impl Into<String>, f: F) -> Arc<HostMember>
    where
        T: Any,
        F: HostMethodFn<T, Marker>,
    {
        Arc::new(HostMember {
            name: name.into(),
            declaring_type: Some(short_type_name(std::any::type_name::<T>()).to_owned()),
            params: F::param_types(),
            return_type: F::return_type(),
            is_static: false,
            body: f.into_native(),
        })
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declaring type, if any.
    pub fn declaring_type(&self) -> Option<&str> {
        self.declaring_type.as_deref()
    }

    /// Declared parameters, including a leading return values sink.
    pub fn params(&self) -> &[HostType] {
        &self.params
    }

    /// Declared return type.
    pub fn return_type(&self) -> &HostType {
        &self.return_type
    }

    /// Whether the member needs no receiver.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The body that runs the member.
    pub fn body(&self) -> &NativeFn {
        &self.body
    }
}

/// Builder for [`HostMember`].
#[derive(Debug, Clone)]
pub struct HostMemberBuilder {
    name: String,
    declaring_type: Option<String>,
    params: Vec<HostType>,
    return_type: HostType,
    is_static: bool,
}

impl HostMemberBuilder {
    /// Set the declaring type.
    pub fn declared_in(mut self, type_name: impl Into<String>) -> Self {
        self.declaring_type = Some(type_name.into());
        self
    }

    /// Mark the member as an instance method.
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    /// Append one parameter.
    pub fn param(mut self, ty: HostType) -> Self {
        self.params.push(ty);
        self
    }

    /// Append several parameters.
    pub fn params(mut self, tys: impl IntoIterator<Item = HostType>) -> Self {
        self.params.extend(tys);
        self
    }

    /// Set the declared return type. Defaults to void.
    pub fn returns(mut self, ty: HostType) -> Self {
        self.return_type = ty;
        self
    }

    /// Make the first parameter a return values sink.
    ///
    /// The body then pushes its own results with
    /// [`CallContext::push_return`].
    pub fn with_return_values(mut self) -> Self {
        self.params.insert(0, HostType::ReturnValues);
        self
    }

    /// Finish with a body.
    pub fn native<F>(self, f: F) -> Arc<HostMember>
    where
        F: Fn(&mut CallContext) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        Arc::new(HostMember {
            name: self.name,
            declaring_type: self.declaring_type,
            params: self.params,
            return_type: self.return_type,
            is_static: self.is_static,
            body: NativeFn::new(f),
        })
    }
}

/// A Rust function that can be lifted into a static [`HostMember`].
///
/// `Marker` only exists to keep the per-arity impls apart.
pub trait HostFn<Marker>: Send + Sync + 'static {
    /// Parameter tags, in order.
    fn param_types() -> Vec<HostType>;
    /// Return tag.
    fn return_type() -> HostType;
    /// Erase into a body that reads its arguments from the call context.
    fn into_native(self) -> NativeFn;
}

/// A Rust function taking `&T` first that can be lifted into an instance
/// [`HostMember`] of `T`.
pub trait HostMethodFn<T, Marker>: Send + Sync + 'static {
    /// Parameter tags, in order, excluding the receiver.
    fn param_types() -> Vec<HostType>;
    /// Return tag.
    fn return_type() -> HostType;
    /// Erase into a body that borrows the receiver from the call context.
    fn into_native(self) -> NativeFn;
}

macro_rules! impl_host_fn {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg,)*> HostFn<fn($($arg,)*) -> Ret> for Func
        where
            Func: Fn($($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoDynamic + HostTyped + 'static,
            $($arg: FromDynamic + HostTyped + 'static,)*
        {
            fn param_types() -> Vec<HostType> {
                vec![$($arg::host_type()),*]
            }

            fn return_type() -> HostType {
                Ret::host_type()
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_native(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext| {
                    let mut index = 0usize;
                    $(
                        let $arg: $arg = ctx.arg(index)?;
                        index += 1;
                    )*
                    let result = (self)($($arg),*);
                    ctx.set_return(result);
                    Ok(())
                })
            }
        }

        impl<T, Func, Ret, $($arg,)*> HostMethodFn<T, fn(&T, $($arg,)*) -> Ret> for Func
        where
            T: Any,
            Func: Fn(&T, $($arg),*) -> Ret + Send + Sync + 'static,
            Ret: IntoDynamic + HostTyped + 'static,
            $($arg: FromDynamic + HostTyped + 'static,)*
        {
            fn param_types() -> Vec<HostType> {
                vec![$($arg::host_type()),*]
            }

            fn return_type() -> HostType {
                Ret::host_type()
            }

            #[allow(non_snake_case, unused_mut, unused_variables, unused_assignments)]
            fn into_native(self) -> NativeFn {
                NativeFn::new(move |ctx: &mut CallContext| {
                    let result = {
                        let this = ctx.this::<T>()?;
                        let mut index = 0usize;
                        $(
                            let $arg: $arg = ctx.arg(index)?;
                            index += 1;
                        )*
                        (self)(this, $($arg),*)
                    };
                    ctx.set_return(result);
                    Ok(())
                })
            }
        }
    };
}

impl_host_fn!();
impl_host_fn!(A1);
impl_host_fn!(A1, A2);
impl_host_fn!(A1, A2, A3);
impl_host_fn!(A1, A2, A3, A4);
impl_host_fn!(A1, A2, A3, A4, A5);
impl_host_fn!(A1, A2, A3, A4, A5, A6);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Dynamic, ReturnValues};

    #[derive(Debug)]
    struct Calculator {
        bias: i64,
    }

    fn run(
        member: &HostMember,
        slots: &[Dynamic],
        arg_offset: usize,
    ) -> Result<Dynamic, NativeError> {
        let mut ret = Dynamic::Null;
        let mut ctx = CallContext::new(slots, arg_offset, &mut ret, None);
        member.body().call(&mut ctx)?;
        Ok(ret)
    }

    #[test]
    fn builder_defaults_to_static_void() {
        let member = HostMember::builder("tick").native(|_: &mut CallContext| Ok(()));
        assert_eq!(member.name(), "tick");
        assert!(member.is_static());
        assert!(member.params().is_empty());
        assert!(member.return_type().is_void());
        assert_eq!(member.declaring_type(), None);
    }

    #[test]
    fn builder_collects_shape() {
        let member = HostMember::builder("lerp")
            .declared_in("Vector3")
            .instance()
            .param(HostType::object("Vector3"))
            .params([HostType::Float])
            .returns(HostType::object("Vector3"))
            .native(|_: &mut CallContext| Ok(()));

        assert!(!member.is_static());
        assert_eq!(member.declaring_type(), Some("Vector3"));
        assert_eq!(
            member.params(),
            &[HostType::object("Vector3"), HostType::Float]
        );
        assert_eq!(member.return_type(), &HostType::object("Vector3"));
    }

    #[test]
    fn with_return_values_inserts_leading_sink() {
        let member = HostMember::builder("pair")
            .param(HostType::Int)
            .with_return_values()
            .native(|_: &mut CallContext| Ok(()));
        assert_eq!(member.params(), &[HostType::ReturnValues, HostType::Int]);
    }

    #[test]
    fn from_fn_shape_and_body() {
        let add = HostMember::from_fn("add", |a: i64, b: i64| a + b);
        assert!(add.is_static());
        assert_eq!(add.params(), &[HostType::Int, HostType::Int]);
        assert_eq!(add.return_type(), &HostType::Int);

        let ret = run(&add, &[Dynamic::Int(3), Dynamic::Int(4)], 0).unwrap();
        assert_eq!(ret, Dynamic::Int(7));
    }

    #[test]
    fn from_fn_zero_args_and_void() {
        let answer = HostMember::from_fn("answer", || 42i32);
        assert!(answer.params().is_empty());
        assert_eq!(run(&answer, &[], 0).unwrap(), Dynamic::Int(42));

        let noop = HostMember::from_fn("noop", |_: String| {});
        assert_eq!(noop.params(), &[HostType::String]);
        assert!(noop.return_type().is_void());
    }

    #[test]
    fn from_fn_conversion_failure() {
        let neg = HostMember::from_fn("neg", |a: i32| -a);
        let err = run(&neg, &[Dynamic::String("x".into())], 0).unwrap_err();
        assert!(matches!(err, NativeError::Conversion(_)));
    }

    #[test]
    fn from_fn_six_args() {
        let sum = HostMember::from_fn("sum", |a: i64, b: i64, c: i64, d: i64, e: i64, f: i64| {
            a + b + c + d + e + f
        });
        let slots: Vec<_> = (1..=6).map(Dynamic::Int).collect();
        assert_eq!(run(&sum, &slots, 0).unwrap(), Dynamic::Int(21));
    }

    #[test]
    fn from_method_borrows_receiver() {
        let add = HostMember::from_method::<Calculator, _, _>(
            "add",
            |calc: &Calculator, a: i64, b: i64| calc.bias + a + b,
        );
        assert!(!add.is_static());
        assert_eq!(add.declaring_type(), Some("Calculator"));
        assert_eq!(add.params(), &[HostType::Int, HostType::Int]);

        let slots = [
            Dynamic::object(Calculator { bias: 10 }),
            Dynamic::Int(3),
            Dynamic::Int(4),
        ];
        assert_eq!(run(&add, &slots, 1).unwrap(), Dynamic::Int(17));
    }

    #[test]
    fn from_method_wrong_receiver() {
        let bias =
            HostMember::from_method::<Calculator, _, _>("bias", |calc: &Calculator| calc.bias);
        let err = run(&bias, &[Dynamic::Int(1)], 1).unwrap_err();
        assert!(matches!(err, NativeError::InvalidThis { .. }));
    }

    #[test]
    fn native_body_pushes_results() {
        let split = HostMember::builder("split")
            .with_return_values()
            .param(HostType::String)
            .native(|ctx: &mut CallContext| {
                let text: String = ctx.arg(0)?;
                for part in text.split(',') {
                    ctx.push_return(part)?;
                }
                Ok(())
            });

        let slots = [Dynamic::String("a,b,c".into())];
        let mut ret = Dynamic::Null;
        let mut sink = ReturnValues::new();
        let mut ctx = CallContext::new(&slots, 0, &mut ret, Some(&mut sink));
        split.body().call(&mut ctx).unwrap();
        assert_eq!(sink.len(), 3);
    }
}
