//! Stand-in types and their instances.
//!
//! A stand-in type is built once per requested name from a [`StandInSpec`].
//! Type-level calls go through [`StandInClass::call`] and are recorded in
//! the type-scoped history; instance calls go through [`Instance::call`]
//! and are recorded in that instance's history.
//!
//! Calls to members the target does not declare are routed to the
//! dynamic-dispatch fallback of the matching scope and filed under
//! [`INSTANCE_FALLBACK`] or [`TYPE_FALLBACK`].

mod class;
mod instance;
mod spec;

pub use class::StandInClass;
pub use instance::Instance;
pub use spec::StandInSpec;

use crate::catalog::MethodFn;
use crate::filter::{Chain, FilterTable};
use crate::recording::CallRecorder;
use crate::value::Value;

/// History key for calls to undeclared instance members.
pub const INSTANCE_FALLBACK: &str = "__call";

/// History key for calls to undeclared type-level members.
pub const TYPE_FALLBACK: &str = "__callStatic";

/// The receiver of a call: an instance, or the stand-in type itself.
#[derive(Clone, Copy)]
pub enum Subject<'a> {
    /// Instance-level call.
    Instance(&'a Instance),
    /// Type-level call.
    Class(&'a StandInClass),
}

impl<'a> Subject<'a> {
    /// The stand-in type the call belongs to.
    pub fn class(&self) -> &'a StandInClass {
        match self {
            Self::Instance(instance) => instance.class(),
            Self::Class(class) => class,
        }
    }

    /// The instance, for instance-level calls.
    pub fn instance(&self) -> Option<&'a Instance> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Class(_) => None,
        }
    }

    /// Check if this is a type-level call.
    pub fn is_class(&self) -> bool {
        matches!(self, Self::Class(_))
    }
}

impl std::fmt::Debug for Subject<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(instance) => f
                .debug_tuple("Instance")
                .field(&instance.id())
                .finish(),
            Self::Class(class) => f.debug_tuple("Class").field(&class.name()).finish(),
        }
    }
}

/// Capability to receive calls to members that are not declared.
pub trait DynamicDispatch {
    /// Invoke an undeclared member. Never fails: without a filter or an
    /// original fallback the result is `Value::Null`.
    fn invoke_unknown(&self, name: &str, args: &[Value]) -> Value;
}

/// Run one call through the filter chain and record it exactly once.
pub(crate) fn intercept(
    subject: Subject<'_>,
    filters: &FilterTable,
    recorder: &CallRecorder,
    key: &str,
    args: &[Value],
    origin: MethodFn,
) -> Value {
    let chain = Chain::new(filters.filters_for(key), origin);
    let result = chain.next(subject, args);
    recorder.record(key, args, result.clone());
    result
}

/// Pack an undeclared call the way fallbacks receive it: `[name, [args...]]`.
pub(crate) fn fallback_args(name: &str, args: &[Value]) -> [Value; 2] {
    [Value::string(name), Value::array(args.to_vec())]
}
