//! Static and dynamic record context
//!
//! This module provides:
//! - `Dynamic`: a getter evaluated on every emission
//! - `ContextArg`: one element of a flattened key/value list
//! - `Attributes`: the immutable attribute block a derived logger carries

use super::config::Flags;
use super::limiter::{CountLimiter, TimeLimiter};
use super::record::{Aux, Context};
use std::fmt;
use std::sync::Arc;

/// Value getter called once per emission for its key.
///
/// Getters run while the logger lock is held; calling back into the same
/// logger from a getter deadlocks.
pub trait Dynamic: Send + Sync {
    fn value(&self, key: &str) -> String;
}

impl<F> Dynamic for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn value(&self, key: &str) -> String {
        self(key)
    }
}

pub type DynamicRef = Arc<dyn Dynamic>;

/// Wrap a getter so it can be passed as a context value.
///
/// ```
/// use rust_slot_logger::{context_args, dynamic, Logger};
///
/// let logger = Logger::new().with_context(context_args![
///     "service", "billing",
///     "thread", dynamic(|_key: &str| format!("{:?}", std::thread::current().id())),
/// ]);
/// assert_eq!(logger.attributes().static_contexts().len(), 1);
/// assert_eq!(logger.attributes().dynamic_keys(), vec!["thread"]);
/// ```
pub fn dynamic<F>(getter: F) -> ContextArg
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    ContextArg::Dynamic(Arc::new(getter))
}

/// One element of the flattened list given to
/// [`Logger::with_context`](crate::Logger::with_context).
#[derive(Clone)]
pub enum ContextArg {
    /// Stringified once, when the derived logger is built
    Value(String),
    /// Evaluated on every emission
    Dynamic(DynamicRef),
}

impl ContextArg {
    pub fn value(v: impl fmt::Display) -> Self {
        ContextArg::Value(v.to_string())
    }
}

impl fmt::Debug for ContextArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextArg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ContextArg::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

macro_rules! context_arg_from_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ContextArg {
                fn from(v: $ty) -> Self {
                    ContextArg::Value(v.to_string())
                }
            }
        )*
    };
}

context_arg_from_display!(
    &str, String, &String, char, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128,
    usize, f32, f64,
);

impl From<DynamicRef> for ContextArg {
    fn from(getter: DynamicRef) -> Self {
        ContextArg::Dynamic(getter)
    }
}

/// A key whose value is recomputed on every emission.
#[derive(Clone)]
pub struct DynamicContext {
    pub key: String,
    pub getter: DynamicRef,
}

impl DynamicContext {
    pub fn evaluate(&self) -> Context {
        Context::new(self.key.clone(), self.getter.value(&self.key))
    }
}

impl fmt::Debug for DynamicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicContext")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Split a flattened key/value list into static and dynamic pairs.
///
/// A trailing key without a value is dropped, as is any pair whose key is a
/// dynamic getter.
pub fn parse_context_args(
    args: impl IntoIterator<Item = ContextArg>,
) -> (Vec<Context>, Vec<DynamicContext>) {
    let mut statics = Vec::new();
    let mut dynamics = Vec::new();
    let mut args = args.into_iter();

    while let (Some(key), Some(value)) = (args.next(), args.next()) {
        let ContextArg::Value(key) = key else {
            continue;
        };
        match value {
            ContextArg::Value(value) => statics.push(Context { key, value }),
            ContextArg::Dynamic(getter) => dynamics.push(DynamicContext { key, getter }),
        }
    }

    (statics, dynamics)
}

/// Attributes a logger stamps on its records.
///
/// Never mutated once shared: deriving a logger clones the block, changes
/// one field and wraps the result in a fresh `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub(crate) prefix: String,
    pub(crate) static_contexts: Vec<Context>,
    pub(crate) dynamic_contexts: Vec<DynamicContext>,
    pub(crate) marked: bool,
    pub(crate) count_limiter: Option<CountLimiter>,
    pub(crate) time_limiter: Option<TimeLimiter>,
}

impl Attributes {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn static_contexts(&self) -> &[Context] {
        &self.static_contexts
    }

    pub fn dynamic_keys(&self) -> Vec<&str> {
        self.dynamic_contexts.iter().map(|d| d.key.as_str()).collect()
    }

    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn count_limiter(&self) -> Option<&CountLimiter> {
        self.count_limiter.as_ref()
    }

    pub fn time_limiter(&self) -> Option<&TimeLimiter> {
        self.time_limiter.as_ref()
    }

    /// Build the aux block for one emission, skipping disabled parts.
    ///
    /// Dynamic getters are invoked here, once each.
    pub fn build_aux(&self, disabled: Flags) -> Aux {
        let mut aux = Aux::default();

        if !disabled.contains(Flags::PREFIX) {
            aux.prefix.clone_from(&self.prefix);
        }
        if !disabled.contains(Flags::STATIC_CONTEXT) {
            aux.contexts.extend(self.static_contexts.iter().cloned());
        }
        if !disabled.contains(Flags::DYNAMIC_CONTEXT) {
            aux.contexts
                .extend(self.dynamic_contexts.iter().map(DynamicContext::evaluate));
        }
        if !disabled.contains(Flags::MARK) {
            aux.marked = self.marked;
        }

        aux
    }
}

/// Build a `Vec<ContextArg>` from a flattened key/value list of mixed types.
///
/// ```
/// use rust_slot_logger::context_args;
///
/// let args = context_args!["user", "alice", "attempt", 3];
/// assert_eq!(args.len(), 4);
/// ```
#[macro_export]
macro_rules! context_args {
    () => {
        ::std::vec::Vec::<$crate::ContextArg>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::ContextArg::from($arg)),+]
    };
}
