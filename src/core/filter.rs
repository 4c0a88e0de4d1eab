//! Record filters and their boolean combinators

use super::record::Record;
use std::fmt;
use std::sync::Arc;

/// Predicate deciding whether a record is emitted.
///
/// Implemented for any `Fn(&Record) -> bool + Send + Sync`, so plain
/// closures can be used wherever a filter is expected. Filters run while the
/// logger lock is held and must not log through the same logger.
pub trait Filter: Send + Sync {
    fn accept(&self, record: &Record) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Record) -> bool + Send + Sync,
{
    fn accept(&self, record: &Record) -> bool {
        self(record)
    }
}

/// Shared handle to a filter, as stored in configs and slots
pub type FilterRef = Arc<dyn Filter>;

/// Wrap a closure as a shared filter
pub fn filter_fn<F>(f: F) -> FilterRef
where
    F: Fn(&Record) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// True when every filter accepts. Stops at the first rejection.
pub fn and(filters: impl IntoIterator<Item = FilterRef>) -> FilterRef {
    Arc::new(All(filters.into_iter().collect()))
}

/// True when any filter accepts. Stops at the first acceptance.
pub fn or(filters: impl IntoIterator<Item = FilterRef>) -> FilterRef {
    Arc::new(Any(filters.into_iter().collect()))
}

pub fn not(filter: FilterRef) -> FilterRef {
    Arc::new(Not(filter))
}

struct All(Vec<FilterRef>);

impl Filter for All {
    fn accept(&self, record: &Record) -> bool {
        self.0.iter().all(|f| f.accept(record))
    }
}

struct Any(Vec<FilterRef>);

impl Filter for Any {
    fn accept(&self, record: &Record) -> bool {
        self.0.iter().any(|f| f.accept(record))
    }
}

struct Not(FilterRef);

impl Filter for Not {
    fn accept(&self, record: &Record) -> bool {
        !self.0.accept(record)
    }
}

impl fmt::Debug for dyn Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}
