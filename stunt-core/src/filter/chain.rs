//! Continuation handed to filter handlers.

use super::FilterFn;
use crate::catalog::MethodFn;
use crate::standin::Subject;
use crate::value::Value;
use std::sync::Arc;

/// The rest of a filter chain.
///
/// A chain is an ordered list of handlers plus a cursor, ending at the
/// origin (the member's original body, or a fallback). Calling
/// [`Chain::next`] runs the handler under the cursor with a chain advanced
/// by one; once the handlers are exhausted it runs the origin. A handler
/// that never calls `next` short-circuits everything after it.
///
/// # Example
///
/// ```
/// use stunt_core::filter::Chain;
/// use stunt_core::{Mocker, Value};
///
/// let chain = Mocker::chain(|_this, args| Value::int(args.len() as i64));
/// assert_eq!(chain.remaining(), 0);
/// ```
#[derive(Clone)]
pub struct Chain {
    filters: Arc<[FilterFn]>,
    cursor: usize,
    origin: MethodFn,
}

impl Chain {
    /// Create a chain running `filters` in order, then `origin`.
    pub fn new(filters: Vec<FilterFn>, origin: MethodFn) -> Self {
        Self {
            filters: filters.into(),
            cursor: 0,
            origin,
        }
    }

    /// Create a chain with no handlers: `next` runs `origin` directly.
    pub fn from_origin<F>(origin: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self::new(Vec::new(), Arc::new(origin))
    }

    /// Run the next step of the chain.
    pub fn next(&self, subject: Subject<'_>, args: &[Value]) -> Value {
        match self.filters.get(self.cursor) {
            Some(filter) => {
                let rest = Self {
                    filters: Arc::clone(&self.filters),
                    cursor: self.cursor + 1,
                    origin: Arc::clone(&self.origin),
                };
                filter(subject, args, &rest)
            }
            None => (self.origin)(subject, args),
        }
    }

    /// Number of handlers still ahead of the origin.
    pub fn remaining(&self) -> usize {
        self.filters.len().saturating_sub(self.cursor)
    }

    /// Check if the next step is the origin.
    pub fn at_origin(&self) -> bool {
        self.remaining() == 0
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("filters", &self.filters.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
