//! Per-member filter chains.
//!
//! Filters are installed per member name and run oldest first: the first
//! installed handler is the outermost, each `next` moves one handler
//! closer to the original body, and the newest handler sits directly in
//! front of it.
//!
//! ```text
//! call ──> filter 1 ──next──> filter 2 ──next──> ... ──next──> origin
//!             │ (no next)
//!             └──> result (short-circuit)
//! ```

mod chain;

pub use chain::Chain;

use crate::standin::Subject;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A filter handler: `(self, arguments, rest of the chain) -> result`.
pub type FilterFn = Arc<dyn Fn(Subject<'_>, &[Value], &Chain) -> Value + Send + Sync>;

/// Wrap a closure as a [`FilterFn`].
pub fn filter_fn<F>(handler: F) -> FilterFn
where
    F: Fn(Subject<'_>, &[Value], &Chain) -> Value + Send + Sync + 'static,
{
    Arc::new(handler)
}

/// One or more member names a filter is installed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSelector(Vec<String>);

impl MethodSelector {
    /// The selected member names, in the order given.
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for MethodSelector {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for MethodSelector {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<&str>> for MethodSelector {
    fn from(names: Vec<&str>) -> Self {
        Self(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for MethodSelector {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl From<&[&str]> for MethodSelector {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MethodSelector {
    fn from(names: [&str; N]) -> Self {
        Self(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Installed filters for one scope (an instance, or a stand-in type).
#[derive(Default)]
pub struct FilterTable {
    filters: RwLock<HashMap<String, Vec<FilterFn>>>,
}

impl FilterTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to every selected member's chain.
    ///
    /// Installing the same handler twice appends it twice.
    pub fn apply(&self, methods: MethodSelector, handler: FilterFn) {
        let mut filters = self.filters.write();
        for name in methods.0 {
            tracing::debug!(method = %name, "Installing filter");
            filters
                .entry(name)
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    /// Snapshot of the handlers installed on `method`, oldest first.
    ///
    /// Running a chain works on this snapshot, so handlers may install
    /// further filters without affecting the call in flight.
    pub fn filters_for(&self, method: &str) -> Vec<FilterFn> {
        self.filters
            .read()
            .get(method)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of handlers installed on `method`.
    pub fn count(&self, method: &str) -> usize {
        self.filters.read().get(method).map_or(0, Vec::len)
    }

    /// Remove the handlers of one member.
    pub fn remove(&self, method: &str) -> bool {
        self.filters.write().remove(method).is_some()
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.filters.write().clear();
    }
}

impl std::fmt::Debug for FilterTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters = self.filters.read();
        let mut counts: Vec<(&String, usize)> =
            filters.iter().map(|(name, list)| (name, list.len())).collect();
        counts.sort();
        f.debug_struct("FilterTable").field("filters", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::method_fn;
    use crate::clock::SequenceClock;
    use crate::standin::{StandInClass, StandInSpec};
    use parking_lot::Mutex;

    fn free_standing() -> StandInClass {
        StandInClass::new(
            StandInSpec::free_standing("tests::Probe::Mock", "tests::Probe"),
            Arc::new(SequenceClock::new()),
            true,
        )
    }

    fn tagging(tag: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> FilterFn {
        filter_fn(move |this, args, chain| {
            log.lock().push(tag);
            chain.next(this, args)
        })
    }

    #[test]
    fn selector_conversions() {
        assert_eq!(MethodSelector::from("a").names(), &["a".to_string()]);
        assert_eq!(
            MethodSelector::from(["comment", "tags"]).names(),
            &["comment".to_string(), "tags".to_string()]
        );
        assert_eq!(MethodSelector::from(vec!["x"]).names().len(), 1);
    }

    #[test]
    fn chain_without_filters_runs_origin() {
        let class = free_standing();
        let chain = Chain::from_origin(|_, args| Value::int(args.len() as i64));
        let result = chain.next(Subject::Class(&class), &[Value::null(), Value::null()]);
        assert_eq!(result, Value::int(2));
        assert!(chain.at_origin());
    }

    #[test]
    fn oldest_filter_runs_first_newest_next_to_origin() {
        let class = free_standing();
        let log = Arc::new(Mutex::new(Vec::new()));
        let origin_log = Arc::clone(&log);

        let chain = Chain::new(
            vec![tagging("first", log.clone()), tagging("second", log.clone())],
            method_fn(move |_, _| {
                origin_log.lock().push("origin");
                Value::string("original")
            }),
        );

        assert_eq!(chain.remaining(), 2);
        let result = chain.next(Subject::Class(&class), &[]);
        assert_eq!(result, Value::string("original"));
        assert_eq!(*log.lock(), vec!["first", "second", "origin"]);
    }

    #[test]
    fn filter_ignoring_next_short_circuits() {
        let class = free_standing();
        let log = Arc::new(Mutex::new(Vec::new()));
        let origin_log = Arc::clone(&log);
        let stop = filter_fn(|_, _, _| Value::bool(false));

        let chain = Chain::new(
            vec![tagging("outer", log.clone()), stop, tagging("inner", log.clone())],
            method_fn(move |_, _| {
                origin_log.lock().push("origin");
                Value::null()
            }),
        );

        assert_eq!(chain.next(Subject::Class(&class), &[]), Value::bool(false));
        assert_eq!(*log.lock(), vec!["outer"]);
    }

    #[test]
    fn table_appends_duplicates() {
        let table = FilterTable::new();
        let handler = filter_fn(|_, _, _| Value::null());
        table.apply("m".into(), Arc::clone(&handler));
        table.apply(["m", "n"].into(), handler);

        assert_eq!(table.count("m"), 2);
        assert_eq!(table.count("n"), 1);
        assert_eq!(table.filters_for("m").len(), 2);
        assert!(table.filters_for("other").is_empty());

        assert!(table.remove("m"));
        assert_eq!(table.count("m"), 0);
        table.clear();
        assert_eq!(table.count("n"), 0);
    }
}
