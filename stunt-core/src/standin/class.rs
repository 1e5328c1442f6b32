//! The stand-in type itself: type-level calls, filters and history.

use super::{fallback_args, intercept, spec::default_body, DynamicDispatch, Instance, StandInSpec, Subject, TYPE_FALLBACK};
use crate::clock::ClockProvider;
use crate::filter::{Chain, FilterTable, MethodSelector};
use crate::recording::{CallRecorder, MethodHistory};
use crate::value::Value;
use std::sync::Arc;

/// A synthesized stand-in type.
///
/// Holds the type-scoped filters and the type-scoped history shared by
/// every instance.
pub struct StandInClass {
    spec: StandInSpec,
    filters: FilterTable,
    recorder: CallRecorder,
    clock: Arc<dyn ClockProvider>,
    record_calls: bool,
}

impl StandInClass {
    pub(crate) fn new(spec: StandInSpec, clock: Arc<dyn ClockProvider>, record_calls: bool) -> Self {
        let recorder = CallRecorder::new(Arc::clone(&clock));
        recorder.set_enabled(record_calls);
        Self {
            spec,
            filters: FilterTable::new(),
            recorder,
            clock,
            record_calls,
        }
    }

    /// Name of the stand-in type.
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// The synthesized shape.
    pub fn spec(&self) -> &StandInSpec {
        &self.spec
    }

    /// Check if the stand-in has no real ancestor.
    pub fn is_free_standing(&self) -> bool {
        self.spec.is_free_standing()
    }

    /// Check the is-a relation against a type name (case-insensitive).
    ///
    /// Holds for the stand-in itself, its target and every ancestor.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.name().eq_ignore_ascii_case(type_name)
            || self
                .spec
                .lineage()
                .iter()
                .any(|ancestor| ancestor.eq_ignore_ascii_case(type_name))
    }

    /// Install a type-level filter on one or more members.
    pub fn apply_filter<F>(&self, methods: impl Into<MethodSelector>, handler: F)
    where
        F: Fn(Subject<'_>, &[Value], &Chain) -> Value + Send + Sync + 'static,
    {
        self.filters.apply(methods.into(), Arc::new(handler));
    }

    /// Type-scoped filters.
    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Call a type-level member.
    pub fn call(&self, method: &str, args: &[Value]) -> Value {
        let subject = Subject::Class(self);
        match self.spec.type_member(method) {
            Some(member) if member.is_by_reference() => {
                if self.filters.count(method) > 0 {
                    tracing::debug!(class = %self.name(), method, "Skipping filters on by-reference member");
                }
                let result = (member.body())(subject, args);
                self.recorder.record(method, args, result.clone());
                result
            }
            Some(member) => intercept(
                subject,
                &self.filters,
                &self.recorder,
                method,
                args,
                Arc::clone(member.body()),
            ),
            None if self.is_free_standing() => intercept(
                subject,
                &self.filters,
                &self.recorder,
                method,
                args,
                default_body(),
            ),
            None => self.invoke_unknown(method, args),
        }
    }

    /// Type-scoped history (shared handle, no copy).
    pub fn static_results(&self) -> Arc<MethodHistory> {
        self.recorder.results()
    }

    /// Type-scoped recorder.
    pub fn static_recorder(&self) -> &CallRecorder {
        &self.recorder
    }

    /// Create an instance, forwarding `args` to the target's initializer.
    pub fn instantiate(self: &Arc<Self>, args: &[Value]) -> Instance {
        let instance = Instance::new(Arc::clone(self), Arc::clone(&self.clock), self.record_calls);
        if let Some(init) = self.spec.target().and_then(|t| t.initializer()) {
            init(&instance, args);
        }
        tracing::trace!(class = %self.name(), instance = %instance.id(), "Instantiated stand-in");
        instance
    }
}

impl DynamicDispatch for StandInClass {
    fn invoke_unknown(&self, name: &str, args: &[Value]) -> Value {
        let packed = fallback_args(name, args);
        intercept(
            Subject::Class(self),
            &self.filters,
            &self.recorder,
            TYPE_FALLBACK,
            &packed,
            self.spec.type_fallback(),
        )
    }
}

impl std::fmt::Debug for StandInClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandInClass")
            .field("spec", &self.spec)
            .field("filters", &self.filters)
            .field("recorded_calls", &self.recorder.len())
            .finish()
    }
}
