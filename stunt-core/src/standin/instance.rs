//! Instances of a stand-in type.

use super::{fallback_args, intercept, spec::default_body, DynamicDispatch, StandInClass, Subject, INSTANCE_FALLBACK};
use crate::clock::ClockProvider;
use crate::filter::{filter_fn, Chain, FilterTable, MethodSelector};
use crate::recording::{CallRecorder, MethodHistory};
use crate::value::{Slot, Value};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

/// One instance of a stand-in type.
///
/// Filters and history installed here are visible to this instance only.
pub struct Instance {
    id: Uuid,
    class: Arc<StandInClass>,
    properties: RwLock<BTreeMap<String, Slot>>,
    filters: FilterTable,
    recorder: CallRecorder,
}

impl Instance {
    pub(crate) fn new(class: Arc<StandInClass>, clock: Arc<dyn ClockProvider>, record_calls: bool) -> Self {
        let properties = class
            .spec()
            .properties()
            .iter()
            .map(|(name, default)| (name.clone(), Slot::new(default.clone())))
            .collect();
        let recorder = CallRecorder::new(clock);
        recorder.set_enabled(record_calls);

        Self {
            id: Uuid::new_v4(),
            class,
            properties: RwLock::new(properties),
            filters: FilterTable::new(),
            recorder,
        }
    }

    /// Unique id of this instance.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The stand-in type this instance belongs to.
    pub fn class(&self) -> &StandInClass {
        &self.class
    }

    /// Check the is-a relation against a type name.
    pub fn is_a(&self, type_name: &str) -> bool {
        self.class.is_a(type_name)
    }

    /// Storage slot of a property, created empty on first access.
    ///
    /// The slot is shared: writes through it are seen by later reads of
    /// the property, and by any by-reference accessor returning it.
    pub fn property(&self, name: &str) -> Slot {
        if let Some(slot) = self.properties.read().get(name) {
            return slot.clone();
        }
        self.properties
            .write()
            .entry(name.to_string())
            .or_insert_with(|| Slot::new(Value::null()))
            .clone()
    }

    /// Current value of a property (null if unset).
    pub fn get(&self, name: &str) -> Value {
        self.properties
            .read()
            .get(name)
            .map(Slot::get)
            .unwrap_or_default()
    }

    /// Overwrite a property.
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.property(name).set(value);
    }

    /// Check if a property exists.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.read().contains_key(name)
    }

    /// Install an instance-level filter on one or more members.
    ///
    /// Filters on a by-reference member or on a type-level member are
    /// accepted but never run. Type-level calls through an instance use
    /// the stand-in type's filters.
    pub fn apply_filter<F>(&self, methods: impl Into<MethodSelector>, handler: F)
    where
        F: Fn(Subject<'_>, &[Value], &Chain) -> Value + Send + Sync + 'static,
    {
        self.filters.apply(methods.into(), filter_fn(handler));
    }

    /// Instance-scoped filters.
    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Call a member on this instance.
    ///
    /// Type-level members called through an instance are forwarded to the
    /// stand-in type and recorded in its history.
    pub fn call(&self, method: &str, args: &[Value]) -> Value {
        let spec = self.class.spec();
        if let Some(member) = spec.instance_member(method) {
            let subject = Subject::Instance(self);
            if member.is_by_reference() {
                if self.filters.count(method) > 0 {
                    tracing::debug!(
                        instance = %self.id,
                        method,
                        "Skipping filters on by-reference member"
                    );
                }
                let result = (member.body())(subject, args);
                self.recorder.record(method, args, result.clone());
                return result;
            }
            return intercept(
                subject,
                &self.filters,
                &self.recorder,
                method,
                args,
                Arc::clone(member.body()),
            );
        }
        if spec.type_member(method).is_some() {
            if self.filters.count(method) > 0 {
                tracing::debug!(
                    instance = %self.id,
                    method,
                    "Instance filters do not apply to type-level member"
                );
            }
            return self.class.call(method, args);
        }
        if spec.is_free_standing() {
            return intercept(
                Subject::Instance(self),
                &self.filters,
                &self.recorder,
                method,
                args,
                default_body(),
            );
        }
        self.invoke_unknown(method, args)
    }

    /// Call a by-reference member and get the slot it hands out.
    ///
    /// Writes through the slot are seen by later calls of the member. The
    /// call is recorded with the value read at call time. Returns `None`,
    /// without calling anything, when `method` is not an instance member
    /// backed by a property.
    pub fn call_ref(&self, method: &str, args: &[Value]) -> Option<Slot> {
        let member = self.class.spec().instance_member(method)?;
        let property = member.backing_property()?;
        if self.filters.count(method) > 0 {
            tracing::debug!(instance = %self.id, method, "Skipping filters on by-reference member");
        }
        let slot = self.property(property);
        self.recorder.record(method, args, slot.get());
        Some(slot)
    }

    /// Instance-scoped history (shared handle, no copy).
    pub fn results(&self) -> Arc<MethodHistory> {
        self.recorder.results()
    }

    /// Instance-scoped recorder.
    pub fn recorder(&self) -> &CallRecorder {
        &self.recorder
    }

    /// Type-scoped history of this instance's stand-in type.
    pub fn static_results(&self) -> Arc<MethodHistory> {
        self.class.static_results()
    }
}

impl DynamicDispatch for Instance {
    fn invoke_unknown(&self, name: &str, args: &[Value]) -> Value {
        let packed = fallback_args(name, args);
        intercept(
            Subject::Instance(self),
            &self.filters,
            &self.recorder,
            INSTANCE_FALLBACK,
            &packed,
            self.class.spec().instance_fallback(),
        )
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .field("properties", &*self.properties.read())
            .field("recorded_calls", &self.recorder.len())
            .finish()
    }
}
