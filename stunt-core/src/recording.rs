//! Call recording and history merging.
//!
//! Every intercepted call leaves exactly one [`CallRecord`] in a
//! [`MethodHistory`], filed under the member name in call order. Histories
//! from different scopes (one instance, the stand-in type) share a clock,
//! so [`merge_results`] can weave them back into a single timeline.

use crate::clock::ClockProvider;
use crate::error::{Result, StuntError};
use crate::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Recorded calls keyed by member name, each list in call order.
pub type MethodHistory = BTreeMap<String, Vec<CallRecord>>;

/// One intercepted call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    args: Vec<Value>,
    result: Value,
    time: u64,
}

impl CallRecord {
    /// Create a record. Mostly useful for building expected histories.
    pub fn new(args: Vec<Value>, result: Value, time: u64) -> Self {
        Self { args, result, time }
    }

    /// Arguments as received at the entry point.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The result handed back to the caller.
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Timestamp ordinal of the call.
    pub fn time(&self) -> u64 {
        self.time
    }
}

/// Append-only recorder for one scope.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stunt_core::clock::SequenceClock;
/// use stunt_core::recording::CallRecorder;
/// use stunt_core::Value;
///
/// let recorder = CallRecorder::new(Arc::new(SequenceClock::new()));
/// recorder.record("names", &[Value::string("foo")], Value::bool(false));
///
/// let calls = recorder.history_of("names");
/// assert_eq!(calls.len(), 1);
/// assert_eq!(calls[0].time(), 1);
/// ```
pub struct CallRecorder {
    history: RwLock<Arc<MethodHistory>>,
    clock: Arc<dyn ClockProvider>,
    enabled: AtomicBool,
}

impl CallRecorder {
    /// Create a recorder stamping calls with `clock`.
    pub fn new(clock: Arc<dyn ClockProvider>) -> Self {
        Self {
            history: RwLock::new(Arc::new(MethodHistory::new())),
            clock,
            enabled: AtomicBool::new(true),
        }
    }

    /// Record a call.
    pub fn record(&self, method: &str, args: &[Value], result: Value) {
        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }
        let record = CallRecord::new(args.to_vec(), result, self.clock.tick());
        tracing::trace!(method, time = record.time, "Recorded call");
        // Copies the map only while a reader still holds the old snapshot.
        let mut history = self.history.write();
        Arc::make_mut(&mut history)
            .entry(method.to_string())
            .or_default()
            .push(record);
    }

    /// Calls recorded for one member, in call order (possibly empty).
    pub fn history_of(&self, method: &str) -> Vec<CallRecord> {
        self.history
            .read()
            .get(method)
            .cloned()
            .unwrap_or_default()
    }

    /// Shared handle to the history as of now.
    ///
    /// Holding it never blocks further calls: later records go to a new
    /// version of the history and the handle keeps its view.
    pub fn results(&self) -> Arc<MethodHistory> {
        Arc::clone(&self.history.read())
    }

    /// Owned copy of the history, e.g. as input to [`merge_results`].
    pub fn snapshot(&self) -> MethodHistory {
        MethodHistory::clone(&self.history.read())
    }

    /// Total number of recorded calls across all members.
    pub fn len(&self) -> usize {
        self.history.read().values().map(Vec::len).sum()
    }

    /// Check if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard all recorded calls.
    pub fn clear(&self) {
        *self.history.write() = Arc::new(MethodHistory::new());
    }

    /// Enable or disable recording.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Check if recording is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Convert the history to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&**self.history.read())
            .map_err(|e| StuntError::Serialization(e.to_string()))
    }

    /// Load a history from JSON into a fresh recorder.
    pub fn from_json(json: &str, clock: Arc<dyn ClockProvider>) -> Result<Self> {
        let history: MethodHistory =
            serde_json::from_str(json).map_err(|e| StuntError::Serialization(e.to_string()))?;
        Ok(Self {
            history: RwLock::new(Arc::new(history)),
            clock,
            enabled: AtomicBool::new(true),
        })
    }
}

impl std::fmt::Debug for CallRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallRecorder")
            .field("history", &**self.history.read())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Merge two histories into one chronological history.
///
/// Members present in one input are copied unchanged. Members present in
/// both are merged by ascending timestamp; on a tie the record from `a`
/// comes first. Each input list keeps its own internal order, so this is a
/// two-way merge and never a re-sort.
pub fn merge_results(a: &MethodHistory, b: &MethodHistory) -> MethodHistory {
    let mut merged = a.clone();
    for (method, theirs) in b {
        let combined = match a.get(method) {
            Some(ours) => merge_sequences(ours, theirs),
            None => theirs.clone(),
        };
        merged.insert(method.clone(), combined);
    }
    merged
}

fn merge_sequences(ours: &[CallRecord], theirs: &[CallRecord]) -> Vec<CallRecord> {
    let mut out = Vec::with_capacity(ours.len() + theirs.len());
    let (mut i, mut j) = (0, 0);
    while i < ours.len() && j < theirs.len() {
        if theirs[j].time < ours[i].time {
            out.push(theirs[j].clone());
            j += 1;
        } else {
            out.push(ours[i].clone());
            i += 1;
        }
    }
    out.extend_from_slice(&ours[i..]);
    out.extend_from_slice(&theirs[j..]);
    out
}
