//! Replacements for free functions.
//!
//! Code under test calls free functions through [`FunctionRegistry::call`]
//! with their fully qualified name. A replacement installed for that exact
//! name wins; otherwise the call falls back to the global function sharing
//! the short name (the last path segment).

use crate::error::{Result, StuntError};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A free function: `(arguments) -> result`.
pub type FunctionFn = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Wrap a closure as a [`FunctionFn`].
pub fn function_fn<F>(f: F) -> FunctionFn
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Table of free-function replacements plus the global functions they
/// fall back to.
pub struct FunctionRegistry {
    separator: String,
    overrides: RwLock<HashMap<String, FunctionFn>>,
    globals: RwLock<HashMap<String, FunctionFn>>,
}

impl FunctionRegistry {
    /// Create an empty registry splitting names on `separator`.
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            overrides: RwLock::new(HashMap::new()),
            globals: RwLock::new(HashMap::new()),
        }
    }

    /// Define a globally visible function under its short name.
    pub fn define_global<F>(&self, short_name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.globals.write().insert(short_name.into(), function_fn(f));
    }

    /// Install a replacement for `name`, replacing any previous one.
    pub fn overwrite<F>(&self, name: impl Into<String>, f: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(function = %name, "Overwriting function");
        self.overrides.write().insert(name, function_fn(f));
    }

    /// Remove the replacement for `name`. Returns true if one was installed.
    pub fn restore(&self, name: &str) -> bool {
        let removed = self.overrides.write().remove(name).is_some();
        if removed {
            tracing::debug!(function = %name, "Restored function");
        }
        removed
    }

    /// Remove every replacement.
    pub fn restore_all(&self) {
        let mut overrides = self.overrides.write();
        if !overrides.is_empty() {
            tracing::debug!(count = overrides.len(), "Restored all functions");
        }
        overrides.clear();
    }

    /// Check if `name` has an active replacement.
    pub fn is_overwritten(&self, name: &str) -> bool {
        self.overrides.read().contains_key(name)
    }

    /// Names with an active replacement, sorted.
    pub fn overwritten(&self) -> Vec<String> {
        let mut names: Vec<String> = self.overrides.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Last path segment of `name`.
    pub fn short_name<'a>(&self, name: &'a str) -> &'a str {
        name.rsplit_once(self.separator.as_str())
            .map_or(name, |(_, short)| short)
    }

    /// Call `name`: its replacement if installed, else the global function
    /// of the same short name.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        // Clone the handle out so no lock is held while it runs.
        let replacement = self.overrides.read().get(name).cloned();
        if let Some(f) = replacement {
            return Ok(f(args));
        }

        let short_name = self.short_name(name);
        let global = self.globals.read().get(short_name).cloned();
        match global {
            Some(f) => Ok(f(args)),
            None => Err(StuntError::FunctionNotFound {
                name: name.to_string(),
                short_name: short_name.to_string(),
            }),
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new("::")
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut globals: Vec<String> = self.globals.read().keys().cloned().collect();
        globals.sort();
        f.debug_struct("FunctionRegistry")
            .field("separator", &self.separator)
            .field("overwritten", &self.overwritten())
            .field("globals", &globals)
            .finish()
    }
}
