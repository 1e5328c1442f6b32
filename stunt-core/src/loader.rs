//! Type resolution with autoload hooks.
//!
//! The [`ClassLoader`] knows every stand-in type defined so far. When asked
//! for a name it does not know, it consults its registered
//! [`Autoloader`] hooks in registration order; the first hook producing a
//! type wins and the type is defined under that name.

use crate::standin::StandInClass;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A hook consulted for names the loader does not know.
pub trait Autoloader: Send + Sync {
    /// Stable identity of the hook. Registering a second hook with the
    /// same id is a no-op.
    fn id(&self) -> &str;

    /// Try to produce the type `name`.
    fn autoload(&self, name: &str) -> Option<Arc<StandInClass>>;
}

/// Defined stand-in types and the hooks able to define more.
#[derive(Default)]
pub struct ClassLoader {
    defined: RwLock<HashMap<String, Arc<StandInClass>>>,
    hooks: RwLock<Vec<Arc<dyn Autoloader>>>,
}

impl ClassLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Returns false if a hook with the same id is
    /// already registered.
    pub fn register(&self, hook: Arc<dyn Autoloader>) -> bool {
        let mut hooks = self.hooks.write();
        if hooks.iter().any(|existing| existing.id() == hook.id()) {
            tracing::trace!(hook = %hook.id(), "Autoloader already registered");
            return false;
        }
        tracing::debug!(hook = %hook.id(), "Registered autoloader");
        hooks.push(hook);
        true
    }

    /// Remove the hook with `id`. Returns true if it was registered.
    pub fn unregister(&self, id: &str) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|hook| hook.id() != id);
        let removed = hooks.len() != before;
        if removed {
            tracing::debug!(hook = %id, "Unregistered autoloader");
        }
        removed
    }

    /// Ids of the registered hooks, in consultation order.
    pub fn hooks(&self) -> Vec<String> {
        self.hooks.read().iter().map(|hook| hook.id().to_string()).collect()
    }

    /// Check if a hook with `id` is registered.
    pub fn is_registered(&self, id: &str) -> bool {
        self.hooks.read().iter().any(|hook| hook.id() == id)
    }

    /// Define a type under its own name.
    ///
    /// If a type with that name (case-insensitive) is already defined, the
    /// existing one is kept and returned.
    pub fn define(&self, class: Arc<StandInClass>) -> Arc<StandInClass> {
        let mut defined = self.defined.write();
        Arc::clone(defined.entry(class.name().to_lowercase()).or_insert(class))
    }

    /// An already defined type, without consulting hooks.
    pub fn defined(&self, name: &str) -> Option<Arc<StandInClass>> {
        self.defined.read().get(&name.to_lowercase()).cloned()
    }

    /// Check whether `name` exists, optionally letting hooks define it.
    pub fn class_exists(&self, name: &str, autoload: bool) -> bool {
        if autoload {
            self.load(name).is_some()
        } else {
            self.defined(name).is_some()
        }
    }

    /// Resolve `name`, consulting hooks if it is not defined yet.
    pub fn load(&self, name: &str) -> Option<Arc<StandInClass>> {
        if let Some(class) = self.defined(name) {
            return Some(class);
        }

        // Hooks may define types themselves, so run them unlocked.
        let hooks: Vec<Arc<dyn Autoloader>> = self.hooks.read().clone();
        for hook in hooks {
            if let Some(class) = hook.autoload(name) {
                tracing::trace!(name, hook = %hook.id(), "Autoloaded type");
                return Some(self.define(class));
            }
        }
        None
    }

    /// Forget one defined type. Returns true if it was defined.
    pub fn forget(&self, name: &str) -> bool {
        self.defined.write().remove(&name.to_lowercase()).is_some()
    }

    /// Forget every defined type. Hooks stay registered.
    pub fn forget_all(&self) {
        self.defined.write().clear();
    }

    /// Number of defined types.
    pub fn len(&self) -> usize {
        self.defined.read().len()
    }

    /// Check if no type is defined.
    pub fn is_empty(&self) -> bool {
        self.defined.read().is_empty()
    }
}

impl std::fmt::Debug for ClassLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut defined: Vec<String> = self.defined.read().keys().cloned().collect();
        defined.sort();
        f.debug_struct("ClassLoader")
            .field("defined", &defined)
            .field("hooks", &self.hooks())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SequenceClock;
    use crate::standin::StandInSpec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook {
        id: &'static str,
        calls: AtomicUsize,
    }

    impl CountingHook {
        fn new(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Autoloader for CountingHook {
        fn id(&self) -> &str {
            self.id
        }

        fn autoload(&self, name: &str) -> Option<Arc<StandInClass>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            name.ends_with("::Mock").then(|| {
                let spec = StandInSpec::free_standing(name, name.trim_end_matches("::Mock"));
                Arc::new(StandInClass::new(spec, Arc::new(SequenceClock::new()), true))
            })
        }
    }

    #[test]
    fn register_is_strictly_idempotent() {
        let loader = ClassLoader::new();
        let hook = CountingHook::new("stand-ins");

        assert!(loader.register(hook.clone()));
        assert!(!loader.register(hook.clone()));
        assert!(!loader.register(CountingHook::new("stand-ins")));
        assert_eq!(loader.hooks(), vec!["stand-ins".to_string()]);

        assert!(loader.unregister("stand-ins"));
        assert!(!loader.unregister("stand-ins"));
        assert!(loader.hooks().is_empty());
    }

    #[test]
    fn load_consults_hook_once_then_caches() {
        let loader = ClassLoader::new();
        let hook = CountingHook::new("stand-ins");
        loader.register(hook.clone());

        let first = loader.load("app::Thing::Mock").unwrap();
        let second = loader.load("APP::THING::MOCK").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.len(), 1);
    }

    #[test]
    fn class_exists_without_autoload_does_not_run_hooks() {
        let loader = ClassLoader::new();
        let hook = CountingHook::new("stand-ins");
        loader.register(hook.clone());

        assert!(!loader.class_exists("app::Thing::Mock", false));
        assert_eq!(hook.calls.load(Ordering::SeqCst), 0);
        assert!(loader.class_exists("app::Thing::Mock", true));
        assert!(!loader.class_exists("app::Thing", true));
    }

    #[test]
    fn define_keeps_first_definition() {
        let loader = ClassLoader::new();
        let make = || {
            Arc::new(StandInClass::new(
                StandInSpec::free_standing("a::Mock", "a"),
                Arc::new(SequenceClock::new()),
                true,
            ))
        };
        let first = loader.define(make());
        let second = loader.define(make());
        assert!(Arc::ptr_eq(&first, &second));

        assert!(loader.forget("a::Mock"));
        assert!(loader.is_empty());
    }
}
