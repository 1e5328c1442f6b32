//! The mocker: one session of stand-in types, function replacements and
//! shared recording clock.

use crate::catalog::{InMemoryCatalog, TypeCatalog};
use crate::clock::ClockProvider;
use crate::config::MockerConfig;
use crate::error::{Result, StuntError};
use crate::filter::{Chain, MethodSelector};
use crate::functions::FunctionRegistry;
use crate::loader::{Autoloader, ClassLoader};
use crate::recording::{self, MethodHistory};
use crate::standin::{Instance, StandInClass, StandInSpec, Subject};
use crate::value::Value;
use std::sync::{Arc, Weak};

/// Id of the hook [`Mocker::register`] installs into its loader.
pub const SYNTHESIS_HOOK_ID: &str = "stunt::synthesis";

/// Registry object owning everything one test session needs.
///
/// # Example
///
/// ```
/// use stunt_core::catalog::{InMemoryCatalog, TypeDescriptor};
/// use stunt_core::{Mocker, Value};
/// use std::sync::Arc;
///
/// let catalog = InMemoryCatalog::new().with(
///     TypeDescriptor::builder("app::Greeter")
///         .method("greet", |_, _| Value::string("hello"))
///         .build(),
/// );
/// let mocker = Mocker::builder().with_catalog(Arc::new(catalog)).build().unwrap();
/// mocker.register();
///
/// let greeter = mocker.instantiate("app::Greeter::Mock", &[]).unwrap();
/// greeter.apply_filter("greet", |_, _, _| Value::string("bye"));
///
/// assert_eq!(greeter.call("greet", &[]), Value::string("bye"));
/// assert_eq!(greeter.results()["greet"].len(), 1);
/// ```
pub struct Mocker {
    config: MockerConfig,
    catalog: Arc<dyn TypeCatalog>,
    loader: Arc<ClassLoader>,
    functions: Arc<FunctionRegistry>,
    clock: Arc<dyn ClockProvider>,
}

impl Mocker {
    /// Start building a mocker.
    pub fn builder() -> MockerBuilder {
        MockerBuilder::new()
    }

    /// Mocker with default config over `catalog`.
    pub fn new(catalog: Arc<dyn TypeCatalog>) -> Result<Arc<Self>> {
        Self::builder().with_catalog(catalog).build()
    }

    /// Install the synthesis hook into the loader.
    ///
    /// Idempotent: the hook is present exactly once however often this runs.
    /// Returns true if this call installed it.
    pub fn register(self: &Arc<Self>) -> bool {
        self.loader.register(Arc::new(SynthesisHook {
            mocker: Arc::downgrade(self),
        }))
    }

    /// Remove the synthesis hook. Returns true if it was installed.
    pub fn unregister(&self) -> bool {
        self.loader.unregister(SYNTHESIS_HOOK_ID)
    }

    /// Check if the synthesis hook is installed.
    pub fn is_registered(&self) -> bool {
        self.loader.is_registered(SYNTHESIS_HOOK_ID)
    }

    /// Synthesize the stand-in type `requested`.
    ///
    /// Returns `None` if the name does not follow the naming contract.
    /// Requesting a name twice returns the same type.
    pub fn create(&self, requested: &str) -> Option<Arc<StandInClass>> {
        let Some(target) = self.config.target_name(requested) else {
            tracing::trace!(name = %requested, "Not a stand-in name");
            return None;
        };
        if let Some(existing) = self.loader.defined(requested) {
            return Some(existing);
        }

        let spec = StandInSpec::synthesize(requested, target, self.catalog.as_ref());
        tracing::debug!(
            name = %requested,
            target = %spec.target_name(),
            free_standing = spec.is_free_standing(),
            "Synthesized stand-in"
        );
        let class = StandInClass::new(spec, Arc::clone(&self.clock), self.config.record_calls);
        Some(self.loader.define(Arc::new(class)))
    }

    /// Resolve a stand-in type through the loader, synthesizing it if needed.
    pub fn class(&self, name: &str) -> Result<Arc<StandInClass>> {
        self.loader
            .load(name)
            .or_else(|| self.create(name))
            .ok_or_else(|| StuntError::ClassNotFound {
                name: name.to_string(),
            })
    }

    /// Check if `name` resolves to a stand-in type, autoloading if registered.
    pub fn class_exists(&self, name: &str) -> bool {
        self.loader.class_exists(name, true)
    }

    /// Create an instance of the stand-in type `name`.
    pub fn instantiate(&self, name: &str, args: &[Value]) -> Result<Instance> {
        Ok(self.class(name)?.instantiate(args))
    }

    /// Install a type-level filter on the stand-in type `name`.
    pub fn apply_filter<F>(
        &self,
        name: &str,
        methods: impl Into<MethodSelector>,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(Subject<'_>, &[Value], &Chain) -> Value + Send + Sync + 'static,
    {
        self.class(name)?.apply_filter(methods, handler);
        Ok(())
    }

    /// A chain with no filters whose terminus is `origin`.
    pub fn chain<F>(origin: F) -> Chain
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        Chain::from_origin(origin)
    }

    /// Merge two histories in timestamp order, `a` first on ties.
    pub fn merge_results(a: &MethodHistory, b: &MethodHistory) -> MethodHistory {
        recording::merge_results(a, b)
    }

    /// Replace the free function `name`.
    pub fn overwrite_function<F>(&self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.functions.overwrite(name, f);
    }

    /// Remove the replacement of `name`.
    pub fn restore_function(&self, name: &str) -> bool {
        self.functions.restore(name)
    }

    /// Remove every function replacement.
    pub fn restore_functions(&self) {
        self.functions.restore_all();
    }

    /// Call the free function `name`.
    pub fn call_function(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.functions.call(name, args)
    }

    /// Drop every function replacement and every synthesized type.
    ///
    /// The synthesis hook stays registered; the next request for a stand-in
    /// synthesizes a fresh type with empty filters and history.
    pub fn reset(&self) {
        tracing::debug!(classes = self.loader.len(), "Resetting mocker");
        self.functions.restore_all();
        self.loader.forget_all();
    }

    /// The function registry.
    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// The class loader.
    pub fn loader(&self) -> &Arc<ClassLoader> {
        &self.loader
    }

    /// The type catalog.
    pub fn catalog(&self) -> &Arc<dyn TypeCatalog> {
        &self.catalog
    }

    /// The configuration.
    pub fn config(&self) -> &MockerConfig {
        &self.config
    }

    /// The clock shared by every recorder of this mocker.
    pub fn clock(&self) -> &Arc<dyn ClockProvider> {
        &self.clock
    }
}

impl std::fmt::Debug for Mocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mocker")
            .field("config", &self.config)
            .field("loader", &self.loader)
            .field("functions", &self.functions)
            .finish()
    }
}

struct SynthesisHook {
    mocker: Weak<Mocker>,
}

impl Autoloader for SynthesisHook {
    fn id(&self) -> &str {
        SYNTHESIS_HOOK_ID
    }

    fn autoload(&self, name: &str) -> Option<Arc<StandInClass>> {
        self.mocker.upgrade()?.create(name)
    }
}

/// Builder for [`Mocker`].
pub struct MockerBuilder {
    config: MockerConfig,
    catalog: Option<Arc<dyn TypeCatalog>>,
    loader: Option<Arc<ClassLoader>>,
    functions: Option<Arc<FunctionRegistry>>,
    clock: Option<Arc<dyn ClockProvider>>,
}

impl MockerBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: MockerConfig::default(),
            catalog: None,
            loader: None,
            functions: None,
            clock: None,
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: MockerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the type catalog consulted during synthesis.
    pub fn with_catalog(mut self, catalog: Arc<dyn TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Share an existing class loader.
    pub fn with_loader(mut self, loader: Arc<ClassLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Share an existing function registry.
    pub fn with_functions(mut self, functions: Arc<FunctionRegistry>) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Use a specific clock instead of the configured kind.
    pub fn with_clock(mut self, clock: Arc<dyn ClockProvider>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate the config and build the mocker.
    pub fn build(self) -> Result<Arc<Mocker>> {
        self.config.validate()?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(InMemoryCatalog::new()));
        let loader = self.loader.unwrap_or_default();
        let functions = self
            .functions
            .unwrap_or_else(|| Arc::new(FunctionRegistry::new(self.config.separator.clone())));
        let clock = self.clock.unwrap_or_else(|| self.config.clock.build());

        Ok(Arc::new(Mocker {
            config: self.config,
            catalog,
            loader,
            functions,
            clock,
        }))
    }
}

impl Default for MockerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
