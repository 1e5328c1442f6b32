//! Type introspection for stand-in synthesis.
//!
//! A [`TypeCatalog`] answers one question: given a type name, does the type
//! exist, and if so what does it look like. Synthesis consumes the answer
//! as an oracle and never inspects real code.

use crate::standin::{Instance, Subject};
use crate::value::Value;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Body of a member: receives the subject ("self") and the arguments.
pub type MethodFn = Arc<dyn Fn(Subject<'_>, &[Value]) -> Value + Send + Sync>;

/// Wrap a closure as a [`MethodFn`].
pub fn method_fn<F>(body: F) -> MethodFn
where
    F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
{
    Arc::new(body)
}

/// Constructor body: receives the freshly created instance and the
/// constructor arguments.
pub type InitFn = Arc<dyn Fn(&Instance, &[Value]) + Send + Sync>;

/// Whether a member is called on instances or on the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Called on an instance.
    Instance,
    /// Called on the type ("static").
    Type,
}

/// Member visibility. Only public and protected members are inherited by a
/// stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to everyone.
    Public,
    /// Visible to subtypes.
    Protected,
    /// Visible to the declaring type only.
    Private,
}

impl Visibility {
    /// Check if subtypes see the member.
    pub fn is_inherited(self) -> bool {
        !matches!(self, Self::Private)
    }
}

/// One declared member of a type.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: String,
    kind: MemberKind,
    visibility: Visibility,
    by_reference: bool,
    backing: Option<String>,
    body: MethodFn,
}

impl MemberDescriptor {
    /// Create a public member.
    pub fn new<F>(name: impl Into<String>, kind: MemberKind, body: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            by_reference: false,
            backing: None,
            body: Arc::new(body),
        }
    }

    /// Set the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the member as handing out shared state.
    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }

    /// Mark the member as handing out the slot of an instance property.
    pub fn aliasing(mut self, property: impl Into<String>) -> Self {
        self.by_reference = true;
        self.backing = Some(property.into());
        self
    }

    /// Member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member kind.
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Member visibility.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Check if the member hands out shared state.
    pub fn is_by_reference(&self) -> bool {
        self.by_reference
    }

    /// Property whose slot a by-reference member hands out, if any.
    pub fn backing_property(&self) -> Option<&str> {
        self.backing.as_deref()
    }

    /// The original body.
    pub fn body(&self) -> &MethodFn {
        &self.body
    }
}

impl std::fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("by_reference", &self.by_reference)
            .field("backing", &self.backing)
            .finish()
    }
}

/// Shape of an existing type, as reported by a [`TypeCatalog`].
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    ancestors: Vec<String>,
    members: Vec<MemberDescriptor>,
    properties: Vec<(String, Value)>,
    initializer: Option<InitFn>,
}

impl TypeDescriptor {
    /// Start describing a type.
    pub fn builder(name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            descriptor: TypeDescriptor {
                name: name.into(),
                ancestors: Vec::new(),
                members: Vec::new(),
                properties: Vec::new(),
                initializer: None,
            },
        }
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct parents and implemented interfaces.
    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// Declared members.
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Find a declared member by name and kind.
    pub fn member(&self, name: &str, kind: MemberKind) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| m.kind == kind && m.name == name)
    }

    /// Property defaults, in declaration order.
    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    /// Constructor body, if the type declares one.
    pub fn initializer(&self) -> Option<&InitFn> {
        self.initializer.as_ref()
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("ancestors", &self.ancestors)
            .field("members", &self.members)
            .field("properties", &self.properties)
            .field("has_initializer", &self.initializer.is_some())
            .finish()
    }
}

/// Fluent builder for [`TypeDescriptor`].
///
/// # Example
///
/// ```
/// use stunt_core::catalog::TypeDescriptor;
/// use stunt_core::Value;
///
/// let request = TypeDescriptor::builder("app::console::Request")
///     .extends("app::core::Object")
///     .property("params", Value::object())
///     .method("env", |_this, _args| Value::null())
///     .build();
///
/// assert_eq!(request.members().len(), 1);
/// ```
pub struct TypeDescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl TypeDescriptorBuilder {
    /// Add a parent type or implemented interface.
    pub fn extends(mut self, ancestor: impl Into<String>) -> Self {
        self.descriptor.ancestors.push(ancestor.into());
        self
    }

    /// Add an already built member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.descriptor.members.push(member);
        self
    }

    /// Add a public instance method.
    pub fn method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.member(MemberDescriptor::new(name, MemberKind::Instance, body))
    }

    /// Add a protected instance method.
    pub fn protected_method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.member(
            MemberDescriptor::new(name, MemberKind::Instance, body)
                .with_visibility(Visibility::Protected),
        )
    }

    /// Add a private instance method.
    pub fn private_method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.member(
            MemberDescriptor::new(name, MemberKind::Instance, body)
                .with_visibility(Visibility::Private),
        )
    }

    /// Add a public instance accessor handing out the slot of `property`.
    ///
    /// A plain call reads the property; [`Instance::call_ref`] returns the
    /// slot itself.
    pub fn accessor(self, name: impl Into<String>, property: impl Into<String>) -> Self {
        let property = property.into();
        let read = property.clone();
        let member = MemberDescriptor::new(name, MemberKind::Instance, move |this, _| {
            this.instance()
                .map(|instance| instance.get(&read))
                .unwrap_or_default()
        });
        self.member(member.aliasing(property))
    }

    /// Add a public type-level method.
    pub fn static_method<F>(self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Subject<'_>, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.member(MemberDescriptor::new(name, MemberKind::Type, body))
    }

    /// Declare a property with its default value.
    pub fn property(mut self, name: impl Into<String>, default: Value) -> Self {
        self.descriptor.properties.push((name.into(), default));
        self
    }

    /// Set the constructor body.
    pub fn initializer<F>(mut self, init: F) -> Self
    where
        F: Fn(&Instance, &[Value]) + Send + Sync + 'static,
    {
        self.descriptor.initializer = Some(Arc::new(init));
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

/// Oracle resolving type names to their shape.
pub trait TypeCatalog: Send + Sync {
    /// Look a type up. `None` means the type does not exist.
    fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Check if a type exists.
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

/// Catalog backed by an in-memory map.
///
/// Names are matched case-insensitively.
#[derive(Default)]
pub struct InMemoryCatalog {
    types: RwLock<HashMap<String, Arc<TypeDescriptor>>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a type.
    pub fn insert(&self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.types
            .write()
            .insert(descriptor.name.to_lowercase(), Arc::clone(&descriptor));
        descriptor
    }

    /// Add a type, builder style.
    pub fn with(self, descriptor: TypeDescriptor) -> Self {
        self.insert(descriptor);
        self
    }

    /// Remove a type.
    pub fn remove(&self, name: &str) -> bool {
        self.types.write().remove(&name.to_lowercase()).is_some()
    }

    /// Number of known types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Check if the catalog knows no types.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl TypeCatalog for InMemoryCatalog {
    fn resolve(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(&name.to_lowercase()).cloned()
    }
}
