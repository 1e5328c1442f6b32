//! Shape of a synthesized stand-in type.

use super::{INSTANCE_FALLBACK, TYPE_FALLBACK};
use crate::catalog::{method_fn, MemberDescriptor, MemberKind, MethodFn, TypeCatalog, TypeDescriptor};
use crate::value::Value;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

/// Everything a stand-in type needs to behave like its target.
#[derive(Clone)]
pub struct StandInSpec {
    name: String,
    target_name: String,
    target: Option<Arc<TypeDescriptor>>,
    lineage: Vec<String>,
    instance_members: BTreeMap<String, MemberDescriptor>,
    type_members: BTreeMap<String, MemberDescriptor>,
    properties: Vec<(String, Value)>,
    instance_fallback: Option<MethodFn>,
    type_fallback: Option<MethodFn>,
}

impl StandInSpec {
    /// Build the spec for `name` standing in for `target_name`.
    ///
    /// If the catalog knows the target, its inherited contract (its own
    /// non-private members plus those of every ancestor the catalog knows,
    /// nearest declaration winning) is copied. Otherwise the result is
    /// free-standing.
    pub fn synthesize(name: &str, target_name: &str, catalog: &dyn TypeCatalog) -> Self {
        let Some(target) = catalog.resolve(target_name) else {
            return Self::free_standing(name, target_name);
        };

        let mut spec = Self::free_standing(name, target.name());
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(target.name().to_string(), Some(Arc::clone(&target)))]);
        seen.insert(target.name().to_lowercase());

        // Unknown ancestors stay in the queue so they keep their place in
        // the lineage and still count for is-a checks.
        while let Some((name, descriptor)) = queue.pop_front() {
            spec.lineage.push(name);
            let Some(descriptor) = descriptor else {
                continue;
            };
            spec.absorb(&descriptor);

            for ancestor in descriptor.ancestors() {
                if seen.insert(ancestor.to_lowercase()) {
                    queue.push_back((ancestor.clone(), catalog.resolve(ancestor)));
                }
            }
        }

        spec.target = Some(target);
        spec
    }

    /// Spec for a stand-in with no real ancestor.
    pub fn free_standing(name: &str, target_name: &str) -> Self {
        Self {
            name: name.to_string(),
            target_name: target_name.to_string(),
            target: None,
            lineage: Vec::new(),
            instance_members: BTreeMap::new(),
            type_members: BTreeMap::new(),
            properties: Vec::new(),
            instance_fallback: None,
            type_fallback: None,
        }
    }

    fn absorb(&mut self, descriptor: &TypeDescriptor) {
        for member in descriptor.members() {
            if !member.visibility().is_inherited() {
                continue;
            }
            match (member.kind(), member.name()) {
                (MemberKind::Instance, INSTANCE_FALLBACK) => {
                    self.instance_fallback
                        .get_or_insert_with(|| Arc::clone(member.body()));
                }
                (MemberKind::Type, TYPE_FALLBACK) => {
                    self.type_fallback
                        .get_or_insert_with(|| Arc::clone(member.body()));
                }
                (MemberKind::Instance, name) => {
                    self.instance_members
                        .entry(name.to_string())
                        .or_insert_with(|| member.clone());
                }
                (MemberKind::Type, name) => {
                    self.type_members
                        .entry(name.to_string())
                        .or_insert_with(|| member.clone());
                }
            }
        }
        for (name, default) in descriptor.properties() {
            if !self.properties.iter().any(|(existing, _)| existing == name) {
                self.properties.push((name.clone(), default.clone()));
            }
        }
    }

    /// Name of the stand-in type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the type being stood in for (as resolved, if it exists).
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// The resolved target, or `None` for a free-standing stand-in.
    pub fn target(&self) -> Option<&Arc<TypeDescriptor>> {
        self.target.as_ref()
    }

    /// Check if the stand-in has no real ancestor.
    pub fn is_free_standing(&self) -> bool {
        self.target.is_none()
    }

    /// The target followed by every ancestor, nearest first.
    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// Inherited instance member by name.
    pub fn instance_member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.instance_members.get(name)
    }

    /// Inherited type-level member by name.
    pub fn type_member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.type_members.get(name)
    }

    /// Names of inherited instance members, sorted.
    pub fn instance_member_names(&self) -> impl Iterator<Item = &str> {
        self.instance_members.keys().map(String::as_str)
    }

    /// Names of inherited type-level members, sorted.
    pub fn type_member_names(&self) -> impl Iterator<Item = &str> {
        self.type_members.keys().map(String::as_str)
    }

    /// Property defaults, nearest declaration first.
    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    /// Terminus for undeclared instance members: the target's own
    /// fallback if it declares one, otherwise a body returning null.
    pub fn instance_fallback(&self) -> MethodFn {
        self.instance_fallback.clone().unwrap_or_else(default_body)
    }

    /// Terminus for undeclared type-level members.
    pub fn type_fallback(&self) -> MethodFn {
        self.type_fallback.clone().unwrap_or_else(default_body)
    }
}

impl std::fmt::Debug for StandInSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandInSpec")
            .field("name", &self.name)
            .field("target_name", &self.target_name)
            .field("free_standing", &self.is_free_standing())
            .field("lineage", &self.lineage)
            .field(
                "instance_members",
                &self.instance_members.keys().collect::<Vec<_>>(),
            )
            .field("type_members", &self.type_members.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Body used where nothing real exists to call.
pub(crate) fn default_body() -> MethodFn {
    method_fn(|_, _| Value::null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with(
                TypeDescriptor::builder("app::core::Object")
                    .method("config", |_, _| Value::string("object"))
                    .method("invokeMethod", |_, _| Value::null())
                    .static_method("applyRules", |_, _| Value::bool(true))
                    .property("_config", Value::object())
                    .build(),
            )
            .with(
                TypeDescriptor::builder("app::console::Request")
                    .extends("app::core::Object")
                    .extends("Countable")
                    .method("config", |_, _| Value::string("request"))
                    .private_method("_secret", |_, _| Value::null())
                    .method("__call", |_, _| Value::string("magic"))
                    .property("params", Value::object())
                    .build(),
            )
    }

    #[test]
    fn inherits_contract_of_target_and_ancestors() {
        let catalog = catalog();
        let spec = StandInSpec::synthesize("app::console::request::Mock", "app::console::request", &catalog);

        assert!(!spec.is_free_standing());
        assert_eq!(spec.target_name(), "app::console::Request");
        assert_eq!(
            spec.lineage(),
            &[
                "app::console::Request".to_string(),
                "app::core::Object".to_string(),
                "Countable".to_string(),
            ]
        );
        assert_eq!(
            spec.instance_member_names().collect::<Vec<_>>(),
            vec!["config", "invokeMethod"]
        );
        assert!(spec.type_member("applyRules").is_some());
        assert_eq!(spec.properties().len(), 2);
    }

    #[test]
    fn nearest_declaration_wins() {
        let catalog = catalog();
        let spec = StandInSpec::synthesize("x::Mock", "app::console::Request", &catalog);
        let class = crate::standin::StandInClass::new(
            spec.clone(),
            Arc::new(crate::clock::SequenceClock::new()),
            true,
        );

        let config = spec.instance_member("config").unwrap();
        let result = (config.body())(crate::standin::Subject::Class(&class), &[]);
        assert_eq!(result, Value::string("request"));
    }

    #[test]
    fn unknown_ancestors_keep_their_place_in_lineage() {
        let catalog = InMemoryCatalog::new()
            .with(
                TypeDescriptor::builder("app::Leaf")
                    .extends("Stringable")
                    .extends("app::Middle")
                    .build(),
            )
            .with(
                TypeDescriptor::builder("app::Middle")
                    .extends("JsonSerializable")
                    .extends("app::Root")
                    .build(),
            )
            .with(TypeDescriptor::builder("app::Root").build());

        let spec = StandInSpec::synthesize("app::leaf::Mock", "app::Leaf", &catalog);
        assert_eq!(
            spec.lineage(),
            &["app::Leaf", "Stringable", "app::Middle", "JsonSerializable", "app::Root"]
                .map(String::from)
        );
    }

    #[test]
    fn private_members_are_not_inherited() {
        let catalog = catalog();
        let spec = StandInSpec::synthesize("x::Mock", "app::console::Request", &catalog);
        assert!(spec.instance_member("_secret").is_none());
    }

    #[test]
    fn declared_fallback_becomes_terminus() {
        let catalog = catalog();
        let spec = StandInSpec::synthesize("x::Mock", "app::console::Request", &catalog);
        let class = crate::standin::StandInClass::new(
            spec.clone(),
            Arc::new(crate::clock::SequenceClock::new()),
            true,
        );
        let subject = crate::standin::Subject::Class(&class);

        assert!(spec.instance_member("__call").is_none());
        assert_eq!((spec.instance_fallback())(subject, &[]), Value::string("magic"));
        assert_eq!((spec.type_fallback())(subject, &[]), Value::null());
    }

    #[test]
    fn unknown_target_is_free_standing() {
        let spec = StandInSpec::synthesize("nowhere::Thing::Mock", "nowhere::Thing", &catalog());
        assert!(spec.is_free_standing());
        assert!(spec.lineage().is_empty());
        assert_eq!(spec.target_name(), "nowhere::Thing");
    }
}
