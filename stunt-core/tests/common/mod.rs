//! Shared fixture world for integration tests.
//!
//! Models a small application: console request/response/dispatcher, a
//! parser and inspector with type-level members, a docblock, a schema, an
//! auth adapter writing headers and a plain object calling namespaced free
//! functions.

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;
use stunt_core::catalog::{InMemoryCatalog, TypeDescriptor};
use stunt_core::clock::SequenceClock;
use stunt_core::functions::FunctionRegistry;
use stunt_core::{Mocker, Subject, Value};

/// Namespace the plain object's free functions live in.
pub const TEST_NS: &str = "app::tests::mocks::test";

/// Name the `get_called_class` global reports.
pub const CALLED_CLASS: &str = "stunt_core::Mocker";

/// A registered mocker over the fixture world.
pub fn mocker() -> Arc<Mocker> {
    let functions = Arc::new(FunctionRegistry::default());
    define_globals(&functions);

    let mocker = Mocker::builder()
        .with_catalog(Arc::new(catalog(&functions)))
        .with_functions(functions)
        .with_clock(Arc::new(SequenceClock::new()))
        .build()
        .unwrap();
    mocker.register();
    mocker
}

/// Qualified name of a free function in the test namespace.
pub fn test_fn(short: &str) -> String {
    format!("{TEST_NS}::{short}")
}

fn define_globals(functions: &FunctionRegistry) {
    functions.define_global("get_class", |args| {
        args.first().cloned().unwrap_or_default()
    });
    functions.define_global("is_executable", |_| Value::bool(false));
    functions.define_global("get_called_class", |_| Value::string(CALLED_CLASS));
}

fn first_str(args: &[Value]) -> String {
    args.first().and_then(Value::as_string).unwrap_or_default()
}

fn own_target(this: Subject<'_>) -> Value {
    Value::string(this.class().spec().target_name())
}

/// The fixture catalog. Free functions are called through `functions`.
pub fn catalog(functions: &Arc<FunctionRegistry>) -> InMemoryCatalog {
    let get_class = Arc::clone(functions);
    let is_executable = Arc::clone(functions);

    InMemoryCatalog::new()
        .with(
            TypeDescriptor::builder("app::core::Object")
                .method("config", |_, _| {
                    Value::from(json!({"init": true, "classes": {"request": "app::console::Request"}}))
                })
                .method("invokeMethod", |this, args| {
                    let Some(instance) = this.instance() else {
                        return Value::null();
                    };
                    let method = first_str(args);
                    let rest = args.get(1).and_then(Value::as_array).unwrap_or_default();
                    instance.call(&method, &rest)
                })
                .property("_config", Value::object())
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::core::StaticObject")
                .static_method("invokeMethod", |this, args| {
                    let method = first_str(args);
                    this.class().call(&method, &args[1.min(args.len())..])
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::core::Adaptable")
                .extends("app::core::StaticObject")
                .static_method("_initAdapter", |_, args| {
                    Value::from(json!({"adapter": first_str(args)}))
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::console::Request")
                .extends("app::core::Object")
                .method("env", |this, args| {
                    let env = this
                        .instance()
                        .map(|instance| instance.get("env"))
                        .unwrap_or_default();
                    env.get(first_str(args).as_str()).unwrap_or_default()
                })
                .property("params", Value::object())
                .property("env", Value::from(json!({"working": "/tmp"})))
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::console::Response")
                .extends("app::core::Object")
                .method("styles", |_, _| {
                    Value::from(json!({
                        "heading": "\u{1b}[1;30;46m",
                        "option": "\u{1b}[0;32;49m",
                        "end": "\u{1b}[0m"
                    }))
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::console::Dispatcher")
                .extends("app::core::Object")
                .method("config", |_, _| {
                    Value::from(json!({"rules": {"command": [["app::util::Inflector", "camelize"]]}}))
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::analysis::Parser")
                .extends("app::core::StaticObject")
                .static_method("tokenize", |_, args| {
                    let code = first_str(args);
                    Value::array(code.split_whitespace().map(Value::string))
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::analysis::Inspector")
                .extends("app::core::StaticObject")
                .static_method("methods", |_, _| {
                    Value::array(["methods", "properties", "lines"].map(Value::string))
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::analysis::Debugger")
                .extends("app::core::StaticObject")
                .static_method("export", |_, args| {
                    Value::string(
                        args.first()
                            .map(|value| value.0.to_string())
                            .unwrap_or_default(),
                    )
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::analysis::Docblock")
                .extends("app::core::StaticObject")
                .static_method("comment", |_, args| {
                    Value::from(json!({"description": first_str(args), "tags": []}))
                })
                .static_method("tags", |_, args| Value::array(args.to_vec()))
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::data::Schema")
                .method("names", |this, _| {
                    let fields = this
                        .instance()
                        .map(|instance| instance.get("_fields"))
                        .unwrap_or_default();
                    Value::array(fields.as_array().unwrap_or_default())
                })
                .method("meta", |_, _| Value::object())
                .property("_fields", Value::array(vec![Value::string("id")]))
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::security::auth::adapter::Http")
                .extends("app::core::Object")
                .property("headers", Value::array(Vec::new()))
                .protected_method("_writeHeader", |this, args| {
                    if let Some(instance) = this.instance() {
                        let header = args.first().cloned().unwrap_or_default();
                        instance.property("headers").write().push(header);
                    }
                    Value::null()
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::tests::mocks::test::MockStdClass")
                .property("_data", Value::object())
                .accessor("data", "_data")
                .method("getClass", move |this, _| {
                    get_class
                        .call(&test_fn("get_class"), &[own_target(this)])
                        .unwrap_or_default()
                })
                .method("isExecutable", move |_, _| {
                    is_executable
                        .call(&test_fn("is_executable"), &[Value::string("/bin/sh")])
                        .unwrap_or_default()
                })
                .method("__call", |this, args| {
                    // Undeclared `methodBar` forwards to the equally undeclared `methodFoo`.
                    match (first_str(args).as_str(), this.instance()) {
                        ("methodBar", Some(instance)) => instance.call("methodFoo", &[]),
                        _ => Value::null(),
                    }
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::tests::mocks::test::MockNonAppStdClass")
                .method("method1", |_, _| Value::bool(true))
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::util::Collection")
                .extends("app::core::Object")
                .extends("IteratorAggregate")
                .extends("ArrayAccess")
                .method("count", |this, _| {
                    let data = this
                        .instance()
                        .map(|instance| instance.get("_data"))
                        .unwrap_or_default();
                    Value::int(data.len() as i64)
                })
                .property("_data", Value::array(Vec::new()))
                .initializer(|instance, args| {
                    if let Some(data) = args.first().and_then(|config| config.get("data")) {
                        instance.set("_data", data);
                    }
                })
                .build(),
        )
        .with(
            TypeDescriptor::builder("app::data::entity::Document")
                .extends("app::core::Object")
                .property("_model", Value::null())
                .method("model", |this, _| {
                    this.instance()
                        .map(|instance| instance.get("_model"))
                        .unwrap_or_default()
                })
                .initializer(|instance, args| {
                    if let Some(model) = args.first().and_then(|config| config.get("model")) {
                        instance.set("_model", model);
                    }
                })
                .build(),
        )
}
