//! Stunt Core Library
//!
//! Stand-in types for tests: synthesize a double of an existing type,
//! intercept its members with filter chains, record every call and merge
//! recordings into one chronological history.
//!
//! # Overview
//!
//! A [`Mocker`] owns one test session. Asking it for `some::Type::Mock`
//! synthesizes a stand-in that inherits the shape of `some::Type` (as
//! reported by a [`TypeCatalog`]). Calls on the stand-in pass through the
//! filters installed for that member, reach the original body unless a
//! filter short-circuits, and are recorded exactly once.
//!
//! # Key Components
//!
//! - **Catalog**: the oracle describing the types that can be stood in for
//! - **Stand-ins**: synthesized types and instances with per-scope filters
//! - **Filters**: chain-of-responsibility wrappers around members
//! - **Recording**: per-instance and per-type call histories and their merge
//! - **Functions**: namespaced free-function replacements
//! - **Loader**: type resolution with the synthesis autoload hook
//!
//! # Example
//!
//! ```
//! use stunt_core::{InMemoryCatalog, Mocker, TypeDescriptor, Value};
//! use std::sync::Arc;
//!
//! let catalog = InMemoryCatalog::new().with(
//!     TypeDescriptor::builder("app::analysis::Parser")
//!         .static_method("tokenize", |_, _| Value::array(vec![Value::string("echo")]))
//!         .build(),
//! );
//! let mocker = Mocker::new(Arc::new(catalog))?;
//! mocker.register();
//!
//! let parser = mocker.class("app::analysis::Parser::Mock")?;
//! parser.apply_filter("tokenize", |_, _, _| Value::array(Vec::new()));
//!
//! assert!(parser.call("tokenize", &[Value::string("echo foo;")]).is_empty());
//! assert_eq!(parser.static_results()["tokenize"].len(), 1);
//! # Ok::<(), stunt_core::StuntError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod functions;
pub mod loader;
pub mod mocker;
pub mod prelude;
pub mod recording;
pub mod standin;
pub mod value;

// Re-export key types at crate root for convenience
pub use catalog::{InMemoryCatalog, MemberDescriptor, TypeCatalog, TypeDescriptor};
pub use config::MockerConfig;
pub use error::{Result, StuntError};
pub use filter::Chain;
pub use functions::FunctionRegistry;
pub use loader::{Autoloader, ClassLoader};
pub use mocker::{Mocker, MockerBuilder};
pub use recording::{merge_results, CallRecord, CallRecorder, MethodHistory};
pub use standin::{DynamicDispatch, Instance, StandInClass, Subject};
pub use value::{Slot, Value};
