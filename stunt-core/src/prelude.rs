//! Prelude for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! # Example
//!
//! ```
//! use stunt_core::prelude::*;
//! ```

// Core types
pub use crate::value::{Slot, Value};

// Error handling
pub use crate::error::{Result, StuntError};

// Catalog
pub use crate::catalog::{
    method_fn, InMemoryCatalog, MemberDescriptor, MemberKind, MethodFn, TypeCatalog,
    TypeDescriptor, Visibility,
};

// Stand-ins
pub use crate::standin::{
    DynamicDispatch, Instance, StandInClass, StandInSpec, Subject, INSTANCE_FALLBACK,
    TYPE_FALLBACK,
};

// Filters
pub use crate::filter::{filter_fn, Chain, FilterFn, MethodSelector};

// Recording
pub use crate::clock::{ClockKind, ClockProvider, SequenceClock, SystemClock};
pub use crate::recording::{merge_results, CallRecord, CallRecorder, MethodHistory};

// Session
pub use crate::config::MockerConfig;
pub use crate::functions::{function_fn, FunctionFn, FunctionRegistry};
pub use crate::loader::{Autoloader, ClassLoader};
pub use crate::mocker::{Mocker, MockerBuilder};
