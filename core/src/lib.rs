// src/lib.rs

//! Storefront Flow: asynchronous step pipelines for request orchestration.
//!
//! A pipeline is an ordered list of named steps. Each step owns zero or more
//! async handlers that operate on a shared, lockable context. Handlers decide
//! whether the run continues or stops early, and may fail with the pipeline's
//! error type.
//!
//!  - Steps can be optional (skipped when no handler is registered).
//!  - Steps can carry a skip condition evaluated against the context.
//!  - A type-keyed registry ([`Flows`]) dispatches a context to the pipeline
//!    registered for its type.

pub mod context_data;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use crate::context_data::ContextData;
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{Handler, Pipeline};
pub use crate::registry::Flows;
pub use crate::step::{SkipCondition, StepDef};
