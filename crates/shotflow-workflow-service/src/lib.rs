//! Shotflow Workflow Service - async collaborators for the editor
//!
//! Everything asynchronous the editor touches lives here, behind two
//! trait seams:
//!
//! - [`registry::SchemaRegistry`] supplies capability schemas per node
//!   kind, cached once per session by [`registry::CachedSchemaRegistry`]
//! - [`execution::ExecutionService`] submits canonical workflow
//!   documents and reports status, driven by [`poll::poll_execution`]
//!
//! Document import/export ([`document`]) accepts legacy wrapper shapes
//! on the way in and always writes the canonical form on the way out.
//! The synchronous graph core lives in the `graph-engine` crate.

pub mod document;
pub mod error;
pub mod execution;
pub mod poll;
pub mod registry;

pub use document::{export_workflow_document, parse_workflow_document};
pub use error::{Result, ServiceError};
pub use execution::{
    ExecutionPhase, ExecutionService, ExecutionStatus, HttpExecutionService,
    ScriptedExecutionService,
};
pub use poll::{poll_execution, PollOutcome, DEFAULT_POLL_INTERVAL};
pub use registry::{
    CachedSchemaRegistry, HttpSchemaRegistry, SchemaRegistry, StaticSchemaRegistry,
};
