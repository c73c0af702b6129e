//! Graph Engine - data and validation core for the Shotflow editor
//!
//! Shotflow models AI image/video pipelines as a directed graph of
//! processing nodes with typed ports. This crate is the synchronous,
//! pure core behind the editor:
//!
//! - Port, parameter, and graph data model ([`types`])
//! - Schema-to-UI derivation from capability schemas ([`schema`])
//! - Connection type-compatibility resolution ([`connection`])
//! - Bidirectional visual <-> canonical conversion ([`convert`])
//! - Structural validation gating export/execution ([`validation`])
//! - Palette snapshots merged from registry, builtin, and preset
//!   sources ([`palette`])
//!
//! All operations here are synchronous functions over immutable inputs;
//! the asynchronous collaborators (node registry, execution service)
//! live in the `shotflow-workflow-service` crate.

pub mod builder;
pub mod connection;
pub mod convert;
pub mod error;
pub mod palette;
pub mod schema;
pub mod types;
pub mod validation;

// Re-export key types
pub use builder::GraphBuilder;
pub use connection::{resolve_connection, Resolution};
pub use convert::{
    merge, normalize_kind, to_canonical, to_visual, BackendEdge, BackendNode, CanonicalGraph,
    WorkflowDocument,
};
pub use error::{GraphError, Result};
pub use palette::{merge_palette, Palette, PaletteEntry};
pub use schema::{derive_node_data, NodeSchema, PortPolicy, PropertySchema};
pub use types::{
    EdgeStyle, NodeConfig, NodeData, NodeStatus, Parameter, Port, Position, VisualEdge,
    VisualGraph, VisualNode, WidgetMeta, WidgetType,
};
pub use validation::{validate_document, validate_graph, ValidationError, ValidationReport};
