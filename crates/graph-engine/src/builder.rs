//! Fluent builder for visual graphs
//!
//! Provides a type-safe, fluent API for constructing graphs
//! programmatically, bypassing the connection resolver. Used by tests
//! and by hosts that assemble graphs from trusted input.

use crate::types::{EdgeStyle, NodeData, Position, VisualEdge, VisualGraph, VisualNode};

/// Fluent builder for constructing visual graphs
///
/// # Example
///
/// ```
/// use graph_engine::builder::GraphBuilder;
///
/// let graph = GraphBuilder::new()
///     .add_node("input-1", "InputNode", (0.0, 0.0))
///     .add_node("output-1", "OutputNode", (200.0, 0.0))
///     .add_edge_typed("input-1", "image", "output-1", "image", "image")
///     .build();
///
/// assert_eq!(graph.nodes.len(), 2);
/// assert_eq!(graph.edges.len(), 1);
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<VisualNode>,
    edges: Vec<VisualEdge>,
    edge_counter: usize,
}

impl GraphBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the graph
    pub fn add_node(
        mut self,
        id: impl Into<String>,
        kind: impl Into<String>,
        position: (f64, f64),
    ) -> Self {
        let id = id.into();
        self.nodes.push(VisualNode {
            id: id.clone(),
            kind: kind.into(),
            position: Position::new(position.0, position.1),
            data: NodeData::labeled(id),
        });
        self
    }

    /// Set the data payload on the most recently added node
    ///
    /// Must be called immediately after `add_node`.
    pub fn with_data(mut self, data: NodeData) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.data = data;
        }
        self
    }

    /// Add an untyped edge between two ports (auto-generates the edge id)
    pub fn add_edge(
        self,
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        self.add_edge_typed(source, source_handle, target, target_handle, "default")
    }

    /// Add an edge carrying an explicit data type
    pub fn add_edge_typed(
        mut self,
        source: impl Into<String>,
        source_handle: impl Into<String>,
        target: impl Into<String>,
        target_handle: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        let data_type = data_type.into();
        self.edge_counter += 1;
        self.edges.push(VisualEdge {
            id: format!("edge-{}", self.edge_counter),
            source: source.into(),
            target: target.into(),
            source_handle: Some(source_handle.into()),
            target_handle: Some(target_handle.into()),
            style: EdgeStyle::for_data_type(&data_type),
            data_type,
        });
        self
    }

    /// Build the graph
    pub fn build(self) -> VisualGraph {
        VisualGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}
