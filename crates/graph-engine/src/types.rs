//! Core types for visual workflow graphs
//!
//! These types define the editor-side representation of a workflow:
//! nodes with typed ports and editable parameters, and typed edges
//! between them. The canonical (execution-service) representation
//! lives in [`crate::convert`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// 2-D position of a node on the canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Execution status of a node, updated while a run is outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Idle,
    Running,
    Completed,
    Error,
}

/// A typed connection point on a node
///
/// The data type is an open string tag (`image`, `latent`, `model`,
/// `prompt`, `mask`, `number`, `string`, `boolean`, ...); `"default"`
/// marks an unknown type. Ports are immutable once a node has been
/// instantiated from its capability schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Unique name within its node and direction
    pub name: String,
    /// Human-readable label
    pub label: String,
    /// Data type tag
    pub data_type: String,
}

impl Port {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            data_type: data_type.into(),
        }
    }
}

/// Widget control kind chosen to edit a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    Combo,
    Slider,
    Toggle,
    Text,
}

/// Derived widget metadata for a parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMeta {
    /// Control kind the editor should render
    pub widget_type: WidgetType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Forced display mode from the schema (`widget`/`handle`/`auto`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_mode: Option<String>,
}

impl WidgetMeta {
    /// Plain metadata with just a widget type and no constraints
    pub fn of(widget_type: WidgetType) -> Self {
        Self {
            widget_type,
            min_value: None,
            max_value: None,
            step: None,
            options: None,
            display_mode: None,
        }
    }
}

/// A user-editable parameter on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub label: String,
    pub data_type: String,
    /// Current value, mutated in place by parameter-edit events
    pub value: Value,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub widget_meta: WidgetMeta,
}

/// Scalar input sources carried on simple demo nodes
///
/// The converter folds these into the canonical `inputs` bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

impl NodeConfig {
    pub fn is_empty(&self) -> bool {
        self.default_value.is_none() && self.operation.is_none() && self.output_name.is_none()
    }
}

/// Per-node payload: label, ports, parameters, and execution state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    pub label: String,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NodeConfig>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub connections: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl NodeData {
    /// Payload with a label and nothing else
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Look up an output port by name
    pub fn output_port(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Look up an input port by name
    pub fn input_port(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }
}

/// A node instance in the visual graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualNode {
    /// Globally unique identifier
    pub id: NodeId,
    /// Kind tag selecting the capability schema and renderer
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub data: NodeData,
}

/// Presentation style for an edge, a pure function of its data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
}

impl EdgeStyle {
    /// Fixed color lookup for a data type tag
    ///
    /// Unknown tags fall back to gray.
    pub fn for_data_type(data_type: &str) -> Self {
        let stroke = match data_type {
            "model" => "#B39DDB",   // lavender
            "clip" => "#FFEB3B",    // yellow
            "vae" => "#F06292",     // rose
            "prompt" => "#FFB74D",  // orange
            "latent" => "#FF9CF9",  // pink
            "image" => "#64B5F6",   // blue
            "mask" => "#81C784",    // green
            "number" => "#AED581",  // light green
            "string" => "#FFD700",  // gold
            "boolean" => "#9E9E9E", // gray
            _ => "#9E9E9E",
        };
        Self {
            stroke: stroke.to_string(),
            stroke_width: 2.0,
        }
    }
}

/// A typed directed connection between an output port and an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    /// Resolved data type, decided by the connection resolver
    pub data_type: String,
    pub style: EdgeStyle,
}

/// The editor-side workflow graph
///
/// Invariant: every edge's source/target id references a node present in
/// the same graph. [`VisualGraph::remove_node`] cascades edge removal to
/// preserve it; the validator reports violations in loaded documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

impl VisualGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a node by ID
    pub fn find_node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, id: &str) -> Option<&mut VisualNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Get edges coming into a node
    pub fn incoming_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a VisualEdge> {
        self.edges.iter().filter(move |e| e.target == node_id)
    }

    /// Get edges going out of a node
    pub fn outgoing_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a VisualEdge> {
        self.edges.iter().filter(move |e| e.source == node_id)
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: VisualNode) {
        self.nodes.push(node);
    }

    /// Remove a node and every edge attached to it
    pub fn remove_node(&mut self, node_id: &str) -> Option<VisualNode> {
        let pos = self.nodes.iter().position(|n| n.id == node_id)?;
        let node = self.nodes.remove(pos);
        self.edges
            .retain(|e| e.source != node_id && e.target != node_id);
        Some(node)
    }

    /// Remove an edge by ID
    pub fn remove_edge(&mut self, edge_id: &str) -> Option<VisualEdge> {
        let pos = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(pos))
    }

    /// Update a parameter value in place
    ///
    /// Returns false if the node or parameter does not exist.
    pub fn set_parameter_value(&mut self, node_id: &str, param: &str, value: Value) -> bool {
        match self
            .find_node_mut(node_id)
            .and_then(|n| n.data.params.get_mut(param))
        {
            Some(p) => {
                p.value = value;
                true
            }
            None => false,
        }
    }

    /// Apply an execution-status update to a node
    ///
    /// A single atomic mutation; updates for unknown nodes are dropped.
    pub fn apply_status_update(
        &mut self,
        node_id: &str,
        status: NodeStatus,
        execution_time: Option<f64>,
        output: Option<Value>,
    ) -> bool {
        match self.find_node_mut(node_id) {
            Some(node) => {
                node.data.status = Some(status);
                if execution_time.is_some() {
                    node.data.execution_time = execution_time;
                }
                if output.is_some() {
                    node.data.output = output;
                }
                true
            }
            None => {
                log::debug!("Dropping status update for unknown node '{}'", node_id);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: &str) -> VisualNode {
        VisualNode {
            id: id.to_string(),
            kind: "processing".to_string(),
            position: Position::new(0.0, 0.0),
            data: NodeData::labeled(id),
        }
    }

    fn make_edge(id: &str, source: &str, target: &str) -> VisualEdge {
        VisualEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: Some("output".to_string()),
            target_handle: Some("input".to_string()),
            data_type: "image".to_string(),
            style: EdgeStyle::for_data_type("image"),
        }
    }

    #[test]
    fn test_remove_node_cascades_edges() {
        let mut graph = VisualGraph::new();
        graph.add_node(make_node("a"));
        graph.add_node(make_node("b"));
        graph.add_node(make_node("c"));
        graph.edges.push(make_edge("e1", "a", "b"));
        graph.edges.push(make_edge("e2", "b", "c"));
        graph.edges.push(make_edge("e3", "a", "c"));

        graph.remove_node("b");

        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].id, "e3");
    }

    #[test]
    fn test_incoming_outgoing_edges() {
        let mut graph = VisualGraph::new();
        graph.add_node(make_node("a"));
        graph.add_node(make_node("b"));
        graph.edges.push(make_edge("e1", "a", "b"));

        assert_eq!(graph.outgoing_edges("a").count(), 1);
        assert_eq!(graph.incoming_edges("a").count(), 0);
        assert_eq!(graph.incoming_edges("b").count(), 1);
    }

    #[test]
    fn test_apply_status_update() {
        let mut graph = VisualGraph::new();
        graph.add_node(make_node("a"));

        let applied = graph.apply_status_update(
            "a",
            NodeStatus::Completed,
            Some(1.25),
            Some(serde_json::json!({"image": "out.png"})),
        );
        assert!(applied);

        let node = graph.find_node("a").unwrap();
        assert_eq!(node.data.status, Some(NodeStatus::Completed));
        assert_eq!(node.data.execution_time, Some(1.25));

        assert!(!graph.apply_status_update("missing", NodeStatus::Error, None, None));
    }

    #[test]
    fn test_status_update_keeps_previous_output() {
        let mut graph = VisualGraph::new();
        graph.add_node(make_node("a"));
        graph.apply_status_update("a", NodeStatus::Completed, None, Some(serde_json::json!(1)));
        // A later update without output must not clear the applied one
        graph.apply_status_update("a", NodeStatus::Idle, None, None);

        let node = graph.find_node("a").unwrap();
        assert_eq!(node.data.output, Some(serde_json::json!(1)));
    }

    #[test]
    fn test_set_parameter_value() {
        let mut graph = VisualGraph::new();
        let mut node = make_node("a");
        node.data.params.insert(
            "steps".to_string(),
            Parameter {
                name: "steps".to_string(),
                label: "Steps".to_string(),
                data_type: "number".to_string(),
                value: serde_json::json!(20),
                required: false,
                description: None,
                widget_meta: WidgetMeta::of(WidgetType::Slider),
            },
        );
        graph.add_node(node);

        assert!(graph.set_parameter_value("a", "steps", serde_json::json!(30)));
        assert_eq!(
            graph.find_node("a").unwrap().data.params["steps"].value,
            serde_json::json!(30)
        );
        assert!(!graph.set_parameter_value("a", "missing", serde_json::json!(0)));
    }

    #[test]
    fn test_edge_style_lookup() {
        assert_eq!(EdgeStyle::for_data_type("image").stroke, "#64B5F6");
        assert_eq!(EdgeStyle::for_data_type("latent").stroke, "#FF9CF9");
        // Unknown types fall back to gray
        assert_eq!(
            EdgeStyle::for_data_type("mystery").stroke,
            EdgeStyle::for_data_type("boolean").stroke
        );
    }

    #[test]
    fn test_node_serde_uses_type_tag() {
        let node = make_node("n1");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "processing");
        assert!(json.get("kind").is_none());

        let restored: VisualNode = serde_json::from_value(json).unwrap();
        assert_eq!(restored.kind, "processing");
    }

    #[test]
    fn test_edge_serde_camel_case_handles() {
        let edge = make_edge("e1", "a", "b");
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceHandle"], "output");
        assert_eq!(json["targetHandle"], "input");
        assert_eq!(json["dataType"], "image");
    }
}
