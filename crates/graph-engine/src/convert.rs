//! Bidirectional conversion between visual and canonical graphs
//!
//! The canonical representation is the execution service's wire/storage
//! shape. Both directions are total: absent fields are substituted with
//! documented defaults instead of being rejected, so partially-populated
//! documents still produce a best-effort graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::DEFAULT_DATA_TYPE;
use crate::types::{
    EdgeStyle, NodeConfig, NodeData, NodeStatus, Parameter, Position, VisualEdge, VisualGraph,
    VisualNode, WidgetMeta, WidgetType,
};

fn default_source_output() -> String {
    "output".to_string()
}

fn default_target_input() -> String {
    "input".to_string()
}

fn default_data_type() -> String {
    DEFAULT_DATA_TYPE.to_string()
}

/// A node in the canonical (execution-service) representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendNode {
    #[serde(default)]
    pub id: String,
    /// Normalized type tag
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Scalar parameter values merged from config, params, and connections
    #[serde(default)]
    pub inputs: serde_json::Map<String, Value>,
    /// Union of the node's params and connections, with `label` injected
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NodeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// An edge in the canonical representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendEdge {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    #[serde(default = "default_source_output")]
    pub source_output: String,
    #[serde(default = "default_target_input")]
    pub target_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default = "default_data_type")]
    pub data_type: String,
}

/// The canonical workflow graph handed to the execution collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalGraph {
    #[serde(default)]
    pub nodes: Vec<BackendNode>,
    #[serde(default)]
    pub edges: Vec<BackendEdge>,
}

/// The full workflow document of the execution wire contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub graph: CanonicalGraph,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl WorkflowDocument {
    /// Wrap a canonical graph with fresh timestamps
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        graph: CanonicalGraph,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            graph,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Map a visual type tag to its canonical form
///
/// Visual-only tags are remapped; everything else passes through.
pub fn normalize_kind(kind: &str) -> String {
    match kind {
        "InputNode" => "input".to_string(),
        "OutputNode" => "output".to_string(),
        "ProcessingNode" => "processing".to_string(),
        other => other.to_string(),
    }
}

/// Convert a visual graph to the canonical representation
///
/// Total; never fails.
pub fn to_canonical(graph: &VisualGraph) -> CanonicalGraph {
    CanonicalGraph {
        nodes: graph.nodes.iter().map(node_to_canonical).collect(),
        edges: graph.edges.iter().map(edge_to_canonical).collect(),
    }
}

fn node_to_canonical(node: &VisualNode) -> BackendNode {
    let mut inputs = serde_json::Map::new();
    if let Some(config) = &node.data.config {
        if let Some(value) = &config.default_value {
            inputs.insert("value".to_string(), value.clone());
        }
        if let Some(operation) = &config.operation {
            inputs.insert("operation".to_string(), Value::String(operation.clone()));
        }
        if let Some(output_name) = &config.output_name {
            inputs.insert("outputName".to_string(), Value::String(output_name.clone()));
        }
    }

    let mut data = serde_json::Map::new();
    for (name, param) in &node.data.params {
        data.insert(name.clone(), param.value.clone());
    }
    if !node.data.connections.is_empty() {
        data.insert(
            "connections".to_string(),
            Value::Object(
                node.data
                    .connections
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ),
        );
    }
    data.insert("label".to_string(), Value::String(node.data.label.clone()));

    BackendNode {
        id: node.id.clone(),
        node_type: normalize_kind(&node.kind),
        inputs,
        data,
        position: node.position,
        status: node.data.status,
        execution_time: node.data.execution_time,
        output: node.data.output.clone(),
    }
}

fn edge_to_canonical(edge: &VisualEdge) -> BackendEdge {
    BackendEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_output: edge
            .source_handle
            .clone()
            .unwrap_or_else(default_source_output),
        target_input: edge
            .target_handle
            .clone()
            .unwrap_or_else(default_target_input),
        label: None,
        data_type: edge.data_type.clone(),
    }
}

/// Convert a canonical graph back to the visual representation
///
/// The structural inverse of [`to_canonical`]: `data.label` becomes the
/// label, the remaining data fields become parameters, and presentation
/// style is regenerated from each edge's data type. Total; never fails.
pub fn to_visual(graph: &CanonicalGraph) -> VisualGraph {
    VisualGraph {
        nodes: graph.nodes.iter().map(node_to_visual).collect(),
        edges: graph.edges.iter().map(edge_to_visual).collect(),
    }
}

fn node_to_visual(node: &BackendNode) -> VisualNode {
    let label = node
        .data
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let connections = node
        .data
        .get("connections")
        .and_then(Value::as_object)
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    let mut params = std::collections::HashMap::new();
    for (name, value) in &node.data {
        if name == "label" || name == "connections" {
            continue;
        }
        params.insert(name.clone(), parameter_from_value(name, value));
    }

    let config = config_from_inputs(&node.inputs);

    VisualNode {
        id: node.id.clone(),
        kind: node.node_type.clone(),
        position: node.position,
        data: NodeData {
            label,
            inputs: Vec::new(),
            outputs: Vec::new(),
            params,
            config,
            connections,
            status: node.status,
            execution_time: node.execution_time,
            output: node.output.clone(),
        },
    }
}

fn config_from_inputs(inputs: &serde_json::Map<String, Value>) -> Option<NodeConfig> {
    let config = NodeConfig {
        default_value: inputs.get("value").cloned(),
        operation: inputs
            .get("operation")
            .and_then(Value::as_str)
            .map(str::to_string),
        output_name: inputs
            .get("outputName")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    if config.is_empty() {
        None
    } else {
        Some(config)
    }
}

/// Rebuild a parameter descriptor from a bare canonical value
fn parameter_from_value(name: &str, value: &Value) -> Parameter {
    let (data_type, widget_type) = match value {
        Value::Number(_) => ("number", WidgetType::Slider),
        Value::Bool(_) => ("boolean", WidgetType::Toggle),
        Value::String(_) => ("string", WidgetType::Text),
        _ => (DEFAULT_DATA_TYPE, WidgetType::Text),
    };
    Parameter {
        name: name.to_string(),
        label: name.to_string(),
        data_type: data_type.to_string(),
        value: value.clone(),
        required: false,
        description: None,
        widget_meta: WidgetMeta::of(widget_type),
    }
}

fn edge_to_visual(edge: &BackendEdge) -> VisualEdge {
    VisualEdge {
        id: edge.id.clone(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        source_handle: Some(edge.source_output.clone()),
        target_handle: Some(edge.target_input.clone()),
        data_type: edge.data_type.clone(),
        style: EdgeStyle::for_data_type(&edge.data_type),
    }
}

/// Resolve divergence between an edited visual graph and a stored
/// canonical document by preferring the newer side
pub fn merge(
    visual: &VisualGraph,
    visual_modified_at: DateTime<Utc>,
    document: &WorkflowDocument,
) -> VisualGraph {
    if document.updated_at > visual_modified_at {
        to_visual(&document.graph)
    } else {
        visual.clone()
    }
}
