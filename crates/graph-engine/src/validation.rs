//! Structural validation gating export and execution
//!
//! Validation operates on the loosely-typed document form so that
//! malformed input is reported, never crashed on. Every check runs to
//! completion so the full error list can be surfaced at once; the graph
//! is never mutated.

use serde_json::Value;

use crate::types::VisualGraph;

/// A single structural violation with location context
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The document does not declare a `nodes` array
    MissingNodes,
    /// The document does not declare an `edges` array
    MissingEdges,
    /// A node is missing a required non-empty field
    NodeMissingField { index: usize, field: &'static str },
    /// A node's position is absent or has non-finite coordinates
    NodeInvalidPosition { index: usize },
    /// A node's data payload is absent or not an object
    NodeInvalidData { index: usize },
    /// An edge is missing a required non-empty field
    EdgeMissingField { index: usize, field: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNodes => write!(f, "Workflow must declare a 'nodes' array"),
            Self::MissingEdges => write!(f, "Workflow must declare an 'edges' array"),
            Self::NodeMissingField { index, field } => {
                write!(f, "Node {}: missing or empty '{}'", index, field)
            }
            Self::NodeInvalidPosition { index } => {
                write!(f, "Node {}: position must have finite numeric x and y", index)
            }
            Self::NodeInvalidData { index } => {
                write!(f, "Node {}: 'data' must be a non-null object", index)
            }
            Self::EdgeMissingField { index, field } => {
                write!(f, "Edge {}: missing or empty '{}'", index, field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Aggregated validation result
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Human-readable messages, one per violation
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

/// Validate a loosely-typed workflow document
///
/// Never panics and never mutates its input; all nodes and edges are
/// checked even after the first violation.
pub fn validate_document(document: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    match document.get("nodes").and_then(Value::as_array) {
        Some(nodes) => {
            for (index, node) in nodes.iter().enumerate() {
                validate_node(index, node, &mut errors);
            }
        }
        None => errors.push(ValidationError::MissingNodes),
    }

    match document.get("edges").and_then(Value::as_array) {
        Some(edges) => {
            for (index, edge) in edges.iter().enumerate() {
                validate_edge(index, edge, &mut errors);
            }
        }
        None => errors.push(ValidationError::MissingEdges),
    }

    ValidationReport::from_errors(errors)
}

/// Validate a typed visual graph through the same structural checks
pub fn validate_graph(graph: &VisualGraph) -> ValidationReport {
    match serde_json::to_value(graph) {
        Ok(document) => validate_document(&document),
        // Unreachable for well-formed graphs; reported rather than panicked on
        Err(err) => {
            log::warn!("Graph could not be serialized for validation: {}", err);
            ValidationReport::from_errors(vec![ValidationError::MissingNodes])
        }
    }
}

fn non_empty_str(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

fn validate_node(index: usize, node: &Value, errors: &mut Vec<ValidationError>) {
    if !non_empty_str(node, "id") {
        errors.push(ValidationError::NodeMissingField { index, field: "id" });
    }
    if !non_empty_str(node, "type") {
        errors.push(ValidationError::NodeMissingField { index, field: "type" });
    }

    let finite = |key: &str| {
        node.get("position")
            .and_then(|p| p.get(key))
            .and_then(Value::as_f64)
            .is_some_and(f64::is_finite)
    };
    if !finite("x") || !finite("y") {
        errors.push(ValidationError::NodeInvalidPosition { index });
    }

    if !node.get("data").is_some_and(Value::is_object) {
        errors.push(ValidationError::NodeInvalidData { index });
    }
}

fn validate_edge(index: usize, edge: &Value, errors: &mut Vec<ValidationError>) {
    for field in ["id", "source", "target", "sourceHandle", "targetHandle"] {
        if !non_empty_str(edge, field) {
            errors.push(ValidationError::EdgeMissingField { index, field });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "nodes": [{
                "id": "n1",
                "type": "input",
                "position": { "x": 0.0, "y": 12.5 },
                "data": { "label": "Input" }
            }],
            "edges": [{
                "id": "e1",
                "source": "n1",
                "target": "n1",
                "sourceHandle": "output",
                "targetHandle": "input"
            }]
        });

        let report = validate_document(&doc);
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn test_missing_sequences_are_errors_not_crashes() {
        let report = validate_document(&json!({}));
        assert!(!report.is_valid);
        assert!(report.errors.contains(&ValidationError::MissingNodes));
        assert!(report.errors.contains(&ValidationError::MissingEdges));

        // Wrong-typed sequences count as absent
        let report = validate_document(&json!({ "nodes": "oops", "edges": 3 }));
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_node_checks_report_index() {
        let doc = json!({
            "nodes": [
                { "id": "n1", "type": "input", "position": { "x": 0, "y": 0 }, "data": {} },
                { "id": "", "type": "input", "position": { "x": 0, "y": 0 }, "data": {} }
            ],
            "edges": []
        });

        let report = validate_document(&doc);
        assert_eq!(
            report.errors,
            vec![ValidationError::NodeMissingField { index: 1, field: "id" }]
        );
        assert!(report.messages()[0].contains("Node 1"));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let doc = json!({
            "nodes": [
                { "id": "n1", "type": "input", "position": { "x": "NaN", "y": 0 }, "data": {} },
                { "id": "n2", "type": "input", "data": {} }
            ],
            "edges": []
        });

        let report = validate_document(&doc);
        assert_eq!(
            report.errors,
            vec![
                ValidationError::NodeInvalidPosition { index: 0 },
                ValidationError::NodeInvalidPosition { index: 1 },
            ]
        );
    }

    #[test]
    fn test_null_data_rejected() {
        let doc = json!({
            "nodes": [
                { "id": "n1", "type": "input", "position": { "x": 0, "y": 0 }, "data": null }
            ],
            "edges": []
        });

        let report = validate_document(&doc);
        assert_eq!(
            report.errors,
            vec![ValidationError::NodeInvalidData { index: 0 }]
        );
    }

    #[test]
    fn test_edge_checks_collect_all_missing_fields() {
        let doc = json!({
            "nodes": [],
            "edges": [{ "id": "e1", "source": "a", "target": "b" }]
        });

        let report = validate_document(&doc);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.contains(&ValidationError::EdgeMissingField {
            index: 0,
            field: "sourceHandle"
        }));
        assert!(report.errors.contains(&ValidationError::EdgeMissingField {
            index: 0,
            field: "targetHandle"
        }));
    }

    #[test]
    fn test_validation_runs_to_completion() {
        let doc = json!({
            "nodes": [
                {},
                { "id": "n2", "type": "", "position": { "x": 0, "y": 0 }, "data": {} }
            ],
            "edges": [{}]
        });

        let report = validate_document(&doc);
        // First node: id, type, position, data; second node: type; edge: five fields
        assert_eq!(report.errors.len(), 4 + 1 + 5);
    }

    #[test]
    fn test_validate_typed_graph() {
        let graph = GraphBuilder::new()
            .add_node("a", "input", (0.0, 0.0))
            .add_node("b", "output", (100.0, 0.0))
            .add_edge_typed("a", "out", "b", "in", "image")
            .build();

        let report = validate_graph(&graph);
        assert!(report.is_valid, "unexpected errors: {:?}", report.errors);
    }
}
