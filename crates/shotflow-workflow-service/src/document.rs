//! Workflow document import and export
//!
//! Export always writes the canonical form. Import is forgiving about
//! provenance: documents saved by older builds wrap the canonical graph
//! under a `data` or `workflow` key, and both shapes are still accepted.

use graph_engine::WorkflowDocument;
use serde_json::Value;

use crate::error::Result;

/// Parse a workflow document from exported JSON
///
/// Accepted shapes, in priority order: already-canonical (a top-level
/// `nodes` array), wrapped under `data`, wrapped under `workflow`, and
/// finally the top level itself as a last resort. Missing timestamps
/// are filled with the current time.
pub fn parse_workflow_document(text: &str) -> Result<WorkflowDocument> {
    let value: Value = serde_json::from_str(text)?;
    let document = serde_json::from_value(locate_graph(&value).clone())?;
    Ok(document)
}

fn locate_graph(value: &Value) -> &Value {
    if value.get("nodes").is_some() {
        return value;
    }
    for key in ["data", "workflow"] {
        if let Some(inner) = value.get(key) {
            if inner.get("nodes").is_some() {
                log::debug!("Importing legacy document wrapped under '{}'", key);
                return inner;
            }
        }
    }
    value
}

/// Serialize a workflow document to its canonical exported form
pub fn export_workflow_document(document: &WorkflowDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}
