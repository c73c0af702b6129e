//! Connection admissibility and edge creation
//!
//! Consulted synchronously when the user draws a connection. Rejection
//! simply discards the prospective edge; graph state is never mutated
//! on the reject path.

use uuid::Uuid;

use crate::schema::DEFAULT_DATA_TYPE;
use crate::types::{EdgeStyle, VisualEdge, VisualGraph, VisualNode};

/// Outcome of a connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The connection is allowed; the edge carries this data type
    Admit { data_type: String },
    /// The declared port types are incompatible
    Reject,
}

impl Resolution {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Resolution::Admit { .. })
    }
}

/// Decide whether an output port may be joined to an input port
///
/// Ports of incompatible declared types may never be joined. A side
/// whose type is unknown or empty always admits, a deliberate
/// permissiveness for untyped or legacy ports. The admitted edge's data
/// type is the source's type if present, else the target's, else
/// `"default"`.
pub fn resolve_connection(
    source: &VisualNode,
    source_handle: &str,
    target: &VisualNode,
    target_handle: &str,
) -> Resolution {
    let source_type = source
        .data
        .output_port(source_handle)
        .map(|p| p.data_type.as_str())
        .unwrap_or("");
    let target_type = target
        .data
        .input_port(target_handle)
        .map(|p| p.data_type.as_str())
        .unwrap_or("");

    if !source_type.is_empty() && !target_type.is_empty() && source_type != target_type {
        return Resolution::Reject;
    }

    let data_type = if !source_type.is_empty() {
        source_type
    } else if !target_type.is_empty() {
        target_type
    } else {
        DEFAULT_DATA_TYPE
    };

    Resolution::Admit {
        data_type: data_type.to_string(),
    }
}

impl VisualGraph {
    /// Attempt to connect two ports, adding an edge on admission
    ///
    /// Returns the new edge id, or `None` when the resolver rejects or
    /// either node is missing. The graph is untouched on `None`.
    pub fn connect(
        &mut self,
        source_id: &str,
        source_handle: &str,
        target_id: &str,
        target_handle: &str,
    ) -> Option<String> {
        let source = self.find_node(source_id)?;
        let target = self.find_node(target_id)?;

        let data_type = match resolve_connection(source, source_handle, target, target_handle) {
            Resolution::Admit { data_type } => data_type,
            Resolution::Reject => return None,
        };

        let id = format!("edge-{}", Uuid::new_v4());
        self.edges.push(VisualEdge {
            id: id.clone(),
            source: source_id.to_string(),
            target: target_id.to_string(),
            source_handle: Some(source_handle.to_string()),
            target_handle: Some(target_handle.to_string()),
            style: EdgeStyle::for_data_type(&data_type),
            data_type,
        });
        Some(id)
    }
}
