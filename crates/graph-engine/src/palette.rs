//! Node palette assembled from three ordered sources
//!
//! Palette entries come from the node registry (derived from capability
//! schemas), from a small builtin set, and from user-saved presets. Each
//! source is an immutable snapshot; they are combined by an explicit
//! merge in increasing precedence rather than mutated incrementally.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GraphError, Result};
use crate::schema::{derive_node_data, NodeSchema};
use crate::types::{NodeData, Position, VisualNode};

/// One instantiable entry in the palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    /// Kind tag for nodes dragged from this entry
    pub kind: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Template payload cloned into each instantiated node
    pub data: NodeData,
}

/// An immutable palette snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    /// Build palette entries from registry capability schemas
    pub fn from_schemas<I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = (String, NodeSchema)>,
    {
        let entries = schemas
            .into_iter()
            .map(|(kind, schema)| {
                let data = derive_node_data(&schema, &kind);
                PaletteEntry {
                    kind,
                    label: data.label.clone(),
                    category: None,
                    data,
                }
            })
            .collect();
        Self { entries }
    }

    /// The hardcoded basic entries every install ships with
    pub fn builtin() -> Self {
        let entry = |kind: &str, label: &str| PaletteEntry {
            kind: kind.to_string(),
            label: label.to_string(),
            category: Some("basic".to_string()),
            data: NodeData::labeled(label),
        };
        Self {
            entries: vec![
                entry("InputNode", "Input"),
                entry("OutputNode", "Output"),
                entry("ProcessingNode", "Processing"),
            ],
        }
    }

    /// Load user-saved preset entries from their JSON form
    pub fn from_preset_json(json: &str) -> Result<Self> {
        let entries: Vec<PaletteEntry> = serde_json::from_str(json)?;
        Ok(Self { entries })
    }

    /// Merge another snapshot into this one
    ///
    /// Entries from `other` override entries sharing the same kind.
    pub fn merge(mut self, other: Palette) -> Self {
        for entry in other.entries {
            self.entries.retain(|e| e.kind != entry.kind);
            self.entries.push(entry);
        }
        self
    }

    pub fn get(&self, kind: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.kind.as_str()).collect()
    }

    /// Group entries by category for display
    pub fn by_category(&self) -> HashMap<&str, Vec<&PaletteEntry>> {
        let mut grouped: HashMap<&str, Vec<&PaletteEntry>> = HashMap::new();
        for entry in &self.entries {
            grouped
                .entry(entry.category.as_deref().unwrap_or("general"))
                .or_default()
                .push(entry);
        }
        grouped
    }

    /// Instantiate a graph node from a palette entry
    ///
    /// The entry's data template is cloned; ports are fixed from here on.
    pub fn instantiate(&self, kind: &str, position: Position) -> Result<VisualNode> {
        let entry = self
            .get(kind)
            .ok_or_else(|| GraphError::UnknownKind(kind.to_string()))?;
        Ok(VisualNode {
            id: format!("{}-{}", kind, Uuid::new_v4()),
            kind: entry.kind.clone(),
            position,
            data: entry.data.clone(),
        })
    }
}

/// Combine the three palette sources in increasing precedence:
/// registry-derived entries, then builtin entries, then user presets.
pub fn merge_palette(registry: Palette, builtin: Palette, presets: Palette) -> Palette {
    registry.merge(builtin).merge(presets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_with_model_input(name: &str) -> NodeSchema {
        NodeSchema::from_value(&json!({
            "name": name,
            "input_schema": {
                "properties": {
                    "model": {
                        "type": "object",
                        "format": "node-handle",
                        "properties": { "data_type": { "enum": ["model"] } }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_from_schemas_derives_ports() {
        let palette =
            Palette::from_schemas(vec![("sampler".to_string(), schema_with_model_input("Sampler"))]);

        let entry = palette.get("sampler").unwrap();
        assert_eq!(entry.label, "Sampler");
        assert_eq!(entry.data.inputs.len(), 1);
        assert_eq!(entry.data.inputs[0].data_type, "model");
    }

    #[test]
    fn test_merge_precedence() {
        let registry = Palette::from_entries(vec![PaletteEntry {
            kind: "sampler".to_string(),
            label: "Registry Sampler".to_string(),
            category: None,
            data: NodeData::labeled("Registry Sampler"),
        }]);
        let presets = Palette::from_entries(vec![PaletteEntry {
            kind: "sampler".to_string(),
            label: "My Sampler".to_string(),
            category: Some("mine".to_string()),
            data: NodeData::labeled("My Sampler"),
        }]);

        let merged = merge_palette(registry, Palette::builtin(), presets);

        // Preset wins for the shared kind, builtins survive untouched
        assert_eq!(merged.get("sampler").unwrap().label, "My Sampler");
        assert!(merged.get("InputNode").is_some());
        assert_eq!(merged.kinds().len(), 4);
    }

    #[test]
    fn test_instantiate_clones_template() {
        let palette = Palette::from_schemas(vec![(
            "sampler".to_string(),
            schema_with_model_input("Sampler"),
        )]);

        let a = palette.instantiate("sampler", Position::new(10.0, 20.0)).unwrap();
        let b = palette.instantiate("sampler", Position::new(30.0, 40.0)).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.kind, "sampler");
        assert_eq!(a.position, Position::new(10.0, 20.0));
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn test_instantiate_unknown_kind() {
        let palette = Palette::builtin();
        let err = palette
            .instantiate("missing", Position::default())
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownKind(kind) if kind == "missing"));
    }

    #[test]
    fn test_presets_load_from_json() {
        let json = serde_json::to_string(&vec![PaletteEntry {
            kind: "my-preset".to_string(),
            label: "My Preset".to_string(),
            category: Some("saved".to_string()),
            data: NodeData::labeled("My Preset"),
        }])
        .unwrap();

        let palette = Palette::from_preset_json(&json).unwrap();
        assert!(palette.get("my-preset").is_some());

        assert!(Palette::from_preset_json("not json").is_err());
    }

    #[test]
    fn test_by_category_grouping() {
        let merged = merge_palette(
            Palette::from_schemas(vec![(
                "sampler".to_string(),
                schema_with_model_input("Sampler"),
            )]),
            Palette::builtin(),
            Palette::new(),
        );

        let grouped = merged.by_category();
        assert_eq!(grouped["basic"].len(), 3);
        assert_eq!(grouped["general"].len(), 1);
    }
}
