//! Capability schemas and schema-to-UI derivation
//!
//! A node kind's capability schema (fetched from the node registry)
//! declares its input/output properties. The deriver turns handle-typed
//! properties into ports and everything else into editable parameters
//! with a widget chosen by an ordered decision table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{NodeData, Parameter, Port, WidgetMeta, WidgetType};

/// Data type tag used when a schema does not declare one
pub const DEFAULT_DATA_TYPE: &str = "default";

/// One section of a capability schema (input or output side)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSection {
    /// Property name -> raw JSON-schema fragment, in declaration order
    #[serde(default)]
    pub properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

/// Capability schema for a node kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub input_schema: SchemaSection,
    #[serde(default)]
    pub output_schema: SchemaSection,
}

impl NodeSchema {
    /// Lenient construction from an untyped document
    ///
    /// Never fails: missing or wrong-typed sections degrade to empty ones.
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self {
            name,
            input_schema: section_from_value(value.get("input_schema")),
            output_schema: section_from_value(value.get("output_schema")),
        }
    }
}

fn section_from_value(value: Option<&Value>) -> SchemaSection {
    let Some(value) = value else {
        return SchemaSection::default();
    };
    let properties = match value.get("properties") {
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            log::warn!("Schema 'properties' is not an object, ignoring: {}", other);
            serde_json::Map::new()
        }
        None => serde_json::Map::new(),
    };
    let required = value
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    SchemaSection {
        properties,
        required,
    }
}

/// A single property fragment, extracted leniently from loose JSON
///
/// Fields that are absent or malformed come back as `None`; the widget
/// decision table only branches on what is actually present.
#[derive(Debug, Clone, Default)]
pub struct PropertySchema {
    pub kind: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub multiple_of: Option<f64>,
    /// Declared port data type for handle properties
    pub handle_data_type: Option<String>,
    pub display_mode: Option<String>,
}

impl PropertySchema {
    /// Extract a fragment from its raw JSON form
    pub fn from_value(value: &Value) -> Self {
        let str_field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let num_field = |key: &str| value.get(key).and_then(Value::as_f64);

        Self {
            kind: str_field("type"),
            format: str_field("format"),
            title: str_field("title"),
            description: str_field("description"),
            default: value.get("default").cloned(),
            enum_values: value.get("enum").and_then(Value::as_array).cloned(),
            minimum: num_field("minimum"),
            maximum: num_field("maximum"),
            multiple_of: num_field("multipleOf"),
            handle_data_type: value
                .get("properties")
                .and_then(|p| p.get("data_type"))
                .and_then(|d| d.get("enum"))
                .and_then(Value::as_array)
                .and_then(|arr| arr.first())
                .and_then(Value::as_str)
                .map(str::to_string),
            display_mode: value
                .get("metadata")
                .and_then(|m| m.get("widget_meta"))
                .and_then(|w| w.get("display_mode"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Whether this property is a connection handle
    pub fn is_handle(&self) -> bool {
        self.kind.as_deref() == Some("object") && self.format.as_deref() == Some("node-handle")
    }

    fn is_numeric(&self) -> bool {
        matches!(self.kind.as_deref(), Some("number") | Some("integer"))
    }

    fn is_boolean(&self) -> bool {
        self.kind.as_deref() == Some("boolean")
    }

    /// Port data type for a handle property, defaulting when undeclared
    pub fn port_data_type(&self) -> String {
        self.handle_data_type
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_TYPE.to_string())
    }

    /// Parameter data type tag derived from the schema type
    pub fn scalar_data_type(&self) -> String {
        match self.kind.as_deref() {
            Some("number") | Some("integer") => "number".to_string(),
            Some("string") => "string".to_string(),
            Some("boolean") => "boolean".to_string(),
            _ => DEFAULT_DATA_TYPE.to_string(),
        }
    }

    fn label_or(&self, name: &str) -> String {
        self.title.clone().unwrap_or_else(|| name.to_string())
    }
}

/// Widget selection: an ordered, pure decision table
///
/// Checked in this order: enum => combo, numeric => slider,
/// boolean => toggle, anything else => text.
pub fn derive_widget(prop: &PropertySchema) -> WidgetMeta {
    let widget_type = if prop.enum_values.is_some() {
        WidgetType::Combo
    } else if prop.is_numeric() {
        WidgetType::Slider
    } else if prop.is_boolean() {
        WidgetType::Toggle
    } else {
        WidgetType::Text
    };

    let options = prop.enum_values.as_ref().map(|values| {
        values
            .iter()
            .map(|v| match v.as_str() {
                Some(s) => s.to_string(),
                None => v.to_string(),
            })
            .collect()
    });

    WidgetMeta {
        widget_type,
        min_value: prop.minimum,
        max_value: prop.maximum,
        step: prop.multiple_of,
        options,
        display_mode: prop.display_mode.clone(),
    }
}

/// Port exposure policy for a node kind
///
/// Kind-specific carve-outs live in [`KIND_POLICIES`] so every exception
/// is auditable in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortPolicy {
    /// Only handle-typed properties become ports (the general rule)
    HandlesOnly,
    /// Every schema property becomes a port, preserving a richer
    /// multi-port layout; non-handle properties stay editable parameters
    AllProperties,
}

/// The kind -> policy table
pub const KIND_POLICIES: &[(&str, PortPolicy)] =
    &[("storyboard_generator", PortPolicy::AllProperties)];

impl PortPolicy {
    pub fn for_kind(kind: &str) -> Self {
        KIND_POLICIES
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, policy)| *policy)
            .unwrap_or(PortPolicy::HandlesOnly)
    }
}

/// Derive a node's port lists and parameter descriptors from its schema
///
/// Total: missing or malformed fragments degrade to empty lists, never
/// an error. Property order in the schema becomes port order.
pub fn derive_node_data(schema: &NodeSchema, kind: &str) -> NodeData {
    let policy = PortPolicy::for_kind(kind);
    let label = if schema.name.is_empty() {
        kind.to_string()
    } else {
        schema.name.clone()
    };
    let mut data = NodeData::labeled(label);

    for (name, raw) in &schema.input_schema.properties {
        let prop = PropertySchema::from_value(raw);
        if prop.is_handle() {
            data.inputs
                .push(Port::new(name, prop.label_or(name), prop.port_data_type()));
            continue;
        }
        if policy == PortPolicy::AllProperties {
            data.inputs
                .push(Port::new(name, prop.label_or(name), prop.scalar_data_type()));
        }
        data.params
            .insert(name.clone(), derive_parameter(name, &prop, &schema.input_schema));
    }

    for (name, raw) in &schema.output_schema.properties {
        let prop = PropertySchema::from_value(raw);
        if prop.is_handle() {
            data.outputs
                .push(Port::new(name, prop.label_or(name), prop.port_data_type()));
        } else if policy == PortPolicy::AllProperties {
            data.outputs
                .push(Port::new(name, prop.label_or(name), prop.scalar_data_type()));
        } else {
            data.params
                .insert(name.clone(), derive_parameter(name, &prop, &schema.input_schema));
        }
    }

    data
}

fn derive_parameter(name: &str, prop: &PropertySchema, inputs: &SchemaSection) -> Parameter {
    Parameter {
        name: name.to_string(),
        label: prop.label_or(name),
        data_type: prop.scalar_data_type(),
        value: prop
            .default
            .clone()
            .unwrap_or_else(|| Value::String(String::new())),
        required: inputs.required.iter().any(|r| r == name),
        description: prop.description.clone(),
        widget_meta: derive_widget(prop),
    }
}
