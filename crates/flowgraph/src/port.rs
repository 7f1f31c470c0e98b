// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.
//!
//! A port is either a connectable data slot with a named type (`float4`,
//! `texture2d`, ...) or an inline-editable scalar field (`Number`, `String`,
//! `Color`) that is edited in place instead of being wired.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Kind of an inline-editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Floating point number
    Number,
    /// Free text
    String,
    /// RGBA color
    Color,
}

impl FieldKind {
    /// Name used on the wire and in notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::String => "String",
            Self::Color => "Color",
        }
    }

    /// Value a freshly created field starts with
    pub fn default_value(&self) -> FieldValue {
        match self {
            Self::Number => FieldValue::Number(0.0),
            Self::String => FieldValue::String(String::new()),
            Self::Color => FieldValue::Color([1.0, 1.0, 1.0, 1.0]),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a port.
///
/// Serialized as the bare type string, so `"float4"` is a data port and
/// `"Number"`, `"String"` and `"Color"` are inline fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PortType {
    /// Connectable port carrying a named data type
    Data(String),
    /// Inline-editable field, never wired
    Field(FieldKind),
}

impl PortType {
    /// Create a data port type
    pub fn data(name: impl Into<String>) -> Self {
        Self::Data(name.into())
    }

    /// Whether wires may attach to ports of this type
    pub fn is_connectable(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    /// The field kind, if this is an inline field
    pub fn field_kind(&self) -> Option<FieldKind> {
        match self {
            Self::Field(kind) => Some(*kind),
            Self::Data(_) => None,
        }
    }

    /// Type name as written in documents and port labels
    pub fn name(&self) -> &str {
        match self {
            Self::Data(name) => name,
            Self::Field(kind) => kind.as_str(),
        }
    }

    /// Get the color for this port type (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Field(_) => [150, 150, 150],
            Self::Data(name) => {
                // Stable per-name hue so equal types always share a color
                let hash = name
                    .bytes()
                    .fold(2166136261u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16777619));
                let r = 80 + (hash & 0x7f) as u8;
                let g = 80 + ((hash >> 8) & 0x7f) as u8;
                let b = 80 + ((hash >> 16) & 0x7f) as u8;
                [r, g, b]
            }
        }
    }
}

impl From<String> for PortType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Number" => Self::Field(FieldKind::Number),
            "String" => Self::Field(FieldKind::String),
            "Color" => Self::Field(FieldKind::Color),
            _ => Self::Data(value),
        }
    }
}

impl From<&str> for PortType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<PortType> for String {
    fn from(value: PortType) -> Self {
        match value {
            PortType::Data(name) => name,
            PortType::Field(kind) => kind.as_str().to_string(),
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current value of an inline field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Number
    Number(f64),
    /// Text
    String(String),
    /// Color, linear RGBA in `0.0..=1.0`
    Color([f32; 4]),
}

impl FieldValue {
    /// Get the field kind for this value
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Number(_) => FieldKind::Number,
            Self::String(_) => FieldKind::String,
            Self::Color(_) => FieldKind::Color,
        }
    }
}

/// A port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub port_type: PortType,
    /// Value of an inline field; always `None` for data ports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

impl Port {
    /// Create a new port, defaulting the value of inline fields
    pub fn new(name: impl Into<String>, port_type: impl Into<PortType>) -> Self {
        let port_type = port_type.into();
        let value = port_type.field_kind().map(|kind| kind.default_value());
        Self {
            name: name.into(),
            port_type,
            value,
        }
    }

    /// Create a port from a type name; field names yield inline fields
    pub fn data(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PortType::from(type_name.into()))
    }

    /// Create an inline field
    pub fn field(name: impl Into<String>, kind: FieldKind) -> Self {
        Self::new(name, PortType::Field(kind))
    }

    /// Set the initial field value
    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether wires may attach to this port
    pub fn is_connectable(&self) -> bool {
        self.port_type.is_connectable()
    }

    /// Label drawn next to the port
    pub fn label(&self) -> String {
        match self.port_type {
            PortType::Data(ref type_name) => format!("{} ({})", self.name, type_name),
            PortType::Field(_) => format!("{}:", self.name),
        }
    }

    /// Fill in a default value for fields that arrived without one
    pub(crate) fn normalize(&mut self) {
        match self.port_type.field_kind() {
            Some(kind) => {
                let matches = self.value.as_ref().is_some_and(|v| v.kind() == kind);
                if !matches {
                    if let Some(value) = &self.value {
                        tracing::debug!(
                            "Field {:?} expects {:?}, replacing {:?} with the default",
                            self.name,
                            kind,
                            value
                        );
                    }
                    self.value = Some(kind.default_value());
                }
            }
            None => self.value = None,
        }
    }
}

/// Address of a port: node, direction and index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRef {
    /// Owning node
    pub node: NodeId,
    /// Input or output side
    pub direction: PortDirection,
    /// Index into the node's inputs or outputs
    pub index: usize,
}

impl PortRef {
    /// Address an input port
    pub fn input(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: PortDirection::Input,
            index,
        }
    }

    /// Address an output port
    pub fn output(node: NodeId, index: usize) -> Self {
        Self {
            node,
            direction: PortDirection::Output,
            index,
        }
    }
}
