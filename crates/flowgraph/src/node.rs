// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::port::{FieldValue, Port, PortType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Everything needed to create a node.
///
/// Built with chained setters, then handed to
/// [`Graph::add_node`](crate::graph::Graph::add_node).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeDesc {
    /// Display name
    pub title: String,
    /// Position in canvas space
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Protected from keyboard deletion
    pub fixed: bool,
    /// Extra content shown when the node is expanded
    pub details: Option<String>,
    /// Opaque host data
    pub user_data: serde_json::Value,
}

impl NodeDesc {
    /// Start describing a node with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Append an input port
    pub fn input(mut self, port: Port) -> Self {
        self.inputs.push(port);
        self
    }

    /// Append an output port
    pub fn output(mut self, port: Port) -> Self {
        self.outputs.push(port);
        self
    }

    /// Mark the node as fixed
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Attach expandable details
    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach host data
    pub fn user_data(mut self, user_data: serde_json::Value) -> Self {
        self.user_data = user_data;
        self
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display name
    pub title: String,
    /// Position in canvas space
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Cannot be deleted from the keyboard
    #[serde(default)]
    pub fixed: bool,
    /// Content of the collapsible footer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Whether the footer is expanded
    #[serde(default)]
    pub expanded: bool,
    /// Opaque host data
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub user_data: serde_json::Value,
}

impl Node {
    /// Build a node record from a description
    pub(crate) fn from_desc(id: NodeId, desc: NodeDesc) -> Self {
        let mut node = Self {
            id,
            title: desc.title,
            position: desc.position,
            inputs: desc.inputs,
            outputs: desc.outputs,
            fixed: desc.fixed,
            details: desc.details.filter(|d| !d.is_empty()),
            expanded: false,
            user_data: desc.user_data,
        };
        node.normalize_ports();
        node
    }

    pub(crate) fn normalize_ports(&mut self) {
        for port in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            port.normalize();
        }
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Declared type of an input
    pub fn input_type(&self, index: usize) -> Option<&PortType> {
        self.input(index).map(|p| &p.port_type)
    }

    /// Declared type of an output
    pub fn output_type(&self, index: usize) -> Option<&PortType> {
        self.output(index).map(|p| &p.port_type)
    }

    /// Current value of an inline field input
    pub fn field_value(&self, index: usize) -> Option<&FieldValue> {
        self.input(index).and_then(|p| p.value.as_ref())
    }

    /// Whether the node has a collapsible footer
    pub fn has_details(&self) -> bool {
        self.details.is_some()
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }
}
