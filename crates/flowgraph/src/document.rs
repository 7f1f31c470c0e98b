// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph documents: the persisted form of a graph.
//!
//! A document is a flat list of nodes and connections carrying their ids.
//! JSON is the exchange format; RON is offered for files kept next to
//! other editor settings.

use crate::connection::Connection;
use crate::graph::{Graph, GraphError};
use crate::interaction::Interaction;
use crate::node::Node;
use crate::widget::FlowGraph;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading or applying a document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed or produced
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// RON could not be produced
    #[error("Could not serialize RON document: {0}")]
    Ron(#[from] ron::Error),

    /// RON could not be parsed
    #[error("Invalid RON document: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// Document content violates graph rules
    #[error("Invalid graph: {0}")]
    Graph(#[from] GraphError),
}

/// Serialized graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes, in creation order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Connections, in creation order
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl GraphDocument {
    /// Snapshot a graph
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            connections: graph.connections().copied().collect(),
        }
    }

    /// Build a graph from the document.
    ///
    /// Ids are kept, and new ids continue after the largest one found.
    pub fn to_graph(&self) -> Result<Graph, GraphError> {
        let mut graph = Graph::new();
        for node in &self.nodes {
            graph.insert_node(node.clone())?;
        }
        for connection in &self.connections {
            graph.insert_connection(*connection)?;
        }
        Ok(graph)
    }

    /// Parse JSON
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write compact JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write indented JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse RON
    pub fn from_ron(text: &str) -> Result<Self, DocumentError> {
        Ok(ron::from_str(text)?)
    }

    /// Write pretty RON
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load a document, choosing the format by extension (`.ron` or JSON)
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        let document = if is_ron(path) {
            Self::from_ron(&content)?
        } else {
            Self::from_json(&content)?
        };
        tracing::info!(
            "Loaded graph document from {:?}: {} node(s), {} connection(s)",
            path,
            document.nodes.len(),
            document.connections.len()
        );
        Ok(document)
    }

    /// Save the document, choosing the format by extension (`.ron` or JSON)
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let content = if is_ron(path) {
            self.to_ron()?
        } else {
            self.to_json_pretty()?
        };
        std::fs::write(path, content)?;
        tracing::info!("Saved graph document to {:?}", path);
        Ok(())
    }
}

fn is_ron(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ron"))
}

impl FlowGraph {
    /// Snapshot the graph as a document
    pub fn export(&self) -> GraphDocument {
        GraphDocument::from_graph(&self.graph)
    }

    /// Replace the graph with a document's content.
    ///
    /// The current graph is kept if the document is invalid.
    pub fn import(&mut self, document: &GraphDocument) -> Result<(), DocumentError> {
        let graph = document.to_graph().map_err(|err| {
            tracing::warn!("Rejected graph document: {err}");
            err
        })?;
        tracing::info!(
            "Imported {} node(s) and {} connection(s)",
            graph.node_count(),
            graph.connection_count()
        );
        self.graph = graph;
        self.interaction = Interaction::default();
        self.menu.close();
        Ok(())
    }

    /// Export as JSON
    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.export().to_json()
    }

    /// Import from JSON
    pub fn import_json(&mut self, text: &str) -> Result<(), DocumentError> {
        let document = GraphDocument::from_json(text)?;
        self.import(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionId;
    use crate::node::{NodeDesc, NodeId};
    use crate::port::{FieldKind, FieldValue, Port};
    use pretty_assertions::assert_eq;

    fn sample() -> FlowGraph {
        let mut flow = FlowGraph::default();
        let a = flow.add_node(
            NodeDesc::new("Color")
                .at(-40.0, 10.0)
                .output(Port::data("Color", "float4")),
        ).unwrap();
        let b = flow.add_node(
            NodeDesc::new("Output")
                .at(300.0, 10.0)
                .fixed()
                .details("Final surface color")
                .input(Port::data("Surface", "float4"))
                .input(Port::field("Opacity", FieldKind::Number).with_value(FieldValue::Number(0.5))),
        ).unwrap();
        flow.add_connection(a, 0, b, 0).unwrap();
        flow
    }

    #[test]
    fn test_json_shape() {
        let flow = sample();
        let json: serde_json::Value = serde_json::from_str(&flow.export_json().unwrap()).unwrap();

        assert_eq!(json["nodes"][0]["id"], 0);
        assert_eq!(json["nodes"][0]["title"], "Color");
        assert_eq!(json["nodes"][0]["outputs"][0]["type"], "float4");
        assert_eq!(json["nodes"][1]["fixed"], true);
        assert_eq!(json["nodes"][1]["inputs"][1]["value"], 0.5);
        assert_eq!(
            json["connections"][0],
            serde_json::json!({ "id": 2, "source": 0, "out": 0, "dest": 1, "in": 0 })
        );
    }

    #[test]
    fn test_import_restores_graph_and_ids() {
        let flow = sample();
        let text = flow.export_json().unwrap();

        let mut other = FlowGraph::default();
        other.import_json(&text).unwrap();
        assert_eq!(other.export(), flow.export());
        assert_eq!(other.graph().next_id(), 3);

        // New ids continue after the imported ones
        let c = other.add_node(NodeDesc::new("Later")).unwrap();
        assert_eq!(c, NodeId(3));
    }

    #[test]
    fn test_ron_roundtrip() {
        let document = sample().export();
        let text = document.to_ron().unwrap();
        assert!(text.starts_with("GraphDocument("));
        assert_eq!(GraphDocument::from_ron(&text).unwrap(), document);
    }

    #[test]
    fn test_import_replaces_content() {
        let mut flow = sample();
        flow.import(&GraphDocument::default()).unwrap();
        assert_eq!(flow.graph().node_count(), 0);
        assert_eq!(flow.graph().connection_count(), 0);
    }

    #[test]
    fn test_invalid_document_keeps_current_graph() {
        let mut flow = sample();
        let mut document = flow.export();
        document.connections.push(Connection {
            id: ConnectionId(9),
            from_node: NodeId(0),
            from_port: 0,
            to_node: NodeId(1),
            to_port: 1,
        });

        let err = flow.import(&document).unwrap_err();
        assert!(matches!(err, DocumentError::Graph(GraphError::NotConnectable { .. })));
        assert_eq!(flow.graph().node_count(), 2);
        assert_eq!(flow.graph().connection_count(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut document = sample().export();
        document.connections[0].id = ConnectionId(0);
        assert_eq!(document.to_graph().unwrap_err(), GraphError::DuplicateId(0));
    }

    #[test]
    fn test_largest_id_is_rejected() {
        let mut flow = sample();
        let text = r#"{
            "nodes": [
                { "id": 18446744073709551615, "title": "Last", "position": [0.0, 0.0],
                  "inputs": [], "outputs": [] }
            ]
        }"#;
        let err = flow.import_json(text).unwrap_err();
        assert!(matches!(err, DocumentError::Graph(GraphError::IdSpaceExhausted)));
        assert_eq!(flow.graph().node_count(), 2);
        assert_eq!(flow.graph().next_id(), 3);
    }

    #[test]
    fn test_exhausted_counter_refuses_new_ids() {
        let mut flow = FlowGraph::default();
        let text = r#"{
            "nodes": [
                { "id": 18446744073709551614, "title": "Nearly last", "position": [0.0, 0.0],
                  "inputs": [], "outputs": [] }
            ]
        }"#;
        flow.import_json(text).unwrap();
        assert_eq!(flow.graph().next_id(), u64::MAX);

        assert_eq!(
            flow.add_node(NodeDesc::new("Later")).unwrap_err(),
            GraphError::IdSpaceExhausted
        );
        assert_eq!(flow.graph().node_count(), 1);
        assert_eq!(flow.graph().next_id(), u64::MAX);
    }

    #[test]
    fn test_malformed_json() {
        let mut flow = FlowGraph::default();
        let err = flow.import_json("{ \"nodes\": 3 }").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn test_missing_field_values_are_defaulted() {
        let text = r#"{
            "nodes": [
                { "id": 4, "title": "Tint", "position": [0.0, 0.0],
                  "inputs": [{ "name": "Color", "type": "Color" }], "outputs": [] }
            ]
        }"#;
        let mut flow = FlowGraph::default();
        flow.import_json(text).unwrap();
        assert_eq!(
            flow.node(NodeId(4)).unwrap().field_value(0),
            Some(&FieldValue::Color([1.0, 1.0, 1.0, 1.0]))
        );
    }
}
