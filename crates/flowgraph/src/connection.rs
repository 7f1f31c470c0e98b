// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use crate::port::PortRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection_{}", self.0)
    }
}

/// A wire from an output port to an input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    #[serde(rename = "source")]
    pub from_node: NodeId,
    /// Output index on the source node
    #[serde(rename = "out")]
    pub from_port: usize,
    /// Destination node ID
    #[serde(rename = "dest")]
    pub to_node: NodeId,
    /// Input index on the destination node
    #[serde(rename = "in")]
    pub to_port: usize,
}

impl Connection {
    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// The output end
    pub fn source(&self) -> PortRef {
        PortRef::output(self.from_node, self.from_port)
    }

    /// The input end
    pub fn dest(&self) -> PortRef {
        PortRef::input(self.to_node, self.to_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let connection = Connection {
            id: ConnectionId(7),
            from_node: NodeId(1),
            from_port: 0,
            to_node: NodeId(2),
            to_port: 3,
        };
        let json = serde_json::to_value(connection).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 7, "source": 1, "out": 0, "dest": 2, "in": 3 })
        );
        assert!(connection.involves_node(NodeId(2)));
        assert!(!connection.involves_node(NodeId(3)));
    }
}
