// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! The graph is the single source of truth for the editor. Node and
//! connection ids come from one shared counter and are never reused.

use crate::connection::{Connection, ConnectionId};
use crate::node::{Node, NodeDesc, NodeId};
use crate::port::{FieldValue, PortType};
use egui::Vec2;
use indexmap::IndexMap;

/// A node graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Next id handed out to a node or connection
    next_id: u64,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> Result<u64, GraphError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(GraphError::IdSpaceExhausted)?;
        Ok(id)
    }

    /// Move the counter past an id taken from a document
    fn reserve_id(&mut self, id: u64) -> Result<(), GraphError> {
        let next = id.checked_add(1).ok_or(GraphError::IdSpaceExhausted)?;
        self.next_id = self.next_id.max(next);
        Ok(())
    }

    /// Id the next created node or connection will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn id_in_use(&self, id: u64) -> bool {
        self.nodes.contains_key(&NodeId(id)) || self.connections.contains_key(&ConnectionId(id))
    }

    /// Remove every node and connection and restart id allocation
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.connections.clear();
        self.next_id = 0;
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node to the graph
    pub fn add_node(&mut self, desc: NodeDesc) -> Result<NodeId, GraphError> {
        let id = NodeId(self.allocate_id()?);
        let node = Node::from_desc(id, desc);
        tracing::debug!(
            "Added {} '{}' at ({}, {})",
            id,
            node.title,
            node.position[0],
            node.position[1]
        );
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Insert a node that already carries an id (used by document import)
    pub(crate) fn insert_node(&mut self, mut node: Node) -> Result<NodeId, GraphError> {
        if self.id_in_use(node.id.0) {
            return Err(GraphError::DuplicateId(node.id.0));
        }
        let id = node.id;
        self.reserve_id(id.0)?;
        node.normalize_ports();
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and its connections.
    ///
    /// Fixed nodes are removed like any other; protecting them is up to the
    /// caller.
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        let before = self.connections.len();
        self.connections.retain(|_, c| !c.involves_node(node_id));
        tracing::debug!(
            "Removed {} with {} incident connection(s)",
            node_id,
            before - self.connections.len()
        );

        self.nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))
    }

    fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(&node_id).ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes, oldest first
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replace the display title
    pub fn set_title(&mut self, node_id: NodeId, title: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(node_id)?.title = title.into();
        Ok(())
    }

    /// Move a node by a canvas-space delta
    pub fn move_node(&mut self, node_id: NodeId, delta: Vec2) -> Result<(), GraphError> {
        let node = self.node_mut(node_id)?;
        node.position[0] += delta.x;
        node.position[1] += delta.y;
        Ok(())
    }

    /// Place a node at an absolute canvas position
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.node_mut(node_id)?.position = position;
        Ok(())
    }

    /// Flip the expanded state of a node's details footer, returning the new state
    pub fn toggle_expanded(&mut self, node_id: NodeId) -> Result<bool, GraphError> {
        let node = self.node_mut(node_id)?;
        if node.has_details() {
            node.expanded = !node.expanded;
        }
        Ok(node.expanded)
    }

    /// Store a new value in an inline field input
    pub fn set_field_value(
        &mut self,
        node_id: NodeId,
        input: usize,
        value: FieldValue,
    ) -> Result<(), GraphError> {
        let port = self
            .node_mut(node_id)?
            .inputs
            .get_mut(input)
            .ok_or(GraphError::PortNotFound { node: node_id, index: input })?;

        let Some(kind) = port.port_type.field_kind() else {
            return Err(GraphError::NotAField { node: node_id, index: input });
        };
        if value.kind() != kind {
            return Err(GraphError::TypeMismatch {
                expected: kind.to_string(),
                found: value.kind().to_string(),
            });
        }

        port.value = Some(value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Validate that an output may be wired to an input
    pub fn check_connection(
        &self,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<(), GraphError> {
        let source = self.node(from_node)?;
        let target = self.node(to_node)?;

        let source_type = source
            .output_type(from_port)
            .ok_or(GraphError::PortNotFound { node: from_node, index: from_port })?;
        let target_type = target
            .input_type(to_port)
            .ok_or(GraphError::PortNotFound { node: to_node, index: to_port })?;

        if !source_type.is_connectable() {
            return Err(GraphError::NotConnectable { node: from_node, index: from_port });
        }
        if !target_type.is_connectable() {
            return Err(GraphError::NotConnectable { node: to_node, index: to_port });
        }

        check_types(source_type, target_type)
    }

    /// Wire an output to an input.
    ///
    /// An input holds at most one wire, so any connection already ending at
    /// the destination is removed first.
    pub fn add_connection(
        &mut self,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<ConnectionId, GraphError> {
        self.check_connection(from_node, from_port, to_node, to_port)?;
        let id = ConnectionId(self.allocate_id()?);

        if let Some(existing) = self.incoming(to_node, to_port).map(|c| c.id) {
            tracing::debug!("Replacing {} on {} input {}", existing, to_node, to_port);
            self.connections.shift_remove(&existing);
        }

        self.connections.insert(
            id,
            Connection {
                id,
                from_node,
                from_port,
                to_node,
                to_port,
            },
        );
        tracing::debug!("Connected {}:{} -> {}:{} as {}", from_node, from_port, to_node, to_port, id);
        Ok(id)
    }

    /// Insert a connection that already carries an id (used by document import)
    pub(crate) fn insert_connection(&mut self, connection: Connection) -> Result<ConnectionId, GraphError> {
        if self.id_in_use(connection.id.0) {
            return Err(GraphError::DuplicateId(connection.id.0));
        }
        self.check_connection(
            connection.from_node,
            connection.from_port,
            connection.to_node,
            connection.to_port,
        )?;
        self.reserve_id(connection.id.0)?;
        if let Some(existing) = self.incoming(connection.to_node, connection.to_port).map(|c| c.id) {
            self.connections.shift_remove(&existing);
        }

        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Result<Connection, GraphError> {
        let removed = self
            .connections
            .shift_remove(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))?;
        tracing::debug!("Removed {}", connection_id);
        Ok(removed)
    }

    /// Re-point an existing connection, keeping its id
    pub fn update_connection(
        &mut self,
        connection_id: ConnectionId,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<(), GraphError> {
        if !self.connections.contains_key(&connection_id) {
            return Err(GraphError::ConnectionNotFound(connection_id));
        }
        self.check_connection(from_node, from_port, to_node, to_port)?;

        let occupant = self
            .incoming(to_node, to_port)
            .map(|c| c.id)
            .filter(|id| *id != connection_id);
        if let Some(occupant) = occupant {
            tracing::debug!("Replacing {} on {} input {}", occupant, to_node, to_port);
            self.connections.shift_remove(&occupant);
        }

        let connection = self
            .connections
            .get_mut(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))?;
        connection.from_node = from_node;
        connection.from_port = from_port;
        connection.to_node = to_node;
        connection.to_port = to_port;
        tracing::debug!("Re-pointed {} to {}:{} -> {}:{}", connection_id, from_node, from_port, to_node, to_port);
        Ok(())
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Result<&Connection, GraphError> {
        self.connections
            .get(&connection_id)
            .ok_or(GraphError::ConnectionNotFound(connection_id))
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// The connection ending at an input, if any
    pub fn incoming(&self, node_id: NodeId, input: usize) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.to_node == node_id && c.to_port == input)
    }

    /// Connections leaving an output
    pub fn outgoing(&self, node_id: NodeId, output: usize) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| c.from_node == node_id && c.from_port == output)
    }

    /// Whether an input has a wire attached
    pub fn is_input_connected(&self, node_id: NodeId, input: usize) -> bool {
        self.incoming(node_id, input).is_some()
    }

    /// Whether an output has at least one wire attached
    pub fn is_output_connected(&self, node_id: NodeId, output: usize) -> bool {
        self.outgoing(node_id, output).next().is_some()
    }
}

fn check_types(source: &PortType, target: &PortType) -> Result<(), GraphError> {
    if source == target {
        Ok(())
    } else {
        Err(GraphError::TypeMismatch {
            expected: target.to_string(),
            found: source.to_string(),
        })
    }
}

/// Error raised by graph operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node {0} does not exist")]
    NodeNotFound(NodeId),

    /// Connection not found
    #[error("Connection {0} does not exist")]
    ConnectionNotFound(ConnectionId),

    /// Port index out of range
    #[error("{node} has no port at index {index}")]
    PortNotFound {
        /// Node that was addressed
        node: NodeId,
        /// Requested port index
        index: usize,
    },

    /// Declared types differ
    #[error("Cannot join different data types: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type the destination accepts
        expected: String,
        /// Type that was offered
        found: String,
    },

    /// Port is an inline field and cannot take wires
    #[error("{node} port {index} is an inline field and cannot be connected")]
    NotConnectable {
        /// Node that was addressed
        node: NodeId,
        /// Port index
        index: usize,
    },

    /// Port is a data port, not an inline field
    #[error("{node} input {index} is not an editable field")]
    NotAField {
        /// Node that was addressed
        node: NodeId,
        /// Input index
        index: usize,
    },

    /// Id already used by another node or connection
    #[error("Id {0} is already in use")]
    DuplicateId(u64),

    /// No id is left to hand out
    #[error("Id space exhausted")]
    IdSpaceExhausted,
}
