// SPDX-License-Identifier: MIT OR Apache-2.0
//! The flow graph widget.
//!
//! [`FlowGraph`] bundles the graph store with the viewport, interaction
//! state and context menu, and is the type hosts talk to. Input handling
//! lives in [`crate::interaction`], projection in [`crate::scene`] and
//! document exchange in [`crate::document`].

use crate::config::FlowGraphConfig;
use crate::connection::{Connection, ConnectionId};
use crate::context_menu::{CommandRef, ContextMenu};
use crate::graph::{Graph, GraphError};
use crate::interaction::{DragMode, Focus, Interaction};
use crate::node::{Node, NodeDesc, NodeId};
use crate::port::{FieldKind, FieldValue};
use crate::viewport::{Viewport, ZoomDirection};
use egui::{Pos2, Vec2};
use serde::Serialize;
use std::fmt;

/// Notification sent after an inline field changes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueChanged {
    /// Node owning the field
    pub node_id: NodeId,
    /// Field name
    pub target_name: String,
    /// Field kind
    pub target_type: FieldKind,
    /// New value
    pub value: FieldValue,
}

type ValueChangedHandler = Box<dyn FnMut(&ValueChanged)>;

/// Node graph editor state
pub struct FlowGraph {
    pub(crate) config: FlowGraphConfig,
    pub(crate) graph: Graph,
    pub(crate) viewport: Viewport,
    pub(crate) interaction: Interaction,
    pub(crate) menu: ContextMenu,
    value_changed: Option<ValueChangedHandler>,
}

impl fmt::Debug for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowGraph")
            .field("graph", &self.graph)
            .field("viewport", &self.viewport)
            .field("interaction", &self.interaction)
            .field("menu", &self.menu)
            .finish_non_exhaustive()
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new(FlowGraphConfig::default())
    }
}

impl FlowGraph {
    /// Create an empty editor
    pub fn new(mut config: FlowGraphConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!("{err}; falling back to the default zoom settings");
            let defaults = FlowGraphConfig::default();
            config.zoom_min = defaults.zoom_min;
            config.zoom_max = defaults.zoom_max;
            config.zoom_step = defaults.zoom_step;
        }
        let viewport = Viewport::new(&config);
        Self {
            config,
            graph: Graph::new(),
            viewport,
            interaction: Interaction::default(),
            menu: ContextMenu::new(),
            value_changed: None,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &FlowGraphConfig {
        &self.config
    }

    /// The graph store
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Viewport transform
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Interaction state
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Current drag mode
    pub fn drag_mode(&self) -> DragMode {
        self.interaction.mode
    }

    /// Element that receives keyboard deletion
    pub fn focus(&self) -> Option<Focus> {
        self.interaction.focus
    }

    /// Context menu state
    pub fn context_menu(&self) -> &ContextMenu {
        &self.menu
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    /// Change the widget size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.config.size = [width, height];
        self.viewport.resize(width, height);
    }

    /// Pan the view by a screen-pixel delta
    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    /// Step the zoom keeping the pan origin fixed
    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.viewport.zoom(direction);
    }

    /// Step the zoom keeping a screen point fixed
    pub fn zoom_at(&mut self, direction: ZoomDirection, anchor: Pos2) {
        self.viewport.zoom_at(direction, anchor);
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node
    pub fn add_node(&mut self, desc: NodeDesc) -> Result<NodeId, GraphError> {
        self.graph.add_node(desc)
    }

    /// Remove a node and every connection touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        let node = self.graph.remove_node(node_id)?;
        self.forget_removed();
        Ok(node)
    }

    /// Get a node
    pub fn node(&self, node_id: NodeId) -> Result<&Node, GraphError> {
        self.graph.node(node_id)
    }

    /// Rename a node
    pub fn set_title(&mut self, node_id: NodeId, title: impl Into<String>) -> Result<(), GraphError> {
        self.graph.set_title(node_id, title)
    }

    /// Move a node to a canvas position
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> Result<(), GraphError> {
        self.graph.set_position(node_id, position)
    }

    /// Show or hide a node's details area
    pub fn toggle_expanded(&mut self, node_id: NodeId) -> Result<bool, GraphError> {
        self.graph.toggle_expanded(node_id)
    }

    /// Set an inline field and notify the value-changed handler
    pub fn set_field_value(
        &mut self,
        node_id: NodeId,
        input: usize,
        value: FieldValue,
    ) -> Result<(), GraphError> {
        self.graph.set_field_value(node_id, input, value.clone())?;

        let port = self
            .graph
            .node(node_id)?
            .input(input)
            .ok_or(GraphError::PortNotFound { node: node_id, index: input })?;
        let event = ValueChanged {
            node_id,
            target_name: port.name.clone(),
            target_type: value.kind(),
            value,
        };
        tracing::debug!("{} field {:?} changed to {:?}", node_id, event.target_name, event.value);
        if let Some(handler) = self.value_changed.as_mut() {
            handler(&event);
        }
        Ok(())
    }

    /// Install the handler for field changes, replacing any previous one
    pub fn on_value_changed(&mut self, handler: impl FnMut(&ValueChanged) + 'static) {
        self.value_changed = Some(Box::new(handler));
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Wire an output to an input, replacing any wire already on it
    pub fn add_connection(
        &mut self,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<ConnectionId, GraphError> {
        let id = self
            .graph
            .add_connection(from_node, from_port, to_node, to_port)?;
        self.forget_removed();
        Ok(id)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Result<Connection, GraphError> {
        let connection = self.graph.remove_connection(connection_id)?;
        self.forget_removed();
        Ok(connection)
    }

    /// Re-point a connection, keeping its id
    pub fn update_connection(
        &mut self,
        connection_id: ConnectionId,
        from_node: NodeId,
        from_port: usize,
        to_node: NodeId,
        to_port: usize,
    ) -> Result<(), GraphError> {
        self.graph
            .update_connection(connection_id, from_node, from_port, to_node, to_port)?;
        self.forget_removed();
        Ok(())
    }

    /// Get a connection
    pub fn connection(&self, connection_id: ConnectionId) -> Result<&Connection, GraphError> {
        self.graph.connection(connection_id)
    }

    // ------------------------------------------------------------------
    // Context menu
    // ------------------------------------------------------------------

    /// Register a context menu command
    pub fn register_command(
        &mut self,
        group: impl Into<String>,
        label: impl Into<String>,
        callback: impl FnMut(&mut Graph, Pos2) + 'static,
    ) -> CommandRef {
        self.menu.register(group, label, callback)
    }

    /// Replace the context menu search text
    pub fn set_menu_search(&mut self, text: impl Into<String>) {
        self.menu.set_search(text);
    }

    /// Run a context menu command at the menu position
    pub fn invoke_command(&mut self, command: CommandRef) -> bool {
        let ran = self.menu.invoke(command, &mut self.graph);
        if ran {
            self.forget_removed();
        }
        ran
    }

    /// Close the context menu
    pub fn close_menu(&mut self) {
        self.menu.close();
    }

    /// Remove every node and connection
    pub fn clear(&mut self) {
        self.graph.clear();
        self.interaction = Interaction::default();
        self.menu.close();
    }

    /// Drop focus and drag state that point at elements no longer stored
    pub(crate) fn forget_removed(&mut self) {
        let graph = &self.graph;
        let node_exists = |id: NodeId| graph.contains_node(id);
        let connection_exists = |id: ConnectionId| graph.connection(id).is_ok();

        let focus_alive = match self.interaction.focus {
            Some(Focus::Node(id)) => node_exists(id),
            Some(Focus::Connection(id)) => connection_exists(id),
            None => true,
        };
        if !focus_alive {
            self.interaction.focus = None;
        }

        let mode_alive = match self.interaction.mode {
            DragMode::None | DragMode::Canvas => true,
            DragMode::Node { node } => node_exists(node),
            DragMode::ConnectionFromOutput { source, .. } => node_exists(source.node),
            DragMode::ConnectionFromInput { dest, picked, .. } => {
                node_exists(dest.node) && picked.map_or(true, |c| connection_exists(c.id))
            }
            DragMode::SelectingConnection { connection } => connection_exists(connection),
        };
        if !mode_alive {
            tracing::debug!("Cancelled {:?}: its target was removed", self.interaction.mode);
            self.interaction.mode = DragMode::None;
        }
    }
}
