// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer and keyboard interaction.
//!
//! Input arrives as [`InputEvent`]s in screen space. Each event is handled
//! to completion against the graph, viewport and context menu; visuals are
//! not touched here and are re-projected by [`FlowGraph::scene`].

use crate::connection::{Connection, ConnectionId};
use crate::config::ZoomAnchor;
use crate::node::NodeId;
use crate::port::PortRef;
use crate::viewport::ZoomDirection;
use crate::widget::FlowGraph;
use egui::Pos2;

/// Pointer button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Left button
    Primary,
    /// Right button
    Secondary,
    /// Wheel button
    Middle,
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Escape
    Escape,
    /// Anything else
    Other,
}

/// Host input, in screen coordinates relative to the widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed
    PointerDown {
        /// Pointer position
        pos: Pos2,
        /// Button
        button: PointerButton,
    },
    /// Pointer moved
    PointerMove {
        /// Pointer position
        pos: Pos2,
    },
    /// Button released
    PointerUp {
        /// Pointer position
        pos: Pos2,
        /// Button
        button: PointerButton,
    },
    /// Mouse wheel
    Wheel {
        /// Pointer position
        pos: Pos2,
        /// Vertical scroll amount; positive scrolls down
        delta_y: f32,
    },
    /// Key pressed
    Key {
        /// Key
        key: Key,
        /// Whether a text input currently owns the keyboard
        text_input_focused: bool,
    },
}

/// What lies under a screen point, topmost first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// The open context menu
    Menu,
    /// An input port circle
    Input(PortRef),
    /// An output port circle
    Output(PortRef),
    /// An inline field editor
    Field(PortRef),
    /// The expand/collapse footer of a node
    ExpandToggle(NodeId),
    /// Any other part of a node
    Node(NodeId),
    /// A wire
    Wire(ConnectionId),
    /// Empty canvas
    Canvas,
}

/// Current drag mode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragMode {
    /// Nothing in progress
    #[default]
    None,
    /// Panning the view
    Canvas,
    /// Moving a node
    Node {
        /// Node being dragged
        node: NodeId,
    },
    /// Dragging from an input; an attached wire is picked up
    ConnectionFromInput {
        /// Input the drag started on
        dest: PortRef,
        /// Wire lifted off that input
        picked: Option<Connection>,
        /// Pointer in canvas space
        pointer: Pos2,
    },
    /// Dragging a new wire out of an output
    ConnectionFromOutput {
        /// Output the wire starts at
        source: PortRef,
        /// Pointer in canvas space
        pointer: Pos2,
    },
    /// A wire was pressed and is selected on release
    SelectingConnection {
        /// Pressed wire
        connection: ConnectionId,
    },
}

/// Element that receives keyboard deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// A node
    Node(NodeId),
    /// A wire
    Connection(ConnectionId),
}

/// Interaction state
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    pub(crate) mode: DragMode,
    pub(crate) focus: Option<Focus>,
    pub(crate) last_pointer: Pos2,
}

impl Interaction {
    /// Current drag mode
    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Focused element
    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Node being dragged
    pub fn selected(&self) -> Option<NodeId> {
        match self.mode {
            DragMode::Node { node } => Some(node),
            _ => None,
        }
    }

    /// Wire currently lifted off its input
    pub fn detached(&self) -> Option<ConnectionId> {
        match self.mode {
            DragMode::ConnectionFromInput {
                picked: Some(connection),
                ..
            } => Some(connection.id),
            _ => None,
        }
    }

    /// Source port and pointer position of the wire following the pointer
    pub fn preview(&self) -> Option<(PortRef, Pos2)> {
        match self.mode {
            DragMode::ConnectionFromOutput { source, pointer } => Some((source, pointer)),
            DragMode::ConnectionFromInput {
                picked: Some(connection),
                pointer,
                ..
            } => Some((connection.source(), pointer)),
            _ => None,
        }
    }
}

impl FlowGraph {
    /// Feed one input event through the state machine
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { pos, button } => self.pointer_down(pos, button),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp { pos, button } => {
                if button == PointerButton::Primary {
                    self.pointer_up(pos);
                }
            }
            InputEvent::Wheel { pos, delta_y } => self.wheel(pos, delta_y),
            InputEvent::Key {
                key,
                text_input_focused,
            } => self.key(key, text_input_focused),
        }
    }

    fn pointer_down(&mut self, pos: Pos2, button: PointerButton) {
        self.interaction.last_pointer = pos;
        let hit = self.hit_test(pos);

        match button {
            PointerButton::Primary => {}
            PointerButton::Secondary => {
                if hit != Hit::Menu {
                    let canvas = self.viewport.to_canvas(pos);
                    self.menu.open(
                        pos,
                        canvas,
                        self.viewport.size(),
                        self.config.context_menu_size.into(),
                    );
                    tracing::debug!("Opened context menu at ({}, {})", canvas.x, canvas.y);
                }
                return;
            }
            PointerButton::Middle => return,
        }

        if hit == Hit::Menu {
            return;
        }
        self.menu.close();
        self.interaction.focus = None;

        let canvas = self.viewport.to_canvas(pos);
        let mode = match hit {
            Hit::Input(dest) => DragMode::ConnectionFromInput {
                dest,
                picked: self.graph.incoming(dest.node, dest.index).copied(),
                pointer: canvas,
            },
            Hit::Output(source) => DragMode::ConnectionFromOutput {
                source,
                pointer: canvas,
            },
            Hit::ExpandToggle(node) => {
                if let Err(err) = self.graph.toggle_expanded(node) {
                    tracing::warn!("Expand toggle on missing node: {err}");
                }
                DragMode::None
            }
            Hit::Node(node) => DragMode::Node { node },
            Hit::Field(port) => DragMode::Node { node: port.node },
            Hit::Wire(connection) => DragMode::SelectingConnection { connection },
            Hit::Canvas => DragMode::Canvas,
            Hit::Menu => DragMode::None,
        };
        tracing::debug!("Pointer down on {:?} -> {:?}", hit, mode);
        self.interaction.mode = mode;
    }

    fn pointer_move(&mut self, pos: Pos2) {
        let delta = pos - self.interaction.last_pointer;
        self.interaction.last_pointer = pos;

        let canvas = self.viewport.to_canvas(pos);
        match self.interaction.mode {
            DragMode::Canvas => self.viewport.pan(delta),
            DragMode::Node { node } => {
                let canvas_delta = delta / self.viewport.scale();
                if let Err(err) = self.graph.move_node(node, canvas_delta) {
                    tracing::warn!("Dragged node vanished: {err}");
                    self.interaction.mode = DragMode::None;
                }
            }
            DragMode::ConnectionFromOutput {
                ref mut pointer, ..
            }
            | DragMode::ConnectionFromInput {
                ref mut pointer, ..
            } => *pointer = canvas,
            DragMode::None | DragMode::SelectingConnection { .. } => {}
        }
    }

    fn pointer_up(&mut self, pos: Pos2) {
        self.interaction.last_pointer = pos;
        let mode = std::mem::take(&mut self.interaction.mode);
        // Hit-test after the drag has ended so a lifted wire is back in place
        let hit = self.hit_test(pos);

        match mode {
            DragMode::ConnectionFromOutput { source, .. } => match hit {
                Hit::Input(dest) => self.drop_output_on_input(source, dest),
                _ => tracing::debug!("Discarded wire preview from {:?}", source),
            },
            DragMode::ConnectionFromInput {
                picked: Some(connection),
                ..
            } => self.drop_picked_wire(connection, hit),
            DragMode::Node { node } => {
                if self.graph.contains_node(node) {
                    self.interaction.focus = Some(Focus::Node(node));
                }
            }
            DragMode::SelectingConnection { connection } => {
                if self.graph.connection(connection).is_ok() {
                    self.interaction.focus = Some(Focus::Connection(connection));
                }
            }
            DragMode::ConnectionFromInput { picked: None, .. } | DragMode::Canvas | DragMode::None => {}
        }
    }

    /// Commit a wire dragged out of an output. An occupied input keeps its
    /// connection id and is re-pointed at the new source.
    fn drop_output_on_input(&mut self, source: PortRef, dest: PortRef) {
        let occupant = self.graph.incoming(dest.node, dest.index).map(|c| c.id);
        let result = match occupant {
            Some(existing) => self
                .graph
                .update_connection(existing, source.node, source.index, dest.node, dest.index)
                .map(|()| existing),
            None => self
                .graph
                .add_connection(source.node, source.index, dest.node, dest.index),
        };
        match result {
            Ok(_) => self.forget_removed(),
            Err(err) => tracing::debug!("Rejected wire {:?} -> {:?}: {err}", source, dest),
        }
    }

    /// Commit a wire lifted off an input; dropping it anywhere but a
    /// compatible input deletes it.
    fn drop_picked_wire(&mut self, connection: Connection, hit: Hit) {
        if let Hit::Input(dest) = hit {
            match self.graph.update_connection(
                connection.id,
                connection.from_node,
                connection.from_port,
                dest.node,
                dest.index,
            ) {
                Ok(()) => {
                    self.forget_removed();
                    return;
                }
                Err(err) => tracing::debug!("Rejected re-pointing {}: {err}", connection.id),
            }
        }
        if let Err(err) = self.remove_connection(connection.id) {
            tracing::warn!("Lifted wire already gone: {err}");
        }
    }

    fn wheel(&mut self, pos: Pos2, delta_y: f32) {
        if self.menu.contains(pos, self.config.context_menu_size.into()) {
            return;
        }
        let direction = ZoomDirection::from_wheel(delta_y);
        match self.config.zoom_anchor {
            ZoomAnchor::Origin => self.viewport.zoom(direction),
            ZoomAnchor::Cursor => self.viewport.zoom_at(direction, pos),
        }
    }

    fn key(&mut self, key: Key, text_input_focused: bool) {
        match key {
            Key::Delete | Key::Backspace => {
                if !text_input_focused {
                    self.delete_focused();
                }
            }
            Key::Escape => self.menu.close(),
            Key::Other => {}
        }
    }

    /// Remove the focused node or wire. Fixed nodes stay.
    pub fn delete_focused(&mut self) {
        let Some(focus) = self.interaction.focus else {
            return;
        };

        match focus {
            Focus::Node(node) => match self.graph.node(node) {
                Ok(record) if record.fixed => {
                    tracing::debug!("{} is fixed and cannot be deleted", node);
                }
                Ok(_) => {
                    if let Err(err) = self.remove_node(node) {
                        tracing::warn!("Delete failed: {err}");
                    }
                }
                Err(_) => self.interaction.focus = None,
            },
            Focus::Connection(connection) => {
                if let Err(err) = self.remove_connection(connection) {
                    tracing::debug!("Dropping stale focus: {err}");
                    self.interaction.focus = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowGraphConfig;
    use crate::layout::node_layout;
    use crate::node::NodeDesc;
    use crate::port::Port;
    use egui::{vec2, Vec2};

    struct Fixture {
        flow: FlowGraph,
        a: NodeId,
        b: NodeId,
    }

    fn fixture() -> Fixture {
        let mut flow = FlowGraph::new(FlowGraphConfig::with_size(1200.0, 800.0));
        let a = flow.add_node(
            NodeDesc::new("Color")
                .at(10.0, 10.0)
                .output(Port::data("Color", "float4")),
        ).unwrap();
        let b = flow.add_node(
            NodeDesc::new("Blend")
                .at(500.0, 60.0)
                .input(Port::data("Source", "float4"))
                .input(Port::data("Weight", "float"))
                .output(Port::data("Result", "float4")),
        ).unwrap();
        Fixture { flow, a, b }
    }

    fn output_pos(flow: &FlowGraph, node: NodeId, index: usize) -> Pos2 {
        let layout = node_layout(flow.node(node).unwrap());
        flow.viewport().to_screen(layout.outputs[index])
    }

    fn input_pos(flow: &FlowGraph, node: NodeId, index: usize) -> Pos2 {
        let layout = node_layout(flow.node(node).unwrap());
        flow.viewport().to_screen(layout.inputs[index])
    }

    fn drag(flow: &mut FlowGraph, from: Pos2, to: Pos2) {
        flow.handle_event(InputEvent::PointerDown {
            pos: from,
            button: PointerButton::Primary,
        });
        flow.handle_event(InputEvent::PointerMove { pos: from.lerp(to, 0.5) });
        flow.handle_event(InputEvent::PointerMove { pos: to });
        flow.handle_event(InputEvent::PointerUp {
            pos: to,
            button: PointerButton::Primary,
        });
    }

    fn press_delete(flow: &mut FlowGraph) {
        flow.handle_event(InputEvent::Key {
            key: Key::Delete,
            text_input_focused: false,
        });
    }

    #[test]
    fn test_drag_output_to_input_connects() {
        let Fixture { mut flow, a, b } = fixture();
        let from = output_pos(&flow, a, 0);
        let to = input_pos(&flow, b, 0);

        flow.handle_event(InputEvent::PointerDown {
            pos: from,
            button: PointerButton::Primary,
        });
        assert!(matches!(flow.drag_mode(), DragMode::ConnectionFromOutput { .. }));
        flow.handle_event(InputEvent::PointerMove { pos: to });
        assert!(flow.scene().preview.is_some());
        flow.handle_event(InputEvent::PointerUp {
            pos: to,
            button: PointerButton::Primary,
        });

        assert_eq!(flow.drag_mode(), DragMode::None);
        assert!(flow.scene().preview.is_none());
        assert!(flow.graph().is_input_connected(b, 0));
        assert!(flow.graph().is_output_connected(a, 0));
    }

    #[test]
    fn test_incompatible_drop_is_discarded() {
        let Fixture { mut flow, a, b } = fixture();
        let from = output_pos(&flow, a, 0);
        let to = input_pos(&flow, b, 1);
        drag(&mut flow, from, to);
        assert_eq!(flow.graph().connection_count(), 0);

        let empty = Pos2::new(900.0, 700.0);
        drag(&mut flow, from, empty);
        assert_eq!(flow.graph().connection_count(), 0);
    }

    #[test]
    fn test_picked_wire_dropped_on_empty_space_is_deleted() {
        let Fixture { mut flow, a, b } = fixture();
        flow.add_connection(a, 0, b, 0).unwrap();

        let from = input_pos(&flow, b, 0);
        flow.handle_event(InputEvent::PointerDown {
            pos: from,
            button: PointerButton::Primary,
        });
        assert!(flow.interaction().detached().is_some());
        flow.handle_event(InputEvent::PointerMove { pos: Pos2::new(900.0, 700.0) });
        assert!(!flow.scene().nodes[1].inputs[0].connected);
        flow.handle_event(InputEvent::PointerUp {
            pos: Pos2::new(900.0, 700.0),
            button: PointerButton::Primary,
        });

        assert_eq!(flow.graph().connection_count(), 0);
        assert!(!flow.graph().is_output_connected(a, 0));
    }

    #[test]
    fn test_picked_wire_moves_to_other_input_with_same_id() {
        let Fixture { mut flow, a, b } = fixture();
        let c = flow.add_node(
            NodeDesc::new("Blend")
                .at(500.0, 400.0)
                .input(Port::data("Source", "float4")),
        ).unwrap();
        let id = flow.add_connection(a, 0, b, 0).unwrap();

        let from = input_pos(&flow, b, 0);
        let to = input_pos(&flow, c, 0);
        drag(&mut flow, from, to);

        let connection = flow.connection(id).unwrap();
        assert_eq!(connection.to_node, c);
        assert!(!flow.graph().is_input_connected(b, 0));
    }

    #[test]
    fn test_picked_wire_dropped_on_incompatible_input_is_deleted() {
        let Fixture { mut flow, a, b } = fixture();
        flow.add_connection(a, 0, b, 0).unwrap();

        let from = input_pos(&flow, b, 0);
        let to = input_pos(&flow, b, 1);
        drag(&mut flow, from, to);
        assert_eq!(flow.graph().connection_count(), 0);
    }

    #[test]
    fn test_output_dropped_on_occupied_input_repoints() {
        let Fixture { mut flow, a, b } = fixture();
        let other = flow.add_node(
            NodeDesc::new("Other")
                .at(10.0, 300.0)
                .output(Port::data("Color", "float4")),
        ).unwrap();
        let id = flow.add_connection(a, 0, b, 0).unwrap();

        let from = output_pos(&flow, other, 0);
        let to = input_pos(&flow, b, 0);
        drag(&mut flow, from, to);

        assert_eq!(flow.graph().connection_count(), 1);
        assert_eq!(flow.connection(id).unwrap().from_node, other);
        assert!(!flow.graph().is_output_connected(a, 0));
    }

    #[test]
    fn test_node_drag_moves_and_focuses() {
        let Fixture { mut flow, a, .. } = fixture();
        let header = node_layout(flow.node(a).unwrap()).header.center();
        let start = flow.viewport().to_screen(header);

        flow.handle_event(InputEvent::PointerDown {
            pos: start,
            button: PointerButton::Primary,
        });
        assert_eq!(flow.interaction().selected(), Some(a));
        flow.handle_event(InputEvent::PointerMove { pos: start + vec2(30.0, 20.0) });
        flow.handle_event(InputEvent::PointerUp {
            pos: start + vec2(30.0, 20.0),
            button: PointerButton::Primary,
        });

        assert_eq!(flow.node(a).unwrap().position, [40.0, 30.0]);
        assert_eq!(flow.focus(), Some(Focus::Node(a)));
        assert_eq!(flow.interaction().selected(), None);
    }

    #[test]
    fn test_node_drag_respects_zoom() {
        let Fixture { mut flow, a, .. } = fixture();
        flow.handle_event(InputEvent::Wheel {
            pos: Pos2::new(600.0, 400.0),
            delta_y: 1.0,
        });
        flow.handle_event(InputEvent::Wheel {
            pos: Pos2::new(600.0, 400.0),
            delta_y: 1.0,
        });
        let scale = flow.viewport().scale();
        assert!((scale - 0.9).abs() < 1e-5);

        let header = node_layout(flow.node(a).unwrap()).header.center();
        let start = flow.viewport().to_screen(header);
        drag(&mut flow, start, start + vec2(18.0, 0.0));

        let x = flow.node(a).unwrap().position[0];
        assert!((x - (10.0 + 18.0 / scale)).abs() < 1e-3);
    }

    #[test]
    fn test_canvas_drag_pans() {
        let Fixture { mut flow, .. } = fixture();
        let before = flow.viewport().offset();
        drag(&mut flow, Pos2::new(900.0, 700.0), Pos2::new(860.0, 650.0));
        assert_eq!(flow.viewport().offset() - before, Vec2::new(-40.0, -50.0));
    }

    #[test]
    fn test_delete_focused_node_and_wire() {
        let Fixture { mut flow, a, b } = fixture();
        let id = flow.add_connection(a, 0, b, 0).unwrap();

        // Select the wire by clicking its midpoint
        let wire = flow.scene().wires[0].curve;
        let mid = flow.viewport().to_screen(wire.point(0.5));
        drag(&mut flow, mid, mid);
        assert_eq!(flow.focus(), Some(Focus::Connection(id)));

        press_delete(&mut flow);
        assert_eq!(flow.graph().connection_count(), 0);

        let header = flow.viewport().to_screen(node_layout(flow.node(b).unwrap()).header.center());
        drag(&mut flow, header, header);
        press_delete(&mut flow);
        assert!(flow.node(b).is_err());
    }

    #[test]
    fn test_replacing_focused_wire_drops_focus() {
        let Fixture { mut flow, a, b } = fixture();
        let c = flow.add_node(
            NodeDesc::new("Other")
                .at(10.0, 400.0)
                .output(Port::data("Color", "float4")),
        ).unwrap();
        let id = flow.add_connection(a, 0, b, 0).unwrap();
        let mid = flow.viewport().to_screen(flow.scene().wires[0].curve.point(0.5));
        drag(&mut flow, mid, mid);
        assert_eq!(flow.focus(), Some(Focus::Connection(id)));

        let replacement = flow.add_connection(c, 0, b, 0).unwrap();
        assert!(flow.connection(id).is_err());
        assert_eq!(flow.focus(), None);

        // The surviving wire is untouched by a later delete key
        press_delete(&mut flow);
        assert!(flow.connection(replacement).is_ok());
    }

    #[test]
    fn test_delete_clears_stale_wire_focus() {
        let Fixture { mut flow, .. } = fixture();
        flow.interaction.focus = Some(Focus::Connection(ConnectionId(99)));
        flow.delete_focused();
        assert_eq!(flow.focus(), None);
    }

    #[test]
    fn test_menu_command_replacing_focused_wire_drops_focus() {
        let Fixture { mut flow, a, b } = fixture();
        let id = flow.add_connection(a, 0, b, 0).unwrap();
        let command = flow.register_command("Edit", "Disconnect all", |graph, _| {
            let ids: Vec<_> = graph.connections().map(|c| c.id).collect();
            for id in ids {
                graph.remove_connection(id).unwrap();
            }
        });
        flow.interaction.focus = Some(Focus::Connection(id));

        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(900.0, 700.0),
            button: PointerButton::Secondary,
        });
        assert!(flow.invoke_command(command));
        assert_eq!(flow.graph().connection_count(), 0);
        assert_eq!(flow.focus(), None);
    }

    #[test]
    fn test_delete_ignored_while_typing_and_for_fixed_nodes() {
        let mut flow = FlowGraph::new(FlowGraphConfig::with_size(1200.0, 800.0));
        let output = flow.add_node(NodeDesc::new("Output").at(100.0, 100.0).fixed()).unwrap();
        let plain = flow.add_node(NodeDesc::new("Plain").at(100.0, 400.0)).unwrap();

        let header = flow.viewport().to_screen(node_layout(flow.node(output).unwrap()).header.center());
        drag(&mut flow, header, header);
        press_delete(&mut flow);
        assert!(flow.node(output).is_ok());

        let header = flow.viewport().to_screen(node_layout(flow.node(plain).unwrap()).header.center());
        drag(&mut flow, header, header);
        flow.handle_event(InputEvent::Key {
            key: Key::Backspace,
            text_input_focused: true,
        });
        assert!(flow.node(plain).is_ok());
        flow.handle_event(InputEvent::Key {
            key: Key::Backspace,
            text_input_focused: false,
        });
        assert!(flow.node(plain).is_err());
    }

    #[test]
    fn test_pointer_down_clears_focus() {
        let Fixture { mut flow, a, .. } = fixture();
        let header = flow.viewport().to_screen(node_layout(flow.node(a).unwrap()).header.center());
        drag(&mut flow, header, header);
        assert!(flow.focus().is_some());

        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(900.0, 700.0),
            button: PointerButton::Primary,
        });
        assert_eq!(flow.focus(), None);
    }

    #[test]
    fn test_right_click_opens_menu_and_left_click_closes_it() {
        let Fixture { mut flow, .. } = fixture();
        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(300.0, 300.0),
            button: PointerButton::Secondary,
        });
        assert!(flow.context_menu().is_open());

        // Clicks inside the menu leave it open
        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(310.0, 310.0),
            button: PointerButton::Primary,
        });
        assert!(flow.context_menu().is_open());

        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(900.0, 700.0),
            button: PointerButton::Primary,
        });
        assert!(!flow.context_menu().is_open());
    }

    #[test]
    fn test_wheel_over_menu_does_not_zoom() {
        let Fixture { mut flow, .. } = fixture();
        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(300.0, 300.0),
            button: PointerButton::Secondary,
        });
        flow.handle_event(InputEvent::Wheel {
            pos: Pos2::new(320.0, 320.0),
            delta_y: 1.0,
        });
        assert_eq!(flow.viewport().scale(), 1.0);

        flow.handle_event(InputEvent::Key {
            key: Key::Escape,
            text_input_focused: false,
        });
        assert!(!flow.context_menu().is_open());
    }

    #[test]
    fn test_cursor_anchored_wheel_keeps_point_under_pointer() {
        let config = FlowGraphConfig {
            zoom_anchor: ZoomAnchor::Cursor,
            ..FlowGraphConfig::with_size(1200.0, 800.0)
        };
        let mut flow = FlowGraph::new(config);
        let pointer = Pos2::new(400.0, 300.0);
        let before = flow.viewport().to_canvas(pointer);

        flow.handle_event(InputEvent::Wheel {
            pos: pointer,
            delta_y: -1.0,
        });
        assert!(flow.viewport().scale() > 1.0);
        let after = flow.viewport().to_canvas(pointer);
        assert!((after - before).length() < 1e-3, "{before:?} moved to {after:?}");

        // The default anchor keeps the pan origin instead
        let mut flow = FlowGraph::new(FlowGraphConfig::with_size(1200.0, 800.0));
        flow.handle_event(InputEvent::Wheel {
            pos: pointer,
            delta_y: -1.0,
        });
        assert_eq!(flow.viewport().to_screen(Pos2::ZERO), Pos2::ZERO);
    }

    #[test]
    fn test_expand_toggle() {
        let mut flow = FlowGraph::new(FlowGraphConfig::with_size(1200.0, 800.0));
        let n = flow.add_node(NodeDesc::new("Preview").at(100.0, 100.0).details("Output preview")).unwrap();
        let footer = node_layout(flow.node(n).unwrap()).footer.unwrap().center();
        let pos = flow.viewport().to_screen(footer);

        drag(&mut flow, pos, pos);
        assert!(flow.node(n).unwrap().expanded);
        drag(&mut flow, pos, pos);
        assert!(!flow.node(n).unwrap().expanded);
    }
}
