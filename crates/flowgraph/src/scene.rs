// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual projection of the graph.
//!
//! A [`Scene`] is rebuilt from the graph and interaction state whenever it
//! is needed and nothing is ever read back from it. Renderers draw it;
//! hit testing walks it.

use crate::connection::ConnectionId;
use crate::graph::Graph;
use crate::interaction::{Focus, Hit, Interaction};
use crate::layout::{node_layout, NodeLayout, WireCurve};
use crate::node::{Node, NodeId};
use crate::port::{FieldValue, PortRef};
use crate::widget::FlowGraph;
use egui::{Pos2, Rect};
use std::collections::HashMap;

/// One drawn port
#[derive(Debug, Clone, PartialEq)]
pub struct PortVisual {
    /// Circle centre
    pub anchor: Pos2,
    /// Text beside the circle
    pub label: String,
    /// Whether a wire is attached
    pub connected: bool,
    /// Type color
    pub color: [u8; 3],
    /// Inline field editor area and current value
    pub field: Option<(Rect, FieldValue)>,
}

/// One drawn node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeVisual {
    /// Node id
    pub id: NodeId,
    /// Title bar text
    pub title: String,
    /// Geometry
    pub layout: NodeLayout,
    /// Input ports
    pub inputs: Vec<PortVisual>,
    /// Output ports
    pub outputs: Vec<PortVisual>,
    /// Cannot be deleted from the keyboard
    pub fixed: bool,
    /// Being dragged
    pub selected: bool,
    /// Receives keyboard deletion
    pub focused: bool,
    /// Details area shown
    pub expanded: bool,
    /// Details text, if any
    pub details: Option<String>,
}

/// One drawn wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireVisual {
    /// Connection id
    pub id: ConnectionId,
    /// Curve in canvas space
    pub curve: WireCurve,
    /// Receives keyboard deletion
    pub focused: bool,
    /// Color of the source port type
    pub color: [u8; 3],
}

/// Everything a renderer needs for one frame, in canvas space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Nodes, bottom to top
    pub nodes: Vec<NodeVisual>,
    /// Committed wires
    pub wires: Vec<WireVisual>,
    /// Wire following the pointer during a connection drag
    pub preview: Option<WireCurve>,
}

impl Scene {
    /// Project the graph and interaction state
    pub fn build(graph: &Graph, interaction: &Interaction, droop: f32) -> Self {
        let detached = interaction.detached();
        let preview_source = interaction.preview();
        let focus = interaction.focus();
        let highlight = Highlight {
            detached,
            dragging_from: preview_source.map(|(source, _)| source),
            selected: interaction.selected(),
            focus,
        };

        let layouts: HashMap<NodeId, NodeLayout> =
            graph.nodes().map(|node| (node.id, node_layout(node))).collect();

        let nodes = graph
            .nodes()
            .filter_map(|node| {
                let layout = layouts.get(&node.id)?.clone();
                Some(node_visual(graph, node, layout, &highlight))
            })
            .collect();

        let wires = graph
            .connections()
            .filter(|c| Some(c.id) != detached)
            .filter_map(|c| {
                let from = *layouts.get(&c.from_node)?.outputs.get(c.from_port)?;
                let to = *layouts.get(&c.to_node)?.inputs.get(c.to_port)?;
                let color = graph.node(c.from_node).ok()?.output_type(c.from_port)?.color();
                Some(WireVisual {
                    id: c.id,
                    curve: WireCurve::new(from, to, droop),
                    focused: focus == Some(Focus::Connection(c.id)),
                    color,
                })
            })
            .collect();

        let preview = preview_source.and_then(|(source, pointer)| {
            let from = *layouts.get(&source.node)?.outputs.get(source.index)?;
            Some(WireCurve::new(from, pointer, droop))
        });

        Self {
            nodes,
            wires,
            preview,
        }
    }

    /// Visual of a node
    pub fn node(&self, id: NodeId) -> Option<&NodeVisual> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Union of all node rectangles
    pub fn bounds(&self) -> Option<Rect> {
        self.nodes
            .iter()
            .map(|n| n.layout.rect)
            .reduce(|a, b| a.union(b))
    }

    /// Element under a canvas point. Topmost node first, then wires.
    pub fn hit(&self, pos: Pos2, port_radius: f32, wire_width: f32) -> Hit {
        for node in self.nodes.iter().rev() {
            let layout = &node.layout;
            if let Some(i) = closest_port(&node.inputs, pos, port_radius) {
                if node.inputs[i].field.is_none() {
                    return Hit::Input(PortRef::input(node.id, i));
                }
            }
            if let Some(i) = closest_port(&node.outputs, pos, port_radius) {
                return Hit::Output(PortRef::output(node.id, i));
            }
            if !layout.rect.contains(pos) {
                continue;
            }
            if layout.footer.is_some_and(|footer| footer.contains(pos)) {
                return Hit::ExpandToggle(node.id);
            }
            let field = node
                .inputs
                .iter()
                .position(|p| p.field.as_ref().is_some_and(|(rect, _)| rect.contains(pos)));
            if let Some(i) = field {
                return Hit::Field(PortRef::input(node.id, i));
            }
            return Hit::Node(node.id);
        }

        self.wires
            .iter()
            .rev()
            .map(|w| (w.id, w.curve.distance_to(pos)))
            .filter(|(_, distance)| *distance <= wire_width)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(Hit::Canvas, |(id, _)| Hit::Wire(id))
    }
}

fn closest_port(ports: &[PortVisual], pos: Pos2, radius: f32) -> Option<usize> {
    ports
        .iter()
        .enumerate()
        .map(|(i, p)| (i, p.anchor.distance(pos)))
        .filter(|(_, distance)| *distance <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Interaction state that changes how nodes are drawn
struct Highlight {
    detached: Option<ConnectionId>,
    dragging_from: Option<PortRef>,
    selected: Option<NodeId>,
    focus: Option<Focus>,
}

fn node_visual(graph: &Graph, node: &Node, layout: NodeLayout, highlight: &Highlight) -> NodeVisual {
    let inputs = node
        .inputs
        .iter()
        .enumerate()
        .map(|(i, port)| PortVisual {
            anchor: layout.inputs[i],
            label: port.label(),
            connected: graph
                .incoming(node.id, i)
                .is_some_and(|c| Some(c.id) != highlight.detached),
            color: port.port_type.color(),
            field: layout.fields[i].zip(port.value.clone()),
        })
        .collect();
    let outputs = node
        .outputs
        .iter()
        .enumerate()
        .map(|(i, port)| PortVisual {
            anchor: layout.outputs[i],
            label: port.label(),
            connected: graph.is_output_connected(node.id, i)
                || highlight.dragging_from == Some(PortRef::output(node.id, i)),
            color: port.port_type.color(),
            field: None,
        })
        .collect();

    NodeVisual {
        id: node.id,
        title: node.title.clone(),
        inputs,
        outputs,
        fixed: node.fixed,
        selected: highlight.selected == Some(node.id),
        focused: highlight.focus == Some(Focus::Node(node.id)),
        expanded: node.expanded,
        details: node.details.clone(),
        layout,
    }
}

impl FlowGraph {
    /// Project the current state for drawing
    pub fn scene(&self) -> Scene {
        Scene::build(&self.graph, &self.interaction, self.config.wire_droop)
    }

    /// Element under a screen point
    pub fn hit_test(&self, screen: Pos2) -> Hit {
        if self.menu.contains(screen, self.config.context_menu_size.into()) {
            return Hit::Menu;
        }
        let canvas = self.viewport.to_canvas(screen);
        self.scene()
            .hit(canvas, self.config.port_hit_radius, self.config.wire_hit_width)
    }
}
