// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node geometry and wire curves, in canvas space.
//!
//! Everything here is a pure function of node records, so layouts are
//! recomputed on every projection instead of being cached.

use crate::node::Node;
use egui::{Pos2, Rect, Vec2};

/// Node visual dimensions
pub const HEADER_HEIGHT: f32 = 28.0;
/// Height of one port row
pub const ROW_HEIGHT: f32 = 26.0;
/// Height of the expand/collapse footer
pub const FOOTER_HEIGHT: f32 = 20.0;
/// Extra height of an expanded details area
pub const EXPANDED_HEIGHT: f32 = 150.0;
/// Radius of a port circle
pub const PORT_RADIUS: f32 = 6.0;
/// Distance of a port centre from the node edge
pub const PORT_INSET: f32 = 10.0;

const BASE_WIDTH: f32 = 60.0;
const CHAR_WIDTH: f32 = 7.0;
const TITLE_CHAR_WIDTH: f32 = 8.0;
const MIN_LABEL_CHARS: usize = 5;
const FIELD_WIDTH: f32 = 80.0;
const WIRE_SAMPLES: usize = 24;

/// Computed geometry of one node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    /// Whole node
    pub rect: Rect,
    /// Title bar
    pub header: Rect,
    /// Centre of each input circle
    pub inputs: Vec<Pos2>,
    /// Centre of each output circle
    pub outputs: Vec<Pos2>,
    /// Editor area of inline field inputs (`None` for data inputs)
    pub fields: Vec<Option<Rect>>,
    /// Expand/collapse footer, when the node has details
    pub footer: Option<Rect>,
    /// Details area, when expanded
    pub details: Option<Rect>,
}

fn column_chars(labels: impl Iterator<Item = usize>) -> Option<usize> {
    labels.fold(None, |longest, len| Some(longest.unwrap_or(MIN_LABEL_CHARS).max(len)))
}

/// Lay out a node at its stored position
pub fn node_layout(node: &Node) -> NodeLayout {
    let origin = Pos2::new(node.position[0], node.position[1]);

    let input_chars = column_chars(node.inputs.iter().map(|p| {
        let label = p.label().chars().count();
        if p.is_connectable() {
            label
        } else {
            label + (FIELD_WIDTH / CHAR_WIDTH) as usize
        }
    }));
    let output_chars = column_chars(node.outputs.iter().map(|p| p.label().chars().count()));

    let columns_width = [input_chars, output_chars]
        .into_iter()
        .flatten()
        .map(|chars| chars as f32 * CHAR_WIDTH)
        .sum::<f32>();
    let title_width = node.title.chars().count() as f32 * TITLE_CHAR_WIDTH + 2.0 * PORT_INSET;
    let width = (BASE_WIDTH + columns_width).max(title_width);

    let rows = node.inputs.len().max(node.outputs.len());
    let body_height = rows as f32 * ROW_HEIGHT;
    let mut height = HEADER_HEIGHT + body_height;
    if node.has_details() {
        height += FOOTER_HEIGHT;
        if node.expanded {
            height += EXPANDED_HEIGHT;
        }
    }

    let rect = Rect::from_min_size(origin, Vec2::new(width, height));
    let header = Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT));

    let row_centre = |i: usize| origin.y + HEADER_HEIGHT + i as f32 * ROW_HEIGHT + ROW_HEIGHT / 2.0;

    let inputs = (0..node.inputs.len())
        .map(|i| Pos2::new(origin.x + PORT_INSET, row_centre(i)))
        .collect();
    let outputs = (0..node.outputs.len())
        .map(|i| Pos2::new(rect.right() - PORT_INSET, row_centre(i)))
        .collect();

    let fields = node
        .inputs
        .iter()
        .enumerate()
        .map(|(i, port)| {
            (!port.is_connectable()).then(|| {
                let label_width = port.label().chars().count() as f32 * CHAR_WIDTH;
                let min = Pos2::new(
                    origin.x + PORT_INSET + label_width,
                    row_centre(i) - ROW_HEIGHT / 2.0 + 3.0,
                );
                Rect::from_min_size(min, Vec2::new(FIELD_WIDTH, ROW_HEIGHT - 6.0))
            })
        })
        .collect();

    let body_bottom = origin.y + HEADER_HEIGHT + body_height;
    let footer = node.has_details().then(|| {
        Rect::from_min_size(Pos2::new(origin.x, body_bottom), Vec2::new(width, FOOTER_HEIGHT))
    });
    let details = (node.has_details() && node.expanded).then(|| {
        Rect::from_min_size(
            Pos2::new(origin.x, body_bottom + FOOTER_HEIGHT),
            Vec2::new(width, EXPANDED_HEIGHT),
        )
    });

    NodeLayout {
        rect,
        header,
        inputs,
        outputs,
        fields,
        footer,
        details,
    }
}

/// Quadratic curve drawn for a wire
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireCurve {
    /// Output end
    pub from: Pos2,
    /// Control point
    pub control: Pos2,
    /// Input end
    pub to: Pos2,
}

impl WireCurve {
    /// Curve between two endpoints; the control point is their midpoint
    /// pushed down by `droop`
    pub fn new(from: Pos2, to: Pos2, droop: f32) -> Self {
        let control = from.lerp(to, 0.5) + Vec2::new(0.0, droop);
        Self { from, control, to }
    }

    /// Point at parameter `t` in `0.0..=1.0`
    pub fn point(&self, t: f32) -> Pos2 {
        let mt = 1.0 - t;
        let v = self.from.to_vec2() * (mt * mt)
            + self.control.to_vec2() * (2.0 * mt * t)
            + self.to.to_vec2() * (t * t);
        v.to_pos2()
    }

    /// Polyline approximation
    pub fn points(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point(i as f32 / segments as f32))
            .collect()
    }

    /// Approximate shortest distance from `p` to the curve
    pub fn distance_to(&self, p: Pos2) -> f32 {
        self.points(WIRE_SAMPLES)
            .windows(2)
            .map(|seg| distance_to_segment(p, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// SVG path data (`M x y Q cx cy x y`)
    pub fn svg_path(&self) -> String {
        format!(
            "M {} {} Q {} {} {} {}",
            self.from.x, self.from.y, self.control.x, self.control.y, self.to.x, self.to.y
        )
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
