// SPDX-License-Identifier: MIT OR Apache-2.0
//! egui front end for [`FlowGraph`].
//!
//! Features:
//! - Grid, node and wire painting from the projected [`Scene`]
//! - Pointer, wheel and keyboard translation into [`InputEvent`]s
//! - Inline field editors
//! - Searchable context menu
//! - Status bar

use crate::interaction::{InputEvent, Key, PointerButton};
use crate::layout::{WireCurve, PORT_RADIUS};
use crate::node::NodeId;
use crate::port::FieldValue;
use crate::scene::{NodeVisual, PortVisual, Scene};
use crate::viewport::Viewport;
use crate::widget::FlowGraph;
use egui::epaint::QuadraticBezierShape;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

const NODE_ROUNDING: f32 = 6.0;
const NODE_SHADOW_OFFSET: f32 = 3.0;
const WIRE_THICKNESS: f32 = 2.5;
const MAJOR_GRID_EVERY: f32 = 5.0;

/// Screen-space painter for one frame
struct Canvas<'a> {
    painter: &'a egui::Painter,
    viewport: &'a Viewport,
    origin: Vec2,
}

impl Canvas<'_> {
    fn pos(&self, canvas: Pos2) -> Pos2 {
        self.viewport.to_screen(canvas) + self.origin
    }

    fn rect(&self, canvas: Rect) -> Rect {
        self.viewport.rect_to_screen(canvas).translate(self.origin)
    }

    fn scale(&self) -> f32 {
        self.viewport.scale()
    }
}

fn color([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

impl FlowGraph {
    /// Draw the editor into the remaining space of `ui` and process input
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());
        if rect.size() != self.viewport.size() {
            self.resize(rect.width(), rect.height());
        }

        let scene = self.scene();
        self.forward_input(ui, rect, &scene);

        // Input may have changed the graph; project again before painting
        let scene = self.scene();
        let painter = ui.painter_at(rect);
        let canvas = Canvas {
            painter: &painter,
            viewport: &self.viewport,
            origin: rect.min.to_vec2(),
        };

        draw_grid(&canvas, rect);
        for wire in &scene.wires {
            let stroke_color = if wire.focused {
                Color32::from_rgb(255, 200, 80)
            } else {
                color(wire.color)
            };
            draw_wire(&canvas, &wire.curve, stroke_color);
        }
        if let Some(preview) = &scene.preview {
            draw_wire(&canvas, preview, Color32::from_gray(200));
        }
        for node in &scene.nodes {
            if canvas.rect(node.layout.rect).intersects(rect) {
                draw_node(&canvas, node);
            }
        }

        let edits = field_editors(ui, &canvas, &scene);
        for (node, input, value) in edits {
            if let Err(err) = self.set_field_value(node, input, value) {
                tracing::warn!("Field edit rejected: {err}");
            }
        }

        self.draw_context_menu(ui, rect);
        self.draw_status_bar(ui, rect);
        response
    }

    fn forward_input(&mut self, ui: &egui::Ui, rect: Rect, scene: &Scene) {
        let origin = rect.min.to_vec2();
        let over_field = |pos: Pos2| {
            let canvas = self.viewport.to_canvas(pos - origin);
            scene.nodes.iter().any(|node| {
                node.inputs
                    .iter()
                    .any(|p| p.field.as_ref().is_some_and(|(r, _)| r.contains(canvas)))
            })
        };

        let (events, scroll, hover) =
            ui.input(|i| (i.events.clone(), i.raw_scroll_delta.y, i.pointer.hover_pos()));
        let text_input_focused = ui.ctx().wants_keyboard_input();

        let mut translated = Vec::new();
        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    translated.push(InputEvent::PointerMove { pos: pos - origin });
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let button = match button {
                        egui::PointerButton::Primary => PointerButton::Primary,
                        egui::PointerButton::Secondary => PointerButton::Secondary,
                        egui::PointerButton::Middle => PointerButton::Middle,
                        _ => continue,
                    };
                    if !pressed {
                        translated.push(InputEvent::PointerUp { pos: pos - origin, button });
                    } else if rect.contains(pos) && !over_field(pos) {
                        translated.push(InputEvent::PointerDown { pos: pos - origin, button });
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => {
                    let key = match key {
                        egui::Key::Delete => Key::Delete,
                        egui::Key::Backspace => Key::Backspace,
                        egui::Key::Escape => Key::Escape,
                        _ => Key::Other,
                    };
                    translated.push(InputEvent::Key {
                        key,
                        text_input_focused,
                    });
                }
                _ => {}
            }
        }

        if let Some(pos) = hover.filter(|pos| rect.contains(*pos)) {
            if scroll != 0.0 {
                // egui reports wheel-up as positive
                translated.push(InputEvent::Wheel {
                    pos: pos - origin,
                    delta_y: -scroll,
                });
            }
        }

        for event in translated {
            self.handle_event(event);
        }
    }

    fn draw_context_menu(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let Some(pos) = self.menu.screen_pos() else {
            return;
        };
        let size: Vec2 = self.config.context_menu_size.into();

        let mut search = self.menu.search().to_string();
        let mut chosen = None;
        egui::Area::new(ui.id().with("flowgraph_context_menu"))
            .fixed_pos(rect.min + pos.to_vec2())
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(size.x - 12.0);
                    ui.add(egui::TextEdit::singleline(&mut search).hint_text("Search"));
                    egui::ScrollArea::vertical()
                        .max_height(size.y - 40.0)
                        .show(ui, |ui| {
                            for group in self.menu.filtered() {
                                ui.label(egui::RichText::new(group.name).strong());
                                for entry in group.entries {
                                    if ui.button(entry.label).clicked() {
                                        chosen = Some(entry.command);
                                    }
                                }
                                ui.separator();
                            }
                        });
                });
            });

        if search != self.menu.search() {
            self.set_menu_search(search);
        }
        if let Some(command) = chosen {
            self.invoke_command(command);
        }
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui, rect: Rect) {
        let status_rect = Rect::from_min_size(
            Pos2::new(rect.left() + 5.0, rect.bottom() - 20.0),
            Vec2::new(rect.width() - 10.0, 18.0),
        );

        ui.painter().text(
            status_rect.left_center(),
            egui::Align2::LEFT_CENTER,
            format!(
                "Nodes: {} | Connections: {} | Zoom: {:.0}%",
                self.graph.node_count(),
                self.graph.connection_count(),
                self.viewport.scale() * 100.0,
            ),
            egui::FontId::proportional(11.0),
            Color32::from_gray(150),
        );
    }
}

fn draw_grid(canvas: &Canvas<'_>, rect: Rect) {
    let spacing = canvas.viewport.grid_spacing();
    let major_spacing = spacing * MAJOR_GRID_EVERY;
    let offset = canvas.viewport.offset();

    let minor = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 60, 60, 100));
    let major = Stroke::new(1.0, Color32::from_rgba_unmultiplied(80, 80, 80, 150));

    for (step, stroke) in [(spacing, minor), (major_spacing, major)] {
        let mut x = rect.left() + offset.x.rem_euclid(step);
        while x < rect.right() {
            canvas
                .painter
                .line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            x += step;
        }
        let mut y = rect.top() + offset.y.rem_euclid(step);
        while y < rect.bottom() {
            canvas
                .painter
                .line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            y += step;
        }
    }

    // Origin axes
    let origin = canvas.pos(Pos2::ZERO);
    let axis = Stroke::new(2.0, Color32::from_rgba_unmultiplied(100, 100, 150, 180));
    if rect.x_range().contains(origin.x) {
        canvas
            .painter
            .line_segment([Pos2::new(origin.x, rect.top()), Pos2::new(origin.x, rect.bottom())], axis);
    }
    if rect.y_range().contains(origin.y) {
        canvas
            .painter
            .line_segment([Pos2::new(rect.left(), origin.y), Pos2::new(rect.right(), origin.y)], axis);
    }
}

fn draw_wire(canvas: &Canvas<'_>, curve: &WireCurve, color: Color32) {
    let points = [canvas.pos(curve.from), canvas.pos(curve.control), canvas.pos(curve.to)];
    canvas.painter.add(QuadraticBezierShape::from_points_stroke(
        points,
        false,
        Color32::TRANSPARENT,
        Stroke::new(WIRE_THICKNESS * canvas.scale(), color),
    ));
}

fn draw_node(canvas: &Canvas<'_>, node: &NodeVisual) {
    let zoom = canvas.scale();
    let painter = canvas.painter;
    let screen_rect = canvas.rect(node.layout.rect);

    let shadow_rect = screen_rect.translate(Vec2::splat(NODE_SHADOW_OFFSET));
    painter.rect_filled(
        shadow_rect,
        NODE_ROUNDING * zoom,
        Color32::from_rgba_unmultiplied(0, 0, 0, 60),
    );

    let bg_color = if node.selected {
        Color32::from_rgb(60, 70, 90)
    } else {
        Color32::from_rgb(45, 45, 48)
    };
    painter.rect_filled(screen_rect, NODE_ROUNDING * zoom, bg_color);

    let header_rect = canvas.rect(node.layout.header);
    let header_color = if node.fixed {
        Color32::from_rgb(110, 80, 60)
    } else {
        Color32::from_rgb(70, 100, 130)
    };
    painter.rect_filled(
        header_rect,
        egui::Rounding {
            nw: NODE_ROUNDING * zoom,
            ne: NODE_ROUNDING * zoom,
            sw: 0.0,
            se: 0.0,
        },
        header_color,
    );
    painter.text(
        header_rect.center(),
        egui::Align2::CENTER_CENTER,
        &node.title,
        egui::FontId::proportional(12.0 * zoom),
        Color32::WHITE,
    );

    if node.focused || node.selected {
        painter.rect_stroke(
            screen_rect,
            NODE_ROUNDING * zoom,
            Stroke::new(2.0, Color32::from_rgb(100, 150, 255)),
        );
    }

    for port in &node.inputs {
        draw_port(canvas, port, egui::Align2::LEFT_CENTER);
    }
    for port in &node.outputs {
        draw_port(canvas, port, egui::Align2::RIGHT_CENTER);
    }

    if let Some(footer) = node.layout.footer {
        let footer = canvas.rect(footer);
        painter.text(
            footer.center(),
            egui::Align2::CENTER_CENTER,
            if node.expanded { "\u{25B4}" } else { "\u{25BE}" },
            egui::FontId::proportional(12.0 * zoom),
            Color32::from_gray(170),
        );
    }
    if let (Some(details), Some(text)) = (node.layout.details, node.details.as_deref()) {
        let details = canvas.rect(details).shrink(8.0 * zoom);
        painter.text(
            details.left_top(),
            egui::Align2::LEFT_TOP,
            text,
            egui::FontId::proportional(10.0 * zoom),
            Color32::from_gray(190),
        );
    }
}

fn draw_port(canvas: &Canvas<'_>, port: &PortVisual, align: egui::Align2) {
    let zoom = canvas.scale();
    let pos = canvas.pos(port.anchor);
    let label_offset = (PORT_RADIUS + 6.0) * zoom;

    if port.field.is_none() {
        let radius = PORT_RADIUS * zoom;
        if port.connected {
            canvas.painter.circle_filled(pos, radius, color(port.color));
        } else {
            canvas.painter.circle_filled(pos, radius, Color32::from_gray(40));
        }
        canvas
            .painter
            .circle_stroke(pos, radius, Stroke::new(1.5, color(port.color)));
    }

    let label_pos = if align == egui::Align2::RIGHT_CENTER {
        Pos2::new(pos.x - label_offset, pos.y)
    } else if port.field.is_some() {
        Pos2::new(pos.x - PORT_RADIUS * zoom, pos.y)
    } else {
        Pos2::new(pos.x + label_offset, pos.y)
    };
    canvas.painter.text(
        label_pos,
        align,
        &port.label,
        egui::FontId::proportional(10.0 * zoom),
        Color32::from_gray(200),
    );
}

/// Show editors for inline fields; returns the values the user changed
fn field_editors(ui: &mut egui::Ui, canvas: &Canvas<'_>, scene: &Scene) -> Vec<(NodeId, usize, FieldValue)> {
    let mut edits = Vec::new();
    for node in &scene.nodes {
        for (index, port) in node.inputs.iter().enumerate() {
            let Some((field_rect, value)) = &port.field else {
                continue;
            };
            let screen = canvas.rect(*field_rect);
            if !ui.clip_rect().intersects(screen) {
                continue;
            }

            let mut edited = value.clone();
            let changed = match &mut edited {
                FieldValue::Number(number) => ui
                    .put(screen, egui::DragValue::new(number).speed(0.01))
                    .changed(),
                FieldValue::String(text) => ui.put(screen, egui::TextEdit::singleline(text)).changed(),
                FieldValue::Color(rgba) => {
                    let mut child = ui.new_child(egui::UiBuilder::new().max_rect(screen));
                    child.color_edit_button_rgba_unmultiplied(rgba).changed()
                }
            };
            if changed {
                edits.push((node.id, index, edited));
            }
        }
    }
    edits
}
