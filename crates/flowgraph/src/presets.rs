// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ready-made node palette for shader graphs.
//!
//! Each preset becomes a context menu command that spawns its node where
//! the menu was opened. Port types use the shader names (`float`,
//! `float2`..`float4`, `texture2d`) so only matching slots can be wired.

use crate::node::NodeDesc;
use crate::port::{FieldKind, FieldValue, Port};
use crate::widget::FlowGraph;
use egui::Pos2;

/// A node the context menu can spawn
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// Menu group
    pub group: &'static str,
    /// Menu label
    pub label: &'static str,
    /// Builds the node description, positioned at the origin
    pub build: fn() -> NodeDesc,
}

impl Preset {
    /// Node description placed at a canvas point
    pub fn desc_at(&self, pos: Pos2) -> NodeDesc {
        (self.build)().at(pos.x, pos.y)
    }
}

/// Fixed surface output node every shader graph starts with
pub fn surface_output() -> NodeDesc {
    NodeDesc::new("Surface Output")
        .fixed()
        .input(Port::data("Base Color", "float4"))
        .input(Port::data("Normal", "float3"))
        .input(Port::data("Roughness", "float"))
        .input(Port::data("Metallic", "float"))
        .input(Port::field("Opacity", FieldKind::Number).with_value(FieldValue::Number(1.0)))
        .details("Final surface values written by the shader")
}

fn binary(title: &str, type_name: &str) -> NodeDesc {
    NodeDesc::new(title)
        .input(Port::data("A", type_name))
        .input(Port::data("B", type_name))
        .output(Port::data("Result", type_name))
}

fn vector(title: &str, components: &[&str], type_name: &str) -> NodeDesc {
    components
        .iter()
        .fold(NodeDesc::new(title), |desc, name| {
            desc.input(Port::field(*name, FieldKind::Number))
        })
        .output(Port::data("Vector", type_name))
}

/// Shader palette: inputs, textures, math and vector helpers
pub fn shader_presets() -> Vec<Preset> {
    vec![
        // ====================================================================
        // Inputs
        // ====================================================================
        Preset {
            group: "Input",
            label: "Color",
            build: || {
                NodeDesc::new("Color")
                    .input(Port::field("Color", FieldKind::Color))
                    .output(Port::data("Color", "float4"))
            },
        },
        Preset {
            group: "Input",
            label: "Float",
            build: || {
                NodeDesc::new("Float")
                    .input(Port::field("Value", FieldKind::Number))
                    .output(Port::data("Value", "float"))
            },
        },
        Preset {
            group: "Input",
            label: "Vector2",
            build: || vector("Vector2", &["X", "Y"], "float2"),
        },
        Preset {
            group: "Input",
            label: "Vector3",
            build: || vector("Vector3", &["X", "Y", "Z"], "float3"),
        },
        Preset {
            group: "Input",
            label: "Vector4",
            build: || vector("Vector4", &["X", "Y", "Z", "W"], "float4"),
        },
        Preset {
            group: "Input",
            label: "UV Coordinates",
            build: || NodeDesc::new("UV Coordinates").output(Port::data("UV", "float2")),
        },
        Preset {
            group: "Input",
            label: "Time",
            build: || {
                NodeDesc::new("Time")
                    .output(Port::data("Seconds", "float"))
                    .output(Port::data("Sine", "float"))
            },
        },
        // ====================================================================
        // Textures
        // ====================================================================
        Preset {
            group: "Texture",
            label: "Texture",
            build: || {
                NodeDesc::new("Texture")
                    .input(Port::field("Path", FieldKind::String))
                    .output(Port::data("Texture", "texture2d"))
            },
        },
        Preset {
            group: "Texture",
            label: "Texture Sample",
            build: || {
                NodeDesc::new("Texture Sample")
                    .input(Port::data("Texture", "texture2d"))
                    .input(Port::data("UV", "float2"))
                    .output(Port::data("Color", "float4"))
                    .output(Port::data("Alpha", "float"))
                    .details("Samples with the default linear sampler")
            },
        },
        // ====================================================================
        // Math
        // ====================================================================
        Preset {
            group: "Math",
            label: "Add",
            build: || binary("Add", "float4"),
        },
        Preset {
            group: "Math",
            label: "Subtract",
            build: || binary("Subtract", "float4"),
        },
        Preset {
            group: "Math",
            label: "Multiply",
            build: || binary("Multiply", "float4"),
        },
        Preset {
            group: "Math",
            label: "Divide",
            build: || binary("Divide", "float4"),
        },
        Preset {
            group: "Math",
            label: "Lerp",
            build: || {
                binary("Lerp", "float4").input(Port::data("T", "float"))
            },
        },
        Preset {
            group: "Math",
            label: "Dot Product",
            build: || {
                NodeDesc::new("Dot Product")
                    .input(Port::data("A", "float3"))
                    .input(Port::data("B", "float3"))
                    .output(Port::data("Result", "float"))
            },
        },
        // ====================================================================
        // Vector
        // ====================================================================
        Preset {
            group: "Vector",
            label: "Split",
            build: || {
                ["R", "G", "B", "A"].iter().fold(
                    NodeDesc::new("Split").input(Port::data("Vector", "float4")),
                    |desc, channel| desc.output(Port::data(*channel, "float")),
                )
            },
        },
        Preset {
            group: "Vector",
            label: "Combine",
            build: || {
                ["R", "G", "B", "A"]
                    .iter()
                    .fold(NodeDesc::new("Combine"), |desc, channel| {
                        desc.input(Port::data(*channel, "float"))
                    })
                    .output(Port::data("Vector", "float4"))
            },
        },
    ]
}

impl FlowGraph {
    /// Register every preset as a context menu command
    pub fn register_presets(&mut self, presets: impl IntoIterator<Item = Preset>) {
        let mut count = 0usize;
        for preset in presets {
            self.register_command(preset.group, preset.label, move |graph, pos| {
                if let Err(err) = graph.add_node(preset.desc_at(pos)) {
                    tracing::warn!("Could not add {}: {err}", preset.label);
                }
            });
            count += 1;
        }
        tracing::debug!("Registered {} preset command(s)", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{InputEvent, PointerButton};

    #[test]
    fn test_presets_are_unique_per_group() {
        let presets = shader_presets();
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert!(
                    !(a.group == b.group && a.label == b.label),
                    "duplicate preset {}/{}",
                    a.group,
                    a.label
                );
            }
        }
    }

    #[test]
    fn test_vector_fields_default_to_zero() {
        let desc = vector("Vector3", &["X", "Y", "Z"], "float3");
        assert_eq!(desc.inputs.len(), 3);
        assert!(desc.inputs.iter().all(|p| !p.is_connectable()));
        assert_eq!(desc.outputs[0].port_type.name(), "float3");
    }

    #[test]
    fn test_spawn_from_menu() {
        let mut flow = FlowGraph::default();
        flow.register_presets(shader_presets());
        let output = flow.add_node(surface_output().at(600.0, 100.0)).unwrap();

        flow.handle_event(InputEvent::PointerDown {
            pos: Pos2::new(120.0, 80.0),
            button: PointerButton::Secondary,
        });
        flow.set_menu_search("Color");
        let command = flow.context_menu().filtered()[0].entries[0].command;
        assert!(flow.invoke_command(command));

        let color = flow
            .graph()
            .nodes()
            .find(|n| n.title == "Color")
            .map(|n| n.id)
            .unwrap();
        assert_eq!(flow.node(color).unwrap().position, [120.0, 80.0]);
        flow.add_connection(color, 0, output, 0).unwrap();
        assert!(flow.add_connection(color, 0, output, 2).is_err());
    }
}
