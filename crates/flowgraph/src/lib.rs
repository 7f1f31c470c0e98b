// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive node-graph canvas.
//!
//! This crate provides the editing core for node-based tools such as
//! shader and material graphs:
//! - Typed input/output ports and inline-editable fields
//! - Connection validation (one wire per input, exact type match)
//! - Pan/zoom viewport with a bounded canvas
//! - Pointer/keyboard interaction state machine
//! - Searchable context menu for spawning nodes
//! - JSON/RON document import and export
//!
//! ## Architecture
//!
//! [`Graph`] is the single source of truth. Everything drawn is a
//! [`Scene`] projected from it on demand, and input flows in as
//! [`InputEvent`]s through [`FlowGraph::handle_event`]. The [`ui`]
//! module connects the whole thing to egui.

pub mod config;
pub mod connection;
pub mod context_menu;
pub mod document;
pub mod graph;
pub mod interaction;
pub mod layout;
pub mod node;
pub mod port;
pub mod presets;
pub mod scene;
pub mod ui;
pub mod viewport;
pub mod widget;

pub use config::{ConfigError, FlowGraphConfig, ZoomAnchor};
pub use connection::{Connection, ConnectionId};
pub use context_menu::{CommandRef, ContextMenu};
pub use document::{DocumentError, GraphDocument};
pub use graph::{Graph, GraphError};
pub use interaction::{DragMode, Focus, Hit, InputEvent, Key, PointerButton};
pub use node::{Node, NodeDesc, NodeId};
pub use port::{FieldKind, FieldValue, Port, PortDirection, PortRef, PortType};
pub use scene::Scene;
pub use viewport::{Viewport, ZoomDirection};
pub use widget::{FlowGraph, ValueChanged};
