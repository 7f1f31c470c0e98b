// SPDX-License-Identifier: MIT OR Apache-2.0
//! Right-click command palette.
//!
//! Commands are registered under a group name and run against the graph
//! with the canvas position the menu was opened at. The search text
//! filters entries by label or group name.

use crate::graph::Graph;
use egui::{Pos2, Rect, Vec2};
use indexmap::IndexMap;
use std::fmt;

/// Callback run when a command is chosen
pub type CommandCallback = Box<dyn FnMut(&mut Graph, Pos2)>;

struct Command {
    label: String,
    callback: CommandCallback,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("label", &self.label).finish_non_exhaustive()
    }
}

/// Address of a registered command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandRef {
    /// Group position, in registration order
    pub group: usize,
    /// Command position within its group
    pub index: usize,
}

/// One visible menu entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry<'a> {
    /// Command address
    pub command: CommandRef,
    /// Entry text
    pub label: &'a str,
}

/// One visible menu group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup<'a> {
    /// Group heading
    pub name: &'a str,
    /// Entries that pass the filter
    pub entries: Vec<MenuEntry<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct OpenState {
    screen: Pos2,
    canvas: Pos2,
}

/// Context menu state and command registry
#[derive(Debug, Default)]
pub struct ContextMenu {
    groups: IndexMap<String, Vec<Command>>,
    open: Option<OpenState>,
    search: String,
}

impl ContextMenu {
    /// Create an empty menu
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command; groups appear in first-registration order
    pub fn register(
        &mut self,
        group: impl Into<String>,
        label: impl Into<String>,
        callback: impl FnMut(&mut Graph, Pos2) + 'static,
    ) -> CommandRef {
        let entry = self.groups.entry(group.into());
        let group = entry.index();
        let commands = entry.or_default();
        commands.push(Command {
            label: label.into(),
            callback: Box::new(callback),
        });
        CommandRef {
            group,
            index: commands.len() - 1,
        }
    }

    /// Number of registered commands
    pub fn command_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Open at a screen point, shifted left/up so a menu of `menu_size`
    /// stays inside a viewport of `viewport_size`
    pub fn open(&mut self, screen: Pos2, canvas: Pos2, viewport_size: Vec2, menu_size: Vec2) {
        let x = screen.x.min(viewport_size.x - menu_size.x).max(0.0);
        let y = screen.y.min(viewport_size.y - menu_size.y).max(0.0);
        self.open = Some(OpenState {
            screen: Pos2::new(x, y),
            canvas,
        });
    }

    /// Hide the menu
    pub fn close(&mut self) {
        self.open = None;
    }

    /// Whether the menu is shown
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Top-left corner in screen space
    pub fn screen_pos(&self) -> Option<Pos2> {
        self.open.map(|open| open.screen)
    }

    /// Canvas point new nodes are spawned at
    pub fn canvas_pos(&self) -> Option<Pos2> {
        self.open.map(|open| open.canvas)
    }

    /// Screen rectangle of the open menu
    pub fn rect(&self, menu_size: Vec2) -> Option<Rect> {
        self.screen_pos().map(|pos| Rect::from_min_size(pos, menu_size))
    }

    /// Whether a screen point lies on the open menu
    pub fn contains(&self, screen: Pos2, menu_size: Vec2) -> bool {
        self.rect(menu_size).is_some_and(|rect| rect.contains(screen))
    }

    /// Current search text
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replace the search text
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Groups and entries matching the search text. An entry matches when
    /// its label or its group name contains the text; empty groups are
    /// dropped.
    pub fn filtered(&self) -> Vec<MenuGroup<'_>> {
        self.groups
            .iter()
            .enumerate()
            .filter_map(|(group, (name, commands))| {
                let group_matches = name.contains(self.search.as_str());
                let entries: Vec<_> = commands
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| group_matches || c.label.contains(self.search.as_str()))
                    .map(|(index, c)| MenuEntry {
                        command: CommandRef { group, index },
                        label: c.label.as_str(),
                    })
                    .collect();
                (!entries.is_empty()).then_some(MenuGroup {
                    name: name.as_str(),
                    entries,
                })
            })
            .collect()
    }

    /// Run a command at the menu's canvas position and close the menu.
    /// Returns `false` if the menu is closed or the command is unknown.
    pub fn invoke(&mut self, command: CommandRef, graph: &mut Graph) -> bool {
        let Some(open) = self.open else {
            return false;
        };
        let Some((group, entry)) = self
            .groups
            .get_index_mut(command.group)
            .and_then(|(group, commands)| Some((group, commands.get_mut(command.index)?)))
        else {
            tracing::warn!("Ignoring unknown menu command {:?}", command);
            return false;
        };
        tracing::debug!("Running menu command {}/{}", group, entry.label);
        (entry.callback)(graph, open.canvas);
        self.open = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeDesc;

    fn menu() -> ContextMenu {
        let mut menu = ContextMenu::new();
        menu.register("Input", "Color", |g, p| {
            g.add_node(NodeDesc::new("Color").at(p.x, p.y)).unwrap();
        });
        menu.register("Input", "Texture", |g, p| {
            g.add_node(NodeDesc::new("Texture").at(p.x, p.y)).unwrap();
        });
        menu.register("Math", "Multiply", |g, p| {
            g.add_node(NodeDesc::new("Multiply").at(p.x, p.y)).unwrap();
        });
        menu
    }

    fn labels(menu: &ContextMenu) -> Vec<(String, Vec<String>)> {
        menu.filtered()
            .into_iter()
            .map(|g| {
                (
                    g.name.to_string(),
                    g.entries.iter().map(|e| e.label.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_register_keeps_group_order() {
        let menu = menu();
        assert_eq!(menu.command_count(), 3);
        assert_eq!(
            labels(&menu),
            vec![
                ("Input".to_string(), vec!["Color".to_string(), "Texture".to_string()]),
                ("Math".to_string(), vec!["Multiply".to_string()]),
            ]
        );
    }

    #[test]
    fn test_search_filters_by_label() {
        let mut menu = menu();
        menu.set_search("Tex");
        assert_eq!(labels(&menu), vec![("Input".to_string(), vec!["Texture".to_string()])]);
    }

    #[test]
    fn test_search_matches_group_name() {
        let mut menu = menu();
        menu.set_search("Math");
        assert_eq!(labels(&menu), vec![("Math".to_string(), vec!["Multiply".to_string()])]);

        menu.set_search("nothing here");
        assert!(menu.filtered().is_empty());
    }

    #[test]
    fn test_open_is_clamped_inside_viewport() {
        let mut menu = menu();
        let size = Vec2::new(230.0, 200.0);
        menu.open(Pos2::new(700.0, 550.0), Pos2::ZERO, Vec2::new(800.0, 600.0), size);
        assert_eq!(menu.screen_pos(), Some(Pos2::new(570.0, 400.0)));

        menu.open(Pos2::new(10.0, 20.0), Pos2::ZERO, Vec2::new(800.0, 600.0), size);
        assert_eq!(menu.screen_pos(), Some(Pos2::new(10.0, 20.0)));
        assert!(menu.contains(Pos2::new(100.0, 100.0), size));
        assert!(!menu.contains(Pos2::new(300.0, 100.0), size));
    }

    #[test]
    fn test_invoke_spawns_at_canvas_position_and_closes() {
        let mut menu = menu();
        let mut graph = Graph::new();
        let command = menu.filtered()[1].entries[0].command;

        assert!(!menu.invoke(command, &mut graph));

        menu.open(Pos2::new(50.0, 50.0), Pos2::new(-120.0, 40.0), Vec2::new(800.0, 600.0), Vec2::new(230.0, 200.0));
        assert!(menu.invoke(command, &mut graph));
        assert!(!menu.is_open());

        let node = graph.nodes().next().unwrap();
        assert_eq!(node.title, "Multiply");
        assert_eq!(node.position, [-120.0, 40.0]);
    }

    #[test]
    fn test_invoke_unknown_command() {
        let mut menu = menu();
        let mut graph = Graph::new();
        menu.open(Pos2::ZERO, Pos2::ZERO, Vec2::new(800.0, 600.0), Vec2::new(230.0, 200.0));
        assert!(!menu.invoke(CommandRef { group: 5, index: 0 }, &mut graph));
        assert!(menu.is_open());
    }
}
