// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pan/zoom transform between screen space and canvas space.
//!
//! `screen = offset + canvas * scale`. The canvas has a finite extent
//! centred on the logical origin, so nodes may sit at negative coordinates
//! while panning stays bounded.

use crate::config::FlowGraphConfig;
use egui::{Pos2, Rect, Vec2};

/// Background grid cell size at scale 1.0
const GRID_SPACING: f32 = 40.0;

/// Direction of a zoom step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Increase scale
    In,
    /// Decrease scale
    Out,
}

impl ZoomDirection {
    /// Wheel convention: scrolling down (positive delta) zooms out
    pub fn from_wheel(delta_y: f32) -> Self {
        if delta_y > 0.0 {
            Self::Out
        } else {
            Self::In
        }
    }
}

/// Viewport state
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset: Vec2,
    scale: f32,
    size: Vec2,
    extent: Rect,
    zoom_min: f32,
    zoom_max: f32,
    zoom_step: f32,
}

impl Viewport {
    /// Create a viewport looking at the logical origin at scale 1.0
    pub fn new(config: &FlowGraphConfig) -> Self {
        let half = Vec2::new(config.canvas_size[0], config.canvas_size[1]) / 2.0;
        let mut viewport = Self {
            offset: Vec2::ZERO,
            scale: 1.0_f32.clamp(config.zoom_min, config.zoom_max),
            size: Vec2::new(config.size[0], config.size[1]),
            extent: Rect::from_min_max((-half).to_pos2(), half.to_pos2()),
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            zoom_step: config.zoom_step,
        };
        viewport.clamp_offset();
        viewport
    }

    /// Pan offset in screen pixels
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Current zoom scale
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Viewport size in screen pixels
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Canvas extent in canvas space
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Background grid cell size in screen pixels
    pub fn grid_spacing(&self) -> f32 {
        GRID_SPACING * self.scale
    }

    /// Change the viewport size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
        self.clamp_offset();
    }

    /// Move the view by a screen-pixel delta
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
        self.clamp_offset();
    }

    /// Step the zoom, keeping the pan origin fixed
    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.scale = self.stepped_scale(direction);
        self.clamp_offset();
    }

    /// Step the zoom, keeping `anchor` (screen space) over the same canvas point
    pub fn zoom_at(&mut self, direction: ZoomDirection, anchor: Pos2) {
        let pinned = self.to_canvas(anchor);
        self.scale = self.stepped_scale(direction);
        self.offset = anchor.to_vec2() - pinned.to_vec2() * self.scale;
        self.clamp_offset();
    }

    fn stepped_scale(&self, direction: ZoomDirection) -> f32 {
        let next = match direction {
            ZoomDirection::In => self.scale + self.zoom_step,
            ZoomDirection::Out => self.scale - self.zoom_step,
        };
        next.clamp(self.zoom_min, self.zoom_max)
    }

    /// Screen point to canvas point
    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    /// Canvas point to screen point
    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        (self.offset + canvas.to_vec2() * self.scale).to_pos2()
    }

    /// Canvas rectangle to screen rectangle
    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }

    /// Canvas region currently visible
    pub fn visible_canvas(&self) -> Rect {
        Rect::from_min_max(self.to_canvas(Pos2::ZERO), self.to_canvas(self.size.to_pos2()))
    }

    /// Keep the visible region inside the canvas extent
    fn clamp_offset(&mut self) {
        self.offset.x = clamp_axis(
            self.offset.x,
            self.size.x,
            self.extent.min.x,
            self.extent.max.x,
            self.scale,
        );
        self.offset.y = clamp_axis(
            self.offset.y,
            self.size.y,
            self.extent.min.y,
            self.extent.max.y,
            self.scale,
        );
    }
}

/// Clamp one offset component so `[min, max] * scale` covers `[0, size]`;
/// centre the extent when it is smaller than the viewport.
fn clamp_axis(offset: f32, size: f32, min: f32, max: f32, scale: f32) -> f32 {
    let upper = -min * scale;
    let lower = size - max * scale;
    if lower > upper {
        (lower + upper) / 2.0
    } else {
        offset.clamp(lower, upper)
    }
}
