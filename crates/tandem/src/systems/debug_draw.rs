//! # Debug Drawing
//!
//! A buffer of debug primitives rebuilt every frame. The scene has the
//! physics world draw into it; a renderer reads it back through
//! [`DebugDrawSystem::primitives`].

use glam::Vec2;

use tandem_physics::{DebugColor, DebugDraw};

use crate::schedule::{System, SystemContext};

/// One buffered shape, in pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DebugPrimitive {
    /// Circle outline.
    Circle {
        /// Center.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Color.
        color: DebugColor,
    },
    /// Closed polygon outline.
    Polygon {
        /// Vertices in order.
        vertices: Vec<Vec2>,
        /// Color.
        color: DebugColor,
    },
    /// Line segment.
    Segment {
        /// Start.
        from: Vec2,
        /// End.
        to: Vec2,
        /// Color.
        color: DebugColor,
    },
}

/// Numbers shown in the debug overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebugOverlay {
    /// Alive entities.
    pub entities: usize,
    /// Primitives buffered this frame.
    pub primitives: usize,
    /// Frame delta in milliseconds.
    pub frame_ms: f32,
}

/// Per-frame debug primitive buffer and overlay.
#[derive(Debug)]
pub struct DebugDrawSystem {
    enabled: bool,
    primitives: Vec<DebugPrimitive>,
    overlay: DebugOverlay,
}

impl Default for DebugDrawSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugDrawSystem {
    /// Enabled, empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enabled: true,
            primitives: Vec::new(),
            overlay: DebugOverlay {
                entities: 0,
                primitives: 0,
                frame_ms: 0.0,
            },
        }
    }

    /// Whether primitives are being collected.
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Turns collection on or off. Disabling drops the buffer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.primitives.clear();
        }
    }

    /// Primitives collected this frame.
    #[must_use]
    pub fn primitives(&self) -> &[DebugPrimitive] {
        &self.primitives
    }

    /// Overlay computed by the latest UI pass.
    #[must_use]
    pub const fn overlay(&self) -> &DebugOverlay {
        &self.overlay
    }

    fn push(&mut self, primitive: DebugPrimitive) {
        if self.enabled {
            self.primitives.push(primitive);
        }
    }
}

impl DebugDraw for DebugDrawSystem {
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor) {
        self.push(DebugPrimitive::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_polygon(&mut self, vertices: &[Vec2], color: DebugColor) {
        self.push(DebugPrimitive::Polygon {
            vertices: vertices.to_vec(),
            color,
        });
    }

    fn draw_segment(&mut self, from: Vec2, to: Vec2, color: DebugColor) {
        self.push(DebugPrimitive::Segment { from, to, color });
    }
}

impl System for DebugDrawSystem {
    fn name(&self) -> &str {
        "DebugDrawSystem"
    }

    fn before_update(&mut self, _ctx: &mut SystemContext<'_>) {
        self.primitives.clear();
    }

    fn render_ui(&mut self, ctx: &mut SystemContext<'_>) {
        self.overlay = DebugOverlay {
            entities: ctx.store.alive_count(),
            primitives: self.primitives.len(),
            frame_ms: ctx.delta() * 1000.0,
        };
    }
}
