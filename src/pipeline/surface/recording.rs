use std::fmt;

use super::{StateStack, Surface};
use crate::{
    error::SurfaceError,
    pipeline::style::Color,
    types::{CanvasSize, Frame, Point},
};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Resize(CanvasSize),
    Save,
    Restore,
    Clear(CanvasSize),
    Image {
        source: CanvasSize,
        target: CanvasSize,
    },
    Line {
        from: Point,
        to: Point,
        color: Color,
        width: f32,
    },
    Marker {
        center: Point,
        radius: f32,
        fill: Color,
        stroke: Color,
        width: f32,
    },
}

impl fmt::Display for DrawCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCall::Resize(size) => write!(f, "resize {}x{}", size.width, size.height),
            DrawCall::Save => write!(f, "save"),
            DrawCall::Restore => write!(f, "restore"),
            DrawCall::Clear(size) => write!(f, "clear {}x{}", size.width, size.height),
            DrawCall::Image { source, target } => write!(
                f,
                "image {}x{} -> {}x{}",
                source.width, source.height, target.width, target.height
            ),
            DrawCall::Line {
                from,
                to,
                color,
                width,
            } => write!(
                f,
                "line ({:.1}, {:.1}) -> ({:.1}, {:.1}) #{:02x}{:02x}{:02x}{:02x} w{width}",
                from.x, from.y, to.x, to.y, color.r, color.g, color.b, color.a
            ),
            DrawCall::Marker {
                center,
                radius,
                fill,
                ..
            } => write!(
                f,
                "marker ({:.1}, {:.1}) r{radius:.2} #{:02x}{:02x}{:02x}",
                center.x, center.y, fill.r, fill.g, fill.b
            ),
        }
    }
}

/// Keeps every primitive issued against it, in order.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: CanvasSize,
    state: StateStack,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            state: StateStack::default(),
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Line { .. }))
    }

    pub fn markers(&self) -> impl Iterator<Item = &DrawCall> {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Marker { .. }))
    }

    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn resize(&mut self, size: CanvasSize) -> Result<(), SurfaceError> {
        self.size = size;
        self.state.reset();
        self.calls.push(DrawCall::Resize(size));
        Ok(())
    }

    fn save(&mut self) {
        self.state.save();
        self.calls.push(DrawCall::Save);
    }

    fn restore(&mut self) {
        self.state.restore();
        self.calls.push(DrawCall::Restore);
    }

    fn clear(&mut self) {
        self.calls.push(DrawCall::Clear(self.size));
    }

    fn draw_image(&mut self, image: &Frame) -> Result<(), SurfaceError> {
        if self.size.is_empty() {
            return Err(SurfaceError::ZeroSized(self.size));
        }
        self.calls.push(DrawCall::Image {
            source: image.size(),
            target: self.size,
        });
        Ok(())
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.current_mut().stroke = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.current_mut().fill = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.current_mut().line_width = width;
    }

    fn stroke_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        let state = self.state.current();
        self.calls.push(DrawCall::Line {
            from,
            to,
            color: state.stroke,
            width: state.line_width,
        });
        Ok(())
    }

    fn draw_marker(&mut self, center: Point, radius: f32) -> Result<(), SurfaceError> {
        let state = self.state.current();
        self.calls.push(DrawCall::Marker {
            center,
            radius,
            fill: state.fill,
            stroke: state.stroke,
            width: state.line_width,
        });
        Ok(())
    }
}
