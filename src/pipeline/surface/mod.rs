mod raster;
mod recording;

pub use raster::RasterSurface;
pub use recording::{DrawCall, RecordingSurface};

use super::style::Color;
use crate::{
    error::SurfaceError,
    types::{CanvasSize, Frame, Point},
};

/// A 2D drawing target with canvas-like state: the stroke and fill settings
/// apply to every following primitive until changed or restored.
pub trait Surface {
    fn size(&self) -> CanvasSize;

    /// Changes the pixel size and discards the current contents.
    fn resize(&mut self, size: CanvasSize) -> Result<(), SurfaceError>;

    fn save(&mut self);
    fn restore(&mut self);

    fn clear(&mut self);

    /// Draws `image` scaled to cover the whole surface.
    fn draw_image(&mut self, image: &Frame) -> Result<(), SurfaceError>;

    fn set_stroke_color(&mut self, color: Color);
    fn set_fill_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);

    fn stroke_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError>;

    /// Fills a circle with the fill color, then outlines it with the stroke.
    fn draw_marker(&mut self, center: Point, radius: f32) -> Result<(), SurfaceError>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub stroke: Color,
    pub fill: Color,
    pub line_width: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            stroke: Color::BLACK,
            fill: Color::BLACK,
            line_width: 1.0,
        }
    }
}

/// Current drawing state plus the saved states beneath it.
#[derive(Clone, Debug, Default)]
pub(crate) struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub(crate) fn current(&self) -> &DrawState {
        &self.current
    }

    pub(crate) fn current_mut(&mut self) -> &mut DrawState {
        &mut self.current
    }

    pub(crate) fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Unbalanced restores are ignored.
    pub(crate) fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }

    /// Resizing a canvas resets its drawing state.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }
}
