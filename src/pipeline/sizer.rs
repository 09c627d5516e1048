use super::surface::Surface;
use crate::{
    error::SurfaceError,
    types::{CanvasSize, Viewport},
};

/// Largest size with the frame's aspect ratio that spans the viewport's
/// shorter axis. Fractional pixels are truncated.
/// A frame with no area gives an empty canvas.
pub fn fit_to_viewport(frame: CanvasSize, viewport: Viewport) -> CanvasSize {
    if frame.is_empty() {
        return CanvasSize::default();
    }
    let aspect = frame.height as f64 / frame.width as f64;
    let (width, height) = if viewport.width > viewport.height {
        let height = viewport.height as f64;
        (height / aspect, height)
    } else {
        let width = viewport.width as f64;
        (width, width * aspect)
    };
    if !(width.is_finite() && height.is_finite()) {
        return CanvasSize::default();
    }
    CanvasSize::new(width as u32, height as u32)
}

/// Resizes the output surface for every incoming frame.
#[derive(Clone, Debug)]
pub struct AdaptiveFrameSizer {
    viewport: Viewport,
}

impl AdaptiveFrameSizer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Always resizes, even to the same size, which also wipes the surface.
    pub fn apply<S: Surface + ?Sized>(
        &self,
        frame: CanvasSize,
        surface: &mut S,
    ) -> Result<CanvasSize, SurfaceError> {
        let size = fit_to_viewport(frame, self.viewport);
        log::debug!(
            "frame {}x{} in viewport {}x{} -> canvas {}x{}",
            frame.width,
            frame.height,
            self.viewport.width,
            self.viewport.height,
            size.width,
            size.height
        );
        surface.resize(size)?;
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::surface::{DrawCall, RasterSurface, RecordingSurface},
        types::Frame,
    };

    #[test]
    fn wide_viewport_fixes_height() {
        let size = fit_to_viewport(CanvasSize::new(640, 480), Viewport::new(1920, 1080));
        assert_eq!(size, CanvasSize::new(1440, 1080));
    }

    #[test]
    fn tall_viewport_fixes_width() {
        let size = fit_to_viewport(CanvasSize::new(640, 480), Viewport::new(800, 1000));
        assert_eq!(size, CanvasSize::new(800, 600));
    }

    #[test]
    fn square_viewport_fixes_width() {
        let size = fit_to_viewport(CanvasSize::new(1280, 720), Viewport::new(900, 900));
        assert_eq!(size, CanvasSize::new(900, 506));
    }

    #[test]
    fn portrait_frame_keeps_its_aspect() {
        let size = fit_to_viewport(CanvasSize::new(480, 640), Viewport::new(1920, 1080));
        assert_eq!(size, CanvasSize::new(810, 1080));
    }

    #[test]
    fn frames_without_area_yield_empty_canvas() {
        let cases = [
            (CanvasSize::new(0, 480), Viewport::new(1920, 1080)),
            (CanvasSize::new(0, 480), Viewport::new(800, 1000)),
            (CanvasSize::new(640, 0), Viewport::new(1920, 1080)),
            (CanvasSize::new(640, 0), Viewport::new(800, 1000)),
            (CanvasSize::new(0, 0), Viewport::new(900, 900)),
        ];
        for (frame, viewport) in cases {
            assert_eq!(fit_to_viewport(frame, viewport), CanvasSize::default(), "{frame:?}");
        }
    }

    #[test]
    fn zero_height_frame_leaves_raster_surface_empty() {
        let sizer = AdaptiveFrameSizer::new(Viewport::new(1920, 1080));
        let mut surface = RasterSurface::new(CanvasSize::new(4, 4));

        let size = sizer.apply(CanvasSize::new(640, 0), &mut surface).unwrap();
        assert!(size.is_empty());
        assert!(surface.pixels().is_empty());
        assert!(matches!(
            surface.draw_image(&Frame::solid(640, 0, [0, 0, 0, 255])),
            Err(SurfaceError::ZeroSized(_))
        ));
    }

    #[test]
    fn apply_resizes_the_surface_every_time() {
        let mut sizer = AdaptiveFrameSizer::new(Viewport::new(1920, 1080));
        let mut surface = RecordingSurface::new(CanvasSize::default());

        sizer.apply(CanvasSize::new(640, 480), &mut surface).unwrap();
        sizer.apply(CanvasSize::new(640, 480), &mut surface).unwrap();
        sizer.set_viewport(Viewport::new(800, 1000));
        sizer.apply(CanvasSize::new(640, 480), &mut surface).unwrap();

        assert_eq!(
            surface.calls(),
            &[
                DrawCall::Resize(CanvasSize::new(1440, 1080)),
                DrawCall::Resize(CanvasSize::new(1440, 1080)),
                DrawCall::Resize(CanvasSize::new(800, 600)),
            ]
        );
        assert_eq!(surface.size(), CanvasSize::new(800, 600));
    }
}
