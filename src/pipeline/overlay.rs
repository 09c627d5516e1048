use std::time::Instant;

use super::{
    compositor::{Compositor, RenderReport},
    fps::FpsMeter,
    sanitizer::sanitize,
    sizer::AdaptiveFrameSizer,
    surface::Surface,
};
use crate::{
    error::SurfaceError,
    types::{CanvasSize, Frame, HolisticResult, Viewport},
};

/// Drives one output surface: size it when a frame is captured, paint it when
/// that frame's result comes back.
pub struct OverlayPipeline<S: Surface> {
    sizer: AdaptiveFrameSizer,
    compositor: Compositor,
    surface: S,
    fps: FpsMeter,
    rendered: u64,
}

impl<S: Surface> OverlayPipeline<S> {
    pub fn new(sizer: AdaptiveFrameSizer, compositor: Compositor, surface: S) -> Self {
        Self {
            sizer,
            compositor,
            surface,
            fps: FpsMeter::new(),
            rendered: 0,
        }
    }

    /// Call before the frame is handed to the detector.
    pub fn on_frame(&mut self, frame: &Frame) -> Result<CanvasSize, SurfaceError> {
        self.sizer.apply(frame.size(), &mut self.surface)
    }

    pub fn on_result(&mut self, mut result: HolisticResult) -> Result<RenderReport, SurfaceError> {
        sanitize(&mut result);
        let report = self.compositor.render(&result, &mut self.surface)?;

        if self.rendered == 0 {
            let size = self.surface.size();
            log::info!(
                "first holistic result rendered on a {}x{} canvas",
                size.width,
                size.height
            );
        }
        self.rendered += 1;
        self.fps.tick(Instant::now());
        Ok(report)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.sizer.viewport()
    }

    /// Takes effect from the next captured frame.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.sizer.set_viewport(viewport);
    }

    pub fn rendered(&self) -> u64 {
        self.rendered
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        pipeline::{
            surface::{DrawCall, RecordingSurface},
            topology::{POSE_LANDMARK_COUNT, PoseLandmark, Topology},
        },
        types::{DetectedLandmarks, Landmark, LandmarkList},
    };

    fn pipeline(viewport: Viewport) -> OverlayPipeline<RecordingSurface> {
        OverlayPipeline::new(
            AdaptiveFrameSizer::new(viewport),
            Compositor::new(Arc::new(Topology::holistic())),
            RecordingSurface::new(CanvasSize::default()),
        )
    }

    fn visible_pose() -> LandmarkList {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| Landmark::new(0.1 + i as f32 * 0.02, 0.5).with_visibility(0.9))
            .collect()
    }

    #[test]
    fn frame_sizes_the_surface_before_rendering() {
        let mut overlay = pipeline(Viewport::new(1440, 1080));
        let frame = Frame::solid(1920, 1080, [0, 0, 0, 255]);

        let size = overlay.on_frame(&frame).unwrap();
        assert_eq!(size, CanvasSize::new(1920, 1080));
        assert_eq!(overlay.surface().calls(), &[DrawCall::Resize(size)]);
    }

    #[test]
    fn result_is_sanitized_before_drawing() {
        let mut overlay = pipeline(Viewport::new(640, 480));
        let frame = Frame::solid(640, 480, [0, 0, 0, 255]);
        overlay.on_frame(&frame).unwrap();

        let result = HolisticResult::new(
            frame,
            DetectedLandmarks {
                pose: Some(visible_pose()),
                ..Default::default()
            },
        );
        let report = overlay.on_result(result).unwrap();

        // 33 points minus the 19 hidden face and hand points.
        assert_eq!(report.markers, 14);
        let wrist = PoseLandmark::LeftWrist.index();
        let wrist =
            Landmark::new(0.1 + wrist as f32 * 0.02, 0.5).to_canvas(CanvasSize::new(640, 480));
        assert!(overlay.surface().markers().all(|call| match call {
            DrawCall::Marker { center, .. } => *center != wrist,
            _ => true,
        }));
        assert_eq!(overlay.rendered(), 1);
    }

    #[test]
    fn zero_sized_frame_surfaces_an_error() {
        let mut overlay = pipeline(Viewport::new(640, 480));
        let frame = Frame::solid(0, 0, [0, 0, 0, 255]);
        assert!(overlay.on_frame(&frame).unwrap().is_empty());

        let result = HolisticResult::new(frame, DetectedLandmarks::default());
        assert!(matches!(
            overlay.on_result(result),
            Err(SurfaceError::ZeroSized(_))
        ));
        assert_eq!(overlay.rendered(), 0);
        assert_eq!(overlay.surface().save_depth(), 0);
    }

    #[test]
    fn viewport_change_applies_to_next_frame() {
        let mut overlay = pipeline(Viewport::new(1280, 720));
        let frame = Frame::solid(400, 400, [0, 0, 0, 255]);
        assert_eq!(overlay.on_frame(&frame).unwrap(), CanvasSize::new(720, 720));

        overlay.set_viewport(Viewport::new(300, 900));
        assert_eq!(overlay.viewport(), Viewport::new(300, 900));
        assert_eq!(overlay.on_frame(&frame).unwrap(), CanvasSize::new(300, 300));
    }
}
