pub mod compositor;
pub mod connector;
pub mod depth;
pub mod detector;
pub mod fps;
pub mod overlay;
pub mod sanitizer;
pub mod settings;
pub mod sizer;
pub mod source;
pub mod style;
pub mod surface;
pub mod topology;
pub mod triangulate;

// Re-exports for convenience
pub use compositor::{Compositor, DrawStep, RenderReport, compose_plan};
pub use detector::{DetectorEvent, DetectorHandle, HolisticEngine, ReplayEngine, start_detector};
pub use overlay::OverlayPipeline;
pub use settings::{HolisticOptions, ModelComplexity, SettingsPanel};
pub use sizer::{AdaptiveFrameSizer, fit_to_viewport};
pub use source::{ImageSequenceSource, SourceEvent, SourceStream};
pub use surface::{DrawCall, RasterSurface, RecordingSurface, Surface};
pub use topology::Topology;
