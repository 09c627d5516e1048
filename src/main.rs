mod args;

use std::{fs, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{Receiver, bounded};
use holistic_overlay::{
    config::Config,
    pipeline::{
        AdaptiveFrameSizer, Compositor, DetectorEvent, DetectorHandle, ImageSequenceSource,
        OverlayPipeline, RasterSurface, RecordingSurface, ReplayEngine, SettingsPanel, SourceEvent,
        Surface, Topology, start_detector,
    },
    types::CanvasSize,
};

use args::Args;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(viewport) = args.viewport {
        config.viewport = viewport;
    }
    if let Some(out) = &args.out {
        config.output.dir = out.clone();
    }

    let topology = load_topology(&config)?;
    let compositor = Compositor::new(Arc::new(topology));

    let engine = ReplayEngine::open(&args.results)
        .inspect_err(|err| log::error!("detector setup failed: {err}"))
        .context("failed to start replay detector")?
        .looping(args.loop_results);
    let detector = start_detector(engine);
    log::info!("replay detector started from {}", args.results.display());

    let mut settings = SettingsPanel::new(config.options.clone());
    settings.on(detector.options_sink());
    let mirror = settings.snapshot().selfie_mode;

    let source = ImageSequenceSource::open(&args.frames)
        .inspect_err(|err| log::error!("capture source setup failed: {err:#}"))?;
    log::info!("{} frames queued from {}", source.len(), source.label());
    let (source_tx, source_rx) = bounded(1);
    let _stream = source.start(source_tx);

    let sizer = AdaptiveFrameSizer::new(config.viewport);

    if args.trace {
        let surface = RecordingSurface::new(CanvasSize::default());
        let pipeline = OverlayPipeline::new(sizer, compositor, surface);
        run_frames(pipeline, &detector, &source_rx, |index, surface| {
            for call in surface.take_calls() {
                println!("frame {index}: {call}");
            }
            Ok(())
        })
    } else {
        let out_dir = config.output.dir.clone();
        let every_nth = config.output.every_nth.max(1);
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;

        let surface = RasterSurface::new(CanvasSize::default());
        let pipeline = OverlayPipeline::new(sizer, compositor, surface);
        run_frames(pipeline, &detector, &source_rx, |index, surface| {
            if index % every_nth != 0 {
                return Ok(());
            }
            surface.save_png(&out_dir.join(format!("frame-{index:05}.png")), mirror)
        })
    }
}

fn load_topology(config: &Config) -> Result<Topology> {
    let mut topology = Topology::holistic();
    if let Some(path) = &config.topology.face_tesselation {
        topology = topology.load_face_tesselation(path)?;
    }
    topology.validate().context("landmark topology is inconsistent")?;
    Ok(topology)
}

/// Feeds frames through the detector one at a time and hands every rendered
/// surface to `emit` together with its frame index.
fn run_frames<S, F>(
    mut pipeline: OverlayPipeline<S>,
    detector: &DetectorHandle,
    source_rx: &Receiver<SourceEvent>,
    mut emit: F,
) -> Result<()>
where
    S: Surface,
    F: FnMut(u64, &mut S) -> Result<()>,
{
    let mut index = 0u64;
    for event in source_rx.iter() {
        let frame = match event {
            SourceEvent::Changed { label } => {
                log::info!("input source changed to {label}");
                detector.reset();
                continue;
            }
            SourceEvent::Ended => break,
            SourceEvent::Frame(frame) => frame,
        };

        if let Err(err) = pipeline.on_frame(&frame) {
            log::warn!("frame {index} could not be sized: {err}");
        }
        detector.send(frame)?;

        let event = detector
            .events()
            .recv()
            .context("detector stopped before returning a result")?;
        match event {
            DetectorEvent::Result(result) => match pipeline.on_result(result) {
                Ok(_) => emit(index, pipeline.surface_mut())?,
                Err(err) => log::warn!("frame {index} not rendered: {err}"),
            },
            DetectorEvent::Failed { message } => {
                log::debug!("frame {index} skipped: {message}");
            }
        }
        index += 1;
    }

    log::info!(
        "rendered {} frames, last rate {:.1} fps",
        pipeline.rendered(),
        pipeline.fps()
    );
    Ok(())
}
