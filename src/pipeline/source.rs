use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::Sender;

use crate::types::Frame;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug)]
pub enum SourceEvent {
    /// A new input started; tracking state from the previous one is stale.
    Changed { label: String },
    Frame(Frame),
    Ended,
}

/// Still images from a directory, played in file name order.
#[derive(Clone, Debug)]
pub struct ImageSequenceSource {
    label: String,
    paths: Vec<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("failed to list {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_image(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(anyhow!("no png or jpeg images found in {}", dir.display()));
        }

        Ok(Self {
            label: dir.display().to_string(),
            paths,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Loads frames on a background thread. Delivery blocks while the
    /// consumer is busy, so no image is skipped.
    pub fn start(self, event_tx: Sender<SourceEvent>) -> SourceStream {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let handle = thread::spawn(move || {
            if event_tx
                .send(SourceEvent::Changed {
                    label: self.label.clone(),
                })
                .is_err()
            {
                return;
            }

            for path in &self.paths {
                if stop_flag.load(Ordering::Relaxed) {
                    return;
                }
                let frame = match load_frame(path) {
                    Ok(frame) => frame,
                    Err(err) => {
                        log::warn!("skipping {}: {err:#}", path.display());
                        continue;
                    }
                };
                if event_tx.send(SourceEvent::Frame(frame)).is_err() {
                    return;
                }
            }

            let _ = event_tx.send(SourceEvent::Ended);
        });

        SourceStream {
            stop,
            handle: Some(handle),
        }
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

pub fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    Ok(Frame::from_image(image))
}

#[derive(Debug)]
pub struct SourceStream {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SourceStream {
    /// Asks the loader to stop. Returns without waiting; dropping the
    /// stream's receiver or the stream itself finishes the shutdown.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

impl Drop for SourceStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}
