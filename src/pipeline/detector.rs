use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};

use super::settings::HolisticOptions;
use crate::{
    error::DetectorError,
    types::{DetectedLandmarks, Frame, HolisticResult},
};

/// A landmark model. Runs on the detector worker thread.
pub trait HolisticEngine: Send + 'static {
    fn configure(&mut self, options: &HolisticOptions);
    /// Drops any tracking state, e.g. after the input source changed.
    fn reset(&mut self);
    fn process(&mut self, frame: &Frame) -> anyhow::Result<DetectedLandmarks>;
}

#[derive(Debug)]
pub enum DetectorEvent {
    Result(HolisticResult),
    Failed { message: String },
}

enum Control {
    Configure(Arc<HolisticOptions>),
    Reset,
}

/// Handle to the worker thread. Frames go in with [`DetectorHandle::send`];
/// events come back on [`DetectorHandle::events`], one per frame.
pub struct DetectorHandle {
    frame_tx: Option<Sender<Frame>>,
    control_tx: Sender<Control>,
    event_rx: Receiver<DetectorEvent>,
    handle: Option<thread::JoinHandle<()>>,
}

impl DetectorHandle {
    /// Queues `frame` for detection without waiting for the result.
    pub fn send(&self, frame: Frame) -> Result<(), DetectorError> {
        let Some(frame_tx) = &self.frame_tx else {
            return Err(DetectorError::Disconnected);
        };
        frame_tx.send(frame).map_err(|_| DetectorError::Disconnected)
    }

    pub fn set_options(&self, options: Arc<HolisticOptions>) {
        let _ = self.control_tx.send(Control::Configure(options));
    }

    pub fn reset(&self) {
        let _ = self.control_tx.send(Control::Reset);
    }

    /// A sender usable from settings subscribers on other threads.
    pub fn options_sink(&self) -> impl FnMut(Arc<HolisticOptions>) + Send + 'static {
        let control_tx = self.control_tx.clone();
        move |options| {
            let _ = control_tx.send(Control::Configure(options));
        }
    }

    pub fn events(&self) -> &Receiver<DetectorEvent> {
        &self.event_rx
    }
}

impl Drop for DetectorHandle {
    fn drop(&mut self) {
        self.frame_tx.take();
        if let Some(handle) = self.handle.take() {
            // Keep draining so a worker blocked on a full event queue can exit.
            while !handle.is_finished() {
                let _ = self.event_rx.recv_timeout(Duration::from_millis(10));
            }
            let _ = handle.join();
        }
    }
}

pub fn start_detector<E: HolisticEngine>(engine: E) -> DetectorHandle {
    let (frame_tx, frame_rx) = bounded(1);
    let (control_tx, control_rx) = unbounded();
    let (event_tx, event_rx) = bounded(1);

    let handle = thread::spawn(move || run_worker_loop(engine, frame_rx, control_rx, event_tx));

    DetectorHandle {
        frame_tx: Some(frame_tx),
        control_tx,
        event_rx,
        handle: Some(handle),
    }
}

fn run_worker_loop<E: HolisticEngine>(
    mut engine: E,
    frame_rx: Receiver<Frame>,
    control_rx: Receiver<Control>,
    event_tx: Sender<DetectorEvent>,
) {
    loop {
        select! {
            recv(control_rx) -> control => {
                if let Ok(control) = control {
                    apply_control(&mut engine, control);
                }
            }
            recv(frame_rx) -> frame => {
                let Ok(frame) = frame else {
                    break;
                };
                // Settings and resets queued before the frame apply to it.
                while let Ok(control) = control_rx.try_recv() {
                    apply_control(&mut engine, control);
                }
                let event = match engine.process(&frame) {
                    Ok(landmarks) => DetectorEvent::Result(HolisticResult::new(frame, landmarks)),
                    Err(err) => {
                        log::warn!("holistic detection failed: {err:?}");
                        DetectorEvent::Failed {
                            message: format!("{err:#}"),
                        }
                    }
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        }
    }
    log::debug!("detector worker stopped");
}

fn apply_control<E: HolisticEngine>(engine: &mut E, control: Control) {
    match control {
        Control::Configure(options) => engine.configure(&options),
        Control::Reset => engine.reset(),
    }
}

/// Plays back detection results recorded as JSON lines, one per frame.
pub struct ReplayEngine {
    path: PathBuf,
    records: Vec<DetectedLandmarks>,
    cursor: usize,
    looping: bool,
    options: HolisticOptions,
    warned_exhausted: bool,
}

impl ReplayEngine {
    pub fn open(path: &Path) -> Result<Self, DetectorError> {
        let content = fs::read_to_string(path).map_err(|source| DetectorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records = parse_records(path, &content)?;
        log::info!(
            "loaded {} recorded results from {}",
            records.len(),
            path.display()
        );
        Ok(Self::from_records(path.to_path_buf(), records))
    }

    pub fn from_records(path: PathBuf, records: Vec<DetectedLandmarks>) -> Self {
        Self {
            path,
            records,
            cursor: 0,
            looping: false,
            options: HolisticOptions::default(),
            warned_exhausted: false,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn options(&self) -> &HolisticOptions {
        &self.options
    }
}

fn parse_records(path: &Path, content: &str) -> Result<Vec<DetectedLandmarks>, DetectorError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| DetectorError::Parse {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })
        })
        .collect()
}

impl HolisticEngine for ReplayEngine {
    fn configure(&mut self, options: &HolisticOptions) {
        log::debug!("replay detector options: {options:?}");
        self.options = options.clone();
    }

    fn reset(&mut self) {
        self.cursor = 0;
        self.warned_exhausted = false;
    }

    fn process(&mut self, _frame: &Frame) -> anyhow::Result<DetectedLandmarks> {
        if self.cursor >= self.records.len() && self.looping && !self.records.is_empty() {
            self.cursor = 0;
        }
        match self.records.get(self.cursor) {
            Some(record) => {
                self.cursor += 1;
                Ok(record.clone())
            }
            None => {
                if !self.warned_exhausted {
                    log::warn!(
                        "recorded results in {} exhausted; later frames have no landmarks",
                        self.path.display()
                    );
                    self.warned_exhausted = true;
                }
                Ok(DetectedLandmarks::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Landmark, LandmarkList};

    fn record(x: f32) -> DetectedLandmarks {
        DetectedLandmarks {
            right_hand: Some(LandmarkList::from(vec![Landmark::new(x, 0.5)])),
            ..Default::default()
        }
    }

    fn right_hand_x(event: DetectorEvent) -> Option<f32> {
        match event {
            DetectorEvent::Result(result) => result.right_hand?.get(0).map(|lm| lm.x),
            DetectorEvent::Failed { .. } => None,
        }
    }

    #[test]
    fn replay_plays_records_in_order_then_runs_dry() {
        let mut engine =
            ReplayEngine::from_records(PathBuf::from("mem"), vec![record(0.1), record(0.2)]);
        let frame = Frame::solid(2, 2, [0, 0, 0, 255]);

        assert!(engine.process(&frame).unwrap().right_hand.is_some());
        assert!(engine.process(&frame).unwrap().right_hand.is_some());
        assert_eq!(engine.process(&frame).unwrap(), DetectedLandmarks::default());

        engine.reset();
        assert_eq!(engine.process(&frame).unwrap(), record(0.1));
    }

    #[test]
    fn looping_replay_wraps_around() {
        let mut engine =
            ReplayEngine::from_records(PathBuf::from("mem"), vec![record(0.1)]).looping(true);
        let frame = Frame::solid(2, 2, [0, 0, 0, 255]);
        engine.process(&frame).unwrap();
        assert_eq!(engine.process(&frame).unwrap(), record(0.1));
    }

    #[test]
    fn parse_error_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(&path, "{}\n\n{\"pose\": 3}\n").unwrap();

        match ReplayEngine::open(&path) {
            Err(DetectorError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other.err()),
        }
    }

    #[test]
    fn worker_returns_one_event_per_frame_with_its_image() {
        let detector = start_detector(ReplayEngine::from_records(
            PathBuf::from("mem"),
            vec![record(0.1), record(0.2)],
        ));

        detector.send(Frame::solid(3, 2, [1, 2, 3, 255])).unwrap();
        let first = detector.events().recv_timeout(Duration::from_secs(5)).unwrap();
        match &first {
            DetectorEvent::Result(result) => assert_eq!(result.image.size().width, 3),
            DetectorEvent::Failed { message } => panic!("detection failed: {message}"),
        }
        assert_eq!(right_hand_x(first), Some(0.1));

        detector.send(Frame::solid(3, 2, [1, 2, 3, 255])).unwrap();
        let second = detector.events().recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(right_hand_x(second), Some(0.2));
    }

    #[test]
    fn reset_before_a_frame_applies_to_it() {
        let detector = start_detector(ReplayEngine::from_records(
            PathBuf::from("mem"),
            vec![record(0.1), record(0.2)],
        ));

        detector.send(Frame::solid(1, 1, [0, 0, 0, 255])).unwrap();
        detector.events().recv_timeout(Duration::from_secs(5)).unwrap();
        detector.reset();
        detector.send(Frame::solid(1, 1, [0, 0, 0, 255])).unwrap();
        let event = detector.events().recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(right_hand_x(event), Some(0.1));
    }

    struct FailingEngine;

    impl HolisticEngine for FailingEngine {
        fn configure(&mut self, _options: &HolisticOptions) {}
        fn reset(&mut self) {}
        fn process(&mut self, _frame: &Frame) -> anyhow::Result<DetectedLandmarks> {
            anyhow::bail!("model unavailable")
        }
    }

    #[test]
    fn engine_failure_is_reported_not_fatal() {
        let detector = start_detector(FailingEngine);
        for _ in 0..2 {
            detector.send(Frame::solid(1, 1, [0, 0, 0, 255])).unwrap();
            let event = detector.events().recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(matches!(
                event,
                DetectorEvent::Failed { ref message } if message == "model unavailable"
            ));
        }
    }
}
