use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelComplexity {
    Lite,
    #[default]
    Full,
    Heavy,
}

/// Detector options edited from the control panel. The overlay never reads
/// them; they are forwarded to the detector unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HolisticOptions {
    pub selfie_mode: bool,
    pub model_complexity: ModelComplexity,
    pub smooth_landmarks: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for HolisticOptions {
    fn default() -> Self {
        Self {
            selfie_mode: true,
            model_complexity: ModelComplexity::Full,
            smooth_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

type Subscriber = Box<dyn FnMut(Arc<HolisticOptions>) + Send>;

/// Holds the current options and notifies subscribers with a snapshot on
/// every change.
pub struct SettingsPanel {
    current: Arc<HolisticOptions>,
    subscribers: Vec<Subscriber>,
}

impl SettingsPanel {
    pub fn new(initial: HolisticOptions) -> Self {
        Self {
            current: Arc::new(initial),
            subscribers: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> Arc<HolisticOptions> {
        Arc::clone(&self.current)
    }

    /// Registers `subscriber` and hands it the current options immediately.
    pub fn on<F>(&mut self, mut subscriber: F)
    where
        F: FnMut(Arc<HolisticOptions>) + Send + 'static,
    {
        subscriber(self.snapshot());
        self.subscribers.push(Box::new(subscriber));
    }

    /// Applies `edit`; subscribers hear about it only if something changed.
    pub fn update(&mut self, edit: impl FnOnce(&mut HolisticOptions)) {
        let mut next = (*self.current).clone();
        edit(&mut next);
        if next == *self.current {
            return;
        }
        self.current = Arc::new(next);
        for subscriber in &mut self.subscribers {
            subscriber(Arc::clone(&self.current));
        }
    }
}
