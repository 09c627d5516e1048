use std::time::Instant;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct Frame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: Instant,
}

impl Frame {
    pub fn new(rgba: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            rgba,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// A frame filled with a single opaque color.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self::new(rgba, width, height)
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.width, self.height)
    }
}

/// Pixel dimensions of the output surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Host viewport the overlay is laid out into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A tracked point in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            z: None,
            visibility: None,
        }
    }

    pub const fn with_z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub const fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Denormalizes against the size passed in; callers hand over the
    /// surface size at draw time.
    pub fn to_canvas(&self, size: CanvasSize) -> Point {
        Point::new(self.x * size.width as f32, self.y * size.height as f32)
    }
}

/// Positional landmark slots. Removing a landmark leaves a hole so every other
/// index keeps its anatomical meaning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkList(Vec<Option<Landmark>>);

impl LandmarkList {
    pub fn new(slots: Vec<Option<Landmark>>) -> Self {
        Self(slots)
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.0.get(index).and_then(Option::as_ref)
    }

    pub fn remove(&mut self, index: usize) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = None;
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn slots(&self) -> impl Iterator<Item = Option<&Landmark>> {
        self.0.iter().map(Option::as_ref)
    }

    pub fn present(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }
}

impl From<Vec<Landmark>> for LandmarkList {
    fn from(points: Vec<Landmark>) -> Self {
        Self(points.into_iter().map(Some).collect())
    }
}

impl FromIterator<Landmark> for LandmarkList {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self(iter.into_iter().map(Some).collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Pose,
    LeftHand,
    RightHand,
    Face,
}

impl BodyPart {
    pub fn label(&self) -> &'static str {
        match self {
            BodyPart::Pose => "pose",
            BodyPart::LeftHand => "left hand",
            BodyPart::RightHand => "right hand",
            BodyPart::Face => "face",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn hand(&self) -> BodyPart {
        match self {
            Side::Left => BodyPart::LeftHand,
            Side::Right => BodyPart::RightHand,
        }
    }
}

/// Landmark lists found by the detector in one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectedLandmarks {
    #[serde(default, alias = "poseLandmarks")]
    pub pose: Option<LandmarkList>,
    #[serde(default, alias = "leftHandLandmarks")]
    pub left_hand: Option<LandmarkList>,
    #[serde(default, alias = "rightHandLandmarks")]
    pub right_hand: Option<LandmarkList>,
    #[serde(default, alias = "faceLandmarks")]
    pub face: Option<LandmarkList>,
}

/// One frame's detection result together with the image it was computed from.
#[derive(Clone, Debug)]
pub struct HolisticResult {
    pub image: Frame,
    pub pose: Option<LandmarkList>,
    pub left_hand: Option<LandmarkList>,
    pub right_hand: Option<LandmarkList>,
    pub face: Option<LandmarkList>,
}

impl HolisticResult {
    pub fn new(image: Frame, landmarks: DetectedLandmarks) -> Self {
        Self {
            image,
            pose: landmarks.pose,
            left_hand: landmarks.left_hand,
            right_hand: landmarks.right_hand,
            face: landmarks.face,
        }
    }

    pub fn landmarks(&self, part: BodyPart) -> Option<&LandmarkList> {
        match part {
            BodyPart::Pose => self.pose.as_ref(),
            BodyPart::LeftHand => self.left_hand.as_ref(),
            BodyPart::RightHand => self.right_hand.as_ref(),
            BodyPart::Face => self.face.as_ref(),
        }
    }
}
