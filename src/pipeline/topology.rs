use std::{borrow::Cow, fs, path::Path};

use super::triangulate::delaunay_connectors;
use crate::{
    error::TopologyError,
    types::{BodyPart, LandmarkList},
};

pub type Connector = (usize, usize);

pub const POSE_LANDMARK_COUNT: usize = 33;
pub const HAND_LANDMARK_COUNT: usize = 21;
pub const FACE_LANDMARK_COUNT: usize = 468;

/// Named positions in the pose landmark list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl PoseLandmark {
    pub const ALL: [PoseLandmark; POSE_LANDMARK_COUNT] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftEyeInner,
        PoseLandmark::LeftEye,
        PoseLandmark::LeftEyeOuter,
        PoseLandmark::RightEyeInner,
        PoseLandmark::RightEye,
        PoseLandmark::RightEyeOuter,
        PoseLandmark::LeftEar,
        PoseLandmark::RightEar,
        PoseLandmark::MouthLeft,
        PoseLandmark::MouthRight,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftPinky,
        PoseLandmark::RightPinky,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftThumb,
        PoseLandmark::RightThumb,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
        PoseLandmark::LeftHeel,
        PoseLandmark::RightHeel,
        PoseLandmark::LeftFootIndex,
        PoseLandmark::RightFootIndex,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            PoseLandmark::Nose => "nose",
            PoseLandmark::LeftEyeInner => "left_eye_inner",
            PoseLandmark::LeftEye => "left_eye",
            PoseLandmark::LeftEyeOuter => "left_eye_outer",
            PoseLandmark::RightEyeInner => "right_eye_inner",
            PoseLandmark::RightEye => "right_eye",
            PoseLandmark::RightEyeOuter => "right_eye_outer",
            PoseLandmark::LeftEar => "left_ear",
            PoseLandmark::RightEar => "right_ear",
            PoseLandmark::MouthLeft => "mouth_left",
            PoseLandmark::MouthRight => "mouth_right",
            PoseLandmark::LeftShoulder => "left_shoulder",
            PoseLandmark::RightShoulder => "right_shoulder",
            PoseLandmark::LeftElbow => "left_elbow",
            PoseLandmark::RightElbow => "right_elbow",
            PoseLandmark::LeftWrist => "left_wrist",
            PoseLandmark::RightWrist => "right_wrist",
            PoseLandmark::LeftPinky => "left_pinky",
            PoseLandmark::RightPinky => "right_pinky",
            PoseLandmark::LeftIndex => "left_index",
            PoseLandmark::RightIndex => "right_index",
            PoseLandmark::LeftThumb => "left_thumb",
            PoseLandmark::RightThumb => "right_thumb",
            PoseLandmark::LeftHip => "left_hip",
            PoseLandmark::RightHip => "right_hip",
            PoseLandmark::LeftKnee => "left_knee",
            PoseLandmark::RightKnee => "right_knee",
            PoseLandmark::LeftAnkle => "left_ankle",
            PoseLandmark::RightAnkle => "right_ankle",
            PoseLandmark::LeftHeel => "left_heel",
            PoseLandmark::RightHeel => "right_heel",
            PoseLandmark::LeftFootIndex => "left_foot_index",
            PoseLandmark::RightFootIndex => "right_foot_index",
        }
    }
}

/// Hand list position the arm bridge attaches to.
pub const HAND_WRIST: usize = 0;

pub const POSE_LANDMARKS_LEFT: [PoseLandmark; 16] = [
    PoseLandmark::LeftEyeInner,
    PoseLandmark::LeftEye,
    PoseLandmark::LeftEyeOuter,
    PoseLandmark::LeftEar,
    PoseLandmark::MouthLeft,
    PoseLandmark::LeftShoulder,
    PoseLandmark::LeftElbow,
    PoseLandmark::LeftWrist,
    PoseLandmark::LeftPinky,
    PoseLandmark::LeftIndex,
    PoseLandmark::LeftThumb,
    PoseLandmark::LeftHip,
    PoseLandmark::LeftKnee,
    PoseLandmark::LeftAnkle,
    PoseLandmark::LeftHeel,
    PoseLandmark::LeftFootIndex,
];

pub const POSE_LANDMARKS_RIGHT: [PoseLandmark; 16] = [
    PoseLandmark::RightEyeInner,
    PoseLandmark::RightEye,
    PoseLandmark::RightEyeOuter,
    PoseLandmark::RightEar,
    PoseLandmark::MouthRight,
    PoseLandmark::RightShoulder,
    PoseLandmark::RightElbow,
    PoseLandmark::RightWrist,
    PoseLandmark::RightPinky,
    PoseLandmark::RightIndex,
    PoseLandmark::RightThumb,
    PoseLandmark::RightHip,
    PoseLandmark::RightKnee,
    PoseLandmark::RightAnkle,
    PoseLandmark::RightHeel,
    PoseLandmark::RightFootIndex,
];

pub const POSE_CONNECTIONS: [(PoseLandmark, PoseLandmark); 35] = {
    use PoseLandmark::*;
    [
        // face
        (Nose, LeftEyeInner),
        (LeftEyeInner, LeftEye),
        (LeftEye, LeftEyeOuter),
        (LeftEyeOuter, LeftEar),
        (Nose, RightEyeInner),
        (RightEyeInner, RightEye),
        (RightEye, RightEyeOuter),
        (RightEyeOuter, RightEar),
        (MouthLeft, MouthRight),
        // arms
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (LeftWrist, LeftPinky),
        (LeftWrist, LeftIndex),
        (LeftWrist, LeftThumb),
        (LeftPinky, LeftIndex),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightWrist, RightPinky),
        (RightWrist, RightIndex),
        (RightWrist, RightThumb),
        (RightPinky, RightIndex),
        // torso
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
        (LeftHip, RightHip),
        // legs
        (LeftHip, LeftKnee),
        (RightHip, RightKnee),
        (LeftKnee, LeftAnkle),
        (RightKnee, RightAnkle),
        (LeftAnkle, LeftHeel),
        (RightAnkle, RightHeel),
        (LeftHeel, LeftFootIndex),
        (RightHeel, RightFootIndex),
        (LeftAnkle, LeftFootIndex),
        (RightAnkle, RightFootIndex),
    ]
};

pub const HAND_CONNECTIONS: &[Connector] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

pub const FACEMESH_LIPS: &[Connector] = &[
    (61, 146),
    (146, 91),
    (91, 181),
    (181, 84),
    (84, 17),
    (17, 314),
    (314, 405),
    (405, 321),
    (321, 375),
    (375, 291),
    (61, 185),
    (185, 40),
    (40, 39),
    (39, 37),
    (37, 0),
    (0, 267),
    (267, 269),
    (269, 270),
    (270, 409),
    (409, 291),
    (78, 95),
    (95, 88),
    (88, 178),
    (178, 87),
    (87, 14),
    (14, 317),
    (317, 402),
    (402, 318),
    (318, 324),
    (324, 308),
    (78, 191),
    (191, 80),
    (80, 81),
    (81, 82),
    (82, 13),
    (13, 312),
    (312, 311),
    (311, 310),
    (310, 415),
    (415, 308),
];

pub const FACEMESH_LEFT_EYE: &[Connector] = &[
    (263, 249),
    (249, 390),
    (390, 373),
    (373, 374),
    (374, 380),
    (380, 381),
    (381, 382),
    (382, 362),
    (263, 466),
    (466, 388),
    (388, 387),
    (387, 386),
    (386, 385),
    (385, 384),
    (384, 398),
    (398, 362),
];

pub const FACEMESH_LEFT_EYEBROW: &[Connector] = &[
    (276, 283),
    (283, 282),
    (282, 295),
    (295, 285),
    (300, 293),
    (293, 334),
    (334, 296),
    (296, 336),
];

pub const FACEMESH_RIGHT_EYE: &[Connector] = &[
    (33, 7),
    (7, 163),
    (163, 144),
    (144, 145),
    (145, 153),
    (153, 154),
    (154, 155),
    (155, 133),
    (33, 246),
    (246, 161),
    (161, 160),
    (160, 159),
    (159, 158),
    (158, 157),
    (157, 173),
    (173, 133),
];

pub const FACEMESH_RIGHT_EYEBROW: &[Connector] = &[
    (46, 53),
    (53, 52),
    (52, 65),
    (65, 55),
    (70, 63),
    (63, 105),
    (105, 66),
    (66, 107),
];

pub const FACEMESH_FACE_OVAL: &[Connector] = &[
    (10, 338),
    (338, 297),
    (297, 332),
    (332, 284),
    (284, 251),
    (251, 389),
    (389, 356),
    (356, 454),
    (454, 323),
    (323, 361),
    (361, 288),
    (288, 397),
    (397, 365),
    (365, 379),
    (379, 378),
    (378, 400),
    (400, 377),
    (377, 152),
    (152, 148),
    (148, 176),
    (176, 149),
    (149, 150),
    (150, 136),
    (136, 172),
    (172, 58),
    (58, 132),
    (132, 93),
    (93, 234),
    (234, 127),
    (127, 162),
    (162, 21),
    (21, 54),
    (54, 103),
    (103, 67),
    (67, 109),
    (109, 10),
];

/// Connector tables the compositor can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mesh {
    PoseSkeleton,
    HandSkeleton,
    FaceTesselation,
    RightEye,
    RightEyebrow,
    LeftEye,
    LeftEyebrow,
    FaceOval,
    Lips,
}

impl Mesh {
    pub const ALL: [Mesh; 9] = [
        Mesh::PoseSkeleton,
        Mesh::HandSkeleton,
        Mesh::FaceTesselation,
        Mesh::RightEye,
        Mesh::RightEyebrow,
        Mesh::LeftEye,
        Mesh::LeftEyebrow,
        Mesh::FaceOval,
        Mesh::Lips,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Mesh::PoseSkeleton => "pose skeleton",
            Mesh::HandSkeleton => "hand skeleton",
            Mesh::FaceTesselation => "face tessellation",
            Mesh::RightEye => "right eye",
            Mesh::RightEyebrow => "right eyebrow",
            Mesh::LeftEye => "left eye",
            Mesh::LeftEyebrow => "left eyebrow",
            Mesh::FaceOval => "face oval",
            Mesh::Lips => "lips",
        }
    }

    /// Part whose landmark list this mesh indexes into. Hands share one table.
    fn landmark_count(&self) -> (BodyPart, usize) {
        match self {
            Mesh::PoseSkeleton => (BodyPart::Pose, POSE_LANDMARK_COUNT),
            Mesh::HandSkeleton => (BodyPart::RightHand, HAND_LANDMARK_COUNT),
            _ => (BodyPart::Face, FACE_LANDMARK_COUNT),
        }
    }
}

/// Connector tables for every body part.
#[derive(Clone, Debug)]
pub struct Topology {
    pose: Vec<Connector>,
    face_tesselation: Vec<Connector>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::holistic()
    }
}

impl Topology {
    /// Built-in tables. Without a loaded tessellation table the face mesh is
    /// triangulated from each frame's face landmarks.
    pub fn holistic() -> Self {
        Self {
            pose: POSE_CONNECTIONS
                .iter()
                .map(|(a, b)| (a.index(), b.index()))
                .collect(),
            face_tesselation: Vec::new(),
        }
    }

    pub fn with_face_tesselation(mut self, connectors: Vec<Connector>) -> Self {
        self.face_tesselation = connectors;
        self
    }

    /// Reads a JSON array of `[from, to]` pairs.
    pub fn load_face_tesselation(self, path: &Path) -> Result<Self, TopologyError> {
        let content = fs::read_to_string(path).map_err(|source| TopologyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let pairs: Vec<[usize; 2]> =
            serde_json::from_str(&content).map_err(|source| TopologyError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(self.with_face_tesselation(pairs.into_iter().map(|[a, b]| (a, b)).collect()))
    }

    /// Connectors for drawing `mesh` over `landmarks`.
    pub fn connectors_for<'a>(
        &'a self,
        mesh: Mesh,
        landmarks: &LandmarkList,
    ) -> Cow<'a, [Connector]> {
        if mesh == Mesh::FaceTesselation && self.face_tesselation.is_empty() {
            return Cow::Owned(delaunay_connectors(landmarks));
        }
        Cow::Borrowed(self.connectors(mesh))
    }

    /// The static table for `mesh`; empty for an unloaded tessellation.
    pub fn connectors(&self, mesh: Mesh) -> &[Connector] {
        match mesh {
            Mesh::PoseSkeleton => &self.pose,
            Mesh::HandSkeleton => HAND_CONNECTIONS,
            Mesh::FaceTesselation => &self.face_tesselation,
            Mesh::RightEye => FACEMESH_RIGHT_EYE,
            Mesh::RightEyebrow => FACEMESH_RIGHT_EYEBROW,
            Mesh::LeftEye => FACEMESH_LEFT_EYE,
            Mesh::LeftEyebrow => FACEMESH_LEFT_EYEBROW,
            Mesh::FaceOval => FACEMESH_FACE_OVAL,
            Mesh::Lips => FACEMESH_LIPS,
        }
    }

    /// Checks the named pose mapping and that every connector stays inside
    /// its list. Run once at startup.
    pub fn validate(&self) -> Result<(), TopologyError> {
        for (expected, landmark) in PoseLandmark::ALL.iter().enumerate() {
            if landmark.index() != expected {
                return Err(TopologyError::NamedIndexMismatch {
                    name: landmark.name(),
                    expected,
                    actual: landmark.index(),
                });
            }
        }

        for mesh in Mesh::ALL {
            let (part, count) = mesh.landmark_count();
            if let Some(&bad) = self
                .connectors(mesh)
                .iter()
                .find(|(a, b)| *a >= count || *b >= count)
            {
                return Err(TopologyError::out_of_range(mesh.label(), part, bad, count));
            }
        }

        if self.face_tesselation.is_empty() {
            log::info!("no face tessellation table loaded; triangulating face landmarks per frame");
        }
        log::info!(
            "topology ok: {} pose, {} hand, {} tessellation connectors",
            self.pose.len(),
            HAND_CONNECTIONS.len(),
            self.face_tesselation.len()
        );
        Ok(())
    }
}
