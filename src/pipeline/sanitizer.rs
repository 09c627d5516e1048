use super::topology::PoseLandmark;
use crate::types::HolisticResult;

/// Pose points hidden before drawing: the face points (the face mesh covers
/// them) and the hand points (the hand lists cover them).
pub const HIDDEN_POSE_LANDMARKS: [PoseLandmark; 19] = [
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
    PoseLandmark::LeftWrist,
    PoseLandmark::RightWrist,
    PoseLandmark::LeftPinky,
    PoseLandmark::RightPinky,
    PoseLandmark::LeftIndex,
    PoseLandmark::RightIndex,
    PoseLandmark::LeftThumb,
    PoseLandmark::RightThumb,
];

pub fn sanitize(result: &mut HolisticResult) {
    if let Some(pose) = result.pose.as_mut() {
        for landmark in HIDDEN_POSE_LANDMARKS {
            pose.remove(landmark.index());
        }
    }
}
