use std::sync::Arc;

use super::{
    connector::{connect, draw_connectors, draw_landmarks},
    depth::hand_marker_radius,
    style::{Color, Radius, RenderStyle},
    surface::Surface,
    topology::{HAND_WRIST, Mesh, POSE_LANDMARKS_LEFT, POSE_LANDMARKS_RIGHT, PoseLandmark, Topology},
};
use crate::{
    error::SurfaceError,
    types::{BodyPart, HolisticResult, Landmark, LandmarkList, Side},
};

pub const BRIDGE_LINE_WIDTH: f32 = 5.0;
pub const POSE_MARKER_VISIBILITY_MIN: f32 = 0.65;

/// Which landmarks of a list a marker pass draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerSelection {
    All,
    PoseSide(Side),
}

impl MarkerSelection {
    fn pick<'a>(&self, list: &'a LandmarkList) -> Vec<Option<&'a Landmark>> {
        match self {
            MarkerSelection::All => list.slots().collect(),
            MarkerSelection::PoseSide(side) => {
                let subset: &[PoseLandmark] = match side {
                    Side::Left => &POSE_LANDMARKS_LEFT,
                    Side::Right => &POSE_LANDMARKS_RIGHT,
                };
                subset.iter().map(|landmark| list.get(landmark.index())).collect()
            }
        }
    }
}

/// One layer of the overlay. Steps whose landmark lists are missing are skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawStep {
    Clear,
    Blit,
    /// Joins the pose elbow to the wrist of the matching hand list.
    Bridge { side: Side, color: Color },
    Connectors {
        part: BodyPart,
        mesh: Mesh,
        style: RenderStyle,
    },
    Markers {
        part: BodyPart,
        selection: MarkerSelection,
        style: RenderStyle,
    },
}

impl DrawStep {
    pub fn label(&self) -> &'static str {
        match self {
            DrawStep::Clear => "clear",
            DrawStep::Blit => "blit",
            DrawStep::Bridge { side: Side::Right, .. } => "right bridge",
            DrawStep::Bridge { side: Side::Left, .. } => "left bridge",
            DrawStep::Connectors { part, mesh, .. } => match (part, mesh) {
                (BodyPart::Pose, _) => "pose skeleton",
                (BodyPart::RightHand, _) => "right hand skeleton",
                (BodyPart::LeftHand, _) => "left hand skeleton",
                (BodyPart::Face, Mesh::FaceTesselation) => "face tessellation",
                (BodyPart::Face, Mesh::RightEye) => "right eye",
                (BodyPart::Face, Mesh::RightEyebrow) => "right eyebrow",
                (BodyPart::Face, Mesh::LeftEye) => "left eye",
                (BodyPart::Face, Mesh::LeftEyebrow) => "left eyebrow",
                (BodyPart::Face, Mesh::FaceOval) => "face oval",
                (BodyPart::Face, _) => "lips",
            },
            DrawStep::Markers { part, selection, .. } => match (part, selection) {
                (_, MarkerSelection::PoseSide(Side::Left)) => "left pose markers",
                (_, MarkerSelection::PoseSide(Side::Right)) => "right pose markers",
                (BodyPart::RightHand, _) => "right hand markers",
                (BodyPart::LeftHand, _) => "left hand markers",
                _ => "markers",
            },
        }
    }

    /// Whether every landmark list the step reads is present.
    pub fn inputs_present(&self, result: &HolisticResult) -> bool {
        match self {
            DrawStep::Clear | DrawStep::Blit => true,
            DrawStep::Bridge { side, .. } => {
                result.pose.is_some() && result.landmarks(side.hand()).is_some()
            }
            DrawStep::Connectors { part, .. } | DrawStep::Markers { part, .. } => {
                result.landmarks(*part).is_some()
            }
        }
    }
}

fn hand_layers(side: Side, fill: Color) -> [DrawStep; 2] {
    let part = side.hand();
    [
        DrawStep::Connectors {
            part,
            mesh: Mesh::HandSkeleton,
            style: RenderStyle::default(),
        },
        DrawStep::Markers {
            part,
            selection: MarkerSelection::All,
            style: RenderStyle::default()
                .fill(fill)
                .line_width(2.0)
                .radius(Radius::FromDepth(hand_marker_radius)),
        },
    ]
}

fn face_layer(mesh: Mesh, style: RenderStyle) -> DrawStep {
    DrawStep::Connectors {
        part: BodyPart::Face,
        mesh,
        style,
    }
}

/// The fixed overlay z-order, bottom layer first. Left is orange, right is
/// cyan on every body part.
pub fn compose_plan() -> Vec<DrawStep> {
    let mut plan = vec![
        DrawStep::Clear,
        DrawStep::Blit,
        DrawStep::Bridge {
            side: Side::Right,
            color: Color::WHITE,
        },
        DrawStep::Bridge {
            side: Side::Left,
            color: Color::WHITE,
        },
        DrawStep::Connectors {
            part: BodyPart::Pose,
            mesh: Mesh::PoseSkeleton,
            style: RenderStyle::default(),
        },
        DrawStep::Markers {
            part: BodyPart::Pose,
            selection: MarkerSelection::PoseSide(Side::Left),
            style: RenderStyle::default()
                .fill(Color::ORANGE)
                .visibility_min(POSE_MARKER_VISIBILITY_MIN),
        },
        DrawStep::Markers {
            part: BodyPart::Pose,
            selection: MarkerSelection::PoseSide(Side::Right),
            style: RenderStyle::default()
                .fill(Color::CYAN)
                .visibility_min(POSE_MARKER_VISIBILITY_MIN),
        },
    ];
    plan.extend(hand_layers(Side::Right, Color::CYAN));
    plan.extend(hand_layers(Side::Left, Color::ORANGE));

    let contour = RenderStyle::default().color(Color::LIGHT_GRAY).line_width(5.0);
    plan.extend([
        face_layer(
            Mesh::FaceTesselation,
            RenderStyle::default().color(Color::MESH_GRAY).line_width(1.0),
        ),
        face_layer(Mesh::RightEye, RenderStyle::default().color(Color::CYAN)),
        face_layer(Mesh::RightEyebrow, RenderStyle::default().color(Color::CYAN)),
        face_layer(Mesh::LeftEye, RenderStyle::default().color(Color::ORANGE)),
        face_layer(Mesh::LeftEyebrow, RenderStyle::default().color(Color::ORANGE)),
        face_layer(Mesh::FaceOval, contour),
        face_layer(Mesh::Lips, contour),
    ]);
    plan
}

/// Steps that ran for one frame, in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderReport {
    pub executed: Vec<DrawStep>,
    pub lines: usize,
    pub markers: usize,
}

impl RenderReport {
    pub fn labels(&self) -> Vec<&'static str> {
        self.executed.iter().map(DrawStep::label).collect()
    }
}

/// Turns one sanitized result into draw calls. Holds no per-frame state.
#[derive(Clone, Debug)]
pub struct Compositor {
    topology: Arc<Topology>,
    plan: Vec<DrawStep>,
}

impl Compositor {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            plan: compose_plan(),
        }
    }

    pub fn plan(&self) -> &[DrawStep] {
        &self.plan
    }

    /// Runs the plan between a save/restore pair. A surface error aborts the
    /// frame and is returned as is.
    pub fn render<S: Surface + ?Sized>(
        &self,
        result: &HolisticResult,
        surface: &mut S,
    ) -> Result<RenderReport, SurfaceError> {
        surface.save();
        let mut report = RenderReport::default();
        let outcome = self
            .plan
            .iter()
            .try_for_each(|step| self.run_step(step, result, surface, &mut report));
        surface.restore();
        outcome.map(|()| report)
    }

    fn run_step<S: Surface + ?Sized>(
        &self,
        step: &DrawStep,
        result: &HolisticResult,
        surface: &mut S,
        report: &mut RenderReport,
    ) -> Result<(), SurfaceError> {
        if !step.inputs_present(result) {
            return Ok(());
        }

        match step {
            DrawStep::Clear => surface.clear(),
            DrawStep::Blit => surface.draw_image(&result.image)?,
            DrawStep::Bridge { side, color } => {
                let elbow = match side {
                    Side::Left => PoseLandmark::LeftElbow,
                    Side::Right => PoseLandmark::RightElbow,
                };
                let pose = result.landmarks(BodyPart::Pose);
                let hand = result.landmarks(side.hand());
                surface.set_line_width(BRIDGE_LINE_WIDTH);
                surface.set_stroke_color(*color);
                report.lines += connect(
                    surface,
                    &[(
                        pose.and_then(|list| list.get(elbow.index())),
                        hand.and_then(|list| list.get(HAND_WRIST)),
                    )],
                )?;
            }
            DrawStep::Connectors { part, mesh, style } => {
                if let Some(list) = result.landmarks(*part) {
                    let connectors = self.topology.connectors_for(*mesh, list);
                    report.lines += draw_connectors(surface, list, &connectors, style)?;
                }
            }
            DrawStep::Markers {
                part,
                selection,
                style,
            } => {
                if let Some(list) = result.landmarks(*part) {
                    report.markers += draw_landmarks(surface, selection.pick(list), style)?;
                }
            }
        }

        report.executed.push(*step);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        pipeline::{
            sanitizer::sanitize,
            surface::{DrawCall, RecordingSurface},
            topology::{
                FACE_LANDMARK_COUNT, FACEMESH_FACE_OVAL, FACEMESH_LEFT_EYE, FACEMESH_LEFT_EYEBROW,
                FACEMESH_LIPS, FACEMESH_RIGHT_EYE, FACEMESH_RIGHT_EYEBROW, HAND_LANDMARK_COUNT,
                POSE_LANDMARK_COUNT,
            },
        },
        types::{CanvasSize, DetectedLandmarks, Frame, Point},
    };

    fn pose() -> LandmarkList {
        (0..POSE_LANDMARK_COUNT)
            .map(|i| Landmark::new(0.3 + i as f32 * 0.01, 0.5).with_visibility(0.9))
            .collect()
    }

    fn hand(x: f32) -> LandmarkList {
        (0..HAND_LANDMARK_COUNT)
            .map(|i| Landmark::new(x, 0.2 + i as f32 * 0.01).with_z(-0.05))
            .collect()
    }

    fn render(landmarks: DetectedLandmarks) -> (RenderReport, RecordingSurface) {
        let mut result = HolisticResult::new(Frame::solid(64, 48, [0, 0, 0, 255]), landmarks);
        sanitize(&mut result);
        let compositor = Compositor::new(Arc::new(Topology::holistic()));
        let mut surface = RecordingSurface::new(CanvasSize::new(640, 480));
        let report = compositor.render(&result, &mut surface).unwrap();
        (report, surface)
    }

    #[test]
    fn plan_has_fixed_z_order() {
        let labels: Vec<_> = compose_plan().iter().map(DrawStep::label).collect();
        assert_eq!(
            labels,
            vec![
                "clear",
                "blit",
                "right bridge",
                "left bridge",
                "pose skeleton",
                "left pose markers",
                "right pose markers",
                "right hand skeleton",
                "right hand markers",
                "left hand skeleton",
                "left hand markers",
                "face tessellation",
                "right eye",
                "right eyebrow",
                "left eye",
                "left eyebrow",
                "face oval",
                "lips",
            ]
        );
    }

    #[test]
    fn pose_only_result_skips_hands_and_face() {
        let (report, surface) = render(DetectedLandmarks {
            pose: Some(pose()),
            ..Default::default()
        });

        assert_eq!(
            report.labels(),
            vec![
                "clear",
                "blit",
                "pose skeleton",
                "left pose markers",
                "right pose markers"
            ]
        );
        assert!(matches!(surface.calls()[1], DrawCall::Clear(_)));
        assert!(matches!(surface.calls()[2], DrawCall::Image { .. }));
        assert!(report.lines > 0);
        assert!(report.markers > 0);
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn empty_result_only_clears_and_blits() {
        let (report, surface) = render(DetectedLandmarks::default());
        assert_eq!(report.labels(), vec!["clear", "blit"]);
        assert_eq!(surface.lines().count() + surface.markers().count(), 0);
    }

    #[test]
    fn bridge_joins_elbow_to_wrist() {
        let (report, surface) = render(DetectedLandmarks {
            pose: Some(pose()),
            right_hand: Some(hand(0.8)),
            ..Default::default()
        });

        assert_eq!(report.labels()[2], "right bridge");
        let bridge = surface.lines().next().unwrap();
        let elbow_x = (0.3 + PoseLandmark::RightElbow.index() as f32 * 0.01) * 640.0;
        assert_eq!(
            bridge,
            &DrawCall::Line {
                from: Point::new(elbow_x, 240.0),
                to: Point::new(0.8 * 640.0, 0.2 * 480.0),
                color: Color::WHITE,
                width: BRIDGE_LINE_WIDTH,
            }
        );
    }

    fn face() -> LandmarkList {
        (0..FACE_LANDMARK_COUNT)
            .map(|i| {
                let t = i as f32 * 0.61;
                let r = 0.05 + 0.2 * (i as f32 / FACE_LANDMARK_COUNT as f32);
                Landmark::new(0.5 + r * t.cos(), 0.4 + r * t.sin()).with_z(0.0)
            })
            .collect()
    }

    fn line_style(call: &DrawCall) -> Option<(Color, f32)> {
        match call {
            DrawCall::Line { color, width, .. } => Some((*color, *width)),
            _ => None,
        }
    }

    #[test]
    fn full_result_paints_every_layer_in_order() {
        let (report, surface) = render(DetectedLandmarks {
            pose: Some(pose()),
            right_hand: Some(hand(0.8)),
            left_hand: Some(hand(0.1)),
            face: Some(face()),
        });
        assert_eq!(report.labels(), compose_plan().iter().map(DrawStep::label).collect::<Vec<_>>());

        let mut runs: Vec<(Color, f32)> = surface.calls().iter().filter_map(line_style).collect();
        runs.dedup();
        assert_eq!(
            runs,
            vec![
                (Color::WHITE, BRIDGE_LINE_WIDTH),
                (Color::WHITE, 4.0),
                (Color::MESH_GRAY, 1.0),
                (Color::CYAN, 4.0),
                (Color::ORANGE, 4.0),
                (Color::LIGHT_GRAY, 5.0),
            ]
        );

        let count = |style: (Color, f32)| {
            surface
                .calls()
                .iter()
                .filter(|call| line_style(call) == Some(style))
                .count()
        };
        assert_eq!(
            count((Color::CYAN, 4.0)),
            FACEMESH_RIGHT_EYE.len() + FACEMESH_RIGHT_EYEBROW.len()
        );
        assert_eq!(
            count((Color::ORANGE, 4.0)),
            FACEMESH_LEFT_EYE.len() + FACEMESH_LEFT_EYEBROW.len()
        );
        assert_eq!(
            count((Color::LIGHT_GRAY, 5.0)),
            FACEMESH_FACE_OVAL.len() + FACEMESH_LIPS.len()
        );
        assert!(count((Color::MESH_GRAY, 1.0)) > FACE_LANDMARK_COUNT);
    }

    #[test]
    fn left_bridge_follows_right_bridge() {
        let (_, surface) = render(DetectedLandmarks {
            pose: Some(pose()),
            right_hand: Some(hand(0.8)),
            left_hand: Some(hand(0.1)),
            ..Default::default()
        });

        let left_elbow_x = (0.3 + PoseLandmark::LeftElbow.index() as f32 * 0.01) * 640.0;
        assert_eq!(
            surface.lines().nth(1),
            Some(&DrawCall::Line {
                from: Point::new(left_elbow_x, 240.0),
                to: Point::new(0.1 * 640.0, 0.2 * 480.0),
                color: Color::WHITE,
                width: BRIDGE_LINE_WIDTH,
            })
        );
    }

    #[test]
    fn pose_markers_drop_hidden_and_low_visibility_points() {
        let mut slots: Vec<Option<Landmark>> = pose().slots().map(|slot| slot.copied()).collect();
        if let Some(knee) = slots[PoseLandmark::LeftKnee.index()].as_mut() {
            knee.visibility = Some(0.6);
        }
        let list = LandmarkList::new(slots);

        let (_, surface) = render(DetectedLandmarks {
            pose: Some(list),
            ..Default::default()
        });

        let fills: Vec<Color> = surface
            .markers()
            .map(|call| match call {
                DrawCall::Marker { fill, .. } => *fill,
                _ => unreachable!(),
            })
            .collect();
        // shoulder, elbow, hip, ankle, heel, foot index per side; left knee is too faint
        assert_eq!(fills.iter().filter(|c| **c == Color::ORANGE).count(), 6);
        assert_eq!(fills.iter().filter(|c| **c == Color::CYAN).count(), 7);
    }

    #[test]
    fn hand_markers_scale_with_depth() {
        let (_, surface) = render(DetectedLandmarks {
            left_hand: Some(hand(0.1)),
            ..Default::default()
        });

        let radii: Vec<f32> = surface
            .markers()
            .map(|call| match call {
                DrawCall::Marker { radius, fill, width, .. } => {
                    assert_eq!(*fill, Color::ORANGE);
                    assert_eq!(*width, 2.0);
                    *radius
                }
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(radii.len(), HAND_LANDMARK_COUNT);
        assert!(radii.iter().all(|r| (*r - hand_marker_radius(Some(-0.05))).abs() < 1e-6));
    }

    #[test]
    fn surface_error_aborts_frame_and_restores() {
        let result = HolisticResult::new(
            Frame::solid(4, 4, [0, 0, 0, 255]),
            DetectedLandmarks {
                pose: Some(pose()),
                ..Default::default()
            },
        );
        let compositor = Compositor::new(Arc::new(Topology::holistic()));
        let mut surface = RecordingSurface::new(CanvasSize::new(0, 0));

        let err = compositor.render(&result, &mut surface).unwrap_err();
        assert!(matches!(err, SurfaceError::ZeroSized(_)));
        assert!(surface.lines().next().is_none());
        assert_eq!(surface.save_depth(), 0);
    }
}
