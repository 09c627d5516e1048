use super::{style::RenderStyle, surface::Surface, topology::Connector};
use crate::{
    error::SurfaceError,
    types::{Landmark, LandmarkList},
};

/// Confidence below which a bridge endpoint is not drawn.
pub const BRIDGE_VISIBILITY_MIN: f32 = 0.1;

pub type LandmarkPair<'a> = (Option<&'a Landmark>, Option<&'a Landmark>);

/// Bridges are only rejected when both ends report visibility.
fn both_visible(from: &Landmark, to: &Landmark, visibility_min: f32) -> bool {
    match (from.visibility, to.visibility) {
        (Some(a), Some(b)) => a >= visibility_min && b >= visibility_min,
        _ => true,
    }
}

/// A landmark without visibility always passes.
fn visible(landmark: &Landmark, visibility_min: f32) -> bool {
    landmark
        .visibility
        .is_none_or(|visibility| visibility >= visibility_min)
}

/// Strokes each pair with the surface's current stroke settings, skipping
/// pairs with a missing or low-confidence endpoint. Returns the number of
/// lines drawn.
pub fn connect<S: Surface + ?Sized>(
    surface: &mut S,
    pairs: &[LandmarkPair<'_>],
) -> Result<usize, SurfaceError> {
    let mut drawn = 0;
    for &(from, to) in pairs {
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };
        if !both_visible(from, to, BRIDGE_VISIBILITY_MIN) {
            continue;
        }
        let size = surface.size();
        surface.stroke_line(from.to_canvas(size), to.to_canvas(size))?;
        drawn += 1;
    }
    Ok(drawn)
}

/// Draws every connector of a topology table in `style`. Either endpoint
/// under the visibility floor drops the connector.
pub fn draw_connectors<S: Surface + ?Sized>(
    surface: &mut S,
    landmarks: &LandmarkList,
    connectors: &[Connector],
    style: &RenderStyle,
) -> Result<usize, SurfaceError> {
    surface.save();
    surface.set_stroke_color(style.color);
    surface.set_line_width(style.line_width);

    let mut stroke = |drawn: usize, &(a, b): &Connector| -> Result<usize, SurfaceError> {
        let (Some(from), Some(to)) = (landmarks.get(a), landmarks.get(b)) else {
            return Ok(drawn);
        };
        if !(visible(from, style.visibility_min) && visible(to, style.visibility_min)) {
            return Ok(drawn);
        }
        let size = surface.size();
        surface.stroke_line(from.to_canvas(size), to.to_canvas(size))?;
        Ok(drawn + 1)
    };
    let outcome = connectors.iter().try_fold(0usize, &mut stroke);

    surface.restore();
    outcome
}

/// Draws a marker for every present landmark at or above the style's
/// visibility floor. Landmarks without visibility always draw.
pub fn draw_landmarks<'a, S, I>(
    surface: &mut S,
    landmarks: I,
    style: &RenderStyle,
) -> Result<usize, SurfaceError>
where
    S: Surface + ?Sized,
    I: IntoIterator<Item = Option<&'a Landmark>>,
{
    surface.save();
    surface.set_stroke_color(style.color);
    surface.set_fill_color(style.fill_color);
    surface.set_line_width(style.line_width);

    let mut mark = |drawn: usize, landmark: &Landmark| -> Result<usize, SurfaceError> {
        if !visible(landmark, style.visibility_min) {
            return Ok(drawn);
        }
        let center = landmark.to_canvas(surface.size());
        surface.draw_marker(center, style.radius.resolve(landmark))?;
        Ok(drawn + 1)
    };
    let outcome = landmarks.into_iter().flatten().try_fold(0usize, &mut mark);

    surface.restore();
    outcome
}
