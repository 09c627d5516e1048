/// Depth closest to the camera that still changes the marker size.
pub const NEAR_DEPTH: f32 = -0.15;
pub const FAR_DEPTH: f32 = 0.1;
pub const NEAR_RADIUS: f32 = 10.0;
pub const FAR_RADIUS: f32 = 1.0;

/// Maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`, clamping
/// to the input domain first. Either range may be descending.
pub fn lerp(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if in_max == in_min {
        return out_min;
    }
    let t = ((value - in_min) / (in_max - in_min)).clamp(0.0, 1.0);
    out_min + t * (out_max - out_min)
}

/// Marker radius for a hand point; nearer points draw larger. A point without
/// depth is treated as lying on the image plane.
pub fn hand_marker_radius(z: Option<f32>) -> f32 {
    lerp(z.unwrap_or(0.0), NEAR_DEPTH, FAR_DEPTH, NEAR_RADIUS, FAR_RADIUS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_outside_the_domain() {
        assert_eq!(hand_marker_radius(Some(-0.15)), 10.0);
        assert_eq!(hand_marker_radius(Some(-3.0)), 10.0);
        assert_eq!(hand_marker_radius(Some(0.1)), 1.0);
        assert_eq!(hand_marker_radius(Some(42.0)), 1.0);
    }

    #[test]
    fn decreases_through_the_domain() {
        let mut previous = f32::INFINITY;
        let steps = 50;
        for i in 0..=steps {
            let z = NEAR_DEPTH + (FAR_DEPTH - NEAR_DEPTH) * i as f32 / steps as f32;
            let radius = hand_marker_radius(Some(z));
            assert!(radius <= previous, "radius rose at z={z}");
            assert!((FAR_RADIUS..=NEAR_RADIUS).contains(&radius));
            previous = radius;
        }
    }

    #[test]
    fn midpoint_maps_to_midpoint() {
        let mid = (NEAR_DEPTH + FAR_DEPTH) / 2.0;
        assert!((hand_marker_radius(Some(mid)) - 5.5).abs() < 1e-4);
    }

    #[test]
    fn stays_within_output_bounds_for_any_input() {
        for value in [-1e9, -1.0, -0.2, 0.0, 0.05, 0.5, 1e9] {
            let ascending = lerp(value, 0.0, 1.0, 2.0, 8.0);
            assert!((2.0..=8.0).contains(&ascending));
            let descending = lerp(value, 0.0, 1.0, 8.0, 2.0);
            assert!((2.0..=8.0).contains(&descending));
        }
    }

    #[test]
    fn degenerate_domain_returns_out_min() {
        assert_eq!(lerp(0.3, 1.0, 1.0, 4.0, 9.0), 4.0);
    }

    #[test]
    fn missing_depth_uses_image_plane() {
        assert_eq!(hand_marker_radius(None), hand_marker_radius(Some(0.0)));
    }
}
