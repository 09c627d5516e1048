use crate::types::Landmark;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xffffff);
    pub const BLACK: Color = Color::rgb(0x000000);
    pub const ORANGE: Color = Color::rgb(0xff8a00);
    pub const CYAN: Color = Color::rgb(0x00d9e7);
    pub const LIGHT_GRAY: Color = Color::rgb(0xe0e0e0);
    pub const MESH_GRAY: Color = Color::rgba(0xc0c0c070);

    /// `0xRRGGBB`, fully opaque.
    pub const fn rgb(hex: u32) -> Self {
        Self::rgba((hex << 8) | 0xff)
    }

    /// `0xRRGGBBAA`.
    pub const fn rgba(hex: u32) -> Self {
        Self {
            r: (hex >> 24) as u8,
            g: (hex >> 16) as u8,
            b: (hex >> 8) as u8,
            a: hex as u8,
        }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// How a marker's radius is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Radius {
    Fixed(f32),
    /// Computed per landmark from its depth.
    FromDepth(fn(Option<f32>) -> f32),
}

impl Radius {
    pub fn resolve(&self, landmark: &Landmark) -> f32 {
        match self {
            Radius::Fixed(radius) => *radius,
            Radius::FromDepth(map) => map(landmark.z),
        }
    }
}

/// Per-pass drawing configuration. Defaults mirror the drawing utilities:
/// white, 4px lines, 6px markers, a 0.5 visibility floor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub color: Color,
    pub fill_color: Color,
    pub line_width: f32,
    pub radius: Radius,
    pub visibility_min: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            fill_color: Color::WHITE,
            line_width: 4.0,
            radius: Radius::Fixed(6.0),
            visibility_min: 0.5,
        }
    }
}

impl RenderStyle {
    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn fill(mut self, fill_color: Color) -> Self {
        self.fill_color = fill_color;
        self
    }

    pub fn line_width(mut self, line_width: f32) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn radius(mut self, radius: Radius) -> Self {
        self.radius = radius;
        self
    }

    pub fn visibility_min(mut self, visibility_min: f32) -> Self {
        self.visibility_min = visibility_min;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_constructors_split_channels() {
        assert_eq!(Color::ORANGE.to_array(), [255, 138, 0, 255]);
        assert_eq!(Color::CYAN.to_array(), [0, 217, 231, 255]);
        assert_eq!(Color::MESH_GRAY.to_array(), [0xc0, 0xc0, 0xc0, 0x70]);
    }

    #[test]
    fn depth_radius_reads_landmark_z() {
        let radius = Radius::FromDepth(|z| z.unwrap_or(0.0) * 10.0);
        let landmark = Landmark::new(0.0, 0.0).with_z(0.5);
        assert_eq!(radius.resolve(&landmark), 5.0);
        assert_eq!(Radius::Fixed(3.0).resolve(&landmark), 3.0);
    }
}
