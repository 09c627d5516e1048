use std::path::Path;

use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use image::RgbaImage;
use rayon::prelude::*;

use super::{StateStack, Surface};
use crate::{
    error::SurfaceError,
    pipeline::style::Color,
    types::{CanvasSize, Frame, Point},
};

/// Software canvas over a straight-alpha RGBA buffer.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    size: CanvasSize,
    pixels: Vec<u8>,
    state: StateStack,
}

impl RasterSurface {
    pub fn new(size: CanvasSize) -> Self {
        Self {
            size,
            pixels: vec![0u8; buffer_len(size)],
            state: StateStack::default(),
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn to_image(&self, mirror: bool) -> Option<RgbaImage> {
        let mut rgba = self.pixels.clone();
        if mirror {
            let stride = self.size.width as usize * 4;
            if stride > 0 {
                rgba.par_chunks_exact_mut(stride).for_each(mirror_row);
            }
        }
        RgbaImage::from_raw(self.size.width, self.size.height, rgba)
    }

    pub fn save_png(&self, path: &Path, mirror: bool) -> Result<()> {
        let image = self
            .to_image(mirror)
            .ok_or_else(|| anyhow!("canvas buffer does not match its size"))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn put_pixel_safe(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 {
            return;
        }
        let (ux, uy) = (x as u32, y as u32);
        if ux >= self.size.width || uy >= self.size.height {
            return;
        }
        let idx = ((uy as usize) * (self.size.width as usize) + ux as usize) * 4;
        if let Some(dst) = self.pixels.get_mut(idx..idx + 4) {
            blend(dst, color);
        }
    }

    fn draw_line(&mut self, p0: Point, p1: Point, color: [u8; 4], thickness: i32) {
        let radius = (thickness.max(1) - 1) / 2;
        let Some((p0, p1)) = clip_segment(p0, p1, self.size, radius as f32) else {
            return;
        };

        let (mut x0, mut y0) = (p0.x as i32, p0.y as i32);
        let (x1, y1) = (p1.x as i32, p1.y as i32);
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel_safe(x0, y0, color);
            if radius > 0 {
                for ox in -radius..=radius {
                    for oy in -radius..=radius {
                        if ox == 0 && oy == 0 {
                            continue;
                        }
                        if ox.abs() + oy.abs() <= radius {
                            self.put_pixel_safe(x0 + ox, y0 + oy, color);
                        }
                    }
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Visits every pixel whose center lies within `outer` of `center`,
    /// passing its distance from the center.
    fn for_each_in_disc(
        &mut self,
        center: Point,
        outer: f32,
        mut paint: impl FnMut(f32) -> Option<[u8; 4]>,
    ) {
        let min_x = (center.x - outer).floor().max(0.0) as i32;
        let min_y = (center.y - outer).floor().max(0.0) as i32;
        let max_x = (center.x + outer).ceil().min(self.size.width as f32) as i32;
        let max_y = (center.y + outer).ceil().min(self.size.height as f32) as i32;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                let dist = (dx * dx + dy * dy).sqrt();
                if dist > outer {
                    continue;
                }
                if let Some(color) = paint(dist) {
                    self.put_pixel_safe(x, y, color);
                }
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> CanvasSize {
        self.size
    }

    fn resize(&mut self, size: CanvasSize) -> Result<(), SurfaceError> {
        self.size = size;
        self.pixels = vec![0u8; buffer_len(size)];
        self.state.reset();
        Ok(())
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_image(&mut self, image: &Frame) -> Result<(), SurfaceError> {
        if self.size.is_empty() {
            return Err(SurfaceError::ZeroSized(self.size));
        }
        let expected = buffer_len(image.size());
        if image.rgba.len() != expected {
            return Err(SurfaceError::FrameBufferMismatch {
                got: image.rgba.len(),
                expected,
            });
        }

        let scaled = if image.size() == self.size {
            image.rgba.clone()
        } else {
            let src_image = fir::images::Image::from_vec_u8(
                image.width,
                image.height,
                image.rgba.clone(),
                fir::PixelType::U8x4,
            )
            .map_err(|err| SurfaceError::Resize(err.to_string()))?;
            let mut dst_image =
                fir::images::Image::new(self.size.width, self.size.height, fir::PixelType::U8x4);
            let mut resizer = fir::Resizer::new();
            let resize_options = fir::ResizeOptions::new()
                .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
            resizer
                .resize(&src_image, &mut dst_image, Some(&resize_options))
                .map_err(|err| SurfaceError::Resize(err.to_string()))?;
            dst_image.into_vec()
        };

        self.pixels
            .par_chunks_exact_mut(4)
            .zip(scaled.par_chunks_exact(4))
            .for_each(|(dst, src)| blend(dst, [src[0], src[1], src[2], src[3]]));
        Ok(())
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.current_mut().stroke = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.current_mut().fill = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.state.current_mut().line_width = width;
    }

    fn stroke_line(&mut self, from: Point, to: Point) -> Result<(), SurfaceError> {
        let state = *self.state.current();
        let thickness = state.line_width.round().max(1.0) as i32;
        self.draw_line(from, to, state.stroke.to_array(), thickness);
        Ok(())
    }

    fn draw_marker(&mut self, center: Point, radius: f32) -> Result<(), SurfaceError> {
        if !(center.x.is_finite() && center.y.is_finite() && radius.is_finite()) || radius <= 0.0 {
            return Ok(());
        }
        let state = *self.state.current();
        let half_width = state.line_width.max(0.0) / 2.0;

        let fill = state.fill.to_array();
        self.for_each_in_disc(center, radius, |_| Some(fill));

        let stroke = state.stroke.to_array();
        let inner = (radius - half_width).max(0.0);
        self.for_each_in_disc(center, radius + half_width, |dist| {
            (dist >= inner).then_some(stroke)
        });
        Ok(())
    }
}

fn buffer_len(size: CanvasSize) -> usize {
    (size.width as usize)
        .saturating_mul(size.height as usize)
        .saturating_mul(4)
}

/// Source-over compositing of a straight-alpha color onto `dst`.
fn blend(dst: &mut [u8], color: [u8; 4]) {
    let alpha = color[3] as u32;
    if alpha == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    if alpha == 0 {
        return;
    }
    let inv = 255 - alpha;
    for channel in 0..3 {
        let mixed = color[channel] as u32 * alpha + dst[channel] as u32 * inv;
        dst[channel] = ((mixed + 127) / 255) as u8;
    }
    dst[3] = (alpha + (dst[3] as u32 * inv + 127) / 255).min(255) as u8;
}

fn mirror_row(row: &mut [u8]) {
    let width = row.len() / 4;
    for i in 0..width / 2 {
        let j = width - 1 - i;
        for channel in 0..4 {
            row.swap(i * 4 + channel, j * 4 + channel);
        }
    }
}

/// Liang-Barsky clip against the canvas grown by `margin`. Non-finite
/// endpoints yield nothing.
fn clip_segment(p0: Point, p1: Point, size: CanvasSize, margin: f32) -> Option<(Point, Point)> {
    if ![p0.x, p0.y, p1.x, p1.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (min_x, min_y) = (-margin, -margin);
    let (max_x, max_y) = (size.width as f32 + margin, size.height as f32 + margin);
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;

    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [
        (-dx, p0.x - min_x),
        (dx, max_x - p0.x),
        (-dy, p0.y - min_y),
        (dy, max_y - p0.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        Point::new(p0.x + t0 * dx, p0.y + t0 * dy),
        Point::new(p0.x + t1 * dx, p0.y + t1 * dy),
    ))
}
