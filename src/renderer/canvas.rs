//! Software RGBA surface
//!
//! Used both as each tile's cached image and as the frame the session
//! composes every tick.

use bytemuck::{Pod, Zeroable};
use glam::{IVec2, Vec2};

/// One RGBA8 pixel
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// A 2D pixel buffer, row-major, origin top-left
#[derive(Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Create a fully transparent canvas
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width * height],
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Raw RGBA8 bytes, ready for upload to a texture or window surface
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Fill an axis-aligned rectangle, clipped to the canvas
    pub fn fill_rect(&mut self, origin: IVec2, size: IVec2, color: Rgba) {
        let Some((x0, x1)) = clip_span(origin.x, size.x, self.width) else {
            return;
        };
        let Some((y0, y1)) = clip_span(origin.y, size.y, self.height) else {
            return;
        };
        for y in y0..y1 {
            let row = y * self.width;
            self.pixels[row + x0..row + x1].fill(color);
        }
    }

    /// Fill a disc, clipped to the canvas
    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let r2 = radius * radius;
        let min = (center - Vec2::splat(radius)).floor().as_ivec2();
        let max = (center + Vec2::splat(radius)).ceil().as_ivec2();
        for y in min.y.max(0)..max.y.min(self.height as i32) {
            for x in min.x.max(0)..max.x.min(self.width as i32) {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if d.length_squared() <= r2 {
                    self.pixels[y as usize * self.width + x as usize] = color;
                }
            }
        }
    }

    /// Copy `src` onto this canvas at `origin`, skipping transparent pixels
    pub fn blit(&mut self, src: &Canvas, origin: IVec2) {
        let Some((dx0, dx1)) = clip_span(origin.x, src.width as i32, self.width) else {
            return;
        };
        let Some((dy0, dy1)) = clip_span(origin.y, src.height as i32, self.height) else {
            return;
        };
        for dy in dy0..dy1 {
            let sy = (dy as i32 - origin.y) as usize;
            let sx0 = (dx0 as i32 - origin.x) as usize;
            let src_row = &src.pixels[sy * src.width + sx0..sy * src.width + sx0 + (dx1 - dx0)];
            let dst_row = &mut self.pixels[dy * self.width + dx0..dy * self.width + dx1];
            for (dst, &px) in dst_row.iter_mut().zip(src_row) {
                if !px.is_transparent() {
                    *dst = px;
                }
            }
        }
    }
}

/// Intersect `[start, start + len)` with `[0, limit)`
fn clip_span(start: i32, len: i32, limit: usize) -> Option<(usize, usize)> {
    let lo = start.max(0) as i64;
    let hi = (start as i64 + len as i64).min(limit as i64);
    if lo < hi {
        Some((lo as usize, hi as usize))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::rgb(255, 0, 0);

    #[test]
    fn test_fill_rect_clips() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(IVec2::new(-5, 8), IVec2::new(7, 5), RED);
        assert_eq!(canvas.pixel(0, 8), Some(RED));
        assert_eq!(canvas.pixel(1, 9), Some(RED));
        assert_eq!(canvas.pixel(2, 9), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(0, 7), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_blit_offset_and_transparency() {
        let mut src = Canvas::new(4, 4);
        src.fill_rect(IVec2::new(0, 0), IVec2::new(2, 4), RED);

        let mut dst = Canvas::new(8, 4);
        dst.fill(Rgba::BLACK);
        dst.blit(&src, IVec2::new(-1, 0));
        assert_eq!(dst.pixel(0, 0), Some(RED));
        assert_eq!(dst.pixel(1, 0), Some(Rgba::BLACK));

        dst.blit(&src, IVec2::new(6, 2));
        assert_eq!(dst.pixel(6, 2), Some(RED));
        assert_eq!(dst.pixel(7, 3), Some(RED));
        assert_eq!(dst.pixel(6, 1), Some(Rgba::BLACK));

        // Fully off-canvas is a no-op
        dst.blit(&src, IVec2::new(100, 0));
    }

    #[test]
    fn test_fill_circle() {
        let mut canvas = Canvas::new(20, 20);
        canvas.fill_circle(Vec2::new(10.0, 10.0), 3.0, RED);
        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(10, 16), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_as_bytes_layout() {
        let mut canvas = Canvas::new(2, 1);
        canvas.fill(Rgba::new(1, 2, 3, 4));
        assert_eq!(canvas.as_bytes(), &[1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
