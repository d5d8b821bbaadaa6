//! CPU framebuffer with a transform stack
//!
//! The drawing surface the game needs is deliberately small: translated,
//! rotated, scaled rects and ellipses, plus raw pixel read/write. The
//! visibility dim pass multiplies RGB per pixel and the periscope cutout
//! zeroes alpha per pixel, which is why shapes alone are not enough.
//!
//! Shapes are rasterized by inverse mapping: walk the transformed bounding
//! box and test each pixel center back in local coordinates.

use glam::{Affine2, Vec2};

/// RGBA8 raster with a push/pop affine transform stack
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    transform: Affine2,
    stack: Vec<Affine2>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
            transform: Affine2::IDENTITY,
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    /// Fill the whole buffer with an opaque color and reset the transform
    pub fn clear(&mut self, rgb: [u8; 3]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = rgb[0];
            px[1] = rgb[1];
            px[2] = rgb[2];
            px[3] = 255;
        }
        self.transform = Affine2::IDENTITY;
        self.stack.clear();
    }

    pub fn push(&mut self) {
        self.stack.push(self.transform);
    }

    pub fn pop(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.transform = t;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    pub fn scale(&mut self, factor: f32) {
        self.transform = self.transform * Affine2::from_scale(Vec2::splat(factor));
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        (y * self.width + x) * 4
    }

    /// Read one pixel; out-of-bounds reads come back transparent black
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0; 4];
        }
        let i = self.offset(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Source-over blend of one pixel. Fully opaque sources overwrite.
    pub fn blend_pixel(&mut self, x: usize, y: usize, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        let sa = color[3] as f32 / 255.0;
        if color[3] == 255 {
            self.pixels[i..i + 4].copy_from_slice(&color);
            return;
        }
        for c in 0..3 {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (color[c] as f32 * sa + dst * (1.0 - sa)).round() as u8;
        }
        let da = self.pixels[i + 3] as f32 / 255.0;
        self.pixels[i + 3] = ((sa + da * (1.0 - sa)) * 255.0).round() as u8;
    }

    /// Multiply a pixel's RGB channels, leaving alpha untouched
    pub fn dim_rgb(&mut self, x: usize, y: usize, factor: f32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        for c in 0..3 {
            self.pixels[i + c] = (self.pixels[i + c] as f32 * factor) as u8;
        }
    }

    /// Force a pixel fully transparent, leaving RGB untouched
    pub fn zero_alpha(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.pixels[i + 3] = 0;
    }

    /// Pixel bounding box of a local-space rect under the current transform,
    /// clipped to the buffer
    fn transformed_bounds(&self, x: f32, y: f32, w: f32, h: f32) -> (usize, usize, usize, usize) {
        let corners = [
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x, y + h),
            Vec2::new(x + w, y + h),
        ];
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for c in corners {
            let p = self.transform.transform_point2(c);
            min = min.min(p);
            max = max.max(p);
        }
        let x0 = min.x.floor().max(0.0) as usize;
        let y0 = min.y.floor().max(0.0) as usize;
        let x1 = (max.x.ceil() as isize).clamp(0, self.width as isize) as usize;
        let y1 = (max.y.ceil() as isize).clamp(0, self.height as isize) as usize;
        (x0, y0, x1, y1)
    }

    /// Filled rect in local coordinates under the current transform
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        let (x0, y0, x1, y1) = self.transformed_bounds(x, y, w, h);
        let inverse = self.transform.inverse();

        for py in y0..y1 {
            for px in x0..x1 {
                let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let local = inverse.transform_point2(center);
                if local.x >= x && local.x < x + w && local.y >= y && local.y < y + h {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    /// Filled ellipse centered at (cx, cy) with diameters (w, h), in local
    /// coordinates under the current transform
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: [u8; 4]) {
        let (rx, ry) = (w / 2.0, h / 2.0);
        let (x0, y0, x1, y1) = self.transformed_bounds(cx - rx, cy - ry, w, h);
        let inverse = self.transform.inverse();

        for py in y0..y1 {
            for px in x0..x1 {
                let center = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let local = inverse.transform_point2(center);
                let dx = (local.x - cx) / rx;
                let dy = (local.y - cy) / ry;
                if dx * dx + dy * dy <= 1.0 {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_opaque() {
        let mut f = Frame::new(4, 4);
        f.clear([10, 20, 30]);
        assert_eq!(f.pixel(0, 0), [10, 20, 30, 255]);
        assert_eq!(f.pixel(3, 3), [10, 20, 30, 255]);
    }

    #[test]
    fn rect_respects_translation_and_scale() {
        let mut f = Frame::new(16, 16);
        f.clear([0, 0, 0]);
        f.push();
        f.translate(Vec2::new(4.0, 4.0));
        f.scale(2.0);
        f.fill_rect(0.0, 0.0, 2.0, 2.0, [255, 0, 0, 255]);
        f.pop();

        // Local 2x2 at scale 2 covers screen pixels [4, 8)
        assert_eq!(f.pixel(4, 4), [255, 0, 0, 255]);
        assert_eq!(f.pixel(7, 7), [255, 0, 0, 255]);
        assert_eq!(f.pixel(8, 8), [0, 0, 0, 255]);
        assert_eq!(f.pixel(3, 4), [0, 0, 0, 255]);
    }

    #[test]
    fn rotated_rect_moves_pixels() {
        let mut f = Frame::new(16, 16);
        f.clear([0, 0, 0]);
        f.push();
        f.translate(Vec2::new(8.0, 8.0));
        f.rotate(std::f32::consts::FRAC_PI_2);
        // Local +x now points along screen +y
        f.fill_rect(2.0, -1.0, 4.0, 2.0, [0, 255, 0, 255]);
        f.pop();

        assert_eq!(f.pixel(8, 11), [0, 255, 0, 255]);
        assert_eq!(f.pixel(11, 8), [0, 0, 0, 255]);
    }

    #[test]
    fn dim_leaves_alpha_alone() {
        let mut f = Frame::new(2, 2);
        f.clear([200, 100, 50]);
        f.dim_rgb(0, 0, 0.1);
        assert_eq!(f.pixel(0, 0), [20, 10, 5, 255]);
        assert_eq!(f.pixel(1, 1), [200, 100, 50, 255]);
    }

    #[test]
    fn zero_alpha_leaves_rgb_alone() {
        let mut f = Frame::new(2, 2);
        f.clear([200, 100, 50]);
        f.zero_alpha(1, 0);
        assert_eq!(f.pixel(1, 0), [200, 100, 50, 0]);
    }

    #[test]
    fn translucent_blend_mixes_colors() {
        let mut f = Frame::new(2, 2);
        f.clear([0, 0, 0]);
        f.blend_pixel(0, 0, [255, 0, 0, 128]);
        let [r, g, b, a] = f.pixel(0, 0);
        assert!(r > 100 && r < 150);
        assert_eq!((g, b), (0, 0));
        assert_eq!(a, 255);
    }

    #[test]
    fn ellipse_stays_inside_its_rect() {
        let mut f = Frame::new(16, 16);
        f.clear([0, 0, 0]);
        f.fill_ellipse(8.0, 8.0, 8.0, 4.0, [255, 255, 255, 255]);

        assert_eq!(f.pixel(8, 8), [255, 255, 255, 255]);
        // Corners of the bounding rect are outside the ellipse
        assert_eq!(f.pixel(4, 6), [0, 0, 0, 255]);
        assert_eq!(f.pixel(12, 10), [0, 0, 0, 255]);
    }
}
