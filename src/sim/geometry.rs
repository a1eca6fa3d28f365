//! Hitbox geometry: integer bounding rects and pixel masks
//!
//! A sprite's hitbox is a `PixelMask` (one bit per pixel) placed in the world
//! by a `Rect` centred on the entity. Rotating a mask grows its canvas to the
//! bounding box of the rotated sprite, so the rect tracks the *current*
//! extents, not the unrotated ones.

use glam::{IVec2, Vec2};
use serde::Serialize;

/// Axis-aligned integer rectangle in screen space (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rect of the given size centred on a world position
    pub fn from_center(center: Vec2, w: u32, h: u32) -> Self {
        let (w, h) = (w as i32, h as i32);
        Self {
            x: center.x.floor() as i32 - w / 2,
            y: center.y.floor() as i32 - h / 2,
            w,
            h,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Strict overlap; rects that only share an edge do not intersect
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// True if `self` lies entirely within `outer`
    pub fn is_inside(&self, outer: &Rect) -> bool {
        self.x >= outer.x && self.y >= outer.y && self.right() <= outer.right() && self.bottom() <= outer.bottom()
    }
}

/// A 1-bit-per-pixel collision mask
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl PixelMask {
    /// Empty mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    /// Rasterise a shape. `inside` receives the pixel centre relative to the
    /// mask centre.
    pub fn from_fn(width: u32, height: u32, inside: impl Fn(f32, f32) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        let (half_w, half_h) = (width as f32 / 2.0, height as f32 / 2.0);
        for y in 0..height {
            for x in 0..width {
                let px = x as f32 + 0.5 - half_w;
                let py = y as f32 + 0.5 - half_h;
                if inside(px, py) {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    /// Filled ellipse
    pub fn ellipse(width: u32, height: u32) -> Self {
        let (rx, ry) = (width as f32 / 2.0, height as f32 / 2.0);
        Self::from_fn(width, height, |x, y| (x / rx).powi(2) + (y / ry).powi(2) <= 1.0)
    }

    /// Filled rectangle
    pub fn filled(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| true)
    }

    /// Triangle pointing along +x (the unrotated ship)
    pub fn dart(width: u32, height: u32) -> Self {
        let (half_w, half_h) = (width as f32 / 2.0, height as f32 / 2.0);
        Self::from_fn(width, height, |x, y| {
            let along = (half_w - x) / width as f32; // 0 at the nose, 1 at the tail
            y.abs() <= half_h * along
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.bits[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x < self.width && y < self.height {
            self.bits[(y * self.width + x) as usize] = value;
        }
    }

    /// Number of set pixels
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Rotate counter-clockwise (as seen on screen) by `degrees`.
    ///
    /// The result is sized to the bounding box of the rotated canvas and
    /// sampled nearest-neighbour from the source.
    pub fn rotated(&self, degrees: f32) -> PixelMask {
        let angle = crate::normalize_degrees(degrees);
        if angle == 0.0 {
            return self.clone();
        }

        let (sin, cos) = angle.to_radians().sin_cos();
        let (w, h) = (self.width as f32, self.height as f32);
        // Shave a hair off so 90/180/270 don't pick up a float-noise pixel
        let out_w = ((w * cos.abs() + h * sin.abs()) - 1e-3).ceil().max(1.0) as u32;
        let out_h = ((w * sin.abs() + h * cos.abs()) - 1e-3).ceil().max(1.0) as u32;

        let mut out = PixelMask::new(out_w, out_h);
        let (out_half_w, out_half_h) = (out_w as f32 / 2.0, out_h as f32 / 2.0);
        for y in 0..out_h {
            for x in 0..out_w {
                let dx = x as f32 + 0.5 - out_half_w;
                let dy = y as f32 + 0.5 - out_half_h;
                let sx = dx * cos - dy * sin + w / 2.0;
                let sy = dx * sin + dy * cos + h / 2.0;
                if sx >= 0.0 && sy >= 0.0 && self.get(sx as u32, sy as u32) {
                    out.set(x, y, true);
                }
            }
        }
        out
    }

    /// First pixel (in `self` coordinates, row-major) set in both masks.
    ///
    /// `offset` is the position of `other`'s top-left relative to `self`'s.
    pub fn overlap(&self, other: &PixelMask, offset: IVec2) -> Option<IVec2> {
        let y_start = offset.y.max(0);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);
        let x_start = offset.x.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);

        for y in y_start..y_end {
            for x in x_start..x_end {
                if self.get(x as u32, y as u32)
                    && other.get((x - offset.x) as u32, (y - offset.y) as u32)
                {
                    return Some(IVec2::new(x, y));
                }
            }
        }
        None
    }
}
