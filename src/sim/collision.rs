//! Collision detection between sprite hitboxes
//!
//! Two phases: a cheap bounding-rect overlap filter, then a pixel-accurate mask
//! test only when the rects overlap. Rects overlapping with no shared pixel is
//! the common case and simply means "no collision".
//!
//! Hits are edge-triggered: `ContactLatch` reports only the transition into
//! contact, so a mask overlap that lasts several frames counts once.

use glam::{IVec2, Vec2};
use serde::Serialize;

use super::geometry::{PixelMask, Rect};

/// An entity's placed collision shape for the current frame. The default is
/// empty and never collides.
#[derive(Debug, Clone, Default)]
pub struct Hitbox {
    pub rect: Rect,
    pub mask: PixelMask,
}

impl Hitbox {
    /// Place a (possibly rotated) mask centred on `center`
    pub fn new(center: Vec2, mask: PixelMask) -> Self {
        Self {
            rect: Rect::from_center(center, mask.width(), mask.height()),
            mask,
        }
    }

    /// Re-centre without touching the mask
    pub fn move_to(&mut self, center: Vec2) {
        self.rect = Rect::from_center(center, self.mask.width(), self.mask.height());
    }

    /// Half the current extents, for edge tests
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.mask.size() / 2.0
    }
}

/// Result of a precise overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// First shared pixel, in the first hitbox's mask coordinates
    pub point: IVec2,
    /// That pixel relative to the first hitbox's centre (screen space)
    pub offset: Vec2,
}

impl Contact {
    /// Heading (degrees) from the first hitbox's centre toward the contact
    pub fn impact_heading(&self) -> f32 {
        if self.offset.length_squared() < f32::EPSILON {
            return 0.0;
        }
        (-self.offset.y)
            .atan2(self.offset.x)
            .to_degrees()
            .rem_euclid(360.0)
    }
}

/// Check whether two hitboxes overlap, rect first, then mask
pub fn test_overlap(a: &Hitbox, b: &Hitbox) -> Option<Contact> {
    if !a.rect.intersects(&b.rect) {
        return None;
    }

    let offset = b.rect.top_left() - a.rect.top_left();
    let point = a.mask.overlap(&b.mask, offset)?;
    let center = a.mask.size() / 2.0;
    Some(Contact {
        point,
        offset: point.as_vec2() + Vec2::splat(0.5) - center,
    })
}

/// Edge detector for "currently colliding" state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContactLatch {
    touching: bool,
}

impl ContactLatch {
    /// Feed this frame's contact state. Returns true only on the transition
    /// from "not touching" to "touching".
    pub fn update(&mut self, touching: bool) -> bool {
        let rising = touching && !self.touching;
        self.touching = touching;
        rising
    }

    /// Track contact without reporting an edge
    pub fn prime(&mut self, touching: bool) {
        self.touching = touching;
    }

    #[inline]
    pub fn is_touching(&self) -> bool {
        self.touching
    }

    pub fn reset(&mut self) {
        self.touching = false;
    }
}
