//! Screen shake compositor
//!
//! The queue holds multiplicative factors, not displacements. Each frame pops
//! one factor and scales the running offset by it, so a burst is an initial
//! kick followed by a decaying, sign-flipping sequence that ends in (0, 0).

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::heading_vector;
use crate::settings::ShakePattern;

/// FIFO of pending shake factors plus the running offset
#[derive(Debug, Clone, Default)]
pub struct ShakeQueue {
    offset: Vec2,
    factors: VecDeque<Vec2>,
}

impl ShakeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current offset, read by everything that moves or draws this frame
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Pending factors
    #[inline]
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Replace the running offset (start of a burst)
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Append factors to the end of the queue
    pub fn extend(&mut self, factors: impl IntoIterator<Item = Vec2>) {
        self.factors.extend(factors);
    }

    /// Advance one frame: pop the head factor, if any, and apply it
    pub fn step(&mut self) -> Vec2 {
        if let Some(factor) = self.factors.pop_front() {
            self.offset *= factor;
        }
        self.offset
    }

    /// Drop all pending shake and zero the offset
    pub fn clear(&mut self) {
        self.factors.clear();
        self.offset = Vec2::ZERO;
    }
}

/// A shake burst request: an initial offset and the factor sequence
#[derive(Debug, Clone, PartialEq)]
pub struct ShakeBurst {
    pub initial: Vec2,
    pub factors: Vec<Vec2>,
}

impl ShakeBurst {
    /// Build the impact burst for a kill, kicked along `heading_degrees`
    pub fn impact(pattern: &ShakePattern, heading_degrees: f32, rng: &mut impl Rng) -> Self {
        let hold = pattern.hold_frames as usize;
        let mut factors = Vec::with_capacity(hold * (pattern.rebounds as usize + 2) + pattern.rebounds as usize + 2);

        factors.extend(std::iter::repeat_n(Vec2::ONE, hold));
        factors.push(Vec2::splat(pattern.kick));
        factors.extend(std::iter::repeat_n(Vec2::ONE, hold));

        let (lo, hi) = if pattern.rebound_min <= pattern.rebound_max {
            (pattern.rebound_min, pattern.rebound_max)
        } else {
            (pattern.rebound_max, pattern.rebound_min)
        };
        for _ in 0..pattern.rebounds {
            factors.push(Vec2::new(rng.random_range(lo..=hi), rng.random_range(lo..=hi)));
            factors.extend(std::iter::repeat_n(Vec2::ONE, hold));
        }

        // Terminal zero: the burst always settles exactly
        factors.push(Vec2::ZERO);

        Self {
            initial: heading_vector(heading_degrees) * pattern.magnitude,
            factors,
        }
    }

    /// Start this burst on a queue
    pub fn apply(self, queue: &mut ShakeQueue) {
        queue.set_offset(self.initial);
        queue.extend(self.factors);
    }
}
