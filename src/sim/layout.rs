//! Zig-zag layout planning
//!
//! Bubbles cascade down the container, alternating left and right of center.
//! Even indices sit left, odd indices right.

use glam::Vec2;

use crate::consts::{LAYOUT_OFFSET_FRACTION, MAX_LAYOUT_OFFSET};

/// Target positions for every bubble at one container size
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub size: Vec2,
    pub positions: Vec<Vec2>,
}

impl LayoutPlan {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }
}

/// Horizontal distance from center for a container of this width
#[inline]
pub fn max_offset(width: f32) -> f32 {
    MAX_LAYOUT_OFFSET.min(width * LAYOUT_OFFSET_FRACTION)
}

/// Plan positions for `count` bubbles in a `width` x `height` container
///
/// Returns `None` until the container has been laid out (either dimension
/// zero, negative or NaN); callers retry on the next size change.
pub fn plan(width: f32, height: f32, count: usize) -> Option<LayoutPlan> {
    if !(width > 0.0 && height > 0.0) {
        return None;
    }

    let center_x = width / 2.0;
    let spacing = height / (count as f32 + 1.0);
    let offset = max_offset(width);

    let positions = (0..count)
        .map(|i| {
            let y = spacing * (i as f32 + 1.0);
            let x = if i % 2 == 0 {
                center_x - offset
            } else {
                center_x + offset
            };
            Vec2::new(x, y)
        })
        .collect();

    Some(LayoutPlan {
        size: Vec2::new(width, height),
        positions,
    })
}
