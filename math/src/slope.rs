use glam::Vec2;

use crate::BBox;

/// Line classification used to pick cheap side tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeType {
    Horizontal,
    Vertical,
    Positive,
    Negative,
}

impl SlopeType {
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x == 0.0 {
            SlopeType::Vertical
        } else if delta.y == 0.0 {
            SlopeType::Horizontal
        } else if delta.y / delta.x > 0.0 {
            SlopeType::Positive
        } else {
            SlopeType::Negative
        }
    }

    /// Axis aligned lines cover every cell of their bounding block
    #[inline]
    pub fn is_axis_aligned(&self) -> bool {
        matches!(self, SlopeType::Horizontal | SlopeType::Vertical)
    }
}

/// Which side of the line `v1 -> v1 + delta` the point is on. 0 is front.
#[inline]
pub fn line_point_on_side(v1: Vec2, delta: Vec2, v: Vec2) -> usize {
    let dx = v.x - v1.x;
    let dy = v.y - v1.y;

    if (dy * delta.x) <= (delta.y * dx) {
        // Front side
        return 0;
    }
    // Backside
    1
}

/// Returns the side the box is on, or -1 if the line runs through the box at
/// all.
///
/// Doom function name `P_BoxOnLineSide`
pub fn box_on_line_side(tmbox: &BBox, v1: Vec2, delta: Vec2, slope: SlopeType) -> i32 {
    let p1;
    let p2;

    match slope {
        SlopeType::Horizontal => {
            p1 = (tmbox.top > v1.y) as i32;
            p2 = (tmbox.bottom > v1.y) as i32;
            if delta.x < 0.0 {
                return if p1 == p2 { p1 ^ 1 } else { -1 };
            }
        }
        SlopeType::Vertical => {
            p1 = (tmbox.right < v1.x) as i32;
            p2 = (tmbox.left < v1.x) as i32;
            if delta.y < 0.0 {
                return if p1 == p2 { p1 ^ 1 } else { -1 };
            }
        }
        SlopeType::Positive => {
            p1 = line_point_on_side(v1, delta, Vec2::new(tmbox.left, tmbox.top)) as i32;
            p2 = line_point_on_side(v1, delta, Vec2::new(tmbox.right, tmbox.bottom)) as i32;
        }
        SlopeType::Negative => {
            p1 = line_point_on_side(v1, delta, Vec2::new(tmbox.right, tmbox.top)) as i32;
            p2 = line_point_on_side(v1, delta, Vec2::new(tmbox.left, tmbox.bottom)) as i32;
        }
    }

    if p1 == p2 {
        return p1;
    }
    -1
}
