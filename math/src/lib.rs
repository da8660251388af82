//! 2D geometry shared by the blockmap and the code that queries it: divlines,
//! boxes, and the side tests Doom uses for line/box classification.

mod bbox;
mod intercept;
mod slope;

pub use bbox::*;
use glam::Vec2;
pub use intercept::*;
pub use slope::*;

/// True if the line segment from point1 to point2 penetrates the circle
#[inline]
pub fn circle_seg_collide(c_origin: Vec2, c_radius: f32, s_start: Vec2, s_end: Vec2) -> bool {
    let lc = c_origin - s_start;
    let d = s_end - s_start;
    let len_sq = d.length_squared();
    if len_sq <= f32::EPSILON {
        return circle_point_intersect(c_origin, c_radius, s_start);
    }
    let t = (lc.dot(d) / len_sq).clamp(0.0, 1.0);
    let nearest = s_start + d * t;
    circle_point_intersect(c_origin, c_radius, nearest)
}

#[inline]
pub fn circle_point_intersect(origin: Vec2, radius: f32, point: Vec2) -> bool {
    let dist = point - origin;
    dist.length() < radius
}
