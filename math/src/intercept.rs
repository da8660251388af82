use glam::Vec2;

/// Used in path tracing for intercepts
/// Is divline + trace types
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trace {
    pub xy: Vec2,
    pub dxy: Vec2,
}

impl Trace {
    #[inline]
    pub const fn new(xy: Vec2, dxy: Vec2) -> Self {
        Self { xy, dxy }
    }

    /// Build the divline running from `start` to `end`
    #[inline]
    pub fn from_points(start: Vec2, end: Vec2) -> Self {
        Self {
            xy: start,
            dxy: end - start,
        }
    }

    #[inline]
    pub fn end(&self) -> Vec2 {
        self.xy + self.dxy
    }

    /// The point at fraction `frac` along the divline
    #[inline]
    pub fn point_at(&self, frac: f32) -> Vec2 {
        self.xy + self.dxy * frac
    }
}

/// Signed area of the triangle (trace origin, trace end, point). Negative or
/// zero is the front (right) side.
#[inline]
pub fn side_value(trace: Trace, v2: Vec2) -> f32 {
    let dx = v2.x - trace.xy.x;
    let dy = v2.y - trace.xy.y;
    dy * trace.dxy.x - trace.dxy.y * dx
}

/// Determine which side of the trace the vector point is on
#[inline]
pub fn point_on_side(trace: Trace, v2: Vec2) -> usize {
    if side_value(trace, v2) <= 0.0 {
        // Front side
        return 0;
    }
    // Backside
    1
}

/// Returns the fractional intercept point along the first divline, or `None`
/// if the two are parallel.
///
/// The lines can be pictured as arg1 being an infinite plane, and arg2 being
/// the line to check if intersected by the plane.
///
/// P_InterceptVector
#[inline]
pub fn intercept_vector(v2: Trace, v1: Trace) -> Option<f32> {
    let denominator = (v1.dxy.y * v2.dxy.x) - (v1.dxy.x * v2.dxy.y);
    if denominator.abs() <= f32::EPSILON {
        return None;
    }
    let numerator = ((v1.xy.x - v2.xy.x) * v1.dxy.y) + ((v2.xy.y - v1.xy.y) * v1.dxy.x);
    Some(numerator / denominator)
}
