use glam::Vec2;

/// An axis aligned box in map space. `top` is the largest Y, `right` the
/// largest X.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BBox {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl BBox {
    /// The box enclosing the two points, in any order.
    pub fn new(v1: Vec2, v2: Vec2) -> Self {
        let mut bbox = BBox::default();

        if v1.x < v2.x {
            bbox.left = v1.x;
            bbox.right = v2.x;
        } else {
            bbox.left = v2.x;
            bbox.right = v1.x;
        }

        if v1.y < v2.y {
            bbox.bottom = v1.y;
            bbox.top = v2.y;
        } else {
            bbox.bottom = v2.y;
            bbox.top = v1.y;
        }

        bbox
    }

    /// Square box of half-width `radius` around `center`, the shape Doom uses
    /// for a thing's blocking area.
    #[inline]
    pub fn from_radius(center: Vec2, radius: f32) -> Self {
        Self {
            top: center.y + radius,
            bottom: center.y - radius,
            left: center.x - radius,
            right: center.x + radius,
        }
    }

    /// Smallest box enclosing every point, `None` when there are no points
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = BBox::new(first, first);
        for p in iter {
            bbox.add_point(p);
        }
        Some(bbox)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.left, self.bottom)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right, self.top)
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// False if any extent is NaN or the box is inverted
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.left <= self.right && self.bottom <= self.top
    }

    pub fn add_point(&mut self, p: Vec2) {
        self.left = self.left.min(p.x);
        self.right = self.right.max(p.x);
        self.bottom = self.bottom.min(p.y);
        self.top = self.top.max(p.y);
    }

    #[inline]
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
            left: self.left.min(other.left),
            right: self.right.max(other.right),
        }
    }

    /// Grow the box by `amount` on every side
    #[inline]
    pub fn expand(&self, amount: f32) -> BBox {
        BBox {
            top: self.top + amount,
            bottom: self.bottom - amount,
            left: self.left - amount,
            right: self.right + amount,
        }
    }

    /// Inclusive on all edges
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.bottom && p.y <= self.top
    }

    /// Inclusive overlap test, boxes that only share an edge intersect
    #[inline]
    pub fn intersects(&self, other: &BBox) -> bool {
        self.left <= other.right
            && self.right >= other.left
            && self.bottom <= other.top
            && self.top >= other.bottom
    }
}
