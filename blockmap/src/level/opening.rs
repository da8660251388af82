use crate::level::map_defs::Sector;

/// The vertical gap through a line, like `P_LineOpening`.
///
/// Never stored on the line. Plane heights move every tick so it is worked out
/// again each time it is needed.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct LineOpening {
    /// The lowest ceiling of the two sides
    pub top: f32,
    /// The highest floor of the two sides
    pub bottom: f32,
    /// Range between `bottom` and `top`
    pub range: f32,
    /// The lowest floor of the two sides
    pub low_floor: f32,
}

impl LineOpening {
    /// Nothing has narrowed it yet. `low_floor` starts above everything so
    /// the first narrow sets it.
    pub const UNBOUNDED: LineOpening = LineOpening {
        top: f32::INFINITY,
        bottom: f32::NEG_INFINITY,
        range: f32::INFINITY,
        low_floor: f32::INFINITY,
    };

    /// A one sided line has no opening at all. It is shut at the front
    /// floor, which keeps `low_floor` meaningful when narrowing by it.
    #[inline]
    pub fn new(front: &Sector, back: Option<&Sector>) -> Self {
        let Some(back) = back else {
            return LineOpening {
                top: front.floor_height,
                bottom: front.floor_height,
                range: 0.0,
                low_floor: front.floor_height,
            };
        };

        let top = front.ceiling_height.min(back.ceiling_height);
        let (bottom, low_floor) = if front.floor_height > back.floor_height {
            (front.floor_height, back.floor_height)
        } else {
            (back.floor_height, front.floor_height)
        };

        LineOpening {
            top,
            bottom,
            range: top - bottom,
            low_floor,
        }
    }

    /// Nothing fits through
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.range <= 0.0
    }

    /// Shrink to the part shared with `other`
    #[inline]
    pub fn narrow(&mut self, other: &LineOpening) {
        self.top = self.top.min(other.top);
        self.bottom = self.bottom.max(other.bottom);
        self.low_floor = self.low_floor.min(other.low_floor);
        self.range = self.top - self.bottom;
    }
}
