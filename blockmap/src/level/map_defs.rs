//! The runtime records a level is made of, as far as the blockmap cares.

use bitflags::bitflags;
use glam::Vec2;
use math::{BBox, SlopeType, Trace, box_on_line_side, line_point_on_side};

use crate::blockmap::{BlockHandle, BlockLinks, Linkable};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl BlockHandle for $name {
            #[inline]
            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

handle!(
    /// Index of a [`Sector`]
    SectorId
);
handle!(
    /// Index of a [`LineDef`]
    LineId
);
handle!(
    /// Index of a [`MapObject`]
    ThingId
);
handle!(
    /// Index of a [`PolyObj`]
    PolyObjId
);
handle!(
    /// Index of a [`SubSector`]
    SubSectorId
);

/// Only the plane heights are needed for openings. They change as floors and
/// ceilings move.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sector {
    pub floor_height: f32,
    pub ceiling_height: f32,
}

impl Sector {
    pub fn new(floor_height: f32, ceiling_height: f32) -> Self {
        Self {
            floor_height,
            ceiling_height,
        }
    }
}

bitflags! {
    /// The `ML_*` flags of a linedef
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct LineDefFlags: u32 {
        /// Solid, is an obstacle
        const BLOCKING = 1;
        /// Blocks monsters only
        const BLOCK_MONSTERS = 2;
        /// Backside will not be present at all if not two sided
        const TWO_SIDED = 4;
        const DONT_PEG_TOP = 8;
        const DONT_PEG_BOTTOM = 16;
        /// In AutoMap: don't map as two sided: IT'S A SECRET!
        const SECRET = 32;
        /// Sound rendering: don't let sound cross two of these
        const SOUND_BLOCK = 64;
        const DONT_DRAW = 128;
        const MAPPED = 256;
    }
}

pub struct LineDef {
    // Vertices, from v1 to v2.
    pub v1: Vec2,
    pub v2: Vec2,
    // Precalculated v2 - v1 for side checking.
    pub delta: Vec2,
    pub bbox: BBox,
    // To aid move clipping.
    pub slope_type: SlopeType,
    pub flags: LineDefFlags,
    pub special: i16,
    pub tag: i16,

    pub front_sector: SectorId,
    pub back_sector: Option<SectorId>,
    /// Set if this line is part of a polyobject and moves with it
    pub polyobj: Option<PolyObjId>,

    pub block_links: BlockLinks,
}

impl std::fmt::Debug for LineDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineDef")
            .field("v1", &self.v1)
            .field("v2", &self.v2)
            .field("flags", &self.flags)
            .field("special", &self.special)
            .field("slope_type", &self.slope_type)
            .field("front_sector", &self.front_sector)
            .field("back_sector", &self.back_sector)
            .finish_non_exhaustive()
    }
}

impl LineDef {
    pub fn new(v1: Vec2, v2: Vec2, front_sector: SectorId, back_sector: Option<SectorId>) -> Self {
        let mut flags = LineDefFlags::empty();
        if back_sector.is_some() {
            flags |= LineDefFlags::TWO_SIDED;
        } else {
            flags |= LineDefFlags::BLOCKING;
        }
        Self {
            v1,
            v2,
            delta: v2 - v1,
            bbox: BBox::new(v1, v2),
            slope_type: SlopeType::from_delta(v2 - v1),
            flags,
            special: 0,
            tag: 0,
            front_sector,
            back_sector,
            polyobj: None,
            block_links: BlockLinks::new(),
        }
    }

    pub fn with_special(mut self, special: i16, tag: i16) -> Self {
        self.special = special;
        self.tag = tag;
        self
    }

    pub fn with_flags(mut self, flags: LineDefFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Move the vertices and refresh everything derived from them
    pub fn set_vertices(&mut self, v1: Vec2, v2: Vec2) {
        self.v1 = v1;
        self.v2 = v2;
        self.delta = v2 - v1;
        self.bbox = BBox::new(v1, v2);
        self.slope_type = SlopeType::from_delta(self.delta);
    }

    #[inline]
    pub fn is_one_sided(&self) -> bool {
        self.back_sector.is_none()
    }

    /// Both sides face the same sector. Used for rendering tricks and never
    /// blocks anything.
    #[inline]
    pub fn is_self_referencing(&self) -> bool {
        self.back_sector == Some(self.front_sector)
    }

    /// 0 for the front (right) side, 1 for the back
    #[inline]
    pub fn point_on_side(&self, v: Vec2) -> usize {
        line_point_on_side(self.v1, self.delta, v)
    }

    #[inline]
    pub fn divline(&self) -> Trace {
        Trace::new(self.v1, self.delta)
    }
}

impl Linkable for LineDef {
    fn origin(&self) -> Vec2 {
        self.v1
    }

    /// The line crosses the box, not just its bounding box
    fn intersects(&self, bbox: &BBox) -> bool {
        self.bbox.intersects(bbox)
            && box_on_line_side(bbox, self.v1, self.delta, self.slope_type) == -1
    }
}

bitflags! {
    /// The subset of `MF_*` flags the index and its queries look at
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct MapObjFlag: u32 {
        const SPECIAL = 1;
        /// Blocks
        const SOLID = 2;
        /// Can be hit
        const SHOOTABLE = 4;
        /// Don't use the sector links (invisible but touchable)
        const NO_SECTOR = 8;
        /// Don't use the blocklinks (inert but displayable)
        const NO_BLOCKMAP = 16;
    }
}

#[derive(Debug, Clone)]
pub struct MapObject {
    pub xy: Vec2,
    pub z: f32,
    pub radius: f32,
    pub height: f32,
    pub flags: MapObjFlag,
    pub block_links: BlockLinks,
}

impl MapObject {
    pub fn new(xy: Vec2, z: f32, radius: f32, height: f32, flags: MapObjFlag) -> Self {
        Self {
            xy,
            z,
            radius,
            height,
            flags,
            block_links: BlockLinks::new(),
        }
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        BBox::from_radius(self.xy, self.radius)
    }
}

impl Linkable for MapObject {
    fn origin(&self) -> Vec2 {
        self.xy
    }

    fn intersects(&self, bbox: &BBox) -> bool {
        self.bbox().intersects(bbox)
    }
}

/// A group of lines moved and rotated as one body.
///
/// Vertex positions are rebuilt from `origin`, `angle` and the offsets the
/// polyobject was created with, so repeated moves do not drift.
#[derive(Debug, Clone)]
pub struct PolyObj {
    pub lines: Vec<LineId>,
    pub origin: Vec2,
    /// Radians, counter-clockwise
    pub angle: f32,
    /// Each line's vertices relative to `origin` at angle 0
    pub(crate) offsets: Vec<(Vec2, Vec2)>,
    pub bbox: BBox,
    pub block_links: BlockLinks,
}

impl Linkable for PolyObj {
    fn origin(&self) -> Vec2 {
        self.origin
    }

    fn intersects(&self, bbox: &BBox) -> bool {
        self.bbox.intersects(bbox)
    }
}

/// A convex leaf of the BSP
#[derive(Debug, Clone)]
pub struct SubSector {
    pub sector: SectorId,
    pub bbox: BBox,
    pub block_links: BlockLinks,
}

impl SubSector {
    pub fn new(sector: SectorId, bbox: BBox) -> Self {
        Self {
            sector,
            bbox,
            block_links: BlockLinks::new(),
        }
    }
}

impl Linkable for SubSector {
    fn origin(&self) -> Vec2 {
        (self.bbox.min() + self.bbox.max()) * 0.5
    }

    fn intersects(&self, bbox: &BBox) -> bool {
        self.bbox.intersects(bbox)
    }
}
