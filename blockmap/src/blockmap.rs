//! The blockmap: a [`Grid`] of [`CellRing`]s holding handles to objects that
//! live elsewhere.
//!
//! The blockmap never owns what it indexes. Each object keeps its own
//! [`BlockLinks`] listing the cells it is linked into, so removing it only
//! touches those cells.

use std::fmt::{self, Debug};
use std::ops::ControlFlow;

use glam::Vec2;
use log::{debug, info, warn};
use math::{BBox, SlopeType, box_on_line_side};
use smallvec::SmallVec;

use crate::cell::CellRing;
use crate::grid::{CellCoord, CellRange, Grid};
use crate::valid_count::ValidCount;
use crate::{BlockmapConfig, BlockmapError};

/// Cells an object is currently linked into
pub type BlockLinks = SmallVec<[CellCoord; 4]>;

/// A small copyable reference to an object in some arena
pub trait BlockHandle: Copy + Eq + Debug {
    /// Position in the owning arena. Used to stamp visits.
    fn index(self) -> usize;
}

/// What the blockmap needs to know about an object to re-check it exactly
/// after the coarse per-cell lookup.
pub trait Linkable {
    fn origin(&self) -> Vec2;
    fn intersects(&self, bbox: &BBox) -> bool;
}

/// Resolves a handle to its object
pub trait ObjectStore<H> {
    type Object: Linkable + ?Sized;

    fn object(&self, handle: H) -> &Self::Object;
}

impl<H: BlockHandle, T: Linkable> ObjectStore<H> for [T] {
    type Object = T;

    #[inline]
    fn object(&self, handle: H) -> &T {
        &self[handle.index()]
    }
}

pub struct Blockmap<H> {
    grid: Grid<CellRing<H>>,
    total_links: usize,
}

impl<H: BlockHandle> Debug for Blockmap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blockmap")
            .field("origin", &self.grid.origin())
            .field("cell_size", &self.grid.cell_size())
            .field("dimensions", &self.grid.dimensions())
            .field("allocated_cells", &self.grid.allocated_count())
            .field("total_links", &self.total_links)
            .finish()
    }
}

impl<H: BlockHandle> Blockmap<H> {
    /// Build a blockmap over `bounds` with the default margin around it
    pub fn create(bounds: BBox, cell_width: f32, cell_height: f32) -> Result<Self, BlockmapError> {
        Self::build(
            bounds,
            Vec2::new(cell_width, cell_height),
            BlockmapConfig::default().margin,
        )
    }

    pub fn with_config(bounds: BBox, config: &BlockmapConfig) -> Result<Self, BlockmapError> {
        Self::build(bounds, Vec2::splat(config.cell_size), config.margin)
    }

    fn build(bounds: BBox, cell_size: Vec2, margin: f32) -> Result<Self, BlockmapError> {
        let grid = Grid::new(bounds.expand(margin), cell_size)?;
        let (width, height) = grid.dimensions();
        info!(
            "Created blockmap {width}x{height} cells of {}x{}, origin {}",
            cell_size.x,
            cell_size.y,
            grid.origin()
        );
        Ok(Self {
            grid,
            total_links: 0,
        })
    }

    #[inline]
    pub fn grid(&self) -> &Grid<CellRing<H>> {
        &self.grid
    }

    #[inline]
    pub fn bounds(&self) -> &BBox {
        self.grid.bounds()
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.grid.origin()
    }

    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.grid.cell_size()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (CellCoord, bool) {
        self.grid.cell_of(pos)
    }

    #[inline]
    pub fn cell_block_of(&self, bbox: &BBox) -> (CellRange, bool) {
        self.grid.cell_block_of(bbox)
    }

    /// Link `handle` into a single cell. Returns false if it was already
    /// there.
    pub fn link(&mut self, handle: H, cell: CellCoord) -> bool {
        let linked = self.grid.cell_or_insert_with(cell, CellRing::new).link(handle);
        if linked {
            self.total_links += 1;
        }
        linked
    }

    /// Remove `handle` from a single cell. Returns false if it was not there.
    pub fn unlink(&mut self, handle: H, cell: CellCoord) -> bool {
        let unlinked = self
            .grid
            .cell_mut(cell)
            .is_some_and(|ring| ring.unlink(handle));
        if unlinked {
            self.total_links -= 1;
        } else {
            warn!("Tried to unlink {handle:?} from {cell:?} but it was not linked there");
        }
        unlinked
    }

    #[inline]
    fn link_tracked(&mut self, handle: H, cell: CellCoord, links: &mut BlockLinks) {
        if self.link(handle, cell) {
            links.push(cell);
        }
    }

    /// Link a point object into the cell holding `pos`
    pub fn link_point(&mut self, handle: H, pos: Vec2, links: &mut BlockLinks) {
        let (cell, clipped) = self.cell_of(pos);
        if clipped {
            debug!("{handle:?} at {pos} is outside the blockmap, clamped to {cell:?}");
        }
        self.link_tracked(handle, cell, links);
    }

    /// Link into every cell the box overlaps
    pub fn link_box(&mut self, handle: H, bbox: &BBox, links: &mut BlockLinks) {
        let (range, clipped) = self.cell_block_of(bbox);
        if clipped {
            debug!("{handle:?} box {bbox:?} clipped to blockmap bounds");
        }
        for cell in range.iter() {
            self.link_tracked(handle, cell, links);
        }
    }

    /// Link a line segment into the cells it passes through.
    ///
    /// Axis aligned lines fill their whole cell block. Diagonal lines are
    /// tested against the cell diagonal that runs against their slope, and
    /// only cells the line crosses are linked.
    pub fn link_line(&mut self, handle: H, v1: Vec2, v2: Vec2, links: &mut BlockLinks) {
        let delta = v2 - v1;
        let slope = SlopeType::from_delta(delta);
        let (range, _) = self.cell_block_of(&BBox::new(v1, v2));

        for cell in range.iter() {
            if !slope.is_axis_aligned() {
                let cell_box = self.grid.cell_bounds(cell);
                if box_on_line_side(&cell_box, v1, delta, slope) != -1 {
                    continue;
                }
            }
            self.link_tracked(handle, cell, links);
        }
        debug!(
            "Linked line {handle:?} into {} of {} cells",
            links.len(),
            range.len()
        );
    }

    /// Unlink `handle` from every cell in `links` and clear the list
    pub fn unlink_all(&mut self, handle: H, links: &mut BlockLinks) {
        for cell in links.drain(..) {
            self.unlink(handle, cell);
        }
    }

    /// Visit the handles in one cell, newest first
    #[inline]
    pub fn for_all_in_cell(
        &self,
        cell: CellCoord,
        func: impl FnMut(H) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        match self.grid.cell(cell) {
            Some(ring) => ring.for_each(func),
            None => ControlFlow::Continue(()),
        }
    }

    /// Visit each handle in a block of cells once. The caller starts the
    /// sweep on `valid` so several blocks can share one.
    pub fn for_all_in_cell_block(
        &self,
        range: CellRange,
        valid: &mut ValidCount,
        mut func: impl FnMut(H) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        for cell in range.iter() {
            self.for_all_in_cell(cell, |handle| {
                if !valid.mark(handle.index()) {
                    return ControlFlow::Continue(());
                }
                func(handle)
            })?;
        }
        ControlFlow::Continue(())
    }

    /// Visit each handle whose object actually intersects `bbox`
    pub fn for_all_in_box<S: ObjectStore<H> + ?Sized>(
        &self,
        bbox: &BBox,
        store: &S,
        valid: &mut ValidCount,
        mut func: impl FnMut(H) -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let (range, _) = self.cell_block_of(bbox);
        self.for_all_in_cell_block(range, valid, |handle| {
            if store.object(handle).intersects(bbox) {
                return func(handle);
            }
            ControlFlow::Continue(())
        })
    }

    #[inline]
    pub fn cell_link_count(&self, cell: CellCoord) -> usize {
        self.grid.cell(cell).map_or(0, |ring| ring.len())
    }

    #[inline]
    pub fn total_links(&self) -> usize {
        self.total_links
    }

    /// Link count of every cell holding at least one link, in row order
    pub fn occupancy(&self) -> Vec<(CellCoord, usize)> {
        self.grid
            .iter_allocated()
            .filter(|(_, ring)| !ring.is_empty())
            .map(|(cell, ring)| (cell, ring.len()))
            .collect()
    }
}
