//! Uniform partition of map space into fixed size cells.
//!
//! The grid owns the cell storage and the mapping from map coordinates to
//! cell coordinates. Cells are allocated the first time something is stored
//! in them; a cell that was never used is a "null cell" and reads as empty.

use std::fmt::{self, Debug};

use glam::Vec2;
use math::BBox;

use crate::BlockmapError;

/// Column/row of one cell. Always inside the grid it came from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    #[inline]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// An inclusive rectangle of cells.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub min: CellCoord,
    pub max: CellCoord,
}

impl CellRange {
    #[inline]
    pub const fn new(min: CellCoord, max: CellCoord) -> Self {
        Self { min, max }
    }

    #[inline]
    pub const fn single(cell: CellCoord) -> Self {
        Self {
            min: cell,
            max: cell,
        }
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.max.x - self.min.x + 1
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        self.max.y - self.min.y + 1
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Row by row from the bottom left cell
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + use<> {
        let CellRange { min, max } = *self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| CellCoord::new(x, y)))
    }
}

pub struct Grid<T> {
    origin: Vec2,
    bounds: BBox,
    cell_size: Vec2,
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
}

impl<T> Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("origin", &self.origin)
            .field("cell_size", &self.cell_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("allocated", &self.allocated_count())
            .finish_non_exhaustive()
    }
}

impl<T> Grid<T> {
    /// Partition `bounds` into cells of `cell_size`. The last row and column
    /// may extend past `bounds`.
    pub fn new(bounds: BBox, cell_size: Vec2) -> Result<Self, BlockmapError> {
        if !(cell_size.x > 0.0 && cell_size.y > 0.0 && cell_size.is_finite()) {
            return Err(BlockmapError::InvalidCellSize {
                width: cell_size.x,
                height: cell_size.y,
            });
        }
        if !bounds.is_valid() || !bounds.min().is_finite() || !bounds.max().is_finite() {
            return Err(BlockmapError::InvalidBounds(format!("{bounds:?}")));
        }

        let extent = (bounds.max() - bounds.min()) / cell_size;
        let width = (extent.x.ceil() as u32).max(1);
        let height = (extent.y.ceil() as u32).max(1);

        let mut cells = Vec::new();
        cells.resize_with(width as usize * height as usize, || None);

        Ok(Self {
            origin: bounds.min(),
            bounds,
            cell_size,
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn bounds(&self) -> &BBox {
        &self.bounds
    }

    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Width and height in cells
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Every cell of the grid
    #[inline]
    pub fn full_range(&self) -> CellRange {
        CellRange::new(
            CellCoord::new(0, 0),
            CellCoord::new(self.width - 1, self.height - 1),
        )
    }

    #[inline]
    fn axis_to_cell(value: f32, origin: f32, size: f32, count: u32) -> u32 {
        // `as` saturates, and NaN becomes 0
        let c = ((value - origin) / size).floor() as i64;
        c.clamp(0, count as i64 - 1) as u32
    }

    /// The cell containing `pos`. Positions outside the bounds are clamped to
    /// the nearest edge cell, and the second value reports that clipping
    /// happened.
    #[inline]
    pub fn cell_of(&self, pos: Vec2) -> (CellCoord, bool) {
        let clipped = !self.bounds.contains_point(pos);
        let x = Self::axis_to_cell(pos.x, self.origin.x, self.cell_size.x, self.width);
        let y = Self::axis_to_cell(pos.y, self.origin.y, self.cell_size.y, self.height);
        (CellCoord::new(x, y), clipped)
    }

    /// `cell_of` without the clip report
    #[inline]
    pub fn cell_at(&self, pos: Vec2) -> CellCoord {
        self.cell_of(pos).0
    }

    /// The block of cells overlapped by `bbox`. Each corner is clipped on its
    /// own; the flag is set if either was.
    #[inline]
    pub fn cell_block_of(&self, bbox: &BBox) -> (CellRange, bool) {
        let (min, min_clipped) = self.cell_of(bbox.min());
        let (max, max_clipped) = self.cell_of(bbox.max());
        (CellRange::new(min, max), min_clipped | max_clipped)
    }

    /// Map space box covered by a cell
    #[inline]
    pub fn cell_bounds(&self, cell: CellCoord) -> BBox {
        let min = self.origin + self.cell_size * Vec2::new(cell.x as f32, cell.y as f32);
        BBox::new(min, min + self.cell_size)
    }

    #[inline]
    fn index(&self, cell: CellCoord) -> usize {
        debug_assert!(
            cell.x < self.width && cell.y < self.height,
            "cell {cell:?} outside {}x{} grid",
            self.width,
            self.height
        );
        cell.y as usize * self.width as usize + cell.x as usize
    }

    /// `None` for a null cell
    #[inline]
    pub fn cell(&self, cell: CellCoord) -> Option<&T> {
        self.cells[self.index(cell)].as_ref()
    }

    #[inline]
    pub fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut T> {
        let idx = self.index(cell);
        self.cells[idx].as_mut()
    }

    /// Allocate the cell on first use
    #[inline]
    pub fn cell_or_insert_with(&mut self, cell: CellCoord, f: impl FnOnce() -> T) -> &mut T {
        let idx = self.index(cell);
        self.cells[idx].get_or_insert_with(f)
    }

    /// Return a cell to the null state
    #[inline]
    pub fn clear_cell(&mut self, cell: CellCoord) {
        let idx = self.index(cell);
        self.cells[idx] = None;
    }

    pub fn allocated_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Allocated cells in row order
    pub fn iter_allocated(&self) -> impl Iterator<Item = (CellCoord, &T)> {
        let width = self.width as usize;
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.as_ref()
                .map(|c| (CellCoord::new((i % width) as u32, (i / width) as u32), c))
        })
    }
}
