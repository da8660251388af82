//! Per-query de-duplication of objects that are linked into many cells.
//!
//! Each query sweep begins with [`ValidCount::begin_sweep`], after which
//! [`ValidCount::mark`] reports `true` only the first time an object index is
//! seen. The stamps live in the token rather than in the objects, so two
//! queries holding different tokens never interfere.

#[derive(Debug, Default, Clone)]
pub struct ValidCount {
    epoch: u32,
    stamps: Vec<u32>,
}

impl ValidCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(objects: usize) -> Self {
        Self {
            epoch: 0,
            stamps: vec![0; objects],
        }
    }

    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Start a new sweep. Every index reads as unvisited afterwards.
    #[inline]
    pub fn begin_sweep(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        if self.epoch == 0 {
            // Wrapped. Old stamps could alias the new epochs
            self.stamps.fill(0);
            self.epoch = 1;
        }
    }

    /// Stamp `index` and return true if it had not been seen this sweep
    #[inline]
    pub fn mark(&mut self, index: usize) -> bool {
        debug_assert!(self.epoch != 0, "mark() called before begin_sweep()");
        if index >= self.stamps.len() {
            self.stamps.resize(index + 1, 0);
        }
        let stamp = &mut self.stamps[index];
        if *stamp == self.epoch {
            return false;
        }
        *stamp = self.epoch;
        true
    }

    #[inline]
    pub fn is_marked(&self, index: usize) -> bool {
        self.epoch != 0 && self.stamps.get(index).is_some_and(|s| *s == self.epoch)
    }
}

/// One token per kind of indexed object, for queries that touch several
/// blockmaps at once.
#[derive(Debug, Default, Clone)]
pub struct ValidCounts {
    pub lines: ValidCount,
    pub things: ValidCount,
    pub polyobjs: ValidCount,
    pub subsectors: ValidCount,
}

impl ValidCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_sweep(&mut self) {
        self.lines.begin_sweep();
        self.things.begin_sweep();
        self.polyobjs.begin_sweep();
        self.subsectors.begin_sweep();
    }
}
