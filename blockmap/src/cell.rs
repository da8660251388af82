use std::ops::ControlFlow;

use smallvec::SmallVec;

/// The handles linked into one cell.
///
/// Newest links are visited first. Removing a handle keeps the order of the
/// others.
#[derive(Debug, Clone)]
pub struct CellRing<H> {
    // Stored oldest first, iterated in reverse
    links: SmallVec<[H; 4]>,
}

impl<H> Default for CellRing<H> {
    fn default() -> Self {
        Self {
            links: SmallVec::new(),
        }
    }
}

impl<H: Copy + PartialEq> CellRing<H> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline]
    pub fn contains(&self, handle: H) -> bool {
        self.links.contains(&handle)
    }

    /// Returns false if the handle was already present
    #[inline]
    pub fn link(&mut self, handle: H) -> bool {
        if self.contains(handle) {
            return false;
        }
        self.links.push(handle);
        true
    }

    /// Returns false if the handle was not present
    #[inline]
    pub fn unlink(&mut self, handle: H) -> bool {
        if let Some(pos) = self.links.iter().position(|h| *h == handle) {
            self.links.remove(pos);
            return true;
        }
        false
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = H> + '_ {
        self.links.iter().rev().copied()
    }

    /// Visit every handle, newest first, until `func` breaks
    #[inline]
    pub fn for_each(&self, mut func: impl FnMut(H) -> ControlFlow<()>) -> ControlFlow<()> {
        for handle in self.iter() {
            func(handle)?;
        }
        ControlFlow::Continue(())
    }
}
