//! # Paged Sparse Index
//!
//! Maps an entity slot index to a dense-array position.
//!
//! Slots are grouped into fixed-size pages that are allocated on first
//! write, so a pool that only ever sees a handful of high slot indices does
//! not pay for the whole index space.
//!
//! ```text
//! slot 8195 -> page 2, offset 3
//!
//! pages: [ None | None | Some([.., .., .., 17, ..]) ]
//!                                          ^ dense position
//! ```

/// Number of slots per page.
pub const PAGE_SIZE: usize = 4096;

/// Sentinel stored for slots with no dense entry.
const ABSENT: u32 = u32::MAX;

type Page = Box<[u32; PAGE_SIZE]>;

/// Owned, automatically growing page table.
#[derive(Default)]
pub struct SparsePages {
    pages: Vec<Option<Page>>,
}

#[inline]
const fn split(index: u32) -> (usize, usize) {
    let index = index as usize;
    (index / PAGE_SIZE, index % PAGE_SIZE)
}

impl SparsePages {
    /// Creates an empty page table. No page is allocated.
    #[must_use]
    pub const fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Looks up the dense position stored for `index`.
    ///
    /// Returns `None` if the slot is absent or its page was never allocated.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u32) -> Option<u32> {
        let (page, offset) = split(index);
        let position = self.pages.get(page)?.as_ref()?[offset];
        (position != ABSENT).then_some(position)
    }

    /// Stores `position` for `index`, allocating the page if needed.
    pub fn set(&mut self, index: u32, position: u32) {
        debug_assert_ne!(position, ABSENT, "dense position collides with sentinel");
        let (page, offset) = split(index);
        if page >= self.pages.len() {
            self.pages.resize_with(page + 1, || None);
        }
        let page = self.pages[page].get_or_insert_with(|| Box::new([ABSENT; PAGE_SIZE]));
        page[offset] = position;
    }

    /// Marks `index` as absent. Pages are kept for reuse.
    #[inline]
    pub fn clear_slot(&mut self, index: u32) {
        let (page, offset) = split(index);
        if let Some(Some(page)) = self.pages.get_mut(page) {
            page[offset] = ABSENT;
        }
    }

    /// Releases every page.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.pages.shrink_to_fit();
    }

    /// Number of pages currently allocated.
    #[must_use]
    pub fn allocated_pages(&self) -> usize {
        self.pages.iter().filter(|page| page.is_some()).count()
    }
}
