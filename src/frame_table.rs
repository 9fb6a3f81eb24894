//! Frame Table - which virtual page occupies each physical frame
//!
//! The frame table is the authority on occupancy when choosing what to
//! evict; the page table mirrors it. A reverse index (page -> frame) is kept
//! in lock-step so both views stay inverses of each other.

pub struct FrameTable {
    /// frame -> occupant
    frames: Vec<Option<usize>>,
    /// page -> frame, only for resident pages
    pages: Vec<Option<usize>>,
}

impl FrameTable {
    pub fn new(nframes: usize, npages: usize) -> Self {
        FrameTable {
            frames: vec![None; nframes],
            pages: vec![None; npages],
        }
    }

    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    /// Lowest-indexed free frame, if any
    pub fn find_free_frame(&self) -> Option<usize> {
        self.frames.iter().position(Option::is_none)
    }

    /// Place `page` in `frame`. The frame must be free and the page non-resident.
    pub fn assign(&mut self, frame: usize, page: usize) {
        debug_assert!(self.frames[frame].is_none(), "frame {} already occupied", frame);
        debug_assert!(self.pages[page].is_none(), "page {} already resident", page);

        self.frames[frame] = Some(page);
        self.pages[page] = Some(frame);
    }

    /// Free `frame`, returning the page that was in it.
    pub fn release(&mut self, frame: usize) -> Option<usize> {
        let page = self.frames[frame].take()?;
        self.pages[page] = None;
        Some(page)
    }

    pub fn occupant(&self, frame: usize) -> Option<usize> {
        self.frames[frame]
    }

    pub fn frame_of(&self, page: usize) -> Option<usize> {
        self.pages[page]
    }

    pub fn free_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_none()).count()
    }

    /// (frame, page) pairs for every occupied frame
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.frames
            .iter()
            .enumerate()
            .filter_map(|(frame, page)| page.map(|p| (frame, p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_free_initially() {
        let ft = FrameTable::new(3, 10);
        assert_eq!(ft.nframes(), 3);
        assert_eq!(ft.free_count(), 3);
        assert_eq!(ft.find_free_frame(), Some(0));
        assert_eq!(ft.occupied().count(), 0);
    }

    #[test]
    fn test_find_free_frame_is_lowest() {
        let mut ft = FrameTable::new(4, 10);
        ft.assign(0, 5);
        ft.assign(2, 6);
        assert_eq!(ft.find_free_frame(), Some(1));

        ft.assign(1, 7);
        assert_eq!(ft.find_free_frame(), Some(3));

        ft.assign(3, 8);
        assert_eq!(ft.find_free_frame(), None);
    }

    #[test]
    fn test_assign_updates_both_views() {
        let mut ft = FrameTable::new(2, 4);
        ft.assign(1, 3);

        assert_eq!(ft.occupant(1), Some(3));
        assert_eq!(ft.frame_of(3), Some(1));
        assert_eq!(ft.occupant(0), None);
        assert_eq!(ft.frame_of(0), None);
    }

    #[test]
    fn test_release_clears_reverse_index() {
        let mut ft = FrameTable::new(2, 4);
        ft.assign(0, 2);

        assert_eq!(ft.release(0), Some(2));
        assert_eq!(ft.occupant(0), None);
        assert_eq!(ft.frame_of(2), None);
        assert_eq!(ft.find_free_frame(), Some(0));
    }

    #[test]
    fn test_release_free_frame_is_noop() {
        let mut ft = FrameTable::new(2, 4);
        assert_eq!(ft.release(1), None);
        assert_eq!(ft.free_count(), 2);
    }

    #[test]
    fn test_reuse_after_release() {
        let mut ft = FrameTable::new(1, 4);
        ft.assign(0, 0);
        ft.release(0);
        ft.assign(0, 3);

        assert_eq!(ft.occupied().collect::<Vec<_>>(), vec![(0, 3)]);
        assert_eq!(ft.frame_of(0), None);
        assert_eq!(ft.frame_of(3), Some(0));
    }
}
