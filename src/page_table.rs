//! Page table and the access path that raises faults
//!
//! The page table stores, for each virtual page, the frame it lives in and
//! the permissions the workload currently has on it. Any access those
//! permissions do not allow is handed to a [`FaultHandler`], after which the
//! access is retried the way a CPU re-executes a faulting instruction.

use std::fmt;

use bitflags::bitflags;

use crate::constants::*;
use crate::error::{Result, VmError};
use crate::memory::PhysicalMemory;

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Permission: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

impl Permission {
    pub const NONE: Permission = Permission::empty();
    pub const READ_ONLY: Permission = Permission::READ;
    pub const READ_WRITE: Permission = Permission::READ.union(Permission::WRITE);

    pub fn resident(self) -> bool {
        !self.is_empty()
    }

    pub fn allows(self, access: Access) -> bool {
        match access {
            Access::Read => self.contains(Permission::READ),
            Access::Write => self.contains(Permission::WRITE),
        }
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Called with the faulting page whenever an access violates its permissions.
pub trait FaultHandler {
    fn handle_fault(&mut self, pt: &mut PageTable, page: usize) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageTableEntry {
    pub frame: usize,
    pub bits: Permission,
}

pub struct PageTable {
    entries: Vec<PageTableEntry>,
    physmem: PhysicalMemory,
}

impl PageTable {
    /// Create a page table for `npages` virtual pages over `nframes` frames.
    /// Every page starts non-resident.
    pub fn new(npages: usize, nframes: usize) -> Result<Self> {
        if npages == 0 {
            return Err(VmError::PageTable("no virtual pages".to_string()));
        }
        if nframes == 0 {
            return Err(VmError::PageTable("no physical frames".to_string()));
        }

        Ok(PageTable {
            entries: vec![PageTableEntry::default(); npages],
            physmem: PhysicalMemory::new(nframes),
        })
    }

    pub fn npages(&self) -> usize {
        self.entries.len()
    }

    pub fn nframes(&self) -> usize {
        self.physmem.nframes()
    }

    pub fn get_entry(&self, page: usize) -> (usize, Permission) {
        let entry = self.entries[page];
        (entry.frame, entry.bits)
    }

    pub fn set_entry(&mut self, page: usize, frame: usize, bits: Permission) {
        debug_assert!(frame < self.nframes());
        self.entries[page] = PageTableEntry { frame, bits };
    }

    pub fn physmem(&self) -> &PhysicalMemory {
        &self.physmem
    }

    pub fn physmem_mut(&mut self) -> &mut PhysicalMemory {
        &mut self.physmem
    }

    /// Pages currently resident, with their frames
    pub fn resident(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.bits.resident())
            .map(|(page, e)| (page, e.frame))
    }
}

impl fmt::Display for PageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (page, entry) in self.entries.iter().enumerate() {
            let r = if entry.bits.contains(Permission::READ) { 'r' } else { '-' };
            let w = if entry.bits.contains(Permission::WRITE) { 'w' } else { '-' };
            writeln!(f, "page {:06}: frame {:06} bits {}{}", page, entry.frame, r, w)?;
        }
        Ok(())
    }
}

/// Byte-granular view of the virtual region, routing faults to `handler`.
pub struct Mmu<'a, H: FaultHandler> {
    pt: &'a mut PageTable,
    handler: &'a mut H,
}

impl<'a, H: FaultHandler> Mmu<'a, H> {
    pub fn new(pt: &'a mut PageTable, handler: &'a mut H) -> Self {
        Mmu { pt, handler }
    }

    /// Size of the virtual region in bytes
    pub fn len(&self) -> usize {
        self.pt.npages() * PAGE_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&mut self, addr: usize) -> Result<u8> {
        let pa = self.translate(addr, Access::Read)?;
        Ok(self.pt.physmem().read(pa))
    }

    pub fn write(&mut self, addr: usize, value: u8) -> Result<()> {
        let pa = self.translate(addr, Access::Write)?;
        self.pt.physmem_mut().write(pa, value);
        Ok(())
    }

    pub fn page_table(&self) -> &PageTable {
        &*self.pt
    }

    pub fn handler(&self) -> &H {
        &*self.handler
    }

    fn translate(&mut self, addr: usize, access: Access) -> Result<usize> {
        if addr >= self.len() {
            return Err(VmError::AddressOutOfRange { addr, len: self.len() });
        }
        let page = addr >> PAGE_SHIFT;

        // a write to a non-resident page needs two faults: map, then upgrade
        for attempt in 0..=MAX_FAULTS_PER_ACCESS {
            let (frame, bits) = self.pt.get_entry(page);
            if bits.allows(access) {
                return Ok(PhysicalMemory::frame_to_address(frame) + (addr & OFFSET_MASK));
            }
            if attempt == MAX_FAULTS_PER_ACCESS {
                break;
            }
            self.handler.handle_fault(self.pt, page)?;
        }

        Err(VmError::UnresolvedFault { page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Maps page `p` to frame `p % nframes` with full permissions, counting calls
    struct IdentityHandler {
        calls: Vec<usize>,
    }

    impl FaultHandler for IdentityHandler {
        fn handle_fault(&mut self, pt: &mut PageTable, page: usize) -> Result<()> {
            self.calls.push(page);
            let frame = page % pt.nframes();
            pt.set_entry(page, frame, Permission::READ_WRITE);
            Ok(())
        }
    }

    /// Never grants anything
    struct StuckHandler {
        calls: usize,
    }

    impl FaultHandler for StuckHandler {
        fn handle_fault(&mut self, _pt: &mut PageTable, _page: usize) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
    }

    /// Maps read-only first, upgrades on the next fault
    struct TwoStepHandler {
        calls: usize,
    }

    impl FaultHandler for TwoStepHandler {
        fn handle_fault(&mut self, pt: &mut PageTable, page: usize) -> Result<()> {
            self.calls += 1;
            let (_, bits) = pt.get_entry(page);
            let next = if bits.resident() { Permission::READ_WRITE } else { Permission::READ_ONLY };
            pt.set_entry(page, 0, next);
            Ok(())
        }
    }

    #[test]
    fn test_new_table_all_non_resident() {
        let pt = PageTable::new(8, 2).unwrap();
        assert_eq!(pt.npages(), 8);
        assert_eq!(pt.nframes(), 2);
        for page in 0..8 {
            assert_eq!(pt.get_entry(page), (0, Permission::NONE));
        }
        assert_eq!(pt.resident().count(), 0);
    }

    #[test]
    fn test_new_table_rejects_zero_sizes() {
        assert!(matches!(PageTable::new(0, 1), Err(VmError::PageTable(_))));
        assert!(matches!(PageTable::new(1, 0), Err(VmError::PageTable(_))));
    }

    #[test]
    fn test_permission_allows() {
        assert!(!Permission::NONE.allows(Access::Read));
        assert!(Permission::READ_ONLY.allows(Access::Read));
        assert!(!Permission::READ_ONLY.allows(Access::Write));
        assert!(Permission::READ_WRITE.allows(Access::Write));
        assert!(!Permission::NONE.resident());
    }

    #[test]
    fn test_set_entry_and_resident() {
        let mut pt = PageTable::new(4, 2).unwrap();
        pt.set_entry(3, 1, Permission::READ_ONLY);
        assert_eq!(pt.get_entry(3), (1, Permission::READ_ONLY));
        assert_eq!(pt.resident().collect::<Vec<_>>(), vec![(3, 1)]);
    }

    #[test]
    fn test_display_lists_every_page() {
        let mut pt = PageTable::new(2, 1).unwrap();
        pt.set_entry(1, 0, Permission::READ_WRITE);
        let text = pt.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("page 000001: frame 000000 bits rw"));
        assert!(text.contains("page 000000: frame 000000 bits --"));
    }

    #[test]
    fn test_mmu_faults_once_then_hits() {
        let mut pt = PageTable::new(4, 4).unwrap();
        let mut handler = IdentityHandler { calls: Vec::new() };
        let mut mmu = Mmu::new(&mut pt, &mut handler);

        mmu.write(2 * PAGE_SIZE + 5, 77).unwrap();
        assert_eq!(mmu.read(2 * PAGE_SIZE + 5).unwrap(), 77);
        assert_eq!(mmu.handler().calls, vec![2]);

        // landed in frame 2 at the same offset
        assert_eq!(mmu.page_table().physmem().read(2 * PAGE_SIZE + 5), 77);
    }

    #[test]
    fn test_mmu_out_of_range() {
        let mut pt = PageTable::new(1, 1).unwrap();
        let mut handler = IdentityHandler { calls: Vec::new() };
        let mut mmu = Mmu::new(&mut pt, &mut handler);

        assert_eq!(mmu.len(), PAGE_SIZE);
        let err = mmu.read(PAGE_SIZE).unwrap_err();
        assert!(matches!(err, VmError::AddressOutOfRange { .. }));
        assert!(mmu.handler().calls.is_empty());
    }

    #[test]
    fn test_mmu_gives_up_on_stuck_handler() {
        let mut pt = PageTable::new(1, 1).unwrap();
        let mut handler = StuckHandler { calls: 0 };
        let err = Mmu::new(&mut pt, &mut handler).read(0).unwrap_err();

        assert!(matches!(err, VmError::UnresolvedFault { page: 0 }));
        assert_eq!(handler.calls, MAX_FAULTS_PER_ACCESS);
    }

    #[test]
    fn test_mmu_write_to_unmapped_page_faults_twice() {
        let mut pt = PageTable::new(1, 1).unwrap();
        let mut handler = TwoStepHandler { calls: 0 };
        Mmu::new(&mut pt, &mut handler).write(3, 8).unwrap();

        assert_eq!(handler.calls, 2);
        assert_eq!(pt.get_entry(0), (0, Permission::READ_WRITE));
        assert_eq!(pt.physmem().read(3), 8);
    }
}
