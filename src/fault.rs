//! Fault Handler - services one page fault end to end
//!
//! A fault is either a write to a resident read-only page, which is
//! upgraded in place, or an access to a non-resident page, which gets a
//! frame (evicting someone if needed), is read in from disk, and is mapped
//! read-only. Write permission is always granted by a second fault.

use log::{debug, trace};

use crate::error::Result;
use crate::frame_table::FrameTable;
use crate::memory::BlockDevice;
use crate::page_table::{FaultHandler, PageTable, Permission};
use crate::policy::ReplacementPolicy;
use crate::stats::Stats;

pub struct Pager<D: BlockDevice> {
    frames: FrameTable,
    policy: Box<dyn ReplacementPolicy>,
    disk: D,
    stats: Stats,
    trace_table: bool,
}

impl<D: BlockDevice> Pager<D> {
    pub fn new(npages: usize, nframes: usize, policy: Box<dyn ReplacementPolicy>, disk: D) -> Self {
        Pager {
            frames: FrameTable::new(nframes, npages),
            policy,
            disk,
            stats: Stats::new(),
            trace_table: false,
        }
    }

    /// Dump the whole page table at trace level after every fault.
    pub fn with_table_trace(mut self, enabled: bool) -> Self {
        self.trace_table = enabled;
        self
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    pub fn disk(&self) -> &D {
        &self.disk
    }

    pub fn into_disk(self) -> D {
        self.disk
    }

    /// Make room by evicting the policy's victim, writing it back if dirty.
    fn evict(&mut self, pt: &mut PageTable) -> Result<usize> {
        let frame = self.policy.select_victim(&self.frames);

        if let Some(victim) = self.frames.occupant(frame) {
            let (_, bits) = pt.get_entry(victim);
            if bits.contains(Permission::WRITE) {
                self.disk.write(victim, pt.physmem().frame(frame))?;
                self.stats.record_disk_write();
                trace!("wrote back dirty page {} from frame {}", victim, frame);
            }

            pt.set_entry(victim, 0, Permission::NONE);
            self.frames.release(frame);
            debug!("evicted page {} from frame {}", victim, frame);
        }

        Ok(frame)
    }
}

impl<D: BlockDevice> FaultHandler for Pager<D> {
    fn handle_fault(&mut self, pt: &mut PageTable, page: usize) -> Result<()> {
        self.stats.record_fault();

        let (frame, bits) = pt.get_entry(page);
        if bits.resident() {
            debug_assert_eq!(self.frames.frame_of(page), Some(frame));
            pt.set_entry(page, frame, Permission::READ_WRITE);
            self.policy.record_write(frame);
            debug!("fault on page {}: upgraded to read-write in frame {}", page, frame);
            return Ok(());
        }

        let frame = match self.frames.find_free_frame() {
            Some(frame) => frame,
            None => self.evict(pt)?,
        };

        self.disk.read(page, pt.physmem_mut().frame_mut(frame))?;
        self.stats.record_disk_read();

        pt.set_entry(page, frame, Permission::READ_ONLY);
        self.frames.assign(frame, page);
        debug!("fault on page {}: loaded into frame {}", page, frame);

        if self.trace_table {
            trace!("page table after fault on page {}:\n{}", page, pt);
        }
        Ok(())
    }
}
