use log::info;

use crate::error::{Result, VmError};
use crate::fault::Pager;
use crate::memory::BlockDevice;
use crate::page_table::{Mmu, PageTable};
use crate::policy::ReplacementPolicy;
use crate::stats::Stats;
use crate::workload::WorkloadKind;

/// One simulation run: the page table and the pager that services its faults.
pub struct Simulator<D: BlockDevice> {
    page_table: PageTable,
    pager: Pager<D>,
}

impl<D: BlockDevice> Simulator<D> {
    pub fn new(
        npages: usize,
        nframes: usize,
        policy: Box<dyn ReplacementPolicy>,
        disk: D,
    ) -> Result<Self> {
        if disk.nblocks() < npages {
            return Err(VmError::DiskTooSmall { nblocks: disk.nblocks(), npages });
        }
        let page_table = PageTable::new(npages, nframes)?;

        Ok(Simulator {
            page_table,
            pager: Pager::new(npages, nframes, policy, disk),
        })
    }

    pub fn with_table_trace(mut self, enabled: bool) -> Self {
        self.pager = self.pager.with_table_trace(enabled);
        self
    }

    /// Access path into the virtual region
    pub fn mmu(&mut self) -> Mmu<'_, Pager<D>> {
        Mmu::new(&mut self.page_table, &mut self.pager)
    }

    /// Run a workload to completion, returning its checksum.
    pub fn run(&mut self, workload: WorkloadKind) -> Result<u64> {
        info!(
            "running {} over {} pages / {} frames with {} replacement",
            workload,
            self.page_table.npages(),
            self.page_table.nframes(),
            self.pager.policy().kind()
        );
        let result = workload.run(&mut self.mmu())?;
        info!("{} finished after {} faults", workload, self.pager.stats().faults);
        Ok(result)
    }

    pub fn stats(&self) -> Stats {
        self.pager.stats()
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn pager(&self) -> &Pager<D> {
        &self.pager
    }
}
