//! Synthetic workloads that drive faults through the virtual region
//!
//! Each program touches every byte of the region with its own access
//! pattern and returns a checksum of the final contents, so two runs under
//! different policies can be compared for correctness as well as cost.

use std::fmt;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::WORKLOAD_SEED;
use crate::error::Result;
use crate::page_table::{FaultHandler, Mmu};

const SCAN_PASSES: usize = 10;
const FOCUS_BURSTS: usize = 100;
const FOCUS_WRITES: usize = 100;
const FOCUS_WINDOW: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkloadKind {
    Sort,
    Scan,
    Focus,
}

impl WorkloadKind {
    pub fn run<H: FaultHandler>(self, mmu: &mut Mmu<'_, H>) -> Result<u64> {
        match self {
            WorkloadKind::Sort => sort_program(mmu),
            WorkloadKind::Scan => scan_program(mmu),
            WorkloadKind::Focus => focus_program(mmu),
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkloadKind::Sort => "sort",
            WorkloadKind::Scan => "scan",
            WorkloadKind::Focus => "focus",
        };
        f.write_str(name)
    }
}

fn checksum<H: FaultHandler>(mmu: &mut Mmu<'_, H>) -> Result<u64> {
    let mut total = 0u64;
    for addr in 0..mmu.len() {
        total += u64::from(mmu.read(addr)?);
    }
    Ok(total)
}

/// Sequential fill, then repeated sequential reads.
pub fn scan_program<H: FaultHandler>(mmu: &mut Mmu<'_, H>) -> Result<u64> {
    for addr in 0..mmu.len() {
        mmu.write(addr, (addr % 256) as u8)?;
    }

    let mut total = 0u64;
    for _ in 0..SCAN_PASSES {
        total += checksum(mmu)?;
    }
    Ok(total)
}

/// Random fill, then an in-place heap sort of the whole region.
pub fn sort_program<H: FaultHandler>(mmu: &mut Mmu<'_, H>) -> Result<u64> {
    let mut rng = StdRng::seed_from_u64(WORKLOAD_SEED);
    let len = mmu.len();

    for addr in 0..len {
        mmu.write(addr, rng.r#gen())?;
    }

    for root in (0..len / 2).rev() {
        sift_down(mmu, root, len)?;
    }
    for end in (1..len).rev() {
        swap(mmu, 0, end)?;
        sift_down(mmu, 0, end)?;
    }

    checksum(mmu)
}

/// Zero fill, then bursts of writes clustered around random spots.
pub fn focus_program<H: FaultHandler>(mmu: &mut Mmu<'_, H>) -> Result<u64> {
    if mmu.is_empty() {
        return Ok(0);
    }
    let mut rng = StdRng::seed_from_u64(WORKLOAD_SEED);
    let len = mmu.len();

    for addr in 0..len {
        mmu.write(addr, 0)?;
    }

    for _ in 0..FOCUS_BURSTS {
        let start = rng.gen_range(0..len);
        for _ in 0..FOCUS_WRITES {
            let addr = (start + rng.gen_range(0..FOCUS_WINDOW)) % len;
            mmu.write(addr, rng.r#gen())?;
        }
    }

    checksum(mmu)
}

fn swap<H: FaultHandler>(mmu: &mut Mmu<'_, H>, a: usize, b: usize) -> Result<()> {
    let (va, vb) = (mmu.read(a)?, mmu.read(b)?);
    mmu.write(a, vb)?;
    mmu.write(b, va)
}

fn sift_down<H: FaultHandler>(mmu: &mut Mmu<'_, H>, mut root: usize, end: usize) -> Result<()> {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return Ok(());
        }
        if child + 1 < end && mmu.read(child)? < mmu.read(child + 1)? {
            child += 1;
        }
        if mmu.read(root)? >= mmu.read(child)? {
            return Ok(());
        }
        swap(mmu, root, child)?;
        root = child;
    }
}
