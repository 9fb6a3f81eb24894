//! Error types for the simulator

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a simulation run.
///
/// Fault handling itself never fails; the variants below come from
/// configuration, collaborator construction, or the disk underneath.
#[derive(Error, Debug)]
pub enum VmError {
    #[error("{what} must be greater than 0 (got {value})")]
    InvalidCount { what: &'static str, value: i64 },

    #[error("couldn't create virtual disk {}: {source}", path.display())]
    DiskOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("disk {op} of block {block} failed: {source}")]
    Disk {
        op: &'static str,
        block: usize,
        #[source]
        source: io::Error,
    },

    #[error("virtual disk has {nblocks} blocks but {npages} pages need backing")]
    DiskTooSmall { nblocks: usize, npages: usize },

    #[error("couldn't create page table: {0}")]
    PageTable(String),

    #[error("virtual address {addr:#x} outside of {len:#x}-byte region")]
    AddressOutOfRange { addr: usize, len: usize },

    #[error("fault on page {page} was not resolved by the handler")]
    UnresolvedFault { page: usize },
}

pub type Result<T> = std::result::Result<T, VmError>;
