// size of one virtual page / physical frame / disk block, in bytes
pub const PAGE_SIZE: usize = 4096;
pub const BLOCK_SIZE: usize = PAGE_SIZE;

pub const PAGE_SHIFT: u32 = PAGE_SIZE.trailing_zeros();
pub const OFFSET_MASK: usize = PAGE_SIZE - 1;

// backing store file used when no path is given on the command line
pub const DEFAULT_DISK_PATH: &str = "myvirtualdisk";

// seed shared by the built-in workloads so runs are reproducible
pub const WORKLOAD_SEED: u64 = 38290;

// the custom sweep clears at most one marker per frame before it must find a victim
pub const SWEEP_FACTOR: usize = 2;

// a write to an unmapped page takes two faults (map read-only, then upgrade)
pub const MAX_FAULTS_PER_ACCESS: usize = 2;
