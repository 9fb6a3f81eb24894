pub mod config;
pub mod constants;
pub mod error;
pub mod fault;
pub mod frame_table;
pub mod logging;
pub mod memory;
pub mod page_table;
pub mod policy;
pub mod simulator;
pub mod stats;
pub mod workload;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::{Result, VmError};
pub use fault::Pager;
pub use page_table::{FaultHandler, Mmu, PageTable, Permission};
pub use policy::{PolicyKind, ReplacementPolicy};
pub use simulator::Simulator;
pub use stats::Stats;
pub use workload::WorkloadKind;
