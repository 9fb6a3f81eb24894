use std::fmt;

/// Counters accumulated over a run. Only ever incremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub faults: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_fault(&mut self) {
        self.faults += 1;
    }

    #[inline]
    pub fn record_disk_read(&mut self) {
        self.disk_reads += 1;
    }

    #[inline]
    pub fn record_disk_write(&mut self) {
        self.disk_writes += 1;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of page faults: {}", self.faults)?;
        writeln!(f, "Number of disk reads: {}", self.disk_reads)?;
        write!(f, "Number of disk writes: {}", self.disk_writes)
    }
}
