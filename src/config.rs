//! Command-line configuration
//!
//! Usage: virtmem [OPTIONS] <npages> <nframes> <rand|fifo|custom> <sort|scan|focus>

use std::path::PathBuf;

use clap::Parser;

use crate::constants::DEFAULT_DISK_PATH;
use crate::error::{Result, VmError};
use crate::policy::PolicyKind;
use crate::workload::WorkloadKind;

#[derive(Parser, Debug)]
#[command(name = "virtmem")]
#[command(about = "Demand-paged virtual memory simulator", long_about = None)]
pub struct Cli {
    /// Number of virtual pages
    #[arg(allow_negative_numbers = true)]
    pub npages: i64,

    /// Number of physical frames
    #[arg(allow_negative_numbers = true)]
    pub nframes: i64,

    /// Page replacement policy
    #[arg(value_enum)]
    pub policy: PolicyKind,

    /// Workload to run over the virtual region
    #[arg(value_enum)]
    pub program: WorkloadKind,

    /// Backing store file
    #[arg(long, default_value = DEFAULT_DISK_PATH)]
    pub disk: PathBuf,

    /// Keep the backing store in memory instead of a file
    #[arg(long, conflicts_with = "disk")]
    pub ram_disk: bool,

    /// Seed for the random replacement policy
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log the full page table after every fault (needs -vvv)
    #[arg(long)]
    pub trace_table: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskChoice {
    File(PathBuf),
    Ram,
}

/// Validated run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub npages: usize,
    pub nframes: usize,
    pub policy: PolicyKind,
    pub program: WorkloadKind,
    pub disk: DiskChoice,
    pub seed: Option<u64>,
    pub trace_table: bool,
    pub verbose: u8,
}

fn positive(what: &'static str, value: i64) -> Result<usize> {
    if value <= 0 {
        return Err(VmError::InvalidCount { what, value });
    }
    usize::try_from(value).map_err(|_| VmError::InvalidCount { what, value })
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let npages = positive("npages", cli.npages)?;
        let nframes = positive("nframes", cli.nframes)?;

        let disk = if cli.ram_disk {
            DiskChoice::Ram
        } else {
            DiskChoice::File(cli.disk)
        };

        Ok(Config {
            npages,
            nframes,
            policy: cli.policy,
            program: cli.program,
            disk,
            seed: cli.seed,
            trace_table: cli.trace_table,
            verbose: cli.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("virtmem").chain(args.iter().copied()))
    }

    #[test]
    fn test_positional_arguments() {
        let cli = parse(&["100", "10", "fifo", "scan"]).unwrap();
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.npages, 100);
        assert_eq!(config.nframes, 10);
        assert_eq!(config.policy, PolicyKind::Fifo);
        assert_eq!(config.program, WorkloadKind::Scan);
        assert_eq!(config.disk, DiskChoice::File(PathBuf::from(DEFAULT_DISK_PATH)));
        assert_eq!(config.seed, None);
        assert!(!config.trace_table);
    }

    #[test]
    fn test_options() {
        let cli = parse(&["-vv", "--ram-disk", "--seed", "42", "--trace-table", "5", "3", "custom", "focus"])
            .unwrap();
        let config = Config::from_cli(cli).unwrap();

        assert_eq!(config.disk, DiskChoice::Ram);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.verbose, 2);
        assert!(config.trace_table);
        assert_eq!(config.policy, PolicyKind::Custom);
        assert_eq!(config.program, WorkloadKind::Focus);
    }

    #[test]
    fn test_zero_pages_rejected() {
        let cli = parse(&["0", "10", "rand", "sort"]).unwrap();
        let err = Config::from_cli(cli).unwrap_err();
        assert!(matches!(err, VmError::InvalidCount { what: "npages", value: 0 }));
    }

    #[test]
    fn test_negative_frames_rejected() {
        let cli = parse(&["10", "-3", "rand", "sort"]).unwrap();
        let err = Config::from_cli(cli).unwrap_err();
        assert!(matches!(err, VmError::InvalidCount { what: "nframes", value: -3 }));
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert!(parse(&["10", "3", "lru", "sort"]).is_err());
        assert!(parse(&["10", "3", "fifo", "shuffle"]).is_err());
        assert!(parse(&["ten", "3", "fifo", "scan"]).is_err());
    }

    #[test]
    fn test_missing_arguments_rejected() {
        assert!(parse(&["10", "3", "fifo"]).is_err());
    }

    #[test]
    fn test_disk_and_ram_disk_conflict() {
        assert!(parse(&["--disk", "x", "--ram-disk", "1", "1", "fifo", "scan"]).is_err());
    }
}
