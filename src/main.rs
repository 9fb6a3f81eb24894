//! virtmem - Main Entry Point
//!
//! Usage: virtmem [OPTIONS] <npages> <nframes> <rand|fifo|custom> <sort|scan|focus>
//!
//! Runs the chosen workload over `npages` virtual pages backed by `nframes`
//! physical frames and reports page faults, disk reads and disk writes.

use std::process;

use clap::Parser;
use log::info;

use virtmem::config::{Cli, Config, DiskChoice};
use virtmem::memory::{BlockDevice, FileDisk, RamDisk};
use virtmem::{logging, Result, Simulator, Stats};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    logging::init(cli.verbose);

    // Run the simulator and handle any errors
    let stats = match Config::from_cli(cli).and_then(|config| run(&config)) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!("{}", stats);
}

fn run(config: &Config) -> Result<Stats> {
    match &config.disk {
        DiskChoice::File(path) => {
            let disk = FileDisk::open(path, config.npages)?;
            info!("backing store: {}", disk.path().display());
            simulate(config, disk)
        }
        DiskChoice::Ram => {
            info!("backing store: memory");
            simulate(config, RamDisk::new(config.npages))
        }
    }
}

fn simulate<D: BlockDevice>(config: &Config, disk: D) -> Result<Stats> {
    let policy = config.policy.build(config.nframes, config.seed);
    let mut sim = Simulator::new(config.npages, config.nframes, policy, disk)?
        .with_table_trace(config.trace_table);

    let result = sim.run(config.program)?;
    println!("{} result is {}", config.program, result);

    Ok(sim.stats())
}
