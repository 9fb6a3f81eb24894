//! Replacement policies
//!
//! A policy is consulted only when the frame table has no free frame; it
//! must always name a valid frame. The policy is picked once per run.

use std::fmt;

use clap::ValueEnum;
use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::SWEEP_FACTOR;
use crate::frame_table::FrameTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    Rand,
    Fifo,
    Custom,
}

impl PolicyKind {
    /// Build the policy for a memory of `nframes` frames.
    /// `seed` only matters for `Rand`; `None` draws from OS entropy.
    pub fn build(self, nframes: usize, seed: Option<u64>) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::Rand => Box::new(match seed {
                Some(seed) => Random::seeded(seed),
                None => Random::new(),
            }),
            PolicyKind::Fifo => Box::new(Fifo::new()),
            PolicyKind::Custom => Box::new(Custom::new(nframes)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PolicyKind::Rand => "rand",
            PolicyKind::Fifo => "fifo",
            PolicyKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

pub trait ReplacementPolicy {
    fn kind(&self) -> PolicyKind;

    /// Choose the frame to evict. Only called when every frame is occupied.
    fn select_victim(&mut self, frames: &FrameTable) -> usize;

    /// A resident page in `frame` was just granted write permission.
    fn record_write(&mut self, _frame: usize) {}
}

/// Uniform choice over all frames, with no memory of past choices
pub struct Random {
    rng: StdRng,
}

impl Random {
    pub fn new() -> Self {
        Random { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Random { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementPolicy for Random {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Rand
    }

    fn select_victim(&mut self, frames: &FrameTable) -> usize {
        let victim = self.rng.gen_range(0..frames.nframes());
        trace!("rand: victim frame {}", victim);
        victim
    }
}

/// Evicts frames in admission order by walking a cursor around the table
#[derive(Default)]
pub struct Fifo {
    cursor: usize,
}

impl Fifo {
    pub fn new() -> Self {
        Fifo { cursor: 0 }
    }
}

impl ReplacementPolicy for Fifo {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Fifo
    }

    fn select_victim(&mut self, frames: &FrameTable) -> usize {
        let nframes = frames.nframes();
        let victim = self.cursor % nframes;
        self.cursor = (victim + 1) % nframes;
        trace!("fifo: victim frame {}, cursor now {}", victim, self.cursor);
        victim
    }
}

/// FIFO that gives frames written since they were faulted in one extra lap.
///
/// Each frame carries a single "recently written" bit rather than a
/// timestamp, so this approximates LRU only loosely. Passing a marked frame
/// clears its bit; a sweep therefore finds a victim within one full lap.
/// The marker table follows the size of the frame table it is asked about.
pub struct Custom {
    cursor: usize,
    written: Vec<bool>,
}

impl Custom {
    pub fn new(nframes: usize) -> Self {
        Custom {
            cursor: 0,
            written: vec![false; nframes],
        }
    }

    pub fn is_marked(&self, frame: usize) -> bool {
        self.written.get(frame).copied().unwrap_or(false)
    }
}

impl ReplacementPolicy for Custom {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Custom
    }

    fn select_victim(&mut self, frames: &FrameTable) -> usize {
        let nframes = frames.nframes();
        self.written.resize(nframes, false);
        self.cursor %= nframes;

        for _ in 0..SWEEP_FACTOR * nframes {
            let frame = self.cursor;
            self.cursor = (self.cursor + 1) % nframes;

            if self.written[frame] {
                trace!("custom: frame {} written recently, skipping", frame);
                self.written[frame] = false;
                continue;
            }

            trace!("custom: victim frame {}, cursor now {}", frame, self.cursor);
            return frame;
        }

        unreachable!(
            "custom sweep found no victim within {} steps",
            SWEEP_FACTOR * nframes
        );
    }

    fn record_write(&mut self, frame: usize) {
        if frame >= self.written.len() {
            self.written.resize(frame + 1, false);
        }
        self.written[frame] = true;
    }
}
