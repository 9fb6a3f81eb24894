use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::trace;

use crate::constants::*;
use crate::error::{Result, VmError};

/// The simulator's physical memory: `nframes` contiguous frames of `PAGE_SIZE` bytes.
pub struct PhysicalMemory {
    data: Box<[u8]>,
}

impl PhysicalMemory {
    /// Create a new physical memory initialized to all zeros
    pub fn new(nframes: usize) -> Self {
        PhysicalMemory {
            data: vec![0u8; nframes * PAGE_SIZE].into_boxed_slice(),
        }
    }

    pub fn nframes(&self) -> usize {
        self.data.len() / PAGE_SIZE
    }

    /// Read a byte from physical memory
    #[inline]
    pub fn read(&self, address: usize) -> u8 {
        self.data[address]
    }

    /// Write a byte to physical memory
    #[inline]
    pub fn write(&mut self, address: usize, value: u8) {
        self.data[address] = value;
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(frame: usize) -> usize {
        frame * PAGE_SIZE
    }

    /// The bytes of one frame
    pub fn frame(&self, frame: usize) -> &[u8] {
        let start = Self::frame_to_address(frame);
        &self.data[start..start + PAGE_SIZE]
    }

    /// The bytes of one frame, for disk reads into it
    pub fn frame_mut(&mut self, frame: usize) -> &mut [u8] {
        let start = Self::frame_to_address(frame);
        &mut self.data[start..start + PAGE_SIZE]
    }
}

/// Block-addressed backing store, one `BLOCK_SIZE` block per virtual page.
///
/// Blocks that were never written read back as zeros.
pub trait BlockDevice {
    fn nblocks(&self) -> usize;

    /// Fill `buf` (exactly one block) with the contents of `block`.
    fn read(&mut self, block: usize, buf: &mut [u8]) -> Result<()>;

    /// Store `buf` (exactly one block) as the contents of `block`.
    fn write(&mut self, block: usize, buf: &[u8]) -> Result<()>;
}

/// Paging disk kept entirely in memory
pub struct RamDisk {
    blocks: Vec<[u8; BLOCK_SIZE]>,
    reads: usize,
    writes: usize,
}

impl RamDisk {
    pub fn new(nblocks: usize) -> Self {
        RamDisk {
            blocks: vec![[0u8; BLOCK_SIZE]; nblocks],
            reads: 0,
            writes: 0,
        }
    }

    /// Direct access to a block (for inspection in tests and tools)
    pub fn block(&self, block: usize) -> &[u8; BLOCK_SIZE] {
        &self.blocks[block]
    }

    pub fn transfers(&self) -> (usize, usize) {
        (self.reads, self.writes)
    }
}

impl BlockDevice for RamDisk {
    fn nblocks(&self) -> usize {
        self.blocks.len()
    }

    fn read(&mut self, block: usize, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(&self.blocks[block]);
        self.reads += 1;
        trace!("ramdisk: read block {}", block);
        Ok(())
    }

    fn write(&mut self, block: usize, buf: &[u8]) -> Result<()> {
        self.blocks[block].copy_from_slice(buf);
        self.writes += 1;
        trace!("ramdisk: write block {}", block);
        Ok(())
    }
}

/// Paging disk stored in a regular file of `nblocks * BLOCK_SIZE` bytes
pub struct FileDisk {
    file: File,
    path: PathBuf,
    nblocks: usize,
    reads: usize,
    writes: usize,
}

impl FileDisk {
    /// Create (or truncate) the disk file and size it to hold `nblocks` zeroed blocks.
    pub fn open<P: AsRef<Path>>(path: P, nblocks: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open = || -> std::io::Result<File> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&path)?;
            file.set_len((nblocks * BLOCK_SIZE) as u64)?;
            Ok(file)
        };
        let file = open().map_err(|source| VmError::DiskOpen {
            path: path.clone(),
            source,
        })?;

        Ok(FileDisk {
            file,
            path,
            nblocks,
            reads: 0,
            writes: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transfers(&self) -> (usize, usize) {
        (self.reads, self.writes)
    }

    fn seek_to(&mut self, block: usize) -> std::io::Result<()> {
        self.file
            .seek(SeekFrom::Start((block * BLOCK_SIZE) as u64))
            .map(|_| ())
    }
}

impl BlockDevice for FileDisk {
    fn nblocks(&self) -> usize {
        self.nblocks
    }

    fn read(&mut self, block: usize, buf: &mut [u8]) -> Result<()> {
        self.seek_to(block)
            .and_then(|_| self.file.read_exact(buf))
            .map_err(|source| VmError::Disk { op: "read", block, source })?;
        self.reads += 1;
        trace!("{}: read block {}", self.path.display(), block);
        Ok(())
    }

    fn write(&mut self, block: usize, buf: &[u8]) -> Result<()> {
        self.seek_to(block)
            .and_then(|_| self.file.write_all(buf))
            .map_err(|source| VmError::Disk { op: "write", block, source })?;
        self.writes += 1;
        trace!("{}: write block {}", self.path.display(), block);
        Ok(())
    }
}
