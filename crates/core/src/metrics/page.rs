use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The kernel page size and its base-2 shift, computed once at startup.
///
/// Downstream consumers convert page counts to bytes with
/// `bytes == pages << shift`; the collector itself never converts units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    size: usize,
    shift: u32,
}

impl PageInfo {
    /// Query the OS page size. No further I/O after construction.
    #[cfg(unix)]
    pub fn current() -> Result<Self> {
        use nix::unistd::{sysconf, SysconfVar};

        let size = sysconf(SysconfVar::PAGE_SIZE)?
            .map(|s| s as usize)
            .unwrap_or(4096);
        Ok(Self::from_size(size))
    }

    /// Build from a known page size. `shift` is the number of right
    /// shifts reducing the size to 1, so `1 << shift == size` for every
    /// power-of-two page size.
    pub fn from_size(size: usize) -> Self {
        let mut shift = 0;
        let mut s = size;
        while s > 1 {
            shift += 1;
            s >>= 1;
        }
        Self { size, shift }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Convert a page count to bytes.
    pub fn bytes(&self, pages: u64) -> u64 {
        pages << self.shift
    }
}
