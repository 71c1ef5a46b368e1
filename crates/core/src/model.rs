use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One sampled kernel counter: the last known value plus whether the most
/// recent refresh actually rewrote it. A counter that is missing or
/// size-mismatched on this kernel keeps its previous value with
/// `fresh == false`, so consumers can tell "confirmed current" apart from
/// "stale/unsupported".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample<T> {
    pub value: T,
    pub fresh: bool,
}

impl<T> Sample<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            fresh: false,
        }
    }
}

/// Whole-system memory counters. All fields are page counts except
/// `buffer`, which the kernel reports in bytes. The eight counters are
/// read independently; small read-to-read skew between them is expected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub free: Sample<u32>,
    pub inactive: Sample<u32>,
    pub active: Sample<u32>,
    pub wired: Sample<u32>,
    pub cached: Sample<u32>,
    pub buffer: Sample<i64>,
    pub swap_in: Sample<u32>,
    pub swap_out: Sample<u32>,
}

/// Outcome of probing the ZFS ARC size counter.
///
/// `Unknown` covers the ambiguous case where the counter reads as exactly
/// zero: an absent pool and a present-but-empty ARC are indistinguishable
/// there, so the collector conservatively skips the ARC snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArcPresence {
    Present,
    Absent,
    Unknown,
}

/// ZFS ARC sub-category sizes, all in bytes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ArcSnapshot {
    pub total: Sample<u64>,
    pub mfu: Sample<u64>,
    pub mru: Sample<u64>,
    pub anon: Sample<u64>,
    pub header: Sample<u64>,
    pub l2_header: Sample<u64>,
    pub other: Sample<u64>,
}

/// One entry from the kernel swap table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDevice {
    pub name: String,
    pub used_pages: u64,
    pub total_pages: u64,
}

/// Ordered swap-device list as returned by the kernel: per-device entries
/// followed by one implicit aggregate row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwapSnapshot {
    pub devices: Vec<SwapDevice>,
}

impl SwapSnapshot {
    /// The physical swap devices, excluding the trailing aggregate row.
    pub fn physical_devices(&self) -> &[SwapDevice] {
        match self.devices.len() {
            0 => &[],
            n => &self.devices[..n - 1],
        }
    }

    /// The trailing aggregate row covering all devices.
    pub fn aggregate(&self) -> Option<&SwapDevice> {
        self.devices.last()
    }
}

/// Which slice of the process table to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessScope {
    /// User processes only (kernel threads excluded).
    User,
    /// All processes, including kernel-owned ones.
    All,
}

impl Default for ProcessScope {
    fn default() -> Self {
        Self::User
    }
}

/// One process, with fields copied out of the kernel-owned query buffer.
///
/// `cpu_fraction` is the kernel's raw fixed-point CPU share (fixpt_t);
/// scaling it to a percentage is a presentation concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: i32,
    pub name: String,
    pub resident_pages: u64,
    pub text_pages: u64,
    pub data_pages: u64,
    pub cpu_fraction: u32,
    pub threads: u32,
}

/// Complete collector output for one refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: SystemTime,
    pub page: crate::metrics::PageInfo,
    pub memory: MemorySnapshot,
    /// Present only when the ARC probe confirmed the subsystem this cycle.
    pub arc: Option<ArcSnapshot>,
    /// Present only when at least one swap device is configured.
    pub swap: Option<SwapSnapshot>,
    pub processes: Vec<ProcessRecord>,
}
