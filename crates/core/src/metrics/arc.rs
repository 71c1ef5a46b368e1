use crate::{
    model::{ArcPresence, ArcSnapshot},
    platform::{read_counter, refresh_sample, CounterSource, NativeCounters},
};

pub const ARC_SIZE: &str = "kstat.zfs.misc.arcstats.size";
pub const ARC_MFU_SIZE: &str = "vfs.zfs.mfu_size";
pub const ARC_MRU_SIZE: &str = "vfs.zfs.mru_size";
pub const ARC_ANON_SIZE: &str = "vfs.zfs.anon_size";
pub const ARC_HEADER_SIZE: &str = "kstat.zfs.misc.arcstats.hdr_size";
pub const ARC_L2_HEADER_SIZE: &str = "kstat.zfs.misc.arcstats.l2_hdr_size";
pub const ARC_OTHER_SIZE: &str = "kstat.zfs.misc.arcstats.other_size";

/// ZFS ARC statistics. The subsystem is optional: whether it is active
/// depends on whether a ZFS pool is loaded, so presence is probed each
/// cycle before the sub-category counters are read.
pub struct ArcCollector<S = NativeCounters> {
    src: S,
    stats: ArcSnapshot,
}

impl ArcCollector<NativeCounters> {
    pub fn new() -> Self {
        Self::with_source(NativeCounters::default())
    }
}

impl Default for ArcCollector<NativeCounters> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CounterSource> ArcCollector<S> {
    pub fn with_source(src: S) -> Self {
        Self {
            src,
            stats: ArcSnapshot::default(),
        }
    }

    /// Probe the primary ARC size counter.
    ///
    /// A read failure means the subsystem is absent; a value of exactly
    /// zero is ambiguous between "absent" and "present but empty" and is
    /// reported as `Unknown`.
    pub fn probe(&self) -> ArcPresence {
        match read_counter::<u64, S>(&self.src, ARC_SIZE) {
            Ok(0) => ArcPresence::Unknown,
            Ok(_) => ArcPresence::Present,
            Err(_) => ArcPresence::Absent,
        }
    }

    /// Conservative presence check: only a confirmed nonzero ARC counts.
    pub fn is_present(&self) -> bool {
        self.probe() == ArcPresence::Present
    }

    /// Refresh the seven ARC byte counters. Callers should gate this on
    /// `probe()` returning `Present` for the current cycle.
    pub fn collect(&mut self) -> ArcSnapshot {
        refresh_sample(&self.src, ARC_SIZE, &mut self.stats.total);
        refresh_sample(&self.src, ARC_MFU_SIZE, &mut self.stats.mfu);
        refresh_sample(&self.src, ARC_MRU_SIZE, &mut self.stats.mru);
        refresh_sample(&self.src, ARC_ANON_SIZE, &mut self.stats.anon);
        refresh_sample(&self.src, ARC_HEADER_SIZE, &mut self.stats.header);
        refresh_sample(&self.src, ARC_L2_HEADER_SIZE, &mut self.stats.l2_header);
        refresh_sample(&self.src, ARC_OTHER_SIZE, &mut self.stats.other);
        self.stats
    }

    pub fn snapshot(&self) -> ArcSnapshot {
        self.stats
    }
}
