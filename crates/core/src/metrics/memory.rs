use crate::{
    model::MemorySnapshot,
    platform::{refresh_sample, CounterSource, NativeCounters},
};

pub const BUFFER_SPACE: &str = "vfs.bufspace";
pub const FREE_PAGES: &str = "vm.stats.vm.v_free_count";
pub const INACTIVE_PAGES: &str = "vm.stats.vm.v_inactive_count";
pub const ACTIVE_PAGES: &str = "vm.stats.vm.v_active_count";
pub const WIRED_PAGES: &str = "vm.stats.vm.v_wire_count";
pub const CACHED_PAGES: &str = "vm.stats.vm.v_cache_count";
pub const SWAP_IN_PAGES: &str = "vm.stats.vm.v_swappgsin";
pub const SWAP_OUT_PAGES: &str = "vm.stats.vm.v_swappgsout";

/// Whole-system memory counters.
///
/// The eight counters are independent; a counter missing on this kernel
/// keeps its last value (zero on first read) with `fresh == false` and
/// never blocks the other seven.
pub struct MemoryCollector<S = NativeCounters> {
    src: S,
    stats: MemorySnapshot,
}

impl MemoryCollector<NativeCounters> {
    pub fn new() -> Self {
        Self::with_source(NativeCounters::default())
    }
}

impl Default for MemoryCollector<NativeCounters> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CounterSource> MemoryCollector<S> {
    pub fn with_source(src: S) -> Self {
        Self {
            src,
            stats: MemorySnapshot::default(),
        }
    }

    /// Re-read all eight counters and return the refreshed snapshot.
    pub fn collect(&mut self) -> MemorySnapshot {
        refresh_sample(&self.src, BUFFER_SPACE, &mut self.stats.buffer);
        refresh_sample(&self.src, FREE_PAGES, &mut self.stats.free);
        refresh_sample(&self.src, INACTIVE_PAGES, &mut self.stats.inactive);
        refresh_sample(&self.src, ACTIVE_PAGES, &mut self.stats.active);
        refresh_sample(&self.src, WIRED_PAGES, &mut self.stats.wired);
        refresh_sample(&self.src, CACHED_PAGES, &mut self.stats.cached);
        refresh_sample(&self.src, SWAP_IN_PAGES, &mut self.stats.swap_in);
        refresh_sample(&self.src, SWAP_OUT_PAGES, &mut self.stats.swap_out);
        self.stats
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockCounters;

    fn full_counters() -> MockCounters {
        let mut src = MockCounters::new();
        src.set_i64(BUFFER_SPACE, 8 * 1024 * 1024);
        src.set_u32(FREE_PAGES, 1000);
        src.set_u32(INACTIVE_PAGES, 2000);
        src.set_u32(ACTIVE_PAGES, 3000);
        src.set_u32(WIRED_PAGES, 400);
        src.set_u32(CACHED_PAGES, 500);
        src.set_u32(SWAP_IN_PAGES, 10);
        src.set_u32(SWAP_OUT_PAGES, 20);
        src
    }

    #[test]
    fn collect_refreshes_all_counters() {
        let mut mem = MemoryCollector::with_source(full_counters());
        let snap = mem.collect();

        assert_eq!(snap.buffer.value, 8 * 1024 * 1024);
        assert_eq!(snap.free.value, 1000);
        assert_eq!(snap.inactive.value, 2000);
        assert_eq!(snap.active.value, 3000);
        assert_eq!(snap.wired.value, 400);
        assert_eq!(snap.cached.value, 500);
        assert_eq!(snap.swap_in.value, 10);
        assert_eq!(snap.swap_out.value, 20);
        assert!(snap.free.fresh && snap.buffer.fresh && snap.swap_out.fresh);
    }

    #[test]
    fn one_missing_counter_does_not_block_the_rest() {
        let mut src = full_counters();
        src.remove(CACHED_PAGES);

        let mut mem = MemoryCollector::with_source(src);
        let snap = mem.collect();

        assert!(!snap.cached.fresh);
        assert_eq!(snap.cached.value, 0);
        assert!(snap.free.fresh);
        assert!(snap.inactive.fresh);
        assert!(snap.active.fresh);
        assert!(snap.wired.fresh);
        assert!(snap.buffer.fresh);
        assert!(snap.swap_in.fresh);
        assert!(snap.swap_out.fresh);
    }

    #[test]
    fn stale_counter_keeps_previous_value() {
        let mut mem = MemoryCollector::with_source(full_counters());
        mem.collect();

        // Counter disappears between cycles; the last value survives.
        mem.src.remove(FREE_PAGES);
        let snap = mem.collect();
        assert_eq!(snap.free.value, 1000);
        assert!(!snap.free.fresh);
        assert_eq!(mem.snapshot().free.value, 1000);
    }
}
