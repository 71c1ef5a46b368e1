use crate::{
    error::Result,
    model::{ProcessRecord, ProcessScope, SwapDevice, SwapSnapshot},
    platform::{read_counter, CounterSource, NativeCounters, NativeVm, VmBackend, VmHandle},
};

pub const SWAP_DEVICE_COUNT: &str = "vm.nswapdev";

/// Session over the kernel's live virtual-memory query interface.
///
/// Holds at most one exclusively owned kvm handle. All queries while the
/// session is closed degrade to empty results; they never fault. The
/// session is not safe for concurrent use, callers serialize access.
pub struct VmSession<S = NativeCounters, B: VmBackend = NativeVm> {
    counters: S,
    backend: B,
    handle: Option<B::Handle>,
    filter: Vec<String>,
    swaps: Vec<SwapDevice>,
    procs: Vec<ProcessRecord>,
}

impl VmSession<NativeCounters, NativeVm> {
    pub fn native() -> Self {
        Self::with_backend(NativeCounters::default(), NativeVm::default())
    }
}

impl<S: CounterSource, B: VmBackend> VmSession<S, B> {
    pub fn with_backend(counters: S, backend: B) -> Self {
        Self {
            counters,
            backend,
            handle: None,
            filter: Vec::new(),
            swaps: Vec::new(),
            procs: Vec::new(),
        }
    }

    /// Open the session, replacing any prior handle. The replaced handle
    /// is released exactly once; on failure the session ends up closed.
    pub fn open(&mut self) -> Result<()> {
        self.handle = None;
        self.handle = Some(self.backend.open()?);
        Ok(())
    }

    /// Release the handle and clear all cached swap and process data.
    /// Idempotent.
    pub fn close(&mut self) {
        self.handle = None;
        self.swaps.clear();
        self.procs.clear();
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Refresh the stored swap-device list.
    ///
    /// A device count of zero (or an unreadable count, or a closed
    /// session) clears the list. Otherwise `count + 1` entries are
    /// requested, the kernel appending one aggregate row after the
    /// per-device rows. A failing kernel query also clears the list but
    /// is reported distinctly as `CoreError::SwapQuery` so callers can
    /// tell it apart from "no swap configured".
    pub fn update_swap_info(&mut self) -> Result<()> {
        let Some(handle) = &self.handle else {
            self.swaps.clear();
            return Ok(());
        };

        let nswapdev = read_counter::<i32, S>(&self.counters, SWAP_DEVICE_COUNT).unwrap_or(0);
        if nswapdev <= 0 {
            self.swaps.clear();
            return Ok(());
        }

        match handle.swap_devices(nswapdev as usize + 1) {
            Ok(devices) => {
                self.swaps = devices;
                Ok(())
            }
            Err(err) => {
                self.swaps.clear();
                Err(err)
            }
        }
    }

    /// Replace the substring filter applied by the next
    /// `update_process_info`. Token order is irrelevant; an empty set
    /// matches every process.
    pub fn set_process_filter<I, T>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.filter = tokens.into_iter().map(Into::into).collect();
    }

    pub fn clear_process_filter(&mut self) {
        self.filter.clear();
    }

    /// Refresh the stored process list from the kernel.
    ///
    /// The previous snapshot is discarded first. Records are copied out
    /// of the kernel-owned buffer, filtered (a record is kept iff any
    /// filter token is a case-sensitive substring of its name), and
    /// sorted by name ascending with pid ascending as the tie-break.
    /// A closed session or failing query yields an empty list.
    pub fn update_process_info(&mut self, scope: ProcessScope) {
        self.procs.clear();

        let Some(handle) = &self.handle else {
            return;
        };

        let records = match handle.processes(scope) {
            Ok(records) => records,
            Err(err) => {
                tracing::debug!(%err, "process table query failed");
                return;
            }
        };

        self.procs = records
            .into_iter()
            .filter(|rec| {
                self.filter.is_empty() || self.filter.iter().any(|tok| rec.name.contains(tok))
            })
            .collect();
        self.procs
            .sort_by(|a, b| a.name.cmp(&b.name).then(a.pid.cmp(&b.pid)));
    }

    /// The swap table from the last refresh, trailing aggregate row
    /// included.
    pub fn swap_devices(&self) -> &[SwapDevice] {
        &self.swaps
    }

    /// Swap snapshot for the presentation contract; `None` when no swap
    /// device is configured.
    pub fn swap_snapshot(&self) -> Option<SwapSnapshot> {
        if self.swaps.is_empty() {
            None
        } else {
            Some(SwapSnapshot {
                devices: self.swaps.clone(),
            })
        }
    }

    /// The filtered, sorted process list from the last refresh.
    pub fn processes(&self) -> &[ProcessRecord] {
        &self.procs
    }
}
