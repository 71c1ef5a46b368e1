//! Stand-in backend for non-FreeBSD hosts. Every counter read and session
//! open reports "unsupported", so collectors degrade to stale samples and
//! empty snapshots instead of failing.

use crate::{
    error::{CoreError, Result},
    model::{ProcessRecord, ProcessScope, SwapDevice},
    platform::{CounterError, CounterSource, VmBackend, VmHandle},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedCounters;

impl CounterSource for UnsupportedCounters {
    fn read_counter(&self, _name: &str, _dest: &mut [u8]) -> std::result::Result<(), CounterError> {
        Err(CounterError::Unsupported)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedVm;

impl VmBackend for UnsupportedVm {
    type Handle = UnsupportedHandle;

    fn open(&self) -> Result<UnsupportedHandle> {
        Err(CoreError::unsupported_platform(
            "kvm sessions require a FreeBSD kernel",
        ))
    }
}

/// Uninhabited: an unsupported backend never produces a live handle.
pub enum UnsupportedHandle {}

impl VmHandle for UnsupportedHandle {
    fn swap_devices(&self, _max: usize) -> Result<Vec<SwapDevice>> {
        match *self {}
    }

    fn processes(&self, _scope: ProcessScope) -> Result<Vec<ProcessRecord>> {
        match *self {}
    }
}
