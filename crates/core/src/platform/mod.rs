#[cfg(target_os = "freebsd")]
pub mod freebsd;

#[cfg(not(target_os = "freebsd"))]
pub mod fallback;

#[cfg(test)]
pub mod mock;

use crate::{
    error::Result,
    model::{ProcessRecord, ProcessScope, Sample, SwapDevice},
};
use thiserror::Error;

#[cfg(target_os = "freebsd")]
pub use freebsd::{KvmBackend as NativeVm, SysctlCounters as NativeCounters};

#[cfg(not(target_os = "freebsd"))]
pub use fallback::{UnsupportedCounters as NativeCounters, UnsupportedVm as NativeVm};

/// Largest counter the reader supports; every named kernel counter we
/// consume is an ordinary integer.
pub const MAX_COUNTER_SIZE: usize = 8;

/// Why a named kernel counter could not be read this cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CounterError {
    #[error("counter {0} not found")]
    NotFound(String),

    #[error("counter {name}: expected {expected} bytes, kernel returned {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("kernel counters not available on this platform")]
    Unsupported,
}

/// Access to named, fixed-size kernel counters (sysctl on FreeBSD).
///
/// `read_counter` must either fill `dest` with exactly `dest.len()` bytes
/// or fail without touching it. Size mismatches are reported, not
/// truncated.
pub trait CounterSource {
    fn read_counter(&self, name: &str, dest: &mut [u8]) -> std::result::Result<(), CounterError>;
}

/// Integer types a kernel counter can decode into.
pub trait CounterValue: Copy + Default {
    const SIZE: usize;

    fn from_ne_bytes(bytes: &[u8]) -> Option<Self>;
}

macro_rules! counter_value {
    ($($ty:ty),*) => {
        $(
            impl CounterValue for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn from_ne_bytes(bytes: &[u8]) -> Option<Self> {
                    Some(<$ty>::from_ne_bytes(bytes.try_into().ok()?))
                }
            }
        )*
    };
}

counter_value!(i32, u32, i64, u64);

/// Read one typed counter. The destination type fixes the expected size;
/// a kernel answer of any other size is an error, never a partial write.
pub fn read_counter<T, S>(src: &S, name: &str) -> std::result::Result<T, CounterError>
where
    T: CounterValue,
    S: CounterSource + ?Sized,
{
    let mut buf = [0u8; MAX_COUNTER_SIZE];
    let dest = &mut buf[..T::SIZE];
    src.read_counter(name, dest)?;
    T::from_ne_bytes(dest).ok_or(CounterError::SizeMismatch {
        name: name.to_string(),
        expected: T::SIZE,
        actual: dest.len(),
    })
}

/// Refresh one sampled counter in place.
///
/// On success the sample holds the new value with `fresh == true`. On any
/// read failure the previous value is kept, `fresh` drops to false and a
/// diagnostic is emitted; the condition is never raised to the caller.
/// A missing counter means "metric unsupported on this kernel", not a
/// broken refresh cycle.
pub fn refresh_sample<T, S>(src: &S, name: &str, sample: &mut Sample<T>)
where
    T: CounterValue,
    S: CounterSource + ?Sized,
{
    match read_counter::<T, S>(src, name) {
        Ok(value) => {
            sample.value = value;
            sample.fresh = true;
        }
        Err(err) => {
            sample.fresh = false;
            tracing::debug!(counter = name, %err, "kernel counter unavailable, keeping last value");
        }
    }
}

/// Opens handles to the kernel virtual-memory query interface.
pub trait VmBackend {
    type Handle: VmHandle;

    fn open(&self) -> Result<Self::Handle>;
}

/// One live kvm session handle. Dropping the handle releases it; a handle
/// is released exactly once.
pub trait VmHandle {
    /// Fetch up to `max` swap-table entries (per-device rows plus the
    /// kernel's trailing aggregate row).
    fn swap_devices(&self, max: usize) -> Result<Vec<SwapDevice>>;

    /// Fetch the process table, copying each record out of the
    /// kernel-owned buffer before returning.
    fn processes(&self, scope: ProcessScope) -> Result<Vec<ProcessRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::mock::MockCounters;

    #[test]
    fn read_counter_decodes_native_endian() {
        let mut src = MockCounters::new();
        src.set_u32("vm.stats.vm.v_free_count", 1234);
        let v: u32 = read_counter(&src, "vm.stats.vm.v_free_count").unwrap();
        assert_eq!(v, 1234);
    }

    #[test]
    fn read_counter_rejects_size_mismatch() {
        let mut src = MockCounters::new();
        src.set_u32("vfs.bufspace", 7);
        // 4 bytes stored, 8 requested
        let err = read_counter::<i64, _>(&src, "vfs.bufspace").unwrap_err();
        assert!(matches!(err, CounterError::SizeMismatch { .. }));
    }

    #[test]
    fn refresh_sample_keeps_last_value_on_failure() {
        let mut src = MockCounters::new();
        src.set_u32("vm.stats.vm.v_wire_count", 99);

        let mut sample = Sample::<u32>::default();
        refresh_sample(&src, "vm.stats.vm.v_wire_count", &mut sample);
        assert_eq!(sample.value, 99);
        assert!(sample.fresh);

        src.remove("vm.stats.vm.v_wire_count");
        refresh_sample(&src, "vm.stats.vm.v_wire_count", &mut sample);
        assert_eq!(sample.value, 99);
        assert!(!sample.fresh);
    }
}
