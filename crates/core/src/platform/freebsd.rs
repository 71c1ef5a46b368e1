//! Native FreeBSD backend: sysctl(3) for named counters and libkvm for
//! the process/swap query session.

use crate::{
    error::{CoreError, Result},
    model::{ProcessRecord, ProcessScope, SwapDevice},
    platform::{CounterError, CounterSource, VmBackend, VmHandle, MAX_COUNTER_SIZE},
};
use std::{
    ffi::CString,
    os::raw::{c_char, c_int, c_uint},
    ptr::{self, NonNull},
};

#[repr(C)]
#[allow(non_camel_case_types)]
struct kvm_swap {
    ksw_devname: [c_char; 32],
    ksw_used: c_uint,
    ksw_total: c_uint,
    ksw_flags: c_int,
    ksw_reserved1: c_uint,
    ksw_reserved2: c_uint,
}

/// Opaque libkvm descriptor.
#[repr(C)]
#[allow(non_camel_case_types)]
struct kvm_t {
    _private: [u8; 0],
}

#[link(name = "kvm")]
extern "C" {
    fn kvm_open(
        execfile: *const c_char,
        corefile: *const c_char,
        swapfile: *const c_char,
        flags: c_int,
        errstr: *const c_char,
    ) -> *mut kvm_t;
    fn kvm_close(kd: *mut kvm_t) -> c_int;
    fn kvm_getswapinfo(
        kd: *mut kvm_t,
        entries: *mut kvm_swap,
        maxswap: c_int,
        flags: c_int,
    ) -> c_int;
    fn kvm_getprocs(
        kd: *mut kvm_t,
        op: c_int,
        arg: c_int,
        cnt: *mut c_int,
    ) -> *mut libc::kinfo_proc;
}

/// Named kernel counters via sysctlbyname(3).
#[derive(Debug, Clone, Copy, Default)]
pub struct SysctlCounters;

impl CounterSource for SysctlCounters {
    fn read_counter(&self, name: &str, dest: &mut [u8]) -> std::result::Result<(), CounterError> {
        let cname = CString::new(name).map_err(|_| CounterError::NotFound(name.to_string()))?;
        if dest.len() > MAX_COUNTER_SIZE {
            return Err(CounterError::SizeMismatch {
                name: name.to_string(),
                expected: dest.len(),
                actual: MAX_COUNTER_SIZE,
            });
        }

        // Read into a scratch buffer so a short or oversized answer never
        // clobbers the caller's destination.
        let mut scratch = [0u8; MAX_COUNTER_SIZE];
        let mut len = dest.len();
        let rc = unsafe {
            libc::sysctlbyname(
                cname.as_ptr(),
                scratch.as_mut_ptr().cast(),
                &mut len,
                ptr::null(),
                0,
            )
        };
        if rc == -1 {
            return Err(CounterError::NotFound(name.to_string()));
        }
        if len != dest.len() {
            return Err(CounterError::SizeMismatch {
                name: name.to_string(),
                expected: dest.len(),
                actual: len,
            });
        }
        dest.copy_from_slice(&scratch[..len]);
        Ok(())
    }
}

/// Opens kvm descriptors against the live kernel (corefile `/dev/null`).
#[derive(Debug, Clone, Copy, Default)]
pub struct KvmBackend;

impl VmBackend for KvmBackend {
    type Handle = KvmHandle;

    fn open(&self) -> Result<KvmHandle> {
        let devnull = CString::new("/dev/null").map_err(|_| CoreError::session("bad corefile"))?;
        let kd = unsafe {
            kvm_open(
                ptr::null(),
                devnull.as_ptr(),
                ptr::null(),
                libc::O_RDONLY,
                ptr::null(),
            )
        };
        NonNull::new(kd)
            .map(KvmHandle)
            .ok_or_else(|| CoreError::session("kvm_open failed"))
    }
}

/// Exclusively owned kvm descriptor, closed on drop.
pub struct KvmHandle(NonNull<kvm_t>);

impl Drop for KvmHandle {
    fn drop(&mut self) {
        unsafe {
            kvm_close(self.0.as_ptr());
        }
    }
}

impl VmHandle for KvmHandle {
    fn swap_devices(&self, max: usize) -> Result<Vec<SwapDevice>> {
        let mut raw: Vec<kvm_swap> = Vec::with_capacity(max);
        raw.resize_with(max, || unsafe { std::mem::zeroed() });

        let n = unsafe { kvm_getswapinfo(self.0.as_ptr(), raw.as_mut_ptr(), max as c_int, 0) };
        if n < 0 {
            return Err(CoreError::swap_query("kvm_getswapinfo failed"));
        }

        Ok(raw
            .iter()
            .map(|sw| SwapDevice {
                name: c_array_to_string(&sw.ksw_devname),
                used_pages: u64::from(sw.ksw_used),
                total_pages: u64::from(sw.ksw_total),
            })
            .collect())
    }

    fn processes(&self, scope: ProcessScope) -> Result<Vec<ProcessRecord>> {
        let op = match scope {
            ProcessScope::User => libc::KERN_PROC_PROC,
            ProcessScope::All => libc::KERN_PROC_ALL,
        };

        let mut count: c_int = 0;
        let base = unsafe { kvm_getprocs(self.0.as_ptr(), op, 0, &mut count) };
        if base.is_null() || count < 0 {
            return Err(CoreError::session("kvm_getprocs failed"));
        }

        // The buffer is owned by the kvm descriptor and only valid until
        // the next call; copy every field out before returning.
        let raw = unsafe { std::slice::from_raw_parts(base, count as usize) };
        Ok(raw
            .iter()
            .map(|info| ProcessRecord {
                pid: info.ki_pid,
                name: c_array_to_string(&info.ki_comm),
                resident_pages: info.ki_rssize.max(0) as u64,
                text_pages: info.ki_tsize.max(0) as u64,
                data_pages: info.ki_dsize.max(0) as u64,
                cpu_fraction: info.ki_pctcpu,
                threads: info.ki_numthreads.max(0) as u32,
            })
            .collect())
    }
}

fn c_array_to_string(chars: &[c_char]) -> String {
    let bytes: &[u8] = unsafe { std::slice::from_raw_parts(chars.as_ptr().cast(), chars.len()) };
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

unsafe impl Send for KvmHandle {}
