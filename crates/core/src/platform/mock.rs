//! Scripted counter and kvm backends for tests.

use crate::{
    error::{CoreError, Result},
    model::{ProcessRecord, ProcessScope, SwapDevice},
    platform::{CounterError, CounterSource, VmBackend, VmHandle},
};
use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};

/// Counter source backed by a name → bytes map.
#[derive(Debug, Clone, Default)]
pub struct MockCounters {
    values: HashMap<String, Vec<u8>>,
}

impl MockCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_i32(&mut self, name: &str, value: i32) {
        self.values
            .insert(name.to_string(), value.to_ne_bytes().to_vec());
    }

    pub fn set_u32(&mut self, name: &str, value: u32) {
        self.values
            .insert(name.to_string(), value.to_ne_bytes().to_vec());
    }

    pub fn set_i64(&mut self, name: &str, value: i64) {
        self.values
            .insert(name.to_string(), value.to_ne_bytes().to_vec());
    }

    pub fn set_u64(&mut self, name: &str, value: u64) {
        self.values
            .insert(name.to_string(), value.to_ne_bytes().to_vec());
    }

    pub fn remove(&mut self, name: &str) {
        self.values.remove(name);
    }
}

impl CounterSource for MockCounters {
    fn read_counter(&self, name: &str, dest: &mut [u8]) -> std::result::Result<(), CounterError> {
        let bytes = self
            .values
            .get(name)
            .ok_or_else(|| CounterError::NotFound(name.to_string()))?;
        if bytes.len() != dest.len() {
            return Err(CounterError::SizeMismatch {
                name: name.to_string(),
                expected: dest.len(),
                actual: bytes.len(),
            });
        }
        dest.copy_from_slice(bytes);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockVmState {
    swap: Vec<SwapDevice>,
    swap_fails: bool,
    procs: Vec<ProcessRecord>,
    open_fails: bool,
    live_handles: usize,
}

/// Kvm backend with scripted results and a live-handle count, shared
/// between the backend and every handle it opens.
#[derive(Debug, Clone, Default)]
pub struct MockVm {
    state: Rc<RefCell<MockVmState>>,
}

impl MockVm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the swap table. The aggregate row must be included, the
    /// same way the kernel returns it.
    pub fn set_swap(&self, devices: Vec<SwapDevice>) {
        self.state.borrow_mut().swap = devices;
    }

    pub fn fail_swap(&self, fail: bool) {
        self.state.borrow_mut().swap_fails = fail;
    }

    pub fn set_processes(&self, procs: Vec<ProcessRecord>) {
        self.state.borrow_mut().procs = procs;
    }

    pub fn fail_open(&self, fail: bool) {
        self.state.borrow_mut().open_fails = fail;
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles
    }
}

impl VmBackend for MockVm {
    type Handle = MockHandle;

    fn open(&self) -> Result<MockHandle> {
        if self.state.borrow().open_fails {
            return Err(CoreError::session("mock open failure"));
        }
        self.state.borrow_mut().live_handles += 1;
        Ok(MockHandle {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MockHandle {
    state: Rc<RefCell<MockVmState>>,
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.state.borrow_mut().live_handles -= 1;
    }
}

impl VmHandle for MockHandle {
    fn swap_devices(&self, max: usize) -> Result<Vec<SwapDevice>> {
        let state = self.state.borrow();
        if state.swap_fails {
            return Err(CoreError::swap_query("mock swap failure"));
        }
        Ok(state.swap.iter().take(max).cloned().collect())
    }

    fn processes(&self, _scope: ProcessScope) -> Result<Vec<ProcessRecord>> {
        Ok(self.state.borrow().procs.clone())
    }
}
