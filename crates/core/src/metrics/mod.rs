pub mod arc;
pub mod memory;
pub mod page;
pub mod session;

pub use arc::ArcCollector;
pub use memory::MemoryCollector;
pub use page::PageInfo;
pub use session::VmSession;

use crate::{
    error::Result,
    model::{ArcPresence, ProcessScope, Snapshot},
};
use std::time::SystemTime;

/// Main collector that coordinates the per-subsystem collectors over one
/// refresh cycle. Driven by an external periodic trigger; it does no
/// scheduling of its own.
pub struct MetricsCollector {
    page: PageInfo,
    memory: MemoryCollector,
    arc: ArcCollector,
    session: VmSession,
    scope: ProcessScope,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        let mut session = VmSession::native();
        if let Err(err) = session.open() {
            // Session-scoped queries degrade to empty results.
            tracing::warn!(%err, "kvm session unavailable, swap and process stats disabled");
        }

        Ok(Self {
            page: PageInfo::current()?,
            memory: MemoryCollector::new(),
            arc: ArcCollector::new(),
            session,
            scope: ProcessScope::default(),
        })
    }

    pub fn page_info(&self) -> PageInfo {
        self.page
    }

    /// Include kernel-owned processes in subsequent cycles.
    pub fn set_scope(&mut self, scope: ProcessScope) {
        self.scope = scope;
    }

    pub fn set_process_filter<I, T>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.session.set_process_filter(tokens);
    }

    pub fn clear_process_filter(&mut self) {
        self.session.clear_process_filter();
    }

    /// Run one refresh cycle and assemble the snapshot. A failure in one
    /// metric never blocks collection of the others.
    pub fn collect(&mut self) -> Snapshot {
        let timestamp = SystemTime::now();

        let memory = self.memory.collect();

        let arc = match self.arc.probe() {
            ArcPresence::Present => Some(self.arc.collect()),
            ArcPresence::Absent | ArcPresence::Unknown => None,
        };

        if let Err(err) = self.session.update_swap_info() {
            tracing::warn!(%err, "swap query failed, reporting no swap this cycle");
        }
        self.session.update_process_info(self.scope);

        Snapshot {
            timestamp,
            page: self.page,
            memory,
            arc,
            swap: self.session.swap_snapshot(),
            processes: self.session.processes().to_vec(),
        }
    }
}
