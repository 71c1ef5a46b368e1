pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod platform;

pub use config::Config;
pub use error::{CoreError, Result};
pub use metrics::{ArcCollector, MemoryCollector, MetricsCollector, PageInfo, VmSession};
pub use model::*;
pub use platform::{CounterSource, VmBackend, VmHandle};
