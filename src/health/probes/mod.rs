//! Host capabilities read by the sampler
//!
//! Each capability is a trait so hosts can plug in their own sources and
//! tests can substitute fakes. The built-in implementations cover the local
//! machine (`sysinfo`), in-process timing and error counters, and an
//! in-memory worker registry.

pub mod cpu;
pub mod errors;
pub mod memory;
pub mod timing;
pub mod workers;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::ProbeError;

pub use cpu::SystemCpu;
pub use errors::{ErrorCounter, NoErrorTracking};
pub use memory::SystemMemory;
pub use timing::TimingRecorder;
pub use workers::InMemoryWorkerRegistry;

/// Memory in use against the limit it is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReading {
    pub used_bytes: u64,
    pub limit_bytes: u64,
}

/// Most recent page/request load timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationTiming {
    pub load_time: Duration,
    pub dom_content_loaded: Duration,
}

/// Error volume observed since the previous read
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ErrorStats {
    pub count: u64,
    pub rate: f64,
}

/// Heap or system memory introspection
pub trait MemoryIntrospection: Send + Sync {
    /// Returns `ProbeError::Unavailable` when the host cannot report memory
    fn read(&self) -> Result<MemoryReading, ProbeError>;
}

/// Aggregate CPU usage as a ratio in `[0, 1]`
pub trait CpuIntrospection: Send + Sync {
    fn usage(&self) -> Result<f64, ProbeError>;
}

/// Source of the most recent load timing record
pub trait TimingSource: Send + Sync {
    /// `Ok(None)` means no record exists yet
    fn latest(&self) -> Result<Option<NavigationTiming>, ProbeError>;
}

/// Source of error counts and rates
pub trait ErrorRateSource: Send + Sync {
    fn read(&self) -> Result<ErrorStats, ProbeError>;
}

/// Registry of named background workers
pub trait WorkerRegistry: Send + Sync {
    fn is_registered(&self, worker_id: &str) -> bool;

    /// Last recorded activity, when the registry tracks it
    fn last_activity(&self, _worker_id: &str) -> Option<DateTime<Utc>> {
        None
    }
}

impl<T: MemoryIntrospection + ?Sized> MemoryIntrospection for Arc<T> {
    fn read(&self) -> Result<MemoryReading, ProbeError> {
        (**self).read()
    }
}

impl<T: CpuIntrospection + ?Sized> CpuIntrospection for Arc<T> {
    fn usage(&self) -> Result<f64, ProbeError> {
        (**self).usage()
    }
}

impl<T: TimingSource + ?Sized> TimingSource for Arc<T> {
    fn latest(&self) -> Result<Option<NavigationTiming>, ProbeError> {
        (**self).latest()
    }
}

impl<T: ErrorRateSource + ?Sized> ErrorRateSource for Arc<T> {
    fn read(&self) -> Result<ErrorStats, ProbeError> {
        (**self).read()
    }
}

impl<T: WorkerRegistry + ?Sized> WorkerRegistry for Arc<T> {
    fn is_registered(&self, worker_id: &str) -> bool {
        (**self).is_registered(worker_id)
    }

    fn last_activity(&self, worker_id: &str) -> Option<DateTime<Utc>> {
        (**self).last_activity(worker_id)
    }
}
