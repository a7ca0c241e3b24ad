//! Global CPU usage via `sysinfo`

use std::sync::{Mutex, PoisonError};

use sysinfo::System;

use super::CpuIntrospection;
use crate::error::ProbeError;

/// Reads aggregate CPU usage of the local machine
///
/// Usage is computed between two refreshes, so the `System` is kept across
/// reads. The first read after construction compares against the baseline
/// taken in [`SystemCpu::new`].
pub struct SystemCpu {
    system: Mutex<System>,
}

impl SystemCpu {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SystemCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuIntrospection for SystemCpu {
    fn usage(&self) -> Result<f64, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::Unavailable(
                "cpu introspection is not supported on this platform".to_string(),
            ));
        }

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_cpu_usage();

        if system.cpus().is_empty() {
            return Err(ProbeError::Unavailable("no cpus detected".to_string()));
        }

        let percent = f64::from(system.global_cpu_usage());
        Ok((percent / 100.0).clamp(0.0, 1.0))
    }
}
