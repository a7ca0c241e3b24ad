//! System memory introspection via `sysinfo`

use std::sync::{Mutex, PoisonError};

use sysinfo::System;

use super::{MemoryIntrospection, MemoryReading};
use crate::error::ProbeError;

/// Reads used and total memory of the local machine
pub struct SystemMemory {
    system: Mutex<System>,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIntrospection for SystemMemory {
    fn read(&self) -> Result<MemoryReading, ProbeError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProbeError::Unavailable(
                "memory introspection is not supported on this platform".to_string(),
            ));
        }

        let mut system = self.system.lock().unwrap_or_else(PoisonError::into_inner);
        system.refresh_memory();

        let limit_bytes = system.total_memory();
        if limit_bytes == 0 {
            return Err(ProbeError::Unavailable(
                "host reported zero total memory".to_string(),
            ));
        }

        Ok(MemoryReading {
            used_bytes: system.used_memory(),
            limit_bytes,
        })
    }
}
