//! In-process load timing records

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use super::{NavigationTiming, TimingSource};
use crate::error::ProbeError;

/// Keeps the most recent timing record reported by the host
///
/// Hosts call [`TimingRecorder::record`] after each page load or request;
/// the sampler only ever sees the latest record.
#[derive(Debug, Default)]
pub struct TimingRecorder {
    latest: RwLock<Option<NavigationTiming>>,
}

impl TimingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, timing: NavigationTiming) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(timing);
    }

    /// Records a load with no separate DOM-ready phase
    pub fn record_load_time(&self, load_time: Duration) {
        self.record(NavigationTiming {
            load_time,
            dom_content_loaded: Duration::ZERO,
        });
    }

    pub fn clear(&self) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl TimingSource for TimingRecorder {
    fn latest(&self) -> Result<Option<NavigationTiming>, ProbeError> {
        Ok(*self.latest.read().unwrap_or_else(PoisonError::into_inner))
    }
}
