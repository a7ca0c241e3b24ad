//! Error-rate sources

use std::sync::atomic::{AtomicU64, Ordering};

use super::{ErrorRateSource, ErrorStats};
use crate::error::ProbeError;

/// Placeholder source for hosts without error tracking
///
/// Always reports zero errors, so the error domain stays healthy.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoErrorTracking;

impl ErrorRateSource for NoErrorTracking {
    fn read(&self) -> Result<ErrorStats, ProbeError> {
        Ok(ErrorStats::default())
    }
}

/// Counts requests and failures between sampler reads
///
/// Each read reports the window since the previous read and starts a new
/// one.
#[derive(Debug, Default)]
pub struct ErrorCounter {
    requests: AtomicU64,
    errors: AtomicU64,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

impl ErrorRateSource for ErrorCounter {
    fn read(&self) -> Result<ErrorStats, ProbeError> {
        let errors = self.errors.swap(0, Ordering::Relaxed);
        let requests = self.requests.swap(0, Ordering::Relaxed);

        let rate = if requests == 0 {
            0.0
        } else {
            // Concurrent records between the two swaps can skew the ratio.
            (errors as f64 / requests as f64).min(1.0)
        };

        Ok(ErrorStats {
            count: errors,
            rate,
        })
    }
}
