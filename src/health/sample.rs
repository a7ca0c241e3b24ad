//! Timestamped health samples

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use super::verdict::Verdict;

/// Whether a worker is present in the worker registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    Active,
    Inactive,
}

/// Liveness of a single named worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerLiveness {
    pub status: WorkerStatus,
    pub last_activity: Option<DateTime<Utc>>,
}

impl WorkerLiveness {
    pub fn active(last_activity: DateTime<Utc>) -> Self {
        Self {
            status: WorkerStatus::Active,
            last_activity: Some(last_activity),
        }
    }

    pub fn inactive() -> Self {
        Self {
            status: WorkerStatus::Inactive,
            last_activity: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == WorkerStatus::Active
    }
}

/// One bundle of verdicts across all monitored domains
///
/// Built once per cycle by the sampler and never mutated afterwards;
/// history and insights share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthSample {
    pub timestamp: DateTime<Utc>,
    pub memory: Verdict,
    pub cpu: Verdict,
    pub performance: Verdict,
    pub errors: Verdict,
    /// Worker liveness in configured order
    pub workers: IndexMap<String, WorkerLiveness>,
}

impl HealthSample {
    /// Domain verdicts paired with their display names
    pub fn domains(&self) -> [(&'static str, &Verdict); 4] {
        [
            ("memory", &self.memory),
            ("cpu", &self.cpu),
            ("performance", &self.performance),
            ("errors", &self.errors),
        ]
    }

    /// Returns true if any domain crossed a threshold
    pub fn is_degraded(&self) -> bool {
        self.domains()
            .iter()
            .any(|(_, verdict)| verdict.status.is_degraded())
    }

    /// Returns true if any domain could not be classified
    pub fn has_unknown(&self) -> bool {
        self.domains()
            .iter()
            .any(|(_, verdict)| verdict.status.is_unknown())
    }

    pub fn inactive_workers(&self) -> impl Iterator<Item = &str> {
        self.workers
            .iter()
            .filter(|(_, liveness)| !liveness.is_active())
            .map(|(id, _)| id.as_str())
    }

    /// Process exit code for a one-shot check
    /// 0 = healthy, 1 = any degraded domain, 2 = any unknown domain
    pub fn exit_code(&self) -> i32 {
        if self.is_degraded() {
            1
        } else if self.has_unknown() {
            2
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::verdict::{Evidence, Status};
    use std::time::Duration;

    fn healthy_sample() -> HealthSample {
        HealthSample {
            timestamp: Utc::now(),
            memory: Verdict::new(
                Status::Healthy,
                Evidence::Memory {
                    usage: 0.5,
                    used_bytes: 50,
                    limit_bytes: 100,
                },
            ),
            cpu: Verdict::new(Status::Healthy, Evidence::Cpu { usage: 0.2 }),
            performance: Verdict::new(
                Status::Healthy,
                Evidence::Performance {
                    load_time: Duration::ZERO,
                    dom_content_loaded: Duration::ZERO,
                },
            ),
            errors: Verdict::new(Status::Healthy, Evidence::Errors { count: 0, rate: 0.0 }),
            workers: IndexMap::new(),
        }
    }

    #[test]
    fn exit_codes_follow_worst_domain() {
        let mut sample = healthy_sample();
        assert_eq!(sample.exit_code(), 0);

        sample.cpu = Verdict::unknown("not supported");
        assert_eq!(sample.exit_code(), 2);

        sample.memory.status = Status::Critical;
        assert_eq!(sample.exit_code(), 1);
    }

    #[test]
    fn lists_inactive_workers() {
        let mut sample = healthy_sample();
        sample
            .workers
            .insert("indexer".to_string(), WorkerLiveness::active(Utc::now()));
        sample
            .workers
            .insert("crawler".to_string(), WorkerLiveness::inactive());

        let inactive: Vec<_> = sample.inactive_workers().collect();
        assert_eq!(inactive, vec!["crawler"]);
    }
}
