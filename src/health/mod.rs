//! Ecosystem health monitoring and recovery
//!
//! A scheduler periodically samples memory, CPU, load timing, error rates,
//! and worker liveness; classifies each domain against configured
//! thresholds; records the sample in a bounded history; and dispatches
//! recovery actions for degraded domains. Insights are derived from recent
//! history on demand.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use healthwatch::config::MonitorConfig;
//! use healthwatch::health::{Capabilities, HealthMonitor, Scheduler, probes::*};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitorConfig::load("release")?;
//! let monitor = Arc::new(HealthMonitor::from_config(
//!     &config,
//!     Capabilities {
//!         memory: Some(Arc::new(SystemMemory::new())),
//!         cpu: Some(Arc::new(SystemCpu::new())),
//!         ..Capabilities::default()
//!     },
//! )?);
//!
//! let handle = Scheduler::new(
//!     Arc::clone(&monitor),
//!     config.schedule.interval(),
//!     config.schedule.cycle_timeout(),
//! )
//! .start();
//!
//! let insight = monitor.insights();
//! println!("{} recommendations", insight.recommendations.len());
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod history;
pub mod insight;
pub mod monitor;
pub mod probes;
pub mod recovery;
pub mod reporter;
pub mod sample;
pub mod sampler;
pub mod scheduler;
pub mod verdict;

pub use history::HistoryStore;
pub use insight::{HealthTrends, Insight, InsightEngine, SteadyTrend, Trend, TrendEstimator};
pub use monitor::{Capabilities, CycleReport, HealthMonitor};
pub use recovery::{
    Automation, DispatchOutcome, IssueKey, RecoveryAction, RecoveryDispatcher, analyze,
};
pub use reporter::{format_insight, format_sample, print_insight};
pub use sample::{HealthSample, WorkerLiveness, WorkerStatus};
pub use sampler::Sampler;
pub use scheduler::{Scheduler, SchedulerHandle, SchedulerState};
pub use verdict::{Evidence, Status, Verdict, classify_latency, classify_ratio};
