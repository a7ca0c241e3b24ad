//! One monitoring cycle: sample, record, recover

use std::sync::Arc;

use tracing::{info, warn};

use super::history::HistoryStore;
use super::insight::{Insight, InsightEngine, TrendEstimator};
use super::probes::{
    CpuIntrospection, ErrorRateSource, MemoryIntrospection, TimingSource, WorkerRegistry,
};
use super::recovery::{Automation, DispatchOutcome, IssueKey, RecoveryDispatcher};
use super::sample::HealthSample;
use super::sampler::Sampler;
use crate::config::MonitorConfig;
use crate::error::ConfigError;

/// Host capabilities handed to [`HealthMonitor::from_config`]
///
/// Anything left unset degrades gracefully: memory and CPU report
/// `unknown`, timing reports a zero load time, errors report healthy, and
/// every worker is inactive.
#[derive(Default, Clone)]
pub struct Capabilities {
    pub memory: Option<Arc<dyn MemoryIntrospection>>,
    pub cpu: Option<Arc<dyn CpuIntrospection>>,
    pub timing: Option<Arc<dyn TimingSource>>,
    pub errors: Option<Arc<dyn ErrorRateSource>>,
    pub workers: Option<Arc<dyn WorkerRegistry>>,
    pub automation: Option<Arc<dyn Automation>>,
}

/// What a single cycle observed and did
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sample: Arc<HealthSample>,
    /// False if the history store rejected the sample
    pub recorded: bool,
    pub outcomes: Vec<(IssueKey, DispatchOutcome)>,
}

impl CycleReport {
    pub fn triggered(&self) -> impl Iterator<Item = IssueKey> + '_ {
        self.outcomes.iter().map(|(key, _)| *key)
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .count()
    }
}

/// The health-monitoring and recovery engine
pub struct HealthMonitor {
    sampler: Sampler,
    dispatcher: RecoveryDispatcher,
    history: Arc<HistoryStore>,
    insights: InsightEngine,
}

impl HealthMonitor {
    pub fn new(
        sampler: Sampler,
        dispatcher: RecoveryDispatcher,
        history: Arc<HistoryStore>,
        insights: InsightEngine,
    ) -> Self {
        Self {
            sampler,
            dispatcher,
            history,
            insights,
        }
    }

    /// Wires a monitor from validated configuration and host capabilities
    pub fn from_config(
        config: &MonitorConfig,
        capabilities: Capabilities,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sampler = Sampler::new(config.thresholds);
        if let Some(memory) = capabilities.memory {
            sampler = sampler.with_memory(memory);
        }
        if let Some(cpu) = capabilities.cpu {
            sampler = sampler.with_cpu(cpu);
        }
        if let Some(timing) = capabilities.timing {
            sampler = sampler.with_timing(timing);
        }
        if let Some(errors) = capabilities.errors {
            sampler = sampler.with_error_source(errors);
        }
        sampler = sampler.with_worker_ids(config.workers.iter().cloned());
        if let Some(registry) = capabilities.workers {
            sampler = sampler.with_worker_registry(registry);
        }

        let mut history = HistoryStore::new(config.history.capacity);
        if let Some(max_age) = config.history.max_age() {
            history = history.with_max_age(max_age);
        }
        let history = Arc::new(history);

        Ok(Self::new(
            sampler,
            RecoveryDispatcher::with_defaults(capabilities.automation),
            Arc::clone(&history),
            InsightEngine::new(history, config.history.insight_window),
        ))
    }

    /// Replaces the default steady trend estimator
    pub fn with_trend_estimator<T: TrendEstimator + 'static>(self, estimator: T) -> Self {
        Self {
            insights: self.insights.with_trend_estimator(estimator),
            ..self
        }
    }

    /// Runs one cycle
    ///
    /// Never fails: probe errors become `unknown` verdicts, a rejected
    /// append is logged, and recovery failures are reported in the outcome
    /// list.
    pub fn run_cycle(&self) -> CycleReport {
        info!("Performing health check");

        let sample = Arc::new(self.sampler.sample());

        let recorded = match self.history.append(Arc::clone(&sample)) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Dropping health sample");
                false
            }
        };

        let outcomes = self.dispatcher.dispatch_all(&sample);

        CycleReport {
            sample,
            recorded,
            outcomes,
        }
    }

    /// Summary over recent history; safe to call before the first cycle
    pub fn insights(&self) -> Insight {
        self.insights.insights()
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }
}
