//! Sampler: reads every probe and classifies the result

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::probes::{
    CpuIntrospection, ErrorRateSource, MemoryIntrospection, NoErrorTracking, TimingSource,
    WorkerRegistry,
};
use super::sample::{HealthSample, WorkerLiveness};
use super::verdict::{Evidence, Verdict, classify_latency, classify_ratio};
use crate::config::ThresholdConfig;
use crate::error::ProbeError;

/// Assembles one [`HealthSample`] per call from the configured capabilities
///
/// A missing capability, or one that returns an error, degrades only its own
/// domain to `unknown`; sampling itself never fails.
///
/// Probes are read one after another on the calling thread. A probe that
/// blocks delays the remaining domains of the same sample; the scheduler
/// bounds the cycle as a whole, not each probe. Capabilities backed by real
/// I/O should cache their readings and return from `read` promptly.
pub struct Sampler {
    thresholds: ThresholdConfig,
    memory: Option<Box<dyn MemoryIntrospection>>,
    cpu: Option<Box<dyn CpuIntrospection>>,
    timing: Option<Box<dyn TimingSource>>,
    errors: Box<dyn ErrorRateSource>,
    registry: Option<Arc<dyn WorkerRegistry>>,
    workers: Vec<String>,
}

impl Sampler {
    /// Creates a sampler with no host capabilities attached
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            thresholds,
            memory: None,
            cpu: None,
            timing: None,
            errors: Box::new(NoErrorTracking),
            registry: None,
            workers: Vec::new(),
        }
    }

    pub fn with_memory<M: MemoryIntrospection + 'static>(mut self, memory: M) -> Self {
        self.memory = Some(Box::new(memory));
        self
    }

    pub fn with_cpu<C: CpuIntrospection + 'static>(mut self, cpu: C) -> Self {
        self.cpu = Some(Box::new(cpu));
        self
    }

    pub fn with_timing<T: TimingSource + 'static>(mut self, timing: T) -> Self {
        self.timing = Some(Box::new(timing));
        self
    }

    /// Replaces the default always-healthy error source
    pub fn with_error_source<E: ErrorRateSource + 'static>(mut self, errors: E) -> Self {
        self.errors = Box::new(errors);
        self
    }

    /// Sets the worker identifiers to report on, in report order
    ///
    /// Without a registry every listed worker is reported inactive.
    pub fn with_worker_ids<I, S>(mut self, workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.workers = workers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_worker_registry(mut self, registry: Arc<dyn WorkerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Samples every domain, stamped with the current time
    pub fn sample(&self) -> HealthSample {
        self.sample_at(Utc::now())
    }

    /// Samples every domain with an explicit timestamp
    pub fn sample_at(&self, timestamp: DateTime<Utc>) -> HealthSample {
        let start = Instant::now();

        let sample = HealthSample {
            timestamp,
            memory: degrade_on_error("memory", self.check_memory()),
            cpu: degrade_on_error("cpu", self.check_cpu()),
            performance: degrade_on_error("performance", self.check_performance()),
            errors: degrade_on_error("errors", self.check_errors()),
            workers: self.check_workers(timestamp),
        };

        debug!(elapsed = ?start.elapsed(), "Health sample collected");
        sample
    }

    fn check_memory(&self) -> Result<Verdict, ProbeError> {
        let memory = self
            .memory
            .as_ref()
            .ok_or_else(|| ProbeError::Unavailable("no memory introspection".to_string()))?;
        let reading = memory.read()?;
        if reading.limit_bytes == 0 {
            return Err(ProbeError::Unavailable("memory limit is zero".to_string()));
        }

        let usage = reading.used_bytes as f64 / reading.limit_bytes as f64;
        Ok(Verdict::new(
            classify_ratio(usage, self.thresholds.memory_usage()),
            Evidence::Memory {
                usage,
                used_bytes: reading.used_bytes,
                limit_bytes: reading.limit_bytes,
            },
        ))
    }

    fn check_cpu(&self) -> Result<Verdict, ProbeError> {
        let cpu = self
            .cpu
            .as_ref()
            .ok_or_else(|| ProbeError::Unavailable("no cpu introspection".to_string()))?;
        let usage = cpu.usage()?;
        Ok(Verdict::new(
            classify_ratio(usage, self.thresholds.cpu_usage()),
            Evidence::Cpu { usage },
        ))
    }

    fn check_performance(&self) -> Result<Verdict, ProbeError> {
        // No timing source and no record both mean a zero load time
        let timing = match &self.timing {
            Some(source) => source.latest()?.unwrap_or_default(),
            None => Default::default(),
        };

        Ok(Verdict::new(
            classify_latency(timing.load_time, self.thresholds.response_time()),
            Evidence::Performance {
                load_time: timing.load_time,
                dom_content_loaded: timing.dom_content_loaded,
            },
        ))
    }

    fn check_errors(&self) -> Result<Verdict, ProbeError> {
        let stats = self.errors.read()?;
        Ok(Verdict::new(
            classify_ratio(stats.rate, self.thresholds.error_rate()),
            Evidence::Errors {
                count: stats.count,
                rate: stats.rate,
            },
        ))
    }

    fn check_workers(&self, timestamp: DateTime<Utc>) -> IndexMap<String, WorkerLiveness> {
        self.workers
            .iter()
            .map(|id| {
                let liveness = match &self.registry {
                    Some(registry) if registry.is_registered(id) => WorkerLiveness::active(
                        registry.last_activity(id).unwrap_or(timestamp),
                    ),
                    _ => WorkerLiveness::inactive(),
                };
                (id.clone(), liveness)
            })
            .collect()
    }
}

fn degrade_on_error(domain: &'static str, result: Result<Verdict, ProbeError>) -> Verdict {
    match result {
        Ok(verdict) => verdict,
        Err(ProbeError::Unavailable(reason)) => {
            warn!(domain, %reason, "Probe capability unavailable, marking domain unknown");
            Verdict::unknown(reason)
        }
        Err(err) => {
            warn!(domain, error = %err, "Probe failed, marking domain unknown");
            Verdict::unknown(err.to_string())
        }
    }
}
