//! Recovery dispatch for degraded domains

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use super::sample::HealthSample;
use super::verdict::Status;
use crate::error::{AutomationError, RecoveryError};

/// Issue raised when a domain crosses its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKey {
    MemoryHigh,
    ResponseSlow,
    ErrorRateHigh,
}

impl IssueKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKey::MemoryHigh => "memory_high",
            IssueKey::ResponseSlow => "response_slow",
            IssueKey::ErrorRateHigh => "error_rate_high",
        }
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a sample to the issues it raises
///
/// Each rule fires at most once per sample. `unknown` verdicts never raise
/// anything.
pub fn analyze(sample: &HealthSample) -> Vec<IssueKey> {
    let mut issues = Vec::new();
    if sample.memory.status == Status::Critical {
        issues.push(IssueKey::MemoryHigh);
    }
    if sample.performance.status == Status::Slow {
        issues.push(IssueKey::ResponseSlow);
    }
    if sample.errors.status == Status::Critical {
        issues.push(IssueKey::ErrorRateHigh);
    }
    issues
}

/// Host automation hooks invoked by the default recovery actions
pub trait Automation: Send + Sync {
    /// Drops cached and expired data
    fn cleanup_old_data(&self) -> Result<(), AutomationError>;

    fn optimize_memory_usage(&self) -> Result<(), AutomationError>;

    fn optimize_performance(&self) -> Result<(), AutomationError>;
}

/// A named side-effecting remediation
///
/// Implementations must tolerate being run on consecutive cycles, or twice
/// in a row.
pub trait RecoveryAction: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self) -> Result<(), RecoveryError>;
}

/// Clears old data, then compacts memory
pub struct MemoryCleanup {
    automation: Option<Arc<dyn Automation>>,
}

impl MemoryCleanup {
    pub fn new(automation: Option<Arc<dyn Automation>>) -> Self {
        Self { automation }
    }
}

impl RecoveryAction for MemoryCleanup {
    fn name(&self) -> &'static str {
        "memory_cleanup"
    }

    fn execute(&self) -> Result<(), RecoveryError> {
        if let Some(automation) = &self.automation {
            // Optimization still runs when cleanup fails; the first error wins
            let cleanup = automation.cleanup_old_data();
            let optimize = automation.optimize_memory_usage();
            cleanup?;
            optimize?;
        }
        info!("Memory cleanup performed");
        Ok(())
    }
}

/// Asks the automation collaborator to optimize performance
pub struct PerformanceOptimization {
    automation: Option<Arc<dyn Automation>>,
}

impl PerformanceOptimization {
    pub fn new(automation: Option<Arc<dyn Automation>>) -> Self {
        Self { automation }
    }
}

impl RecoveryAction for PerformanceOptimization {
    fn name(&self) -> &'static str {
        "performance_optimization"
    }

    fn execute(&self) -> Result<(), RecoveryError> {
        if let Some(automation) = &self.automation {
            automation.optimize_performance()?;
        }
        info!("Performance optimization performed");
        Ok(())
    }
}

/// Reports that error recovery started; no remediation is wired yet
pub struct ErrorRecovery;

impl RecoveryAction for ErrorRecovery {
    fn name(&self) -> &'static str {
        "error_recovery"
    }

    fn execute(&self) -> Result<(), RecoveryError> {
        info!("Error recovery procedures initiated");
        Ok(())
    }
}

/// Result of dispatching one issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Completed,
    Failed(RecoveryError),
    /// No action is registered for the issue
    Unregistered,
}

impl DispatchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DispatchOutcome::Failed(_))
    }
}

/// Registry from issue key to recovery action
#[derive(Default)]
pub struct RecoveryDispatcher {
    actions: HashMap<IssueKey, Box<dyn RecoveryAction>>,
}

impl RecoveryDispatcher {
    /// Creates a dispatcher with no actions registered
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher with the built-in action for every issue key
    pub fn with_defaults(automation: Option<Arc<dyn Automation>>) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(
            IssueKey::MemoryHigh,
            MemoryCleanup::new(automation.clone()),
        );
        dispatcher.register(
            IssueKey::ResponseSlow,
            PerformanceOptimization::new(automation),
        );
        dispatcher.register(IssueKey::ErrorRateHigh, ErrorRecovery);
        dispatcher
    }

    /// Registers an action, returning the one it replaces
    pub fn register<A: RecoveryAction + 'static>(
        &mut self,
        key: IssueKey,
        action: A,
    ) -> Option<Box<dyn RecoveryAction>> {
        self.actions.insert(key, Box::new(action))
    }

    pub fn is_registered(&self, key: IssueKey) -> bool {
        self.actions.contains_key(&key)
    }

    /// Runs the action registered for `key`
    ///
    /// Failures are logged and returned, never propagated.
    pub fn dispatch(&self, key: IssueKey) -> DispatchOutcome {
        let Some(action) = self.actions.get(&key) else {
            debug!(issue = %key, "No recovery action registered");
            return DispatchOutcome::Unregistered;
        };

        info!(issue = %key, action = action.name(), "Triggering recovery");
        match action.execute() {
            Ok(()) => DispatchOutcome::Completed,
            Err(err) => {
                error!(issue = %key, action = action.name(), error = %err, "Recovery action failed");
                DispatchOutcome::Failed(err)
            }
        }
    }

    /// Analyzes a sample and dispatches every issue it raises
    pub fn dispatch_all(&self, sample: &HealthSample) -> Vec<(IssueKey, DispatchOutcome)> {
        analyze(sample)
            .into_iter()
            .map(|key| (key, self.dispatch(key)))
            .collect()
    }
}
