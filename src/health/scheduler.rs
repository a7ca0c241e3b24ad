//! Cancellable periodic driver for monitoring cycles

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::monitor::{CycleReport, HealthMonitor};

/// Lifecycle of the scheduler task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Spawned, first cycle not started yet
    Idle,
    Running,
    /// Terminal; no further cycles run
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Stopped => "stopped",
        })
    }
}

/// Runs [`HealthMonitor::run_cycle`] every `interval`
///
/// The first cycle runs as soon as the task starts. Cycles run on the
/// blocking pool and the scheduler waits at most `cycle_timeout` for each.
/// A cycle that overruns stays in flight and later ticks are skipped until
/// it finishes, so two cycles never overlap.
pub struct Scheduler {
    monitor: Arc<HealthMonitor>,
    interval: Duration,
    cycle_timeout: Duration,
}

impl Scheduler {
    pub fn new(monitor: Arc<HealthMonitor>, interval: Duration, cycle_timeout: Duration) -> Self {
        Self {
            monitor,
            interval,
            cycle_timeout,
        }
    }

    /// Spawns the scheduler onto the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);

        let task = tokio::spawn(self.run(stop_rx, state_tx));

        SchedulerHandle {
            stop_tx,
            state_rx,
            task,
        }
    }

    async fn run(self, mut stop_rx: watch::Receiver<bool>, state_tx: watch::Sender<SchedulerState>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Option<JoinHandle<CycleReport>> = None;

        info!(interval = ?self.interval, "Health monitoring started");
        state_tx.send_replace(SchedulerState::Running);

        loop {
            tokio::select! {
                biased;
                // A dropped handle closes the channel and stops the task too
                _ = stop_requested(&mut stop_rx) => break,
                _ = ticker.tick() => {}
            }

            if let Some(previous) = &in_flight {
                if !previous.is_finished() {
                    warn!("Previous health check still running, skipping tick");
                    continue;
                }
                in_flight = None;
            }

            let monitor = Arc::clone(&self.monitor);
            let mut cycle = tokio::task::spawn_blocking(move || monitor.run_cycle());

            match time::timeout(self.cycle_timeout, &mut cycle).await {
                Ok(Ok(report)) => {
                    debug!(
                        triggered = report.outcomes.len(),
                        failures = report.failures(),
                        "Health check completed"
                    );
                }
                Ok(Err(err)) => {
                    error!(error = %err, "Health check aborted");
                }
                Err(_) => {
                    warn!(timeout = ?self.cycle_timeout, "Health check exceeded its timeout");
                    in_flight = Some(cycle);
                }
            }
        }

        if let Some(cycle) = in_flight.take() {
            debug!("Waiting for the overrunning health check to finish");
            if let Err(err) = cycle.await {
                error!(error = %err, "Health check aborted");
            }
        }

        state_tx.send_replace(SchedulerState::Stopped);
        info!("Health monitoring stopped");
    }
}

/// Resolves once a stop is requested or every stop sender is gone
async fn stop_requested(stop_rx: &mut watch::Receiver<bool>) {
    let _ = stop_rx.wait_for(|stopped| *stopped).await;
}

/// Stop handle for a running [`Scheduler`]
///
/// Dropping the handle also stops the scheduler.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<SchedulerState>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Requests a stop
    ///
    /// The current cycle, if any, is allowed to finish, including one that
    /// overran its timeout. [`join`](Self::join) returns only after it has.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == SchedulerState::Stopped
    }

    /// Waits for the scheduler task to exit
    pub async fn join(self) -> Result<(), tokio::task::JoinError> {
        let Self { stop_tx, task, .. } = self;
        let result = task.await;
        drop(stop_tx);
        result
    }

    /// Stops the scheduler and waits for it to exit
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        self.stop();
        self.join().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdConfig;
    use crate::health::history::HistoryStore;
    use crate::health::insight::InsightEngine;
    use crate::health::recovery::RecoveryDispatcher;
    use crate::health::sampler::Sampler;

    fn monitor() -> Arc<HealthMonitor> {
        let history = Arc::new(HistoryStore::new(100));
        Arc::new(HealthMonitor::new(
            Sampler::new(ThresholdConfig::default()),
            RecoveryDispatcher::with_defaults(None),
            Arc::clone(&history),
            InsightEngine::new(history, 10),
        ))
    }

    async fn wait_for_samples(monitor: &HealthMonitor, count: usize) {
        time::timeout(Duration::from_secs(5), async {
            while monitor.history().len() < count {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("scheduler did not produce samples in time");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn first_cycle_runs_immediately() {
        let monitor = monitor();
        let handle = Scheduler::new(
            Arc::clone(&monitor),
            Duration::from_secs(3600),
            Duration::from_secs(1),
        )
        .start();

        wait_for_samples(&monitor, 1).await;
        assert_eq!(handle.state(), SchedulerState::Running);

        handle.shutdown().await.unwrap();
        assert_eq!(monitor.history().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_repeatedly_until_stopped() {
        let monitor = monitor();
        let handle = Scheduler::new(
            Arc::clone(&monitor),
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .start();

        wait_for_samples(&monitor, 3).await;
        handle.stop();
        handle.stop();

        let state_rx = handle.state_rx.clone();
        handle.join().await.unwrap();
        assert_eq!(*state_rx.borrow(), SchedulerState::Stopped);

        let after_stop = monitor.history().len();
        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(monitor.history().len(), after_stop);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn dropping_the_handle_stops_the_task() {
        let monitor = monitor();
        let handle = Scheduler::new(
            Arc::clone(&monitor),
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .start();
        wait_for_samples(&monitor, 1).await;

        let mut state_rx = handle.state_rx.clone();
        drop(handle);

        time::timeout(
            Duration::from_secs(5),
            state_rx.wait_for(|state| *state == SchedulerState::Stopped),
        )
        .await
        .expect("scheduler kept running after its handle was dropped")
        .unwrap();
    }
}
