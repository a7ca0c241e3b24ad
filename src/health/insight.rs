//! On-demand summaries over recent history

use std::fmt;
use std::sync::Arc;

use super::history::HistoryStore;
use super::sample::HealthSample;
use super::verdict::Status;

pub const MEMORY_RECOMMENDATION: &str = "Consider implementing memory optimization strategies";
pub const PERFORMANCE_RECOMMENDATION: &str = "Performance optimization needed";

/// Direction of a domain over the insight window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    #[default]
    Stable,
    Improving,
    Degrading,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Stable => "stable",
            Trend::Improving => "improving",
            Trend::Degrading => "degrading",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthTrends {
    pub memory: Trend,
    pub performance: Trend,
    pub errors: Trend,
}

/// Estimates trends from a window of samples, oldest first
pub trait TrendEstimator: Send + Sync {
    fn estimate(&self, window: &[Arc<HealthSample>]) -> HealthTrends;
}

/// Reports every domain as stable regardless of history
#[derive(Debug, Default, Clone, Copy)]
pub struct SteadyTrend;

impl TrendEstimator for SteadyTrend {
    fn estimate(&self, _window: &[Arc<HealthSample>]) -> HealthTrends {
        HealthTrends::default()
    }
}

/// Point-in-time summary of recent health
#[derive(Debug, Clone)]
pub struct Insight {
    /// Most recent sample, absent before the first cycle
    pub current_status: Option<Arc<HealthSample>>,
    pub trends: HealthTrends,
    pub recommendations: Vec<String>,
}

/// Derives insights from the history store; never writes to it
pub struct InsightEngine {
    history: Arc<HistoryStore>,
    window: usize,
    trends: Box<dyn TrendEstimator>,
}

impl InsightEngine {
    pub fn new(history: Arc<HistoryStore>, window: usize) -> Self {
        Self {
            history,
            window: window.max(1),
            trends: Box::new(SteadyTrend),
        }
    }

    pub fn with_trend_estimator<T: TrendEstimator + 'static>(mut self, estimator: T) -> Self {
        self.trends = Box::new(estimator);
        self
    }

    /// Computes a fresh insight over the most recent window
    pub fn insights(&self) -> Insight {
        let window = self.history.window(self.window);
        Insight {
            current_status: window.last().cloned(),
            trends: self.trends.estimate(&window),
            recommendations: recommendations(&window),
        }
    }
}

/// One advisory per degraded sample, in window order, without deduplication
pub fn recommendations(window: &[Arc<HealthSample>]) -> Vec<String> {
    let mut advice = Vec::new();
    for sample in window {
        if sample.memory.status == Status::Critical {
            advice.push(MEMORY_RECOMMENDATION.to_string());
        }
        if sample.performance.status == Status::Slow {
            advice.push(PERFORMANCE_RECOMMENDATION.to_string());
        }
    }
    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::verdict::Verdict;
    use chrono::{Duration, TimeZone, Utc};
    use indexmap::IndexMap;

    fn sample(offset: i64, memory: Status, performance: Status) -> HealthSample {
        let verdict = |status| Verdict {
            status,
            ..Verdict::unknown("test")
        };
        HealthSample {
            timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(offset),
            memory: verdict(memory),
            cpu: verdict(Status::Healthy),
            performance: verdict(performance),
            errors: verdict(Status::Healthy),
            workers: IndexMap::new(),
        }
    }

    #[test]
    fn empty_history_has_no_status_or_advice() {
        let engine = InsightEngine::new(Arc::new(HistoryStore::new(10)), 10);
        let insight = engine.insights();
        assert!(insight.current_status.is_none());
        assert!(insight.recommendations.is_empty());
        assert_eq!(insight.trends, HealthTrends::default());
    }

    #[test]
    fn repeated_degradation_repeats_advice() {
        let history = Arc::new(HistoryStore::new(10));
        history
            .append(sample(0, Status::Critical, Status::Healthy))
            .unwrap();
        history
            .append(sample(30, Status::Critical, Status::Slow))
            .unwrap();
        history
            .append(sample(60, Status::Unknown, Status::Healthy))
            .unwrap();

        let insight = InsightEngine::new(Arc::clone(&history), 10).insights();
        assert_eq!(
            insight.recommendations,
            vec![
                MEMORY_RECOMMENDATION.to_string(),
                MEMORY_RECOMMENDATION.to_string(),
                PERFORMANCE_RECOMMENDATION.to_string(),
            ]
        );
        let current = insight.current_status.unwrap();
        assert_eq!(current.memory.status, Status::Unknown);
    }

    #[test]
    fn only_the_recent_window_is_considered() {
        let history = Arc::new(HistoryStore::new(50));
        for i in 0..5 {
            history
                .append(sample(i, Status::Critical, Status::Healthy))
                .unwrap();
        }
        for i in 5..15 {
            history
                .append(sample(i, Status::Healthy, Status::Healthy))
                .unwrap();
        }

        let insight = InsightEngine::new(history, 10).insights();
        assert!(insight.recommendations.is_empty());
    }

    #[test]
    fn trend_estimator_is_pluggable() {
        struct Worsening;
        impl TrendEstimator for Worsening {
            fn estimate(&self, window: &[Arc<HealthSample>]) -> HealthTrends {
                let trend = if window.len() > 1 {
                    Trend::Degrading
                } else {
                    Trend::Stable
                };
                HealthTrends {
                    memory: trend,
                    ..HealthTrends::default()
                }
            }
        }

        let history = Arc::new(HistoryStore::new(10));
        history
            .append(sample(0, Status::Healthy, Status::Healthy))
            .unwrap();
        history
            .append(sample(1, Status::Critical, Status::Healthy))
            .unwrap();

        let insight = InsightEngine::new(history, 10)
            .with_trend_estimator(Worsening)
            .insights();
        assert_eq!(insight.trends.memory, Trend::Degrading);
        assert_eq!(insight.trends.performance, Trend::Stable);
    }
}
