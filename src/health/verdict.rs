//! Per-domain verdicts and the threshold classifier

use std::fmt;
use std::time::Duration;

/// Classification of one health domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Within thresholds
    Healthy,
    /// Usage or rate above its threshold
    Critical,
    /// Timing above the response-time threshold
    Slow,
    /// The backing capability is missing or failed
    Unknown,
}

impl Status {
    /// Returns true only for a confirmed healthy reading
    ///
    /// `Unknown` is not healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Status::Healthy)
    }

    /// Returns true if the domain crossed a threshold
    pub fn is_degraded(&self) -> bool {
        matches!(self, Status::Critical | Status::Slow)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Status::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Healthy => "healthy",
            Status::Critical => "critical",
            Status::Slow => "slow",
            Status::Unknown => "unknown",
        }
    }

    /// Returns the status as a colored string
    pub fn as_colored_str(&self) -> String {
        use colored::Colorize;
        match self {
            Status::Healthy => "HEALTHY".green().to_string(),
            Status::Critical => "CRITICAL".red().to_string(),
            Status::Slow => "SLOW".yellow().to_string(),
            Status::Unknown => "UNKNOWN".dimmed().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-specific numbers backing a verdict
#[derive(Debug, Clone, PartialEq)]
pub enum Evidence {
    Memory {
        usage: f64,
        used_bytes: u64,
        limit_bytes: u64,
    },
    Cpu {
        usage: f64,
    },
    Performance {
        load_time: Duration,
        dom_content_loaded: Duration,
    },
    Errors {
        count: u64,
        rate: f64,
    },
    /// The capability could not produce a reading
    Unavailable {
        reason: String,
    },
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::Memory {
                usage,
                used_bytes,
                limit_bytes,
            } => write!(
                f,
                "{:.1}% ({} / {} MiB)",
                usage * 100.0,
                used_bytes / 1_048_576,
                limit_bytes / 1_048_576
            ),
            Evidence::Cpu { usage } => write!(f, "{:.1}%", usage * 100.0),
            Evidence::Performance {
                load_time,
                dom_content_loaded,
            } => write!(
                f,
                "load {}ms, dom {}ms",
                load_time.as_millis(),
                dom_content_loaded.as_millis()
            ),
            Evidence::Errors { count, rate } => {
                write!(f, "{} errors ({:.1}%)", count, rate * 100.0)
            }
            Evidence::Unavailable { reason } => f.write_str(reason),
        }
    }
}

/// Classification of one domain together with its evidence
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: Status,
    pub evidence: Evidence,
}

impl Verdict {
    pub fn new(status: Status, evidence: Evidence) -> Self {
        Self { status, evidence }
    }

    /// Creates an `unknown` verdict explaining why no reading exists
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Unknown,
            evidence: Evidence::Unavailable {
                reason: reason.into(),
            },
        }
    }
}

/// Classifies a usage ratio or rate against its limit
///
/// `Critical` iff `value > limit`; equality is `Healthy`. A NaN reading
/// cannot be compared and is `Unknown`.
pub fn classify_ratio(value: f64, limit: f64) -> Status {
    if value.is_nan() {
        Status::Unknown
    } else if value > limit {
        Status::Critical
    } else {
        Status::Healthy
    }
}

/// Classifies an elapsed time against the response-time limit
///
/// `Slow` iff `elapsed > limit`.
pub fn classify_latency(elapsed: Duration, limit: Duration) -> Status {
    if elapsed > limit {
        Status::Slow
    } else {
        Status::Healthy
    }
}
