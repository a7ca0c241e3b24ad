//! Monitor configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "HEALTHWATCH";

/// Workers monitored when a profile does not list its own
pub const DEFAULT_WORKERS: [&str; 5] = [
    "search-intelligence",
    "dashboard-monitoring",
    "nlp-processing",
    "content-discovery",
    "security-compliance",
];

/// Numeric limits used to classify raw health metrics
///
/// Built once and never mutated. Every constructor validates, so a value of
/// this type is always usable by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "ThresholdSettings")]
pub struct ThresholdConfig {
    memory_usage: f64,
    error_rate: f64,
    response_time_ms: u64,
    cpu_usage: f64,
}

impl ThresholdConfig {
    /// Creates a validated threshold set
    pub fn new(
        memory_usage: f64,
        error_rate: f64,
        response_time_ms: u64,
        cpu_usage: f64,
    ) -> Result<Self, ConfigError> {
        check_ratio("memory_usage", memory_usage)?;
        check_ratio("cpu_usage", cpu_usage)?;
        if !error_rate.is_finite() || !(0.0..=1.0).contains(&error_rate) {
            return Err(ConfigError::InvalidThreshold {
                name: "error_rate",
                value: error_rate,
                reason: "must be within [0, 1]",
            });
        }
        if response_time_ms == 0 {
            return Err(ConfigError::InvalidThreshold {
                name: "response_time_ms",
                value: 0.0,
                reason: "must be greater than zero",
            });
        }

        Ok(Self {
            memory_usage,
            error_rate,
            response_time_ms,
            cpu_usage,
        })
    }

    /// Heap usage ratio above which memory is critical
    pub fn memory_usage(&self) -> f64 {
        self.memory_usage
    }

    /// Error rate above which the error domain is critical
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Load time above which performance is slow
    pub fn response_time(&self) -> Duration {
        Duration::from_millis(self.response_time_ms)
    }

    /// CPU usage ratio above which the CPU is critical
    pub fn cpu_usage(&self) -> f64 {
        self.cpu_usage
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            memory_usage: 0.8,
            error_rate: 0.1,
            response_time_ms: 2000,
            cpu_usage: 0.9,
        }
    }
}

fn check_ratio(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreshold {
            name,
            value,
            reason: "must be within (0, 1]",
        })
    }
}

/// Unvalidated threshold values as they appear in config files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ThresholdSettings {
    memory_usage: f64,
    error_rate: f64,
    response_time_ms: u64,
    cpu_usage: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        let defaults = ThresholdConfig::default();
        Self {
            memory_usage: defaults.memory_usage,
            error_rate: defaults.error_rate,
            response_time_ms: defaults.response_time_ms,
            cpu_usage: defaults.cpu_usage,
        }
    }
}

impl TryFrom<ThresholdSettings> for ThresholdConfig {
    type Error = ConfigError;

    fn try_from(raw: ThresholdSettings) -> Result<Self, Self::Error> {
        Self::new(
            raw.memory_usage,
            raw.error_rate,
            raw.response_time_ms,
            raw.cpu_usage,
        )
    }
}

/// Monitoring cycle timing
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between cycles
    pub interval_secs: u64,
    /// Upper bound on how long the scheduler waits for one cycle
    pub cycle_timeout_ms: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_millis(self.cycle_timeout_ms)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            cycle_timeout_ms: 5_000,
        }
    }
}

/// Sample retention and insight window
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of retained samples
    pub capacity: usize,
    /// Optional age limit, relative to the newest sample
    pub max_age_secs: Option<u64>,
    /// Number of recent samples the insight engine looks at
    pub insight_window: usize,
}

impl HistoryConfig {
    pub fn max_age(&self) -> Option<chrono::Duration> {
        self.max_age_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 120,
            max_age_secs: None,
            insight_window: 10,
        }
    }
}

/// Health monitor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    /// Classification thresholds
    pub thresholds: ThresholdConfig,
    /// Cycle timing
    pub schedule: ScheduleConfig,
    /// Sample retention
    pub history: HistoryConfig,
    /// Worker identifiers checked for liveness, in report order
    pub workers: Vec<String>,
}

impl MonitorConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Sources are layered in the following order:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{profile}.toml (profile-specific overrides)
    /// 3. Environment variables with prefix HEALTHWATCH_
    ///    (e.g., HEALTHWATCH_THRESHOLDS__MEMORY_USAGE=0.7)
    ///
    /// Config files are searched for next to the executable first, then in
    /// the current directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let dir = Self::find_config_dir().unwrap_or_else(|| PathBuf::from("config"));
        Self::load_from_dir(&dir, profile)
    }

    /// Loads a profile from an explicit config directory
    pub fn load_from_dir(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        Self::load_layered(dir, profile, Self::environment())
    }

    /// Overrides read from HEALTHWATCH_* variables
    ///
    /// The prefix is joined with a single underscore and nested keys with a
    /// double one, so HEALTHWATCH_SCHEDULE__INTERVAL_SECS sets
    /// `schedule.interval_secs`.
    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_layered(dir: &Path, profile: &str, env: Environment) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(dir.join("default").as_path()).required(false))
            .add_source(File::from(dir.join(profile).as_path()).required(false))
            .add_source(env)
            .set_override("profile", profile)?
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Loads configuration using the HEALTHWATCH_PROFILE environment
    /// variable, defaulting to "release"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile =
            std::env::var(format!("{ENV_PREFIX}_PROFILE")).unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }

    /// Checks the settings that thresholds validation does not cover
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.interval_secs == 0 {
            return Err(invalid("schedule.interval_secs", "must be greater than zero"));
        }
        if self.schedule.cycle_timeout_ms == 0 {
            return Err(invalid(
                "schedule.cycle_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.history.capacity == 0 {
            return Err(invalid("history.capacity", "must be greater than zero"));
        }
        if self.history.insight_window == 0 {
            return Err(invalid(
                "history.insight_window",
                "must be greater than zero",
            ));
        }

        for (index, worker) in self.workers.iter().enumerate() {
            if worker.trim().is_empty() {
                return Err(invalid("workers", "worker identifiers must not be empty"));
            }
            if self.workers[..index].contains(worker) {
                return Err(ConfigError::InvalidSetting {
                    name: "workers",
                    reason: format!("duplicate worker identifier `{worker}`"),
                });
            }
        }

        Ok(())
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidSetting {
        name,
        reason: reason.to_string(),
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            profile: "release".to_string(),
            thresholds: ThresholdConfig::default(),
            schedule: ScheduleConfig::default(),
            history: HistoryConfig::default(),
            workers: DEFAULT_WORKERS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn default_thresholds_match_dashboard_limits() {
        let thresholds = ThresholdConfig::default();
        assert_eq!(thresholds.memory_usage(), 0.8);
        assert_eq!(thresholds.error_rate(), 0.1);
        assert_eq!(thresholds.response_time(), Duration::from_millis(2000));
        assert_eq!(thresholds.cpu_usage(), 0.9);
    }

    #[test]
    fn rejects_out_of_range_thresholds() {
        assert!(ThresholdConfig::new(1.2, 0.1, 2000, 0.9).is_err());
        assert!(ThresholdConfig::new(0.0, 0.1, 2000, 0.9).is_err());
        assert!(ThresholdConfig::new(f64::NAN, 0.1, 2000, 0.9).is_err());
        assert!(ThresholdConfig::new(0.8, -0.1, 2000, 0.9).is_err());
        assert!(ThresholdConfig::new(0.8, 0.1, 0, 0.9).is_err());
        assert!(ThresholdConfig::new(0.8, 0.1, 2000, 1.5).is_err());
        assert!(ThresholdConfig::new(1.0, 0.0, 1, 1.0).is_ok());
    }

    #[test]
    fn validate_rejects_unusable_settings() {
        let mut config = MonitorConfig::default();
        assert!(config.validate().is_ok());

        config.history.capacity = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.schedule.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = MonitorConfig::default();
        config.workers = vec!["a".to_string(), "a".to_string()];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { name: "workers", .. })
        ));
    }

    #[test]
    fn profile_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "workers = [\"indexer\"]\n\n[schedule]\ninterval_secs = 30\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[thresholds]\nmemory_usage = 0.7\n\n[schedule]\ninterval_secs = 5\n",
        )
        .unwrap();

        let config = MonitorConfig::load_from_dir(dir.path(), "staging").unwrap();
        assert_eq!(config.profile, "staging");
        assert_eq!(config.thresholds.memory_usage(), 0.7);
        assert_eq!(config.thresholds.error_rate(), 0.1);
        assert_eq!(config.schedule.interval_secs, 5);
        assert_eq!(config.workers, vec!["indexer".to_string()]);
        assert_eq!(config.history.capacity, 120);
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let map = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<config::Map<String, String>>();
        MonitorConfig::environment().source(Some(map))
    }

    #[test]
    fn environment_overrides_profile_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[thresholds]\nmemory_usage = 0.6\n",
        )
        .unwrap();

        let env = env_vars(&[
            ("HEALTHWATCH_THRESHOLDS__MEMORY_USAGE", "0.7"),
            ("HEALTHWATCH_SCHEDULE__INTERVAL_SECS", "15"),
            ("OTHERAPP_SCHEDULE__INTERVAL_SECS", "1"),
        ]);
        let config = MonitorConfig::load_layered(dir.path(), "staging", env).unwrap();
        assert_eq!(config.thresholds.memory_usage(), 0.7);
        assert_eq!(config.schedule.interval_secs, 15);
        assert_eq!(config.profile, "staging");
    }

    #[test]
    fn invalid_environment_override_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let env = env_vars(&[("HEALTHWATCH_THRESHOLDS__ERROR_RATE", "2.5")]);
        let result = MonitorConfig::load_layered(dir.path(), "release", env);
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn missing_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = MonitorConfig::load_from_dir(dir.path(), "nowhere").unwrap();
        assert_eq!(config.thresholds, ThresholdConfig::default());
        assert_eq!(config.workers.len(), DEFAULT_WORKERS.len());
    }

    #[test]
    fn malformed_thresholds_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("broken.toml"),
            "[thresholds]\nmemory_usage = 3.0\n",
        )
        .unwrap();

        let result = MonitorConfig::load_from_dir(dir.path(), "broken");
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
