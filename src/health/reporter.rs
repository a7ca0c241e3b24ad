//! Formatting and reporting for health samples and insights

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::insight::Insight;
use super::sample::HealthSample;

/// Formats a sample as a pretty table of domains and workers
pub fn format_sample(sample: &HealthSample) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Domain", "Status", "Evidence"]);

    for (name, verdict) in sample.domains() {
        builder.push_record([
            name.to_string(),
            verdict.status.as_colored_str(),
            verdict.evidence.to_string(),
        ]);
    }

    for (id, liveness) in &sample.workers {
        let status = if liveness.is_active() {
            "ACTIVE".green().to_string()
        } else {
            "INACTIVE".red().to_string()
        };
        let last_seen = liveness
            .last_activity
            .map(|at| format!("last activity {}", at.format("%H:%M:%S")))
            .unwrap_or_else(|| "never seen".to_string());
        builder.push_record([format!("worker {}", id), status, last_seen]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = format!(
        "{} {}\n",
        "Sample".bold().underline(),
        sample.timestamp.to_rfc3339()
    );
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Formats an insight: latest sample, trends, and recommendations
pub fn format_insight(insight: &Insight) -> String {
    let mut output = String::new();

    match &insight.current_status {
        Some(sample) => output.push_str(&format_sample(sample)),
        None => output.push_str(&format!("{}\n", "No health samples yet".dimmed())),
    }

    output.push_str(&format!("\n{}\n", "Trends".bold().underline()));
    output.push_str(&format!("  Memory: {}\n", insight.trends.memory));
    output.push_str(&format!("  Performance: {}\n", insight.trends.performance));
    output.push_str(&format!("  Errors: {}\n", insight.trends.errors));

    output.push_str(&format!("\n{}\n", "Recommendations".bold().underline()));
    if insight.recommendations.is_empty() {
        output.push_str(&format!("  {} None\n", "✓".green()));
    } else {
        for recommendation in &insight.recommendations {
            output.push_str(&format!("  {} {}\n", "⚠".yellow(), recommendation));
        }
    }

    output
}

/// Prints an insight to stdout
pub fn print_insight(insight: &Insight) {
    println!("{}", format_insight(insight));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::insight::HealthTrends;
    use crate::health::sample::WorkerLiveness;
    use crate::health::verdict::{Evidence, Status, Verdict};
    use chrono::Utc;
    use indexmap::IndexMap;
    use std::sync::Arc;

    fn sample() -> HealthSample {
        let mut workers = IndexMap::new();
        workers.insert("indexer".to_string(), WorkerLiveness::inactive());
        HealthSample {
            timestamp: Utc::now(),
            memory: Verdict::new(
                Status::Critical,
                Evidence::Memory {
                    usage: 0.95,
                    used_bytes: 95 * 1_048_576,
                    limit_bytes: 100 * 1_048_576,
                },
            ),
            cpu: Verdict::unknown("no cpu introspection"),
            performance: Verdict::new(
                Status::Healthy,
                Evidence::Performance {
                    load_time: std::time::Duration::from_millis(120),
                    dom_content_loaded: std::time::Duration::ZERO,
                },
            ),
            errors: Verdict::new(Status::Healthy, Evidence::Errors { count: 0, rate: 0.0 }),
            workers,
        }
    }

    #[test]
    fn sample_table_lists_domains_and_workers() {
        let output = format_sample(&sample());
        for needle in ["memory", "cpu", "performance", "errors", "worker indexer"] {
            assert!(output.contains(needle), "missing `{needle}` in:\n{output}");
        }
        assert!(output.contains("95.0% (95 / 100 MiB)"));
        assert!(output.contains("no cpu introspection"));
        assert!(output.contains("never seen"));
    }

    #[test]
    fn insight_without_samples() {
        let insight = Insight {
            current_status: None,
            trends: HealthTrends::default(),
            recommendations: Vec::new(),
        };
        let output = format_insight(&insight);
        assert!(output.contains("No health samples yet"));
        assert!(output.contains("Memory: stable"));
    }

    #[test]
    fn insight_lists_recommendations() {
        let insight = Insight {
            current_status: Some(Arc::new(sample())),
            trends: HealthTrends::default(),
            recommendations: vec!["Performance optimization needed".to_string()],
        };
        let output = format_insight(&insight);
        assert!(output.contains("Performance optimization needed"));
    }
}
