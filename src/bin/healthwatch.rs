use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use healthwatch::build_info;
use healthwatch::config::MonitorConfig;
use healthwatch::health::probes::{InMemoryWorkerRegistry, SystemCpu, SystemMemory};
use healthwatch::health::{Capabilities, HealthMonitor, Scheduler, format_sample, print_insight};

/// Monitors local host health and runs recovery actions
#[derive(Debug, Parser)]
#[command(name = "healthwatch", version, about)]
struct Cli {
    /// Configuration profile (defaults to $HEALTHWATCH_PROFILE or "release")
    #[arg(long)]
    profile: Option<String>,

    /// Run a single cycle, print the sample, and exit with its status code
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(build = %build_info::summary(), "Starting healthwatch");

    let config = match &cli.profile {
        Some(profile) => MonitorConfig::load(profile),
        None => MonitorConfig::load_from_env(),
    }
    .context("failed to load monitor configuration")?;
    info!(
        profile = %config.profile,
        interval = ?config.schedule.interval(),
        workers = config.workers.len(),
        "Configuration loaded"
    );

    let monitor = Arc::new(HealthMonitor::from_config(
        &config,
        Capabilities {
            memory: Some(Arc::new(SystemMemory::new())),
            cpu: Some(Arc::new(SystemCpu::new())),
            workers: Some(Arc::new(InMemoryWorkerRegistry::new())),
            ..Capabilities::default()
        },
    )?);

    if cli.once {
        // CPU usage needs two refreshes at least this far apart
        tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
        let report = monitor.run_cycle();
        println!("{}", format_sample(&report.sample));
        std::process::exit(report.sample.exit_code());
    }

    let handle = Scheduler::new(
        Arc::clone(&monitor),
        config.schedule.interval(),
        config.schedule.cycle_timeout(),
    )
    .start();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested");

    handle
        .shutdown()
        .await
        .context("scheduler task panicked")?;
    print_insight(&monitor.insights());

    Ok(())
}
