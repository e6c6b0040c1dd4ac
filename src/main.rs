use std::process::ExitCode;
use std::sync::Arc;

use reconnect_race::logging;
use reconnect_race::CapturingLoggerFactory;
use reconnect_race::HarnessConfig;
use reconnect_race::RaceDriver;
use reconnect_race::RaceReport;
use reconnect_race::Result;
use tracing::error;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_observability();

    let report = tokio::select! {
        r = run() => r,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected, aborting race.");
            return ExitCode::from(130);
        }
    };

    match report {
        Ok(report) if report.passed() => {
            info!(attempts = report.attempts(), "no severe failure captured");
            ExitCode::SUCCESS
        }
        Ok(report) => {
            for failure in report.failures() {
                error!(
                    timing = %failure.timing,
                    severe_count = failure.snapshot.severe_count,
                    cause = ?failure.snapshot.cause,
                    "race attempt captured a severe failure"
                );
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(fatal = e.is_fatal_to_run(), "race could not complete: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<RaceReport> {
    let config = HarnessConfig::new()?.validate()?;

    // Install before anything resolves a logger
    let capture = Arc::new(CapturingLoggerFactory::default());
    logging::install(capture.clone())?;

    info!(
        topology = ?config.topology.addresses,
        attempts_per_variant = config.race.attempts_per_variant,
        "starting reconnect race"
    );
    RaceDriver::new(&config, capture).run_all().await
}

fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));
    tracing_subscriber::registry().with(base_subscriber).init();
}
