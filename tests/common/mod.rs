use std::sync::Arc;
use std::time::Duration;

use reconnect_race::Address;
use reconnect_race::CapturingLoggerFactory;
use reconnect_race::ClusterTopology;
use reconnect_race::HarnessConfig;
use reconnect_race::NodeController;
use reconnect_race::RaceDriver;
use tokio::time::sleep;

/// Ports of the literal scenario
pub const RACE_PORTS: [u16; 2] = [5800, 5801];

/// Ports for the supplementary cases, kept apart from the race ports
pub const AUX_PORT_BASE: u16 = 5810;

pub const LOCALHOST: &str = "localhost";

/// The literal race configuration: topology on 5800/5801, unlimited
/// attempts, 5s period, redo on, 3s delay, 1s settle.
pub fn race_config() -> HarnessConfig {
    HarnessConfig::default()
        .validate()
        .expect("default config is valid")
}

/// Same shape on `ports`, with a fast client so supplementary cases do not
/// wait on the literal periods.
pub fn fast_config(ports: &[u16]) -> HarnessConfig {
    let mut config = HarnessConfig {
        topology: ClusterTopology::local(LOCALHOST, ports),
        ..HarnessConfig::default()
    };
    config.member.join_timeout_ms = 300;
    config.client.connection_attempt_period_ms = 200;
    config.client.connection_timeout_ms = 500;
    config.client.heartbeat_interval_ms = 100;
    config.client.shutdown_timeout_ms = 3000;
    config.validate().expect("fast config is valid")
}

pub fn capture() -> Arc<CapturingLoggerFactory> {
    Arc::new(CapturingLoggerFactory::default())
}

pub fn driver(
    config: &HarnessConfig,
    capture: Arc<CapturingLoggerFactory>,
) -> RaceDriver {
    RaceDriver::new(config, capture)
}

pub fn controller(
    config: &HarnessConfig,
    capture: Arc<CapturingLoggerFactory>,
) -> NodeController {
    NodeController::new(config, capture)
}

pub fn addresses(config: &HarnessConfig) -> Vec<Address> {
    config.topology.addresses.clone()
}

pub async fn wait_until(
    what: &str,
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) {
    let step = Duration::from_millis(50);
    let mut waited = Duration::ZERO;
    while !condition() {
        if waited >= timeout {
            panic!("timed out waiting for {what}");
        }
        sleep(step).await;
        waited += step;
    }
}
