use reconnect_race::RacePhase;
use reconnect_race::Result;
use reconnect_race::ShutdownTiming;
use serial_test::serial;

use crate::common::capture;
use crate::common::driver;
use crate::common::race_config;
use crate::common::RACE_PORTS;

/// Case 1: members on 5800/5801, client against both, both members shut
/// down, client shut down right away, 1s settle. No severe record allowed.
#[tokio::test]
#[serial]
async fn test_immediate_client_shutdown_logs_no_severe_case1() -> Result<()> {
    crate::enable_logger();
    let config = race_config();
    assert_eq!(config.topology.ports(), RACE_PORTS.to_vec());

    let capture = capture();
    let mut driver = driver(&config, capture.clone());

    let outcome = driver.run(ShutdownTiming::Immediate).await?;

    assert_eq!(driver.phase(), RacePhase::Settled);
    assert!(!capture.severe_occurred(), "cause: {:?}", capture.last_severe_cause());
    outcome.into_result()?;
    Ok(())
}
