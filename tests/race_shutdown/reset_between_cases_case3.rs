use reconnect_race::LoggerFactory;
use reconnect_race::Result;
use reconnect_race::ShutdownTiming;
use serial_test::serial;

use crate::common::capture;
use crate::common::driver;
use crate::common::race_config;

/// Case 3: the capture is cleared once the client is up, so whatever an
/// earlier attempt left behind cannot leak into the next verdict.
#[tokio::test]
#[serial]
async fn test_reset_makes_attempts_independent_case3() -> Result<()> {
    crate::enable_logger();
    let config = race_config();
    let capture = capture();
    let mut driver = driver(&config, capture.clone());

    let first = driver.run(ShutdownTiming::Immediate).await?;
    assert!(first.is_clean());

    // Stale severe record from outside the next attempt
    capture.logger("stale").severe("left over from a previous attempt");
    assert!(capture.severe_occurred());

    let second = driver.run(ShutdownTiming::Delayed(config.race.shutdown_delay())).await?;
    assert!(second.is_clean(), "cause: {:?}", second.snapshot.cause);
    assert_eq!(second.snapshot.severe_count, 0);

    let report = driver.run_repeated(ShutdownTiming::Immediate, 2).await?;
    assert_eq!(report.attempts(), 2);
    report.into_result()?;
    Ok(())
}
