use std::time::Duration;

use reconnect_race::Result;
use reconnect_race::ShutdownTiming;
use serial_test::serial;

use crate::common::capture;
use crate::common::driver;
use crate::common::race_config;

/// Case 2: as case 1, but the client is shut down 3s after the members,
/// while it is waiting between reconnect rounds.
#[tokio::test]
#[serial]
async fn test_delayed_client_shutdown_logs_no_severe_case2() -> Result<()> {
    crate::enable_logger();
    let config = race_config();
    let capture = capture();
    let mut driver = driver(&config, capture.clone());

    let [immediate, delayed] = driver.variants();
    assert_eq!(immediate, ShutdownTiming::Immediate);
    assert_eq!(delayed, ShutdownTiming::Delayed(Duration::from_secs(3)));

    let outcome = driver.run(delayed).await?;

    assert!(outcome.elapsed >= Duration::from_secs(4));
    assert!(outcome.snapshot.is_clean(), "cause: {:?}", outcome.snapshot.cause);
    Ok(())
}
