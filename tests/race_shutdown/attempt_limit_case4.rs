use std::time::Duration;

use reconnect_race::ClientBuilder;
use reconnect_race::LifecycleState;
use reconnect_race::Result;
use serial_test::serial;

use crate::common::addresses;
use crate::common::capture;
use crate::common::controller;
use crate::common::fast_config;
use crate::common::wait_until;
use crate::common::AUX_PORT_BASE;

/// Case 4: a client that is allowed to give up does log severe once its
/// cluster is gone. Proves the capture would catch a real failure.
#[tokio::test]
#[serial]
async fn test_finite_attempt_limit_is_detected_case4() -> Result<()> {
    crate::enable_logger();
    let config = fast_config(&[AUX_PORT_BASE + 1, AUX_PORT_BASE + 2]);
    let capture = capture();
    let controller = controller(&config, capture.clone());

    let members = controller.start_cluster().await?;

    let mut client_config = controller.client_config(&addresses(&config));
    client_config.connection_attempt_limit = 2;
    let client = ClientBuilder::new(client_config)
        .logger_factory(capture.clone())
        .start()
        .await?;
    capture.reset();

    controller.shutdown_all(members).await;
    wait_until("client to give up", Duration::from_secs(10), || {
        client.lifecycle_state() == LifecycleState::Shutdown
    })
    .await;

    let snapshot = capture.snapshot();
    assert!(snapshot.severe_occurred);
    let cause = snapshot.cause.expect("cause recorded");
    assert!(cause.to_string().contains("2 attempt(s)"), "{cause}");

    client.shutdown().await?;
    Ok(())
}
