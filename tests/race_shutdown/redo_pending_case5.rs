use std::time::Duration;

use reconnect_race::Error;
use reconnect_race::NodeHandle;
use reconnect_race::Result;
use serial_test::serial;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::common::addresses;
use crate::common::capture;
use crate::common::controller;
use crate::common::fast_config;
use crate::common::wait_until;
use crate::common::AUX_PORT_BASE;

/// Case 5: an invocation parked for redo while the cluster is gone ends with
/// `ClientNotActive` when the client shuts down, and nothing severe is logged.
#[tokio::test]
#[serial]
async fn test_pending_redo_invocation_ends_on_shutdown_case5() -> Result<()> {
    crate::enable_logger();
    let config = fast_config(&[AUX_PORT_BASE + 3, AUX_PORT_BASE + 4]);
    let capture = capture();
    let controller = controller(&config, capture.clone());

    let members = controller.start_cluster().await?;
    let handle = controller.start_client(&addresses(&config)).await?;
    let map = match &handle {
        NodeHandle::Client(client) => {
            let map = client.map("orders");
            map.put("o-1", b"pending".to_vec()).await?;
            map
        }
        NodeHandle::Member(_) => unreachable!("start_client returns a client"),
    };
    capture.reset();

    controller.shutdown_all(members).await;
    wait_until("connection loss", Duration::from_secs(5), || {
        handle.as_client().is_some_and(|c| !c.is_connected())
    })
    .await;

    let pending = tokio::spawn(async move { map.get("o-1").await });
    sleep(Duration::from_millis(500)).await;
    assert!(!pending.is_finished());

    controller.shutdown(handle).await?;

    let result = timeout(Duration::from_secs(3), pending)
        .await
        .expect("invocation released by shutdown")
        .expect("invocation task");
    assert!(matches!(result, Err(Error::ClientNotActive)), "{result:?}");
    assert!(!capture.severe_occurred(), "cause: {:?}", capture.last_severe_cause());
    Ok(())
}
