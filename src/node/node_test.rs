use std::sync::Arc;

use super::*;
use crate::test_utils::enable_logger;
use crate::test_utils::RecordingLoggerFactory;
use crate::test_utils::LOCALHOST;
use crate::test_utils::NODE_TEST_PORT_BASE;
use crate::CapturingLoggerFactory;
use crate::ClusterTopology;
use crate::Error;
use crate::HarnessConfig;

fn harness_config(ports: &[u16]) -> HarnessConfig {
    let mut config = HarnessConfig {
        topology: ClusterTopology::local(LOCALHOST, ports),
        ..HarnessConfig::default()
    };
    config.member.join_timeout_ms = 200;
    config.client.connection_attempt_period_ms = 100;
    config.client.connection_timeout_ms = 500;
    config.client.heartbeat_interval_ms = 100;
    config.client.shutdown_timeout_ms = 2000;
    config.race.lifecycle_timeout_ms = 3000;
    config
}

fn controller(config: &HarnessConfig) -> (NodeController, Arc<CapturingLoggerFactory>) {
    let capture = Arc::new(CapturingLoggerFactory::new(Arc::new(RecordingLoggerFactory::default())));
    (NodeController::new(config, capture.clone()), capture)
}

#[test]
fn test_member_config_pins_network_settings() {
    let ports = [NODE_TEST_PORT_BASE + 1, NODE_TEST_PORT_BASE + 2];
    let mut config = harness_config(&ports);
    config.member.port_auto_increment = true;
    config.member.socket_bind_any = true;
    let (controller, _) = controller(&config);

    let member = controller.member_config(ports[1]);
    assert_eq!(member.port, ports[1]);
    assert!(!member.port_auto_increment);
    assert!(!member.multicast_enabled);
    assert!(member.tcp_ip_enabled);
    assert!(!member.interfaces_enabled);
    assert_eq!(member.members, config.topology.addresses);
    assert_eq!(member.candidate_ports(), vec![ports[1]]);
}

#[test]
fn test_client_config_retries_forever_with_redo() {
    let ports = [NODE_TEST_PORT_BASE + 1];
    let mut config = harness_config(&ports);
    config.client.connection_attempt_limit = 3;
    config.client.redo_operation = false;
    let (controller, _) = controller(&config);

    let client = controller.client_config(&config.topology.addresses);
    assert_eq!(client.connection_attempt_limit, 0);
    assert!(!client.is_attempt_limited());
    assert!(client.redo_operation);
    assert_eq!(client.connection_attempt_period_ms, 100);
    assert_eq!(client.addresses, config.topology.addresses);
}

#[tokio::test]
async fn test_start_member_on_taken_port_is_a_bind_error() {
    enable_logger();
    let ports = [NODE_TEST_PORT_BASE + 3];
    let config = harness_config(&ports);
    let (controller, _) = controller(&config);

    let first = controller.start_member(ports[0]).await.unwrap();
    let second = controller.start_member(ports[0]).await;
    assert!(matches!(second, Err(Error::Bind { .. })));

    controller.shutdown(first).await.unwrap();
}

#[tokio::test]
async fn test_cluster_and_client_start_and_stop() {
    enable_logger();
    let ports = [NODE_TEST_PORT_BASE + 4, NODE_TEST_PORT_BASE + 5];
    let config = harness_config(&ports);
    let (controller, capture) = controller(&config);

    let members = controller.start_cluster().await.unwrap();
    assert_eq!(members.len(), 2);
    for member in &members {
        assert_eq!(member.as_member().unwrap().members().len(), 2);
    }

    let client = controller.start_client(&config.topology.addresses).await.unwrap();
    assert!(client.as_client().unwrap().is_connected());
    assert!(client.as_member().is_none());

    controller.shutdown_all(members).await;
    controller.shutdown(client).await.unwrap();
    assert!(capture.snapshot().is_clean());

    // ports are free again
    let again = controller.start_cluster().await.unwrap();
    controller.shutdown_all(again).await;
}

#[tokio::test]
async fn test_start_client_without_cluster_hits_lifecycle_timeout() {
    enable_logger();
    let ports = [NODE_TEST_PORT_BASE + 6];
    let mut config = harness_config(&ports);
    config.race.lifecycle_timeout_ms = 300;
    let (controller, capture) = controller(&config);

    let result = controller.start_client(&config.topology.addresses).await;
    match result {
        Err(Error::LifecycleTimeout { operation, .. }) => assert_eq!(operation, "start"),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(!capture.severe_occurred());
}

#[tokio::test]
async fn test_members_log_through_the_configured_backend() {
    enable_logger();
    let ports = [NODE_TEST_PORT_BASE + 7];
    let config = harness_config(&ports);
    let member_logging = Arc::new(RecordingLoggerFactory::default());
    let (controller, capture) = controller(&config);
    let controller = controller.with_member_logging(member_logging.clone());
    assert_eq!(controller.topology().ports(), ports.to_vec());

    let member = controller.start_member(ports[0]).await.unwrap();
    controller.shutdown(member).await.unwrap();

    let messages: Vec<String> = member_logging.records().into_iter().map(|r| r.message).collect();
    assert!(messages.iter().any(|m| m.ends_with("is STARTED")), "{messages:?}");
    assert!(messages.iter().any(|m| m.ends_with("is SHUTDOWN")), "{messages:?}");
    // member records never reach the client's capture
    assert_eq!(capture.severe_count(), 0);
}
