use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::Address;
use crate::ClientConfig;
use crate::GroupConfig;
use crate::LoggerFactory;
use crate::Member;
use crate::MemberBuilder;
use crate::MemberConfig;

// Each unit test module gets its own port range so they can run in parallel
pub const MEMBER_TEST_PORT_BASE: u16 = 16100;
pub const CLIENT_TEST_PORT_BASE: u16 = 16200;
pub const NODE_TEST_PORT_BASE: u16 = 16300;
pub const RACE_TEST_PORT_BASE: u16 = 16400;

pub const LOCALHOST: &str = "127.0.0.1";

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Member on `port` that joins every port in `cluster_ports`.
pub fn member_config(
    port: u16,
    cluster_ports: &[u16],
) -> MemberConfig {
    MemberConfig {
        instance_name: Some(format!("test.{port}")),
        group: GroupConfig::default(),
        host: LOCALHOST.to_string(),
        port,
        port_auto_increment: false,
        socket_bind_any: false,
        members: addresses(cluster_ports),
        join_timeout_ms: 200,
        ..MemberConfig::default()
    }
}

/// Client with short periods so reconnect paths are exercised quickly.
pub fn client_config(cluster_ports: &[u16]) -> ClientConfig {
    ClientConfig {
        addresses: addresses(cluster_ports),
        connection_attempt_period_ms: 100,
        connection_timeout_ms: 500,
        heartbeat_interval_ms: 100,
        invocation_timeout_ms: 5000,
        partition_refresh_interval_ms: 200,
        shutdown_timeout_ms: 2000,
        ..ClientConfig::default()
    }
}

pub fn addresses(ports: &[u16]) -> Vec<Address> {
    ports.iter().map(|p| Address::new(LOCALHOST, *p)).collect()
}

pub async fn start_members(
    ports: &[u16],
    logging: Arc<dyn LoggerFactory>,
) -> Vec<Member> {
    let mut members = Vec::new();
    for port in ports {
        let member = MemberBuilder::new(member_config(*port, ports))
            .logger_factory(logging.clone())
            .start()
            .await
            .unwrap_or_else(|e| panic!("member on {port} failed to start: {e}"));
        members.push(member);
    }
    members
}

pub async fn shutdown_members(members: Vec<Member>) {
    for member in members {
        member.shutdown().await.expect("member shutdown");
    }
}
