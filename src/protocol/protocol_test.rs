use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::net::TcpStream;

use super::*;
use crate::Error;

fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[test]
fn test_assign_partitions_is_independent_of_member_order() {
    let a = assign_partitions(&[addr(5801), addr(5800)]);
    let b = assign_partitions(&[addr(5800), addr(5801)]);

    assert_eq!(a.len(), PARTITION_COUNT as usize);
    assert_eq!(a, b);
    assert_eq!(a[0], addr(5800));
    assert_eq!(a[1], addr(5801));
}

#[test]
fn test_assign_partitions_empty_cluster() {
    assert!(assign_partitions(&[]).is_empty());
}

#[test]
fn test_partition_id_is_stable_and_in_range() {
    let p = partition_id("user:1001");
    assert_eq!(p, partition_id("user:1001"));
    assert!(p < PARTITION_COUNT);
}

#[tokio::test]
async fn test_call_reports_connection_lost_when_peer_closes() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let local = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut conn = FramedConnection::new(stream).unwrap();
        // answer one request, then hang up on the second
        let first: Option<Request> = conn.recv().await.unwrap();
        assert_eq!(first, Some(Request::Ping));
        conn.send(&Response::Pong).await.unwrap();
        let _second: Option<Request> = conn.recv().await.unwrap();
    });

    let mut client = FramedConnection::new(TcpStream::connect(local).await.unwrap()).unwrap();
    let pong: Response = client.call(&Request::Ping).await.unwrap();
    assert_eq!(pong, Response::Pong);

    let lost: crate::Result<Response> = client.call(&Request::MemberList).await;
    server.await.unwrap();
    match lost {
        Err(Error::ConnectionLost(peer)) => assert_eq!(peer, local),
        Err(Error::Io(_)) => {}
        other => panic!("unexpected: {other:?}"),
    }
}
