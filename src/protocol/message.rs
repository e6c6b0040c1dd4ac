use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;

/// Number of partitions the key space is split into.
pub const PARTITION_COUNT: u32 = 271;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// First frame of a client connection
    Authenticate {
        group_name: String,
        group_password: String,
        client_id: String,
    },
    /// First frame of a member-to-member connection
    Join {
        address: SocketAddr,
        group_name: String,
        group_password: String,
    },
    /// Sent by a member that is shutting down
    Leave {
        address: SocketAddr,
        group_name: String,
        group_password: String,
    },
    Ping,
    MemberList,
    PartitionTable,
    Put {
        map: String,
        key: String,
        value: Vec<u8>,
    },
    Get {
        map: String,
        key: String,
    },
    Remove {
        map: String,
        key: String,
    },
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Request::Authenticate { .. } => "authenticate",
            Request::Join { .. } => "join",
            Request::Leave { .. } => "leave",
            Request::Ping => "ping",
            Request::MemberList => "member_list",
            Request::PartitionTable => "partition_table",
            Request::Put { .. } => "put",
            Request::Get { .. } => "get",
            Request::Remove { .. } => "remove",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Authenticated {
        member: SocketAddr,
        members: Vec<SocketAddr>,
    },
    Joined {
        members: Vec<SocketAddr>,
    },
    Rejected {
        reason: String,
    },
    Pong,
    Members(Vec<SocketAddr>),
    /// Owner of each partition, indexed by partition id
    Partitions(Vec<SocketAddr>),
    Value(Option<Vec<u8>>),
    Ack,
}

/// Owner of every partition for a given member list: partition `p` belongs
/// to `members[p % members.len()]` after sorting.
pub fn assign_partitions(members: &[SocketAddr]) -> Vec<SocketAddr> {
    if members.is_empty() {
        return vec![];
    }
    let mut sorted = members.to_vec();
    sorted.sort();
    sorted.dedup();
    (0..PARTITION_COUNT)
        .map(|p| sorted[p as usize % sorted.len()])
        .collect()
}

/// Partition a key hashes to.
pub fn partition_id(key: &str) -> u32 {
    // FNV-1a; stable across processes, unlike the std hasher
    let mut hash: u32 = 0x811c_9dc5;
    for b in key.as_bytes() {
        hash ^= *b as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash % PARTITION_COUNT
}
