use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::protocol::assign_partitions;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::Logger;
use crate::MemberConfig;

/// Everything a member's connection handlers share.
pub(crate) struct MemberState {
    pub(crate) address: SocketAddr,
    pub(crate) config: MemberConfig,
    pub(crate) logger: Arc<dyn Logger>,
    members: RwLock<BTreeSet<SocketAddr>>,
    maps: DashMap<(String, String), Vec<u8>>,
}

impl MemberState {
    pub(crate) fn new(
        address: SocketAddr,
        config: MemberConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let mut members = BTreeSet::new();
        members.insert(address);
        Self {
            address,
            config,
            logger,
            members: RwLock::new(members),
            maps: DashMap::new(),
        }
    }

    pub(crate) fn members(&self) -> Vec<SocketAddr> {
        self.members.read().iter().copied().collect()
    }

    pub(crate) fn add_members(
        &self,
        addresses: &[SocketAddr],
    ) {
        let added = {
            let mut members = self.members.write();
            addresses.iter().filter(|a| members.insert(**a)).count()
        };
        if added > 0 {
            self.log_members();
        }
    }

    pub(crate) fn remove_member(
        &self,
        address: SocketAddr,
    ) {
        if address == self.address {
            return;
        }
        if self.members.write().remove(&address) {
            self.log_members();
        }
    }

    fn log_members(&self) {
        let members = self.members();
        let listing = members
            .iter()
            .map(|m| {
                if *m == self.address {
                    format!("\tMember [{m}] this")
                } else {
                    format!("\tMember [{m}]")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.logger
            .info(&format!("\n\nMembers [{}] {{\n{}\n}}\n", members.len(), listing));
    }

    pub(crate) fn credentials_match(
        &self,
        name: &str,
        password: &str,
    ) -> bool {
        self.config.group.matches(name, password)
    }

    /// Answers an already-authenticated request.
    pub(crate) fn handle(
        &self,
        request: Request,
    ) -> Response {
        match request {
            Request::Authenticate { client_id, .. } => {
                self.logger
                    .info(&format!("Received auth from client {client_id}, successfully authenticated"));
                Response::Authenticated {
                    member: self.address,
                    members: self.members(),
                }
            }
            Request::Join { address, .. } => {
                self.add_members(&[address]);
                Response::Joined {
                    members: self.members(),
                }
            }
            Request::Leave { address, .. } => {
                self.remove_member(address);
                Response::Ack
            }
            Request::Ping => Response::Pong,
            Request::MemberList => Response::Members(self.members()),
            Request::PartitionTable => Response::Partitions(assign_partitions(&self.members())),
            Request::Put { map, key, value } => Response::Value(self.maps.insert((map, key), value)),
            Request::Get { map, key } => Response::Value(self.maps.get(&(map, key)).map(|v| v.value().clone())),
            Request::Remove { map, key } => Response::Value(self.maps.remove(&(map, key)).map(|(_, v)| v)),
        }
    }
}
