//! In-process transport for tests and single-process simulations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use super::{NodeMessage, Transport, TransportError};
use crate::node::Node;

/// Delivers broadcasts straight into peer nodes living in the same process.
///
/// Peers are held weakly so a dropped node simply stops receiving.
pub struct LocalTransport {
    address: String,
    peers: Mutex<HashMap<String, Weak<Node>>>,
}

impl LocalTransport {
    pub fn new(address: &str) -> Arc<LocalTransport> {
        Arc::new(LocalTransport {
            address: address.to_string(),
            peers: Mutex::new(HashMap::new()),
        })
    }

    /// Register `node` as a peer reachable at `address`.
    pub fn connect(&self, address: &str, node: &Arc<Node>) {
        self.peers
            .lock()
            .expect("mutex poisoned")
            .insert(address.to_string(), Arc::downgrade(node));
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().expect("mutex poisoned").len()
    }
}

impl Transport for LocalTransport {
    fn broadcast(&self, message: &NodeMessage) -> Result<(), TransportError> {
        // snapshot so a peer's ingest never runs under our lock
        let peers: Vec<(String, Weak<Node>)> = self
            .peers
            .lock()
            .expect("mutex poisoned")
            .iter()
            .map(|(addr, node)| (addr.clone(), node.clone()))
            .collect();

        let mut first_err = None;
        for (addr, peer) in peers {
            match peer.upgrade() {
                Some(node) => {
                    node.dispatch(message.clone());
                }
                None => {
                    first_err.get_or_insert(TransportError::PeerNotFound(addr));
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn addr(&self) -> String {
        self.address.clone()
    }
}
