use std::time::Duration;

use log::{debug, warn};
use reqwest::blocking::Client;

use super::{NodeMessage, Transport, TransportError};

/// Path peers accept block announcements on.
pub const BLOCKS_PATH: &str = "/api/v1/blocks/";

/// Broadcasts blocks to peer nodes over their HTTP API.
///
/// Uses a blocking client: broadcasts are issued from the miner thread,
/// never from inside the actix runtime.
pub struct HttpTransport {
    address: String,
    peers: Vec<String>,
    client: Client,
}

impl HttpTransport {
    pub fn new(address: impl Into<String>, peers: Vec<String>) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(Duration::from_secs(5)).build()?;
        Ok(Self {
            address: address.into(),
            peers,
            client,
        })
    }

    pub fn peers(&self) -> &[String] {
        &self.peers
    }

    fn endpoint(peer: &str) -> String {
        format!("{}{}", peer.trim_end_matches('/'), BLOCKS_PATH)
    }
}

impl Transport for HttpTransport {
    fn broadcast(&self, message: &NodeMessage) -> Result<(), TransportError> {
        let mut first_err = None;
        for peer in &self.peers {
            let url = Self::endpoint(peer);
            let sent = self
                .client
                .post(&url)
                .json(message)
                .send()
                .and_then(|resp| resp.error_for_status());
            match sent {
                Ok(_) => debug!("announced block {} to {}", message.block().hash, peer),
                Err(e) => {
                    warn!("failed to announce block to {peer}: {e}");
                    first_err.get_or_insert(TransportError::SendFailed(peer.clone()));
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn addr(&self) -> String {
        self.address.clone()
    }
}
