use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{NodeError, Result};

/// Runtime settings, read from the environment (and `.env`) at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    /// Author recorded in every mined block.
    pub miner_name: String,
    pub host: String,
    pub port: u16,
    /// Base URLs of peer nodes, e.g. `http://10.0.0.2:8080`.
    pub peers: Vec<String>,
    pub output_path: PathBuf,
    pub write_interval: Duration,
    pub mining: bool,
    /// Log the hashrate every few thousand attempts.
    pub mining_preview: bool,
}

impl Config {
    /// Defaults for everything except the identity.
    pub fn new(miner_name: impl Into<String>) -> Self {
        Self {
            miner_name: miner_name.into(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            peers: Vec::new(),
            output_path: PathBuf::from("winning_chain.txt"),
            write_interval: Duration::from_secs(3),
            mining: true,
            mining_preview: true,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let miner_name = lookup("MINER_NAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(NodeError::MissingIdentity)?;
        let mut config = Self::new(miner_name);

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.trim().parse().map_err(|_| NodeError::InvalidConfig {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(peers) = lookup("PEERS") {
            config.peers = peers
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(path) = lookup("OUTPUT_PATH") {
            config.output_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("WRITE_INTERVAL_SECS") {
            let parsed: u64 = secs
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| NodeError::InvalidConfig {
                    key: "WRITE_INTERVAL_SECS",
                    value: secs.clone(),
                })?;
            config.write_interval = Duration::from_secs(parsed);
        }
        if let Some(flag) = lookup("MINING") {
            config.mining = parse_flag("MINING", &flag)?;
        }
        if let Some(flag) = lookup("MINING_PREVIEW") {
            config.mining_preview = parse_flag("MINING_PREVIEW", &flag)?;
        }
        Ok(config)
    }

    pub fn http_address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NodeError::InvalidConfig {
            key,
            value: value.to_string(),
        }),
    }
}
