//! Client configuration.
//!
//! Configuration is plain data: built in code or loaded from an explicit JSON
//! file. Nothing here reads the process environment.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sol_codec::Address;

use crate::error::ClientError;
use crate::types::{Cluster, Commitment};

/// Deployed Universal NFT program: `6vQYZxfQLriD2J3P3AJpgVPMvUZ4w6c2c5AK7Sy6sjoU`
pub const DEFAULT_PROGRAM_ID: Address = Address::new([
    0x57, 0xf8, 0xd6, 0xd0, 0x47, 0xb2, 0x4b, 0x3a, 0xa5, 0xc6, 0x35, 0xeb, 0x00, 0xff, 0x20,
    0x44, 0xab, 0x95, 0xae, 0xc8, 0x58, 0xff, 0x1a, 0x31, 0x9e, 0x1d, 0xb4, 0xcb, 0x58, 0xc1,
    0xb9, 0xcf,
]);

/// Bounded-polling fallback parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmConfig {
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_attempts: 30,
        }
    }
}

impl ConfirmConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Upper bound on time spent polling.
    pub fn ceiling(&self) -> Duration {
        self.poll_interval() * self.max_attempts
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub program_id: Address,
    pub commitment: Commitment,
    pub confirm: ConfirmConfig,
    pub skip_preflight: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_cluster(Cluster::Devnet)
    }
}

impl ClientConfig {
    /// Defaults for `cluster` against the deployed program.
    pub fn for_cluster(cluster: Cluster) -> Self {
        Self {
            rpc_url: cluster.rpc_url().to_string(),
            program_id: DEFAULT_PROGRAM_ID,
            commitment: Commitment::default(),
            confirm: ConfirmConfig::default(),
            skip_preflight: false,
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClientError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClientError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "rpc_url must be http(s), got {:?}",
                self.rpc_url
            )));
        }
        if self.confirm.max_attempts == 0 {
            return Err(ClientError::Config(
                "confirm.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
