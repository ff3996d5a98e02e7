//! JSON-RPC ledger over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use sol_codec::{Address, Signature};
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ledger::Ledger;
use crate::types::{Commitment, FreshnessAnchor, SignatureStatus};

/// Delay between status checks on the primary confirmation path.
const CONFIRM_TICK: Duration = Duration::from_millis(400);

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    /// `[payload, encoding]`
    data: (String, String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    slot: u64,
    confirmations: Option<u64>,
    confirmation_status: Option<Commitment>,
    err: Option<Value>,
}

impl From<RawStatus> for SignatureStatus {
    fn from(raw: RawStatus) -> Self {
        SignatureStatus {
            slot: raw.slot,
            confirmations: raw.confirmations,
            confirmation_status: raw.confirmation_status,
            err: raw.err.map(|e| match e {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        }
    }
}

/// A [`Ledger`] backed by a remote JSON-RPC endpoint.
pub struct RpcLedger {
    http: reqwest::Client,
    url: String,
    commitment: Commitment,
    skip_preflight: bool,
    next_id: AtomicU64,
}

impl RpcLedger {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            url: config.rpc_url.clone(),
            commitment: config.commitment,
            skip_preflight: config.skip_preflight,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ClientError> {
        let response: RpcResponse<T> = self.exchange(method, params).await?;
        if let Some(e) = response.error {
            return Err(ClientError::Rpc(format!("{method}: {} ({})", e.message, e.code)));
        }
        response
            .result
            .ok_or_else(|| ClientError::Rpc(format!("{method}: empty result")))
    }

    /// One JSON-RPC round trip. Transport failures are errors; an error
    /// object in the reply is left for the caller to classify.
    async fn exchange<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<RpcResponse<T>, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        trace!(method, id, "rpc request");

        let response: RpcResponse<T> = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    /// Current block height at this ledger's commitment.
    pub async fn block_height(&self) -> Result<u64, ClientError> {
        self.call(
            "getBlockHeight",
            json!([{ "commitment": self.commitment.as_str() }]),
        )
        .await
    }
}

impl Ledger for RpcLedger {
    async fn get_account(&self, address: &Address) -> Result<Option<Vec<u8>>, ClientError> {
        let info: WithContext<Option<AccountInfo>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), {
                    "encoding": "base64",
                    "commitment": self.commitment.as_str(),
                }]),
            )
            .await?;

        let Some(info) = info.value else {
            return Ok(None);
        };
        let (payload, encoding) = info.data;
        if encoding != "base64" {
            return Err(ClientError::Rpc(format!("unexpected account encoding {encoding:?}")));
        }
        BASE64
            .decode(payload)
            .map(Some)
            .map_err(|e| ClientError::Decoding(format!("account {address}: {e}")))
    }

    async fn latest_anchor(&self) -> Result<FreshnessAnchor, ClientError> {
        let latest: WithContext<LatestBlockhash> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        let blockhash = latest
            .value
            .blockhash
            .parse()
            .map_err(|e| ClientError::Rpc(format!("malformed blockhash: {e}")))?;
        Ok(FreshnessAnchor {
            blockhash,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    async fn submit(&self, wire: Vec<u8>) -> Result<Signature, ClientError> {
        let encoded = BASE64.encode(&wire);
        // The node answering with an error object means it refused the
        // transaction. A transport failure leaves delivery unknown.
        let response: RpcResponse<String> = self
            .exchange(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "skipPreflight": self.skip_preflight,
                    "preflightCommitment": self.commitment.as_str(),
                    "maxRetries": 0,
                }]),
            )
            .await?;
        if let Some(e) = response.error {
            return Err(ClientError::Submission(format!("{} ({})", e.message, e.code)));
        }
        let raw = response
            .result
            .ok_or_else(|| ClientError::Rpc("sendTransaction: empty result".into()))?;
        debug!(signature = %raw, bytes = wire.len(), "transaction sent");
        raw.parse()
            .map_err(|e| ClientError::Rpc(format!("malformed signature {raw:?}: {e}")))
    }

    async fn signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, ClientError> {
        let statuses: WithContext<Vec<Option<RawStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;
        Ok(statuses
            .value
            .into_iter()
            .next()
            .flatten()
            .map(SignatureStatus::from))
    }

    async fn confirm(
        &self,
        signature: &Signature,
        anchor: &FreshnessAnchor,
        commitment: Commitment,
    ) -> Result<SignatureStatus, ClientError> {
        loop {
            if let Some(status) = self.signature_status(signature).await? {
                if let Some(reason) = status.err {
                    return Err(ClientError::Failed {
                        signature: *signature,
                        reason,
                    });
                }
                if status.satisfies(commitment) {
                    return Ok(status);
                }
            }
            if self.block_height().await? > anchor.last_valid_block_height {
                return Err(ClientError::Expired {
                    signature: *signature,
                });
            }
            tokio::time::sleep(CONFIRM_TICK).await;
        }
    }
}
