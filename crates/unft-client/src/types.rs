use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sol_codec::transaction::Blockhash;
use sol_codec::{Address, Signature};

/// Ledger commitment levels, weakest first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level {other:?}")),
        }
    }
}

/// Public clusters and a local validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Mainnet,
    Devnet,
    Testnet,
    Localnet,
}

impl Cluster {
    /// Default JSON-RPC endpoint
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "https://api.mainnet-beta.solana.com",
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Cluster::Mainnet => "Solana Mainnet",
            Cluster::Devnet => "Solana Devnet",
            Cluster::Testnet => "Solana Testnet",
            Cluster::Localnet => "Local Validator",
        }
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            other => Err(format!("unknown cluster {other:?}")),
        }
    }
}

/// A recent blockhash and the last block height at which a transaction
/// referencing it can still land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessAnchor {
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

/// Ledger view of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    /// `None` once the transaction is rooted.
    pub confirmations: Option<u64>,
    pub confirmation_status: Option<Commitment>,
    /// Execution error reported by the ledger, if the transaction failed.
    pub err: Option<String>,
}

impl SignatureStatus {
    /// Whether the transaction has been observed in a block: either rooted
    /// (`confirmations == None`) or with a nonzero confirmation count.
    pub fn is_landed(&self) -> bool {
        self.confirmations.is_none_or(|n| n > 0)
            || self.confirmation_status == Some(Commitment::Finalized)
    }

    /// Whether the transaction reached `commitment`.
    pub fn satisfies(&self, commitment: Commitment) -> bool {
        match self.confirmation_status {
            Some(level) => level >= commitment,
            None => self.confirmations.is_none(),
        }
    }
}

/// A submission that reached the requested commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub signature: Signature,
    pub slot: Option<u64>,
    pub commitment: Commitment,
}

/// Result of a state-mutating flow: what was touched and how it landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowReceipt {
    pub submission: Submission,
    /// Named accounts the instruction referenced, in a stable order.
    pub accounts: Vec<(String, Address)>,
    /// Sequence number assigned or affected, for item flows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<u64>,
}

impl FlowReceipt {
    pub fn account(&self, name: &str) -> Option<&Address> {
        self.accounts
            .iter()
            .find(|(label, _)| label == name)
            .map(|(_, address)| address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commitment_order() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
        assert_eq!(Commitment::default(), Commitment::Confirmed);
    }

    #[test]
    fn commitment_parse_and_serde() {
        assert_eq!("finalized".parse::<Commitment>().unwrap(), Commitment::Finalized);
        assert!("final".parse::<Commitment>().is_err());
        assert_eq!(
            serde_json::to_string(&Commitment::Processed).unwrap(),
            "\"processed\""
        );
    }

    #[test]
    fn cluster_urls() {
        assert_eq!(Cluster::Devnet.rpc_url(), "https://api.devnet.solana.com");
        assert_eq!("mainnet-beta".parse::<Cluster>().unwrap(), Cluster::Mainnet);
        assert_eq!("LOCALHOST".parse::<Cluster>().unwrap(), Cluster::Localnet);
    }

    fn status(confirmations: Option<u64>, level: Option<Commitment>) -> SignatureStatus {
        SignatureStatus {
            slot: 10,
            confirmations,
            confirmation_status: level,
            err: None,
        }
    }

    #[test]
    fn landed_means_rooted_or_confirmed_once() {
        assert!(status(None, Some(Commitment::Finalized)).is_landed());
        assert!(status(Some(3), Some(Commitment::Confirmed)).is_landed());
        assert!(!status(Some(0), Some(Commitment::Processed)).is_landed());
    }

    #[test]
    fn satisfies_compares_levels() {
        let confirmed = status(Some(2), Some(Commitment::Confirmed));
        assert!(confirmed.satisfies(Commitment::Processed));
        assert!(confirmed.satisfies(Commitment::Confirmed));
        assert!(!confirmed.satisfies(Commitment::Finalized));
        assert!(status(None, None).satisfies(Commitment::Finalized));
    }

    #[test]
    fn receipt_account_lookup() {
        let receipt = FlowReceipt {
            submission: Submission {
                signature: Signature::new([1; 64]),
                slot: None,
                commitment: Commitment::Confirmed,
            },
            accounts: vec![("mint".into(), Address::new([5; 32]))],
            token_id: Some(1),
        };
        assert_eq!(receipt.account("mint"), Some(&Address::new([5; 32])));
        assert!(receipt.account("state").is_none());
    }
}
