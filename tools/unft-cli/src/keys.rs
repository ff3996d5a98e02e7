use std::path::Path;

use anyhow::{Context, Result};
use sol_codec::Keypair;

/// Load a solana-keygen key file: a JSON array of the 64 `secret || public`
/// bytes.
pub fn load(path: &Path) -> Result<Keypair> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading key file {}", path.display()))?;
    parse(&raw).with_context(|| format!("parsing key file {}", path.display()))
}

fn parse(raw: &str) -> Result<Keypair> {
    let bytes: Vec<u8> = serde_json::from_str(raw)?;
    Ok(Keypair::from_keypair_bytes(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_keygen_layout() {
        let kp = Keypair::from_seed(&[9; 32]);
        let mut bytes = vec![9u8; 32];
        bytes.extend_from_slice(kp.address().as_bytes());
        let raw = serde_json::to_string(&bytes).unwrap();

        assert_eq!(parse(&raw).unwrap().address(), kp.address());
    }

    #[test]
    fn rejects_mismatched_public_half() {
        let mut bytes = vec![9u8; 32];
        bytes.extend_from_slice(&[1u8; 32]);
        assert!(parse(&serde_json::to_string(&bytes).unwrap()).is_err());
    }

    #[test]
    fn rejects_short_file() {
        assert!(parse("[1, 2, 3]").is_err());
    }
}
