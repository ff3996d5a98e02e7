//! Local Ed25519 key material.

use std::fmt;

use ed25519_dalek::{Signer, SigningKey};
use rand_core::OsRng;
use zeroize::Zeroize;

use crate::address::Address;
use crate::error::SolError;
use crate::signature::Signature;

/// An Ed25519 keypair. The secret half is zeroed on drop by `ed25519-dalek`.
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Fresh random keypair, e.g. for a new mint or state account.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Keypair from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut seed = *seed;
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Keypair from the 64-byte `secret || public` layout used by key files.
    ///
    /// The public half must match the secret half.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let mut arr: [u8; 64] = bytes.try_into().map_err(|_| {
            SolError::InvalidKeypair(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        let result = SigningKey::from_keypair_bytes(&arr)
            .map_err(|e| SolError::InvalidKeypair(e.to_string()));
        arr.zeroize();
        Ok(Self {
            signing_key: result?,
        })
    }

    pub fn address(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
