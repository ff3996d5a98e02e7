//! Program-derived address search.
//!
//! A program-derived address is
//! `SHA-256(seed_0 || ... || seed_n || bump || program_id || "ProgramDerivedAddress")`
//! for the highest bump in `255..=0` whose digest is NOT a valid Ed25519
//! point. Only the deriving program can authorize writes to state gated by
//! such an address.

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::address::{is_on_curve, Address};
use crate::error::SolError;

/// The string appended to every derivation.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

/// Find the canonical program-derived address and its bump for `seeds`.
///
/// Fails with [`SolError::DerivationExhausted`] if every bump lands on the
/// curve, which means the seed design is wrong rather than the input.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), SolError> {
    check_seeds(seeds, 1)?;

    for bump in (0u8..=255).rev() {
        if let Some(address) = try_derive(seeds, Some(bump), program_id) {
            debug!(%program_id, %address, bump, seeds = seeds.len(), "derived program address");
            return Ok((address, bump));
        }
    }

    Err(SolError::DerivationExhausted(program_id.to_string()))
}

/// Derive an address from a complete seed list (bump already appended).
///
/// Fails if the digest falls on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, SolError> {
    check_seeds(seeds, 0)?;
    try_derive(seeds, None, program_id).ok_or_else(|| {
        SolError::InvalidAddress("derived address falls on the ed25519 curve".into())
    })
}

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), SolError> {
    if seeds.len() + reserved > MAX_SEEDS {
        return Err(SolError::Encoding(format!(
            "too many seeds: {} (max {})",
            seeds.len() + reserved,
            MAX_SEEDS
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(SolError::Encoding(format!(
            "seed of {} bytes exceeds {} byte limit",
            seed.len(),
            MAX_SEED_LEN
        )));
    }
    Ok(())
}

/// Returns `Some(address)` if the derived digest is OFF the curve.
fn try_derive(seeds: &[&[u8]], bump: Option<u8>, program_id: &Address) -> Option<Address> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);

    let hash: [u8; 32] = hasher.finalize().into();
    if is_on_curve(&hash) {
        return None;
    }
    Some(Address::new(hash))
}
