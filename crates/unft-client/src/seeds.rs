//! Named program-derived addresses of the Universal NFT program.
//!
//! Numeric arguments are packed as 8-byte little-endian seeds.

use sol_codec::{find_program_address, Address};

use crate::error::ClientError;

pub const CONNECTION_SEED: &[u8] = b"connection";
pub const NFT_SEED: &[u8] = b"nft";
pub const ENUMERABLE_SEED: &[u8] = b"enumerable";
pub const NFT_ORIGIN_SEED: &[u8] = b"nft_origin";

/// Connection record for foreign chain `chain_id`.
pub fn connection_address(program_id: &Address, chain_id: u64) -> Result<(Address, u8), ClientError> {
    Ok(find_program_address(
        &[CONNECTION_SEED, &chain_id.to_le_bytes()],
        program_id,
    )?)
}

/// Per-item record for sequence number `token_id`.
pub fn nft_data_address(program_id: &Address, token_id: u64) -> Result<(Address, u8), ClientError> {
    Ok(find_program_address(
        &[NFT_SEED, &token_id.to_le_bytes()],
        program_id,
    )?)
}

/// Enumerable record for sequence number `token_id`.
pub fn enumerable_address(program_id: &Address, token_id: u64) -> Result<(Address, u8), ClientError> {
    Ok(find_program_address(
        &[ENUMERABLE_SEED, &token_id.to_le_bytes()],
        program_id,
    )?)
}

/// Origin record for `mint` minted as `token_id`.
pub fn nft_origin_address(
    program_id: &Address,
    mint: &Address,
    token_id: u64,
) -> Result<(Address, u8), ClientError> {
    Ok(find_program_address(
        &[NFT_ORIGIN_SEED, mint.as_ref(), &token_id.to_le_bytes()],
        program_id,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PROGRAM_ID;

    #[test]
    fn item_record_for_sequence_zero_is_stable() {
        let first = nft_data_address(&DEFAULT_PROGRAM_ID, 0).unwrap();
        let second = nft_data_address(&DEFAULT_PROGRAM_ID, 0).unwrap();
        assert_eq!(first, second);
        assert!(!first.0.is_on_curve());
    }

    #[test]
    fn seed_prefix_separates_record_kinds() {
        let nft = nft_data_address(&DEFAULT_PROGRAM_ID, 5).unwrap().0;
        let enumerable = enumerable_address(&DEFAULT_PROGRAM_ID, 5).unwrap().0;
        let connection = connection_address(&DEFAULT_PROGRAM_ID, 5).unwrap().0;
        assert_ne!(nft, enumerable);
        assert_ne!(nft, connection);
        assert_ne!(enumerable, connection);
    }

    #[test]
    fn matches_generic_resolver_with_le_packing() {
        let expected =
            find_program_address(&[b"connection", &7001u64.to_le_bytes()], &DEFAULT_PROGRAM_ID)
                .unwrap();
        assert_eq!(connection_address(&DEFAULT_PROGRAM_ID, 7001).unwrap(), expected);
    }

    #[test]
    fn origin_depends_on_mint() {
        let a = nft_origin_address(&DEFAULT_PROGRAM_ID, &Address::new([1; 32]), 3).unwrap();
        let b = nft_origin_address(&DEFAULT_PROGRAM_ID, &Address::new([2; 32]), 3).unwrap();
        assert_ne!(a.0, b.0);
    }
}
