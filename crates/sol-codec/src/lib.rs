//! Ledger-side primitives for the Universal NFT client.
//!
//! This crate owns everything that can be computed without talking to the
//! network: the remote program's binary layout, SHA-256 discriminators,
//! program-derived address search, Ed25519 key material and the legacy
//! transaction wire format.
//!
//! Like the rest of the workspace it does not depend on `solana-sdk`; the
//! wire format is small enough to implement by hand on top of
//! `ed25519-dalek`, `curve25519-dalek`, `sha2` and `bs58`.

pub mod address;
pub mod discriminator;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod programs;
pub mod signature;
pub mod transaction;
pub mod wire;

pub use address::{address_to_bytes, bytes_to_address, Address};
pub use discriminator::{account_discriminator, instruction_discriminator, Discriminator};
pub use error::SolError;
pub use keypair::Keypair;
pub use pda::{create_program_address, find_program_address};
pub use programs::{
    associated_token_address, master_edition_address, metadata_address,
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
pub use signature::Signature;
pub use transaction::{AccountMeta, Blockhash, Instruction, Message, Transaction};
pub use wire::{WireReader, WireWriter};
