//! Instruction builders for every Universal NFT program method.
//!
//! Builders are pure: typed accounts and arguments in, an [`Instruction`]
//! out. Account order and signer/writable flags mirror the remote program's
//! account structs exactly; the program rejects any deviation.
//!
//! Each `*Accounts` struct can be filled in by hand or via its `derive`
//! constructor, which resolves every program-derived and associated address
//! from the inputs that are not derivable.

use sol_codec::{
    associated_token_address, instruction_discriminator, master_edition_address,
    metadata_address, AccountMeta, Address, Instruction, WireWriter,
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
use tracing::debug;

use crate::error::ClientError;
use crate::seeds::{connection_address, enumerable_address, nft_data_address, nft_origin_address};

/// Remote method names, as hashed into instruction discriminators.
pub mod names {
    pub const INITIALIZE: &str = "initialize";
    pub const SET_GATEWAY: &str = "set_gateway";
    pub const SET_GAS_LIMIT: &str = "set_gas_limit";
    pub const SET_CONNECTED: &str = "set_connected";
    pub const PAUSE: &str = "pause";
    pub const UNPAUSE: &str = "unpause";
    pub const SAFE_MINT: &str = "safe_mint";
    pub const BURN_TOKEN: &str = "burn_token";
    pub const TRANSFER_CROSS_CHAIN: &str = "transfer_cross_chain";
    pub const HANDLE_CROSS_CHAIN_RECEIVE: &str = "handle_cross_chain_receive";
    pub const REVERT_TRANSFER: &str = "revert_transfer";

    pub const ALL: [&str; 11] = [
        INITIALIZE,
        SET_GATEWAY,
        SET_GAS_LIMIT,
        SET_CONNECTED,
        PAUSE,
        UNPAUSE,
        SAFE_MINT,
        BURN_TOKEN,
        TRANSFER_CROSS_CHAIN,
        HANDLE_CROSS_CHAIN_RECEIVE,
        REVERT_TRANSFER,
    ];
}

/// Named addresses an instruction touches, for receipts and logs.
pub trait AccountSet {
    fn labeled(&self) -> Vec<(&'static str, Address)>;
}

fn payload(name: &str) -> WireWriter {
    WireWriter::with_prefix(&instruction_discriminator(name))
}

fn finish(program_id: &Address, name: &str, accounts: Vec<AccountMeta>, data: WireWriter) -> Instruction {
    let data = data.into_bytes();
    debug!(method = name, accounts = accounts.len(), bytes = data.len(), "built instruction");
    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

// ---------------------------------------------------------------------------
// initialize
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeAccounts {
    /// Fresh keypair-backed account; the program allocates it, so it signs.
    pub state: Address,
    pub initial_owner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeArgs {
    pub name: String,
    pub symbol: String,
    pub gateway: Address,
    pub gas_limit: u64,
    pub uniswap_router: Address,
}

impl AccountSet for InitializeAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![("state", self.state), ("initial_owner", self.initial_owner)]
    }
}

pub fn initialize(
    program_id: &Address,
    accounts: &InitializeAccounts,
    args: &InitializeArgs,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::INITIALIZE);
    data.put_string(&args.name)?
        .put_string(&args.symbol)?
        .put_address(&args.gateway)
        .put_u64(args.gas_limit)
        .put_address(&args.uniswap_router);

    let metas = vec![
        AccountMeta::new(accounts.state, true),
        AccountMeta::new(accounts.initial_owner, true),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::INITIALIZE, metas, data))
}

// ---------------------------------------------------------------------------
// Admin operations: set_gateway, set_gas_limit, pause, unpause
// ---------------------------------------------------------------------------

/// Accounts shared by every authority-only state mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccounts {
    pub state: Address,
    pub authority: Address,
}

impl AccountSet for AdminAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![("state", self.state), ("authority", self.authority)]
    }
}

impl AdminAccounts {
    fn metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.state, false),
            AccountMeta::new_readonly(self.authority, true),
        ]
    }
}

pub fn set_gateway(
    program_id: &Address,
    accounts: &AdminAccounts,
    gateway: &Address,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::SET_GATEWAY);
    data.put_address(gateway);
    Ok(finish(program_id, names::SET_GATEWAY, accounts.metas(), data))
}

pub fn set_gas_limit(
    program_id: &Address,
    accounts: &AdminAccounts,
    gas_limit: u64,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::SET_GAS_LIMIT);
    data.put_u64(gas_limit);
    Ok(finish(program_id, names::SET_GAS_LIMIT, accounts.metas(), data))
}

pub fn pause(program_id: &Address, accounts: &AdminAccounts) -> Result<Instruction, ClientError> {
    Ok(finish(program_id, names::PAUSE, accounts.metas(), payload(names::PAUSE)))
}

pub fn unpause(program_id: &Address, accounts: &AdminAccounts) -> Result<Instruction, ClientError> {
    Ok(finish(program_id, names::UNPAUSE, accounts.metas(), payload(names::UNPAUSE)))
}

// ---------------------------------------------------------------------------
// set_connected
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetConnectedAccounts {
    pub state: Address,
    pub connection: Address,
    /// Pays for the connection record.
    pub authority: Address,
}

impl SetConnectedAccounts {
    pub fn derive(
        program_id: &Address,
        state: Address,
        authority: Address,
        chain_id: u64,
    ) -> Result<Self, ClientError> {
        let (connection, _) = connection_address(program_id, chain_id)?;
        Ok(Self {
            state,
            connection,
            authority,
        })
    }
}

impl AccountSet for SetConnectedAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("connection", self.connection),
            ("authority", self.authority),
        ]
    }
}

/// Register `contract_address` as the counterpart on `chain_id`.
///
/// The contract address is an opaque string to this layer; foreign-chain
/// address rules are enforced by the remote program.
pub fn set_connected(
    program_id: &Address,
    accounts: &SetConnectedAccounts,
    chain_id: u64,
    contract_address: &str,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::SET_CONNECTED);
    data.put_u64(chain_id).put_string(contract_address)?;

    let metas = vec![
        AccountMeta::new_readonly(accounts.state, false),
        AccountMeta::new(accounts.connection, false),
        AccountMeta::new(accounts.authority, true),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::SET_CONNECTED, metas, data))
}

// ---------------------------------------------------------------------------
// safe_mint
// ---------------------------------------------------------------------------

/// The non-derivable participants of a mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintParties {
    pub recipient: Address,
    pub payer: Address,
    /// The program's recorded authority.
    pub authority: Address,
    pub mint_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMintAccounts {
    pub state: Address,
    pub nft_data: Address,
    pub enumerable: Address,
    /// Fresh keypair-backed mint; signs.
    pub mint: Address,
    pub token_account: Address,
    pub metadata: Address,
    pub master_edition: Address,
    pub nft_origin: Address,
    pub recipient: Address,
    pub payer: Address,
    pub authority: Address,
    pub mint_authority: Address,
}

impl SafeMintAccounts {
    /// Resolve every record for minting `mint` as sequence number `token_id`.
    pub fn derive(
        program_id: &Address,
        state: Address,
        mint: Address,
        token_id: u64,
        parties: &MintParties,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            state,
            nft_data: nft_data_address(program_id, token_id)?.0,
            enumerable: enumerable_address(program_id, token_id)?.0,
            mint,
            token_account: associated_token_address(&parties.recipient, &mint)?,
            metadata: metadata_address(&mint)?,
            master_edition: master_edition_address(&mint)?,
            nft_origin: nft_origin_address(program_id, &mint, token_id)?.0,
            recipient: parties.recipient,
            payer: parties.payer,
            authority: parties.authority,
            mint_authority: parties.mint_authority,
        })
    }
}

impl AccountSet for SafeMintAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("nft_data", self.nft_data),
            ("enumerable", self.enumerable),
            ("mint", self.mint),
            ("token_account", self.token_account),
            ("metadata", self.metadata),
            ("master_edition", self.master_edition),
            ("nft_origin", self.nft_origin),
            ("recipient", self.recipient),
        ]
    }
}

pub fn safe_mint(
    program_id: &Address,
    accounts: &SafeMintAccounts,
    uri: &str,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::SAFE_MINT);
    data.put_string(uri)?;

    let metas = vec![
        AccountMeta::new(accounts.state, false),
        AccountMeta::new(accounts.nft_data, false),
        AccountMeta::new(accounts.enumerable, false),
        AccountMeta::new(accounts.mint, true),
        AccountMeta::new(accounts.token_account, false),
        AccountMeta::new(accounts.metadata, false),
        AccountMeta::new(accounts.master_edition, false),
        AccountMeta::new(accounts.nft_origin, false),
        AccountMeta::new_readonly(accounts.recipient, false),
        AccountMeta::new(accounts.payer, true),
        AccountMeta::new_readonly(accounts.authority, true),
        AccountMeta::new_readonly(accounts.mint_authority, true),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(TOKEN_METADATA_PROGRAM_ID, false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
    ];
    Ok(finish(program_id, names::SAFE_MINT, metas, data))
}

// ---------------------------------------------------------------------------
// burn_token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnAccounts {
    pub state: Address,
    pub nft_data: Address,
    pub mint: Address,
    pub token_account: Address,
    /// Current holder; signs.
    pub authority: Address,
}

impl BurnAccounts {
    pub fn derive(
        program_id: &Address,
        state: Address,
        mint: Address,
        authority: Address,
        token_id: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            state,
            nft_data: nft_data_address(program_id, token_id)?.0,
            mint,
            token_account: associated_token_address(&authority, &mint)?,
            authority,
        })
    }
}

impl AccountSet for BurnAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("nft_data", self.nft_data),
            ("mint", self.mint),
            ("token_account", self.token_account),
            ("authority", self.authority),
        ]
    }
}

pub fn burn_token(
    program_id: &Address,
    accounts: &BurnAccounts,
    token_id: u64,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::BURN_TOKEN);
    data.put_u64(token_id);

    let metas = vec![
        AccountMeta::new(accounts.state, false),
        AccountMeta::new(accounts.nft_data, false),
        AccountMeta::new(accounts.mint, false),
        AccountMeta::new(accounts.token_account, false),
        AccountMeta::new_readonly(accounts.authority, true),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::BURN_TOKEN, metas, data))
}

// ---------------------------------------------------------------------------
// transfer_cross_chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCrossChainAccounts {
    pub state: Address,
    pub nft_data: Address,
    pub mint: Address,
    pub token_account: Address,
    pub nft_origin: Address,
    pub owner: Address,
}

impl TransferCrossChainAccounts {
    pub fn derive(
        program_id: &Address,
        state: Address,
        mint: Address,
        owner: Address,
        token_id: u64,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            state,
            nft_data: nft_data_address(program_id, token_id)?.0,
            mint,
            token_account: associated_token_address(&owner, &mint)?,
            nft_origin: nft_origin_address(program_id, &mint, token_id)?.0,
            owner,
        })
    }
}

impl AccountSet for TransferCrossChainAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("nft_data", self.nft_data),
            ("mint", self.mint),
            ("token_account", self.token_account),
            ("nft_origin", self.nft_origin),
            ("owner", self.owner),
        ]
    }
}

/// Burn locally and record the intent for a relayer to mint on
/// `destination_chain_id`. `receiver` is passed through as opaque bytes.
pub fn transfer_cross_chain(
    program_id: &Address,
    accounts: &TransferCrossChainAccounts,
    token_id: u64,
    receiver: &str,
    destination_chain_id: u64,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::TRANSFER_CROSS_CHAIN);
    data.put_u64(token_id)
        .put_string(receiver)?
        .put_u64(destination_chain_id);

    let metas = vec![
        AccountMeta::new(accounts.state, false),
        AccountMeta::new(accounts.nft_data, false),
        AccountMeta::new(accounts.mint, false),
        AccountMeta::new(accounts.token_account, false),
        AccountMeta::new_readonly(accounts.nft_origin, false),
        AccountMeta::new_readonly(accounts.owner, true),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::TRANSFER_CROSS_CHAIN, metas, data))
}

// ---------------------------------------------------------------------------
// handle_cross_chain_receive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveAccounts {
    pub state: Address,
    pub nft_data: Address,
    pub enumerable: Address,
    /// Fresh keypair-backed mint; signs.
    pub mint: Address,
    pub token_account: Address,
    pub recipient: Address,
    pub payer: Address,
    pub mint_authority: Address,
}

impl ReceiveAccounts {
    pub fn derive(
        program_id: &Address,
        state: Address,
        mint: Address,
        token_id: u64,
        parties: &MintParties,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            state,
            nft_data: nft_data_address(program_id, token_id)?.0,
            enumerable: enumerable_address(program_id, token_id)?.0,
            mint,
            token_account: associated_token_address(&parties.recipient, &mint)?,
            recipient: parties.recipient,
            payer: parties.payer,
            mint_authority: parties.mint_authority,
        })
    }
}

impl AccountSet for ReceiveAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("nft_data", self.nft_data),
            ("enumerable", self.enumerable),
            ("mint", self.mint),
            ("token_account", self.token_account),
            ("recipient", self.recipient),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiveArgs {
    pub token_id: u64,
    pub uri: String,
    pub sender_chain_id: u64,
    /// Sender on the origin chain. The deployed program ignores it and the
    /// reference client always sends an empty string.
    pub original_sender: String,
}

pub fn handle_cross_chain_receive(
    program_id: &Address,
    accounts: &ReceiveAccounts,
    args: &ReceiveArgs,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::HANDLE_CROSS_CHAIN_RECEIVE);
    data.put_u64(args.token_id)
        .put_string(&args.uri)?
        .put_u64(args.sender_chain_id)
        .put_string(&args.original_sender)?;

    let metas = vec![
        AccountMeta::new(accounts.state, false),
        AccountMeta::new(accounts.nft_data, false),
        AccountMeta::new(accounts.enumerable, false),
        AccountMeta::new(accounts.mint, true),
        AccountMeta::new(accounts.token_account, false),
        AccountMeta::new_readonly(accounts.recipient, false),
        AccountMeta::new(accounts.payer, true),
        AccountMeta::new_readonly(accounts.mint_authority, true),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::HANDLE_CROSS_CHAIN_RECEIVE, metas, data))
}

// ---------------------------------------------------------------------------
// revert_transfer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertAccounts {
    pub state: Address,
    pub nft_data: Address,
    /// Fresh keypair-backed mint for the restored item; signs.
    pub mint: Address,
    pub token_account: Address,
    pub original_owner: Address,
    pub payer: Address,
    pub mint_authority: Address,
}

impl RevertAccounts {
    pub fn derive(
        program_id: &Address,
        state: Address,
        mint: Address,
        token_id: u64,
        parties: &MintParties,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            state,
            nft_data: nft_data_address(program_id, token_id)?.0,
            mint,
            token_account: associated_token_address(&parties.recipient, &mint)?,
            original_owner: parties.recipient,
            payer: parties.payer,
            mint_authority: parties.mint_authority,
        })
    }
}

impl AccountSet for RevertAccounts {
    fn labeled(&self) -> Vec<(&'static str, Address)> {
        vec![
            ("state", self.state),
            ("nft_data", self.nft_data),
            ("mint", self.mint),
            ("token_account", self.token_account),
            ("original_owner", self.original_owner),
        ]
    }
}

/// Restore custody to the original owner after a failed cross-chain leg.
///
/// The owner travels twice: as an account and as the trailing payload
/// argument, which is what the program records.
pub fn revert_transfer(
    program_id: &Address,
    accounts: &RevertAccounts,
    token_id: u64,
) -> Result<Instruction, ClientError> {
    let mut data = payload(names::REVERT_TRANSFER);
    data.put_u64(token_id).put_address(&accounts.original_owner);

    let metas = vec![
        AccountMeta::new(accounts.state, false),
        AccountMeta::new(accounts.nft_data, false),
        AccountMeta::new(accounts.mint, true),
        AccountMeta::new(accounts.token_account, false),
        AccountMeta::new_readonly(accounts.original_owner, false),
        AccountMeta::new(accounts.payer, true),
        AccountMeta::new_readonly(accounts.mint_authority, true),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
    ];
    Ok(finish(program_id, names::REVERT_TRANSFER, metas, data))
}
