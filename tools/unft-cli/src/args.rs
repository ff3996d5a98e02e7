use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sol_codec::Address;
use unft_client::{Cluster, Commitment};

#[derive(Parser, Debug, Clone)]
#[command(name = "unft", version, about = "Universal NFT program CLI")]
pub struct Cli {
    /// JSON client config file; flags below override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// mainnet|devnet|testnet|localnet
    #[arg(long, global = true, default_value = "devnet")]
    pub cluster: Cluster,

    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    #[arg(long, global = true)]
    pub program_id: Option<Address>,

    /// processed|confirmed|finalized
    #[arg(long, global = true)]
    pub commitment: Option<Commitment>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct Wallet {
    /// solana-keygen JSON key file of the paying and authorizing wallet.
    #[arg(long, short = 'k')]
    pub keypair: PathBuf,

    /// Program state account.
    #[arg(long)]
    pub state: Address,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the 8-byte discriminator for an instruction or account name.
    Discriminator {
        name: String,
        /// Treat NAME as an account type rather than an instruction.
        #[arg(long)]
        account: bool,
    },

    /// Derive a program or well-known address.
    Pda {
        #[command(subcommand)]
        kind: PdaKind,
    },

    /// Decode the program state account.
    State { address: Address },

    /// Decode the per-item record for a sequence number.
    Nft { token_id: u64 },

    /// Create the program state.
    Initialize {
        #[arg(long, short = 'k')]
        keypair: PathBuf,
        /// Key file for the new state account; generated when omitted.
        #[arg(long)]
        state_keypair: Option<PathBuf>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        gateway: Address,
        #[arg(long, default_value_t = 1_000_000)]
        gas_limit: u64,
        #[arg(long)]
        uniswap_router: Address,
    },

    SetGateway {
        #[command(flatten)]
        wallet: Wallet,
        gateway: Address,
    },

    SetGasLimit {
        #[command(flatten)]
        wallet: Wallet,
        gas_limit: u64,
    },

    /// Record the counterpart contract on a foreign chain.
    Connect {
        #[command(flatten)]
        wallet: Wallet,
        chain_id: u64,
        contract: String,
    },

    Pause {
        #[command(flatten)]
        wallet: Wallet,
    },

    Unpause {
        #[command(flatten)]
        wallet: Wallet,
    },

    /// Mint the next item; the recipient defaults to the wallet.
    Mint {
        #[command(flatten)]
        wallet: Wallet,
        #[arg(long)]
        recipient: Option<Address>,
        uri: String,
    },

    Burn {
        #[command(flatten)]
        wallet: Wallet,
        #[arg(long)]
        mint: Address,
        token_id: u64,
    },

    /// Lock an item for relay to another chain.
    Transfer {
        #[command(flatten)]
        wallet: Wallet,
        #[arg(long)]
        mint: Address,
        token_id: u64,
        receiver: String,
        destination_chain_id: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PdaKind {
    Connection { chain_id: u64 },
    Nft { token_id: u64 },
    Enumerable { token_id: u64 },
    Origin { mint: Address, token_id: u64 },
    TokenAccount { owner: Address, mint: Address },
    Metadata { mint: Address },
    MasterEdition { mint: Address },
}
