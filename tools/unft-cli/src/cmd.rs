use anyhow::{Context, Result};
use serde_json::json;
use sol_codec::{
    account_discriminator, associated_token_address, instruction_discriminator,
    master_edition_address, metadata_address, Address, Keypair,
};
use tracing::info;
use unft_client::instructions::InitializeArgs;
use unft_client::seeds::{connection_address, enumerable_address, nft_data_address, nft_origin_address};
use unft_client::{ClientConfig, RpcLedger, Signers, UniversalNftClient};

use crate::args::{Cli, Command, PdaKind, Wallet};
use crate::{keys, output};

pub async fn dispatch(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;

    match cli.command {
        Command::Discriminator { name, account } => {
            let (kind, bytes) = if account {
                ("account", account_discriminator(&name))
            } else {
                ("instruction", instruction_discriminator(&name))
            };
            output::print(&json!({
                "name": name,
                "kind": kind,
                "hex": hex::encode(bytes),
                "bytes": bytes,
            }))
        }
        Command::Pda { kind } => pda(&config, kind),
        Command::State { address } => {
            let client = connect(config)?;
            let state = client
                .fetch_program_state(&address)
                .await?
                .with_context(|| format!("no account at {address}"))?;
            output::print(&state)
        }
        Command::Nft { token_id } => {
            let client = connect(config)?;
            output::print(&client.fetch_nft(token_id).await?)
        }
        Command::Initialize {
            keypair,
            state_keypair,
            name,
            symbol,
            gateway,
            gas_limit,
            uniswap_router,
        } => {
            let wallet = keys::load(&keypair)?;
            let state = match state_keypair {
                Some(path) => keys::load(&path)?,
                None => Keypair::generate(),
            };
            info!(state = %state.address(), "initializing program state");
            let args = InitializeArgs {
                name,
                symbol,
                gateway,
                gas_limit,
                uniswap_router,
            };
            let receipt = connect(config)?
                .initialize(&Signers::from(&wallet), &state, &args)
                .await?;
            output::print(&receipt)
        }
        Command::SetGateway { wallet, gateway } => {
            let (key, state) = open(&wallet)?;
            let receipt = connect(config)?
                .set_gateway(&Signers::from(&key), state, gateway)
                .await?;
            output::print(&receipt)
        }
        Command::SetGasLimit { wallet, gas_limit } => {
            let (key, state) = open(&wallet)?;
            let receipt = connect(config)?
                .set_gas_limit(&Signers::from(&key), state, gas_limit)
                .await?;
            output::print(&receipt)
        }
        Command::Connect {
            wallet,
            chain_id,
            contract,
        } => {
            let (key, state) = open(&wallet)?;
            let receipt = connect(config)?
                .set_connected(&Signers::from(&key), state, chain_id, &contract)
                .await?;
            output::print(&receipt)
        }
        Command::Pause { wallet } => {
            let (key, state) = open(&wallet)?;
            output::print(&connect(config)?.pause(&Signers::from(&key), state).await?)
        }
        Command::Unpause { wallet } => {
            let (key, state) = open(&wallet)?;
            output::print(&connect(config)?.unpause(&Signers::from(&key), state).await?)
        }
        Command::Mint {
            wallet,
            recipient,
            uri,
        } => {
            let (key, state) = open(&wallet)?;
            let recipient = recipient.unwrap_or_else(|| key.address());
            let receipt = connect(config)?
                .safe_mint(&Signers::from(&key), state, recipient, &uri)
                .await?;
            output::print(&receipt)
        }
        Command::Burn {
            wallet,
            mint,
            token_id,
        } => {
            let (key, state) = open(&wallet)?;
            let receipt = connect(config)?
                .burn(&Signers::from(&key), state, mint, token_id)
                .await?;
            output::print(&receipt)
        }
        Command::Transfer {
            wallet,
            mint,
            token_id,
            receiver,
            destination_chain_id,
        } => {
            let (key, state) = open(&wallet)?;
            let receipt = connect(config)?
                .transfer_cross_chain(
                    &Signers::from(&key),
                    state,
                    mint,
                    token_id,
                    &receiver,
                    destination_chain_id,
                )
                .await?;
            output::print(&receipt)
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_json_file(path)?,
        None => ClientConfig::for_cluster(cli.cluster),
    };
    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(program_id) = cli.program_id {
        config.program_id = program_id;
    }
    if let Some(commitment) = cli.commitment {
        config.commitment = commitment;
    }
    config.validate()?;
    Ok(config)
}

fn connect(config: ClientConfig) -> Result<UniversalNftClient<RpcLedger>> {
    let ledger = RpcLedger::new(&config)?;
    info!(rpc = ledger.url(), program = %config.program_id, "connected");
    Ok(UniversalNftClient::new(ledger, config))
}

fn open(wallet: &Wallet) -> Result<(Keypair, Address)> {
    Ok((keys::load(&wallet.keypair)?, wallet.state))
}

fn pda(config: &ClientConfig, kind: PdaKind) -> Result<()> {
    let program = &config.program_id;
    let (address, bump) = match kind {
        PdaKind::Connection { chain_id } => with_bump(connection_address(program, chain_id)?),
        PdaKind::Nft { token_id } => with_bump(nft_data_address(program, token_id)?),
        PdaKind::Enumerable { token_id } => with_bump(enumerable_address(program, token_id)?),
        PdaKind::Origin { mint, token_id } => {
            with_bump(nft_origin_address(program, &mint, token_id)?)
        }
        PdaKind::TokenAccount { owner, mint } => (associated_token_address(&owner, &mint)?, None),
        PdaKind::Metadata { mint } => (metadata_address(&mint)?, None),
        PdaKind::MasterEdition { mint } => (master_edition_address(&mint)?, None),
    };
    output::print(&json!({ "address": address, "bump": bump }))
}

fn with_bump((address, bump): (Address, u8)) -> (Address, Option<u8>) {
    (address, Some(bump))
}
