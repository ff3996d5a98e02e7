//! High-level Universal NFT operations.
//!
//! Each flow derives every account it touches, builds one instruction, and
//! sends it through [`TransactionSubmitter`]. Reads decode raw account data
//! into the typed records from [`crate::accounts`].

use evm_connector::{ForeignChain, Receipt};
use sol_codec::{Address, Instruction, Keypair};
use tracing::{info, instrument};

use crate::accounts::{
    AccountRecord, ChainConnection, EnumerableRecord, NftOrigin, NftRecord, ProgramState,
};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::instructions::{
    self, AccountSet, AdminAccounts, BurnAccounts, InitializeAccounts, InitializeArgs,
    MintParties, ReceiveAccounts, ReceiveArgs, RevertAccounts, SafeMintAccounts,
    SetConnectedAccounts, TransferCrossChainAccounts,
};
use crate::ledger::Ledger;
use crate::seeds::{connection_address, enumerable_address, nft_data_address, nft_origin_address};
use crate::signer::WalletSigner;
use crate::submit::TransactionSubmitter;
use crate::types::{FlowReceipt, Submission};

/// Who signs a flow: the wallet that pays and authorizes, plus any local
/// keypairs the caller wants added (a submit-only wallet needs its fee payer
/// key here).
#[derive(Debug, Clone)]
pub struct Signers<'a> {
    pub wallet: WalletSigner<'a>,
    pub local: Vec<&'a Keypair>,
}

impl<'a> Signers<'a> {
    pub fn new(wallet: WalletSigner<'a>) -> Self {
        Self {
            wallet,
            local: Vec::new(),
        }
    }

    pub fn with_local(mut self, keypair: &'a Keypair) -> Self {
        self.local.push(keypair);
        self
    }
}

impl<'a> From<&'a Keypair> for Signers<'a> {
    fn from(keypair: &'a Keypair) -> Self {
        Self::new(WalletSigner::from(keypair))
    }
}

impl<'a> From<WalletSigner<'a>> for Signers<'a> {
    fn from(wallet: WalletSigner<'a>) -> Self {
        Self::new(wallet)
    }
}

pub struct UniversalNftClient<L> {
    ledger: L,
    config: ClientConfig,
}

impl<L: Ledger> UniversalNftClient<L> {
    pub fn new(ledger: L, config: ClientConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn program_id(&self) -> &Address {
        &self.config.program_id
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch and decode `address` as `T`; `None` if the account is absent.
    ///
    /// A read never changes ledger state, so its transport failures are
    /// reported as [`ClientError::Unavailable`].
    pub async fn fetch_account<T: AccountRecord>(
        &self,
        address: &Address,
    ) -> Result<Option<T>, ClientError> {
        let data = self
            .ledger
            .get_account(address)
            .await
            .map_err(ClientError::before_submission)?;
        match data {
            Some(data) => Ok(Some(T::decode(&data)?)),
            None => Ok(None),
        }
    }

    pub async fn fetch_program_state(&self, state: &Address) -> Result<Option<ProgramState>, ClientError> {
        self.fetch_account(state).await
    }

    pub async fn total_supply(&self, state: &Address) -> Result<Option<u64>, ClientError> {
        Ok(self.fetch_program_state(state).await?.map(|s| s.total_supply))
    }

    pub async fn is_paused(&self, state: &Address) -> Result<Option<bool>, ClientError> {
        Ok(self.fetch_program_state(state).await?.map(|s| s.is_paused))
    }

    pub async fn fetch_enumerable(&self, token_id: u64) -> Result<Option<EnumerableRecord>, ClientError> {
        let (address, _) = enumerable_address(self.program_id(), token_id)?;
        self.fetch_account(&address).await
    }

    /// Sequence number recorded in the enumerable entry for `token_id`.
    pub async fn token_of_owner_by_index(&self, token_id: u64) -> Result<Option<u64>, ClientError> {
        Ok(self.fetch_enumerable(token_id).await?.map(|e| e.token_id))
    }

    pub async fn fetch_connection(&self, chain_id: u64) -> Result<Option<ChainConnection>, ClientError> {
        let (address, _) = connection_address(self.program_id(), chain_id)?;
        self.fetch_account(&address).await
    }

    pub async fn fetch_nft(&self, token_id: u64) -> Result<Option<NftRecord>, ClientError> {
        let (address, _) = nft_data_address(self.program_id(), token_id)?;
        self.fetch_account(&address).await
    }

    pub async fn fetch_origin(&self, mint: &Address, token_id: u64) -> Result<Option<NftOrigin>, ClientError> {
        let (address, _) = nft_origin_address(self.program_id(), mint, token_id)?;
        self.fetch_account(&address).await
    }

    // -----------------------------------------------------------------------
    // Flows
    // -----------------------------------------------------------------------

    /// Send prepared instructions through the submission pipeline.
    pub async fn send(
        &self,
        instructions: &[Instruction],
        signers: &Signers<'_>,
        fresh: &[&Keypair],
    ) -> Result<Submission, ClientError> {
        let local: Vec<&Keypair> = signers.local.iter().chain(fresh).copied().collect();
        TransactionSubmitter::new(&self.ledger, &self.config)
            .send(instructions, signers.wallet, &local)
            .await
    }

    async fn run(
        &self,
        instruction: Instruction,
        accounts: &impl AccountSet,
        signers: &Signers<'_>,
        fresh: &[&Keypair],
        token_id: Option<u64>,
    ) -> Result<FlowReceipt, ClientError> {
        let submission = self.send(&[instruction], signers, fresh).await?;
        Ok(FlowReceipt {
            submission,
            accounts: accounts
                .labeled()
                .into_iter()
                .map(|(name, address)| (name.to_string(), address))
                .collect(),
            token_id,
        })
    }

    fn admin(&self, state: Address, signers: &Signers<'_>) -> AdminAccounts {
        AdminAccounts {
            state,
            authority: signers.wallet.address(),
        }
    }

    /// Create the program state in the fresh `state` account, owned by the
    /// wallet.
    #[instrument(skip_all, fields(state = %state.address()))]
    pub async fn initialize(
        &self,
        signers: &Signers<'_>,
        state: &Keypair,
        args: &InitializeArgs,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = InitializeAccounts {
            state: state.address(),
            initial_owner: signers.wallet.address(),
        };
        let ix = instructions::initialize(self.program_id(), &accounts, args)?;
        self.run(ix, &accounts, signers, &[state], None).await
    }

    #[instrument(skip_all, fields(state = %state, gateway = %gateway))]
    pub async fn set_gateway(
        &self,
        signers: &Signers<'_>,
        state: Address,
        gateway: Address,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = self.admin(state, signers);
        let ix = instructions::set_gateway(self.program_id(), &accounts, &gateway)?;
        self.run(ix, &accounts, signers, &[], None).await
    }

    #[instrument(skip_all, fields(state = %state, gas_limit = gas_limit))]
    pub async fn set_gas_limit(
        &self,
        signers: &Signers<'_>,
        state: Address,
        gas_limit: u64,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = self.admin(state, signers);
        let ix = instructions::set_gas_limit(self.program_id(), &accounts, gas_limit)?;
        self.run(ix, &accounts, signers, &[], None).await
    }

    /// Record `contract_address` as the counterpart on `chain_id`.
    #[instrument(skip_all, fields(state = %state, chain_id = chain_id))]
    pub async fn set_connected(
        &self,
        signers: &Signers<'_>,
        state: Address,
        chain_id: u64,
        contract_address: &str,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = SetConnectedAccounts::derive(
            self.program_id(),
            state,
            signers.wallet.address(),
            chain_id,
        )?;
        let ix = instructions::set_connected(self.program_id(), &accounts, chain_id, contract_address)?;
        self.run(ix, &accounts, signers, &[], None).await
    }

    #[instrument(skip_all, fields(state = %state))]
    pub async fn pause(&self, signers: &Signers<'_>, state: Address) -> Result<FlowReceipt, ClientError> {
        let accounts = self.admin(state, signers);
        let ix = instructions::pause(self.program_id(), &accounts)?;
        self.run(ix, &accounts, signers, &[], None).await
    }

    #[instrument(skip_all, fields(state = %state))]
    pub async fn unpause(&self, signers: &Signers<'_>, state: Address) -> Result<FlowReceipt, ClientError> {
        let accounts = self.admin(state, signers);
        let ix = instructions::unpause(self.program_id(), &accounts)?;
        self.run(ix, &accounts, signers, &[], None).await
    }

    /// Mint the next item to `recipient`. The wallet pays and acts as both
    /// authority and mint authority; a fresh mint keypair is generated.
    #[instrument(skip_all, fields(state = %state, recipient = %recipient))]
    pub async fn safe_mint(
        &self,
        signers: &Signers<'_>,
        state: Address,
        recipient: Address,
        uri: &str,
    ) -> Result<FlowReceipt, ClientError> {
        let token_id = self
            .fetch_program_state(&state)
            .await?
            .ok_or(ClientError::AccountNotFound(state))?
            .next_token_id;
        let mint = Keypair::generate();
        info!(token_id, mint = %mint.address(), "minting");

        let accounts = SafeMintAccounts::derive(
            self.program_id(),
            state,
            mint.address(),
            token_id,
            &self.parties(recipient, signers),
        )?;
        let ix = instructions::safe_mint(self.program_id(), &accounts, uri)?;
        self.run(ix, &accounts, signers, &[&mint], Some(token_id)).await
    }

    /// Burn `token_id` held by the wallet.
    #[instrument(skip_all, fields(state = %state, mint = %mint, token_id = token_id))]
    pub async fn burn(
        &self,
        signers: &Signers<'_>,
        state: Address,
        mint: Address,
        token_id: u64,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = BurnAccounts::derive(
            self.program_id(),
            state,
            mint,
            signers.wallet.address(),
            token_id,
        )?;
        let ix = instructions::burn_token(self.program_id(), &accounts, token_id)?;
        self.run(ix, &accounts, signers, &[], Some(token_id)).await
    }

    /// Lock `token_id` for relay to `receiver` on `destination_chain_id`.
    #[instrument(skip_all, fields(state = %state, token_id = token_id, destination = destination_chain_id))]
    pub async fn transfer_cross_chain(
        &self,
        signers: &Signers<'_>,
        state: Address,
        mint: Address,
        token_id: u64,
        receiver: &str,
        destination_chain_id: u64,
    ) -> Result<FlowReceipt, ClientError> {
        let accounts = TransferCrossChainAccounts::derive(
            self.program_id(),
            state,
            mint,
            signers.wallet.address(),
            token_id,
        )?;
        let ix = instructions::transfer_cross_chain(
            self.program_id(),
            &accounts,
            token_id,
            receiver,
            destination_chain_id,
        )?;
        self.run(ix, &accounts, signers, &[], Some(token_id)).await
    }

    /// Materialize an item arriving from another chain under a fresh mint.
    #[instrument(skip_all, fields(state = %state, recipient = %recipient, token_id = args.token_id))]
    pub async fn handle_cross_chain_receive(
        &self,
        signers: &Signers<'_>,
        state: Address,
        recipient: Address,
        args: &ReceiveArgs,
    ) -> Result<FlowReceipt, ClientError> {
        let mint = Keypair::generate();
        let accounts = ReceiveAccounts::derive(
            self.program_id(),
            state,
            mint.address(),
            args.token_id,
            &self.parties(recipient, signers),
        )?;
        let ix = instructions::handle_cross_chain_receive(self.program_id(), &accounts, args)?;
        self.run(ix, &accounts, signers, &[&mint], Some(args.token_id)).await
    }

    /// Re-create `token_id` for `original_owner` after a failed outbound
    /// transfer.
    #[instrument(skip_all, fields(state = %state, original_owner = %original_owner, token_id = token_id))]
    pub async fn revert_transfer(
        &self,
        signers: &Signers<'_>,
        state: Address,
        original_owner: Address,
        token_id: u64,
    ) -> Result<FlowReceipt, ClientError> {
        let mint = Keypair::generate();
        let accounts = RevertAccounts::derive(
            self.program_id(),
            state,
            mint.address(),
            token_id,
            &self.parties(original_owner, signers),
        )?;
        let ix = instructions::revert_transfer(self.program_id(), &accounts, token_id)?;
        self.run(ix, &accounts, signers, &[&mint], Some(token_id)).await
    }

    /// Register this program as the counterpart of `contract` on a foreign
    /// chain.
    pub async fn register_foreign_connection<F: ForeignChain>(
        &self,
        chain: &F,
        contract: &str,
        zrc20: &str,
    ) -> Result<Receipt, ClientError> {
        let receipt = chain
            .register_connection(contract, zrc20, self.program_id().as_bytes())
            .await?;
        info!(tx_hash = %receipt.tx_hash, block = receipt.block_number, "foreign connection registered");
        Ok(receipt)
    }

    fn parties(&self, recipient: Address, signers: &Signers<'_>) -> MintParties {
        let wallet = signers.wallet.address();
        MintParties {
            recipient,
            payer: wallet,
            authority: wallet,
            mint_authority: wallet,
        }
    }
}
