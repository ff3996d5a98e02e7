//! Transaction assembly and submission.
//!
//! One attempt moves through
//! `Built -> Signed -> Submitted -> {Confirmed | Expired | Failed | Unknown}`.
//! A sign-and-submit wallet collapses `Signed` and `Submitted` into one step.
//! Each call builds exactly one transaction against a freshly fetched anchor
//! and submits it at most once.

use std::fmt;

use sol_codec::{Instruction, Keypair, Signature, Transaction};
use tracing::{debug, info};

use crate::confirm::ConfirmationResolver;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ledger::Ledger;
use crate::signer::WalletSigner;
use crate::types::{FreshnessAnchor, Submission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Expired,
    Failed,
    /// Submitted, but neither landing nor expiry was observed.
    Unknown,
}

impl AttemptState {
    /// Terminal state for a submitted attempt that did not confirm.
    fn after(error: &ClientError) -> Self {
        match error {
            ClientError::Failed { .. } => AttemptState::Failed,
            ClientError::Expired { .. } => AttemptState::Expired,
            _ => AttemptState::Unknown,
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttemptState::Built => "built",
            AttemptState::Signed => "signed",
            AttemptState::Submitted => "submitted",
            AttemptState::Confirmed => "confirmed",
            AttemptState::Expired => "expired",
            AttemptState::Failed => "failed",
            AttemptState::Unknown => "unknown",
        })
    }
}

pub struct TransactionSubmitter<'a, L> {
    ledger: &'a L,
    resolver: ConfirmationResolver,
}

impl<'a, L: Ledger> TransactionSubmitter<'a, L> {
    pub fn new(ledger: &'a L, config: &ClientConfig) -> Self {
        Self {
            ledger,
            resolver: ConfirmationResolver::new(config.commitment, config.confirm),
        }
    }

    /// Build, sign, submit and confirm `instructions` as one atomic
    /// transaction paid for by `wallet`.
    ///
    /// `extra_signers` are local keypairs for fresh accounts the instructions
    /// create (mints, state accounts); they sign before the wallet does.
    pub async fn send(
        &self,
        instructions: &[Instruction],
        wallet: WalletSigner<'_>,
        extra_signers: &[&Keypair],
    ) -> Result<Submission, ClientError> {
        let anchor = self
            .ledger
            .latest_anchor()
            .await
            .map_err(ClientError::before_submission)?;
        let mut tx = Transaction::new_with_payer(instructions, &wallet.address(), anchor.blockhash)?;
        transition(AttemptState::Built, None, &anchor);

        tx.partial_sign(extra_signers)?;

        let signature = match wallet {
            WalletSigner::SignOnly(signer) => {
                let signed = signer.sign_transaction(tx).await?;
                let wire = fully_signed_wire(&signed)?;
                transition(AttemptState::Signed, signed.id().as_ref(), &anchor);
                self.ledger.submit(wire).await?
            }
            WalletSigner::SignAndSubmit(agent) => agent.sign_and_submit(tx).await?,
            WalletSigner::SubmitOnly(relay) => {
                let wire = fully_signed_wire(&tx)?;
                transition(AttemptState::Signed, tx.id().as_ref(), &anchor);
                relay.submit(wire).await?
            }
        };
        transition(AttemptState::Submitted, Some(&signature), &anchor);

        match self.resolver.resolve(self.ledger, &signature, &anchor).await {
            Ok(submission) => {
                transition(AttemptState::Confirmed, Some(&signature), &anchor);
                Ok(submission)
            }
            Err(e) => {
                transition(AttemptState::after(&e), Some(&signature), &anchor);
                Err(e)
            }
        }
    }
}

/// Require every slot to hold a valid signature and serialize.
fn fully_signed_wire(tx: &Transaction) -> Result<Vec<u8>, ClientError> {
    let missing = tx.missing_signers();
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(ClientError::Signing(format!(
            "missing signatures for {}",
            list.join(", ")
        )));
    }
    tx.verify_signatures()?;
    Ok(tx.serialize()?)
}

fn transition(state: AttemptState, signature: Option<&Signature>, anchor: &FreshnessAnchor) {
    match signature {
        Some(signature) => info!(%state, %signature, "transaction {state}"),
        None => debug!(
            %state,
            blockhash = %anchor.blockhash,
            last_valid_block_height = anchor.last_valid_block_height,
            "transaction {state}"
        ),
    }
}
