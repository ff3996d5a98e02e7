//! Wallet capabilities.
//!
//! A wallet can do one of three things with a transaction the client has
//! built: sign it and hand it back, sign and submit it itself, or relay an
//! already fully signed transaction. [`WalletSigner`] tags which one a caller
//! supplies so a single submission path serves all three.

use std::future::Future;
use std::pin::Pin;

use sol_codec::{Address, Keypair, Signature, Transaction};

use crate::error::ClientError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Signs and returns the transaction; the client submits it.
pub trait SignTransaction: Send + Sync {
    fn address(&self) -> Address;

    fn sign_transaction(&self, tx: Transaction) -> BoxFuture<'_, Result<Transaction, ClientError>>;
}

/// Signs and submits in one step, returning the submission identifier.
pub trait SignAndSubmit: Send + Sync {
    fn address(&self) -> Address;

    fn sign_and_submit(&self, tx: Transaction) -> BoxFuture<'_, Result<Signature, ClientError>>;
}

/// Relays fully signed wire bytes. The fee payer's key must be among the
/// client-side signers.
pub trait SubmitOnly: Send + Sync {
    fn address(&self) -> Address;

    fn submit(&self, wire: Vec<u8>) -> BoxFuture<'_, Result<Signature, ClientError>>;
}

#[derive(Clone, Copy)]
pub enum WalletSigner<'a> {
    SignOnly(&'a dyn SignTransaction),
    SignAndSubmit(&'a dyn SignAndSubmit),
    SubmitOnly(&'a dyn SubmitOnly),
}

impl WalletSigner<'_> {
    /// The wallet's public identity; pays fees and acts as authority.
    pub fn address(&self) -> Address {
        match self {
            WalletSigner::SignOnly(s) => s.address(),
            WalletSigner::SignAndSubmit(s) => s.address(),
            WalletSigner::SubmitOnly(s) => s.address(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WalletSigner::SignOnly(_) => "sign-only",
            WalletSigner::SignAndSubmit(_) => "sign-and-submit",
            WalletSigner::SubmitOnly(_) => "submit-only",
        }
    }
}

impl std::fmt::Debug for WalletSigner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSigner")
            .field("kind", &self.kind())
            .field("address", &self.address())
            .finish()
    }
}

impl<'a> From<&'a Keypair> for WalletSigner<'a> {
    fn from(keypair: &'a Keypair) -> Self {
        WalletSigner::SignOnly(keypair)
    }
}

/// Local key material signs directly.
impl SignTransaction for Keypair {
    fn address(&self) -> Address {
        Keypair::address(self)
    }

    fn sign_transaction(&self, mut tx: Transaction) -> BoxFuture<'_, Result<Transaction, ClientError>> {
        let signed = tx.partial_sign(&[self]).map(|()| tx).map_err(ClientError::from);
        Box::pin(std::future::ready(signed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sol_codec::transaction::{Blockhash, Instruction};

    fn unsigned_for(payer: &Address) -> Transaction {
        Transaction::new_with_payer(
            &[Instruction {
                program_id: Address::new([5; 32]),
                accounts: vec![],
                data: vec![1],
            }],
            payer,
            Blockhash::new([1; 32]),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn keypair_signs_its_slot() {
        let kp = Keypair::from_seed(&[4; 32]);
        let wallet = WalletSigner::from(&kp);
        assert_eq!(wallet.address(), kp.address());
        assert_eq!(wallet.kind(), "sign-only");

        let WalletSigner::SignOnly(signer) = wallet else {
            panic!("expected sign-only");
        };
        let signed = signer
            .sign_transaction(unsigned_for(&kp.address()))
            .await
            .unwrap();
        assert!(signed.is_fully_signed());
        signed.verify_signatures().unwrap();
    }

    #[tokio::test]
    async fn keypair_refuses_foreign_transaction() {
        let kp = Keypair::from_seed(&[4; 32]);
        let other = Keypair::from_seed(&[5; 32]);
        let err = SignTransaction::sign_transaction(&kp, unsigned_for(&other.address()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Signing(_)));
    }

    #[test]
    fn debug_shows_kind_and_address() {
        let kp = Keypair::from_seed(&[4; 32]);
        let rendered = format!("{:?}", WalletSigner::from(&kp));
        assert!(rendered.contains("sign-only"));
        assert!(rendered.contains(&kp.address().to_string()));
    }
}
