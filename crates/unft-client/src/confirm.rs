//! Confirmation resolution.
//!
//! The ledger's own confirmation path is tried first. If it errors for any
//! reason other than a definitive on-chain failure, the resolver falls back
//! to polling the signature status at a fixed interval for a bounded number
//! of attempts. Nothing here ever re-signs or resubmits.

use sol_codec::Signature;
use tracing::{debug, info, warn};

use crate::config::ConfirmConfig;
use crate::error::ClientError;
use crate::ledger::Ledger;
use crate::types::{Commitment, FreshnessAnchor, SignatureStatus, Submission};

#[derive(Debug, Clone, Copy)]
pub struct ConfirmationResolver {
    pub commitment: Commitment,
    pub config: ConfirmConfig,
}

impl ConfirmationResolver {
    pub fn new(commitment: Commitment, config: ConfirmConfig) -> Self {
        Self { commitment, config }
    }

    pub async fn resolve<L: Ledger>(
        &self,
        ledger: &L,
        signature: &Signature,
        anchor: &FreshnessAnchor,
    ) -> Result<Submission, ClientError> {
        match ledger.confirm(signature, anchor, self.commitment).await {
            Ok(status) => return self.accept(signature, status),
            Err(e @ ClientError::Failed { .. }) => return Err(e),
            Err(e) => {
                warn!(%signature, error = %e, "primary confirmation failed, falling back to polling");
            }
        }
        self.poll(ledger, signature).await
    }

    /// Bounded polling: `max_attempts` status queries `poll_interval` apart.
    pub async fn poll<L: Ledger>(
        &self,
        ledger: &L,
        signature: &Signature,
    ) -> Result<Submission, ClientError> {
        let mut last_status = None;

        for attempt in 1..=self.config.max_attempts {
            match ledger.signature_status(signature).await {
                Ok(Some(status)) if status.err.is_some() => {
                    return self.accept(signature, status);
                }
                Ok(Some(status)) if status.is_landed() => {
                    debug!(%signature, attempt, "landed while polling");
                    return self.accept(signature, status);
                }
                Ok(status) => last_status = status.or(last_status),
                Err(e) => warn!(%signature, attempt, error = %e, "status query failed"),
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.poll_interval()).await;
            }
        }

        warn!(%signature, attempts = self.config.max_attempts, "confirmation not observed");
        Err(ClientError::ConfirmationTimeout {
            signature: *signature,
            last_status,
        })
    }

    fn accept(&self, signature: &Signature, status: SignatureStatus) -> Result<Submission, ClientError> {
        if let Some(reason) = status.err {
            warn!(%signature, %reason, state = "failed", "transaction failed");
            return Err(ClientError::Failed {
                signature: *signature,
                reason,
            });
        }
        let commitment = status.confirmation_status.unwrap_or(Commitment::Finalized);
        info!(%signature, slot = status.slot, %commitment, state = "confirmed", "transaction confirmed");
        Ok(Submission {
            signature: *signature,
            slot: Some(status.slot),
            commitment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use sol_codec::transaction::Blockhash;
    use sol_codec::Address;

    /// Primary path always errors; status queries replay a script.
    struct Scripted {
        statuses: Mutex<VecDeque<Option<SignatureStatus>>>,
        queries: Mutex<u32>,
        primary: fn() -> Result<SignatureStatus, ClientError>,
    }

    impl Scripted {
        fn new(statuses: Vec<Option<SignatureStatus>>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                queries: Mutex::new(0),
                primary: || Err(ClientError::Rpc("subscriptions unsupported".into())),
            }
        }
    }

    impl Ledger for Scripted {
        async fn get_account(&self, _: &Address) -> Result<Option<Vec<u8>>, ClientError> {
            Ok(None)
        }

        async fn latest_anchor(&self) -> Result<FreshnessAnchor, ClientError> {
            Ok(anchor())
        }

        async fn submit(&self, _: Vec<u8>) -> Result<Signature, ClientError> {
            Ok(Signature::new([1; 64]))
        }

        async fn signature_status(
            &self,
            _: &Signature,
        ) -> Result<Option<SignatureStatus>, ClientError> {
            *self.queries.lock().unwrap() += 1;
            Ok(self.statuses.lock().unwrap().pop_front().flatten())
        }

        async fn confirm(
            &self,
            _: &Signature,
            _: &FreshnessAnchor,
            _: Commitment,
        ) -> Result<SignatureStatus, ClientError> {
            (self.primary)()
        }
    }

    fn anchor() -> FreshnessAnchor {
        FreshnessAnchor {
            blockhash: Blockhash::new([2; 32]),
            last_valid_block_height: 100,
        }
    }

    fn status(confirmations: Option<u64>, err: Option<&str>) -> SignatureStatus {
        SignatureStatus {
            slot: 77,
            confirmations,
            confirmation_status: Some(Commitment::Confirmed),
            err: err.map(str::to_string),
        }
    }

    fn resolver(max_attempts: u32) -> ConfirmationResolver {
        ConfirmationResolver::new(
            Commitment::Confirmed,
            ConfirmConfig {
                poll_interval_ms: 1_000,
                max_attempts,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn primary_success_skips_polling() {
        let mut ledger = Scripted::new(vec![]);
        ledger.primary = || Ok(status(Some(1), None));
        let sig = Signature::new([9; 64]);
        let submission = resolver(30).resolve(&ledger, &sig, &anchor()).await.unwrap();
        assert_eq!(submission.slot, Some(77));
        assert_eq!(*ledger.queries.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn primary_failure_is_not_retried_by_polling() {
        let mut ledger = Scripted::new(vec![]);
        ledger.primary = || {
            Err(ClientError::Failed {
                signature: Signature::new([9; 64]),
                reason: "custom program error: 0x1".into(),
            })
        };
        let err = resolver(30)
            .resolve(&ledger, &Signature::new([9; 64]), &anchor())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Failed { .. }));
        assert_eq!(*ledger.queries.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_stops_at_first_landed_status() {
        let ledger = Scripted::new(vec![
            None,
            Some(status(Some(0), None)),
            Some(status(Some(2), None)),
        ]);
        let sig = Signature::new([9; 64]);
        let submission = resolver(30).resolve(&ledger, &sig, &anchor()).await.unwrap();
        assert_eq!(submission.signature, sig);
        assert_eq!(*ledger.queries.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rooted_status_counts_as_landed() {
        let ledger = Scripted::new(vec![Some(status(None, None))]);
        assert!(resolver(3)
            .resolve(&ledger, &Signature::new([9; 64]), &anchor())
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_reports_on_chain_error() {
        let ledger = Scripted::new(vec![Some(status(Some(1), Some("InstructionError")))]);
        let err = resolver(30)
            .resolve(&ledger, &Signature::new([9; 64]), &anchor())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Failed { ref reason, .. } if reason == "InstructionError"));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_time_out_with_last_status() {
        let seen = status(Some(0), None);
        let ledger = Scripted::new(vec![Some(seen.clone())]);
        let sig = Signature::new([9; 64]);
        let started = tokio::time::Instant::now();

        let err = resolver(5).resolve(&ledger, &sig, &anchor()).await.unwrap_err();

        assert_eq!(*ledger.queries.lock().unwrap(), 5);
        let waited = started.elapsed();
        assert!(waited >= std::time::Duration::from_secs(4));
        assert!(waited < std::time::Duration::from_secs(5));
        match err {
            ClientError::ConfirmationTimeout {
                signature,
                last_status,
            } => {
                assert_eq!(signature, sig);
                assert_eq!(last_status, Some(seen));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
