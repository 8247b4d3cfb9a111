//! SOFI - Suspicious activity scoring for a mock digital bank
//!
//! The core is a rule-based scorer that flags proposed payments:
//! - Additive point rules over amount, payee keywords and known payees
//! - A small random review chance drawn from an injected random source
//! - Simulated location/device details sampled for flagged results
//!
//! Around it sits a small in-memory ledger that debits balances, tracks
//! transaction status and resolves flagged transactions after review.

pub mod config;
pub mod errors;
pub mod fraud_detection;
pub mod random;
pub mod reference;
pub mod transaction;
pub mod utils;
pub mod verification;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    fraud_detection::{ScoreVerdict, SuspiciousActivityScorer, TransactionCandidate},
    random::{RandomSource, RngSource},
    reference::ReferenceData,
    transaction::{Ledger, PaymentRequest, Resolution, WithdrawalDestination},
};

/// Main SOFI structure: scorer, ledger and the random source they share
pub struct SofiBank {
    config: config::SofiConfig,
    scorer: SuspiciousActivityScorer,
    ledger: Ledger,
    rng: Box<dyn RandomSource + Send>,
}

/// Transaction record owned by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub payee: String,
    pub amount: f64,
    pub memo: String,
    pub created_at: DateTime<Utc>,
    pub status: TransactionStatus,
    pub is_suspicious: bool,
    pub location: Option<String>,
    pub device: Option<String>,
    pub fraud_score: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Payment,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Initiated,
    Pending,
    Completed,
    Cancelled,
}

impl SofiBank {
    pub fn new(config: config::SofiConfig, reference: ReferenceData) -> Self {
        Self::with_random_source(config, reference, Box::new(RngSource::from_entropy()))
    }

    /// Build with an explicit random source, e.g. a seeded one for replayable runs
    pub fn with_random_source(
        config: config::SofiConfig,
        reference: ReferenceData,
        rng: Box<dyn RandomSource + Send>,
    ) -> Self {
        Self {
            scorer: SuspiciousActivityScorer::new(&config, reference),
            ledger: Ledger::new(config.opening_balance),
            rng,
            config,
        }
    }

    pub fn config(&self) -> &config::SofiConfig {
        &self.config
    }

    pub fn scorer(&self) -> &SuspiciousActivityScorer {
        &self.scorer
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }

    /// Score a candidate without recording anything
    pub fn score(&mut self, candidate: &TransactionCandidate) -> Result<ScoreVerdict, errors::SofiError> {
        self.scorer.score(candidate, self.rng.as_mut())
    }

    pub fn pay(&mut self, request: PaymentRequest) -> Result<Transaction, errors::SofiError> {
        self.ledger.submit_payment(request, &self.scorer, self.rng.as_mut())
    }

    pub fn withdraw(&mut self, amount: f64, destination: WithdrawalDestination) -> Result<Transaction, errors::SofiError> {
        self.ledger.submit_withdrawal(amount, destination, &self.scorer, self.rng.as_mut())
    }

    pub fn settle(&mut self, id: Uuid) -> Result<Transaction, errors::SofiError> {
        self.ledger.settle(id)
    }

    pub fn resolve(&mut self, id: Uuid, resolution: Resolution) -> Result<Transaction, errors::SofiError> {
        self.ledger.resolve(id, resolution)
    }

    pub fn history(&self) -> &[Transaction] {
        self.ledger.history()
    }

    pub fn pending_review(&self) -> Vec<&Transaction> {
        self.ledger.pending_review()
    }

    /// Get scoring and review statistics for monitoring
    pub fn get_statistics(&self) -> HashMap<String, f64> {
        self.ledger.get_statistics()
    }
}
