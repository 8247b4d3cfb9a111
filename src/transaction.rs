//! Transaction ledger for the SOFI core
//! Owns balance, transaction identity and status, and the review flow for flagged payments

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::{Result, SofiError},
    fraud_detection::{SuspiciousActivityScorer, TransactionCandidate, ScoreVerdict},
    random::RandomSource,
    utils::sanitize_for_logging,
    verification::{verify_business, BusinessDetails, VerificationStatus},
    Transaction, TransactionKind, TransactionStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payee: String,
    pub amount: f64,
    #[serde(default)]
    pub memo: String,
    /// When present the payee must verify as a known business before sending
    #[serde(default)]
    pub business: Option<BusinessDetails>,
}

impl PaymentRequest {
    pub fn new(payee: &str, amount: f64, memo: &str) -> Self {
        Self {
            payee: payee.to_string(),
            amount,
            memo: memo.to_string(),
            business: None,
        }
    }

    pub fn with_business(mut self, details: BusinessDetails) -> Self {
        self.business = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalDestination {
    Bank,
    MobileWallet,
    Agent,
}

impl WithdrawalDestination {
    /// Payee name recorded on the withdrawal
    pub fn payee(&self) -> &'static str {
        match self {
            WithdrawalDestination::Bank => "Linked Business Bank",
            WithdrawalDestination::MobileWallet => "Mobile Wallet Deposit",
            WithdrawalDestination::Agent => "Cheque Flow Agent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WithdrawalDestination::Bank => "bank",
            WithdrawalDestination::MobileWallet => "wallet",
            WithdrawalDestination::Agent => "agent",
        }
    }
}

impl std::str::FromStr for WithdrawalDestination {
    type Err = SofiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bank" => Ok(WithdrawalDestination::Bank),
            "wallet" => Ok(WithdrawalDestination::MobileWallet),
            "agent" => Ok(WithdrawalDestination::Agent),
            _ => Err(SofiError::invalid_input("destination", "must be bank, wallet or agent")),
        }
    }
}

/// Outcome of a manual review of a flagged transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Safe,
    Fraud,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerStatistics {
    pub transactions_scored: u64,
    pub transactions_flagged: u64,
    pub resolved_safe: u64,
    pub resolved_fraud: u64,
}

#[derive(Debug)]
pub struct Ledger {
    balance: f64,
    // newest first
    transactions: Vec<Transaction>,
    statistics: LedgerStatistics,
}

impl Ledger {
    pub fn new(opening_balance: f64) -> Self {
        Self {
            balance: opening_balance,
            transactions: Vec::new(),
            statistics: LedgerStatistics::default(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Score and record a payment. The balance is debited immediately, flagged or not.
    pub fn submit_payment<R: RandomSource + ?Sized>(
        &mut self,
        request: PaymentRequest,
        scorer: &SuspiciousActivityScorer,
        rng: &mut R,
    ) -> Result<Transaction> {
        let mut candidate = TransactionCandidate::new(&request.payee, request.amount);
        candidate.validate()?;
        self.check_funds(candidate.amount)?;

        if let Some(details) = request.business {
            match verify_business(scorer.reference(), &request.payee, &details) {
                VerificationStatus::Verified(_) => {}
                VerificationStatus::Incomplete | VerificationStatus::Failed => {
                    warn!(payee = %sanitize_for_logging(&request.payee), "business verification failed");
                    return Err(SofiError::BusinessVerificationFailed {
                        payee: request.payee,
                    });
                }
            }
            candidate = candidate.with_business(details);
        }

        let verdict = scorer.score(&candidate, rng)?;
        Ok(self.record(TransactionKind::Payment, candidate, request.memo, verdict))
    }

    /// Score and record a withdrawal to one of the fixed destinations.
    pub fn submit_withdrawal<R: RandomSource + ?Sized>(
        &mut self,
        amount: f64,
        destination: WithdrawalDestination,
        scorer: &SuspiciousActivityScorer,
        rng: &mut R,
    ) -> Result<Transaction> {
        let candidate = TransactionCandidate::new(destination.payee(), amount);
        candidate.validate()?;
        self.check_funds(amount)?;

        let verdict = scorer.score(&candidate, rng)?;
        let memo = format!("Withdrawal via {}", destination.label());
        Ok(self.record(TransactionKind::Withdrawal, candidate, memo, verdict))
    }

    /// Advance an unflagged, freshly initiated transaction: payments go to
    /// `Pending`, withdrawals to `Completed`.
    pub fn settle(&mut self, id: Uuid) -> Result<Transaction> {
        let transaction = self.find_mut(id)?;

        if transaction.is_suspicious {
            return Err(SofiError::InvalidTransactionState {
                current_state: "awaiting suspicious activity review".to_string(),
            });
        }
        if transaction.status != TransactionStatus::Initiated {
            return Err(SofiError::InvalidTransactionState {
                current_state: format!("{:?}", transaction.status),
            });
        }

        transaction.status = match transaction.kind {
            TransactionKind::Payment => TransactionStatus::Pending,
            TransactionKind::Withdrawal => TransactionStatus::Completed,
        };
        Ok(transaction.clone())
    }

    /// Resolve a flagged transaction. Fraud cancels and refunds, at most once.
    pub fn resolve(&mut self, id: Uuid, resolution: Resolution) -> Result<Transaction> {
        let transaction = self.find_mut(id)?;

        if !transaction.is_suspicious {
            return Err(SofiError::InvalidTransactionState {
                current_state: format!("{:?} and not flagged for review", transaction.status),
            });
        }

        let mut refund = 0.0;
        match resolution {
            Resolution::Safe => {
                transaction.status = match (transaction.kind, transaction.status) {
                    (TransactionKind::Withdrawal, _) => TransactionStatus::Completed,
                    (TransactionKind::Payment, TransactionStatus::Initiated) => TransactionStatus::Pending,
                    (TransactionKind::Payment, status) => status,
                };
            }
            Resolution::Fraud => {
                if transaction.status != TransactionStatus::Cancelled {
                    refund = transaction.amount;
                }
                transaction.status = TransactionStatus::Cancelled;
            }
        }
        transaction.is_suspicious = false;
        let resolved = transaction.clone();

        self.balance += refund;
        match resolution {
            Resolution::Safe => {
                self.statistics.resolved_safe += 1;
                info!(id = %id, "flagged transaction marked safe");
            }
            Resolution::Fraud => {
                self.statistics.resolved_fraud += 1;
                warn!(id = %id, refund, "flagged transaction reported as fraud");
            }
        }

        Ok(resolved)
    }

    /// All transactions, newest first
    pub fn history(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: Uuid) -> Result<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| SofiError::TransactionNotFound { id: id.to_string() })
    }

    /// Flagged transactions still waiting for a decision
    pub fn pending_review(&self) -> Vec<&Transaction> {
        self.transactions.iter().filter(|t| t.is_suspicious).collect()
    }

    pub fn get_statistics(&self) -> HashMap<String, f64> {
        let mut stats = HashMap::new();

        stats.insert("total_scored".to_string(), self.statistics.transactions_scored as f64);
        stats.insert("flagged".to_string(), self.statistics.transactions_flagged as f64);
        stats.insert("resolved_safe".to_string(), self.statistics.resolved_safe as f64);
        stats.insert("resolved_fraud".to_string(), self.statistics.resolved_fraud as f64);

        if self.statistics.transactions_scored > 0 {
            let flag_rate = (self.statistics.transactions_flagged as f64)
                / (self.statistics.transactions_scored as f64)
                * 100.0;
            stats.insert("flag_rate_percent".to_string(), flag_rate);
        }

        stats
    }

    fn check_funds(&self, amount: f64) -> Result<()> {
        if amount > self.balance {
            return Err(SofiError::InsufficientFunds {
                balance: self.balance,
                required: amount,
            });
        }
        Ok(())
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| SofiError::TransactionNotFound { id: id.to_string() })
    }

    fn record(
        &mut self,
        kind: TransactionKind,
        candidate: TransactionCandidate,
        memo: String,
        verdict: ScoreVerdict,
    ) -> Transaction {
        let transaction = Transaction {
            id: Uuid::new_v4(),
            kind,
            payee: candidate.payee,
            amount: candidate.amount,
            memo,
            created_at: Utc::now(),
            status: TransactionStatus::Initiated,
            is_suspicious: verdict.is_suspicious,
            location: verdict.location,
            device: verdict.device,
            fraud_score: verdict.score,
        };

        self.balance -= transaction.amount;
        self.statistics.transactions_scored += 1;
        if transaction.is_suspicious {
            self.statistics.transactions_flagged += 1;
        }

        info!(
            id = %transaction.id,
            kind = ?transaction.kind,
            amount = transaction.amount,
            suspicious = transaction.is_suspicious,
            "transaction recorded"
        );

        self.transactions.insert(0, transaction.clone());
        transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SofiConfig, random::SequenceSource, reference::ReferenceData};

    fn scorer() -> SuspiciousActivityScorer {
        SuspiciousActivityScorer::new(&SofiConfig::default(), ReferenceData::default())
    }

    #[test]
    fn test_payment_debits_and_settles() {
        let scorer = scorer();
        let mut ledger = Ledger::new(1000.0);
        let mut rng = SequenceSource::jitter_off();

        let tx = ledger
            .submit_payment(PaymentRequest::new("The Corner Cafe", 75.5, "Lunch"), &scorer, &mut rng)
            .unwrap();
        assert_eq!(tx.status, TransactionStatus::Initiated);
        assert!(!tx.is_suspicious);
        assert!((ledger.balance() - 924.5).abs() < 1e-9);

        let settled = ledger.settle(tx.id).unwrap();
        assert_eq!(settled.status, TransactionStatus::Pending);
        assert!(ledger.settle(tx.id).is_err());
    }

    #[test]
    fn test_flagged_payment_still_debits() {
        let scorer = scorer();
        let mut ledger = Ledger::new(5000.0);
        let mut rng = SequenceSource::jitter_off();

        let tx = ledger
            .submit_payment(PaymentRequest::new("QuickCash Services", 3500.0, "Urgent"), &scorer, &mut rng)
            .unwrap();
        assert!(tx.is_suspicious);
        assert!(tx.location.is_some());
        assert!((ledger.balance() - 1500.0).abs() < 1e-9);
        assert_eq!(ledger.pending_review().len(), 1);

        let result = ledger.settle(tx.id);
        assert!(matches!(result, Err(SofiError::InvalidTransactionState { .. })));
    }

    #[test]
    fn test_fraud_resolution_refunds_once() {
        let scorer = scorer();
        let mut ledger = Ledger::new(5000.0);
        let mut rng = SequenceSource::jitter_off();

        let tx = ledger
            .submit_payment(PaymentRequest::new("CoinVortex Exchange", 780.0, ""), &scorer, &mut rng)
            .unwrap();
        let resolved = ledger.resolve(tx.id, Resolution::Fraud).unwrap();
        assert_eq!(resolved.status, TransactionStatus::Cancelled);
        assert!(!resolved.is_suspicious);
        assert!((ledger.balance() - 5000.0).abs() < 1e-9);

        // No longer flagged, so a second resolution is refused
        assert!(ledger.resolve(tx.id, Resolution::Fraud).is_err());
        assert!((ledger.balance() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_safe_resolution_by_kind() {
        let scorer = scorer();
        let mut ledger = Ledger::new(20000.0);
        let mut rng = SequenceSource::jitter_off();

        let payment = ledger
            .submit_payment(PaymentRequest::new("Crypto Hub", 100.0, ""), &scorer, &mut rng)
            .unwrap();
        let resolved = ledger.resolve(payment.id, Resolution::Safe).unwrap();
        assert_eq!(resolved.status, TransactionStatus::Pending);

        // 3 (amount) + 2 (unknown payee)
        let withdrawal = ledger
            .submit_withdrawal(4500.0, WithdrawalDestination::MobileWallet, &scorer, &mut rng)
            .unwrap();
        assert!(withdrawal.is_suspicious);
        assert_eq!(withdrawal.memo, "Withdrawal via wallet");
        let resolved = ledger.resolve(withdrawal.id, Resolution::Safe).unwrap();
        assert_eq!(resolved.status, TransactionStatus::Completed);
        assert!((ledger.balance() - 15400.0).abs() < 1e-9);
    }

    #[test]
    fn test_withdrawal_settles_to_completed() {
        let scorer = scorer();
        let mut ledger = Ledger::new(1000.0);
        let mut rng = SequenceSource::jitter_off();

        let tx = ledger
            .submit_withdrawal(200.0, WithdrawalDestination::Agent, &scorer, &mut rng)
            .unwrap();
        assert_eq!(tx.payee, "Cheque Flow Agent");
        assert_eq!(ledger.settle(tx.id).unwrap().status, TransactionStatus::Completed);
    }

    #[test]
    fn test_insufficient_funds_and_invalid_input() {
        let scorer = scorer();
        let mut ledger = Ledger::new(100.0);
        let mut rng = SequenceSource::jitter_off();

        let result = ledger.submit_payment(PaymentRequest::new("Jane Doe", 300.0, ""), &scorer, &mut rng);
        assert!(matches!(result, Err(SofiError::InsufficientFunds { .. })));

        let result = ledger.submit_payment(PaymentRequest::new("", 10.0, ""), &scorer, &mut rng);
        assert!(matches!(result, Err(SofiError::InvalidInput { .. })));

        assert!(ledger.history().is_empty());
        assert_eq!(ledger.balance(), 100.0);
    }

    #[test]
    fn test_business_payment_must_verify() {
        let scorer = scorer();
        let mut ledger = Ledger::new(10000.0);
        let mut rng = SequenceSource::jitter_off();

        let bad = PaymentRequest::new("Green Energy Corp", 1250.0, "Utilities")
            .with_business(BusinessDetails::new("REG-00000", "555111"));
        let result = ledger.submit_payment(bad, &scorer, &mut rng);
        assert!(matches!(result, Err(SofiError::BusinessVerificationFailed { .. })));

        let good = PaymentRequest::new("Green Energy Corp", 1250.0, "Utilities")
            .with_business(BusinessDetails::new("REG-12345", "555111"));
        let tx = ledger.submit_payment(good, &scorer, &mut rng).unwrap();
        assert_eq!(tx.fraud_score, 0);
    }

    #[test]
    fn test_history_order_and_statistics() {
        let scorer = scorer();
        let mut ledger = Ledger::new(10000.0);
        let mut rng = SequenceSource::jitter_off();

        let first = ledger
            .submit_payment(PaymentRequest::new("Jane Doe", 300.0, "Personal"), &scorer, &mut rng)
            .unwrap();
        let second = ledger
            .submit_payment(PaymentRequest::new("Cash Point", 50.0, ""), &scorer, &mut rng)
            .unwrap();

        assert_eq!(ledger.history()[0].id, second.id);
        assert_eq!(ledger.history()[1].id, first.id);
        assert!(ledger.get(first.id).is_ok());
        assert!(matches!(ledger.get(Uuid::new_v4()), Err(SofiError::TransactionNotFound { .. })));

        let stats = ledger.get_statistics();
        assert_eq!(stats["total_scored"], 2.0);
        assert_eq!(stats["flagged"], 1.0);
        assert_eq!(stats["flag_rate_percent"], 50.0);
    }

    #[test]
    fn test_destination_parsing() {
        assert_eq!("Bank".parse::<WithdrawalDestination>().unwrap(), WithdrawalDestination::Bank);
        assert!("atm".parse::<WithdrawalDestination>().is_err());
    }
}
