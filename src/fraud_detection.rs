//! Suspicious activity scoring for the SOFI core
//! Additive point rules over payee and amount, gated by a fixed threshold

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::SofiConfig,
    errors::{Result, SofiError},
    random::RandomSource,
    reference::ReferenceData,
    utils::sanitize_for_logging,
    verification::{verify_business, BusinessDetails},
};

/// A proposed payment, before the ledger gives it an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub payee: String,
    pub amount: f64,
    /// Only consulted when strict payee matching is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessDetails>,
}

impl TransactionCandidate {
    pub fn new(payee: &str, amount: f64) -> Self {
        Self {
            payee: payee.to_string(),
            amount,
            business: None,
        }
    }

    pub fn with_business(mut self, details: BusinessDetails) -> Self {
        self.business = Some(details);
        self
    }

    /// The scorer assumes a non-empty payee and a finite, positive amount.
    /// A whitespace-only payee is scored like any other name.
    pub fn validate(&self) -> Result<()> {
        if self.payee.is_empty() {
            return Err(SofiError::invalid_input("payee", "must not be empty"));
        }
        if !self.amount.is_finite() {
            return Err(SofiError::invalid_input("amount", "must be a finite number"));
        }
        if self.amount <= 0.0 {
            return Err(SofiError::invalid_input("amount", "must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalType {
    HighAmount,
    SuspiciousKeyword,
    UnknownPayee,
    RandomReview,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    pub signal_type: SignalType,
    pub points: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVerdict {
    pub is_suspicious: bool,
    /// Display-only; `None` means "no metadata", never a real place
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    pub score: u32,
    pub signals: Vec<RiskSignal>,
}

/// Stateless scorer; holds only configuration and reference lists.
#[derive(Debug, Clone)]
pub struct SuspiciousActivityScorer {
    config: SofiConfig,
    reference: ReferenceData,
}

impl SuspiciousActivityScorer {
    pub fn new(config: &SofiConfig, reference: ReferenceData) -> Self {
        Self {
            config: config.clone(),
            reference,
        }
    }

    pub fn config(&self) -> &SofiConfig {
        &self.config
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Score a candidate. Draws one float for the jitter rule on every call,
    /// then two picks (location, device) only when the result is suspicious.
    pub fn score<R: RandomSource + ?Sized>(
        &self,
        candidate: &TransactionCandidate,
        rng: &mut R,
    ) -> Result<ScoreVerdict> {
        let mut signals = self.rule_signals(candidate)?;

        let roll = rng.next_f64();
        if roll < self.config.jitter_probability {
            debug!(roll, "random review rule fired");
            signals.push(RiskSignal {
                signal_type: SignalType::RandomReview,
                points: self.config.jitter_points,
                description: "Selected for random review".to_string(),
            });
        }

        let score = total_points(&signals);
        let is_suspicious = self.classify(score);

        let (location, device) = if is_suspicious {
            let (location, device) = self.sample_display_metadata(rng);
            info!(
                payee = %sanitize_for_logging(&candidate.payee),
                amount = candidate.amount,
                score,
                "transaction flagged as suspicious"
            );
            (location, device)
        } else {
            debug!(score, "transaction below suspicious threshold");
            (None, None)
        };

        Ok(ScoreVerdict {
            is_suspicious,
            location,
            device,
            score,
            signals,
        })
    }

    /// Deterministic rules only (amount, keyword, known payee).
    pub fn rule_signals(&self, candidate: &TransactionCandidate) -> Result<Vec<RiskSignal>> {
        candidate.validate()?;

        let mut signals = Vec::new();

        if candidate.amount > self.config.high_amount_threshold {
            debug!(amount = candidate.amount, "high amount rule fired");
            signals.push(RiskSignal {
                signal_type: SignalType::HighAmount,
                points: self.config.high_amount_points,
                description: format!(
                    "Amount ${:.2} exceeds ${:.2}",
                    candidate.amount, self.config.high_amount_threshold
                ),
            });
        }

        if let Some(keyword) = self.reference.matching_keyword(&candidate.payee) {
            debug!(keyword, "suspicious keyword rule fired");
            signals.push(RiskSignal {
                signal_type: SignalType::SuspiciousKeyword,
                points: self.config.keyword_points,
                description: format!("Payee name contains \"{}\"", keyword),
            });
        }

        if !self.is_known_payee(candidate) {
            debug!("unknown payee rule fired");
            signals.push(RiskSignal {
                signal_type: SignalType::UnknownPayee,
                points: self.config.unknown_payee_points,
                description: "Payee is not a known, verified business".to_string(),
            });
        }

        Ok(signals)
    }

    /// Sum of the deterministic rules, without jitter.
    pub fn rule_score(&self, candidate: &TransactionCandidate) -> Result<u32> {
        Ok(total_points(&self.rule_signals(candidate)?))
    }

    pub fn classify(&self, score: u32) -> bool {
        score >= self.config.suspicious_threshold
    }

    /// Independent uniform draws from the location and device pools.
    pub fn sample_display_metadata<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
    ) -> (Option<String>, Option<String>) {
        let location = sample(&self.reference.suspicious_locations, rng);
        let device = sample(&self.reference.suspicious_devices, rng);
        (location, device)
    }

    fn is_known_payee(&self, candidate: &TransactionCandidate) -> bool {
        if !self.config.strict_payee_match {
            return self.reference.find_known_payee(&candidate.payee).is_some();
        }

        match &candidate.business {
            Some(details) => verify_business(&self.reference, &candidate.payee, details).is_verified(),
            None => false,
        }
    }
}

fn total_points(signals: &[RiskSignal]) -> u32 {
    signals.iter().fold(0u32, |acc, s| acc.saturating_add(s.points))
}

fn sample<R: RandomSource + ?Sized>(pool: &[String], rng: &mut R) -> Option<String> {
    if pool.is_empty() {
        return None;
    }
    pool.get(rng.pick(pool.len())).cloned()
}
