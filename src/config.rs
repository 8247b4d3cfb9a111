//! Configuration module for the SOFI core
//! Weights and thresholds for the suspicious activity scorer

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SofiError};

/// Score at or above which a transaction is classified as suspicious.
pub const SUSPICIOUS_SCORE_THRESHOLD: u32 = 5;

/// Upper bound for any single rule weight.
pub const MAX_RULE_POINTS: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SofiConfig {
    /// Amounts strictly above this trigger the amount rule
    pub high_amount_threshold: f64,
    pub high_amount_points: u32,

    /// Points for a payee name containing a suspicious keyword
    pub keyword_points: u32,

    /// Points for a payee missing from the known verified list
    pub unknown_payee_points: u32,

    /// Random review chance, in [0.0, 1.0]
    pub jitter_probability: f64,
    pub jitter_points: u32,

    pub suspicious_threshold: u32,

    /// Also require registration id and merchant code to match a known payee
    pub strict_payee_match: bool,

    /// Balance a freshly opened ledger starts with
    pub opening_balance: f64,
}

impl Default for SofiConfig {
    fn default() -> Self {
        Self {
            high_amount_threshold: 4000.0,
            high_amount_points: 3,
            keyword_points: 4,
            unknown_payee_points: 2,
            jitter_probability: 0.1,
            jitter_points: 2,
            suspicious_threshold: SUSPICIOUS_SCORE_THRESHOLD,
            strict_payee_match: false,
            opening_balance: 25480.50,
        }
    }
}

impl SofiConfig {
    /// Same weights, but known payees must match on all three business fields
    pub fn strict() -> Self {
        Self {
            strict_payee_match: true,
            ..Self::default()
        }
    }

    /// Load a JSON configuration file; missing fields fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: SofiConfig = serde_json::from_str(&raw)?;
        config
            .validate()
            .map_err(|message| SofiError::ConfigError { message })?;
        Ok(config)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.high_amount_threshold.is_finite() || self.high_amount_threshold < 0.0 {
            return Err("High amount threshold must be a non-negative number".to_string());
        }

        if !(0.0..=1.0).contains(&self.jitter_probability) {
            return Err("Jitter probability must be between 0.0 and 1.0".to_string());
        }

        let weights = [
            ("High amount", self.high_amount_points),
            ("Keyword", self.keyword_points),
            ("Unknown payee", self.unknown_payee_points),
            ("Jitter", self.jitter_points),
        ];
        for (rule, points) in weights {
            if points > MAX_RULE_POINTS {
                return Err(format!("{} points must not exceed {}", rule, MAX_RULE_POINTS));
            }
        }

        if self.suspicious_threshold == 0 {
            return Err("Suspicious threshold must be greater than 0".to_string());
        }

        if !self.opening_balance.is_finite() || self.opening_balance < 0.0 {
            return Err("Opening balance must be a non-negative number".to_string());
        }

        Ok(())
    }
}
