//! Static reference lists consulted by the scorer and business verification

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SofiError};
use crate::utils::normalize_name;

/// A pre-vetted business payee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownPayee {
    pub name: String,
    pub registration_id: String,
    pub merchant_code: String,
}

impl KnownPayee {
    pub fn new(name: &str, registration_id: &str, merchant_code: &str) -> Self {
        Self {
            name: name.to_string(),
            registration_id: registration_id.to_string(),
            merchant_code: merchant_code.to_string(),
        }
    }

    /// Case-insensitive exact comparison; surrounding whitespace counts.
    pub fn name_matches(&self, payee: &str) -> bool {
        self.name.to_lowercase() == payee.to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceData {
    pub known_verified_payees: Vec<KnownPayee>,
    pub suspicious_keywords: Vec<String>,
    /// Sampling pool for flagged results only
    pub suspicious_locations: Vec<String>,
    pub suspicious_devices: Vec<String>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        Self {
            known_verified_payees: vec![
                KnownPayee::new("Green Energy Corp", "REG-12345", "555111"),
                KnownPayee::new("Innovate Solutions Ltd.", "REG-67890", "555222"),
                KnownPayee::new("Tech Gadgets Inc.", "REG-54321", "555333"),
                KnownPayee::new("The Corner Cafe", "REG-98765", "555444"),
                KnownPayee::new("Kenya Coop Inc.", "KRA123456", "555999"),
            ],
            suspicious_keywords: ["cash", "crypto", "exchange", "vortex", "services", "quickcash"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            suspicious_locations: [
                "Lisbon, Portugal",
                "Remote Server via VPN",
                "Cyberjaya, Malaysia",
                "St. Petersburg, Russia",
                "Lagos, Nigeria",
            ]
            .iter()
            .map(|l| l.to_string())
            .collect(),
            suspicious_devices: [
                "Unknown Android Device",
                "Chrome on Linux",
                "Firefox on Windows 10 (Tor Browser)",
                "Safari on Jailbroken iPhone",
                "Postman API Client",
            ]
            .iter()
            .map(|d| d.to_string())
            .collect(),
        }
    }
}

impl ReferenceData {
    /// Parse reference lists from JSON, lowercasing keywords and validating pools
    pub fn from_json(raw: &str) -> Result<Self> {
        let mut data: ReferenceData = serde_json::from_str(raw)?;
        data.normalize();
        data.validate()?;
        Ok(data)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    fn normalize(&mut self) {
        for keyword in &mut self.suspicious_keywords {
            *keyword = normalize_name(keyword);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.suspicious_locations.is_empty() {
            return Err(SofiError::ConfigError {
                message: "suspicious_locations must not be empty".to_string(),
            });
        }
        if self.suspicious_devices.is_empty() {
            return Err(SofiError::ConfigError {
                message: "suspicious_devices must not be empty".to_string(),
            });
        }
        if self.suspicious_keywords.iter().any(|k| k.is_empty()) {
            // An empty keyword would match every payee
            return Err(SofiError::ConfigError {
                message: "suspicious_keywords must not contain empty entries".to_string(),
            });
        }
        Ok(())
    }

    /// Case-insensitive exact name lookup
    pub fn find_known_payee(&self, payee: &str) -> Option<&KnownPayee> {
        self.known_verified_payees.iter().find(|known| known.name_matches(payee))
    }

    /// First configured keyword contained in the lowercased payee name.
    /// Blank keywords never match.
    pub fn matching_keyword(&self, payee: &str) -> Option<&str> {
        let payee_lower = payee.to_lowercase();
        self.suspicious_keywords
            .iter()
            .find(|keyword| {
                let keyword = normalize_name(keyword);
                !keyword.is_empty() && payee_lower.contains(&keyword)
            })
            .map(|keyword| keyword.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reference_is_valid() {
        let refs = ReferenceData::default();
        assert!(refs.validate().is_ok());
        assert_eq!(refs.known_verified_payees.len(), 5);
        assert_eq!(refs.suspicious_locations.len(), 5);
        assert_eq!(refs.suspicious_devices.len(), 5);
    }

    #[test]
    fn test_known_payee_lookup_is_case_insensitive() {
        let refs = ReferenceData::default();
        assert!(refs.find_known_payee("the corner cafe").is_some());
        assert!(refs.find_known_payee("GREEN ENERGY CORP").is_some());
        assert!(refs.find_known_payee("  GREEN ENERGY CORP ").is_none());
        assert!(refs.find_known_payee("Green Energy").is_none());
    }

    #[test]
    fn test_keyword_is_substring_match() {
        let refs = ReferenceData::default();
        assert_eq!(refs.matching_keyword("CoinVortex Exchange"), Some("exchange"));
        assert_eq!(refs.matching_keyword("CryptoVault"), Some("crypto"));
        assert_eq!(refs.matching_keyword("Jane Doe"), None);
        assert_eq!(refs.matching_keyword(""), None);
    }

    #[test]
    fn test_keyword_case_ignored_on_hand_built_lists() {
        let refs = ReferenceData {
            suspicious_keywords: vec!["Cash".to_string(), "   ".to_string()],
            ..ReferenceData::default()
        };
        assert_eq!(refs.matching_keyword("QUICKCASH ltd"), Some("Cash"));
        assert_eq!(refs.matching_keyword("Jane Doe"), None);
    }

    #[test]
    fn test_from_json_lowercases_keywords() {
        let raw = r#"{
            "known_verified_payees": [],
            "suspicious_keywords": ["  WIRE "],
            "suspicious_locations": ["Nowhere"],
            "suspicious_devices": ["Toaster"]
        }"#;
        let refs = ReferenceData::from_json(raw).unwrap();
        assert_eq!(refs.suspicious_keywords, vec!["wire".to_string()]);
        assert_eq!(refs.matching_keyword("Fast Wire Ltd"), Some("wire"));
    }

    #[test]
    fn test_from_json_rejects_empty_pools() {
        let raw = r#"{
            "known_verified_payees": [],
            "suspicious_keywords": [],
            "suspicious_locations": [],
            "suspicious_devices": ["Toaster"]
        }"#;
        assert!(matches!(
            ReferenceData::from_json(raw),
            Err(SofiError::ConfigError { .. })
        ));
    }
}
