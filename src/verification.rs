//! Business payee verification
//! Three-field match against the known verified payee list

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SofiError};
use crate::reference::{KnownPayee, ReferenceData};
use crate::utils::normalize_name;

/// Registration details a sender supplies when paying a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDetails {
    pub registration_id: String,
    pub merchant_code: String,
}

impl BusinessDetails {
    pub fn new(registration_id: &str, merchant_code: &str) -> Self {
        Self {
            registration_id: registration_id.to_string(),
            merchant_code: merchant_code.to_string(),
        }
    }

    /// Both fields or neither; one without the other is an input error.
    pub fn from_parts(registration_id: Option<&str>, merchant_code: Option<&str>) -> Result<Option<Self>> {
        match (registration_id, merchant_code) {
            (Some(registration_id), Some(merchant_code)) => Ok(Some(Self::new(registration_id, merchant_code))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(SofiError::invalid_input(
                "merchant_code",
                "is required when a registration id is given",
            )),
            (None, Some(_)) => Err(SofiError::invalid_input(
                "registration_id",
                "is required when a merchant code is given",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// A field was left blank
    Incomplete,
    Verified(KnownPayee),
    Failed,
}

impl VerificationStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationStatus::Verified(_))
    }
}

/// Name is compared case-insensitively, the other two fields exactly (after trimming).
pub fn verify_business(refs: &ReferenceData, payee: &str, details: &BusinessDetails) -> VerificationStatus {
    let registration_id = details.registration_id.trim();
    let merchant_code = details.merchant_code.trim();

    if payee.trim().is_empty() || registration_id.is_empty() || merchant_code.is_empty() {
        return VerificationStatus::Incomplete;
    }

    refs.known_verified_payees
        .iter()
        .find(|known| {
            normalize_name(&known.name) == normalize_name(payee)
                && known.registration_id == registration_id
                && known.merchant_code == merchant_code
        })
        .map(|known| VerificationStatus::Verified(known.clone()))
        .unwrap_or(VerificationStatus::Failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_business() {
        let refs = ReferenceData::default();
        let status = verify_business(
            &refs,
            "  green energy corp ",
            &BusinessDetails::new(" REG-12345 ", "555111"),
        );
        assert!(status.is_verified());
    }

    #[test]
    fn test_wrong_merchant_code_fails() {
        let refs = ReferenceData::default();
        let status = verify_business(
            &refs,
            "Green Energy Corp",
            &BusinessDetails::new("REG-12345", "555222"),
        );
        assert_eq!(status, VerificationStatus::Failed);
    }

    #[test]
    fn test_registration_id_is_case_sensitive() {
        let refs = ReferenceData::default();
        let status = verify_business(
            &refs,
            "Green Energy Corp",
            &BusinessDetails::new("reg-12345", "555111"),
        );
        assert_eq!(status, VerificationStatus::Failed);
    }

    #[test]
    fn test_business_details_need_both_parts() {
        let details = BusinessDetails::from_parts(Some("REG-12345"), Some("555111")).unwrap();
        assert_eq!(details, Some(BusinessDetails::new("REG-12345", "555111")));
        assert_eq!(BusinessDetails::from_parts(None, None).unwrap(), None);

        assert!(matches!(
            BusinessDetails::from_parts(Some("REG-12345"), None),
            Err(SofiError::InvalidInput { .. })
        ));
        assert!(matches!(
            BusinessDetails::from_parts(None, Some("555111")),
            Err(SofiError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_blank_field_is_incomplete() {
        let refs = ReferenceData::default();
        let status = verify_business(&refs, "Green Energy Corp", &BusinessDetails::new("REG-12345", "  "));
        assert_eq!(status, VerificationStatus::Incomplete);
    }
}
