//! Error handling for the SOFI core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SofiError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: f64, required: f64 },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Invalid transaction state: {current_state}")]
    InvalidTransactionState { current_state: String },

    #[error("Business details could not be verified for payee: {payee}")]
    BusinessVerificationFailed { payee: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Data serialization error: {message}")]
    SerializationError { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl SofiError {
    pub fn invalid_input(field: &str, reason: &str) -> Self {
        SofiError::InvalidInput {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Convert error to the short message shown next to a payment form
    pub fn to_user_message(&self) -> String {
        match self {
            SofiError::InvalidInput { field, .. } if field == "payee" => {
                "Payee and Amount are required.".to_string()
            }
            SofiError::InvalidInput { field, .. } if field == "amount" => {
                "Please enter a valid amount.".to_string()
            }
            SofiError::InsufficientFunds { balance, .. } => {
                format!("Amount exceeds your current balance of ${:.2}.", balance)
            }
            SofiError::BusinessVerificationFailed { .. } => {
                "Business details must be verified before sending.".to_string()
            }
            SofiError::TransactionNotFound { .. } => {
                "That transaction no longer exists.".to_string()
            }
            SofiError::InvalidTransactionState { .. } => {
                "This transaction cannot be changed in its current state.".to_string()
            }
            _ => "An error occurred. Please try again or contact support.".to_string(),
        }
    }

    /// Whether the user can fix the input and resubmit
    pub fn is_recoverable(&self) -> bool {
        match self {
            SofiError::InvalidInput { .. }
            | SofiError::InsufficientFunds { .. }
            | SofiError::BusinessVerificationFailed { .. } => true,

            SofiError::TransactionNotFound { .. }
            | SofiError::InvalidTransactionState { .. } => false,

            _ => false,
        }
    }

    /// Get severity level for logging
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SofiError::ConfigError { .. } | SofiError::Io { .. } => ErrorSeverity::Critical,

            SofiError::BusinessVerificationFailed { .. }
            | SofiError::InvalidTransactionState { .. } => ErrorSeverity::High,

            SofiError::InsufficientFunds { .. } | SofiError::SerializationError { .. } => {
                ErrorSeverity::Medium
            }

            _ => ErrorSeverity::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl From<serde_json::Error> for SofiError {
    fn from(err: serde_json::Error) -> Self {
        SofiError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SofiError {
    fn from(err: std::io::Error) -> Self {
        SofiError::Io {
            message: err.to_string(),
        }
    }
}

// Convenience type alias
pub type Result<T> = std::result::Result<T, SofiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let error = SofiError::invalid_input("payee", "must not be empty");
        assert!(error.to_user_message().contains("Payee and Amount"));
        assert!(error.is_recoverable());

        let error = SofiError::InsufficientFunds { balance: 10.0, required: 20.0 };
        assert!(error.to_user_message().contains("$10.00"));

        let error = SofiError::InvalidTransactionState { current_state: "Cancelled".to_string() };
        assert!(!error.is_recoverable());
    }

    #[test]
    fn test_error_severity() {
        let config_error = SofiError::ConfigError { message: "bad".to_string() };
        assert_eq!(config_error.severity(), ErrorSeverity::Critical);

        let input_error = SofiError::invalid_input("amount", "must be positive");
        assert_eq!(input_error.severity(), ErrorSeverity::Low);
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let error: SofiError = parse.unwrap_err().into();
        assert!(matches!(error, SofiError::SerializationError { .. }));
    }
}
