//! Utility functions for the SOFI core
//! Name normalization and display formatting shared by the scorer, ledger and CLI

/// Canonical form used for every payee and keyword comparison
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Format currency amount for display
pub fn format_currency(amount: f64, currency: &str) -> String {
    match currency.to_uppercase().as_str() {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "KES" => format!("KSh {:.2}", amount), // Kenyan Shilling
        _ => format!("{} {:.2}", currency, amount),
    }
}

/// Keep only the last four digits of an account number
pub fn mask_account_number(account: &str) -> String {
    let digits: Vec<char> = account.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = digits[digits.len() - 4..].iter().collect();
    format!("**** **** **** {}", tail)
}

/// Strip payee text down to something safe for a single log line
pub fn sanitize_for_logging(data: &str) -> String {
    let cleaned: String = data
        .chars()
        .filter(|c| !c.is_control())
        .take(64)
        .collect();
    if data.chars().count() > 64 {
        format!("{}...", cleaned)
    } else {
        cleaned
    }
}
