//! Currency code helpers.
//!
//! The engine accepts any non-empty string as a currency code. The table
//! below only feeds advisory validation, so an unlisted code is a warning,
//! never a rejection.

/// Normalize a typed currency code: trimmed and upper-cased.
///
/// Returns `None` when nothing remains after trimming.
pub fn normalize_currency_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_uppercase())
    }
}

/// Check whether `code` is a listed ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "AED", "AMD", "AUD", "AZN", "BGN", "BRL", "BYN", "CAD", "CHF", "CNY", "CZK", "DKK", "EGP",
    "EUR", "GBP", "GEL", "HKD", "HUF", "IDR", "ILS", "INR", "ISK", "JPY", "KES", "KRW", "KZT",
    "MDL", "MXN", "MYR", "NGN", "NOK", "NZD", "PHP", "PLN", "RON", "RSD", "SAR", "SEK", "SGD",
    "THB", "TRY", "TWD", "UAH", "USD", "UZS", "VND", "ZAR",
];
