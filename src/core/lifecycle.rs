//! Cancellation transition.
//!
//! `Canceled` is terminal. The transition validates the reason and returns a
//! canceled copy of the invoice for the caller to persist; it performs no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::CancellationError;
use super::types::{Cancellation, Invoice};

/// Minimum length of a trimmed cancellation reason, inclusive.
pub const MIN_CANCEL_REASON_CHARS: usize = 10;
/// Maximum length of a trimmed cancellation reason, inclusive.
pub const MAX_CANCEL_REASON_CHARS: usize = 500;

/// Bounds on the cancellation reason, counted in characters of the trimmed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CancellationPolicy {
    pub min_reason_chars: usize,
    pub max_reason_chars: usize,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            min_reason_chars: MIN_CANCEL_REASON_CHARS,
            max_reason_chars: MAX_CANCEL_REASON_CHARS,
        }
    }
}

impl CancellationPolicy {
    /// Validate a reason and return it trimmed.
    pub fn check_reason<'a>(&self, reason: &'a str) -> Result<&'a str, CancellationError> {
        let reason = reason.trim();
        let actual = reason.chars().count();
        if actual < self.min_reason_chars {
            return Err(CancellationError::ReasonTooShort {
                min: self.min_reason_chars,
                actual,
            });
        }
        if actual > self.max_reason_chars {
            return Err(CancellationError::ReasonTooLong {
                max: self.max_reason_chars,
                actual,
            });
        }
        Ok(reason)
    }
}

/// Cancel `invoice` now, with the default policy.
///
/// ```
/// use billdesk::*;
/// use rust_decimal_macros::dec;
///
/// let draft = InvoiceDraftBuilder::new("USD")
///     .add_line(LineItem::new("Widget", dec!(1), dec!(10)))
///     .build()
///     .unwrap();
/// let invoice = Invoice::create("INV-1".into(), InvoiceStatus::Pending, draft).unwrap();
///
/// assert_eq!(
///     cancel(&invoice, "ok"),
///     Err(CancellationError::ReasonTooShort { min: 10, actual: 2 })
/// );
/// let canceled = cancel(&invoice, "Customer requested refund").unwrap();
/// assert_eq!(canceled.status(), InvoiceStatus::Canceled);
/// assert_eq!(invoice.status(), InvoiceStatus::Pending);
/// ```
pub fn cancel(invoice: &Invoice, reason: &str) -> Result<Invoice, CancellationError> {
    cancel_at(invoice, reason, Utc::now(), &CancellationPolicy::default())
}

/// Cancel `invoice` with an explicit timestamp and policy.
///
/// Checks run in order: already canceled, reason too short, reason too long.
/// The input snapshot is never modified.
pub fn cancel_at(
    invoice: &Invoice,
    reason: &str,
    at: DateTime<Utc>,
    policy: &CancellationPolicy,
) -> Result<Invoice, CancellationError> {
    if invoice.is_canceled() {
        warn!(invoice_id = %invoice.id(), "cancel rejected: invoice already canceled");
        return Err(CancellationError::AlreadyCanceled);
    }

    let reason = policy.check_reason(reason).inspect_err(|e| {
        warn!(invoice_id = %invoice.id(), error = %e, "cancel rejected");
    })?;

    info!(invoice_id = %invoice.id(), from = %invoice.status(), "invoice canceled");
    Ok(invoice.clone().into_canceled(Cancellation {
        canceled_at: at,
        reason: reason.to_string(),
    }))
}
