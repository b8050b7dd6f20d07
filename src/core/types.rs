use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BillingError;
use super::money;
use super::totals::compute_totals;

/// One billable row of an invoice.
///
/// `quantity` and `unit_price` are `None` when the value typed into the form
/// could not be read as a finite number. There is no stored line total: it
/// is always derived from the two factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(with = "money::lenient", default)]
    pub quantity: Option<Decimal>,
    #[serde(with = "money::lenient", default)]
    pub unit_price: Option<Decimal>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }

    /// Build from float form values; NaN and infinities become malformed factors.
    pub fn from_f64(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity: money::amount_from_f64(quantity),
            unit_price: money::amount_from_f64(unit_price),
        }
    }

    /// Build from text form values.
    pub fn parse(description: impl Into<String>, quantity: &str, unit_price: &str) -> Self {
        Self {
            description: description.into(),
            quantity: money::parse_amount(quantity),
            unit_price: money::parse_amount(unit_price),
        }
    }

    /// `quantity × unit_price`, or `None` if a factor is malformed or the
    /// product overflows.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.quantity?.checked_mul(self.unit_price?)
    }

    /// `quantity × unit_price`, with malformed rows contributing zero.
    pub fn line_total(&self) -> Decimal {
        self.checked_line_total().unwrap_or(Decimal::ZERO)
    }
}

/// Document-level discount policy. Always applied in the source currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountRule {
    #[default]
    None,
    /// Percent of the subtotal. Values above 100 are not rejected.
    Percentage(Decimal),
    /// Taken literally, even when larger than the subtotal.
    FixedAmount(Decimal),
}

impl DiscountRule {
    /// Wire name of the discount kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Percentage(_) => "PERCENTAGE",
            Self::FixedAmount(_) => "FIXED_AMOUNT",
        }
    }

    /// The configured value, zero for [`DiscountRule::None`].
    pub fn value(&self) -> Decimal {
        match self {
            Self::None => Decimal::ZERO,
            Self::Percentage(v) | Self::FixedAmount(v) => *v,
        }
    }

    /// Rebuild from the flattened `(kind, value)` pair. Unknown kinds yield `None`.
    pub fn from_parts(kind: &str, value: Decimal) -> Option<Self> {
        match kind.trim().to_ascii_uppercase().as_str() {
            "NONE" | "" => Some(Self::None),
            "PERCENTAGE" => Some(Self::Percentage(value)),
            "FIXED_AMOUNT" => Some(Self::FixedAmount(value)),
            _ => None,
        }
    }
}

/// Optional re-denomination of the discounted total into another currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRule {
    pub source_currency: String,
    #[serde(default)]
    pub target_currency: Option<String>,
    #[serde(with = "money::lenient", default)]
    pub exchange_rate: Option<Decimal>,
}

impl ConversionRule {
    /// No conversion: totals are shown in `source_currency`.
    pub fn none(source_currency: impl Into<String>) -> Self {
        Self {
            source_currency: source_currency.into(),
            target_currency: None,
            exchange_rate: None,
        }
    }

    pub fn new(
        source_currency: impl Into<String>,
        target_currency: impl Into<String>,
        exchange_rate: Decimal,
    ) -> Self {
        Self {
            source_currency: source_currency.into(),
            target_currency: Some(target_currency.into()),
            exchange_rate: Some(exchange_rate),
        }
    }

    /// Target currency and rate when conversion is active: the target is a
    /// non-blank string and the rate is strictly positive. A zero or missing
    /// rate simply means "no conversion".
    pub fn active(&self) -> Option<(&str, Decimal)> {
        let target = self.target_currency.as_deref()?;
        let rate = self.exchange_rate?;
        (!target.trim().is_empty() && rate > Decimal::ZERO).then_some((target, rate))
    }
}

/// Computed totals. Immutable once computed for a given input set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of all line totals.
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    /// `subtotal - discount_amount`; may be negative.
    pub total_after_discount: Decimal,
    /// `total_after_discount`, converted when conversion is active.
    pub grand_total: Decimal,
    pub display_currency: String,
}

impl InvoiceTotals {
    /// A copy rounded for presentation. The receiver keeps full precision.
    pub fn rounded(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: money::round_for_display(self.subtotal),
            discount_amount: money::round_for_display(self.discount_amount),
            total_after_discount: money::round_for_display(self.total_after_discount),
            grand_total: money::round_for_display(self.grand_total),
            display_currency: self.display_currency.clone(),
        }
    }

    /// Grand total formatted for display, e.g. `"351.00 GEL"`.
    pub fn formatted_grand_total(&self) -> String {
        money::format_amount(self.grand_total, &self.display_currency)
    }
}

/// Line items plus discount and conversion settings: everything the engine
/// needs, collected from the form as one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discount: DiscountRule,
    pub conversion: ConversionRule,
}

impl InvoiceDraft {
    pub fn totals(&self) -> InvoiceTotals {
        compute_totals(&self.line_items, &self.discount, &self.conversion)
    }
}

/// Invoice status. Only the move into `Canceled` is governed here; the other
/// states are asserted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    Overdue,
    Canceled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Overdue => "OVERDUE",
            Self::Canceled => "CANCELED",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "OVERDUE" => Ok(Self::Overdue),
            "CANCELED" | "CANCELLED" => Ok(Self::Canceled),
            other => Err(BillingError::InconsistentRecord(format!(
                "unknown invoice status '{other}'"
            ))),
        }
    }
}

/// Set exactly once, by the cancel transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub canceled_at: DateTime<Utc>,
    /// Trimmed reason text.
    pub reason: String,
}

/// Identity assigned by the invoice repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(String);

impl InvoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InvoiceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InvoiceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Invoice aggregate.
///
/// Fields are private: totals are derived from the draft on every
/// construction, and the cancellation record can only be set through
/// [`cancel`](super::lifecycle::cancel).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invoice {
    id: InvoiceId,
    status: InvoiceStatus,
    draft: InvoiceDraft,
    totals: InvoiceTotals,
    cancellation: Option<Cancellation>,
}

impl Invoice {
    /// A newly persisted invoice. Use the cancel transition to reach `Canceled`.
    pub fn create(
        id: InvoiceId,
        status: InvoiceStatus,
        draft: InvoiceDraft,
    ) -> Result<Self, BillingError> {
        if status.is_terminal() {
            return Err(BillingError::InconsistentRecord(format!(
                "invoice {id} cannot be created in status {status}"
            )));
        }
        Ok(Self::assemble(id, status, draft, None))
    }

    /// Rebuild an invoice read back from storage. Totals are recomputed;
    /// status and cancellation record must agree.
    pub fn restore(
        id: InvoiceId,
        status: InvoiceStatus,
        draft: InvoiceDraft,
        cancellation: Option<Cancellation>,
    ) -> Result<Self, BillingError> {
        match (status.is_terminal(), cancellation.is_some()) {
            (true, false) => Err(BillingError::InconsistentRecord(format!(
                "invoice {id} is canceled but has no cancellation record"
            ))),
            (false, true) => Err(BillingError::InconsistentRecord(format!(
                "invoice {id} has a cancellation record but status {status}"
            ))),
            _ => Ok(Self::assemble(id, status, draft, cancellation)),
        }
    }

    /// A new snapshot carrying `draft` and freshly computed totals.
    pub fn revise(&self, draft: InvoiceDraft) -> Result<Self, BillingError> {
        if self.is_canceled() {
            return Err(BillingError::Canceled(self.id.to_string()));
        }
        Ok(Self::assemble(self.id.clone(), self.status, draft, None))
    }

    fn assemble(
        id: InvoiceId,
        status: InvoiceStatus,
        draft: InvoiceDraft,
        cancellation: Option<Cancellation>,
    ) -> Self {
        let totals = draft.totals();
        Self {
            id,
            status,
            draft,
            totals,
            cancellation,
        }
    }

    pub(crate) fn into_canceled(mut self, cancellation: Cancellation) -> Self {
        self.status = InvoiceStatus::Canceled;
        self.cancellation = Some(cancellation);
        self
    }

    pub fn id(&self) -> &InvoiceId {
        &self.id
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn draft(&self) -> &InvoiceDraft {
        &self.draft
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.draft.line_items
    }

    pub fn discount(&self) -> &DiscountRule {
        &self.draft.discount
    }

    pub fn conversion(&self) -> &ConversionRule {
        &self.draft.conversion
    }

    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    pub fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    pub fn is_canceled(&self) -> bool {
        self.status.is_terminal()
    }
}
