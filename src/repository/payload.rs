//! JSON shapes exchanged with the invoice backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{
    Cancellation, ConversionRule, DiscountRule, Invoice, InvoiceDraft, InvoiceId, InvoiceStatus,
    InvoiceTotals, LineItem, money,
};

use super::RepositoryError;

/// Body of create and update calls: the draft with discount and conversion
/// flattened, plus the computed totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub line_items: Vec<LineItemPayload>,
    pub discount_type: String,
    #[serde(with = "money::lenient_or_zero", default)]
    pub discount_value: Decimal,
    pub currency_from: String,
    #[serde(default)]
    pub currency_to: Option<String>,
    #[serde(with = "money::lenient", default)]
    pub exchange_rate: Option<Decimal>,
    pub totals: TotalsPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemPayload {
    pub description: String,
    #[serde(with = "money::lenient", default)]
    pub quantity: Option<Decimal>,
    #[serde(with = "money::lenient", default)]
    pub unit_price: Option<Decimal>,
    /// Sent for the backend's convenience; never read back.
    #[serde(skip_deserializing)]
    pub line_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsPayload {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub total_after_discount: Decimal,
    pub grand_total: Decimal,
    pub display_currency: String,
}

/// Body of the dedicated cancel call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelPayload {
    pub cancel_reason: String,
    /// When the cancellation was decided. Backends stamp their own time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,
}

impl CancelPayload {
    pub fn new(cancel_reason: impl Into<String>) -> Self {
        Self {
            cancel_reason: cancel_reason.into(),
            canceled_at: None,
        }
    }
}

impl From<&LineItem> for LineItemPayload {
    fn from(line: &LineItem) -> Self {
        Self {
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        }
    }
}

impl From<LineItemPayload> for LineItem {
    fn from(line: LineItemPayload) -> Self {
        Self {
            description: line.description,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

impl From<&InvoiceTotals> for TotalsPayload {
    fn from(totals: &InvoiceTotals) -> Self {
        Self {
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            total_after_discount: totals.total_after_discount,
            grand_total: totals.grand_total,
            display_currency: totals.display_currency.clone(),
        }
    }
}

impl InvoicePayload {
    /// Flatten a draft, computing its totals.
    pub fn from_draft(draft: &InvoiceDraft) -> Self {
        Self::assemble(draft, &draft.totals())
    }

    /// Flatten an invoice using its already computed totals.
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self::assemble(invoice.draft(), invoice.totals())
    }

    fn assemble(draft: &InvoiceDraft, totals: &InvoiceTotals) -> Self {
        Self {
            line_items: draft.line_items.iter().map(LineItemPayload::from).collect(),
            discount_type: draft.discount.kind().to_string(),
            discount_value: draft.discount.value(),
            currency_from: draft.conversion.source_currency.clone(),
            currency_to: draft.conversion.target_currency.clone(),
            exchange_rate: draft.conversion.exchange_rate,
            totals: TotalsPayload::from(totals),
        }
    }

    /// Rebuild the draft. The `totals` block is ignored; totals are always
    /// recomputed from the draft.
    pub fn to_draft(&self) -> Result<InvoiceDraft, RepositoryError> {
        Ok(InvoiceDraft {
            line_items: self.line_items.iter().cloned().map(LineItem::from).collect(),
            discount: discount_from_wire(Some(&self.discount_type), self.discount_value)?,
            conversion: ConversionRule {
                source_currency: self.currency_from.clone(),
                target_currency: self.currency_to.clone(),
                exchange_rate: self.exchange_rate,
            },
        })
    }
}

impl From<&Invoice> for CancelPayload {
    /// Record written by the cancel transition; empty if `invoice` is not canceled.
    fn from(invoice: &Invoice) -> Self {
        match invoice.cancellation() {
            Some(record) => Self {
                cancel_reason: record.reason.clone(),
                canceled_at: Some(record.canceled_at),
            },
            None => Self::new(""),
        }
    }
}

/// An invoice record as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    #[serde(deserialize_with = "invoice_id")]
    pub id: InvoiceId,
    pub status: String,
    #[serde(default)]
    pub line_items: Vec<LineItemPayload>,
    #[serde(default)]
    pub discount_type: Option<String>,
    #[serde(with = "money::lenient_or_zero", default)]
    pub discount_value: Decimal,
    pub currency_from: String,
    #[serde(default)]
    pub currency_to: Option<String>,
    #[serde(with = "money::lenient", default)]
    pub exchange_rate: Option<Decimal>,
    #[serde(default)]
    pub cancel_reason: Option<String>,
    #[serde(default)]
    pub canceled_at: Option<DateTime<Utc>>,
}

impl TryFrom<InvoiceResponse> for Invoice {
    type Error = RepositoryError;

    fn try_from(record: InvoiceResponse) -> Result<Self, Self::Error> {
        let status: InvoiceStatus = record.status.parse()?;
        let draft = InvoiceDraft {
            line_items: record.line_items.into_iter().map(LineItem::from).collect(),
            discount: discount_from_wire(record.discount_type.as_deref(), record.discount_value)?,
            conversion: ConversionRule {
                source_currency: record.currency_from,
                target_currency: record.currency_to,
                exchange_rate: record.exchange_rate,
            },
        };
        let cancellation = match (record.cancel_reason, record.canceled_at) {
            (Some(reason), Some(canceled_at)) => Some(Cancellation {
                canceled_at,
                reason,
            }),
            _ => None,
        };
        Ok(Invoice::restore(record.id, status, draft, cancellation)?)
    }
}

fn discount_from_wire(kind: Option<&str>, value: Decimal) -> Result<DiscountRule, RepositoryError> {
    let kind = kind.unwrap_or("NONE");
    DiscountRule::from_parts(kind, value)
        .ok_or_else(|| RepositoryError::Parse(format!("unknown discount type '{kind}'")))
}

fn invoice_id<'de, D>(deserializer: D) -> Result<InvoiceId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => InvoiceId::new(id),
        RawId::Number(id) => InvoiceId::new(id.to_string()),
    })
}
