use rust_decimal::Decimal;

use super::currencies::normalize_currency_code;
use super::error::BillingError;
use super::money;
use super::types::*;

/// Upper bound on line items per invoice.
pub const MAX_LINE_ITEMS: usize = 10_000;

/// Builder for an [`InvoiceDraft`].
///
/// ```
/// use billdesk::*;
/// use rust_decimal_macros::dec;
///
/// let draft = InvoiceDraftBuilder::new("usd")
///     .add_line(LineItemBuilder::new("Consulting", dec!(2), dec!(50)).build())
///     .add_line(LineItemBuilder::new("Hosting", dec!(1), dec!(30)).build())
///     .convert_to("GEL", dec!(2.7))
///     .build()
///     .unwrap();
///
/// let totals = draft.totals();
/// assert_eq!(totals.grand_total, dec!(351));
/// assert_eq!(totals.display_currency, "GEL");
/// ```
pub struct InvoiceDraftBuilder {
    source_currency: String,
    line_items: Vec<LineItem>,
    discount: DiscountRule,
    target_currency: Option<String>,
    exchange_rate: Option<Decimal>,
}

impl InvoiceDraftBuilder {
    pub fn new(source_currency: impl Into<String>) -> Self {
        Self {
            source_currency: source_currency.into(),
            line_items: Vec::new(),
            discount: DiscountRule::None,
            target_currency: None,
            exchange_rate: None,
        }
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.line_items.push(line);
        self
    }

    pub fn lines(mut self, lines: impl IntoIterator<Item = LineItem>) -> Self {
        self.line_items.extend(lines);
        self
    }

    pub fn discount(mut self, discount: DiscountRule) -> Self {
        self.discount = discount;
        self
    }

    pub fn percentage_discount(self, percent: Decimal) -> Self {
        self.discount(DiscountRule::Percentage(percent))
    }

    pub fn fixed_discount(self, amount: Decimal) -> Self {
        self.discount(DiscountRule::FixedAmount(amount))
    }

    pub fn convert_to(mut self, target_currency: impl Into<String>, exchange_rate: Decimal) -> Self {
        self.target_currency = Some(target_currency.into());
        self.exchange_rate = Some(exchange_rate);
        self
    }

    /// Conversion settings straight from the form; a blank target or a
    /// malformed rate leaves conversion inactive.
    pub fn convert_to_raw(mut self, target_currency: &str, exchange_rate: &str) -> Self {
        self.target_currency = normalize_currency_code(target_currency);
        self.exchange_rate = money::parse_amount(exchange_rate);
        self
    }

    /// Build the draft. Only structural problems are rejected; soft numeric
    /// issues are left to [`validate_draft`](super::validate_draft).
    pub fn build(self) -> Result<InvoiceDraft, BillingError> {
        let source_currency = normalize_currency_code(&self.source_currency)
            .ok_or_else(|| BillingError::Builder("source currency is required".into()))?;

        if self.line_items.len() > MAX_LINE_ITEMS {
            return Err(BillingError::Builder(format!(
                "invoice cannot have more than {MAX_LINE_ITEMS} line items"
            )));
        }

        let target_currency = self
            .target_currency
            .as_deref()
            .and_then(normalize_currency_code);

        Ok(InvoiceDraft {
            line_items: self.line_items,
            discount: self.discount,
            conversion: ConversionRule {
                source_currency,
                target_currency,
                exchange_rate: self.exchange_rate,
            },
        })
    }
}

/// Builder for [`LineItem`].
pub struct LineItemBuilder {
    description: String,
    quantity: Option<Decimal>,
    unit_price: Option<Decimal>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity: Some(quantity),
            unit_price: Some(unit_price),
        }
    }

    /// Start from raw form text; unreadable values become malformed factors.
    pub fn from_form(description: impl Into<String>, quantity: &str, unit_price: &str) -> Self {
        Self {
            description: description.into(),
            quantity: money::parse_amount(quantity),
            unit_price: money::parse_amount(unit_price),
        }
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            description: self.description.trim().to_string(),
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_codes_are_normalized() {
        let draft = InvoiceDraftBuilder::new(" usd ")
            .convert_to("eur", dec!(0.9))
            .build()
            .unwrap();
        assert_eq!(draft.conversion.source_currency, "USD");
        assert_eq!(draft.conversion.target_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn missing_source_currency_is_rejected() {
        let err = InvoiceDraftBuilder::new("  ").build().unwrap_err();
        assert!(matches!(err, BillingError::Builder(_)));
    }

    #[test]
    fn too_many_lines_is_rejected() {
        let lines = (0..=MAX_LINE_ITEMS).map(|i| LineItem::new(format!("row {i}"), dec!(1), dec!(1)));
        let err = InvoiceDraftBuilder::new("USD").lines(lines).build().unwrap_err();
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn raw_conversion_with_garbage_rate_stays_inactive() {
        let draft = InvoiceDraftBuilder::new("USD")
            .add_line(LineItem::new("x", dec!(1), dec!(100)))
            .convert_to_raw("gel", "abc")
            .build()
            .unwrap();
        assert_eq!(draft.conversion.exchange_rate, None);
        assert_eq!(draft.totals().display_currency, "USD");
    }

    #[test]
    fn form_line_keeps_malformed_factor() {
        let line = LineItemBuilder::from_form("  Design  ", "3", "n/a").build();
        assert_eq!(line.description, "Design");
        assert_eq!(line.quantity, Some(dec!(3)));
        assert_eq!(line.unit_price, None);
        assert_eq!(line.line_total(), Decimal::ZERO);
    }
}
