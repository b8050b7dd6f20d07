use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use super::types::{ConversionRule, DiscountRule, InvoiceTotals, LineItem};

/// Compute invoice totals from line items, a discount rule and a conversion rule.
///
/// Pure and synchronous, meant to be called on every form change:
///
/// 1. each line total is `quantity × unit_price`; a malformed factor or an
///    overflowing product contributes zero instead of failing the invoice,
/// 2. the discount is computed on the subtotal in the source currency and is
///    not capped, so `total_after_discount` can be negative,
/// 3. conversion is applied last, only when [`ConversionRule::active`].
///
/// No rounding happens here; see [`InvoiceTotals::rounded`].
///
/// ```
/// use billdesk::*;
/// use rust_decimal_macros::dec;
///
/// let lines = [
///     LineItem::new("Consulting", dec!(2), dec!(50)),
///     LineItem::new("Hosting", dec!(1), dec!(30)),
/// ];
/// let totals = compute_totals(
///     &lines,
///     &DiscountRule::Percentage(dec!(10)),
///     &ConversionRule::none("USD"),
/// );
/// assert_eq!(totals.subtotal, dec!(130));
/// assert_eq!(totals.grand_total, dec!(117));
/// ```
pub fn compute_totals(
    line_items: &[LineItem],
    discount: &DiscountRule,
    conversion: &ConversionRule,
) -> InvoiceTotals {
    let subtotal = subtotal(line_items);
    let discount_amount = discount_amount(subtotal, discount);
    let (discount_amount, total_after_discount) = match subtotal.checked_sub(discount_amount) {
        Some(total) => (discount_amount, total),
        None => {
            warn!(%subtotal, kind = discount.kind(), "discount overflowed, ignoring it");
            (Decimal::ZERO, subtotal)
        }
    };

    let (grand_total, display_currency) = match conversion.active() {
        Some((target, rate)) => match total_after_discount.checked_mul(rate) {
            Some(converted) => (converted, target.to_string()),
            None => {
                warn!(%total_after_discount, %rate, currency = target, "conversion overflowed, keeping source currency");
                (total_after_discount, conversion.source_currency.clone())
            }
        },
        None => (total_after_discount, conversion.source_currency.clone()),
    };

    debug!(
        lines = line_items.len(),
        %subtotal,
        %discount_amount,
        %grand_total,
        currency = %display_currency,
        "computed invoice totals"
    );

    InvoiceTotals {
        subtotal,
        discount_amount,
        total_after_discount,
        grand_total,
        display_currency,
    }
}

fn subtotal(line_items: &[LineItem]) -> Decimal {
    line_items
        .iter()
        .enumerate()
        .fold(Decimal::ZERO, |sum, (index, line)| {
            let Some(line_total) = line.checked_line_total() else {
                warn!(index, description = %line.description, "malformed line item counted as zero");
                return sum;
            };
            sum.checked_add(line_total).unwrap_or_else(|| {
                warn!(index, description = %line.description, "line total overflowed subtotal, counted as zero");
                sum
            })
        })
}

fn discount_amount(subtotal: Decimal, discount: &DiscountRule) -> Decimal {
    match discount {
        DiscountRule::None => Decimal::ZERO,
        DiscountRule::Percentage(percent) => subtotal
            .checked_mul(*percent / dec!(100))
            .unwrap_or_else(|| {
                warn!(%subtotal, %percent, "percentage discount overflowed, counted as zero");
                Decimal::ZERO
            }),
        DiscountRule::FixedAmount(amount) => *amount,
    }
}
