use rust_decimal::Decimal;

use super::currencies::is_known_currency_code;
use super::error::ValidationError;
use super::types::*;

/// Report the soft conditions the engine tolerates.
///
/// Nothing here blocks [`compute_totals`](super::compute_totals); the UI
/// decides which findings to show. Returns all findings, not just the first.
pub fn validate_draft(draft: &InvoiceDraft) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (i, line) in draft.line_items.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    let subtotal = draft.totals().subtotal;
    validate_discount(&draft.discount, subtotal, &mut errors);
    validate_conversion(&draft.conversion, &mut errors);

    errors
}

fn validate_line(line: &LineItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("line_items[{index}]");

    if line.description.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.description"),
            "description must not be empty",
            "LINE-01",
        ));
    }

    check_factor(line.quantity, &prefix, "quantity", ("LINE-02", "LINE-03"), errors);
    check_factor(line.unit_price, &prefix, "unit_price", ("LINE-04", "LINE-05"), errors);
}

fn check_factor(
    value: Option<Decimal>,
    prefix: &str,
    name: &str,
    (malformed, negative): (&'static str, &'static str),
    errors: &mut Vec<ValidationError>,
) {
    match value {
        None => errors.push(ValidationError::new(
            format!("{prefix}.{name}"),
            format!("{name} is not a number and counts as zero"),
            malformed,
        )),
        Some(v) if v < Decimal::ZERO => errors.push(ValidationError::new(
            format!("{prefix}.{name}"),
            format!("{name} {v} is negative"),
            negative,
        )),
        Some(_) => {}
    }
}

fn validate_discount(discount: &DiscountRule, subtotal: Decimal, errors: &mut Vec<ValidationError>) {
    match *discount {
        DiscountRule::None => {}
        DiscountRule::Percentage(p) if p < Decimal::ZERO => errors.push(ValidationError::new(
            "discount.value",
            format!("percentage {p} is negative"),
            "DISC-01",
        )),
        DiscountRule::Percentage(p) if p > Decimal::ONE_HUNDRED => {
            errors.push(ValidationError::new(
                "discount.value",
                format!("percentage {p} exceeds 100"),
                "DISC-02",
            ))
        }
        DiscountRule::Percentage(_) => {}
        DiscountRule::FixedAmount(a) if a < Decimal::ZERO => errors.push(ValidationError::new(
            "discount.value",
            format!("fixed discount {a} is negative"),
            "DISC-03",
        )),
        DiscountRule::FixedAmount(a) if a > subtotal => errors.push(ValidationError::new(
            "discount.value",
            format!("fixed discount {a} exceeds subtotal {subtotal}; total will be negative"),
            "DISC-04",
        )),
        DiscountRule::FixedAmount(_) => {}
    }
}

fn validate_conversion(conversion: &ConversionRule, errors: &mut Vec<ValidationError>) {
    let source = conversion.source_currency.trim();
    check_currency_code(source, "conversion.source_currency", errors);

    let Some(target) = conversion
        .target_currency
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return;
    };
    check_currency_code(target, "conversion.target_currency", errors);

    match conversion.active() {
        None => errors.push(ValidationError::new(
            "conversion.exchange_rate",
            format!("exchange rate to {target} is missing or not positive; totals stay in {source}"),
            "CUR-03",
        )),
        Some((_, rate)) if target == source && rate != Decimal::ONE => {
            errors.push(ValidationError::new(
                "conversion.exchange_rate",
                format!("converting {source} to itself with rate {rate}"),
                "CUR-04",
            ))
        }
        Some(_) => {}
    }
}

fn check_currency_code(code: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if code.is_empty() {
        errors.push(ValidationError::new(field, "currency code must not be empty", "CUR-01"));
    } else if !is_known_currency_code(code) {
        errors.push(ValidationError::new(
            field,
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "CUR-02",
        ));
    }
}
