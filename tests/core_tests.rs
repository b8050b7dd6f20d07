use billdesk::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn two_lines() -> Vec<LineItem> {
    vec![
        LineItemBuilder::new("Website redesign", dec!(2), dec!(50)).build(),
        LineItemBuilder::new("Domain renewal", dec!(1), dec!(30)).build(),
    ]
}

fn draft(discount: DiscountRule, conversion: ConversionRule) -> InvoiceDraft {
    InvoiceDraft {
        line_items: two_lines(),
        discount,
        conversion,
    }
}

// --- Discounts ---

#[test]
fn percentage_discount_without_conversion() {
    let totals = draft(DiscountRule::Percentage(dec!(10)), ConversionRule::none("USD")).totals();

    assert_eq!(totals.subtotal, dec!(130));
    assert_eq!(totals.discount_amount, dec!(13));
    assert_eq!(totals.total_after_discount, dec!(117));
    assert_eq!(totals.grand_total, dec!(117));
    assert_eq!(totals.display_currency, "USD");
}

#[test]
fn fixed_discount_larger_than_subtotal_goes_negative() {
    let totals = draft(DiscountRule::FixedAmount(dec!(200)), ConversionRule::none("USD")).totals();

    assert_eq!(totals.discount_amount, dec!(200));
    assert_eq!(totals.total_after_discount, dec!(-70));
    assert_eq!(totals.grand_total, dec!(-70));
}

#[test]
fn no_discount() {
    let totals = draft(DiscountRule::None, ConversionRule::none("EUR")).totals();
    assert_eq!(totals.discount_amount, Decimal::ZERO);
    assert_eq!(totals.total_after_discount, totals.subtotal);
}

// --- Conversion ---

#[test]
fn conversion_to_lari() {
    let totals = draft(DiscountRule::None, ConversionRule::new("USD", "GEL", dec!(2.7))).totals();

    assert_eq!(totals.subtotal, dec!(130));
    assert_eq!(totals.grand_total, dec!(351));
    assert_eq!(totals.display_currency, "GEL");
    assert_eq!(totals.formatted_grand_total(), "351.00 GEL");
}

#[test]
fn zero_rate_is_not_a_conversion() {
    let totals = draft(DiscountRule::None, ConversionRule::new("USD", "EUR", dec!(0))).totals();
    assert_eq!(totals.grand_total, totals.total_after_discount);
    assert_eq!(totals.display_currency, "USD");
}

#[test]
fn tiny_rate_is_a_conversion() {
    let totals =
        draft(DiscountRule::None, ConversionRule::new("USD", "EUR", dec!(0.0001))).totals();
    assert_eq!(totals.grand_total, dec!(0.013));
    assert_eq!(totals.display_currency, "EUR");
}

#[test]
fn missing_rate_is_not_a_conversion() {
    let conversion = ConversionRule {
        source_currency: "USD".into(),
        target_currency: Some("EUR".into()),
        exchange_rate: None,
    };
    let totals = draft(DiscountRule::None, conversion).totals();
    assert_eq!(totals.display_currency, "USD");
}

#[test]
fn same_currency_conversion_multiplies_literally() {
    let totals = draft(DiscountRule::None, ConversionRule::new("USD", "USD", dec!(2))).totals();
    assert_eq!(totals.grand_total, dec!(260));
    assert_eq!(totals.display_currency, "USD");
}

#[test]
fn discount_then_conversion() {
    let totals = draft(
        DiscountRule::Percentage(dec!(10)),
        ConversionRule::new("USD", "GEL", dec!(2.7)),
    )
    .totals();
    assert_eq!(totals.total_after_discount, dec!(117));
    assert_eq!(totals.grand_total, dec!(315.9));
}

// --- Display ---

#[test]
fn rounding_is_display_only() {
    let lines = vec![LineItem::new("Hours", dec!(3), dec!(33.333))];
    let totals = compute_totals(&lines, &DiscountRule::None, &ConversionRule::none("USD"));

    assert_eq!(totals.grand_total, dec!(99.999));
    assert_eq!(totals.rounded().grand_total, dec!(100.00));
    // the stored value is untouched
    assert_eq!(totals.grand_total, dec!(99.999));
    assert_eq!(totals.formatted_grand_total(), "100.00 USD");
}

// --- Invoice aggregate ---

#[test]
fn invoice_totals_are_derived_from_the_draft() {
    let d = draft(DiscountRule::Percentage(dec!(10)), ConversionRule::none("USD"));
    let invoice = Invoice::create("INV-1".into(), InvoiceStatus::Draft, d.clone()).unwrap();
    assert_eq!(invoice.totals(), &d.totals());
    assert_eq!(invoice.line_items().len(), 2);
    assert!(invoice.cancellation().is_none());
}

#[test]
fn revise_recomputes_totals() {
    let invoice = Invoice::create(
        "INV-2".into(),
        InvoiceStatus::Pending,
        draft(DiscountRule::None, ConversionRule::none("USD")),
    )
    .unwrap();

    let revised = invoice
        .revise(draft(DiscountRule::FixedAmount(dec!(30)), ConversionRule::none("USD")))
        .unwrap();
    assert_eq!(revised.totals().grand_total, dec!(100));
    assert_eq!(revised.status(), InvoiceStatus::Pending);
    assert_eq!(invoice.totals().grand_total, dec!(130));
}

#[test]
fn cannot_create_canceled_invoice() {
    let result = Invoice::create(
        "INV-3".into(),
        InvoiceStatus::Canceled,
        draft(DiscountRule::None, ConversionRule::none("USD")),
    );
    assert!(matches!(result, Err(BillingError::InconsistentRecord(_))));
}

#[test]
fn status_parsing() {
    assert_eq!("pending".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Pending);
    assert_eq!("CANCELLED".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Canceled);
    assert!("archived".parse::<InvoiceStatus>().is_err());
    assert_eq!(InvoiceStatus::Overdue.to_string(), "OVERDUE");
    assert!(InvoiceStatus::Canceled.is_terminal());
    assert!(!InvoiceStatus::Paid.is_terminal());
}
