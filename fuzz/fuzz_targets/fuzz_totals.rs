#![no_main]

use billdesk::{
    ConversionRule, DiscountRule, InvoiceDraft, LineItem, compute_totals, validate_draft,
};
use libfuzzer_sys::fuzz_target;

fn floats(data: &[u8]) -> Vec<f64> {
    data.chunks_exact(8)
        .map(|chunk| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            f64::from_le_bytes(bytes)
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let values = floats(data);
    let Some((&rate, rest)) = values.split_first() else {
        return;
    };
    let Some((&percent, rest)) = rest.split_first() else {
        return;
    };

    let line_items: Vec<LineItem> = rest
        .chunks(2)
        .map(|pair| LineItem::from_f64("fuzz", pair[0], pair.get(1).copied().unwrap_or(0.0)))
        .collect();
    let discount = billdesk::core::money::amount_from_f64(percent)
        .map(DiscountRule::Percentage)
        .unwrap_or_default();
    let conversion = ConversionRule {
        source_currency: "USD".into(),
        target_currency: Some("EUR".into()),
        exchange_rate: billdesk::core::money::amount_from_f64(rate),
    };

    let totals = compute_totals(&line_items, &discount, &conversion);
    let _ = totals.rounded();

    let draft = InvoiceDraft {
        line_items,
        discount,
        conversion,
    };
    let _ = validate_draft(&draft);
});
