use billdesk::core::*;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A USD invoice shown to the customer in Georgian lari
    let draft = InvoiceDraftBuilder::new("USD")
        .add_line(LineItemBuilder::new("Website redesign", dec!(2), dec!(50)).build())
        .add_line(LineItemBuilder::new("Domain renewal", dec!(1), dec!(30)).build())
        // a row typed in by hand, quantity left as "two"
        .add_line(LineItemBuilder::from_form("Extra support hours", "two", "45").build())
        .percentage_discount(dec!(10))
        .convert_to("GEL", dec!(2.7))
        .build()
        .expect("draft should be valid");

    for finding in validate_draft(&draft) {
        println!("warning: {finding}");
    }

    let totals = draft.totals().rounded();
    println!("---");
    for line in &draft.line_items {
        println!(
            "  {:<22} {}",
            line.description,
            money::format_amount(line.line_total(), &draft.conversion.source_currency)
        );
    }
    println!("---");
    let source = &draft.conversion.source_currency;
    println!("Subtotal:  {}", money::format_amount(totals.subtotal, source));
    println!("Discount:  {}", money::format_amount(totals.discount_amount, source));
    println!("After:     {}", money::format_amount(totals.total_after_discount, source));
    println!("Total:     {}", totals.formatted_grand_total());
}
