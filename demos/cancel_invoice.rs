use billdesk::core::*;
use billdesk::desk::{Action, DeskError, InvoiceDesk, RoleTable};
use billdesk::repository::MemoryRepository;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), DeskError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let roles = RoleTable::new()
        .grant("manager", Action::ALL)
        .grant("clerk", [Action::Create, Action::View]);
    let desk = InvoiceDesk::new(MemoryRepository::new(), roles);

    let draft = InvoiceDraftBuilder::new("EUR")
        .add_line(LineItemBuilder::new("Annual licence", dec!(1), dec!(1200)).build())
        .fixed_discount(dec!(200))
        .build()?;
    let invoice = desk.submit("clerk", &draft).await?;
    println!("{} created: {}", invoice.id(), invoice.totals().formatted_grand_total());

    // clerks cannot cancel
    if let Err(err) = desk.cancel("clerk", &invoice, "entered twice by mistake").await {
        println!("rejected: {err}");
    }
    // too short
    if let Err(err) = desk.cancel("manager", &invoice, "dup").await {
        println!("rejected: {err}");
    }

    let canceled = desk
        .cancel("manager", &invoice, "entered twice by mistake")
        .await?;
    if let Some(record) = canceled.cancellation() {
        println!(
            "{} is {} since {}: {}",
            canceled.id(),
            canceled.status(),
            record.canceled_at,
            record.reason
        );
    }

    if let Err(err) = desk.cancel("manager", &canceled, "trying once more").await {
        println!("rejected: {err}");
    }
    Ok(())
}
