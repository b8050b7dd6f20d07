#![no_main]

use billdesk::Invoice;
use billdesk::repository::InvoiceResponse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Errors are fine, panics are bugs.
    if let Ok(response) = serde_json::from_slice::<InvoiceResponse>(data) {
        if let Ok(invoice) = Invoice::try_from(response) {
            let _ = invoice.totals().formatted_grand_total();
        }
    }
});
