//! Invoice model, total engine and cancellation lifecycle.
//!
//! Everything in this module is synchronous and free of I/O, so it can run
//! on every keystroke of an invoice form.

mod builder;
pub mod currencies;
mod error;
mod lifecycle;
pub mod money;
mod totals;
mod types;
mod validation;

pub use builder::*;
pub use currencies::{is_known_currency_code, normalize_currency_code};
pub use error::*;
pub use lifecycle::*;
pub use totals::compute_totals;
pub use types::*;
pub use validation::*;
