//! # billdesk
//!
//! Invoice arithmetic and lifecycle rules for back-office invoicing
//! dashboards: line-item totals, percentage and fixed discounts, optional
//! currency conversion, and the one-way transition into `CANCELED`.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//! Totals keep full precision; rounding to cents happens only for display.
//!
//! ## Quick Start
//!
//! ```rust
//! use billdesk::*;
//! use rust_decimal_macros::dec;
//!
//! let draft = InvoiceDraftBuilder::new("USD")
//!     .add_line(LineItem::new("Consulting", dec!(2), dec!(50)))
//!     .add_line(LineItem::new("Hosting", dec!(1), dec!(30)))
//!     .percentage_discount(dec!(10))
//!     .build()
//!     .unwrap();
//!
//! let totals = draft.totals();
//! assert_eq!(totals.subtotal, dec!(130));
//! assert_eq!(totals.discount_amount, dec!(13));
//! assert_eq!(totals.grand_total, dec!(117));
//! assert!(validate_draft(&draft).is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Model, total engine, cancellation lifecycle, advisory validation |
//! | `repository` | Repository port, wire payloads, in-memory repository, `InvoiceDesk`, permissions |
//! | `rest` | REST-backed repository over `reqwest` |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "repository")]
pub mod repository;

#[cfg(feature = "repository")]
pub mod desk;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
