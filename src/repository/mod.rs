//! Invoice repository port and its adapters.
//!
//! The core never performs I/O. This module defines the boundary to the
//! backend that stores invoices: the wire payloads, an async repository
//! trait, an in-memory implementation and (with the `rest` feature) an
//! HTTP implementation.
//!
//! # Example
//!
//! ```
//! use billdesk::*;
//! use billdesk::repository::{InvoicePayload, InvoiceRepository, MemoryRepository};
//! use rust_decimal_macros::dec;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let repo = MemoryRepository::new();
//! let draft = InvoiceDraftBuilder::new("USD")
//!     .add_line(LineItem::new("Widget", dec!(3), dec!(10)))
//!     .build()
//!     .unwrap();
//!
//! let invoice = repo.create(&InvoicePayload::from_draft(&draft)).await.unwrap();
//! assert_eq!(invoice.id().as_str(), "INV-000001");
//! assert_eq!(invoice.totals().grand_total, dec!(30));
//! # });
//! ```

mod memory;
mod payload;
#[cfg(feature = "rest")]
mod rest;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{BillingError, Invoice, InvoiceId};

pub use memory::MemoryRepository;
pub use payload::{CancelPayload, InvoicePayload, InvoiceResponse, LineItemPayload, TotalsPayload};
#[cfg(feature = "rest")]
pub use rest::{RestConfig, RestRepository};

/// Errors reported by a repository. Calls either fully succeed or fully fail.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RepositoryError {
    /// Connection, timeout or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The backend's response could not be understood.
    #[error("failed to parse backend response: {0}")]
    Parse(String),

    #[error("invoice {0} not found")]
    NotFound(InvoiceId),

    /// The stored invoice does not allow the requested change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored record violates the invoice invariants.
    #[error("invalid invoice record: {0}")]
    InvalidRecord(#[from] BillingError),

    /// The adapter could not be set up or its state is unusable.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage for invoices, usually a REST backend.
///
/// Ids and initial statuses are assigned by the repository. Returned
/// invoices always carry totals recomputed from their line items.
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Persist a new invoice.
    async fn create(&self, payload: &InvoicePayload) -> Result<Invoice, RepositoryError>;

    /// Replace the line items, discount and conversion of an invoice.
    async fn update(
        &self,
        id: &InvoiceId,
        payload: &InvoicePayload,
    ) -> Result<Invoice, RepositoryError>;

    /// Record the cancellation of an invoice.
    async fn cancel(&self, id: &InvoiceId, payload: &CancelPayload) -> Result<(), RepositoryError>;

    /// Read an invoice; `None` if it does not exist.
    async fn find(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError>;
}
