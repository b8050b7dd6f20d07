//! Invoice back-office operations: the core wired to a repository and a
//! permission gate.
//!
//! Each operation checks the caller's role first, then runs the core rules,
//! then makes exactly one repository call. When the repository call fails
//! the caller still holds its original, unmodified snapshot.

mod permissions;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::{
    BillingError, CancellationError, CancellationPolicy, Invoice, InvoiceDraft, InvoiceId,
    cancel_at,
};
use crate::repository::{CancelPayload, InvoicePayload, InvoiceRepository, RepositoryError};

pub use permissions::{Action, AllowAll, PermissionGate, RoleTable};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeskError {
    #[error("role '{role}' may not {action} invoices")]
    PermissionDenied { role: String, action: Action },

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Cancellation(#[from] CancellationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Front door for invoice operations.
pub struct InvoiceDesk<R, G> {
    repository: R,
    gate: G,
    policy: CancellationPolicy,
}

impl<R: InvoiceRepository, G: PermissionGate> InvoiceDesk<R, G> {
    pub fn new(repository: R, gate: G) -> Self {
        Self {
            repository,
            gate,
            policy: CancellationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CancellationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn authorize(&self, role: &str, action: Action) -> Result<(), DeskError> {
        if self.gate.allows(role, action) {
            Ok(())
        } else {
            warn!(role, %action, "permission denied");
            Err(DeskError::PermissionDenied {
                role: role.to_string(),
                action,
            })
        }
    }

    /// Compute totals for `draft` and persist it as a new invoice.
    pub async fn submit(&self, role: &str, draft: &InvoiceDraft) -> Result<Invoice, DeskError> {
        self.authorize(role, Action::Create)?;
        let payload = InvoicePayload::from_draft(draft);
        let invoice = self.repository.create(&payload).await?;
        info!(invoice_id = %invoice.id(), grand_total = %invoice.totals().grand_total, "invoice submitted");
        Ok(invoice)
    }

    /// Replace the draft of `invoice`. Canceled invoices are rejected before
    /// anything is sent.
    pub async fn revise(
        &self,
        role: &str,
        invoice: &Invoice,
        draft: InvoiceDraft,
    ) -> Result<Invoice, DeskError> {
        self.authorize(role, Action::Update)?;
        let revised = invoice.revise(draft)?;
        let payload = InvoicePayload::from_invoice(&revised);
        let stored = self.repository.update(revised.id(), &payload).await?;
        info!(invoice_id = %stored.id(), "invoice revised");
        Ok(stored)
    }

    /// Cancel `invoice` with `reason` and persist the cancellation.
    ///
    /// Returns the canceled snapshot. Validation failures never reach the
    /// repository.
    pub async fn cancel(
        &self,
        role: &str,
        invoice: &Invoice,
        reason: &str,
    ) -> Result<Invoice, DeskError> {
        self.authorize(role, Action::Cancel)?;
        let canceled = cancel_at(invoice, reason, Utc::now(), &self.policy)?;
        self.repository
            .cancel(canceled.id(), &CancelPayload::from(&canceled))
            .await?;
        Ok(canceled)
    }

    /// Read-only fetch of an invoice.
    pub async fn view(&self, role: &str, id: &InvoiceId) -> Result<Invoice, DeskError> {
        self.authorize(role, Action::View)?;
        self.repository
            .find(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.clone()).into())
    }
}
