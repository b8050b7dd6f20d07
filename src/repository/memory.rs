use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::core::{
    CancellationError, CancellationPolicy, Invoice, InvoiceId, InvoiceStatus, cancel_at,
};

use super::{CancelPayload, InvoicePayload, InvoiceRepository, RepositoryError};

/// In-process stand-in for the invoice backend.
///
/// Assigns sequential ids (`INV-000001`, ...), stores new invoices as
/// `PENDING`, and applies the same cancellation rules a backend would.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    policy: CancellationPolicy,
}

#[derive(Debug, Default)]
struct State {
    last_id: u64,
    invoices: BTreeMap<InvoiceId, Invoice>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CancellationPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Store an invoice as-is, replacing any invoice with the same id.
    pub fn insert(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        self.state()?
            .invoices
            .insert(invoice.id().clone(), invoice);
        Ok(())
    }

    /// Number of stored invoices.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.state()?.invoices.len())
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("invoice store lock poisoned".into()))
    }
}

#[async_trait]
impl InvoiceRepository for MemoryRepository {
    async fn create(&self, payload: &InvoicePayload) -> Result<Invoice, RepositoryError> {
        let draft = payload.to_draft()?;
        let mut state = self.state()?;
        let id = InvoiceId::new(format!("INV-{:06}", state.last_id + 1));
        let invoice = Invoice::create(id.clone(), InvoiceStatus::Pending, draft)?;
        state.last_id += 1;
        state.invoices.insert(id, invoice.clone());
        debug!(invoice_id = %invoice.id(), "stored new invoice");
        Ok(invoice)
    }

    async fn update(
        &self,
        id: &InvoiceId,
        payload: &InvoicePayload,
    ) -> Result<Invoice, RepositoryError> {
        let draft = payload.to_draft()?;
        let mut state = self.state()?;
        let stored = state
            .invoices
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        if stored.is_canceled() {
            return Err(RepositoryError::Conflict(format!(
                "invoice {id} is canceled"
            )));
        }
        *stored = stored.revise(draft)?;
        Ok(stored.clone())
    }

    async fn cancel(&self, id: &InvoiceId, payload: &CancelPayload) -> Result<(), RepositoryError> {
        let mut state = self.state()?;
        let stored = state
            .invoices
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        let at = payload.canceled_at.unwrap_or_else(Utc::now);
        *stored = cancel_at(stored, &payload.cancel_reason, at, &self.policy).map_err(
            |e| match e {
                CancellationError::AlreadyCanceled => {
                    RepositoryError::Conflict(format!("invoice {id} is already canceled"))
                }
                other => RepositoryError::Api {
                    status: 422,
                    body: other.to_string(),
                },
            },
        )?;
        Ok(())
    }

    async fn find(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Ok(self.state()?.invoices.get(id).cloned())
    }
}
