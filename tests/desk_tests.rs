#![cfg(feature = "repository")]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use billdesk::desk::{Action, AllowAll, DeskError, InvoiceDesk, RoleTable};
use billdesk::repository::{
    CancelPayload, InvoicePayload, InvoiceRepository, MemoryRepository, RepositoryError,
};
use billdesk::*;
use rust_decimal_macros::dec;

fn roles() -> RoleTable {
    RoleTable::new()
        .grant("admin", Action::ALL)
        .grant("accountant", [Action::Create, Action::Update, Action::View])
        .grant("viewer", [Action::View])
}

fn draft() -> InvoiceDraft {
    InvoiceDraftBuilder::new("USD")
        .add_line(LineItem::new("Consulting", dec!(2), dec!(50)))
        .add_line(LineItem::new("Hosting", dec!(1), dec!(30)))
        .percentage_discount(dec!(10))
        .build()
        .unwrap()
}

/// Counts cancel calls that reach the backend.
#[derive(Default)]
struct CountingRepository {
    inner: MemoryRepository,
    cancels: AtomicUsize,
}

#[async_trait]
impl InvoiceRepository for CountingRepository {
    async fn create(&self, payload: &InvoicePayload) -> Result<Invoice, RepositoryError> {
        self.inner.create(payload).await
    }

    async fn update(
        &self,
        id: &InvoiceId,
        payload: &InvoicePayload,
    ) -> Result<Invoice, RepositoryError> {
        self.inner.update(id, payload).await
    }

    async fn cancel(&self, id: &InvoiceId, payload: &CancelPayload) -> Result<(), RepositoryError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.inner.cancel(id, payload).await
    }

    async fn find(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        self.inner.find(id).await
    }
}

/// A backend that is always down.
struct OfflineRepository;

#[async_trait]
impl InvoiceRepository for OfflineRepository {
    async fn create(&self, _: &InvoicePayload) -> Result<Invoice, RepositoryError> {
        Err(RepositoryError::Network("connection refused".into()))
    }

    async fn update(&self, _: &InvoiceId, _: &InvoicePayload) -> Result<Invoice, RepositoryError> {
        Err(RepositoryError::Network("connection refused".into()))
    }

    async fn cancel(&self, _: &InvoiceId, _: &CancelPayload) -> Result<(), RepositoryError> {
        Err(RepositoryError::Network("connection refused".into()))
    }

    async fn find(&self, _: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Err(RepositoryError::Network("connection refused".into()))
    }
}

#[tokio::test]
async fn submit_persists_computed_totals() {
    let desk = InvoiceDesk::new(MemoryRepository::new(), roles());
    let invoice = desk.submit("accountant", &draft()).await.unwrap();

    assert_eq!(invoice.status(), InvoiceStatus::Pending);
    assert_eq!(invoice.totals().grand_total, dec!(117));

    let viewed = desk.view("viewer", invoice.id()).await.unwrap();
    assert_eq!(viewed, invoice);
}

#[tokio::test]
async fn revise_updates_stored_invoice() {
    let desk = InvoiceDesk::new(MemoryRepository::new(), roles());
    let invoice = desk.submit("admin", &draft()).await.unwrap();

    let mut changed = draft();
    changed.conversion = ConversionRule::new("USD", "GEL", dec!(2.7));
    let revised = desk.revise("accountant", &invoice, changed).await.unwrap();

    assert_eq!(revised.totals().grand_total, dec!(315.9));
    assert_eq!(revised.totals().display_currency, "GEL");
    let stored = desk.repository().find(invoice.id()).await.unwrap().unwrap();
    assert_eq!(stored.totals(), revised.totals());
}

#[tokio::test]
async fn cancel_flow() {
    let desk = InvoiceDesk::new(MemoryRepository::new(), roles());
    let invoice = desk.submit("admin", &draft()).await.unwrap();

    let canceled = desk
        .cancel("admin", &invoice, "Customer requested refund due to duplicate charge")
        .await
        .unwrap();
    assert!(canceled.is_canceled());
    assert!(!invoice.is_canceled());

    let stored = desk.view("viewer", invoice.id()).await.unwrap();
    assert_eq!(stored, canceled);
    assert!(stored.is_canceled());
    assert_eq!(
        stored.cancellation().unwrap().reason,
        "Customer requested refund due to duplicate charge"
    );

    let err = desk
        .revise("admin", &canceled, draft())
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Billing(BillingError::Canceled(_))));
}

#[tokio::test]
async fn permission_is_checked_first() {
    let desk = InvoiceDesk::new(CountingRepository::default(), roles());
    let invoice = desk.submit("admin", &draft()).await.unwrap();

    let err = desk
        .cancel("accountant", &invoice, "ok")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DeskError::PermissionDenied { action: Action::Cancel, .. }
    ));
    assert_eq!(err.to_string(), "role 'accountant' may not cancel invoices");

    let err = desk.submit("stranger", &draft()).await.unwrap_err();
    assert!(matches!(err, DeskError::PermissionDenied { .. }));
    assert_eq!(desk.repository().cancels.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_reasons_never_reach_the_backend() {
    let desk = InvoiceDesk::new(CountingRepository::default(), AllowAll);
    let invoice = desk.submit("any", &draft()).await.unwrap();

    let err = desk.cancel("any", &invoice, "ok").await.unwrap_err();
    assert!(matches!(
        err,
        DeskError::Cancellation(CancellationError::ReasonTooShort { min: 10, actual: 2 })
    ));

    let canceled = desk
        .cancel("any", &invoice, "sent to the wrong address")
        .await
        .unwrap();
    let err = desk
        .cancel("any", &canceled, "sent to the wrong address")
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Cancellation(CancellationError::AlreadyCanceled)));

    assert_eq!(desk.repository().cancels.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stale_snapshot_cancel_is_rejected_by_the_backend() {
    let desk = InvoiceDesk::new(MemoryRepository::new(), AllowAll);
    let invoice = desk.submit("any", &draft()).await.unwrap();
    desk.cancel("any", &invoice, "first cancellation").await.unwrap();

    // `invoice` is an old, non-canceled snapshot
    let err = desk
        .cancel("any", &invoice, "second cancellation")
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Repository(RepositoryError::Conflict(_))));
}

#[tokio::test]
async fn custom_policy_is_applied() {
    let policy = CancellationPolicy {
        min_reason_chars: 20,
        max_reason_chars: 40,
    };
    let desk = InvoiceDesk::new(MemoryRepository::with_policy(policy), AllowAll).with_policy(policy);
    let invoice = desk.submit("any", &draft()).await.unwrap();

    let err = desk.cancel("any", &invoice, "fifteen letters").await.unwrap_err();
    assert!(matches!(
        err,
        DeskError::Cancellation(CancellationError::ReasonTooShort { min: 20, actual: 15 })
    ));
}

#[tokio::test]
async fn failed_persist_keeps_original_snapshot() {
    let desk = InvoiceDesk::new(OfflineRepository, AllowAll);
    let invoice = Invoice::create("INV-9".into(), InvoiceStatus::Pending, draft()).unwrap();

    let err = desk
        .cancel("any", &invoice, "network test cancellation")
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Repository(RepositoryError::Network(_))));
    assert_eq!(invoice.status(), InvoiceStatus::Pending);
    assert!(invoice.cancellation().is_none());
}

#[tokio::test]
async fn view_missing_invoice() {
    let desk = InvoiceDesk::new(MemoryRepository::new(), roles());
    let err = desk.view("viewer", &"INV-404".into()).await.unwrap_err();
    assert!(matches!(err, DeskError::Repository(RepositoryError::NotFound(_))));
}
