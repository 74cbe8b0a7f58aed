//! Checkout widget bridge
//!
//! Opening a checkout hands back a single-shot receiver. The widget fires it
//! once with either `Success` or `Cancelled`; a registration is created only on
//! `Success`. Successful checkouts still leave the registration `Pending`.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::models::{Event, Registration, RegistrationDraft};
use crate::state::SharedEventStore;

pub const CURRENCY: &str = "INR";
pub const THEME_COLOR: &str = "#9b87f5";

/// Checkouts left open at once; opening one more drops the oldest
pub const MAX_OPEN_CHECKOUTS: usize = 256;

/// Fees in rupees to paise
pub fn to_minor_units(fees: f64) -> i64 {
    (fees * 100.0).round() as i64
}

/// What the checkout widget is opened with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub key: String,
    pub order_id: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub prefill: Prefill,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub color: String,
}

impl PaymentRequest {
    pub fn for_registration(key: &str, event: &Event, draft: &RegistrationDraft) -> Self {
        Self {
            key: key.to_string(),
            order_id: format!("order_{}", uuid::Uuid::new_v4().simple()),
            amount: to_minor_units(event.fees),
            currency: CURRENCY.to_string(),
            name: event.name.clone(),
            description: format!("Registration for {}", event.name),
            prefill: Prefill {
                name: draft.full_name.clone(),
                email: draft.email.clone(),
                contact: draft.phone.clone(),
            },
            theme: Theme {
                color: THEME_COLOR.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Success { tx_ref: String },
    Cancelled,
}

impl PaymentOutcome {
    pub fn success() -> Self {
        PaymentOutcome::Success {
            tx_ref: format!("pay_{}", uuid::Uuid::new_v4().simple()),
        }
    }
}

/// A checkout UI that reports back exactly once
pub trait CheckoutWidget: Send + Sync {
    fn open(&self, request: PaymentRequest) -> oneshot::Receiver<PaymentOutcome>;
}

struct PendingCheckout {
    request: PaymentRequest,
    callback: oneshot::Sender<PaymentOutcome>,
}

#[derive(Default)]
struct OpenCheckouts {
    by_order: HashMap<String, PendingCheckout>,
    /// Order ids, oldest first
    order: VecDeque<String>,
}

/// Mock widget rendered by the web layer; its pay/cancel buttons call `resolve`
pub struct HostedCheckout {
    checkouts: Mutex<OpenCheckouts>,
    capacity: usize,
}

impl HostedCheckout {
    pub fn new() -> Self {
        Self::with_capacity(MAX_OPEN_CHECKOUTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            checkouts: Mutex::new(OpenCheckouts::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn request(&self, order_id: &str) -> Option<PaymentRequest> {
        self.checkouts
            .lock()
            .by_order
            .get(order_id)
            .map(|p| p.request.clone())
    }

    /// Fire the callback for an open checkout. Returns false when the order is
    /// unknown or was already resolved.
    pub fn resolve(&self, order_id: &str, outcome: PaymentOutcome) -> bool {
        let pending = {
            let mut checkouts = self.checkouts.lock();
            let Some(pending) = checkouts.by_order.remove(order_id) else {
                return false;
            };
            checkouts.order.retain(|id| id != order_id);
            pending
        };
        pending.callback.send(outcome).is_ok()
    }

    pub fn pending_count(&self) -> usize {
        self.checkouts.lock().by_order.len()
    }

    /// Open a checkout, dropping the oldest open one when at capacity.
    /// Returns the receiver and the order id that was dropped, if any.
    ///
    /// A dropped checkout loses its sender, so whoever awaits it sees the
    /// widget close without a result.
    pub fn open_evicting(
        &self,
        request: PaymentRequest,
    ) -> (oneshot::Receiver<PaymentOutcome>, Option<String>) {
        let (callback, outcome) = oneshot::channel();
        info!(
            "Opening checkout {} for {} {} ({})",
            request.order_id, request.amount, request.currency, request.name
        );

        let mut checkouts = self.checkouts.lock();
        let evicted = if checkouts.by_order.len() >= self.capacity {
            checkouts.order.pop_front().map(|oldest| {
                checkouts.by_order.remove(&oldest);
                warn!("Too many open checkouts, dropping {}", oldest);
                oldest
            })
        } else {
            None
        };
        checkouts.order.push_back(request.order_id.clone());
        checkouts
            .by_order
            .insert(request.order_id.clone(), PendingCheckout { request, callback });

        (outcome, evicted)
    }
}

impl Default for HostedCheckout {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutWidget for HostedCheckout {
    fn open(&self, request: PaymentRequest) -> oneshot::Receiver<PaymentOutcome> {
        self.open_evicting(request).0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutResult {
    Registered {
        registration: Registration,
        tx_ref: String,
    },
    Cancelled,
}

/// Wait for the widget and record the registration on success
pub async fn settle_checkout(
    outcome: oneshot::Receiver<PaymentOutcome>,
    store: SharedEventStore,
    draft: RegistrationDraft,
) -> CheckoutResult {
    match outcome.await {
        Ok(PaymentOutcome::Success { tx_ref }) => {
            let registration = store.write().await.add_registration(draft).await;
            info!(
                "Payment {} accepted for registration {}",
                tx_ref, registration.id
            );
            CheckoutResult::Registered {
                registration,
                tx_ref,
            }
        }
        Ok(PaymentOutcome::Cancelled) => {
            info!(
                "Payment cancelled by {} for '{}'",
                draft.full_name, draft.event_name
            );
            CheckoutResult::Cancelled
        }
        Err(_) => {
            warn!(
                "Checkout for '{}' closed without a result",
                draft.event_name
            );
            CheckoutResult::Cancelled
        }
    }
}

/// Open checkouts and the tasks waiting on them
pub struct CheckoutDesk {
    key_id: String,
    widget: HostedCheckout,
    waiting: Mutex<HashMap<String, JoinHandle<CheckoutResult>>>,
}

impl CheckoutDesk {
    pub fn new(key_id: impl Into<String>) -> Self {
        Self::with_capacity(key_id, MAX_OPEN_CHECKOUTS)
    }

    pub fn with_capacity(key_id: impl Into<String>, capacity: usize) -> Self {
        Self {
            key_id: key_id.into(),
            widget: HostedCheckout::with_capacity(capacity),
            waiting: Mutex::new(HashMap::new()),
        }
    }

    pub fn widget(&self) -> &HostedCheckout {
        &self.widget
    }

    /// Open the widget for a validated registration form
    pub fn start(
        &self,
        store: SharedEventStore,
        event: &Event,
        draft: RegistrationDraft,
    ) -> PaymentRequest {
        let request = PaymentRequest::for_registration(&self.key_id, event, &draft);
        let order_id = request.order_id.clone();
        let (outcome, evicted) = self.widget.open_evicting(request.clone());
        let task = tokio::spawn(settle_checkout(outcome, store, draft));

        let mut waiting = self.waiting.lock();
        if let Some(evicted) = evicted {
            // the detached task settles as cancelled on its own
            waiting.remove(&evicted);
        }
        waiting.insert(order_id, task);
        request
    }

    /// Deliver the widget callback and wait for the registration side effect.
    /// `None` when the order is unknown or already finished.
    pub async fn finish(&self, order_id: &str, outcome: PaymentOutcome) -> Option<CheckoutResult> {
        if !self.widget.resolve(order_id, outcome) {
            return None;
        }
        let task = self.waiting.lock().remove(order_id)?;
        match task.await {
            Ok(result) => Some(result),
            Err(e) => {
                error!("Checkout task for {} failed: {}", order_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentOption, PaymentStatus};
    use crate::state::{create_shared_event_store, EventStore, Storage};

    fn draft_for(event: &Event) -> RegistrationDraft {
        RegistrationDraft {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            full_name: "Kiran Das".to_string(),
            email: "kiran@example.com".to_string(),
            phone: "9123456780".to_string(),
            college: "Commerce".to_string(),
            payment_option: PaymentOption::NetBanking,
        }
    }

    async fn shared_store(dir: &tempfile::TempDir) -> SharedEventStore {
        create_shared_event_store(EventStore::hydrate(Storage::new(dir.path())).await)
    }

    /// Widget that answers immediately with a fixed outcome
    struct InstantWidget(PaymentOutcome);

    impl CheckoutWidget for InstantWidget {
        fn open(&self, _request: PaymentRequest) -> oneshot::Receiver<PaymentOutcome> {
            let (tx, rx) = oneshot::channel();
            let _ = tx.send(self.0.clone());
            rx
        }
    }

    #[test]
    fn test_request_fields() {
        let event = crate::state::seed::seed_events().remove(0);
        let request = PaymentRequest::for_registration("rzp_test_key", &event, &draft_for(&event));

        assert_eq!(request.amount, 150_000);
        assert_eq!(request.currency, "INR");
        assert_eq!(request.description, "Registration for Tech Innovation Summit 2025");
        assert_eq!(request.prefill.contact, "9123456780");
        assert_eq!(request.theme.color, "#9b87f5");
        assert!(request.order_id.starts_with("order_"));
    }

    #[test]
    fn test_minor_units_round() {
        assert_eq!(to_minor_units(499.99), 49_999);
        assert_eq!(to_minor_units(0.0), 0);
        assert_eq!(to_minor_units(12.5), 1_250);
    }

    #[tokio::test]
    async fn test_success_creates_pending_registration() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("3").unwrap().clone();

        let widget = InstantWidget(PaymentOutcome::Success {
            tx_ref: "pay_123".to_string(),
        });
        let request = PaymentRequest::for_registration("key", &event, &draft_for(&event));
        let result = settle_checkout(widget.open(request), store.clone(), draft_for(&event)).await;

        let CheckoutResult::Registered { registration, tx_ref } = result else {
            panic!("expected a registration");
        };
        assert_eq!(tx_ref, "pay_123");
        assert_eq!(registration.payment_status, PaymentStatus::Pending);
        assert_eq!(store.read().await.list_registrations(), &[registration]);
    }

    #[tokio::test]
    async fn test_cancel_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("1").unwrap().clone();

        let widget = InstantWidget(PaymentOutcome::Cancelled);
        let request = PaymentRequest::for_registration("key", &event, &draft_for(&event));
        let result = settle_checkout(widget.open(request), store.clone(), draft_for(&event)).await;

        assert_eq!(result, CheckoutResult::Cancelled);
        assert!(store.read().await.list_registrations().is_empty());
    }

    #[tokio::test]
    async fn test_desk_resolves_each_order_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("2").unwrap().clone();
        let desk = CheckoutDesk::new("key");

        let request = desk.start(store.clone(), &event, draft_for(&event));
        assert_eq!(desk.widget().pending_count(), 1);
        assert_eq!(desk.widget().request(&request.order_id), Some(request.clone()));

        let result = desk
            .finish(&request.order_id, PaymentOutcome::success())
            .await
            .unwrap();
        assert!(matches!(result, CheckoutResult::Registered { .. }));
        assert_eq!(desk.widget().pending_count(), 0);

        // a second callback for the same order does nothing
        assert!(desk
            .finish(&request.order_id, PaymentOutcome::success())
            .await
            .is_none());
        assert_eq!(store.read().await.list_registrations().len(), 1);
    }

    #[tokio::test]
    async fn test_desk_dismiss() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("4").unwrap().clone();
        let desk = CheckoutDesk::new("key");

        let request = desk.start(store.clone(), &event, draft_for(&event));
        let result = desk
            .finish(&request.order_id, PaymentOutcome::Cancelled)
            .await;

        assert_eq!(result, Some(CheckoutResult::Cancelled));
        assert!(store.read().await.list_registrations().is_empty());
        assert!(desk.finish("order_unknown", PaymentOutcome::Cancelled).await.is_none());
    }

    #[tokio::test]
    async fn test_oldest_checkout_is_dropped_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("3").unwrap().clone();
        let widget = HostedCheckout::with_capacity(2);

        let first = PaymentRequest::for_registration("key", &event, &draft_for(&event));
        let (first_rx, evicted) = widget.open_evicting(first.clone());
        assert!(evicted.is_none());
        widget.open(PaymentRequest::for_registration("key", &event, &draft_for(&event)));
        let (_third_rx, evicted) =
            widget.open_evicting(PaymentRequest::for_registration("key", &event, &draft_for(&event)));

        assert_eq!(evicted.as_deref(), Some(first.order_id.as_str()));
        assert_eq!(widget.pending_count(), 2);
        assert!(widget.request(&first.order_id).is_none());
        assert!(!widget.resolve(&first.order_id, PaymentOutcome::success()));

        let result = settle_checkout(first_rx, store.clone(), draft_for(&event)).await;
        assert_eq!(result, CheckoutResult::Cancelled);
        assert!(store.read().await.list_registrations().is_empty());
    }

    #[tokio::test]
    async fn test_desk_stays_bounded_when_checkouts_are_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let store = shared_store(&dir).await;
        let event = store.read().await.find_event("1").unwrap().clone();
        let desk = CheckoutDesk::with_capacity("key", 3);

        let requests: Vec<PaymentRequest> = (0..10)
            .map(|_| desk.start(store.clone(), &event, draft_for(&event)))
            .collect();

        assert_eq!(desk.widget().pending_count(), 3);
        assert_eq!(desk.waiting.lock().len(), 3);
        assert!(desk
            .finish(&requests[0].order_id, PaymentOutcome::success())
            .await
            .is_none());

        let latest = &requests[9].order_id;
        let result = desk.finish(latest, PaymentOutcome::success()).await;
        assert!(matches!(result, Some(CheckoutResult::Registered { .. })));
        assert_eq!(desk.widget().pending_count(), 2);
        assert_eq!(store.read().await.list_registrations().len(), 1);
    }
}
