//! In-memory event and registration store with write-through persistence

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::storage::Storage;
use crate::models::{Event, EventDraft, PaymentStatus, Registration, RegistrationDraft};

/// Authoritative state for events and registrations.
///
/// Every mutation rewrites the affected collection in storage. Storage failures
/// are logged and do not roll back the in-memory change.
#[derive(Debug)]
pub struct EventStore {
    storage: Storage,
    events: Vec<Event>,
    registrations: Vec<Registration>,
}

/// Figures shown on the admin overview
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total_events: usize,
    pub total_registrations: usize,
    pub total_revenue: f64,
    pub pending_payments: usize,
}

impl EventStore {
    pub fn new(storage: Storage, events: Vec<Event>, registrations: Vec<Registration>) -> Self {
        Self {
            storage,
            events,
            registrations,
        }
    }

    /// Load both collections. A collection that cannot be read falls back to
    /// its default (seed events, no registrations).
    pub async fn hydrate(storage: Storage) -> Self {
        let events = storage.load_events().await.unwrap_or_else(|e| {
            warn!("Could not load events: {}, using seed events", e);
            super::seed::seed_events()
        });
        let registrations = storage.load_registrations().await.unwrap_or_else(|e| {
            warn!("Could not load registrations: {}, starting empty", e);
            Vec::new()
        });

        info!(
            "Loaded {} events and {} registrations from {}",
            events.len(),
            registrations.len(),
            storage.root().display()
        );

        Self::new(storage, events, registrations)
    }

    pub fn list_events(&self) -> &[Event] {
        &self.events
    }

    pub fn list_registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn find_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Events whose name or location contains `query`, ignoring case.
    /// The query is matched as given; only an empty query matches everything.
    pub fn search_events(&self, query: &str) -> Vec<&Event> {
        if query.is_empty() {
            return self.events.iter().collect();
        }
        self.events.iter().filter(|e| e.matches(query)).collect()
    }

    /// Current fee of the registration's event, or 0 if the event was deleted
    pub fn registration_amount(&self, registration: &Registration) -> f64 {
        self.find_event(&registration.event_id)
            .map(|e| e.fees)
            .unwrap_or(0.0)
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total_events: self.events.len(),
            total_registrations: self.registrations.len(),
            total_revenue: self
                .registrations
                .iter()
                .map(|r| self.registration_amount(r))
                .sum(),
            pending_payments: self
                .registrations
                .iter()
                .filter(|r| r.payment_status == PaymentStatus::Pending)
                .count(),
        }
    }

    pub async fn add_event(&mut self, draft: EventDraft) -> Event {
        let id = fresh_id(self.events.iter().map(|e| e.id.as_str()));
        let event = Event::from_draft(id, draft);
        self.events.push(event.clone());
        info!("Added event '{}' ({})", event.name, event.id);
        self.persist_events().await;
        event
    }

    /// Replace every field but the id. Unknown ids are ignored.
    pub async fn update_event(&mut self, id: &str, draft: EventDraft) -> Option<Event> {
        let slot = self.events.iter_mut().find(|e| e.id == id)?;
        *slot = Event::from_draft(id.to_string(), draft);
        let updated = slot.clone();
        info!("Updated event '{}' ({})", updated.name, updated.id);
        self.persist_events().await;
        Some(updated)
    }

    /// Remove an event. Registrations that reference it are left in place.
    pub async fn delete_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|e| e.id != id);
        if self.events.len() == before {
            return false;
        }

        let orphaned = self
            .registrations
            .iter()
            .filter(|r| r.event_id == id)
            .count();
        if orphaned > 0 {
            warn!(
                "Deleted event {} still referenced by {} registration(s)",
                id, orphaned
            );
        }
        info!("Deleted event {}", id);
        self.persist_events().await;
        true
    }

    pub async fn add_registration(&mut self, draft: RegistrationDraft) -> Registration {
        let id = fresh_id(self.registrations.iter().map(|r| r.id.as_str()));
        let registration = Registration {
            id,
            event_id: draft.event_id,
            event_name: draft.event_name,
            full_name: draft.full_name,
            email: draft.email,
            phone: draft.phone,
            college: draft.college,
            payment_option: draft.payment_option,
            payment_status: PaymentStatus::Pending,
            registered_at: Utc::now(),
        };
        self.registrations.push(registration.clone());
        info!(
            "Registered {} for '{}' ({})",
            registration.full_name, registration.event_name, registration.id
        );
        self.persist_registrations().await;
        registration
    }

    async fn persist_events(&self) {
        if let Err(e) = self.storage.save_events(&self.events).await {
            error!("Failed to save events: {}", e);
        }
    }

    async fn persist_registrations(&self) {
        if let Err(e) = self.storage.save_registrations(&self.registrations).await {
            error!("Failed to save registrations: {}", e);
        }
    }
}

/// Millisecond timestamp id, bumped past any id already taken
fn fresh_id<'a>(taken: impl Iterator<Item = &'a str>) -> String {
    let taken: std::collections::HashSet<&str> = taken.collect();
    let mut candidate = Utc::now().timestamp_millis();
    while taken.contains(candidate.to_string().as_str()) {
        candidate += 1;
    }
    candidate.to_string()
}

/// Shared event store type
pub type SharedEventStore = Arc<tokio::sync::RwLock<EventStore>>;

pub fn create_shared_event_store(store: EventStore) -> SharedEventStore {
    Arc::new(tokio::sync::RwLock::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentOption;
    use crate::state::seed::seed_events;
    use chrono::NaiveDate;

    fn draft(name: &str, location: &str, fees: f64) -> EventDraft {
        EventDraft {
            name: name.to_string(),
            description: "Description".to_string(),
            location: location.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
            time: "11:00".to_string(),
            fees,
        }
    }

    fn registration_for(event: &Event) -> RegistrationDraft {
        RegistrationDraft {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            full_name: "Meera Shah".to_string(),
            email: "meera@example.com".to_string(),
            phone: "9000000000".to_string(),
            college: "Science".to_string(),
            payment_option: PaymentOption::Upi,
        }
    }

    async fn seeded_store(dir: &tempfile::TempDir) -> EventStore {
        EventStore::hydrate(Storage::new(dir.path())).await
    }

    #[tokio::test]
    async fn test_add_event_appends_with_unique_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;
        let before: Vec<String> = store.list_events().iter().map(|e| e.id.clone()).collect();

        let first = store.add_event(draft("Quiz Night", "Library", 100.0)).await;
        let second = store.add_event(draft("Quiz Night", "Library", 100.0)).await;

        assert_eq!(store.list_events().len(), before.len() + 2);
        assert!(!before.contains(&first.id));
        assert!(!before.contains(&second.id));
        assert_ne!(first.id, second.id);
        assert_eq!(store.list_events().last(), Some(&second));
    }

    #[test]
    fn test_fresh_id_skips_taken_ids() {
        let now = Utc::now().timestamp_millis();
        let taken: Vec<String> = (now..now + 50).map(|n| n.to_string()).collect();

        let id = fresh_id(taken.iter().map(|s| s.as_str()));
        assert!(!taken.contains(&id));
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields_but_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;

        let replacement = draft("Renamed", "Open Air Theatre", 750.5);
        let updated = store.update_event("3", replacement.clone()).await.unwrap();

        assert_eq!(updated.id, "3");
        let found = store.find_event("3").unwrap();
        assert_eq!(found.to_draft(), replacement);
        // position is unchanged
        assert_eq!(store.list_events()[2].id, "3");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id_are_noops() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;
        let before = store.list_events().to_vec();

        assert!(store.update_event("missing", draft("X", "Y", 1.0)).await.is_none());
        assert!(!store.delete_event("missing").await);

        assert_eq!(store.list_events(), before.as_slice());
        // nothing was written either
        assert!(!dir.path().join("events.json").exists());
    }

    #[tokio::test]
    async fn test_delete_does_not_cascade_to_registrations() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;
        assert_eq!(store.list_events().len(), 4);

        let event = store.find_event("2").unwrap().clone();
        let registration = store.add_registration(registration_for(&event)).await;

        assert!(store.delete_event("2").await);

        assert_eq!(store.list_events().len(), 3);
        assert!(store.list_events().iter().all(|e| e.id != "2"));
        assert_eq!(store.list_registrations(), &[registration.clone()]);
        assert_eq!(store.registration_amount(&registration), 0.0);
    }

    #[tokio::test]
    async fn test_registration_is_pending_and_timestamped() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;
        let event = store.find_event("1").unwrap().clone();

        let called_at = Utc::now();
        let first = store.add_registration(registration_for(&event)).await;
        let second = store.add_registration(registration_for(&event)).await;

        assert_eq!(first.payment_status, PaymentStatus::Pending);
        assert!(first.registered_at >= called_at);
        // same person may register twice
        assert_eq!(store.list_registrations().len(), 2);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_mutations_write_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = seeded_store(&dir).await;

        let added = store.add_event(draft("Robotics Expo", "Hangar 2", 300.0)).await;
        store.delete_event("1").await;
        let event = store.find_event("4").unwrap().clone();
        store.add_registration(registration_for(&event)).await;

        let reloaded = seeded_store(&dir).await;
        assert_eq!(reloaded.list_events(), store.list_events());
        assert_eq!(reloaded.list_registrations(), store.list_registrations());
        assert!(reloaded.find_event(&added.id).is_some());
        assert!(reloaded.find_event("1").is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir).await;

        let ids = |query: &str| -> Vec<String> {
            store
                .search_events(query)
                .into_iter()
                .map(|e| e.id.clone())
                .collect()
        };

        assert_eq!(ids("HACKATHON"), vec!["3"]);
        assert_eq!(ids("building"), vec!["4"]);
        assert_eq!(ids("hall"), vec!["1"]);
        assert_eq!(ids("u"), vec!["1", "2", "3", "4"]);
        assert_eq!(ids(""), vec!["1", "2", "3", "4"]);
        assert!(ids("   ").is_empty());
        assert!(ids("nowhere").is_empty());
    }

    #[tokio::test]
    async fn test_search_keeps_surrounding_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store(&dir).await;

        assert!(store.search_events("48 ").is_empty());
        assert!(store.search_events(" hackathon").is_empty());
        let inner: Vec<&str> = store
            .search_events("hackathon 48")
            .into_iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(inner, vec!["3"]);
    }

    #[tokio::test]
    async fn test_stats_use_current_fees() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = EventStore::new(Storage::new(dir.path()), seed_events(), Vec::new());

        let summit = store.find_event("1").unwrap().clone();
        let fest = store.find_event("2").unwrap().clone();
        store.add_registration(registration_for(&summit)).await;
        store.add_registration(registration_for(&fest)).await;
        store.delete_event("2").await;

        let stats = store.stats();
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.total_registrations, 2);
        assert_eq!(stats.total_revenue, 1500.0);
        assert_eq!(stats.pending_payments, 2);
    }
}
