//! The pet snapshot store — the single mutation point of the engine.
//!
//! Every component writes through this store, which routes gauge writes
//! through the reconciler and republishes the derived view after each
//! mutation. The interior mutex is held only for synchronous in-memory
//! work, never across an await.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::types::{Mood, PetSnapshot, VitalsField};
use crate::vitals::{mood, reconcile};

/// What observers (the view layer) see after every mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsView {
    /// The currently active pet, if any.
    pub active: Option<PetSnapshot>,
    /// Mood derived from the active pet's gauges; re-computed on every
    /// publish, never cached across mutations.
    pub mood: Option<Mood>,
    /// Latched when the backend rejects the credential.
    pub unauthenticated: bool,
}

#[derive(Debug, Default)]
struct StoreInner {
    pets: Vec<PetSnapshot>,
    active_id: Option<i64>,
    engaged: bool,
    unauthenticated: bool,
}

impl StoreInner {
    fn view(&self) -> VitalsView {
        let active = self
            .active_id
            .and_then(|id| self.pets.iter().find(|p| p.id == id).cloned());
        let mood = active
            .as_ref()
            .map(|pet| mood::classify(pet.hunger, pet.happiness, self.engaged));
        VitalsView {
            active,
            mood,
            unauthenticated: self.unauthenticated,
        }
    }
}

/// Holds the current pet collection and the active-pet/engaged flags.
///
/// Exactly one pet is driven by the simulation at a time; the rest of the
/// collection is inert, display-only state.
pub struct PetVitalsStore {
    inner: Mutex<StoreInner>,
    view_tx: watch::Sender<VitalsView>,
}

impl PetVitalsStore {
    pub fn new() -> Self {
        let (view_tx, _) = watch::channel(VitalsView::default());
        Self {
            inner: Mutex::new(StoreInner::default()),
            view_tx,
        }
    }

    /// Subscribe to view updates. The receiver always holds the latest
    /// published view.
    pub fn subscribe(&self) -> watch::Receiver<VitalsView> {
        self.view_tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().expect("vitals store mutex poisoned")
    }

    fn publish(&self, inner: &StoreInner) {
        // send() only fails with no receivers, which is fine: the view
        // layer may not have subscribed yet.
        let _ = self.view_tx.send(inner.view());
    }

    /// Replace the collection with the server's copy (resync path).
    ///
    /// Pets already known locally go through `merge_resync`; new pets are
    /// adopted as-is, pets absent from the server copy vanish. Returns
    /// whether the active pet is still present afterwards.
    pub fn replace_all(&self, server_pets: Vec<PetSnapshot>, now: DateTime<Utc>) -> bool {
        let mut inner = self.lock();
        let merged: Vec<PetSnapshot> = server_pets
            .iter()
            .map(|server| match inner.pets.iter().find(|p| p.id == server.id) {
                Some(local) => reconcile::merge_resync(local, server, now),
                None => reconcile::merge_resync(server, server, now),
            })
            .collect();
        inner.pets = merged;
        let active_present = match inner.active_id {
            Some(id) => inner.pets.iter().any(|p| p.id == id),
            None => false,
        };
        self.publish(&inner);
        active_present
    }

    /// Upsert one server-confirmed snapshot (feed/cuddle/equip response).
    pub fn apply_server_pet(&self, server: PetSnapshot, now: DateTime<Utc>) {
        let mut inner = self.lock();
        match inner.pets.iter_mut().find(|p| p.id == server.id) {
            Some(local) => *local = reconcile::apply_server_action(local, &server, now),
            None => {
                let adopted = reconcile::merge_resync(&server, &server, now);
                inner.pets.push(adopted);
            }
        }
        self.publish(&inner);
    }

    /// Apply a local prediction to one pet's gauge. Returns false if the
    /// pet is not in the collection (a tick that raced a delete).
    pub fn apply_local_delta(&self, id: i64, field: VitalsField, delta: i16) -> bool {
        let mut inner = self.lock();
        let Some(pet) = inner.pets.iter_mut().find(|p| p.id == id) else {
            debug!(pet = id, "dropping local delta for unknown pet");
            return false;
        };
        *pet = reconcile::apply_local_delta(pet, field, delta);
        self.publish(&inner);
        true
    }

    pub fn set_active(&self, id: Option<i64>) {
        let mut inner = self.lock();
        inner.active_id = id;
        self.publish(&inner);
    }

    pub fn set_engaged(&self, engaged: bool) {
        let mut inner = self.lock();
        inner.engaged = engaged;
        self.publish(&inner);
    }

    /// Latch the unauthenticated condition. One-way: only a new session
    /// clears it.
    pub fn set_unauthenticated(&self) {
        let mut inner = self.lock();
        inner.unauthenticated = true;
        self.publish(&inner);
    }

    pub fn remove(&self, id: i64) {
        let mut inner = self.lock();
        inner.pets.retain(|p| p.id != id);
        if inner.active_id == Some(id) {
            inner.active_id = None;
        }
        self.publish(&inner);
    }

    pub fn active_id(&self) -> Option<i64> {
        self.lock().active_id
    }

    pub fn active_snapshot(&self) -> Option<PetSnapshot> {
        let inner = self.lock();
        inner
            .active_id
            .and_then(|id| inner.pets.iter().find(|p| p.id == id).cloned())
    }

    pub fn pets(&self) -> Vec<PetSnapshot> {
        self.lock().pets.clone()
    }

    pub fn engaged(&self) -> bool {
        self.lock().engaged
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.lock().unauthenticated
    }
}

impl Default for PetVitalsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> PetVitalsStore {
        let store = PetVitalsStore::new();
        store.replace_all(
            vec![PetSnapshot::new(1, "Mochi"), PetSnapshot::new(2, "Kira")],
            Utc::now(),
        );
        store
    }

    #[test]
    fn test_view_published_after_delta() {
        let store = seeded_store();
        store.set_active(Some(1));
        let rx = store.subscribe();

        store.apply_local_delta(1, VitalsField::Happiness, 40);
        let view = rx.borrow().clone();
        assert_eq!(view.active.as_ref().map(|p| p.happiness), Some(90));
        assert_eq!(view.mood, Some(Mood::Delighted));
    }

    #[test]
    fn test_mood_reflects_engaged_flag() {
        let store = seeded_store();
        store.set_active(Some(1));
        store.apply_local_delta(1, VitalsField::Hunger, 50); // hunger 100

        assert_eq!(store.subscribe().borrow().mood, Some(Mood::Hungry));
        store.set_engaged(true);
        assert_eq!(store.subscribe().borrow().mood, Some(Mood::Delighted));
    }

    #[test]
    fn test_replace_all_adopts_and_drops() {
        let store = seeded_store();
        store.set_active(Some(2));

        // Pet 2 is gone server-side, pet 3 is new.
        let mut survivor = PetSnapshot::new(1, "Mochi");
        survivor.hunger = 80;
        let still_active = store.replace_all(
            vec![survivor, PetSnapshot::new(3, "Nori")],
            Utc::now(),
        );

        assert!(!still_active);
        let pets = store.pets();
        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].hunger, 80);
        assert!(pets.iter().all(|p| p.last_synced_at.is_some()));
    }

    #[test]
    fn test_delta_for_unknown_pet_is_dropped() {
        let store = seeded_store();
        assert!(!store.apply_local_delta(99, VitalsField::Hunger, 10));
        assert_eq!(store.pets().len(), 2);
    }

    #[test]
    fn test_remove_clears_active() {
        let store = seeded_store();
        store.set_active(Some(1));
        store.remove(1);
        assert_eq!(store.active_id(), None);
        assert_eq!(store.pets().len(), 1);
    }

    #[test]
    fn test_unauthenticated_latch() {
        let store = seeded_store();
        assert!(!store.is_unauthenticated());
        store.set_unauthenticated();
        assert!(store.is_unauthenticated());
        assert!(store.subscribe().borrow().unauthenticated);
    }
}
