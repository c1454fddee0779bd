//! The vitals session — wires the clock, the store and the backend into
//! the imperative surface the view layer drives.
//!
//! All four timers are tied to the identity of the active pet: switching
//! pets stops everything before anything new is armed, and with no active
//! pet no timer runs at all.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::api::PetBackend;
use crate::errors::{Result, VitalsError};
use crate::types::{AccessorySlot, PetSnapshot, VitalsField};
use crate::vitals::{PetVitalsStore, TimerKind, VitalsClock, VitalsView};

/// Cadences and amounts for the four periodic concerns.
///
/// Defaults mirror the original client: resync every 10 s, happiness
/// decays by 1 every 2 s, engagement boosts happiness by 1 every 500 ms.
/// Hunger grows by 1 every 5 s.
#[derive(Debug, Clone)]
pub struct SimTuning {
    pub hunger_growth_period: Duration,
    pub hunger_growth_amount: i16,
    pub happiness_decay_period: Duration,
    pub happiness_decay_amount: i16,
    pub boost_period: Duration,
    pub boost_amount: i16,
    pub resync_period: Duration,
}

impl Default for SimTuning {
    fn default() -> Self {
        Self {
            hunger_growth_period: Duration::from_secs(5),
            hunger_growth_amount: 1,
            happiness_decay_period: Duration::from_secs(2),
            happiness_decay_amount: 1,
            boost_period: Duration::from_millis(500),
            boost_amount: 1,
            resync_period: Duration::from_secs(10),
        }
    }
}

/// The interactive simulation for one signed-in user.
///
/// Owns the store, the clock and the backend handle; exposes the handles
/// the view layer needs (`feed`, `cuddle`, `set_engaged`, `set_active_pet`)
/// plus collection management. Cheap to share behind an `Arc`.
pub struct VitalsSession {
    store: Arc<PetVitalsStore>,
    clock: Arc<VitalsClock>,
    backend: Arc<dyn PetBackend>,
    tuning: SimTuning,
}

impl VitalsSession {
    pub fn new(backend: Arc<dyn PetBackend>, tuning: SimTuning) -> Self {
        Self {
            store: Arc::new(PetVitalsStore::new()),
            clock: Arc::new(VitalsClock::new()),
            backend,
            tuning,
        }
    }

    /// The store all mutations flow through. Read-only access for
    /// consumers; writes happen via the session handles and timers.
    pub fn store(&self) -> &Arc<PetVitalsStore> {
        &self.store
    }

    /// Subscribe to view updates (active pet, derived mood, auth state).
    pub fn subscribe(&self) -> watch::Receiver<VitalsView> {
        self.store.subscribe()
    }

    /// Whether any simulation timer is currently armed.
    pub fn timers_running(&self) -> bool {
        self.clock.any_running()
    }

    /// Initial fetch: populate the collection and activate the first pet,
    /// the same rule the dashboard applies on load.
    pub async fn start(&self) -> Result<()> {
        let pets = self
            .backend
            .list_pets()
            .await
            .map_err(|e| self.note_failure("initial fetch", e))?;
        info!(count = pets.len(), "session started");
        self.store.replace_all(pets, Utc::now());
        let first = self.store.pets().first().map(|p| p.id);
        self.set_active_pet(first);
        Ok(())
    }

    /// Switch the active pet. Stops every timer of the previous pet
    /// before the new pet's are armed — no cross-talk between two pets'
    /// timers. `None` clears the active pet and leaves zero timers
    /// running.
    pub fn set_active_pet(&self, id: Option<i64>) {
        self.clock.stop_all();

        let id = id.filter(|&id| {
            let known = self.store.pets().iter().any(|p| p.id == id);
            if !known {
                warn!(pet = id, "cannot activate unknown pet");
            }
            known
        });
        self.store.set_active(id);

        let Some(id) = id else {
            return;
        };
        debug!(pet = id, "active pet switched");
        self.arm_pet_timers(id);
        self.arm_resync(id);
        if self.store.engaged() {
            self.arm_boost(id);
        }
    }

    /// Flip the engaged condition (e.g. pointer hover over the pet).
    /// The boost timer is armed or stopped immediately; no stale boost
    /// tick fires after disengagement.
    pub fn set_engaged(&self, engaged: bool) {
        self.store.set_engaged(engaged);
        match (engaged, self.store.active_id()) {
            (true, Some(id)) => self.arm_boost(id),
            _ => self.clock.stop(TimerKind::InteractionBoost),
        }
    }

    /// Feed the active pet. The server computes the new gauges; its
    /// response replaces the local snapshot. No local prediction is
    /// applied first and a failure rolls nothing back — the next resync
    /// corrects from the last good state.
    pub async fn feed(&self) -> Result<PetSnapshot> {
        let id = self.store.active_id().ok_or(VitalsError::NoActivePet)?;
        let server = self
            .backend
            .feed(id)
            .await
            .map_err(|e| self.note_failure("feed", e))?;
        Ok(self.apply_action_response(id, server))
    }

    /// Cuddle the active pet; same merge semantics as [`Self::feed`].
    pub async fn cuddle(&self) -> Result<PetSnapshot> {
        let id = self.store.active_id().ok_or(VitalsError::NoActivePet)?;
        let server = self
            .backend
            .cuddle(id)
            .await
            .map_err(|e| self.note_failure("cuddle", e))?;
        Ok(self.apply_action_response(id, server))
    }

    /// Equip or clear an accessory slot on the active pet. Cosmetics come
    /// back from the server, which owns equipped accessories.
    pub async fn equip(&self, slot: AccessorySlot, name: Option<&str>) -> Result<PetSnapshot> {
        let id = self.store.active_id().ok_or(VitalsError::NoActivePet)?;
        let server = self
            .backend
            .equip(id, slot, name)
            .await
            .map_err(|e| self.note_failure("equip", e))?;
        Ok(self.apply_action_response(id, server))
    }

    /// Create a pet, refresh the collection, and activate it if nothing
    /// was active yet.
    pub async fn create_pet(&self, name: &str, color: Option<&str>) -> Result<PetSnapshot> {
        let created = self
            .backend
            .create_pet(name, color)
            .await
            .map_err(|e| self.note_failure("create", e))?;
        info!(pet = created.id, "pet created");
        self.refresh().await?;
        if self.store.active_id().is_none() {
            let first = self.store.pets().first().map(|p| p.id);
            self.set_active_pet(first);
        }
        Ok(created)
    }

    /// Delete a pet. If it was the active one, its timers stop and the
    /// first remaining pet takes over.
    pub async fn delete_pet(&self, id: i64) -> Result<()> {
        self.backend
            .delete_pet(id)
            .await
            .map_err(|e| self.note_failure("delete", e))?;
        let was_active = self.store.active_id() == Some(id);
        self.store.remove(id);
        info!(pet = id, "pet deleted");
        if was_active {
            let next = self.store.pets().first().map(|p| p.id);
            self.set_active_pet(next);
        }
        Ok(())
    }

    /// One immediate resync fetch, errors surfaced to the caller.
    pub async fn refresh(&self) -> Result<()> {
        let pets = self
            .backend
            .list_pets()
            .await
            .map_err(|e| self.note_failure("refresh", e))?;
        let had_active = self.store.active_id().is_some();
        let active_present = self.store.replace_all(pets, Utc::now());
        if had_active && !active_present {
            self.set_active_pet(None);
        }
        Ok(())
    }

    /// Stop every timer. Idempotent; the store and its observers stay
    /// valid.
    pub fn shutdown(&self) {
        self.clock.stop_all();
        info!("session shut down");
    }

    /// Arm hunger growth and happiness decay for `pet_id`. Each tick
    /// checks the target pet is still the active one before mutating, so
    /// a tick that raced a switch is a no-op.
    fn arm_pet_timers(&self, pet_id: i64) {
        let store = Arc::clone(&self.store);
        let amount = self.tuning.hunger_growth_amount;
        self.clock.start(
            TimerKind::HungerGrowth,
            self.tuning.hunger_growth_period,
            move || {
                let store = Arc::clone(&store);
                async move {
                    if store.active_id() == Some(pet_id) {
                        store.apply_local_delta(pet_id, VitalsField::Hunger, amount);
                    }
                }
            },
        );

        let store = Arc::clone(&self.store);
        let amount = self.tuning.happiness_decay_amount;
        self.clock.start(
            TimerKind::HappinessDecay,
            self.tuning.happiness_decay_period,
            move || {
                let store = Arc::clone(&store);
                async move {
                    if store.active_id() == Some(pet_id) {
                        store.apply_local_delta(pet_id, VitalsField::Happiness, -amount);
                    }
                }
            },
        );
    }

    fn arm_boost(&self, pet_id: i64) {
        let store = Arc::clone(&self.store);
        let amount = self.tuning.boost_amount;
        self.clock.start(
            TimerKind::InteractionBoost,
            self.tuning.boost_period,
            move || {
                let store = Arc::clone(&store);
                async move {
                    if store.active_id() == Some(pet_id) && store.engaged() {
                        store.apply_local_delta(pet_id, VitalsField::Happiness, amount);
                    }
                }
            },
        );
    }

    /// Arm the periodic resync for `pet_id`. Transient failures are
    /// swallowed and retried next tick; an auth failure stops the world.
    fn arm_resync(&self, pet_id: i64) {
        let store = Arc::clone(&self.store);
        // Weak handle: a strong one would keep the clock (and this task)
        // alive after the session is dropped.
        let clock = Arc::downgrade(&self.clock);
        let backend = Arc::clone(&self.backend);
        self.clock
            .start(TimerKind::Resync, self.tuning.resync_period, move || {
                let store = Arc::clone(&store);
                let clock = clock.clone();
                let backend = Arc::clone(&backend);
                async move {
                    match backend.list_pets().await {
                        Ok(pets) => {
                            if store.active_id() != Some(pet_id) {
                                debug!(
                                    pet = pet_id,
                                    "discarding resync result for no-longer-active pet"
                                );
                                return;
                            }
                            let active_present = store.replace_all(pets, Utc::now());
                            if !active_present {
                                info!(
                                    pet = pet_id,
                                    "active pet removed server-side; stopping timers"
                                );
                                store.set_active(None);
                                if let Some(clock) = clock.upgrade() {
                                    clock.stop_all();
                                }
                            }
                        }
                        Err(e) if e.is_auth() => {
                            warn!("resync rejected: {e}; stopping simulation");
                            store.set_unauthenticated();
                            if let Some(clock) = clock.upgrade() {
                                clock.stop_all();
                            }
                        }
                        Err(e) if e.is_transient() => {
                            debug!("resync skipped: {e}");
                        }
                        Err(e) => {
                            warn!("resync failed: {e}");
                        }
                    }
                }
            });
    }

    /// Apply a server-confirmed action response, unless the active pet
    /// changed while the request was in flight — then the response is
    /// discarded rather than mutating the new pet's snapshot.
    fn apply_action_response(&self, requested: i64, server: PetSnapshot) -> PetSnapshot {
        if self.store.active_id() == Some(requested) {
            self.store.apply_server_pet(server.clone(), Utc::now());
        } else {
            debug!(
                pet = requested,
                "discarding action response for no-longer-active pet"
            );
        }
        server
    }

    /// Record a failed network call. Auth failures stop every timer and
    /// latch the unauthenticated condition; everything else is surfaced
    /// while the simulation continues.
    fn note_failure(&self, action: &str, err: VitalsError) -> VitalsError {
        if err.is_auth() {
            warn!("{action} rejected: {err}; stopping simulation");
            self.store.set_unauthenticated();
            self.clock.stop_all();
        } else {
            error!("{action} failed: {err}");
        }
        err
    }
}
