//! The backend REST collaborator boundary.
//!
//! The engine never talks HTTP directly; it goes through the [`PetBackend`]
//! trait so tests can substitute an in-memory backend and the reconciler
//! stays oblivious to transport concerns.

pub mod client;
pub mod config;

pub use client::HttpBackend;
pub use config::ApiConfig;

use async_trait::async_trait;

use crate::errors::Result;
use crate::types::{AccessorySlot, PetSnapshot};

/// The remote persistence store, as seen by the vitals engine.
///
/// Every call carries the session credential; implementations map HTTP
/// 401/403 to [`crate::VitalsError::AuthRequired`] so the session can stop
/// all timers and hand control back to the auth collaborator.
#[async_trait]
pub trait PetBackend: Send + Sync {
    /// `GET /api/pets` — the authoritative pet collection.
    async fn list_pets(&self) -> Result<Vec<PetSnapshot>>;

    /// `POST /api/pets` — create a pet; the server assigns the id.
    async fn create_pet(&self, name: &str, color: Option<&str>) -> Result<PetSnapshot>;

    /// `POST /api/pets/{id}/feed` — returns the server-updated snapshot.
    async fn feed(&self, id: i64) -> Result<PetSnapshot>;

    /// `POST /api/pets/{id}/cuddle` — returns the server-updated snapshot.
    async fn cuddle(&self, id: i64) -> Result<PetSnapshot>;

    /// `POST /api/pets/{id}/equip` — equip or clear an accessory slot.
    async fn equip(&self, id: i64, slot: AccessorySlot, name: Option<&str>)
        -> Result<PetSnapshot>;

    /// `DELETE /api/pets/{id}` — confirms removal, no body.
    async fn delete_pet(&self, id: i64) -> Result<()>;
}
