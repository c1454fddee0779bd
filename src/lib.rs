//! # petvitals
//!
//! Client-side vitals simulation and reconciliation engine for a
//! virtual-pet service. Keeps two per-pet gauges (hunger, happiness)
//! evolving continuously between network round-trips, blends
//! locally-predicted state with the server's authoritative copy, and
//! derives a discrete mood from the continuous gauges.
//!
//! The backend REST service is an opaque collaborator behind the
//! [`api::PetBackend`] trait; the simulation itself makes no attempt to be
//! deterministic across clients — the periodic resync is what keeps
//! everyone honest.

pub mod api;
pub mod errors;
pub mod session;
pub mod types;
pub mod vitals;

pub use errors::{Result, VitalsError};
pub use session::{SimTuning, VitalsSession};
pub use types::{AccessorySlot, Mood, PetSnapshot, VitalsField};
pub use vitals::{PetVitalsStore, TimerKind, VitalsClock, VitalsView};
