//! The vitals engine core: clock, reconciler, mood classification and the
//! snapshot store they all write through.

pub mod clock;
pub mod mood;
pub mod reconcile;
pub mod store;

pub use clock::{TimerKind, VitalsClock};
pub use store::{PetVitalsStore, VitalsView};
