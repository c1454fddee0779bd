//! Snapshot reconciliation — the three mutation paths that produce the
//! next `PetSnapshot` from a current one.
//!
//! Every gauge write in the engine goes through one of these functions so
//! the clamping and field-preservation invariants are enforced in exactly
//! one place. All three are pure; the caller supplies the timestamp.
//!
//! There are no sequence numbers: local ticks and network responses may
//! interleave arbitrarily and the last write wins by arrival order. The
//! periodic resync exists precisely to correct the drift this allows.

use chrono::{DateTime, Utc};

use crate::types::{PetSnapshot, VitalsField, GAUGE_MAX};

fn clamp_gauge(value: i32) -> u8 {
    value.clamp(0, i32::from(GAUGE_MAX)) as u8
}

/// Adjust one gauge by `delta`, clamped to `[0, 100]`.
///
/// Total function: any delta is legal, the result never leaves the range.
/// `id`, `name`, cosmetics and `last_synced_at` are untouched — a local
/// prediction never claims to be server-originated.
pub fn apply_local_delta(snapshot: &PetSnapshot, field: VitalsField, delta: i16) -> PetSnapshot {
    let mut next = snapshot.clone();
    match field {
        VitalsField::Hunger => {
            next.hunger = clamp_gauge(i32::from(snapshot.hunger) + i32::from(delta));
        }
        VitalsField::Happiness => {
            next.happiness = clamp_gauge(i32::from(snapshot.happiness) + i32::from(delta));
        }
    }
    next
}

/// Merge the response of a discrete server-confirmed action (feed, cuddle,
/// equip) into the local snapshot.
///
/// The server computed the new values authoritatively: its gauges and id
/// replace the local ones, and cosmetics are taken from the response since
/// the server owns equipped accessories. Resolves any drift the local
/// timers introduced since the request was issued.
pub fn apply_server_action(
    local: &PetSnapshot,
    server: &PetSnapshot,
    now: DateTime<Utc>,
) -> PetSnapshot {
    debug_assert_eq!(local.id, server.id, "action response for a different pet");
    let mut next = server.clone();
    next.hunger = next.hunger.min(GAUGE_MAX);
    next.happiness = next.happiness.min(GAUGE_MAX);
    next.last_synced_at = Some(now);
    next
}

/// Merge a periodic background resync: server wins for every field.
///
/// The resync re-anchors local state to the server's authoritative copy,
/// so the local snapshot is discarded wholesale. An optimistic mutation
/// that was in flight when the resync request was issued may be lost; the
/// next confirmed action or resync re-corrects. Idempotent for a fixed
/// `now`.
pub fn merge_resync(_local: &PetSnapshot, server: &PetSnapshot, now: DateTime<Utc>) -> PetSnapshot {
    let mut next = server.clone();
    next.hunger = next.hunger.min(GAUGE_MAX);
    next.happiness = next.happiness.min(GAUGE_MAX);
    next.last_synced_at = Some(now);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dressed_pet() -> PetSnapshot {
        let mut pet = PetSnapshot::new(3, "Nori");
        pet.color = Some("#FFA500".to_string());
        pet.hat = Some("sombrero-mago".to_string());
        pet.shirt = Some("camiseta-rayas".to_string());
        pet
    }

    #[test]
    fn test_local_delta_clamps_both_ends() {
        let pet = dressed_pet();
        let starving = apply_local_delta(&pet, VitalsField::Hunger, 500);
        assert_eq!(starving.hunger, 100);
        let fed = apply_local_delta(&starving, VitalsField::Hunger, -500);
        assert_eq!(fed.hunger, 0);
    }

    #[test]
    fn test_gauges_stay_in_range_under_any_delta_sequence() {
        let mut pet = dressed_pet();
        for delta in [-3, 120, -7, -200, 1, 99, -1, 45, -150, 100] {
            pet = apply_local_delta(&pet, VitalsField::Happiness, delta);
            pet = apply_local_delta(&pet, VitalsField::Hunger, -delta);
            assert!(pet.happiness <= 100);
            assert!(pet.hunger <= 100);
        }
    }

    #[test]
    fn test_local_delta_preserves_identity_and_cosmetics() {
        let pet = dressed_pet();
        let next = apply_local_delta(&pet, VitalsField::Happiness, -10);
        assert_eq!(next.id, pet.id);
        assert_eq!(next.name, pet.name);
        assert_eq!(next.color, pet.color);
        assert_eq!(next.hat, pet.hat);
        assert_eq!(next.shirt, pet.shirt);
        assert_eq!(next.last_synced_at, pet.last_synced_at);
        assert_eq!(next.happiness, 40);
        assert_eq!(next.hunger, pet.hunger);
    }

    #[test]
    fn test_server_action_takes_server_gauges_and_cosmetics() {
        let local = dressed_pet();
        let mut server = PetSnapshot::new(3, "Nori");
        server.hunger = 10;
        server.happiness = 95;
        server.hat = Some("gorra-pirata".to_string());
        let now = Utc::now();

        let next = apply_server_action(&local, &server, now);
        assert_eq!(next.hunger, 10);
        assert_eq!(next.happiness, 95);
        assert_eq!(next.hat.as_deref(), Some("gorra-pirata"));
        assert_eq!(next.shirt, None); // server response is the whole truth
        assert_eq!(next.last_synced_at, Some(now));
    }

    #[test]
    fn test_merge_resync_server_wins() {
        let mut local = dressed_pet();
        local.hunger = 99;
        local.happiness = 1;
        let mut server = PetSnapshot::new(3, "Nori");
        server.hunger = 20;
        server.happiness = 70;
        let now = Utc::now();

        let merged = merge_resync(&local, &server, now);
        assert_eq!(merged.hunger, 20);
        assert_eq!(merged.happiness, 70);
        assert_eq!(merged.last_synced_at, Some(now));
    }

    #[test]
    fn test_merge_resync_is_idempotent() {
        let local = dressed_pet();
        let mut server = PetSnapshot::new(3, "Nori");
        server.hunger = 33;
        server.happiness = 66;
        let now = Utc::now();

        let once = merge_resync(&local, &server, now);
        let twice = merge_resync(&once, &server, now);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_out_of_range_server_values_are_clamped() {
        let local = dressed_pet();
        let mut server = PetSnapshot::new(3, "Nori");
        server.hunger = 250;
        server.happiness = 180;

        let merged = merge_resync(&local, &server, Utc::now());
        assert_eq!(merged.hunger, 100);
        assert_eq!(merged.happiness, 100);
    }
}
