use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for both vitals gauges. The lower bound is 0.
pub const GAUGE_MAX: u8 = 100;

/// One pet's observable state at an instant.
///
/// Field names follow the backend's camelCase JSON. The two gauges are
/// always within `[0, GAUGE_MAX]`; every mutation goes through the
/// reconciler so the clamp lives in one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSnapshot {
    /// Server-assigned identifier, immutable for the snapshot's lifetime.
    pub id: i64,
    /// Display name, set at creation.
    pub name: String,
    /// 0 = fully fed, 100 = starving.
    pub hunger: u8,
    /// 0 = miserable, 100 = ecstatic.
    pub happiness: u8,
    /// Cosmetic hue, opaque to the vitals engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Equipped hat accessory, opaque to the vitals engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hat: Option<String>,
    /// Equipped shirt accessory, opaque to the vitals engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shirt: Option<String>,
    /// When the last server-originated value was applied. Stamped by the
    /// server-merge paths only; `None` until the first sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl PetSnapshot {
    /// A fresh snapshot with both gauges at the midpoint and no cosmetics.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            hunger: 50,
            happiness: 50,
            color: None,
            hat: None,
            shirt: None,
            last_synced_at: None,
        }
    }
}

/// Names the gauge a local mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalsField {
    Hunger,
    Happiness,
}

impl VitalsField {
    pub fn as_str(self) -> &'static str {
        match self {
            VitalsField::Hunger => "hunger",
            VitalsField::Happiness => "happiness",
        }
    }
}

/// Discrete classification of a pet's continuous vitals, used only for
/// presentation (sprite/animation selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Delighted,
    Hungry,
    Sad,
    Neutral,
    Content,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mood::Delighted => "delighted",
            Mood::Hungry => "hungry",
            Mood::Sad => "sad",
            Mood::Neutral => "neutral",
            Mood::Content => "content",
        };
        write!(f, "{name}")
    }
}

/// Accessory slot addressed by the equip endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorySlot {
    Hat,
    Shirt,
}

impl AccessorySlot {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessorySlot::Hat => "hat",
            AccessorySlot::Shirt => "shirt",
        }
    }
}
