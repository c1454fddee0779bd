//! Mood classification — maps the continuous gauges to one discrete
//! presentation state.
//!
//! This is the single place thresholds live; the view layer must never
//! re-derive mood from raw numbers.

use crate::types::Mood;

/// Classify `(hunger, happiness, engaged)` into a mood.
///
/// Fixed priority order, first match wins. The thresholds overlap on
/// purpose, so order matters: a pet at hunger 80 / happiness 90 is
/// `Hungry`, not `Delighted`, unless the user is actively engaged.
pub fn classify(hunger: u8, happiness: u8, engaged: bool) -> Mood {
    if engaged {
        return Mood::Delighted;
    }
    if hunger > 70 {
        return Mood::Hungry;
    }
    if happiness > 80 {
        return Mood::Delighted;
    }
    if happiness < 30 {
        return Mood::Sad;
    }
    if happiness < 60 {
        return Mood::Neutral;
    }
    Mood::Content
}
