//! Swipe resolution for flashcards, independent of any rendering

use serde::{Deserialize, Serialize};

use crate::config::GestureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    /// Understood
    Right,
    /// Study again
    Left,
}

impl SwipeDirection {
    pub fn is_correct(self) -> bool {
        self == SwipeDirection::Right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "outcome", content = "direction")]
pub enum GestureOutcome {
    Commit(SwipeDirection),
    /// Spring back to the resting position
    Cancel,
}

/// Decide what a released drag means.
///
/// Commits when either the horizontal distance or the horizontal velocity is
/// past its threshold (strictly greater).
pub fn resolve_gesture(drag_dx: f64, velocity_x: f64, config: &GestureConfig) -> GestureOutcome {
    let far_enough = drag_dx.abs() > config.distance_threshold;
    let fast_enough = velocity_x.abs() > config.velocity_threshold;
    if !(far_enough || fast_enough) {
        return GestureOutcome::Cancel;
    }

    if drag_dx > 0.0 || velocity_x > 0.0 {
        GestureOutcome::Commit(SwipeDirection::Right)
    } else {
        GestureOutcome::Commit(SwipeDirection::Left)
    }
}

/// Card tilt in degrees while dragging: linear over `[-screen_width, screen_width]`,
/// extrapolated past the edges
pub fn card_rotation(translate_x: f64, screen_width: f64, config: &GestureConfig) -> f64 {
    if screen_width <= 0.0 {
        return 0.0;
    }
    translate_x / screen_width * config.max_rotation_deg
}
