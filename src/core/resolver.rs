//! Eye-state resolver: last-known-value substitution per eye

use serde::{Deserialize, Serialize};

use crate::EYE_OPEN_THRESHOLD;
use crate::types::{CombinedState, EyeReading, EyeState, FrameSample};

/// Resolves one eye's readings, remembering the last known state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeResolver {
    threshold: f32,
    previous_open: bool,
}

impl Default for EyeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EyeResolver {
    /// Starts out assuming the eye is open
    pub fn new() -> Self {
        Self::with_threshold(EYE_OPEN_THRESHOLD)
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            threshold,
            previous_open: true,
        }
    }

    /// Resolve a reading to "is open". Unknown reuses memory without writing it.
    pub fn resolve(&mut self, reading: EyeReading) -> bool {
        match reading.classify(self.threshold) {
            EyeState::Unknown => self.previous_open,
            state => {
                self.previous_open = state == EyeState::Open;
                self.previous_open
            }
        }
    }

    /// Last resolved state
    pub fn previous_open(&self) -> bool {
        self.previous_open
    }
}

/// Left and right resolvers for one face
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EyePair {
    pub left: EyeResolver,
    pub right: EyeResolver,
}

impl EyePair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve both eyes and combine
    pub fn resolve(&mut self, frame: FrameSample) -> CombinedState {
        let left_open = self.left.resolve(frame.left);
        let right_open = self.right.resolve(frame.right);
        CombinedState::from_eyes(left_open, right_open)
    }
}
