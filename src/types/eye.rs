//! Eye readings and resolved eye states

use serde::{Deserialize, Serialize};

/// Raw per-frame eye-open signal from the face tracker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<f32>", into = "Option<f32>")]
pub enum EyeReading {
    /// Eye-open probability in [0, 1]
    Probability(f32),
    /// Tracker produced no probability for this frame
    Unknown,
}

impl EyeReading {
    /// Map a raw tracker value; negative values are the "uncomputed" sentinel
    pub fn from_raw(raw: f32) -> Self {
        if raw < 0.0 || raw.is_nan() {
            EyeReading::Unknown
        } else {
            EyeReading::Probability(raw)
        }
    }

    /// Classify against an open threshold
    pub fn classify(&self, threshold: f32) -> EyeState {
        match *self {
            EyeReading::Probability(p) if p > threshold => EyeState::Open,
            EyeReading::Probability(_) => EyeState::Closed,
            EyeReading::Unknown => EyeState::Unknown,
        }
    }
}

impl Default for EyeReading {
    fn default() -> Self {
        EyeReading::Unknown
    }
}

impl From<Option<f32>> for EyeReading {
    fn from(value: Option<f32>) -> Self {
        match value {
            Some(raw) => EyeReading::from_raw(raw),
            None => EyeReading::Unknown,
        }
    }
}

impl From<EyeReading> for Option<f32> {
    fn from(value: EyeReading) -> Self {
        match value {
            EyeReading::Probability(p) => Some(p),
            EyeReading::Unknown => None,
        }
    }
}

/// Per-eye classified sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeState {
    Open,
    Closed,
    /// Never stored; resolved to the previous state of that eye
    Unknown,
}

/// The only signal the duration state machine observes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombinedState {
    BothOpen,
    AtLeastOneClosed,
}

impl CombinedState {
    pub fn from_eyes(left_open: bool, right_open: bool) -> Self {
        if left_open && right_open {
            CombinedState::BothOpen
        } else {
            CombinedState::AtLeastOneClosed
        }
    }
}

/// One frame of tracker output for a single face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    #[serde(default)]
    pub left: EyeReading,
    #[serde(default)]
    pub right: EyeReading,
}

impl FrameSample {
    pub fn new(left: EyeReading, right: EyeReading) -> Self {
        Self { left, right }
    }

    /// Both eyes open with full confidence
    pub fn open() -> Self {
        Self::new(EyeReading::Probability(1.0), EyeReading::Probability(1.0))
    }

    /// Both eyes closed with full confidence
    pub fn closed() -> Self {
        Self::new(EyeReading::Probability(0.0), EyeReading::Probability(0.0))
    }

    /// Tracker lost both eye probabilities
    pub fn unknown() -> Self {
        Self::new(EyeReading::Unknown, EyeReading::Unknown)
    }
}

/// A frame stamped with the time it was observed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedFrame {
    pub t_ms: u64,
    #[serde(flatten)]
    pub frame: FrameSample,
}

impl TimedFrame {
    pub fn new(t_ms: u64, frame: FrameSample) -> Self {
        Self { t_ms, frame }
    }
}
