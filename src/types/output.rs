//! Output structures for terminal display

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::types::{DecoderPhase, Emission, ReasonCode, Transition};

/// Output structure for each processed frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutput {
    /// Wall-clock time the output was produced
    pub timestamp: DateTime<Utc>,
    /// Frame time used for duration measurement (ms)
    pub frame_ms: u64,
    /// Phase after the step
    pub phase: DecoderPhase,
    /// Phase change on this step
    pub transition: Transition,
    /// Letters/words committed on this step
    pub emissions: Vec<Emission>,
    /// Decoded message so far, including the in-progress word
    pub message: String,
    /// Summary of the step
    pub reason: ReasonCode,
}

impl StepOutput {
    pub fn new(
        frame_ms: u64,
        phase: DecoderPhase,
        transition: Transition,
        emissions: Vec<Emission>,
        message: String,
    ) -> Self {
        let reason = ReasonCode::summarize(transition, phase == DecoderPhase::Open, &emissions);
        Self {
            timestamp: Utc::now(),
            frame_ms,
            phase,
            transition,
            emissions,
            message,
            reason,
        }
    }

    /// Did this step commit a letter or word?
    pub fn emitted(&self) -> bool {
        !self.emissions.is_empty()
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = DecoderPhase::color_reset();

        format!(
            "{}{} t={}ms | phase={} | message={:?} | {}{}",
            color,
            self.phase.emoji(),
            self.frame_ms,
            self.phase,
            self.message,
            self.reason.code(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "t={} | phase={} | message={:?} | reason={}",
            self.frame_ms,
            self.phase,
            self.message,
            self.reason.code()
        )
    }
}
