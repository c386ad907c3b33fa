//! Reason codes summarising what a decoder step did

use serde::{Deserialize, Serialize};

use crate::types::{Emission, Symbol, Transition};

/// Reason codes for step outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: No transition
    // =========================================================================
    /// Eyes still open, no boundary reached
    R001_HOLD_OPEN,
    /// Eyes still closed
    R001_HOLD_CLOSED,

    // =========================================================================
    // R002: Transitions
    // =========================================================================
    /// Eyes closed, blink timing started
    R002_EYES_CLOSED,
    /// Eyes reopened after a short closure
    R002_DOT,
    /// Eyes reopened after a long closure
    R002_DASH,

    // =========================================================================
    // R003: Letters
    // =========================================================================
    /// Letter space reached, pattern found in the code table
    R003_LETTER_DECODED,
    /// Letter space reached, pattern unknown and dropped
    R003_LETTER_DROPPED,

    // =========================================================================
    // R004: Words
    // =========================================================================
    /// Word space reached, word appended to the message
    R004_WORD_COMMITTED,
}

impl ReasonCode {
    /// Most significant reason for a step: words, then letters, then transitions
    pub fn summarize(transition: Transition, open_after: bool, emissions: &[Emission]) -> Self {
        if emissions.iter().any(Emission::is_word) {
            return Self::R004_WORD_COMMITTED;
        }
        if let Some(Emission::Letter { letter, .. }) = emissions.iter().find(|e| e.is_letter()) {
            return if letter.is_some() {
                Self::R003_LETTER_DECODED
            } else {
                Self::R003_LETTER_DROPPED
            };
        }
        match transition {
            Transition::EyesClosed => Self::R002_EYES_CLOSED,
            Transition::Reopened(Symbol::Dot) => Self::R002_DOT,
            Transition::Reopened(Symbol::Dash) => Self::R002_DASH,
            Transition::Held if open_after => Self::R001_HOLD_OPEN,
            Transition::Held => Self::R001_HOLD_CLOSED,
        }
    }

    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_HOLD_OPEN => "R001_HOLD_OPEN",
            Self::R001_HOLD_CLOSED => "R001_HOLD_CLOSED",
            Self::R002_EYES_CLOSED => "R002_EYES_CLOSED",
            Self::R002_DOT => "R002_DOT",
            Self::R002_DASH => "R002_DASH",
            Self::R003_LETTER_DECODED => "R003_LETTER_DECODED",
            Self::R003_LETTER_DROPPED => "R003_LETTER_DROPPED",
            Self::R004_WORD_COMMITTED => "R004_WORD_COMMITTED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_HOLD_OPEN => "Eyes open",
            Self::R001_HOLD_CLOSED => "Eyes closed",
            Self::R002_EYES_CLOSED => "Blink started",
            Self::R002_DOT => "Short blink - dot",
            Self::R002_DASH => "Long blink - dash",
            Self::R003_LETTER_DECODED => "Letter decoded",
            Self::R003_LETTER_DROPPED => "Unknown pattern dropped",
            Self::R004_WORD_COMMITTED => "Word committed",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
