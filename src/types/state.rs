//! Decoder phase definitions

use serde::{Deserialize, Serialize};

/// Phase of the duration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecoderPhase {
    /// Both eyes open; pause length delimits letters and words
    Open,
    /// At least one eye closed; closure length picks dot or dash
    Closed,
}

impl DecoderPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            DecoderPhase::Open => "\x1b[32m",   // Green
            DecoderPhase::Closed => "\x1b[33m", // Yellow
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            DecoderPhase::Open => "👁",
            DecoderPhase::Closed => "➖",
        }
    }
}

impl std::fmt::Display for DecoderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DecoderPhase::Open => "OPEN",
            DecoderPhase::Closed => "CLOSED",
        };
        write!(f, "{}", name)
    }
}
