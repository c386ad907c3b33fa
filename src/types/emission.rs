//! Transitions and emissions produced by one decoder step

use serde::{Deserialize, Serialize};

use crate::types::{Pattern, Symbol};

/// What the duration state machine did with the phase on this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Transition {
    /// Phase unchanged
    Held,
    /// Open → Closed
    EyesClosed,
    /// Closed → Open, committing a symbol for the closure
    Reopened(Symbol),
}

/// A letter or word committed to the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Emission {
    /// Letter boundary reached; `letter` is None when the pattern had no match
    Letter {
        pattern: Pattern,
        letter: Option<char>,
        message: String,
    },
    /// Word boundary reached
    Word { word: String, message: String },
}

impl Emission {
    /// Full message snapshot handed to the sink
    pub fn message(&self) -> &str {
        match self {
            Emission::Letter { message, .. } => message,
            Emission::Word { message, .. } => message,
        }
    }

    pub fn is_letter(&self) -> bool {
        matches!(self, Emission::Letter { .. })
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Emission::Word { .. })
    }
}
