//! blinkcode: blink-duration Morse decoder
//!
//! Frames of eye-open probabilities → resolved eye state → duration state
//! machine → letters and words delivered to a message sink.

pub mod core;
pub mod types;

// =============================================================================
// EYE STATE
// =============================================================================

/// Eye-open probability above which an eye counts as open
pub const EYE_OPEN_THRESHOLD: f32 = 0.4;

// =============================================================================
// TIMING (milliseconds)
// =============================================================================

/// Closed interval longer than this is a dash, otherwise a dot
pub const DASH_THRESHOLD_MS: u64 = 1500;

/// Open run at least this long commits the pending letter
pub const LETTER_SPACE_MS: u64 = 1500;

/// Open run at least this long commits the pending word
pub const WORD_SPACE_MS: u64 = 3500;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
