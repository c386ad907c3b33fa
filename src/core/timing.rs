//! Timing encoder: text → synthetic blink frames
//!
//! Produces a frame stream that the decoder turns back into the same text.
//! Used by the CLI simulation mode and by round-trip tests.

use serde::{Deserialize, Serialize};

use crate::{DASH_THRESHOLD_MS, LETTER_SPACE_MS, WORD_SPACE_MS};
use crate::core::decoder::BlinkDecoder;
use crate::core::morse_table;
use crate::core::sink::NullSink;
use crate::types::{FrameSample, Symbol, TimedFrame};

/// Durations used when encoding text into frames (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingProfile {
    /// Closure length for a dot
    pub dot_ms: u64,
    /// Closure length for a dash
    pub dash_ms: u64,
    /// Open gap between symbols of one letter
    pub symbol_gap_ms: u64,
    /// Open gap between letters of one word
    pub letter_gap_ms: u64,
    /// Open gap after each word
    pub word_gap_ms: u64,
    /// Frame period
    pub frame_ms: u64,
    /// Open time before the first blink
    pub lead_in_ms: u64,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self {
            dot_ms: 300,
            dash_ms: 2000,
            symbol_gap_ms: 500,
            letter_gap_ms: 2000,
            word_gap_ms: 4000,
            frame_ms: 50,
            lead_in_ms: 500,
        }
    }
}

/// Errors from encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Character has no entry in the code table
    UnsupportedChar(char),
    /// Profile durations would not decode back to the same symbols
    InvalidProfile(&'static str),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::UnsupportedChar(c) => write!(f, "no morse code for {:?}", c),
            EncodeError::InvalidProfile(why) => write!(f, "invalid timing profile: {}", why),
        }
    }
}

impl std::error::Error for EncodeError {}

impl TimingProfile {
    /// Check that every duration lands on the right side of its threshold,
    /// allowing one frame of quantisation
    pub fn validate(&self) -> Result<(), EncodeError> {
        let frame = self.frame_ms;
        if frame == 0 {
            return Err(EncodeError::InvalidProfile("frame_ms must be positive"));
        }
        if self.dot_ms == 0 || self.dot_ms.saturating_add(frame) > DASH_THRESHOLD_MS {
            return Err(EncodeError::InvalidProfile("dot must stay under the dash threshold"));
        }
        if self.dash_ms <= DASH_THRESHOLD_MS.saturating_add(frame) {
            return Err(EncodeError::InvalidProfile("dash must exceed the dash threshold"));
        }
        if self.symbol_gap_ms == 0 || self.symbol_gap_ms.saturating_add(frame) > LETTER_SPACE_MS {
            return Err(EncodeError::InvalidProfile("symbol gap must stay under the letter space"));
        }
        if self.letter_gap_ms < LETTER_SPACE_MS.saturating_add(frame)
            || self.letter_gap_ms.saturating_add(frame) > WORD_SPACE_MS
        {
            return Err(EncodeError::InvalidProfile("letter gap must sit between letter and word space"));
        }
        if self.word_gap_ms < WORD_SPACE_MS.saturating_add(frame) {
            return Err(EncodeError::InvalidProfile("word gap must exceed the word space"));
        }
        if self.lead_in_ms.saturating_add(frame) > LETTER_SPACE_MS {
            return Err(EncodeError::InvalidProfile("lead-in must stay under the letter space"));
        }
        Ok(())
    }

    /// Encode `text` into frames starting at `start_ms`.
    /// Words are split on whitespace; every word, including the last, is
    /// followed by a word gap.
    pub fn encode(&self, text: &str, start_ms: u64) -> Result<Vec<TimedFrame>, EncodeError> {
        self.validate()?;

        let words: Vec<Vec<Vec<Symbol>>> = text
            .split_whitespace()
            .map(|word| {
                word.chars()
                    .map(|c| {
                        morse_table::pattern_for(c)
                            .map(|p| p.symbols().to_vec())
                            .ok_or(EncodeError::UnsupportedChar(c))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut timeline = Timeline::new(start_ms, self.frame_ms);
        timeline.hold(FrameSample::open(), self.lead_in_ms);

        for letters in &words {
            for (li, symbols) in letters.iter().enumerate() {
                for (si, symbol) in symbols.iter().enumerate() {
                    let closed = match symbol {
                        Symbol::Dot => self.dot_ms,
                        Symbol::Dash => self.dash_ms,
                    };
                    timeline.hold(FrameSample::closed(), closed);
                    if si + 1 < symbols.len() {
                        timeline.hold(FrameSample::open(), self.symbol_gap_ms);
                    }
                }
                if li + 1 < letters.len() {
                    timeline.hold(FrameSample::open(), self.letter_gap_ms);
                }
            }
            timeline.hold(FrameSample::open(), self.word_gap_ms);
        }

        // One more open frame so the final word gap is observed
        timeline.hold(FrameSample::open(), self.frame_ms);
        Ok(timeline.frames)
    }
}

/// Frame accumulator at a fixed period
struct Timeline {
    t_ms: u64,
    frame_ms: u64,
    frames: Vec<TimedFrame>,
}

impl Timeline {
    fn new(start_ms: u64, frame_ms: u64) -> Self {
        Self {
            t_ms: start_ms,
            frame_ms,
            frames: Vec::new(),
        }
    }

    /// Emit `frame` every period for `duration_ms`
    fn hold(&mut self, frame: FrameSample, duration_ms: u64) {
        let end = self.t_ms.saturating_add(duration_ms);
        while self.t_ms < end {
            self.frames.push(TimedFrame::new(self.t_ms, frame));
            self.t_ms = self.t_ms.saturating_add(self.frame_ms);
        }
        self.t_ms = end;
    }
}

/// Feed frames through a fresh decoder created at `created_ms`; returns the
/// decoded message including any unfinished word
pub fn decode_frames(frames: &[TimedFrame], created_ms: u64) -> String {
    let mut decoder = BlinkDecoder::new(NullSink, created_ms);
    for timed in frames {
        decoder.observe(timed.frame, timed.t_ms);
    }
    decoder.current_message()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_profile_is_valid() {
        assert_eq!(TimingProfile::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_profiles_rejected() {
        let long_dot = TimingProfile { dot_ms: 1500, ..Default::default() };
        assert!(long_dot.validate().is_err());

        let short_word_gap = TimingProfile { word_gap_ms: 3000, ..Default::default() };
        assert!(short_word_gap.validate().is_err());

        let no_frames = TimingProfile { frame_ms: 0, ..Default::default() };
        assert!(no_frames.validate().is_err());

        let huge_frames = TimingProfile { frame_ms: u64::MAX, ..Default::default() };
        assert!(huge_frames.validate().is_err());
        assert!(huge_frames.encode("E", 0).is_err());

        let huge_lead_in = TimingProfile { lead_in_ms: u64::MAX, ..Default::default() };
        assert!(huge_lead_in.validate().is_err());
    }

    #[test]
    fn test_unsupported_char() {
        let err = TimingProfile::default().encode("HI!", 0).unwrap_err();
        assert_eq!(err, EncodeError::UnsupportedChar('!'));
    }

    #[test]
    fn test_frames_are_periodic_and_start_open() {
        let frames = TimingProfile::default().encode("E", 1000).unwrap();
        assert_eq!(frames[0].t_ms, 1000);
        assert_eq!(frames[0].frame, FrameSample::open());
        assert!(frames.windows(2).all(|w| w[1].t_ms - w[0].t_ms == 50));
    }

    #[test]
    fn test_encode_decode_sos() {
        let frames = TimingProfile::default().encode("SOS", 0).unwrap();
        assert_eq!(decode_frames(&frames, 0), "SOS ");
    }

    #[test]
    fn test_encode_decode_two_words_with_digits() {
        let frames = TimingProfile::default().encode("hello 42", 0).unwrap();
        assert_eq!(decode_frames(&frames, 0), "HELLO 42 ");
    }

    #[test]
    fn test_empty_text_decodes_to_nothing() {
        let frames = TimingProfile::default().encode("", 0).unwrap();
        assert_eq!(decode_frames(&frames, 0), "");
    }
}
