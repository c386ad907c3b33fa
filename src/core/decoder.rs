//! Blink decoder: duration state machine over combined eye state
//!
//! Phases:
//! - OPEN → CLOSED: flush pending letter/word for the ending open run, start blink timing
//! - CLOSED → OPEN: closure > 1.5s commits a dash, otherwise a dot
//! - OPEN held: open run ≥ 1.5s commits the letter, ≥ 3.5s commits the word
//! - CLOSED held: nothing, closure time is read on reopening
//!
//! Boundaries are only seen on the next frame after a threshold passes; there
//! is no timer of its own.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{DASH_THRESHOLD_MS, LETTER_SPACE_MS, WORD_SPACE_MS};
use crate::core::morse_table;
use crate::core::resolver::EyePair;
use crate::core::sink::MessageSink;
use crate::types::{
    CombinedState, DecoderPhase, Emission, FrameSample, Pattern, StepOutput, Symbol, Transition,
};

/// Current wall-clock time in milliseconds
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Explicit decoder state, advanced by [`step`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderState {
    phase: DecoderPhase,
    /// Most recent Open↔Closed transition (or creation time)
    last_transition_ms: u64,
    letter_emitted: bool,
    word_emitted: bool,
    symbols: Pattern,
    word: String,
    message: String,
}

/// Effects of one step besides the new state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub transition: Transition,
    pub emissions: Vec<Emission>,
}

/// Pure transition function: consume a state and a sample, return the next state
pub fn step(state: DecoderState, combined: CombinedState, now_ms: u64) -> (DecoderState, StepResult) {
    let mut next = state;
    let result = next.advance(combined, now_ms);
    (next, result)
}

impl DecoderState {
    /// Fresh state: eyes open, timing starts at `created_ms`
    pub fn new(created_ms: u64) -> Self {
        Self {
            phase: DecoderPhase::Open,
            last_transition_ms: created_ms,
            letter_emitted: false,
            word_emitted: false,
            symbols: Pattern::new(),
            word: String::new(),
            message: String::new(),
        }
    }

    /// In-place version of [`step`]
    pub fn advance(&mut self, combined: CombinedState, now_ms: u64) -> StepResult {
        let mut emissions = Vec::new();

        let transition = match (self.phase, combined) {
            (DecoderPhase::Closed, CombinedState::AtLeastOneClosed) => Transition::Held,
            (DecoderPhase::Open, CombinedState::BothOpen) => {
                self.open_state_check(now_ms, &mut emissions);
                Transition::Held
            }
            (DecoderPhase::Open, CombinedState::AtLeastOneClosed) => {
                // Flush with the open run's own timestamp before it is replaced
                self.open_state_check(now_ms, &mut emissions);
                self.reset_guards();
                self.last_transition_ms = now_ms;
                self.phase = DecoderPhase::Closed;
                debug!(t = now_ms, "eyes closed");
                Transition::EyesClosed
            }
            (DecoderPhase::Closed, CombinedState::BothOpen) => {
                let closed_ms = now_ms.saturating_sub(self.last_transition_ms);
                let symbol = if closed_ms > DASH_THRESHOLD_MS {
                    Symbol::Dash
                } else {
                    Symbol::Dot
                };
                self.symbols.push(symbol);
                self.reset_guards();
                self.last_transition_ms = now_ms;
                self.phase = DecoderPhase::Open;
                debug!(t = now_ms, closed_ms, pattern = %self.symbols, "eyes reopened: {:?}", symbol);
                Transition::Reopened(symbol)
            }
        };

        StepResult {
            transition,
            emissions,
        }
    }

    /// Letter/word boundary check for the current open run
    fn open_state_check(&mut self, now_ms: u64, emissions: &mut Vec<Emission>) {
        let open_ms = now_ms.saturating_sub(self.last_transition_ms);

        if open_ms >= LETTER_SPACE_MS && !self.letter_emitted {
            let pattern = std::mem::take(&mut self.symbols);
            let letter = morse_table::lookup(pattern.symbols());
            match letter {
                Some(c) => {
                    self.word.push(c);
                    info!(pattern = %pattern, word = %self.word, "letter decoded: {}", c);
                }
                None => debug!(pattern = %pattern, "pattern not in code table, dropped"),
            }
            emissions.push(Emission::Letter {
                pattern,
                letter,
                message: self.current_message(),
            });
            self.letter_emitted = true;
        }

        if open_ms >= WORD_SPACE_MS && !self.word_emitted {
            let word = std::mem::take(&mut self.word);
            self.message.push_str(&word);
            self.message.push(' ');
            info!(decoded = %self.message, "word committed: {:?}", word);
            emissions.push(Emission::Word {
                word,
                message: self.message.clone(),
            });
            self.word_emitted = true;
        }
    }

    fn reset_guards(&mut self) {
        self.letter_emitted = false;
        self.word_emitted = false;
    }

    pub fn phase(&self) -> DecoderPhase {
        self.phase
    }

    pub fn last_transition_ms(&self) -> u64 {
        self.last_transition_ms
    }

    /// Symbols of the letter in progress
    pub fn pending_symbols(&self) -> &Pattern {
        &self.symbols
    }

    /// Letters of the word in progress
    pub fn pending_word(&self) -> &str {
        &self.word
    }

    /// Completed words, each followed by a space
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Completed words plus the word in progress
    pub fn current_message(&self) -> String {
        format!("{}{}", self.message, self.word)
    }
}

/// Per-face decoder: resolves eyes, steps the state machine, notifies the sink
#[derive(Debug)]
pub struct BlinkDecoder<S: MessageSink> {
    state: DecoderState,
    eyes: EyePair,
    sink: S,
    frame_count: u64,
}

impl<S: MessageSink> BlinkDecoder<S> {
    /// Create a decoder whose timing starts at `created_ms`
    pub fn new(sink: S, created_ms: u64) -> Self {
        Self {
            state: DecoderState::new(created_ms),
            eyes: EyePair::new(),
            sink,
            frame_count: 0,
        }
    }

    /// Create a decoder timed from the wall clock
    pub fn starting_now(sink: S) -> Self {
        Self::new(sink, now_ms())
    }

    /// Process one frame observed at `now_ms`
    pub fn observe(&mut self, frame: FrameSample, now_ms: u64) -> StepOutput {
        self.frame_count += 1;
        let combined = self.eyes.resolve(frame);
        let result = self.state.advance(combined, now_ms);

        for emission in &result.emissions {
            self.sink.notify(emission.message());
        }

        StepOutput::new(
            now_ms,
            self.state.phase(),
            result.transition,
            result.emissions,
            self.state.current_message(),
        )
    }

    /// Process one frame using the wall clock
    pub fn observe_now(&mut self, frame: FrameSample) -> StepOutput {
        self.observe(frame, now_ms())
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    pub fn phase(&self) -> DecoderPhase {
        self.state.phase()
    }

    pub fn current_message(&self) -> String {
        self.state.current_message()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::RecordingSink;

    const OPEN: CombinedState = CombinedState::BothOpen;
    const CLOSED: CombinedState = CombinedState::AtLeastOneClosed;

    fn run(samples: &[(CombinedState, u64)]) -> (DecoderState, Vec<Emission>) {
        let mut state = DecoderState::new(0);
        let mut all = Vec::new();
        for &(combined, t) in samples {
            let (next, result) = step(state, combined, t);
            state = next;
            all.extend(result.emissions);
        }
        (state, all)
    }

    #[test]
    fn test_initial_state_is_open() {
        let state = DecoderState::new(42);
        assert_eq!(state.phase(), DecoderPhase::Open);
        assert_eq!(state.last_transition_ms(), 42);
        assert!(state.pending_symbols().is_empty());
        assert_eq!(state.current_message(), "");
    }

    #[test]
    fn test_closed_while_closed_is_noop() {
        let (state, emissions) = run(&[(CLOSED, 100), (CLOSED, 5000), (CLOSED, 9000)]);
        assert_eq!(state.phase(), DecoderPhase::Closed);
        assert_eq!(state.last_transition_ms(), 100);
        assert!(emissions.is_empty());
    }

    #[test]
    fn test_dot_dash_boundary() {
        for (closed_ms, expected) in [
            (0, Symbol::Dot),
            (200, Symbol::Dot),
            (1500, Symbol::Dot),
            (1501, Symbol::Dash),
            (4000, Symbol::Dash),
        ] {
            let (state, _) = run(&[(CLOSED, 100), (OPEN, 100 + closed_ms)]);
            assert_eq!(state.pending_symbols().symbols(), &[expected], "closed {}ms", closed_ms);
        }
    }

    #[test]
    fn test_reopen_reports_symbol() {
        let (state, _) = step(DecoderState::new(0), CLOSED, 100);
        let (_, result) = step(state, OPEN, 2000);
        assert_eq!(result.transition, Transition::Reopened(Symbol::Dash));
        assert!(result.emissions.is_empty());
    }

    #[test]
    fn test_single_dot_emits_e() {
        let (state, emissions) = run(&[(CLOSED, 0), (OPEN, 200), (OPEN, 1000), (OPEN, 1800)]);
        assert_eq!(emissions.len(), 1);
        match &emissions[0] {
            Emission::Letter { pattern, letter, message } => {
                assert_eq!(pattern.to_string(), ".");
                assert_eq!(*letter, Some('E'));
                assert_eq!(message, "E");
            }
            other => panic!("expected letter, got {:?}", other),
        }
        assert_eq!(state.pending_word(), "E");
        assert_eq!(state.message(), "");
    }

    #[test]
    fn test_dot_dash_emits_a() {
        let (state, emissions) = run(&[
            (CLOSED, 0),
            (OPEN, 200),   // dot
            (CLOSED, 700),
            (OPEN, 2700),  // dash
            (OPEN, 4300),  // letter space
        ]);
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].message(), "A");
        assert_eq!(state.pending_word(), "A");
    }

    #[test]
    fn test_emission_is_idempotent_within_open_run() {
        let mut samples = vec![(CLOSED, 0), (OPEN, 200)];
        for t in (300..10_000).step_by(100) {
            samples.push((OPEN, t));
        }
        let (state, emissions) = run(&samples);
        assert_eq!(emissions.iter().filter(|e| e.is_letter()).count(), 1);
        assert_eq!(emissions.iter().filter(|e| e.is_word()).count(), 1);
        assert_eq!(state.message(), "E ");
    }

    #[test]
    fn test_long_open_without_blinks_emits_empty_letter_then_space() {
        let (state, emissions) = run(&[(OPEN, 1600), (OPEN, 3600)]);
        assert_eq!(emissions.len(), 2);
        assert_eq!(
            emissions[0],
            Emission::Letter { pattern: Pattern::new(), letter: None, message: String::new() }
        );
        assert_eq!(
            emissions[1],
            Emission::Word { word: String::new(), message: " ".to_string() }
        );
        assert_eq!(state.message(), " ");
    }

    #[test]
    fn test_letter_and_word_can_fire_on_same_frame() {
        let (state, emissions) = run(&[(CLOSED, 0), (OPEN, 100), (OPEN, 5000)]);
        assert_eq!(emissions.len(), 2);
        assert_eq!(emissions[0].message(), "E");
        assert_eq!(emissions[1].message(), "E ");
        assert_eq!(state.pending_word(), "");
    }

    #[test]
    fn test_unknown_pattern_is_dropped_and_cleared() {
        // Six dots: no table entry
        let mut samples = Vec::new();
        let mut t = 0;
        for _ in 0..6 {
            samples.push((CLOSED, t));
            samples.push((OPEN, t + 100));
            t += 400;
        }
        samples.push((OPEN, t + 1600));
        let (state, emissions) = run(&samples);
        assert_eq!(emissions.len(), 1);
        match &emissions[0] {
            Emission::Letter { pattern, letter, .. } => {
                assert_eq!(pattern.to_string(), "......");
                assert_eq!(*letter, None);
            }
            other => panic!("expected letter, got {:?}", other),
        }
        assert!(state.pending_symbols().is_empty());
        assert_eq!(state.pending_word(), "");
    }

    #[test]
    fn test_closing_edge_flushes_pending_letter() {
        // Open run long enough for a letter, but no open frame arrives after 1.5s
        let (state, emissions) = run(&[(CLOSED, 0), (OPEN, 200), (OPEN, 900), (CLOSED, 2000)]);
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].message(), "E");
        assert_eq!(state.phase(), DecoderPhase::Closed);
        assert!(state.pending_symbols().is_empty());
    }

    #[test]
    fn test_closing_edge_flushes_pending_word() {
        // Open run passes the word space with no open frame after 1.5s
        let (state, emissions) = run(&[(CLOSED, 0), (OPEN, 200), (OPEN, 900), (CLOSED, 4000)]);
        assert_eq!(emissions.len(), 2);
        assert!(emissions[0].is_letter());
        assert_eq!(emissions[0].message(), "E");
        assert!(emissions[1].is_word());
        assert_eq!(emissions[1].message(), "E ");
        assert_eq!(state.phase(), DecoderPhase::Closed);
        assert_eq!(state.message(), "E ");
        assert!(state.pending_word().is_empty());
        assert_eq!(state.last_transition_ms(), 4000);

        // A short blink afterwards starts a fresh letter without re-emitting
        let (state, result) = step(state, OPEN, 4200);
        assert!(result.emissions.is_empty());
        assert_eq!(state.pending_symbols().symbols(), &[Symbol::Dot]);
    }

    #[test]
    fn test_closing_edge_measures_closure_from_close_instant() {
        // Open 1400ms then a short blink: still a dot
        let (state, _) = run(&[(CLOSED, 0), (OPEN, 200), (CLOSED, 1600), (OPEN, 1800)]);
        assert_eq!(state.pending_symbols().to_string(), "..");
    }

    #[test]
    fn test_guards_reset_on_each_transition() {
        let (state, emissions) = run(&[
            (CLOSED, 0),
            (OPEN, 200),
            (OPEN, 1800), // E
            (CLOSED, 2000),
            (OPEN, 3800), // dash
            (OPEN, 5400), // T
            (OPEN, 7400), // word
        ]);
        let messages: Vec<&str> = emissions.iter().map(Emission::message).collect();
        assert_eq!(messages, vec!["E", "ET", "ET "]);
        assert_eq!(state.message(), "ET ");
    }

    #[test]
    fn test_clock_going_backwards_saturates() {
        let (state, emissions) = run(&[(CLOSED, 1000), (OPEN, 900)]);
        assert_eq!(state.pending_symbols().to_string(), ".");
        assert!(emissions.is_empty());
    }

    #[test]
    fn test_blink_decoder_notifies_sink_with_snapshots() {
        let mut decoder = BlinkDecoder::new(RecordingSink::new(), 0);
        decoder.observe(FrameSample::closed(), 0);
        decoder.observe(FrameSample::open(), 200);
        let out = decoder.observe(FrameSample::open(), 1700);
        assert_eq!(out.message, "E");
        assert!(out.emitted());
        decoder.observe(FrameSample::open(), 3700);

        assert_eq!(decoder.sink().messages, vec!["E".to_string(), "E ".to_string()]);
        assert_eq!(decoder.frame_count(), 4);
    }

    #[test]
    fn test_blink_decoder_wink_counts_as_closed() {
        use crate::types::EyeReading;
        let mut decoder = BlinkDecoder::new(RecordingSink::new(), 0);
        let wink = FrameSample::new(EyeReading::Probability(0.9), EyeReading::Probability(0.1));
        let out = decoder.observe(wink, 100);
        assert_eq!(out.phase, DecoderPhase::Closed);
        assert_eq!(out.transition, Transition::EyesClosed);
    }
}
