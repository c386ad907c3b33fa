//! Face tracker registry: one decoder per tracked face appearance

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::core::decoder::BlinkDecoder;
use crate::core::sink::MessageSink;
use crate::types::{FrameSample, StepOutput};

/// Identifier the face detector assigns to a tracked face
pub type FaceId = u32;

/// Owns an independent decoder for every face currently tracked
#[derive(Debug)]
pub struct FaceTracker<S: MessageSink> {
    decoders: HashMap<FaceId, BlinkDecoder<S>>,
}

impl<S: MessageSink> Default for FaceTracker<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MessageSink> FaceTracker<S> {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Face appeared: start a fresh decoder, replacing any previous one for this id
    pub fn on_appear(&mut self, face: FaceId, sink: S, now_ms: u64) {
        if self.decoders.insert(face, BlinkDecoder::new(sink, now_ms)).is_some() {
            warn!(face, "face reappeared without disappearing, decoder reset");
        } else {
            info!(face, "face appeared");
        }
    }

    /// New frame for a tracked face. None if the face is not tracked.
    pub fn on_update(&mut self, face: FaceId, frame: FrameSample, now_ms: u64) -> Option<StepOutput> {
        match self.decoders.get_mut(&face) {
            Some(decoder) => Some(decoder.observe(frame, now_ms)),
            None => {
                debug!(face, "frame for untracked face ignored");
                None
            }
        }
    }

    /// Face temporarily not detected; decoding state is kept as is
    pub fn on_missing(&mut self, face: FaceId) {
        debug!(face, tracked = self.decoders.contains_key(&face), "face missing");
    }

    /// Face gone for good: drop its decoder, handing back the sink
    pub fn on_disappear(&mut self, face: FaceId) -> Option<BlinkDecoder<S>> {
        let decoder = self.decoders.remove(&face);
        if let Some(d) = &decoder {
            info!(face, decoded = %d.current_message(), "face gone, decoder discarded");
        }
        decoder
    }

    pub fn decoder(&self, face: FaceId) -> Option<&BlinkDecoder<S>> {
        self.decoders.get(&face)
    }

    /// Message decoded so far for a face
    pub fn current_message(&self, face: FaceId) -> Option<String> {
        self.decoders.get(&face).map(BlinkDecoder::current_message)
    }

    pub fn is_tracking(&self, face: FaceId) -> bool {
        self.decoders.contains_key(&face)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::RecordingSink;

    fn blink_e(tracker: &mut FaceTracker<RecordingSink>, face: FaceId, t0: u64) {
        tracker.on_update(face, FrameSample::closed(), t0);
        tracker.on_update(face, FrameSample::open(), t0 + 200);
        tracker.on_update(face, FrameSample::open(), t0 + 1800);
    }

    #[test]
    fn test_faces_are_independent() {
        let mut tracker = FaceTracker::new();
        tracker.on_appear(1, RecordingSink::new(), 0);
        tracker.on_appear(2, RecordingSink::new(), 0);

        blink_e(&mut tracker, 1, 0);

        assert_eq!(tracker.current_message(1).as_deref(), Some("E"));
        assert_eq!(tracker.current_message(2).as_deref(), Some(""));
        assert_eq!(tracker.decoder(2).unwrap().sink().count(), 0);
    }

    #[test]
    fn test_untracked_face_ignored() {
        let mut tracker: FaceTracker<RecordingSink> = FaceTracker::new();
        assert!(tracker.on_update(7, FrameSample::open(), 0).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_missing_keeps_state() {
        let mut tracker = FaceTracker::new();
        tracker.on_appear(1, RecordingSink::new(), 0);
        tracker.on_update(1, FrameSample::closed(), 0);
        tracker.on_missing(1);
        tracker.on_update(1, FrameSample::open(), 200);
        assert_eq!(tracker.decoder(1).unwrap().state().pending_symbols().to_string(), ".");
    }

    #[test]
    fn test_disappear_discards_and_returns_sink() {
        let mut tracker = FaceTracker::new();
        tracker.on_appear(1, RecordingSink::new(), 0);
        blink_e(&mut tracker, 1, 0);

        let decoder = tracker.on_disappear(1).unwrap();
        assert_eq!(decoder.into_sink().last(), Some("E"));
        assert!(!tracker.is_tracking(1));
        assert!(tracker.on_disappear(1).is_none());
    }

    #[test]
    fn test_reappear_starts_fresh() {
        let mut tracker = FaceTracker::new();
        tracker.on_appear(1, RecordingSink::new(), 0);
        blink_e(&mut tracker, 1, 0);
        tracker.on_appear(1, RecordingSink::new(), 10_000);
        assert_eq!(tracker.current_message(1).as_deref(), Some(""));
        assert_eq!(tracker.len(), 1);
    }
}
