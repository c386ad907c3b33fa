//! Core modules for blinkcode

pub mod morse_table;
pub mod resolver;
pub mod sink;
pub mod decoder;
pub mod tracker;
pub mod timing;
pub mod trace;
pub mod api;

pub use resolver::{EyeResolver, EyePair};
pub use sink::{MessageSink, NullSink, RecordingSink, SharedMessage};
pub use decoder::{BlinkDecoder, DecoderState, StepResult, step, now_ms};
pub use tracker::{FaceId, FaceTracker};
pub use timing::{TimingProfile, EncodeError, decode_frames};
pub use trace::{TraceReader, TraceError, parse_line, format_frames};
pub use api::{create_router, run_server};
