//! Core types for blinkcode

mod eye;
mod symbol;
mod state;
mod emission;
mod reason;
mod output;

pub use eye::{EyeReading, EyeState, CombinedState, FrameSample, TimedFrame};
pub use symbol::{Symbol, Pattern};
pub use state::DecoderPhase;
pub use emission::{Transition, Emission};
pub use reason::ReasonCode;
pub use output::StepOutput;
