//! Application layer: use-case orchestration over the ports.

mod dispatcher;
mod mcq_synthesizer;
mod trainer;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
pub use mcq_synthesizer::{McqSynthesizer, SynthesisError};
pub use trainer::Trainer;
