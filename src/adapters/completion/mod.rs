//! Completion service adapters.

mod hf_provider;

pub use hf_provider::{HfRouterCompletion, HfRouterConfig};
