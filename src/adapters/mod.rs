//! Adapters: concrete implementations of the ports plus the HTTP surface.

pub mod completion;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
