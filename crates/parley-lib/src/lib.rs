//! parley-lib: chat proxy engine.
//!
//! Completion and speech upstream clients, the proxy HTTP API, a client for
//! that API, the chat session, and speech playback with a live waveform.
//! Depends on parley-core for pure types and text processing.

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod playback;
pub mod server;
pub mod session;
pub mod speaker;
pub mod speech;
pub mod tap;
pub mod visualizer;

pub use error::{Error, Result};

// Re-export parley-core for convenience
pub use parley_core;
