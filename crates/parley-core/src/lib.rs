//! parley-core: pure types, text preparation, and waveform math.
//!
//! No async runtime, no I/O, no platform dependencies.

pub mod text_prep;
pub mod types;
pub mod waveform;
