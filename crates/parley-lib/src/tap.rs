//! Rodio `Source` wrapper that copies played samples into an analyser.
//!
//! Samples are handed to the analyser in small batches as rodio pulls them,
//! so the visualizer sees roughly what is coming out of the speakers without
//! taking the lock once per sample.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::Source;

use parley_core::waveform::Analyser;

/// Analyser shared between the audio thread and the visualizer.
pub type SharedAnalyser = Arc<Mutex<Analyser>>;

/// Samples collected before each analyser update.
const TAP_BATCH: usize = 32;

/// A rodio `Source` that forwards `inner` and feeds an analyser.
pub struct TappedSource<S> {
    inner: S,
    analyser: SharedAnalyser,
    pending: Vec<i16>,
}

impl<S> TappedSource<S>
where
    S: Source<Item = i16>,
{
    pub fn new(inner: S, analyser: SharedAnalyser) -> Self {
        Self {
            inner,
            analyser,
            pending: Vec::with_capacity(TAP_BATCH),
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Ok(mut analyser) = self.analyser.lock() {
            analyser.push_samples(&self.pending);
        }
        self.pending.clear();
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source<Item = i16>,
{
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        match self.inner.next() {
            Some(sample) => {
                self.pending.push(sample);
                if self.pending.len() >= TAP_BATCH {
                    self.flush();
                }
                Some(sample)
            }
            None => {
                self.flush();
                None
            }
        }
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source<Item = i16>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}
