//! Speech playback: MP3 decode, rodio output, analyser tap.
//!
//! ```text
//! Player::play(clip) → [cmd_tx] → playback thread: replace sink contents
//!     → TappedSource → speakers
//!                    → SharedAnalyser → Visualizer (per frame)
//! ```
//!
//! The rodio `OutputStream` is `!Send`, so it lives on its own OS thread and
//! everything else talks to it over a channel. One clip plays at a time; a
//! new clip replaces the current one. Each `play` returns a receiver that
//! resolves when that clip finishes or is replaced.

use std::io::Cursor;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;
use tracing::{debug, error};

use parley_core::waveform::Analyser;

use crate::tap::{SharedAnalyser, TappedSource};
use crate::{Error, Result};

/// How often the playback thread checks whether the sink drained.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Interleaved 16-bit PCM ready for playback.
#[derive(Debug, Clone)]
pub struct DecodedClip {
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedClip {
    pub fn duration(&self) -> Duration {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate.max(1)))
    }
}

/// Decode a whole MP3 payload.
pub fn decode_mp3(mp3_data: &[u8]) -> Result<DecodedClip> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut format: Option<(u16, u32)> = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if format.is_none() {
                    let channels = u16::try_from(frame.channels)
                        .map_err(|_| Error::Audio(format!("bad channel count {}", frame.channels)))?;
                    let rate = u32::try_from(frame.sample_rate)
                        .map_err(|_| Error::Audio(format!("bad sample rate {}", frame.sample_rate)))?;
                    format = Some((channels, rate));
                }
                samples.extend_from_slice(&frame.data);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    let (channels, sample_rate) =
        format.ok_or_else(|| Error::Audio("no MP3 frames in payload".into()))?;

    Ok(DecodedClip {
        samples,
        channels,
        sample_rate,
    })
}

// ─── Player ────────────────────────────────────────────────────────────────

enum PlayCmd {
    Play {
        clip: DecodedClip,
        done: oneshot::Sender<()>,
    },
}

/// Cloneable handle to the playback thread.
#[derive(Clone)]
pub struct Player {
    cmd_tx: mpsc::Sender<PlayCmd>,
    analyser: SharedAnalyser,
}

impl Player {
    /// Spawn the playback thread.
    ///
    /// If no output device can be opened the thread exits and later
    /// [`play`](Self::play) calls return [`Error::Audio`].
    pub fn new() -> Result<Self> {
        let analyser: SharedAnalyser = Arc::new(Mutex::new(Analyser::default()));
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayCmd>();

        let thread_analyser = analyser.clone();
        std::thread::Builder::new()
            .name("parley-playback".into())
            .spawn(move || playback_thread(cmd_rx, thread_analyser))?;

        Ok(Self { cmd_tx, analyser })
    }

    /// Analyser fed by whatever is currently playing.
    pub fn analyser(&self) -> SharedAnalyser {
        self.analyser.clone()
    }

    /// Replace the current clip with `clip`.
    ///
    /// The returned receiver resolves (`Ok` or `Err`) once this clip is no
    /// longer playing.
    pub fn play(&self, clip: DecodedClip) -> Result<oneshot::Receiver<()>> {
        let (done, done_rx) = oneshot::channel();
        self.cmd_tx
            .send(PlayCmd::Play { clip, done })
            .map_err(|_| Error::Audio("playback thread not running".into()))?;
        Ok(done_rx)
    }
}

// ─── Playback OS thread ───────────────────────────────────────────────────

fn playback_thread(cmd_rx: mpsc::Receiver<PlayCmd>, analyser: SharedAnalyser) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            return;
        }
    };

    let Some(mut sink) = new_sink(&stream_handle) else {
        return;
    };
    let mut slot = ClipSlot::new(analyser.clone());

    loop {
        if sink.empty() {
            slot.drained();
        }

        match cmd_rx.recv_timeout(POLL_INTERVAL) {
            Ok(PlayCmd::Play { clip, done }) => {
                slot.replace(done);
                if !sink.empty() {
                    sink.stop();
                    let Some(fresh) = new_sink(&stream_handle) else {
                        return;
                    };
                    sink = fresh;
                }

                debug!(
                    "playback: {} samples, {} ch @ {} Hz",
                    clip.samples.len(),
                    clip.channels,
                    clip.sample_rate
                );
                let source = SamplesBuffer::new(clip.channels, clip.sample_rate, clip.samples);
                sink.append(TappedSource::new(source, analyser.clone()));
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                sink.stop();
                break;
            }
        }
    }
}

fn new_sink(handle: &OutputStreamHandle) -> Option<Sink> {
    match Sink::try_new(handle) {
        Ok(sink) => Some(sink),
        Err(e) => {
            error!("playback: failed to create sink: {e}");
            None
        }
    }
}

/// Completion signal for the clip on the sink.
struct ClipSlot {
    current: Option<oneshot::Sender<()>>,
    analyser: SharedAnalyser,
}

impl ClipSlot {
    fn new(analyser: SharedAnalyser) -> Self {
        Self {
            current: None,
            analyser,
        }
    }

    /// A new clip takes over. The previous one, if any, is done now.
    fn replace(&mut self, done: oneshot::Sender<()>) {
        if let Some(prev) = self.current.replace(done) {
            debug!("playback: clip replaced");
            self.finish(prev);
        }
    }

    /// The sink ran dry.
    fn drained(&mut self) {
        if let Some(done) = self.current.take() {
            debug!("playback: clip finished");
            self.finish(done);
        }
    }

    /// Signal the waiter and drop the stale waveform.
    fn finish(&self, done: oneshot::Sender<()>) {
        if let Ok(mut a) = self.analyser.lock() {
            a.clear();
        }
        let _ = done.send(());
    }
}
