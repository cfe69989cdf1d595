//! Terminal waveform visualizer.
//!
//! Samples the shared analyser once per frame and redraws a fixed block of
//! terminal rows in place. The loop runs until the future it is given
//! resolves, normally the "clip finished" signal from the player, then
//! erases its block.

use std::io::Write;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use parley_core::waveform::{plot, DEFAULT_HEIGHT, DEFAULT_WIDTH};

use crate::tap::SharedAnalyser;
use crate::Result;

/// ~60 fps, the usual display refresh.
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

const CLEAR_LINE: &str = "\x1b[K";
const CLEAR_BELOW: &str = "\x1b[J";

pub struct Visualizer {
    analyser: SharedAnalyser,
    width: usize,
    height: usize,
    frame_interval: Duration,
}

impl Visualizer {
    pub fn new(analyser: SharedAnalyser) -> Self {
        Self {
            analyser,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frame_interval: FRAME_INTERVAL,
        }
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Rows for the current analyser contents.
    pub fn render_frame(&self) -> Vec<String> {
        let data = match self.analyser.lock() {
            Ok(analyser) => {
                let mut data = vec![0u8; analyser.frequency_bin_count()];
                analyser.byte_time_domain_data(&mut data);
                data
            }
            // A panicked writer leaves nothing worth drawing.
            Err(_) => Vec::new(),
        };
        plot(&data, self.width, self.height)
    }

    /// Draw frames into `out` until `done` resolves. Returns the number of
    /// frames drawn.
    pub async fn run_until<F, W>(&self, done: F, out: &mut W) -> Result<usize>
    where
        F: Future,
        W: Write,
    {
        tokio::pin!(done);
        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = &mut done => break,
                _ = ticker.tick() => {
                    self.draw(out, frames > 0)?;
                    frames += 1;
                }
            }
        }

        if frames > 0 {
            write!(out, "\x1b[{}A\r{CLEAR_BELOW}", self.height)?;
            out.flush()?;
        }
        Ok(frames)
    }

    fn draw<W: Write>(&self, out: &mut W, redraw: bool) -> std::io::Result<()> {
        if redraw {
            write!(out, "\x1b[{}A", self.height)?;
        }
        for row in self.render_frame() {
            writeln!(out, "\r{row}{CLEAR_LINE}")?;
        }
        out.flush()
    }
}
