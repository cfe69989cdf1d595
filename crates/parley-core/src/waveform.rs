//! Waveform analysis and plotting.
//!
//! Pure functions, no I/O, no async runtime. The playback side pushes
//! samples into an [`Analyser`]; the visualizer reads byte time-domain data
//! back out once per frame and rasterises it with [`plot`].

use std::collections::VecDeque;

/// Window size the analyser keeps, in samples.
pub const DEFAULT_FFT_SIZE: usize = 64;

/// Byte value of a zero sample.
pub const CENTER: u8 = 128;

/// Default plot size in terminal cells.
pub const DEFAULT_WIDTH: usize = 60;
pub const DEFAULT_HEIGHT: usize = 7;

const POINT: char = '•';
const STEM: char = '│';
const BLANK: char = ' ';

/// Rolling window over the most recently played samples.
#[derive(Debug, Clone)]
pub struct Analyser {
    window: VecDeque<i16>,
    fft_size: usize,
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new(DEFAULT_FFT_SIZE)
    }
}

impl Analyser {
    pub fn new(fft_size: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(fft_size),
            fft_size,
        }
    }

    /// Length of the buffer callers should read into.
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Append played samples, keeping only the newest `fft_size`.
    pub fn push_samples(&mut self, samples: &[i16]) {
        let skip = samples.len().saturating_sub(self.fft_size);
        for &s in &samples[skip..] {
            if self.window.len() == self.fft_size {
                self.window.pop_front();
            }
            self.window.push_back(s);
        }
    }

    /// Drop all buffered samples (silence).
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Fill `out` with the oldest `out.len()` samples of the current window,
    /// mapped to bytes centred on [`CENTER`]. Missing samples read as silence.
    pub fn byte_time_domain_data(&self, out: &mut [u8]) {
        let mut it = self.window.iter();
        for slot in out.iter_mut() {
            *slot = it.next().map_or(CENTER, |&s| sample_to_byte(s));
        }
    }
}

/// Map a signed 16-bit sample onto `0..=255`, zero at [`CENTER`].
pub fn sample_to_byte(sample: i16) -> u8 {
    ((i32::from(sample) + 32768) >> 8) as u8
}

/// Rasterise time-domain bytes into `height` rows of `width` cells.
///
/// Point `i` of `n` sits at `x = i * width / n`, `y = (byte / 128) * height / 2`,
/// and the line closes at `(width, height / 2)`. Row 0 is the top.
pub fn plot(data: &[u8], width: usize, height: usize) -> Vec<String> {
    if width == 0 || height == 0 {
        return vec![String::new(); height];
    }

    let w = width as f32;
    let h = height as f32;
    let slice_width = w / data.len().max(1) as f32;

    let mut points: Vec<(f32, f32)> = data
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let v = f32::from(b) / 128.0;
            (i as f32 * slice_width, v * h / 2.0)
        })
        .collect();
    points.push((w, h / 2.0));

    let mut grid = vec![vec![BLANK; width]; height];
    let mut prev_row: Option<usize> = None;

    for col in 0..width {
        let y = y_at(&points, col as f32 + 0.5);
        let row = (y.max(0.0) as usize).min(height - 1);

        if let Some(prev) = prev_row {
            let (lo, hi) = if prev < row { (prev, row) } else { (row, prev) };
            for stem in grid.iter_mut().take(hi).skip(lo + 1) {
                stem[col] = STEM;
            }
        }
        grid[row][col] = POINT;
        prev_row = Some(row);
    }

    grid.into_iter().map(|r| r.into_iter().collect()).collect()
}

/// Linear interpolation along a polyline sorted by x.
fn y_at(points: &[(f32, f32)], x: f32) -> f32 {
    match points {
        [] => 0.0,
        [only] => only.1,
        _ => {
            for pair in points.windows(2) {
                let (x0, y0) = pair[0];
                let (x1, y1) = pair[1];
                if x <= x1 {
                    if x1 <= x0 {
                        return y1;
                    }
                    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
                    return y0 + (y1 - y0) * t;
                }
            }
            points[points.len() - 1].1
        }
    }
}
