//! Speak a reply: synthesize through the proxy, play it, draw the waveform.

use std::io::Write;

use tracing::debug;

use parley_core::text_prep::strip_emojis;

use crate::client::ProxyClient;
use crate::playback::{decode_mp3, Player};
use crate::visualizer::Visualizer;
use crate::{Error, Result};

/// Strip emojis from `text` and synthesize what is left.
///
/// `Ok(None)` when nothing speakable remains.
pub async fn fetch_speech(
    client: &ProxyClient,
    text: &str,
    voice: Option<&str>,
) -> Result<Option<Vec<u8>>> {
    let cleaned = strip_emojis(text);
    if cleaned.trim().is_empty() {
        return Ok(None);
    }
    client.synthesize(&cleaned, voice).await.map(Some)
}

pub struct Speaker {
    player: Player,
    visualizer: Visualizer,
}

impl Speaker {
    pub fn new(player: Player) -> Self {
        let visualizer = Visualizer::new(player.analyser());
        Self { player, visualizer }
    }

    /// Play an MP3 payload and draw its waveform into `out` until it ends.
    pub async fn play<W: Write>(&self, mp3: Vec<u8>, out: &mut W) -> Result<()> {
        let clip = tokio::task::spawn_blocking(move || decode_mp3(&mp3))
            .await
            .map_err(|e| Error::Audio(format!("decode task failed: {e}")))??;

        debug!("speaker: playing {:.1}s clip", clip.duration().as_secs_f32());
        let done = self.player.play(clip)?;
        let frames = self.visualizer.run_until(done, out).await?;
        debug!("speaker: drew {frames} frames");
        Ok(())
    }
}
