//! parley CLI: chat proxy and terminal client.
//!
//! ```text
//! parley serve [--port 3001] [--host 127.0.0.1]
//! parley chat [--server http://localhost:3001] [--voice en-US-JennyNeural] [--no-audio]
//! parley ask "hello" [--server ...]
//! parley say "hello" [--server ...] [--voice ...] [--out hello.mp3]
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use parley_lib::client::ProxyClient;
use parley_lib::config::{load_dotenv, ProxyConfig};
use parley_lib::parley_core::types::{Message, Role};
use parley_lib::playback::Player;
use parley_lib::server::{router, ProxyState};
use parley_lib::session::{ChatSession, Outcome};
use parley_lib::speaker::{fetch_speech, Speaker};

/// parley: chat with a hosted model and hear the replies
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the proxy server
    Serve {
        /// Listen port
        #[arg(long, default_value = "3001")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Interactive chat with spoken replies
    Chat {
        /// Proxy URL
        #[arg(long, default_value = "http://localhost:3001")]
        server: String,
        /// Speech voice
        #[arg(long)]
        voice: Option<String>,
        /// Don't synthesize or play replies
        #[arg(long)]
        no_audio: bool,
    },
    /// Send one prompt and print the reply
    Ask {
        /// Prompt text
        prompt: String,
        #[arg(long, default_value = "http://localhost:3001")]
        server: String,
    },
    /// Synthesize text; play it, or save the MP3 with --out
    Say {
        /// Text to speak
        text: String,
        #[arg(long, default_value = "http://localhost:3001")]
        server: String,
        #[arg(long)]
        voice: Option<String>,
        /// Write the audio here instead of playing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> parley_lib::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=info,parley_lib=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { port, host } => {
            load_dotenv();
            let state = ProxyState::new(ProxyConfig::from_env());
            let app = router(state);

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("backend running on http://{addr}");

            axum::serve(listener, app).await?;
        }

        Command::Chat {
            server,
            voice,
            no_audio,
        } => chat(ProxyClient::new(server), voice, no_audio).await?,

        Command::Ask { prompt, server } => {
            let reply = ProxyClient::new(server).ask(&prompt).await?;
            println!("{reply}");
        }

        Command::Say {
            text,
            server,
            voice,
            out,
        } => {
            let client = ProxyClient::new(server);
            match out {
                Some(path) => {
                    let audio = client.synthesize(&text, voice.as_deref()).await?;
                    tokio::fs::write(&path, &audio).await?;
                    info!("wrote {} bytes to {}", audio.len(), path.display());
                }
                None => {
                    let speaker = Speaker::new(Player::new()?);
                    if let Some(audio) = fetch_speech(&client, &text, voice.as_deref()).await? {
                        speaker.play(audio, &mut std::io::stdout()).await?;
                    }
                }
            }
        }
    }

    Ok(())
}

async fn chat(
    client: ProxyClient,
    voice: Option<String>,
    no_audio: bool,
) -> parley_lib::Result<()> {
    let speaker = if no_audio {
        None
    } else {
        match Player::new() {
            Ok(player) => Some(Speaker::new(player)),
            Err(e) => {
                warn!("audio disabled: {e}");
                None
            }
        }
    };

    let mut session = ChatSession::new(client).with_voice(voice);
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("parley chat: type a message (or \"exit\")");

    loop {
        print!("> ");
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let outcome = session.submit(&line).await;
        match &outcome {
            Outcome::Ignored => continue,
            Outcome::Exited => break,
            Outcome::Replied(reply) => {
                if let Some(user) = session.transcript().messages().iter().rev().nth(1) {
                    // Echo with a timestamp so the scrollback reads as bubbles.
                    print!("\x1b[1A\r\x1b[K");
                    print_bubble(user);
                }
                print_bubble(reply);
            }
        }

        if let Some(speaker) = &speaker {
            let spoken = match session.speak(&outcome).await {
                Ok(Some(audio)) => speaker.play(audio, &mut stdout).await,
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(e) = spoken {
                error!("TTS fetch/playback failed: {e}");
            }
        }
    }

    println!("Exited. Goodbye!");
    Ok(())
}

fn print_bubble(message: &Message) {
    match message.role {
        Role::User => println!("[{}] you ✓  {}", message.timestamp, message.content),
        Role::Assistant => println!("[{}] ai    {}", message.timestamp, message.content),
    }
}
