//! Audio playback for synthesized speech.

use crate::error::{Result, Simple3Error};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Default external player: streams the URL without a window and exits at the end
pub const DEFAULT_PLAYER_COMMAND: &str = "ffplay -nodisp -autoexit -loglevel quiet";

/// Plays an audio resource located at a URL
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, url: &str) -> Result<()>;
}

/// Plays audio by running an external program with the URL as its last argument.
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace separated command line such as `mpv --no-video`
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::new(
            "ffplay",
            ["-nodisp", "-autoexit", "-loglevel", "quiet"].iter().map(|s| s.to_string()).collect(),
        )
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, url: &str) -> Result<()> {
        debug!(program = %self.program, args = ?self.args, "Starting audio player");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                Simple3Error::PlaybackError(format!("failed to start {}: {}", self.program, e))
            })?;

        if !status.success() {
            return Err(Simple3Error::PlaybackError(format!(
                "{} exited with {}",
                self.program, status
            )));
        }

        Ok(())
    }
}

/// Player used when playback is disabled; only logs the URL
#[derive(Debug, Clone, Default)]
pub struct NullPlayer;

#[async_trait]
impl AudioPlayer for NullPlayer {
    async fn play(&self, url: &str) -> Result<()> {
        info!(url = url, "Playback disabled");
        Ok(())
    }
}
