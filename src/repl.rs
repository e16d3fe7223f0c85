//! The interactive console loop.
//!
//! Each query runs through the agent, the response classifier and the speech bridge.
//! Failures are contained per iteration: one boundary around the agent invocation and
//! one around output processing (parsing and speech). Both print the error with its
//! cause chain and hand control back to the prompt.

use crate::agent::Agent;
use crate::llm::models::LlmMessage;
use crate::response::{classify, ResearchResponse, ResponseKind};
use crate::speech::{SpeechBridge, SpeechOutcome};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const PROMPT: &str = "Hello, I'm SIMPLE3. What can I help you with? (Type 'exit' to quit) ";
pub const GOODBYE: &str = "Goodbye!";
const SEPARATOR_WIDTH: usize = 50;

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingInput,
    Processing,
    Terminated,
}

/// True for the exit sentinel in any letter case
pub fn is_exit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("exit")
}

pub struct InteractiveLoop {
    agent: Arc<dyn Agent>,
    speech: SpeechBridge,
    history: Vec<LlmMessage>,
    history_turns: usize,
    speak_on_parse_failure: bool,
    state: LoopState,
}

impl InteractiveLoop {
    pub fn new(agent: Arc<dyn Agent>, speech: SpeechBridge) -> Self {
        Self {
            agent,
            speech,
            history: Vec::new(),
            history_turns: 0,
            speak_on_parse_failure: false,
            state: LoopState::AwaitingInput,
        }
    }

    /// Keep up to `turns` completed exchanges as conversation history
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Speak the raw text when a JSON-looking answer fails to parse
    pub fn with_speak_on_parse_failure(mut self, enabled: bool) -> Self {
        self.speak_on_parse_failure = enabled;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn history(&self) -> &[LlmMessage] {
        &self.history
    }

    /// Prompt, read and process queries until `exit` or end of input.
    ///
    /// Only console I/O errors end the loop early.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> io::Result<()> {
        loop {
            self.state = LoopState::AwaitingInput;
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                writeln!(out, "{}", GOODBYE)?;
                break;
            }

            let query = line.trim();
            if is_exit(query) {
                writeln!(out, "{}", GOODBYE)?;
                break;
            }
            if query.is_empty() {
                continue;
            }

            self.handle_query(query, &mut out).await?;
        }

        self.state = LoopState::Terminated;
        out.flush()
    }

    /// Run one full iteration for `query`
    pub async fn handle_query<W: Write>(&mut self, query: &str, out: &mut W) -> io::Result<()> {
        self.state = LoopState::Processing;
        info!(query = query, "Processing query");

        writeln!(out, "\n--- Agent Invocation ---")?;
        match self.agent.invoke(query, &self.history).await {
            Ok(raw) => {
                let output = raw.trim();
                if output.is_empty() {
                    writeln!(out, "\n--- LLM returned an empty output. ---")?;
                } else {
                    writeln!(out, "\n--- Raw LLM Output ---")?;
                    writeln!(out, "{}", output)?;

                    if let Err(e) = self.process_output(output, out).await {
                        report_error(out, "JSON parsing or Murf TTS", &e)?;
                    }
                    self.remember(query, output);
                }
            }
            Err(e) => report_error(out, "agent invocation", &anyhow::Error::new(e))?,
        }

        writeln!(out, "\n{}\n", "=".repeat(SEPARATOR_WIDTH))?;
        self.state = LoopState::AwaitingInput;
        Ok(())
    }

    async fn process_output<W: Write>(&self, output: &str, out: &mut W) -> anyhow::Result<()> {
        let (text, conversational) = match classify(output) {
            ResponseKind::CandidateStructured => match ResearchResponse::parse(output) {
                Ok(structured) => {
                    writeln!(out, "\n--- Structured Response (JSON) ---")?;
                    writeln!(out, "{}", structured.to_pretty_json()?)?;
                    (structured.summary, false)
                }
                Err(e) if self.speak_on_parse_failure => {
                    warn!(error = %e, "Structured response did not parse, speaking raw text");
                    writeln!(out, "\n--- Could not parse JSON ({}), using raw text ---", e)?;
                    (output.to_string(), false)
                }
                Err(e) => return Err(e.into()),
            },
            ResponseKind::PlainText => {
                writeln!(out, "\n--- Conversational LLM Response (not JSON) ---")?;
                writeln!(out, "{}", output)?;
                (output.to_string(), true)
            }
        };

        let chars = text.chars().count();
        if conversational {
            writeln!(out, "\n--- Sending conversational text to Murf ({} chars) ---", chars)?;
        } else {
            writeln!(out, "\n--- Sending to Murf ({} chars) ---", chars)?;
        }
        out.flush()?;

        let outcome = self
            .speech
            .speak_with(&text, |_url| {
                if conversational {
                    writeln!(out, "\n--- Playing Murf Audio for conversational response ---")?;
                } else {
                    writeln!(out, "\n--- Playing Murf Audio ---")?;
                }
                out.flush()
            })
            .await?;

        match outcome {
            SpeechOutcome::Played(url) => debug!(url = %url, "Playback finished"),
            SpeechOutcome::NoAudio => writeln!(out, "Murf response did not contain an audio file.")?,
            SpeechOutcome::UnplayableAsset(_) => writeln!(
                out,
                "Murf audio_file attribute is not a valid URL or recognized audio data type."
            )?,
            SpeechOutcome::Skipped => writeln!(out, "Nothing to speak.")?,
        }

        Ok(())
    }

    fn remember(&mut self, query: &str, output: &str) {
        if self.history_turns == 0 {
            return;
        }

        self.history.push(LlmMessage::user(query));
        self.history.push(LlmMessage::assistant(output));

        let max_messages = self.history_turns.saturating_mul(2);
        if self.history.len() > max_messages {
            let excess = self.history.len() - max_messages;
            self.history.drain(..excess);
        }
    }
}

/// Print an iteration failure with its cause chain
fn report_error<W: Write>(out: &mut W, stage: &str, err: &anyhow::Error) -> io::Result<()> {
    error!(stage = stage, error = ?err, "Iteration failed");
    writeln!(out, "\n--- Error during {}: {} ---", stage, err)?;
    writeln!(out, "{:?}", err)
}
