use anyhow::Context;
use simple3::agent::{AgentExecutor, PromptTemplate};
use simple3::config::{Credentials, EnvSecrets, FileSecrets, SecretStore, Settings};
use simple3::llm::gateways::{OpenAIConfig, OpenAIGateway};
use simple3::llm::tools::default_tools;
use simple3::repl::InteractiveLoop;
use simple3::response::ResearchResponse;
use simple3::speech::{AudioPlayer, CommandPlayer, MurfClient, NullPlayer, SpeechBridge};
use std::io;
use std::sync::Arc;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG may come from .env
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = Settings::from_env().context("Failed to read settings")?;

    let file_secrets = match &settings.secrets_file {
        Some(path) => Some(
            FileSecrets::load(path)
                .with_context(|| format!("Failed to load secrets from {}", path.display()))?,
        ),
        None => None,
    };
    let env_secrets = EnvSecrets;
    let mut stores: Vec<&dyn SecretStore> = Vec::new();
    if let Some(file_secrets) = &file_secrets {
        stores.push(file_secrets);
    }
    stores.push(&env_secrets);

    let credentials = Credentials::resolve(&stores)?;
    info!(model = %settings.model, base_url = %settings.llm_base_url, "Starting SIMPLE3");

    let gateway = OpenAIGateway::with_config(OpenAIConfig {
        api_key: credentials.google_api_key.clone(),
        base_url: settings.llm_base_url.clone(),
        timeout: settings.http_timeout,
    })?;

    let prompt = PromptTemplate::default()
        .partial("format_instructions", ResearchResponse::format_instructions()?);
    let agent = AgentExecutor::new(
        settings.model.clone(),
        Arc::new(gateway),
        prompt,
        default_tools(settings.save_dir.clone()),
    )
    .with_max_iterations(settings.max_iterations);

    let murf = MurfClient::new(credentials.murf_api_key.clone(), settings.http_timeout)?;
    let player: Arc<dyn AudioPlayer> = match settings
        .player_command
        .as_deref()
        .and_then(CommandPlayer::from_command_line)
    {
        Some(player) => Arc::new(player),
        None => Arc::new(NullPlayer),
    };
    let speech = SpeechBridge::new(Arc::new(murf), player, settings.voice.clone());

    let mut repl = InteractiveLoop::new(Arc::new(agent), speech)
        .with_history_turns(settings.history_turns)
        .with_speak_on_parse_failure(settings.speak_on_parse_failure);

    repl.run(io::stdin().lock(), io::stdout()).await?;

    Ok(())
}
