use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod chat;
mod config;
mod llm;
mod persona;
mod suggest;
mod ui;

use chat::ChatController;
use config::Config;
use llm::GeminiClient;
use ui::chat::ChatPanel;

#[derive(Parser)]
#[command(name = "foliobot")]
#[command(version)]
#[command(about = "Chat with Sohag's portfolio assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the streamed reply
    Ask { prompt: Vec<String> },
    /// Write the default configuration to ~/.foliobot/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    if !config.has_api_key() && !matches!(cli.command, Some(Commands::Init)) {
        eprintln!(
            "warning: no Gemini API key configured; replies will fail. \
             Run `foliobot init` and set gemini_api_key, or export GEMINI_API_KEY."
        );
    }

    match cli.command {
        None => {
            let controller = new_controller(config);
            ChatPanel::new(controller).run()
        }
        Some(Commands::Ask { prompt }) => ask(config, prompt.join(" ")).await,
        Some(Commands::Init) => {
            Config::default().save()?;
            println!(
                "Wrote default configuration to {}",
                Config::foliobot_home()?.join("config.toml").display()
            );
            Ok(())
        }
    }
}

fn new_controller(config: Config) -> ChatController {
    let backend = GeminiClient::new(config.clone());
    ChatController::new(config, Box::new(backend))
}

/// One-shot mode: send a single prompt and stream the reply to stdout.
async fn ask(config: Config, prompt: String) -> Result<()> {
    let mut controller = new_controller(config);
    controller.send(Some(&prompt));
    if !controller.is_busy() {
        anyhow::bail!("Nothing to ask. Try: foliobot ask \"What does Sohag do at Binance?\"");
    }

    let mut stdout = std::io::stdout();
    let mut printed = 0usize;
    loop {
        controller.pump();

        if let Some(reply) = controller.history().last() {
            if reply.text.len() >= printed {
                write!(stdout, "{}", &reply.text[printed..])?;
            } else {
                // The partial reply was replaced by the fallback message
                write!(stdout, "\n{}", reply.text)?;
            }
            printed = reply.text.len();
            stdout.flush()?;
        }

        if !controller.is_busy() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    writeln!(stdout)?;
    Ok(())
}
