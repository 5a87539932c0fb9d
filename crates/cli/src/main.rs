use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wf_cli::cli::{Cli, Command, ConfigCommand};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None | Some(Command::Chat) => {
            init_cli_tracing(cli.log_json);
            let (config, _) = wf_cli::cli::load_config()?;
            wf_cli::cli::chat::chat(Arc::new(config), cli.model).await
        }
        Some(Command::Ask { question, doc, json }) => {
            init_cli_tracing(cli.log_json);
            let (config, _) = wf_cli::cli::load_config()?;
            wf_cli::cli::run::ask(Arc::new(config), question, doc, cli.model, json).await
        }
        Some(Command::Advise { question, doc, json }) => {
            init_cli_tracing(cli.log_json);
            let (config, _) = wf_cli::cli::load_config()?;
            wf_cli::cli::run::advise(Arc::new(config), question, doc, cli.model, json).await
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = wf_cli::cli::load_config()?;
            if !wf_cli::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = wf_cli::cli::load_config()?;
            wf_cli::cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("wayfinder {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize stderr-only tracing.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
/// Trace events (`wf_event`) are logged at `info`; set
/// `RUST_LOG=info` to see them.
fn init_cli_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
