pub mod chat;
pub mod config;
pub mod render;
pub mod run;

use clap::{Parser, Subcommand};

/// Wayfinder: a multilingual career advisor in your terminal.
#[derive(Debug, Parser)]
#[command(name = "wayfinder", version, about)]
pub struct Cli {
    /// Model override for every request (defaults to `[llm].model`).
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive conversation (default when no subcommand is given).
    Chat,
    /// Ask one question and print the answer.
    Ask {
        /// The career question.
        question: String,
        /// Text document to ground the answer on (résumé, transcript...).
        #[arg(long)]
        doc: Option<String>,
        /// Print the turn events as JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Ask one question and print a structured advice record.
    Advise {
        /// The career question.
        question: String,
        /// Text document to ground the answer on.
        #[arg(long)]
        doc: Option<String>,
        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any issues.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from `WAYFINDER_CONFIG` (or `wayfinder.toml`).
/// Returns the parsed config and the path that was used.
pub fn load_config() -> anyhow::Result<(wf_domain::config::Config, String)> {
    let config_path =
        std::env::var("WAYFINDER_CONFIG").unwrap_or_else(|_| "wayfinder.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

/// Parse `path`, or fall back to defaults when the file does not exist.
pub fn load_config_from(path: &str) -> anyhow::Result<wf_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(wf_domain::config::Config::default());
    }
    let raw =
        std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["wayfinder"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.log_json);
    }

    #[test]
    fn ask_with_document_and_model() {
        let cli = Cli::try_parse_from([
            "wayfinder",
            "ask",
            "Which MBA?",
            "--doc",
            "cv.txt",
            "--model",
            "sutra-v2-large",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("sutra-v2-large"));
        match cli.command {
            Some(Command::Ask { question, doc, json }) => {
                assert_eq!(question, "Which MBA?");
                assert_eq!(doc.as_deref(), Some("cv.txt"));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_subcommands_parse() {
        let cli = Cli::try_parse_from(["wayfinder", "config", "validate"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Config(ConfigCommand::Validate))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config_from("/definitely/not/wayfinder.toml").unwrap();
        assert_eq!(config.document.max_chars, 2000);
    }

    #[test]
    fn file_overrides_are_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[advisor]\nstream = false\n\n[document]\nmax_chars = 500").unwrap();

        let config = load_config_from(file.path().to_str().unwrap()).unwrap();
        assert!(!config.advisor.stream);
        assert_eq!(config.document.max_chars, 500);
        assert_eq!(config.advisor.temperature, 0.7);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[advisor\nstream = ").unwrap();
        let err = load_config_from(file.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("parsing "));
    }
}
