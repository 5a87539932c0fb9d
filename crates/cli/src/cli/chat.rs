//! `wayfinder chat`: interactive REPL command.
//!
//! Opens a readline-based loop that sends each line to the advisor and
//! streams the response back. Slash-commands cover structured advice,
//! document upload, history and reset.

use std::sync::Arc;

use wf_advisor::{TurnInput, TurnProcessor};
use wf_contextpack::DocumentContext;
use wf_domain::config::Config;
use wf_sessions::SessionState;

use crate::bootstrap;
use crate::cli::render;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run the interactive chat REPL on a fresh session.
pub async fn chat(config: Arc<Config>, model: Option<String>) -> anyhow::Result<()> {
    let processor = bootstrap::build_processor(&config, model)?;
    let mut session = SessionState::new();
    let mut pending_doc: Option<DocumentContext> = None;

    let history_path = dirs::home_dir()
        .unwrap_or_default()
        .join(".wayfinder")
        .join("chat_history.txt");
    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    // Banner on stderr (keep stdout clean for advice).
    eprintln!("Wayfinder career advisor");
    eprintln!("Ask in any language. Type /help for commands, Ctrl+D to exit");
    eprintln!();

    loop {
        let line = match rl.readline("you> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /exit to quit)");
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        };

        let trimmed = line.trim();
        if !trimmed.is_empty() {
            rl.add_history_entry(trimmed).ok();
        }

        match SlashCommand::parse(trimmed) {
            Some(SlashCommand::Exit) => break,
            Some(cmd) => handle_slash_command(cmd, &processor, &mut session, &mut pending_doc).await,
            // Blank lines go through as well, so the advisor's own
            // empty-input notice is shown.
            None => {
                let input = TurnInput::text(trimmed).with_document(pending_doc.take());
                send_message(&processor, &mut session, input).await;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Eq)]
enum SlashCommand {
    Exit,
    Help,
    Reset,
    History,
    Language,
    /// `None` shows the pending document.
    Doc(Option<String>),
    Advise(String),
    Unknown(String),
}

impl SlashCommand {
    /// `None` when the line is not a slash command.
    fn parse(input: &str) -> Option<Self> {
        if !input.starts_with('/') {
            return None;
        }
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (input, ""),
        };
        let arg = (!arg.is_empty()).then(|| arg.to_string());

        Some(match cmd {
            "/exit" | "/quit" => Self::Exit,
            "/help" => Self::Help,
            "/reset" => Self::Reset,
            "/history" => Self::History,
            "/language" => Self::Language,
            "/doc" => Self::Doc(arg),
            "/advise" => Self::Advise(arg.unwrap_or_default()),
            other => Self::Unknown(other.to_string()),
        })
    }
}

async fn handle_slash_command(
    cmd: SlashCommand,
    processor: &TurnProcessor,
    session: &mut SessionState,
    pending_doc: &mut Option<DocumentContext>,
) {
    match cmd {
        SlashCommand::Exit => {}

        SlashCommand::Reset => {
            session.reset();
            *pending_doc = None;
            eprintln!("Conversation history cleared.");
        }

        SlashCommand::History => {
            if session.display_history().is_empty() {
                eprintln!("(no messages yet)");
            }
            for entry in session.display_history() {
                println!("{}", render::history_line(entry));
            }
        }

        SlashCommand::Language => match session.language() {
            Some(lang) => eprintln!("Replies are pinned to {lang}."),
            None => eprintln!("No language pinned yet; replies mirror your language."),
        },

        SlashCommand::Doc(None) => match pending_doc {
            Some(doc) => eprintln!(
                "Attached for the next question: {} ({} chars)",
                doc.source(),
                doc.char_count()
            ),
            None => eprintln!("Usage: /doc <path>  (text files only)"),
        },

        SlashCommand::Doc(Some(path)) => match bootstrap::load_plain_document(&path) {
            Ok(Some(doc)) => {
                eprintln!(
                    "Attached {} ({} chars) to your next question.",
                    doc.source(),
                    doc.char_count()
                );
                *pending_doc = Some(doc);
            }
            Ok(None) => eprintln!("\x1B[33mwarning: no text could be extracted from {path}\x1B[0m"),
            Err(e) => eprintln!("\x1B[31merror: {e:#}\x1B[0m"),
        },

        SlashCommand::Advise(question) => {
            let input = TurnInput::text(question).with_document(pending_doc.take());
            match processor.advise(session, input).await {
                Ok(outcome) => render::print_advice(&outcome.advice),
                Err(e) => render::print_notice(&e),
            }
        }

        SlashCommand::Help => {
            eprintln!("Commands:");
            eprintln!("  /advise <question>  Structured advice (career, skills, courses)");
            eprintln!("  /doc <path>         Attach a text document to the next question");
            eprintln!("  /history            Show the conversation so far");
            eprintln!("  /language           Show the pinned reply language");
            eprintln!("  /reset              Clear the conversation");
            eprintln!("  /exit, /quit        Exit the chat");
            eprintln!("  /help               Show this help");
        }

        SlashCommand::Unknown(other) => {
            eprintln!("Unknown command: {other}  (type /help for a list)");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message sending + event streaming
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn send_message(processor: &TurnProcessor, session: &mut SessionState, input: TurnInput) {
    if !input.text.trim().is_empty() {
        render::begin_response();
    }
    let mut streamed = false;
    let result = processor
        .submit(session, input, |event| render::print_event(&event, &mut streamed))
        .await;

    if let Err(e) = result {
        if !matches!(e, wf_domain::error::AdvisorError::EmptyInput) {
            render::abort_response(streamed);
        }
        render::print_notice(&e);
    }
}
