//! Terminal rendering of turn events, advice records and notices.
//!
//! Advice text goes to stdout; everything else goes to stderr.

use std::io::{IsTerminal, Write};

use wf_advisor::{ParsedAdvice, TurnEvent};
use wf_domain::error::AdvisorError;
use wf_sessions::DisplayEntry;

/// Shown after the last fragment while a response is still streaming.
pub const TYPING_CURSOR: char = '▌';

/// Back over the cursor cell, blank it, and return to it.
const ERASE_CURSOR: &str = "\x08 \x08";

/// The cursor is only drawn on an interactive terminal; piped output
/// carries plain text.
fn cursor_enabled() -> bool {
    std::io::stdout().is_terminal()
}

/// Render one turn event. Partials are printed as they arrive, followed by
/// the typing cursor; the final event clears the cursor.
///
/// `streamed` tracks whether any partial was printed for this turn, so a
/// non-streamed final answer is printed whole.
pub fn print_event(event: &TurnEvent, streamed: &mut bool) {
    let cursor = cursor_enabled();
    let frame = match event {
        TurnEvent::Partial { delta, .. } => {
            *streamed = true;
            partial_frame(delta, cursor)
        }
        TurnEvent::Final { content } => final_frame(content, *streamed, cursor),
    };
    let mut out = std::io::stdout();
    out.write_all(frame.as_bytes()).ok();
    out.flush().ok();
}

/// Erase the cursor before the text so a delta that starts a new line
/// does not strand it on the old one.
fn partial_frame(delta: &str, cursor: bool) -> String {
    if cursor {
        format!("{ERASE_CURSOR}{delta}{TYPING_CURSOR}")
    } else {
        delta.to_string()
    }
}

fn final_frame(content: &str, streamed: bool, cursor: bool) -> String {
    let erase = if cursor { ERASE_CURSOR } else { "" };
    if streamed {
        format!("{erase}\n\n")
    } else {
        format!("{erase}{content}\n\n")
    }
}

/// Print the blank cursor cell that the first partial overwrites.
pub fn begin_response() {
    if cursor_enabled() {
        print!(" ");
        std::io::stdout().flush().ok();
    }
}

/// Clear a dangling cursor after an aborted stream.
pub fn abort_response(streamed: bool) {
    let cursor = cursor_enabled();
    let mut frame = String::new();
    if cursor {
        frame.push_str(ERASE_CURSOR);
    }
    if streamed {
        frame.push('\n');
    }
    let mut out = std::io::stdout();
    out.write_all(frame.as_bytes()).ok();
    out.flush().ok();
}

/// Print the user-facing notice for a failed or degraded turn.
pub fn print_notice(err: &AdvisorError) {
    let Some(notice) = err.notice() else {
        return;
    };
    if err.is_hard_failure() {
        eprintln!("\x1B[31merror: {notice}\x1B[0m");
    } else {
        eprintln!("\x1B[33mwarning: {notice}\x1B[0m");
    }
}

/// Print a structured record, or the raw reply with the fallback notice.
pub fn print_advice(advice: &ParsedAdvice) {
    if let ParsedAdvice::Raw { error, .. } = advice {
        print_notice(error);
    }
    println!("{}", advice.display_text());
    println!();
}

/// Format one display-history entry.
pub fn history_line(entry: &DisplayEntry) -> String {
    format!(
        "[{}] {}: {}",
        entry.at.format("%H:%M"),
        entry.speaker.label(),
        entry.text
    )
}
