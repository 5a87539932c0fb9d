//! `wayfinder ask` / `wayfinder advise`: one-shot commands.
//!
//! Each runs a single turn on a fresh session, prints the answer and exits.
//! Useful for scripting and piping.

use std::sync::Arc;

use serde_json::json;
use wf_advisor::{ParsedAdvice, TurnEvent, TurnInput};
use wf_domain::config::Config;
use wf_sessions::SessionState;

use crate::bootstrap;
use crate::cli::render;

/// Answer one conversational question.
pub async fn ask(
    config: Arc<Config>,
    question: String,
    doc: Option<String>,
    model: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let processor = bootstrap::build_processor(&config, model)?;
    let input = TurnInput::text(question).with_document(attach(doc.as_deref())?);
    let mut session = SessionState::new();

    let mut collected: Vec<TurnEvent> = Vec::new();
    let mut streamed = false;
    if !json_output {
        render::begin_response();
    }

    let result = processor
        .submit(&mut session, input, |event| {
            if json_output {
                collected.push(event);
            } else {
                render::print_event(&event, &mut streamed);
            }
        })
        .await;

    match result {
        Ok(_) if json_output => {
            let out = serde_json::to_string_pretty(&collected)
                .map_err(|e| anyhow::anyhow!("serializing events: {e}"))?;
            println!("{out}");
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => {
            if !json_output {
                render::abort_response(streamed);
            }
            render::print_notice(&e);
            tracing::debug!(error = %e, "ask failed");
            std::process::exit(1);
        }
    }
}

/// Produce a structured advice record for one question.
pub async fn advise(
    config: Arc<Config>,
    question: String,
    doc: Option<String>,
    model: Option<String>,
    json_output: bool,
) -> anyhow::Result<()> {
    let processor = bootstrap::build_processor(&config, model)?;
    let input = TurnInput::text(question).with_document(attach(doc.as_deref())?);
    let mut session = SessionState::new();

    let outcome = match processor.advise(&mut session, input).await {
        Ok(outcome) => outcome,
        Err(e) => {
            render::print_notice(&e);
            tracing::debug!(error = %e, "advise failed");
            std::process::exit(1);
        }
    };

    if !json_output {
        render::print_advice(&outcome.advice);
        return Ok(());
    }

    let value = match &outcome.advice {
        ParsedAdvice::Structured(advice) => json!({ "advice": advice }),
        ParsedAdvice::Raw { text, error } => json!({
            "raw": text,
            "notice": error.notice(),
        }),
    };
    let out = serde_json::to_string_pretty(&value)
        .map_err(|e| anyhow::anyhow!("serializing advice: {e}"))?;
    println!("{out}");
    Ok(())
}

fn attach(path: Option<&str>) -> anyhow::Result<Option<wf_contextpack::DocumentContext>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let doc = bootstrap::load_plain_document(path)?;
    if doc.is_none() {
        eprintln!("warning: no text could be extracted from {path}; asking without it");
    }
    Ok(doc)
}
