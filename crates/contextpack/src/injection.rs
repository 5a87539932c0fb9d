use serde::Serialize;
use wf_domain::config::DocumentConfig;
use wf_domain::trace::TraceEvent;

use crate::truncation::truncate_chars;

/// Plain text extracted from one uploaded artifact.
///
/// Scoped to the session UI, not the transcript: it is handed to exactly
/// one turn and dropped afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContext {
    source: String,
    text: String,
}

impl DocumentContext {
    /// Wrap extracted text. Blank text yields `None`: there is nothing to
    /// ground the answer on.
    pub fn from_extracted(source: impl Into<String>, text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            source: source.into(),
            text,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// What was injected into the turn, for logs and the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub raw_chars: usize,
    pub injected_chars: usize,
    pub truncated: bool,
}

/// Outbound user content plus an optional injection report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedTurn {
    pub content: String,
    pub injection: Option<InjectionReport>,
}

/// Build the user-turn content sent to the model.
///
/// Without a document the user's text goes out unchanged. With one, the
/// layout is `<user text>\n\n<marker>\n<document text>`, where only the
/// document text is truncated to `cfg.max_chars`; the question is always
/// sent whole.
pub fn compose_user_content(
    user_text: &str,
    document: Option<&DocumentContext>,
    cfg: &DocumentConfig,
) -> ComposedTurn {
    let Some(doc) = document else {
        return ComposedTurn {
            content: user_text.to_string(),
            injection: None,
        };
    };

    let (kept, truncated) = truncate_chars(&doc.text, cfg.max_chars);
    let report = InjectionReport {
        raw_chars: doc.char_count(),
        injected_chars: kept.chars().count(),
        truncated,
    };

    TraceEvent::DocumentAttached {
        source: doc.source.clone(),
        raw_chars: report.raw_chars,
        injected_chars: report.injected_chars,
        truncated,
    }
    .emit();

    ComposedTurn {
        content: format!("{user_text}\n\n{}\n{kept}", cfg.marker),
        injection: Some(report),
    }
}
