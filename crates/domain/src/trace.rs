use serde::Serialize;

/// Structured trace events emitted across all Wayfinder crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionCreated {
        session_id: String,
    },
    SessionReset {
        session_id: String,
        turns_cleared: usize,
    },
    LanguageLocked {
        session_id: String,
        language: String,
    },
    LanguageDetectionFailed {
        session_id: String,
        reason: String,
    },
    DocumentAttached {
        source: String,
        raw_chars: usize,
        injected_chars: usize,
        truncated: bool,
    },
    LlmRequest {
        provider: String,
        model: String,
        purpose: String,
        streaming: bool,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    TurnCommitted {
        session_id: String,
        mode: String,
        response_chars: usize,
        transcript_len: usize,
    },
    TurnFailed {
        session_id: String,
        mode: String,
        error: String,
    },
    StructuredFallback {
        session_id: String,
        raw_chars: usize,
        reason: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wf_event");
    }
}
