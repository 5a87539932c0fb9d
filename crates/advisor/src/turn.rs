//! One request/response cycle against a [`SessionState`].
//!
//! The pending user message is sent alongside the transcript but committed
//! only together with the assistant reply. A hard failure therefore leaves
//! the session exactly as it was before the call.

use std::sync::Arc;
use std::time::Instant;

use futures_util::StreamExt;
use serde::Serialize;
use tracing::Instrument;
use wf_contextpack::{compose_user_content, DocumentContext, InjectionReport};
use wf_domain::config::{AdvisorConfig, Config, DocumentConfig};
use wf_domain::error::AdvisorError;
use wf_domain::message::Message;
use wf_domain::stream::{StreamEvent, Usage};
use wf_domain::trace::TraceEvent;
use wf_providers::{ChatRequest, LlmProvider};
use wf_sessions::{validate_user_text, SessionState, Speaker};

use crate::language::LanguageDetector;
use crate::structured::{parse_structured_advice, structured_instruction, ParsedAdvice};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inputs, events and outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the user submitted for one turn.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub text: String,
    /// Context for this turn only. Dropped once the turn completes.
    pub document: Option<DocumentContext>,
}

impl TurnInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            document: None,
        }
    }

    pub fn with_document(mut self, document: Option<DocumentContext>) -> Self {
        self.document = document;
        self
    }
}

/// Progress reported to the caller while a turn runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// One non-empty streamed fragment. `accumulated` is the full text so
    /// far and only ever grows within a turn.
    Partial { delta: String, accumulated: String },
    /// The committed response.
    Final { content: String },
}

/// Result of a conversational turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: String,
    /// The reply language was pinned during this turn.
    pub language_locked: bool,
    pub injection: Option<InjectionReport>,
}

/// Result of a structured-advice turn.
#[derive(Debug)]
pub struct AdviceOutcome {
    pub advice: ParsedAdvice,
    pub language_locked: bool,
    pub injection: Option<InjectionReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Conversational,
    Structured,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Conversational => "conversational",
            Self::Structured => "structured",
        }
    }
}

/// A completed remote exchange that has not been committed yet.
struct Exchange {
    user_text: String,
    user_content: String,
    response: String,
    /// Detected on this turn; pinned only when the exchange is committed.
    detected_language: Option<String>,
    injection: Option<InjectionReport>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TurnProcessor
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct TurnProcessor {
    provider: Arc<dyn LlmProvider>,
    detector: LanguageDetector,
    advisor: AdvisorConfig,
    document: DocumentConfig,
    model: Option<String>,
}

impl TurnProcessor {
    pub fn new(provider: Arc<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            detector: LanguageDetector::new(provider.clone(), &config.advisor),
            provider,
            advisor: config.advisor.clone(),
            document: config.document.clone(),
            model: None,
        }
    }

    /// Override the provider's default model for every request.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.detector = self.detector.with_model(model.clone());
        self.model = model;
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    /// The model requests are sent to.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Conversational turn. Streams when `advisor.stream` is set, reporting
    /// each fragment through `on_event`, and always ends with
    /// [`TurnEvent::Final`] on success.
    pub async fn submit<F>(
        &self,
        session: &mut SessionState,
        input: TurnInput,
        mut on_event: F,
    ) -> Result<TurnOutcome, AdvisorError>
    where
        F: FnMut(TurnEvent),
    {
        let mode = Mode::Conversational;
        let span = tracing::info_span!("turn", session_id = %session.id(), mode = mode.as_str());
        let exchange = self
            .exchange(session, &input, mode, &mut on_event)
            .instrument(span)
            .await?;

        let language_locked = self.commit(session, &exchange, mode, exchange.response.clone());
        on_event(TurnEvent::Final {
            content: exchange.response.clone(),
        });

        Ok(TurnOutcome {
            response: exchange.response,
            language_locked,
            injection: exchange.injection,
        })
    }

    /// Structured-advice turn: JSON mode, never streamed.
    ///
    /// A reply that does not fit the advice schema is not an error; it comes
    /// back as [`ParsedAdvice::Raw`] and is committed like any other reply.
    pub async fn advise(
        &self,
        session: &mut SessionState,
        input: TurnInput,
    ) -> Result<AdviceOutcome, AdvisorError> {
        let mode = Mode::Structured;
        let span = tracing::info_span!("turn", session_id = %session.id(), mode = mode.as_str());
        let exchange = self
            .exchange(session, &input, mode, &mut |_: TurnEvent| {})
            .instrument(span)
            .await?;

        let advice = parse_structured_advice(&exchange.response);
        if let ParsedAdvice::Raw { error, .. } = &advice {
            tracing::warn!(error = %error, "structured reply fell back to raw text");
            TraceEvent::StructuredFallback {
                session_id: session.id().to_string(),
                raw_chars: exchange.response.chars().count(),
                reason: error.to_string(),
            }
            .emit();
        }

        let language_locked = self.commit(session, &exchange, mode, advice.display_text());

        Ok(AdviceOutcome {
            advice,
            language_locked,
            injection: exchange.injection,
        })
    }

    // ── Cycle ──────────────────────────────────────────────────────

    async fn exchange<F>(
        &self,
        session: &mut SessionState,
        input: &TurnInput,
        mode: Mode,
        on_event: &mut F,
    ) -> Result<Exchange, AdvisorError>
    where
        F: FnMut(TurnEvent),
    {
        let user_text = validate_user_text(&input.text)?.to_string();

        let detected_language = self.detect_language(session, &user_text).await;

        let composed = compose_user_content(&user_text, input.document.as_ref(), &self.document);
        let user_content = composed.content.trim().to_string();

        let req = self.build_request(session, detected_language.as_deref(), &user_content, mode);
        let response = match mode {
            Mode::Conversational if self.advisor.stream => {
                self.stream_completion(&req, mode, on_event).await
            }
            _ => self.complete(&req, mode).await,
        };

        match response {
            Ok(response) => Ok(Exchange {
                user_text,
                user_content,
                response,
                detected_language,
                injection: composed.injection,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "turn aborted");
                TraceEvent::TurnFailed {
                    session_id: session.id().to_string(),
                    mode: mode.as_str().into(),
                    error: e.to_string(),
                }
                .emit();
                Err(e)
            }
        }
    }

    /// Detect the reply language on the first turn. The session is not
    /// touched here; a failed turn leaves it unlocked so the retry detects
    /// again. Detection failure only costs the lock.
    async fn detect_language(&self, session: &SessionState, text: &str) -> Option<String> {
        if !session.needs_language_detection() {
            return None;
        }
        match self.detector.detect(text).await {
            Ok(language) => Some(language),
            Err(e) => {
                tracing::warn!(error = %e, "language detection failed, mirroring the user");
                TraceEvent::LanguageDetectionFailed {
                    session_id: session.id().to_string(),
                    reason: e.to_string(),
                }
                .emit();
                None
            }
        }
    }

    /// `pending_language` is a language detected on this turn but not yet
    /// pinned in the session; the request already answers in it.
    fn build_request(
        &self,
        session: &SessionState,
        pending_language: Option<&str>,
        user_content: &str,
        mode: Mode,
    ) -> ChatRequest {
        let language = pending_language.or(session.language());
        let mut messages = session.transcript().to_vec();
        messages.push(Message::user(user_content));

        let (temperature, max_tokens) = match mode {
            Mode::Conversational => {
                if let Some(lang) = pending_language {
                    messages[0] = Message::system(session.instruction().render(Some(lang)));
                }
                (self.advisor.temperature, self.advisor.max_output_tokens)
            }
            Mode::Structured => {
                messages[0] = Message::system(structured_instruction(language));
                (
                    self.advisor.structured_temperature,
                    self.advisor.structured_max_output_tokens,
                )
            }
        };

        ChatRequest {
            messages,
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
            json_mode: mode == Mode::Structured,
            model: self.model.clone(),
        }
    }

    async fn complete(&self, req: &ChatRequest, mode: Mode) -> Result<String, AdvisorError> {
        let started = Instant::now();
        let resp = self
            .provider
            .chat(req)
            .await
            .map_err(AdvisorError::transport)?;
        self.trace_request(mode, false, started, resp.usage.as_ref());
        Ok(resp.content)
    }

    /// Pull fragments until the stream finishes. Any failure after the
    /// stream opened discards the partial text.
    async fn stream_completion<F>(
        &self,
        req: &ChatRequest,
        mode: Mode,
        on_event: &mut F,
    ) -> Result<String, AdvisorError>
    where
        F: FnMut(TurnEvent),
    {
        let started = Instant::now();
        let mut stream = self
            .provider
            .chat_stream(req)
            .await
            .map_err(AdvisorError::transport)?;

        let mut accumulated = String::new();
        let mut usage = None;
        while let Some(item) = stream.next().await {
            match item {
                Ok(StreamEvent::Token { text }) => {
                    if text.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&text);
                    on_event(TurnEvent::Partial {
                        delta: text,
                        accumulated: accumulated.clone(),
                    });
                }
                Ok(StreamEvent::Done { usage: u, .. }) => {
                    usage = u;
                    break;
                }
                Ok(StreamEvent::Error { message }) => {
                    return Err(AdvisorError::StreamInterrupted(message));
                }
                Err(e) => return Err(AdvisorError::StreamInterrupted(e.to_string())),
            }
        }

        self.trace_request(mode, true, started, usage.as_ref());

        // A stream that closed cleanly without a single fragment.
        if self.advisor.reject_empty_response && accumulated.trim().is_empty() {
            return Err(AdvisorError::StreamInterrupted(
                "stream carried no text".into(),
            ));
        }
        Ok(accumulated)
    }

    /// Append the exchange and pin a language detected on this turn.
    /// Returns whether the lock was taken.
    fn commit(&self, session: &mut SessionState, exchange: &Exchange, mode: Mode, display: String) -> bool {
        if let Err(e) = session.append_user_turn(&exchange.user_content) {
            // Unreachable: the text was validated before the request.
            tracing::error!(error = %e, "user turn rejected at commit");
            return false;
        }
        let language_locked = exchange
            .detected_language
            .as_deref()
            .is_some_and(|lang| session.lock_language(lang));
        session.record_display(Speaker::User, exchange.user_text.clone());
        session.append_assistant_turn(exchange.response.clone());
        session.record_display(Speaker::Advisor, display);

        tracing::info!(turns = session.turn_count(), "turn committed");
        TraceEvent::TurnCommitted {
            session_id: session.id().to_string(),
            mode: mode.as_str().into(),
            response_chars: exchange.response.chars().count(),
            transcript_len: session.transcript().len(),
        }
        .emit();
        language_locked
    }

    fn trace_request(&self, mode: Mode, streaming: bool, started: Instant, usage: Option<&Usage>) {
        TraceEvent::LlmRequest {
            provider: self.provider.provider_id().to_owned(),
            model: self.model().to_owned(),
            purpose: mode.as_str().into(),
            streaming,
            duration_ms: started.elapsed().as_millis() as u64,
            prompt_tokens: usage.map(|u| u.prompt_tokens),
            completion_tokens: usage.map(|u| u.completion_tokens),
        }
        .emit();
    }
}
