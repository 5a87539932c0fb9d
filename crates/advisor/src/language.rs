//! First-turn language detection.
//!
//! A short, zero-temperature classification call separate from the advice
//! request. Its failure is never fatal: the caller simply keeps the generic
//! "same language as the user" instruction.

use std::sync::Arc;
use std::time::Instant;

use wf_domain::config::AdvisorConfig;
use wf_domain::error::AdvisorError;
use wf_domain::message::Message;
use wf_domain::trace::TraceEvent;
use wf_providers::{ChatRequest, LlmProvider};

const DETECTION_INSTRUCTION: &str = "Identify the language of the user's message. \
Reply with only the English name of that language (for example: English, Tamil, Hindi). \
No punctuation, no explanation.";

/// Longest label accepted from the model.
const MAX_LABEL_CHARS: usize = 32;

pub struct LanguageDetector {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LanguageDetector {
    pub fn new(provider: Arc<dyn LlmProvider>, cfg: &AdvisorConfig) -> Self {
        Self {
            provider,
            model: None,
            temperature: cfg.detection_temperature,
            max_tokens: cfg.detection_max_output_tokens,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Classify `text` and return a short language label such as "Tamil".
    pub async fn detect(&self, text: &str) -> Result<String, AdvisorError> {
        let req = ChatRequest {
            messages: vec![Message::system(DETECTION_INSTRUCTION), Message::user(text)],
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            json_mode: false,
            model: self.model.clone(),
        };

        let started = Instant::now();
        let resp = self
            .provider
            .chat(&req)
            .await
            .map_err(|e| AdvisorError::LanguageDetection(e.to_string()))?;

        TraceEvent::LlmRequest {
            provider: self.provider.provider_id().to_owned(),
            model: resp.model.clone(),
            purpose: "language_detection".into(),
            streaming: false,
            duration_ms: started.elapsed().as_millis() as u64,
            prompt_tokens: resp.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: resp.usage.as_ref().map(|u| u.completion_tokens),
        }
        .emit();

        parse_language_label(&resp.content).ok_or_else(|| {
            AdvisorError::LanguageDetection(format!("unusable label {:?}", resp.content))
        })
    }
}

/// Normalise the model's reply into a language label.
///
/// Accepts replies like `"tamil"`, `Language: Hindi.` or `**English**`.
/// Returns `None` for empty, overlong or sentence-like output.
pub fn parse_language_label(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = match line.split_once(':') {
        Some((prefix, rest)) if prefix.trim().eq_ignore_ascii_case("language") => rest,
        _ => line,
    };
    let label = line.trim_matches(|c: char| !c.is_alphabetic() && c != ')');

    if label.is_empty() || label.chars().count() > MAX_LABEL_CHARS {
        return None;
    }
    if label.split_whitespace().count() > 3 {
        return None;
    }
    if !label
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return None;
    }

    Some(
        label
            .split_whitespace()
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_label() {
        assert_eq!(parse_language_label("English").as_deref(), Some("English"));
    }

    #[test]
    fn decorated_labels_are_cleaned() {
        assert_eq!(parse_language_label("  tamil.\n").as_deref(), Some("Tamil"));
        assert_eq!(parse_language_label("Language: Hindi").as_deref(), Some("Hindi"));
        assert_eq!(parse_language_label("**Bengali**").as_deref(), Some("Bengali"));
        assert_eq!(parse_language_label("\"Marathi\"").as_deref(), Some("Marathi"));
    }

    #[test]
    fn multi_word_labels_are_kept() {
        assert_eq!(
            parse_language_label("brazilian portuguese").as_deref(),
            Some("Brazilian Portuguese")
        );
        assert_eq!(
            parse_language_label("Chinese (Simplified)").as_deref(),
            Some("Chinese (Simplified)")
        );
    }

    #[test]
    fn unusable_output_is_rejected() {
        assert!(parse_language_label("").is_none());
        assert!(parse_language_label("   \n  ").is_none());
        assert!(parse_language_label("42").is_none());
        assert!(parse_language_label("The message appears to be written in Tamil").is_none());
    }
}
