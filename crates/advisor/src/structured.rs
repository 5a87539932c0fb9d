//! Schema-constrained advice and its graceful fallback.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use wf_domain::error::AdvisorError;
use wf_sessions::instruction::language_clause;

/// A fenced code block wrapping the whole payload (```json ... ```).
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\s*```\s*$").expect("valid regex")
});

/// The normalised career-advice record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAdvice {
    pub suggested_career: String,
    pub missing_skills: Vec<String>,
    /// Always in percentage form, e.g. `"80%"`.
    #[serde(deserialize_with = "percentage")]
    pub relevance_score: String,
    pub estimated_time_to_goal: String,
    pub recommended_courses: Vec<String>,
}

impl StructuredAdvice {
    /// Render as key/value lines for display.
    pub fn to_markdown(&self) -> String {
        let list = |items: &[String]| {
            if items.is_empty() {
                "  - (none)".to_string()
            } else {
                items
                    .iter()
                    .map(|i| format!("  - {i}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };
        format!(
            "**Suggested career:** {}\n**Relevance score:** {}\n**Estimated time to goal:** {}\n\
             **Missing skills:**\n{}\n**Recommended courses:**\n{}",
            self.suggested_career,
            self.relevance_score,
            self.estimated_time_to_goal,
            list(&self.missing_skills),
            list(&self.recommended_courses),
        )
    }
}

/// Result of parsing a structured-mode reply. Never an error: a payload that
/// does not fit the schema comes back as [`ParsedAdvice::Raw`].
#[derive(Debug)]
pub enum ParsedAdvice {
    Structured(StructuredAdvice),
    Raw { text: String, error: AdvisorError },
}

impl ParsedAdvice {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Text recorded in the display history for this reply.
    pub fn display_text(&self) -> String {
        match self {
            Self::Structured(advice) => advice.to_markdown(),
            Self::Raw { text, .. } => text.clone(),
        }
    }
}

/// System instruction for the structured mode.
pub fn structured_instruction(language: Option<&str>) -> String {
    format!(
        "You are a multilingual career advisor. {} \
         Respond ONLY with a JSON object that has exactly these keys: \
         \"suggested_career\" (string), \"missing_skills\" (array of strings), \
         \"relevance_score\" (string percentage such as \"75%\"), \
         \"estimated_time_to_goal\" (string), \"recommended_courses\" (array of strings). \
         Write the string values in the reply language. Do not add text outside the JSON object.",
        language_clause(language)
    )
}

/// Parse the raw reply of a structured-mode request.
pub fn parse_structured_advice(raw: &str) -> ParsedAdvice {
    match try_parse(raw) {
        Ok(advice) => ParsedAdvice::Structured(advice),
        Err(reason) => ParsedAdvice::Raw {
            text: raw.to_string(),
            error: AdvisorError::StructuredParse(reason),
        },
    }
}

fn try_parse(raw: &str) -> Result<StructuredAdvice, String> {
    let payload = match CODE_FENCE.captures(raw) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => raw.trim(),
    };

    let advice: StructuredAdvice = serde_json::from_str(payload).map_err(|e| e.to_string())?;

    if advice.suggested_career.trim().is_empty() {
        return Err("suggested_career is empty".into());
    }
    if advice.estimated_time_to_goal.trim().is_empty() {
        return Err("estimated_time_to_goal is empty".into());
    }
    Ok(advice)
}

/// Accept `"80%"`, `"80"`, `80` or `80.5` and normalise to `"80%"` /
/// `"80.5%"`. Values outside 0–100 and non-numeric text are rejected.
fn percentage<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    let value = match Score::deserialize(deserializer)? {
        Score::Number(n) => n,
        Score::Text(s) => s
            .trim()
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("relevance_score {s:?} is not a percentage")))?,
    };

    if !(0.0..=100.0).contains(&value) {
        return Err(serde::de::Error::custom(format!(
            "relevance_score {value} is outside 0-100"
        )));
    }

    if value.fract() == 0.0 {
        Ok(format!("{}%", value as u32))
    } else {
        Ok(format!("{value}%"))
    }
}
