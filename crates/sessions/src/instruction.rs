//! The advisor's system instruction and its language clause.

/// Opening line of the default advisor instruction.
const DEFAULT_PERSONA: &str = "You are a multilingual career advisor.";

/// Guidance that follows the language clause.
const DEFAULT_GUIDANCE: &str = "Provide career advice, suggest useful online courses or \
alternatives, and help with job or study planning. Be conversational and helpful. \
Allow follow-up questions like 'Is that possible without a degree?' or 'Suggest something cheaper'.";

/// Clause used until a language has been locked.
pub const MIRROR_LANGUAGE_CLAUSE: &str = "Always reply in the same language as the user.";

/// The system instruction, split around its language clause so the clause
/// can be swapped without touching the rest of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInstruction {
    pub persona: String,
    pub guidance: String,
}

impl Default for SystemInstruction {
    fn default() -> Self {
        Self {
            persona: DEFAULT_PERSONA.into(),
            guidance: DEFAULT_GUIDANCE.into(),
        }
    }
}

impl SystemInstruction {
    /// Render the full instruction, pinned to `language` when one is locked.
    pub fn render(&self, language: Option<&str>) -> String {
        format!("{} {} {}", self.persona, language_clause(language), self.guidance)
    }
}

/// The sentence telling the model which language to answer in.
pub fn language_clause(language: Option<&str>) -> String {
    match language {
        Some(lang) => format!(
            "Always reply in {lang}, even if later messages mix in other languages."
        ),
        None => MIRROR_LANGUAGE_CLAUSE.to_string(),
    }
}
