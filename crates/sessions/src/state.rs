//! The in-memory record of one conversation.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use wf_domain::error::AdvisorError;
use wf_domain::message::{Message, Role};
use wf_domain::trace::TraceEvent;

use crate::instruction::SystemInstruction;
use crate::transcript::{DisplayEntry, Speaker};

/// Reject blank input; returns the whitespace-stripped text otherwise.
pub fn validate_user_text(text: &str) -> Result<&str, AdvisorError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(AdvisorError::EmptyInput)
    } else {
        Ok(trimmed)
    }
}

/// Transcript, display history and language lock for one conversation.
///
/// `transcript[0]` is the system message for the whole lifetime of the
/// value: it is created by [`SessionState::initialize`] and [`reset`]
/// truncates back to it, never past it.
///
/// [`reset`]: SessionState::reset
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Uuid,
    created_at: DateTime<Utc>,
    instruction: SystemInstruction,
    transcript: Vec<Message>,
    display: Vec<DisplayEntry>,
    language: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// A fresh session with the default advisor instruction.
    pub fn new() -> Self {
        Self::with_instruction(SystemInstruction::default())
    }

    pub fn with_instruction(instruction: SystemInstruction) -> Self {
        let mut state = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            instruction,
            transcript: Vec::new(),
            display: Vec::new(),
            language: None,
        };
        state.initialize();
        TraceEvent::SessionCreated {
            session_id: state.id.to_string(),
        }
        .emit();
        state
    }

    /// Create the system message if the transcript does not have one yet.
    /// Calling it again is a no-op.
    pub fn initialize(&mut self) {
        if !self.transcript.is_empty() {
            return;
        }
        self.transcript.push(Message::system(self.instruction.render(None)));
        self.display.clear();
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Append a user message. Blank text is rejected with
    /// [`AdvisorError::EmptyInput`] and leaves the session untouched.
    pub fn append_user_turn(&mut self, text: &str) -> Result<(), AdvisorError> {
        let text = validate_user_text(text)?;
        self.transcript.push(Message::user(text));
        Ok(())
    }

    /// Append the fully aggregated assistant response.
    pub fn append_assistant_turn(&mut self, text: impl Into<String>) {
        self.transcript.push(Message::assistant(text));
    }

    /// Append a rendered line to the display history.
    pub fn record_display(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.display.push(DisplayEntry::new(speaker, text));
    }

    /// Pin the response language. Succeeds once per session lifetime
    /// (until [`reset`](Self::reset)); later calls return `false` and change
    /// nothing.
    pub fn lock_language(&mut self, language: &str) -> bool {
        if self.language.is_some() {
            return false;
        }
        let language = language.trim().to_string();
        self.transcript[0].content = self.instruction.render(Some(&language));
        TraceEvent::LanguageLocked {
            session_id: self.id.to_string(),
            language: language.clone(),
        }
        .emit();
        self.language = Some(language);
        true
    }

    /// Drop every turn, clear the display history and the language lock.
    ///
    /// The system message survives, restored to its generic form so the
    /// next first turn can lock a language again.
    pub fn reset(&mut self) {
        let turns_cleared = self.turn_count();
        self.transcript.truncate(1);
        self.display.clear();
        self.language = None;
        if let Some(system) = self.transcript.first_mut() {
            system.content = self.instruction.render(None);
        }
        TraceEvent::SessionReset {
            session_id: self.id.to_string(),
            turns_cleared,
        }
        .emit();
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn instruction(&self) -> &SystemInstruction {
        &self.instruction
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn display_history(&self) -> &[DisplayEntry] {
        &self.display
    }

    /// The locked language, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn is_language_locked(&self) -> bool {
        self.language.is_some()
    }

    /// True only before the first user turn of an unlocked session.
    pub fn needs_language_detection(&self) -> bool {
        self.transcript.len() == 1 && self.language.is_none()
    }

    /// Number of user messages in the transcript.
    pub fn turn_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|m| m.role == Role::User)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::MIRROR_LANGUAGE_CLAUSE;

    fn one_exchange(state: &mut SessionState, q: &str, a: &str) {
        state.append_user_turn(q).unwrap();
        state.record_display(Speaker::User, q);
        state.append_assistant_turn(a);
        state.record_display(Speaker::Advisor, a);
    }

    #[test]
    fn new_session_has_only_system_message() {
        let state = SessionState::new();
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].role, Role::System);
        assert!(state.transcript()[0].content.contains(MIRROR_LANGUAGE_CLAUSE));
        assert!(state.display_history().is_empty());
        assert!(state.needs_language_detection());
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut state = SessionState::new();
        let before = state.transcript().to_vec();
        state.initialize();
        state.initialize();
        assert_eq!(state.transcript(), before.as_slice());
    }

    #[test]
    fn initialize_keeps_existing_turns() {
        let mut state = SessionState::new();
        one_exchange(&mut state, "q", "a");
        state.initialize();
        assert_eq!(state.transcript().len(), 3);
        assert_eq!(state.display_history().len(), 2);
    }

    #[test]
    fn exchange_grows_both_logs_by_two() {
        let mut state = SessionState::new();
        one_exchange(&mut state, "What can I do with physics?", "Many things.");
        assert_eq!(state.transcript().len(), 3);
        assert_eq!(state.display_history().len(), 2);
        assert_eq!(state.transcript()[1].role, Role::User);
        assert_eq!(state.transcript()[2].role, Role::Assistant);
        assert_eq!(state.display_history()[1].speaker, Speaker::Advisor);
        assert_eq!(state.turn_count(), 1);
    }

    #[test]
    fn blank_input_is_rejected_without_mutation() {
        let mut state = SessionState::new();
        one_exchange(&mut state, "q", "a");
        let err = state.append_user_turn("   ").unwrap_err();
        assert!(matches!(err, AdvisorError::EmptyInput));
        assert_eq!(state.transcript().len(), 3);
        assert_eq!(state.display_history().len(), 2);
    }

    #[test]
    fn user_text_is_stored_trimmed() {
        let mut state = SessionState::new();
        state.append_user_turn("  nursing abroad?\n").unwrap();
        assert_eq!(state.transcript()[1].content, "nursing abroad?");
    }

    #[test]
    fn language_locks_once() {
        let mut state = SessionState::new();
        assert!(state.lock_language("Tamil"));
        assert!(!state.lock_language("English"));
        assert_eq!(state.language(), Some("Tamil"));
        assert!(state.transcript()[0].content.contains("Always reply in Tamil"));
        assert!(!state.needs_language_detection());
    }

    #[test]
    fn reset_truncates_to_system_message() {
        let mut state = SessionState::new();
        state.lock_language("Hindi");
        one_exchange(&mut state, "q1", "a1");
        one_exchange(&mut state, "q2", "a2");

        state.reset();

        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].role, Role::System);
        assert!(state.transcript()[0].content.contains(MIRROR_LANGUAGE_CLAUSE));
        assert!(state.display_history().is_empty());
        assert!(state.language().is_none());
        assert!(state.needs_language_detection());
    }

    #[test]
    fn reset_is_idempotent_and_keeps_session_identity() {
        let mut state = SessionState::new();
        let id = state.id();
        state.reset();
        state.reset();
        assert_eq!(state.id(), id);
        assert_eq!(state.transcript().len(), 1);
    }

    #[test]
    fn system_message_survives_any_sequence() {
        let mut state = SessionState::new();
        for i in 0..5 {
            one_exchange(&mut state, &format!("q{i}"), "a");
            if i % 2 == 1 {
                state.reset();
            }
            assert_eq!(state.transcript()[0].role, Role::System);
        }
    }
}
