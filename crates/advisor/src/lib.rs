//! The conversation engine: one request/response cycle per call.
//!
//! [`TurnProcessor`] validates the user's text, locks the reply language on
//! the first turn ([`LanguageDetector`]), folds in document context, calls
//! the completion service, aggregates streamed fragments and commits the
//! exchange to the [`SessionState`](wf_sessions::SessionState). The
//! structured mode parses the reply into a [`StructuredAdvice`] and falls
//! back to the raw text when the model ignores the schema.

pub mod language;
pub mod structured;
pub mod turn;

pub use language::LanguageDetector;
pub use structured::{parse_structured_advice, ParsedAdvice, StructuredAdvice};
pub use turn::{AdviceOutcome, TurnEvent, TurnInput, TurnOutcome, TurnProcessor};
