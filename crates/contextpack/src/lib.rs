//! Document-grounded context for a single user turn.
//!
//! An uploaded document is turned into plain text once (by a
//! [`DocumentExtractor`]), wrapped in a [`DocumentContext`], and consumed by
//! the next turn: its text is truncated and appended below the user's
//! question. It is never stored as a message of its own.

pub mod extractor;
pub mod injection;
pub mod truncation;

pub use extractor::{mime_from_path, DocumentExtractor, PlainTextExtractor};
pub use injection::{compose_user_content, ComposedTurn, DocumentContext, InjectionReport};
pub use truncation::truncate_chars;
