//! Conversation session state.
//!
//! A session owns the transcript sent to the completion service (system
//! message first, then alternating user/assistant turns), a parallel display
//! history used only for rendering, and the one-shot language lock.

pub mod instruction;
pub mod state;
pub mod transcript;

pub use instruction::SystemInstruction;
pub use state::{validate_user_text, SessionState};
pub use transcript::{DisplayEntry, Speaker};
