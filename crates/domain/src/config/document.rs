use serde::{Deserialize, Serialize};

/// Caps for uploaded document text injected into a user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Maximum number of characters of document text per turn.
    #[serde(default = "d_2000")]
    pub max_chars: usize,
    /// Line placed between the user's question and the document text.
    #[serde(default = "d_marker")]
    pub marker: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_chars: 2_000,
            marker: d_marker(),
        }
    }
}

fn d_2000() -> usize {
    2_000
}
fn d_marker() -> String {
    "--- Uploaded document ---".into()
}
