use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generation parameters per request kind
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Stream conversational answers fragment by fragment.
    #[serde(default = "d_true")]
    pub stream: bool,
    #[serde(default = "d_07")]
    pub temperature: f32,
    #[serde(default = "d_700")]
    pub max_output_tokens: u32,
    #[serde(default = "d_03")]
    pub structured_temperature: f32,
    #[serde(default = "d_600")]
    pub structured_max_output_tokens: u32,
    #[serde(default)]
    pub detection_temperature: f32,
    #[serde(default = "d_10")]
    pub detection_max_output_tokens: u32,
    /// Treat a completion with no text at all as an interrupted stream
    /// instead of committing an empty assistant turn.
    #[serde(default = "d_true")]
    pub reject_empty_response: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            stream: true,
            temperature: 0.7,
            max_output_tokens: 700,
            structured_temperature: 0.3,
            structured_max_output_tokens: 600,
            detection_temperature: 0.0,
            detection_max_output_tokens: 10,
            reject_empty_response: true,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_true() -> bool {
    true
}
fn d_07() -> f32 {
    0.7
}
fn d_03() -> f32 {
    0.3
}
fn d_700() -> u32 {
    700
}
fn d_600() -> u32 {
    600
}
fn d_10() -> u32 {
    10
}
