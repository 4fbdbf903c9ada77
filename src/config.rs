//! Configuration types.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Coach configuration.
///
/// Everything the protocol treats as a value rather than behavior: the
/// character caps applied to document excerpts sent to the model, the
/// structural transition thresholds, the command-marker vocabulary, and the
/// salary floor for the eligibility gate.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    /// Max characters of resume text embedded in the diagnosis trigger.
    pub diagnosis_trigger_chars: usize,
    /// Max characters of resume text sent to the role-extraction call.
    pub role_extract_chars: usize,
    /// Max characters of resume text sent to the ATS-scoring call.
    pub ats_excerpt_chars: usize,
    /// Assistant messages required before diagnosis counts as started.
    pub diagnosis_started_after: usize,
    /// Genuine user/assistant exchange pairs required to unlock the menu.
    pub menu_unlock_pairs: usize,
    /// Substrings (matched case-insensitively) that mark a menu command
    /// typed as a chat message.
    pub command_markers: Vec<String>,
    /// Substrings that return the user from execution to the menu.
    pub menu_return_markers: Vec<String>,
    /// Minimum monthly salary for the executive eligibility gate.
    pub min_monthly_salary: Decimal,
    /// Wall-clock bound on a single completion call.
    pub completion_timeout: Duration,
    /// Sampling temperature for conversational replies.
    pub reply_temperature: f32,
    /// Token cap for conversational replies.
    pub reply_max_tokens: u32,
    /// Token cap for the structured extraction/scoring calls.
    pub analysis_max_tokens: u32,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            diagnosis_trigger_chars: 4000,
            role_extract_chars: 2000,
            ats_excerpt_chars: 6000,
            diagnosis_started_after: 1,
            menu_unlock_pairs: 4,
            command_markers: vec![
                "command:".to_string(),
                "/optimize".to_string(),
                "/ats".to_string(),
                "/metrics".to_string(),
            ],
            menu_return_markers: vec!["/menu".to_string()],
            min_monthly_salary: dec!(20000),
            completion_timeout: Duration::from_secs(60),
            reply_temperature: 0.7,
            reply_max_tokens: 2000,
            analysis_max_tokens: 1024,
        }
    }
}
