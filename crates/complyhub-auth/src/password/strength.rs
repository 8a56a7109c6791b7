//! Advisory password strength estimation.
//!
//! Never consulted by [`PasswordHasher`](super::PasswordHasher); the only
//! hard rule at hashing time is the length policy.

use serde::Serialize;

/// Score below which the CLI and callers should warn.
pub const RECOMMENDED_MIN_SCORE: u8 = 3;

/// Outcome of a strength estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthReport {
    /// zxcvbn score from 0 (trivial) to 4 (very strong).
    pub score: u8,
    /// log10 of the estimated number of guesses.
    pub guesses_log10: f64,
    /// Feedback explaining a low score, if any.
    pub warning: Option<String>,
}

impl StrengthReport {
    /// Whether the score meets [`RECOMMENDED_MIN_SCORE`].
    pub fn is_acceptable(&self) -> bool {
        self.score >= RECOMMENDED_MIN_SCORE
    }
}

/// Estimates password strength, penalising any of `user_inputs` (email,
/// name, organization) that appear in the password.
pub fn estimate_strength(password: &str, user_inputs: &[&str]) -> StrengthReport {
    let estimate = zxcvbn::zxcvbn(password, user_inputs);
    StrengthReport {
        score: estimate.score() as u8,
        guesses_log10: estimate.guesses_log10(),
        warning: estimate
            .feedback()
            .and_then(|feedback| feedback.warning())
            .map(|warning| warning.to_string()),
    }
}
