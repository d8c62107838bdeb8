//! Challenges and their providers
//!
//! A [`Challenge`] is issued to the participant holding the bomb; the
//! [`ChallengeProvider`] that issued it decides whether a response is
//! correct. Providers draw randomness only from the generator they are
//! handed, so a seeded round replays identically.

pub mod arithmetic;
pub mod word_bank;

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub use arithmetic::Arithmetic;
pub use word_bank::WordBank;

/// A prompt together with the answers that satisfy it
///
/// The first accepted answer is the canonical solution. Decoys are
/// plausible wrong answers that automated participants may guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    prompt: String,
    answers: Vec<String>,
    decoys: Vec<String>,
    case_sensitive: bool,
}

impl Challenge {
    /// Creates a challenge from its prompt, accepted answers and decoys
    pub fn new(
        prompt: impl Into<String>,
        answers: Vec<String>,
        decoys: Vec<String>,
        case_sensitive: bool,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            answers,
            decoys,
            case_sensitive,
        }
    }

    /// What is being asked
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// All accepted answers
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// The canonical solution, if the challenge has one
    pub fn solution(&self) -> Option<&str> {
        self.answers.first().map(String::as_str)
    }

    /// The solution followed by the decoys
    pub fn candidates(&self) -> Vec<&str> {
        self.solution()
            .into_iter()
            .chain(self.decoys.iter().map(String::as_str))
            .collect_vec()
    }

    /// Whether `response` matches one of the accepted answers
    ///
    /// Empty or whitespace-only responses never match.
    pub fn accepts(&self, response: &str) -> bool {
        let response = clean_answer(response, self.case_sensitive);
        !response.is_empty()
            && self
                .answers
                .iter()
                .any(|answer| clean_answer(answer, self.case_sensitive) == response)
    }
}

/// Normalizes an answer string for comparison
///
/// # Arguments
/// * `answer` - The answer string to clean
/// * `case_sensitive` - Whether to preserve case sensitivity
///
/// # Returns
/// * Cleaned answer string (trimmed and optionally lowercased)
pub fn clean_answer(answer: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        answer.trim().to_string()
    } else {
        answer.trim().to_lowercase()
    }
}

/// Source of challenges and judge of responses
pub trait ChallengeProvider {
    /// Issues a fresh challenge
    fn issue(&self, rng: &mut fastrand::Rng) -> Challenge;

    /// Whether `response` correctly answers `challenge`
    ///
    /// Malformed responses are simply incorrect.
    fn is_correct_answer(&self, challenge: &Challenge, response: &str) -> bool {
        challenge.accepts(response)
    }
}

/// The configurable challenge providers
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub enum Provider {
    /// Arithmetic problems with numeric answers
    Arithmetic(#[garde(dive)] Arithmetic),
    /// Prompts drawn from a fixed bank of questions
    WordBank(#[garde(dive)] WordBank),
}

impl Default for Provider {
    fn default() -> Self {
        Self::Arithmetic(Arithmetic::default())
    }
}

impl ChallengeProvider for Provider {
    fn issue(&self, rng: &mut fastrand::Rng) -> Challenge {
        match self {
            Self::Arithmetic(provider) => provider.issue(rng),
            Self::WordBank(provider) => provider.issue(rng),
        }
    }

    fn is_correct_answer(&self, challenge: &Challenge, response: &str) -> bool {
        match self {
            Self::Arithmetic(provider) => provider.is_correct_answer(challenge, response),
            Self::WordBank(provider) => provider.is_correct_answer(challenge, response),
        }
    }
}
