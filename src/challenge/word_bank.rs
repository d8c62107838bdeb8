//! Challenges drawn from a configured question bank
//!
//! Every entry pairs a prompt with one or more acceptable answers. Decoys
//! for a challenge are the canonical answers of other entries.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{Challenge, ChallengeProvider};
use crate::constants::challenge::{
    DECOY_COUNT, MAX_ANSWER_COUNT, MAX_ANSWER_LENGTH, MAX_BANK_SIZE, MAX_PROMPT_LENGTH,
};

/// A single question in the bank
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Entry {
    /// The question text
    #[garde(length(chars, min = 1, max = MAX_PROMPT_LENGTH))]
    prompt: String,
    /// Acceptable answers, the first being canonical
    #[garde(
        length(min = 1, max = MAX_ANSWER_COUNT),
        inner(length(chars, min = 1, max = MAX_ANSWER_LENGTH))
    )]
    answers: Vec<String>,
}

impl Entry {
    /// Creates an entry from a prompt and its acceptable answers
    pub fn new(prompt: impl Into<String>, answers: Vec<String>) -> Self {
        Self {
            prompt: prompt.into(),
            answers,
        }
    }
}

/// Provider issuing questions from a fixed bank
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WordBank {
    /// The available questions
    #[garde(length(min = 1, max = MAX_BANK_SIZE), dive)]
    entries: Vec<Entry>,
    /// Whether answer matching should be case-sensitive
    #[garde(skip)]
    #[serde(default)]
    case_sensitive: bool,
}

impl WordBank {
    /// Creates a bank from its entries
    pub fn new(entries: Vec<Entry>, case_sensitive: bool) -> Self {
        Self {
            entries,
            case_sensitive,
        }
    }
}

impl ChallengeProvider for WordBank {
    fn issue(&self, rng: &mut fastrand::Rng) -> Challenge {
        if self.entries.is_empty() {
            return Challenge::new("", Vec::new(), Vec::new(), self.case_sensitive);
        }

        let chosen = rng.usize(..self.entries.len());
        let entry = &self.entries[chosen];
        let answers = entry.answers.clone();
        let blank = Challenge::new(
            entry.prompt.clone(),
            answers.clone(),
            Vec::new(),
            self.case_sensitive,
        );

        let mut decoys = self
            .entries
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != chosen)
            .filter_map(|(_, other)| other.answers.first())
            .filter(|answer| !blank.accepts(answer))
            .unique()
            .cloned()
            .collect_vec();
        rng.shuffle(&mut decoys);
        decoys.truncate(DECOY_COUNT);

        Challenge::new(entry.prompt.clone(), answers, decoys, self.case_sensitive)
    }
}
