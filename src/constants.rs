//! Configuration constants for the round engine
//!
//! This module contains the limits used when validating a round setup,
//! grouped by the component they constrain.

/// Round-level limits
pub mod round {
    /// Minimum number of participants in a round
    pub const MIN_PARTICIPANT_COUNT: usize = 1;
    /// Maximum number of participants in a round
    pub const MAX_PARTICIPANT_COUNT: usize = 12;
    /// Maximum fuse length in milliseconds
    pub const MAX_FUSE_MILLIS: u64 = 120_000;
    /// Time shaved off a third of the fuse to derive the default thinking delay
    pub const THINKING_MARGIN_MILLIS: u64 = 100;
}

/// Participant limits
pub mod participant {
    /// Minimum starting health
    pub const MIN_HEALTH: u32 = 1;
    /// Maximum starting health
    pub const MAX_HEALTH: u32 = 10;
    /// Maximum length of a display name in bytes
    pub const MAX_NAME_LENGTH: usize = 30;
    /// Attempts at generating a unique automated name before falling back to numbering
    pub const NAME_ATTEMPTS: usize = 16;
}

/// Challenge limits
pub mod challenge {
    /// Largest operand an arithmetic challenge may use
    pub const MAX_OPERAND: i64 = 1_000;
    /// Number of wrong candidates offered next to the solution
    pub const DECOY_COUNT: usize = 4;
    /// Maximum number of entries in a word bank
    pub const MAX_BANK_SIZE: usize = 500;
    /// Maximum number of accepted answers per word bank entry
    pub const MAX_ANSWER_COUNT: usize = 16;
    /// Maximum length of a prompt in characters
    pub const MAX_PROMPT_LENGTH: usize = 200;
    /// Maximum length of an answer in characters
    pub const MAX_ANSWER_LENGTH: usize = 100;
}
