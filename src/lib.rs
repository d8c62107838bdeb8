//! # Tickbomb
//!
//! Core logic for a bomb-passing elimination game. Participants take turns
//! holding a bomb whose fuse burns while they answer a short challenge. A
//! correct answer passes the bomb on; a wrong answer or a burnt-out fuse
//! costs health, and participants out of health leave the round. The last
//! one standing wins.
//!
//! Rounds are configured through [`setup::Setup`], advanced by a
//! [`scheduler::TurnScheduler`] and paced against a clock by a
//! [`driver::RoundDriver`]. Everything that happens is reported as an
//! [`Event`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]
use serde::{Deserialize, Serialize};

use participant::{Id, ParticipantView};

pub mod challenge;
pub mod constants;
pub mod countdown;
pub mod driver;
pub mod names;
pub mod participant;
pub mod scheduler;
pub mod setup;

/// Notifications emitted as a round progresses
///
/// Events are produced in the order the underlying state changes happen,
/// so replaying them reconstructs the round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The round began with this roster, in turn order
    RoundStarted {
        /// Participants at the start of the round
        roster: Vec<ParticipantView>,
    },
    /// A participant received a new challenge
    ChallengeIssued {
        /// The bomb holder
        participant: Id,
        /// Text to show the holder
        prompt: String,
    },
    /// The bomb moved to a new holder
    TurnAdvanced(Id),
    /// The fuse ran out on the holder
    DeadlinePenalty {
        /// The bomb holder
        participant: Id,
        /// Health left after the penalty
        remaining_health: u32,
    },
    /// The holder's response was judged
    AnswerResult {
        /// The bomb holder
        participant: Id,
        /// Whether the response was accepted
        correct: bool,
    },
    /// A participant ran out of health and left the round
    Eliminated(Id),
    /// The round is over; `None` means nobody survived
    RoundWon(Option<Id>),
}

impl Event {
    /// Converts the event to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}
