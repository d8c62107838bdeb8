//! Round participants
//!
//! A participant is either human, answering through an external input
//! collaborator, or automated, answering through a [`Policy`]. The turn
//! scheduler tells them apart with [`Participant::has_automated_decision`]
//! rather than by inspecting types.

use std::{fmt::Display, str::FromStr};

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use uuid::{Builder, Uuid};

use crate::challenge::{Challenge, ChallengeProvider};

/// A unique identifier for a participant
///
/// Identifiers are drawn from the round's seeded generator, so a replayed
/// round hands out the same identifiers.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Draws a random identifier from `rng`
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self(Builder::from_random_bytes(rng.u128(..).to_le_bytes()).into_uuid())
    }
}

impl Display for Id {
    /// Formats the ID as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an ID from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Skill level of automated participants
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Enum, Serialize, Deserialize,
)]
pub enum Difficulty {
    /// Guesses uniformly among the candidate answers
    Easy,
    /// Right about half the time
    #[default]
    Medium,
    /// Usually right
    Hard,
    /// Almost always right
    Expert,
}

impl Difficulty {
    /// Maps an ordinal (`0` = easiest) to a difficulty
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        (ordinal < Self::LENGTH).then(|| Self::from_usize(ordinal))
    }

    /// Position of this difficulty, `0` being the easiest
    pub fn ordinal(self) -> usize {
        self.into_usize()
    }
}

/// Decision policy of an automated participant
///
/// With probability `accuracy` the policy answers with the challenge's
/// solution; otherwise it picks uniformly among all candidate answers,
/// which may still land on the solution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, garde::Validate)]
pub struct Policy {
    /// Probability of answering with the exact solution
    #[garde(range(min = 0.0, max = 1.0))]
    accuracy: f64,
}

impl Policy {
    /// Creates a policy with the given accuracy
    pub fn new(accuracy: f64) -> Self {
        Self { accuracy }
    }

    /// A policy that always answers correctly
    pub fn flawless() -> Self {
        Self::new(1.0)
    }

    /// Probability of answering with the exact solution
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Picks a response to `challenge`
    ///
    /// Challenges without candidates yield an empty (and therefore
    /// incorrect) response.
    pub fn decide(&self, challenge: &Challenge, rng: &mut fastrand::Rng) -> String {
        let candidates = challenge.candidates();
        if candidates.is_empty() {
            return String::new();
        }
        if rng.f64() < self.accuracy {
            return candidates[0].to_owned();
        }
        candidates[rng.usize(..candidates.len())].to_owned()
    }
}

/// Accuracy for each difficulty when none is configured
pub fn default_policies() -> EnumMap<Difficulty, Policy> {
    enum_map! {
        Difficulty::Easy => Policy::new(0.0),
        Difficulty::Medium => Policy::new(0.5),
        Difficulty::Hard => Policy::new(0.8),
        Difficulty::Expert => Policy::new(0.95),
    }
}

/// How a participant produces responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Kind {
    /// Responses arrive from an external input collaborator
    Human,
    /// Responses come from a decision policy
    Automated(Policy),
}

/// Result of answering a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The response satisfied the challenge
    Correct,
    /// The response was wrong or malformed
    Incorrect,
}

impl Outcome {
    /// Whether this is [`Outcome::Correct`]
    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Errors raised when a participant is used in a way the round forbids
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The participant has no health left
    #[error("participant {0} has been eliminated")]
    Eliminated(Id),
    /// A decision was requested from a human participant
    #[error("participant {0} has no automated decision policy")]
    NoDecisionPolicy(Id),
}

/// Read-only snapshot of a participant for display collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantView {
    /// Identifier of the participant
    pub id: Id,
    /// Display name
    pub name: String,
    /// Whether the participant is automated
    pub automated: bool,
    /// Remaining health
    pub health: u32,
}

/// A contestant in a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    id: Id,
    name: String,
    kind: Kind,
    health: u32,
}

impl Participant {
    /// Creates a participant with full health
    pub fn new(id: Id, name: impl Into<String>, kind: Kind, health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            health,
        }
    }

    /// Creates a human participant
    pub fn human(id: Id, name: impl Into<String>, health: u32) -> Self {
        Self::new(id, name, Kind::Human, health)
    }

    /// Creates an automated participant
    pub fn automated(id: Id, name: impl Into<String>, policy: Policy, health: u32) -> Self {
        Self::new(id, name, Kind::Automated(policy), health)
    }

    /// Identifier of the participant
    pub fn id(&self) -> Id {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How this participant responds
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Remaining health
    pub fn health(&self) -> u32 {
        self.health
    }

    /// Whether any health remains
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Whether responses come from a decision policy
    pub fn has_automated_decision(&self) -> bool {
        matches!(self.kind, Kind::Automated(_))
    }

    /// Removes one unit of health, saturating at zero
    ///
    /// Returns the remaining health.
    pub fn reduce_health(&mut self) -> u32 {
        self.health = self.health.saturating_sub(1);
        self.health
    }

    /// Asks the decision policy for a response
    ///
    /// # Errors
    ///
    /// * `Error::Eliminated` - the participant has no health left
    /// * `Error::NoDecisionPolicy` - the participant is human
    pub fn decide(&self, challenge: &Challenge, rng: &mut fastrand::Rng) -> Result<String, Error> {
        if !self.is_alive() {
            return Err(Error::Eliminated(self.id));
        }
        match self.kind {
            Kind::Automated(policy) => Ok(policy.decide(challenge, rng)),
            Kind::Human => Err(Error::NoDecisionPolicy(self.id)),
        }
    }

    /// Judges `response` against `challenge`, losing health when wrong
    ///
    /// # Errors
    ///
    /// * `Error::Eliminated` - the participant has no health left
    pub fn answer<P: ChallengeProvider + ?Sized>(
        &mut self,
        provider: &P,
        challenge: &Challenge,
        response: &str,
    ) -> Result<Outcome, Error> {
        if !self.is_alive() {
            return Err(Error::Eliminated(self.id));
        }
        if provider.is_correct_answer(challenge, response) {
            Ok(Outcome::Correct)
        } else {
            self.reduce_health();
            Ok(Outcome::Incorrect)
        }
    }

    /// Snapshot for display collaborators
    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            id: self.id,
            name: self.name.clone(),
            automated: self.has_automated_decision(),
            health: self.health,
        }
    }
}
