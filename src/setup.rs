//! Round configuration
//!
//! A [`Setup`] is the validated input for a round. [`Setup::prepare`]
//! turns it into a ready-to-start [`Round`]: a seeded scheduler plus the
//! roster it should be started with.

use std::time::Duration;

use enum_map::EnumMap;
use garde::Validate;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    challenge::Provider,
    constants::{
        participant::{MAX_HEALTH, MIN_HEALTH},
        round::{MAX_FUSE_MILLIS, MAX_PARTICIPANT_COUNT, MIN_PARTICIPANT_COUNT, THINKING_MARGIN_MILLIS},
    },
    names::{self, NameStyle, Names},
    participant::{Difficulty, Id, Participant, Policy, default_policies},
    scheduler::TurnScheduler,
};

type ValidationResult = garde::Result;

fn validate_fuse(val: &Duration, _ctx: &()) -> ValidationResult {
    if val.is_zero() {
        Err(garde::Error::new("fuse must be longer than zero"))
    } else if val.as_millis() > u128::from(MAX_FUSE_MILLIS) {
        Err(garde::Error::new(format!(
            "fuse is longer than {MAX_FUSE_MILLIS}ms"
        )))
    } else {
        Ok(())
    }
}

fn validate_policies(val: &EnumMap<Difficulty, Policy>, _ctx: &()) -> ValidationResult {
    match val.iter().find(|(_, policy)| policy.validate().is_err()) {
        Some((difficulty, _)) => Err(garde::Error::new(format!(
            "{difficulty:?} accuracy is outside of the bounds [0,1]"
        ))),
        None => Ok(()),
    }
}

/// Errors raised while preparing a round
#[derive(Error, Debug)]
pub enum Error {
    /// A field is outside of its bounds
    #[error(transparent)]
    Invalid(#[from] garde::Report),
    /// The human participant's name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
    /// Automated participants would never answer before the fuse runs out
    #[error("thinking delay must be shorter than the fuse")]
    ThinkingDelay,
}

/// Configuration of a single round
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Setup {
    /// Number of participants, including the human if there is one
    #[garde(range(min = MIN_PARTICIPANT_COUNT, max = MAX_PARTICIPANT_COUNT))]
    pub participant_count: usize,
    /// Starting health of every participant
    #[garde(range(min = MIN_HEALTH, max = MAX_HEALTH))]
    pub health: u32,
    /// Time a holder has to answer before losing health
    #[garde(custom(validate_fuse))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub fuse: Duration,
    /// Minimum time automated participants take to answer
    ///
    /// Defaults to a third of the fuse, less a small margin.
    #[garde(skip)]
    #[serde_as(as = "Option<serde_with::DurationMilliSeconds<u64>>")]
    pub thinking_delay: Option<Duration>,
    /// Skill level of the automated participants
    #[garde(skip)]
    pub difficulty: Difficulty,
    /// Decision policy for each skill level
    #[garde(custom(validate_policies))]
    pub policies: EnumMap<Difficulty, Policy>,
    /// Name of the human participant; `None` makes every participant automated
    #[garde(skip)]
    pub player_name: Option<String>,
    /// Style of names for automated participants
    #[garde(dive)]
    pub bot_names: NameStyle,
    /// Where challenges come from
    #[garde(dive)]
    pub challenge: Provider,
    /// Seed for every random choice in the round; `None` picks one at random
    #[garde(skip)]
    pub seed: Option<u64>,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            participant_count: 4,
            health: 3,
            fuse: Duration::from_secs(10),
            thinking_delay: None,
            difficulty: Difficulty::default(),
            policies: default_policies(),
            player_name: None,
            bot_names: NameStyle::default(),
            challenge: Provider::default(),
            seed: None,
        }
    }
}

/// A prepared round, ready to be started
#[derive(Debug)]
pub struct Round {
    /// Scheduler seeded for this round
    pub scheduler: TurnScheduler<Provider>,
    /// Participants in turn order
    pub roster: Vec<Participant>,
    /// Fuse length to start the scheduler with
    pub fuse: Duration,
    /// Seed the round was built from, for replays
    pub seed: u64,
}

impl Setup {
    /// Thinking delay in effect, explicit or derived from the fuse
    pub fn effective_thinking_delay(&self) -> Duration {
        self.thinking_delay.unwrap_or_else(|| {
            (self.fuse / 3).saturating_sub(Duration::from_millis(THINKING_MARGIN_MILLIS))
        })
    }

    /// Validates the setup and builds the round it describes
    ///
    /// The human participant, if any, takes the first seat.
    ///
    /// # Errors
    ///
    /// * `Error::Invalid` - a field is outside of its bounds
    /// * `Error::Name` - the human participant's name was rejected
    /// * `Error::ThinkingDelay` - the thinking delay is not shorter than the fuse
    pub fn prepare(&self) -> Result<Round, Error> {
        self.validate()?;

        let thinking_delay = self.effective_thinking_delay();
        if thinking_delay >= self.fuse {
            return Err(Error::ThinkingDelay);
        }

        let seed = self.seed.unwrap_or_else(|| fastrand::u64(..));
        let mut rng = fastrand::Rng::with_seed(seed);
        let mut names = Names::default();
        let mut roster = Vec::with_capacity(self.participant_count);

        if let Some(name) = &self.player_name {
            let name = names.claim(name)?;
            roster.push(Participant::human(Id::random(&mut rng), name, self.health));
        }

        let policy = self.policies[self.difficulty];
        for seat in 0..self.participant_count - roster.len() {
            let name = names.automated(seat, self.bot_names);
            roster.push(Participant::automated(
                Id::random(&mut rng),
                name,
                policy,
                self.health,
            ));
        }

        debug!(
            "prepared round with seed {seed}, {} participants, {:?} thinking delay",
            roster.len(),
            thinking_delay
        );

        Ok(Round {
            scheduler: TurnScheduler::new(self.challenge.clone(), rng.fork(), thinking_delay),
            roster,
            fuse: self.fuse,
            seed,
        })
    }
}
