//! Clock-paced round advancement
//!
//! A [`RoundDriver`] reads its [`Clock`] on every call and forwards the
//! reading to the scheduler, relaying each resulting [`Event`] to the
//! caller. It may be called at any cadence; the scheduler's countdowns
//! decide what happens, not how often the driver runs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Event,
    challenge::ChallengeProvider,
    countdown::Clock,
    participant::{Id, Participant},
    scheduler::{self, Phase, TurnScheduler},
};

/// Where the round stands after a driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Keep ticking
    Running,
    /// The round ended with a single survivor
    Won(Id),
    /// The round ended with no survivors
    ///
    /// Not produced while only the bomb holder can be penalised.
    Draw,
    /// The round was ended from outside before a winner emerged
    Aborted,
}

impl Status {
    /// Whether the round is over
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Bridges an external cadence into scheduler ticks
///
/// A late call replays everything that fell due since the previous one, so
/// the relayed events do not depend on how often the driver runs as long as
/// the thinking delay is non-zero.
#[derive(Debug)]
pub struct RoundDriver<C> {
    clock: C,
    status: Status,
}

impl<C: Clock> RoundDriver<C> {
    /// Creates a driver reading time from `clock`
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            status: Status::Running,
        }
    }

    /// Current reading of the driver's clock
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Status as of the latest call
    pub fn status(&self) -> Status {
        self.status
    }

    /// Starts `scheduler` at the current time, relaying the opening events
    ///
    /// # Errors
    ///
    /// Propagates the scheduler's start preconditions.
    pub fn start<P, F>(
        &mut self,
        scheduler: &mut TurnScheduler<P>,
        roster: Vec<Participant>,
        fuse: Duration,
        relay: F,
    ) -> Result<Status, scheduler::Error>
    where
        P: ChallengeProvider,
        F: FnMut(&Event),
    {
        let events = scheduler.start(roster, fuse, self.clock.now())?;
        Ok(self.relay(scheduler, &events, relay))
    }

    /// Advances `scheduler` to the current time, relaying what happened
    ///
    /// Once the round is over this keeps returning the final status without
    /// touching the scheduler.
    ///
    /// # Errors
    ///
    /// Propagates scheduler errors, which indicate a corrupted roster.
    pub fn tick<P, F>(
        &mut self,
        scheduler: &mut TurnScheduler<P>,
        relay: F,
    ) -> Result<Status, scheduler::Error>
    where
        P: ChallengeProvider,
        F: FnMut(&Event),
    {
        if self.status.is_finished() {
            return Ok(self.status);
        }
        let events = scheduler.tick(self.clock.now())?;
        Ok(self.relay(scheduler, &events, relay))
    }

    fn relay<P, F>(&mut self, scheduler: &TurnScheduler<P>, events: &[Event], mut relay: F) -> Status
    where
        P: ChallengeProvider,
        F: FnMut(&Event),
    {
        for event in events {
            if let Event::RoundWon(winner) = event {
                self.status = winner.map_or(Status::Draw, Status::Won);
            }
            relay(event);
        }
        if !self.status.is_finished() && scheduler.phase() == Phase::Finished {
            self.status = Status::Aborted;
        }
        self.status
    }
}
