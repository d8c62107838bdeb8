//! Turn scheduling, deadline penalties and elimination
//!
//! The [`TurnScheduler`] owns the authoritative roster and advances the
//! round one [`TurnScheduler::tick`] at a time. A tick punishes the bomb
//! holder for letting the fuse run out, lets an automated holder answer
//! once it has "thought" long enough, or consumes a pending human response.
//! Every state change is reported as an [`Event`].
//!
//! A tick replays every deadline and thinking gate that fell due since the
//! previous one, in the order they fell due and at the moment they did, so
//! a coarse tick ends in the same state as many fine ones.
//!
//! Time is always supplied by the caller, so the scheduler never blocks and
//! never reads a clock of its own.

use std::time::Duration;

use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Event,
    challenge::{Challenge, ChallengeProvider},
    countdown::Countdown,
    participant::{self, Id, Outcome, Participant, ParticipantView},
};

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Roster may be handed over; nothing is timed yet
    #[default]
    Setup,
    /// Ticks advance the round
    Active,
    /// Terminal; ticks are ignored
    Finished,
}

/// Errors surfaced by the scheduler
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The round was started without participants
    #[error("a round needs at least one participant")]
    EmptyRoster,
    /// The round was started with a zero-length fuse
    #[error("fuse must be longer than zero")]
    NonPositiveFuse,
    /// The round was started twice
    #[error("round has already been started")]
    AlreadyStarted,
    /// A participant was addressed in a way it cannot serve
    #[error(transparent)]
    Participant(#[from] participant::Error),
}

/// Read-only projection of the round for display collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    /// Current lifecycle phase
    pub phase: Phase,
    /// Participant holding the bomb, if the round is active
    pub holder: Option<Id>,
    /// Prompt the holder has to answer
    pub prompt: Option<String>,
    /// Time left before the fuse runs out
    pub fuse_remaining: Duration,
    /// Surviving participants in turn order
    pub participants: Vec<ParticipantView>,
}

/// What the holder does next, and when
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Deadline,
    Decide,
    Respond,
}

/// Round state machine
#[derive(Debug)]
pub struct TurnScheduler<P> {
    provider: P,
    rng: fastrand::Rng,
    roster: Vec<Participant>,
    current: usize,
    phase: Phase,
    fuse: Countdown,
    fuse_length: Duration,
    thinking: Countdown,
    thinking_delay: Duration,
    challenge: Option<Challenge>,
    pending_response: Option<String>,
    now: Duration,
}

impl<P: ChallengeProvider> TurnScheduler<P> {
    /// Creates a scheduler in the [`Phase::Setup`] phase
    ///
    /// # Arguments
    ///
    /// * `provider` - Source of challenges and judge of responses
    /// * `rng` - Generator for challenges and automated decisions
    /// * `thinking_delay` - Minimum time an automated holder waits before answering
    pub fn new(provider: P, rng: fastrand::Rng, thinking_delay: Duration) -> Self {
        Self {
            provider,
            rng,
            roster: Vec::new(),
            current: 0,
            phase: Phase::Setup,
            fuse: Countdown::default(),
            fuse_length: Duration::ZERO,
            thinking: Countdown::default(),
            thinking_delay,
            challenge: None,
            pending_response: None,
            now: Duration::ZERO,
        }
    }

    /// Starts the round with `roster` in turn order
    ///
    /// The first participant receives the bomb and a challenge. A roster of
    /// one is won on the spot.
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyStarted` - the scheduler has left [`Phase::Setup`]
    /// * `Error::EmptyRoster` - `roster` is empty
    /// * `Error::NonPositiveFuse` - `fuse` is zero
    /// * `Error::Participant` - a participant has no health
    pub fn start(
        &mut self,
        roster: Vec<Participant>,
        fuse: Duration,
        now: Duration,
    ) -> Result<Vec<Event>, Error> {
        if self.phase != Phase::Setup {
            return Err(Error::AlreadyStarted);
        }
        if roster.is_empty() {
            return Err(Error::EmptyRoster);
        }
        if fuse.is_zero() {
            return Err(Error::NonPositiveFuse);
        }
        if let Some(eliminated) = roster.iter().find(|participant| !participant.is_alive()) {
            return Err(participant::Error::Eliminated(eliminated.id()).into());
        }

        self.roster = roster;
        self.current = 0;
        self.fuse_length = fuse;
        self.now = now;
        self.phase = Phase::Active;
        self.fuse.start(now);
        self.thinking.start(now);

        info!(
            "round started with {} participants and a {:?} fuse",
            self.roster.len(),
            fuse
        );

        let mut events = vec![Event::RoundStarted {
            roster: self.roster.iter().map(Participant::view).collect_vec(),
        }];

        if !self.check_winner(&mut events) {
            self.issue_challenge(&mut events);
        }

        Ok(events)
    }

    /// Advances the round to `now`
    ///
    /// Does nothing unless the round is [`Phase::Active`]. Readings earlier
    /// than one already seen are treated as that reading.
    ///
    /// Deadlines and thinking gates that passed since the previous tick are
    /// applied in chronological order, each at the moment it passed. When
    /// both fall due at the same moment the deadline wins. A human response
    /// is judged at `now`, after any deadline that passed before it. With a
    /// zero thinking delay automated holders answer at most once per tick.
    ///
    /// # Errors
    ///
    /// Propagates participant precondition violations, which indicate a
    /// corrupted roster.
    pub fn tick(&mut self, now: Duration) -> Result<Vec<Event>, Error> {
        let mut events = Vec::new();
        if self.phase != Phase::Active {
            return Ok(events);
        }
        self.now = self.now.max(now);

        let mut last = None;
        while let Some((at, action)) = self.next_action() {
            if last == Some(at) {
                break;
            }
            last = Some(at);

            match action {
                Action::Deadline => self.apply_deadline_penalty(at, &mut events),
                Action::Decide => {
                    let challenge = self.take_challenge();
                    let response = self.roster[self.current].decide(&challenge, &mut self.rng)?;
                    self.resolve(at, &challenge, &response, &mut events)?;
                }
                Action::Respond => {
                    let response = self.pending_response.take().unwrap_or_default();
                    let challenge = self.take_challenge();
                    self.resolve(at, &challenge, &response, &mut events)?;
                }
            }
        }

        if let Some(holder) = self.current().filter(|holder| holder.has_automated_decision()) {
            trace!("{} is still thinking", holder.name());
        }

        Ok(events)
    }

    /// Records a response from the human holding the bomb
    ///
    /// The response is judged on the next tick. Returns `false`, leaving the
    /// round untouched, when the round is not active or `participant` is not
    /// the human holder. A later submission replaces an unjudged one.
    pub fn submit(&mut self, participant: Id, response: impl Into<String>) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        let holder = &self.roster[self.current];
        if holder.id() != participant || holder.has_automated_decision() {
            return false;
        }
        self.pending_response = Some(response.into());
        true
    }

    /// Ends the round early; subsequent ticks do nothing
    pub fn abort(&mut self) {
        if self.phase != Phase::Finished {
            info!("round aborted");
        }
        self.phase = Phase::Finished;
        self.challenge = None;
        self.pending_response = None;
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Surviving participants in turn order
    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Index of the bomb holder within [`TurnScheduler::roster`]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The bomb holder, if the round is active
    pub fn current(&self) -> Option<&Participant> {
        match self.phase {
            Phase::Active => self.roster.get(self.current),
            Phase::Setup | Phase::Finished => None,
        }
    }

    /// The challenge the holder has to answer
    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Time left on the fuse as of the latest tick
    pub fn fuse_remaining(&self) -> Duration {
        match self.phase {
            Phase::Active => self.fuse.remaining(self.fuse_length, self.now),
            Phase::Setup | Phase::Finished => Duration::ZERO,
        }
    }

    /// Time burnt off the fuse as of the latest tick
    pub fn fuse_elapsed(&self) -> Duration {
        self.fuse.elapsed(self.now)
    }

    /// Read-only projection for display collaborators
    pub fn view(&self) -> RoundView {
        RoundView {
            phase: self.phase,
            holder: self.current().map(Participant::id),
            prompt: self
                .challenge
                .as_ref()
                .map(|challenge| challenge.prompt().to_owned()),
            fuse_remaining: self.fuse_remaining(),
            participants: self.roster.iter().map(Participant::view).collect_vec(),
        }
    }

    /// The earliest action due by the latest tick
    fn next_action(&self) -> Option<(Duration, Action)> {
        if self.phase != Phase::Active {
            return None;
        }
        let deadline = self.fuse.deadline(self.fuse_length)?;
        let holder = &self.roster[self.current];
        let answer = if holder.has_automated_decision() {
            self.thinking
                .deadline(self.thinking_delay)
                .map(|at| (at, Action::Decide))
        } else {
            self.pending_response
                .as_ref()
                .map(|_| (self.now, Action::Respond))
        };

        let next = match answer {
            Some((at, action)) if at < deadline => (at, action),
            _ => (deadline, Action::Deadline),
        };
        (next.0 <= self.now).then_some(next)
    }

    fn take_challenge(&mut self) -> Challenge {
        match self.challenge.take() {
            Some(challenge) => challenge,
            None => self.provider.issue(&mut self.rng),
        }
    }

    fn issue_challenge(&mut self, events: &mut Vec<Event>) {
        let challenge = self.provider.issue(&mut self.rng);
        events.push(Event::ChallengeIssued {
            participant: self.roster[self.current].id(),
            prompt: challenge.prompt().to_owned(),
        });
        self.challenge = Some(challenge);
    }

    fn apply_deadline_penalty(&mut self, at: Duration, events: &mut Vec<Event>) {
        let holder = &mut self.roster[self.current];
        let remaining_health = holder.reduce_health();
        debug!(
            "fuse ran out on {}, {remaining_health} health left",
            holder.name()
        );
        events.push(Event::DeadlinePenalty {
            participant: holder.id(),
            remaining_health,
        });

        self.fuse.reset(at);
        self.challenge = None;
        self.pass_after_penalty(at, events);
    }

    fn resolve(
        &mut self,
        at: Duration,
        challenge: &Challenge,
        response: &str,
        events: &mut Vec<Event>,
    ) -> Result<(), Error> {
        let holder = &mut self.roster[self.current];
        let outcome = holder.answer(&self.provider, challenge, response)?;
        debug!("{} answered {response:?}: {outcome:?}", holder.name());
        events.push(Event::AnswerResult {
            participant: holder.id(),
            correct: outcome.is_correct(),
        });

        self.fuse.reset(at);
        match outcome {
            Outcome::Correct => self.pass_bomb(at, events),
            Outcome::Incorrect => self.pass_after_penalty(at, events),
        }
        Ok(())
    }

    /// Removes the holder if the penalty killed it, otherwise passes the bomb
    fn pass_after_penalty(&mut self, at: Duration, events: &mut Vec<Event>) {
        if self.roster[self.current].is_alive() {
            self.pass_bomb(at, events);
            return;
        }

        let eliminated = self.roster.remove(self.current);
        info!("{} has been eliminated", eliminated.name());
        events.push(Event::Eliminated(eliminated.id()));

        self.current %= self.roster.len().max(1);
        if !self.check_winner(events) {
            self.begin_turn(at, events);
        }
    }

    fn pass_bomb(&mut self, at: Duration, events: &mut Vec<Event>) {
        self.current = (self.current + 1) % self.roster.len().max(1);
        self.begin_turn(at, events);
    }

    fn begin_turn(&mut self, at: Duration, events: &mut Vec<Event>) {
        self.pending_response = None;
        self.thinking.reset(at);

        let holder = &self.roster[self.current];
        debug!("bomb passed to {}", holder.name());
        events.push(Event::TurnAdvanced(holder.id()));
        self.issue_challenge(events);
    }

    /// Finishes the round if at most one participant survives
    fn check_winner(&mut self, events: &mut Vec<Event>) -> bool {
        let winner = match self.roster.as_slice() {
            // Only the holder is ever penalised, one at a time, so a started
            // round always keeps a survivor and this arm is not reached.
            [] => None,
            [survivor] => Some(survivor),
            _ => return false,
        };

        match winner {
            Some(survivor) => info!("{} wins the round", survivor.name()),
            None => info!("round ended in a draw"),
        }
        events.push(Event::RoundWon(winner.map(Participant::id)));

        self.phase = Phase::Finished;
        self.current = 0;
        self.challenge = None;
        self.pending_response = None;
        true
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{challenge::Arithmetic, participant::Policy};
    use proptest::prelude::*;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(42)
    }

    fn bots(count: usize, health: u32, policy: Policy) -> Vec<Participant> {
        let mut rng = fastrand::Rng::with_seed(7);
        (0..count)
            .map(|seat| {
                Participant::automated(
                    Id::random(&mut rng),
                    format!("Bot {}", seat + 1),
                    policy,
                    health,
                )
            })
            .collect()
    }

    fn human(health: u32) -> Participant {
        Participant::human(Id::random(&mut fastrand::Rng::with_seed(13)), "Player", health)
    }

    fn with_human(bot_count: usize, health: u32, policy: Policy) -> Vec<Participant> {
        let mut roster = vec![human(health)];
        roster.extend(bots(bot_count, health, policy));
        roster
    }

    fn scheduler(thinking_delay: Duration) -> TurnScheduler<Arithmetic> {
        TurnScheduler::new(Arithmetic::default(), rng(), thinking_delay)
    }

    fn solution(scheduler: &TurnScheduler<Arithmetic>) -> String {
        scheduler
            .challenge()
            .and_then(Challenge::solution)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_start_rejects_empty_roster() {
        let mut scheduler = scheduler(secs(1.));
        assert_eq!(
            scheduler.start(vec![], secs(5.), Duration::ZERO),
            Err(Error::EmptyRoster)
        );
        assert_eq!(scheduler.phase(), Phase::Setup);
    }

    #[test]
    fn test_start_rejects_zero_fuse() {
        let mut scheduler = scheduler(secs(1.));
        assert_eq!(
            scheduler.start(bots(2, 1, Policy::flawless()), Duration::ZERO, Duration::ZERO),
            Err(Error::NonPositiveFuse)
        );
    }

    #[test]
    fn test_start_rejects_eliminated_participant() {
        let mut roster = bots(2, 1, Policy::flawless());
        roster[1].reduce_health();
        let dead = roster[1].id();
        let mut scheduler = scheduler(secs(1.));
        assert_eq!(
            scheduler.start(roster, secs(5.), Duration::ZERO),
            Err(Error::Participant(participant::Error::Eliminated(dead)))
        );
    }

    #[test]
    fn test_start_twice() {
        let mut scheduler = scheduler(secs(1.));
        scheduler
            .start(bots(2, 1, Policy::flawless()), secs(5.), Duration::ZERO)
            .unwrap();
        assert_eq!(
            scheduler.start(bots(2, 1, Policy::flawless()), secs(5.), Duration::ZERO),
            Err(Error::AlreadyStarted)
        );
    }

    #[test]
    fn test_start_announces_roster_and_first_challenge() {
        let roster = bots(3, 2, Policy::flawless());
        let first = roster[0].id();
        let mut scheduler = scheduler(secs(1.));
        let events = scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert_eq!(scheduler.phase(), Phase::Active);
        assert_eq!(scheduler.current_index(), 0);
        assert!(matches!(&events[0], Event::RoundStarted { roster } if roster.len() == 3));
        assert!(matches!(
            &events[1],
            Event::ChallengeIssued { participant, .. } if *participant == first
        ));
        assert!(scheduler.challenge().is_some());
    }

    #[test]
    fn test_single_participant_wins_immediately() {
        let roster = bots(1, 1, Policy::flawless());
        let only = roster[0].id();
        let mut scheduler = scheduler(secs(1.));
        let events = scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert_eq!(events.last(), Some(&Event::RoundWon(Some(only))));
        assert_eq!(scheduler.phase(), Phase::Finished);
    }

    #[test]
    fn test_tick_before_start_is_noop() {
        let mut scheduler = scheduler(secs(1.));
        assert_eq!(scheduler.tick(secs(100.)), Ok(vec![]));
        assert_eq!(scheduler.phase(), Phase::Setup);
    }

    #[test]
    fn test_correct_answers_rotate_without_damage() {
        let roster = bots(4, 3, Policy::flawless());
        let ids = roster.iter().map(Participant::id).collect_vec();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        let mut holders = vec![scheduler.current_index()];
        for turn in 1..=12 {
            let events = scheduler.tick(secs(f64::from(turn))).unwrap();
            assert!(events.contains(&Event::AnswerResult {
                participant: ids[(turn as usize - 1) % 4],
                correct: true,
            }));
            holders.push(scheduler.current_index());
        }

        assert_eq!(holders, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0]);
        assert_eq!(scheduler.roster().len(), 4);
        assert!(scheduler.roster().iter().all(|p| p.health() == 3));
        assert_eq!(scheduler.phase(), Phase::Active);
    }

    #[test]
    fn test_silent_holder_is_eliminated_at_deadline() {
        let roster = with_human(1, 1, Policy::flawless());
        let human = roster[0].id();
        let survivor = roster[1].id();
        let mut scheduler = scheduler(secs(0.5));
        scheduler.start(roster, secs(1.), Duration::ZERO).unwrap();

        assert_eq!(scheduler.tick(secs(0.5)), Ok(vec![]));
        let events = scheduler.tick(secs(1.)).unwrap();

        assert_eq!(
            events,
            vec![
                Event::DeadlinePenalty {
                    participant: human,
                    remaining_health: 0,
                },
                Event::Eliminated(human),
                Event::RoundWon(Some(survivor)),
            ]
        );
        assert_eq!(scheduler.phase(), Phase::Finished);
        assert_eq!(scheduler.roster().len(), 1);
        assert_eq!(scheduler.tick(secs(10.)), Ok(vec![]));
    }

    #[test]
    fn test_thinking_delay_gates_decisions() {
        let roster = bots(2, 1, Policy::flawless());
        let mut scheduler = scheduler(secs(2.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert_eq!(scheduler.tick(secs(0.)), Ok(vec![]));
        assert_eq!(scheduler.tick(secs(1.)), Ok(vec![]));
        let events = scheduler.tick(secs(2.1)).unwrap();

        assert!(matches!(
            events.first(),
            Some(Event::AnswerResult { correct: true, .. })
        ));
        assert_eq!(scheduler.current_index(), 1);
    }

    #[test]
    fn test_thinking_restarts_for_each_holder() {
        let roster = bots(2, 1, Policy::flawless());
        let mut scheduler = scheduler(secs(2.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert!(!scheduler.tick(secs(2.)).unwrap().is_empty());
        assert_eq!(scheduler.tick(secs(3.)), Ok(vec![]));
        assert!(!scheduler.tick(secs(4.)).unwrap().is_empty());
        assert_eq!(scheduler.current_index(), 0);
    }

    #[test]
    fn test_deadline_takes_precedence_over_thinking() {
        let roster = bots(2, 2, Policy::flawless());
        let first = roster[0].id();
        let second = roster[1].id();
        let mut scheduler = scheduler(secs(1.25));
        scheduler.start(roster, secs(1.), Duration::ZERO).unwrap();

        let events = scheduler.tick(secs(1.5)).unwrap();
        assert_eq!(
            &events[..2],
            &[
                Event::DeadlinePenalty {
                    participant: first,
                    remaining_health: 1,
                },
                Event::TurnAdvanced(second),
            ]
        );
        assert!(!events.iter().any(|e| matches!(e, Event::AnswerResult { .. })));
        assert_eq!(scheduler.current_index(), 1);
        assert_eq!(scheduler.fuse_elapsed(), secs(0.5));
    }

    #[test]
    fn test_coarse_tick_matches_fine_cadence() {
        let fine = {
            let mut scheduler = scheduler(secs(1.));
            scheduler
                .start(bots(2, 1, Policy::flawless()), secs(5.), Duration::ZERO)
                .unwrap();
            let mut history = Vec::new();
            for step in 1..=11 {
                history.extend(scheduler.tick(secs(f64::from(step) * 0.5)).unwrap());
            }
            history
        };

        let mut scheduler = scheduler(secs(1.));
        scheduler
            .start(bots(2, 1, Policy::flawless()), secs(5.), Duration::ZERO)
            .unwrap();
        let coarse = scheduler.tick(secs(5.5)).unwrap();

        assert_eq!(coarse, fine);
        assert_eq!(
            coarse
                .iter()
                .filter(|e| matches!(e, Event::AnswerResult { correct: true, .. }))
                .count(),
            5
        );
        assert!(!coarse.iter().any(|e| matches!(e, Event::DeadlinePenalty { .. })));
        assert_eq!(scheduler.fuse_elapsed(), secs(0.5));
    }

    #[test]
    fn test_missed_deadlines_are_all_applied() {
        let roster = bots(2, 2, Policy::flawless());
        let first = roster[0].id();
        let second = roster[1].id();
        let mut scheduler = scheduler(secs(10.));
        scheduler.start(roster, secs(1.), Duration::ZERO).unwrap();

        let events = scheduler.tick(secs(11.)).unwrap();
        let penalties = events
            .iter()
            .filter_map(|event| match event {
                Event::DeadlinePenalty {
                    participant,
                    remaining_health,
                } => Some((*participant, *remaining_health)),
                _ => None,
            })
            .collect_vec();

        assert_eq!(penalties, vec![(first, 1), (second, 1), (first, 0)]);
        assert_eq!(events.last(), Some(&Event::RoundWon(Some(second))));
        assert_eq!(scheduler.phase(), Phase::Finished);
    }

    #[test]
    fn test_zero_thinking_delay_answers_once_per_tick() {
        let mut scheduler = scheduler(Duration::ZERO);
        scheduler
            .start(bots(3, 1, Policy::flawless()), secs(5.), Duration::ZERO)
            .unwrap();

        let events = scheduler.tick(secs(1.)).unwrap();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, Event::AnswerResult { .. }))
                .count(),
            1
        );
        assert_eq!(scheduler.current_index(), 1);
    }

    #[test]
    fn test_human_correct_answer_passes_bomb() {
        let roster = with_human(2, 2, Policy::flawless());
        let human = roster[0].id();
        let next = roster[1].id();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert_eq!(scheduler.tick(secs(3.)), Ok(vec![]));
        assert!(scheduler.submit(human, solution(&scheduler)));
        let events = scheduler.tick(secs(3.5)).unwrap();

        assert_eq!(
            &events[..2],
            &[
                Event::AnswerResult {
                    participant: human,
                    correct: true,
                },
                Event::TurnAdvanced(next),
            ]
        );
        assert_eq!(scheduler.fuse_elapsed(), Duration::ZERO);
        assert_eq!(scheduler.roster()[0].health(), 2);
    }

    #[test]
    fn test_human_wrong_answer_costs_health_and_passes_bomb() {
        let roster = with_human(2, 2, Policy::flawless());
        let human = roster[0].id();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        assert!(scheduler.submit(human, "not a number"));
        let events = scheduler.tick(secs(1.)).unwrap();

        assert_eq!(
            events[0],
            Event::AnswerResult {
                participant: human,
                correct: false,
            }
        );
        assert_eq!(scheduler.roster()[0].health(), 1);
        assert_eq!(scheduler.current_index(), 1);
    }

    #[test]
    fn test_human_wrong_answer_can_eliminate() {
        let roster = with_human(2, 1, Policy::flawless());
        let human = roster[0].id();
        let next = roster[1].id();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        scheduler.submit(human, "");
        let events = scheduler.tick(secs(1.)).unwrap();

        assert_eq!(events[1], Event::Eliminated(human));
        assert_eq!(events[2], Event::TurnAdvanced(next));
        assert_eq!(scheduler.roster().len(), 2);
        assert_eq!(scheduler.current_index(), 0);
    }

    #[test]
    fn test_submit_rejects_out_of_turn_responses() {
        let roster = with_human(1, 1, Policy::flawless());
        let bot = roster[1].id();
        let human = roster[0].id();
        let mut scheduler = scheduler(secs(1.));

        assert!(!scheduler.submit(human, "1"));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();
        assert!(!scheduler.submit(bot, "1"));
        assert!(scheduler.submit(human, "1"));
    }

    #[test]
    fn test_pending_response_is_discarded_on_deadline() {
        let roster = with_human(2, 2, Policy::flawless());
        let human = roster[0].id();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(1.), Duration::ZERO).unwrap();

        scheduler.submit(human, solution(&scheduler));
        let events = scheduler.tick(secs(1.)).unwrap();

        assert!(matches!(events[0], Event::DeadlinePenalty { .. }));
        assert!(!events.iter().any(|e| matches!(e, Event::AnswerResult { .. })));
        assert_eq!(scheduler.roster()[0].health(), 1);
    }

    #[test]
    fn test_removal_passes_bomb_to_successor() {
        let mut roster = bots(2, 1, Policy::flawless());
        roster.insert(1, human(1));
        let ids = roster.iter().map(Participant::id).collect_vec();
        let mut scheduler = scheduler(secs(0.5));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        scheduler.tick(secs(0.5)).unwrap();
        assert_eq!(scheduler.current().map(Participant::id), Some(ids[1]));

        let events = scheduler.tick(secs(5.5)).unwrap();
        assert!(events.contains(&Event::Eliminated(ids[1])));
        assert!(events.contains(&Event::TurnAdvanced(ids[2])));
        assert_eq!(scheduler.current_index(), 1);
    }

    #[test]
    fn test_removal_of_last_seat_wraps() {
        let mut roster = bots(2, 1, Policy::flawless());
        roster.push(human(1));
        let ids = roster.iter().map(Participant::id).collect_vec();
        let mut scheduler = scheduler(secs(0.5));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();

        scheduler.tick(secs(0.5)).unwrap();
        scheduler.tick(secs(1.)).unwrap();
        assert_eq!(scheduler.current_index(), 2);

        let events = scheduler.tick(secs(6.)).unwrap();
        assert!(events.contains(&Event::Eliminated(ids[2])));
        assert_eq!(scheduler.current().map(Participant::id), Some(ids[0]));
    }

    #[test]
    fn test_abort_makes_ticks_noops() {
        let mut scheduler = scheduler(secs(1.));
        scheduler
            .start(bots(3, 1, Policy::flawless()), secs(5.), Duration::ZERO)
            .unwrap();
        scheduler.abort();

        assert_eq!(scheduler.phase(), Phase::Finished);
        assert_eq!(scheduler.tick(secs(100.)), Ok(vec![]));
        assert_eq!(scheduler.roster().len(), 3);
    }

    #[test]
    fn test_clock_running_backwards_is_clamped() {
        let mut scheduler = scheduler(secs(10.));
        scheduler
            .start(bots(2, 2, Policy::flawless()), secs(5.), Duration::ZERO)
            .unwrap();

        scheduler.tick(secs(4.)).unwrap();
        scheduler.tick(secs(1.)).unwrap();
        assert_eq!(scheduler.fuse_remaining(), secs(1.));
    }

    #[test]
    fn test_view_projection() {
        let roster = with_human(1, 2, Policy::flawless());
        let human = roster[0].id();
        let mut scheduler = scheduler(secs(1.));
        scheduler.start(roster, secs(5.), Duration::ZERO).unwrap();
        scheduler.tick(secs(2.)).unwrap();

        let view = scheduler.view();
        assert_eq!(view.phase, Phase::Active);
        assert_eq!(view.holder, Some(human));
        assert_eq!(
            view.prompt.as_deref(),
            scheduler.challenge().map(Challenge::prompt)
        );
        assert_eq!(view.fuse_remaining, secs(3.));
        assert_eq!(view.participants.len(), 2);
        assert!(!view.participants[0].automated);
    }

    #[test]
    fn test_seeded_rounds_replay_identically() {
        let run = || {
            let mut scheduler = scheduler(secs(0.5));
            let mut history = scheduler
                .start(bots(4, 2, Policy::new(0.5)), secs(3.), Duration::ZERO)
                .unwrap();
            for step in 1..200 {
                history.extend(scheduler.tick(secs(f64::from(step) * 0.25)).unwrap());
            }
            history
        };

        assert_eq!(run(), run());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Wait(u64),
        HumanAnswers(bool),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u64..3_000).prop_map(Step::Wait),
            any::<bool>().prop_map(Step::HumanAnswers),
        ]
    }

    proptest! {
        #[test]
        fn test_round_invariants_hold(
            bot_count in 1usize..6,
            health in 1u32..4,
            accuracy in 0.0f64..=1.0,
            steps in prop::collection::vec(step(), 1..300),
        ) {
            let roster = with_human(bot_count, health, Policy::new(accuracy));
            let mut scheduler = scheduler(Duration::from_millis(400));
            scheduler.start(roster, Duration::from_secs(2), Duration::ZERO).unwrap();

            let mut now = Duration::ZERO;
            let mut size = scheduler.roster().len();
            let mut healths: Vec<(Id, u32)> =
                scheduler.roster().iter().map(|p| (p.id(), p.health())).collect();

            for step in steps {
                match step {
                    Step::Wait(millis) => now += Duration::from_millis(millis),
                    Step::HumanAnswers(correct) => {
                        if let Some(holder) = scheduler.current().map(Participant::id) {
                            let response = if correct { solution(&scheduler) } else { String::new() };
                            scheduler.submit(holder, response);
                        }
                    }
                }

                let was_finished = scheduler.phase() == Phase::Finished;
                let events = scheduler.tick(now).unwrap();
                if was_finished {
                    prop_assert!(events.is_empty());
                }

                prop_assert!(scheduler.roster().len() <= size);
                size = scheduler.roster().len();
                prop_assert!(scheduler.roster().iter().all(Participant::is_alive));

                if scheduler.phase() == Phase::Active {
                    prop_assert!(scheduler.current_index() < size);
                    prop_assert!(size >= 2);
                } else {
                    prop_assert!(size <= 1);
                }

                let penalized = events
                    .iter()
                    .filter_map(|event| match event {
                        Event::DeadlinePenalty { participant, .. } => Some(*participant),
                        Event::AnswerResult { participant, correct: false } => Some(*participant),
                        _ => None,
                    })
                    .collect_vec();
                for (id, before) in &mut healths {
                    let expected = *before - penalized.iter().filter(|p| *p == id).count() as u32;
                    if let Some(participant) = scheduler.roster().iter().find(|p| p.id() == *id) {
                        prop_assert_eq!(participant.health(), expected);
                    } else {
                        prop_assert_eq!(expected, 0);
                    }
                    *before = expected;
                }
            }
        }
    }
}
