//! State machine for the single active match of an open session.

use thiserror::Error;
use uuid::Uuid;

use crate::state::session::MatchRecord;

/// High-level phases of the match lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MatchPhase {
    /// No active match; teams and participants can be reshuffled freely.
    #[default]
    Idle,
    /// Two teams are being chosen for the next match.
    Setup(MatchSetup),
    /// A match is underway and the countdown is ticking.
    Running(LiveMatch),
    /// A match is underway with the countdown stopped.
    Paused(LiveMatch),
}

/// Team selection buffer while preparing the next match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSetup {
    /// Chosen home team, if any.
    pub home: Option<Uuid>,
    /// Chosen away team, if any.
    pub away: Option<Uuid>,
}

/// An unfinished match together with its countdown clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveMatch {
    /// The match being played.
    pub record: MatchRecord,
    /// Remaining time on the countdown, in seconds.
    pub time_left: u32,
}

/// Which side of the active match a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The team picked first.
    Home,
    /// The team picked second.
    Away,
}

impl LiveMatch {
    /// Apply a signed goal change to one side, clamping the score at zero.
    pub fn adjust_score(&mut self, side: Side, delta: i32) {
        let slot = match side {
            Side::Home => &mut self.record.home_score,
            Side::Away => &mut self.record.away_score,
        };
        *slot = clamp_to_u32(i64::from(*slot).saturating_add(i64::from(delta)));
    }
}

/// Events that drive the match lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// Open the team selection buffer for a new match.
    OpenSetup,
    /// Choose the home team, clearing an identical away pick.
    PickHome(Uuid),
    /// Choose the away team; the home pick cannot be reused.
    PickAway(Uuid),
    /// Abandon the selection buffer and return to idle.
    CancelSetup,
    /// Create the match from the current selection, countdown loaded but stopped.
    KickOff {
        /// Nominal match length in seconds.
        length_secs: u32,
    },
    /// Start the countdown; rejected once the clock has expired.
    StartClock,
    /// Stop the countdown, keeping the remaining time.
    PauseClock,
    /// One elapsed second of a running countdown.
    Tick,
    /// Shift the countdown by a signed number of seconds, clamped at zero.
    AdjustTime(i64),
    /// Force the countdown to zero and stop it.
    ResetClock,
}

/// Error returned when an event cannot be applied in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the engine was in when the event was received.
    pub from: MatchPhase,
    /// The rejected event.
    pub event: MatchEvent,
}

/// State machine owning the phase of a session's single active match.
///
/// Every mutation goes through [`MatchEngine::apply`] so the transition table
/// below is the only place phases change, with one exception:
/// [`MatchEngine::finish`] concludes the active match and hands its record
/// back for archival.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchEngine {
    phase: MatchPhase,
}

impl MatchEngine {
    /// Create an engine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine around a persisted unfinished match, clock stopped
    /// at the full match length.
    pub fn paused(live: LiveMatch) -> Self {
        Self {
            phase: MatchPhase::Paused(live),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> &MatchPhase {
        &self.phase
    }

    /// Whether the countdown is currently ticking.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, MatchPhase::Running(_))
    }

    /// The active match, in either the running or paused phase.
    pub fn live(&self) -> Option<&LiveMatch> {
        match &self.phase {
            MatchPhase::Running(live) | MatchPhase::Paused(live) => Some(live),
            MatchPhase::Idle | MatchPhase::Setup(_) => None,
        }
    }

    /// Mutable access to the active match.
    pub fn live_mut(&mut self) -> Option<&mut LiveMatch> {
        match &mut self.phase {
            MatchPhase::Running(live) | MatchPhase::Paused(live) => Some(live),
            MatchPhase::Idle | MatchPhase::Setup(_) => None,
        }
    }

    /// The selection buffer, while in the setup phase.
    pub fn setup(&self) -> Option<&MatchSetup> {
        match &self.phase {
            MatchPhase::Setup(setup) => Some(setup),
            _ => None,
        }
    }

    /// Apply an event, moving to the next phase on success.
    pub fn apply(&mut self, event: MatchEvent) -> Result<&MatchPhase, InvalidTransition> {
        let next = self.compute_transition(event)?;
        self.phase = next;
        Ok(&self.phase)
    }

    /// Conclude the active match, returning its record for archival and
    /// putting the engine back to idle. Returns `None` when no match is
    /// underway.
    pub fn finish(&mut self) -> Option<MatchRecord> {
        match std::mem::take(&mut self.phase) {
            MatchPhase::Running(live) | MatchPhase::Paused(live) => Some(live.record),
            other => {
                self.phase = other;
                None
            }
        }
    }

    fn compute_transition(&self, event: MatchEvent) -> Result<MatchPhase, InvalidTransition> {
        let next = match (self.phase.clone(), event) {
            (MatchPhase::Idle, MatchEvent::OpenSetup) => MatchPhase::Setup(MatchSetup::default()),
            (MatchPhase::Setup(setup), MatchEvent::PickHome(team)) => MatchPhase::Setup(MatchSetup {
                home: Some(team),
                away: setup.away.filter(|picked| *picked != team),
            }),
            (MatchPhase::Setup(setup), MatchEvent::PickAway(team)) if setup.home != Some(team) => {
                MatchPhase::Setup(MatchSetup {
                    home: setup.home,
                    away: Some(team),
                })
            }
            (MatchPhase::Setup(_), MatchEvent::CancelSetup) => MatchPhase::Idle,
            (
                MatchPhase::Setup(MatchSetup {
                    home: Some(home),
                    away: Some(away),
                }),
                MatchEvent::KickOff { length_secs },
            ) if home != away => MatchPhase::Paused(LiveMatch {
                record: MatchRecord::new(home, away, length_secs),
                time_left: length_secs,
            }),
            (MatchPhase::Paused(live), MatchEvent::StartClock) if live.time_left > 0 => {
                MatchPhase::Running(live)
            }
            (MatchPhase::Running(live), MatchEvent::PauseClock) => MatchPhase::Paused(live),
            (MatchPhase::Running(live), MatchEvent::Tick) => {
                let time_left = live.time_left.saturating_sub(1);
                let live = LiveMatch { time_left, ..live };
                if time_left == 0 {
                    MatchPhase::Paused(live)
                } else {
                    MatchPhase::Running(live)
                }
            }
            (MatchPhase::Running(live), MatchEvent::AdjustTime(delta)) => {
                let time_left = shift_clock(live.time_left, delta);
                let live = LiveMatch { time_left, ..live };
                if time_left == 0 {
                    MatchPhase::Paused(live)
                } else {
                    MatchPhase::Running(live)
                }
            }
            (MatchPhase::Paused(live), MatchEvent::AdjustTime(delta)) => {
                let time_left = shift_clock(live.time_left, delta);
                MatchPhase::Paused(LiveMatch { time_left, ..live })
            }
            (
                MatchPhase::Running(live) | MatchPhase::Paused(live),
                MatchEvent::ResetClock,
            ) => MatchPhase::Paused(LiveMatch { time_left: 0, ..live }),
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }
}

fn shift_clock(current: u32, delta: i64) -> u32 {
    clamp_to_u32(i64::from(current).saturating_add(delta))
}

fn clamp_to_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(engine: &mut MatchEngine, event: MatchEvent) -> MatchPhase {
        engine
            .apply(event.clone())
            .unwrap_or_else(|err| panic!("applying {event:?} failed: {err}"))
            .clone()
    }

    fn engine_in_setup() -> (MatchEngine, Uuid, Uuid) {
        let mut engine = MatchEngine::new();
        let home = Uuid::new_v4();
        let away = Uuid::new_v4();
        apply(&mut engine, MatchEvent::OpenSetup);
        apply(&mut engine, MatchEvent::PickHome(home));
        apply(&mut engine, MatchEvent::PickAway(away));
        (engine, home, away)
    }

    fn kicked_off(length_secs: u32) -> MatchEngine {
        let (mut engine, _, _) = engine_in_setup();
        apply(&mut engine, MatchEvent::KickOff { length_secs });
        engine
    }

    fn time_left(engine: &MatchEngine) -> u32 {
        engine.live().expect("an active match").time_left
    }

    #[test]
    fn initial_phase_is_idle() {
        assert_eq!(*MatchEngine::new().phase(), MatchPhase::Idle);
    }

    #[test]
    fn full_happy_path_through_a_match() {
        let (mut engine, home, away) = engine_in_setup();
        apply(&mut engine, MatchEvent::KickOff { length_secs: 600 });
        apply(&mut engine, MatchEvent::StartClock);
        assert!(engine.is_running());
        apply(&mut engine, MatchEvent::Tick);
        apply(&mut engine, MatchEvent::PauseClock);
        assert_eq!(time_left(&engine), 599);

        let record = engine.finish().expect("a record to archive");
        assert_eq!(record.home_team, home);
        assert_eq!(record.away_team, away);
        assert_eq!((record.home_score, record.away_score), (0, 0));
        assert_eq!(*engine.phase(), MatchPhase::Idle);
    }

    #[test]
    fn kick_off_lands_paused_with_a_full_clock() {
        let engine = kicked_off(600);
        assert!(!engine.is_running());
        assert!(matches!(engine.phase(), MatchPhase::Paused(_)));
        assert_eq!(time_left(&engine), 600);
    }

    #[test]
    fn picking_home_clears_an_identical_away_pick() {
        let mut engine = MatchEngine::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        apply(&mut engine, MatchEvent::OpenSetup);
        apply(&mut engine, MatchEvent::PickHome(first));
        apply(&mut engine, MatchEvent::PickAway(second));
        apply(&mut engine, MatchEvent::PickHome(second));

        let setup = engine.setup().expect("still in setup").clone();
        assert_eq!(setup.home, Some(second));
        assert_eq!(setup.away, None);
    }

    #[test]
    fn away_pick_equal_to_home_is_rejected() {
        let mut engine = MatchEngine::new();
        let team = Uuid::new_v4();
        apply(&mut engine, MatchEvent::OpenSetup);
        apply(&mut engine, MatchEvent::PickHome(team));

        let err = engine.apply(MatchEvent::PickAway(team)).unwrap_err();
        assert_eq!(err.event, MatchEvent::PickAway(team));
    }

    #[test]
    fn kick_off_without_both_teams_is_rejected() {
        let mut engine = MatchEngine::new();
        apply(&mut engine, MatchEvent::OpenSetup);
        apply(&mut engine, MatchEvent::PickHome(Uuid::new_v4()));

        assert!(engine.apply(MatchEvent::KickOff { length_secs: 600 }).is_err());
    }

    #[test]
    fn countdown_reaches_zero_and_stops() {
        let mut engine = kicked_off(3);
        apply(&mut engine, MatchEvent::StartClock);
        apply(&mut engine, MatchEvent::Tick);
        apply(&mut engine, MatchEvent::Tick);
        assert!(engine.is_running());

        let phase = apply(&mut engine, MatchEvent::Tick);
        assert!(matches!(phase, MatchPhase::Paused(_)));
        assert_eq!(time_left(&engine), 0);
        assert!(engine.apply(MatchEvent::Tick).is_err());
    }

    #[test]
    fn starting_an_expired_clock_is_rejected() {
        let mut engine = kicked_off(10);
        apply(&mut engine, MatchEvent::ResetClock);
        assert!(engine.apply(MatchEvent::StartClock).is_err());
    }

    #[test]
    fn adjust_time_clamps_at_zero() {
        let mut engine = kicked_off(30);
        apply(&mut engine, MatchEvent::AdjustTime(-300));
        assert_eq!(time_left(&engine), 0);
    }

    #[test]
    fn adjust_time_to_zero_while_running_pauses() {
        let mut engine = kicked_off(30);
        apply(&mut engine, MatchEvent::StartClock);
        let phase = apply(&mut engine, MatchEvent::AdjustTime(-30));
        assert!(matches!(phase, MatchPhase::Paused(_)));
    }

    #[test]
    fn adjust_time_can_extend_past_the_nominal_length() {
        let mut engine = kicked_off(600);
        apply(&mut engine, MatchEvent::AdjustTime(120));
        assert_eq!(time_left(&engine), 720);
    }

    #[test]
    fn reset_clock_zeroes_the_countdown_and_pauses() {
        let mut engine = kicked_off(600);
        apply(&mut engine, MatchEvent::StartClock);
        let phase = apply(&mut engine, MatchEvent::ResetClock);
        assert!(matches!(phase, MatchPhase::Paused(_)));
        assert_eq!(time_left(&engine), 0);
    }

    #[test]
    fn scores_never_drop_below_zero() {
        let mut engine = kicked_off(600);
        let live = engine.live_mut().expect("an active match");
        live.adjust_score(Side::Home, 2);
        live.adjust_score(Side::Home, -5);
        live.adjust_score(Side::Away, -1);
        assert_eq!(live.record.home_score, 0);
        assert_eq!(live.record.away_score, 0);
    }

    #[test]
    fn finish_without_an_active_match_returns_none() {
        let mut engine = MatchEngine::new();
        assert!(engine.finish().is_none());
        apply(&mut engine, MatchEvent::OpenSetup);
        assert!(engine.finish().is_none());
        assert!(engine.setup().is_some());
    }

    #[test]
    fn invalid_transition_reports_phase_and_event() {
        let mut engine = MatchEngine::new();
        let err = engine.apply(MatchEvent::StartClock).unwrap_err();
        assert_eq!(err.from, MatchPhase::Idle);
        assert_eq!(err.event, MatchEvent::StartClock);
        assert_eq!(*engine.phase(), MatchPhase::Idle);
    }
}
