use serde::Serialize;
use uuid::Uuid;

use crate::{
    dto::{format_clock, format_system_time, team_label},
    state::{
        match_engine::{LiveMatch, MatchPhase},
        session::{MatchRecord, Training},
    },
};

/// Match engine projection of the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreboardView {
    /// Visible phase of the engine.
    pub phase: PhaseView,
    /// Finished matches, most recent first.
    pub history: Vec<MatchView>,
}

/// Visible phase of the match engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PhaseView {
    /// No active match.
    Idle {
        /// Whether enough teams exist to set up a match.
        can_open_setup: bool,
    },
    /// Teams are being chosen for the next match.
    Setup {
        /// Chosen home team.
        home: Option<TeamChoiceView>,
        /// Chosen away team.
        away: Option<TeamChoiceView>,
        /// Committed teams offered for selection.
        choices: Vec<TeamChoiceView>,
        /// Whether both sides are picked.
        can_kick_off: bool,
    },
    /// A match is underway.
    Live {
        /// Home side with its score.
        home: SideView,
        /// Away side with its score.
        away: SideView,
        /// Remaining time, rendered as `m:ss`.
        clock: String,
        /// Remaining time in seconds.
        seconds_left: u32,
        /// Whether the countdown is ticking.
        running: bool,
        /// Whether the countdown has expired.
        full_time: bool,
    },
}

/// Team offered in the selection buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamChoiceView {
    /// Team id.
    pub id: Uuid,
    /// Color label, or a placeholder for deleted teams.
    pub label: String,
}

/// One side of the active match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideView {
    /// Team id.
    pub id: Uuid,
    /// Color label, or a placeholder for deleted teams.
    pub label: String,
    /// Goals scored.
    pub score: u32,
}

/// Finished match row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchView {
    /// Match id.
    pub id: Uuid,
    /// Home side label.
    pub home: String,
    /// Away side label.
    pub away: String,
    /// Goals scored by the home side.
    pub home_score: u32,
    /// Goals scored by the away side.
    pub away_score: u32,
    /// Kick-off instant as an RFC 3339 timestamp.
    pub kicked_off_at: String,
}

fn team_choice(training: &Training, team_id: Uuid) -> TeamChoiceView {
    TeamChoiceView {
        id: team_id,
        label: team_label(training, &team_id),
    }
}

fn side_view(training: &Training, team_id: Uuid, score: u32) -> SideView {
    SideView {
        id: team_id,
        label: team_label(training, &team_id),
        score,
    }
}

fn live_view(training: &Training, live: &LiveMatch, running: bool) -> PhaseView {
    PhaseView::Live {
        home: side_view(training, live.record.home_team, live.record.home_score),
        away: side_view(training, live.record.away_team, live.record.away_score),
        clock: format_clock(live.time_left),
        seconds_left: live.time_left,
        running,
        full_time: live.time_left == 0,
    }
}

fn match_view(training: &Training, record: &MatchRecord) -> MatchView {
    MatchView {
        id: record.id,
        home: team_label(training, &record.home_team),
        away: team_label(training, &record.away_team),
        home_score: record.home_score,
        away_score: record.away_score,
        kicked_off_at: format_system_time(record.kicked_off_at),
    }
}

impl From<&Training> for ScoreboardView {
    fn from(training: &Training) -> Self {
        let phase = match training.engine.phase() {
            MatchPhase::Idle => PhaseView::Idle {
                can_open_setup: training.teams.len() >= 2,
            },
            MatchPhase::Setup(setup) => PhaseView::Setup {
                home: setup.home.map(|id| team_choice(training, id)),
                away: setup.away.map(|id| team_choice(training, id)),
                choices: training
                    .teams
                    .keys()
                    .map(|id| team_choice(training, *id))
                    .collect(),
                can_kick_off: setup.home.is_some() && setup.away.is_some(),
            },
            MatchPhase::Running(live) => live_view(training, live, true),
            MatchPhase::Paused(live) => live_view(training, live, false),
        };

        let history = training
            .history
            .iter()
            .map(|record| match_view(training, record))
            .collect();

        Self { phase, history }
    }
}
