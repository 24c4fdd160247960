//! Runtime model of an open training session.

use std::{fmt, str::FromStr, time::SystemTime};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use thiserror::Error;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{MatchEntity, ParticipantEntity, TeamEntity, TrainingEntity},
    state::match_engine::{LiveMatch, MatchEngine},
};

/// Wire format for session dates.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` session date.
pub(crate) fn parse_session_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, DATE_FORMAT)
}

/// Render a session date as `YYYY-MM-DD`.
pub(crate) fn format_session_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| "invalid-date".to_string())
}

const GUEST_PREFIX: &str = "guest-";

/// Identity of a person checked into a session: a roster player or an ad-hoc
/// guest.
///
/// The string form is the bare player id, or the id behind a `guest-` prefix
/// so guest identities can never collide with roster ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum ParticipantId {
    /// A roster player, keyed by their player id.
    Player(Uuid),
    /// An ad-hoc guest with no roster record.
    Guest(Uuid),
}

impl ParticipantId {
    /// Mint a fresh guest identity.
    pub fn new_guest() -> Self {
        Self::Guest(Uuid::new_v4())
    }

    /// Whether this participant is a guest.
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// The roster player id, when this participant is not a guest.
    pub fn as_player(&self) -> Option<Uuid> {
        match self {
            Self::Player(id) => Some(*id),
            Self::Guest(_) => None,
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{id}"),
            Self::Guest(id) => write!(f, "{GUEST_PREFIX}{id}"),
        }
    }
}

/// Error returned when a participant id string is neither a player id nor a
/// `guest-` prefixed id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid participant id `{0}`")]
pub struct ParseParticipantIdError(String);

impl FromStr for ParticipantId {
    type Err = ParseParticipantIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parse = |raw: &str| {
            Uuid::parse_str(raw).map_err(|_| ParseParticipantIdError(value.to_string()))
        };
        match value.strip_prefix(GUEST_PREFIX) {
            Some(raw) => parse(raw).map(Self::Guest),
            None => parse(value).map(Self::Player),
        }
    }
}

/// A person checked into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Display name frozen at check-in time.
    pub name: String,
}

/// The five fixed colors a team can wear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    /// Black bibs.
    Black,
    /// Blue bibs.
    Blue,
    /// Red bibs.
    Red,
    /// Yellow bibs.
    Yellow,
    /// White bibs.
    White,
}

impl TeamColor {
    /// Every color, in presentation order.
    pub const ALL: [TeamColor; 5] = [
        TeamColor::Black,
        TeamColor::Blue,
        TeamColor::Red,
        TeamColor::Yellow,
        TeamColor::White,
    ];

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            TeamColor::Black => "Black",
            TeamColor::Blue => "Blue",
            TeamColor::Red => "Red",
            TeamColor::Yellow => "Yellow",
            TeamColor::White => "White",
        }
    }

    /// First color in [`TeamColor::ALL`] order not present in `used`.
    pub fn first_free(used: &[TeamColor]) -> Option<TeamColor> {
        Self::ALL.into_iter().find(|color| !used.contains(color))
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A color-labeled subset of the session's participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    /// Color identifying the team; unique within a session.
    pub color: TeamColor,
    /// Members, in the order they were added.
    pub members: IndexSet<ParticipantId>,
}

/// One scored, timed contest between two teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Home side team id; may no longer resolve once the team is deleted.
    pub home_team: Uuid,
    /// Away side team id; may no longer resolve once the team is deleted.
    pub away_team: Uuid,
    /// Goals scored by the home side.
    pub home_score: u32,
    /// Goals scored by the away side.
    pub away_score: u32,
    /// Instant the match was created.
    pub kicked_off_at: SystemTime,
    /// Nominal match length in seconds, copied from the session default.
    pub length_secs: u32,
}

impl MatchRecord {
    /// Create a fresh goalless record between two teams.
    pub fn new(home_team: Uuid, away_team: Uuid, length_secs: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            home_team,
            away_team,
            home_score: 0,
            away_score: 0,
            kicked_off_at: SystemTime::now(),
            length_secs,
        }
    }

    fn to_entity(&self, is_finished: bool) -> MatchEntity {
        MatchEntity {
            id: self.id,
            home_team: self.home_team,
            away_team: self.away_team,
            home_score: self.home_score,
            away_score: self.away_score,
            kicked_off_at: self.kicked_off_at,
            length_secs: self.length_secs,
            is_finished,
        }
    }
}

impl From<MatchEntity> for MatchRecord {
    fn from(entity: MatchEntity) -> Self {
        Self {
            id: entity.id,
            home_team: entity.home_team,
            away_team: entity.away_team,
            home_score: entity.home_score,
            away_score: entity.away_score,
            kicked_off_at: entity.kicked_off_at,
            length_secs: entity.length_secs,
        }
    }
}

/// Edit buffer for the single team being created or edited.
///
/// The buffer lives outside the committed team list, so abandoning it never
/// touches a committed team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    /// Id of the committed team being edited, or `None` when building a new
    /// team.
    pub editing: Option<Uuid>,
    /// Color currently chosen for the draft.
    pub color: TeamColor,
    /// Member selection, in the order members were added.
    pub members: IndexSet<ParticipantId>,
}

/// Rule violations raised by team assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    /// Every color is already worn by a committed team.
    #[error("every team color is already in use")]
    ColorsExhausted,
    /// No checked-in participant is free to join a new team.
    #[error("no unassigned participants are available")]
    NoEligibleParticipants,
    /// The requested color is worn by another committed team.
    #[error("the color {0} is already used by another team")]
    ColorTaken(TeamColor),
    /// A team cannot be committed without members.
    #[error("a team needs at least one member")]
    EmptyDraft,
    /// No draft is currently open.
    #[error("no team is being created or edited")]
    NoDraft,
    /// The referenced team does not exist in this session.
    #[error("team `{0}` does not exist")]
    UnknownTeam(Uuid),
    /// The referenced participant is not checked in.
    #[error("participant `{0}` is not checked in")]
    UnknownParticipant(ParticipantId),
}

/// Root aggregate for one dated practice session.
///
/// Everything hangs off this value: who showed up, the teams built from
/// them, the match history, and the lifecycle of the single active match.
#[derive(Debug, Clone)]
pub struct Training {
    /// Primary key of the session.
    pub id: Uuid,
    /// Calendar date the session takes place.
    pub date: Date,
    /// Free-text location, usually copied from a pitch name.
    pub location: String,
    /// Default length for new matches, in minutes.
    pub match_length_min: u32,
    /// Checked-in participants, in check-in order.
    pub participants: IndexMap<ParticipantId, Participant>,
    /// Committed teams, in creation order.
    pub teams: IndexMap<Uuid, Team>,
    /// Finished matches, most recent first.
    pub history: Vec<MatchRecord>,
    /// Lifecycle of the single active match.
    pub engine: MatchEngine,
    /// Edit buffer for the team being created or edited, if any.
    pub draft: Option<TeamDraft>,
}

impl Training {
    /// Create an empty session.
    pub fn new(date: Date, location: String, match_length_min: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            location,
            match_length_min,
            participants: IndexMap::new(),
            teams: IndexMap::new(),
            history: Vec::new(),
            engine: MatchEngine::new(),
            draft: None,
        }
    }

    /// Default length for new matches, in seconds.
    pub fn match_length_secs(&self) -> u32 {
        self.match_length_min.saturating_mul(60)
    }

    /// Check a roster player in, freezing their current display name.
    /// Returns `false` when they were already checked in.
    pub fn check_in(&mut self, player_id: Uuid, name: String) -> bool {
        let id = ParticipantId::Player(player_id);
        if self.participants.contains_key(&id) {
            return false;
        }
        self.participants.insert(id, Participant { name });
        true
    }

    /// Check a guest in under a fresh synthetic identity.
    pub fn check_in_guest(&mut self, name: String) -> ParticipantId {
        let id = ParticipantId::new_guest();
        self.participants.insert(id, Participant { name });
        id
    }

    /// Remove a participant, scrubbing their id from every team and from the
    /// draft. Returns `false` when they were not checked in.
    pub fn remove_participant(&mut self, id: &ParticipantId) -> bool {
        if self.participants.shift_remove(id).is_none() {
            return false;
        }
        for team in self.teams.values_mut() {
            team.members.shift_remove(id);
        }
        if let Some(draft) = self.draft.as_mut() {
            draft.members.shift_remove(id);
        }
        true
    }

    /// The committed team currently holding this participant, if any.
    pub fn team_of(&self, id: &ParticipantId) -> Option<Uuid> {
        self.teams
            .iter()
            .find(|(_, team)| team.members.contains(id))
            .map(|(team_id, _)| *team_id)
    }

    /// Colors worn by committed teams.
    pub fn used_colors(&self) -> Vec<TeamColor> {
        self.teams.values().map(|team| team.color).collect()
    }

    fn has_unassigned_participant(&self) -> bool {
        self.participants.keys().any(|id| self.team_of(id).is_none())
    }

    /// Open a draft for a brand-new team, seeded with the first free color.
    /// Replaces any draft already open.
    pub fn open_draft(&mut self) -> Result<(), AssemblerError> {
        let color =
            TeamColor::first_free(&self.used_colors()).ok_or(AssemblerError::ColorsExhausted)?;
        if !self.has_unassigned_participant() {
            return Err(AssemblerError::NoEligibleParticipants);
        }
        self.draft = Some(TeamDraft {
            editing: None,
            color,
            members: IndexSet::new(),
        });
        Ok(())
    }

    /// Open a draft pre-filled from a committed team.
    pub fn open_draft_edit(&mut self, team_id: Uuid) -> Result<(), AssemblerError> {
        let team = self
            .teams
            .get(&team_id)
            .ok_or(AssemblerError::UnknownTeam(team_id))?;
        self.draft = Some(TeamDraft {
            editing: Some(team_id),
            color: team.color,
            members: team.members.clone(),
        });
        Ok(())
    }

    /// Flip a participant's membership in the open draft. Participants
    /// committed to a different team are left untouched and `Ok(false)` is
    /// returned.
    pub fn toggle_draft_member(&mut self, id: ParticipantId) -> Result<bool, AssemblerError> {
        let editing = self.draft.as_ref().ok_or(AssemblerError::NoDraft)?.editing;
        if !self.participants.contains_key(&id) {
            return Err(AssemblerError::UnknownParticipant(id));
        }
        if self
            .team_of(&id)
            .is_some_and(|owner| Some(owner) != editing)
        {
            return Ok(false);
        }
        let draft = self.draft.as_mut().ok_or(AssemblerError::NoDraft)?;
        if !draft.members.shift_remove(&id) {
            draft.members.insert(id);
        }
        Ok(true)
    }

    /// Choose a color for the open draft.
    pub fn set_draft_color(&mut self, color: TeamColor) -> Result<(), AssemblerError> {
        let editing = self.draft.as_ref().ok_or(AssemblerError::NoDraft)?.editing;
        let taken = self
            .teams
            .iter()
            .any(|(id, team)| team.color == color && Some(*id) != editing);
        if taken {
            return Err(AssemblerError::ColorTaken(color));
        }
        let draft = self.draft.as_mut().ok_or(AssemblerError::NoDraft)?;
        draft.color = color;
        Ok(())
    }

    /// Commit the open draft, either as a new team or as an in-place rewrite
    /// of the team being edited. On success the draft closes and the id of
    /// the committed team is returned; on failure the draft stays open.
    pub fn commit_draft(&mut self) -> Result<Uuid, AssemblerError> {
        {
            let draft = self.draft.as_ref().ok_or(AssemblerError::NoDraft)?;
            if draft.members.is_empty() {
                return Err(AssemblerError::EmptyDraft);
            }
            let taken = self
                .teams
                .iter()
                .any(|(id, team)| team.color == draft.color && Some(*id) != draft.editing);
            if taken {
                return Err(AssemblerError::ColorTaken(draft.color));
            }
        }
        let draft = self.draft.take().ok_or(AssemblerError::NoDraft)?;
        let team = Team {
            color: draft.color,
            members: draft.members,
        };
        let team_id = match draft.editing {
            Some(id) => {
                self.teams.insert(id, team);
                id
            }
            None => {
                let id = Uuid::new_v4();
                self.teams.insert(id, team);
                id
            }
        };
        Ok(team_id)
    }

    /// Drop the open draft without touching committed teams.
    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    /// Delete a committed team, returning its members to the unassigned pool.
    /// A draft editing that team is discarded.
    pub fn delete_team(&mut self, team_id: Uuid) -> Result<(), AssemblerError> {
        self.teams
            .shift_remove(&team_id)
            .ok_or(AssemblerError::UnknownTeam(team_id))?;
        if self
            .draft
            .as_ref()
            .is_some_and(|draft| draft.editing == Some(team_id))
        {
            self.draft = None;
        }
        Ok(())
    }

    /// Remove every committed team. Participants stay checked in.
    pub fn clear_teams(&mut self) {
        self.teams.clear();
        if self
            .draft
            .as_ref()
            .is_some_and(|draft| draft.editing.is_some())
        {
            self.draft = None;
        }
    }
}

/// Error raised when a stored training cannot be rebuilt into runtime state.
#[derive(Debug, Error)]
pub enum TrainingDataError {
    /// The stored date string does not parse.
    #[error("training `{id}` has an unreadable date `{date}`")]
    BadDate {
        /// Id of the offending training record.
        id: Uuid,
        /// The stored date string.
        date: String,
    },
}

impl From<Training> for TrainingEntity {
    fn from(value: Training) -> Self {
        let mut matches = Vec::with_capacity(value.history.len() + 1);
        if let Some(live) = value.engine.live() {
            matches.push(live.record.to_entity(false));
        }
        matches.extend(value.history.iter().map(|record| record.to_entity(true)));
        Self {
            id: value.id,
            date: format_session_date(value.date),
            location: value.location,
            match_length_min: value.match_length_min,
            participants: value
                .participants
                .into_iter()
                .map(|(id, participant)| ParticipantEntity {
                    id,
                    name: participant.name,
                })
                .collect(),
            teams: value
                .teams
                .into_iter()
                .map(|(id, team)| TeamEntity {
                    id,
                    color: team.color,
                    member_ids: team.members.into_iter().collect(),
                })
                .collect(),
            matches,
        }
    }
}

impl TryFrom<TrainingEntity> for Training {
    type Error = TrainingDataError;

    /// Rebuild runtime state from a stored record. The clock of an
    /// unfinished match is not persisted, so it comes back paused at the
    /// full match length.
    fn try_from(entity: TrainingEntity) -> Result<Self, Self::Error> {
        let date = parse_session_date(&entity.date).map_err(|_| TrainingDataError::BadDate {
            id: entity.id,
            date: entity.date.clone(),
        })?;

        let mut engine = MatchEngine::new();
        let mut history = Vec::new();
        for entry in entity.matches {
            if entry.is_finished {
                history.push(MatchRecord::from(entry));
            } else if engine.live().is_none() {
                let time_left = entry.length_secs;
                engine = MatchEngine::paused(LiveMatch {
                    record: MatchRecord::from(entry),
                    time_left,
                });
            } else {
                warn!(
                    match_id = %entry.id,
                    "stored session has more than one unfinished match; archiving the extra one"
                );
                history.push(MatchRecord::from(entry));
            }
        }

        Ok(Self {
            id: entity.id,
            date,
            location: entity.location,
            match_length_min: entity.match_length_min,
            participants: entity
                .participants
                .into_iter()
                .map(|participant| {
                    (
                        participant.id,
                        Participant {
                            name: participant.name,
                        },
                    )
                })
                .collect(),
            teams: entity
                .teams
                .into_iter()
                .map(|team| {
                    (
                        team.id,
                        Team {
                            color: team.color,
                            members: team.member_ids.into_iter().collect(),
                        },
                    )
                })
                .collect(),
            history,
            engine,
            draft: None,
        })
    }
}
