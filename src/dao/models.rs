//! Persistence entities, decoupled from the runtime state structures.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::session::{ParticipantId, TeamColor};

/// Roster player record stored in the players collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntity {
    /// Stable identifier for the player.
    pub id: Uuid,
    /// Name shown throughout the app; unique ignoring case.
    pub display_name: String,
    /// Optional real name; empty when not provided.
    #[serde(default)]
    pub full_name: String,
    /// Soft-hide flag; archived players stay referenced by past sessions.
    #[serde(default)]
    pub is_archived: bool,
}

/// Pitch record stored in the pitches collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchEntity {
    /// Stable identifier for the pitch.
    pub id: Uuid,
    /// Pitch name; unique ignoring case.
    pub name: String,
}

/// Checked-in participant embedded in a training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantEntity {
    /// Participant identity; guests carry a `guest-` prefix in string form.
    pub id: ParticipantId,
    /// Display name frozen at check-in time.
    pub name: String,
}

/// Team embedded in a training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Color identifying the team within its session.
    pub color: TeamColor,
    /// Member identities, in the order they were added.
    pub member_ids: Vec<ParticipantId>,
}

/// Match embedded in a training record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEntity {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Home side team id.
    pub home_team: Uuid,
    /// Away side team id.
    pub away_team: Uuid,
    /// Goals scored by the home side.
    pub home_score: u32,
    /// Goals scored by the away side.
    pub away_score: u32,
    /// Instant the match was created.
    pub kicked_off_at: SystemTime,
    /// Nominal match length in seconds.
    pub length_secs: u32,
    /// Whether the match has been concluded.
    pub is_finished: bool,
}

/// Aggregate training record stored in the trainings collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingEntity {
    /// Primary key of the session.
    pub id: Uuid,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Free-text location.
    pub location: String,
    /// Default length for new matches, in minutes.
    pub match_length_min: u32,
    /// Checked-in participants, in check-in order.
    #[serde(default)]
    pub participants: Vec<ParticipantEntity>,
    /// Committed teams, in creation order.
    #[serde(default)]
    pub teams: Vec<TeamEntity>,
    /// Matches, the unfinished one (if any) first, then finished ones newest
    /// first.
    #[serde(default)]
    pub matches: Vec<MatchEntity>,
}
