use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::state::session::{ParticipantId, Training};

/// Check-in ledger payloads and projections.
pub mod ledger;
/// Player and pitch payloads and projections.
pub mod roster;
/// Match engine and history projections.
pub mod scoreboard;
/// Team board and draft projections.
pub mod team;
/// Training session payloads and projections.
pub mod training;
/// Validation helpers for request payloads.
pub mod validation;

/// Label shown when a referenced team or participant no longer exists.
const UNKNOWN_LABEL: &str = "Unknown";

/// Format a system time as an RFC 3339 timestamp.
fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".to_string())
}

/// Render a second count as `m:ss` for clock displays.
fn format_clock(total_secs: u32) -> String {
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Resolve a participant to their display label, appending a guest marker
/// and falling back to [`UNKNOWN_LABEL`] for ids that no longer resolve.
fn participant_label(training: &Training, id: &ParticipantId) -> String {
    match training.participants.get(id) {
        Some(participant) if id.is_guest() => format!("{} (Guest)", participant.name),
        Some(participant) => participant.name.clone(),
        None => UNKNOWN_LABEL.to_string(),
    }
}

/// Resolve a team to its color label, falling back to [`UNKNOWN_LABEL`] for
/// deleted teams.
fn team_label(training: &Training, team_id: &Uuid) -> String {
    training
        .teams
        .get(team_id)
        .map(|team| team.color.label().to_string())
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}
