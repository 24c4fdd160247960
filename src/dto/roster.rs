use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{PitchEntity, PlayerEntity};

/// Payload for creating or renaming a roster player.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayerInput {
    /// Name shown throughout the app; must stay unique ignoring case.
    #[validate(length(min = 1, max = 64))]
    pub display_name: String,
    /// Optional real name.
    #[serde(default)]
    #[validate(length(max = 128))]
    pub full_name: Option<String>,
}

/// Payload for creating a pitch.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PitchInput {
    /// Pitch name; must stay unique ignoring case.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// Filters applied when listing roster players.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerFilter {
    /// Case-insensitive substring matched against display and full names.
    #[serde(default)]
    pub search: Option<String>,
    /// Include archived players in the listing.
    #[serde(default)]
    pub include_archived: bool,
}

/// Roster player projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerView {
    /// Stable identifier for the player.
    pub id: Uuid,
    /// Name shown throughout the app.
    pub display_name: String,
    /// Real name; empty when not provided.
    pub full_name: String,
    /// Whether the player is hidden from default listings.
    pub is_archived: bool,
}

impl From<PlayerEntity> for PlayerView {
    fn from(entity: PlayerEntity) -> Self {
        Self {
            id: entity.id,
            display_name: entity.display_name,
            full_name: entity.full_name,
            is_archived: entity.is_archived,
        }
    }
}

/// Pitch projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PitchView {
    /// Stable identifier for the pitch.
    pub id: Uuid,
    /// Pitch name.
    pub name: String,
}

impl From<PitchEntity> for PitchView {
    fn from(entity: PitchEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

/// Outcome of a bulk roster import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Number of players added to the roster.
    pub imported: usize,
    /// Number of lines skipped as blank or duplicate.
    pub skipped: usize,
}
