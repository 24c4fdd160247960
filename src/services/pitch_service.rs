use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::PitchEntity,
    dto::roster::{PitchInput, PitchView},
    error::ServiceError,
    state::SharedState,
};

/// List known pitches, optionally filtered by a name fragment.
pub async fn list_pitches(
    state: &SharedState,
    search: Option<&str>,
) -> Result<Vec<PitchView>, ServiceError> {
    let mut pitches = state.store().load_pitches().await?;
    if let Some(needle) = search.map(str::trim).filter(|needle| !needle.is_empty()) {
        let needle = needle.to_lowercase();
        pitches.retain(|pitch| pitch.name.to_lowercase().contains(&needle));
    }
    pitches.sort_by_key(|pitch| pitch.name.to_lowercase());
    Ok(pitches.into_iter().map(Into::into).collect())
}

/// Register a pitch so sessions can refer to it by name.
pub async fn create_pitch(
    state: &SharedState,
    input: PitchInput,
) -> Result<PitchView, ServiceError> {
    input.validate()?;
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("pitch name must not be blank".into()));
    }

    let mut pitches = state.store().load_pitches().await?;
    let needle = name.to_lowercase();
    if pitches.iter().any(|pitch| pitch.name.to_lowercase() == needle) {
        return Err(ServiceError::InvalidInput(format!(
            "a pitch named `{name}` already exists"
        )));
    }

    let pitch = PitchEntity { id: Uuid::new_v4(), name };
    pitches.push(pitch.clone());
    state.store().save_pitches(pitches).await?;

    info!(pitch_id = %pitch.id, "added pitch");
    Ok(pitch.into())
}

/// Remove a pitch. Sessions keep their location as plain text, so nothing
/// else needs fixing up.
pub async fn delete_pitch(state: &SharedState, pitch_id: Uuid) -> Result<(), ServiceError> {
    let mut pitches = state.store().load_pitches().await?;
    let before = pitches.len();
    pitches.retain(|pitch| pitch.id != pitch_id);
    if pitches.len() == before {
        return Err(ServiceError::NotFound(format!(
            "pitch `{pitch_id}` does not exist"
        )));
    }
    state.store().save_pitches(pitches).await?;
    info!(pitch_id = %pitch_id, "removed pitch");
    Ok(())
}
