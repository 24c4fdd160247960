use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::ledger::{GuestInput, LedgerView},
    error::ServiceError,
    services::training_service::{no_open_session, persist_session},
    state::{SharedState, session::ParticipantId},
};

/// The check-in ledger of the open session.
pub async fn ledger(state: &SharedState) -> Result<LedgerView, ServiceError> {
    let players = state.store().load_players().await?;
    let slot = state.session().read().await;
    let training = slot.as_ref().ok_or_else(no_open_session)?;
    Ok(LedgerView::from((training, players.as_slice())))
}

/// Check a roster player into the open session, freezing their current
/// display name. Checking in twice is a no-op.
pub async fn check_in(state: &SharedState, player_id: Uuid) -> Result<LedgerView, ServiceError> {
    let players = state.store().load_players().await?;
    let player = players
        .iter()
        .find(|player| player.id == player_id)
        .ok_or_else(|| ServiceError::NotFound(format!("player `{player_id}` does not exist")))?;

    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    if training.check_in(player_id, player.display_name.clone()) {
        persist_session(&state.store(), training).await?;
        debug!(player_id = %player_id, "checked player in");
    }
    Ok(LedgerView::from((&*training, players.as_slice())))
}

/// Check a guest in under a fresh identity that cannot collide with roster
/// ids.
pub async fn check_in_guest(
    state: &SharedState,
    input: GuestInput,
) -> Result<LedgerView, ServiceError> {
    input.validate()?;
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("guest name must not be blank".into()));
    }

    let players = state.store().load_players().await?;
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    let participant_id = training.check_in_guest(name);
    persist_session(&state.store(), training).await?;
    debug!(participant_id = %participant_id, "checked guest in");
    Ok(LedgerView::from((&*training, players.as_slice())))
}

/// Remove a participant from the ledger, pulling them out of any team and
/// the draft.
pub async fn remove_participant(
    state: &SharedState,
    participant_id: ParticipantId,
) -> Result<LedgerView, ServiceError> {
    let players = state.store().load_players().await?;
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    if !training.remove_participant(&participant_id) {
        return Err(ServiceError::NotFound(format!(
            "participant `{participant_id}` is not checked in"
        )));
    }
    persist_session(&state.store(), training).await?;
    debug!(participant_id = %participant_id, "removed participant");
    Ok(LedgerView::from((&*training, players.as_slice())))
}
