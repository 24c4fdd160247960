use tracing::info;
use uuid::Uuid;

use crate::{
    dto::team::TeamBoardView,
    error::ServiceError,
    services::training_service::{no_open_session, persist_session},
    state::{
        SharedState,
        session::{ParticipantId, TeamColor},
    },
};

/// The team board of the open session: committed teams plus the open draft.
pub async fn board(state: &SharedState) -> Result<TeamBoardView, ServiceError> {
    let slot = state.session().read().await;
    let training = slot.as_ref().ok_or_else(no_open_session)?;
    Ok(TeamBoardView::from(training))
}

/// Open a draft for a new team, seeded with the first free color.
pub async fn start_team(state: &SharedState) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.open_draft()?;
    Ok(TeamBoardView::from(&*training))
}

/// Open a draft pre-filled from a committed team.
pub async fn edit_team(state: &SharedState, team_id: Uuid) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.open_draft_edit(team_id)?;
    Ok(TeamBoardView::from(&*training))
}

/// Flip a participant's membership in the open draft. Members of other
/// teams are left untouched.
pub async fn toggle_member(
    state: &SharedState,
    participant_id: ParticipantId,
) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.toggle_draft_member(participant_id)?;
    Ok(TeamBoardView::from(&*training))
}

/// Choose a color for the open draft.
pub async fn set_color(
    state: &SharedState,
    color: TeamColor,
) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.set_draft_color(color)?;
    Ok(TeamBoardView::from(&*training))
}

/// Commit the open draft as a new team or an in-place rewrite of an edited
/// one.
pub async fn commit_team(state: &SharedState) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    let team_id = training.commit_draft()?;
    persist_session(&state.store(), training).await?;
    info!(team_id = %team_id, "committed team");
    Ok(TeamBoardView::from(&*training))
}

/// Drop the open draft. Committed teams are untouched, so there is nothing
/// to persist.
pub async fn discard_draft(state: &SharedState) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.discard_draft();
    Ok(TeamBoardView::from(&*training))
}

/// Delete a committed team, returning its members to the unassigned pool.
pub async fn delete_team(
    state: &SharedState,
    team_id: Uuid,
) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.delete_team(team_id)?;
    persist_session(&state.store(), training).await?;
    info!(team_id = %team_id, "deleted team");
    Ok(TeamBoardView::from(&*training))
}

/// Remove every committed team at once.
pub async fn clear_teams(state: &SharedState) -> Result<TeamBoardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.clear_teams();
    persist_session(&state.store(), training).await?;
    info!("cleared teams");
    Ok(TeamBoardView::from(&*training))
}
