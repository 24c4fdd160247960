use std::sync::Arc;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{models::TrainingEntity, storage::RecordStore},
    dto::training::{TrainingDetailView, TrainingInput, TrainingSummary, TrainingUpdateInput},
    error::ServiceError,
    services::match_clock,
    state::{
        SharedState,
        session::{Training, parse_session_date},
    },
};

/// List stored trainings, newest first.
pub async fn list_trainings(state: &SharedState) -> Result<Vec<TrainingSummary>, ServiceError> {
    let trainings = state.store().load_trainings().await?;
    Ok(trainings.iter().map(TrainingSummary::from).collect())
}

/// Create a training session. The configured default match length applies
/// when the payload omits one.
pub async fn create_training(
    state: &SharedState,
    input: TrainingInput,
) -> Result<TrainingSummary, ServiceError> {
    input.validate()?;
    let (date, location) = normalized_details(&input.date, &input.location)?;
    let match_length_min = input
        .match_length_min
        .unwrap_or(state.config().default_match_minutes);

    let entity = TrainingEntity::from(Training::new(date, location, match_length_min));
    let summary = TrainingSummary::from(&entity);

    let mut trainings = state.store().load_trainings().await?;
    trainings.insert(0, entity);
    state.store().save_trainings(trainings).await?;

    info!(training_id = %summary.id, "created training session");
    Ok(summary)
}

/// Load a stored training into the session slot, replacing whatever was
/// open. An unfinished match comes back paused at the full match length.
pub async fn open_training(
    state: &SharedState,
    training_id: Uuid,
) -> Result<TrainingDetailView, ServiceError> {
    let trainings = state.store().load_trainings().await?;
    let entity = trainings
        .into_iter()
        .find(|entity| entity.id == training_id)
        .ok_or_else(|| unknown_training(training_id))?;
    let training = Training::try_from(entity)?;
    let view = TrainingDetailView::from(&training);

    match_clock::cancel_clock(state).await;
    *state.session().write().await = Some(training);

    info!(training_id = %training_id, "opened training session");
    Ok(view)
}

/// Details of the open session, if any.
pub async fn current_training(state: &SharedState) -> Option<TrainingDetailView> {
    state
        .session()
        .read()
        .await
        .as_ref()
        .map(TrainingDetailView::from)
}

/// Close the open session. Stored data is untouched; only runtime state is
/// dropped.
pub async fn close_training(state: &SharedState) -> Result<(), ServiceError> {
    match_clock::cancel_clock(state).await;
    let closed = state.session().write().await.take();
    let training = closed.ok_or_else(no_open_session)?;
    info!(training_id = %training.id, "closed training session");
    Ok(())
}

/// Rewrite the open session's date, location, and default match length.
pub async fn update_details(
    state: &SharedState,
    input: TrainingUpdateInput,
) -> Result<TrainingDetailView, ServiceError> {
    input.validate()?;
    let (date, location) = normalized_details(&input.date, &input.location)?;

    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.date = date;
    training.location = location;
    training.match_length_min = input.match_length_min;
    persist_session(&state.store(), training).await?;
    Ok(TrainingDetailView::from(&*training))
}

/// Delete a stored training. If it is the open session, close that too.
pub async fn delete_training(state: &SharedState, training_id: Uuid) -> Result<(), ServiceError> {
    let mut trainings = state.store().load_trainings().await?;
    let before = trainings.len();
    trainings.retain(|entity| entity.id != training_id);
    if trainings.len() == before {
        return Err(unknown_training(training_id));
    }
    state.store().save_trainings(trainings).await?;

    let was_open = {
        let mut slot = state.session().write().await;
        if slot.as_ref().is_some_and(|training| training.id == training_id) {
            *slot = None;
            true
        } else {
            false
        }
    };
    if was_open {
        match_clock::cancel_clock(state).await;
    }

    info!(training_id = %training_id, "deleted training session");
    Ok(())
}

/// Write the session back to its stored record, replacing it in place or
/// prepending it when the record has gone missing.
pub(crate) async fn persist_session(
    store: &Arc<dyn RecordStore>,
    training: &Training,
) -> Result<(), ServiceError> {
    let entity = TrainingEntity::from(training.clone());
    let mut trainings = store.load_trainings().await?;
    match trainings.iter().position(|stored| stored.id == entity.id) {
        Some(index) => trainings[index] = entity,
        None => trainings.insert(0, entity),
    }
    store.save_trainings(trainings).await?;
    Ok(())
}

pub(crate) fn no_open_session() -> ServiceError {
    ServiceError::InvalidState("no session is open".into())
}

fn normalized_details(date: &str, location: &str) -> Result<(time::Date, String), ServiceError> {
    let date = parse_session_date(date.trim())
        .map_err(|_| ServiceError::InvalidInput("date must be formatted as YYYY-MM-DD".into()))?;
    let location = location.trim().to_string();
    if location.is_empty() {
        return Err(ServiceError::InvalidInput("location must not be blank".into()));
    }
    Ok((date, location))
}

fn unknown_training(training_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("training `{training_id}` does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, dao::memory::MemoryStore, state::AppState};

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()))
    }

    fn input(date: &str, location: &str) -> TrainingInput {
        TrainingInput {
            date: date.to_string(),
            location: location.to_string(),
            match_length_min: None,
        }
    }

    #[tokio::test]
    async fn new_trainings_list_newest_first() {
        let state = test_state();
        create_training(&state, input("2024-01-01", "Riverside"))
            .await
            .unwrap();
        create_training(&state, input("2024-01-08", "Astro Park"))
            .await
            .unwrap();

        let listed = list_trainings(&state).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].date, "2024-01-08");
        assert_eq!(listed[1].date, "2024-01-01");
    }

    #[tokio::test]
    async fn the_configured_match_length_applies_when_omitted() {
        let state = test_state();
        let summary = create_training(&state, input("2024-01-01", "Riverside"))
            .await
            .unwrap();
        assert_eq!(summary.match_length_min, 10);

        let summary = create_training(
            &state,
            TrainingInput {
                match_length_min: Some(25),
                ..input("2024-01-08", "Astro Park")
            },
        )
        .await
        .unwrap();
        assert_eq!(summary.match_length_min, 25);
    }

    #[tokio::test]
    async fn opening_and_closing_swaps_the_session_slot() {
        let state = test_state();
        let summary = create_training(&state, input("2024-01-01", "Riverside"))
            .await
            .unwrap();

        assert!(current_training(&state).await.is_none());
        let detail = open_training(&state, summary.id).await.unwrap();
        assert_eq!(detail.id, summary.id);
        assert_eq!(current_training(&state).await.unwrap().id, summary.id);

        close_training(&state).await.unwrap();
        assert!(current_training(&state).await.is_none());
        assert!(matches!(
            close_training(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn opening_an_unknown_training_fails() {
        let state = test_state();
        assert!(matches!(
            open_training(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn detail_updates_reach_the_store() {
        let state = test_state();
        let summary = create_training(&state, input("2024-01-01", "Riverside"))
            .await
            .unwrap();
        open_training(&state, summary.id).await.unwrap();

        let detail = update_details(
            &state,
            TrainingUpdateInput {
                date: "2024-02-02".to_string(),
                location: "Astro Park".to_string(),
                match_length_min: 15,
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.date, "2024-02-02");
        assert_eq!(detail.match_length_min, 15);

        let stored = list_trainings(&state).await.unwrap();
        assert_eq!(stored[0].location, "Astro Park");
    }

    #[tokio::test]
    async fn updating_without_an_open_session_fails() {
        let state = test_state();
        let result = update_details(
            &state,
            TrainingUpdateInput {
                date: "2024-02-02".to_string(),
                location: "Astro Park".to_string(),
                match_length_min: 15,
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidState(_))));
    }

    #[tokio::test]
    async fn deleting_the_open_training_closes_it() {
        let state = test_state();
        let summary = create_training(&state, input("2024-01-01", "Riverside"))
            .await
            .unwrap();
        open_training(&state, summary.id).await.unwrap();

        delete_training(&state, summary.id).await.unwrap();
        assert!(current_training(&state).await.is_none());
        assert!(list_trainings(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_bad_payloads() {
        let state = test_state();
        assert!(matches!(
            create_training(&state, input("someday", "Riverside")).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            create_training(&state, input("2024-01-01", "   ")).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
