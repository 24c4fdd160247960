use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::TrainingEntity,
    dto::validation::{validate_iso_date, validate_not_blank},
    state::session::{Training, format_session_date},
};

/// Payload for creating a training session.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingInput {
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Free-text location, usually a pitch name.
    pub location: String,
    /// Default match length in minutes; the configured default applies when
    /// omitted.
    #[serde(default)]
    pub match_length_min: Option<u32>,
}

impl Validate for TrainingInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_iso_date(&self.date) {
            errors.add("date", err);
        }
        if let Err(err) = validate_not_blank(&self.location) {
            errors.add("location", err);
        }
        if let Some(minutes) = self.match_length_min
            && let Err(err) = validate_match_length(minutes)
        {
            errors.add("match_length_min", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload for rewriting the open session's general details.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingUpdateInput {
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Free-text location.
    pub location: String,
    /// Default match length in minutes.
    pub match_length_min: u32,
}

impl Validate for TrainingUpdateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(err) = validate_iso_date(&self.date) {
            errors.add("date", err);
        }
        if let Err(err) = validate_not_blank(&self.location) {
            errors.add("location", err);
        }
        if let Err(err) = validate_match_length(self.match_length_min) {
            errors.add("match_length_min", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn validate_match_length(minutes: u32) -> Result<(), ValidationError> {
    if !(1..=600).contains(&minutes) {
        let mut err = ValidationError::new("match_length_range");
        err.message = Some("Match length must be between 1 and 600 minutes".into());
        return Err(err);
    }

    Ok(())
}

/// Summary row for the trainings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingSummary {
    /// Stable identifier for the session.
    pub id: Uuid,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Free-text location.
    pub location: String,
    /// Default match length in minutes.
    pub match_length_min: u32,
    /// Number of checked-in participants.
    pub participant_count: usize,
    /// Number of matches, finished or not.
    pub match_count: usize,
}

impl From<&TrainingEntity> for TrainingSummary {
    fn from(entity: &TrainingEntity) -> Self {
        Self {
            id: entity.id,
            date: entity.date.clone(),
            location: entity.location.clone(),
            match_length_min: entity.match_length_min,
            participant_count: entity.participants.len(),
            match_count: entity.matches.len(),
        }
    }
}

/// General details of the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingDetailView {
    /// Stable identifier for the session.
    pub id: Uuid,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Free-text location.
    pub location: String,
    /// Default match length in minutes.
    pub match_length_min: u32,
    /// Number of checked-in participants.
    pub participant_count: usize,
    /// Number of committed teams.
    pub team_count: usize,
    /// Number of matches, finished or not.
    pub match_count: usize,
}

impl From<&Training> for TrainingDetailView {
    fn from(training: &Training) -> Self {
        Self {
            id: training.id,
            date: format_session_date(training.date),
            location: training.location.clone(),
            match_length_min: training.match_length_min,
            participant_count: training.participants.len(),
            team_count: training.teams.len(),
            match_count: training.history.len() + usize::from(training.engine.live().is_some()),
        }
    }
}
