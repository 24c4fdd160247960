use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::scoreboard::ScoreboardView,
    error::ServiceError,
    services::{
        match_clock,
        training_service::{no_open_session, persist_session},
    },
    state::{
        SharedState,
        match_engine::{MatchEvent, MatchPhase, Side},
        session::Training,
    },
};

/// The scoreboard of the open session: current match phase plus history.
pub async fn scoreboard(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let slot = state.session().read().await;
    let training = slot.as_ref().ok_or_else(no_open_session)?;
    Ok(ScoreboardView::from(training))
}

/// Start picking sides for a new match. Needs at least two committed teams
/// and no match already underway.
pub async fn open_setup(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    if training.teams.len() < 2 {
        return Err(ServiceError::InvalidState(
            "at least two teams are needed to start a match".into(),
        ));
    }
    training.engine.apply(MatchEvent::OpenSetup)?;
    Ok(ScoreboardView::from(&*training))
}

/// Choose the home side. Picking the team already set as away clears the
/// away pick.
pub async fn pick_home(state: &SharedState, team_id: Uuid) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    ensure_team_exists(training, team_id)?;
    training.engine.apply(MatchEvent::PickHome(team_id))?;
    Ok(ScoreboardView::from(&*training))
}

/// Choose the away side. The away team must differ from the home team.
pub async fn pick_away(state: &SharedState, team_id: Uuid) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    ensure_team_exists(training, team_id)?;
    if training
        .engine
        .setup()
        .is_some_and(|setup| setup.home == Some(team_id))
    {
        return Err(ServiceError::InvalidInput(
            "the away team must differ from the home team".into(),
        ));
    }
    training.engine.apply(MatchEvent::PickAway(team_id))?;
    Ok(ScoreboardView::from(&*training))
}

/// Abandon side picking and return to idle.
pub async fn cancel_setup(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    training.engine.apply(MatchEvent::CancelSetup)?;
    Ok(ScoreboardView::from(&*training))
}

/// Create the match from the picked sides. The clock is loaded with the
/// session's match length and stays paused until started.
pub async fn kick_off(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    let length_secs = training.match_length_secs();
    training.engine.apply(MatchEvent::KickOff { length_secs })?;
    persist_session(&state.store(), training).await?;
    info!(length_secs, "match kicked off");
    Ok(ScoreboardView::from(&*training))
}

/// Start the countdown when paused, pause it when running. An expired clock
/// cannot be restarted until time is added.
pub async fn toggle_clock(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let (view, running) = {
        let mut slot = state.session().write().await;
        let training = slot.as_mut().ok_or_else(no_open_session)?;
        match training.engine.phase() {
            MatchPhase::Running(_) => {
                training.engine.apply(MatchEvent::PauseClock)?;
            }
            MatchPhase::Paused(live) if live.time_left == 0 => {
                return Err(ServiceError::InvalidState(
                    "the clock has expired; extend the time first".into(),
                ));
            }
            MatchPhase::Paused(_) => {
                training.engine.apply(MatchEvent::StartClock)?;
            }
            MatchPhase::Idle | MatchPhase::Setup(_) => return Err(no_active_match()),
        }
        let running = training.engine.is_running();
        (ScoreboardView::from(&*training), running)
    };

    if running {
        match_clock::spawn_clock(state).await;
    } else {
        match_clock::cancel_clock(state).await;
    }
    Ok(view)
}

/// Shift the countdown by a signed number of seconds, clamping at zero. A
/// running clock that is pushed to zero pauses.
pub async fn adjust_time(
    state: &SharedState,
    delta_secs: i64,
) -> Result<ScoreboardView, ServiceError> {
    let (view, running) = {
        let mut slot = state.session().write().await;
        let training = slot.as_mut().ok_or_else(no_open_session)?;
        training.engine.apply(MatchEvent::AdjustTime(delta_secs))?;
        let running = training.engine.is_running();
        (ScoreboardView::from(&*training), running)
    };

    if !running {
        match_clock::cancel_clock(state).await;
    }
    Ok(view)
}

/// Zero the countdown and pause.
pub async fn reset_clock(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let view = {
        let mut slot = state.session().write().await;
        let training = slot.as_mut().ok_or_else(no_open_session)?;
        training.engine.apply(MatchEvent::ResetClock)?;
        ScoreboardView::from(&*training)
    };
    match_clock::cancel_clock(state).await;
    Ok(view)
}

/// Add to or subtract from one side's score. Scores never drop below zero.
pub async fn adjust_score(
    state: &SharedState,
    side: Side,
    delta: i32,
) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    let live = training.engine.live_mut().ok_or_else(no_active_match)?;
    live.adjust_score(side, delta);
    persist_session(&state.store(), training).await?;
    debug!(?side, delta, "adjusted score");
    Ok(ScoreboardView::from(&*training))
}

/// Close out the active match, archiving its record at the top of the
/// history.
pub async fn finish_match(state: &SharedState) -> Result<ScoreboardView, ServiceError> {
    let view = {
        let mut slot = state.session().write().await;
        let training = slot.as_mut().ok_or_else(no_open_session)?;
        let record = training.engine.finish().ok_or_else(no_active_match)?;
        info!(
            match_id = %record.id,
            home_score = record.home_score,
            away_score = record.away_score,
            "match finished"
        );
        training.history.insert(0, record);
        persist_session(&state.store(), training).await?;
        ScoreboardView::from(&*training)
    };
    match_clock::cancel_clock(state).await;
    Ok(view)
}

/// Delete a finished match from the history.
pub async fn delete_match(
    state: &SharedState,
    match_id: Uuid,
) -> Result<ScoreboardView, ServiceError> {
    let mut slot = state.session().write().await;
    let training = slot.as_mut().ok_or_else(no_open_session)?;
    let before = training.history.len();
    training.history.retain(|record| record.id != match_id);
    if training.history.len() == before {
        return Err(ServiceError::NotFound(format!(
            "match `{match_id}` does not exist"
        )));
    }
    persist_session(&state.store(), training).await?;
    info!(match_id = %match_id, "deleted match");
    Ok(ScoreboardView::from(&*training))
}

fn ensure_team_exists(training: &Training, team_id: Uuid) -> Result<(), ServiceError> {
    if training.teams.contains_key(&team_id) {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "team `{team_id}` is not part of this session"
        )))
    }
}

fn no_active_match() -> ServiceError {
    ServiceError::InvalidState("no match is underway".into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::memory::MemoryStore,
        dto::{
            roster::{PitchInput, PlayerInput},
            scoreboard::PhaseView,
            training::TrainingInput,
        },
        services::{ledger_service, pitch_service, roster_service, team_service, training_service},
        state::{
            AppState,
            session::{ParticipantId, TeamColor},
        },
    };

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()))
    }

    async fn open_session(state: &SharedState) -> Uuid {
        let summary = training_service::create_training(
            state,
            TrainingInput {
                date: "2024-01-01".to_string(),
                location: "Riverside".to_string(),
                match_length_min: None,
            },
        )
        .await
        .unwrap();
        training_service::open_training(state, summary.id).await.unwrap();
        summary.id
    }

    async fn checked_in_players(state: &SharedState, count: usize) -> Vec<ParticipantId> {
        let mut ids = Vec::with_capacity(count);
        for index in 0..count {
            let player = roster_service::create_player(
                state,
                PlayerInput {
                    display_name: format!("Player {index}"),
                    full_name: None,
                },
            )
            .await
            .unwrap();
            ledger_service::check_in(state, player.id).await.unwrap();
            ids.push(ParticipantId::Player(player.id));
        }
        ids
    }

    async fn committed_team(state: &SharedState, members: &[ParticipantId]) -> Uuid {
        team_service::start_team(state).await.unwrap();
        for member in members {
            team_service::toggle_member(state, *member).await.unwrap();
        }
        let view = team_service::commit_team(state).await.unwrap();
        view.teams.last().unwrap().id
    }

    async fn two_teams(state: &SharedState) -> (Uuid, Uuid) {
        let players = checked_in_players(state, 4).await;
        let home = committed_team(state, &players[..2]).await;
        let away = committed_team(state, &players[2..]).await;
        (home, away)
    }

    async fn kicked_off(state: &SharedState) -> (Uuid, Uuid) {
        let (home, away) = two_teams(state).await;
        open_setup(state).await.unwrap();
        pick_home(state, home).await.unwrap();
        pick_away(state, away).await.unwrap();
        kick_off(state).await.unwrap();
        (home, away)
    }

    #[tokio::test]
    async fn a_full_match_day_flows_end_to_end() {
        let state = test_state();
        let pitch = pitch_service::create_pitch(
            &state,
            PitchInput {
                name: "Field 1".to_string(),
            },
        )
        .await
        .unwrap();
        let summary = training_service::create_training(
            &state,
            TrainingInput {
                date: "2024-01-01".to_string(),
                location: pitch.name.clone(),
                match_length_min: Some(10),
            },
        )
        .await
        .unwrap();
        training_service::open_training(&state, summary.id).await.unwrap();

        let players = checked_in_players(&state, 4).await;
        team_service::start_team(&state).await.unwrap();
        team_service::toggle_member(&state, players[0]).await.unwrap();
        team_service::toggle_member(&state, players[1]).await.unwrap();
        team_service::set_color(&state, TeamColor::Blue).await.unwrap();
        let home = team_service::commit_team(&state).await.unwrap().teams[0].id;
        team_service::start_team(&state).await.unwrap();
        team_service::toggle_member(&state, players[2]).await.unwrap();
        team_service::toggle_member(&state, players[3]).await.unwrap();
        team_service::set_color(&state, TeamColor::Red).await.unwrap();
        let away = team_service::commit_team(&state).await.unwrap().teams[1].id;

        open_setup(&state).await.unwrap();
        pick_home(&state, home).await.unwrap();
        let view = pick_away(&state, away).await.unwrap();
        assert!(matches!(
            &view.phase,
            PhaseView::Setup {
                can_kick_off: true,
                ..
            }
        ));

        let view = kick_off(&state).await.unwrap();
        match &view.phase {
            PhaseView::Live {
                home,
                clock,
                seconds_left,
                running,
                ..
            } => {
                assert_eq!(home.label, "Blue");
                assert_eq!(clock, "10:00");
                assert_eq!(*seconds_left, 600);
                assert!(!running);
            }
            other => panic!("expected a live match, got {other:?}"),
        }

        adjust_score(&state, Side::Home, 1).await.unwrap();
        adjust_score(&state, Side::Home, 1).await.unwrap();
        let view = adjust_score(&state, Side::Away, 1).await.unwrap();
        match &view.phase {
            PhaseView::Live { home, away, .. } => {
                assert_eq!(home.score, 2);
                assert_eq!(away.score, 1);
            }
            other => panic!("expected a live match, got {other:?}"),
        }

        let view = finish_match(&state).await.unwrap();
        assert!(matches!(&view.phase, PhaseView::Idle { .. }));
        assert_eq!(view.history.len(), 1);
        assert_eq!(view.history[0].home, "Blue");
        assert_eq!(view.history[0].away, "Red");
        assert_eq!(view.history[0].home_score, 2);

        training_service::close_training(&state).await.unwrap();
        training_service::open_training(&state, summary.id).await.unwrap();
        let detail = training_service::current_training(&state).await.unwrap();
        assert_eq!(detail.location, "Field 1");
        let view = scoreboard(&state).await.unwrap();
        assert_eq!(view.history.len(), 1);
        assert_eq!(view.history[0].away_score, 1);
    }

    #[tokio::test]
    async fn setup_requires_two_distinct_teams() {
        let state = test_state();
        open_session(&state).await;
        let players = checked_in_players(&state, 2).await;
        let team = committed_team(&state, &players[..1]).await;

        assert!(matches!(
            open_setup(&state).await,
            Err(ServiceError::InvalidState(_))
        ));

        committed_team(&state, &players[1..]).await;
        open_setup(&state).await.unwrap();
        pick_home(&state, team).await.unwrap();
        assert!(matches!(
            pick_away(&state, team).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn kick_off_needs_both_sides_picked() {
        let state = test_state();
        open_session(&state).await;
        let (home, _) = two_teams(&state).await;

        open_setup(&state).await.unwrap();
        pick_home(&state, home).await.unwrap();
        assert!(matches!(
            kick_off(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn picking_a_team_outside_the_session_fails() {
        let state = test_state();
        open_session(&state).await;
        two_teams(&state).await;

        open_setup(&state).await.unwrap();
        assert!(matches!(
            pick_home(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cancelling_setup_returns_to_idle() {
        let state = test_state();
        open_session(&state).await;
        let (home, _) = two_teams(&state).await;

        open_setup(&state).await.unwrap();
        pick_home(&state, home).await.unwrap();
        let view = cancel_setup(&state).await.unwrap();
        assert!(matches!(
            &view.phase,
            PhaseView::Idle {
                can_open_setup: true
            }
        ));
    }

    #[tokio::test]
    async fn an_expired_clock_needs_more_time_before_restarting() {
        let state = test_state();
        open_session(&state).await;
        kicked_off(&state).await;

        let view = adjust_time(&state, -600).await.unwrap();
        match &view.phase {
            PhaseView::Live {
                seconds_left,
                full_time,
                ..
            } => {
                assert_eq!(*seconds_left, 0);
                assert!(full_time);
            }
            other => panic!("expected a live match, got {other:?}"),
        }
        assert!(matches!(
            toggle_clock(&state).await,
            Err(ServiceError::InvalidState(_))
        ));

        adjust_time(&state, 30).await.unwrap();
        let view = toggle_clock(&state).await.unwrap();
        assert!(matches!(&view.phase, PhaseView::Live { running: true, .. }));
        let view = toggle_clock(&state).await.unwrap();
        assert!(matches!(&view.phase, PhaseView::Live { running: false, .. }));
    }

    #[tokio::test]
    async fn resetting_zeroes_a_started_clock() {
        let state = test_state();
        open_session(&state).await;
        kicked_off(&state).await;

        toggle_clock(&state).await.unwrap();
        let view = reset_clock(&state).await.unwrap();
        match &view.phase {
            PhaseView::Live {
                seconds_left,
                running,
                ..
            } => {
                assert_eq!(*seconds_left, 0);
                assert!(!running);
            }
            other => panic!("expected a live match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn scores_need_a_live_match_and_clamp_at_zero() {
        let state = test_state();
        open_session(&state).await;
        let (home, away) = two_teams(&state).await;

        assert!(matches!(
            adjust_score(&state, Side::Home, 1).await,
            Err(ServiceError::InvalidState(_))
        ));

        open_setup(&state).await.unwrap();
        assert!(matches!(
            adjust_score(&state, Side::Home, 1).await,
            Err(ServiceError::InvalidState(_))
        ));

        pick_home(&state, home).await.unwrap();
        pick_away(&state, away).await.unwrap();
        kick_off(&state).await.unwrap();
        let view = adjust_score(&state, Side::Home, -5).await.unwrap();
        match &view.phase {
            PhaseView::Live { home, .. } => assert_eq!(home.score, 0),
            other => panic!("expected a live match, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn only_one_match_runs_at_a_time() {
        let state = test_state();
        open_session(&state).await;
        kicked_off(&state).await;

        assert!(matches!(
            open_setup(&state).await,
            Err(ServiceError::InvalidState(_))
        ));

        finish_match(&state).await.unwrap();
        open_setup(&state).await.unwrap();
    }

    #[tokio::test]
    async fn finishing_without_a_match_fails() {
        let state = test_state();
        open_session(&state).await;
        two_teams(&state).await;

        assert!(matches!(
            finish_match(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn deleted_teams_leave_unknown_labels_in_history() {
        let state = test_state();
        open_session(&state).await;
        let (home, _) = kicked_off(&state).await;
        finish_match(&state).await.unwrap();

        team_service::delete_team(&state, home).await.unwrap();
        let view = scoreboard(&state).await.unwrap();
        assert_eq!(view.history[0].home, "Unknown");
        assert_eq!(view.history[0].away, "Blue");
    }

    #[tokio::test]
    async fn history_entries_can_be_deleted() {
        let state = test_state();
        open_session(&state).await;
        kicked_off(&state).await;
        let view = finish_match(&state).await.unwrap();
        let match_id = view.history[0].id;

        let view = delete_match(&state, match_id).await.unwrap();
        assert!(view.history.is_empty());
        assert!(matches!(
            delete_match(&state, match_id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn a_live_match_comes_back_paused_at_full_length() {
        let state = test_state();
        let training_id = open_session(&state).await;
        kicked_off(&state).await;
        adjust_time(&state, -300).await.unwrap();
        adjust_score(&state, Side::Home, 1).await.unwrap();

        training_service::close_training(&state).await.unwrap();
        training_service::open_training(&state, training_id).await.unwrap();

        let view = scoreboard(&state).await.unwrap();
        match &view.phase {
            PhaseView::Live {
                home,
                seconds_left,
                running,
                ..
            } => {
                assert_eq!(home.score, 1);
                assert_eq!(*seconds_left, 600);
                assert!(!running);
            }
            other => panic!("expected a live match, got {other:?}"),
        }
        assert!(view.history.is_empty());
    }
}
