use std::time::Duration;

use tracing::{debug, info};

use crate::state::{SharedState, match_engine::MatchEvent};

/// Start the one-second countdown driver, replacing any driver already
/// running. The driver stops on its own when the session closes, the match
/// leaves the running phase, or the clock reaches zero.
pub(crate) async fn spawn_clock(state: &SharedState) {
    let mut slot = state.clock().lock().await;
    if let Some(handle) = slot.take() {
        handle.abort();
    }

    let shared = state.clone();
    *slot = Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first interval tick resolves immediately; swallow it so the
        // countdown moves one second per elapsed second.
        interval.tick().await;
        loop {
            interval.tick().await;
            let mut slot = shared.session().write().await;
            let Some(training) = slot.as_mut() else {
                break;
            };
            if !training.engine.is_running() {
                break;
            }
            if training.engine.apply(MatchEvent::Tick).is_err() {
                break;
            }
            let seconds_left = training
                .engine
                .live()
                .map(|live| live.time_left)
                .unwrap_or_default();
            debug!(seconds_left, "clock tick");
            if !training.engine.is_running() {
                info!("full time");
                break;
            }
        }
    }));
}

/// Stop the countdown driver, if one is running.
pub(crate) async fn cancel_clock(state: &SharedState) {
    if let Some(handle) = state.clock().lock().await.take() {
        handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::date;
    use tokio::task::yield_now;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::memory::MemoryStore,
        state::{AppState, match_engine::MatchPhase, session::Training},
    };

    /// Route tick logs through the test writer so failures show the countdown.
    fn init_tracing() {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "kickabout=debug".into());
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init()
            .ok();
    }

    async fn state_with_running_match(seconds: u32) -> SharedState {
        init_tracing();
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()));
        let mut training = Training::new(date!(2024 - 01 - 01), "Riverside".to_string(), 10);
        training.engine.apply(MatchEvent::OpenSetup).unwrap();
        training
            .engine
            .apply(MatchEvent::PickHome(Uuid::new_v4()))
            .unwrap();
        training
            .engine
            .apply(MatchEvent::PickAway(Uuid::new_v4()))
            .unwrap();
        training
            .engine
            .apply(MatchEvent::KickOff { length_secs: seconds })
            .unwrap();
        training.engine.apply(MatchEvent::StartClock).unwrap();
        *state.session().write().await = Some(training);
        state
    }

    async fn seconds_left(state: &SharedState) -> u32 {
        state
            .session()
            .read()
            .await
            .as_ref()
            .and_then(|training| training.engine.live())
            .map(|live| live.time_left)
            .unwrap_or_default()
    }

    async fn advance_one_second() {
        for _ in 0..4 {
            yield_now().await;
        }
        tokio::time::advance(Duration::from_secs(1)).await;
        for _ in 0..4 {
            yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn the_clock_counts_down_once_per_second() {
        let state = state_with_running_match(5).await;
        spawn_clock(&state).await;

        advance_one_second().await;
        assert_eq!(seconds_left(&state).await, 4);
        advance_one_second().await;
        advance_one_second().await;
        assert_eq!(seconds_left(&state).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn the_clock_pauses_itself_at_zero() {
        let state = state_with_running_match(2).await;
        spawn_clock(&state).await;

        advance_one_second().await;
        advance_one_second().await;
        advance_one_second().await;

        assert_eq!(seconds_left(&state).await, 0);
        let slot = state.session().read().await;
        let phase = slot.as_ref().unwrap().engine.phase();
        assert!(matches!(phase, MatchPhase::Paused(live) if live.time_left == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_stops_the_countdown() {
        let state = state_with_running_match(10).await;
        spawn_clock(&state).await;
        advance_one_second().await;
        cancel_clock(&state).await;

        advance_one_second().await;
        advance_one_second().await;
        assert_eq!(seconds_left(&state).await, 9);
    }

    #[tokio::test(start_paused = true)]
    async fn respawning_replaces_the_previous_driver() {
        let state = state_with_running_match(10).await;
        spawn_clock(&state).await;
        spawn_clock(&state).await;

        advance_one_second().await;
        assert_eq!(seconds_left(&state).await, 9);
    }
}
