use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::PlayerEntity,
    dto::roster::{ImportReport, PlayerFilter, PlayerInput, PlayerView},
    error::ServiceError,
    state::SharedState,
};

/// List roster players, filtered and sorted by display name.
pub async fn list_players(
    state: &SharedState,
    filter: PlayerFilter,
) -> Result<Vec<PlayerView>, ServiceError> {
    let mut players = state.store().load_players().await?;
    if !filter.include_archived {
        players.retain(|player| !player.is_archived);
    }
    if let Some(needle) = normalized_search(filter.search.as_deref()) {
        players.retain(|player| {
            player.display_name.to_lowercase().contains(&needle)
                || player.full_name.to_lowercase().contains(&needle)
        });
    }
    players.sort_by_key(|player| player.display_name.to_lowercase());
    Ok(players.into_iter().map(Into::into).collect())
}

/// Add a player to the roster.
pub async fn create_player(
    state: &SharedState,
    input: PlayerInput,
) -> Result<PlayerView, ServiceError> {
    input.validate()?;
    let (display_name, full_name) = normalized_names(&input)?;

    let mut players = state.store().load_players().await?;
    ensure_name_free(&players, &display_name, None)?;

    let player = PlayerEntity {
        id: Uuid::new_v4(),
        display_name,
        full_name,
        is_archived: false,
    };
    players.push(player.clone());
    state.store().save_players(players).await?;

    info!(player_id = %player.id, "added roster player");
    Ok(player.into())
}

/// Rename a player or change their full name.
pub async fn update_player(
    state: &SharedState,
    player_id: Uuid,
    input: PlayerInput,
) -> Result<PlayerView, ServiceError> {
    input.validate()?;
    let (display_name, full_name) = normalized_names(&input)?;

    let mut players = state.store().load_players().await?;
    ensure_name_free(&players, &display_name, Some(player_id))?;

    let Some(player) = players.iter_mut().find(|player| player.id == player_id) else {
        return Err(unknown_player(player_id));
    };
    player.display_name = display_name;
    player.full_name = full_name;
    let view = PlayerView::from(player.clone());

    state.store().save_players(players).await?;
    Ok(view)
}

/// Flip the archived flag on a player. Archived players disappear from the
/// default listing but stay referenced by past sessions.
pub async fn toggle_archived(
    state: &SharedState,
    player_id: Uuid,
) -> Result<PlayerView, ServiceError> {
    let mut players = state.store().load_players().await?;
    let Some(player) = players.iter_mut().find(|player| player.id == player_id) else {
        return Err(unknown_player(player_id));
    };
    player.is_archived = !player.is_archived;
    let view = PlayerView::from(player.clone());

    state.store().save_players(players).await?;
    debug!(player_id = %player_id, archived = view.is_archived, "toggled player archive flag");
    Ok(view)
}

/// Remove a player from the roster entirely. Sessions that reference them
/// keep the name frozen at check-in time.
pub async fn delete_player(state: &SharedState, player_id: Uuid) -> Result<(), ServiceError> {
    let mut players = state.store().load_players().await?;
    let before = players.len();
    players.retain(|player| player.id != player_id);
    if players.len() == before {
        return Err(unknown_player(player_id));
    }
    state.store().save_players(players).await?;
    info!(player_id = %player_id, "removed roster player");
    Ok(())
}

/// Bulk-import players from `display name, full name` lines. Lines with a
/// blank display name, or a name already taken in the roster or earlier in
/// the batch, are skipped.
pub async fn import_players(state: &SharedState, text: &str) -> Result<ImportReport, ServiceError> {
    let mut players = state.store().load_players().await?;
    let mut taken: HashSet<String> = players
        .iter()
        .map(|player| player.display_name.to_lowercase())
        .collect();

    let mut imported = 0;
    let mut skipped = 0;
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let display_name = parts.first().copied().unwrap_or("");
        let full_name = parts.get(1).copied().unwrap_or("");
        if display_name.is_empty() || !taken.insert(display_name.to_lowercase()) {
            skipped += 1;
            continue;
        }
        players.push(PlayerEntity {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            full_name: full_name.to_string(),
            is_archived: false,
        });
        imported += 1;
    }

    if imported > 0 {
        state.store().save_players(players).await?;
    }
    info!(imported, skipped, "imported roster players");
    Ok(ImportReport { imported, skipped })
}

fn normalized_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|needle| !needle.is_empty())
        .map(str::to_lowercase)
}

fn normalized_names(input: &PlayerInput) -> Result<(String, String), ServiceError> {
    let display_name = input.display_name.trim().to_string();
    if display_name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "display name must not be blank".into(),
        ));
    }
    let full_name = input
        .full_name
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_string();
    Ok((display_name, full_name))
}

fn ensure_name_free(
    players: &[PlayerEntity],
    display_name: &str,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let needle = display_name.to_lowercase();
    let clash = players
        .iter()
        .any(|player| Some(player.id) != exclude && player.display_name.to_lowercase() == needle);
    if clash {
        return Err(ServiceError::InvalidInput(format!(
            "a player named `{display_name}` already exists"
        )));
    }
    Ok(())
}

fn unknown_player(player_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("player `{player_id}` does not exist"))
}
