/// Participant check-in and removal for the open session.
pub mod ledger_service;
/// Countdown driver for the active match clock.
pub(crate) mod match_clock;
/// Active match lifecycle, scores, and match history.
pub mod match_service;
/// Pitch reference list management.
pub mod pitch_service;
/// Roster player management and bulk import.
pub mod roster_service;
/// Team drafts and committed team management.
pub mod team_service;
/// Training session lifecycle and the open-session slot.
pub mod training_service;
