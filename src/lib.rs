//! Roster, team, and live-match management engine for informal sports
//! sessions.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;
