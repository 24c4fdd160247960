use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::PlayerEntity,
    dto::participant_label,
    state::session::{ParticipantId, Training},
};

/// Payload for checking in an ad-hoc guest.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GuestInput {
    /// Name the guest goes by for this session.
    #[validate(length(min = 1, max = 64))]
    pub name: String,
}

/// One checked-in participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantView {
    /// Participant identity.
    pub id: ParticipantId,
    /// Display label, with a guest marker where applicable.
    pub name: String,
    /// Whether this participant is a guest.
    pub is_guest: bool,
    /// Whether the underlying roster player is archived.
    pub is_archived: bool,
}

/// Roster player offered for check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInCandidateView {
    /// Player id.
    pub id: Uuid,
    /// Name shown on the check-in list.
    pub display_name: String,
    /// Whether the player is archived.
    pub is_archived: bool,
}

/// Check-in ledger of the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerView {
    /// Checked-in participants, in check-in order.
    pub participants: Vec<ParticipantView>,
    /// Roster players not yet checked in, active players first.
    pub available: Vec<CheckInCandidateView>,
}

impl From<(&Training, &[PlayerEntity])> for LedgerView {
    fn from((training, roster): (&Training, &[PlayerEntity])) -> Self {
        let participants = training
            .participants
            .keys()
            .map(|id| ParticipantView {
                id: *id,
                name: participant_label(training, id),
                is_guest: id.is_guest(),
                is_archived: id
                    .as_player()
                    .and_then(|player_id| roster.iter().find(|player| player.id == player_id))
                    .is_some_and(|player| player.is_archived),
            })
            .collect();

        let mut available: Vec<CheckInCandidateView> = roster
            .iter()
            .filter(|player| {
                !training
                    .participants
                    .contains_key(&ParticipantId::Player(player.id))
            })
            .map(|player| CheckInCandidateView {
                id: player.id,
                display_name: player.display_name.clone(),
                is_archived: player.is_archived,
            })
            .collect();
        available
            .sort_by_key(|candidate| (candidate.is_archived, candidate.display_name.to_lowercase()));

        Self {
            participants,
            available,
        }
    }
}
