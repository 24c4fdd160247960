use serde::Serialize;
use uuid::Uuid;

use crate::{
    dto::participant_label,
    state::session::{ParticipantId, TeamColor, Training},
};

/// Committed team projection with resolved member names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamView {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Color identifying the team.
    pub color: TeamColor,
    /// Human readable color label.
    pub label: String,
    /// Resolved members, in the order they were added.
    pub members: Vec<TeamMemberView>,
}

/// Resolved team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMemberView {
    /// Participant identity.
    pub id: ParticipantId,
    /// Display label.
    pub name: String,
}

/// Selection row offered while building a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberChoiceView {
    /// Participant identity.
    pub id: ParticipantId,
    /// Display label.
    pub name: String,
    /// Whether the participant is currently part of the draft.
    pub selected: bool,
    /// Whether the participant is committed to a different team and cannot
    /// be selected.
    pub assigned_elsewhere: bool,
}

/// Open draft projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftView {
    /// Id of the team being edited, when editing.
    pub editing: Option<Uuid>,
    /// Color currently chosen.
    pub color: TeamColor,
    /// Colors still selectable for this draft.
    pub available_colors: Vec<TeamColor>,
    /// Every checked-in participant with their selection status, selectable
    /// participants first.
    pub choices: Vec<MemberChoiceView>,
}

/// Teams tab projection of the open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamBoardView {
    /// Committed teams, in creation order.
    pub teams: Vec<TeamView>,
    /// The draft, when a team is being created or edited.
    pub draft: Option<DraftView>,
    /// Whether a new team can currently be started.
    pub can_create: bool,
}

impl From<&Training> for TeamBoardView {
    fn from(training: &Training) -> Self {
        let teams = training
            .teams
            .iter()
            .map(|(id, team)| TeamView {
                id: *id,
                color: team.color,
                label: team.color.label().to_string(),
                members: team
                    .members
                    .iter()
                    .map(|member| TeamMemberView {
                        id: *member,
                        name: participant_label(training, member),
                    })
                    .collect(),
            })
            .collect();

        let draft = training.draft.as_ref().map(|draft| {
            let mut choices: Vec<MemberChoiceView> = training
                .participants
                .keys()
                .map(|id| MemberChoiceView {
                    id: *id,
                    name: participant_label(training, id),
                    selected: draft.members.contains(id),
                    assigned_elsewhere: training
                        .team_of(id)
                        .is_some_and(|owner| Some(owner) != draft.editing),
                })
                .collect();
            choices.sort_by_key(|choice| (choice.assigned_elsewhere, choice.name.to_lowercase()));

            let available_colors = TeamColor::ALL
                .into_iter()
                .filter(|color| {
                    training
                        .teams
                        .iter()
                        .all(|(id, team)| team.color != *color || Some(*id) == draft.editing)
                })
                .collect();

            DraftView {
                editing: draft.editing,
                color: draft.color,
                available_colors,
                choices,
            }
        });

        let has_unassigned = training
            .participants
            .keys()
            .any(|id| training.team_of(id).is_none());
        let can_create = TeamColor::first_free(&training.used_colors()).is_some() && has_unassigned;

        Self {
            teams,
            draft,
            can_create,
        }
    }
}
