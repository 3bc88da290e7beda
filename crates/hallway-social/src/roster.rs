//! Roster presentation: display names, initials and ordering.

use serde::Serialize;

use crate::participant::{Participant, ParticipantId, Position, Snapshot};

/// One row of the participant list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub id: ParticipantId,
    pub name: String,
    pub initials: String,
    pub online: bool,
    pub position: Position,
}

/// Name to show for a participant: display name, then email, then id.
pub fn display_name(participant: &Participant) -> &str {
    let name = participant.display_name.trim();
    if !name.is_empty() {
        return name;
    }
    match participant.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email,
        _ => participant.id.as_str(),
    }
}

/// Up to two uppercase initials from the first two words of `name`.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Online participants first, then alphabetical by shown name.
pub fn sorted_roster(snapshot: &Snapshot) -> Vec<RosterEntry> {
    let mut entries: Vec<RosterEntry> = snapshot
        .participants()
        .iter()
        .map(|p| {
            let name = display_name(p).to_string();
            RosterEntry {
                id: p.id.clone(),
                initials: initials(&name),
                name,
                online: p.online,
                position: p.position,
            }
        })
        .collect();
    entries.sort_by(|a, b| {
        b.online
            .cmp(&a.online)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}
