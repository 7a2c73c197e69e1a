//! Discovery record types.

use serde::{Deserialize, Serialize};

/// A tournament discovered from the listing site. Persisted identity is
/// the external `event_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub event_id: String,
    pub name: String,
    pub state: Option<String>,
}

/// One age/gender group schedule URL within a tournament. Persisted
/// identity is the (event_id, group_id) pair.
#[derive(Debug, Clone, Serialize)]
pub struct GroupTarget {
    pub event_id: String,
    pub group_id: String,
    pub url: String,
    pub division_name: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
}

/// Config entry for a major tournament that may not show up in the
/// paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownTournament {
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl From<&KnownTournament> for Tournament {
    fn from(known: &KnownTournament) -> Self {
        Tournament {
            event_id: known.event_id.clone(),
            name: known.name.clone(),
            state: known.state.clone(),
        }
    }
}
