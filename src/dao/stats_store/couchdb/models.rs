use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{GoalEventEntity, PlayerEntity};

/// Document id prefix of player records.
pub const PLAYER_PREFIX: &str = "player::";
/// Document id prefix of goal events.
pub const GOAL_PREFIX: &str = "goal::";
/// Upper bound appended to a prefix to close an `_all_docs` key range.
pub const END_SUFFIX: &str = "\u{ffff}";

/// Body of an `_all_docs?include_docs=true` response.
#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

/// One row of [`AllDocsResponse`]; `doc` is absent for deleted documents.
#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Player record wrapped with its CouchDB `_id` and `_rev`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchPlayerDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub player: PlayerEntity,
}

impl CouchPlayerDocument {
    /// New document for `player`, without a revision.
    pub fn from_entity(player: PlayerEntity) -> Self {
        Self {
            id: player_doc_id(&player.name),
            rev: None,
            player,
        }
    }

    /// Drop the CouchDB metadata.
    pub fn into_entity(self) -> PlayerEntity {
        self.player
    }
}

/// Goal events are keyed by game, then by their fixed-width timestamp, so
/// `_all_docs` returns each game's goals in the order they were scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGoalDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub event: GoalEventEntity,
}

impl CouchGoalDocument {
    /// New document for `event`, without a revision.
    pub fn from_entity(event: GoalEventEntity) -> Self {
        Self {
            id: goal_doc_id(&event),
            rev: None,
            event,
        }
    }
}

/// Document id of the player named `name`.
pub fn player_doc_id(name: &str) -> String {
    format!("{PLAYER_PREFIX}{name}")
}

/// Document id of a goal event: game, timestamp, then event id.
pub fn goal_doc_id(event: &GoalEventEntity) -> String {
    format!(
        "{GOAL_PREFIX}{}::{}::{}",
        event.game_id, event.recorded_at, event.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_document_flattens_entity() {
        let mut player = PlayerEntity::new("ann");
        player.wins = 3;
        let doc = CouchPlayerDocument::from_entity(player);

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["_id"], "player::ann");
        assert_eq!(json["wins"], 3);
        assert!(json.get("_rev").is_none());

        let mut stored = json;
        stored["_rev"] = "1-abc".into();
        let parsed: CouchPlayerDocument = serde_json::from_value(stored).unwrap();
        assert_eq!(parsed.rev.as_deref(), Some("1-abc"));
        assert_eq!(parsed.into_entity().wins, 3);
    }

    #[test]
    fn player_ids_sort_inside_prefix_range() {
        let id = player_doc_id("zoe");
        assert!(id.as_str() > PLAYER_PREFIX);
        assert!(id.as_str() < format!("{PLAYER_PREFIX}{END_SUFFIX}").as_str());
        assert!(!id.starts_with(GOAL_PREFIX));
    }
}
