use std::{cmp::Ordering, collections::HashSet, time::SystemTime};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, macros::format_description};
use uuid::Uuid;

use crate::state::{game::Team, rotation::GoalOutcome};

/// Persisted player record with its lifetime counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Unique player name, also used as identifier inside games.
    pub name: String,
    /// Goals scored by a team this player was part of.
    pub wins: u64,
    /// Goals after which the player was still at the table.
    pub survives: u64,
    /// RFC 3339 timestamp of the last time the player was seen in a game.
    pub last_seen: String,
    /// Last goal event credited to this player; a replay of it is ignored.
    #[serde(default)]
    pub last_goal_event: Option<Uuid>,
}

impl PlayerEntity {
    /// Fresh record with zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wins: 0,
            survives: 0,
            last_seen: now_rfc3339(),
            last_goal_event: None,
        }
    }

    /// Apply the win/survive credit of `event` unless it was already applied.
    ///
    /// Goal events reach the store strictly in order, so remembering the last
    /// one is enough to make a retried write count once.
    pub fn credit_goal(&mut self, event: &GoalEventEntity) -> bool {
        if self.last_goal_event == Some(event.id) {
            return false;
        }

        if event.winners().contains(&self.name) {
            self.wins += 1;
        }
        if event.survivors().contains(&self.name) {
            self.survives += 1;
        }
        self.last_goal_event = Some(event.id);
        true
    }
}

/// One goal as recorded in the stats store.
///
/// The four role fields hold the line-up *before* the rotation; the rotation
/// fields describe how the losing team changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalEventEntity {
    /// Stable identifier so a retried write can be recognised.
    pub id: Uuid,
    /// Game the goal was scored in.
    pub game_id: String,
    /// Team that scored.
    pub scoring_team: Team,
    /// Red forward before the rotation.
    pub red_forward: String,
    /// Red goalkeeper before the rotation.
    pub red_goalkeeper: String,
    /// Blue forward before the rotation.
    pub blue_forward: String,
    /// Blue goalkeeper before the rotation.
    pub blue_goalkeeper: String,
    /// Losing goalkeeper sent to the queue.
    pub benched: String,
    /// Losing forward now in goal.
    pub moved_to_goalkeeper: String,
    /// Player who left the queue for the forward position.
    pub new_forward: String,
    /// Whether this goal completed a full rotation.
    pub full_rotation: bool,
    /// UTC timestamp with nanosecond precision, stamped while the game was locked.
    pub recorded_at: String,
}

impl GoalEventEntity {
    /// Build the record for a goal applied to `game_id`.
    pub fn from_outcome(game_id: &str, outcome: &GoalOutcome) -> Self {
        let before = &outcome.before;
        Self {
            id: Uuid::new_v4(),
            game_id: game_id.to_string(),
            scoring_team: outcome.scoring_team,
            red_forward: before.red.forward.clone(),
            red_goalkeeper: before.red.goalkeeper.clone(),
            blue_forward: before.blue.forward.clone(),
            blue_goalkeeper: before.blue.goalkeeper.clone(),
            benched: outcome.rotation.benched.clone(),
            moved_to_goalkeeper: outcome.rotation.moved_to_goalkeeper.clone(),
            new_forward: outcome.rotation.new_forward.clone(),
            full_rotation: outcome.full_rotation.is_some(),
            recorded_at: now_rfc3339(),
        }
    }

    /// Both players of the scoring team.
    pub fn winners(&self) -> Vec<String> {
        match self.scoring_team {
            Team::Red => unique_names([&self.red_forward, &self.red_goalkeeper]),
            Team::Blue => unique_names([&self.blue_forward, &self.blue_goalkeeper]),
        }
    }

    /// The scoring pair plus the losing forward who dropped back to goal.
    pub fn survivors(&self) -> Vec<String> {
        match self.scoring_team {
            Team::Red => unique_names([
                &self.red_forward,
                &self.red_goalkeeper,
                &self.blue_forward,
            ]),
            Team::Blue => unique_names([
                &self.blue_forward,
                &self.blue_goalkeeper,
                &self.red_forward,
            ]),
        }
    }

    /// Every player mentioned by the event.
    pub fn players(&self) -> Vec<String> {
        unique_names([
            &self.red_forward,
            &self.red_goalkeeper,
            &self.blue_forward,
            &self.blue_goalkeeper,
            &self.benched,
            &self.moved_to_goalkeeper,
            &self.new_forward,
        ])
    }
}

/// Trim, drop blanks and deduplicate while keeping first-seen order.
pub fn unique_names<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Filter players whose name contains `query` (case-insensitive) and order
/// them by wins, then survives, then name.
pub fn rank_players(
    players: impl IntoIterator<Item = PlayerEntity>,
    query: &str,
    limit: usize,
) -> Vec<PlayerEntity> {
    let needle = query.trim().to_lowercase();
    let mut matches = players
        .into_iter()
        .filter(|player| needle.is_empty() || player.name.to_lowercase().contains(&needle))
        .collect::<Vec<_>>();
    matches.sort_by(leaderboard_order);
    matches.truncate(limit);
    matches
}

fn leaderboard_order(left: &PlayerEntity, right: &PlayerEntity) -> Ordering {
    right
        .wins
        .cmp(&left.wins)
        .then_with(|| right.survives.cmp(&left.survives))
        .then_with(|| left.name.cmp(&right.name))
}

pub(crate) fn now_rfc3339() -> String {
    format_system_time(SystemTime::now())
}

/// RFC 3339 in UTC with a fixed nine-digit fraction, so timestamps sort as strings.
fn format_system_time(time: SystemTime) -> String {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9]Z"
    );
    OffsetDateTime::from(time)
        .format(&format)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
