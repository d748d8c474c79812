use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::{
    queue::WaitingQueue,
    rotation::{GameError, StreakState},
};

/// Opaque player identifier, unique within a single game.
pub type PlayerId = String;

/// One of the two sides of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Red side.
    Red,
    /// Blue side.
    Blue,
}

impl Team {
    /// The team on the other side of the table.
    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Lowercase token used on the wire and in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `red` or `blue`, case-insensitive, surrounding whitespace ignored.
impl FromStr for Team {
    type Err = GameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Team::Red),
            "blue" => Ok(Team::Blue),
            _ => Err(GameError::InvalidTeam(value.to_string())),
        }
    }
}

/// Players currently holding the two rods of a team.
///
/// A field is empty only after the player was removed from the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamSlot {
    /// Player on the attacking rods.
    pub forward: PlayerId,
    /// Player in goal.
    pub goalkeeper: PlayerId,
}

impl TeamSlot {
    /// Slot seating `forward` and `goalkeeper`.
    pub fn new(forward: impl Into<PlayerId>, goalkeeper: impl Into<PlayerId>) -> Self {
        Self {
            forward: forward.into(),
            goalkeeper: goalkeeper.into(),
        }
    }

    /// Unordered composition of the slot.
    pub fn pair(&self) -> Pair {
        Pair::new(self.forward.clone(), self.goalkeeper.clone())
    }
}

/// Unordered pair of players; `{a, b}` equals `{b, a}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair([PlayerId; 2]);

impl Pair {
    /// Pair of `first` and `second`, in either order.
    pub fn new(first: PlayerId, second: PlayerId) -> Self {
        if first <= second {
            Self([first, second])
        } else {
            Self([second, first])
        }
    }

    /// Both players, sorted.
    pub fn players(&self) -> &[PlayerId; 2] {
        &self.0
    }

    /// Both players, sorted, as an owned list.
    pub fn into_players(self) -> Vec<PlayerId> {
        self.0.into()
    }
}

/// Goals scored by each team since the game started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Score {
    /// Goals scored by red.
    pub red: u32,
    /// Goals scored by blue.
    pub blue: u32,
}

impl Score {
    /// Count one goal for `team`.
    pub fn increment(&mut self, team: Team) {
        match team {
            Team::Red => self.red += 1,
            Team::Blue => self.blue += 1,
        }
    }
}

/// Immutable copy of every mutable game field, captured before a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Red line-up.
    pub red: TeamSlot,
    /// Blue line-up.
    pub blue: TeamSlot,
    /// Waiting queue, front first.
    pub waiting: Vec<PlayerId>,
    /// Score at capture time.
    pub score: Score,
    /// Started flag at capture time.
    pub started: bool,
    /// Streak tracking at capture time.
    pub streak: Option<StreakState>,
}

impl Snapshot {
    /// Line-up of `team` at capture time.
    pub fn team(&self, team: Team) -> &TeamSlot {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }
}

/// Live state of a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) red: TeamSlot,
    pub(crate) blue: TeamSlot,
    pub(crate) waiting: WaitingQueue,
    pub(crate) score: Score,
    pub(crate) started: bool,
    pub(crate) streak: Option<StreakState>,
    pub(crate) history: Vec<Snapshot>,
    queue_capacity: usize,
}

impl GameState {
    /// Build a started game after checking that no identifier is empty or
    /// appears twice across the slots and the waiting queue.
    ///
    /// Identifiers are trimmed before validation.
    pub fn new(
        red: TeamSlot,
        blue: TeamSlot,
        waiting: Vec<PlayerId>,
        queue_capacity: usize,
    ) -> Result<Self, GameError> {
        let red = TeamSlot::new(red.forward.trim(), red.goalkeeper.trim());
        let blue = TeamSlot::new(blue.forward.trim(), blue.goalkeeper.trim());
        let waiting = waiting
            .into_iter()
            .map(|player| player.trim().to_string())
            .collect::<Vec<_>>();

        let active = [
            ("red.forward", &red.forward),
            ("red.goalkeeper", &red.goalkeeper),
            ("blue.forward", &blue.forward),
            ("blue.goalkeeper", &blue.goalkeeper),
        ];
        for (slot, player) in active {
            if player.is_empty() {
                return Err(GameError::EmptySlot(slot.into()));
            }
        }
        if waiting.iter().any(String::is_empty) {
            return Err(GameError::EmptySlot("waiting".into()));
        }

        let mut seen = HashSet::new();
        let everyone = active.iter().map(|(_, player)| *player).chain(waiting.iter());
        for player in everyone {
            if !seen.insert(player.as_str()) {
                return Err(GameError::DuplicateId(player.clone()));
            }
        }

        Ok(Self {
            waiting: WaitingQueue::from_players(waiting, queue_capacity),
            red,
            blue,
            score: Score::default(),
            started: true,
            streak: None,
            history: Vec::new(),
            queue_capacity,
        })
    }

    /// Red line-up.
    pub fn red(&self) -> &TeamSlot {
        &self.red
    }

    /// Blue line-up.
    pub fn blue(&self) -> &TeamSlot {
        &self.blue
    }

    /// Line-up of `team`.
    pub fn team(&self, team: Team) -> &TeamSlot {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub(crate) fn team_mut(&mut self, team: Team) -> &mut TeamSlot {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }

    /// Players waiting for a seat.
    pub fn waiting(&self) -> &WaitingQueue {
        &self.waiting
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.score
    }

    /// Whether goals are accepted.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Winning streak being tracked for full-rotation detection, if any.
    pub fn streak(&self) -> Option<&StreakState> {
        self.streak.as_ref()
    }

    /// Number of undoable operations recorded so far.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True when `player` holds a rod or waits in the queue.
    pub fn contains_player(&self, player: &str) -> bool {
        self.active_players().any(|active| active == player) || self.waiting.contains(player)
    }

    /// Every non-empty identifier in the game, active slots first.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.active_players()
            .filter(|player| !player.is_empty())
            .chain(self.waiting.iter())
            .cloned()
            .collect()
    }

    fn active_players(&self) -> impl Iterator<Item = &PlayerId> {
        [
            &self.red.forward,
            &self.red.goalkeeper,
            &self.blue.forward,
            &self.blue.goalkeeper,
        ]
        .into_iter()
    }

    /// Capture the mutable fields without touching the history.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            red: self.red.clone(),
            blue: self.blue.clone(),
            waiting: self.waiting.snapshot(),
            score: self.score,
            started: self.started,
            streak: self.streak.clone(),
        }
    }

    /// Push a snapshot of the current state onto the undo stack and return it.
    pub(crate) fn checkpoint(&mut self) -> Snapshot {
        let snapshot = self.snapshot();
        self.history.push(snapshot.clone());
        snapshot
    }

    /// Replace every mutable field with the content of `snapshot`.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot {
            red,
            blue,
            waiting,
            score,
            started,
            streak,
        } = snapshot;
        self.red = red;
        self.blue = blue;
        self.waiting = WaitingQueue::from_players(waiting, self.queue_capacity);
        self.score = score;
        self.started = started;
        self.streak = streak;
    }
}
