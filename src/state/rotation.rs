//! Goal handling and the other undoable operations applied to a locked game.
//!
//! When a team scores, the losing side rotates: its goalkeeper leaves the
//! table for the back of the waiting queue, its forward drops back to goal and
//! the head of the queue steps in as the new forward. Every operation here
//! pushes a [`Snapshot`] before mutating so [`GameState::undo`] can restore
//! the exact previous state.

use thiserror::Error;

use crate::state::game::{GameState, Pair, PlayerId, Snapshot, Team};

/// Failures of game operations. None of them leaves a side effect behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// An identifier was empty where a player is required.
    #[error("empty player id in {0}")]
    EmptySlot(String),
    /// The identifier is already present somewhere in the game.
    #[error("duplicate player id `{0}`")]
    DuplicateId(PlayerId),
    /// The team token was neither `red` nor `blue`.
    #[error("team must be 'red' or 'blue' (got `{0}`)")]
    InvalidTeam(String),
    /// Goals are only accepted once the game started.
    #[error("game not started")]
    NotStarted,
    /// Nobody is waiting, so the losing team cannot rotate.
    #[error("waiting queue empty; cannot rotate losing team")]
    QueueEmpty,
    /// The undo stack is empty.
    #[error("no actions to undo")]
    NoHistory,
    /// The player is neither seated nor waiting.
    #[error("player `{0}` not found in game")]
    PlayerNotFound(PlayerId),
    /// No game is registered under this identifier.
    #[error("game `{0}` not found")]
    GameNotFound(String),
}

/// Winning streak tracked to detect full rotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakState {
    /// Team on the winning streak.
    pub team: Team,
    /// Players defending the streak.
    pub pair: Pair,
    /// Opposing composition when the streak started.
    pub baseline: Pair,
}

/// Who moved where during a rotation of the losing team.
///
/// `benched` was the goalkeeper and `moved_to_goalkeeper` the forward before
/// the goal; stats recording relies on that mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSummary {
    /// Losing goalkeeper, now at the back of the queue.
    pub benched: PlayerId,
    /// Losing forward, now in goal.
    pub moved_to_goalkeeper: PlayerId,
    /// Former head of the queue, now forward.
    pub new_forward: PlayerId,
}

/// The winning pair faced opponents until the streak's starting composition came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRotationEvent {
    /// Team that completed the rotation.
    pub team: Team,
    /// The two players of that team, sorted.
    pub players: Vec<PlayerId>,
}

/// Result of a successful goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalOutcome {
    /// Team that scored.
    pub scoring_team: Team,
    /// State right before the goal, identical to the pushed undo entry.
    pub before: Snapshot,
    /// How the losing team rotated.
    pub rotation: RotationSummary,
    /// Set when this goal completed a full rotation.
    pub full_rotation: Option<FullRotationEvent>,
}

impl GameState {
    /// Record a goal for `scoring_team` and rotate the losing side.
    pub fn apply_goal(&mut self, scoring_team: Team) -> Result<GoalOutcome, GameError> {
        if !self.started {
            return Err(GameError::NotStarted);
        }
        if self.waiting.is_empty() {
            return Err(GameError::QueueEmpty);
        }

        let losing_team = scoring_team.opponent();
        let before = self.checkpoint();

        let benched = self.team(losing_team).goalkeeper.clone();
        self.waiting.enqueue(benched.clone());
        let moved_to_goalkeeper = self.team(losing_team).forward.clone();
        // non-empty: the benched player was just enqueued
        let new_forward = self.waiting.dequeue().unwrap_or_default();

        let loser = self.team_mut(losing_team);
        loser.goalkeeper = moved_to_goalkeeper.clone();
        loser.forward = new_forward.clone();

        self.score.increment(scoring_team);

        let full_rotation = self.track_streak(scoring_team, before.team(losing_team).pair());

        Ok(GoalOutcome {
            scoring_team,
            before,
            rotation: RotationSummary {
                benched,
                moved_to_goalkeeper,
                new_forward,
            },
            full_rotation,
        })
    }

    /// Add a player at the back of the waiting queue.
    pub fn enqueue(&mut self, player: &str) -> Result<(), GameError> {
        let player = player.trim();
        if player.is_empty() {
            return Err(GameError::EmptySlot("waiting".into()));
        }
        if self.contains_player(player) {
            return Err(GameError::DuplicateId(player.into()));
        }

        self.checkpoint();
        self.waiting.enqueue(player.into());
        Ok(())
    }

    /// Remove a player, looking in the waiting queue first and then in the
    /// red forward, red goalkeeper, blue forward and blue goalkeeper slots.
    ///
    /// A seated player leaves an empty slot behind.
    pub fn remove_player(&mut self, player: &str) -> Result<(), GameError> {
        let player = player.trim();
        if player.is_empty() || !self.contains_player(player) {
            return Err(GameError::PlayerNotFound(player.into()));
        }

        self.checkpoint();
        if self.waiting.remove_value(player) {
            return Ok(());
        }

        for team in [Team::Red, Team::Blue] {
            let slot = self.team_mut(team);
            if slot.forward == player {
                slot.forward.clear();
                return Ok(());
            }
            if slot.goalkeeper == player {
                slot.goalkeeper.clear();
                return Ok(());
            }
        }

        // contains_player guaranteed a match above
        self.history.pop();
        Err(GameError::PlayerNotFound(player.into()))
    }

    /// Restore the state captured before the latest mutation.
    ///
    /// Undo itself is not recorded, so there is no redo.
    pub fn undo(&mut self) -> Result<(), GameError> {
        let snapshot = self.history.pop().ok_or(GameError::NoHistory)?;
        self.restore(snapshot);
        Ok(())
    }

    /// Update the streak after a rotation and report a full rotation when the
    /// opponents are back to the composition recorded at streak start.
    fn track_streak(
        &mut self,
        scoring_team: Team,
        opponents_before: Pair,
    ) -> Option<FullRotationEvent> {
        let winners = self.team(scoring_team).pair();
        let same_streak = self
            .streak
            .as_ref()
            .is_some_and(|streak| streak.team == scoring_team && streak.pair == winners);

        if !same_streak {
            self.streak = Some(StreakState {
                team: scoring_team,
                pair: winners.clone(),
                baseline: opponents_before,
            });
        }

        let opponents_after = self.team(scoring_team.opponent()).pair();
        self.streak
            .as_ref()
            .filter(|streak| streak.baseline == opponents_after)
            .map(|_| FullRotationEvent {
                team: scoring_team,
                players: winners.into_players(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{Score, TeamSlot};

    fn ids(values: &[&str]) -> Vec<PlayerId> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn game(red: (&str, &str), blue: (&str, &str), waiting: &[&str]) -> GameState {
        GameState::new(
            TeamSlot::new(red.0, red.1),
            TeamSlot::new(blue.0, blue.1),
            ids(waiting),
            8,
        )
        .unwrap()
    }

    #[test]
    fn red_goal_rotates_blue() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5", "p6", "p7"]);

        let outcome = game.apply_goal(Team::Red).unwrap();

        assert_eq!(game.blue(), &TeamSlot::new("p5", "p3"));
        assert_eq!(game.red(), &TeamSlot::new("p1", "p2"));
        assert_eq!(game.waiting().snapshot(), ids(&["p6", "p7", "p4"]));
        assert_eq!(game.score(), Score { red: 1, blue: 0 });
        assert_eq!(
            outcome.rotation,
            RotationSummary {
                benched: "p4".into(),
                moved_to_goalkeeper: "p3".into(),
                new_forward: "p5".into(),
            }
        );
        assert_eq!(outcome.before.blue, TeamSlot::new("p3", "p4"));
        assert_eq!(outcome.full_rotation, None);
        assert_eq!(game.history_len(), 1);
    }

    #[test]
    fn blue_goal_rotates_red() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        game.apply_goal(Team::Blue).unwrap();
        assert_eq!(game.red(), &TeamSlot::new("p5", "p1"));
        assert_eq!(game.waiting().snapshot(), ids(&["p2"]));
        assert_eq!(game.score(), Score { red: 0, blue: 1 });
    }

    #[test]
    fn goal_with_empty_queue_changes_nothing() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &[]);
        let before = game.clone();

        assert_eq!(game.apply_goal(Team::Red), Err(GameError::QueueEmpty));
        assert_eq!(game, before);
        assert_eq!(game.history_len(), 0);
    }

    #[test]
    fn goal_before_start_is_rejected() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        game.started = false;
        let before = game.clone();
        assert_eq!(game.apply_goal(Team::Blue), Err(GameError::NotStarted));
        assert_eq!(game, before);
    }

    #[test]
    fn single_waiting_player_is_benched_and_promoted_in_turn() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        let outcome = game.apply_goal(Team::Red).unwrap();
        assert_eq!(outcome.rotation.new_forward, "p5");
        assert_eq!(game.waiting().snapshot(), ids(&["p4"]));
    }

    #[test]
    fn full_rotation_fires_when_baseline_returns() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);

        // blue: (p5,p3) then (p4,p5) then back to {p3,p4}
        assert_eq!(game.apply_goal(Team::Red).unwrap().full_rotation, None);
        assert_eq!(game.apply_goal(Team::Red).unwrap().full_rotation, None);
        let event = game.apply_goal(Team::Red).unwrap().full_rotation;
        assert_eq!(
            event,
            Some(FullRotationEvent {
                team: Team::Red,
                players: ids(&["p1", "p2"]),
            })
        );
        assert_eq!(game.blue().pair(), Pair::new("p3".into(), "p4".into()));

        // baseline is kept, the next cycle fires again
        assert_eq!(game.apply_goal(Team::Red).unwrap().full_rotation, None);
        assert_eq!(game.apply_goal(Team::Red).unwrap().full_rotation, None);
        assert!(game.apply_goal(Team::Red).unwrap().full_rotation.is_some());
    }

    #[test]
    fn changing_winner_resets_baseline() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);

        game.apply_goal(Team::Red).unwrap();
        game.apply_goal(Team::Red).unwrap();
        // blue (p4,p5) now scores, red rotates, streak switches sides
        game.apply_goal(Team::Blue).unwrap();
        let streak = game.streak().unwrap();
        assert_eq!(streak.team, Team::Blue);
        assert_eq!(streak.baseline, Pair::new("p1".into(), "p2".into()));

        // red goes back to a goal: the old red baseline no longer applies
        let outcome = game.apply_goal(Team::Red).unwrap();
        assert_eq!(outcome.full_rotation, None);
        let streak = game.streak().unwrap();
        assert_eq!(streak.team, Team::Red);
        assert_eq!(streak.pair, game.red().pair());
    }

    #[test]
    fn enqueue_rejects_duplicates_without_side_effects() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        let before = game.clone();

        assert_eq!(game.enqueue("p3"), Err(GameError::DuplicateId("p3".into())));
        assert_eq!(game.enqueue("p5"), Err(GameError::DuplicateId("p5".into())));
        assert_eq!(game.enqueue("  "), Err(GameError::EmptySlot("waiting".into())));
        assert_eq!(game, before);

        game.enqueue(" p6 ").unwrap();
        assert_eq!(game.waiting().snapshot(), ids(&["p5", "p6"]));
        assert_eq!(game.history_len(), 1);
    }

    #[test]
    fn remove_prefers_waiting_queue_then_fixed_slot_order() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5", "p6"]);
        // force an impossible duplicate to observe the search order
        game.blue.goalkeeper = "p5".into();

        game.remove_player("p5").unwrap();
        assert_eq!(game.waiting().snapshot(), ids(&["p6"]));
        assert_eq!(game.blue().goalkeeper, "p5");

        game.red.goalkeeper = "p3".into();
        game.remove_player("p3").unwrap();
        assert_eq!(game.red().goalkeeper, "");
        assert_eq!(game.blue().forward, "p3");
    }

    #[test]
    fn remove_unknown_player_fails() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        let before = game.clone();
        assert_eq!(
            game.remove_player("ghost"),
            Err(GameError::PlayerNotFound("ghost".into()))
        );
        assert_eq!(
            game.remove_player(""),
            Err(GameError::PlayerNotFound("".into()))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn undo_reverses_each_kind_of_mutation() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5", "p6"]);

        let start = game.snapshot();
        game.apply_goal(Team::Blue).unwrap();
        let after_goal = game.snapshot();
        game.enqueue("p7").unwrap();
        let after_enqueue = game.snapshot();
        game.remove_player("p1").unwrap();

        game.undo().unwrap();
        assert_eq!(game.snapshot(), after_enqueue);
        game.undo().unwrap();
        assert_eq!(game.snapshot(), after_goal);
        game.undo().unwrap();
        assert_eq!(game.snapshot(), start);
        assert_eq!(game.undo(), Err(GameError::NoHistory));
    }

    #[test]
    fn undo_restores_streak_tracking() {
        let mut game = game(("p1", "p2"), ("p3", "p4"), &["p5"]);
        game.apply_goal(Team::Red).unwrap();
        game.apply_goal(Team::Red).unwrap();
        game.undo().unwrap();
        game.undo().unwrap();
        assert_eq!(game.streak(), None);
        assert_eq!(game.score(), Score::default());
    }
}
