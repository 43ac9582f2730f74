use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    game::GameKind,
    state_machine::{GameStateMachine, GameStatus},
    team::Team,
    timer::TimerState,
    turn::Turn,
};

/// Full state of one game, pushed after every change and returned by the state route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Registry identifier of the game.
    pub game_id: String,
    /// Game type.
    pub kind: GameKind,
    /// Current status of the state machine.
    pub status: GameStatus,
    /// Monotonic change counter.
    pub version: u64,
    /// Teams in creation order.
    pub teams: Vec<TeamSnapshot>,
    /// Team selected for play.
    pub active_team_id: Option<Uuid>,
    /// Authoritative timer reading.
    pub timer: TimerSnapshot,
    /// Countdown value while starting.
    pub countdown: Option<u32>,
    /// Word the active team is working on.
    pub current_word: Option<String>,
    /// Word queued after the current one, for the game-master.
    pub preview_word: Option<String>,
    /// Turn of the current or last finished round.
    pub active_turn: Option<TurnSnapshot>,
    /// Leaderboard visibility on the shared display.
    pub show_leaderboard: bool,
}

/// Team entry of a [`GameSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamSnapshot {
    pub id: Uuid,
    pub name: String,
    pub score: usize,
    /// Word texts in pool order.
    pub words: Vec<String>,
    pub guessed_words: Vec<String>,
    /// Words still to guess, for the leaderboard.
    pub remaining_words: Vec<String>,
    /// Pool position of the current word.
    pub current_word_index: usize,
    pub has_played: bool,
    pub time_taken_ms: u64,
}

/// Turn entry of a [`GameSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnSnapshot {
    pub team_id: Uuid,
    pub correct_words: Vec<String>,
    pub missed_words: Vec<String>,
    pub score: usize,
    /// Set once the round is over.
    pub time_taken_ms: Option<u64>,
}

/// Timer reading stamped with the server clock.
///
/// Clients rebuild the live countdown from this value alone, see [`crate::clock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    /// Round length in milliseconds.
    pub total_duration: u64,
    /// Milliseconds left at `server_timestamp`.
    pub remaining_time: u64,
    pub is_running: bool,
    /// Server wall clock in Unix epoch milliseconds.
    pub server_timestamp: u64,
}

/// Round outcome pushed when a round is finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishSummary {
    pub team_id: Uuid,
    pub team_name: String,
    /// Words guessed during the round.
    pub score: usize,
    pub correct_words: Vec<String>,
    pub missed_words: Vec<String>,
    pub time_taken_ms: u64,
}

impl GameSnapshot {
    /// Serialize-ready view of `machine`.
    pub fn capture(game_id: &str, kind: GameKind, machine: &GameStateMachine) -> Self {
        let ctx = machine.context();
        let active = ctx.active_team();

        Self {
            game_id: game_id.to_string(),
            kind,
            status: machine.status(),
            version: machine.version(),
            teams: ctx.teams.values().map(TeamSnapshot::from).collect(),
            active_team_id: ctx.active_team_id,
            timer: ctx.timer.state().into(),
            countdown: ctx.countdown,
            current_word: active.and_then(Team::current_word).map(str::to_string),
            preview_word: active.and_then(Team::preview_word).map(str::to_string),
            active_turn: ctx.active_turn.as_ref().map(TurnSnapshot::from),
            show_leaderboard: ctx.show_leaderboard,
        }
    }
}

impl FinishSummary {
    /// Outcome of the round that was just finalized, credited to the team that owns the turn.
    pub fn capture(machine: &GameStateMachine) -> Option<Self> {
        let ctx = machine.context();
        let turn = ctx.active_turn.as_ref()?;
        let team = ctx.teams.get(&turn.team_id())?;

        Some(Self {
            team_id: team.id(),
            team_name: team.name.clone(),
            score: turn.score(),
            correct_words: turn.correct_words().to_vec(),
            missed_words: turn.missed_words().to_vec(),
            time_taken_ms: turn.time_taken_ms().unwrap_or(team.time_taken_ms),
        })
    }
}

impl From<&Team> for TeamSnapshot {
    fn from(team: &Team) -> Self {
        let summary = team.summary();
        Self {
            id: team.id(),
            name: team.name.clone(),
            score: summary.score,
            words: team.words(),
            guessed_words: summary.correct_words,
            remaining_words: summary.missed_words,
            current_word_index: team.pool().current_index(),
            has_played: team.has_played,
            time_taken_ms: team.time_taken_ms,
        }
    }
}

impl From<&Turn> for TurnSnapshot {
    fn from(turn: &Turn) -> Self {
        Self {
            team_id: turn.team_id(),
            correct_words: turn.correct_words().to_vec(),
            missed_words: turn.missed_words().to_vec(),
            score: turn.score(),
            time_taken_ms: turn.time_taken_ms(),
        }
    }
}

impl From<TimerState> for TimerSnapshot {
    fn from(state: TimerState) -> Self {
        Self {
            total_duration: state.total_duration_ms,
            remaining_time: state.remaining_ms,
            is_running: state.is_running,
            server_timestamp: state.server_timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::state::state_machine::GameAction;

    fn machine_with_team(words: &[&str]) -> (GameStateMachine, Uuid) {
        let mut sm = GameStateMachine::detached(GameKind::Charades.default_rules());
        sm.dispatch(GameAction::AddTeam).unwrap();
        let team_id = *sm.context().teams.keys().next().unwrap();
        sm.dispatch(GameAction::UpdateTeam {
            team_id,
            name: Some("Owls".into()),
            words: Some(words.iter().map(|w| w.to_string()).collect()),
        })
        .unwrap();
        sm.dispatch(GameAction::SelectTeam { team_id }).unwrap();
        (sm, team_id)
    }

    #[test]
    fn snapshot_uses_camel_case_fields() {
        let (sm, team_id) = machine_with_team(&["Apple"]);
        let value = serde_json::to_value(GameSnapshot::capture("party", GameKind::Charades, &sm))
            .unwrap();

        assert_eq!(value["gameId"], "party");
        assert_eq!(value["kind"], "charades");
        assert_eq!(value["status"], "waiting");
        assert_eq!(value["activeTeamId"], json!(team_id));
        assert_eq!(value["currentWord"], "Apple");
        assert_eq!(value["previewWord"], serde_json::Value::Null);
        assert_eq!(value["showLeaderboard"], false);
        assert_eq!(value["timer"]["totalDuration"], 60_000);
        assert_eq!(value["timer"]["remainingTime"], 60_000);
        assert_eq!(value["timer"]["isRunning"], false);
        assert!(value["timer"]["serverTimestamp"].as_u64().unwrap() > 0);

        let team = &value["teams"][0];
        assert_eq!(team["name"], "Owls");
        assert_eq!(team["currentWordIndex"], 0);
        assert_eq!(team["hasPlayed"], false);
        assert_eq!(team["remainingWords"], json!(["Apple"]));
        assert_eq!(team["timeTakenMs"], 0);
    }

    #[tokio::test]
    async fn finish_summary_reports_the_turn() {
        let (mut sm, team_id) = machine_with_team(&["Apple"]);
        sm.dispatch(GameAction::Start).unwrap();
        sm.dispatch(GameAction::MarkCorrect {
            team_id,
            word: "Apple".into(),
        })
        .unwrap();

        let summary = FinishSummary::capture(&sm).unwrap();
        assert_eq!(summary.team_id, team_id);
        assert_eq!(summary.team_name, "Owls");
        assert_eq!(summary.score, 1);
        assert_eq!(summary.correct_words, vec!["Apple".to_string()]);
        assert!(summary.missed_words.is_empty());

        let snapshot = GameSnapshot::capture("party", GameKind::Charades, &sm);
        assert_eq!(snapshot.status, GameStatus::Finished);
        assert_eq!(snapshot.teams[0].guessed_words, vec!["Apple".to_string()]);
        assert!(snapshot.current_word.is_none());
        assert!(snapshot.active_turn.unwrap().time_taken_ms.is_some());
    }

    #[tokio::test]
    async fn finish_summary_credits_the_team_that_played() {
        let (mut sm, team_id) = machine_with_team(&["Apple", "Banana"]);
        sm.dispatch(GameAction::AddTeam).unwrap();
        let other = *sm.context().teams.keys().last().unwrap();
        sm.dispatch(GameAction::Start).unwrap();
        sm.dispatch(GameAction::Finish).unwrap();
        sm.dispatch(GameAction::SelectTeam { team_id: other }).unwrap();

        let summary = FinishSummary::capture(&sm).unwrap();
        assert_eq!(summary.team_id, team_id);
        assert_eq!(summary.team_name, "Owls");
    }

    #[test]
    fn no_summary_without_turn() {
        let (sm, _) = machine_with_team(&["Apple"]);
        assert!(FinishSummary::capture(&sm).is_none());
    }
}
