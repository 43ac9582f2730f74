use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::state::{
    game::{GameRules, RoundStart},
    team::{Team, TeamId},
    timer::{Timer, duration_ms},
    turn::Turn,
};

/// High-level statuses a game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Between rounds; teams and durations can be managed.
    Waiting,
    /// Pre-round countdown (countdown variant only).
    Starting,
    /// A team is playing against the clock.
    Playing,
    /// The game-master froze the round.
    Paused,
    /// The round is over; its turn stays visible until the next round or a reset.
    Finished,
}

/// Actions accepted by the state machine, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameAction {
    /// Create a new empty team.
    AddTeam,
    /// Choose the team that plays the next round.
    #[serde(rename_all = "camelCase")]
    SelectTeam {
        /// Target team.
        team_id: TeamId,
    },
    /// Rename a team and/or replace its word list.
    #[serde(rename_all = "camelCase")]
    UpdateTeam {
        /// Target team.
        team_id: TeamId,
        /// New display name; ignored when blank.
        #[serde(default)]
        name: Option<String>,
        /// New word list.
        #[serde(default)]
        words: Option<Vec<String>>,
    },
    /// Remove a team.
    #[serde(rename_all = "camelCase")]
    DeleteTeam {
        /// Target team.
        team_id: TeamId,
    },
    /// Forget a team's guesses and play history.
    #[serde(rename_all = "camelCase")]
    ResetTeam {
        /// Target team.
        team_id: TeamId,
    },
    /// Change the round length (resets the timer).
    #[serde(rename_all = "camelCase")]
    SetDuration {
        /// New round length in milliseconds.
        duration_ms: u64,
    },
    /// Show or hide the leaderboard on the shared display.
    ToggleLeaderboard,
    /// Open the pre-round countdown.
    Prepare,
    /// Countdown progress.
    CountdownTick {
        /// Value to display.
        value: u32,
    },
    /// Begin a round.
    Start,
    /// Freeze the running round.
    Pause,
    /// Continue a paused round.
    Resume,
    /// The team guessed its current word.
    #[serde(rename_all = "camelCase")]
    MarkCorrect {
        /// Team the word belongs to.
        team_id: TeamId,
        /// Word as displayed to the game-master.
        word: String,
    },
    /// The team skipped its current word.
    #[serde(rename_all = "camelCase")]
    MarkMissed {
        /// Team the word belongs to.
        team_id: TeamId,
        /// Word as displayed to the game-master.
        word: String,
    },
    /// The round clock ran out.
    TimeUp,
    /// End the round early.
    Finish,
    /// Return to waiting, optionally with a new round length.
    #[serde(rename_all = "camelCase")]
    Reset {
        /// New round length in milliseconds.
        #[serde(default)]
        duration_ms: Option<u64>,
    },
}

/// Error returned when an action has no transition from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {action:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// Status the machine was in when the action was received.
    pub from: GameStatus,
    /// The rejected action.
    pub action: GameAction,
}

/// Reasons an action or notice left the machine untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No transition exists for this action from the current status.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    /// The transition exists but its guard refused it.
    #[error("{action:?} rejected by guard while {from:?}")]
    GuardRejected {
        /// Status the machine was in.
        from: GameStatus,
        /// The rejected action.
        action: GameAction,
    },
    /// A timer expiry notice belonging to a run that was paused or reset since.
    #[error("stale expiry notice for run {run} (current run {current})")]
    StaleExpiry {
        /// Run carried by the notice.
        run: u64,
        /// Run the timer is on.
        current: u64,
    },
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// Status before the action.
    pub from: GameStatus,
    /// Status after the action (and any automatic transition).
    pub to: GameStatus,
    /// Whether anything observable changed.
    pub changed: bool,
    /// Whether this dispatch finalized a round.
    pub round_finished: bool,
}

/// Everything the machine mutates.
#[derive(Debug)]
pub struct GameContext {
    /// Teams in creation order.
    pub teams: IndexMap<TeamId, Team>,
    /// Team selected for the next or current round.
    pub active_team_id: Option<TeamId>,
    /// Turn of the current or last finished round.
    pub active_turn: Option<Turn>,
    /// Round timer, reused across rounds.
    pub timer: Timer,
    /// Countdown value while starting.
    pub countdown: Option<u32>,
    /// Leaderboard visibility on the shared display.
    pub show_leaderboard: bool,
    round_start: RoundStart,
}

impl GameContext {
    /// Fresh context with no team.
    pub fn new(round_start: RoundStart, timer: Timer) -> Self {
        Self {
            teams: IndexMap::new(),
            active_team_id: None,
            active_turn: None,
            timer,
            countdown: None,
            show_leaderboard: false,
            round_start,
        }
    }

    /// Team selected for play, if any.
    pub fn active_team(&self) -> Option<&Team> {
        self.active_team_id.and_then(|id| self.teams.get(&id))
    }

    fn active_team_mut(&mut self) -> Option<&mut Team> {
        let id = self.active_team_id?;
        self.teams.get_mut(&id)
    }
}

type Guard = fn(&GameContext) -> bool;
type Reducer = fn(&mut GameContext, &GameAction) -> bool;

/// One row of the transition table.
struct Transition {
    guard: Option<Guard>,
    reduce: Reducer,
    to: GameStatus,
}

impl Transition {
    fn to(to: GameStatus, reduce: Reducer) -> Self {
        Self {
            guard: None,
            reduce,
            to,
        }
    }

    fn guarded(to: GameStatus, guard: Guard, reduce: Reducer) -> Self {
        Self {
            guard: Some(guard),
            reduce,
            to,
        }
    }
}

/// State machine driving a single game instance.
#[derive(Debug)]
pub struct GameStateMachine {
    status: GameStatus,
    version: u64,
    context: GameContext,
}

impl GameStateMachine {
    /// Create a machine in the waiting status.
    pub fn new(rules: GameRules, timer: Timer) -> Self {
        Self {
            status: GameStatus::Waiting,
            version: 0,
            context: GameContext::new(rules.round_start, timer),
        }
    }

    /// Build a machine whose timer has no safety net, for synchronous use.
    pub fn detached(rules: GameRules) -> Self {
        Self::new(rules, Timer::new(rules.round_duration))
    }

    /// Current status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Counter bumped on every observable change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Read access to the context.
    pub fn context(&self) -> &GameContext {
        &self.context
    }

    /// Apply `action`, then any automatic transition it unlocks.
    pub fn dispatch(&mut self, action: GameAction) -> Result<Dispatch, DispatchError> {
        let from = self.status;
        let transition = transition_for(from, self.context.round_start, &action)
            .ok_or_else(|| InvalidTransition {
                from,
                action: action.clone(),
            })?;

        if let Some(guard) = transition.guard {
            if !guard(&self.context) {
                return Err(DispatchError::GuardRejected { from, action });
            }
        }

        let mut changed = (transition.reduce)(&mut self.context, &action);
        self.status = transition.to;

        if self.status == GameStatus::Playing && pool_exhausted(&self.context) {
            debug!("active pool exhausted; finishing round");
            finalize_round(&mut self.context, &GameAction::Finish);
            self.status = GameStatus::Finished;
        }

        changed |= from != self.status;
        if changed {
            self.version += 1;
        }

        Ok(Dispatch {
            from,
            to: self.status,
            changed,
            round_finished: from != GameStatus::Finished && self.status == GameStatus::Finished,
        })
    }

    /// Handle the timer safety net firing for `run`.
    ///
    /// Notices from a run that has since been paused or reset are discarded;
    /// otherwise the timer is zeroed and `TIME_UP` is dispatched.
    pub fn handle_expiry(&mut self, run: u64) -> Result<Dispatch, DispatchError> {
        let timer = &mut self.context.timer;
        if run != timer.current_run() || !timer.is_running() {
            return Err(DispatchError::StaleExpiry {
                run,
                current: timer.current_run(),
            });
        }

        timer.expire();
        self.dispatch(GameAction::TimeUp)
    }
}

/// Transition table: `(status, action) -> (guard, reducer, next status)`.
fn transition_for(
    status: GameStatus,
    round_start: RoundStart,
    action: &GameAction,
) -> Option<Transition> {
    use GameAction as A;
    use GameStatus::*;

    let countdown = matches!(round_start, RoundStart::Countdown { .. });

    let transition = match (status, action) {
        (Playing, A::MarkCorrect { .. }) => Transition::to(Playing, mark_correct),
        (Playing, A::MarkMissed { .. }) => Transition::to(Playing, mark_missed),
        (Playing, A::Pause) => Transition::to(Paused, pause_timer),
        (Playing, A::TimeUp | A::Finish) => Transition::to(Finished, finalize_round),
        (Playing, _) => return None,

        (Waiting | Starting | Paused | Finished, admin) => match admin {
            A::AddTeam => Transition::to(status, add_team),
            A::SelectTeam { .. } => Transition::to(status, select_team),
            A::UpdateTeam { .. } => Transition::to(status, update_team),
            A::DeleteTeam { .. } => Transition::to(status, delete_team),
            A::ResetTeam { .. } => Transition::to(status, reset_team),
            A::SetDuration { .. } => Transition::to(status, set_duration),
            A::ToggleLeaderboard => Transition::to(status, toggle_leaderboard),
            _ => match (status, admin) {
                (Waiting | Finished, A::Start) if !countdown => {
                    Transition::guarded(Playing, has_active_team, start_turn)
                }
                (Waiting | Finished, A::Prepare) if countdown => {
                    Transition::guarded(Starting, has_active_team, prepare_turn)
                }
                (Starting, A::CountdownTick { .. }) => Transition::to(Starting, countdown_tick),
                (Starting, A::Start) => Transition::guarded(Playing, has_active_team, start_turn),
                (Paused, A::Resume) => Transition::to(Playing, resume_timer),
                (Paused, A::Finish) => Transition::to(Finished, finalize_round),
                (Starting | Paused | Finished, A::Reset { .. }) => {
                    Transition::to(Waiting, reset_game)
                }
                _ => return None,
            },
        },
    };

    Some(transition)
}

// Guards

fn has_active_team(ctx: &GameContext) -> bool {
    ctx.active_team().is_some()
}

fn pool_exhausted(ctx: &GameContext) -> bool {
    ctx.active_team()
        .is_some_and(|team| team.pool().is_exhausted())
}

// Reducers

fn add_team(ctx: &mut GameContext, _: &GameAction) -> bool {
    let team = Team::new();
    debug!(team_id = %team.id(), "team added");
    ctx.teams.insert(team.id(), team);
    true
}

fn select_team(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::SelectTeam { team_id } = action else {
        return false;
    };
    if !ctx.teams.contains_key(team_id) {
        debug!(%team_id, "select ignored: unknown team");
        return false;
    }
    if ctx.active_team_id == Some(*team_id) {
        return false;
    }
    ctx.active_team_id = Some(*team_id);
    if ctx.active_turn.as_ref().is_some_and(|turn| !turn.is_finalized()) {
        debug!(%team_id, "open turn dropped: another team was selected");
        ctx.active_turn = None;
    }
    true
}

fn update_team(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::UpdateTeam {
        team_id,
        name,
        words,
    } = action
    else {
        return false;
    };
    let Some(team) = ctx.teams.get_mut(team_id) else {
        debug!(%team_id, "update ignored: unknown team");
        return false;
    };

    let mut changed = false;
    if let Some(name) = name.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
        team.name = name.to_string();
        changed = true;
    }
    if let Some(words) = words {
        team.set_words(words.iter().cloned());
        changed = true;
    }
    changed
}

fn delete_team(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::DeleteTeam { team_id } = action else {
        return false;
    };
    if ctx.teams.shift_remove(team_id).is_none() {
        debug!(%team_id, "delete ignored: unknown team");
        return false;
    }
    if ctx.active_team_id == Some(*team_id) {
        ctx.active_team_id = None;
        ctx.active_turn = None;
    }
    true
}

fn reset_team(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::ResetTeam { team_id } = action else {
        return false;
    };
    let Some(team) = ctx.teams.get_mut(team_id) else {
        debug!(%team_id, "reset ignored: unknown team");
        return false;
    };
    team.reset();
    if ctx.active_team_id == Some(*team_id) {
        ctx.active_turn = None;
    }
    true
}

fn set_duration(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::SetDuration { duration_ms } = action else {
        return false;
    };
    ctx.timer.reset(Some(Duration::from_millis(*duration_ms)));
    true
}

fn toggle_leaderboard(ctx: &mut GameContext, _: &GameAction) -> bool {
    ctx.show_leaderboard = !ctx.show_leaderboard;
    true
}

fn prepare_turn(ctx: &mut GameContext, _: &GameAction) -> bool {
    let RoundStart::Countdown { seconds } = ctx.round_start else {
        return false;
    };
    ctx.timer.reset(None);
    ctx.countdown = Some(seconds);
    true
}

fn countdown_tick(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::CountdownTick { value } = action else {
        return false;
    };
    let changed = ctx.countdown != Some(*value);
    ctx.countdown = Some(*value);
    changed
}

fn start_turn(ctx: &mut GameContext, _: &GameAction) -> bool {
    let Some(team) = ctx.active_team_mut() else {
        return false;
    };
    team.has_played = false;
    let team_id = team.id();

    ctx.active_turn = Some(Turn::new(team_id));
    ctx.countdown = None;
    ctx.timer.reset(None);
    ctx.timer.start();
    true
}

fn pause_timer(ctx: &mut GameContext, _: &GameAction) -> bool {
    ctx.timer.pause();
    true
}

fn resume_timer(ctx: &mut GameContext, _: &GameAction) -> bool {
    ctx.timer.start();
    true
}

fn mark_correct(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::MarkCorrect { team_id, word } = action else {
        return false;
    };
    mark_current_word(ctx, *team_id, word, true)
}

fn mark_missed(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::MarkMissed { team_id, word } = action else {
        return false;
    };
    mark_current_word(ctx, *team_id, word, false)
}

/// Shared body of the two marking reducers.
///
/// The submitted word must be the active team's current word; anything else is
/// a stale or duplicated submission and is dropped.
fn mark_current_word(ctx: &mut GameContext, team_id: TeamId, word: &str, correct: bool) -> bool {
    if ctx.active_team_id != Some(team_id)
        || ctx.active_turn.as_ref().is_some_and(|turn| turn.team_id() != team_id)
    {
        debug!(%team_id, "mark ignored: team is not playing");
        return false;
    }
    let Some(team) = ctx.teams.get_mut(&team_id) else {
        return false;
    };
    if team.current_word() != Some(word) {
        debug!(%team_id, word, "mark ignored: stale word");
        return false;
    }

    if correct {
        team.guessed(word);
    } else {
        team.missed(word);
    }
    team.next_word();

    if let Some(turn) = ctx.active_turn.as_mut() {
        if correct {
            turn.record_correct(word);
        } else {
            turn.record_missed(word);
        }
    }
    true
}

/// Stop the clock and freeze the round outcome on the team and its turn.
fn finalize_round(ctx: &mut GameContext, _: &GameAction) -> bool {
    ctx.timer.pause();
    let time_taken_ms = duration_ms(ctx.timer.elapsed());

    let team_id = ctx
        .active_turn
        .as_ref()
        .map(Turn::team_id)
        .or(ctx.active_team_id);
    if let Some(team) = team_id.and_then(|id| ctx.teams.get_mut(&id)) {
        team.has_played = true;
        team.time_taken_ms = time_taken_ms;
    }
    if let Some(turn) = ctx.active_turn.as_mut() {
        turn.finalize(time_taken_ms);
    }
    true
}

fn reset_game(ctx: &mut GameContext, action: &GameAction) -> bool {
    let GameAction::Reset { duration_ms } = action else {
        return false;
    };
    ctx.timer.reset(duration_ms.map(Duration::from_millis));
    ctx.active_turn = None;
    ctx.countdown = None;
    true
}
