//! Single-writer task owning one game's state machine.
//!
//! External actions, timer expiry notices, countdown ticks and snapshot
//! queries all travel through one unbounded queue, so the game has a strict
//! linear history of transitions. The timer safety net and the countdown
//! ticker only hold weak senders: once every [`GameHandle`] is dropped the
//! queue closes and the actor exits.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use tokio::{
    sync::{broadcast, mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, interval_at},
};
use tracing::{debug, info, warn};

use crate::{
    dto::{
        snapshot::{FinishSummary, GameSnapshot},
        sse::ServerEvent,
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SseHub,
        game::{GameKind, GameRules},
        state_machine::{Dispatch, GameAction, GameStateMachine, GameStatus},
        timer::{ExpiryHook, Timer},
    },
};

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Work items processed by a game actor, in arrival order.
#[derive(Debug)]
enum Command {
    Apply(GameAction),
    Expired { run: u64 },
    Countdown { run: u64, value: u32 },
    Snapshot(oneshot::Sender<GameSnapshot>),
}

/// Cloneable handle to a running game.
#[derive(Clone)]
pub struct GameHandle {
    id: Arc<str>,
    kind: GameKind,
    created_at: SystemTime,
    commands: mpsc::UnboundedSender<Command>,
    hub: Arc<SseHub>,
}

impl GameHandle {
    /// Spawn the actor for a new game and return its handle.
    pub fn spawn(id: &str, kind: GameKind, rules: GameRules, broadcast_capacity: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Arc::new(SseHub::new(broadcast_capacity));
        let id: Arc<str> = Arc::from(id);

        let expiry_tx = tx.downgrade();
        let hook: ExpiryHook = Arc::new(move |run| {
            if let Some(tx) = expiry_tx.upgrade() {
                let _ = tx.send(Command::Expired { run });
            }
        });
        let timer = Timer::new(rules.round_duration).with_expiry_hook(hook);

        let actor = GameActor {
            id: id.clone(),
            kind,
            machine: GameStateMachine::new(rules, timer),
            commands: tx.downgrade(),
            hub: hub.clone(),
            ticker: None,
            ticker_run: 0,
        };
        tokio::spawn(actor.run(rx));

        Self {
            id,
            kind,
            created_at: SystemTime::now(),
            commands: tx,
            hub,
        }
    }

    /// Registry identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Game type.
    pub fn kind(&self) -> GameKind {
        self.kind
    }

    /// Wall clock time the game was opened.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Queue `action` for the actor. Fire-and-forget: the outcome is only visible in later snapshots.
    pub fn submit(&self, action: GameAction) -> Result<(), ServiceError> {
        self.commands
            .send(Command::Apply(action))
            .map_err(|_| self.stopped())
    }

    /// Current snapshot, taken after every command queued before this call.
    pub async fn snapshot(&self) -> Result<GameSnapshot, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply))
            .map_err(|_| self.stopped())?;
        rx.await.map_err(|_| self.stopped())
    }

    /// Receive every message pushed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.hub.subscribe()
    }

    fn stopped(&self) -> ServiceError {
        ServiceError::Unavailable(format!("game {} is not running", self.id))
    }
}

struct GameActor {
    id: Arc<str>,
    kind: GameKind,
    machine: GameStateMachine,
    commands: mpsc::WeakUnboundedSender<Command>,
    hub: Arc<SseHub>,
    ticker: Option<JoinHandle<()>>,
    ticker_run: u64,
}

impl GameActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!(game_id = %self.id, kind = ?self.kind, "game actor started");

        while let Some(command) = rx.recv().await {
            self.handle(command);
        }

        self.stop_countdown();
        info!(game_id = %self.id, "game actor stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Apply(action) => {
                debug!(game_id = %self.id, ?action, "applying action");
                match self.machine.dispatch(action) {
                    Ok(outcome) => self.after_dispatch(outcome),
                    Err(err) => debug!(game_id = %self.id, error = %err, "action rejected"),
                }
            }
            Command::Expired { run } => match self.machine.handle_expiry(run) {
                Ok(outcome) => {
                    info!(game_id = %self.id, run, "round time is up");
                    self.after_dispatch(outcome);
                }
                Err(err) => debug!(game_id = %self.id, error = %err, "expiry notice ignored"),
            },
            Command::Countdown { run, value } => self.countdown_step(run, value),
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.id, self.kind, &self.machine)
    }

    /// Keep the countdown ticker in step with the status and push the new state.
    fn after_dispatch(&mut self, outcome: Dispatch) {
        let starting = outcome.to == GameStatus::Starting;
        if starting && outcome.from != GameStatus::Starting {
            self.start_countdown();
        } else if !starting {
            self.stop_countdown();
        }

        if !outcome.changed {
            return;
        }

        if outcome.round_finished {
            match FinishSummary::capture(&self.machine) {
                Some(summary) => sse_events::broadcast_finish(&self.hub, summary),
                None => debug!(game_id = %self.id, "round finished without a turn"),
            }
        }
        sse_events::broadcast_sync_state(&self.hub, self.snapshot());
    }

    fn countdown_step(&mut self, run: u64, value: u32) {
        if run != self.ticker_run || self.machine.status() != GameStatus::Starting {
            debug!(game_id = %self.id, run, value, "stale countdown tick ignored");
            return;
        }

        let action = if value == 0 {
            GameAction::Start
        } else {
            GameAction::CountdownTick { value }
        };

        match self.machine.dispatch(action) {
            Ok(outcome) => self.after_dispatch(outcome),
            Err(err) => {
                warn!(
                    game_id = %self.id,
                    error = %err,
                    "countdown could not start the round; resetting"
                );
                match self.machine.dispatch(GameAction::Reset { duration_ms: None }) {
                    Ok(outcome) => self.after_dispatch(outcome),
                    Err(err) => warn!(game_id = %self.id, error = %err, "reset after countdown failed"),
                }
            }
        }
    }

    fn start_countdown(&mut self) {
        let Some(from) = self.machine.context().countdown else {
            return;
        };

        self.stop_countdown();
        self.ticker_run += 1;
        let run = self.ticker_run;
        let commands = self.commands.clone();
        debug!(game_id = %self.id, run, from, "countdown started");

        if from == 0 {
            if let Some(tx) = commands.upgrade() {
                let _ = tx.send(Command::Countdown { run, value: 0 });
            }
            return;
        }

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + COUNTDOWN_STEP, COUNTDOWN_STEP);
            for value in (0..from).rev() {
                interval.tick().await;
                let Some(tx) = commands.upgrade() else {
                    break;
                };
                if tx.send(Command::Countdown { run, value }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_countdown(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            self.ticker_run += 1;
        }
    }
}
