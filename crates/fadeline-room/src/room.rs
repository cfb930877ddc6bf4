//! The room actor: an isolated Tokio task that owns the match.
//!
//! All mutation is serialized through one mpsc channel, so a human move
//! and a timeout eviction can never race. The monitor clock ticks inside
//! the same `tokio::select!` loop; the hard AI search runs on a blocking
//! worker and its result comes back as a command that is re-validated
//! against the live state before committing.

use std::collections::HashMap;
use std::time::Instant;

use fadeline_clock::{ClockConfig, TurnClock};
use fadeline_engine::choose_move;
use fadeline_protocol::{
    ClientEvent, ConnectionId, Difficulty, Seat, ServerEvent, Snapshot,
};
use tokio::sync::{mpsc, oneshot};

use crate::match_state::{MatchState, MoveOutcome};
use crate::roster::{JoinOutcome, Occupant, Roster};
use crate::sink::RoomLogs;
use crate::{RemoveOutcome, RoomConfig, RoomError};

/// Channel sender for delivering outbound events to one connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to the room actor through its channel.
///
/// `AiMove` and `ResetDue` are internal: spawned tasks hand their
/// results back through the same channel so they commit on the
/// single-writer path like everything else.
enum RoomCommand {
    /// Register a connection's outbound channel. Spectating until Join.
    Attach {
        id: ConnectionId,
        sender: EventSender,
    },
    /// Transport-level disconnect.
    Detach { id: ConnectionId },
    /// An inbound event from a connection.
    Client { id: ConnectionId, event: ClientEvent },
    /// A finished AI decision. `round` and `total_moves` were captured
    /// when the search started; a mismatch means the result is stale.
    AiMove {
        round: u64,
        total_moves: u32,
        seat: Seat,
        index: Option<usize>,
    },
    /// The deferred auto-reset after a win came due.
    ResetDue { round: u64 },
    /// Request the current snapshot.
    GetSnapshot { reply: oneshot::Sender<Snapshot> },
    /// Shut down the room.
    Shutdown,
}

/// Handle to the running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Registers a connection. The room immediately sends it a snapshot.
    pub async fn attach(
        &self,
        id: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Attach { id, sender })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Reports a disconnect. Vacates and refills the seat if one was held.
    pub async fn detach(&self, id: ConnectionId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Detach { id })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Delivers an inbound client event (fire-and-forget).
    pub async fn client(
        &self,
        id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Client { id, event })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Requests the current full snapshot.
    pub async fn snapshot(&self) -> Result<Snapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetSnapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// Spawns the room actor task and returns a handle to it.
pub fn spawn_room(config: RoomConfig, logs: RoomLogs) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);
    let clock = TurnClock::new(ClockConfig::with_interval(config.tick_interval));

    let actor = RoomActor {
        state: MatchState::new(config.turn_timeout, Instant::now()),
        roster: Roster::new(config.max_queue),
        difficulty: Difficulty::default(),
        senders: HashMap::new(),
        ai_pending: false,
        self_tx: tx.clone(),
        logs,
        config,
    };

    tokio::spawn(actor.run(rx, clock));

    RoomHandle { sender: tx }
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    state: MatchState,
    roster: Roster,
    difficulty: Difficulty,
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, EventSender>,
    /// An AI decision is in flight; don't start another.
    ai_pending: bool,
    /// For spawned tasks to hand results back through the channel.
    self_tx: mpsc::Sender<RoomCommand>,
    logs: RoomLogs,
    config: RoomConfig,
}

impl RoomActor {
    async fn run(
        mut self,
        mut rx: mpsc::Receiver<RoomCommand>,
        mut clock: TurnClock,
    ) {
        tracing::info!("room actor started");

        loop {
            tokio::select! {
                cmd = rx.recv() => match cmd {
                    Some(RoomCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                _ = clock.tick() => self.on_tick(Instant::now()),
            }
        }

        tracing::info!("room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        let now = Instant::now();
        match cmd {
            RoomCommand::Attach { id, sender } => {
                self.senders.insert(id, sender);
                tracing::info!(conn = %id, connections = self.senders.len(), "connection attached");
                self.send_to(id, ServerEvent::Update { state: self.snapshot() });
            }
            RoomCommand::Detach { id } => self.on_detach(id, now),
            RoomCommand::Client { id, event } => self.on_client(id, event, now),
            RoomCommand::AiMove {
                round,
                total_moves,
                seat,
                index,
            } => self.on_ai_move(round, total_moves, seat, index, now),
            RoomCommand::ResetDue { round } => {
                if !self.state.is_active() && self.state.round() == round {
                    tracing::debug!(round, "auto-reset fired");
                    self.state.reset(now);
                    self.broadcast_update();
                }
            }
            RoomCommand::GetSnapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            RoomCommand::Shutdown => {}
        }
    }

    // -----------------------------------------------------------------
    // Inbound client events
    // -----------------------------------------------------------------

    fn on_client(&mut self, id: ConnectionId, event: ClientEvent, now: Instant) {
        match event {
            ClientEvent::Join { name } => self.on_join(id, name, now),
            ClientEvent::PlaceMove { index } => {
                match self.roster.seat_of(id) {
                    Some(seat) => self.commit_move(seat, index, now),
                    None => {
                        tracing::debug!(conn = %id, "move from non-player, ignoring")
                    }
                }
            }
            ClientEvent::TogglePause => {
                if self.roster.seat_of(id).is_none() {
                    tracing::debug!(conn = %id, "pause from non-player, ignoring");
                    return;
                }
                let paused = self.state.toggle_pause(now);
                let message = if paused { "game paused" } else { "game resumed" };
                self.broadcast(ServerEvent::Notice {
                    message: message.to_string(),
                });
                self.broadcast_update();
            }
            ClientEvent::KickOpponent => self.on_kick(id, now),
            ClientEvent::ResetGame => {
                tracing::info!(conn = %id, "manual reset");
                self.state.reset(now);
                self.broadcast_update();
            }
            ClientEvent::Chat { message } => self.on_chat(id, message),
            ClientEvent::SetDifficulty { level } => {
                self.difficulty = level;
                tracing::info!(%level, "difficulty changed");
                self.broadcast(ServerEvent::Notice {
                    message: format!("AI difficulty set to {level}"),
                });
            }
            ClientEvent::Heartbeat => {
                let remaining_secs = self.state.remaining(now).as_secs();
                self.send_to(id, ServerEvent::HeartbeatAck { remaining_secs });
            }
        }
    }

    fn on_join(&mut self, id: ConnectionId, name: String, now: Instant) {
        let name = sanitize_name(&name, self.config.name_max_len);
        match self.roster.join(id, name.clone()) {
            JoinOutcome::Seated { seat, fresh_start } => {
                tracing::info!(conn = %id, %seat, %name, "player seated");
                if fresh_start {
                    self.state.reset(now);
                }
                self.send_to(
                    id,
                    ServerEvent::RoleAssigned {
                        seat: Some(seat),
                        state: self.snapshot(),
                    },
                );
                self.broadcast_update();
            }
            JoinOutcome::Queued { position } => {
                tracing::info!(conn = %id, position, %name, "spectator queued");
                self.send_to(
                    id,
                    ServerEvent::RoleAssigned {
                        seat: None,
                        state: self.snapshot(),
                    },
                );
                self.send_to(
                    id,
                    ServerEvent::Notice {
                        message: format!(
                            "both seats are taken, you are #{position} in the queue"
                        ),
                    },
                );
                self.broadcast_update();
            }
            JoinOutcome::QueueFull => {
                tracing::info!(conn = %id, "join rejected, queue full");
                self.send_to(
                    id,
                    ServerEvent::Notice {
                        message: "the waiting queue is full".to_string(),
                    },
                );
            }
        }
    }

    fn on_kick(&mut self, id: ConnectionId, now: Instant) {
        let Some(seat) = self.roster.seat_of(id) else {
            tracing::debug!(conn = %id, "kick from non-player, ignoring");
            return;
        };
        let target = seat.opponent();
        match self.roster.seat(target).clone() {
            Occupant::Ai => {
                self.send_to(
                    id,
                    ServerEvent::Notice {
                        message: "the AI opponent cannot be kicked".to_string(),
                    },
                );
            }
            Occupant::Human { id: kicked, name } => {
                tracing::info!(conn = %id, kicked = %kicked, %name, "opponent kicked");
                self.send_to(
                    kicked,
                    ServerEvent::Kicked {
                        message: "you were kicked by your opponent".to_string(),
                    },
                );
                self.roster.vacate(target);
                self.refill_and_reset(target, now);
            }
            Occupant::Vacant => {
                // Nothing to kick, but refill so play can continue.
                self.refill_and_reset(target, now);
            }
        }
    }

    fn on_chat(&mut self, id: ConnectionId, message: String) {
        let sender = self
            .roster
            .name_of(id)
            .unwrap_or("anonymous")
            .to_string();
        let message: String =
            message.chars().take(self.config.chat_max_len).collect();
        self.logs.chat.append(&format!("{sender}: {message}"));
        self.broadcast(ServerEvent::Chat { sender, message });
    }

    fn on_detach(&mut self, id: ConnectionId, now: Instant) {
        self.senders.remove(&id);
        match self.roster.remove(id) {
            RemoveOutcome::Seat(seat) => {
                tracing::info!(conn = %id, %seat, "seated player disconnected");
                self.refill_and_reset(seat, now);
            }
            RemoveOutcome::Queue => {
                tracing::info!(conn = %id, "queued spectator disconnected");
                self.broadcast_update();
            }
            RemoveOutcome::NotFound => {
                tracing::debug!(conn = %id, "spectator disconnected");
            }
        }
    }

    // -----------------------------------------------------------------
    // Monitor clock
    // -----------------------------------------------------------------

    fn on_tick(&mut self, now: Instant) {
        if self.state.timed_out(now) {
            let turn = self.state.turn();
            if let Occupant::Human { id, name } = self.roster.seat(turn).clone() {
                tracing::info!(conn = %id, seat = %turn, %name, "turn timeout, evicting");
                self.broadcast(ServerEvent::Notice {
                    message: format!("{name} ({turn}) ran out of time"),
                });
                self.roster.vacate(turn);
                self.refill_and_reset(turn, now);
                self.send_to(
                    id,
                    ServerEvent::RoleAssigned {
                        seat: None,
                        state: self.snapshot(),
                    },
                );
                return;
            }
        }

        self.maybe_start_ai_move();
    }

    /// Kicks off an AI decision for the current turn if one is due.
    ///
    /// The search runs on a blocking worker over a position snapshot;
    /// the chosen move comes back as [`RoomCommand::AiMove`].
    fn maybe_start_ai_move(&mut self) {
        if self.ai_pending
            || !self.state.is_active()
            || self.state.is_paused()
            || !self.roster.seat(self.state.turn()).is_ai()
        {
            return;
        }
        self.ai_pending = true;

        let pos = self.state.position().clone();
        let seat = self.state.turn();
        let difficulty = self.difficulty;
        let round = self.state.round();
        let total_moves = self.state.total_moves();
        let tx = self.self_tx.clone();

        tokio::spawn(async move {
            let chosen = tokio::task::spawn_blocking(move || {
                let mut rng = rand::rng();
                choose_move(&pos, seat, difficulty, &mut rng)
            })
            .await
            .ok()
            .flatten();
            let _ = tx
                .send(RoomCommand::AiMove {
                    round,
                    total_moves,
                    seat,
                    index: chosen,
                })
                .await;
        });
    }

    fn on_ai_move(
        &mut self,
        round: u64,
        total_moves: u32,
        seat: Seat,
        index: Option<usize>,
        now: Instant,
    ) {
        self.ai_pending = false;
        if round != self.state.round()
            || total_moves != self.state.total_moves()
            || !self.roster.seat(seat).is_ai()
        {
            tracing::debug!(round, %seat, "discarding stale AI move");
            return;
        }
        if let Some(index) = index {
            self.commit_move(seat, index, now);
        }
    }

    // -----------------------------------------------------------------
    // The one commit path
    // -----------------------------------------------------------------

    /// Commits a placement. Human and AI moves both land here.
    fn commit_move(&mut self, seat: Seat, index: usize, now: Instant) {
        match self.state.place(seat, index, now) {
            Ok(MoveOutcome::Continued { next_turn }) => {
                tracing::debug!(%seat, index, %next_turn, "move committed");
                self.broadcast_update();
            }
            Ok(MoveOutcome::Won {
                winner,
                total_moves,
                duration,
            }) => {
                self.on_game_end(winner, total_moves, duration);
            }
            Err(rejected) => {
                tracing::debug!(%seat, index, ?rejected, "move rejected");
            }
        }
    }

    fn on_game_end(
        &mut self,
        winner: Seat,
        total_moves: u32,
        duration: std::time::Duration,
    ) {
        let occupant = self.roster.seat(winner);
        let ai = occupant.is_ai();
        let winner_name = occupant.name().map(str::to_string);
        tracing::info!(%winner, total_moves, secs = duration.as_secs(), "game over");

        self.logs.history.append(&format!(
            "Result: {winner}{} Wins | Total Turns: {total_moves} | Duration: {}s",
            if ai { " (AI)" } else { "" },
            duration.as_secs(),
        ));

        self.broadcast_update();
        self.broadcast(ServerEvent::GameOver {
            winner,
            winner_name,
        });

        // Deferred auto-reset, skippable: a manual reset advances the
        // round, which invalidates this task's captured round.
        let round = self.state.round();
        let delay = self.config.auto_reset_delay;
        let tx = self.self_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RoomCommand::ResetDue { round }).await;
        });
    }

    /// Refills a vacated seat (queue first, AI for seat O only), resets
    /// the match, notifies the promoted spectator, and broadcasts.
    fn refill_and_reset(&mut self, seat: Seat, now: Instant) {
        let promoted = self.roster.promote(seat);
        if promoted.is_none() && seat == Seat::O {
            self.roster.enable_ai(Seat::O);
        }
        self.state.reset(now);
        if let Some(entry) = promoted {
            tracing::info!(conn = %entry.id, %seat, name = %entry.name, "promoted from queue");
            self.send_to(
                entry.id,
                ServerEvent::Promoted {
                    seat,
                    state: self.snapshot(),
                },
            );
        }
        self.broadcast_update();
    }

    // -----------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------

    fn snapshot(&self) -> Snapshot {
        let position = self.state.position();
        let active = self.state.is_active();
        let paused = self.state.is_paused();
        let turn = self.state.turn();
        let (seat_x, seat_o) = self.roster.views();
        Snapshot {
            board: position.board,
            next_turn: turn,
            winner: if active {
                fadeline_engine::evaluate(&position.board)
            } else {
                None
            },
            next_to_fade: if active && !paused {
                position.fade_candidate(turn)
            } else {
                None
            },
            seat_x,
            seat_o,
            scores: self.state.scores(),
            queue: self.roster.queue_names(),
            game_active: active,
            paused,
        }
    }

    fn broadcast_update(&self) {
        self.broadcast(ServerEvent::Update {
            state: self.snapshot(),
        });
    }

    /// Sends to every connection. A failed send means that client is
    /// mid-disconnect; it is logged and the rest still get the event.
    fn broadcast(&self, event: ServerEvent) {
        for (id, sender) in &self.senders {
            if sender.send(event.clone()).is_err() {
                tracing::trace!(conn = %id, "broadcast to closed connection");
            }
        }
    }

    /// Sends to one connection. Silently drops if the receiver is gone.
    fn send_to(&self, id: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&id) {
            let _ = sender.send(event);
        }
    }
}

/// Truncates to the configured length; an empty or whitespace name
/// becomes "anonymous".
fn sanitize_name(name: &str, max_len: usize) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "anonymous".to_string();
    }
    trimmed.chars().take(max_len).collect()
}
