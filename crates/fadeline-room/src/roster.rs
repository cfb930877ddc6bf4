//! Seat occupancy and the spectator queue.
//!
//! Pure bookkeeping: no channels, no timers. The room actor decides
//! when to call these transitions and what to broadcast afterwards.

use std::collections::VecDeque;

use fadeline_protocol::{ConnectionId, Seat, SeatView};

/// Display name shown for an AI-held seat.
pub const AI_NAME: &str = "AI";

/// Who holds a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Occupant {
    Vacant,
    Human { id: ConnectionId, name: String },
    Ai,
}

impl Occupant {
    pub fn is_human(&self) -> bool {
        matches!(self, Occupant::Human { .. })
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, Occupant::Ai)
    }

    pub fn is_vacant(&self) -> bool {
        matches!(self, Occupant::Vacant)
    }

    /// The occupant's display name, `None` when vacant.
    pub fn name(&self) -> Option<&str> {
        match self {
            Occupant::Vacant => None,
            Occupant::Human { name, .. } => Some(name),
            Occupant::Ai => Some(AI_NAME),
        }
    }

    fn view(&self) -> SeatView {
        SeatView {
            name: self.name().map(str::to_string),
            is_ai: self.is_ai(),
        }
    }
}

/// A spectator waiting for a seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: ConnectionId,
    pub name: String,
}

/// What happened to a join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Took a seat. `fresh_start` is set when this is the first human
    /// in the room, which calls for a clean board.
    Seated { seat: Seat, fresh_start: bool },
    /// Both seats are human-held; appended to the queue at `position`
    /// (1-based, for display).
    Queued { position: usize },
    /// The queue is at capacity.
    QueueFull,
}

/// What a connection was removed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Seat(Seat),
    Queue,
    NotFound,
}

/// The two seats plus the FIFO spectator queue.
#[derive(Debug, Clone)]
pub struct Roster {
    seats: [Occupant; 2],
    queue: VecDeque<QueueEntry>,
    max_queue: usize,
}

impl Roster {
    pub fn new(max_queue: usize) -> Self {
        Self {
            seats: [Occupant::Vacant, Occupant::Vacant],
            queue: VecDeque::new(),
            max_queue,
        }
    }

    pub fn seat(&self, seat: Seat) -> &Occupant {
        &self.seats[seat.index()]
    }

    /// The seat this connection occupies, if any.
    pub fn seat_of(&self, id: ConnectionId) -> Option<Seat> {
        [Seat::X, Seat::O].into_iter().find(|s| {
            matches!(self.seat(*s), Occupant::Human { id: held, .. } if *held == id)
        })
    }

    /// Display name for a connection: seat occupant first, then queue.
    pub fn name_of(&self, id: ConnectionId) -> Option<&str> {
        if let Some(seat) = self.seat_of(id) {
            return self.seat(seat).name();
        }
        self.queue
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    /// Seats a joiner or queues them.
    ///
    /// X fills first; taking X backfills a non-human O with AI so play
    /// can start immediately. A human joining on O displaces the AI.
    /// With both seats human-held the joiner queues, FIFO, bounded.
    pub fn join(&mut self, id: ConnectionId, name: String) -> JoinOutcome {
        let had_human =
            self.seat(Seat::X).is_human() || self.seat(Seat::O).is_human();

        if !self.seat(Seat::X).is_human() {
            self.seats[Seat::X.index()] = Occupant::Human { id, name };
            if !self.seat(Seat::O).is_human() {
                self.seats[Seat::O.index()] = Occupant::Ai;
            }
            return JoinOutcome::Seated {
                seat: Seat::X,
                fresh_start: !had_human,
            };
        }
        if !self.seat(Seat::O).is_human() {
            self.seats[Seat::O.index()] = Occupant::Human { id, name };
            return JoinOutcome::Seated {
                seat: Seat::O,
                fresh_start: !had_human,
            };
        }
        if self.queue.len() >= self.max_queue {
            return JoinOutcome::QueueFull;
        }
        self.queue.push_back(QueueEntry { id, name });
        JoinOutcome::Queued {
            position: self.queue.len(),
        }
    }

    /// Removes a connection from its seat or from the queue.
    pub fn remove(&mut self, id: ConnectionId) -> RemoveOutcome {
        if let Some(seat) = self.seat_of(id) {
            self.seats[seat.index()] = Occupant::Vacant;
            return RemoveOutcome::Seat(seat);
        }
        let before = self.queue.len();
        self.queue.retain(|e| e.id != id);
        if self.queue.len() < before {
            RemoveOutcome::Queue
        } else {
            RemoveOutcome::NotFound
        }
    }

    /// Vacates a seat regardless of who holds it.
    pub fn vacate(&mut self, seat: Seat) {
        self.seats[seat.index()] = Occupant::Vacant;
    }

    /// Pops the queue head into `seat` as human. Returns the promoted
    /// entry, or `None` when the queue is empty.
    pub fn promote(&mut self, seat: Seat) -> Option<QueueEntry> {
        let entry = self.queue.pop_front()?;
        self.seats[seat.index()] = Occupant::Human {
            id: entry.id,
            name: entry.name.clone(),
        };
        Some(entry)
    }

    /// Puts the AI on a seat.
    pub fn enable_ai(&mut self, seat: Seat) {
        self.seats[seat.index()] = Occupant::Ai;
    }

    /// Everyone currently seated as a human.
    pub fn humans(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.seats.iter().filter_map(|o| match o {
            Occupant::Human { id, .. } => Some(*id),
            _ => None,
        })
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queue display names, FIFO order, for the snapshot.
    pub fn queue_names(&self) -> Vec<String> {
        self.queue.iter().map(|e| e.name.clone()).collect()
    }

    /// Snapshot views of both seats.
    pub fn views(&self) -> (SeatView, SeatView) {
        (self.seat(Seat::X).view(), self.seat(Seat::O).view())
    }
}
