//! Integration tests for the room actor.
//!
//! These run against the real actor in real time with shrunk timing
//! configs (10 ms ticks, sub-second timeouts). Clients are plain
//! unbounded channels; every wait is bounded by a generous deadline so
//! a failure shows up as a timeout, not a hang.

use std::sync::Arc;
use std::time::Duration;

use fadeline_protocol::{ClientEvent, ConnectionId, Seat, ServerEvent};
use fadeline_room::{
    spawn_room, MemorySink, RoomConfig, RoomHandle, RoomLogs,
};
use tokio::sync::mpsc;

const DEADLINE: Duration = Duration::from_secs(5);

// =========================================================================
// Helpers
// =========================================================================

fn quick_config() -> RoomConfig {
    RoomConfig {
        turn_timeout: Duration::from_secs(30),
        tick_interval: Duration::from_millis(10),
        auto_reset_delay: Duration::from_millis(50),
        ..Default::default()
    }
}

struct Client {
    id: ConnectionId,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Client {
    async fn attach(room: &RoomHandle, id: u64) -> Client {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId(id);
        room.attach(id, tx).await.unwrap();
        Client { id, rx }
    }

    async fn join(room: &RoomHandle, id: u64, name: &str) -> Client {
        let mut client = Client::attach(room, id).await;
        room.client(client.id, ClientEvent::Join { name: name.into() })
            .await
            .unwrap();
        client
            .recv_until(|ev| matches!(ev, ServerEvent::RoleAssigned { .. } | ServerEvent::Notice { .. }))
            .await;
        client
    }

    async fn send(&self, room: &RoomHandle, event: ClientEvent) {
        room.client(self.id, event).await.unwrap();
    }

    /// Receives events until one matches, returning it.
    async fn recv_until<F>(&mut self, mut pred: F) -> ServerEvent
    where
        F: FnMut(&ServerEvent) -> bool,
    {
        tokio::time::timeout(DEADLINE, async {
            loop {
                let ev = self.rx.recv().await.expect("room closed the channel");
                if pred(&ev) {
                    return ev;
                }
            }
        })
        .await
        .expect("expected event not received before deadline")
    }
}

/// Polls the room snapshot until `pred` holds.
async fn snapshot_until<F>(
    room: &RoomHandle,
    mut pred: F,
) -> fadeline_protocol::Snapshot
where
    F: FnMut(&fadeline_protocol::Snapshot) -> bool,
{
    tokio::time::timeout(DEADLINE, async {
        loop {
            let snap = room.snapshot().await.unwrap();
            if pred(&snap) {
                return snap;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("snapshot condition not met before deadline")
}

// =========================================================================
// Joining and seating
// =========================================================================

#[tokio::test]
async fn test_first_joiner_takes_x_and_ai_backfills_o() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let mut c1 = Client::attach(&room, 1).await;

    room.client(c1.id, ClientEvent::Join { name: "ada".into() })
        .await
        .unwrap();
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::RoleAssigned { .. }))
        .await;
    match ev {
        ServerEvent::RoleAssigned { seat, state } => {
            assert_eq!(seat, Some(Seat::X));
            assert_eq!(state.seat_x.name.as_deref(), Some("ada"));
            assert!(state.seat_o.is_ai);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_second_joiner_displaces_ai_on_o() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let _c1 = Client::join(&room, 1, "ada").await;
    let _c2 = Client::join(&room, 2, "lin").await;

    let snap = room.snapshot().await.unwrap();
    assert_eq!(snap.seat_o.name.as_deref(), Some("lin"));
    assert!(!snap.seat_o.is_ai);
}

#[tokio::test]
async fn test_queue_fills_fifo_and_rejects_at_capacity() {
    let config = RoomConfig {
        max_queue: 2,
        ..quick_config()
    };
    let room = spawn_room(config, RoomLogs::disabled());
    let _c1 = Client::join(&room, 1, "ada").await;
    let _c2 = Client::join(&room, 2, "lin").await;
    let _c3 = Client::join(&room, 3, "sam").await;
    let _c4 = Client::join(&room, 4, "kim").await;

    let mut c5 = Client::attach(&room, 5).await;
    room.client(c5.id, ClientEvent::Join { name: "late".into() })
        .await
        .unwrap();
    let ev = c5
        .recv_until(|ev| matches!(ev, ServerEvent::Notice { .. }))
        .await;
    match ev {
        ServerEvent::Notice { message } => {
            assert!(message.contains("queue is full"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }

    let snap = room.snapshot().await.unwrap();
    assert_eq!(snap.queue, vec!["sam".to_string(), "kim".to_string()]);
}

// =========================================================================
// Moves and the fade rule over the wire
// =========================================================================

#[tokio::test]
async fn test_moves_broadcast_fresh_snapshots_to_everyone() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;
    let mut c2 = Client::join(&room, 2, "lin").await;

    c1.send(&room, ClientEvent::PlaceMove { index: 0 }).await;
    let ev = c2
        .recv_until(|ev| {
            matches!(ev, ServerEvent::Update { state } if state.board[0].is_some())
        })
        .await;
    match ev {
        ServerEvent::Update { state } => {
            assert_eq!(state.board[0], Some(Seat::X));
            assert_eq!(state.next_turn, Seat::O);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_fourth_placement_fades_oldest_and_reports_next_to_fade() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;
    let c2 = Client::join(&room, 2, "lin").await;

    // X: 0, 1, 3 (avoiding a win), O: 5, 7, 8. After X's third piece
    // lands the snapshot must flag O's oldest; after O's third, X's.
    for (client, index) in [
        (&c1, 0usize),
        (&c2, 5),
        (&c1, 1),
        (&c2, 7),
        (&c1, 3),
        (&c2, 8),
    ] {
        client.send(&room, ClientEvent::PlaceMove { index }).await;
    }
    let snap = snapshot_until(&room, |s| s.board[8].is_some()).await;
    assert_eq!(snap.next_to_fade, Some(0), "X's oldest piece is at 0");

    // X's fourth placement evicts cell 0.
    c1.send(&room, ClientEvent::PlaceMove { index: 6 }).await;
    let snap = snapshot_until(&room, |s| s.board[6].is_some()).await;
    assert_eq!(snap.board[0], None);
}

// =========================================================================
// Win, auto-reset, manual reset
// =========================================================================

async fn play_x_win(room: &RoomHandle, c1: &Client, c2: &Client) {
    for (client, index) in [
        (c1, 0usize),
        (c2, 3),
        (c1, 1),
        (c2, 4),
        (c1, 2),
    ] {
        client.send(room, ClientEvent::PlaceMove { index }).await;
    }
}

#[tokio::test]
async fn test_win_announces_logs_and_auto_resets() {
    let history = MemorySink::new();
    let logs = RoomLogs {
        chat: Arc::new(fadeline_room::NullSink),
        history: history.clone(),
    };
    let room = spawn_room(quick_config(), logs);
    let c1 = Client::join(&room, 1, "ada").await;
    let mut c2 = Client::join(&room, 2, "lin").await;

    play_x_win(&room, &c1, &c2).await;

    let ev = c2
        .recv_until(|ev| matches!(ev, ServerEvent::GameOver { .. }))
        .await;
    match ev {
        ServerEvent::GameOver {
            winner,
            winner_name,
        } => {
            assert_eq!(winner, Seat::X);
            assert_eq!(winner_name.as_deref(), Some("ada"));
        }
        other => panic!("unexpected event {other:?}"),
    }

    // The deferred reset clears the board and the scores survive.
    let snap =
        snapshot_until(&room, |s| s.game_active && s.board[0].is_none()).await;
    assert_eq!(snap.scores.x, 1);

    let lines = history.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Result: X Wins"), "{}", lines[0]);
    assert!(lines[0].contains("Total Turns: 5"), "{}", lines[0]);
}

#[tokio::test]
async fn test_manual_reset_preempts_auto_reset() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;
    let c2 = Client::join(&room, 2, "lin").await;

    play_x_win(&room, &c1, &c2).await;
    c1.send(&room, ClientEvent::ResetGame).await;
    // New game underway before the deferred reset fires.
    c1.send(&room, ClientEvent::PlaceMove { index: 4 }).await;
    let _ = snapshot_until(&room, |s| s.board[4].is_some()).await;

    // Let the stale deferred reset come due; it must not wipe the move.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let snap = room.snapshot().await.unwrap();
    assert_eq!(snap.board[4], Some(Seat::X));
}

// =========================================================================
// AI opponent
// =========================================================================

#[tokio::test]
async fn test_ai_answers_human_move() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;

    c1.send(&room, ClientEvent::PlaceMove { index: 4 }).await;
    let snap = snapshot_until(&room, |s| {
        s.board.iter().any(|c| *c == Some(Seat::O))
    })
    .await;
    assert_eq!(snap.next_turn, Seat::X, "turn returns to the human");
    assert_eq!(
        snap.board.iter().filter(|c| **c == Some(Seat::O)).count(),
        1
    );
}

#[tokio::test]
async fn test_ai_does_not_move_while_paused() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;

    c1.send(&room, ClientEvent::PlaceMove { index: 4 }).await;
    c1.send(&room, ClientEvent::TogglePause).await;
    let _ = snapshot_until(&room, |s| s.paused).await;

    // Give the monitor plenty of ticks; O may only have moved if its
    // decision landed before the pause did.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let snap = room.snapshot().await.unwrap();
    let o_count = snap.board.iter().filter(|c| **c == Some(Seat::O)).count();

    c1.send(&room, ClientEvent::TogglePause).await;
    let resumed = snapshot_until(&room, |s| !s.paused).await;
    assert!(resumed.game_active);
    assert!(o_count <= 1, "AI kept moving while paused");
}

#[tokio::test]
async fn test_difficulty_change_broadcasts_notice() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let mut c1 = Client::join(&room, 1, "ada").await;

    c1.send(
        &room,
        ClientEvent::SetDifficulty {
            level: fadeline_protocol::Difficulty::Hard,
        },
    )
    .await;
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::Notice { .. }))
        .await;
    match ev {
        ServerEvent::Notice { message } => {
            assert!(message.contains("hard"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// =========================================================================
// Timeout eviction
// =========================================================================

#[tokio::test]
async fn test_idle_human_is_evicted_and_seat_vacated() {
    let config = RoomConfig {
        turn_timeout: Duration::from_millis(200),
        ..quick_config()
    };
    let room = spawn_room(config, RoomLogs::disabled());
    let mut c1 = Client::join(&room, 1, "ada").await;

    // X never moves. The monitor must evict and demote to spectator.
    let ev = c1
        .recv_until(|ev| {
            matches!(ev, ServerEvent::RoleAssigned { seat: None, .. })
        })
        .await;
    match ev {
        ServerEvent::RoleAssigned { state, .. } => {
            assert_eq!(state.seat_x.name, None, "seat X vacated");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_promotes_queued_spectator() {
    let config = RoomConfig {
        turn_timeout: Duration::from_millis(200),
        ..quick_config()
    };
    let room = spawn_room(config, RoomLogs::disabled());
    let _c1 = Client::join(&room, 1, "ada").await;
    let _c2 = Client::join(&room, 2, "lin").await;
    let mut c3 = Client::join(&room, 3, "sam").await;

    // X idles out; sam is promoted into the vacated seat.
    let ev = c3
        .recv_until(|ev| matches!(ev, ServerEvent::Promoted { .. }))
        .await;
    match ev {
        ServerEvent::Promoted { seat, state } => {
            assert_eq!(seat, Seat::X);
            assert_eq!(state.seat_x.name.as_deref(), Some("sam"));
            assert!(state.queue.is_empty());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// =========================================================================
// Kick and disconnect
// =========================================================================

#[tokio::test]
async fn test_kick_notifies_opponent_and_promotes_from_queue() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let c1 = Client::join(&room, 1, "ada").await;
    let mut c2 = Client::join(&room, 2, "lin").await;
    let mut c3 = Client::join(&room, 3, "sam").await;

    c1.send(&room, ClientEvent::KickOpponent).await;

    let ev = c2
        .recv_until(|ev| matches!(ev, ServerEvent::Kicked { .. }))
        .await;
    assert!(matches!(ev, ServerEvent::Kicked { .. }));

    let ev = c3
        .recv_until(|ev| matches!(ev, ServerEvent::Promoted { .. }))
        .await;
    match ev {
        ServerEvent::Promoted { seat, .. } => assert_eq!(seat, Seat::O),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_kicking_the_ai_is_rejected() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let mut c1 = Client::join(&room, 1, "ada").await;

    c1.send(&room, ClientEvent::KickOpponent).await;
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::Notice { .. }))
        .await;
    match ev {
        ServerEvent::Notice { message } => {
            assert!(message.contains("cannot be kicked"), "{message}");
        }
        other => panic!("unexpected event {other:?}"),
    }
    let snap = room.snapshot().await.unwrap();
    assert!(snap.seat_o.is_ai, "AI seat untouched");
}

#[tokio::test]
async fn test_disconnect_of_seated_player_refills_from_queue() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let _c1 = Client::join(&room, 1, "ada").await;
    let c2 = Client::join(&room, 2, "lin").await;
    let mut c3 = Client::join(&room, 3, "sam").await;

    room.detach(c2.id).await.unwrap();

    let ev = c3
        .recv_until(|ev| matches!(ev, ServerEvent::Promoted { .. }))
        .await;
    match ev {
        ServerEvent::Promoted { seat, state } => {
            assert_eq!(seat, Seat::O);
            assert_eq!(state.seat_o.name.as_deref(), Some("sam"));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

// =========================================================================
// Chat and heartbeat
// =========================================================================

#[tokio::test]
async fn test_chat_resolves_name_truncates_and_logs() {
    let chat = MemorySink::new();
    let logs = RoomLogs {
        chat: chat.clone(),
        history: Arc::new(fadeline_room::NullSink),
    };
    let room = spawn_room(quick_config(), logs);
    let mut c1 = Client::join(&room, 1, "ada").await;

    let long = "x".repeat(150);
    c1.send(&room, ClientEvent::Chat { message: long }).await;
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::Chat { .. }))
        .await;
    match ev {
        ServerEvent::Chat { sender, message } => {
            assert_eq!(sender, "ada");
            assert_eq!(message.chars().count(), 100);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let lines = chat.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("ada: "), "{}", lines[0]);
}

#[tokio::test]
async fn test_chat_from_unjoined_connection_is_anonymous() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let mut c1 = Client::attach(&room, 1).await;

    room.client(
        c1.id,
        ClientEvent::Chat {
            message: "hello".into(),
        },
    )
    .await
    .unwrap();
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::Chat { .. }))
        .await;
    match ev {
        ServerEvent::Chat { sender, .. } => assert_eq!(sender, "anonymous"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn test_heartbeat_reports_remaining_seconds() {
    let room = spawn_room(quick_config(), RoomLogs::disabled());
    let mut c1 = Client::join(&room, 1, "ada").await;

    c1.send(&room, ClientEvent::Heartbeat).await;
    let ev = c1
        .recv_until(|ev| matches!(ev, ServerEvent::HeartbeatAck { .. }))
        .await;
    match ev {
        ServerEvent::HeartbeatAck { remaining_secs } => {
            assert!(remaining_secs <= 30);
            assert!(remaining_secs >= 25, "got {remaining_secs}");
        }
        other => panic!("unexpected event {other:?}"),
    }
}
