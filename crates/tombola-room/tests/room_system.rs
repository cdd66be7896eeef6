//! Integration tests for rooms driving real tombola sessions.

use std::collections::HashSet;
use std::time::Duration;

use tombola_engine::{EngineError, GenerationError, SessionConfig};
use tombola_protocol::{
    AchievementKind, CreateSession, MarkedByPlayer, Request, Response, RoomEvent, RoomId,
    SessionStatus, TicketGrid,
};
use tombola_room::{EventReceiver, RoomConfig, RoomError, RoomHandle, RoomManager};

// =========================================================================
// Helpers
// =========================================================================

/// Creates a seeded room and returns its handle and the dealt tickets.
fn seeded_room(mgr: &mut RoomManager, seed: u64, players: usize) -> (RoomHandle, Vec<TicketGrid>) {
    let config = SessionConfig::with_players(players).seeded(seed);
    match mgr.create_room_with(config).unwrap() {
        Response::SessionCreated {
            room_id, tickets, ..
        } => (mgr.get(room_id).unwrap(), tickets),
        other => panic!("unexpected response: {other:?}"),
    }
}

async fn start(room: &RoomHandle) {
    room.request(Request::StartSession).await.unwrap();
}

async fn draw(room: &RoomHandle) -> (u8, bool) {
    match room.request(Request::DrawNext).await.unwrap() {
        Response::NumberDrawn {
            number, report, ..
        } => (number, report.game_ended),
        other => panic!("unexpected response: {other:?}"),
    }
}

async fn called(room: &RoomHandle) -> Vec<u8> {
    match room.request(Request::GetAllCalledNumbers).await.unwrap() {
        Response::CalledNumbers { called_numbers, .. } => called_numbers,
        other => panic!("unexpected response: {other:?}"),
    }
}

fn numbers(ticket: &TicketGrid) -> Vec<u8> {
    ticket.iter().flatten().flatten().copied().collect()
}

/// Everything currently queued on a feed.
fn drain(events: &mut EventReceiver) -> Vec<RoomEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

// =========================================================================
// RoomManager
// =========================================================================

#[tokio::test]
async fn test_create_room_deals_tickets() {
    let mut mgr = RoomManager::new();
    let response = mgr.create_room(CreateSession { player_count: 4 }).unwrap();

    let Response::SessionCreated {
        room_id,
        player_count,
        tickets,
        state,
    } = response
    else {
        panic!("unexpected response");
    };
    assert_eq!(player_count, 4);
    assert_eq!(tickets.len(), 4);
    assert!(tickets.iter().all(|t| numbers(t).len() == 15));
    assert_eq!(state, SessionStatus::Waiting);
    assert_eq!(mgr.room_ids(), vec![room_id]);
}

#[tokio::test]
async fn test_create_room_rejects_bad_player_count() {
    let mut mgr = RoomManager::new();
    for player_count in [0, 2, 6] {
        let err = mgr.create_room(CreateSession { player_count }).unwrap_err();
        assert!(matches!(
            err,
            RoomError::Engine(EngineError::Generation(GenerationError::InvalidPlayerCount(n)))
                if n == player_count
        ));
    }
    assert_eq!(mgr.room_count(), 0);
}

#[tokio::test]
async fn test_create_room_returns_unique_ids() {
    let mut mgr = RoomManager::new();
    let (r1, _) = seeded_room(&mut mgr, 1, 3);
    let (r2, _) = seeded_room(&mut mgr, 1, 3);
    assert_ne!(r1.room_id(), r2.room_id());
    assert_eq!(mgr.room_count(), 2);
}

#[tokio::test]
async fn test_request_unknown_room() {
    let mgr = RoomManager::new();
    let result = mgr.request(RoomId(999_999), Request::DrawNext).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_destroy_room() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 2, 3);

    mgr.destroy_room(room.room_id()).await.unwrap();

    assert_eq!(mgr.room_count(), 0);
    assert!(matches!(
        mgr.get(room.room_id()),
        Err(RoomError::NotFound(_))
    ));
    // Handles cloned before the destroy see a dead actor.
    let result = room.request(Request::StartSession).await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}

#[tokio::test]
async fn test_remove_room_leaves_shutdown_to_caller() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 4, 3);

    let removed = mgr.remove_room(room.room_id()).unwrap();
    assert_eq!(mgr.room_count(), 0);
    assert!(matches!(
        mgr.remove_room(room.room_id()),
        Err(RoomError::NotFound(_))
    ));

    // Unregistered but still running until told otherwise.
    start(&removed).await;
    assert_eq!(removed.info().await.unwrap().state, SessionStatus::Active);

    removed.shutdown().await.unwrap();
    let result = room.request(Request::DrawNext).await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}

#[tokio::test]
async fn test_destroy_room_not_found() {
    let mut mgr = RoomManager::new();
    let result = mgr.destroy_room(RoomId(999_998)).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_list_rooms_reports_state() {
    let mut mgr = RoomManager::new();
    let (r1, _) = seeded_room(&mut mgr, 3, 3);
    let (r2, _) = seeded_room(&mut mgr, 4, 5);
    start(&r2).await;
    draw(&r2).await;

    let infos = mgr.list_rooms().await;

    assert_eq!(infos.len(), 2);
    let first = infos.iter().find(|i| i.room_id == r1.room_id()).unwrap();
    let second = infos.iter().find(|i| i.room_id == r2.room_id()).unwrap();
    assert_eq!(first.state, SessionStatus::Waiting);
    assert_eq!(second.state, SessionStatus::Active);
    assert_eq!(second.player_count, 5);
    assert_eq!(second.draws, 1);
}

// =========================================================================
// Boundary operations
// =========================================================================

#[tokio::test]
async fn test_operations_before_start_are_rejected() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 5, 3);

    for request in [
        Request::DrawNext,
        Request::GetAllCalledNumbers,
        Request::ToggleMark {
            player: 0,
            number: 1,
        },
    ] {
        let err = room.request(request).await.unwrap_err();
        assert!(matches!(
            err,
            RoomError::Engine(EngineError::InvalidTransition {
                state: SessionStatus::Waiting,
                ..
            })
        ));
    }
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 6, 3);

    let response = room.request(Request::StartSession).await.unwrap();
    assert_eq!(
        response,
        Response::SessionStarted {
            state: SessionStatus::Active,
            total: 90
        }
    );
    assert!(room.request(Request::StartSession).await.is_err());
}

#[tokio::test]
async fn test_draws_and_called_numbers_agree() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 7, 3);
    start(&room).await;

    let mut drawn = Vec::new();
    for _ in 0..10 {
        drawn.push(draw(&room).await.0);
    }

    match room.request(Request::GetAllCalledNumbers).await.unwrap() {
        Response::CalledNumbers {
            called_numbers,
            current_number,
            state,
        } => {
            assert_eq!(called_numbers, drawn);
            assert_eq!(current_number, drawn.last().copied());
            assert_eq!(state, SessionStatus::Active);
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn test_first_five_through_room() {
    let mut mgr = RoomManager::new();
    let (room, tickets) = seeded_room(&mut mgr, 8, 3);
    let mine = numbers(&tickets[0]);
    start(&room).await;

    let mut hits = Vec::new();
    while hits.len() < 5 {
        let (number, _) = draw(&room).await;
        if mine.contains(&number) {
            hits.push(number);
        }
    }

    let mut last = None;
    for number in hits {
        match room
            .request(Request::ToggleMark { player: 0, number })
            .await
            .unwrap()
        {
            Response::MarkToggled { marked, report, .. } => {
                assert!(marked);
                last = Some(report);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    let report = last.unwrap();
    assert_eq!(report.achievements[&AchievementKind::FirstFive], vec![0]);
    assert_eq!(report.rankings[0].player, 0);
    assert_eq!(report.rankings[0].points, 50);
}

#[tokio::test]
async fn test_toggle_off_ticket_is_invalid_mark() {
    let mut mgr = RoomManager::new();
    let (room, tickets) = seeded_room(&mut mgr, 9, 3);
    start(&room).await;
    let absent = (1..=90u8)
        .find(|n| !numbers(&tickets[2]).contains(n))
        .unwrap();

    let err = room
        .request(Request::ToggleMark {
            player: 2,
            number: absent,
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RoomError::Engine(EngineError::InvalidMark { player: 2, number }) if number == absent
    ));
}

#[tokio::test]
async fn test_full_house_ends_game_and_is_announced() {
    let mut mgr = RoomManager::new();
    let (room, tickets) = seeded_room(&mut mgr, 10, 3);
    let mut events = room.subscribe().await.unwrap();
    start(&room).await;

    let mut marks = MarkedByPlayer::new();
    marks.insert(1, numbers(&tickets[1]));
    room.request(Request::CheckAchievements {
        marked_by_player: marks,
    })
    .await
    .unwrap();

    loop {
        let (_, ended) = draw(&room).await;
        if ended {
            break;
        }
    }

    let info = room.info().await.unwrap();
    assert_eq!(info.state, SessionStatus::Finished);
    assert_eq!(info.winner, Some(1));

    let events = drain(&mut events);
    let awarded: Vec<AchievementKind> = events
        .iter()
        .filter_map(|e| match e {
            RoomEvent::AchievementAwarded(award) if award.player == 1 => Some(award.kind),
            _ => None,
        })
        .collect();
    assert_eq!(awarded, AchievementKind::ALL.to_vec());
    assert!(matches!(
        events.last(),
        Some(RoomEvent::GameOver {
            winner: Some(1),
            ..
        })
    ));

    let err = room.request(Request::DrawNext).await.unwrap_err();
    assert!(matches!(
        err,
        RoomError::Engine(EngineError::InvalidTransition {
            state: SessionStatus::Finished,
            ..
        })
    ));
}

#[tokio::test]
async fn test_reset_deals_new_tickets() {
    let mut mgr = RoomManager::new();
    let (room, tickets) = seeded_room(&mut mgr, 11, 4);
    start(&room).await;
    draw(&room).await;

    match room.request(Request::ResetSession).await.unwrap() {
        Response::SessionReset {
            state,
            tickets: fresh,
        } => {
            assert_eq!(state, SessionStatus::Waiting);
            assert_eq!(fresh.len(), 4);
            assert_ne!(fresh, tickets);
        }
        other => panic!("unexpected response: {other:?}"),
    }

    start(&room).await;
    assert!(called(&room).await.is_empty());
}

#[tokio::test]
async fn test_concurrent_draws_are_serialized() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 12, 3);
    start(&room).await;

    let mut tasks = Vec::new();
    for _ in 0..90 {
        let room = room.clone();
        tasks.push(tokio::spawn(async move {
            match room.request(Request::DrawNext).await.unwrap() {
                Response::NumberDrawn {
                    number, position, ..
                } => (number, position),
                other => panic!("unexpected response: {other:?}"),
            }
        }));
    }

    let mut numbers = HashSet::new();
    let mut positions = HashSet::new();
    for task in tasks {
        let (number, position) = task.await.unwrap();
        numbers.insert(number);
        positions.insert(position);
    }

    assert_eq!(numbers, (1..=90).collect());
    assert_eq!(positions, (1..=90).collect());
    assert_eq!(room.info().await.unwrap().state, SessionStatus::Finished);
}

// =========================================================================
// Auto-draw
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_auto_draw_runs_game_to_completion() {
    let mut mgr = RoomManager::with_config(RoomConfig::auto(Duration::from_secs(3)));
    let (room, _) = seeded_room(&mut mgr, 13, 3);
    let mut events = room.subscribe().await.unwrap();
    start(&room).await;

    let mut draws = 0;
    let winner = loop {
        match events.recv().await.unwrap() {
            RoomEvent::NumberDrawn { .. } => draws += 1,
            RoomEvent::GameOver { winner, .. } => break winner,
            _ => {}
        }
    };

    assert_eq!(draws, 90);
    assert_eq!(winner, None);
    let info = room.info().await.unwrap();
    assert_eq!(info.state, SessionStatus::Finished);
    assert!(!info.auto_draw);
}

#[tokio::test(start_paused = true)]
async fn test_auto_draw_fires_on_interval() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 14, 3);
    start(&room).await;

    let response = room
        .request(Request::SetAutoDraw { enabled: true })
        .await
        .unwrap();
    assert_eq!(response, Response::AutoDraw { enabled: true });

    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(room.info().await.unwrap().draws, 1);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(room.info().await.unwrap().draws, 3);

    room.request(Request::SetAutoDraw { enabled: false })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(room.info().await.unwrap().draws, 3);
}

#[tokio::test(start_paused = true)]
async fn test_manual_draws_mix_with_auto_draws() {
    let mut mgr = RoomManager::with_config(RoomConfig::auto(Duration::from_secs(3)));
    let (room, _) = seeded_room(&mut mgr, 15, 3);
    start(&room).await;

    draw(&room).await;
    tokio::time::sleep(Duration::from_millis(3500)).await;
    draw(&room).await;

    let history = called(&room).await;
    assert_eq!(history.len(), 3);
    let unique: HashSet<u8> = history.iter().copied().collect();
    assert_eq!(unique.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_auto_draw() {
    let mut mgr = RoomManager::with_config(RoomConfig::auto(Duration::from_secs(3)));
    let (room, _) = seeded_room(&mut mgr, 16, 3);
    start(&room).await;
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(room.info().await.unwrap().draws, 1);

    let mut events = room.subscribe().await.unwrap();
    room.request(Request::ResetSession).await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let info = room.info().await.unwrap();
    assert_eq!(info.state, SessionStatus::Waiting);
    assert_eq!(info.draws, 0);
    assert!(!info.auto_draw);

    let events = drain(&mut events);
    assert_eq!(
        events,
        vec![
            RoomEvent::AutoDrawChanged { enabled: false },
            RoomEvent::SessionReset,
        ]
    );

    // Starting again re-arms auto-draw from the room config.
    start(&room).await;
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(room.info().await.unwrap().draws, 1);
}

#[tokio::test(start_paused = true)]
async fn test_auto_draw_cannot_be_enabled_after_finish() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 17, 3);
    start(&room).await;
    while !draw(&room).await.1 {}

    let err = room
        .request(Request::SetAutoDraw { enabled: true })
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::Engine(EngineError::InvalidTransition { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_auto_draw_while_waiting_starts_with_session() {
    let mut mgr = RoomManager::new();
    let (room, _) = seeded_room(&mut mgr, 18, 3);

    room.request(Request::SetAutoDraw { enabled: true })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(room.info().await.unwrap().draws, 0);

    start(&room).await;
    tokio::time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(room.info().await.unwrap().draws, 1);
}
