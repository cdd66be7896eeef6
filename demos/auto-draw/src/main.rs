//! Runs one tombola room in auto-draw mode on the console.
//!
//! Every simulated player marks each called number that is on their
//! ticket, so the game ends with the first full house.
//!
//! ```text
//! cargo run -p auto-draw -- [players] [interval_ms]
//! RUST_LOG=debug cargo run -p auto-draw -- 5 100
//! ```

use std::time::Duration;

use tombola::prelude::*;
use tombola::protocol::{Ranking, TicketGrid};
use tombola::telemetry;
use tracing::{debug, info};

const DEFAULT_PLAYERS: usize = 3;
const DEFAULT_INTERVAL_MS: u64 = 250;

fn print_ticket(seat: usize, ticket: &TicketGrid) {
    println!("player {seat}");
    for row in ticket {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(n) => format!("{n:>3}"),
                None => "   ".to_string(),
            })
            .collect();
        println!("  |{}|", cells.join("|"));
    }
}

fn print_rankings(winner: Option<usize>, rankings: &[Ranking]) {
    match winner {
        Some(seat) => println!("\nFULL HOUSE: player {seat}"),
        None => println!("\nno full house, the house wins"),
    }
    for (place, ranking) in rankings.iter().enumerate() {
        println!(
            "  {}. player {} with {} points",
            place + 1,
            ranking.player,
            ranking.points
        );
    }
}

fn on_ticket(ticket: &TicketGrid, number: u8) -> bool {
    ticket.iter().flatten().flatten().any(|n| *n == number)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let mut args = std::env::args().skip(1);
    let player_count = args
        .next()
        .map(|a| a.parse::<usize>())
        .transpose()?
        .unwrap_or(DEFAULT_PLAYERS);
    let interval_ms = args
        .next()
        .map(|a| a.parse::<u64>())
        .transpose()?
        .unwrap_or(DEFAULT_INTERVAL_MS);

    let mut rooms = RoomManager::with_config(RoomConfig::auto(Duration::from_millis(interval_ms)));
    let Response::SessionCreated {
        room_id, tickets, ..
    } = rooms.create_room(CreateSession { player_count })?
    else {
        return Err("room did not answer with session_created".into());
    };

    for (seat, ticket) in tickets.iter().enumerate() {
        print_ticket(seat, ticket);
    }

    let room = rooms.get(room_id)?;
    let mut events = room.subscribe().await?;
    room.request(Request::StartSession).await?;
    info!(%room_id, player_count, interval_ms, "auto-draw started");

    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::NumberDrawn {
                number,
                position,
                total,
                ..
            } => {
                info!(number, "call {position}/{total}");
                for (seat, ticket) in tickets.iter().enumerate() {
                    if !on_ticket(ticket, number) {
                        continue;
                    }
                    let request = Request::ToggleMark {
                        player: seat,
                        number,
                    };
                    // An earlier seat may have just ended the game.
                    if let Err(err) = room.request(request).await {
                        debug!(player = seat, number, error = %err, "mark not applied");
                    }
                }
            }
            RoomEvent::AchievementAwarded(award) => {
                info!(
                    player = award.player,
                    points = award.points,
                    "{} for player {}",
                    award.kind,
                    award.player
                );
            }
            RoomEvent::GameOver { winner, rankings } => {
                print_rankings(winner, &rankings);
                break;
            }
            RoomEvent::SessionReset | RoomEvent::AutoDrawChanged { .. } => {}
        }
    }

    rooms.destroy_room(room_id).await?;
    Ok(())
}
