//! Room actor: an isolated Tokio task that owns one game session.
//!
//! The actor is the session's serialization boundary. Requests arrive on
//! an mpsc channel and are applied one at a time, each followed by its
//! achievement pass, before the next command or timer tick is looked at.
//! The auto-draw timer is just another `select!` branch, so a timed draw
//! can never interleave with a player's mark or a reset.

use tokio::sync::{mpsc, oneshot};
use tombola_engine::{DrawOutcome, EngineError, GameSession};
use tombola_protocol::{AchievementReport, Request, Response, RoomEvent, RoomId, SessionStatus, MAX_NUMBER};
use tombola_tick::DrawTimer;

use crate::{RoomConfig, RoomError};

/// Receiving end of a room's event feed.
pub type EventReceiver = mpsc::UnboundedReceiver<RoomEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Apply a boundary operation to the session.
    Request {
        request: Request,
        reply: oneshot::Sender<Result<Response, RoomError>>,
    },

    /// Open a new event feed.
    Subscribe {
        reply: oneshot::Sender<EventReceiver>,
    },

    /// Request a metadata snapshot.
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Shut down the room.
    Shutdown,
}

/// A snapshot of room metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub state: SessionStatus,
    pub player_count: usize,
    /// Numbers called so far.
    pub draws: usize,
    pub auto_draw: bool,
    pub winner: Option<usize>,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Every clone talks to the same session.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Applies `request` to the session and waits for the result.
    pub async fn request(&self, request: Request) -> Result<Response, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Request {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?
    }

    /// Opens an event feed. Events published before the call are not
    /// replayed.
    pub async fn subscribe(&self) -> Result<EventReceiver, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Subscribe { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Tells the room to shut down. Auto-draw stops with it.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    session: GameSession,
    timer: DrawTimer,
    /// Whether auto-draw is switched on. The timer runs only while this
    /// is set and the session is active.
    auto_draw: bool,
    subscribers: Vec<mpsc::UnboundedSender<RoomEvent>>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!(
            room_id = %self.room_id,
            players = self.session.player_count(),
            "room actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(RoomCommand::Request { request, reply }) => {
                        let result = self.handle_request(request);
                        let _ = reply.send(result);
                    }
                    Some(RoomCommand::Subscribe { reply }) => {
                        let (tx, rx) = mpsc::unbounded_channel();
                        self.subscribers.push(tx);
                        let _ = reply.send(rx);
                    }
                    Some(RoomCommand::GetInfo { reply }) => {
                        let _ = reply.send(self.info());
                    }
                    Some(RoomCommand::Shutdown) | None => {
                        tracing::info!(room_id = %self.room_id, "room shutting down");
                        break;
                    }
                },
                _ = self.timer.wait_for_tick() => self.handle_tick(),
            }
        }

        self.timer.pause();
        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_request(&mut self, request: Request) -> Result<Response, RoomError> {
        let was_finished = self.session.state().is_finished();
        let result = self.apply(request);
        self.settle(was_finished);
        result
    }

    fn apply(&mut self, request: Request) -> Result<Response, RoomError> {
        let response = match request {
            Request::StartSession => {
                self.session.start()?;
                if self.config.auto_draw {
                    self.set_auto_draw(true);
                }
                Response::SessionStarted {
                    state: self.session.state(),
                    total: MAX_NUMBER as usize,
                }
            }
            Request::DrawNext => {
                let outcome = self.session.draw_next()?;
                self.publish_draw(&outcome);
                let draw = outcome.draw;
                Response::NumberDrawn {
                    number: draw.number,
                    position: draw.position,
                    total: draw.total,
                    is_finished: draw.is_finished,
                    report: outcome.report,
                }
            }
            Request::ToggleMark { player, number } => {
                let outcome = self.session.toggle_mark(player, number)?;
                self.publish_awards(&outcome.report);
                Response::MarkToggled {
                    player: outcome.player,
                    number: outcome.number,
                    marked: outcome.marked,
                    report: outcome.report,
                }
            }
            Request::CheckAchievements { marked_by_player } => {
                let report = self.session.check_achievements(&marked_by_player)?;
                self.publish_awards(&report);
                Response::Achievements(report)
            }
            Request::GetAllCalledNumbers => Response::CalledNumbers {
                called_numbers: self.session.called_numbers()?.to_vec(),
                current_number: self.session.current_number(),
                state: self.session.state(),
            },
            Request::ResetSession => {
                self.session.reset();
                self.set_auto_draw(false);
                self.publish(RoomEvent::SessionReset);
                tracing::info!(room_id = %self.room_id, "session reset");
                Response::SessionReset {
                    state: self.session.state(),
                    tickets: self.session.tickets(),
                }
            }
            Request::SetAutoDraw { enabled } => {
                if enabled && self.session.state().is_finished() {
                    return Err(EngineError::InvalidTransition {
                        operation: "enable auto-draw",
                        state: self.session.state(),
                    }
                    .into());
                }
                self.set_auto_draw(enabled);
                Response::AutoDraw { enabled }
            }
        };
        Ok(response)
    }

    fn handle_tick(&mut self) {
        let was_finished = self.session.state().is_finished();
        match self.session.draw_next() {
            Ok(outcome) => self.publish_draw(&outcome),
            Err(err) => tracing::warn!(
                room_id = %self.room_id,
                error = %err,
                "auto-draw failed"
            ),
        }
        self.settle(was_finished);
    }

    /// Announces the end of the game if this turn finished it, then
    /// brings the timer in line with the session.
    fn settle(&mut self, was_finished: bool) {
        if !was_finished && self.session.state().is_finished() {
            let report = self.session.report();
            tracing::info!(
                room_id = %self.room_id,
                winner = ?report.winner,
                draws = self.session.pool().history().len(),
                "game over"
            );
            self.publish(RoomEvent::GameOver {
                winner: report.winner,
                rankings: report.rankings,
            });
            self.set_auto_draw(false);
        }

        if self.auto_draw && self.session.state().is_active() {
            self.timer.resume();
        } else {
            self.timer.pause();
        }
    }

    fn set_auto_draw(&mut self, enabled: bool) {
        if self.auto_draw == enabled {
            return;
        }
        self.auto_draw = enabled;
        tracing::debug!(room_id = %self.room_id, enabled, "auto-draw toggled");
        self.publish(RoomEvent::AutoDrawChanged { enabled });
    }

    fn publish_draw(&mut self, outcome: &DrawOutcome) {
        let draw = outcome.draw;
        self.publish(RoomEvent::NumberDrawn {
            number: draw.number,
            position: draw.position,
            total: draw.total,
            is_finished: draw.is_finished,
        });
        self.publish_awards(&outcome.report);
    }

    fn publish_awards(&mut self, report: &AchievementReport) {
        for award in &report.new_achievements {
            self.publish(RoomEvent::AchievementAwarded(*award));
        }
    }

    /// Sends to every open feed and forgets the closed ones.
    fn publish(&mut self, event: RoomEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id,
            state: self.session.state(),
            player_count: self.session.player_count(),
            draws: self.session.pool().history().len(),
            auto_draw: self.auto_draw,
            winner: self.session.winner(),
        }
    }
}

/// Spawns a room actor around `session` and returns a handle to it.
pub(crate) fn spawn_room(room_id: RoomId, config: RoomConfig, session: GameSession) -> RoomHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RoomActor {
        room_id,
        timer: DrawTimer::idle(config.timer()),
        config,
        session,
        auto_draw: false,
        subscribers: Vec::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
