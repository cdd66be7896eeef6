//! The game session state machine.
//!
//! ```text
//! Waiting ──start──→ Active ──full house / last draw / abandon──→ Finished
//!    ↑                                                              │
//!    └──────────────────────────reset (from any state)──────────────┘
//! ```
//!
//! A session owns everything about one game: its random source, the
//! tickets, the pouch, the marks, and the award ledger. Drawing and
//! marking are each followed by an achievement pass over the state as it
//! stands at the end of that mutation, before control returns to the
//! caller.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tombola_protocol::{AchievementReport, MarkedByPlayer, SessionStatus, TicketGrid};

use crate::achievement::{self, AchievementLedger};
use crate::ticket::{generate_ticket, generate_tickets};
use crate::{Draw, DrawPool, EngineError, PlayerState, SessionConfig};

/// A draw together with the achievement pass that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub draw: Draw,
    pub report: AchievementReport,
}

/// A mark toggle together with the achievement pass that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkOutcome {
    pub player: usize,
    pub number: u8,
    /// Whether the number is marked after the toggle.
    pub marked: bool,
    pub report: AchievementReport,
}

/// One tombola game, from dealing tickets to the final call.
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    state: SessionStatus,
    rng: StdRng,
    players: Vec<PlayerState>,
    pool: DrawPool,
    ledger: AchievementLedger,
    winner: Option<usize>,
}

impl GameSession {
    /// Deals tickets and returns a session in `Waiting`.
    ///
    /// # Errors
    /// [`EngineError::Generation`] if the player count is outside `3..=5`.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let players = generate_tickets(&mut rng, config.player_count)?
            .into_iter()
            .enumerate()
            .map(|(index, ticket)| PlayerState::new(index, ticket))
            .collect();

        tracing::info!(players = config.player_count, "session created");

        Ok(Self {
            config,
            state: SessionStatus::Waiting,
            rng,
            players,
            pool: DrawPool::new(),
            ledger: AchievementLedger::new(),
            winner: None,
        })
    }

    /// Shorthand for an OS-seeded session with `player_count` players.
    pub fn with_players(player_count: usize) -> Result<Self, EngineError> {
        Self::new(SessionConfig::with_players(player_count))
    }

    // -- accessors ----------------------------------------------------------

    pub fn state(&self) -> SessionStatus {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Result<&PlayerState, EngineError> {
        self.players
            .get(index)
            .ok_or(EngineError::UnknownPlayer(index))
    }

    /// Every player's ticket in wire form, by seat.
    pub fn tickets(&self) -> Vec<TicketGrid> {
        self.players.iter().map(|p| *p.ticket().grid()).collect()
    }

    pub fn pool(&self) -> &DrawPool {
        &self.pool
    }

    pub fn ledger(&self) -> &AchievementLedger {
        &self.ledger
    }

    /// The full-house holder, once the session has one.
    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    // -- lifecycle ----------------------------------------------------------

    /// Arms the pouch and moves `Waiting → Active`.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if !self.state.can_start() {
            return Err(self.invalid("start"));
        }
        self.pool = DrawPool::new();
        self.state = SessionStatus::Active;
        tracing::info!(players = self.players.len(), "session started");
        Ok(())
    }

    /// Ends an active session with no winner.
    pub fn abandon(&mut self) -> Result<(), EngineError> {
        self.require_active("abandon")?;
        self.finish(None);
        Ok(())
    }

    /// Throws the whole game away: fresh tickets for the same number of
    /// players, a full pouch, no marks, no awards, back to `Waiting`.
    /// Allowed from every state.
    pub fn reset(&mut self) {
        let rng = &mut self.rng;
        self.players = (0..self.players.len())
            .map(|index| PlayerState::new(index, generate_ticket(rng)))
            .collect();
        self.pool = DrawPool::new();
        self.ledger = AchievementLedger::new();
        self.winner = None;
        self.state = SessionStatus::Waiting;
        tracing::info!(players = self.players.len(), "session reset");
    }

    // -- play ---------------------------------------------------------------

    /// Calls the next number, then runs an achievement pass.
    ///
    /// The draw that empties the pouch reports `is_finished` and, unless
    /// that same pass finds a full house, finishes the session with the
    /// house winning.
    ///
    /// # Errors
    /// - [`EngineError::InvalidTransition`] outside `Active`
    /// - [`EngineError::PoolExhausted`] if nothing is left; the session
    ///   is finished as a side effect
    pub fn draw_next(&mut self) -> Result<DrawOutcome, EngineError> {
        self.require_active("draw_next")?;

        let draw = match self.pool.draw(&mut self.rng) {
            Ok(draw) => draw,
            Err(err) => {
                self.finish(None);
                return Err(err);
            }
        };
        tracing::debug!(
            number = draw.number,
            position = draw.position,
            total = draw.total,
            "number drawn"
        );

        let report = self.run_pass(draw.is_finished);
        Ok(DrawOutcome { draw, report })
    }

    /// Flips a player's mark on `number`, then runs an achievement pass.
    ///
    /// # Errors
    /// - [`EngineError::InvalidTransition`] outside `Active`
    /// - [`EngineError::UnknownPlayer`] for a bad seat
    /// - [`EngineError::InvalidMark`] if the number is not on the ticket
    pub fn toggle_mark(&mut self, player: usize, number: u8) -> Result<MarkOutcome, EngineError> {
        self.require_active("toggle_mark")?;
        let marked = self
            .players
            .get_mut(player)
            .ok_or(EngineError::UnknownPlayer(player))?
            .toggle(number)?;
        tracing::debug!(player, number, marked, "mark toggled");

        let report = self.run_pass(false);
        Ok(MarkOutcome {
            player,
            number,
            marked,
            report,
        })
    }

    /// Toggles by grid position, the way a UI click arrives.
    ///
    /// Clicking a blank cell is a no-op and returns `Ok(None)`.
    pub fn toggle_cell(
        &mut self,
        player: usize,
        row: usize,
        column: usize,
    ) -> Result<Option<MarkOutcome>, EngineError> {
        self.require_active("toggle_mark")?;
        match self.player(player)?.ticket().cell(row, column) {
            Some(number) => self.toggle_mark(player, number).map(Some),
            None => Ok(None),
        }
    }

    /// Replaces the marks of every listed player with the given sets,
    /// then runs an achievement pass. Players not listed keep their
    /// marks; an empty map just re-evaluates.
    ///
    /// Validation happens before anything changes, so a bad seat or an
    /// off-ticket number leaves every player as it was.
    pub fn check_achievements(
        &mut self,
        marked_by_player: &MarkedByPlayer,
    ) -> Result<AchievementReport, EngineError> {
        self.require_active("check_achievements")?;

        for (&index, numbers) in marked_by_player {
            let player = self.player(index)?;
            for &number in numbers {
                player.check_on_ticket(number)?;
            }
        }
        for (&index, numbers) in marked_by_player {
            self.players[index].replace_marks(numbers)?;
        }

        Ok(self.run_pass(false))
    }

    /// The call history, oldest first. Available once the session has
    /// started, including after it finished.
    pub fn called_numbers(&self) -> Result<&[u8], EngineError> {
        if self.state == SessionStatus::Waiting {
            return Err(self.invalid("read called numbers"));
        }
        Ok(self.pool.history())
    }

    /// The most recent call, if any.
    pub fn current_number(&self) -> Option<u8> {
        self.pool.current()
    }

    /// A report of the current standings without running a pass.
    pub fn report(&self) -> AchievementReport {
        self.build_report(Vec::new())
    }

    // -- internals ----------------------------------------------------------

    fn run_pass(&mut self, pool_exhausted: bool) -> AchievementReport {
        let outcome = achievement::evaluate(&mut self.players, &self.pool, &mut self.ledger);

        if let Some(winner) = outcome.full_house {
            self.finish(Some(winner));
        } else if pool_exhausted {
            self.finish(None);
        }

        self.build_report(outcome.new_awards)
    }

    fn build_report(&self, new_achievements: Vec<tombola_protocol::Award>) -> AchievementReport {
        AchievementReport {
            achievements: self.ledger.by_kind(),
            player_points: self.players.iter().map(PlayerState::points).collect(),
            rankings: achievement::rankings(&self.players, &self.ledger),
            new_achievements,
            game_ended: self.state.is_finished(),
            winner: self.winner,
            state: self.state,
        }
    }

    fn finish(&mut self, winner: Option<usize>) {
        if self.state.is_finished() {
            return;
        }
        self.state = SessionStatus::Finished;
        self.winner = winner;
        match winner {
            Some(player) => tracing::info!(
                player,
                draws = self.pool.history().len(),
                "session finished with full house"
            ),
            None => tracing::info!(
                draws = self.pool.history().len(),
                "session finished with no winner"
            ),
        }
    }

    fn require_active(&self, operation: &'static str) -> Result<(), EngineError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> EngineError {
        EngineError::InvalidTransition {
            operation,
            state: self.state,
        }
    }
}
