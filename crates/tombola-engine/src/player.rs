//! Per-player state: ticket, marks, points, and awards.

use std::collections::BTreeSet;

use tombola_protocol::AchievementKind;

use crate::{DrawPool, EngineError, Ticket};

/// One seat at the table.
///
/// Marks are the player's own claims and may include numbers that have
/// not been called yet. Whether a mark counts is decided at evaluation
/// time against the call history, so validity is never stored.
#[derive(Debug, Clone)]
pub struct PlayerState {
    index: usize,
    ticket: Ticket,
    marked: BTreeSet<u8>,
    points: u32,
    awarded: Vec<AchievementKind>,
}

impl PlayerState {
    pub fn new(index: usize, ticket: Ticket) -> Self {
        Self {
            index,
            ticket,
            marked: BTreeSet::new(),
            points: 0,
            awarded: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ticket(&self) -> &Ticket {
        &self.ticket
    }

    pub fn marked(&self) -> &BTreeSet<u8> {
        &self.marked
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Achievements earned so far, in the order they were awarded.
    pub fn achievements(&self) -> &[AchievementKind] {
        &self.awarded
    }

    pub fn has(&self, kind: AchievementKind) -> bool {
        self.awarded.contains(&kind)
    }

    /// Flips the mark on `number` and returns whether it is now marked.
    ///
    /// # Errors
    /// [`EngineError::InvalidMark`] if the number is not on this ticket;
    /// the marked set is left untouched.
    pub fn toggle(&mut self, number: u8) -> Result<bool, EngineError> {
        self.check_on_ticket(number)?;
        if self.marked.remove(&number) {
            Ok(false)
        } else {
            self.marked.insert(number);
            Ok(true)
        }
    }

    /// Replaces the whole marked set. All-or-nothing: if any number is
    /// off the ticket, nothing changes.
    pub fn replace_marks(&mut self, numbers: &[u8]) -> Result<(), EngineError> {
        for &number in numbers {
            self.check_on_ticket(number)?;
        }
        self.marked = numbers.iter().copied().collect();
        Ok(())
    }

    pub(crate) fn check_on_ticket(&self, number: u8) -> Result<(), EngineError> {
        if self.ticket.contains(number) {
            Ok(())
        } else {
            Err(EngineError::InvalidMark {
                player: self.index,
                number,
            })
        }
    }

    /// Marks that are also in the call history.
    pub fn valid_marks<'a>(&'a self, pool: &'a DrawPool) -> impl Iterator<Item = u8> + 'a {
        self.marked.iter().copied().filter(|n| pool.is_called(*n))
    }

    pub fn valid_mark_count(&self, pool: &DrawPool) -> usize {
        self.valid_marks(pool).count()
    }

    /// `true` when every number on the ticket is both marked and called.
    pub fn is_full_house(&self, pool: &DrawPool) -> bool {
        self.ticket
            .numbers()
            .all(|n| self.marked.contains(&n) && pool.is_called(n))
    }

    /// Records an award. Returns `false` (and changes nothing) if the
    /// player already holds it.
    pub(crate) fn award(&mut self, kind: AchievementKind) -> bool {
        if self.has(kind) {
            return false;
        }
        self.awarded.push(kind);
        self.points += kind.points();
        true
    }
}
