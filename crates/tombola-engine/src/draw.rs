//! The pouch: numbers still to be drawn plus the call history.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tombola_protocol::MAX_NUMBER;

use crate::EngineError;

const TOTAL: usize = MAX_NUMBER as usize;

/// One number coming out of the pouch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub number: u8,
    /// 1-based position in the call history.
    pub position: usize,
    /// Always 90.
    pub total: usize,
    /// `true` if this draw emptied the pouch. Set by the same call that
    /// takes the last number, never by a later one.
    pub is_finished: bool,
}

/// Undrawn numbers and the ordered history of called ones.
///
/// The two are always disjoint and together hold exactly `1..=90`.
#[derive(Debug, Clone)]
pub struct DrawPool {
    remaining: Vec<u8>,
    history: Vec<u8>,
    /// `called[n]` mirrors `history.contains(&n)` for O(1) lookups.
    called: [bool; TOTAL + 1],
}

impl DrawPool {
    /// A full pouch with nothing called.
    pub fn new() -> Self {
        Self {
            remaining: (1..=MAX_NUMBER).collect(),
            history: Vec::with_capacity(TOTAL),
            called: [false; TOTAL + 1],
        }
    }

    /// Draws one of the remaining numbers uniformly at random.
    ///
    /// Picks an index and `swap_remove`s it, so no reshuffling happens
    /// between draws.
    ///
    /// # Errors
    /// [`EngineError::PoolExhausted`] once all 90 numbers are out.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Draw, EngineError> {
        if self.remaining.is_empty() {
            return Err(EngineError::PoolExhausted);
        }
        let index = rng.random_range(0..self.remaining.len());
        let number = self.remaining.swap_remove(index);
        self.history.push(number);
        self.called[number as usize] = true;

        Ok(Draw {
            number,
            position: self.history.len(),
            total: TOTAL,
            is_finished: self.remaining.is_empty(),
        })
    }

    /// Called numbers in call order.
    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// The most recent call.
    pub fn current(&self) -> Option<u8> {
        self.history.last().copied()
    }

    /// Numbers still in the pouch, in no particular order.
    pub fn remaining(&self) -> &[u8] {
        &self.remaining
    }

    pub fn is_called(&self, number: u8) -> bool {
        self.called.get(number as usize).copied().unwrap_or(false)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl Default for DrawPool {
    fn default() -> Self {
        Self::new()
    }
}
