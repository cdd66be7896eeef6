//! Ticket layout and generation.
//!
//! A ticket is a 3×9 grid. Every row (a "section") has exactly five
//! numbers and four blanks, for fifteen numbers in total. Column `k` only
//! ever holds numbers from `10k+1..=10k+10`, has between one and three
//! filled cells, and ascends from top to bottom. Because the column ranges
//! are disjoint and increasing, every row ascends left to right as well.
//!
//! ```text
//!   ┌────┬────┬────┬────┬────┬────┬────┬────┬────┐
//!   │  3 │    │ 24 │    │ 45 │    │ 62 │ 77 │    │
//!   │    │ 15 │ 28 │ 33 │    │ 56 │    │    │ 84 │
//!   │  9 │    │    │ 38 │    │ 59 │ 66 │    │ 90 │
//!   └────┴────┴────┴────┴────┴────┴────┴────┴────┘
//! ```

use std::ops::RangeInclusive;

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tombola_protocol::{
    TicketGrid, COLUMNS, MAX_NUMBER, MAX_PLAYERS, MIN_PLAYERS, NUMBERS_PER_TICKET, ROWS,
};

use crate::GenerationError;

/// Filled cells per row.
const FILLED_PER_ROW: usize = NUMBERS_PER_TICKET / ROWS;

/// Candidates per column.
const COLUMN_SPAN: usize = 10;

/// Rejection-sampling budget for a layout before falling back to a
/// constructed one. Roughly half of all random layouts are accepted, so
/// the fallback is practically never reached.
const MAX_LAYOUT_ATTEMPTS: usize = 64;

type Layout = [[bool; COLUMNS]; ROWS];

/// The numbers column `column` may hold, or `None` off the grid.
pub fn column_range(column: usize) -> Option<RangeInclusive<u8>> {
    (column < COLUMNS).then(|| decade(column))
}

/// The column a number belongs in, or `None` outside `1..=90`.
pub fn column_of(number: u8) -> Option<usize> {
    (1..=MAX_NUMBER)
        .contains(&number)
        .then(|| (number as usize - 1) / COLUMN_SPAN)
}

/// `column` must be below `COLUMNS`.
fn decade(column: usize) -> RangeInclusive<u8> {
    let low = (column * COLUMN_SPAN + 1) as u8;
    low..=low + (COLUMN_SPAN as u8 - 1)
}

/// A player's ticket. Immutable once dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TicketGrid", into = "TicketGrid")]
pub struct Ticket {
    grid: TicketGrid,
}

impl Ticket {
    /// Builds a ticket from an explicit grid, checking every layout rule.
    pub fn from_grid(grid: TicketGrid) -> Result<Self, GenerationError> {
        validate(&grid)?;
        Ok(Self { grid })
    }

    /// The raw grid, `None` for blanks.
    pub fn grid(&self) -> &TicketGrid {
        &self.grid
    }

    /// One row (section) of the grid, or `None` past the last row.
    pub fn row(&self, row: usize) -> Option<&[Option<u8>; COLUMNS]> {
        self.grid.get(row)
    }

    /// The cell at `(row, column)`, or `None` for a blank or an index off
    /// the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<u8> {
        self.grid.get(row)?.get(column).copied().flatten()
    }

    /// The numbers on the ticket in row-major order.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.grid.iter().flatten().filter_map(|cell| *cell)
    }

    /// The numbers on the ticket, ascending.
    pub fn sorted_numbers(&self) -> Vec<u8> {
        let mut numbers: Vec<u8> = self.numbers().collect();
        numbers.sort_unstable();
        numbers
    }

    /// Returns `true` if `number` is printed on the ticket.
    pub fn contains(&self, number: u8) -> bool {
        let Some(column) = column_of(number) else {
            return false;
        };
        self.grid.iter().any(|row| row[column] == Some(number))
    }
}

impl TryFrom<TicketGrid> for Ticket {
    type Error = GenerationError;

    fn try_from(grid: TicketGrid) -> Result<Self, Self::Error> {
        Self::from_grid(grid)
    }
}

impl From<Ticket> for TicketGrid {
    fn from(ticket: Ticket) -> Self {
        ticket.grid
    }
}

/// Deals one ticket per player.
///
/// Tickets are independent of each other, so two players may well share
/// numbers. Only uniqueness within a ticket is guaranteed.
pub fn generate_tickets<R: Rng + ?Sized>(
    rng: &mut R,
    player_count: usize,
) -> Result<Vec<Ticket>, GenerationError> {
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&player_count) {
        return Err(GenerationError::InvalidPlayerCount(player_count));
    }
    Ok((0..player_count).map(|_| generate_ticket(rng)).collect())
}

/// Generates a single ticket.
///
/// First picks which cells are filled: each row independently chooses
/// five of the nine columns, and layouts that leave a column empty are
/// rejected. Then each column draws as many distinct values from its
/// range as it has filled cells and places them in ascending order, top
/// to bottom.
pub fn generate_ticket<R: Rng + ?Sized>(rng: &mut R) -> Ticket {
    let layout = pick_layout(rng);
    let mut grid: TicketGrid = [[None; COLUMNS]; ROWS];

    for column in 0..COLUMNS {
        let rows: Vec<usize> = (0..ROWS).filter(|&row| layout[row][column]).collect();
        let low = *decade(column).start();
        let mut values: Vec<u8> = index::sample(rng, COLUMN_SPAN, rows.len())
            .into_iter()
            .map(|offset| low + offset as u8)
            .collect();
        values.sort_unstable();
        for (row, value) in rows.into_iter().zip(values) {
            grid[row][column] = Some(value);
        }
    }

    Ticket { grid }
}

fn pick_layout<R: Rng + ?Sized>(rng: &mut R) -> Layout {
    for _ in 0..MAX_LAYOUT_ATTEMPTS {
        let mut layout = [[false; COLUMNS]; ROWS];
        for row in layout.iter_mut() {
            for column in index::sample(rng, COLUMNS, FILLED_PER_ROW).into_iter() {
                row[column] = true;
            }
        }
        if (0..COLUMNS).all(|column| layout.iter().any(|row| row[column])) {
            return layout;
        }
    }

    tracing::warn!(
        attempts = MAX_LAYOUT_ATTEMPTS,
        "layout sampling exhausted, using constructed layout"
    );
    constructed_layout(rng)
}

/// Rows 0 and 1 split a shuffled column order between them (sharing one
/// column), which covers all nine. Row 2 is free.
fn constructed_layout<R: Rng + ?Sized>(rng: &mut R) -> Layout {
    let mut order: Vec<usize> = (0..COLUMNS).collect();
    order.shuffle(rng);

    let mut layout = [[false; COLUMNS]; ROWS];
    for &column in &order[..FILLED_PER_ROW] {
        layout[0][column] = true;
    }
    for &column in &order[FILLED_PER_ROW..] {
        layout[1][column] = true;
    }
    layout[1][order[0]] = true;
    for column in index::sample(rng, COLUMNS, FILLED_PER_ROW).into_iter() {
        layout[2][column] = true;
    }
    layout
}

fn validate(grid: &TicketGrid) -> Result<(), GenerationError> {
    let invalid = |msg: String| Err(GenerationError::InvalidLayout(msg));

    for (r, row) in grid.iter().enumerate() {
        let filled = row.iter().filter(|cell| cell.is_some()).count();
        if filled != FILLED_PER_ROW {
            return invalid(format!("row {r} has {filled} numbers, expected {FILLED_PER_ROW}"));
        }
    }

    for column in 0..COLUMNS {
        let range = decade(column);
        let values: Vec<u8> = grid.iter().filter_map(|row| row[column]).collect();
        if values.is_empty() {
            return invalid(format!("column {column} is empty"));
        }
        if let Some(v) = values.iter().find(|v| !range.contains(*v)) {
            return invalid(format!("{v} does not belong in column {column}"));
        }
        if values.windows(2).any(|pair| pair[0] >= pair[1]) {
            return invalid(format!("column {column} is not strictly ascending"));
        }
    }

    Ok(())
}
