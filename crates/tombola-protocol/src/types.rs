//! Boundary types for the tombola engine.
//!
//! Everything in here crosses the boundary between the engine and
//! whatever transport sits in front of it. The JSON shapes are part of
//! the contract, so the tests at the bottom pin them down.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Game constants
// ---------------------------------------------------------------------------

/// Highest number in the pouch. Numbers run `1..=MAX_NUMBER`.
pub const MAX_NUMBER: u8 = 90;

/// Rows per ticket. Each row is one section of five numbers.
pub const ROWS: usize = 3;

/// Columns per ticket. Column `k` holds numbers from `10k+1..=10k+10`.
pub const COLUMNS: usize = 9;

/// Filled cells on every ticket.
pub const NUMBERS_PER_TICKET: usize = 15;

/// Smallest table the engine will deal tickets for.
pub const MIN_PLAYERS: usize = 3;

/// Largest table the engine will deal tickets for.
pub const MAX_PLAYERS: usize = 5;

/// Wire form of a ticket: three rows of nine cells, `None` for blanks.
pub type TicketGrid = [[Option<u8>; COLUMNS]; ROWS];

/// Marks reported by a client, keyed by player index.
///
/// serde_json writes integer map keys as strings, so on the wire this is
/// `{"0": [4, 17], "2": [88]}`.
pub type MarkedByPlayer = BTreeMap<usize, Vec<u8>>;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A unique identifier for a room (one hosted tombola session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a game session.
///
/// ```text
/// Waiting ──start──→ Active ──full house / pool exhausted / abandon──→ Finished
///    ↑                                                                   │
///    └──────────────────────────────reset────────────────────────────────┘
/// ```
///
/// Reset is allowed from every state and always lands in `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Waiting,
    Active,
    Finished,
}

impl SessionStatus {
    /// Returns `true` while numbers can be drawn and marks toggled.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` once the session has ended (winner or not).
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns `true` if `start` is a legal next step.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Waiting)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// The achievements a player can earn, in evaluation priority order.
///
/// The derived `Ord` follows declaration order, so a `BTreeMap` keyed by
/// kind lists `first_five` before `early_seven` before `full_house`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    FirstFive,
    EarlySeven,
    FullHouse,
}

impl AchievementKind {
    /// Every kind, in the order a pass evaluates them.
    pub const ALL: [AchievementKind; 3] = [Self::FirstFive, Self::EarlySeven, Self::FullHouse];

    /// Points credited when the achievement is awarded.
    pub fn points(self) -> u32 {
        match self {
            Self::FirstFive => 50,
            Self::EarlySeven => 100,
            Self::FullHouse => 200,
        }
    }

    /// How many valid marks trigger the achievement.
    pub fn threshold(self) -> usize {
        match self {
            Self::FirstFive => 5,
            Self::EarlySeven => 7,
            Self::FullHouse => NUMBERS_PER_TICKET,
        }
    }

    /// The stable identifier used on the wire.
    pub fn id(self) -> &'static str {
        match self {
            Self::FirstFive => "first_five",
            Self::EarlySeven => "early_seven",
            Self::FullHouse => "full_house",
        }
    }
}

impl fmt::Display for AchievementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One entry of the achievement ledger.
///
/// `seq` is the position in the session's ledger (starting at 1), which is
/// what ranking tie-breaks are decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    pub player: usize,
    pub points: u32,
    pub seq: u64,
}

/// A player's place in the standings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub player: usize,
    pub points: u32,
}

/// Result of one achievement pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementReport {
    /// Players holding each achievement, in the order they earned it.
    pub achievements: BTreeMap<AchievementKind, Vec<usize>>,
    /// Total points per player, indexed by player.
    pub player_points: Vec<u32>,
    /// All players, best first.
    pub rankings: Vec<Ranking>,
    /// Awards granted by this pass only.
    pub new_achievements: Vec<Award>,
    /// `true` if the session is over (full house or exhausted pool).
    pub game_ended: bool,
    /// The full-house holder. `None` while running, and `None` when the
    /// house wins.
    pub winner: Option<usize>,
    pub state: SessionStatus,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Creates a new room hosting a fresh session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSession {
    pub player_count: usize,
}

impl CreateSession {
    /// Rejects table sizes tickets cannot be dealt for.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if (MIN_PLAYERS..=MAX_PLAYERS).contains(&self.player_count) {
            Ok(())
        } else {
            Err(ProtocolError::InvalidMessage(format!(
                "player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.player_count
            )))
        }
    }
}

/// An operation on an existing session.
///
/// Internally tagged: `{"type": "toggle_mark", "player": 1, "number": 42}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    StartSession,
    DrawNext,
    ToggleMark {
        player: usize,
        number: u8,
    },
    CheckAchievements {
        #[serde(deserialize_with = "deserialize_marks")]
        marked_by_player: MarkedByPlayer,
    },
    GetAllCalledNumbers,
    ResetSession,
    SetAutoDraw {
        enabled: bool,
    },
}

impl Request {
    /// Rejects numbers that cannot exist in a 90-ball game.
    ///
    /// Whether a number is on a particular ticket is the engine's call;
    /// this only guards the `1..=90` range.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            Self::ToggleMark { number, .. } => check_number(*number),
            Self::CheckAchievements { marked_by_player } => marked_by_player
                .values()
                .flatten()
                .try_for_each(|n| check_number(*n)),
            _ => Ok(()),
        }
    }
}

/// Reads [`MarkedByPlayer`] whether the player indices arrive as
/// integers or as the strings JSON object keys always are. Internally
/// tagged enums buffer their fields, which loses serde_json's own
/// string-to-integer key coercion, so `Request` needs this explicitly.
fn deserialize_marks<'de, D>(deserializer: D) -> Result<MarkedByPlayer, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize, PartialEq, Eq, PartialOrd, Ord)]
    #[serde(untagged)]
    enum Key {
        Index(usize),
        Text(String),
    }

    let mut marks = MarkedByPlayer::new();
    for (key, numbers) in BTreeMap::<Key, Vec<u8>>::deserialize(deserializer)? {
        let index = match key {
            Key::Index(index) => index,
            Key::Text(text) => text
                .parse()
                .map_err(|_| D::Error::custom(format!("invalid player index {text:?}")))?,
        };
        if marks.insert(index, numbers).is_some() {
            return Err(D::Error::custom(format!("duplicate player index {index}")));
        }
    }
    Ok(marks)
}

fn check_number(number: u8) -> Result<(), ProtocolError> {
    if (1..=MAX_NUMBER).contains(&number) {
        Ok(())
    } else {
        Err(ProtocolError::InvalidMessage(format!(
            "number {number} is outside 1..={MAX_NUMBER}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The answer to a [`Request`] or [`CreateSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    SessionCreated {
        room_id: RoomId,
        player_count: usize,
        tickets: Vec<TicketGrid>,
        state: SessionStatus,
    },
    SessionStarted {
        state: SessionStatus,
        total: usize,
    },
    NumberDrawn {
        number: u8,
        position: usize,
        total: usize,
        is_finished: bool,
        report: AchievementReport,
    },
    MarkToggled {
        player: usize,
        number: u8,
        marked: bool,
        report: AchievementReport,
    },
    Achievements(AchievementReport),
    CalledNumbers {
        called_numbers: Vec<u8>,
        current_number: Option<u8>,
        state: SessionStatus,
    },
    SessionReset {
        state: SessionStatus,
        tickets: Vec<TicketGrid>,
    },
    AutoDraw {
        enabled: bool,
    },
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Notifications a room pushes to its subscribers.
///
/// These exist so the boundary can announce draws and awards (for
/// instance to drive a "Player 2 got EARLY SEVEN!" banner). There is no
/// delivery guarantee beyond the in-process channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoomEvent {
    NumberDrawn {
        number: u8,
        position: usize,
        total: usize,
        is_finished: bool,
    },
    AchievementAwarded(Award),
    GameOver {
        winner: Option<usize>,
        rankings: Vec<Ranking>,
    },
    SessionReset,
    AutoDrawChanged {
        enabled: bool,
    },
}

// =========================================================================
// Tests
// =========================================================================
