//! Achievement detection, the award ledger, and rankings.
//!
//! Every pass re-evaluates every player from scratch rather than
//! diffing against the previous pass. That is at most 5 × 15 lookups, and
//! it keeps awarding independent of the order draws and marks arrived in.
//! Awards are one-shot, so running a pass twice is harmless.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use tombola_protocol::{AchievementKind, Award, Ranking};

use crate::{DrawPool, PlayerState};

/// Every award granted in a session, in grant order.
#[derive(Debug, Clone, Default)]
pub struct AchievementLedger {
    awards: Vec<Award>,
}

impl AchievementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn awards(&self) -> &[Award] {
        &self.awards
    }

    /// Players holding `kind`, earliest first.
    pub fn holders(&self, kind: AchievementKind) -> Vec<usize> {
        self.awards
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.player)
            .collect()
    }

    /// Holders of every kind. Kinds nobody holds map to an empty list.
    pub fn by_kind(&self) -> BTreeMap<AchievementKind, Vec<usize>> {
        AchievementKind::ALL
            .into_iter()
            .map(|kind| (kind, self.holders(kind)))
            .collect()
    }

    /// Ledger sequence of `player`'s `kind` award, if any.
    pub fn seq_of(&self, player: usize, kind: AchievementKind) -> Option<u64> {
        self.awards
            .iter()
            .find(|a| a.player == player && a.kind == kind)
            .map(|a| a.seq)
    }

    /// The player holding the session's full house.
    pub fn full_house_winner(&self) -> Option<usize> {
        self.awards
            .iter()
            .find(|a| a.kind == AchievementKind::FullHouse)
            .map(|a| a.player)
    }

    fn record(&mut self, kind: AchievementKind, player: usize) -> Award {
        let award = Award {
            kind,
            player,
            points: kind.points(),
            seq: self.awards.len() as u64 + 1,
        };
        self.awards.push(award);
        award
    }
}

/// What a single pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Awards granted by this pass, in grant order.
    pub new_awards: Vec<Award>,
    /// Set if this pass granted the session's full house.
    pub full_house: Option<usize>,
}

/// Runs one achievement pass over all players.
///
/// Players are visited in index order and each player's rules are
/// checked in [`AchievementKind::ALL`] order. Full house is granted at
/// most once per session: if two players complete their tickets in the
/// same pass, the lower index takes it. Everyone still collects
/// `first_five` and `early_seven` in that pass.
pub fn evaluate(
    players: &mut [PlayerState],
    pool: &DrawPool,
    ledger: &mut AchievementLedger,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    let mut full_house_taken = ledger.full_house_winner().is_some();

    for player in players.iter_mut() {
        let valid = player.valid_mark_count(pool);

        for kind in AchievementKind::ALL {
            if player.has(kind) {
                continue;
            }
            let earned = match kind {
                AchievementKind::FullHouse => !full_house_taken && player.is_full_house(pool),
                _ => valid >= kind.threshold(),
            };
            if !earned || !player.award(kind) {
                continue;
            }

            let award = ledger.record(kind, player.index());
            tracing::debug!(
                player = player.index(),
                achievement = %kind,
                points = award.points,
                total = player.points(),
                "achievement awarded"
            );
            outcome.new_awards.push(award);

            if kind == AchievementKind::FullHouse {
                full_house_taken = true;
                outcome.full_house = Some(player.index());
            }
        }
    }

    outcome
}

/// Standings: points descending, then earliest full house, then seat.
pub fn rankings(players: &[PlayerState], ledger: &AchievementLedger) -> Vec<Ranking> {
    let mut order: Vec<&PlayerState> = players.iter().collect();
    order.sort_by_key(|p| {
        (
            Reverse(p.points()),
            ledger
                .seq_of(p.index(), AchievementKind::FullHouse)
                .unwrap_or(u64::MAX),
            p.index(),
        )
    });
    order
        .into_iter()
        .map(|p| Ranking {
            player: p.index(),
            points: p.points(),
        })
        .collect()
}
