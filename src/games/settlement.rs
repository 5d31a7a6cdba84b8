//! Escrow settlement for finalized games
//!
//! Both stakes are released and, for a decisive result, the loser's stake is
//! paid to the winner. Ledger calls are journaled so a failure half-way is
//! undone before the error reaches the caller; the game record itself is only
//! touched after settlement succeeds.

use crate::common::traits::LedgerGateway;
use crate::common::types::{Address, Amount, GameId};
use crate::errors::{ArenaResult, LedgerError};
use crate::games::types::{Game, Winner};
use serde::{Deserialize, Serialize};

/// What a settlement did to the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementRecord {
    pub game_id: GameId,
    pub winner: Winner,
    pub released: Vec<(Address, Amount)>,
    /// `(from, to, amount)` for a decisive result
    pub payout: Option<(Address, Address, Amount)>,
}

#[derive(Debug, Clone, Copy)]
enum Applied {
    Unlock(Address, Amount),
    Payout(Address, Address, Amount),
}

/// Ledger calls applied so far within one settlement
struct LedgerJournal<'a, L: LedgerGateway> {
    ledger: &'a mut L,
    applied: Vec<Applied>,
}

impl<'a, L: LedgerGateway> LedgerJournal<'a, L> {
    fn new(ledger: &'a mut L) -> Self {
        Self {
            ledger,
            applied: Vec::with_capacity(3),
        }
    }

    fn unlock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.ledger.unlock(player, amount)?;
        self.applied.push(Applied::Unlock(*player, amount));
        Ok(())
    }

    fn payout(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        self.ledger.payout(from, to, amount)?;
        self.applied.push(Applied::Payout(*from, *to, amount));
        Ok(())
    }

    /// Undo every applied call, newest first
    fn revert(self) {
        for op in self.applied.into_iter().rev() {
            let undone = match op {
                Applied::Unlock(player, amount) => self.ledger.lock(&player, amount),
                Applied::Payout(from, to, amount) => self.ledger.payout(&to, &from, amount),
            };
            if let Err(e) = undone {
                tracing::error!(?op, error = %e, "failed to revert ledger call during settlement rollback");
            }
        }
    }
}

/// Release the escrow of `game` according to `winner`
pub fn settle<L: LedgerGateway>(ledger: &mut L, game: &Game, winner: Winner) -> ArenaResult<SettlementRecord> {
    let mut journal = LedgerJournal::new(ledger);

    match apply(&mut journal, game, winner) {
        Ok(record) => {
            tracing::info!(
                game_id = %game.id,
                %winner,
                stake = game.stake,
                "settled game escrow"
            );
            Ok(record)
        }
        Err(e) => {
            tracing::warn!(game_id = %game.id, error = %e, "settlement failed, reverting ledger calls");
            journal.revert();
            Err(e.into())
        }
    }
}

fn apply<L: LedgerGateway>(
    journal: &mut LedgerJournal<'_, L>,
    game: &Game,
    winner: Winner,
) -> Result<SettlementRecord, LedgerError> {
    journal.unlock(&game.white, game.stake)?;
    journal.unlock(&game.black, game.stake)?;

    let payout = match game.forfeit_for(winner) {
        Some((loser, beneficiary)) => {
            journal.payout(&loser, &beneficiary, game.stake)?;
            Some((loser, beneficiary, game.stake))
        }
        None => None,
    };

    Ok(SettlementRecord {
        game_id: game.id,
        winner,
        released: vec![(game.white, game.stake), (game.black, game.stake)],
        payout,
    })
}
