//! FIFO waiting room for players looking for an opponent
//!
//! The oldest waiter always takes the white seat against the next arrival.

use crate::common::traits::LedgerGateway;
use crate::common::types::{Address, Amount};
use crate::errors::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fail with `InsufficientFunds` unless the ledger reports at least `required`
pub fn ensure_funds<L: LedgerGateway + ?Sized>(
    ledger: &L,
    player: &Address,
    required: Amount,
) -> ArenaResult<()> {
    let available = ledger.balance_of(player);
    if available < required {
        return Err(ArenaError::InsufficientFunds {
            player: *player,
            available,
            required,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lobby {
    queue: VecDeque<Address>,
}

impl Lobby {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, player: &Address) -> bool {
        self.queue.contains(player)
    }

    /// Waiting players, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.queue.iter()
    }

    pub fn peek_oldest(&self) -> Option<&Address> {
        self.queue.front()
    }

    /// Append `player` once the ledger shows `required` funds.
    /// `required` is the stake scaled by the games the player already holds.
    pub fn enqueue<L: LedgerGateway + ?Sized>(
        &mut self,
        player: Address,
        ledger: &L,
        required: Amount,
    ) -> ArenaResult<()> {
        if self.contains(&player) {
            return Err(ArenaError::AlreadyQueued(player));
        }
        ensure_funds(ledger, &player, required)?;
        self.queue.push_back(player);
        Ok(())
    }

    pub fn dequeue_oldest(&mut self) -> ArenaResult<Address> {
        self.queue.pop_front().ok_or(ArenaError::Empty)
    }

    pub fn remove(&mut self, player: &Address) -> ArenaResult<Address> {
        let position = self
            .queue
            .iter()
            .position(|queued| queued == player)
            .ok_or(ArenaError::NotQueued(*player))?;
        self.queue.remove(position).ok_or(ArenaError::NotQueued(*player))
    }
}
