//! Collaborator interfaces consumed by the arena core
//!
//! The core never owns balances or talks to the rollup directly. It asks a
//! [`LedgerGateway`] about funds and hands outbound payloads to a
//! [`NoticeEmitter`]. Both are called synchronously inside a single transition.

use crate::common::types::{Address, Amount};
use crate::errors::{ArenaResult, LedgerError};
use crate::notice::Notice;

/// Token ledger holding per-player balances and escrowed stakes
pub trait LedgerGateway {
    /// Total balance credited to `player`, including stakes currently locked
    fn balance_of(&self, player: &Address) -> Amount;

    /// Escrow `amount` of the player's free balance
    fn lock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Release `amount` of previously escrowed balance back to the player
    fn unlock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError>;

    /// Move a forfeited stake from the losing player to the winner
    fn payout(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError>;
}

/// Sink for outbound notices, returns the index assigned to the notice
pub trait NoticeEmitter {
    fn emit(&mut self, notice: &Notice) -> ArenaResult<u64>;
}

impl<T: LedgerGateway + ?Sized> LedgerGateway for &mut T {
    fn balance_of(&self, player: &Address) -> Amount {
        (**self).balance_of(player)
    }

    fn lock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).lock(player, amount)
    }

    fn unlock(&mut self, player: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).unlock(player, amount)
    }

    fn payout(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), LedgerError> {
        (**self).payout(from, to, amount)
    }
}

impl<T: NoticeEmitter + ?Sized> NoticeEmitter for &mut T {
    fn emit(&mut self, notice: &Notice) -> ArenaResult<u64> {
        (**self).emit(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ledger that reports a fixed balance and records every mutating call
    struct RecordingLedger {
        balance: Amount,
        calls: Vec<&'static str>,
    }

    impl LedgerGateway for RecordingLedger {
        fn balance_of(&self, _player: &Address) -> Amount {
            self.balance
        }

        fn lock(&mut self, _player: &Address, _amount: Amount) -> Result<(), LedgerError> {
            self.calls.push("lock");
            Ok(())
        }

        fn unlock(&mut self, _player: &Address, _amount: Amount) -> Result<(), LedgerError> {
            self.calls.push("unlock");
            Ok(())
        }

        fn payout(&mut self, _from: &Address, _to: &Address, _amount: Amount) -> Result<(), LedgerError> {
            self.calls.push("payout");
            Ok(())
        }
    }

    fn lock_through<L: LedgerGateway>(mut ledger: L, player: &Address) -> Amount {
        ledger.lock(player, 1).unwrap();
        ledger.balance_of(player)
    }

    #[test]
    fn test_mutable_reference_forwards_calls() {
        let mut ledger = RecordingLedger {
            balance: 42,
            calls: Vec::new(),
        };
        let player = Address::from([1u8; 20]);

        assert_eq!(lock_through(&mut ledger, &player), 42);
        assert_eq!(ledger.calls, vec!["lock"]);
    }
}
