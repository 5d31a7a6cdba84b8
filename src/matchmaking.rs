//! Matchmaking: lobby joins, leaves and pairing
//!
//! A join either queues the player or, when someone is already waiting, pairs
//! the oldest waiter (white) with the newcomer (black) and announces the game.
//! Every accepted join locks exactly one stake; leaving the lobby releases it.

use crate::common::traits::{LedgerGateway, NoticeEmitter};
use crate::common::types::{Address, Amount, GameId};
use crate::config::StakeConfig;
use crate::errors::{ArenaError, ArenaResult};
use crate::games::{id, Game, GameRegistry};
use crate::lobby::{ensure_funds, Lobby};
use crate::notice::Notice;

/// Accepted join
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No opponent yet, the player waits in the lobby
    Queued,
    /// Paired with the oldest waiter; the notice was emitted
    Matched { game_id: GameId, notice: Notice },
}

pub struct MatchmakingEngine<'a, L, N> {
    stake: &'a StakeConfig,
    lobby: &'a mut Lobby,
    registry: &'a mut GameRegistry,
    ledger: &'a mut L,
    emitter: &'a mut N,
}

impl<'a, L: LedgerGateway, N: NoticeEmitter> MatchmakingEngine<'a, L, N> {
    pub fn new(
        stake: &'a StakeConfig,
        lobby: &'a mut Lobby,
        registry: &'a mut GameRegistry,
        ledger: &'a mut L,
        emitter: &'a mut N,
    ) -> Self {
        Self {
            stake,
            lobby,
            registry,
            ledger,
            emitter,
        }
    }

    /// Funds a player must hold to take on one more game
    pub fn required_funds(&self, player: &Address) -> Option<Amount> {
        let held = self.registry.active_games_for(player) as Amount;
        self.stake.minimum_stake.checked_mul(held.checked_add(1)?)
    }

    pub fn join(&mut self, player: Address, disambiguator: u64) -> ArenaResult<JoinOutcome> {
        if self.lobby.contains(&player) {
            return Err(ArenaError::AlreadyQueued(player));
        }

        if let Some(limit) = self.stake.max_concurrent_games {
            if self.registry.active_games_for(&player) >= limit as usize {
                return Err(ArenaError::ConcurrentGameLimit { player, limit });
            }
        }

        let required = self.required_funds(&player).unwrap_or(Amount::MAX);
        ensure_funds(&*self.ledger, &player, required)?;

        match self.lobby.peek_oldest().copied() {
            Some(white) => self.pair(white, player, disambiguator),
            None => self.queue(player, required),
        }
    }

    fn queue(&mut self, player: Address, required: Amount) -> ArenaResult<JoinOutcome> {
        self.ledger.lock(&player, self.stake.minimum_stake)?;

        if let Err(e) = self.lobby.enqueue(player, &*self.ledger, required) {
            self.release(&player);
            return Err(e);
        }

        tracing::debug!(%player, waiting = self.lobby.len(), "player queued");
        Ok(JoinOutcome::Queued)
    }

    fn pair(&mut self, white: Address, black: Address, disambiguator: u64) -> ArenaResult<JoinOutcome> {
        let game_id = id::derive(&white, &black, disambiguator);
        if self.registry.contains(&game_id) {
            return Err(ArenaError::DuplicateGame(game_id));
        }

        self.ledger.lock(&black, self.stake.minimum_stake)?;

        let notice = Notice::game_created(&game_id, &white, &black);
        if let Err(e) = self.emitter.emit(&notice) {
            self.release(&black);
            return Err(e);
        }

        let game = Game::new(game_id, white, black, self.stake.minimum_stake, disambiguator);
        self.registry.insert(game)?;
        self.lobby.dequeue_oldest()?;

        tracing::info!(%game_id, %white, %black, "players paired");
        Ok(JoinOutcome::Matched { game_id, notice })
    }

    /// Leave the lobby and release the stake locked on join
    pub fn leave(&mut self, player: &Address) -> ArenaResult<()> {
        if !self.lobby.contains(player) {
            return Err(ArenaError::NotQueued(*player));
        }

        self.ledger.unlock(player, self.stake.minimum_stake)?;
        self.lobby.remove(player)?;

        tracing::debug!(%player, "player left the lobby");
        Ok(())
    }

    // Undo a lock taken earlier in the same transition
    fn release(&mut self, player: &Address) {
        if let Err(e) = self.ledger.unlock(player, self.stake.minimum_stake) {
            tracing::error!(%player, error = %e, "failed to release stake after rejected join");
        }
    }
}
