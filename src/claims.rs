//! Direct result claims from game participants
//!
//! A single claim never finalizes a game. The first claim moves it to
//! AwaitingVerification; a matching counter-claim settles it, a conflicting one
//! leaves it for an external verifier.

use crate::common::traits::LedgerGateway;
use crate::common::types::{Address, GameId};
use crate::errors::ArenaResult;
use crate::games::{settle, ClaimProgress, GameRegistry, SettlementRecord, Winner};

/// Effect of an accepted claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Claim recorded, game awaits the counterparty or a verifier
    Recorded(ClaimProgress),
    /// Both participants agreed and the game was settled
    Finalized(SettlementRecord),
}

pub struct ClaimHandler<'a, L> {
    registry: &'a mut GameRegistry,
    ledger: &'a mut L,
}

impl<'a, L: LedgerGateway> ClaimHandler<'a, L> {
    pub fn new(registry: &'a mut GameRegistry, ledger: &'a mut L) -> Self {
        Self { registry, ledger }
    }

    pub fn claim_result(&mut self, claimant: &Address, game_id: GameId, winner: Winner) -> ArenaResult<ClaimOutcome> {
        let game = self.registry.require(&game_id)?;
        let (side, progress) = game.evaluate_claim(claimant, winner)?;

        match progress {
            ClaimProgress::Agreed(agreed) => {
                let record = settle(&mut *self.ledger, game, agreed)?;
                self.registry.record_claim(&game_id, claimant, winner)?;
                self.registry.resolve(&game_id, agreed)?;

                tracing::info!(%game_id, winner = %agreed, "participants agreed on result");
                Ok(ClaimOutcome::Finalized(record))
            }
            ClaimProgress::Conflicting => {
                self.registry.record_claim(&game_id, claimant, winner)?;
                tracing::warn!(%game_id, %claimant, ?side, "conflicting claims, awaiting verifier");
                Ok(ClaimOutcome::Recorded(progress))
            }
            ClaimProgress::Pending => {
                self.registry.record_claim(&game_id, claimant, winner)?;
                tracing::debug!(%game_id, %claimant, ?side, %winner, "claim recorded");
                Ok(ClaimOutcome::Recorded(progress))
            }
        }
    }
}
