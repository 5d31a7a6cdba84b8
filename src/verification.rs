//! External verification of game outcomes
//!
//! The verification factory announces that a verifier was deployed for a game;
//! from then on only that verifier may report the result. Authorization is by
//! identity alone: the reporting caller must equal the bound verifier.

use crate::common::traits::LedgerGateway;
use crate::common::types::{Address, GameId, TemplateHash};
use crate::config::VerificationConfig;
use crate::errors::{ArenaError, ArenaResult};
use crate::games::{settle, GameRegistry, GameStatus, SettlementRecord, VerificationContext, Winner};

pub struct VerificationCoordinator<'a, L> {
    config: &'a VerificationConfig,
    registry: &'a mut GameRegistry,
    ledger: &'a mut L,
}

impl<'a, L: LedgerGateway> VerificationCoordinator<'a, L> {
    pub fn new(config: &'a VerificationConfig, registry: &'a mut GameRegistry, ledger: &'a mut L) -> Self {
        Self {
            config,
            registry,
            ledger,
        }
    }

    /// Bind a verifier to `game_id`. `caller` is the sender of the input and
    /// must be the configured verification factory.
    pub fn start_verification(
        &mut self,
        caller: &Address,
        verifier: Address,
        creator: Address,
        template_hash: TemplateHash,
        game_id: GameId,
    ) -> ArenaResult<()> {
        if *caller != self.config.factory_address {
            return Err(ArenaError::UntrustedCaller(*caller));
        }

        let context = VerificationContext {
            verifier,
            creator,
            template_hash,
        };
        self.registry.bind_verification(&game_id, context)?;

        tracing::info!(%game_id, %verifier, %creator, "verification started");
        Ok(())
    }

    /// Game a verifier result refers to; results carry only the verifier identity
    pub fn resolve_verifier(&self, verifier: &Address) -> ArenaResult<GameId> {
        self.registry
            .active_game_for_verifier(verifier)
            .map(|game| game.id)
            .ok_or(ArenaError::UnknownVerifier(*verifier))
    }

    pub fn submit_verification_result(
        &mut self,
        reporting_verifier: &Address,
        game_id: GameId,
        winner: Winner,
    ) -> ArenaResult<SettlementRecord> {
        let game = self.registry.require(&game_id)?;

        if game.status != GameStatus::AwaitingVerification {
            return Err(ArenaError::NotAwaitingVerification(game_id));
        }

        if game.bound_verifier() != Some(*reporting_verifier) {
            return Err(ArenaError::UnauthorizedVerifier {
                caller: *reporting_verifier,
                game_id,
            });
        }

        let record = settle(&mut *self.ledger, game, winner)?;
        self.registry.resolve(&game_id, winner)?;

        tracing::info!(%game_id, %winner, verifier = %reporting_verifier, "verifier resolved game");
        Ok(record)
    }
}
