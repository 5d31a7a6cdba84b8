//! Input dispatch and the arena state owner
//!
//! The rollup delivers inputs one at a time; [`Arena::advance`] routes each to
//! the component that handles it and reports accept or reject. A rejected input
//! leaves lobby, registry and ledger exactly as they were.

use crate::claims::{ClaimHandler, ClaimOutcome};
use crate::common::traits::{LedgerGateway, NoticeEmitter};
use crate::common::types::{Address, GameId, TemplateHash};
use crate::config::ArenaConfig;
use crate::errors::{ArenaResult, ConfigurationError};
use crate::games::{GameRegistry, Winner};
use crate::lobby::Lobby;
use crate::matchmaking::{JoinOutcome, MatchmakingEngine};
use crate::notice::Notice;
use crate::verification::VerificationCoordinator;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Typed rollup input. Winner selectors are the raw `bytes1` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ArenaInput {
    JoinRequest {
        player: Address,
        input_index: u64,
    },
    LeaveRequest {
        player: Address,
    },
    ClaimResult {
        game_id: GameId,
        winner: u8,
        claimant: Address,
    },
    VerificationStarted {
        verifier: Address,
        creator: Address,
        template_hash: TemplateHash,
        game_id: GameId,
        caller: Address,
    },
    VerificationResult {
        verifier: Address,
        winner: u8,
        caller: Address,
    },
}

impl ArenaInput {
    pub fn kind(&self) -> &'static str {
        match self {
            ArenaInput::JoinRequest { .. } => "join_request",
            ArenaInput::LeaveRequest { .. } => "leave_request",
            ArenaInput::ClaimResult { .. } => "claim_result",
            ArenaInput::VerificationStarted { .. } => "verification_started",
            ArenaInput::VerificationResult { .. } => "verification_result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceStatus {
    Accept,
    Reject,
}

/// Outcome of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceResult {
    pub status: AdvanceStatus,
    pub notices: Vec<Notice>,
    pub reason: Option<String>,
}

impl AdvanceResult {
    fn accept(notices: Vec<Notice>) -> Self {
        Self {
            status: AdvanceStatus::Accept,
            notices,
            reason: None,
        }
    }

    fn reject(reason: String) -> Self {
        Self {
            status: AdvanceStatus::Reject,
            notices: Vec::new(),
            reason: Some(reason),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.status == AdvanceStatus::Accept
    }
}

/// Single owner of all arena state
pub struct Arena<L, N> {
    config: ArenaConfig,
    lobby: Lobby,
    registry: GameRegistry,
    ledger: L,
    emitter: N,
    processed_inputs: u64,
}

impl<L: LedgerGateway, N: NoticeEmitter> Arena<L, N> {
    pub fn new(config: ArenaConfig, ledger: L, emitter: N) -> Result<Self, ConfigurationError> {
        config.validate()?;

        tracing::info!(
            minimum_stake = config.stake.minimum_stake,
            max_concurrent_games = ?config.stake.max_concurrent_games,
            factory = %config.verification.factory_address,
            "arena initialized"
        );

        Ok(Self {
            config,
            lobby: Lobby::new(),
            registry: GameRegistry::new(),
            ledger,
            emitter,
            processed_inputs: 0,
        })
    }

    /// Process one input
    pub fn advance(&mut self, input: ArenaInput) -> AdvanceResult {
        self.processed_inputs += 1;
        let kind = input.kind();

        match self.route(input) {
            Ok(notices) => {
                tracing::debug!(kind, input = self.processed_inputs, "input accepted");
                AdvanceResult::accept(notices)
            }
            Err(e) => {
                tracing::warn!(kind, input = self.processed_inputs, reason = %e, "input rejected");
                AdvanceResult::reject(e.to_string())
            }
        }
    }

    fn route(&mut self, input: ArenaInput) -> ArenaResult<Vec<Notice>> {
        match input {
            ArenaInput::JoinRequest {
                player,
                input_index,
            } => {
                let mut engine = MatchmakingEngine::new(
                    &self.config.stake,
                    &mut self.lobby,
                    &mut self.registry,
                    &mut self.ledger,
                    &mut self.emitter,
                );
                match engine.join(player, input_index)? {
                    JoinOutcome::Queued => Ok(Vec::new()),
                    JoinOutcome::Matched { notice, .. } => Ok(vec![notice]),
                }
            }
            ArenaInput::LeaveRequest { player } => {
                let mut engine = MatchmakingEngine::new(
                    &self.config.stake,
                    &mut self.lobby,
                    &mut self.registry,
                    &mut self.ledger,
                    &mut self.emitter,
                );
                engine.leave(&player)?;
                Ok(Vec::new())
            }
            ArenaInput::ClaimResult {
                game_id,
                winner,
                claimant,
            } => {
                let winner = Winner::try_from(winner)?;
                let mut handler = ClaimHandler::new(&mut self.registry, &mut self.ledger);
                if let ClaimOutcome::Finalized(record) = handler.claim_result(&claimant, game_id, winner)? {
                    tracing::debug!(?record, "claim settlement");
                }
                Ok(Vec::new())
            }
            ArenaInput::VerificationStarted {
                verifier,
                creator,
                template_hash,
                game_id,
                caller,
            } => {
                let mut coordinator = VerificationCoordinator::new(
                    &self.config.verification,
                    &mut self.registry,
                    &mut self.ledger,
                );
                coordinator.start_verification(&caller, verifier, creator, template_hash, game_id)?;
                Ok(Vec::new())
            }
            ArenaInput::VerificationResult {
                verifier,
                winner,
                caller,
            } => {
                let winner = Winner::try_from(winner)?;
                let mut coordinator = VerificationCoordinator::new(
                    &self.config.verification,
                    &mut self.registry,
                    &mut self.ledger,
                );
                let game_id = coordinator.resolve_verifier(&verifier)?;
                coordinator.submit_verification_result(&caller, game_id, winner)?;
                Ok(Vec::new())
            }
        }
    }

    /// SHA-256 over the bincode encoding of lobby and registry
    pub fn state_digest(&self) -> Result<[u8; 32], bincode::Error> {
        let bytes = bincode::serialize(&(&self.lobby, &self.registry))?;
        Ok(Sha256::digest(&bytes).into())
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn emitter(&self) -> &N {
        &self.emitter
    }

    pub fn processed_inputs(&self) -> u64 {
        self.processed_inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::GameStatus;
    use crate::ledger::InMemoryLedger;
    use crate::notice::NoticeLog;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn arena(balances: &[(u8, u128)]) -> Arena<InMemoryLedger, NoticeLog> {
        let ledger = InMemoryLedger::with_balances(balances.iter().map(|(p, a)| (addr(*p), *a))).unwrap();
        Arena::new(ArenaConfig::testing(), ledger, NoticeLog::new()).unwrap()
    }

    fn join(player: u8, input_index: u64) -> ArenaInput {
        ArenaInput::JoinRequest {
            player: addr(player),
            input_index,
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ArenaConfig::testing();
        config.stake.minimum_stake = 0;
        assert!(Arena::new(config, InMemoryLedger::new(), NoticeLog::new()).is_err());
    }

    #[test]
    fn test_join_pair_emits_notice() {
        let mut arena = arena(&[(1, 100), (2, 100)]);

        let first = arena.advance(join(1, 0));
        assert!(first.is_accepted());
        assert!(first.notices.is_empty());

        let second = arena.advance(join(2, 1));
        assert!(second.is_accepted());
        assert_eq!(second.notices.len(), 1);
        assert_eq!(arena.emitter().notices(), &second.notices[..]);
        assert_eq!(arena.registry().len(), 1);
        assert_eq!(arena.processed_inputs(), 2);
    }

    #[test]
    fn test_reject_carries_reason() {
        let mut arena = arena(&[]);

        let result = arena.advance(ArenaInput::LeaveRequest { player: addr(7) });
        assert_eq!(result.status, AdvanceStatus::Reject);
        assert!(result.reason.unwrap().contains("not waiting"));
    }

    #[test]
    fn test_invalid_winner_selector_rejected() {
        let mut arena = arena(&[(1, 100), (2, 100)]);
        arena.advance(join(1, 0));
        let notice = arena.advance(join(2, 1)).notices.remove(0);
        let game_id = notice.decode_game_created().unwrap().game_id;

        let result = arena.advance(ArenaInput::ClaimResult {
            game_id,
            winner: 7,
            claimant: addr(1),
        });
        assert_eq!(result.reason.as_deref(), Some("invalid winner selector 0x07"));
        assert_eq!(arena.registry().get(&game_id).unwrap().status, GameStatus::Open);
    }

    #[test]
    fn test_verification_result_routed_by_verifier() {
        let mut arena = arena(&[(1, 100), (2, 100)]);
        arena.advance(join(1, 0));
        let game_id = arena.advance(join(2, 1)).notices[0].decode_game_created().unwrap().game_id;
        let factory = arena.config().verification.factory_address;

        let started = arena.advance(ArenaInput::VerificationStarted {
            verifier: addr(0x51),
            creator: addr(1),
            template_hash: TemplateHash::default(),
            game_id,
            caller: factory,
        });
        assert!(started.is_accepted());

        let relayed = arena.advance(ArenaInput::VerificationResult {
            verifier: addr(0x51),
            winner: 2,
            caller: addr(2),
        });
        assert!(!relayed.is_accepted());

        let result = arena.advance(ArenaInput::VerificationResult {
            verifier: addr(0x51),
            winner: 2,
            caller: addr(0x51),
        });
        assert!(result.is_accepted());

        let game = arena.registry().get(&game_id).unwrap();
        assert_eq!(game.winner, Some(Winner::Black));
        assert_eq!(arena.ledger().balance_of(&addr(2)), 110);
    }

    #[test]
    fn test_reject_keeps_digest() {
        let mut arena = arena(&[(1, 100)]);
        arena.advance(join(1, 0));
        let before = arena.state_digest().unwrap();

        assert!(!arena.advance(join(1, 1)).is_accepted());
        assert_eq!(arena.state_digest().unwrap(), before);
    }

    #[test]
    fn test_input_json_shape() {
        let json = r#"{"kind":"JoinRequest","player":"0x0101010101010101010101010101010101010101","input_index":4}"#;
        let input: ArenaInput = serde_json::from_str(json).unwrap();
        assert_eq!(input, join(1, 4));
    }
}
