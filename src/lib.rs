//! Turnstake - deterministic matchmaking and escrow for two-player games
//!
//! The state machine behind a rollup application: players join a lobby with
//! a stake, get paired into games, and games are finalized either by matching
//! participant claims or by an external verifier. Every input is processed
//! atomically and the same input sequence always produces the same state.

pub mod claims;
pub mod common;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod games;
pub mod ledger;
pub mod lobby;
pub mod matchmaking;
pub mod notice;
pub mod verification;

pub use claims::{ClaimHandler, ClaimOutcome};
pub use common::traits::{LedgerGateway, NoticeEmitter};
pub use common::types::{Address, Amount, GameId, TemplateHash};
pub use config::{ArenaConfig, ConfigLoader};
pub use dispatcher::{AdvanceResult, AdvanceStatus, Arena, ArenaInput};
pub use errors::{ArenaError, ArenaResult, ConfigurationError, LedgerError};
pub use games::{Game, GameRegistry, GameStatus, Winner};
pub use ledger::InMemoryLedger;
pub use lobby::Lobby;
pub use matchmaking::{JoinOutcome, MatchmakingEngine};
pub use notice::{Notice, NoticeLog};
pub use verification::VerificationCoordinator;
