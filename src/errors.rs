//! Error types for the turnstake state machine
//!
//! Every variant of [`ArenaError`] is a local, non-fatal rejection of the single
//! input that triggered it. None of them leave partial state behind.

use crate::common::types::{Address, GameId};

/// Root error type for all arena operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("player {0} is already waiting in the lobby")]
    AlreadyQueued(Address),

    #[error("player {0} is not waiting in the lobby")]
    NotQueued(Address),

    #[error("lobby is empty")]
    Empty,

    #[error("player {player} has {available} available, {required} required")]
    InsufficientFunds {
        player: Address,
        available: u128,
        required: u128,
    },

    #[error("player {player} already holds {limit} unresolved games")]
    ConcurrentGameLimit { player: Address, limit: u32 },

    #[error("unknown game {0}")]
    UnknownGame(GameId),

    #[error("game {0} already exists")]
    DuplicateGame(GameId),

    #[error("verification already started or game resolved for {0}")]
    AlreadyVerifying(GameId),

    #[error("verifier {verifier} is already bound to unresolved game {game_id}")]
    VerifierAlreadyBound { verifier: Address, game_id: GameId },

    #[error("verifier {0} is not bound to any unresolved game")]
    UnknownVerifier(Address),

    #[error("game {0} is not awaiting verification")]
    NotAwaitingVerification(GameId),

    #[error("{caller} is not the verifier bound to game {game_id}")]
    UnauthorizedVerifier { caller: Address, game_id: GameId },

    #[error("verification start delivered by untrusted caller {0}")]
    UntrustedCaller(Address),

    #[error("{claimant} is not a participant of game {game_id}")]
    NotParticipant { claimant: Address, game_id: GameId },

    #[error("{claimant} already claimed a result for game {game_id}")]
    AlreadyClaimed { claimant: Address, game_id: GameId },

    #[error("game {0} is already resolved")]
    AlreadyResolved(GameId),

    #[error("invalid winner selector 0x{0:02x}")]
    InvalidWinner(u8),

    #[error("ledger failure: {0}")]
    LedgerFailure(#[from] LedgerError),

    #[error("notice emission failed: {0}")]
    NoticeFailure(String),
}

/// Failures reported by a ledger gateway
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{player} has {free} free of {requested} requested")]
    InsufficientBalance {
        player: Address,
        free: u128,
        requested: u128,
    },

    #[error("{player} has {locked} locked, cannot release {requested}")]
    NotLocked {
        player: Address,
        locked: u128,
        requested: u128,
    },

    #[error("balance overflow for {0}")]
    Overflow(Address),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Configuration load and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl From<std::io::Error> for ConfigurationError {
    fn from(e: std::io::Error) -> Self {
        ConfigurationError::LoadFailed(e.to_string())
    }
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(e: toml::de::Error) -> Self {
        ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e))
    }
}

// Convenience type alias for Results
pub type ArenaResult<T> = Result<T, ArenaError>;
