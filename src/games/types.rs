use crate::common::types::{Address, Amount, GameId, TemplateHash};
use crate::errors::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported outcome of a game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl Winner {
    /// The `bytes1` selector used on the wire
    pub fn selector(self) -> u8 {
        match self {
            Winner::Draw => 0x00,
            Winner::White => 0x01,
            Winner::Black => 0x02,
        }
    }
}

impl TryFrom<u8> for Winner {
    type Error = ArenaError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        match selector {
            0x00 => Ok(Winner::Draw),
            0x01 => Ok(Winner::White),
            0x02 => Ok(Winner::Black),
            other => Err(ArenaError::InvalidWinner(other)),
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::White => write!(f, "white"),
            Winner::Black => write!(f, "black"),
            Winner::Draw => write!(f, "draw"),
        }
    }
}

/// Which seat a participant occupies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Game lifecycle. Transitions only move forward:
/// Open -> AwaitingVerification -> Resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Open,
    AwaitingVerification,
    Resolved,
}

impl GameStatus {
    /// Whether `next` is the immediate successor of (or equal to) this status
    pub fn can_advance_to(self, next: GameStatus) -> bool {
        matches!(
            (self, next),
            (GameStatus::Open, GameStatus::Open)
                | (GameStatus::Open, GameStatus::AwaitingVerification)
                | (GameStatus::AwaitingVerification, GameStatus::AwaitingVerification)
                | (GameStatus::AwaitingVerification, GameStatus::Resolved)
        )
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Open => write!(f, "open"),
            GameStatus::AwaitingVerification => write!(f, "awaiting_verification"),
            GameStatus::Resolved => write!(f, "resolved"),
        }
    }
}

/// External verification context bound once verification starts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerificationContext {
    pub verifier: Address,
    pub creator: Address,
    pub template_hash: TemplateHash,
}

/// Result claims submitted directly by the two participants
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimBook {
    pub white: Option<Winner>,
    pub black: Option<Winner>,
}

impl ClaimBook {
    pub fn get(&self, side: Side) -> Option<Winner> {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    fn set(&mut self, side: Side, winner: Winner) {
        match side {
            Side::White => self.white = Some(winner),
            Side::Black => self.black = Some(winner),
        }
    }

    /// The outcome both sides agree on, if they do
    pub fn agreed(&self) -> Option<Winner> {
        match (self.white, self.black) {
            (Some(w), Some(b)) if w == b => Some(w),
            _ => None,
        }
    }
}

/// Effect a claim would have on its game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimProgress {
    /// First claim recorded, waiting for the counterparty or a verifier
    Pending,
    /// Both participants reported the same outcome
    Agreed(Winner),
    /// The participants disagree; only a verifier can resolve the game
    Conflicting,
}

/// A two-player game and its escrow state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub white: Address,
    pub black: Address,
    pub status: GameStatus,
    /// Stake escrowed from each participant when the game was created
    pub stake: Amount,
    pub verification: Option<VerificationContext>,
    pub winner: Option<Winner>,
    pub claims: ClaimBook,
    /// Disambiguator of the input that created the game
    pub created_at: u64,
}

impl Game {
    pub fn new(id: GameId, white: Address, black: Address, stake: Amount, created_at: u64) -> Self {
        Self {
            id,
            white,
            black,
            status: GameStatus::Open,
            stake,
            verification: None,
            winner: None,
            claims: ClaimBook::default(),
            created_at,
        }
    }

    pub fn player(&self, side: Side) -> Address {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    pub fn side_of(&self, player: &Address) -> Option<Side> {
        if *player == self.white {
            Some(Side::White)
        } else if *player == self.black {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn involves(&self, player: &Address) -> bool {
        self.side_of(player).is_some()
    }

    /// Unresolved games hold their participants' stakes
    pub fn is_active(&self) -> bool {
        self.status != GameStatus::Resolved
    }

    pub fn bound_verifier(&self) -> Option<Address> {
        self.verification.map(|ctx| ctx.verifier)
    }

    /// `(loser, winner)` addresses for a decisive result, `None` for a draw
    pub fn forfeit_for(&self, winner: Winner) -> Option<(Address, Address)> {
        match winner {
            Winner::White => Some((self.black, self.white)),
            Winner::Black => Some((self.white, self.black)),
            Winner::Draw => None,
        }
    }

    /// Evaluate a participant claim without applying it
    pub fn evaluate_claim(&self, claimant: &Address, winner: Winner) -> ArenaResult<(Side, ClaimProgress)> {
        let side = self.side_of(claimant).ok_or(ArenaError::NotParticipant {
            claimant: *claimant,
            game_id: self.id,
        })?;

        if self.status == GameStatus::Resolved {
            return Err(ArenaError::AlreadyResolved(self.id));
        }

        if self.claims.get(side).is_some() {
            return Err(ArenaError::AlreadyClaimed {
                claimant: *claimant,
                game_id: self.id,
            });
        }

        let progress = match self.claims.get(side.opponent()) {
            None => ClaimProgress::Pending,
            Some(other) if other == winner => ClaimProgress::Agreed(winner),
            Some(_) => ClaimProgress::Conflicting,
        };

        Ok((side, progress))
    }

    pub(crate) fn record_claim(&mut self, side: Side, winner: Winner) {
        self.claims.set(side, winner);
    }
}
