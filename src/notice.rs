//! Outbound notices
//!
//! A pairing is announced with `abi.encode(bytes32 gameId, address white, address black)`
//! so the on-chain escrow side can pick it up without knowing anything about
//! the arena's internal representation.

use crate::common::traits::NoticeEmitter;
use crate::common::types::{Address, GameId};
use crate::errors::{ArenaError, ArenaResult};
use serde::{Deserialize, Serialize};

const WORD: usize = 32;
const ADDRESS_PADDING: usize = WORD - Address::LEN;

/// Decoded content of a game-created notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCreated {
    pub game_id: GameId,
    pub white: Address,
    pub black: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    #[serde(with = "hex_payload")]
    pub payload: Vec<u8>,
}

impl Notice {
    pub fn game_created(game_id: &GameId, white: &Address, black: &Address) -> Self {
        let mut payload = Vec::with_capacity(3 * WORD);
        payload.extend_from_slice(game_id.as_bytes());
        push_address(&mut payload, white);
        push_address(&mut payload, black);
        Self { payload }
    }

    /// Parse a game-created payload; `None` if it is not one
    pub fn decode_game_created(&self) -> Option<GameCreated> {
        if self.payload.len() != 3 * WORD {
            return None;
        }
        let game_id: [u8; 32] = self.payload[..WORD].try_into().ok()?;
        Some(GameCreated {
            game_id: GameId::new(game_id),
            white: read_address(&self.payload[WORD..2 * WORD])?,
            black: read_address(&self.payload[2 * WORD..])?,
        })
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.payload))
    }
}

fn push_address(buf: &mut Vec<u8>, address: &Address) {
    buf.extend_from_slice(&[0u8; ADDRESS_PADDING]);
    buf.extend_from_slice(address.as_bytes());
}

fn read_address(word: &[u8]) -> Option<Address> {
    if word[..ADDRESS_PADDING].iter().any(|b| *b != 0) {
        return None;
    }
    let bytes: [u8; 20] = word[ADDRESS_PADDING..].try_into().ok()?;
    Some(Address::new(bytes))
}

mod hex_payload {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(payload)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

/// Notice emitter that keeps every notice in emission order
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: Vec<Notice>,
    fail_next: bool,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Make the next emission fail
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }
}

impl NoticeEmitter for NoticeLog {
    fn emit(&mut self, notice: &Notice) -> ArenaResult<u64> {
        if std::mem::take(&mut self.fail_next) {
            return Err(ArenaError::NoticeFailure("notice sink unavailable".to_string()));
        }
        self.notices.push(notice.clone());
        Ok(self.notices.len() as u64 - 1)
    }
}
