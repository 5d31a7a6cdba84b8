//! Game identifier derivation
//!
//! `id = keccak256(white ‖ black ‖ uint256(disambiguator))`, the same bytes
//! Solidity produces for `keccak256(abi.encodePacked(white, black, uint256(index)))`,
//! so on-chain contracts can recompute the id carried in a notice.

use crate::common::types::{Address, GameId};
use sha3::{Digest, Keccak256};

/// Width of the disambiguator once encoded as a uint256
pub const DISAMBIGUATOR_WIDTH: usize = 32;

/// Big-endian uint256 encoding of the disambiguator
pub fn encode_disambiguator(disambiguator: u64) -> [u8; DISAMBIGUATOR_WIDTH] {
    let mut word = [0u8; DISAMBIGUATOR_WIDTH];
    word[DISAMBIGUATOR_WIDTH - 8..].copy_from_slice(&disambiguator.to_be_bytes());
    word
}

/// Derive the id of the game between `white` and `black` created by the input
/// identified by `disambiguator`. Swapping the players yields a different id.
pub fn derive(white: &Address, black: &Address, disambiguator: u64) -> GameId {
    let mut hasher = Keccak256::new();
    hasher.update(white.as_bytes());
    hasher.update(black.as_bytes());
    hasher.update(encode_disambiguator(disambiguator));
    GameId::new(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn test_disambiguator_uses_full_width() {
        let word = encode_disambiguator(0x0102);
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x01, 0x02]);
    }

    #[test]
    fn test_matches_keccak_of_packed_bytes() {
        let white = addr(0xaa);
        let black = addr(0xbb);

        let mut packed = Vec::with_capacity(72);
        packed.extend_from_slice(white.as_bytes());
        packed.extend_from_slice(black.as_bytes());
        packed.extend_from_slice(&encode_disambiguator(7));
        let expected: [u8; 32] = Keccak256::digest(&packed).into();

        assert_eq!(derive(&white, &black, 7), GameId::new(expected));
    }

    #[test]
    fn test_truncation_collision_avoided() {
        // 1 and 257 share their low byte
        let (white, black) = (addr(1), addr(2));
        assert_ne!(derive(&white, &black, 1), derive(&white, &black, 257));
    }

    proptest! {
        #[test]
        fn prop_order_sensitive(a in any::<[u8; 20]>(), b in any::<[u8; 20]>(), d in any::<u64>()) {
            prop_assume!(a != b);
            let (a, b) = (Address::from(a), Address::from(b));
            prop_assert_ne!(derive(&a, &b, d), derive(&b, &a, d));
        }

        #[test]
        fn prop_pure(a in any::<[u8; 20]>(), b in any::<[u8; 20]>(), d in any::<u64>()) {
            let (a, b) = (Address::from(a), Address::from(b));
            prop_assert_eq!(derive(&a, &b, d), derive(&a, &b, d));
        }

        #[test]
        fn prop_disambiguator_distinguishes(d1 in any::<u64>(), d2 in any::<u64>()) {
            prop_assume!(d1 != d2);
            let (a, b) = (addr(3), addr(4));
            prop_assert_ne!(derive(&a, &b, d1), derive(&a, &b, d2));
        }
    }
}
