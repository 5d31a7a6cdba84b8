//! Registry of every game created during the epoch
//!
//! Games are never removed. Resolved games stay for audit and replay but no
//! longer count against a player's funds. All status changes go through the
//! registry so that the forward-only lifecycle is enforced in one place.

use crate::common::types::{Address, GameId};
use crate::errors::{ArenaError, ArenaResult};
use crate::games::types::{ClaimProgress, Game, GameStatus, VerificationContext, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRegistry {
    // BTreeMap keeps iteration order identical across replays
    games: BTreeMap<GameId, Game>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn contains(&self, id: &GameId) -> bool {
        self.games.contains_key(id)
    }

    pub fn get(&self, id: &GameId) -> Option<&Game> {
        self.games.get(id)
    }

    /// Look up a game, failing with `UnknownGame`
    pub fn require(&self, id: &GameId) -> ArenaResult<&Game> {
        self.games.get(id).ok_or(ArenaError::UnknownGame(*id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    /// Register a freshly paired game. Ids are never reused.
    pub fn insert(&mut self, game: Game) -> ArenaResult<()> {
        if self.games.contains_key(&game.id) {
            return Err(ArenaError::DuplicateGame(game.id));
        }
        if game.status != GameStatus::Open {
            return Err(ArenaError::AlreadyVerifying(game.id));
        }
        self.games.insert(game.id, game);
        Ok(())
    }

    /// Number of unresolved games `player` takes part in
    pub fn active_games_for(&self, player: &Address) -> usize {
        self.games
            .values()
            .filter(|game| game.is_active() && game.involves(player))
            .count()
    }

    /// Unresolved game currently bound to `verifier`, if any
    pub fn active_game_for_verifier(&self, verifier: &Address) -> Option<&Game> {
        self.games
            .values()
            .find(|game| game.is_active() && game.bound_verifier() == Some(*verifier))
    }

    /// Check that a verification context may be bound to `id`
    pub fn check_bind(&self, id: &GameId, context: &VerificationContext) -> ArenaResult<&Game> {
        let game = self.require(id)?;

        if game.status == GameStatus::Resolved || game.verification.is_some() {
            return Err(ArenaError::AlreadyVerifying(*id));
        }

        if let Some(other) = self.active_game_for_verifier(&context.verifier) {
            return Err(ArenaError::VerifierAlreadyBound {
                verifier: context.verifier,
                game_id: other.id,
            });
        }

        Ok(game)
    }

    /// Bind the verification context and move the game to AwaitingVerification
    pub fn bind_verification(&mut self, id: &GameId, context: VerificationContext) -> ArenaResult<&Game> {
        self.check_bind(id, &context)?;
        let game = self.game_mut(id)?;
        game.verification = Some(context);
        advance(game, GameStatus::AwaitingVerification)?;
        Ok(&*game)
    }

    /// Record a participant claim; the first claim moves the game to
    /// AwaitingVerification. Agreement does not resolve here, see [`Self::resolve`].
    pub fn record_claim(&mut self, id: &GameId, claimant: &Address, winner: Winner) -> ArenaResult<ClaimProgress> {
        let game = self.game_mut(id)?;
        let (side, progress) = game.evaluate_claim(claimant, winner)?;
        game.record_claim(side, winner);
        advance(game, GameStatus::AwaitingVerification)?;
        Ok(progress)
    }

    /// Finalize a game awaiting verification
    pub fn resolve(&mut self, id: &GameId, winner: Winner) -> ArenaResult<&Game> {
        let game = self.game_mut(id)?;
        if game.status != GameStatus::AwaitingVerification {
            return Err(ArenaError::NotAwaitingVerification(*id));
        }
        game.winner = Some(winner);
        advance(game, GameStatus::Resolved)?;
        Ok(&*game)
    }

    fn game_mut(&mut self, id: &GameId) -> ArenaResult<&mut Game> {
        self.games.get_mut(id).ok_or(ArenaError::UnknownGame(*id))
    }
}

fn advance(game: &mut Game, next: GameStatus) -> ArenaResult<()> {
    if !game.status.can_advance_to(next) {
        return Err(match game.status {
            GameStatus::Resolved => ArenaError::AlreadyResolved(game.id),
            _ => ArenaError::NotAwaitingVerification(game.id),
        });
    }
    game.status = next;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::TemplateHash;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn open_game(id_byte: u8, white: u8, black: u8) -> Game {
        Game::new(GameId::from([id_byte; 32]), addr(white), addr(black), 10, id_byte as u64)
    }

    fn context(verifier: u8) -> VerificationContext {
        VerificationContext {
            verifier: addr(verifier),
            creator: addr(0xcc),
            template_hash: TemplateHash::from([0xee; 32]),
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();

        let err = registry.insert(open_game(1, 3, 4)).unwrap_err();
        assert_eq!(err, ArenaError::DuplicateGame(GameId::from([1; 32])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_active_games_exclude_resolved() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();
        registry.insert(open_game(2, 1, 3)).unwrap();
        assert_eq!(registry.active_games_for(&addr(1)), 2);

        let id = GameId::from([1; 32]);
        registry.record_claim(&id, &addr(1), Winner::White).unwrap();
        registry.record_claim(&id, &addr(2), Winner::White).unwrap();
        registry.resolve(&id, Winner::White).unwrap();

        assert_eq!(registry.active_games_for(&addr(1)), 1);
        assert_eq!(registry.active_games_for(&addr(2)), 0);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bind_verification_only_once() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();
        let id = GameId::from([1; 32]);

        let game = registry.bind_verification(&id, context(0x10)).unwrap();
        assert_eq!(game.status, GameStatus::AwaitingVerification);

        let err = registry.bind_verification(&id, context(0x11)).unwrap_err();
        assert_eq!(err, ArenaError::AlreadyVerifying(id));
        assert_eq!(registry.get(&id).unwrap().bound_verifier(), Some(addr(0x10)));
    }

    #[test]
    fn test_verifier_cannot_serve_two_active_games() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();
        registry.insert(open_game(2, 3, 4)).unwrap();

        registry.bind_verification(&GameId::from([1; 32]), context(0x10)).unwrap();
        let err = registry
            .bind_verification(&GameId::from([2; 32]), context(0x10))
            .unwrap_err();
        assert!(matches!(err, ArenaError::VerifierAlreadyBound { .. }));
        assert_eq!(registry.get(&GameId::from([2; 32])).unwrap().status, GameStatus::Open);
    }

    #[test]
    fn test_resolve_requires_awaiting_verification() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();
        let id = GameId::from([1; 32]);

        assert_eq!(
            registry.resolve(&id, Winner::Draw).unwrap_err(),
            ArenaError::NotAwaitingVerification(id)
        );

        registry.bind_verification(&id, context(0x10)).unwrap();
        let game = registry.resolve(&id, Winner::Draw).unwrap();
        assert_eq!(game.status, GameStatus::Resolved);
        assert_eq!(game.winner, Some(Winner::Draw));

        assert_eq!(
            registry.resolve(&id, Winner::White).unwrap_err(),
            ArenaError::NotAwaitingVerification(id)
        );
    }

    #[test]
    fn test_claimed_game_still_accepts_verification_context() {
        let mut registry = GameRegistry::new();
        registry.insert(open_game(1, 1, 2)).unwrap();
        let id = GameId::from([1; 32]);

        registry.record_claim(&id, &addr(1), Winner::White).unwrap();
        registry.record_claim(&id, &addr(2), Winner::Black).unwrap();

        let game = registry.bind_verification(&id, context(0x10)).unwrap();
        assert_eq!(game.status, GameStatus::AwaitingVerification);
        assert!(game.verification.is_some());
    }

    #[test]
    fn test_unknown_game() {
        let registry = GameRegistry::new();
        let id = GameId::from([7; 32]);
        assert_eq!(registry.require(&id).unwrap_err(), ArenaError::UnknownGame(id));
    }
}
