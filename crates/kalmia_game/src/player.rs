use reversi_core::{DiscColor, GameResult, Move, Position};

/// A participant the game manager can ask for moves.
///
/// The game manager only talks to players through this trait; it never
/// inspects which kind of player it holds.
pub trait Player: Send + Sync {
    /// Display name, used in events and error messages.
    fn name(&self) -> &str;

    /// Produce the next move for the side to move in `pos`.
    ///
    /// May block. Returns `None` when generation was aborted by [`Player::quit`]
    /// or no move could be obtained; callers must not treat that as a move.
    fn generate_move(&self, pos: &Position) -> Option<Move>;

    /// Release any pending `generate_move` and shut the player down.
    /// Calling it more than once has no further effect.
    fn quit(&self);

    /// Called once before the first move of a game.
    fn new_game(&self) {}

    /// Called when the game reaches a terminal position; `color` is the side this player had.
    fn game_over(&self, _color: DiscColor, _result: &GameResult) {}
}
