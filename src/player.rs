//! The player contract consumed by front ends.
//!
//! A player is a tagged variant: the engine searches, a human relays a move
//! staged by the caller (the input surface itself lives outside the core).
//! Either way `get_move` leaves the handed-in position bit-identical.

use crate::moves::types::Move;
use crate::position::Position;
use crate::search::Engine;

pub struct Human {
    name: String,
    staged: Option<Move>,
}

impl Human {
    pub fn new(name: impl Into<String>) -> Self {
        Human {
            name: name.into(),
            staged: None,
        }
    }

    /// Hand over the move the person chose; the next `get_move` returns it.
    pub fn stage_move(&mut self, mv: Move) {
        self.staged = Some(mv);
    }
}

pub enum Player {
    Engine(Box<Engine>),
    Human(Human),
}

impl Player {
    pub fn engine(engine: Engine) -> Self {
        Player::Engine(Box::new(engine))
    }

    pub fn human(name: impl Into<String>) -> Self {
        Player::Human(Human::new(name))
    }

    pub fn name(&self) -> &str {
        match self {
            Player::Engine(engine) => engine.name(),
            Player::Human(human) => &human.name,
        }
    }

    pub fn accepts_draw(&self) -> bool {
        match self {
            Player::Engine(engine) => engine.accepts_draw(),
            Player::Human(_) => false,
        }
    }

    /// Produce the player's move for `position`. The engine searches in
    /// place via make/unmake; a human returns the staged move, or
    /// [`Move::NONE`] when nothing is staged.
    pub fn get_move(&mut self, position: &mut Position) -> Move {
        match self {
            Player::Engine(engine) => engine.get_move(position),
            Player::Human(human) => human.staged.take().unwrap_or(Move::NONE),
        }
    }

    /// Ask a running `get_move` to return as soon as it can; idempotent.
    pub fn stop(&self) {
        if let Player::Engine(engine) = self {
            engine.stop();
        }
    }

    /// Clear learned state between games.
    pub fn reset(&mut self) {
        match self {
            Player::Engine(engine) => engine.reset(),
            Player::Human(human) => human.staged = None,
        }
    }
}
