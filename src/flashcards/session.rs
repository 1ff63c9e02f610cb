//! State of one study/editing session, passed to whoever draws it.

use crate::card::{Card, Side};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    /// both sides shown and editable
    Editor,
    /// one side at a time, flipped on demand
    Player,
}

#[derive(Clone, Debug)]
pub struct Session {
    pub card: Card,
    pub mode: Mode,
    pub side: Side,
    pub side_panel: bool,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            card: Card::default(),
            mode: Mode::Editor,
            side: Side::Question,
            side_panel: true,
        }
    }
}

impl Session {
    pub fn player(card: Card) -> Session {
        Session {
            card: card,
            mode: Mode::Player,
            ..Default::default()
        }
    }

    /// swap sides; editors see both already, so it does nothing there
    pub fn flip(&mut self) -> Side {
        if self.mode == Mode::Player {
            self.side = self.side.flip();
        }
        self.side
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Player && self.mode != Mode::Player {
            self.side = Side::Question;
        }
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        match self.mode {
            Mode::Editor => self.set_mode(Mode::Player),
            Mode::Player => self.set_mode(Mode::Editor),
        }
    }

    pub fn toggle_side_panel(&mut self) -> bool {
        self.side_panel = !self.side_panel;
        self.side_panel
    }

    pub fn load(&mut self, card: Card) {
        self.card = card;
        self.side = Side::Question;
    }

    pub fn new_card(&mut self) {
        self.load(Card::default());
    }

    /// The sides on screen right now, in display order.
    pub fn visible(&self) -> Vec<(Side, &str)> {
        match self.mode {
            Mode::Editor => vec![
                (Side::Question, self.card.side(Side::Question)),
                (Side::Answer, self.card.side(Side::Answer)),
            ],
            Mode::Player => vec![(self.side, self.card.side(self.side))],
        }
    }
}
