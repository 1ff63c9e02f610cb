use std::path::PathBuf;

use crate::card::Card;
use crate::errors::Result;
use crate::store::{CardStore, OnCollision};
use crate::utils::card_path;

/// Outcome of a file chooser dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum Choice {
    Approved(PathBuf),
    Cancelled,
}

/// Maps what the user asked for onto store calls.
///
/// Holds nothing but the store; every file name goes through the same
/// `.card` extension rule on the way in and out.
pub struct Controller<'a> {
    store: &'a CardStore,
}

impl<'a> Controller<'a> {
    pub fn new(store: &'a CardStore) -> Controller<'a> {
        Controller { store: store }
    }

    pub fn store(&self) -> &CardStore {
        self.store
    }

    pub fn new_card(&self) -> Card {
        Card::default()
    }

    pub fn list(&self) -> Result<Vec<Card>> {
        self.store.list()
    }

    /// The card in the chosen file, `None` when the chooser was cancelled.
    /// A name picked without `.card` gets it, as on save.
    pub fn open(&self, choice: Choice) -> Result<Option<Card>> {
        match choice {
            Choice::Approved(path) => self.store.load(&card_path(&path)?).map(Some),
            Choice::Cancelled => Ok(None),
        }
    }

    /// Save `card` to the chosen file. The saved card comes back with its
    /// final location; `None` when the chooser was cancelled.
    pub fn save(&self, card: &Card, choice: Choice, on_collision: OnCollision) -> Result<Option<Card>> {
        match choice {
            Choice::Approved(path) => self.store.save(card, &path, on_collision).map(Some),
            Choice::Cancelled => Ok(None),
        }
    }

    pub fn delete(&self, card: &Card) -> Result<()> {
        self.store.delete(card)
    }

    pub fn rename(&self, card: &Card, new_name: &str, on_collision: OnCollision) -> Result<Card> {
        self.store.rename(card, new_name, on_collision)
    }
}
