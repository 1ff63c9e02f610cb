use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};

use crate::utils::strip_card_extension;

/// free-form `key: value` pairs kept in the `---` section of a card file
pub type Properties = BTreeMap<String, String>;

/// A question on the front, an answer on the back
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Card {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
    /// backing file, `None` until the card is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<PathBuf>,
}

impl Card {
    pub fn new(question: &str, answer: &str) -> Card {
        Card {
            question: question.to_string(),
            answer: answer.to_string(),
            properties: Properties::new(),
            location: None,
        }
    }

    /// the same content, backed by `path`
    pub fn with_location(&self, path: &Path) -> Card {
        Card {
            location: Some(path.to_path_buf()),
            ..self.clone()
        }
    }

    pub fn is_saved(&self) -> bool {
        self.location.is_some()
    }

    /// file name without the card extension, as shown in the card list
    pub fn name(&self) -> Option<String> {
        self.location
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| strip_card_extension(&n.to_string_lossy()))
    }

    pub fn side(&self, side: Side) -> &str {
        match side {
            Side::Question => &self.question,
            Side::Answer => &self.answer,
        }
    }

    /// the two cards carry the same text, wherever they live
    pub fn same_content(&self, other: &Card) -> bool {
        self.question == other.question && self.answer == other.answer &&
        self.properties == other.properties
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name().unwrap_or_else(|| "(unsaved)".to_string()))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Question,
    Answer,
}

impl Side {
    pub fn flip(self) -> Side {
        match self {
            Side::Question => Side::Answer,
            Side::Answer => Side::Question,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "{}",
               match *self {
                   Side::Question => "question",
                   Side::Answer => "answer",
               })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_is_empty_and_unsaved() {
        let card = Card::default();
        assert_eq!(card.question, "");
        assert_eq!(card.answer, "");
        assert!(!card.is_saved());
        assert_eq!(card.name(), None);
        assert_eq!(card.to_string(), "(unsaved)");
    }

    #[test]
    fn name_drops_the_extension() {
        let card = Card::new("q", "a").with_location(Path::new("cards/math.card"));
        assert_eq!(card.name().as_deref(), Some("math"));

        let card = card.with_location(Path::new("cards/Shout.CARD"));
        assert_eq!(card.name().as_deref(), Some("Shout"));

        let card = card.with_location(Path::new("cards/v1.2.card"));
        assert_eq!(card.name().as_deref(), Some("v1.2"));
    }

    #[test]
    fn same_content_ignores_location() {
        let a = Card::new("q", "a").with_location(Path::new("x.card"));
        let b = Card::new("q", "a");
        assert!(a.same_content(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn sides() {
        let card = Card::new("front", "back");
        assert_eq!(card.side(Side::Question), "front");
        assert_eq!(card.side(Side::Question.flip()), "back");
        assert_eq!(Side::Answer.flip(), Side::Question);
    }
}
