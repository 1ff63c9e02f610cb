//! The `.card` text format.
//!
//! A card file is a run of sections, each one opened and closed by the same
//! three character sentinel line:
//!
//! ```text
//! ???
//! question line 1
//! question line 2
//! ???
//!
//! ===
//! answer
//! ===
//! ```
//!
//! An optional `---` section holding YAML `key: value` properties may come
//! first; text there that is not such a map is ignored, with a warning.
//! Lines outside any section are ignored. A body line equal to its own
//! section's sentinel cannot be represented.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde_yaml::Value;

use crate::card::{Card, Properties};
use crate::errors::{io_at, Error, Result};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Section {
    Properties,
    Question,
    Answer,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Properties, Section::Question, Section::Answer];

    pub fn sentinel(self) -> &'static str {
        match self {
            Section::Properties => "---",
            Section::Question => "???",
            Section::Answer => "===",
        }
    }

    /// the section a line opens, if it is a sentinel at all
    pub fn opened_by(line: &str) -> Option<Section> {
        Section::ALL.iter().copied().find(|s| s.sentinel() == line)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "{}",
               match *self {
                   Section::Properties => "properties",
                   Section::Question => "question",
                   Section::Answer => "answer",
               })
    }
}

/// Whatever could be read out of a card file, complete or not.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Decoded {
    pub question: String,
    pub answer: String,
    /// raw YAML body of the properties section
    pub properties: String,
    /// section still open when the input ran out
    pub unclosed: Option<Section>,
}

impl Decoded {
    fn field_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Properties => &mut self.properties,
            Section::Question => &mut self.question,
            Section::Answer => &mut self.answer,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.unclosed.is_none()
    }

    /// strict conversion, refusing a file whose last section never closed
    pub fn into_card(self, location: Option<&Path>) -> Result<Card> {
        if let Some(section) = self.unclosed {
            return Err(Error::malformed(section,
                                        Some(format!("missing closing `{}`", section.sentinel()))));
        }
        let properties = match parse_properties(&self.properties) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("ignoring properties of {}: {}",
                           location.map_or("card".into(), |l| l.display().to_string()),
                           e);
                Properties::new()
            }
        };
        Ok(Card {
            question: self.question,
            answer: self.answer,
            properties: properties,
            location: location.map(Path::to_path_buf),
        })
    }
}

fn parse_properties(body: &str) -> Result<Properties> {
    let mut properties = Properties::new();
    if body.trim().is_empty() {
        return Ok(properties);
    }
    // the accumulator drops the final line break the YAML was written with
    let yaml = format!("{}\n", body);
    let raw: std::collections::BTreeMap<String, Value> = serde_yaml::from_str(&yaml)
        .map_err(|e| Error::malformed(Section::Properties, Some(e.to_string())))?;
    for (key, value) in raw {
        let value = match value {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            _ => {
                return Err(Error::malformed(Section::Properties,
                                            Some(format!("property `{}` is not a plain value", key))))
            }
        };
        properties.insert(key, value);
    }
    Ok(properties)
}

/// Read sections line by line.
///
/// Every body line is appended to its field behind a `\n`, and the first
/// character is dropped when the section closes, so N lines come back joined
/// by `\n` and an empty body comes back as `""`. Reopening a section appends
/// to what is already there under the same rule.
pub fn decode<R: BufRead>(reader: R) -> Result<Decoded> {
    let mut decoded = Decoded::default();
    let mut open: Option<Section> = None;

    for line in reader.lines() {
        let line = line?;
        match open {
            Some(section) => {
                let field = decoded.field_mut(section);
                if line == section.sentinel() {
                    if !field.is_empty() {
                        field.remove(0);
                    }
                    open = None;
                } else {
                    field.push('\n');
                    field.push_str(&line);
                }
            }
            None => open = Section::opened_by(&line),
        }
    }

    decoded.unclosed = open;
    Ok(decoded)
}

pub fn decode_str(text: &str) -> Result<Decoded> {
    decode(text.as_bytes())
}

/// decode the card stored at `path`, which becomes its location
pub fn decode_file(path: &Path) -> Result<Card> {
    let file = File::open(path).map_err(|e| io_at(e, path))?;
    decode(BufReader::new(file))
        .map_err(|e| e.at(path))?
        .into_card(Some(path))
        .map_err(|e| e.at(path))
}

fn write_section<W: Write>(writer: &mut W, section: Section, body: &str) -> Result<()> {
    writeln!(writer, "{}", section.sentinel())?;
    if !body.is_empty() {
        writeln!(writer, "{}", body)?;
    }
    writeln!(writer, "{}", section.sentinel())?;
    Ok(())
}

pub fn encode<W: Write>(card: &Card, writer: &mut W) -> Result<()> {
    if !card.properties.is_empty() {
        let yaml = serde_yaml::to_string(&card.properties)?;
        let body = yaml.strip_suffix('\n').unwrap_or(&yaml);
        write_section(writer, Section::Properties, body)?;
        writeln!(writer)?;
    }
    write_section(writer, Section::Question, &card.question)?;
    writeln!(writer)?;
    write_section(writer, Section::Answer, &card.answer)?;
    Ok(())
}

pub fn encode_to_string(card: &Card) -> Result<String> {
    let mut buf = Vec::new();
    encode(card, &mut buf)?;
    Ok(String::from_utf8(buf).map_err(|e| format!("UTF-8 error: {}", e))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(question: &str, answer: &str) -> Card {
        let text = encode_to_string(&Card::new(question, answer)).unwrap();
        decode_str(&text).unwrap().into_card(None).unwrap()
    }

    #[test]
    fn layout_matches_the_file_format() {
        let text = encode_to_string(&Card::new("2+2?", "4")).unwrap();
        assert_eq!(text, "???\n2+2?\n???\n\n===\n4\n===\n");
    }

    #[test]
    fn empty_bodies_are_omitted() {
        let text = encode_to_string(&Card::default()).unwrap();
        assert_eq!(text, "???\n???\n\n===\n===\n");
    }

    #[test]
    fn empty_question_stays_empty() {
        let card = round_trip("", "x");
        assert_eq!(card.question, "");
        assert_eq!(card.answer, "x");
    }

    #[test]
    fn multiline_round_trip() {
        let pairs = [
            ("line one\nline two", "a\n\nb"),
            ("trailing newline\n", "\nleading newline"),
            ("\n", "just\n\n\nblank lines"),
            ("contains === inline", "contains ??? inline"),
            ("===", "???"),
        ];
        for (q, a) in pairs.iter() {
            let card = round_trip(q, a);
            assert_eq!(&card.question, q);
            assert_eq!(&card.answer, a);
        }
    }

    #[test]
    fn own_sentinel_in_body_corrupts() {
        let text = encode_to_string(&Card::new("before\n???\nafter", "x")).unwrap();
        let decoded = decode_str(&text).unwrap();
        assert_ne!(decoded.question, "before\n???\nafter");
    }

    #[test]
    fn text_outside_sections_is_ignored() {
        let text = "header junk\n???\nq\n???\nin between\n===\na\n===\ntrailer\n";
        let card = decode_str(text).unwrap().into_card(None).unwrap();
        assert_eq!(card.question, "q");
        assert_eq!(card.answer, "a");
    }

    #[test]
    fn crlf_lines_decode() {
        let text = "???\r\nq1\r\nq2\r\n???\r\n\r\n===\r\na\r\n===\r\n";
        let card = decode_str(text).unwrap().into_card(None).unwrap();
        assert_eq!(card.question, "q1\nq2");
        assert_eq!(card.answer, "a");
    }

    #[test]
    fn unclosed_section_is_malformed() {
        let decoded = decode_str("???\nq\n???\n===\npartial answer\n").unwrap();
        assert!(!decoded.is_complete());
        assert_eq!(decoded.unclosed, Some(Section::Answer));
        assert_eq!(decoded.question, "q");
        assert_eq!(decoded.answer, "\npartial answer");

        let err = decoded.into_card(None).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn missing_sections_decode_empty() {
        let card = decode_str("").unwrap().into_card(None).unwrap();
        assert_eq!(card, Card::default());
    }

    #[test]
    fn reopened_section_keeps_accumulating() {
        let card = decode_str("???\nab\n???\n???\ncd\n???\n").unwrap().into_card(None).unwrap();
        assert_eq!(card.question, "b\ncd");
    }

    #[test]
    fn properties_round_trip() {
        let mut card = Card::new("q", "a");
        card.properties.insert("deck".to_string(), "math".to_string());
        card.properties.insert("level".to_string(), "2".to_string());
        card.properties.insert("note".to_string(), "line\n".to_string());
        card.properties.insert("multi".to_string(), "a\nb".to_string());
        card.properties.insert("kept".to_string(), "x\n\n".to_string());

        let text = encode_to_string(&card).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.ends_with("???\nq\n???\n\n===\na\n===\n"));

        let back = decode_str(&text).unwrap().into_card(None).unwrap();
        assert_eq!(back.properties, card.properties);
        assert!(back.same_content(&card));
    }

    #[test]
    fn scalar_properties_become_strings() {
        let text = "---\nlevel: 3\nstarred: true\nnote:\n---\n???\nq\n???\n";
        let card = decode_str(text).unwrap().into_card(None).unwrap();
        assert_eq!(card.properties["level"], "3");
        assert_eq!(card.properties["starred"], "true");
        assert_eq!(card.properties["note"], "");
    }

    #[test]
    fn unusable_properties_are_ignored() {
        let texts = [
            "---\ntags:\n  - a\n  - b\n---\n???\nq\n???\n\n===\na\n===\n",
            "---\nfree form notes: [unbalanced\n---\n???\nq\n???\n\n===\na\n===\n",
            "---\njust a sentence\n---\n???\nq\n???\n\n===\na\n===\n",
        ];
        for text in texts.iter() {
            let card = decode_str(text).unwrap().into_card(None).unwrap();
            assert!(card.properties.is_empty());
            assert_eq!(card.question, "q");
            assert_eq!(card.answer, "a");
        }
    }

    #[test]
    fn sentinel_lookup() {
        assert_eq!(Section::opened_by("???"), Some(Section::Question));
        assert_eq!(Section::opened_by("==="), Some(Section::Answer));
        assert_eq!(Section::opened_by("---"), Some(Section::Properties));
        assert_eq!(Section::opened_by(" ???"), None);
        assert_eq!(Section::opened_by("????"), None);
    }
}
