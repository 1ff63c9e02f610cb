//! Directory-backed collection of cards, one `.card` file per card.

use std::fs::{self, read_dir};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;
use tempfile::{Builder, NamedTempFile};

use crate::card::Card;
use crate::codec;
use crate::errors::{io_at, Error, Result};
use crate::utils::{accepts, card_path, check_card_name, with_card_extension};

/// What to do when a save or rename lands on an existing file.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum OnCollision {
    #[default]
    Overwrite,
    Fail,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SearchFlags {
    pub regex: bool,
    /// also look at the answer side
    pub search_answer: bool,
}

/// Create `path` (and its parents) unless it is already there.
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        log::debug!("creating cards folder {}", path.display());
    }
    fs::create_dir_all(path).map_err(|e| Error::from(e).at(path))?;
    Ok(path.to_path_buf())
}

/// A temporary file next to `target` carrying the permissions the card
/// file should end up with: those of the file it replaces, or the umask
/// default for a new one.
fn temp_file_for(parent: &Path, target: &Path) -> Result<NamedTempFile> {
    let existing = fs::metadata(target).ok().map(|m| m.permissions());
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if existing.is_none() {
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
    }
    let tmp = builder.tempfile_in(parent).map_err(|e| io_at(e, parent))?;
    if let Some(perms) = existing {
        tmp.as_file().set_permissions(perms).map_err(|e| io_at(e, tmp.path()))?;
    }
    Ok(tmp)
}

pub struct CardStore {
    folder: PathBuf,
}

impl CardStore {
    /// Use `folder` for cards, creating it if needed. The folder is kept as
    /// an absolute path, so card locations never depend on the working
    /// directory.
    pub fn open(folder: &Path) -> Result<CardStore> {
        let folder = ensure_directory(folder)?;
        let folder = fs::canonicalize(&folder).map_err(|e| io_at(e, &folder))?;
        Ok(CardStore { folder: folder })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// path of the card called `name` in this folder
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.folder.join(with_card_extension(name))
    }

    /// Every card file in the folder with its own decode result.
    ///
    /// Entries the card filter rejects (other extensions) and subdirectories
    /// are left out. Order is whatever the directory listing gives.
    pub fn scan(&self) -> Result<Vec<(PathBuf, Result<Card>)>> {
        let mut found = Vec::new();
        for entry in read_dir(&self.folder).map_err(|e| io_at(e, &self.folder))? {
            let path = entry?.path();
            if path.is_dir() || !accepts(&path) {
                continue;
            }
            let card = codec::decode_file(&path);
            found.push((path, card));
        }
        Ok(found)
    }

    /// every card that decodes; broken files are logged and skipped
    pub fn list(&self) -> Result<Vec<Card>> {
        let mut cards = Vec::new();
        for (path, card) in self.scan()? {
            match card {
                Ok(c) => cards.push(c),
                Err(e) => log::warn!("skipping {}: {}", path.display(), e),
            }
        }
        Ok(cards)
    }

    /// decode one card; relative paths are taken from the cards folder
    pub fn load(&self, path: &Path) -> Result<Card> {
        codec::decode_file(&self.folder.join(path))
    }

    /// Look a card up by its display name, with or without `.card`.
    pub fn find(&self, name: &str) -> Result<Card> {
        self.load(&self.path_for(name))
    }

    /// Write the card's text to `target` (given the card extension if it
    /// lacks one) and return it backed by the final path.
    ///
    /// The text goes to a temporary file next to the target which is then
    /// renamed over it, so readers never see a half-written card.
    pub fn save(&self, card: &Card, target: &Path, on_collision: OnCollision) -> Result<Card> {
        let target = card_path(target)?;
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut tmp = temp_file_for(&parent, &target)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            codec::encode(card, &mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        match on_collision {
            OnCollision::Overwrite => {
                tmp.persist(&target).map_err(|e| io_at(e.error, &target))?;
            }
            OnCollision::Fail => {
                if let Err(e) = tmp.persist_noclobber(&target) {
                    if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                        return Err(Error::name_collision(target));
                    }
                    return Err(io_at(e.error, &target));
                }
            }
        }
        log::debug!("saved {}", target.display());
        Ok(card.with_location(&target))
    }

    /// `save` under `name` inside the cards folder
    pub fn save_named(&self, card: &Card, name: &str, on_collision: OnCollision) -> Result<Card> {
        check_card_name(name)?;
        self.save(card, &self.folder.join(name), on_collision)
    }

    pub fn delete(&self, card: &Card) -> Result<()> {
        let path = card.location.as_ref().ok_or_else(Error::unsaved)?;
        fs::remove_file(path).map_err(|e| io_at(e, path))?;
        log::debug!("deleted {}", path.display());
        Ok(())
    }

    /// Move the card to `new_name` in the same folder, keeping its current
    /// text.
    ///
    /// The text is first written over the old file, then the file is moved
    /// with one rename, so there is never a second copy on disk. A
    /// `NameCollision` check under `OnCollision::Fail` is not atomic with
    /// the move.
    pub fn rename(&self, card: &Card, new_name: &str, on_collision: OnCollision) -> Result<Card> {
        let old = card.location.clone().ok_or_else(Error::unsaved)?;
        check_card_name(new_name)?;
        if !old.is_file() {
            return Err(Error::not_found(old));
        }
        let new = old.with_file_name(with_card_extension(new_name));
        if new == old {
            return self.save(card, &old, OnCollision::Overwrite);
        }
        if on_collision == OnCollision::Fail && new.exists() {
            return Err(Error::name_collision(new));
        }

        self.save(card, &old, OnCollision::Overwrite)?;
        fs::rename(&old, &new).map_err(|e| io_at(e, &old))?;
        log::debug!("renamed {} to {}", old.display(), new.display());
        Ok(card.with_location(&new))
    }

    pub fn last_touched(&self, card: &Card) -> Result<chrono::DateTime<chrono::Local>> {
        let path = card.location.as_ref().ok_or_else(Error::unsaved)?;
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| io_at(e, path))?;
        Ok(chrono::DateTime::<chrono::Local>::from(modified))
    }

    /// cards whose question (or answer, with `search_answer`) matches
    pub fn search(&self, pattern: &str, flags: SearchFlags) -> Result<Vec<Card>> {
        let cards = self.list()?;
        let matches: Vec<Card> = if flags.regex {
            let re = Regex::new(pattern)?;
            cards.into_iter()
                 .filter(|c| re.is_match(&c.question) ||
                             (flags.search_answer && re.is_match(&c.answer)))
                 .collect()
        } else {
            cards.into_iter()
                 .filter(|c| c.question.contains(pattern) ||
                             (flags.search_answer && c.answer.contains(pattern)))
                 .collect()
        };
        Ok(matches)
    }
}
