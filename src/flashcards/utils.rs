use std::fs::File;
use std::io::{Write, Read, stdout, stdin};
use std::path::{is_separator, Component, Path, PathBuf};
use std::process::{Command, Stdio};
use std::env::var;

use crossterm::{
    style::{Attribute, SetAttribute},
    execute,
    tty::IsTty,
};

use tempfile::Builder;

// flashcards imports
use crate::{specific_fail, specific_fail_str};
use crate::errors::{Result, Error, ErrorKind};

pub use libc::{STDIN_FILENO, STDOUT_FILENO};

/// extension of every card file, compared case-insensitively
pub static CARD_EXTENSION: &'static str = "card";
/// folder used when nothing else is configured
pub static DEFAULT_CARDS_FOLDER: &'static str = "./cards";
/// short datetime formating string for printing
pub static DATEFMT_SHORT: &'static str = "%F %T";

/// Lowercased text after the last `.` of a file name.
///
/// A dot in first or last position does not start an extension, so
/// `.hidden` and `trailing.` have none.
pub fn file_extension(file_name: &str) -> Option<String> {
    match file_name.rfind('.') {
        Some(i) if i > 0 && i < file_name.len() - 1 => Some(file_name[i + 1..].to_lowercase()),
        _ => None,
    }
}

pub fn has_card_extension(file_name: &str) -> bool {
    file_extension(file_name).map_or(false, |ext| ext == CARD_EXTENSION)
}

/// `name` with `.card` appended, unless it already ends in it
pub fn with_card_extension(name: &str) -> String {
    if has_card_extension(name) {
        name.to_string()
    } else {
        format!("{}.{}", name, CARD_EXTENSION)
    }
}

/// same rule as `with_card_extension`, applied to the last path component
pub fn card_path(path: &Path) -> Result<PathBuf> {
    let name = match path.file_name() {
        Some(n) => n.to_string_lossy().into_owned(),
        None => return specific_fail!(format!("{} is not a file name.", path.display())),
    };
    Ok(path.with_file_name(with_card_extension(&name)))
}

/// A card name is one plain file name: not empty, no separators, no `.`/`..`.
pub fn check_card_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(is_separator) => Ok(()),
        _ => specific_fail!(format!("`{}` is not a valid card name.", name)),
    }
}

pub fn strip_card_extension(file_name: &str) -> String {
    if has_card_extension(file_name) {
        file_name[..file_name.len() - CARD_EXTENSION.len() - 1].to_string()
    } else {
        file_name.to_string()
    }
}

/// What a card chooser shows: every directory, and files ending in `.card`.
pub fn accepts(path: &Path) -> bool {
    if path.is_dir() {
        return true;
    }
    path.file_name()
        .map(|n| has_card_extension(&n.to_string_lossy()))
        .unwrap_or(false)
}

pub fn find_cards_folder(cards_folder: &Option<String>) -> Result<PathBuf> {
    if let Some(cf) = cards_folder {
        return Ok(PathBuf::from(cf));
    }
    // ~/.flashcards may hold the path of the folder to use
    if let Some(home) = dirs::home_dir() {
        let pointer = home.join(".flashcards");
        if pointer.is_file() {
            let mut file = File::open(&pointer)?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                return specific_fail_str!("~/.flashcards is a file but is empty. It should contain a path to the cards folder.");
            }
            return Ok(PathBuf::from(trimmed));
        }
    }
    Ok(PathBuf::from(DEFAULT_CARDS_FOLDER))
}

pub fn istty(fd: i32) -> bool {
    match fd {
        STDOUT_FILENO => stdout().is_tty(),
        STDIN_FILENO => stdin().is_tty(),
        _ => false
    }
}

pub fn termsize() -> usize {
    if let Ok((cols, _rows)) = crossterm::terminal::size() {
        cols as usize
    } else {
        0
    }
}

/// Hand `contents` to $VISUAL/$EDITOR in a temporary `.card` file and
/// return what the user saved.
pub fn drop_to_editor(contents: &str) -> Result<String> {
    let tmpfile = Builder::new()
        .prefix("flashcard")
        .suffix(".card")
        .rand_bytes(5)
        .tempfile()?;

    let tmppath = tmpfile.path().to_owned();

    {
        let mut file = File::create(&tmppath)?;
        file.write_all(contents.as_bytes())?;
    }

    let editor = var("VISUAL").or_else(|_| var("EDITOR"))
        .unwrap_or_else(|_| "nano".to_string());

    log::debug!("editing {} with {}", tmppath.display(), editor);
    let mut editor_command = Command::new(&editor);
    editor_command.arg(&tmppath.display().to_string());
    editor_command.stdin(Stdio::inherit());
    editor_command.stdout(Stdio::inherit());
    editor_command.stderr(Stdio::inherit());

    let mut editor_proc = editor_command.spawn().map_err(|e| Error {
        kind: ErrorKind::Generic,
        desc: format!("Failed to start editor '{}': {}", editor, e),
        detail: None,
    })?;

    match editor_proc.wait() {
        Ok(status) if status.success() => {
            let mut file = File::open(&tmppath)?;
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(content)
        }
        _ => specific_fail_str!("The editor process failed."),
    }
}

pub fn get_yn_input(message: &str) -> Result<bool> {
    print!("{}", message);
    stdout().flush()?;

    let stdin = stdin();
    let yes = ["y", "Y", "yes", "YES", "Yes"];
    let no = ["n", "N", "no", "NO", "No"];

    loop {
        print!("[y/n]# ");
        stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            return Ok(false);
        }
        let input = input.trim();
        if yes.contains(&input) {
            return Ok(true);
        } else if no.contains(&input) {
            return Ok(false);
        };
        println!("invalid input.");
    }
}

/// block until the user hits enter, false once stdin is closed or `q` is typed
pub fn wait_for_enter(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    stdout().flush()?;
    let mut input = String::new();
    if stdin().read_line(&mut input)? == 0 {
        return Ok(false);
    }
    Ok(input.trim() != "q")
}

pub fn pretty_line(bold: &str, plain: &str, tty: bool) -> Result<()> {
    let mut stdout = stdout();
    if tty {
        execute!(stdout, SetAttribute(Attribute::Bold))?;
    }
    print!("{}", bold);
    if tty {
         execute!(stdout, SetAttribute(Attribute::Reset))?;
    }
    print!("{}", plain);
    Ok(())
}

pub fn format_field(value: &str, width: usize, truncate: bool) -> String {
    let count = value.chars().count();
    if count > width && width > 3 && truncate {
        let cut: String = value.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        let cut: String = value.chars().take(width).collect();
        format!("{: <1$}", cut, width)
    }
}

/// first line of a possibly multi-line field, for one-line listings
pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

pub fn localize_last_touched(t: &chrono::DateTime<chrono::Local>) -> String {
    t.format(DATEFMT_SHORT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_rules() {
        assert_eq!(file_extension("notes.card").as_deref(), Some("card"));
        assert_eq!(file_extension("NOTES.CaRd").as_deref(), Some("card"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension(".card"), None);
        assert_eq!(file_extension("notes."), None);
        assert_eq!(file_extension("notes"), None);
    }

    #[test]
    fn extension_is_appended_once() {
        assert_eq!(with_card_extension("notes"), "notes.card");
        assert_eq!(with_card_extension("notes.card"), "notes.card");
        assert_eq!(with_card_extension("notes.CARD"), "notes.CARD");
        assert_eq!(with_card_extension("v1.2"), "v1.2.card");
        assert_eq!(with_card_extension(".card"), ".card.card");
    }

    #[test]
    fn card_path_keeps_the_parent() {
        let p = card_path(Path::new("some/dir/notes")).unwrap();
        assert_eq!(p, PathBuf::from("some/dir/notes.card"));
        assert!(card_path(Path::new("..")).is_err());
    }

    #[test]
    fn card_names_stay_in_the_folder() {
        assert!(check_card_name("notes").is_ok());
        assert!(check_card_name("notes.card").is_ok());
        assert!(check_card_name(".hidden").is_ok());
        assert!(check_card_name("").is_err());
        assert!(check_card_name(".").is_err());
        assert!(check_card_name("..").is_err());
        assert!(check_card_name("../escaped").is_err());
        assert!(check_card_name("sub/notes").is_err());
        assert!(check_card_name("trailing/").is_err());
        assert!(check_card_name("/abs").is_err());
    }

    #[test]
    fn strip_extension() {
        assert_eq!(strip_card_extension("math.card"), "math");
        assert_eq!(strip_card_extension("math.Card"), "math");
        assert_eq!(strip_card_extension("picture.png"), "picture.png");
    }

    #[test]
    fn filter_accepts_directories_and_cards() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("picture.png");
        std::fs::create_dir(&sub).unwrap();
        assert!(accepts(&sub));
        assert!(accepts(dir.path()));

        assert!(accepts(&dir.path().join("math.card")));
        assert!(accepts(&dir.path().join("MATH.CARD")));
        assert!(!accepts(&dir.path().join("picture.jpg")));
        assert!(!accepts(&dir.path().join("card")));
    }

    #[test]
    fn explicit_folder_wins() {
        let folder = find_cards_folder(&Some("/tmp/my-cards".to_string())).unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/my-cards"));
    }

    #[test]
    fn field_formatting() {
        assert_eq!(format_field("abc", 5, false), "abc  ");
        assert_eq!(format_field("abcdefgh", 6, true), "abc...");
        assert_eq!(format_field("abcdefgh", 4, false), "abcd");
        assert_eq!(first_line("one\ntwo"), "one");
        assert_eq!(first_line(""), "");
    }
}
