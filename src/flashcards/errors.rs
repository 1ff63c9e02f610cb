use std::fmt;
use std::convert::From;
use std::error::Error as StdError;
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::PathBuf;

use crate::codec::Section;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ErrorKind {
    /// reading or writing a card file failed
    Io(IoError),
    /// a section was never closed
    MalformedCard(Section),
    NotFound(PathBuf),
    NameCollision(PathBuf),
    /// the card has no backing file yet
    Unsaved,
    Generic,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub desc: String,
    pub detail: Option<String>,
}

impl Error {
    pub fn not_found(path: PathBuf) -> Error {
        Error {
            desc: format!("{} does not exist.", path.display()),
            kind: ErrorKind::NotFound(path),
            detail: None,
        }
    }

    pub fn name_collision(path: PathBuf) -> Error {
        Error {
            desc: format!("{} already exists.", path.display()),
            kind: ErrorKind::NameCollision(path),
            detail: None,
        }
    }

    pub fn malformed(section: Section, detail: Option<String>) -> Error {
        Error {
            kind: ErrorKind::MalformedCard(section),
            desc: format!("malformed card: {} section is broken", section),
            detail: detail,
        }
    }

    pub fn unsaved() -> Error {
        Error {
            kind: ErrorKind::Unsaved,
            desc: "card has not been saved to a file".to_string(),
            detail: None,
        }
    }

    /// attach the file a malformed card or io failure came from
    pub fn at(mut self, path: &std::path::Path) -> Error {
        self.desc = format!("{}: {}", path.display(), self.desc);
        self
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound(_))
    }

    pub fn is_name_collision(&self) -> bool {
        matches!(self.kind, ErrorKind::NameCollision(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedCard(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.detail {
            Some(ref d) => write!(f, "{} ({})", &self.desc, d),
            None => write!(f, "{}", &self.desc),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind {
            ErrorKind::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

// Global macros for easier error generation
#[macro_export]
macro_rules! specific_fail {
    ($short:expr) => {{
        use $crate::errors::{Error, ErrorKind};
        Err(::std::convert::From::from(
            Error {
                kind: ErrorKind::Generic,
                desc: $short,
                detail: None
            }
        ))
    }}
}

#[macro_export]
macro_rules! specific_fail_str {
    ($s:expr) => {
        $crate::specific_fail!($s.to_string())
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error {
            desc: err.to_string(),
            kind: ErrorKind::Io(err),
            detail: None,
        }
    }
}

/// like `From<IoError>` but turns a missing file into `NotFound(path)`
pub fn io_at(err: IoError, path: &std::path::Path) -> Error {
    if err.kind() == IoErrorKind::NotFound {
        Error::not_found(path.to_path_buf())
    } else {
        Error::from(err).at(path)
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Error {
        Error::from(err.error)
    }
}

impl From<serde_yaml::Error> for Error {
   fn from(err: serde_yaml::Error) -> Error {
       Error {
           kind: ErrorKind::Generic,
           desc: format!("YAML error: {}", err),
           detail: None,
       }
   }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: format!("regex error: {}", err),
            detail: None,
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: "formatting error".to_string(),
            detail: None,
        }
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: err,
            detail: None,
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: err.to_string(),
            detail: None,
        }
    }
}
