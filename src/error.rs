use std::error;
use std::fmt::{self, Debug, Display};
use std::io;
use std::result;
use std::string;

use serde::ser;
use yaml_rust::scanner::{Marker, ScanError};

/// This type represents all possible errors that can occur when loading or
/// dumping YAML data.
pub struct Error(Box<ErrorImpl>);

/// Alias for a `Result` with the error type `yaml_for_humans::Error`.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub(crate) enum ErrorImpl {
    Message(String),

    Scan(ScanError),
    Io(io::Error),
    FromUtf8(string::FromUtf8Error),

    UnknownAnchor(Marker),
    NonScalarKey,
    EndOfStream,
    MoreThanOneDocument,
}

pub(crate) fn new(inner: ErrorImpl) -> Error {
    Error(Box::new(inner))
}

pub(crate) fn scanner(err: ScanError) -> Error {
    new(ErrorImpl::Scan(err))
}

pub(crate) fn io(err: io::Error) -> Error {
    new(ErrorImpl::Io(err))
}

pub(crate) fn string_utf8(err: string::FromUtf8Error) -> Error {
    new(ErrorImpl::FromUtf8(err))
}

pub(crate) fn unknown_anchor(mark: Marker) -> Error {
    new(ErrorImpl::UnknownAnchor(mark))
}

pub(crate) fn non_scalar_key() -> Error {
    new(ErrorImpl::NonScalarKey)
}

pub(crate) fn end_of_stream() -> Error {
    new(ErrorImpl::EndOfStream)
}

pub(crate) fn more_than_one_document() -> Error {
    new(ErrorImpl::MoreThanOneDocument)
}

impl Error {
    /// Returns the (line, column) location of a parse error, if the
    /// underlying scanner reported one. Both are 1-based.
    pub fn location(&self) -> Option<(usize, usize)> {
        match *self.0 {
            ErrorImpl::Scan(ref err) => {
                let marker = err.marker();
                Some((marker.line(), marker.col() + 1))
            }
            ErrorImpl::UnknownAnchor(ref mark) => Some((mark.line(), mark.col() + 1)),
            _ => None,
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self.0 {
            ErrorImpl::Scan(ref err) => Some(err),
            ErrorImpl::Io(ref err) => Some(err),
            ErrorImpl::FromUtf8(ref err) => Some(err),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorImpl::Message(ref msg) => Display::fmt(msg, f),
            ErrorImpl::Scan(ref err) => Display::fmt(err, f),
            ErrorImpl::Io(ref err) => Display::fmt(err, f),
            ErrorImpl::FromUtf8(ref err) => Display::fmt(err, f),
            ErrorImpl::UnknownAnchor(ref mark) => write!(
                f,
                "unknown anchor at line {} column {}",
                mark.line(),
                mark.col() + 1
            ),
            ErrorImpl::NonScalarKey => f.write_str("mapping keys must be scalar values"),
            ErrorImpl::EndOfStream => f.write_str("EOF while parsing a value"),
            ErrorImpl::MoreThanOneDocument => f.write_str(
                "deserializing from YAML containing more than one document is not supported",
            ),
        }
    }
}

// Remove two layers of verbosity from the debug representation. Humans often
// end up seeing this representation because it is what unwrap() shows.
impl Debug for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorImpl::Message(ref msg) => formatter.debug_tuple("Message").field(msg).finish(),
            ErrorImpl::Scan(ref scan) => formatter.debug_tuple("Scan").field(scan).finish(),
            ErrorImpl::Io(ref io) => formatter.debug_tuple("Io").field(io).finish(),
            ErrorImpl::FromUtf8(ref from_utf8) => {
                formatter.debug_tuple("FromUtf8").field(from_utf8).finish()
            }
            ErrorImpl::UnknownAnchor(ref mark) => {
                formatter.debug_tuple("UnknownAnchor").field(mark).finish()
            }
            ErrorImpl::NonScalarKey => formatter.debug_tuple("NonScalarKey").finish(),
            ErrorImpl::EndOfStream => formatter.debug_tuple("EndOfStream").finish(),
            ErrorImpl::MoreThanOneDocument => {
                formatter.debug_tuple("MoreThanOneDocument").finish()
            }
        }
    }
}

impl ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        new(ErrorImpl::Message(msg.to_string()))
    }
}
