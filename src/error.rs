//! Error and Result module.

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Result type returned from methods that can have a `mercury` [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

type Cause = Box<dyn StdError + Send + Sync>;

/// An error encountered while parsing, composing, or driving an HTTP/1.x
/// message.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: Kind,
    cause: Option<Cause>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// The incoming message was malformed in a way the state machine maps
    /// to an HTTP status (see [`crate::status::Error`]).
    Parse(ParseError),
    /// The message reached EOF without completing.
    Incomplete,
    /// A status was raised directly (e.g. a 301 redirect from URI
    /// normalization, or 501 for an unsupported method) rather than derived
    /// from a [`ParseError`].
    Status,
    /// I/O error surfaced by an orchestrator while driving a socket.
    Io,
}

/// The specific grammar violation that caused a [`Kind::Parse`] error.
///
/// `proto::h1` is responsible for turning each into the correct
/// [`crate::status::Status`] when composing an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed request-line or status-line.
    InvalidLine,
    /// Malformed or disallowed URI.
    InvalidUri,
    /// Malformed header block or illegal header characters.
    InvalidHeader,
    /// Malformed chunk framing or length/body mismatch.
    InvalidBody,
    /// Unparsable date string.
    InvalidDate,
}

impl Error {
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(ErrorImpl { kind, cause: None }),
        }
    }

    pub(crate) fn new_parse(kind: ParseError) -> Error {
        Error::new(Kind::Parse(kind))
    }

    pub(crate) fn with<C: Into<Cause>>(mut self, cause: C) -> Error {
        self.inner.cause = Some(cause.into());
        self
    }

    /// The parse-error subtype, if this error originated in the state
    /// machine rather than from I/O.
    pub fn parse_error(&self) -> Option<ParseError> {
        match self.inner.kind {
            Kind::Parse(p) => Some(p),
            _ => None,
        }
    }

    /// True if the message simply ran out of bytes before completing.
    pub fn is_incomplete(&self) -> bool {
        matches!(self.inner.kind, Kind::Incomplete)
    }

    fn description(&self) -> &str {
        match self.inner.kind {
            Kind::Parse(ParseError::InvalidLine) => "invalid request or status line",
            Kind::Parse(ParseError::InvalidUri) => "invalid URI",
            Kind::Parse(ParseError::InvalidHeader) => "invalid header block",
            Kind::Parse(ParseError::InvalidBody) => "invalid body framing",
            Kind::Parse(ParseError::InvalidDate) => "invalid date",
            Kind::Incomplete => "message ended before completion",
            Kind::Status => "HTTP status raised",
            Kind::Io => "I/O error",
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("mercury::Error");
        f.field(&self.inner.kind);
        if let Some(ref cause) = self.inner.cause {
            f.field(cause);
        }
        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.cause {
            Some(ref cause) => write!(f, "{}: {}", self.description(), cause),
            None => f.write_str(self.description()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.cause.as_ref().map(|c| &**c as _)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(Kind::Io).with(err)
    }
}

impl From<crate::status::Error> for Error {
    fn from(err: crate::status::Error) -> Error {
        let kind = match err.status().parse_error_kind() {
            Some(p) => Kind::Parse(p),
            None => Kind::Status,
        };
        Error::new(kind).with(err)
    }
}
