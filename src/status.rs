//! The HTTP status taxonomy: numeric code, reason phrase, category, and a
//! throwable carrier used both for composing responses and for signalling
//! parse failures out of [`crate::proto::h1`].

use std::fmt;

use crate::error::ParseError;

/// An HTTP status code, 100-599.
///
/// `Status` is a thin `u16` newtype; [`Status::reason`] and
/// [`Status::category`] are table lookups rather than stored fields, so a
/// `Status` is `Copy` and free to pass around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status(u16);

/// The five status categories defined by RFC 7231 §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirection,
    /// 4xx
    ClientError,
    /// 5xx
    ServerError,
}

macro_rules! statuses {
    ($($konst:ident => ($code:expr, $reason:expr);)+) => {
        impl Status {
            $(
                #[doc = $reason]
                pub const $konst: Status = Status($code);
            )+

            /// The canonical reason phrase for this status, if it is one of
            /// the statuses declared as an associated const above.
            /// Unrecognized-but-valid codes fall back to a generic phrase
            /// for their category.
            pub fn reason(self) -> &'static str {
                match self.0 {
                    $($code => $reason,)+
                    _ => self.category().generic_reason(),
                }
            }
        }
    };
}

statuses! {
    CONTINUE => (100, "Continue");
    SWITCHING_PROTOCOLS => (101, "Switching Protocols");

    OK => (200, "OK");
    CREATED => (201, "Created");
    ACCEPTED => (202, "Accepted");
    NON_AUTHORITATIVE_INFORMATION => (203, "Non-Authoritative Information");
    NO_CONTENT => (204, "No Content");
    RESET_CONTENT => (205, "Reset Content");
    PARTIAL_CONTENT => (206, "Partial Content");

    MULTIPLE_CHOICES => (300, "Multiple Choices");
    MOVED_PERMANENTLY => (301, "Moved Permanently");
    FOUND => (302, "Found");
    SEE_OTHER => (303, "See Other");
    NOT_MODIFIED => (304, "Not Modified");
    USE_PROXY => (305, "Use Proxy");
    TEMPORARY_REDIRECT => (307, "Temporary Redirect");

    BAD_REQUEST => (400, "Bad Request");
    UNAUTHORIZED => (401, "Unauthorized");
    PAYMENT_REQUIRED => (402, "Payment Required");
    FORBIDDEN => (403, "Forbidden");
    NOT_FOUND => (404, "Not Found");
    METHOD_NOT_ALLOWED => (405, "Method Not Allowed");
    NOT_ACCEPTABLE => (406, "Not Acceptable");
    PROXY_AUTHENTICATION_REQUIRED => (407, "Proxy Authentication Required");
    REQUEST_TIMEOUT => (408, "Request Timeout");
    CONFLICT => (409, "Conflict");
    GONE => (410, "Gone");
    LENGTH_REQUIRED => (411, "Length Required");
    PRECONDITION_FAILED => (412, "Precondition Failed");
    PAYLOAD_TOO_LARGE => (413, "Payload Too Large");
    REQUEST_URI_TOO_LONG => (414, "URI Too Long");
    UNSUPPORTED_MEDIA_TYPE => (415, "Unsupported Media Type");
    RANGE_NOT_SATISFIABLE => (416, "Range Not Satisfiable");
    EXPECTATION_FAILED => (417, "Expectation Failed");
    IM_A_TEAPOT => (418, "I'm a teapot");

    INTERNAL_SERVER_ERROR => (500, "Internal Server Error");
    NOT_IMPLEMENTED => (501, "Not Implemented");
    BAD_GATEWAY => (502, "Bad Gateway");
    SERVICE_UNAVAILABLE => (503, "Service Unavailable");
    GATEWAY_TIMEOUT => (504, "Gateway Timeout");
    HTTP_VERSION_NOT_SUPPORTED => (505, "HTTP Version Not Supported");
}

impl Status {
    /// Build a `Status` from a raw code, checked to lie in 100..=599.
    pub fn from_u16(code: u16) -> Option<Status> {
        match code {
            100..=599 => Some(Status(code)),
            _ => None,
        }
    }

    /// The raw numeric code.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// The status category (1xx-5xx), derived from the hundreds digit.
    pub fn category(self) -> Category {
        match self.0 / 100 {
            1 => Category::Informational,
            2 => Category::Success,
            3 => Category::Redirection,
            4 => Category::ClientError,
            _ => Category::ServerError,
        }
    }

    pub(crate) fn parse_error_kind(self) -> Option<ParseError> {
        match self {
            Status::BAD_REQUEST => Some(ParseError::InvalidLine),
            Status::REQUEST_URI_TOO_LONG => Some(ParseError::InvalidUri),
            Status::HTTP_VERSION_NOT_SUPPORTED => Some(ParseError::InvalidLine),
            Status::LENGTH_REQUIRED => Some(ParseError::InvalidBody),
            _ if self.as_u16() == 431 => Some(ParseError::InvalidHeader),
            _ => None,
        }
    }

    /// Pair this status with a human-readable description, producing a
    /// throwable carrier: statuses double as both plain values and
    /// propagatable errors.
    pub fn describe(self, message: impl Into<Box<str>>) -> Error {
        Error::new(self).with_message(message)
    }

    /// Pair this status (expected to be a 3xx) with a `Location` value.
    pub fn redirect_to(self, location: impl Into<Box<str>>) -> Error {
        Error::new(self).with_location(location)
    }
}

impl Category {
    fn generic_reason(self) -> &'static str {
        match self {
            Category::Informational => "Informational",
            Category::Success => "Success",
            Category::Redirection => "Redirection",
            Category::ClientError => "Client Error",
            Category::ServerError => "Server Error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason())
    }
}

/// A thrown [`Status`]: a parse failure (or any other early-exit) carrying
/// an HTTP status, an optional human description for logs, and (for 3xx
/// redirects) a `Location`.
#[derive(Debug, Clone)]
pub struct Error {
    status: Status,
    message: Option<Box<str>>,
    location: Option<Box<str>>,
}

impl Error {
    /// A bare status with no supplementary description.
    pub fn new(status: Status) -> Error {
        Error {
            status,
            message: None,
            location: None,
        }
    }

    fn with_message(mut self, message: impl Into<Box<str>>) -> Error {
        self.message = Some(message.into());
        self
    }

    fn with_location(mut self, location: impl Into<Box<str>>) -> Error {
        self.location = Some(location.into());
        self
    }

    /// The status this error carries.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The supplementary log message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The `Location` value, set only for [`Status::MOVED_PERMANENTLY`]
    /// redirects raised by URI normalization.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(m) => write!(f, "{}: {}", self.status, m),
            None => fmt::Display::fmt(&self.status, f),
        }
    }
}

impl std::error::Error for Error {}

/// 400 Bad Request, with a description.
pub fn bad_request(message: impl Into<Box<str>>) -> Error {
    Status::BAD_REQUEST.describe(message)
}

/// 501 Not Implemented, with a description.
pub fn not_implemented(message: impl Into<Box<str>>) -> Error {
    Status::NOT_IMPLEMENTED.describe(message)
}

/// 411 Length Required, with a description.
pub fn length_required(message: impl Into<Box<str>>) -> Error {
    Status::LENGTH_REQUIRED.describe(message)
}

/// 414 URI Too Long, with a description.
pub fn request_uri_too_long(message: impl Into<Box<str>>) -> Error {
    Status::REQUEST_URI_TOO_LONG.describe(message)
}

/// 505 HTTP Version Not Supported, with a description.
pub fn http_version_not_supported(message: impl Into<Box<str>>) -> Error {
    Status::HTTP_VERSION_NOT_SUPPORTED.describe(message)
}

/// 301 Moved Permanently, redirecting to `location` (the normalized path).
pub fn moved_permanently(location: impl Into<Box<str>>) -> Error {
    Status::MOVED_PERMANENTLY.redirect_to(location)
}

/// 431: header block exceeded a configured limit. 431 has no declared
/// associated const above, so it is constructed via [`Status::from_u16`].
pub fn header_fields_too_large(message: impl Into<Box<str>>) -> Error {
    Status::from_u16(431)
        .expect("431 is in range")
        .describe(message)
}
