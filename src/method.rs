//! The request method: a validated token with `safe`/`idempotent` predicates.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Maximum length of a method token: `[A-Z0-9$\-_.]{1,20}`.
const MAX_LEN: usize = 20;

/// An HTTP method.
///
/// Parsing is case-insensitive; the token is upper-cased on storage so that
/// `Method::from_str("get")? == Method::GET`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(Repr);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Repr {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
    Extension(Box<str>),
}

macro_rules! well_known {
    ($($konst:ident, $repr:ident, $bytes:expr;)+) => {
        impl Method {
            $(
                #[doc = concat!("The `", stringify!($bytes), "` method.")]
                pub const $konst: Method = Method(Repr::$repr);
            )+
        }

        fn well_known(upper: &str) -> Option<Repr> {
            match upper.as_bytes() {
                $($bytes => Some(Repr::$repr),)+
                _ => None,
            }
        }
    };
}

well_known! {
    GET, Get, b"GET";
    HEAD, Head, b"HEAD";
    POST, Post, b"POST";
    PUT, Put, b"PUT";
    DELETE, Delete, b"DELETE";
    CONNECT, Connect, b"CONNECT";
    OPTIONS, Options, b"OPTIONS";
    TRACE, Trace, b"TRACE";
    PATCH, Patch, b"PATCH";
}

impl Method {
    /// The token as it should be written on the wire (upper-cased).
    pub fn as_str(&self) -> &str {
        match &self.0 {
            Repr::Get => "GET",
            Repr::Head => "HEAD",
            Repr::Post => "POST",
            Repr::Put => "PUT",
            Repr::Delete => "DELETE",
            Repr::Connect => "CONNECT",
            Repr::Options => "OPTIONS",
            Repr::Trace => "TRACE",
            Repr::Patch => "PATCH",
            Repr::Extension(s) => s,
        }
    }

    /// `true` for `GET` and `HEAD`: methods that must not carry a request
    /// body and must not have side effects.
    pub fn is_safe(&self) -> bool {
        matches!(self.0, Repr::Get | Repr::Head)
    }

    /// `true` for `GET`, `HEAD`, `PUT`, `DELETE`, `OPTIONS`, `TRACE`: methods
    /// whose repetition yields the same server state.
    pub fn is_idempotent(&self) -> bool {
        matches!(
            self.0,
            Repr::Get | Repr::Head | Repr::Put | Repr::Delete | Repr::Options | Repr::Trace
        )
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Method, ParseError> {
        if s.is_empty() || s.len() > MAX_LEN || !s.bytes().all(is_method_char) {
            return Err(ParseError::InvalidLine);
        }

        // Fast path: already upper-case and well-known, skip the allocation.
        if let Some(repr) = well_known(s) {
            return Ok(Method(repr));
        }
        let upper = s.to_ascii_uppercase();
        match well_known(&upper) {
            Some(repr) => Ok(Method(repr)),
            None => Ok(Method(Repr::Extension(upper.into_boxed_str()))),
        }
    }
}

fn is_method_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'$' | b'-' | b'_' | b'.')
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::GET);
        assert_eq!("GeT".parse::<Method>().unwrap(), Method::GET);
    }

    #[test]
    fn extension_methods_upper_cased() {
        let m: Method = "propfind".parse().unwrap();
        assert_eq!(m.as_str(), "PROPFIND");
    }

    #[test]
    fn rejects_empty_and_overlong_and_illegal_chars() {
        assert!("".parse::<Method>().is_err());
        assert!("A".repeat(21).parse::<Method>().is_err());
        assert!("GE T".parse::<Method>().is_err());
    }

    #[test]
    fn safe_and_idempotent_flags() {
        assert!(Method::GET.is_safe());
        assert!(Method::HEAD.is_safe());
        assert!(!Method::POST.is_safe());

        for m in [Method::GET, Method::HEAD, Method::PUT, Method::DELETE, Method::OPTIONS, Method::TRACE] {
            assert!(m.is_idempotent());
        }
        assert!(!Method::POST.is_idempotent());
        assert!(!Method::CONNECT.is_idempotent());
    }
}
