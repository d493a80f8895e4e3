//! Canonicalized, case-insensitive header names.

use std::fmt;

use crate::error::ParseError;

/// A header field name, stored title-cased (`content-type` → `Content-Type`)
/// so that equality and hashing are case-insensitive by construction.
///
/// Canonicalization is a title-case pass: each run of letters immediately
/// following a non-letter is capitalized, everything else lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Box<str>);

impl Name {
    /// Validate `s` as an RFC 7230 `token` and canonicalize its case.
    pub fn new(s: &str) -> Result<Name, ParseError> {
        if s.is_empty() || !s.bytes().all(is_tchar) {
            return Err(ParseError::InvalidHeader);
        }
        Ok(Name(title_case(s).into_boxed_str()))
    }

    /// The canonical (title-cased) form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> PartialEq<&'a str> for Name {
    fn eq(&self, other: &&'a str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for b in s.bytes() {
        if b.is_ascii_alphabetic() {
            if prev_alpha {
                out.push(b.to_ascii_lowercase() as char);
            } else {
                out.push(b.to_ascii_uppercase() as char);
            }
            prev_alpha = true;
        } else {
            out.push(b as char);
            prev_alpha = false;
        }
    }
    out
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

/// Common header names, predeclared so call sites don't re-validate and
/// re-allocate a `Name` for every comparison against a well-known header.
macro_rules! well_known_names {
    ($($konst:ident => $s:expr;)+) => {
        $(
            #[allow(non_upper_case_globals)]
            pub(crate) static $konst: &str = $s;
        )+
    };
}

well_known_names! {
    HOST => "Host";
    CONTENT_LENGTH => "Content-Length";
    CONTENT_TYPE => "Content-Type";
    CONTENT_ENCODING => "Content-Encoding";
    TRANSFER_ENCODING => "Transfer-Encoding";
    TRAILER => "Trailer";
    CONNECTION => "Connection";
    DATE => "Date";
    SERVER => "Server";
    ALLOW => "Allow";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_title_case() {
        assert_eq!(Name::new("content-type").unwrap().as_str(), "Content-Type");
        assert_eq!(Name::new("X-FOO-bar").unwrap().as_str(), "X-Foo-Bar");
        assert_eq!(Name::new("te").unwrap().as_str(), "Te");
    }

    #[test]
    fn equality_is_case_insensitive_via_canonicalization() {
        let a = Name::new("Host").unwrap();
        let b = Name::new("HOST").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_non_token_bytes() {
        assert!(Name::new("bad name").is_err());
        assert!(Name::new("").is_err());
        assert!(Name::new("bad:name").is_err());
    }
}
