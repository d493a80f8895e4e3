//! Request-target URI: parse, RFC 3986 §5.2.4 normalization, re-serialize.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::ParseError;

/// Characters that must be percent-encoded in a path segment once
/// normalization has unreserved-decoded everything it can.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'[')
    .add(b']')
    .add(b'{')
    .add(b'}');

/// A parsed request-target, in either absolute (`http://host/path`) or
/// origin (`/path?query`) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    pub scheme: Option<Box<str>>,
    pub userinfo: Option<Box<str>>,
    pub host: Option<Box<str>>,
    pub port: Option<u16>,
    pub path: Box<str>,
    pub query: Option<Box<str>>,
    pub fragment: Option<Box<str>>,
}

impl Uri {
    /// Parse a request-target. Accepts the asterisk form (`*`, used only by
    /// `OPTIONS`) as a bare `path` of `"*"` with no other component set.
    pub fn parse(s: &str) -> Result<Uri, ParseError> {
        if s.is_empty() {
            return Err(ParseError::InvalidUri);
        }
        if s == "*" {
            return Ok(Uri {
                scheme: None,
                userinfo: None,
                host: None,
                port: None,
                path: "*".into(),
                query: None,
                fragment: None,
            });
        }

        let (authority_part, rest) = if let Some(after_scheme) = s
            .find("://")
            .map(|i| (&s[..i], &s[i + 3..]))
        {
            let (scheme, rest) = after_scheme;
            if scheme.is_empty() || !scheme.bytes().all(is_scheme_char) {
                return Err(ParseError::InvalidUri);
            }
            let end = rest
                .find(['/', '?', '#'])
                .unwrap_or(rest.len());
            (Some((Some(scheme), &rest[..end])), &rest[end..])
        } else {
            (None, s)
        };

        let (scheme, userinfo, host, port) = match authority_part {
            Some((scheme, authority)) => {
                let (userinfo, hostport) = match authority.rfind('@') {
                    Some(i) => (Some(&authority[..i]), &authority[i + 1..]),
                    None => (None, authority),
                };
                let (host, port) = split_host_port(hostport)?;
                (
                    scheme.map(|s| s.to_ascii_lowercase().into_boxed_str()),
                    userinfo.map(Into::into),
                    Some(host.to_ascii_lowercase().into_boxed_str()),
                    port,
                )
            }
            None => (None, None, None, None),
        };

        if let Some(h) = &host {
            if !h.is_ascii() {
                return Err(ParseError::InvalidUri);
            }
        }

        let (path_and_query, fragment) = match rest.split_once('#') {
            Some((pq, frag)) => (pq, Some(frag.into())),
            None => (rest, None),
        };
        let (path, query) = match path_and_query.split_once('?') {
            Some((p, q)) => (p, Some(q.into())),
            None => (path_and_query, None),
        };
        let path: Box<str> = if path.is_empty() && host.is_some() {
            "/".into()
        } else {
            path.into()
        };

        validate_percent_escapes(&path)?;

        Ok(Uri {
            scheme,
            userinfo,
            host,
            port,
            path,
            query,
            fragment,
        })
    }

    /// Normalize in place per RFC 3986 §5.2.4: percent-decode unreserved
    /// characters, lowercase scheme/host, drop the scheme's default port,
    /// remove `.`/`..` dot segments, collapse duplicate slashes, and
    /// re-encode remaining reserved characters. Idempotent: normalizing an
    /// already-normalized `Uri` is a no-op.
    pub fn normalize(&mut self) -> Result<(), ParseError> {
        if let Some(scheme) = &self.scheme {
            self.scheme = Some(scheme.to_ascii_lowercase().into_boxed_str());
        }
        if let Some(host) = &self.host {
            self.host = Some(host.to_ascii_lowercase().into_boxed_str());
        }
        if let (Some(scheme), Some(port)) = (&self.scheme, self.port) {
            if is_default_port(scheme, port) {
                self.port = None;
            }
        }

        let decoded = percent_decode_unreserved(&self.path)?;
        let deduped = collapse_slashes(&decoded);
        let resolved = remove_dot_segments(&deduped);
        self.path = utf8_percent_encode(&resolved, PATH_ENCODE_SET)
            .to_string()
            .into_boxed_str();
        Ok(())
    }

    /// `true` if `self` equals `normalize`d version of itself.
    pub fn is_normalized(&self) -> bool {
        let mut copy = self.clone();
        copy.normalize().is_ok() && copy == *self
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(scheme), Some(host)) = (&self.scheme, &self.host) {
            write!(f, "{}://", scheme)?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{}@", userinfo)?;
            }
            write!(f, "{}", host)?;
            if let Some(port) = self.port {
                write!(f, ":{}", port)?;
            }
        }
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

fn is_scheme_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.')
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}

fn split_host_port(hostport: &str) -> Result<(&str, Option<u16>), ParseError> {
    if let Some(bracket_end) = hostport.strip_prefix('[').and_then(|_| hostport.find(']')) {
        let host = &hostport[..=bracket_end];
        let rest = &hostport[bracket_end + 1..];
        return parse_optional_port(host, rest);
    }
    match hostport.rfind(':') {
        Some(i) => parse_optional_port(&hostport[..i], &hostport[i..]),
        None => Ok((hostport, None)),
    }
}

fn parse_optional_port<'a>(host: &'a str, rest: &str) -> Result<(&'a str, Option<u16>), ParseError> {
    if rest.is_empty() {
        return Ok((host, None));
    }
    let port_str = rest.strip_prefix(':').ok_or(ParseError::InvalidUri)?;
    if port_str.is_empty() {
        return Ok((host, None));
    }
    let port = port_str.parse().map_err(|_| ParseError::InvalidUri)?;
    Ok((host, Some(port)))
}

fn validate_percent_escapes(s: &str) -> Result<(), ParseError> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .ok_or(ParseError::InvalidUri)?;
            if !hex.iter().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseError::InvalidUri);
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Decode every `%XX` triplet that encodes an unreserved character, leaving
/// reserved/unsafe bytes percent-encoded.
fn percent_decode_unreserved(path: &str) -> Result<String, ParseError> {
    validate_percent_escapes(path)?;
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap();
            let decoded = u8::from_str_radix(hex, 16).unwrap();
            if is_unreserved(decoded) {
                out.push(decoded);
            } else {
                out.extend_from_slice(&bytes[i..i + 3]);
            }
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| ParseError::InvalidUri)
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    out
}

fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let absolute = path.starts_with('/');
    for segment in path.split('/') {
        match segment {
            "." => {}
            ".." => {
                if output.last().map(|s| *s != "").unwrap_or(false) {
                    output.pop();
                }
            }
            _ => output.push(segment),
        }
    }
    let mut result = output.join("/");
    if absolute && !result.starts_with('/') {
        result.insert(0, '/');
    }
    if result.is_empty() {
        result.push('/');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_form() {
        let u = Uri::parse("/where?q=now").unwrap();
        assert_eq!(&*u.path, "/where");
        assert_eq!(u.query.as_deref(), Some("q=now"));
        assert!(u.host.is_none());
    }

    #[test]
    fn parses_absolute_form() {
        let u = Uri::parse("http://Example.COM:80/a/b").unwrap();
        assert_eq!(u.host.as_deref(), Some("example.com"));
        assert_eq!(u.port, Some(80));
        assert_eq!(&*u.path, "/a/b");
    }

    #[test]
    fn parses_asterisk_form() {
        let u = Uri::parse("*").unwrap();
        assert_eq!(&*u.path, "*");
    }

    #[test]
    fn normalize_drops_default_port() {
        let mut u = Uri::parse("http://example.com:80/a").unwrap();
        u.normalize().unwrap();
        assert_eq!(u.port, None);
    }

    #[test]
    fn normalize_collapses_slashes_and_dot_segments() {
        let mut u = Uri::parse("/a//b/./c/../d").unwrap();
        u.normalize().unwrap();
        assert_eq!(&*u.path, "/a/b/d");
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut u = Uri::parse("/a//b/./../c%41").unwrap();
        u.normalize().unwrap();
        let once = u.clone();
        u.normalize().unwrap();
        assert_eq!(u, once);
    }

    #[test]
    fn rejects_malformed_percent_escape() {
        assert!(Uri::parse("/a%2").is_err());
        assert!(Uri::parse("/a%zz").is_err());
    }

    #[test]
    fn rejects_non_ascii_host() {
        assert!(Uri::parse("http://exämple.com/").is_err());
    }

    #[test]
    fn display_round_trips_absolute_form() {
        let u = Uri::parse("http://example.com/a?b=c#d").unwrap();
        assert_eq!(u.to_string(), "http://example.com/a?b=c#d");
    }
}
