//! Typed, lazily-parsed header elements.
//!
//! `HeaderMap` keeps every value as a raw string; [`HeaderMap::element`]
//! looks a name up in a small static registry (one parser function per
//! header, in the spirit of hyper's legacy `header/common/*.rs` — one type
//! per file — collapsed here to a single enum because this crate only
//! needs the handful of elements the state machine and `compose()` path
//! actually consult, not a full typed-header ergonomics layer).

use std::time::SystemTime;

use super::map::HeaderMap;
use super::name::{self, Name};
use crate::date;
use crate::error::ParseError;
use crate::method::Method;

/// A structured view of a header's value(s).
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// `Content-Length`.
    ContentLength(u64),
    /// `Content-Type`.
    ContentType(MediaType),
    /// `Content-Encoding`, outermost-last (application order).
    ContentEncoding(Vec<Coding>),
    /// `Transfer-Encoding`, outermost-last.
    TransferEncoding(Vec<Coding>),
    /// `Trailer`: the field names the sender promises to send as trailers.
    Trailer(Vec<Name>),
    /// `Connection`.
    Connection(Vec<ConnectionOption>),
    /// `Allow`.
    Allow(Vec<Method>),
    /// `Date` (and `Last-Modified`/`Expires`, which share the same grammar).
    Date(SystemTime),
}

/// A parsed `type/subtype; param=value` media type.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaType {
    /// e.g. `text`.
    pub ty: Box<str>,
    /// e.g. `plain`.
    pub subtype: Box<str>,
    /// e.g. `[("charset", "utf-8")]`.
    pub params: Vec<(Box<str>, Box<str>)>,
}

/// A transfer or content coding name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coding {
    /// Identity (no coding).
    Identity,
    /// `chunked`.
    Chunked,
    /// `gzip`.
    Gzip,
    /// `deflate`.
    Deflate,
    /// Any other registered or unregistered coding token.
    Other(Box<str>),
}

impl Coding {
    fn parse(token: &str) -> Coding {
        match token.to_ascii_lowercase().as_str() {
            "identity" => Coding::Identity,
            "chunked" => Coding::Chunked,
            "gzip" => Coding::Gzip,
            "deflate" => Coding::Deflate,
            other => Coding::Other(other.into()),
        }
    }

    /// The wire token for this coding.
    pub fn as_str(&self) -> &str {
        match self {
            Coding::Identity => "identity",
            Coding::Chunked => "chunked",
            Coding::Gzip => "gzip",
            Coding::Deflate => "deflate",
            Coding::Other(s) => s,
        }
    }
}

/// A `Connection` header option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOption {
    /// `keep-alive`.
    KeepAlive,
    /// `close`.
    Close,
    /// Any other token (commonly a hop-by-hop header name to strip).
    Other(Box<str>),
}

impl Element {
    /// Parse the element registered under `name` from its raw, in-order
    /// values. Returns `Ok(None)` for names with no registered parser
    /// (callers should fall back to the raw string).
    pub(crate) fn parse(name: &str, values: &[&str]) -> Result<Option<Element>, ParseError> {
        if values.is_empty() {
            return Ok(None);
        }
        // Single-valued elements take the last occurrence, matching how a
        // repeated Content-Length/Content-Type/Date is meant to be resolved;
        // list elements (coding lists, Trailer, Connection, Allow) instead
        // concatenate across every occurrence below.
        let last = values[values.len() - 1];
        let element = if name.eq_ignore_ascii_case(name::CONTENT_LENGTH) {
            let n = last
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::InvalidHeader)?;
            Element::ContentLength(n)
        } else if name.eq_ignore_ascii_case(name::CONTENT_TYPE) {
            Element::ContentType(parse_media_type(last)?)
        } else if name.eq_ignore_ascii_case(name::CONTENT_ENCODING) {
            Element::ContentEncoding(parse_coding_list(values))
        } else if name.eq_ignore_ascii_case(name::TRANSFER_ENCODING) {
            Element::TransferEncoding(parse_coding_list(values))
        } else if name.eq_ignore_ascii_case(name::TRAILER) {
            let mut names = Vec::new();
            for v in values {
                for token in v.split(',') {
                    let token = token.trim();
                    if !token.is_empty() {
                        names.push(Name::new(token)?);
                    }
                }
            }
            Element::Trailer(names)
        } else if name.eq_ignore_ascii_case(name::CONNECTION) {
            let mut opts = Vec::new();
            for v in values {
                for token in v.split(',') {
                    let token = token.trim();
                    if token.is_empty() {
                        continue;
                    }
                    opts.push(match token.to_ascii_lowercase().as_str() {
                        "keep-alive" => ConnectionOption::KeepAlive,
                        "close" => ConnectionOption::Close,
                        other => ConnectionOption::Other(other.into()),
                    });
                }
            }
            Element::Connection(opts)
        } else if name.eq_ignore_ascii_case(name::ALLOW) {
            let mut methods = Vec::new();
            for v in values {
                for token in v.split(',') {
                    let token = token.trim();
                    if !token.is_empty() {
                        methods.push(token.parse().map_err(|_| ParseError::InvalidHeader)?);
                    }
                }
            }
            Element::Allow(methods)
        } else if name.eq_ignore_ascii_case(name::DATE) {
            Element::Date(date::parse(last)?)
        } else {
            return Ok(None);
        };
        Ok(Some(element))
    }
}

fn parse_coding_list(values: &[&str]) -> Vec<Coding> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Coding::parse)
        .collect()
}

fn parse_media_type(s: &str) -> Result<MediaType, ParseError> {
    let mut parts = s.split(';');
    let full = parts.next().ok_or(ParseError::InvalidHeader)?.trim();
    let (ty, subtype) = full.split_once('/').ok_or(ParseError::InvalidHeader)?;
    if ty.is_empty() || subtype.is_empty() {
        return Err(ParseError::InvalidHeader);
    }
    let mut params = Vec::new();
    for p in parts {
        let p = p.trim();
        if p.is_empty() {
            continue;
        }
        let (k, v) = p.split_once('=').ok_or(ParseError::InvalidHeader)?;
        let v = v.trim().trim_matches('"');
        params.push((k.trim().to_ascii_lowercase().into_boxed_str(), v.into()));
    }
    Ok(MediaType {
        ty: ty.to_ascii_lowercase().into_boxed_str(),
        subtype: subtype.to_ascii_lowercase().into_boxed_str(),
        params,
    })
}

impl HeaderMap {
    /// Look up the typed element registered for `name`, parsing lazily from
    /// the raw stored values. `Ok(None)` means `name` has no registered
    /// element parser (or no stored value); callers fall back to raw
    /// string access via [`HeaderMap::get`].
    pub fn element(&self, name: &str) -> Result<Option<Element>, ParseError> {
        let values: Vec<&str> = self.values(name).collect();
        Element::parse(name, &values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut m = HeaderMap::new();
        for (k, v) in pairs {
            m.append(Name::new(k).unwrap(), *v);
        }
        m
    }

    #[test]
    fn content_length_element() {
        let m = map(&[("Content-Length", "42")]);
        assert_eq!(
            m.element("Content-Length").unwrap(),
            Some(Element::ContentLength(42))
        );
    }

    #[test]
    fn content_type_element_with_params() {
        let m = map(&[("Content-Type", "text/html; charset=utf-8")]);
        let el = m.element("Content-Type").unwrap().unwrap();
        match el {
            Element::ContentType(mt) => {
                assert_eq!(&*mt.ty, "text");
                assert_eq!(&*mt.subtype, "html");
                assert_eq!(mt.params, vec![("charset".into(), "utf-8".into())]);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn transfer_encoding_last_is_chunked() {
        let m = map(&[("Transfer-Encoding", "gzip, chunked")]);
        match m.element("Transfer-Encoding").unwrap().unwrap() {
            Element::TransferEncoding(codings) => {
                assert_eq!(codings.last(), Some(&Coding::Chunked));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn trailer_names_parsed() {
        let m = map(&[("Trailer", "X-Checksum, X-Signature")]);
        match m.element("Trailer").unwrap().unwrap() {
            Element::Trailer(names) => {
                assert_eq!(names.len(), 2);
                assert_eq!(names[0].as_str(), "X-Checksum");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn unregistered_name_is_none() {
        let m = map(&[("X-Custom", "whatever")]);
        assert_eq!(m.element("X-Custom").unwrap(), None);
    }

    #[test]
    fn malformed_content_type_is_invalid_header() {
        let m = map(&[("Content-Type", "text")]);
        assert!(m.element("Content-Type").is_err());
    }
}
