//! `Request` and `Response`: a start-line plus headers, body, and optional
//! trailers, tying together the other component types.

use crate::body::Body;
use crate::header::HeaderMap;
use crate::method::Method;
use crate::status::Status;
use crate::uri::Uri;
use crate::version::Version;

/// A parsed or to-be-composed HTTP request.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
    pub protocol: Version,
    pub headers: HeaderMap,
    pub body: Body,
    pub trailers: Option<HeaderMap>,
}

impl Request {
    /// A request with empty headers/body and no trailers.
    pub fn new(method: Method, uri: Uri, protocol: Version) -> Request {
        Request {
            method,
            uri,
            protocol,
            headers: HeaderMap::new(),
            body: Body::new(),
            trailers: None,
        }
    }

    /// `true` if [`Transfer-Encoding: chunked`](crate::header::Coding::Chunked)
    /// is the outermost coding in the `Transfer-Encoding` header.
    pub fn is_chunked(&self) -> bool {
        is_chunked(&self.headers)
    }

    /// Serialize the request line, headers, body, and (if chunked)
    /// trailers onto `out`.
    pub fn compose(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.method.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.uri.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.protocol.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        compose_headers_and_body(&self.headers, &self.body, &self.trailers, out);
    }
}

/// A parsed or to-be-composed HTTP response.
#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub protocol: Version,
    pub headers: HeaderMap,
    pub body: Body,
    pub trailers: Option<HeaderMap>,
}

impl Response {
    /// A response with empty headers/body and no trailers.
    pub fn new(status: Status, protocol: Version) -> Response {
        Response {
            status,
            protocol,
            headers: HeaderMap::new(),
            body: Body::new(),
            trailers: None,
        }
    }

    /// `true` if `Transfer-Encoding: chunked` is the outermost coding.
    pub fn is_chunked(&self) -> bool {
        is_chunked(&self.headers)
    }

    /// Serialize the status line, headers, body, and (if chunked)
    /// trailers onto `out`.
    pub fn compose(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.protocol.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.status.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");
        compose_headers_and_body(&self.headers, &self.body, &self.trailers, out);
    }
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .values("Transfer-Encoding")
        .last()
        .map(|v| v.rsplit(',').next().unwrap_or("").trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}

pub(crate) fn compose_headers_and_body(
    headers: &HeaderMap,
    body: &Body,
    trailers: &Option<HeaderMap>,
    out: &mut Vec<u8>,
) {
    let chunked = is_chunked(headers);
    let mut header_block = String::new();
    headers.compose(&mut header_block);
    out.extend_from_slice(header_block.as_bytes());
    out.extend_from_slice(b"\r\n");
    body.compose(out, chunked);
    if chunked {
        if let Some(trailers) = trailers {
            let mut trailer_block = String::new();
            trailers.compose(&mut trailer_block);
            out.extend_from_slice(trailer_block.as_bytes());
        }
        out.extend_from_slice(b"\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Name;

    #[test]
    fn composes_simple_get() {
        let mut req = Request::new(Method::GET, Uri::parse("/").unwrap(), Version::HTTP_11);
        req.headers.append(Name::new("Host").unwrap(), "x");
        let mut out = Vec::new();
        req.compose(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "GET / HTTP/1.1\r\nHost: x\r\n\r\n"
        );
    }

    #[test]
    fn composes_chunked_body_as_single_chunk() {
        let mut resp = Response::new(Status::OK, Version::HTTP_11);
        resp.headers
            .append(Name::new("Transfer-Encoding").unwrap(), "chunked");
        resp.body.append(b"hello");
        let mut out = Vec::new();
        resp.compose(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("5\r\nhello\r\n0\r\n\r\n"));
    }

    #[test]
    fn composes_length_framed_body_raw() {
        let mut resp = Response::new(Status::OK, Version::HTTP_11);
        resp.headers
            .append(Name::new("Content-Length").unwrap(), "5");
        resp.body.append(b"hello");
        let mut out = Vec::new();
        resp.compose(&mut out);
        assert!(String::from_utf8(out).unwrap().ends_with("\r\n\r\nhello"));
    }
}
