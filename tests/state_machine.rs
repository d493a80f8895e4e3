//! Scenario and property tests driving the parser the way a socket would:
//! arbitrary byte fragments in, a validated message (or a recorded status
//! error) out.

use mercury::method::Method;
use mercury::proto::h1::{Parser, Progress, Role};
use mercury::status::Status;
use mercury::version::Version;

fn feed_whole(parser: &mut Parser, bytes: &[u8]) -> Progress {
    parser.feed(bytes)
}

fn feed_byte_by_byte(parser: &mut Parser, bytes: &[u8]) {
    for b in bytes {
        parser.feed(&[*b]);
    }
}

#[test]
fn minimal_get_request() {
    let mut parser = Parser::new_server();
    feed_whole(&mut parser, b"GET /widgets HTTP/1.1\r\nHost: example.com\r\n\r\n");

    assert!(parser.on_message());
    assert!(parser.error().is_none());
    let req = parser.request().unwrap();
    assert_eq!(req.method, Method::GET);
    assert_eq!(&*req.uri.path, "/widgets");
    assert_eq!(req.protocol, Version::HTTP_11);
    assert_eq!(req.headers.get("Host"), Some("example.com"));
    assert_eq!(req.body.len(), 0);
}

#[test]
fn chunked_post_with_trailer() {
    let mut parser = Parser::new_server();
    feed_whole(
        &mut parser,
        b"POST /upload HTTP/1.1\r\n\
          Host: example.com\r\n\
          Transfer-Encoding: chunked\r\n\
          Trailer: X-Checksum\r\n\
          \r\n\
          4\r\nWiki\r\n5\r\npedia\r\n0\r\nX-Checksum: abc123\r\n\r\n",
    );

    assert!(parser.on_message());
    assert!(parser.error().is_none());
    let req = parser.request().unwrap();
    assert_eq!(req.body.as_slice(), b"Wikipedia");
    assert_eq!(req.headers.get("X-Checksum"), Some("abc123"));
}

#[test]
fn non_normalized_uri_is_redirected() {
    let mut parser = Parser::new_server();
    feed_whole(
        &mut parser,
        b"GET /a//b/../c HTTP/1.1\r\nHost: example.com\r\n\r\n",
    );

    assert!(parser.on_message());
    let err = parser.error().expect("redirect is recorded as an error");
    assert_eq!(err.status(), Status::MOVED_PERMANENTLY);
    assert_eq!(err.location(), Some("/a/c"));
}

#[test]
fn missing_host_on_http11_is_bad_request() {
    let mut parser = Parser::new_server();
    feed_whole(&mut parser, b"GET / HTTP/1.1\r\n\r\n");

    assert!(parser.on_message());
    assert_eq!(parser.error().unwrap().status(), Status::BAD_REQUEST);
}

#[test]
fn http10_request_does_not_require_host() {
    let mut parser = Parser::new_server();
    feed_whole(&mut parser, b"GET / HTTP/1.0\r\n\r\n");

    assert!(parser.on_message());
    assert!(parser.error().is_none());
}

#[test]
fn fragmented_feed_matches_whole_feed() {
    let input: &[u8] = b"POST /a HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\nabc";

    let mut whole = Parser::new_server();
    feed_whole(&mut whole, input);

    let mut fragmented = Parser::new_server();
    feed_byte_by_byte(&mut fragmented, input);

    assert_eq!(whole.on_message(), fragmented.on_message());
    assert_eq!(whole.error().is_none(), fragmented.error().is_none());
    assert_eq!(
        whole.request().unwrap().body.as_slice(),
        fragmented.request().unwrap().body.as_slice()
    );
}

#[test]
fn pipelined_bytes_are_returned_as_residual() {
    let mut parser = Parser::new_server();
    let first = b"GET /a HTTP/1.1\r\nHost: h\r\n\r\n";
    let second = b"GET /b HTTP/1.1\r\nHost: h\r\n\r\n";
    let mut both = first.to_vec();
    both.extend_from_slice(second);

    let progress = feed_whole(&mut parser, &both);
    // The first message completes, but pipelined bytes are policy-rejected
    // on this parser (no connection reuse inside one Parser); they still
    // come back so the caller can feed a fresh Parser with them.
    assert!(parser.on_message());
    match progress {
        Progress::Done { residual } => {
            let mut next = Parser::new_server();
            feed_whole(&mut next, &residual);
            assert!(next.on_message());
            assert!(next.error().is_none());
            assert_eq!(&*next.request().unwrap().uri.path, "/b");
        }
        Progress::NeedMore => panic!("expected Done"),
    }
}

#[test]
fn declared_content_length_mismatch_is_bad_request() {
    let mut parser = Parser::new_server();
    feed_whole(
        &mut parser,
        b"POST / HTTP/1.1\r\nHost: h\r\nContent-Length: 3\r\n\r\nhello",
    );
    assert!(parser.on_message());
    assert_eq!(parser.error().unwrap().status(), Status::BAD_REQUEST);
}

#[test]
fn unsupported_http_major_version_is_505() {
    let mut parser = Parser::new_server();
    feed_whole(&mut parser, b"GET / HTTP/2.0\r\nHost: h\r\n\r\n");
    assert!(parser.on_message());
    assert_eq!(
        parser.error().unwrap().status(),
        Status::HTTP_VERSION_NOT_SUPPORTED
    );
}

#[test]
fn bare_lf_line_ending_negotiated_from_first_newline() {
    let mut parser = Parser::new_server();
    feed_whole(&mut parser, b"GET / HTTP/1.1\nHost: h\n\n");
    assert!(parser.on_message());
    assert!(parser.error().is_none());
}

#[test]
fn client_role_parses_response() {
    let mut parser = Parser::new_client();
    feed_whole(
        &mut parser,
        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n",
    );
    assert!(parser.on_message());
    assert!(parser.error().is_none());
    assert_eq!(parser.response().unwrap().status, Status::NOT_FOUND);
}

#[test]
fn with_config_enforces_smaller_uri_limit() {
    let mut config = mercury::ParserConfig::default();
    config.max_uri_length = 8;
    let mut parser = Parser::with_config(Role::Server, config);
    feed_whole(
        &mut parser,
        b"GET /this/path/is/definitely/too/long/for/the/limit HTTP/1.1\r\n\r\n",
    );
    assert!(parser.on_message());
    assert_eq!(
        parser.error().unwrap().status(),
        Status::REQUEST_URI_TOO_LONG
    );
}
