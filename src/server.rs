//! A thin `tokio`-based orchestrator that drives [`proto::h1::Parser`] over
//! a real socket. This is the only component that performs I/O.

use std::time::SystemTime;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::header::{name, Name};
use crate::proto::h1::Parser;
use crate::{Error, Request, Response, Result};

const INIT_BUFFER_SIZE: usize = 8192;

/// Sent in a default `Server` header when the caller's response doesn't
/// already carry one.
const SERVER_IDENT: &str = concat!("mercury/", env!("CARGO_PKG_VERSION"));

/// One accepted connection: a socket plus the read buffer and parser state
/// needed to pull requests off it one at a time.
pub struct Connection<IO> {
    io: IO,
    read_buf: Vec<u8>,
}

impl<IO> Connection<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an accepted socket.
    pub fn new(io: IO) -> Connection<IO> {
        Connection {
            io,
            read_buf: Vec::with_capacity(INIT_BUFFER_SIZE),
        }
    }

    /// Read and parse the next request off the socket.
    ///
    /// `Ok(None)` means the peer closed the connection before sending any
    /// bytes of a new request (the ordinary end of a keep-alive loop).
    /// Pipelined bytes left over from the previous call are fed to a fresh
    /// [`Parser`] before any new bytes are read from the socket.
    pub async fn read_request(&mut self) -> Result<Option<Request>> {
        trace!("reading next request");
        let mut parser = Parser::new_server();

        if !self.read_buf.is_empty() {
            let residual = std::mem::take(&mut self.read_buf);
            self.feed(&mut parser, &residual)?;
            if parser.on_message() {
                return self.finish_request(parser);
            }
        }

        let mut chunk = [0u8; INIT_BUFFER_SIZE];
        loop {
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                if parser.on_message() {
                    return self.finish_request(parser);
                }
                trace!("peer closed connection mid-message");
                return Ok(None);
            }
            self.feed(&mut parser, &chunk[..n])?;
            if parser.on_message() {
                return self.finish_request(parser);
            }
        }
    }

    fn feed(&mut self, parser: &mut Parser, bytes: &[u8]) -> Result<()> {
        match parser.feed(bytes) {
            crate::proto::h1::Progress::NeedMore => Ok(()),
            crate::proto::h1::Progress::Done { residual } => {
                debug_assert!(self.read_buf.is_empty());
                self.read_buf = residual;
                Ok(())
            }
        }
    }

    fn finish_request(&mut self, parser: Parser) -> Result<Option<Request>> {
        if let Some(err) = parser.error().cloned() {
            debug!(status = err.status().as_u16(), "request parse failed: {}", err);
            return Err(Error::from(err));
        }
        Ok(parser.into_request())
    }

    /// Serialize and write `response` to the socket, filling in `Date`,
    /// `Server`, and a body-framing header (`Content-Length`, since this
    /// crate always hands over a fully materialized body) for whichever of
    /// those the caller left unset.
    pub async fn write_response(&mut self, response: &Response) -> Result<()> {
        trace!(status = response.status.as_u16(), "writing response");
        let mut out = Vec::new();
        out.extend_from_slice(response.protocol.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(response.status.to_string().as_bytes());
        out.extend_from_slice(b"\r\n");

        let headers = with_default_headers(response);
        crate::message::compose_headers_and_body(&headers, &response.body, &response.trailers, &mut out);

        self.io.write_all(&out).await?;
        self.io.flush().await?;
        Ok(())
    }
}

fn with_default_headers(response: &Response) -> crate::header::HeaderMap {
    let mut headers = response.headers.clone();
    if !headers.contains(name::DATE) {
        headers.append(
            Name::new(name::DATE).expect("well-known name is a valid token"),
            crate::date::compose(SystemTime::now()),
        );
    }
    if !headers.contains(name::SERVER) {
        headers.append(
            Name::new(name::SERVER).expect("well-known name is a valid token"),
            SERVER_IDENT,
        );
    }
    if !response.is_chunked() && !headers.contains(name::CONTENT_LENGTH) {
        let mut buf = itoa::Buffer::new();
        headers.append(
            Name::new(name::CONTENT_LENGTH).expect("well-known name is a valid token"),
            buf.format(response.body.len()),
        );
    }
    headers
}
