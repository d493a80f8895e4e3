//! A thin `tokio`-based orchestrator that writes a [`Request`] and reads
//! back the matching [`Response`] by driving [`proto::h1::Parser`] over a
//! real socket.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::proto::h1::Parser;
use crate::{Error, Request, Response, Result};

const INIT_BUFFER_SIZE: usize = 8192;

/// One outbound connection: a socket plus the read buffer needed to parse
/// one response at a time off it.
pub struct Connection<IO> {
    io: IO,
    read_buf: Vec<u8>,
}

impl<IO> Connection<IO>
where
    IO: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a connected socket.
    pub fn new(io: IO) -> Connection<IO> {
        Connection {
            io,
            read_buf: Vec::with_capacity(INIT_BUFFER_SIZE),
        }
    }

    /// Serialize and send `request`, then read and parse the response.
    pub async fn send(&mut self, request: &Request) -> Result<Response> {
        trace!(method = request.method.as_str(), "sending request");
        let mut out = Vec::new();
        request.compose(&mut out);
        self.io.write_all(&out).await?;
        self.io.flush().await?;

        let mut parser = Parser::new_client();

        if !self.read_buf.is_empty() {
            let residual = std::mem::take(&mut self.read_buf);
            self.feed(&mut parser, &residual)?;
            if parser.on_message() {
                return Self::finish_response(parser);
            }
        }

        let mut chunk = [0u8; INIT_BUFFER_SIZE];
        loop {
            let n = self.io.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::from(crate::status::bad_request(
                    "connection closed before a complete response was received",
                )));
            }
            self.feed(&mut parser, &chunk[..n])?;
            if parser.on_message() {
                return Self::finish_response(parser);
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

    fn finish_response(parser: Parser) -> Result<Response> {
        if let Some(err) = parser.error().cloned() {
            debug!(status = err.status().as_u16(), "response parse failed: {}", err);
            return Err(Error::from(err));
        }
        parser
            .into_response()
            .ok_or_else(|| Error::from(crate::status::bad_request("no response was parsed")))
    }
}
