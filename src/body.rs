//! The message body: an append-only, then seekable, byte store.

use std::fmt;

use bytes::BytesMut;

use crate::header::{Coding, MediaType};
use crate::status;

/// A message body. During parsing, bytes are only ever appended
/// ([`Body::append`]); once the message completes the parser seeks it back
/// to the start so the consumer reads from byte 0.
#[derive(Debug, Default)]
pub struct Body {
    bytes: BytesMut,
    position: usize,
    mimetype: Option<MediaType>,
    content_encoding: Option<Vec<Coding>>,
    transfer_encoding: Option<Vec<Coding>>,
}

impl Body {
    /// An empty body with no metadata attached.
    pub fn new() -> Body {
        Body::default()
    }

    /// Append raw octets. The parser calls this once per length-framed read
    /// or once per chunk; the stored bytes are always the decoded payload
    /// bytes, never chunk framing.
    pub fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Number of bytes currently stored.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if no bytes have been appended.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Reset the read cursor to the start. The parser calls this once, on
    /// message completion.
    pub fn seek_to_start(&mut self) {
        self.position = 0;
    }

    /// The full stored payload, ignoring the read cursor.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Read up to `buf.len()` unread bytes, advancing the cursor, returning
    /// the number of bytes copied.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let remaining = &self.bytes[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        n
    }

    /// The parsed `Content-Type`, if the headers carried one.
    pub fn mimetype(&self) -> Option<&MediaType> {
        self.mimetype.as_ref()
    }

    pub(crate) fn set_mimetype(&mut self, mimetype: MediaType) {
        self.mimetype = Some(mimetype);
    }

    /// The parsed `Content-Encoding` codings, outermost-last.
    pub fn content_encoding(&self) -> Option<&[Coding]> {
        self.content_encoding.as_deref()
    }

    pub(crate) fn set_content_encoding(&mut self, codings: Vec<Coding>) {
        self.content_encoding = Some(codings);
    }

    /// The parsed `Transfer-Encoding` codings, outermost-last.
    pub fn transfer_encoding(&self) -> Option<&[Coding]> {
        self.transfer_encoding.as_deref()
    }

    pub(crate) fn set_transfer_encoding(&mut self, codings: Vec<Coding>) {
        self.transfer_encoding = Some(codings);
    }

    /// Serialize the stored payload onto `out` per `chunked`: length-framed
    /// bodies are appended raw; chunked bodies are wrapped as a single
    /// data chunk followed by the zero-size terminator chunk (trailers, if
    /// any, are composed separately by the caller between the terminator's
    /// size line and its closing line-end).
    pub fn compose(&self, out: &mut Vec<u8>, chunked: bool) {
        if !chunked {
            out.extend_from_slice(&self.bytes);
            return;
        }
        if !self.bytes.is_empty() {
            let mut size = itoa::Buffer::new();
            out.extend_from_slice(size.format(self.bytes.len()).as_bytes());
            out.extend_from_slice(b"\r\n");
            out.extend_from_slice(&self.bytes);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"0\r\n");
    }

    /// Resolve a [`Codec`] for this body's `Content-Encoding` via `registry`.
    /// Returns `501 Not Implemented` if an encoding is present but the
    /// registry has no codec for it.
    pub fn codec(&self, registry: &dyn CodecRegistry) -> Result<Option<Box<dyn Codec>>, status::Error> {
        let codings = match &self.content_encoding {
            Some(c) => c,
            None => return Ok(None),
        };
        let outermost = match codings.last() {
            Some(c) if *c != Coding::Identity => c,
            _ => return Ok(None),
        };
        match registry.resolve(outermost.as_str()) {
            Some(codec) => Ok(Some(codec)),
            None => Err(status::not_implemented(format!(
                "no codec registered for content-encoding {:?}",
                outermost
            ))),
        }
    }
}

/// A reversible content transformation (e.g. gzip, deflate), resolved by
/// name from a [`CodecRegistry`].
pub trait Codec: fmt::Debug {
    /// Decode `input` (as received on the wire) to the underlying payload.
    fn decode(&self, input: &[u8]) -> Result<Vec<u8>, status::Error>;
    /// Encode `input` for the wire.
    fn encode(&self, input: &[u8]) -> Result<Vec<u8>, status::Error>;
}

/// The external collaborator that resolves a coding name (`"gzip"`,
/// `"deflate"`, ...) to a [`Codec`] implementation. The body model itself
/// ships no codecs; [`EmptyCodecRegistry`] is the default, which resolves
/// nothing.
pub trait CodecRegistry {
    /// Look up the codec registered for `name`, if any.
    fn resolve(&self, name: &str) -> Option<Box<dyn Codec>>;
}

/// A [`CodecRegistry`] that never resolves anything; every content coding
/// becomes `501 Not Implemented`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCodecRegistry;

impl CodecRegistry for EmptyCodecRegistry {
    fn resolve(&self, _name: &str) -> Option<Box<dyn Codec>> {
        None
    }
}
