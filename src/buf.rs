//! The growable byte buffer the state machine accumulates unconsumed input
//! into between `feed()` calls.

use bytes::{Buf, BytesMut};

/// An append-only buffer with a `find`-and-split-off read pattern, the
/// shape every phase in [`crate::proto::h1`] needs: "is my terminator in
/// here yet, and if so, give me everything up to it."
#[derive(Debug, Default)]
pub struct PeekBuf {
    inner: BytesMut,
}

impl PeekBuf {
    /// An empty buffer.
    pub fn new() -> PeekBuf {
        PeekBuf::default()
    }

    /// Append `bytes` to the end of the buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.inner.extend_from_slice(bytes);
    }

    /// Number of unconsumed bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` if no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `true` if the buffer starts with `needle`.
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.inner.starts_with(needle)
    }

    /// The position of the first occurrence of `needle`, if present.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || self.inner.len() < needle.len() {
            return None;
        }
        self.inner.windows(needle.len()).position(|w| w == needle)
    }

    /// If `needle` is found, remove and return everything up to (not
    /// including) it, then also advance past `needle` itself.
    pub fn split_before(&mut self, needle: &[u8]) -> Option<BytesMut> {
        let pos = self.find(needle)?;
        let prefix = self.inner.split_to(pos);
        self.inner.advance(needle.len());
        Some(prefix)
    }

    /// Remove and return the first `n` bytes. Panics if fewer than `n`
    /// bytes are buffered; callers must check [`PeekBuf::len`] first.
    pub fn split_to(&mut self, n: usize) -> BytesMut {
        self.inner.split_to(n)
    }

    /// Borrow the unconsumed bytes without removing them.
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    /// Discard all buffered bytes.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_and_split_before() {
        let mut buf = PeekBuf::new();
        buf.extend(b"GET / HTTP/1.1\r\nHost: x\r\n\r\nrest");
        let line = buf.split_before(b"\r\n").unwrap();
        assert_eq!(&line[..], b"GET / HTTP/1.1");
        assert!(buf.starts_with(b"Host"));
    }

    #[test]
    fn find_returns_none_when_absent() {
        let mut buf = PeekBuf::new();
        buf.extend(b"no terminator here");
        assert_eq!(buf.find(b"\r\n"), None);
    }

    #[test]
    fn split_to_consumes_prefix() {
        let mut buf = PeekBuf::new();
        buf.extend(b"hello world");
        let chunk = buf.split_to(5);
        assert_eq!(&chunk[..], b"hello");
        assert_eq!(buf.as_slice(), b" world");
    }
}
