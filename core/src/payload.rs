use std::fmt::{self, Debug};
use std::io::{ErrorKind as IoErrorKind, Read};

use bytes::{Bytes, BytesMut};
use sha2::{Digest, Sha256};

use crate::hash::hex_sha256;
use crate::{Error, Result};

const CHUNK_SIZE: usize = 8 * 1024;

/// Payload is a request body together with its hex encoded SHA256 digest.
///
/// The digest is always computed over the bytes held by the payload, and the
/// same bytes are the ones handed to the transport later, so the signature
/// can never cover a body that differs from the one actually sent.
///
/// A one-shot stream is consumed by [`Payload::from_reader`] exactly once:
/// every chunk is fed into the digest and buffered at the same time.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload {
    bytes: Bytes,
    hash: String,
}

impl Payload {
    /// An empty payload.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// Build a payload from bytes already held in memory.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let hash = hex_sha256(&bytes);
        Self { bytes, hash }
    }

    /// Drain a one-shot reader, hashing and buffering it in a single pass.
    pub fn from_reader(mut r: impl Read) -> Result<Self> {
        let mut hasher = Sha256::new();
        let mut buf = BytesMut::new();
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let n = match r.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == IoErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(Error::request_invalid("failed to read request body")
                        .with_source(anyhow::Error::from(err)))
                }
            };
            hasher.update(&chunk[..n]);
            buf.extend_from_slice(&chunk[..n]);
        }

        Ok(Self {
            bytes: buf.freeze(),
            hash: hex::encode(hasher.finalize()),
        })
    }

    /// Hex encoded lower-case SHA256 of the payload.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The buffered body.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Length of the body in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the body is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Take the body out to hand it to the transport.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("len", &self.bytes.len())
            .field("hash", &self.hash)
            .finish()
    }
}

impl From<Bytes> for Payload {
    fn from(value: Bytes) -> Self {
        Self::from_bytes(value)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(value: Vec<u8>) -> Self {
        Self::from_bytes(value)
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::from_bytes(value)
    }
}

impl From<&'static str> for Payload {
    fn from(value: &'static str) -> Self {
        Self::from_bytes(Bytes::from_static(value.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::EMPTY_STRING_SHA256;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    /// A reader that refuses to be read twice.
    struct OneShot {
        inner: Cursor<Vec<u8>>,
        drained: bool,
    }

    impl Read for OneShot {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.drained {
                return Err(std::io::Error::other("stream already drained"));
            }
            let n = self.inner.read(buf)?;
            if n == 0 {
                self.drained = true;
            }
            Ok(n)
        }
    }

    #[test]
    fn test_empty_payload_hash() {
        assert_eq!(Payload::empty().hash(), EMPTY_STRING_SHA256);
        assert_eq!(Payload::from("").hash(), EMPTY_STRING_SHA256);
        assert_eq!(
            Payload::from_reader(std::io::empty()).unwrap().hash(),
            EMPTY_STRING_SHA256
        );
    }

    #[test]
    fn test_reader_is_buffered_exactly() {
        // Larger than a single chunk to exercise the loop.
        let body: Vec<u8> = (0..CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        let reader = OneShot {
            inner: Cursor::new(body.clone()),
            drained: false,
        };

        let payload = Payload::from_reader(reader).expect("read must succeed");

        assert_eq!(payload.len(), body.len());
        assert_eq!(payload.bytes().as_ref(), body.as_slice());
        assert_eq!(payload.hash(), hex_sha256(&body));
        assert_eq!(payload, Payload::from(body));
    }

    #[test]
    fn test_drained_reader_is_an_error() {
        let mut reader = OneShot {
            inner: Cursor::new(b"{}".to_vec()),
            drained: false,
        };
        let first = Payload::from_reader(&mut reader).expect("first read must succeed");
        assert_eq!(first.bytes().as_ref(), b"{}");

        let err = Payload::from_reader(&mut reader).expect_err("second read must fail");
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_debug_does_not_print_body() {
        let payload = Payload::from("secret body");
        let s = format!("{payload:?}");
        assert!(!s.contains("secret body"));
        assert!(s.contains(payload.hash()));
    }
}
