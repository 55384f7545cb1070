// SPDX-License-Identifier: PMPL-1.0-or-later
//! Order-preserving document keys.
//!
//! A document key is the pair `(collection, id)`, written as two escaped,
//! terminated components:
//!
//! - `0x00` → `0x01 0x01`
//! - `0x01` → `0x01 0x02`
//! - every other byte unchanged
//! - each component ends with `0x00`
//!
//! `0x00` is the lowest byte and never appears inside an escaped component,
//! so byte order of encoded keys equals `(collection, id)` tuple order and the
//! encoded collection name alone is a prefix of exactly that collection's keys.

use thiserror::Error;

const TERMINATOR_BYTE: u8 = 0x00;
const ESCAPE_BYTE: u8 = 0x01;

/// Reasons a byte string is not a valid document key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("truncated escape sequence at byte {0}")]
    TruncatedEscape(usize),

    #[error("invalid escape sequence 0x01 0x{byte:02x} at byte {offset}")]
    InvalidEscape { offset: usize, byte: u8 },

    #[error("unterminated key component")]
    Unterminated,

    #[error("{0} trailing bytes after id component")]
    TrailingBytes(usize),

    #[error("key component is not valid UTF-8")]
    InvalidUtf8,
}

/// Encodes and decodes `(collection, id)` keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyCodec;

impl KeyCodec {
    /// Encode the storage key for document `id` in `collection`.
    pub fn encode(collection: &str, id: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(collection.len() + id.len() + 2);
        write_component(collection.as_bytes(), &mut buf);
        write_component(id.as_bytes(), &mut buf);
        buf
    }

    /// The byte prefix shared by every key of `collection`, and by no key of
    /// any other collection.
    pub fn prefix(collection: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(collection.len() + 1);
        write_component(collection.as_bytes(), &mut buf);
        buf
    }

    /// Decode a key produced by [`KeyCodec::encode`] back into
    /// `(collection, id)`.
    pub fn decode(key: &[u8]) -> Result<(String, String), KeyError> {
        let mut rest = key;
        let collection = read_component(&mut rest, 0)?;
        let offset = key.len() - rest.len();
        let id = read_component(&mut rest, offset)?;
        if !rest.is_empty() {
            return Err(KeyError::TrailingBytes(rest.len()));
        }
        Ok((collection, id))
    }

    /// Decode only the collection component of a key.
    pub fn collection_of(key: &[u8]) -> Result<String, KeyError> {
        let mut rest = key;
        read_component(&mut rest, 0)
    }
}

fn write_component(data: &[u8], buf: &mut Vec<u8>) {
    for &byte in data {
        match byte {
            TERMINATOR_BYTE => buf.extend_from_slice(&[ESCAPE_BYTE, 0x01]),
            ESCAPE_BYTE => buf.extend_from_slice(&[ESCAPE_BYTE, 0x02]),
            _ => buf.push(byte),
        }
    }
    buf.push(TERMINATOR_BYTE);
}

/// Read one component, advancing `buf` past its terminator. `offset` is the
/// position of `buf` within the whole key, for error reporting.
fn read_component(buf: &mut &[u8], offset: usize) -> Result<String, KeyError> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < buf.len() {
        match buf[i] {
            TERMINATOR_BYTE => {
                *buf = &buf[i + 1..];
                return String::from_utf8(out).map_err(|_| KeyError::InvalidUtf8);
            }
            ESCAPE_BYTE => {
                let next = *buf
                    .get(i + 1)
                    .ok_or(KeyError::TruncatedEscape(offset + i))?;
                match next {
                    0x01 => out.push(TERMINATOR_BYTE),
                    0x02 => out.push(ESCAPE_BYTE),
                    byte => {
                        return Err(KeyError::InvalidEscape {
                            offset: offset + i,
                            byte,
                        })
                    }
                }
                i += 2;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    Err(KeyError::Unterminated)
}
