//! The EXTRA_DATA region that trails the documented sections. This crate
//! treats it as an opaque span: it is preserved and written back verbatim,
//! never interpreted.

use byteorder::{ByteOrder, LE};

#[cfg(feature = "serde")]
use serde::Serialize;

/// The raw trailing bytes of a link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ExtraData {
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    data: Vec<u8>,
}

impl ExtraData {
    /// Wrap a trailing span.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// The span exactly as it appeared after the documented sections.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether the span is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Walk the `u32`-size-prefixed blocks of the span without
    /// interpreting them, each yielded with its size and signature still
    /// in place. A tail that is not block-shaped (including the usual
    /// 4-byte terminal marker) comes out as one final chunk.
    pub fn blocks(&self) -> impl Iterator<Item = &[u8]> {
        let data = &self.data;
        let mut pos = 0usize;
        std::iter::from_fn(move || {
            if pos >= data.len() {
                return None;
            }
            let rest = &data[pos..];
            if rest.len() < 4 {
                pos = data.len();
                return Some(rest);
            }
            let size = LE::read_u32(rest) as usize;
            if size < 4 || size > rest.len() {
                pos = data.len();
                return Some(rest);
            }
            pos += size;
            Some(&rest[..size])
        })
    }
}

impl From<Vec<u8>> for ExtraData {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
