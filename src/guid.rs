use std::fmt;

use uuid::{Builder, Uuid};

/// A COM class identifier, stored the way it crosses the wire: 16 bytes in
/// the mixed little-endian GUID layout.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct Guid(Uuid);

impl Guid {
    /// Wrap the 16 bytes of a serialized GUID.
    pub const fn from_wire_bytes(bytes: [u8; 16]) -> Self {
        Self(Builder::from_bytes_le(bytes).into_uuid())
    }

    /// The 16 bytes of this GUID as they are serialized.
    pub const fn to_wire_bytes(self) -> [u8; 16] {
        self.0.to_bytes_le()
    }
}

impl From<Uuid> for Guid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Guid> for Uuid {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Guid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_bytes_round_trip() {
        let bytes = [
            0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x46,
        ];
        let guid = Guid::from_wire_bytes(bytes);
        assert_eq!(guid.to_wire_bytes(), bytes);
        assert_eq!(guid.to_string(), "00021401-0000-0000-c000-000000000046");
    }
}
