//! The LinkTargetIDList structure specifies the target of the link as a
//! sequence of opaque shell namespace item identifiers. The presence of
//! this optional structure is specified by the `HasLinkTargetIDList` bit
//! in the header.

use std::fmt;

use byteorder::{WriteBytesExt, LE};
use getset::Getters;
use log::warn;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bytes;
use crate::{Error, Result};

/// One item of the ID list. The payload bytes are defined by the shell
/// data source that produced them and are opaque to this crate.
#[derive(Clone, Default, PartialEq, Eq, Getters)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ItemId {
    /// The shell data source-defined bytes identifying the item.
    #[getset(get = "pub")]
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    data: Vec<u8>,
}

impl ItemId {
    /// Wrap an opaque payload.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Size as recorded on the wire: the payload plus the two size bytes.
    fn wire_size(&self) -> usize {
        self.data.len() + 2
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({} bytes)", self.data.len())
    }
}

impl From<Vec<u8>> for ItemId {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

/// The ordered list of [`ItemId`]s naming the link target. The 2-byte
/// terminator on the wire is a structural marker, not an item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Getters)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LinkTargetIdList {
    /// The item identifiers, outermost first.
    #[getset(get = "pub")]
    items: Vec<ItemId>,
}

impl LinkTargetIdList {
    /// Build a list from items.
    pub fn new(items: Vec<ItemId>) -> Self {
        Self { items }
    }

    /// Append an item.
    pub fn push(&mut self, item: ItemId) {
        self.items.push(item);
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse the list at `offset`. Returns the list and the bytes the
    /// structure covers, so the caller can continue after it.
    pub(crate) fn parse(data: &[u8], offset: usize) -> Result<(Self, usize)> {
        let declared = bytes::read_u16_le(data, offset)? as usize;
        let mut pos = offset + 2;
        let mut items = Vec::new();
        loop {
            let item_size = bytes::read_u16_le(data, pos)? as usize;
            if item_size == 0 {
                pos += 2;
                break;
            }
            if item_size < 2 {
                return Err(Error::BadItemSize {
                    offset: pos,
                    size: item_size as u16,
                });
            }
            // the item and the closing terminator have to fit the declared span
            if declared != 0 && pos + item_size + 2 > offset + declared {
                return Err(Error::InconsistentOffset {
                    offset: pos,
                    value: item_size as u32,
                });
            }
            let payload = bytes::take(data, pos + 2, item_size - 2)?;
            items.push(ItemId::new(payload.to_vec()));
            pos += item_size;
        }

        let consumed = pos - offset;
        if declared != 0 && consumed != declared {
            warn!("ID list declares {declared} bytes but the item walk covered {consumed}");
        }
        Ok((Self { items }, consumed))
    }

    /// Append the serialized list to `out`.
    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let total = 2 + self.items.iter().map(ItemId::wire_size).sum::<usize>() + 2;
        let declared: u16 = total
            .try_into()
            .map_err(|_| Error::TooLarge { what: "LinkTargetIDList" })?;
        out.write_u16::<LE>(declared).unwrap();
        for item in &self.items {
            out.write_u16::<LE>(item.wire_size() as u16).unwrap();
            out.extend_from_slice(&item.data);
        }
        out.write_u16::<LE>(0).unwrap();
        Ok(())
    }
}

impl From<Vec<ItemId>> for LinkTargetIdList {
    fn from(items: Vec<ItemId>) -> Self {
        Self::new(items)
    }
}
