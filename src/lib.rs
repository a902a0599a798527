#![warn(missing_docs)]

//! # Shell Link (.lnk) parser and writer.
//!
//! An in-memory codec for the Shell Link Binary File Format: hand
//! [`ShellLink::parse`] a byte buffer and get a structured model of the
//! shortcut; mutate it; get the canonical byte layout back from
//! [`ShellLink::serialize`]. Loading and storing those buffers is the
//! caller's business; this crate performs no I/O.
//!
//! The format is specified at
//! [MS-SHLLINK](https://docs.microsoft.com/en-us/openspecs/windows_protocols/ms-shllink/16cb4ca1-9339-4d0c-a68d-bf1d6cc0f943).
//!
//! ## Read example
//!
//! ```
//! use shlink::ShellLink;
//! # let buffer = shlink::ShellLink::default().serialize().unwrap();
//! let link = ShellLink::parse(&buffer).unwrap();
//! println!("{:?} -> {:?}", link.name(), link.relative_path());
//! ```
//!
//! ## Write example
//!
//! ```
//! use shlink::ShellLink;
//!
//! let mut link = ShellLink::default();
//! link.set_name(Some("Calculator".to_string()));
//! link.set_relative_path(Some(".\\calc.exe".to_string()));
//! let buffer = link.serialize().unwrap();
//! # assert_eq!(ShellLink::parse(&buffer).unwrap().name(), Some("Calculator"));
//! ```
//!
//! Anything serialized parses back to a structurally equal model, and a
//! buffer produced by [`ShellLink::serialize`] survives a parse/serialize
//! round trip byte for byte.

use log::{debug, warn};
use thiserror::Error as ThisError;

#[cfg(feature = "serde")]
use serde::Serialize;

pub mod bytes;

mod header;
pub use header::{
    FileAttributeFlags, HotkeyFlags, HotkeyKey, HotkeyModifiers, LinkFlags, ShellLinkHeader,
    ShowCommand, CLSID_SHELL_LINK, CLSID_SHELL_LINK_VARIANT, HEADER_LEN,
};

/// The LinkTargetIDList structure: the sequence of shell namespace item
/// identifiers naming the link target.
pub mod linktarget;
pub use linktarget::{ItemId, LinkTargetIdList};

/// The LinkInfo structure: volume, local path and network share details
/// used to resolve a target that moved.
pub mod linkinfo;
pub use linkinfo::{
    CommonNetworkRelativeLink, CommonNetworkRelativeLinkFlags, DriveType, LinkInfo, LinkInfoFlags,
    NetworkProviderType, VolumeId,
};

mod stringdata;
pub use stringdata::StringData;

mod extradata;
pub use extradata::ExtraData;

mod filetime;
pub use filetime::{ticks_to_utc_seconds, utc_seconds_to_ticks, FileTime, EPOCH_SHIFT_SECONDS};

mod guid;
pub use guid::Guid;

/// The error type for shell link parsing and serialization.
///
/// Parse-side errors carry the absolute byte offset of the fault in the
/// input buffer. Serialization can only fail with [`Error::BadClsid`] or
/// [`Error::TooLarge`].
#[derive(Debug, ThisError)]
pub enum Error {
    /// The buffer ended before the data required at `offset`.
    #[error("input truncated at offset 0x{offset:x}")]
    Truncated {
        /// Where the missing data was expected.
        offset: usize,
    },

    /// The CLSID is not one of the two recognized shell link class
    /// identifiers.
    #[error("not a shell link CLSID: {0}")]
    BadClsid(Guid),

    /// An ItemID declared a size smaller than its own size field.
    #[error("item ID at offset 0x{offset:x} declares impossible size {size}")]
    BadItemSize {
        /// Position of the offending size field.
        offset: usize,
        /// The declared size.
        size: u16,
    },

    /// A flags field had reserved bits set, or an enumeration was out of
    /// range.
    #[error("invalid flag or enumeration value 0x{value:x} at offset 0x{offset:x}")]
    BadFlags {
        /// Position of the offending field.
        offset: usize,
        /// The raw value read.
        value: u32,
    },

    /// A self-referential offset pointed outside its containing record.
    #[error("offset value 0x{value:x} at 0x{offset:x} points outside its structure")]
    InconsistentOffset {
        /// Position of the offending offset field.
        offset: usize,
        /// The raw value read.
        value: u32,
    },

    /// A string failed to decode in its declared encoding.
    #[error("string at offset 0x{offset:x} does not decode as declared")]
    BadEncoding {
        /// Start of the undecodable character data.
        offset: usize,
    },

    /// A structure grew past what its size field can express.
    #[error("{what} does not fit its size field")]
    TooLarge {
        /// The structure that overflowed.
        what: &'static str,
    },
}

/// Result type wrapping around [`enum@Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A shell link: one header plus the optional sections, in their on-disk
/// order.
///
/// The presence bits in the header's link flags and the attached sections
/// are kept consistent by the setters; [`ShellLink::serialize`] derives
/// the bits it writes from the sections that are actually present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShellLink {
    header: ShellLinkHeader,
    link_target_id_list: Option<LinkTargetIdList>,
    link_info: Option<LinkInfo>,
    string_data: Option<StringData>,
    extra_data: Option<ExtraData>,
}

impl ShellLink {
    /// Parse a shell link from its serialized form.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ShellLinkHeader::parse(data)?;
        let link_flags = header.link_flags();
        debug!("parsed header, flags {link_flags:?}");
        let mut cursor = HEADER_LEN;

        let mut link_target_id_list = None;
        if link_flags.contains(LinkFlags::HAS_LINK_TARGET_ID_LIST) {
            let (list, consumed) = LinkTargetIdList::parse(data, cursor)?;
            debug!("parsed ID list with {} items", list.len());
            if list.is_empty() {
                warn!("HasLinkTargetIDList is set but the list holds no items");
            }
            link_target_id_list = Some(list);
            cursor += consumed;
        }

        let mut link_info = None;
        if link_flags.contains(LinkFlags::HAS_LINK_INFO) {
            let (info, consumed) = LinkInfo::parse(data, cursor)?;
            debug!("parsed link info, flags {:?}", info.flags());
            link_info = Some(info);
            cursor += consumed;
        }

        let (strings, consumed) = StringData::parse(data, cursor, link_flags)?;
        cursor += consumed;
        let string_data = (!strings.is_empty()).then_some(strings);

        let extra_data = (cursor < data.len()).then(|| ExtraData::new(data[cursor..].to_vec()));

        Ok(Self {
            header,
            link_target_id_list,
            link_info,
            string_data,
            extra_data,
        })
    }

    /// Serialize into the canonical byte layout.
    ///
    /// The seven presence bits are taken from which sections are actually
    /// attached; every other header flag is written as stored.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut link_flags = self.header.link_flags();
        link_flags.set(
            LinkFlags::HAS_LINK_TARGET_ID_LIST,
            self.link_target_id_list.is_some(),
        );
        link_flags.set(LinkFlags::HAS_LINK_INFO, self.link_info.is_some());
        let strings = self.string_data.as_ref();
        link_flags.set(
            LinkFlags::HAS_NAME,
            strings.is_some_and(|s| s.name_string.is_some()),
        );
        link_flags.set(
            LinkFlags::HAS_RELATIVE_PATH,
            strings.is_some_and(|s| s.relative_path.is_some()),
        );
        link_flags.set(
            LinkFlags::HAS_WORKING_DIR,
            strings.is_some_and(|s| s.working_dir.is_some()),
        );
        link_flags.set(
            LinkFlags::HAS_ARGUMENTS,
            strings.is_some_and(|s| s.command_line_arguments.is_some()),
        );
        link_flags.set(
            LinkFlags::HAS_ICON_LOCATION,
            strings.is_some_and(|s| s.icon_location.is_some()),
        );
        if link_flags != self.header.link_flags() {
            warn!("presence flags were out of sync with the attached sections");
        }

        let mut header = self.header.clone();
        header.set_link_flags(link_flags);

        let mut out = Vec::with_capacity(HEADER_LEN + 128);
        out.extend_from_slice(&header.to_bytes()?);
        if let Some(list) = &self.link_target_id_list {
            list.write(&mut out)?;
        }
        if let Some(info) = &self.link_info {
            info.write(&mut out)?;
        }
        if let Some(strings) = &self.string_data {
            strings.write(&mut out, link_flags)?;
        }
        if let Some(extra) = &self.extra_data {
            out.extend_from_slice(extra.as_bytes());
        }
        Ok(out)
    }

    /// The header of the shell link.
    pub fn header(&self) -> &ShellLinkHeader {
        &self.header
    }

    /// Mutable access to the header.
    pub fn header_mut(&mut self) -> &mut ShellLinkHeader {
        &mut self.header
    }

    /// The link target ID list, if present.
    pub fn link_target_id_list(&self) -> Option<&LinkTargetIdList> {
        self.link_target_id_list.as_ref()
    }

    /// Attach or remove the link target ID list.
    pub fn set_link_target_id_list(&mut self, list: Option<LinkTargetIdList>) {
        self.header
            .update_link_flags(LinkFlags::HAS_LINK_TARGET_ID_LIST, list.is_some());
        self.link_target_id_list = list;
    }

    /// The link info structure, if present.
    pub fn link_info(&self) -> Option<&LinkInfo> {
        self.link_info.as_ref()
    }

    /// Attach or remove the link info structure.
    pub fn set_link_info(&mut self, link_info: Option<LinkInfo>) {
        self.header
            .update_link_flags(LinkFlags::HAS_LINK_INFO, link_info.is_some());
        self.link_info = link_info;
    }

    /// The string data entries, if any are present.
    pub fn string_data(&self) -> Option<&StringData> {
        self.string_data.as_ref()
    }

    /// The opaque trailing extra data, if present.
    pub fn extra_data(&self) -> Option<&ExtraData> {
        self.extra_data.as_ref()
    }

    /// Attach or remove the opaque trailing extra data.
    pub fn set_extra_data(&mut self, extra_data: Option<ExtraData>) {
        self.extra_data = extra_data;
    }

    /// The shell link's name (description), if set.
    pub fn name(&self) -> Option<&str> {
        self.string_data.as_ref()?.name_string.as_deref()
    }

    /// Set the shell link's name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.set_string(LinkFlags::HAS_NAME, name, |s| &mut s.name_string);
    }

    /// The shell link's relative path, if set.
    pub fn relative_path(&self) -> Option<&str> {
        self.string_data.as_ref()?.relative_path.as_deref()
    }

    /// Set the shell link's relative path.
    pub fn set_relative_path(&mut self, relative_path: Option<String>) {
        self.set_string(LinkFlags::HAS_RELATIVE_PATH, relative_path, |s| {
            &mut s.relative_path
        });
    }

    /// The shell link's working directory, if set.
    pub fn working_dir(&self) -> Option<&str> {
        self.string_data.as_ref()?.working_dir.as_deref()
    }

    /// Set the shell link's working directory.
    pub fn set_working_dir(&mut self, working_dir: Option<String>) {
        self.set_string(LinkFlags::HAS_WORKING_DIR, working_dir, |s| {
            &mut s.working_dir
        });
    }

    /// The shell link's command line arguments, if set.
    pub fn arguments(&self) -> Option<&str> {
        self.string_data.as_ref()?.command_line_arguments.as_deref()
    }

    /// Set the shell link's command line arguments.
    pub fn set_arguments(&mut self, arguments: Option<String>) {
        self.set_string(LinkFlags::HAS_ARGUMENTS, arguments, |s| {
            &mut s.command_line_arguments
        });
    }

    /// The shell link's icon location, if set.
    pub fn icon_location(&self) -> Option<&str> {
        self.string_data.as_ref()?.icon_location.as_deref()
    }

    /// Set the shell link's icon location.
    pub fn set_icon_location(&mut self, icon_location: Option<String>) {
        self.set_string(LinkFlags::HAS_ICON_LOCATION, icon_location, |s| {
            &mut s.icon_location
        });
    }

    fn set_string(
        &mut self,
        flag: LinkFlags,
        value: Option<String>,
        slot: impl FnOnce(&mut StringData) -> &mut Option<String>,
    ) {
        self.header.update_link_flags(flag, value.is_some());
        let strings = self.string_data.get_or_insert_with(StringData::default);
        *slot(strings) = value;
        if strings.is_empty() {
            self.string_data = None;
        }
    }
}

impl TryFrom<&[u8]> for ShellLink {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self> {
        Self::parse(data)
    }
}

impl TryFrom<Vec<u8>> for ShellLink {
    type Error = Error;

    fn try_from(data: Vec<u8>) -> Result<Self> {
        Self::parse(&data)
    }
}
