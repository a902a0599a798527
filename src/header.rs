//! The fixed 76-byte ShellLinkHeader and the flag, hotkey and show-command
//! types packed inside it.
#![allow(missing_docs)]

use std::fmt;

use bitflags::bitflags;
use byteorder::{ByteOrder, LE};
use getset::{CopyGetters, Setters};
use log::{debug, warn};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bytes;
use crate::{Error, FileTime, Guid, Result};

/// Size of the serialized header. The on-disk size field always carries
/// this value when written by this crate.
pub const HEADER_LEN: usize = 0x4c;

/// `00021401-0000-0000-C000-000000000046`, the shell link class as most
/// writers stamp it.
pub const CLSID_SHELL_LINK: Guid = Guid::from_wire_bytes([
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
]);

/// The `...0F` variant of the class identifier, also found in the wild and
/// used for newly constructed links.
pub const CLSID_SHELL_LINK_VARIANT: Guid = Guid::from_wire_bytes([
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x0f,
]);

/// A ShellLinkHeader structure (section 2.1), which contains identification
/// information, timestamps, and flags that specify the presence of optional
/// structures.
///
/// All fields survive a parse verbatim. On write, the size field is forced
/// to 0x4C, the CLSID must be one of the two recognized values, and the
/// reserved spans are zeroed.
#[derive(Clone, Debug, PartialEq, Eq, CopyGetters, Setters)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[getset(get_copy = "pub", set = "pub")]
pub struct ShellLinkHeader {
    /// The size field as found on disk; always written as 0x4C.
    header_size: u32,

    /// The class identifier read from the file. Writing fails with
    /// [`Error::BadClsid`] unless it is [`CLSID_SHELL_LINK`] or
    /// [`CLSID_SHELL_LINK_VARIANT`].
    link_clsid: Guid,

    /// Presence bits for the optional sections plus behavioral flags.
    link_flags: LinkFlags,

    /// Attributes of the link target as they were when the link was made.
    file_attributes: FileAttributeFlags,

    /// Creation time of the link target; zero when unknown.
    creation_time: FileTime,

    /// Access time of the link target; zero when unknown.
    access_time: FileTime,

    /// Write time of the link target; zero when unknown.
    write_time: FileTime,

    /// Low 32 bits of the link target's size in bytes.
    file_size: u32,

    /// Index of the icon within the icon location.
    icon_index: i32,

    /// The window state requested when the target is launched.
    show_command: ShowCommand,

    /// The keyboard shortcut assigned to the link.
    hotkey: HotkeyFlags,
}

impl ShellLinkHeader {
    /// Set or clear some link flags in place.
    pub fn update_link_flags(&mut self, link_flags: LinkFlags, value: bool) {
        self.link_flags.set(link_flags, value);
    }

    /// Parse the leading 76 bytes of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated { offset: data.len() });
        }

        let header_size = bytes::read_u32_le(data, 0)?;
        if header_size != HEADER_LEN as u32 {
            warn!("header size field is 0x{header_size:x}, expected 0x4c; continuing");
        }

        let mut clsid_bytes = [0u8; 16];
        clsid_bytes.copy_from_slice(&data[4..20]);
        let link_clsid = Guid::from_wire_bytes(clsid_bytes);
        if link_clsid != CLSID_SHELL_LINK && link_clsid != CLSID_SHELL_LINK_VARIANT {
            warn!("unrecognized link CLSID {link_clsid}");
        }

        let raw_flags = bytes::read_u32_le(data, 20)?;
        let link_flags = LinkFlags::from_bits_truncate(raw_flags);
        if link_flags.bits() != raw_flags {
            debug!(
                "dropping reserved link flag bits: 0x{:08x}",
                raw_flags & !link_flags.bits()
            );
        }

        let raw_attributes = bytes::read_u32_le(data, 24)?;
        let file_attributes = FileAttributeFlags::from_bits_truncate(raw_attributes);
        if file_attributes.bits() != raw_attributes {
            debug!(
                "dropping reserved file attribute bits: 0x{:08x}",
                raw_attributes & !file_attributes.bits()
            );
        }
        if file_attributes.contains(FileAttributeFlags::FILE_ATTRIBUTE_NORMAL)
            && file_attributes != FileAttributeFlags::FILE_ATTRIBUTE_NORMAL
        {
            warn!("FILE_ATTRIBUTE_NORMAL is set alongside other attribute bits");
        }

        let creation_time = FileTime::from(bytes::read_u64_le(data, 28)?);
        let access_time = FileTime::from(bytes::read_u64_le(data, 36)?);
        let write_time = FileTime::from(bytes::read_u64_le(data, 44)?);

        let file_size = bytes::read_u32_le(data, 52)?;
        let icon_index = bytes::read_i32_le(data, 56)?;
        let show_command = ShowCommand::from_u32(bytes::read_u32_le(data, 60)?);
        let hotkey = HotkeyFlags::from_raw(data[64], data[65]);

        if bytes::read_u16_le(data, 66)? != 0
            || bytes::read_u32_le(data, 68)? != 0
            || bytes::read_u32_le(data, 72)? != 0
        {
            warn!("reserved header fields are not zero");
        }

        Ok(Self {
            header_size,
            link_clsid,
            link_flags,
            file_attributes,
            creation_time,
            access_time,
            write_time,
            file_size,
            icon_index,
            show_command,
            hotkey,
        })
    }

    /// Serialize into the fixed 76-byte layout.
    pub fn to_bytes(&self) -> Result<[u8; HEADER_LEN]> {
        if self.link_clsid != CLSID_SHELL_LINK && self.link_clsid != CLSID_SHELL_LINK_VARIANT {
            return Err(Error::BadClsid(self.link_clsid));
        }
        if self
            .file_attributes
            .contains(FileAttributeFlags::FILE_ATTRIBUTE_NORMAL)
            && self.file_attributes != FileAttributeFlags::FILE_ATTRIBUTE_NORMAL
        {
            warn!("writing FILE_ATTRIBUTE_NORMAL alongside other attribute bits");
        }

        let mut out = [0u8; HEADER_LEN];
        LE::write_u32(&mut out[0..], HEADER_LEN as u32);
        out[4..20].copy_from_slice(&self.link_clsid.to_wire_bytes());
        LE::write_u32(&mut out[20..], self.link_flags.bits());
        LE::write_u32(&mut out[24..], self.file_attributes.bits());
        LE::write_u64(&mut out[28..], self.creation_time.into());
        LE::write_u64(&mut out[36..], self.access_time.into());
        LE::write_u64(&mut out[44..], self.write_time.into());
        LE::write_u32(&mut out[52..], self.file_size);
        LE::write_i32(&mut out[56..], self.icon_index);
        LE::write_u32(&mut out[60..], self.show_command.as_u32());
        out[64] = self.hotkey.key_code();
        out[65] = self.hotkey.modifier_mask();
        // bytes 66..76 are the reserved spans and stay zero
        Ok(out)
    }
}

impl Default for ShellLinkHeader {
    /// A minimal valid header: unicode strings, a "plain file" target,
    /// no timestamps, normal window, no hotkey.
    fn default() -> Self {
        Self {
            header_size: HEADER_LEN as u32,
            link_clsid: CLSID_SHELL_LINK_VARIANT,
            link_flags: LinkFlags::IS_UNICODE,
            file_attributes: FileAttributeFlags::FILE_ATTRIBUTE_NORMAL,
            creation_time: FileTime::default(),
            access_time: FileTime::default(),
            write_time: FileTime::default(),
            file_size: 0,
            icon_index: 0,
            show_command: ShowCommand::ShowNormal,
            hotkey: HotkeyFlags::default(),
        }
    }
}

bitflags! {
    /// The LinkFlags structure defines bits that specify which shell link
    /// structures are present in the file after the ShellLinkHeader, plus a
    /// handful of behavioral switches.
    ///
    /// Bits 11 and 16 are reserved; they read as zero and are written as
    /// zero.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct LinkFlags: u32 {
        /// A LinkTargetIDList structure follows the header.
        const HAS_LINK_TARGET_ID_LIST           = 0x0000_0001;
        /// A LinkInfo structure is present.
        const HAS_LINK_INFO                     = 0x0000_0002;
        /// The NAME_STRING StringData entry is present.
        const HAS_NAME                          = 0x0000_0004;
        /// The RELATIVE_PATH StringData entry is present.
        const HAS_RELATIVE_PATH                 = 0x0000_0008;
        /// The WORKING_DIR StringData entry is present.
        const HAS_WORKING_DIR                   = 0x0000_0010;
        /// The COMMAND_LINE_ARGUMENTS StringData entry is present.
        const HAS_ARGUMENTS                     = 0x0000_0020;
        /// The ICON_LOCATION StringData entry is present.
        const HAS_ICON_LOCATION                 = 0x0000_0040;
        /// StringData entries are stored as two-byte characters rather
        /// than in the system default code page.
        const IS_UNICODE                        = 0x0000_0080;
        /// The LinkInfo structure is to be ignored by consumers.
        const FORCE_NO_LINK_INFO                = 0x0000_0100;
        /// An EnvironmentVariableDataBlock is saved with the link.
        const HAS_EXP_STRING                    = 0x0000_0200;
        /// A 16-bit target is run in a separate virtual machine.
        const RUN_IN_SEPARATE_PROCESS           = 0x0000_0400;
        /// A DarwinDataBlock is saved with the link.
        const HAS_DARWIN_ID                     = 0x0000_1000;
        /// The target is activated as a different user.
        const RUN_AS_USER                       = 0x0000_2000;
        /// An IconEnvironmentDataBlock is saved with the link.
        const HAS_EXP_ICON                      = 0x0000_4000;
        /// The file system location is represented in the shell namespace
        /// when the target path is parsed into an IDList.
        const NO_PIDL_ALIAS                     = 0x0000_8000;
        /// A ShimDataBlock is saved with the link.
        const RUN_WITH_SHIM_LAYER               = 0x0002_0000;
        /// The TrackerDataBlock is to be ignored.
        const FORCE_NO_LINK_TRACK               = 0x0004_0000;
        /// Target properties are collected into the PropertyStoreDataBlock
        /// when the target is set.
        const ENABLE_TARGET_METADATA            = 0x0008_0000;
        /// The EnvironmentVariableDataBlock is to be ignored.
        const DISABLE_LINK_PATH_TRACKING        = 0x0010_0000;
        /// The SpecialFolder and KnownFolder data blocks are ignored when
        /// loading and skipped when saving.
        const DISABLE_KNOWN_FOLDER_TRACKING     = 0x0020_0000;
        /// The unaliased form of a known folder IDList is used when
        /// translating the target IDList at load time.
        const DISABLE_KNOWN_FOLDER_ALIAS        = 0x0040_0000;
        /// A link is allowed to point at another link.
        const ALLOW_LINK_TO_LINK                = 0x0080_0000;
        /// The unaliased form of a known-folder target is preferred when
        /// saving.
        const UNALIAS_ON_SAVE                   = 0x0100_0000;
        /// The path from the EnvironmentVariableDataBlock is used instead
        /// of a stored target IDList.
        const PREFER_ENVIRONMENT_PATH           = 0x0200_0000;
        /// For UNC targets on the local machine, the local path IDList is
        /// stored in the PropertyStoreDataBlock too.
        const KEEP_LOCAL_ID_LIST_FOR_UNC_TARGET = 0x0400_0000;
    }
}

bitflags! {
    /// The FileAttributesFlags structure mirrors the attributes of the
    /// link target, if the target is a file system item.
    ///
    /// Bits 3 and 6 are reserved; they read as zero and are written as
    /// zero.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct FileAttributeFlags: u32 {
        /// The target is read-only.
        const FILE_ATTRIBUTE_READONLY            = 0x0000_0001;
        /// The target is hidden from ordinary directory listings.
        const FILE_ATTRIBUTE_HIDDEN              = 0x0000_0002;
        /// The target belongs to the operating system.
        const FILE_ATTRIBUTE_SYSTEM              = 0x0000_0004;
        /// The target is a directory instead of a file.
        const FILE_ATTRIBUTE_DIRECTORY           = 0x0000_0010;
        /// The target is marked for backup or removal.
        const FILE_ATTRIBUTE_ARCHIVE             = 0x0000_0020;
        /// The target has no other attributes. When this bit is set, every
        /// other bit is required to be clear.
        const FILE_ATTRIBUTE_NORMAL              = 0x0000_0080;
        /// The target is used for temporary storage.
        const FILE_ATTRIBUTE_TEMPORARY           = 0x0000_0100;
        /// The target is a sparse file.
        const FILE_ATTRIBUTE_SPARSE_FILE         = 0x0000_0200;
        /// The target has an associated reparse point.
        const FILE_ATTRIBUTE_REPARSE_POINT       = 0x0000_0400;
        /// The target is compressed.
        const FILE_ATTRIBUTE_COMPRESSED          = 0x0000_0800;
        /// The target's data is not immediately available.
        const FILE_ATTRIBUTE_OFFLINE             = 0x0000_1000;
        /// The target's contents are not to be indexed.
        const FILE_ATTRIBUTE_NOT_CONTENT_INDEXED = 0x0000_2000;
        /// The target is encrypted.
        const FILE_ATTRIBUTE_ENCRYPTED           = 0x0000_4000;
    }
}

/// The window state requested for the target when the link is launched.
///
/// Values other than the three defined ones are preserved verbatim so a
/// file that carries them round-trips.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum ShowCommand {
    /// The window is opened in a normal fashion.
    ShowNormal,
    /// The window is opened maximized.
    ShowMaximized,
    /// The window is opened minimized and without keyboard focus.
    ShowMinNoActive,
    /// Any other value found on disk.
    Other(u32),
}

impl ShowCommand {
    /// Map a raw field value, keeping unknown values intact.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0x01 => Self::ShowNormal,
            0x03 => Self::ShowMaximized,
            0x07 => Self::ShowMinNoActive,
            other => Self::Other(other),
        }
    }

    /// The raw field value.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::ShowNormal => 0x01,
            Self::ShowMaximized => 0x03,
            Self::ShowMinNoActive => 0x07,
            Self::Other(value) => value,
        }
    }
}

impl Default for ShowCommand {
    fn default() -> Self {
        Self::ShowNormal
    }
}

/// The HotkeyFlags structure specifies input generated by a combination of
/// keyboard keys being pressed.
///
/// The two wire bytes are kept raw and are authoritative; the typed
/// accessors and the `Display` rendering are derived views.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HotkeyFlags {
    key_code: u8,
    modifier_mask: u8,
}

impl HotkeyFlags {
    /// Build from typed key and modifiers.
    pub fn new(key: HotkeyKey, modifiers: HotkeyModifiers) -> Self {
        Self {
            key_code: key as u8,
            modifier_mask: modifiers.bits(),
        }
    }

    /// Wrap the two raw wire bytes.
    pub fn from_raw(key_code: u8, modifier_mask: u8) -> Self {
        Self {
            key_code,
            modifier_mask,
        }
    }

    /// The low wire byte: the virtual key code.
    pub fn key_code(&self) -> u8 {
        self.key_code
    }

    /// The high wire byte: the modifier mask.
    pub fn modifier_mask(&self) -> u8 {
        self.modifier_mask
    }

    /// The key, when the code is one of the defined ones.
    pub fn key(&self) -> Option<HotkeyKey> {
        HotkeyKey::from_u8(self.key_code)
    }

    /// The defined modifier bits; undefined mask bits are not reported
    /// here but stay on the wire.
    pub fn modifiers(&self) -> HotkeyModifiers {
        HotkeyModifiers::from_bits_truncate(self.modifier_mask)
    }

    /// Set the primary key.
    pub fn set_key(&mut self, key: HotkeyKey) {
        self.key_code = key as u8;
    }

    /// Set the modifier keys.
    pub fn set_modifiers(&mut self, modifiers: HotkeyModifiers) {
        self.modifier_mask = modifiers.bits();
    }

    /// Whether any key is assigned at all.
    pub fn is_assigned(&self) -> bool {
        self.key_code != 0
    }

    fn key_name(&self) -> Option<String> {
        match self.key_code {
            0x30..=0x39 | 0x41..=0x5a => Some((self.key_code as char).to_string()),
            0x70..=0x87 => Some(format!("F{}", self.key_code - 0x70 + 1)),
            0x90 => Some("NUM LOCK".to_string()),
            0x91 => Some("SCROLL LOCK".to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for HotkeyFlags {
    /// Renders e.g. `SHIFT+CTRL / F5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mods = Vec::new();
        if self.modifier_mask & 0x01 != 0 {
            mods.push("SHIFT");
        }
        if self.modifier_mask & 0x02 != 0 {
            mods.push("CTRL");
        }
        if self.modifier_mask & 0x04 != 0 {
            mods.push("ALT");
        }
        match (mods.is_empty(), self.key_name()) {
            (false, Some(key)) => write!(f, "{} / {}", mods.join("+"), key),
            (true, Some(key)) => f.write_str(&key),
            (false, None) => f.write_str(&mods.join("+")),
            (true, None) => f.write_str("(none)"),
        }
    }
}

/// An 8-bit virtual key code that corresponds to a key on the keyboard.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[repr(u8)]
pub enum HotkeyKey {
    NoKeyAssigned = 0x00,
    Key0 = 0x30,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    KeyA = 0x41,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    F1 = 0x70,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    NumLock = 0x90,
    ScrollLock,
}

bitflags! {
    /// An 8-bit mask of modifier keys held together with the hotkey.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct HotkeyModifiers: u8 {
        /// No modifier key is being used.
        const NO_MODIFIER     = 0x00;
        /// The SHIFT key.
        const HOTKEYF_SHIFT   = 0x01;
        /// The CTRL key.
        const HOTKEYF_CONTROL = 0x02;
        /// The ALT key.
        const HOTKEYF_ALT     = 0x04;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_header_bytes() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        LE::write_u32(&mut data[0..], 0x4c);
        data[4..20].copy_from_slice(&CLSID_SHELL_LINK.to_wire_bytes());
        data
    }

    #[test]
    fn minimal_header_round_trips() {
        let data = minimal_header_bytes();
        let header = ShellLinkHeader::parse(&data).unwrap();
        assert_eq!(header.link_flags(), LinkFlags::empty());
        assert_eq!(header.file_attributes(), FileAttributeFlags::empty());
        assert!(header.creation_time().is_unset());
        assert_eq!(header.show_command(), ShowCommand::Other(0));
        assert_eq!(header.to_bytes().unwrap().to_vec(), data);
    }

    #[test]
    fn default_header_serializes_and_parses_back() {
        let header = ShellLinkHeader::default();
        let data = header.to_bytes().unwrap();
        assert_eq!(data.len(), HEADER_LEN);
        let parsed = ShellLinkHeader::parse(&data).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.link_clsid(), CLSID_SHELL_LINK_VARIANT);
        assert_eq!(parsed.show_command(), ShowCommand::ShowNormal);
    }

    #[test]
    fn reserved_flag_bits_are_dropped() {
        let mut data = minimal_header_bytes();
        // bit 11 and bit 16 are reserved, bit 0 is meaningful
        LE::write_u32(&mut data[20..], 0x0001_0801);
        let header = ShellLinkHeader::parse(&data).unwrap();
        assert_eq!(header.link_flags(), LinkFlags::HAS_LINK_TARGET_ID_LIST);
    }

    #[test]
    fn unknown_show_command_is_preserved() {
        let mut data = minimal_header_bytes();
        LE::write_u32(&mut data[60..], 5);
        let header = ShellLinkHeader::parse(&data).unwrap();
        assert_eq!(header.show_command(), ShowCommand::Other(5));
        assert_eq!(header.to_bytes().unwrap().to_vec(), data);
    }

    #[test]
    fn bad_clsid_is_refused_on_write() {
        let mut header = ShellLinkHeader::default();
        header.set_link_clsid(Guid::from_wire_bytes([0xff; 16]));
        assert!(matches!(header.to_bytes(), Err(Error::BadClsid(_))));
    }

    #[test]
    fn hotkey_renders_like_the_reference() {
        let hotkey = HotkeyFlags::from_raw(0x74, 0x03);
        assert_eq!(hotkey.to_string(), "SHIFT+CTRL / F5");
        assert_eq!(hotkey.key(), Some(HotkeyKey::F5));
        assert_eq!(
            hotkey.modifiers(),
            HotkeyModifiers::HOTKEYF_SHIFT | HotkeyModifiers::HOTKEYF_CONTROL
        );

        assert_eq!(HotkeyFlags::from_raw(0x41, 0x04).to_string(), "ALT / A");
        assert_eq!(HotkeyFlags::from_raw(0x90, 0x00).to_string(), "NUM LOCK");
        assert_eq!(HotkeyFlags::from_raw(0x00, 0x02).to_string(), "CTRL");
        assert_eq!(HotkeyFlags::from_raw(0x00, 0x00).to_string(), "(none)");
    }

    #[test]
    fn hotkey_wire_bytes_survive_unknown_codes() {
        let mut data = minimal_header_bytes();
        data[64] = 0x13;
        data[65] = 0xf8;
        let header = ShellLinkHeader::parse(&data).unwrap();
        assert_eq!(header.hotkey().key(), None);
        assert_eq!(header.to_bytes().unwrap().to_vec(), data);
    }
}
