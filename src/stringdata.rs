//! StringData: up to five counted strings conveying user-interface and
//! path information, in a fixed order, each present only when its bit in
//! the header's link flags is set.
//!
//! The character width of all five is chosen by the header's `IsUnicode`
//! bit; the count field counts characters, not bytes, and there is no
//! terminator.

use byteorder::{WriteBytesExt, LE};
use encoding_rs::{UTF_16LE, WINDOWS_1252};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bytes;
use crate::header::LinkFlags;
use crate::{Error, Result};

/// The five optional StringData entries, in their on-disk order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StringData {
    pub(crate) name_string: Option<String>,
    pub(crate) relative_path: Option<String>,
    pub(crate) working_dir: Option<String>,
    pub(crate) command_line_arguments: Option<String>,
    pub(crate) icon_location: Option<String>,
}

impl StringData {
    /// Description of the link, shown to the user.
    pub fn name_string(&self) -> Option<&str> {
        self.name_string.as_deref()
    }

    /// Path to the target relative to the link file.
    pub fn relative_path(&self) -> Option<&str> {
        self.relative_path.as_deref()
    }

    /// Working directory to launch the target in.
    pub fn working_dir(&self) -> Option<&str> {
        self.working_dir.as_deref()
    }

    /// Command line arguments passed to the target.
    pub fn command_line_arguments(&self) -> Option<&str> {
        self.command_line_arguments.as_deref()
    }

    /// Where the display icon comes from.
    pub fn icon_location(&self) -> Option<&str> {
        self.icon_location.as_deref()
    }

    /// Whether no entry is present at all.
    pub fn is_empty(&self) -> bool {
        self.name_string.is_none()
            && self.relative_path.is_none()
            && self.working_dir.is_none()
            && self.command_line_arguments.is_none()
            && self.icon_location.is_none()
    }

    /// Parse the entries selected by `link_flags` at `offset`. Returns the
    /// entries and the bytes consumed.
    pub(crate) fn parse(data: &[u8], offset: usize, link_flags: LinkFlags) -> Result<(Self, usize)> {
        let unicode = link_flags.contains(LinkFlags::IS_UNICODE);
        let mut pos = offset;
        let mut entries = Self::default();

        for (flag, slot) in [
            (LinkFlags::HAS_NAME, &mut entries.name_string),
            (LinkFlags::HAS_RELATIVE_PATH, &mut entries.relative_path),
            (LinkFlags::HAS_WORKING_DIR, &mut entries.working_dir),
            (LinkFlags::HAS_ARGUMENTS, &mut entries.command_line_arguments),
            (LinkFlags::HAS_ICON_LOCATION, &mut entries.icon_location),
        ] {
            if link_flags.contains(flag) {
                let (value, consumed) = read_counted(data, pos, unicode)?;
                *slot = Some(value);
                pos += consumed;
            }
        }
        Ok((entries, pos - offset))
    }

    /// Append every present entry, in order, using the width selected by
    /// `link_flags`.
    pub(crate) fn write(&self, out: &mut Vec<u8>, link_flags: LinkFlags) -> Result<()> {
        let unicode = link_flags.contains(LinkFlags::IS_UNICODE);
        for value in [
            &self.name_string,
            &self.relative_path,
            &self.working_dir,
            &self.command_line_arguments,
            &self.icon_location,
        ]
        .into_iter()
        .flatten()
        {
            write_counted(out, value, unicode)?;
        }
        Ok(())
    }
}

fn read_counted(data: &[u8], offset: usize, unicode: bool) -> Result<(String, usize)> {
    let count = bytes::read_u16_le(data, offset)? as usize;
    if unicode {
        let raw = bytes::take(data, offset + 2, count * 2)?;
        let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(raw);
        if had_errors {
            return Err(Error::BadEncoding { offset: offset + 2 });
        }
        Ok((decoded.into_owned(), 2 + count * 2))
    } else {
        let raw = bytes::take(data, offset + 2, count)?;
        let (decoded, had_errors) = WINDOWS_1252.decode_without_bom_handling(raw);
        if had_errors {
            return Err(Error::BadEncoding { offset: offset + 2 });
        }
        Ok((decoded.into_owned(), 2 + count))
    }
}

fn write_counted(out: &mut Vec<u8>, value: &str, unicode: bool) -> Result<()> {
    if unicode {
        let units: Vec<u16> = value.encode_utf16().collect();
        let count: u16 = units
            .len()
            .try_into()
            .map_err(|_| Error::TooLarge { what: "StringData" })?;
        out.write_u16::<LE>(count).unwrap();
        for unit in units {
            out.write_u16::<LE>(unit).unwrap();
        }
    } else {
        let (encoded, _, _) = WINDOWS_1252.encode(value);
        let count: u16 = encoded
            .len()
            .try_into()
            .map_err(|_| Error::TooLarge { what: "StringData" })?;
        out.write_u16::<LE>(count).unwrap();
        out.extend_from_slice(&encoded);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_name_parses_by_character_count() {
        let wire = [0x03, 0x00, 0x41, 0x00, 0x42, 0x00, 0x43, 0x00];
        let flags = LinkFlags::IS_UNICODE | LinkFlags::HAS_NAME;
        let (entries, consumed) = StringData::parse(&wire, 0, flags).unwrap();
        assert_eq!(entries.name_string(), Some("ABC"));
        assert_eq!(consumed, 8);
    }

    #[test]
    fn empty_string_occupies_two_bytes() {
        let wire = [0x00, 0x00];
        let flags = LinkFlags::IS_UNICODE | LinkFlags::HAS_NAME;
        let (entries, consumed) = StringData::parse(&wire, 0, flags).unwrap();
        assert_eq!(entries.name_string(), Some(""));
        assert_eq!(consumed, 2);
    }

    #[test]
    fn code_page_entries_count_bytes() {
        let mut wire = vec![0x04, 0x00];
        wire.extend_from_slice(b"abcd");
        wire.extend_from_slice(&[0x02, 0x00]);
        wire.extend_from_slice(b"-x");
        let flags = LinkFlags::HAS_NAME | LinkFlags::HAS_ARGUMENTS;
        let (entries, consumed) = StringData::parse(&wire, 0, flags).unwrap();
        assert_eq!(entries.name_string(), Some("abcd"));
        assert_eq!(entries.command_line_arguments(), Some("-x"));
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn entries_come_back_in_order() {
        let mut entries = StringData::default();
        entries.name_string = Some("name".to_string());
        entries.working_dir = Some("C:\\dir".to_string());
        let flags = LinkFlags::IS_UNICODE | LinkFlags::HAS_NAME | LinkFlags::HAS_WORKING_DIR;

        let mut out = Vec::new();
        entries.write(&mut out, flags).unwrap();
        let (parsed, consumed) = StringData::parse(&out, 0, flags).unwrap();
        assert_eq!(consumed, out.len());
        assert_eq!(parsed, entries);
    }

    #[test]
    fn dangling_surrogate_half_is_a_bad_encoding() {
        let wire = [0x01, 0x00, 0x00, 0xd8];
        let flags = LinkFlags::IS_UNICODE | LinkFlags::HAS_NAME;
        assert!(matches!(
            StringData::parse(&wire, 0, flags),
            Err(Error::BadEncoding { offset: 2 })
        ));
    }

    #[test]
    fn truncated_entry_reports_the_offset() {
        let wire = [0x05, 0x00, 0x41];
        let flags = LinkFlags::HAS_NAME;
        assert!(matches!(
            StringData::parse(&wire, 0, flags),
            Err(Error::Truncated { offset: 2 })
        ));
    }
}
