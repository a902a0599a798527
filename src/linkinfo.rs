//! The LinkInfo structure specifies information necessary to resolve a
//! link target if it is not found in its original location: the volume it
//! lived on, a local base path, a network share, and a common path suffix,
//! each optionally mirrored in a two-byte-character form.
//!
//! Every offset inside the structure is relative to its own start and an
//! offset of zero uniformly means "absent". Because the offsets are
//! self-referential, writing happens in two passes: payloads are encoded
//! into their own buffers first, then offsets fall out of a running sum.

use bitflags::bitflags;
use byteorder::{WriteBytesExt, LE};
use getset::{CopyGetters, Getters, Setters};
use log::warn;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive as _;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::bytes::{self, StringEncoding};
use crate::{Error, Result};

const HEADER_LEN: usize = 0x1c;
const HEADER_LEN_UNICODE: usize = 0x24;

fn size_u32(len: usize, what: &'static str) -> Result<u32> {
    len.try_into().map_err(|_| Error::TooLarge { what })
}

fn check_offset(total: usize, header_len: usize, field_pos: usize, value: u32) -> Result<usize> {
    let offset = value as usize;
    if offset < header_len || offset >= total {
        return Err(Error::InconsistentOffset {
            offset: field_pos,
            value,
        });
    }
    Ok(offset)
}

/// The LinkInfo structure. The two flag bits are not stored: bit 0 follows
/// from the presence of the volume/local-path pair and bit 1 from the
/// presence of the network pair, which keeps the structure incapable of
/// expressing a flag/payload mismatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LinkInfo {
    volume_id: Option<VolumeId>,
    local_base_path: Option<String>,
    common_network_relative_link: Option<CommonNetworkRelativeLink>,
    common_path_suffix: Option<String>,
    local_base_path_unicode: Option<String>,
    common_path_suffix_unicode: Option<String>,
}

impl LinkInfo {
    /// The flags as they will appear on the wire, derived from which
    /// payload pairs are present.
    pub fn flags(&self) -> LinkInfoFlags {
        let mut flags = LinkInfoFlags::empty();
        if self.volume_id.is_some() {
            flags |= LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH;
        }
        if self.common_network_relative_link.is_some() {
            flags |= LinkInfoFlags::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX;
        }
        flags
    }

    /// The volume the target lived on, when the local pair is present.
    pub fn volume_id(&self) -> Option<&VolumeId> {
        self.volume_id.as_ref()
    }

    /// The local base path, when the local pair is present.
    pub fn local_base_path(&self) -> Option<&str> {
        self.local_base_path.as_deref()
    }

    /// The network share descriptor, when the network pair is present.
    pub fn common_network_relative_link(&self) -> Option<&CommonNetworkRelativeLink> {
        self.common_network_relative_link.as_ref()
    }

    /// The path suffix appended to either base, when the network pair is
    /// present.
    pub fn common_path_suffix(&self) -> Option<&str> {
        self.common_path_suffix.as_deref()
    }

    /// Two-byte-character form of the local base path.
    pub fn local_base_path_unicode(&self) -> Option<&str> {
        self.local_base_path_unicode.as_deref()
    }

    /// Two-byte-character form of the common path suffix.
    pub fn common_path_suffix_unicode(&self) -> Option<&str> {
        self.common_path_suffix_unicode.as_deref()
    }

    /// Attach the volume/local-path pair (flag bit 0).
    pub fn set_local_target(&mut self, volume_id: VolumeId, local_base_path: impl Into<String>) {
        self.volume_id = Some(volume_id);
        self.local_base_path = Some(local_base_path.into());
    }

    /// Drop the volume/local-path pair and its unicode mirror.
    pub fn clear_local_target(&mut self) {
        self.volume_id = None;
        self.local_base_path = None;
        self.local_base_path_unicode = None;
    }

    /// Attach the network pair (flag bit 1).
    pub fn set_network_target(
        &mut self,
        link: CommonNetworkRelativeLink,
        common_path_suffix: impl Into<String>,
    ) {
        self.common_network_relative_link = Some(link);
        self.common_path_suffix = Some(common_path_suffix.into());
    }

    /// Drop the network pair and its unicode mirror.
    pub fn clear_network_target(&mut self) {
        self.common_network_relative_link = None;
        self.common_path_suffix = None;
        self.common_path_suffix_unicode = None;
    }

    /// Set the two-byte mirror of the local base path. Only written when
    /// the local pair is present.
    pub fn set_local_base_path_unicode(&mut self, value: Option<String>) {
        self.local_base_path_unicode = value;
    }

    /// Set the two-byte mirror of the common path suffix. Only written
    /// when the network pair is present.
    pub fn set_common_path_suffix_unicode(&mut self, value: Option<String>) {
        self.common_path_suffix_unicode = value;
    }

    /// Parse the structure at `base`. Returns it and the byte span its
    /// size field declares, which is what the caller skips.
    pub(crate) fn parse(data: &[u8], base: usize) -> Result<(Self, usize)> {
        let total = bytes::read_u32_le(data, base)? as usize;
        let header_len = bytes::read_u32_le(data, base + 4)? as usize;
        if header_len < HEADER_LEN || header_len > total {
            return Err(Error::InconsistentOffset {
                offset: base + 4,
                value: header_len as u32,
            });
        }
        if base + total > data.len() {
            return Err(Error::Truncated { offset: data.len() });
        }

        let raw_flags = bytes::read_u32_le(data, base + 8)?;
        if raw_flags > 3 {
            return Err(Error::BadFlags {
                offset: base + 8,
                value: raw_flags,
            });
        }
        let flags = LinkInfoFlags::from_bits_truncate(raw_flags);

        let volume_id_offset = bytes::read_u32_le(data, base + 12)?;
        let local_base_path_offset = bytes::read_u32_le(data, base + 16)?;
        let network_offset = bytes::read_u32_le(data, base + 20)?;
        let suffix_offset = bytes::read_u32_le(data, base + 24)?;
        let (local_unicode_offset, suffix_unicode_offset) = if header_len >= HEADER_LEN_UNICODE {
            (
                bytes::read_u32_le(data, base + 28)?,
                bytes::read_u32_le(data, base + 32)?,
            )
        } else {
            (0, 0)
        };

        let mut info = Self::default();

        if flags.has_volume_id_and_local_base_path() {
            let offset = check_offset(total, header_len, base + 12, volume_id_offset)?;
            info.volume_id = Some(VolumeId::parse(data, base + offset)?);
            let offset = check_offset(total, header_len, base + 16, local_base_path_offset)?;
            let (path, _) =
                bytes::read_cstr(data, base + offset, StringEncoding::CodePage, total - offset)?;
            info.local_base_path = Some(path);
        } else if volume_id_offset != 0 || local_base_path_offset != 0 {
            warn!("ignoring local-path offsets while flag bit 0 is clear");
        }

        if flags.has_common_network_relative_link_and_path_suffix() {
            let offset = check_offset(total, header_len, base + 20, network_offset)?;
            info.common_network_relative_link =
                Some(CommonNetworkRelativeLink::parse(data, base + offset)?);
            let offset = check_offset(total, header_len, base + 24, suffix_offset)?;
            let (suffix, _) =
                bytes::read_cstr(data, base + offset, StringEncoding::CodePage, total - offset)?;
            info.common_path_suffix = Some(suffix);
        } else if network_offset != 0 || suffix_offset != 0 {
            warn!("ignoring network offsets while flag bit 1 is clear");
        }

        if local_unicode_offset != 0 {
            if flags.has_volume_id_and_local_base_path() {
                let offset = check_offset(total, header_len, base + 28, local_unicode_offset)?;
                let (path, _) = bytes::read_cstr(
                    data,
                    base + offset,
                    StringEncoding::Unicode,
                    (total - offset) / 2,
                )?;
                info.local_base_path_unicode = Some(path);
            } else {
                warn!("ignoring unicode local base path while flag bit 0 is clear");
            }
        }
        if suffix_unicode_offset != 0 {
            if flags.has_common_network_relative_link_and_path_suffix() {
                let offset = check_offset(total, header_len, base + 32, suffix_unicode_offset)?;
                let (suffix, _) = bytes::read_cstr(
                    data,
                    base + offset,
                    StringEncoding::Unicode,
                    (total - offset) / 2,
                )?;
                info.common_path_suffix_unicode = Some(suffix);
            } else {
                warn!("ignoring unicode path suffix while flag bit 1 is clear");
            }
        }

        Ok((info, total))
    }

    /// Append the serialized structure to `out`.
    pub(crate) fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        let local_unicode = if self.local_base_path_unicode.is_some() && self.volume_id.is_none() {
            warn!("dropping unicode local base path without a local target");
            None
        } else {
            self.local_base_path_unicode.as_deref()
        };
        let suffix_unicode = if self.common_path_suffix_unicode.is_some()
            && self.common_network_relative_link.is_none()
        {
            warn!("dropping unicode path suffix without a network target");
            None
        } else {
            self.common_path_suffix_unicode.as_deref()
        };

        let header_len = if local_unicode.is_some() || suffix_unicode.is_some() {
            HEADER_LEN_UNICODE
        } else {
            HEADER_LEN
        };

        // first pass: every payload in its own buffer
        let volume = self.volume_id.as_ref().map(VolumeId::encode).transpose()?;
        let local = self
            .local_base_path
            .as_deref()
            .map(|s| bytes::write_cstr(s, StringEncoding::CodePage));
        let network = self
            .common_network_relative_link
            .as_ref()
            .map(CommonNetworkRelativeLink::encode)
            .transpose()?;
        let suffix = self
            .common_path_suffix
            .as_deref()
            .map(|s| bytes::write_cstr(s, StringEncoding::CodePage));
        let local_unicode = local_unicode.map(|s| bytes::write_cstr(s, StringEncoding::Unicode));
        let suffix_unicode = suffix_unicode.map(|s| bytes::write_cstr(s, StringEncoding::Unicode));

        // second pass: offsets are the running sum over present payloads
        let mut next = header_len;
        let mut place = |payload: Option<&Vec<u8>>| match payload {
            Some(buffer) => {
                let at = next;
                next += buffer.len();
                at
            }
            None => 0,
        };
        let volume_id_offset = place(volume.as_ref());
        let local_base_path_offset = place(local.as_ref());
        let network_offset = place(network.as_ref());
        let suffix_offset = place(suffix.as_ref());
        let local_unicode_offset = place(local_unicode.as_ref());
        let suffix_unicode_offset = place(suffix_unicode.as_ref());
        let total = size_u32(next, "LinkInfo")?;

        out.write_u32::<LE>(total).unwrap();
        out.write_u32::<LE>(header_len as u32).unwrap();
        out.write_u32::<LE>(self.flags().bits()).unwrap();
        out.write_u32::<LE>(volume_id_offset as u32).unwrap();
        out.write_u32::<LE>(local_base_path_offset as u32).unwrap();
        out.write_u32::<LE>(network_offset as u32).unwrap();
        out.write_u32::<LE>(suffix_offset as u32).unwrap();
        if header_len == HEADER_LEN_UNICODE {
            out.write_u32::<LE>(local_unicode_offset as u32).unwrap();
            out.write_u32::<LE>(suffix_unicode_offset as u32).unwrap();
        }
        for buffer in [volume, local, network, suffix, local_unicode, suffix_unicode]
            .iter()
            .flatten()
        {
            out.extend_from_slice(buffer);
        }
        Ok(())
    }
}

bitflags! {
    /// Flags that specify which payload pairs a LinkInfo carries. The
    /// remaining two combinations are "neither" and "both".
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct LinkInfoFlags: u32 {
        /// The VolumeID and LocalBasePath fields are present, located by
        /// their offset fields (plus the unicode mirror when the header is
        /// extended).
        const VOLUME_ID_AND_LOCAL_BASE_PATH = 0x0000_0001;
        /// The CommonNetworkRelativeLink and CommonPathSuffix fields are
        /// present, located by their offset fields.
        const COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX = 0x0000_0002;
    }
}

#[allow(missing_docs)]
impl LinkInfoFlags {
    pub fn has_volume_id_and_local_base_path(&self) -> bool {
        self.contains(Self::VOLUME_ID_AND_LOCAL_BASE_PATH)
    }

    pub fn has_common_network_relative_link_and_path_suffix(&self) -> bool {
        self.contains(Self::COMMON_NETWORK_RELATIVE_LINK_AND_PATH_SUFFIX)
    }
}

/// The VolumeID structure describes the local volume a link target was
/// stored on.
///
/// The label is kept in its single-byte form, with an optional two-byte
/// mirror; when the mirror is present the label offset field carries the
/// 0x14 sentinel layout on the wire.
#[derive(Clone, Debug, PartialEq, Eq, CopyGetters, Getters, Setters)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VolumeId {
    /// What kind of drive the volume is.
    #[getset(get_copy = "pub", set = "pub")]
    drive_type: DriveType,

    /// Serial number of the volume.
    #[getset(get_copy = "pub", set = "pub")]
    drive_serial_number: u32,

    /// The volume label in its single-byte form.
    #[getset(get = "pub", set = "pub")]
    volume_label: String,

    volume_label_unicode: Option<String>,
}

impl VolumeId {
    /// Describe a volume without a unicode label mirror.
    pub fn new(drive_type: DriveType, drive_serial_number: u32, volume_label: impl Into<String>) -> Self {
        Self {
            drive_type,
            drive_serial_number,
            volume_label: volume_label.into(),
            volume_label_unicode: None,
        }
    }

    /// The two-byte-character form of the label, when present.
    pub fn volume_label_unicode(&self) -> Option<&str> {
        self.volume_label_unicode.as_deref()
    }

    /// Attach or drop the two-byte label mirror.
    pub fn set_volume_label_unicode(&mut self, value: Option<String>) {
        self.volume_label_unicode = value;
    }

    fn parse(data: &[u8], base: usize) -> Result<Self> {
        let size = bytes::read_u32_le(data, base)? as usize;
        if size <= 0x10 {
            return Err(Error::InconsistentOffset {
                offset: base,
                value: size as u32,
            });
        }
        let raw_drive = bytes::read_u32_le(data, base + 4)?;
        let drive_type = DriveType::from_u32(raw_drive).ok_or(Error::BadFlags {
            offset: base + 4,
            value: raw_drive,
        })?;
        let drive_serial_number = bytes::read_u32_le(data, base + 8)?;

        let label_offset = bytes::read_u32_le(data, base + 12)? as usize;
        if label_offset == 0 || label_offset >= size {
            return Err(Error::InconsistentOffset {
                offset: base + 12,
                value: label_offset as u32,
            });
        }
        let volume_label_unicode = if label_offset == 0x14 {
            let unicode_offset = bytes::read_u32_le(data, base + 16)? as usize;
            if unicode_offset == 0 || unicode_offset >= size {
                return Err(Error::InconsistentOffset {
                    offset: base + 16,
                    value: unicode_offset as u32,
                });
            }
            let (label, _) = bytes::read_cstr(
                data,
                base + unicode_offset,
                StringEncoding::Unicode,
                (size - unicode_offset) / 2,
            )?;
            Some(label)
        } else {
            None
        };
        let (volume_label, _) = bytes::read_cstr(
            data,
            base + label_offset,
            StringEncoding::CodePage,
            size - label_offset,
        )?;

        Ok(Self {
            drive_type,
            drive_serial_number,
            volume_label,
            volume_label_unicode,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let label = bytes::write_cstr(&self.volume_label, StringEncoding::CodePage);
        let mut out = Vec::new();
        match &self.volume_label_unicode {
            Some(unicode) => {
                let wide = bytes::write_cstr(unicode, StringEncoding::Unicode);
                let total = size_u32(0x14 + label.len() + wide.len(), "VolumeID")?;
                out.write_u32::<LE>(total).unwrap();
                out.write_u32::<LE>(self.drive_type as u32).unwrap();
                out.write_u32::<LE>(self.drive_serial_number).unwrap();
                // 0x14 is the sentinel that selects the unicode layout; it
                // is also where the single-byte label actually starts
                out.write_u32::<LE>(0x14).unwrap();
                out.write_u32::<LE>((0x14 + label.len()) as u32).unwrap();
                out.extend_from_slice(&label);
                out.extend_from_slice(&wide);
            }
            None => {
                let total = size_u32(0x10 + label.len(), "VolumeID")?;
                out.write_u32::<LE>(total).unwrap();
                out.write_u32::<LE>(self.drive_type as u32).unwrap();
                out.write_u32::<LE>(self.drive_serial_number).unwrap();
                out.write_u32::<LE>(0x10).unwrap();
                out.extend_from_slice(&label);
            }
        }
        Ok(out)
    }
}

/// A 32-bit, unsigned integer that specifies the type of drive the link
/// target is stored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DriveType {
    /// The drive type cannot be determined.
    DriveUnknown = 0x00,
    /// The root path is invalid, e.g. no volume is mounted at the path.
    DriveNoRootDir = 0x01,
    /// The drive has removable media.
    DriveRemovable = 0x02,
    /// The drive has fixed media.
    DriveFixed = 0x03,
    /// The drive is a remote (network) drive.
    DriveRemote = 0x04,
    /// The drive is a CD-ROM drive.
    DriveCDRom = 0x05,
    /// The drive is a RAM disk.
    DriveRamdisk = 0x06,
}

/// The CommonNetworkRelativeLink structure describes the network share a
/// link target is stored on, including an optional mapped device and
/// provider type.
///
/// The wire flags are derived: `ValidDevice` follows from the device name
/// being present and `ValidNetType` from the provider type being present.
/// `net_name_offset > 0x14` on the wire signals the unicode tail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CommonNetworkRelativeLink {
    net_name: String,
    device_name: Option<String>,
    network_provider_type: Option<u32>,
    net_name_unicode: Option<String>,
    device_name_unicode: Option<String>,
}

impl CommonNetworkRelativeLink {
    /// Describe a share by its `\\server\share` name.
    pub fn new(net_name: impl Into<String>) -> Self {
        Self {
            net_name: net_name.into(),
            ..Self::default()
        }
    }

    /// The flags as they will appear on the wire.
    pub fn flags(&self) -> CommonNetworkRelativeLinkFlags {
        let mut flags = CommonNetworkRelativeLinkFlags::empty();
        if self.device_name.is_some() {
            flags |= CommonNetworkRelativeLinkFlags::VALID_DEVICE;
        }
        if self.network_provider_type.is_some() {
            flags |= CommonNetworkRelativeLinkFlags::VALID_NET_TYPE;
        }
        flags
    }

    /// The server share path, e.g. `\\server\share`.
    pub fn net_name(&self) -> &str {
        &self.net_name
    }

    /// Replace the share path.
    pub fn set_net_name(&mut self, net_name: impl Into<String>) {
        self.net_name = net_name.into();
    }

    /// The mapped device, e.g. the drive letter `D:`.
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    /// Attach or drop the mapped device.
    pub fn set_device_name(&mut self, value: Option<String>) {
        self.device_name = value;
    }

    /// The raw network provider type field, when valid.
    pub fn network_provider_type(&self) -> Option<u32> {
        self.network_provider_type
    }

    /// Set or clear the raw provider type field.
    pub fn set_network_provider_type(&mut self, value: Option<u32>) {
        self.network_provider_type = value;
    }

    /// The provider as an enumeration, when valid and recognized.
    pub fn provider(&self) -> Option<NetworkProviderType> {
        self.network_provider_type
            .and_then(NetworkProviderType::from_u32)
    }

    /// Two-byte-character form of the share path; its presence selects the
    /// unicode tail layout.
    pub fn net_name_unicode(&self) -> Option<&str> {
        self.net_name_unicode.as_deref()
    }

    /// Attach or drop the two-byte share path.
    pub fn set_net_name_unicode(&mut self, value: Option<String>) {
        self.net_name_unicode = value;
    }

    /// Two-byte-character form of the device name.
    pub fn device_name_unicode(&self) -> Option<&str> {
        self.device_name_unicode.as_deref()
    }

    /// Attach or drop the two-byte device name.
    pub fn set_device_name_unicode(&mut self, value: Option<String>) {
        self.device_name_unicode = value;
    }

    fn parse(data: &[u8], base: usize) -> Result<Self> {
        let size = bytes::read_u32_le(data, base)? as usize;
        if size < 0x14 {
            return Err(Error::InconsistentOffset {
                offset: base,
                value: size as u32,
            });
        }
        let raw_flags = bytes::read_u32_le(data, base + 4)?;
        if raw_flags > 3 {
            return Err(Error::BadFlags {
                offset: base + 4,
                value: raw_flags,
            });
        }
        let flags = CommonNetworkRelativeLinkFlags::from_bits_truncate(raw_flags);

        let net_name_offset = bytes::read_u32_le(data, base + 8)? as usize;
        if net_name_offset == 0 || net_name_offset >= size {
            return Err(Error::InconsistentOffset {
                offset: base + 8,
                value: net_name_offset as u32,
            });
        }
        let device_name_offset = bytes::read_u32_le(data, base + 12)? as usize;
        if flags.has_valid_device() {
            if device_name_offset == 0 || device_name_offset >= size {
                return Err(Error::InconsistentOffset {
                    offset: base + 12,
                    value: device_name_offset as u32,
                });
            }
        } else if device_name_offset != 0 {
            warn!("ignoring device name offset without the ValidDevice flag");
        }
        let raw_provider = bytes::read_u32_le(data, base + 16)?;
        let network_provider_type = flags.has_valid_net_type().then_some(raw_provider);

        let unicode_tail = net_name_offset > 0x14;
        let (net_unicode_offset, device_unicode_offset) = if unicode_tail {
            (
                bytes::read_u32_le(data, base + 20)? as usize,
                bytes::read_u32_le(data, base + 24)? as usize,
            )
        } else {
            (0, 0)
        };

        let (net_name, _) = bytes::read_cstr(
            data,
            base + net_name_offset,
            StringEncoding::CodePage,
            size - net_name_offset,
        )?;
        let device_name = if flags.has_valid_device() {
            let (name, _) = bytes::read_cstr(
                data,
                base + device_name_offset,
                StringEncoding::CodePage,
                size - device_name_offset,
            )?;
            Some(name)
        } else {
            None
        };

        let net_name_unicode = if unicode_tail {
            if net_unicode_offset == 0 || net_unicode_offset >= size {
                return Err(Error::InconsistentOffset {
                    offset: base + 20,
                    value: net_unicode_offset as u32,
                });
            }
            let (name, _) = bytes::read_cstr(
                data,
                base + net_unicode_offset,
                StringEncoding::Unicode,
                (size - net_unicode_offset) / 2,
            )?;
            Some(name)
        } else {
            None
        };
        let device_name_unicode = if unicode_tail
            && flags.has_valid_device()
            && device_unicode_offset != 0
        {
            if device_unicode_offset >= size {
                return Err(Error::InconsistentOffset {
                    offset: base + 24,
                    value: device_unicode_offset as u32,
                });
            }
            let (name, _) = bytes::read_cstr(
                data,
                base + device_unicode_offset,
                StringEncoding::Unicode,
                (size - device_unicode_offset) / 2,
            )?;
            Some(name)
        } else {
            None
        };

        Ok(Self {
            net_name,
            device_name,
            network_provider_type,
            net_name_unicode,
            device_name_unicode,
        })
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let device_unicode = if self.device_name_unicode.is_some()
            && (self.net_name_unicode.is_none() || self.device_name.is_none())
        {
            warn!("dropping unicode device name without a unicode tail or device");
            None
        } else {
            self.device_name_unicode.as_deref()
        };
        let unicode_tail = self.net_name_unicode.is_some();
        let header_len: usize = if unicode_tail { 0x1c } else { 0x14 };

        let net = bytes::write_cstr(&self.net_name, StringEncoding::CodePage);
        let device = self
            .device_name
            .as_deref()
            .map(|s| bytes::write_cstr(s, StringEncoding::CodePage));
        let net_unicode = self
            .net_name_unicode
            .as_deref()
            .map(|s| bytes::write_cstr(s, StringEncoding::Unicode));
        let device_unicode = device_unicode.map(|s| bytes::write_cstr(s, StringEncoding::Unicode));

        let mut next = header_len;
        let mut place = |payload: Option<&Vec<u8>>| match payload {
            Some(buffer) => {
                let at = next;
                next += buffer.len();
                at
            }
            None => 0,
        };
        let net_name_offset = place(Some(&net));
        let device_name_offset = place(device.as_ref());
        let net_unicode_offset = place(net_unicode.as_ref());
        let device_unicode_offset = place(device_unicode.as_ref());
        let total = size_u32(next, "CommonNetworkRelativeLink")?;

        let mut out = Vec::with_capacity(next);
        out.write_u32::<LE>(total).unwrap();
        out.write_u32::<LE>(self.flags().bits()).unwrap();
        out.write_u32::<LE>(net_name_offset as u32).unwrap();
        out.write_u32::<LE>(device_name_offset as u32).unwrap();
        out.write_u32::<LE>(self.network_provider_type.unwrap_or(0))
            .unwrap();
        if unicode_tail {
            out.write_u32::<LE>(net_unicode_offset as u32).unwrap();
            out.write_u32::<LE>(device_unicode_offset as u32).unwrap();
        }
        for buffer in [Some(net), device, net_unicode, device_unicode]
            .iter()
            .flatten()
        {
            out.extend_from_slice(buffer);
        }
        Ok(out)
    }
}

bitflags! {
    /// Flags describing which of the optional CommonNetworkRelativeLink
    /// fields are meaningful.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize))]
    pub struct CommonNetworkRelativeLinkFlags: u32 {
        /// The device name offset locates a mapped device name.
        const VALID_DEVICE   = 0x0000_0001;
        /// The network provider type field is meaningful.
        const VALID_NET_TYPE = 0x0000_0002;
    }
}

#[allow(missing_docs)]
impl CommonNetworkRelativeLinkFlags {
    pub fn has_valid_device(&self) -> bool {
        self.contains(Self::VALID_DEVICE)
    }

    pub fn has_valid_net_type(&self) -> bool {
        self.contains(Self::VALID_NET_TYPE)
    }
}

/// A 32-bit, unsigned integer that specifies the type of network provider.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum NetworkProviderType {
    MSNet = 0x0001_0000,
    Smb = 0x0002_0000,
    Netware = 0x0003_0000,
    Vines = 0x0004_0000,
    TenNet = 0x0005_0000,
    Locus = 0x0006_0000,
    SunPCNFS = 0x0007_0000,
    LanStep = 0x0008_0000,
    NineTiles = 0x0009_0000,
    Lantastic = 0x000a_0000,
    As400 = 0x000b_0000,
    FTPNFS = 0x000c_0000,
    PathWorks = 0x000d_0000,
    LifeNet = 0x000e_0000,
    PowerLAN = 0x000f_0000,
    BWNFS = 0x0010_0000,
    Cogent = 0x0011_0000,
    Farallon = 0x0012_0000,
    AppleTalk = 0x0013_0000,
    Intergraph = 0x0014_0000,
    SymfoNet = 0x0015_0000,
    ClearCase = 0x0016_0000,
    Frontier = 0x0017_0000,
    BMC = 0x0018_0000,
    DCE = 0x0019_0000,
    Avid = 0x001a_0000,
    Docuspace = 0x001b_0000,
    Mangosoft = 0x001c_0000,
    Sernet = 0x001d_0000,
    Riverfront1 = 0x001e_0000,
    Riverfront2 = 0x001f_0000,
    Decorb = 0x0020_0000,
    Protstor = 0x0021_0000,
    FjRedir = 0x0022_0000,
    Distinct = 0x0023_0000,
    Twins = 0x0024_0000,
    Rdr2Sample = 0x0025_0000,
    CSC = 0x0026_0000,
    ThreeInOne = 0x0027_0000,
    ExtendNet = 0x0029_0000,
    Stac = 0x002a_0000,
    Foxbat = 0x002b_0000,
    Yahoo = 0x002c_0000,
    Exifs = 0x002d_0000,
    Dav = 0x002e_0000,
    Knoware = 0x002f_0000,
    ObjectDire = 0x0030_0000,
    Masfax = 0x0031_0000,
    HobNfs = 0x0032_0000,
    Shiva = 0x0033_0000,
    Ibmal = 0x0034_0000,
    Lock = 0x0035_0000,
    Termsrv = 0x0036_0000,
    Srt = 0x0037_0000,
    Quincy = 0x0038_0000,
    Openafs = 0x0039_0000,
    Avid1 = 0x003a_0000,
    Dfs = 0x003b_0000,
    Kwnp = 0x003c_0000,
    Zenworks = 0x003d_0000,
    Driveonweb = 0x003e_0000,
    Vmware = 0x003f_0000,
    Rsfx = 0x0040_0000,
    Mfiles = 0x0041_0000,
    MsNfs = 0x0042_0000,
    Google = 0x0043_0000,
}
