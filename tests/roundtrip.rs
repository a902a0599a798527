#[allow(unused)]
use log::{debug, info, trace, warn};

use shlink::*;

fn init_logger() {
    let _ = pretty_env_logger::try_init();
}

const CLSID_46: [u8; 16] = [
    0x01, 0x14, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x46,
];

/// A 76-byte header with the given raw link flags, the classic CLSID and
/// every other field zero.
fn header_bytes(link_flags: u32) -> Vec<u8> {
    let mut data = vec![0u8; HEADER_LEN];
    data[0] = 0x4c;
    data[4..20].copy_from_slice(&CLSID_46);
    data[20..24].copy_from_slice(&link_flags.to_le_bytes());
    data
}

#[test]
fn minimal_header_only() {
    init_logger();

    let data = header_bytes(0);
    let link = ShellLink::parse(&data).unwrap();
    debug!("{link:#?}");

    assert_eq!(link.header().link_flags(), LinkFlags::empty());
    assert_eq!(link.header().file_attributes(), FileAttributeFlags::empty());
    assert!(link.header().creation_time().is_unset());
    assert!(link.link_target_id_list().is_none());
    assert!(link.link_info().is_none());
    assert!(link.string_data().is_none());
    assert!(link.extra_data().is_none());

    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn single_item_id_list_round_trips() {
    init_logger();

    let mut data = header_bytes(0x01);
    data.extend_from_slice(&[0x0a, 0x00, 0x06, 0x00, 0xaa, 0xbb, 0xcc, 0xdd, 0x00, 0x00]);

    let link = ShellLink::parse(&data).unwrap();
    let list = link.link_target_id_list().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list.items()[0].data(), &vec![0xaa, 0xbb, 0xcc, 0xdd]);

    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn link_info_with_local_base_path_round_trips() {
    init_logger();

    let mut data = header_bytes(0x02);
    let volume_size = 0x10u32 + 5; // "DATA" plus its terminator
    let total = 0x1c + volume_size + 4; // plus "C:\" and its terminator
    for field in [total, 0x1c, 1, 0x1c, 0x1c + volume_size, 0, 0] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    for field in [volume_size, 3, 0x1122_3344, 0x10] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(b"DATA\0");
    data.extend_from_slice(b"C:\\\0");

    let link = ShellLink::parse(&data).unwrap();
    let info = link.link_info().unwrap();
    assert_eq!(info.flags(), LinkInfoFlags::VOLUME_ID_AND_LOCAL_BASE_PATH);
    let volume = info.volume_id().unwrap();
    assert_eq!(volume.drive_type(), DriveType::DriveFixed);
    assert_eq!(volume.drive_serial_number(), 0x1122_3344);
    assert_eq!(volume.volume_label(), "DATA");
    assert_eq!(info.local_base_path(), Some("C:\\"));
    assert_eq!(info.common_path_suffix(), None);

    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn unicode_name_string_parses() {
    init_logger();

    let mut data = header_bytes(0x84); // IsUnicode | HasName
    data.extend_from_slice(&[0x03, 0x00, 0x41, 0x00, 0x42, 0x00, 0x43, 0x00]);

    let link = ShellLink::parse(&data).unwrap();
    assert_eq!(link.name(), Some("ABC"));
    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn hotkey_wire_bytes_and_rendering() {
    init_logger();

    let mut data = header_bytes(0);
    data[64] = 0x74;
    data[65] = 0x03;

    let link = ShellLink::parse(&data).unwrap();
    assert_eq!(link.header().hotkey().to_string(), "SHIFT+CTRL / F5");
    assert_eq!(link.header().hotkey().key(), Some(HotkeyKey::F5));
    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn timestamps_convert_with_the_reference_epoch() {
    init_logger();

    let ticks = 0x01ca_0000_0000_0000u64;
    let seconds = ticks_to_utc_seconds(ticks);
    assert_eq!(ticks_to_utc_seconds(utc_seconds_to_ticks(seconds)), seconds);

    let time = FileTime::from_unix_seconds(1_234_567_890);
    assert_eq!(time.to_unix_seconds(), 1_234_567_890);

    // the wire keeps raw ticks, so odd tick counts survive untouched
    let mut link = ShellLink::default();
    link.header_mut().set_write_time(FileTime::from(ticks + 1));
    let parsed = ShellLink::parse(&link.serialize().unwrap()).unwrap();
    assert_eq!(parsed.header().write_time().ticks(), ticks + 1);
}

#[test]
fn default_link_is_minimal_and_stable() {
    init_logger();

    let link = ShellLink::default();
    let data = link.serialize().unwrap();
    assert_eq!(data.len(), HEADER_LEN);

    let parsed = ShellLink::parse(&data).unwrap();
    assert_eq!(parsed, link);
    assert_eq!(parsed.header().link_flags(), LinkFlags::IS_UNICODE);
    assert_eq!(parsed.header().show_command(), ShowCommand::ShowNormal);
    assert_eq!(parsed.header().link_clsid(), CLSID_SHELL_LINK_VARIANT);
}

#[test]
fn full_feature_link_round_trips_both_ways() {
    init_logger();

    let mut link = ShellLink::default();
    link.header_mut()
        .set_file_attributes(FileAttributeFlags::FILE_ATTRIBUTE_ARCHIVE);
    link.header_mut()
        .set_creation_time(FileTime::from(0x01c9_1515_f2ee_e9d0));
    link.header_mut().set_show_command(ShowCommand::ShowMaximized);
    link.header_mut().set_icon_index(-3);
    link.header_mut()
        .set_hotkey(HotkeyFlags::new(HotkeyKey::KeyK, HotkeyModifiers::HOTKEYF_ALT));

    link.set_link_target_id_list(Some(LinkTargetIdList::new(vec![
        ItemId::new(vec![0x1f, 0x50, 0xe0, 0x4f]),
        ItemId::new(vec![0x2e, 0x00]),
    ])));

    let mut volume = VolumeId::new(DriveType::DriveFixed, 0xdead_beef, "SYSTEM");
    volume.set_volume_label_unicode(Some("SYSTEM".to_string()));
    let mut share = CommonNetworkRelativeLink::new("\\\\files\\public");
    share.set_device_name(Some("Z:".to_string()));
    share.set_network_provider_type(Some(NetworkProviderType::Smb as u32));
    share.set_net_name_unicode(Some("\\\\files\\public".to_string()));
    share.set_device_name_unicode(Some("Z:".to_string()));
    let mut info = LinkInfo::default();
    info.set_local_target(volume, "C:\\share\\docs");
    info.set_network_target(share, "docs");
    info.set_local_base_path_unicode(Some("C:\\share\\docs".to_string()));
    info.set_common_path_suffix_unicode(Some("docs".to_string()));
    link.set_link_info(Some(info));

    link.set_name(Some("Quarterly report".to_string()));
    link.set_relative_path(Some(".\\docs\\report.docx".to_string()));
    link.set_working_dir(Some("C:\\share".to_string()));
    link.set_arguments(Some("--readonly".to_string()));
    link.set_icon_location(Some("%SystemRoot%\\system32\\shell32.dll".to_string()));

    let mut extra = Vec::new();
    extra.extend_from_slice(&12u32.to_le_bytes());
    extra.extend_from_slice(&0xa000_0001u32.to_le_bytes());
    extra.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    extra.extend_from_slice(&[0, 0, 0, 0]);
    link.set_extra_data(Some(ExtraData::new(extra.clone())));

    let data = link.serialize().unwrap();
    let parsed = ShellLink::parse(&data).unwrap();
    debug!("{parsed:#?}");
    assert_eq!(parsed, link);
    assert_eq!(parsed.extra_data().unwrap().as_bytes(), &extra[..]);
    assert_eq!(parsed.extra_data().unwrap().blocks().count(), 2);

    // a serialized buffer survives parse -> serialize byte for byte
    assert_eq!(parsed.serialize().unwrap(), data);
}

#[test]
fn code_page_strings_round_trip_without_the_unicode_bit() {
    init_logger();

    let mut link = ShellLink::default();
    link.header_mut()
        .update_link_flags(LinkFlags::IS_UNICODE, false);
    link.set_name(Some("Ansi name".to_string()));
    link.set_arguments(Some("".to_string()));

    let data = link.serialize().unwrap();
    let parsed = ShellLink::parse(&data).unwrap();
    assert_eq!(parsed, link);
    assert_eq!(parsed.name(), Some("Ansi name"));
    assert_eq!(parsed.arguments(), Some(""));
}

#[test]
fn presence_bits_follow_the_attached_sections() {
    init_logger();

    let mut link = ShellLink::default();
    link.set_name(Some("x".to_string()));
    assert!(link.header().link_flags().contains(LinkFlags::HAS_NAME));
    link.set_name(None);
    assert!(!link.header().link_flags().contains(LinkFlags::HAS_NAME));
    assert!(link.string_data().is_none());

    link.set_link_info(Some(LinkInfo::default()));
    assert!(link.header().link_flags().contains(LinkFlags::HAS_LINK_INFO));
    let parsed = ShellLink::parse(&link.serialize().unwrap()).unwrap();
    assert!(parsed.link_info().is_some());
    assert!(parsed
        .header()
        .link_flags()
        .contains(LinkFlags::HAS_LINK_INFO));
}

#[test]
fn trailing_bytes_are_preserved_verbatim() {
    init_logger();

    let mut data = header_bytes(0);
    data.extend_from_slice(&[0x99, 0x98, 0x97]);

    let link = ShellLink::parse(&data).unwrap();
    assert_eq!(link.extra_data().unwrap().as_bytes(), &[0x99, 0x98, 0x97]);
    assert_eq!(link.serialize().unwrap(), data);
}

#[test]
fn parse_errors_carry_offsets() {
    init_logger();

    assert!(matches!(
        ShellLink::parse(&[0u8; 10]),
        Err(Error::Truncated { offset: 10 })
    ));

    let mut data = header_bytes(0x01);
    data.extend_from_slice(&[0x05, 0x00, 0x01, 0x00, 0x00, 0x00]);
    assert!(matches!(
        ShellLink::parse(&data),
        Err(Error::BadItemSize { offset: 78, size: 1 })
    ));

    let mut data = header_bytes(0x02);
    for field in [0x1cu32, 0x1c, 4, 0, 0, 0, 0] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    assert!(matches!(
        ShellLink::parse(&data),
        Err(Error::BadFlags { offset: 84, value: 4 })
    ));

    let mut data = header_bytes(0x84);
    data.extend_from_slice(&[0x01, 0x00, 0x00, 0xd8]);
    assert!(matches!(
        ShellLink::parse(&data),
        Err(Error::BadEncoding { offset: 78 })
    ));
}

#[test]
fn write_errors_are_bad_clsid_or_too_large() {
    init_logger();

    let mut link = ShellLink::default();
    link.header_mut()
        .set_link_clsid(Guid::from_wire_bytes([0u8; 16]));
    assert!(matches!(link.serialize(), Err(Error::BadClsid(_))));

    let mut link = ShellLink::default();
    link.set_name(Some("a".repeat(70_000)));
    assert!(matches!(
        link.serialize(),
        Err(Error::TooLarge { what: "StringData" })
    ));
}
