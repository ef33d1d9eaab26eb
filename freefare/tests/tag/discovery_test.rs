#[path = "../common/mod.rs"]
mod common;

use freefare::prelude::*;

#[test]
fn discovery_builds_one_tag_per_supported_target() {
    let (_shared, mut device) = common::shared_device(vec![
        common::fixtures::classic_1k_info(),
        common::fixtures::unknown_info(),
        common::fixtures::ultralight_info(),
        common::fixtures::desfire_info(),
    ]);

    let tags = device.tags().unwrap();
    let kinds: Vec<TagKind> = tags.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![TagKind::Classic1k, TagKind::Ultralight, TagKind::Desfire4k]
    );
    assert_eq!(tags[1].friendly_name(), "Mifare UltraLight");
    assert_eq!(tags[1].uid_hex(), "04526b1a312580");
    assert!(tags.iter().all(|t| !t.is_active()));
}

#[test]
fn connect_selects_and_disconnect_deselects() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_4k_info());
    assert!(tag.is_active());
    assert_eq!(
        shared.borrow().selected.as_ref(),
        Some(&common::fixtures::uid_4())
    );

    tag.disconnect(&mut device).unwrap();
    assert!(!tag.is_active());
    assert!(shared.borrow().selected.is_none());

    assert!(matches!(
        tag.disconnect(&mut device),
        Err(Error::WrongState { .. })
    ));
}

#[test]
fn wrong_variant_operations_are_refused() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::desfire_info());

    assert!(matches!(
        tag.as_classic_mut(),
        Err(Error::WrongDeviceType { .. })
    ));
    assert!(matches!(
        tag.as_ultralight_mut(),
        Err(Error::WrongDeviceType { .. })
    ));
    // Nothing went out on the wire
    assert_eq!(shared.borrow().transceive_count(), 0);

    let desfire = tag.as_desfire_mut().unwrap();
    common::queue(&shared, &[&[0x00]]);
    desfire.format_picc(&mut device).unwrap();
}

#[test]
fn builder_without_transport_fails() {
    assert!(matches!(
        DeviceBuilder::new().build(),
        Err(Error::DeviceNotFound)
    ));
}
