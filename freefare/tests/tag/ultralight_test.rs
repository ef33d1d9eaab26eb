#[path = "../common/mod.rs"]
mod common;

use freefare::prelude::*;

#[test]
fn sequential_reads_share_one_transaction() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::ultralight_info());
    let ul = tag.as_ultralight_mut().unwrap();
    common::queue(
        &shared,
        &[
            &common::fixtures::ultralight_window(4),
            &common::fixtures::ultralight_window(8),
        ],
    );

    for page in 4..12u8 {
        assert_eq!(ul.read(&mut device, page).unwrap(), [page; 4]);
    }
    assert_eq!(shared.borrow().transceive_count(), 2);
}

#[test]
fn read_window_wraps_past_last_page() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::ultralight_info());
    let ul = tag.as_ultralight_mut().unwrap();
    common::queue(&shared, &[&common::fixtures::ultralight_window(15)]);

    ul.read(&mut device, 15).unwrap();
    ul.read(&mut device, 0).unwrap();
    assert_eq!(shared.borrow().transceive_count(), 1);
    assert_eq!(shared.borrow().sent[0], vec![0x30, 0x0F]);
}

#[test]
fn write_then_read_goes_back_to_the_card() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::ultralight_info());
    let ul = tag.as_ultralight_mut().unwrap();
    let mut updated = common::fixtures::ultralight_window(1);
    updated[4..8].copy_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
    common::queue(
        &shared,
        &[&common::fixtures::ultralight_window(0), &[], &updated],
    );

    ul.read(&mut device, 1).unwrap();
    ul.write(&mut device, 2, &[0xCA, 0xFE, 0xBA, 0xBE]).unwrap();
    assert_eq!(ul.read(&mut device, 1).unwrap(), [1; 4]);
    assert_eq!(ul.read(&mut device, 2).unwrap(), [0xCA, 0xFE, 0xBA, 0xBE]);
    assert_eq!(shared.borrow().transceive_count(), 3);
}

#[test]
fn disconnect_drops_the_cache() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::ultralight_info());
    common::queue(&shared, &[&common::fixtures::ultralight_window(0)]);
    tag.as_ultralight_mut().unwrap().read(&mut device, 0).unwrap();

    tag.disconnect(&mut device).unwrap();
    tag.connect(&mut device).unwrap();
    assert!(!tag.as_ultralight().unwrap().is_page_cached(0));
}
