#[path = "../common/mod.rs"]
mod common;

use freefare::prelude::*;
use freefare::tag::classic::sector_trailer_block;

const KEY: ClassicKey = [0xFF; 6];

#[test]
fn authenticate_then_read_block() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();

    let data = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
    common::queue(&shared, &[&[], &data]);

    classic.authenticate(&mut device, 4, &KEY, KeyType::KeyA).unwrap();
    assert_eq!(classic.read(&mut device, 4).unwrap().to_vec(), data);

    let sent = shared.borrow().sent.clone();
    assert_eq!(
        hex::encode(&sent[0]),
        "6004ffffffffffff04112233"
    );
    assert_eq!(sent[1], vec![0x30, 0x04]);
}

#[test]
fn access_cache_hits_and_evictions() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();
    let t1 = common::fixtures::trailer([0xFF, 0x07, 0x80]);
    let t2 = common::fixtures::trailer([0x78, 0x77, 0x88]);
    common::queue(&shared, &[&t1, &t2, &t1]);

    classic.get_sector_access_bits(&mut device, 7).unwrap();
    classic.get_sector_access_bits(&mut device, 7).unwrap();
    assert_eq!(shared.borrow().transceive_count(), 1);

    classic.get_sector_access_bits(&mut device, 11).unwrap();
    assert_eq!(shared.borrow().transceive_count(), 2);

    // Sector 7 was evicted by sector 11
    classic.get_sector_access_bits(&mut device, 7).unwrap();
    assert_eq!(shared.borrow().transceive_count(), 3);
}

#[test]
fn authentication_invalidates_access_cache() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();
    let t = common::fixtures::trailer([0xFF, 0x07, 0x80]);
    common::queue(&shared, &[&t, &[]]);

    classic.get_block_access_bits(&mut device, 5).unwrap();
    assert!(classic.cached_block_access_bits().is_some());
    classic.authenticate(&mut device, 8, &KEY, KeyType::KeyB).unwrap();
    assert!(classic.cached_block_access_bits().is_none());
    assert!(classic.cached_sector_access_bits().is_none());
}

#[test]
fn transport_default_permissions() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_4k_info());
    let classic = tag.as_classic_mut().unwrap();
    let t = common::fixtures::trailer([0xFF, 0x07, 0x80]);
    common::queue(&shared, &[&t]);

    for perm in [
        DataPermission::Read,
        DataPermission::Write,
        DataPermission::Increment,
        DataPermission::Decrement,
    ] {
        assert!(classic
            .get_data_block_permission(&mut device, 130, perm, KeyType::KeyA)
            .unwrap());
    }
    let trailer = sector_trailer_block(32).unwrap();
    assert_eq!(trailer, 143);
    assert!(!classic
        .get_trailer_block_permission(&mut device, trailer, TrailerPermission::ReadKeyA, KeyType::KeyA)
        .unwrap());
    assert!(classic
        .get_trailer_block_permission(&mut device, trailer, TrailerPermission::WriteKeyB, KeyType::KeyA)
        .unwrap());
    // One trailer read served both the data block and the trailer lookups
    assert_eq!(shared.borrow().transceive_count(), 1);
}

#[test]
fn permission_queries_check_block_kind() {
    let (_shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();
    assert!(matches!(
        classic.get_data_block_permission(&mut device, 3, DataPermission::Read, KeyType::KeyA),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        classic.get_trailer_block_permission(&mut device, 2, TrailerPermission::ReadKeyB, KeyType::KeyA),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn value_block_workflow() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();
    common::queue(&shared, &[&[], &[], &[]]);

    classic.init_value(&mut device, 9, 1000, 9).unwrap();
    classic.decrement(&mut device, 9, 250).unwrap();
    classic.transfer(&mut device, 9).unwrap();

    let written = shared.borrow().sent[0].clone();
    assert_eq!(
        hex::encode(&written[2..]),
        "e803000017fcffffe803000009f609f6"
    );

    let mut after = written[2..].to_vec();
    after[..4].copy_from_slice(&750i32.to_le_bytes());
    after[4..8].copy_from_slice(&(!750i32).to_le_bytes());
    after[8..12].copy_from_slice(&750i32.to_le_bytes());
    common::queue(&shared, &[&after]);
    assert_eq!(classic.read_value(&mut device, 9).unwrap(), (750, 9));
}

#[test]
fn short_read_is_a_length_error() {
    let (shared, mut device, mut tag) = common::connected_tag(common::fixtures::classic_1k_info());
    let classic = tag.as_classic_mut().unwrap();
    common::queue(&shared, &[&[0x00; 4]]);
    let err = classic.read(&mut device, 1).unwrap_err();
    assert_eq!(err, Error::InvalidLength { expected: 16, actual: 4 });
    assert!(err.is_transport());
}
