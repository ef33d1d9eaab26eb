#[path = "../common/mod.rs"]
mod common;

use freefare::prelude::*;
use freefare::tag::desfire::SessionState;
use freefare::test_support::DesfireCardSim;

fn sim_device(key: &DesfireKey) -> (Device<Initialized>, Tag) {
    common::init_logger();
    let rnd_b: [u8; 8] = hex::decode("f1e2d3c4b5a69788")
        .unwrap()
        .try_into()
        .unwrap();
    let sim = DesfireCardSim::new(key.clone(), rnd_b);
    let mut device = DeviceBuilder::new()
        .with_transport(Box::new(sim))
        .build()
        .unwrap();
    let mut tag = device.tags().unwrap().remove(0);
    tag.connect(&mut device).unwrap();
    (device, tag)
}

#[test]
fn authenticate_with_picc_master_key() {
    let key = DesfireKey::des([0x00; 8]);
    let (mut device, mut tag) = sim_device(&key);
    let desfire = tag.as_desfire_mut().unwrap();

    desfire.authenticate(&mut device, 0, &key).unwrap();
    assert_eq!(desfire.authenticated_key_no(), Some(0));
    let session = desfire.session_key().unwrap();
    assert_eq!(&session.as_bytes()[4..8], &[0xF1, 0xE2, 0xD3, 0xC4]);
}

#[test]
fn failed_authentication_returns_to_idle() {
    let key = DesfireKey::triple_des(*b"AAAAAAAABBBBBBBB");
    let (mut device, mut tag) = sim_device(&key);
    let desfire = tag.as_desfire_mut().unwrap();

    let wrong = DesfireKey::triple_des(*b"BBBBBBBBAAAAAAAA");
    assert!(matches!(
        desfire.authenticate(&mut device, 1, &wrong),
        Err(Error::Card { status: 0xAE })
    ));
    assert_eq!(desfire.session_state(), &SessionState::Idle);
    assert_eq!(desfire.last_picc_error(), 0xAE);
    assert!(desfire.last_pcd_error().is_none());

    desfire.authenticate(&mut device, 1, &key).unwrap();
    assert_eq!(desfire.last_picc_error(), 0x00);
}

#[test]
fn application_from_mad_aid() {
    let key = DesfireKey::des([0x00; 8]);
    let (mut device, mut tag) = sim_device(&key);
    let desfire = tag.as_desfire_mut().unwrap();

    let aid = DesfireAid::from_mad_aid(MadAid::new(0x12, 0x34), 5).unwrap();
    desfire.create_application(&mut device, aid, 0x0F, 2).unwrap();
    desfire.select_application(&mut device, aid).unwrap();
    assert_eq!(desfire.selected_application(), Some(aid));
    assert_eq!(aid.as_bytes(), &[0xF1, 0x23, 0x45]);
}

#[test]
fn disconnect_forgets_session() {
    let key = DesfireKey::des([0x00; 8]);
    let (mut device, mut tag) = sim_device(&key);
    tag.as_desfire_mut()
        .unwrap()
        .authenticate(&mut device, 0, &key)
        .unwrap();

    tag.disconnect(&mut device).unwrap();
    let desfire = tag.as_desfire().unwrap();
    assert!(desfire.session_key().is_none());
    assert!(desfire.selected_application().is_none());
}
