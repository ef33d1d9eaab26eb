// helpers.rs: device setup shared by integration tests

use std::cell::RefCell;
use std::rc::Rc;

use freefare::device::{Device, DeviceBuilder, Initialized};
use freefare::tag::Tag;
use freefare::transport::mock::MockTransport;
use freefare::types::Iso14443aInfo;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Device over a shared mock advertising `targets`; the handle stays
/// inspectable after the device takes ownership.
pub fn shared_device(
    targets: Vec<Iso14443aInfo>,
) -> (Rc<RefCell<MockTransport>>, Device<Initialized>) {
    init_logger();
    let shared = MockTransport::with_targets(targets).into_shared();
    let device = DeviceBuilder::new()
        .with_transport(Box::new(shared.clone()))
        .build()
        .expect("mock device");
    (shared, device)
}

/// Discover the single tag on the mock and connect it.
pub fn connected_tag(
    info: Iso14443aInfo,
) -> (Rc<RefCell<MockTransport>>, Device<Initialized>, Tag) {
    let (shared, mut device) = shared_device(vec![info]);
    let mut tags = device.tags().expect("tag discovery");
    assert_eq!(tags.len(), 1);
    let mut tag = tags.remove(0);
    tag.connect(&mut device).expect("connect");
    (shared, device, tag)
}

pub fn queue(shared: &Rc<RefCell<MockTransport>>, responses: &[&[u8]]) {
    let mut mock = shared.borrow_mut();
    for r in responses {
        mock.push_response(r.to_vec());
    }
}
