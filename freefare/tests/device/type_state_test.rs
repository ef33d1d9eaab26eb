#[path = "../common/mod.rs"]
mod common;

use freefare::device::Device;
use freefare::transport::mock::MockTransport;

#[test]
fn initialize_resets_the_reader() {
    let shared = MockTransport::new().into_shared();
    let boxed: Box<dyn freefare::transport::Transport> = Box::new(shared.clone());
    let device = Device::new_with_transport(boxed).unwrap();
    assert_eq!(shared.borrow().resets, 0);

    let mut initialized = device.initialize().unwrap();
    assert_eq!(shared.borrow().resets, 1);
    assert!(initialized.tags().unwrap().is_empty());
}

#[test]
fn transceive_failures_surface_immediately() {
    let (shared, mut device) = common::shared_device(vec![]);
    shared.borrow_mut().set_transceive_failures(1);
    common::queue(&shared, &[&[0x00]]);

    assert!(device.transceive(&[0x60]).unwrap_err().is_transport());
    // The queued answer was not consumed by the failed exchange
    assert_eq!(device.transceive(&[0x60]).unwrap(), vec![0x00]);
}
