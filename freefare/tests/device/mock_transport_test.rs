#[path = "../common/mod.rs"]
mod common;

use freefare::Error;
use freefare::transport::Transport;
use freefare::transport::mock::MockTransport;

#[test]
fn mock_transport_records_and_answers() {
    let mut m = MockTransport::new();
    m.push_response(vec![0x01]);
    assert_eq!(m.transceive(&[0x30, 0x04]).unwrap(), vec![0x01]);
    assert_eq!(m.sent, vec![vec![0x30, 0x04]]);
    assert_eq!(m.transceive(&[0x30, 0x08]), Err(Error::Timeout));
}

#[test]
fn select_only_known_targets() {
    let mut m = MockTransport::with_targets(vec![common::fixtures::classic_1k_info()]);
    assert!(m.select(&common::fixtures::uid_4()).is_ok());
    assert!(matches!(
        m.select(&common::fixtures::uid_7()),
        Err(Error::Transport(_))
    ));
    m.deselect().unwrap();
    assert!(m.selected.is_none());
}
