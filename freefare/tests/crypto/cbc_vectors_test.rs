use freefare::crypto::{Direction, DesfireKey, cbc_transform};
use proptest::prelude::*;

fn des_key(h: &str) -> DesfireKey {
    DesfireKey::des_with_version(hex::decode(h).unwrap().try_into().unwrap())
}

#[test]
fn des_single_block_vector() {
    let key = des_key("133457799bbcdff1");
    let mut block = hex::decode("0123456789abcdef").unwrap();
    let mut iv = [0u8; 8];
    cbc_transform(&key, &mut block, &mut iv, Direction::Send).unwrap();
    assert_eq!(hex::encode(&block), "85e813540f0ab405");
}

#[test]
fn send_direction_is_standard_cbc_encryption() {
    // FIPS 81 CBC example
    let key = des_key("0123456789abcdef");
    let mut data = b"Now is the time for all ".to_vec();
    let mut iv: [u8; 8] = hex::decode("1234567890abcdef").unwrap().try_into().unwrap();
    cbc_transform(&key, &mut data, &mut iv, Direction::Send).unwrap();
    assert_eq!(
        hex::encode(&data),
        "e5c7cdde872bf27c43e934008c389c0f683788499a7c05f6"
    );
    assert_eq!(hex::encode(iv), "683788499a7c05f6");
}

#[test]
fn receive_direction_is_standard_cbc_decryption() {
    let key = des_key("0123456789abcdef");
    let mut data = hex::decode("e5c7cdde872bf27c43e934008c389c0f683788499a7c05f6").unwrap();
    let mut iv: [u8; 8] = hex::decode("1234567890abcdef").unwrap().try_into().unwrap();
    cbc_transform(&key, &mut data, &mut iv, Direction::Receive).unwrap();
    assert_eq!(data, b"Now is the time for all ");
    assert_eq!(hex::encode(iv), "683788499a7c05f6");
}

#[test]
fn triple_des_with_equal_halves_matches_des() {
    let single = des_key("0123456789abcdef");
    let double = DesfireKey::triple_des_with_version(
        hex::decode("0123456789abcdef0123456789abcdef")
            .unwrap()
            .try_into()
            .unwrap(),
    );
    let mut a = b"Now is t".to_vec();
    let mut b = a.clone();
    cbc_transform(&single, &mut a, &mut [0u8; 8], Direction::Send).unwrap();
    cbc_transform(&double, &mut b, &mut [0u8; 8], Direction::Send).unwrap();
    assert_eq!(a, b);
    assert_eq!(hex::encode(&a), "3fa40e8a984d4815");
}

proptest! {
    #[test]
    fn triple_des_roundtrip(key in any::<[u8; 16]>(), blocks in 1usize..6, seed in any::<u8>()) {
        let key = DesfireKey::triple_des(key);
        let original: Vec<u8> = (0..blocks * 8).map(|i| (i as u8).wrapping_mul(seed)).collect();
        let mut data = original.clone();
        cbc_transform(&key, &mut data, &mut [0u8; 8], Direction::Send).unwrap();
        cbc_transform(&key, &mut data, &mut [0u8; 8], Direction::Receive).unwrap();
        prop_assert_eq!(data, original);
    }
}
