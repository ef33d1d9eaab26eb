use freefare::crypto::{crc8, crc8_finalize, crc8_update};

#[test]
fn published_mad_vectors() {
    let cases = [
        (
            "01010801080108000000000000040003100310021002100000000000001130",
            0x89,
        ),
        (
            "5d0aa9c62ae2bd2df1cdb26ce19df68938da1d91c67632cac6484aa475b746",
            0x05,
        ),
        (
            "3a830de7b0ff7766b3ed0fe5d2555534138a7ab05e5e6abde3fdf3baa30585",
            0x3b,
        ),
    ];
    for (data, expected) in cases {
        assert_eq!(crc8(&hex::decode(data).unwrap()), expected, "{}", data);
    }
}

#[test]
fn incremental_matches_one_shot() {
    let data = hex::decode("0108010801080000").unwrap();
    let state = data.iter().fold(0xC7, |s, b| crc8_update(s, *b));
    assert_eq!(crc8_finalize(state), crc8(&data));
}
