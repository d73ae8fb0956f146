use super::*;
use super::types::{Address, Bytes16, Hash, U256};

use core::fmt::Debug;
use hex::FromHex;
use serde::Serialize;

struct Slot<'a>(&'a [u8]);

impl<'a> Debug for Slot<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for b in self.0 {
            f.write_fmt(format_args!("{:02x}", b))?;
        }
        Ok(())
    }
}

impl<'a> PartialEq for Slot<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

struct AssertWriter<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    expected_iter: I,
}

impl<'a, I> Writer for AssertWriter<'a, I>
where
    I: Iterator<Item = &'a str>,
{
    fn write(&mut self, slot: &[u8]) {
        match self.expected_iter.next() {
            Some(expected) => {
                assert_eq!(
                    expected.len(),
                    64,
                    "The expected input must be grouped into slots of 32 bytes as hex, without 0x."
                );
                let expected = <[u8; 32]>::from_hex(expected).unwrap();
                assert_eq!(
                    Slot(slot),
                    Slot(expected.as_slice()),
                    "slot did not match the expected value"
                );
            }
            None => {
                panic!("Expected end of data, got {:?}", Slot(slot));
            }
        }
    }
}

fn serialize_and_compare<T>(value: &T, expected: &str)
where
    T: Serialize,
{
    let mut writer = AssertWriter {
        expected_iter: expected
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty()),
    };
    to_writer(value, &mut writer).unwrap();
    assert!(
        writer.expected_iter.next().is_none(),
        "serializer produced fewer slots than expected"
    );
}

fn hash_hex(h: Hash) -> alloc::string::String {
    use hex::ToHex;
    h.0.encode_hex()
}

#[test]
fn u32_right_aligned() {
    let d: u32 = 13;

    let expected = "
    000000000000000000000000000000000000000000000000000000000000000d
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn bool_as_uint() {
    serialize_and_compare(
        &true,
        "0000000000000000000000000000000000000000000000000000000000000001",
    );
    serialize_and_compare(
        &false,
        "0000000000000000000000000000000000000000000000000000000000000000",
    );
}

#[test]
fn address_right_aligned() {
    let d = Address(<[u8; 20]>::from_hex("5b38da6a701c568545dcfcb03fcb875f56beddc4").unwrap());

    let expected = "
    0000000000000000000000005b38da6a701c568545dcfcb03fcb875f56beddc4
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn bytes16_left_aligned() {
    let d = Bytes16(<[u8; 16]>::from_hex("aabbccddeeff00112233445566778899").unwrap());

    // 16 data bytes, then 16 zero bytes of padding.
    let expected = "
    aabbccddeeff0011223344556677889900000000000000000000000000000000
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn u256_full_slot() {
    // 123 * 10^18
    let d = U256::from(123u64) * U256::exp10(18);

    let expected = "
    000000000000000000000000000000000000000000000006aaf7c8516d0c0000
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn struct_one_slot_per_field() {
    #[derive(Serialize)]
    struct Example {
        seq: u32,
        who: Address,
        oid: Bytes16,
        fin: bool,
    }

    let d = Example {
        seq: 0x1337,
        who: Address([0x11; 20]),
        oid: Bytes16([0x22; 16]),
        fin: true,
    };

    let expected = "
    0000000000000000000000000000000000000000000000000000000000001337
    0000000000000000000000001111111111111111111111111111111111111111
    2222222222222222222222222222222222220000000000000000000000000000
    0000000000000000000000000000000000000000000000000000000000000001
    ";
    serialize_and_compare(&d, expected);
}

#[test]
fn string_rejected() {
    #[derive(Serialize)]
    struct HasString {
        name: &'static str,
    }

    struct NullWriter;
    impl Writer for NullWriter {
        fn write(&mut self, _: &[u8]) {}
    }

    let err = to_writer(&HasString { name: "XBR" }, &mut NullWriter).unwrap_err();
    assert_eq!(err, Error::TypeNotRepresentable("str"));
}

#[test]
fn domain_type_hash() {
    // keccak256("EIP712Domain(string name,string version)")
    assert_eq!(
        hash_hex(type_hash("EIP712Domain(string name,string version)")),
        "b03948446334eb9b2196d5eb166f69b9d49403eb4a12f36de8d3f9f3cb8e15c3"
    );
}

#[test]
fn xbr_domain_separator() {
    assert_eq!(
        hash_hex(Domain::XBR.separator()),
        "6929f68fd2da453efae5e9c70a5e5d2d4f8286a9209a4a62641f299ca8ffb0e4"
    );
}

#[test]
fn hash_struct_prepends_type_hash() {
    // hash_struct(th, v) must equal keccak(th ‖ enc(v)); cross-check via the
    // plain writer.
    use sha3::{Digest, Keccak256};

    let th = type_hash("Probe(uint32 x)");
    let value: u32 = 42;

    let expected = {
        let mut hasher = Keccak256::new();
        hasher.update(th.0);
        let mut slot = [0u8; 32];
        slot[31] = 42;
        hasher.update(slot);
        Hash(hasher.finalize().into())
    };

    assert_eq!(hash_struct(th, &value).unwrap(), expected);
}
