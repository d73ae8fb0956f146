//! Keccak-256 hashing of typed messages and the domain-scoped signing digest.
//!
//! The signable digest of a typed message is
//!
//! ```text
//! keccak256("\x19\x01" ‖ domainSeparator ‖ hashStruct(message))
//! hashStruct(m) = keccak256(typeHash ‖ enc(m))
//! ```
//!
//! where `enc(m)` is the one-slot-per-field encoding produced by
//! [to_writer][super::to_writer] and `typeHash` is the Keccak-256 of the
//! schema's type string.

use super::{
    to_writer,
    types::Hash,
    Error, Writer,
};

use serde::Serialize;
use sha3::{
    digest::{core_api::CoreWrapper, Output},
    Digest, Keccak256, Keccak256Core,
};

pub struct Keccak256Writer {
    hasher: CoreWrapper<Keccak256Core>,
}

impl Default for Keccak256Writer {
    fn default() -> Self {
        Self {
            hasher: Keccak256::new(),
        }
    }
}

impl Writer for Keccak256Writer {
    fn write(&mut self, slot: &[u8]) {
        self.hasher.update(slot);
    }
}

impl Keccak256Writer {
    pub fn finalize(self) -> Output<Keccak256> {
        self.hasher.finalize()
    }
}

/// Hash the slot encoding of `value`, without a type hash prefix.
pub fn to_hash<T>(value: &T) -> Result<Hash, Error>
where
    T: Serialize,
{
    let mut writer = Keccak256Writer::default();
    to_writer(value, &mut writer)?;
    Ok(Hash(writer.finalize().into()))
}

/// Keccak-256 of a schema type string, e.g.
/// `"EIP712ChannelClose(uint256 chainId,…)"`.
pub fn type_hash(type_string: &str) -> Hash {
    Hash(Keccak256::digest(type_string.as_bytes()).into())
}

/// `hashStruct`: the type hash followed by one slot per field, hashed.
pub fn hash_struct<T>(type_hash: Hash, value: &T) -> Result<Hash, Error>
where
    T: Serialize,
{
    let mut writer = Keccak256Writer::default();
    writer.write(&type_hash.0);
    to_writer(value, &mut writer)?;
    Ok(Hash(writer.finalize().into()))
}

/// The signing domain a typed message is scoped to.
///
/// The channel engine's messages all use [Domain::XBR]. Note that this
/// domain schema carries only a name and a version; chain id and verifying
/// contract are fields of the channel messages themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    pub version: &'static str,
}

impl Domain {
    const TYPE: &'static str = "EIP712Domain(string name,string version)";

    pub const XBR: Domain = Domain {
        name: "XBR",
        version: "1",
    };

    /// `hashStruct` of the domain itself. String members are represented by
    /// their Keccak-256 hash.
    pub fn separator(&self) -> Hash {
        let mut hasher = Keccak256::new();
        hasher.update(type_hash(Self::TYPE).0);
        hasher.update(Keccak256::digest(self.name.as_bytes()));
        hasher.update(Keccak256::digest(self.version.as_bytes()));
        Hash(hasher.finalize().into())
    }
}

/// The digest both parties sign: `keccak256("\x19\x01" ‖ separator ‖
/// hashStruct(value))`.
///
/// This is the hash handed to [sig][crate::sig] for signing and recovery.
/// There is no `"\x19Ethereum Signed Message"` prefix on top; that prefix
/// belongs to personal-message signatures, which this protocol does not use.
pub fn typed_data_hash<T>(domain: &Domain, type_hash: Hash, value: &T) -> Result<Hash, Error>
where
    T: Serialize,
{
    let struct_hash = hash_struct(type_hash, value)?;

    // Packed encoding => We can't use the serializer
    let mut hasher = Keccak256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain.separator().0);
    hasher.update(struct_hash.0);
    Ok(Hash(hasher.finalize().into()))
}
