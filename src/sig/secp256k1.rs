//! Signer binding libsecp256k1 through the secp256k1 crate.

use crate::eip712::types::{Address, Hash, Signature};
use secp256k1::{
    self,
    ecdsa::{RecoverableSignature, RecoveryId},
    All, Message, PublicKey, Secp256k1, SecretKey, ThirtyTwoByteHash,
};
use sha3::{Digest, Keccak256};

pub use secp256k1::Error;

impl ThirtyTwoByteHash for Hash {
    fn into_32(self) -> [u8; 32] {
        self.0
    }
}

impl From<PublicKey> for Address {
    fn from(pk: PublicKey) -> Self {
        // Throw away the first byte, which is not part of the public key. It
        // is added by serialize_uncompressed due to the encoding used.
        let hash: [u8; 32] = Keccak256::digest(&pk.serialize_uncompressed()[1..]).into();

        let mut addr = Address([0; 20]);
        addr.0.copy_from_slice(&hash[32 - 20..]);
        addr
    }
}

pub struct Signer {
    secp: Secp256k1<All>,
    key: SecretKey,
    addr: Address,
}

impl core::fmt::Debug for Signer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print the secret key.
        f.debug_struct("Signer").field("addr", &self.addr).finish()
    }
}

impl Signer {
    pub fn new<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let secp = Secp256k1::new();
        let (key, pk) = secp.generate_keypair(rng);
        Self {
            secp,
            key,
            addr: pk.into(),
        }
    }

    /// Load a signer from raw secret key bytes. Fails on out-of-range keys.
    pub fn from_bytes(sk: &[u8; 32]) -> Result<Self, Error> {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(sk)?;
        let addr = PublicKey::from_secret_key(&secp, &key).into();
        Ok(Self { secp, key, addr })
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Sign a typed-message digest with this key.
    pub fn sign(&self, digest: Hash) -> Signature {
        // We have to use sign_ecdsa_recoverable because the verifying side
        // must be able to recover the address. This gives us the additional
        // information needed for v.
        let sig = self
            .secp
            .sign_ecdsa_recoverable(&Message::from(digest), &self.key);

        let (v, rs) = sig.serialize_compact();

        // [EIP-2](https://eips.ethereum.org/EIPS/eip-2) makes all signatures
        // with a non-canonical solution (s starts with the bit 1) invalid.
        // The library already produces canonical signatures, this
        // debug_assert is just to fail early if that changes at some point.
        debug_assert!(rs[32] & 0x80 == 0);

        // According to [EIP-2098](https://eips.ethereum.org/EIPS/eip-2098),
        // the yParity (v) is offset by 27 so the value does not collide with
        // other binary prefixes used in Bitcoin. Ethereum just kept this
        // offset.
        let v: u8 = 27 + v.to_i32() as u8;

        Signature::new(&rs, v)
    }
}

/// Recover the signing address from a typed-message digest and a signature.
///
/// `digest` is the same hash given to [Signer::sign]. Rejects signatures
/// whose recovery byte is not in the 27-offset form.
pub fn recover_signer(digest: Hash, eth_sig: Signature) -> Result<Address, Error> {
    let secp = Secp256k1::verification_only();

    if eth_sig.0[64] != 27 && eth_sig.0[64] != 28 {
        return Err(Error::InvalidSignature);
    }
    let rs = &eth_sig.0[..64];
    let v = eth_sig.0[64] - 27;

    let recid = RecoveryId::from_i32(v.into())?;
    let sig = RecoverableSignature::from_compact(rs, recid)?;

    let pk = secp.recover_ecdsa(&Message::from(digest), &sig)?;

    Ok(pk.into())
}
