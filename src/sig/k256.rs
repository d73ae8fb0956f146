//! Signer using the k256 Rust crate (implementation of ecdsa in Rust).

use crate::eip712::types::{Address, Hash, Signature};
use k256::{
    ecdsa::{
        recoverable,
        signature::{hazmat::PrehashSigner, Signature as k256Signature},
        SigningKey, VerifyingKey,
    },
    elliptic_curve::sec1::ToEncodedPoint,
};
use sha3::{Digest, Keccak256};

pub use k256::ecdsa::Error;

#[derive(Debug)]
pub struct Signer {
    key: SigningKey,
    addr: Address,
}

impl From<VerifyingKey> for Address {
    fn from(key: VerifyingKey) -> Self {
        // Convert the key into an EncodedPoint (on the curve), which has the
        // data we need in bytes [1..]. Then convert that into an array and
        // unwrap. This panics if the bytes representation of EncodedPoint is
        // not 65 bytes, which is unlikely to change in the dependency. If it
        // does we have bigger problems, given that its contents/layout will
        // likely change, too if the length changes.
        let pk_bytes: [u8; 65] = key.to_encoded_point(false).as_bytes().try_into().unwrap();

        // Throw away the first byte, which is not part of the public key. It
        // is added by the uncompressed SEC1 encoding.
        let hash: [u8; 32] = Keccak256::digest(&pk_bytes[1..]).into();

        let mut addr = Address([0; 20]);
        addr.0.copy_from_slice(&hash[32 - 20..]);
        addr
    }
}

impl Signer {
    pub fn new<R: rand::Rng + rand::CryptoRng>(rng: &mut R) -> Self {
        let key = SigningKey::random(rng);
        let addr = key.verifying_key().into();
        Self { key, addr }
    }

    /// Load a signer from raw secret key bytes. Fails on out-of-range keys.
    pub fn from_bytes(sk: &[u8; 32]) -> Result<Self, Error> {
        let key = SigningKey::from_bytes(sk)?;
        let addr = key.verifying_key().into();
        Ok(Self { key, addr })
    }

    pub fn address(&self) -> Address {
        self.addr
    }

    /// Sign a typed-message digest with this key.
    pub fn sign(&self, digest: Hash) -> Signature {
        let sig: recoverable::Signature = self.key.sign_prehash(&digest.0).unwrap();

        // Luckily for us, this Signature type already has the format we need:
        // - 65 bytes containing r, s and v in this order
        //
        // But we still have to add 27 to v for the signature to be valid in
        // the EVM.
        let mut sig_bytes: [u8; 65] = sig.as_bytes().try_into().expect(
            "Unreachable: Signature size doesn't match, something big must have changed in the dependency",
        );
        debug_assert!(sig_bytes[32] & 0x80 == 0);
        sig_bytes[64] += 27;

        Signature(sig_bytes)
    }
}

/// Recover the signing address from a typed-message digest and a signature.
///
/// `digest` is the same hash given to [Signer::sign]. Rejects signatures
/// whose recovery byte is not in the 27-offset form.
pub fn recover_signer(digest: Hash, eth_sig: Signature) -> Result<Address, Error> {
    // Undo adding the 27, to go back to the format expected below. A `v`
    // outside {27, 28} never came from a conforming signer.
    if eth_sig.0[64] != 27 && eth_sig.0[64] != 28 {
        return Err(Error::new());
    }
    let mut sig_bytes: [u8; 65] = eth_sig.0;
    sig_bytes[64] -= 27;

    let sig = recoverable::Signature::from_bytes(&sig_bytes)?;

    let verifying_key = sig.recover_verifying_key_from_digest_bytes(&digest.0.into())?;
    Ok(verifying_key.into())
}
