//! Creation and verification of (Ethereum) signatures over typed-message
//! digests.
//!
//! Channel open and close authorizations are 65-byte recoverable ECDSA
//! signatures (`r ‖ s ‖ v`, with `v ∈ {27, 28}`) over the digest produced
//! by the typed-message hashing (`"\x19\x01"`-prefixed, domain-scoped).
//! There is no additional message prefix: the digest is signed as-is.
//!
//! Two interchangeable backends exist; [k256] is the default, [secp256k1]
//! binds the C library. Verification never needs a private key, so the
//! engine side only calls [recover_signer].

#[cfg(feature = "k256")]
pub mod k256;
#[cfg(feature = "secp256k1")]
pub mod secp256k1;

#[cfg(not(any(feature = "k256", feature = "secp256k1")))]
mod dummy;

#[cfg(feature = "k256")]
pub use self::k256::{recover_signer, Error, Signer};

#[cfg(all(feature = "secp256k1", not(feature = "k256")))]
pub use self::secp256k1::{recover_signer, Error, Signer};

#[cfg(not(any(feature = "k256", feature = "secp256k1")))]
pub use self::dummy::{recover_signer, Error, Signer};

#[cfg(test)]
mod tests;
