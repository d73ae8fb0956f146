use crate::eip712::types::{Hash, Signature};
use hex::{FromHex, ToHex};
use rand::{rngs::StdRng, SeedableRng};

// Test keys of the deterministic development accounts; never use these for
// anything real.
const ACTOR_KEY: &str = "395df67f0c2d2d9fe1ad08d1bc8b6627011959b79c53d7dd6a3536a33ab8a4fd";
const DELEGATE_KEY: &str = "e485d098507f54e7733a205420dfddbe58db035fa577fc294ebd14db90767a52";
const MAKER_KEY: &str = "6370fd033278c143179d81c5526140625662b8daa446c22ee2d73db3707e620c";

const ACTOR_ADDR: &str = "95ced938f7991cd0dfcb48f0a06a40fa1af46ebc";
const DELEGATE_ADDR: &str = "3e5e9111ae8eb78fe1cc3bb8915d5d461f3ef9a9";
const MAKER_ADDR: &str = "22d491bde2303f2f43325b2108d26f1eaba1e32b";

fn digest() -> Hash {
    // An opaque typed-message digest; sig does not care where it came from.
    Hash(
        <[u8; 32]>::from_hex("db4d693044d26a64afeae3d62328abfcfef92527a6529dc0d3774464fbd11aef")
            .unwrap(),
    )
}

macro_rules! make_address_derivation {
    ($name:ident, $signer:ty) => {
        #[test]
        fn $name() {
            for (key, addr) in [
                (ACTOR_KEY, ACTOR_ADDR),
                (DELEGATE_KEY, DELEGATE_ADDR),
                (MAKER_KEY, MAKER_ADDR),
            ] {
                let sk = <[u8; 32]>::from_hex(key).unwrap();
                let signer = <$signer>::from_bytes(&sk).unwrap();
                assert_eq!(signer.address().0.encode_hex::<String>(), addr);
            }
        }
    };
}

macro_rules! make_sign_hardcoded {
    ($name:ident, $signer:ty, $recover:path) => {
        #[test]
        fn $name() {
            // Deterministic (RFC 6979) signature of the actor key over the
            // digest above, r ‖ s ‖ v with the 27-offset v. Both backends
            // must produce the exact same bytes.
            let expected_sig = "cedfaccaa794e22803c3e5298e0d4ec8cce885c6cf273a8c7d87b96720508061\
                                6cdf60ed295bf885fab2470758870623eca7c0f5f75b3de37c1e4d08a66bfb5d\
                                1c";

            let sk = <[u8; 32]>::from_hex(ACTOR_KEY).unwrap();
            let signer = <$signer>::from_bytes(&sk).unwrap();
            let sig = signer.sign(digest());

            assert_eq!(sig.0.encode_hex::<String>(), expected_sig);
            assert_eq!(
                $recover(digest(), sig).unwrap(),
                signer.address(),
                "recovery must return the signing address"
            );
        }
    };
}

macro_rules! make_a_to_b {
    ($name:ident, $signer:ty, $recover:path) => {
        #[test]
        fn $name() {
            // Do not use that on any real device, this is just for testing.
            let mut rng = StdRng::seed_from_u64(0);
            let signer = <$signer>::new(&mut rng);
            let msg = digest();
            let sig = signer.sign(msg);

            let address = $recover(msg, sig).unwrap();

            assert_eq!(address, signer.address());
        }
    };
}

#[cfg(feature = "k256")]
make_address_derivation!(k256_addresses, super::k256::Signer);
#[cfg(feature = "secp256k1")]
make_address_derivation!(secp256k1_addresses, super::secp256k1::Signer);

#[cfg(feature = "k256")]
make_sign_hardcoded!(k256_sign, super::k256::Signer, super::k256::recover_signer);
#[cfg(feature = "secp256k1")]
make_sign_hardcoded!(
    secp256k1_sign,
    super::secp256k1::Signer,
    super::secp256k1::recover_signer
);

#[cfg(feature = "k256")]
make_a_to_b!(k256_to_k256, super::k256::Signer, super::k256::recover_signer);
#[cfg(feature = "secp256k1")]
make_a_to_b!(
    secp256k1_to_secp256k1,
    super::secp256k1::Signer,
    super::secp256k1::recover_signer
);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    secp256k1_to_k256,
    super::secp256k1::Signer,
    super::k256::recover_signer
);

#[cfg(all(feature = "secp256k1", feature = "k256"))]
make_a_to_b!(
    k256_to_secp256k1,
    super::k256::Signer,
    super::secp256k1::recover_signer
);

#[test]
fn wrong_key_recovers_other_address() {
    let actor = super::Signer::from_bytes(&<[u8; 32]>::from_hex(ACTOR_KEY).unwrap()).unwrap();
    let delegate =
        super::Signer::from_bytes(&<[u8; 32]>::from_hex(DELEGATE_KEY).unwrap()).unwrap();

    let sig = delegate.sign(digest());
    let recovered = super::recover_signer(digest(), sig).unwrap();

    assert_eq!(recovered, delegate.address());
    assert_ne!(recovered, actor.address());
}

#[test]
fn malformed_recovery_byte_rejected() {
    let signer = super::Signer::from_bytes(&<[u8; 32]>::from_hex(ACTOR_KEY).unwrap()).unwrap();
    let mut sig: Signature = signer.sign(digest());

    // v without the 27 offset is not a conforming signature.
    sig.0[64] -= 27;
    assert!(super::recover_signer(digest(), sig).is_err());
}
