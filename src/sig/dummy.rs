//! Dummy Signer that always panics. Fallback if no signer feature flag is
//! selected, so the rest of the crate still type-checks.

use crate::eip712::types::{Address, Hash, Signature};

#[derive(Debug)]
pub struct Error {}

#[derive(Debug)]
pub struct Signer {}

impl Signer {
    pub fn address(&self) -> Address {
        unimplemented!()
    }

    pub fn sign(&self, _digest: Hash) -> Signature {
        unimplemented!()
    }
}

pub fn recover_signer(_digest: Hash, _eth_sig: Signature) -> Result<Address, Error> {
    unimplemented!()
}
