#![cfg_attr(not(feature = "std"), no_std)]

//! Channel lifecycle engine for XBR-style open data markets.
//!
//! Payment and paying channels let a data consumer or provider and a market
//! maker exchange value off the settlement ledger at high frequency, touching
//! the ledger only at channel open and close. This crate implements the state
//! machine governing channel creation, signed cooperative closing and the
//! fee/payout arithmetic, against narrow traits for the token ledger and the
//! market/network registries (see [ledger]).

extern crate alloc;

mod eip712 {
    mod error;
    mod hashing;
    mod ser;

    pub mod types;

    pub use error::{Error, Result};
    pub use hashing::{hash_struct, to_hash, type_hash, typed_data_hash, Domain};
    pub use ser::{to_writer, Serializer, Writer};

    #[cfg(test)]
    mod tests;
}
pub mod sig;

pub mod channel;
pub mod fees;
pub mod ledger;
pub mod manager;
pub mod messages;
pub mod store;

pub use eip712::types::{Address, Bytes16, Hash, Signature, U256};
pub use eip712::Domain;
pub use manager::{ChannelError, ChannelManager, CloseRequest, OpenRequest};
