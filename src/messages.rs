//! The two signed message schemas of the channel lifecycle.
//!
//! Clients build and sign these off-ledger; the engine rebuilds them from
//! call inputs and recovers the signer. Field order and types must match the
//! schema type strings exactly, since both feed the struct hash.

use crate::channel::ChannelType;
use crate::eip712::{
    self, type_hash, typed_data_hash,
    types::{Address, Bytes16, Hash, U256},
    Domain,
};
use serde::Serialize;

/// Statement the actor signs to authorize opening a channel.
///
/// `chain_id` and `verifying_contract` bind the signature to one deployment
/// of the engine; a signature captured on a test network cannot be replayed
/// against another.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpenChannel {
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub ctype: ChannelType,
    pub opened_at: U256,
    pub market_id: Bytes16,
    pub channel_id: Bytes16,
    pub actor: Address,
    pub delegate: Address,
    pub marketmaker: Address,
    pub recipient: Address,
    pub amount: U256,
}

impl OpenChannel {
    pub const TYPE: &'static str = "EIP712ChannelOpen(uint256 chainId,\
        address verifyingContract,uint8 ctype,uint256 openedAt,\
        bytes16 marketId,bytes16 channelId,address actor,address delegate,\
        address marketmaker,address recipient,uint256 amount)";

    /// The digest the actor signs and the engine verifies against.
    pub fn digest(&self, domain: &Domain) -> Result<Hash, eip712::Error> {
        typed_data_hash(domain, type_hash(Self::TYPE), self)
    }
}

/// Statement both the delegate and the market maker sign to authorize a
/// cooperative close at an agreed final balance.
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct CloseChannel {
    pub chain_id: U256,
    pub verifying_contract: Address,
    pub close_at: U256,
    pub market_id: Bytes16,
    pub channel_id: Bytes16,
    pub channel_seq: u32,
    pub balance: U256,
    pub is_final: bool,
}

impl CloseChannel {
    pub const TYPE: &'static str = "EIP712ChannelClose(uint256 chainId,\
        address verifyingContract,uint256 closeAt,bytes16 marketId,\
        bytes16 channelId,uint32 channelSeq,uint256 balance,bool isFinal)";

    /// The digest both co-owners sign and the engine verifies against.
    pub fn digest(&self, domain: &Domain) -> Result<Hash, eip712::Error> {
        typed_data_hash(domain, type_hash(Self::TYPE), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex::{FromHex, ToHex};

    fn hash_hex(h: Hash) -> String {
        h.0.encode_hex()
    }

    fn open_message() -> OpenChannel {
        OpenChannel {
            chain_id: U256::from(1u64),
            verifying_contract: Address([0x22; 20]),
            ctype: ChannelType::Payment,
            opened_at: U256::from(7u64),
            market_id: Bytes16([0xaa; 16]),
            channel_id: Bytes16([0xbb; 16]),
            actor: Address([0x33; 20]),
            delegate: Address([0x44; 20]),
            marketmaker: Address([0x55; 20]),
            recipient: Address([0x66; 20]),
            amount: U256::from(123u64) * U256::exp10(18),
        }
    }

    fn close_message() -> CloseChannel {
        CloseChannel {
            chain_id: U256::from(1u64),
            verifying_contract: Address([0x22; 20]),
            close_at: U256::from(9u64),
            market_id: Bytes16([0xaa; 16]),
            channel_id: Bytes16([0xbb; 16]),
            channel_seq: 13,
            balance: U256::from(55u64) * U256::exp10(18),
            is_final: true,
        }
    }

    #[test]
    fn open_type_hash() {
        assert_eq!(
            hash_hex(type_hash(OpenChannel::TYPE)),
            "b64bcb01b836057f268e088d4d8e9cfb8d4fbb900c798b6815d934b7bc5759de"
        );
    }

    #[test]
    fn close_type_hash() {
        assert_eq!(
            hash_hex(type_hash(CloseChannel::TYPE)),
            "6a7865c9be84b09244f7d7e79c1882659ea258ccd2aed77adfc9b753b83a761a"
        );
    }

    #[test]
    fn open_digest() {
        let digest = open_message().digest(&Domain::XBR).unwrap();
        assert_eq!(
            hash_hex(digest),
            "db4d693044d26a64afeae3d62328abfcfef92527a6529dc0d3774464fbd11aef"
        );
    }

    #[test]
    fn close_digest() {
        let digest = close_message().digest(&Domain::XBR).unwrap();
        assert_eq!(
            hash_hex(digest),
            "9c40f76ec177538c8b2f6378e0e830810f19df91deabfa7458ec92b8ba0f2449"
        );
    }

    #[test]
    fn digest_changes_with_any_field() {
        let base = close_message().digest(&Domain::XBR).unwrap();

        let mut bumped = close_message();
        bumped.channel_seq += 1;
        assert_ne!(bumped.digest(&Domain::XBR).unwrap(), base);

        let mut rebalanced = close_message();
        rebalanced.balance = rebalanced.balance + U256::from(1u64);
        assert_ne!(rebalanced.digest(&Domain::XBR).unwrap(), base);
    }

    #[test]
    fn digest_is_domain_scoped() {
        let other = Domain {
            name: "XBR",
            version: "2",
        };
        let msg = open_message();
        assert_ne!(
            msg.digest(&Domain::XBR).unwrap(),
            msg.digest(&other).unwrap()
        );
    }

    #[test]
    fn signed_open_round_trip() {
        let sk = <[u8; 32]>::from_hex(
            "395df67f0c2d2d9fe1ad08d1bc8b6627011959b79c53d7dd6a3536a33ab8a4fd",
        )
        .unwrap();
        let signer = crate::sig::Signer::from_bytes(&sk).unwrap();

        let digest = open_message().digest(&Domain::XBR).unwrap();
        let sig = signer.sign(digest);

        assert_eq!(
            crate::sig::recover_signer(digest, sig).unwrap(),
            signer.address()
        );
    }
}
