//! Channel records, their lifecycle states and the emitted lifecycle events.

use crate::eip712::types::{Address, Bytes16, Signature, U256};
use serde::Serialize;

/// Direction of a channel, fixing who escrows the deposit and who receives
/// the payout at close.
///
/// The wire value is `uint8` and part of the signed open message.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum ChannelType {
    /// Escrows value contributed by a consumer actor; pays out to the market
    /// maker, which then pays sellers.
    Payment = 1,
    /// Escrows value contributed by the market maker; pays out to a provider
    /// actor.
    Paying = 2,
}

impl ChannelType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(ChannelType::Payment),
            2 => Some(ChannelType::Paying),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Who funds the escrow when a channel of this type opens.
    pub fn payer(self, actor: Address, marketmaker: Address) -> Address {
        match self {
            ChannelType::Payment => actor,
            ChannelType::Paying => marketmaker,
        }
    }

    /// Close-time routing of the spent and unspent portions, resolved once
    /// at close time.
    pub fn routing(self, actor: Address, marketmaker: Address) -> Routing {
        match self {
            ChannelType::Payment => Routing {
                payout_to: marketmaker,
                refund_to: actor,
            },
            ChannelType::Paying => Routing {
                payout_to: actor,
                refund_to: marketmaker,
            },
        }
    }
}

impl Serialize for ChannelType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Encoded as its uint8 wire value, not as a serde enum.
        serializer.serialize_u8(self.as_u8())
    }
}

/// Payout/refund targets of a close, derived from the channel type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Routing {
    pub payout_to: Address,
    pub refund_to: Address,
}

/// Lifecycle state of a channel record.
///
/// `Closing` only ever exists inside a running [close][crate::ChannelManager::close_channel]:
/// the cooperative close completes `Open → Closing → Closed` within one
/// atomic operation, so no caller can observe `Closing` as a durable state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closing,
    Closed,
}

/// One channel record, created at open and mutated exactly once by a
/// successful close.
#[derive(Debug, Clone)]
pub struct Channel {
    pub id: Bytes16,
    pub ctype: ChannelType,
    pub market_id: Bytes16,
    pub actor: Address,
    pub delegate: Address,
    pub marketmaker: Address,
    pub recipient: Address,
    /// The deposit, fixed at open. Never changes afterwards.
    pub amount: U256,
    /// Ledger height at open; audit data, not used in arithmetic.
    pub opened_at: U256,
    pub state: ChannelState,
    /// Last accepted close sequence number; strictly increases.
    pub close_seq: u32,
    /// Unspent remainder as of the last accepted close.
    pub closing_balance: U256,
}

/// Emitted once per successful open, carrying every open field plus the
/// actor's signature so off-ledger observers can audit and replay-detect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opened {
    pub ctype: ChannelType,
    pub market_id: Bytes16,
    pub channel_id: Bytes16,
    pub actor: Address,
    pub delegate: Address,
    pub marketmaker: Address,
    pub recipient: Address,
    pub amount: U256,
    pub signature: Signature,
}

/// Emitted when a close is accepted, before funds move: the co-signed
/// balance and sequence the channel is settling at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closing {
    pub ctype: ChannelType,
    pub market_id: Bytes16,
    pub channel_id: Bytes16,
    pub channel_seq: u32,
    pub balance: U256,
    pub is_final: bool,
}

/// Emitted when the close has settled: the full distribution of the deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub ctype: ChannelType,
    pub market_id: Bytes16,
    pub channel_id: Bytes16,
    pub channel_seq: u32,
    pub closed_at: U256,
    pub payout: U256,
    pub refund: U256,
    pub market_owner_share: U256,
    pub network_contribution: U256,
}

/// Both events of one atomic cooperative close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseReceipt {
    pub closing: Closing,
    pub closed: Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctype_wire_values() {
        assert_eq!(ChannelType::Payment.as_u8(), 1);
        assert_eq!(ChannelType::Paying.as_u8(), 2);
        assert_eq!(ChannelType::from_u8(1), Some(ChannelType::Payment));
        assert_eq!(ChannelType::from_u8(2), Some(ChannelType::Paying));
        assert_eq!(ChannelType::from_u8(0), None);
        assert_eq!(ChannelType::from_u8(3), None);
    }

    #[test]
    fn routing_is_type_dependent() {
        let actor = Address([0x01; 20]);
        let maker = Address([0x02; 20]);

        let payment = ChannelType::Payment.routing(actor, maker);
        assert_eq!(payment.payout_to, maker);
        assert_eq!(payment.refund_to, actor);

        let paying = ChannelType::Paying.routing(actor, maker);
        assert_eq!(paying.payout_to, actor);
        assert_eq!(paying.refund_to, maker);
    }

    #[test]
    fn payer_is_type_dependent() {
        let actor = Address([0x01; 20]);
        let maker = Address([0x02; 20]);

        assert_eq!(ChannelType::Payment.payer(actor, maker), actor);
        assert_eq!(ChannelType::Paying.payer(actor, maker), maker);
    }
}
