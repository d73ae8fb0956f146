//! Narrow interfaces to the engine's external collaborators: the token
//! ledger and the market/network registries.
//!
//! The engine never stores balances or market parameters itself. It reads
//! registry state as snapshots at the start of each operation and moves
//! tokens only through [Ledger]. Implementations are expected to be atomic
//! and exact per call, as a settlement ledger is.

use crate::eip712::types::{Address, Bytes16, U256};
use core::fmt::Display;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The debited account does not hold `amount`.
    InsufficientBalance,
    /// The debited account has not approved `amount` for the spender.
    InsufficientAllowance,
}

impl Display for LedgerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LedgerError::InsufficientBalance => f.write_str("insufficient balance"),
            LedgerError::InsufficientAllowance => f.write_str("insufficient allowance"),
        }
    }
}

/// Token ledger holding all balances, including the engine's escrow account.
pub trait Ledger {
    fn total_supply(&self) -> U256;

    fn balance_of(&self, account: Address) -> U256;

    /// Move `amount` out of `from`. The engine only ever debits its own
    /// escrow account this way.
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError>;

    /// Move `amount` that `owner` has approved for `spender`. Used to pull
    /// deposits into escrow at open.
    fn transfer_from(
        &mut self,
        spender: Address,
        owner: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}

/// Per-market parameters, read once per operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Market {
    /// The market's designated intermediary; counter-signs and submits
    /// channel transactions.
    pub maker: Address,
    /// The market operator; receives the market's share of close fees.
    pub owner: Address,
    /// Market fee rate, denominated as a fraction of the token total supply.
    pub market_fee: U256,
}

pub trait MarketRegistry {
    fn market(&self, market_id: Bytes16) -> Option<Market>;
}

/// Network-wide parameters, read once per operation.
pub trait NetworkRegistry {
    /// Network contribution rate, a fraction of the token total supply,
    /// taken out of every market fee.
    fn contribution(&self) -> U256;

    /// Account receiving the network contribution.
    fn organization(&self) -> Address;
}
