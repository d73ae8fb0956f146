//! Distribution arithmetic for cooperative closes.
//!
//! Fee rates in this market model are denominated as a fraction of the
//! token's **total supply**: a `market_fee` of `totalSupply * 42 / 100` is a
//! 42% fee on the spent amount. The same scaling applies to the network's
//! `contribution` share, taken out of the market fee. This is unusual but
//! deliberate; do not normalize it to a percentage-of-spend model.

use crate::eip712::types::U256;
use core::fmt::Display;

/// How one channel deposit settles at close.
///
/// Conservation holds by construction:
/// `payout + refund + market_owner_share + network_contribution == amount`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Distribution {
    /// `amount - balance`, the portion actually consumed.
    pub spent: U256,
    /// Market fee on the spent portion, before the network split.
    pub fee: U256,
    /// Spent portion minus the fee.
    pub payout: U256,
    /// The unspent `balance`, returned to the escrow contributor.
    pub refund: U256,
    /// Network organization's cut of the fee.
    pub network_contribution: U256,
    /// Remainder of the fee, kept by the market owner.
    pub market_owner_share: U256,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The agreed balance exceeds the channel deposit.
    BalanceExceedsAmount { balance: U256, amount: U256 },
    /// The ledger reports a zero total supply, the rate denominator.
    ZeroTotalSupply,
    /// A fee rate above the total supply would make the fee exceed the
    /// spent amount.
    RateOutOfRange { rate: U256, total_supply: U256 },
    /// `spent * rate` does not fit in 256 bits.
    Overflow,
}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::BalanceExceedsAmount { balance, amount } => f.write_fmt(format_args!(
                "closing balance {} exceeds channel amount {}",
                balance, amount
            )),
            Error::ZeroTotalSupply => f.write_str("token total supply is zero"),
            Error::RateOutOfRange { rate, total_supply } => f.write_fmt(format_args!(
                "fee rate {} exceeds total supply {}",
                rate, total_supply
            )),
            Error::Overflow => f.write_str("fee multiplication overflowed 256 bits"),
        }
    }
}

impl Distribution {
    /// Compute the settlement split of a `amount` deposit closing at
    /// `balance` remaining.
    ///
    /// `market_fee` and `contribution` are fractions of `total_supply` (see
    /// module docs). All divisions floor; the flooring remainders stay with
    /// the payout and the market owner respectively, so no unit is ever
    /// created or lost.
    pub fn compute(
        amount: U256,
        balance: U256,
        market_fee: U256,
        contribution: U256,
        total_supply: U256,
    ) -> Result<Distribution, Error> {
        if balance > amount {
            return Err(Error::BalanceExceedsAmount { balance, amount });
        }
        if total_supply.is_zero() {
            return Err(Error::ZeroTotalSupply);
        }
        if market_fee > total_supply {
            return Err(Error::RateOutOfRange {
                rate: market_fee,
                total_supply,
            });
        }
        if contribution > total_supply {
            return Err(Error::RateOutOfRange {
                rate: contribution,
                total_supply,
            });
        }

        let spent = amount - balance;

        // market_fee <= total_supply, so fee <= spent and the subtraction
        // below cannot underflow. Same argument for the contribution split.
        let fee = spent.checked_mul(market_fee).ok_or(Error::Overflow)? / total_supply;
        let payout = spent - fee;
        let refund = balance;

        let network_contribution = fee.checked_mul(contribution).ok_or(Error::Overflow)? / total_supply;
        let market_owner_share = fee - network_contribution;

        Ok(Distribution {
            spent,
            fee,
            payout,
            refund,
            network_contribution,
            market_owner_share,
        })
    }

    /// Sum of all four outgoing legs; always equals the deposit.
    pub fn total(&self) -> U256 {
        self.payout + self.refund + self.market_owner_share + self.network_contribution
    }
}
