//! The channel manager: validates, authorizes and settles channel opens and
//! cooperative closes.
//!
//! The manager owns the channel records and the engine's identity (chain id
//! and escrow address), but none of the balances and none of the market
//! parameters. Those are reached through the [ledger][crate::ledger]
//! traits, with registry
//! state read as a snapshot at the start of each operation so the
//! distribution arithmetic is reproducible in isolation.
//!
//! Every operation is all-or-nothing: all checks run before the first
//! mutation, and escrow payouts only happen after the record has left the
//! `Open` state, so a reentrant call can never observe a half-closed
//! channel as open.

use crate::channel::{
    Channel, ChannelState, ChannelType, CloseReceipt, Closed, Closing, Opened,
};
use crate::eip712::{
    self,
    types::{Address, Bytes16, Hash, Signature, U256},
    Domain,
};
use crate::fees::{self, Distribution};
use crate::ledger::{Ledger, LedgerError, MarketRegistry, NetworkRegistry};
use crate::messages::{CloseChannel, OpenChannel};
use crate::sig;
use crate::store::{ChannelStore, StoreError};
use core::fmt::Display;
use log::{debug, info};

/// Inputs of [ChannelManager::open_channel], minus the signature.
#[derive(Debug, Copy, Clone)]
pub struct OpenRequest {
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

/// Inputs of [ChannelManager::close_channel], minus the two signatures.
#[derive(Debug, Copy, Clone)]
pub struct CloseRequest {
    pub channel_id: Bytes16,
    pub close_at: U256,
    pub channel_seq: u32,
    pub balance: U256,
    pub is_final: bool,
}

/// All rejection reasons of the two lifecycle operations. Every rejection
/// aborts the whole operation; nothing is committed and no event is emitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// A channel with this id already exists.
    DuplicateChannel(Bytes16),
    /// No channel with this id exists.
    ChannelNotFound(Bytes16),
    /// The channel exists but is not open (already closed, in terminal
    /// state).
    ChannelNotOpen(Bytes16),
    /// The market this channel would belong to is not registered.
    MarketNotFound(Bytes16),
    /// The submitted market maker is not the market's registered maker.
    MakerMismatch {
        registered: Address,
        submitted: Address,
    },
    /// A signature did not recover to the required signer. `recovered` is
    /// `None` when recovery itself failed on a malformed signature.
    InvalidSignature {
        expected: Address,
        recovered: Option<Address>,
    },
    /// The close sequence number does not exceed the last accepted one.
    StaleSequence { stored: u32, submitted: u32 },
    /// The agreed closing balance exceeds the channel deposit.
    BalanceOutOfRange { balance: U256, amount: U256 },
    /// A close submitted by anyone but the channel's market maker.
    UnauthorizedCaller { expected: Address, caller: Address },
    /// The ledger refused a transfer (insufficient balance or allowance
    /// upstream).
    LedgerTransferFailed(LedgerError),
    /// Encoding the typed message failed; cannot happen for well-formed
    /// requests.
    Encoding(eip712::Error),
    /// The distribution arithmetic rejected the inputs.
    Fees(fees::Error),
}

impl From<LedgerError> for ChannelError {
    fn from(e: LedgerError) -> Self {
        Self::LedgerTransferFailed(e)
    }
}
impl From<eip712::Error> for ChannelError {
    fn from(e: eip712::Error) -> Self {
        Self::Encoding(e)
    }
}
impl From<fees::Error> for ChannelError {
    fn from(e: fees::Error) -> Self {
        Self::Fees(e)
    }
}
impl From<StoreError> for ChannelError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateChannel(id) => Self::DuplicateChannel(id),
        }
    }
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChannelError::DuplicateChannel(id) => {
                f.write_fmt(format_args!("channel {:?} already exists", id))
            }
            ChannelError::ChannelNotFound(id) => {
                f.write_fmt(format_args!("channel {:?} does not exist", id))
            }
            ChannelError::ChannelNotOpen(id) => {
                f.write_fmt(format_args!("channel {:?} is not open", id))
            }
            ChannelError::MarketNotFound(id) => {
                f.write_fmt(format_args!("market {:?} is not registered", id))
            }
            ChannelError::MakerMismatch {
                registered,
                submitted,
            } => f.write_fmt(format_args!(
                "market maker {:?} does not match registered maker {:?}",
                submitted, registered
            )),
            ChannelError::InvalidSignature {
                expected,
                recovered,
            } => match recovered {
                Some(recovered) => f.write_fmt(format_args!(
                    "signature recovered to {:?}, expected {:?}",
                    recovered, expected
                )),
                None => f.write_fmt(format_args!(
                    "signature recovery failed, expected signer {:?}",
                    expected
                )),
            },
            ChannelError::StaleSequence { stored, submitted } => f.write_fmt(format_args!(
                "close sequence {} does not exceed last accepted {}",
                submitted, stored
            )),
            ChannelError::BalanceOutOfRange { balance, amount } => f.write_fmt(format_args!(
                "closing balance {} exceeds channel amount {}",
                balance, amount
            )),
            ChannelError::UnauthorizedCaller { expected, caller } => f.write_fmt(format_args!(
                "close submitted by {:?}, only market maker {:?} may close",
                caller, expected
            )),
            ChannelError::LedgerTransferFailed(e) => {
                f.write_fmt(format_args!("ledger transfer failed: {}", e))
            }
            ChannelError::Encoding(e) => f.write_fmt(format_args!("message encoding: {}", e)),
            ChannelError::Fees(e) => f.write_fmt(format_args!("fee computation: {}", e)),
        }
    }
}

/// The channel lifecycle engine.
///
/// One instance per deployment; `address` is the engine's escrow account on
/// the ledger and doubles as the verifying-contract binding inside every
/// signed message.
#[derive(Debug)]
pub struct ChannelManager {
    domain: Domain,
    chain_id: U256,
    address: Address,
    store: ChannelStore,
}

impl ChannelManager {
    pub fn new(chain_id: U256, address: Address) -> Self {
        Self {
            domain: Domain::XBR,
            chain_id,
            address,
            store: ChannelStore::new(),
        }
    }

    /// The engine's escrow account.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    /// Read access to a channel record.
    pub fn channel(&self, id: &Bytes16) -> Option<&Channel> {
        self.store.get(id)
    }

    /// Open a channel.
    ///
    /// The deposit is pulled from the paying side (the actor for payment
    /// channels, the market maker for paying channels) into the engine's
    /// escrow account; the paying side must have approved the engine for
    /// `amount` on the ledger beforehand. `signature` must be the actor's
    /// signature over the corresponding [OpenChannel] message.
    pub fn open_channel<L, M>(
        &mut self,
        ledger: &mut L,
        markets: &M,
        req: &OpenRequest,
        signature: Signature,
    ) -> Result<Opened, ChannelError>
    where
        L: Ledger,
        M: MarketRegistry,
    {
        if self.store.contains(&req.channel_id) {
            return Err(ChannelError::DuplicateChannel(req.channel_id));
        }

        let market = markets
            .market(req.market_id)
            .ok_or(ChannelError::MarketNotFound(req.market_id))?;
        if market.maker != req.marketmaker {
            return Err(ChannelError::MakerMismatch {
                registered: market.maker,
                submitted: req.marketmaker,
            });
        }

        // Only the actor authorizes an open; the submitting caller is
        // irrelevant.
        let msg = OpenChannel {
            chain_id: self.chain_id,
            verifying_contract: self.address,
            ctype: req.ctype,
            opened_at: req.opened_at,
            market_id: req.market_id,
            channel_id: req.channel_id,
            actor: req.actor,
            delegate: req.delegate,
            marketmaker: req.marketmaker,
            recipient: req.recipient,
            amount: req.amount,
        };
        let digest = msg.digest(&self.domain)?;
        verify_signer(digest, signature, req.actor)?;

        // Escrow the deposit. This is the only fallible effect; the record
        // insert below cannot fail after the duplicate check above.
        let payer = req.ctype.payer(req.actor, req.marketmaker);
        ledger.transfer_from(self.address, payer, self.address, req.amount)?;

        self.store.create(Channel {
            id: req.channel_id,
            ctype: req.ctype,
            market_id: req.market_id,
            actor: req.actor,
            delegate: req.delegate,
            marketmaker: req.marketmaker,
            recipient: req.recipient,
            amount: req.amount,
            opened_at: req.opened_at,
            state: ChannelState::Open,
            close_seq: 0,
            closing_balance: U256::zero(),
        })?;

        info!(
            "channel {:?} opened in market {:?}: type {:?}, amount {}, actor {:?}",
            req.channel_id, req.market_id, req.ctype, req.amount, req.actor
        );

        Ok(Opened {
            ctype: req.ctype,
            market_id: req.market_id,
            channel_id: req.channel_id,
            actor: req.actor,
            delegate: req.delegate,
            marketmaker: req.marketmaker,
            recipient: req.recipient,
            amount: req.amount,
            signature,
        })
    }

    /// Cooperatively close a channel at a co-signed final balance.
    ///
    /// `caller` must be the channel's market maker; `delegate_sig` and
    /// `marketmaker_sig` must both recover over the identical
    /// [CloseChannel] message. The close settles immediately: the record
    /// passes `Open → Closing → Closed` within this one call and both
    /// events are returned together.
    pub fn close_channel<L, M, N>(
        &mut self,
        ledger: &mut L,
        markets: &M,
        network: &N,
        caller: Address,
        req: &CloseRequest,
        delegate_sig: Signature,
        marketmaker_sig: Signature,
    ) -> Result<CloseReceipt, ChannelError>
    where
        L: Ledger,
        M: MarketRegistry,
        N: NetworkRegistry,
    {
        let channel = self
            .store
            .get(&req.channel_id)
            .ok_or(ChannelError::ChannelNotFound(req.channel_id))?
            .clone();

        if channel.state != ChannelState::Open {
            return Err(ChannelError::ChannelNotOpen(req.channel_id));
        }
        if caller != channel.marketmaker {
            return Err(ChannelError::UnauthorizedCaller {
                expected: channel.marketmaker,
                caller,
            });
        }
        if req.channel_seq <= channel.close_seq {
            return Err(ChannelError::StaleSequence {
                stored: channel.close_seq,
                submitted: req.channel_seq,
            });
        }
        if req.balance > channel.amount {
            return Err(ChannelError::BalanceOutOfRange {
                balance: req.balance,
                amount: channel.amount,
            });
        }

        // Both co-owners must have signed the identical statement.
        let msg = CloseChannel {
            chain_id: self.chain_id,
            verifying_contract: self.address,
            close_at: req.close_at,
            market_id: channel.market_id,
            channel_id: req.channel_id,
            channel_seq: req.channel_seq,
            balance: req.balance,
            is_final: req.is_final,
        };
        let digest = msg.digest(&self.domain)?;
        verify_signer(digest, delegate_sig, channel.delegate)?;
        verify_signer(digest, marketmaker_sig, channel.marketmaker)?;

        // Registry snapshots for this operation.
        let market = markets
            .market(channel.market_id)
            .ok_or(ChannelError::MarketNotFound(channel.market_id))?;
        let contribution = network.contribution();
        let organization = network.organization();

        let dist = Distribution::compute(
            channel.amount,
            req.balance,
            market.market_fee,
            contribution,
            ledger.total_supply(),
        )?;

        // Escrow conservation means the engine holds exactly the deposit for
        // this channel; verify before mutating so the payouts below cannot
        // fail halfway through.
        if ledger.balance_of(self.address) < channel.amount {
            return Err(ChannelError::LedgerTransferFailed(
                LedgerError::InsufficientBalance,
            ));
        }

        let routing = channel.ctype.routing(channel.actor, channel.marketmaker);

        // All checks passed; leave Open before any external transfer so a
        // reentrant close or open sees a channel that is no longer open.
        match self.store.get_mut(&req.channel_id) {
            Some(rec) => {
                rec.state = ChannelState::Closing;
                rec.close_seq = req.channel_seq;
                rec.closing_balance = req.balance;
            }
            None => return Err(ChannelError::ChannelNotFound(req.channel_id)),
        }

        let closing = Closing {
            ctype: channel.ctype,
            market_id: channel.market_id,
            channel_id: req.channel_id,
            channel_seq: req.channel_seq,
            balance: req.balance,
            is_final: req.is_final,
        };
        debug!(
            "channel {:?} closing at seq {} with balance {}",
            req.channel_id, req.channel_seq, req.balance
        );

        ledger.transfer(self.address, routing.payout_to, dist.payout)?;
        ledger.transfer(self.address, routing.refund_to, dist.refund)?;
        ledger.transfer(self.address, market.owner, dist.market_owner_share)?;
        ledger.transfer(self.address, organization, dist.network_contribution)?;

        match self.store.get_mut(&req.channel_id) {
            Some(rec) => rec.state = ChannelState::Closed,
            None => return Err(ChannelError::ChannelNotFound(req.channel_id)),
        }

        info!(
            "channel {:?} closed: payout {}, refund {}, market fee {}, network contribution {}",
            req.channel_id, dist.payout, dist.refund, dist.market_owner_share, dist.network_contribution
        );

        Ok(CloseReceipt {
            closing,
            closed: Closed {
                ctype: channel.ctype,
                market_id: channel.market_id,
                channel_id: req.channel_id,
                channel_seq: req.channel_seq,
                closed_at: req.close_at,
                payout: dist.payout,
                refund: dist.refund,
                market_owner_share: dist.market_owner_share,
                network_contribution: dist.network_contribution,
            },
        })
    }
}

/// Recover the signer of `digest` and require exact equality with
/// `expected`. Any mismatch or recovery failure is a hard rejection.
fn verify_signer(
    digest: Hash,
    signature: Signature,
    expected: Address,
) -> Result<(), ChannelError> {
    match sig::recover_signer(digest, signature) {
        Ok(recovered) if recovered == expected => Ok(()),
        Ok(recovered) => Err(ChannelError::InvalidSignature {
            expected,
            recovered: Some(recovered),
        }),
        Err(_) => Err(ChannelError::InvalidSignature {
            expected,
            recovered: None,
        }),
    }
}
