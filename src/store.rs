//! In-memory store of channel records, keyed by channel id.

use crate::channel::Channel;
use crate::eip712::types::Bytes16;
use alloc::collections::BTreeMap;
use core::fmt::Display;

/// Holds one record per channel id.
///
/// Records are never removed: a closed channel keeps occupying its id, which
/// is what guarantees an id can never be reused for a different channel.
#[derive(Debug, Default)]
pub struct ChannelStore {
    channels: BTreeMap<Bytes16, Channel>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A record with this id already exists (in any state).
    DuplicateChannel(Bytes16),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::DuplicateChannel(id) => {
                f.write_fmt(format_args!("channel {:?} already exists", id))
            }
        }
    }
}

impl ChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh record. When two opens race on the same id, exactly
    /// one wins; the loser gets [StoreError::DuplicateChannel] instead of
    /// overwriting.
    pub fn create(&mut self, channel: Channel) -> Result<(), StoreError> {
        if self.channels.contains_key(&channel.id) {
            return Err(StoreError::DuplicateChannel(channel.id));
        }
        self.channels.insert(channel.id, channel);
        Ok(())
    }

    pub fn contains(&self, id: &Bytes16) -> bool {
        self.channels.contains_key(id)
    }

    pub fn get(&self, id: &Bytes16) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Bytes16) -> Option<&mut Channel> {
        self.channels.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
