//! Error type and Return values used by the slot encoder.

use core::fmt::Display;

use serde::ser;

/// Represents all possible errors that can happen while encoding a typed
/// message.
///
/// Note that custom errors using [ser::Error::custom()] are not supported.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The struct contains a type that has no place in a typed-message
    /// struct encoding.
    ///
    /// Both message schemas consist only of static types (uints, addresses,
    /// fixed-size byte strings, bool), each taking exactly one 32-byte slot.
    /// Dynamic types like `string` would have to be hashed first, which the
    /// caller must do explicitly (as [Domain][super::Domain] does for its
    /// name and version).
    TypeNotRepresentable(&'static str),
    /// A bytes value longer than one 32-byte slot was passed to the encoder.
    SlotOverflow(usize),
}

impl ser::Error for Error {
    fn custom<T>(_: T) -> Self
    where
        T: core::fmt::Display,
    {
        unimplemented!()
    }
}
#[cfg(feature = "std")]
impl ser::StdError for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::TypeNotRepresentable(type_name) => {
                f.write_str("type is not representable in a typed-message encoding: ")?;
                f.write_str(type_name)
            }
            Error::SlotOverflow(len) => {
                f.write_fmt(format_args!("bytes value of length {} exceeds one slot", len))
            }
        }
    }
}

/// Alias for `Result` using the [Error] returned by the encoder.
pub type Result<T> = core::result::Result<T, Error>;
