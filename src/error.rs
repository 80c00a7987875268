//! Error types for the fallible, boundary-crossing operations in this crate.
//!
//! Protocol dispatch itself never raises these — per the error-handling policy,
//! CI message handling reports outcomes as booleans and log lines, not
//! exceptions. These errors exist only where Rust's bounds-checked memory model
//! forces a fallible API that the rest of the protocol logic doesn't need:
//! building a buffer too small for a value, or configuring a device with an
//! invalid identity.

use thiserror::Error;

/// Failures from the septet wire codec (`crate::wire`).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer was too short to hold the value at the given offset.
    #[error("buffer too short: need {needed} bytes at offset {offset}, have {available}")]
    BufferTooShort {
        /// Offset the read/write started at.
        offset: usize,
        /// Number of bytes the operation required.
        needed: usize,
        /// Number of bytes actually available from `offset`.
        available: usize,
    },
}

/// Failures constructing or validating a [`crate::ci::device_info::DeviceInfo`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceInfoError {
    /// A manufacturer id of zero is reserved and makes the record invalid.
    #[error("manufacturer_id must be non-zero")]
    ZeroManufacturerId,
    /// `max_receivable_sysex_size` must be at least 128 bytes.
    #[error("max_receivable_sysex_size must be >= 128, got {0}")]
    SysexSizeTooSmall(u32),
}

/// Failures parsing a wire-format [`crate::ci::profile_id::ProfileId`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileIdError {
    /// A profile id byte slice was not exactly 5 bytes.
    #[error("profile id must be exactly 5 bytes, got {0}")]
    WrongLength(usize),
    /// All of the first three bytes were zero, which is not a valid profile id.
    #[error("profile id is all-zero in its identifying bytes")]
    AllZero,
}
